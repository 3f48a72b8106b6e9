//! Canonical event types emitted by the milestone escrow contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/milestone_escrow/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the escrow contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A project was registered (`created` topic).
    ProjectCreated,
    /// A funder contributed (`funded` topic).
    ProjectFunded,
    /// The milestone pointer advanced (`milestone` topic).
    MilestoneReached,
    /// The cap was reached and escrow paid out to the creator (`released` topic).
    FundsReleased,
    /// The creator appended milestones (`extended` topic).
    MilestonesAdded,
    /// One funder was refunded during cancellation (`refunded` topic).
    RefundIssued,
    /// The creator cancelled the project (`stopped` topic).
    ProjectStopped,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "created" => Self::ProjectCreated,
            "funded" => Self::ProjectFunded,
            "milestone" => Self::MilestoneReached,
            "released" => Self::FundsReleased,
            "extended" => Self::MilestonesAdded,
            "refunded" => Self::RefundIssued,
            "stopped" => Self::ProjectStopped,
            _ => Self::Unknown,
        }
    }

    /// Short identifier stored in the `event_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectCreated => "project_created",
            Self::ProjectFunded => "project_funded",
            Self::MilestoneReached => "milestone_reached",
            Self::FundsReleased => "funds_released",
            Self::MilestonesAdded => "milestones_added",
            Self::RefundIssued => "refund_issued",
            Self::ProjectStopped => "project_stopped",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`].
    pub fn from_stored(s: &str) -> Self {
        match s {
            "project_created" => Self::ProjectCreated,
            "project_funded" => Self::ProjectFunded,
            "milestone_reached" => Self::MilestoneReached,
            "funds_released" => Self::FundsReleased,
            "milestones_added" => Self::MilestonesAdded,
            "refund_issued" => Self::RefundIssued,
            "project_stopped" => Self::ProjectStopped,
            _ => Self::Unknown,
        }
    }
}

/// A fully decoded escrow event, ready to be stored in the database.
///
/// `amount` holds the payload's primary amount: the accepted contribution for
/// `funded`, the cap for `created`/`extended`, the refunded or released sum
/// otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowEvent {
    pub event_id: String,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub total_funded: Option<String>,
    pub milestone_index: Option<i64>,
    pub milestone_count: Option<i64>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// An event row as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub project_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub total_funded: Option<String>,
    pub milestone_index: Option<i64>,
    pub milestone_count: Option<i64>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

impl EventRecord {
    pub fn kind(&self) -> EventKind {
        EventKind::from_stored(&self.event_type)
    }
}
