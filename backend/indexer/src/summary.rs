//! Per-project state rebuilt from the indexed event stream.
//!
//! The fold mirrors the contract's bookkeeping: funded amounts accumulate per
//! funder, a release or a stop ends the project, and a stop zeroes the
//! escrowed total after refunding every funder.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, EventRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Completed,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub status: ProjectStatus,
    pub creator: Option<String>,
    #[serde(serialize_with = "as_string")]
    pub cap: i128,
    #[serde(serialize_with = "as_string")]
    pub total_funded: i128,
    pub current_milestone_index: i64,
    pub milestone_count: i64,
    /// Contributions per funder since the project was created.
    #[serde(serialize_with = "map_as_string")]
    pub funders: BTreeMap<String, i128>,
    #[serde(serialize_with = "as_string")]
    pub refunded_total: i128,
    #[serde(serialize_with = "as_string")]
    pub released_total: i128,
    pub event_count: usize,
}

impl ProjectSummary {
    fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            status: ProjectStatus::Active,
            creator: None,
            cap: 0,
            total_funded: 0,
            current_milestone_index: 0,
            milestone_count: 0,
            funders: BTreeMap::new(),
            refunded_total: 0,
            released_total: 0,
            event_count: 0,
        }
    }

    fn apply(&mut self, record: &EventRecord) -> Result<()> {
        self.event_count += 1;
        match record.kind() {
            EventKind::ProjectCreated => {
                self.creator = record.actor.clone();
                self.cap = amount(record, record.amount.as_deref())?;
                self.milestone_count = record.milestone_count.unwrap_or(0);
            }
            EventKind::MilestonesAdded => {
                self.cap = amount(record, record.amount.as_deref())?;
                if let Some(count) = record.milestone_count {
                    self.milestone_count = count;
                }
            }
            EventKind::ProjectFunded => {
                let accepted = amount(record, record.amount.as_deref())?;
                if let Some(funder) = &record.actor {
                    *self.funders.entry(funder.clone()).or_insert(0) += accepted;
                }
                self.total_funded = match record.total_funded.as_deref() {
                    Some(raw) => amount(record, Some(raw))?,
                    None => self.total_funded + accepted,
                };
            }
            EventKind::MilestoneReached => {
                if let Some(index) = record.milestone_index {
                    self.current_milestone_index = index;
                }
            }
            EventKind::FundsReleased => {
                self.released_total += amount(record, record.amount.as_deref())?;
                self.status = ProjectStatus::Completed;
            }
            EventKind::RefundIssued => {
                self.refunded_total += amount(record, record.amount.as_deref())?;
            }
            EventKind::ProjectStopped => {
                self.status = ProjectStatus::Stopped;
                self.total_funded = 0;
                self.current_milestone_index = 0;
            }
            EventKind::Unknown => {}
        }
        Ok(())
    }
}

/// Fold a project's events, in ledger order, into its current summary.
/// Returns `None` when the project has no indexed events.
pub fn summarize(project_id: &str, records: &[EventRecord]) -> Result<Option<ProjectSummary>> {
    if records.is_empty() {
        return Ok(None);
    }
    let mut summary = ProjectSummary::new(project_id);
    for record in records {
        summary.apply(record)?;
    }
    Ok(Some(summary))
}

fn amount(record: &EventRecord, raw: Option<&str>) -> Result<i128> {
    let raw = raw.unwrap_or("0");
    raw.trim()
        .parse::<i128>()
        .map_err(|_| IndexerError::InvalidAmount {
            event_id: record.event_id.clone(),
            value: raw.to_string(),
        })
}

// i128 exceeds what JSON numbers carry safely.
fn as_string<S: Serializer>(value: &i128, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn map_as_string<S: Serializer>(
    map: &BTreeMap<String, i128>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(map.iter().map(|(k, v)| (k, v.to_string())))
}
