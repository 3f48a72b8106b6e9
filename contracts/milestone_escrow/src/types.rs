//! # Types
//!
//! Shared data structures used across all modules of the escrow contract.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! A `Project` is internally stored as several separate ledger entries:
//!
//! - [`ProjectConfig`] — written once at creation; never mutated.
//! - `Milestones(id)` — a `Vec<Milestone>` that is only ever appended to.
//! - [`ProjectState`] — written on every funding call and on cancellation.
//!
//! The public API exposes the reconstructed [`Project`] struct for convenience
//! and the smaller [`ProjectInfo`] projection for the common status query.
//!
//! ### Lifecycle
//!
//! ```text
//! Active ──(total reaches cap)──► Inactive (completed)
//!    └────(creator stops)───────► Inactive (cancelled, refunded)
//! ```
//!
//! Both inactive outcomes are terminal. Nothing flips `is_active` back.

use soroban_sdk::{contracttype, Address, String, Vec};

/// A cumulative funding checkpoint.
///
/// `goal` is the total raised project-to-date required to reach this
/// milestone, not an increment over the previous one.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Milestone {
    pub goal: i128,
    pub deadline: u64,
}

/// Immutable project configuration, written once at creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectConfig {
    pub id: u64,
    pub creator: Address,
    pub title: String,
    pub image_ref: String,
    pub description: String,
}

/// Mutable funding state, updated on funding and cancellation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectState {
    pub total_funded: i128,
    pub current_milestone: u32,
    pub is_active: bool,
}

impl ProjectState {
    pub fn new() -> Self {
        ProjectState {
            total_funded: 0,
            current_milestone: 0,
            is_active: true,
        }
    }
}

/// Full representation of a crowdfunding project.
///
/// Reconstructed from the split storage entries; never stored as a whole.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    /// Registry index (auto-incremented, starting at 0).
    pub id: u64,
    /// Address that created the project and receives funds on completion.
    pub creator: Address,
    pub title: String,
    pub image_ref: String,
    pub description: String,
    /// Ordered cumulative milestones; the last goal is the funding cap.
    pub milestones: Vec<Milestone>,
    /// Funds accepted so far, never above the cap.
    pub total_funded: i128,
    /// Index of the milestone currently being funded.
    pub current_milestone: u32,
    /// `false` once completed or stopped.
    pub is_active: bool,
}

/// Status projection returned by `get_project_info`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectInfo {
    pub is_active: bool,
    pub index: u64,
    pub total_funded: i128,
    pub current_milestone: u32,
}
