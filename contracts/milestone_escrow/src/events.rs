//! # Events
//!
//! Every successful state transition publishes one event with the topic tuple
//! `(symbol, project_id)` and a typed payload. Events are emitted only after
//! the corresponding storage writes; a failing call emits nothing.
//!
//! | Topic       | Payload              |
//! |-------------|----------------------|
//! | `created`   | [`ProjectCreated`]   |
//! | `funded`    | [`ProjectFunded`]    |
//! | `milestone` | [`MilestoneReached`] |
//! | `released`  | [`FundsReleased`]    |
//! | `extended`  | [`MilestonesAdded`]  |
//! | `refunded`  | [`RefundIssued`]     |
//! | `stopped`   | [`ProjectStopped`]   |

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCreated {
    pub project_id: u64,
    pub creator: Address,
    pub milestone_count: u32,
    pub cap: i128,
}

/// `amount` is what the funder offered; `accepted` is what fit under the cap.
/// `current_milestone_total_funded` is the cumulative project total.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectFunded {
    pub project_id: u64,
    pub funder: Address,
    pub amount: i128,
    pub accepted: i128,
    pub total_funded: i128,
    pub current_milestone_total_funded: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MilestoneReached {
    pub project_id: u64,
    pub milestone_index: u32,
    pub total_funded: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsReleased {
    pub project_id: u64,
    pub creator: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MilestonesAdded {
    pub project_id: u64,
    pub added: u32,
    pub milestone_count: u32,
    pub cap: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundIssued {
    pub project_id: u64,
    pub funder: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectStopped {
    pub project_id: u64,
    pub refunded_total: i128,
    pub funder_count: u32,
}

pub fn emit_project_created(
    env: &Env,
    project_id: u64,
    creator: Address,
    milestone_count: u32,
    cap: i128,
) {
    env.events().publish(
        (symbol_short!("created"), project_id),
        ProjectCreated {
            project_id,
            creator,
            milestone_count,
            cap,
        },
    );
}

pub fn emit_project_funded(
    env: &Env,
    project_id: u64,
    funder: Address,
    amount: i128,
    accepted: i128,
    total_funded: i128,
) {
    env.events().publish(
        (symbol_short!("funded"), project_id),
        ProjectFunded {
            project_id,
            funder,
            amount,
            accepted,
            total_funded,
            current_milestone_total_funded: total_funded,
        },
    );
}

pub fn emit_milestone_reached(env: &Env, project_id: u64, milestone_index: u32, total_funded: i128) {
    env.events().publish(
        (symbol_short!("milestone"), project_id),
        MilestoneReached {
            project_id,
            milestone_index,
            total_funded,
        },
    );
}

pub fn emit_funds_released(env: &Env, project_id: u64, creator: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("released"), project_id),
        FundsReleased {
            project_id,
            creator,
            amount,
        },
    );
}

pub fn emit_milestones_added(
    env: &Env,
    project_id: u64,
    added: u32,
    milestone_count: u32,
    cap: i128,
) {
    env.events().publish(
        (symbol_short!("extended"), project_id),
        MilestonesAdded {
            project_id,
            added,
            milestone_count,
            cap,
        },
    );
}

pub fn emit_refund_issued(env: &Env, project_id: u64, funder: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("refunded"), project_id),
        RefundIssued {
            project_id,
            funder,
            amount,
        },
    );
}

pub fn emit_project_stopped(env: &Env, project_id: u64, refunded_total: i128, funder_count: u32) {
    env.events().publish(
        (symbol_short!("stopped"), project_id),
        ProjectStopped {
            project_id,
            refunded_total,
            funder_count,
        },
    );
}
