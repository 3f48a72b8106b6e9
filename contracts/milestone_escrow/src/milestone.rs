//! # Milestone accounting
//!
//! Pure functions over a project's milestone sequence. Nothing here touches
//! storage; the entry points in `lib.rs` load state, call into this module
//! and persist whatever it returns.

use soroban_sdk::{Env, Vec};

use crate::types::Milestone;
use crate::Error;

/// Outcome of applying one contribution to a project's funding state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Advance {
    /// Portion of the offered amount that fits under the cap.
    pub accepted: i128,
    pub total_funded: i128,
    pub current_milestone: u32,
    /// The milestone pointer moved forward.
    pub advanced: bool,
    /// The cap was reached.
    pub completed: bool,
}

/// Goal of the final milestone, i.e. the maximum fundable total.
pub fn cap(milestones: &Vec<Milestone>) -> i128 {
    milestones.last().map(|m| m.goal).unwrap_or(0)
}

/// Smallest index `i` with `total < milestones[i].goal`, or the last index
/// when every goal has been met.
pub fn milestone_index_for(milestones: &Vec<Milestone>, total: i128) -> u32 {
    for (i, milestone) in milestones.iter().enumerate() {
        if total < milestone.goal {
            return i as u32;
        }
    }
    milestones.len().saturating_sub(1)
}

/// Apply `amount` to a project currently at `(total_funded, current)`.
///
/// Anything above `cap - total_funded` is not accepted. The pointer may jump
/// several milestones at once.
pub fn advance(
    milestones: &Vec<Milestone>,
    total_funded: i128,
    current: u32,
    amount: i128,
) -> Advance {
    let cap = cap(milestones);
    let accepted = amount.min(cap - total_funded);
    let total_funded = total_funded + accepted;
    let current_milestone = milestone_index_for(milestones, total_funded);

    Advance {
        accepted,
        total_funded,
        current_milestone,
        advanced: current_milestone > current,
        completed: total_funded == cap,
    }
}

/// Check that `milestones` can follow a sequence whose last goal is `floor`.
///
/// Goals must be strictly increasing and strictly above `floor` (pass `0` for
/// a new project), deadlines must lie in the future, and the list must not be
/// empty.
pub fn validate(env: &Env, milestones: &Vec<Milestone>, floor: i128) -> Result<(), Error> {
    if milestones.is_empty() {
        return Err(Error::InvalidMilestoneSequence);
    }

    let now = env.ledger().timestamp();
    let mut previous = floor;
    for milestone in milestones.iter() {
        if milestone.goal <= previous || milestone.deadline <= now {
            return Err(Error::InvalidMilestoneSequence);
        }
        previous = milestone.goal;
    }
    Ok(())
}
