//! # Milestone Escrow Contract
//!
//! Crowdfunding escrow where every project is funded against an ordered list
//! of cumulative milestones. The contract exposes a single Soroban contract,
//! `MilestoneEscrow`, whose entry points cover the whole project lifecycle:
//!
//! | Phase        | Entry Point(s)                                         |
//! |--------------|--------------------------------------------------------|
//! | Bootstrap    | [`MilestoneEscrow::init`]                              |
//! | Registration | [`MilestoneEscrow::create_project`]                    |
//! | Funding      | [`MilestoneEscrow::fund_project`]                      |
//! | Extension    | [`MilestoneEscrow::add_new_milestones`]                |
//! | Cancellation | [`MilestoneEscrow::stop_project`]                      |
//! | Queries      | `get_project_info`, `get_current_milestone_funders`, `get_all_milestones_info`, `get_project`, `get_contribution`, `project_count`, `token`, `admin` |
//!
//! ## Architecture
//!
//! Milestone arithmetic lives in [`milestone`], the funder ledger in
//! [`ledger`], token movement in [`transfer`] and storage access in
//! [`storage`]. This file holds the entry points, authorization checks and
//! event emissions.
//!
//! Every mutating entry point commits its storage writes before handing
//! control to the token contract, so a callback during a transfer can only
//! ever observe the post-call state.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, log, vec, Address, Env, Map, String, Vec};

pub mod events;
mod ledger;
mod milestone;
mod storage;
mod transfer;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

use transfer::ValueTransfer;
pub use types::{Milestone, Project, ProjectInfo};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    UnknownProject           = 1,
    ProjectInactive          = 2,
    NotAuthorized            = 3,
    InvalidMilestoneSequence = 4,
    ZeroAmount               = 5,
    TransferFailure          = 6,
    NegativeAmount           = 7,
    NotInitialized           = 8,
    AlreadyInitialized       = 9,
}

#[contract]
pub struct MilestoneEscrow;

#[contractimpl]
impl MilestoneEscrow {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Initialise the escrow with the token every project is funded in.
    ///
    /// Must be called exactly once after deployment.
    pub fn init(env: Env, admin: Address, token: Address) -> Result<(), Error> {
        admin.require_auth();
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        storage::set_config(&env, &admin, &token);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Project lifecycle
    // ─────────────────────────────────────────────────────────

    /// Register a new project and return its index.
    ///
    /// - `creator` must authorize the call.
    /// - `milestones` must be non-empty, have strictly increasing positive
    ///   goals, and deadlines in the future.
    pub fn create_project(
        env: Env,
        creator: Address,
        title: String,
        image_ref: String,
        description: String,
        milestones: Vec<Milestone>,
    ) -> Result<u64, Error> {
        creator.require_auth();
        if !storage::is_initialized(&env) {
            return Err(Error::NotInitialized);
        }
        milestone::validate(&env, &milestones, 0)?;

        let id = storage::get_and_increment_project_id(&env);
        let config = types::ProjectConfig {
            id,
            creator: creator.clone(),
            title,
            image_ref,
            description,
        };
        storage::save_new_project(&env, &config, &milestones);

        log!(&env, "escrow project created: id={}, milestones={}", id, milestones.len());
        events::emit_project_created(
            &env,
            id,
            creator,
            milestones.len(),
            milestone::cap(&milestones),
        );
        Ok(id)
    }

    /// Contribute `amount` of the escrow token to a project.
    ///
    /// Only the part that fits under the final milestone goal is taken from
    /// `funder`; the rest never leaves their account. Reaching the final goal
    /// closes the project and releases the escrowed total to the creator.
    pub fn fund_project(env: Env, project_id: u64, funder: Address, amount: i128) -> Result<(), Error> {
        funder.require_auth();

        let config = storage::load_project_config(&env, project_id)?;
        let mut state = storage::load_project_state(&env, project_id)?;
        if !state.is_active {
            return Err(Error::ProjectInactive);
        }
        if amount == 0 {
            return Err(Error::ZeroAmount);
        }
        if amount < 0 {
            return Err(Error::NegativeAmount);
        }
        let vault = ValueTransfer::load(&env)?;

        let milestones = storage::load_milestones(&env, project_id)?;
        let step = milestone::advance(&milestones, state.total_funded, state.current_milestone, amount);

        let mut funders = storage::load_funders(&env, project_id)?;
        ledger::record(&mut funders, &funder, step.accepted);

        let segment = if step.advanced {
            vec![&env, funder.clone()]
        } else {
            let mut current = storage::load_milestone_funders(&env, project_id)?;
            current.push_back(funder.clone());
            current
        };

        state.total_funded = step.total_funded;
        state.current_milestone = step.current_milestone;
        if step.completed {
            state.is_active = false;
        }

        storage::save_project_state(&env, project_id, &state);
        storage::save_funders(&env, project_id, &funders);
        storage::save_milestone_funders(&env, project_id, &segment);

        vault.deposit(&funder, step.accepted)?;
        if step.completed {
            vault.send(&config.creator, step.total_funded)?;
        }

        log!(
            &env,
            "escrow project funded: id={}, accepted={}, total={}, milestone={}",
            project_id,
            step.accepted,
            step.total_funded,
            step.current_milestone
        );
        events::emit_project_funded(
            &env,
            project_id,
            funder,
            amount,
            step.accepted,
            step.total_funded,
        );
        if step.advanced {
            events::emit_milestone_reached(&env, project_id, step.current_milestone, step.total_funded);
        }
        if step.completed {
            events::emit_funds_released(&env, project_id, config.creator, step.total_funded);
        }
        Ok(())
    }

    /// Append milestones to an active project. Creator only.
    ///
    /// Each new goal must exceed the one before it, starting from the current
    /// final goal. Funding state is left untouched.
    pub fn add_new_milestones(
        env: Env,
        caller: Address,
        project_id: u64,
        new_milestones: Vec<Milestone>,
    ) -> Result<(), Error> {
        caller.require_auth();

        let config = storage::load_project_config(&env, project_id)?;
        if caller != config.creator {
            return Err(Error::NotAuthorized);
        }
        let state = storage::load_project_state(&env, project_id)?;
        if !state.is_active {
            return Err(Error::ProjectInactive);
        }

        let mut milestones = storage::load_milestones(&env, project_id)?;
        milestone::validate(&env, &new_milestones, milestone::cap(&milestones))?;
        milestones.append(&new_milestones);
        storage::save_milestones(&env, project_id, &milestones);

        events::emit_milestones_added(
            &env,
            project_id,
            new_milestones.len(),
            milestones.len(),
            milestone::cap(&milestones),
        );
        Ok(())
    }

    /// Cancel a project and refund every funder their full contribution.
    /// Creator only.
    ///
    /// The ledger, segment log, project total and milestone pointer are reset
    /// and the project is deactivated before the first refund transfer is
    /// issued. If any transfer fails the call returns `TransferFailure` and
    /// the whole cancellation is reverted.
    pub fn stop_project(env: Env, caller: Address, project_id: u64) -> Result<(), Error> {
        caller.require_auth();

        let config = storage::load_project_config(&env, project_id)?;
        if caller != config.creator {
            return Err(Error::NotAuthorized);
        }
        let mut state = storage::load_project_state(&env, project_id)?;
        if !state.is_active {
            return Err(Error::ProjectInactive);
        }
        let vault = ValueTransfer::load(&env)?;

        let funders = storage::load_funders(&env, project_id)?;
        let owed = ledger::refunds(&env, &funders);
        let refunded_total = ledger::total(&owed);

        state.total_funded = 0;
        state.current_milestone = 0;
        state.is_active = false;
        storage::save_project_state(&env, project_id, &state);
        storage::save_funders(&env, project_id, &Map::new(&env));
        storage::save_milestone_funders(&env, project_id, &Vec::new(&env));

        for (funder, amount) in owed.iter() {
            vault.send(&funder, amount)?;
            events::emit_refund_issued(&env, project_id, funder, amount);
        }

        log!(
            &env,
            "escrow project stopped: id={}, refunded={}, funders={}",
            project_id,
            refunded_total,
            owed.len()
        );
        events::emit_project_stopped(&env, project_id, refunded_total, owed.len());
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Activity flag, index, escrowed total and milestone pointer of a project.
    pub fn get_project_info(env: Env, project_id: u64) -> Result<ProjectInfo, Error> {
        let state = storage::load_project_state(&env, project_id)?;
        Ok(ProjectInfo {
            is_active: state.is_active,
            index: project_id,
            total_funded: state.total_funded,
            current_milestone: state.current_milestone,
        })
    }

    /// Funders of the milestone currently being funded, in contribution order.
    /// A funder appears once per contribution.
    pub fn get_current_milestone_funders(env: Env, project_id: u64) -> Result<Vec<Address>, Error> {
        storage::load_milestone_funders(&env, project_id)
    }

    /// Every milestone of a project, in goal order.
    pub fn get_all_milestones_info(env: Env, project_id: u64) -> Result<Vec<Milestone>, Error> {
        storage::load_milestones(&env, project_id)
    }

    /// Retrieve the full project record.
    pub fn get_project(env: Env, project_id: u64) -> Result<Project, Error> {
        storage::load_project(&env, project_id)
    }

    /// Cumulative amount `funder` has in escrow for a project.
    pub fn get_contribution(env: Env, project_id: u64, funder: Address) -> Result<i128, Error> {
        let funders = storage::load_funders(&env, project_id)?;
        Ok(ledger::balance_of(&funders, &funder))
    }

    /// Number of projects registered so far.
    pub fn project_count(env: Env) -> u64 {
        storage::project_count(&env)
    }

    /// The token every project is funded in.
    pub fn token(env: Env) -> Result<Address, Error> {
        storage::get_token(&env)
    }

    /// The address that initialised the escrow.
    pub fn admin(env: Env) -> Result<Address, Error> {
        storage::get_admin(&env)
    }
}
