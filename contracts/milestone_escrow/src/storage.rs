//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by the escrow:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key            | Type      | Description                         |
//! |----------------|-----------|-------------------------------------|
//! | `Admin`        | `Address` | Address that bootstrapped the escrow|
//! | `Token`        | `Address` | The single funding asset            |
//! | `ProjectCount` | `u64`     | Auto-increment project index        |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                    | Type                 | Description                     |
//! |------------------------|----------------------|---------------------------------|
//! | `ProjConfig(id)`       | `ProjectConfig`      | Immutable project configuration |
//! | `Milestones(id)`       | `Vec<Milestone>`     | Append-only milestone sequence  |
//! | `ProjState(id)`        | `ProjectState`       | Mutable funding state           |
//! | `Funders(id)`          | `Map<Address, i128>` | Cumulative contribution ledger  |
//! | `MilestoneFunders(id)` | `Vec<Address>`       | Current milestone segment log   |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//!
//! Funding calls write `ProjState`, `Funders` and `MilestoneFunders` only; the
//! config and milestone entries are read-only after creation (milestones are
//! rewritten only by `add_new_milestones`).

use soroban_sdk::{contracttype, Address, Env, Map, Vec};

use crate::types::{Milestone, Project, ProjectConfig, ProjectState};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Bootstrap admin (Instance).
    Admin,
    /// Funding token contract (Instance).
    Token,
    /// Global auto-increment counter for project indexes (Instance).
    ProjectCount,
    /// Immutable project configuration keyed by index (Persistent).
    ProjConfig(u64),
    /// Milestone sequence keyed by index (Persistent).
    Milestones(u64),
    /// Mutable funding state keyed by index (Persistent).
    ProjState(u64),
    /// Funder ledger keyed by index (Persistent).
    Funders(u64),
    /// Funders of the current milestone segment keyed by index (Persistent).
    MilestoneFunders(u64),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Token)
}

pub fn set_config(env: &Env, admin: &Address, token: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
    env.storage().instance().set(&DataKey::Token, token);
    bump_instance(env);
}

/// Retrieve the funding token, or `NotInitialized` before `init`.
pub fn get_token(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(Error::NotInitialized)
}

/// Retrieve the address that initialised the escrow.
pub fn get_admin(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

pub fn project_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::ProjectCount)
        .unwrap_or(0)
}

/// Reads, increments, and stores the project counter.
/// Returns the index to use for the *current* project (pre-increment value).
pub fn get_and_increment_project_id(env: &Env) -> u64 {
    bump_instance(env);
    let current = project_count(env);
    env.storage()
        .instance()
        .set(&DataKey::ProjectCount, &(current + 1));
    current
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn load<V>(env: &Env, key: DataKey) -> Result<V, Error>
where
    V: soroban_sdk::TryFromVal<Env, soroban_sdk::Val>,
{
    let value = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::UnknownProject)?;
    bump_persistent(env, &key);
    Ok(value)
}

fn store<V>(env: &Env, key: DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(&key, value);
    bump_persistent(env, &key);
}

/// Write every entry of a freshly created project.
pub fn save_new_project(env: &Env, config: &ProjectConfig, milestones: &Vec<Milestone>) {
    let id = config.id;
    store(env, DataKey::ProjConfig(id), config);
    store(env, DataKey::Milestones(id), milestones);
    store(env, DataKey::ProjState(id), &ProjectState::new());
    store(env, DataKey::Funders(id), &Map::<Address, i128>::new(env));
    store(env, DataKey::MilestoneFunders(id), &Vec::<Address>::new(env));
}

pub fn load_project_config(env: &Env, id: u64) -> Result<ProjectConfig, Error> {
    load(env, DataKey::ProjConfig(id))
}

pub fn load_milestones(env: &Env, id: u64) -> Result<Vec<Milestone>, Error> {
    load(env, DataKey::Milestones(id))
}

pub fn save_milestones(env: &Env, id: u64, milestones: &Vec<Milestone>) {
    store(env, DataKey::Milestones(id), milestones);
}

pub fn load_project_state(env: &Env, id: u64) -> Result<ProjectState, Error> {
    load(env, DataKey::ProjState(id))
}

pub fn save_project_state(env: &Env, id: u64, state: &ProjectState) {
    store(env, DataKey::ProjState(id), state);
}

pub fn load_funders(env: &Env, id: u64) -> Result<Map<Address, i128>, Error> {
    load(env, DataKey::Funders(id))
}

pub fn save_funders(env: &Env, id: u64, funders: &Map<Address, i128>) {
    store(env, DataKey::Funders(id), funders);
}

pub fn load_milestone_funders(env: &Env, id: u64) -> Result<Vec<Address>, Error> {
    load(env, DataKey::MilestoneFunders(id))
}

pub fn save_milestone_funders(env: &Env, id: u64, funders: &Vec<Address>) {
    store(env, DataKey::MilestoneFunders(id), funders);
}

/// Load the full `Project` by combining config, milestones and state.
pub fn load_project(env: &Env, id: u64) -> Result<Project, Error> {
    let config = load_project_config(env, id)?;
    let milestones = load_milestones(env, id)?;
    let state = load_project_state(env, id)?;
    Ok(Project {
        id: config.id,
        creator: config.creator,
        title: config.title,
        image_ref: config.image_ref,
        description: config.description,
        milestones,
        total_funded: state.total_funded,
        current_milestone: state.current_milestone,
        is_active: state.is_active,
    })
}
