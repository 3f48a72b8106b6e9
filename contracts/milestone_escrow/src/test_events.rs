extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events, IssuerFlags},
    token, vec, Address, Env, IntoVal, String, Symbol, TryFromVal, TryIntoVal, Val, Vec,
};

use crate::events::{
    FundsReleased, MilestoneReached, MilestonesAdded, ProjectCreated, ProjectFunded,
    ProjectStopped, RefundIssued,
};
use crate::{Milestone, MilestoneEscrow, MilestoneEscrowClient};

fn setup() -> (Env, MilestoneEscrowClient<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(MilestoneEscrow, ());
    let client = MilestoneEscrowClient::new(&env, &contract_id);

    let token_admin = Address::generate(&env);
    let token = env.register_stellar_asset_contract_v2(token_admin).address();
    client.init(&Address::generate(&env), &token);
    (env, client, token)
}

fn create_project(
    env: &Env,
    client: &MilestoneEscrowClient,
    creator: &Address,
    goals: &[i128],
) -> u64 {
    let mut milestones = Vec::new(env);
    for goal in goals {
        milestones.push_back(Milestone {
            goal: *goal,
            deadline: env.ledger().timestamp() + 86_400,
        });
    }
    let text = String::from_str(env, "Solar panels");
    client.create_project(creator, &text, &text, &text, &milestones)
}

fn funded_donor(env: &Env, token: &Address, balance: i128) -> Address {
    let donor = Address::generate(env);
    token::StellarAssetClient::new(env, token).mint(&donor, &balance);
    donor
}

/// Contract events published under `topic`, oldest first, as raw data values.
fn events_with_topic(
    env: &Env,
    client: &MilestoneEscrowClient,
    topic: Symbol,
) -> std::vec::Vec<(Vec<Val>, Val)> {
    env.events()
        .all()
        .iter()
        .filter(|(contract, topics, _)| {
            *contract == client.address
                && topics
                    .get(0)
                    .and_then(|t| Symbol::try_from_val(env, &t).ok())
                    .map(|s| s == topic)
                    .unwrap_or(false)
        })
        .map(|(_, topics, data)| (topics, data))
        .collect()
}

#[test]
fn test_project_created_event() {
    let (env, client, _) = setup();
    let creator = Address::generate(&env);
    let project_id = create_project(&env, &client, &creator, &[100, 200]);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("created").into_val(&env),
        project_id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ProjectCreated = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ProjectCreated {
            project_id,
            creator,
            milestone_count: 2,
            cap: 200,
        }
    );
}

#[test]
fn test_project_funded_event_reports_running_total() {
    let (env, client, token) = setup();
    let creator = Address::generate(&env);
    let project_id = create_project(&env, &client, &creator, &[100, 200]);
    let first = funded_donor(&env, &token, 1_000);
    let second = funded_donor(&env, &token, 1_000);

    client.fund_project(&project_id, &first, &10);
    client.fund_project(&project_id, &second, &15);

    let funded = events_with_topic(&env, &client, symbol_short!("funded"));
    let (topics, data) = funded.last().cloned().expect("No funded event");
    assert_eq!(
        topics,
        vec![
            &env,
            symbol_short!("funded").into_val(&env),
            project_id.into_val(&env),
        ]
    );
    let event_data: ProjectFunded = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ProjectFunded {
            project_id,
            funder: second,
            amount: 15,
            accepted: 15,
            total_funded: 25,
            current_milestone_total_funded: 25,
        }
    );
}

#[test]
fn test_overshoot_emits_milestone_and_release() {
    let (env, client, token) = setup();
    let creator = Address::generate(&env);
    let project_id = create_project(&env, &client, &creator, &[100, 200]);
    let donor = funded_donor(&env, &token, 1_000);

    client.fund_project(&project_id, &donor, &25);
    client.fund_project(&project_id, &donor, &200);

    let funded = events_with_topic(&env, &client, symbol_short!("funded"));
    let last: ProjectFunded = funded
        .last()
        .expect("No funded event")
        .1
        .try_into_val(&env)
        .unwrap();
    assert_eq!(last.amount, 200);
    assert_eq!(last.accepted, 175);
    assert_eq!(last.total_funded, 200);
    assert_eq!(last.current_milestone_total_funded, 200);

    let reached = events_with_topic(&env, &client, symbol_short!("milestone"));
    assert_eq!(reached.len(), 1);
    let reached: MilestoneReached = reached[0].1.try_into_val(&env).unwrap();
    assert_eq!(
        reached,
        MilestoneReached {
            project_id,
            milestone_index: 1,
            total_funded: 200,
        }
    );

    let released = events_with_topic(&env, &client, symbol_short!("released"));
    assert_eq!(released.len(), 1);
    let released: FundsReleased = released[0].1.try_into_val(&env).unwrap();
    assert_eq!(
        released,
        FundsReleased {
            project_id,
            creator,
            amount: 200,
        }
    );
}

#[test]
fn test_milestones_added_event() {
    let (env, client, _) = setup();
    let creator = Address::generate(&env);
    let project_id = create_project(&env, &client, &creator, &[100, 200]);

    let extra = vec![
        &env,
        Milestone {
            goal: 300,
            deadline: env.ledger().timestamp() + 86_400,
        },
    ];
    client.add_new_milestones(&creator, &project_id, &extra);

    let added = events_with_topic(&env, &client, symbol_short!("extended"));
    assert_eq!(added.len(), 1);
    let added: MilestonesAdded = added[0].1.try_into_val(&env).unwrap();
    assert_eq!(
        added,
        MilestonesAdded {
            project_id,
            added: 1,
            milestone_count: 3,
            cap: 300,
        }
    );
}

#[test]
fn test_stop_emits_refunds_then_stopped() {
    let (env, client, token) = setup();
    let creator = Address::generate(&env);
    let project_id = create_project(&env, &client, &creator, &[100, 200]);
    let first = funded_donor(&env, &token, 1_000);
    let second = funded_donor(&env, &token, 1_000);

    client.fund_project(&project_id, &first, &50);
    client.fund_project(&project_id, &second, &20);
    client.fund_project(&project_id, &first, &5);
    client.stop_project(&creator, &project_id);

    let refunds: std::vec::Vec<RefundIssued> =
        events_with_topic(&env, &client, symbol_short!("refunded"))
            .into_iter()
            .map(|(_, data)| data.try_into_val(&env).unwrap())
            .collect();
    assert_eq!(refunds.len(), 2);
    let refunded_first = refunds.iter().find(|r| r.funder == first).map(|r| r.amount);
    let refunded_second = refunds.iter().find(|r| r.funder == second).map(|r| r.amount);
    assert_eq!(refunded_first, Some(55));
    assert_eq!(refunded_second, Some(20));

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    assert_eq!(last_event.0, client.address);
    let stopped: ProjectStopped = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        stopped,
        ProjectStopped {
            project_id,
            refunded_total: 75,
            funder_count: 2,
        }
    );
}

#[test]
fn test_failed_call_emits_nothing() {
    let (env, client, token) = setup();
    let creator = Address::generate(&env);
    let project_id = create_project(&env, &client, &creator, &[100]);
    let donor = funded_donor(&env, &token, 1_000);

    let _ = client.try_fund_project(&project_id, &donor, &0);
    assert!(events_with_topic(&env, &client, symbol_short!("funded")).is_empty());
}

#[test]
fn test_failed_refund_emits_no_cancellation_events() {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(MilestoneEscrow, ());
    let client = MilestoneEscrowClient::new(&env, &contract_id);
    let asset = env.register_stellar_asset_contract_v2(Address::generate(&env));
    asset.issuer().set_flag(IssuerFlags::RevocableFlag);
    let token = asset.address();
    client.init(&Address::generate(&env), &token);

    let creator = Address::generate(&env);
    let project_id = create_project(&env, &client, &creator, &[100, 200]);
    let first = funded_donor(&env, &token, 1_000);
    let second = funded_donor(&env, &token, 1_000);
    client.fund_project(&project_id, &first, &30);
    client.fund_project(&project_id, &second, &40);
    token::StellarAssetClient::new(&env, &token).set_authorized(&second, &false);

    assert!(client.try_stop_project(&creator, &project_id).is_err());
    assert!(events_with_topic(&env, &client, symbol_short!("refunded")).is_empty());
    assert!(events_with_topic(&env, &client, symbol_short!("stopped")).is_empty());
}
