//! Soroban RPC client — polls `getEvents` and decodes escrow events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC is unreachable, rate-limits
//!   us, or returns a soft error, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Malformed requests (`-32600`) and unknown methods (`-32601`) are hard
//!   errors and surface to the caller.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EscrowEvent, EventKind};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn is_hard(&self) -> bool {
        self.code == -32600 || self.code == -32601
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// Decoded topic list, one JSON string per topic.
    pub topic: Vec<String>,
    /// Decoded event payload.
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    /// Globally unique event id assigned by the RPC.
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

/// Doubling delay between retries, capped at [`MAX_BACKOFF_SECS`].
struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Backoff {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    async fn wait(&mut self) {
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

/// One page returned by [`fetch_events`].
#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of contract events, retrying transient failures.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive); ignored
///   when `cursor` is set.
/// * `cursor`       — opaque pagination cursor from a previous page.
/// * `limit`        — maximum number of events to return.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let mut backoff = Backoff::new();
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (retrying in {}s): {e}", backoff.secs);
                backoff.wait().await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (retrying in {}s)", backoff.secs);
            backoff.wait().await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;
        if let Some(err) = body.error {
            if err.is_hard() {
                return Err(IndexerError::EventParse(format!(
                    "RPC hard error {}: {}",
                    err.code, err.message
                )));
            }
            warn!(
                "RPC soft error {} (retrying in {}s): {}",
                err.code, backoff.secs, err.message
            );
            backoff.wait().await;
            continue;
        }

        let result = body
            .result
            .ok_or_else(|| IndexerError::EventParse("Empty result from getEvents".to_string()))?;

        debug!(
            events = result.events.len(),
            latest_ledger = ?result.latest_ledger,
            "fetched event page"
        );

        return Ok(EventPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    match cursor {
        Some(cur) => params["pagination"]["cursor"] = json!(cur),
        None => params["startLedger"] = json!(start_ledger),
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode raw RPC events into [`EscrowEvent`]s.
///
/// Events from failed contract calls are skipped; the contract reverted them.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<EscrowEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call.unwrap_or(true))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

/// Payload fields pulled out of one event.
#[derive(Debug, Default, PartialEq)]
struct Payload {
    actor: Option<String>,
    amount: Option<String>,
    total_funded: Option<String>,
    milestone_index: Option<i64>,
    milestone_count: Option<i64>,
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<EscrowEvent> {
    let kind = EventKind::from_topic(&extract_symbol(raw.topic.first()?));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);
    let project_id = raw.topic.get(1).map(|t| extract_u64_or_raw(t));
    let payload = decode_payload(&raw.value, kind);

    let event_id = raw.id.clone().unwrap_or_else(|| {
        format!(
            "{ledger}:{}:{}:{}:{}",
            raw.tx_hash.as_deref().unwrap_or("-"),
            kind.as_str(),
            project_id.as_deref().unwrap_or("-"),
            payload.actor.as_deref().unwrap_or("-"),
        )
    });

    Some(EscrowEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        project_id,
        actor: payload.actor,
        amount: payload.amount,
        total_funded: payload.total_funded,
        milestone_index: payload.milestone_index,
        milestone_count: payload.milestone_count,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// Pull apart the JSON `value` blob that Soroban returns for event data.
fn decode_payload(value: &Value, kind: EventKind) -> Payload {
    match kind {
        EventKind::ProjectCreated => Payload {
            actor: extract_field(value, &["creator"]),
            amount: extract_field(value, &["cap"]),
            milestone_count: extract_int(value, "milestone_count"),
            ..Payload::default()
        },
        EventKind::ProjectFunded => Payload {
            actor: extract_field(value, &["funder", "address"]),
            amount: extract_field(value, &["accepted", "amount"]),
            total_funded: extract_field(value, &["total_funded"]),
            ..Payload::default()
        },
        EventKind::MilestoneReached => Payload {
            total_funded: extract_field(value, &["total_funded"]),
            milestone_index: extract_int(value, "milestone_index"),
            ..Payload::default()
        },
        EventKind::FundsReleased => Payload {
            actor: extract_field(value, &["creator"]),
            amount: extract_field(value, &["amount"]),
            ..Payload::default()
        },
        EventKind::MilestonesAdded => Payload {
            amount: extract_field(value, &["cap"]),
            milestone_count: extract_int(value, "milestone_count"),
            ..Payload::default()
        },
        EventKind::RefundIssued => Payload {
            actor: extract_field(value, &["funder"]),
            amount: extract_field(value, &["amount"]),
            ..Payload::default()
        },
        EventKind::ProjectStopped => Payload {
            amount: extract_field(value, &["refunded_total"]),
            ..Payload::default()
        },
        EventKind::Unknown => Payload::default(),
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn extract_int(value: &Value, key: &str) -> Option<i64> {
    extract_field(value, &[key]).and_then(|s| s.parse().ok())
}

/// Extract a Soroban Symbol from the decoded topic string.
/// The RPC may return `{"type":"symbol","value":"created"}` or just the raw string.
fn extract_symbol(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v.get("value").and_then(|x| x.as_str()).map(String::from))
        .unwrap_or_else(|| raw.to_string())
}

/// Extract the project id from a topic entry that might be a JSON object or raw number/string.
fn extract_u64_or_raw(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        match v.get("value") {
            Some(Value::Number(n)) => return n.to_string(),
            Some(Value::String(s)) => return s.clone(),
            _ => {}
        }
    }
    raw.to_string()
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
