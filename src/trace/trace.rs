use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    edit::applicator::{ApplyOutcome, RecordOutcome},
    watch::watcher::PassTrigger,
};

/// One JSONL line: the fate of one record in one locate-and-apply pass.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub pass: u64,
    pub trigger: PassTrigger,

    pub edit_id: String,
    pub outcome: ApplyOutcome,

    pub tier: Option<String>,
    pub score: Option<u32>,
    pub percentage: Option<f64>,
}

impl TraceEvent {
    pub fn now(pass: u64, trigger: PassTrigger, outcome: &RecordOutcome) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            pass,
            trigger,
            edit_id: outcome.edit_id.clone(),
            outcome: outcome.outcome,
            tier: outcome.tier.map(|t| t.to_string()),
            score: outcome.score.map(|s| s.score),
            percentage: outcome.score.map(|s| s.percentage),
        }
    }
}
