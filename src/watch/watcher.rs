use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::watch::scheduler::{Coalescer, Interval, TaskHandle};

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_INTERVAL_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationKind {
    ChildList,
    Attributes,
    CharacterData,
}

/// One observed DOM mutation, as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationRecord {
    #[serde(rename = "type")]
    pub kind: MutationKind,
    #[serde(default)]
    pub added_nodes: usize,
    #[serde(default)]
    pub removed_nodes: usize,
}

impl MutationRecord {
    pub fn child_list(added_nodes: usize, removed_nodes: usize) -> Self {
        Self {
            kind: MutationKind::ChildList,
            added_nodes,
            removed_nodes,
        }
    }

    /// Only structural changes can move or replace edited elements.
    pub fn is_structural(&self) -> bool {
        self.kind == MutationKind::ChildList && (self.added_nodes > 0 || self.removed_nodes > 0)
    }
}

/// Why a locate-and-apply pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassTrigger {
    Load,
    Mutation,
    Periodic,
}

impl std::fmt::Display for PassTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PassTrigger::Load => "load",
            PassTrigger::Mutation => "mutation",
            PassTrigger::Periodic => "periodic",
        };
        f.write_str(name)
    }
}

/// Decides when the page should be re-scanned: a debounced pass after
/// structural mutations and a periodic safety-net pass while visible.
/// A busy flag keeps passes from overlapping.
#[derive(Debug)]
pub struct MutationWatcher {
    debounce: Coalescer<PassTrigger>,
    periodic: Interval,
    busy: bool,
}

impl MutationWatcher {
    pub fn new(debounce_ms: u64, interval_ms: u64, now_ms: u64) -> Self {
        Self {
            debounce: Coalescer::new(debounce_ms),
            periodic: Interval::new(interval_ms, now_ms),
            busy: false,
        }
    }

    /// Feeds a batch of mutations. Returns the debounce handle when the
    /// batch held a structural change.
    pub fn observe(&mut self, now_ms: u64, records: &[MutationRecord]) -> Option<TaskHandle> {
        if !records.iter().any(MutationRecord::is_structural) {
            return None;
        }
        debug!(count = records.len(), "structural mutation observed; debouncing pass");
        Some(self.debounce.schedule(now_ms, PassTrigger::Mutation))
    }

    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.debounce.cancel(handle)
    }

    /// The pass due at `now_ms`, if any. The periodic pass is skipped while
    /// the page is hidden; a debounced pass still runs.
    pub fn due(&mut self, now_ms: u64, visible: bool) -> Option<PassTrigger> {
        if self.busy {
            return None;
        }
        if let Some(trigger) = self.debounce.poll(now_ms) {
            return Some(trigger);
        }
        if self.periodic.poll(now_ms) && visible {
            return Some(PassTrigger::Periodic);
        }
        None
    }

    /// Marks a pass as running. False when one already is.
    pub fn begin_pass(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    pub fn end_pass(&mut self) {
        self.busy = false;
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn has_pending_mutation_pass(&self) -> bool {
        self.debounce.is_pending()
    }
}

impl Default for MutationWatcher {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS, DEFAULT_INTERVAL_MS, 0)
    }
}
