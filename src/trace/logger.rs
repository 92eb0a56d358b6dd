use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::{
    edit::applicator::ApplyReport,
    trace::trace::TraceEvent,
    watch::watcher::PassTrigger,
};

/// Pass trace sink. Each pass becomes one JSONL line per record, flushed
/// together. Write failures are reported through `tracing` and otherwise
/// swallowed so a broken trace file never stops a pass.
pub struct TraceLogger {
    sink: Option<Mutex<BufWriter<File>>>,
}

impl TraceLogger {
    pub fn new(path: &str) -> Self {
        let sink = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(Mutex::new(BufWriter::new(file))),
            Err(e) => {
                warn!(path, error = %e, "pass trace disabled");
                None
            }
        };
        Self { sink }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn from_path(path: Option<&str>) -> Self {
        path.map(Self::new).unwrap_or_else(Self::disabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Records the fate of every edit in one pass.
    pub fn log_pass(&self, pass: u64, trigger: PassTrigger, report: &ApplyReport) {
        let Some(sink) = &self.sink else {
            return;
        };
        let Ok(mut out) = sink.lock() else {
            warn!("pass trace lock poisoned");
            return;
        };

        for outcome in &report.outcomes {
            let event = TraceEvent::now(pass, trigger, outcome);
            let written = serde_json::to_writer(&mut *out, &event)
                .map_err(std::io::Error::from)
                .and_then(|()| out.write_all(b"\n"));
            if let Err(e) = written {
                warn!(pass, edit_id = %outcome.edit_id, error = %e, "could not write pass trace");
                return;
            }
        }

        match out.flush() {
            Ok(()) => debug!(pass, records = report.outcomes.len(), "pass traced"),
            Err(e) => warn!(pass, error = %e, "could not flush pass trace"),
        }
    }
}
