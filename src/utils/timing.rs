use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::info;

/// Timing record for one CLI operation, mirrored into the dedicated
/// `studio.timing` log target.
#[derive(Debug)]
pub struct OperationTimer {
    operation: String,
    detail: Option<String>,
    started_at: DateTime<Utc>,
    started_perf: Instant,
    status: String,
    completed: bool,
}

impl OperationTimer {
    pub fn start(operation: &str, detail: Option<String>) -> Self {
        let timer = OperationTimer {
            operation: operation.to_string(),
            detail,
            started_at: Utc::now(),
            started_perf: Instant::now(),
            status: "success".to_string(),
            completed: false,
        };
        info!(
            target: "studio.timing",
            "event=operation_started operation={} started_at={} detail={:?}",
            timer.operation,
            timer.started_at.to_rfc3339(),
            timer.detail
        );
        timer
    }

    pub fn mark_status(&mut self, status: &str, detail: Option<String>) {
        self.status = status.to_string();
        if detail.is_some() {
            self.detail = detail;
        }
    }

    pub fn log_completed(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;
        let duration = self.started_perf.elapsed().as_secs_f64();
        info!(
            target: "studio.timing",
            "event=operation_completed operation={} status={} duration_seconds={:.3} detail={:?}",
            self.operation,
            self.status,
            duration,
            self.detail
        );
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        self.log_completed();
    }
}
