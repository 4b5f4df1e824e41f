use std::time::{Duration, Instant};

/// How a step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    /// The step is still running.
    Running,
    /// The remote call succeeded.
    Succeeded,
    /// The remote call failed and the sequence halted.
    Failed,
    /// The remote call failed but the step was marked best-effort.
    FailureIgnored,
    /// The step could not produce an outcome; a failed outcome was synthesized.
    Faulted,
}

impl StepStatus {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Running => "…",
            Self::Succeeded => "✓",
            Self::Failed => "✗",
            Self::FailureIgnored => "↷",
            Self::Faulted => "⚠",
        }
    }
}

/// Record of one executed step.
#[derive(Debug)]
pub struct StepRecord {
    /// Name of the step.
    pub name: String,
    /// How the step ended.
    pub status: StepStatus,
    /// When the step started executing.
    pub started_at: Instant,
    /// When the step returned.
    pub completed_at: Option<Instant>,
}

impl StepRecord {
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        self.completed_at
            .map(|done| done.saturating_duration_since(self.started_at))
    }
}

/// Timeline of a sequence run. Steps skipped by a halt have no record.
#[derive(Debug, Default)]
pub struct SequenceLog {
    records: Vec<StepRecord>,
}

impl SequenceLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_start(&mut self, name: &str) {
        self.records.push(StepRecord {
            name: name.to_string(),
            status: StepStatus::Running,
            started_at: Instant::now(),
            completed_at: None,
        });
    }

    pub(crate) fn record_completion(&mut self, status: StepStatus) {
        if let Some(record) = self.records.last_mut() {
            record.status = status;
            record.completed_at = Some(Instant::now());
        }
    }

    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            lines.push(format!("{} {}", record.status.symbol(), record.name));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_log_is_empty() {
        let log = SequenceLog::new();
        assert!(log.records().is_empty());
    }

    #[test]
    fn record_start_adds_running_step() {
        let mut log = SequenceLog::new();
        log.record_start("create_customer");

        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0].name, "create_customer");
        assert_eq!(log.records()[0].status, StepStatus::Running);
        assert!(log.records()[0].elapsed().is_none());
    }

    #[test]
    fn record_completion_updates_last_step() {
        let mut log = SequenceLog::new();
        log.record_start("authorize");
        log.record_completion(StepStatus::Succeeded);
        log.record_start("void");
        log.record_completion(StepStatus::FailureIgnored);

        assert_eq!(log.records()[0].status, StepStatus::Succeeded);
        assert_eq!(log.records()[1].status, StepStatus::FailureIgnored);
        assert!(log.records()[1].elapsed().is_some());
    }

    #[test]
    fn completion_without_start_is_ignored() {
        let mut log = SequenceLog::new();
        log.record_completion(StepStatus::Failed);

        assert!(log.records().is_empty());
    }

    #[test]
    fn summary_formats_all_steps() {
        let mut log = SequenceLog::new();
        log.record_start("create_order");
        log.record_completion(StepStatus::Succeeded);
        log.record_start("create_fulfillment");
        log.record_completion(StepStatus::Faulted);

        let summary = log.summary();
        assert!(summary.contains("✓ create_order"));
        assert!(summary.contains("⚠ create_fulfillment"));
    }
}
