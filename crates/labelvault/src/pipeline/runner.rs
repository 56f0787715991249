use tracing::{error, info, info_span};

use crate::config::ArchiveConfig;

use super::outcome::{LabelFailure, RunReport};
use super::processor::LabelProcessor;
use super::Services;

/// Processes every configured label in order.
///
/// A label that fails is logged and recorded; the remaining labels still run.
pub fn run_all_labels(config: &ArchiveConfig, services: Services<'_>) -> RunReport {
    let _span = info_span!("run", simulation = config.simulation).entered();
    let processor = LabelProcessor::new(config, services);
    let mut report = RunReport::default();

    for label in &config.labels {
        match processor.process(label) {
            Ok(label_report) => report.labels.push(label_report),
            Err(e) => {
                error!("Failed to process label '{}': {}", label, e);
                report.failed_labels.push(LabelFailure {
                    label: label.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "Run complete: {} archived across {} labels, {} message failures, {} label failures",
        report.archived(),
        config.labels.len(),
        report.failed_messages(),
        report.failed_labels.len()
    );
    report
}
