//! Results of a run, per message, per label and overall.

/// What happened to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// PDF saved, conversation relabelled/archived as configured, record written.
    Archived {
        base_name: String,
        attachments_saved: usize,
    },
    /// Simulation mode: rendered but nothing was changed.
    Simulated { base_name: String },
    /// A record for this label and message already exists.
    SkippedProcessed,
    /// Unread-only mode and the message has been read.
    SkippedRead,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReport {
    pub message_id: String,
    pub outcome: MessageOutcome,
}

/// Aggregated outcomes for one label.
#[derive(Debug, Clone, Default)]
pub struct LabelReport {
    pub label: String,
    pub conversations: usize,
    pub messages: Vec<MessageReport>,
}

impl LabelReport {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn record(&mut self, message_id: &str, outcome: MessageOutcome) {
        self.messages.push(MessageReport {
            message_id: message_id.to_string(),
            outcome,
        });
    }

    pub fn archived(&self) -> usize {
        self.count(|o| matches!(o, MessageOutcome::Archived { .. }))
    }

    pub fn simulated(&self) -> usize {
        self.count(|o| matches!(o, MessageOutcome::Simulated { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                MessageOutcome::SkippedProcessed | MessageOutcome::SkippedRead
            )
        })
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, MessageOutcome::Failed { .. }))
    }

    /// Outcome recorded for a message id, if it was seen.
    pub fn outcome_of(&self, message_id: &str) -> Option<&MessageOutcome> {
        self.messages
            .iter()
            .find(|m| m.message_id == message_id)
            .map(|m| &m.outcome)
    }

    fn count(&self, pred: impl Fn(&MessageOutcome) -> bool) -> usize {
        self.messages.iter().filter(|m| pred(&m.outcome)).count()
    }
}

/// A label whose processing aborted before reaching its messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFailure {
    pub label: String,
    pub error: String,
}

/// Outcome of one run over every configured label.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub labels: Vec<LabelReport>,
    pub failed_labels: Vec<LabelFailure>,
}

impl RunReport {
    pub fn archived(&self) -> usize {
        self.labels.iter().map(LabelReport::archived).sum()
    }

    pub fn failed_messages(&self) -> usize {
        self.labels.iter().map(LabelReport::failed).sum()
    }

    pub fn label(&self, name: &str) -> Option<&LabelReport> {
        self.labels.iter().find(|l| l.label == name)
    }

    /// True when no label and no message failed.
    pub fn is_clean(&self) -> bool {
        self.failed_labels.is_empty() && self.failed_messages() == 0
    }
}
