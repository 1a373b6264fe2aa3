//! In-memory notifier for development and tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

use super::template::render;
use super::{EmailMessage, Notifier, NotifyError};

/// Messages kept by [`LocalNotifier::new`]. Older ones are dropped.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 100;

/// A message as it would have been delivered.
#[derive(Debug, Clone)]
pub struct DeliveredEmail {
    pub message: EmailMessage,
    pub html: String,
}

/// Renders each message and keeps the most recent ones in a bounded outbox.
#[derive(Clone)]
pub struct LocalNotifier {
    outbox: Arc<RwLock<VecDeque<DeliveredEmail>>>,
    capacity: usize,
}

impl LocalNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_OUTBOX_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            outbox: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Retained messages, oldest first.
    pub fn sent(&self) -> Vec<DeliveredEmail> {
        self.outbox.read().iter().cloned().collect()
    }

    pub fn sent_count(&self) -> usize {
        self.outbox.read().len()
    }
}

impl Default for LocalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for LocalNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifyError> {
        let html = render(&message.template, &message.data)?;
        log::info!(
            "Email to {} queued locally: {} ({} numbers)",
            message.recipient,
            message.subject,
            message.data.predicted_numbers.len()
        );
        let mut outbox = self.outbox.write();
        if outbox.len() == self.capacity {
            outbox.pop_front();
        }
        outbox.push_back(DeliveredEmail { message, html });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{TemplateData, PREDICTION_TEMPLATE};

    fn message(template: &str) -> EmailMessage {
        EmailMessage {
            recipient: "ops@example.com".to_string(),
            subject: "Test".to_string(),
            template: template.to_string(),
            data: TemplateData {
                draw: "Midweek".to_string(),
                date: "2024-01-03".to_string(),
                predicted_numbers: vec![1, 2, 3],
                accuracy: "0.00".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_records_rendered_mail() {
        let notifier = LocalNotifier::new();
        notifier.send(message(PREDICTION_TEMPLATE)).await.unwrap();
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].html.contains("Midweek"));
    }

    #[tokio::test]
    async fn test_outbox_keeps_only_the_newest() {
        let notifier = LocalNotifier::with_capacity(2);
        for subject in ["first", "second", "third"] {
            let mut msg = message(PREDICTION_TEMPLATE);
            msg.subject = subject.to_string();
            notifier.send(msg).await.unwrap();
        }
        let subjects: Vec<String> = notifier
            .sent()
            .into_iter()
            .map(|d| d.message.subject)
            .collect();
        assert_eq!(subjects, vec!["second", "third"]);
    }

    #[tokio::test]
    async fn test_template_failure_is_not_recorded() {
        let notifier = LocalNotifier::new();
        assert!(notifier.send(message("missing")).await.is_err());
        assert_eq!(notifier.sent_count(), 0);
    }
}
