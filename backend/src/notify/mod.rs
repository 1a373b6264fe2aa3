//! Email notifications.
//!
//! A [`Notifier`] renders an [`EmailMessage`] through the template renderer
//! and delivers it. [`LocalNotifier`] keeps delivered mail in memory;
//! [`RelayNotifier`] hands it to an HTTP mail relay.

pub mod local;
pub mod relay;
pub mod template;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{BatchSummary, Prediction, WEEKLY_SUMMARY_DRAW};

pub use local::LocalNotifier;
pub use relay::RelayNotifier;
pub use template::PREDICTION_TEMPLATE;

/// Errors returned by notifiers.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Template error: {0}")]
    Template(String),
    #[error("Relay request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Values substituted into a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateData {
    pub draw: String,
    pub date: String,
    pub predicted_numbers: Vec<u32>,
    pub accuracy: String,
}

/// An email waiting to be rendered and sent.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub recipient: String,
    pub subject: String,
    pub template: String,
    pub data: TemplateData,
}

impl EmailMessage {
    /// Notification for a freshly made prediction.
    pub fn for_prediction(recipient: impl Into<String>, prediction: &Prediction) -> Self {
        Self {
            recipient: recipient.into(),
            subject: format!("New Lottery Prediction for {}", prediction.draw),
            template: PREDICTION_TEMPLATE.to_string(),
            data: TemplateData {
                draw: prediction.draw.clone(),
                date: prediction.date.clone(),
                predicted_numbers: prediction.predicted_numbers.clone(),
                accuracy: prediction.accuracy.to_string(),
            },
        }
    }

    /// Weekly roll-up sent after a batch is flushed.
    pub fn weekly_summary(
        recipient: impl Into<String>,
        date: impl Into<String>,
        summary: &BatchSummary,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: "Weekly Prediction Summary".to_string(),
            template: PREDICTION_TEMPLATE.to_string(),
            data: TemplateData {
                draw: WEEKLY_SUMMARY_DRAW.to_string(),
                date: date.into(),
                predicted_numbers: summary.numbers.clone(),
                accuracy: summary.formatted_accuracy(),
            },
        }
    }
}

/// Delivers rendered email.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifyError>;
}

/// Which notifier backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifierType {
    #[default]
    Local,
    Relay,
}

impl FromStr for NotifierType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "relay" | "http" => Ok(Self::Relay),
            _ => Err(format!("Unknown notifier type: {}", s)),
        }
    }
}
