//! Tier digests and broker letters. Delivery is best-effort: every outcome, including a missing
//! transport or an SMTP failure, comes back as a [`DispatchReport`] rather than an error.

pub mod smtp;
mod templates;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::MailConfig;
use crate::workflows::dataset::Property;
use crate::workflows::triage::predictions::prediction_record;
use crate::workflows::triage::PropensityTier;

pub use smtp::SmtpMailer;

const NOT_CONFIGURED: &str = "SMTP not configured; set SMTP_HOST, SMTP_USER, SMTP_PASS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub plain: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportFailure {
    #[error("invalid mailbox: {0}")]
    Address(String),
    #[error("could not build message: {0}")]
    Message(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Delivers the batch in order, stopping at the first failure.
    async fn send(&self, messages: &[OutboundEmail]) -> Result<(), TransportFailure>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Sent,
    Skipped,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterKind {
    Intent,
    NonInterest,
}

/// Live submission codes grouped by reference propensity tier. Every tier is present.
pub type TierGroups = BTreeMap<PropensityTier, Vec<String>>;

pub fn tier_groups(properties: &[Property]) -> TierGroups {
    let mut groups: TierGroups = PropensityTier::all()
        .into_iter()
        .map(|tier| (tier, Vec::new()))
        .collect();

    for property in properties {
        let tier = prediction_record(property.index).tier();
        groups
            .entry(tier)
            .or_default()
            .push(property.submission_id.clone());
    }

    groups
}

pub fn tier_counts(groups: &TierGroups) -> BTreeMap<PropensityTier, usize> {
    groups
        .iter()
        .map(|(tier, codes)| (*tier, codes.len()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReport {
    pub status: DispatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiers: Option<BTreeMap<PropensityTier, usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl DispatchReport {
    fn new(status: DispatchStatus) -> Self {
        Self {
            status,
            reason: None,
            tiers: None,
            recipient: None,
        }
    }

    fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

pub struct NotificationDispatcher {
    transport: Option<Arc<dyn MailTransport>>,
    sender: String,
    team_email: String,
    base_url: String,
}

impl NotificationDispatcher {
    pub fn new(config: &MailConfig, transport: Option<Arc<dyn MailTransport>>) -> Self {
        Self {
            transport,
            sender: config.sender.clone(),
            team_email: config.team_email.clone(),
            base_url: config.base_url.clone(),
        }
    }

    /// Uses SMTP when credentials are configured; a relay that can't be set up is logged and
    /// treated as unconfigured.
    pub fn from_config(config: &MailConfig) -> Self {
        let transport = config.smtp.as_ref().and_then(|settings| {
            match SmtpMailer::new(settings) {
                Ok(mailer) => Some(Arc::new(mailer) as Arc<dyn MailTransport>),
                Err(err) => {
                    warn!(host = %settings.host, error = %err, "smtp relay unavailable");
                    None
                }
            }
        });
        Self::new(config, transport)
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// One digest per non-empty tier, all addressed to the team inbox.
    pub async fn send_digests(&self, groups: &TierGroups, day: NaiveDate) -> DispatchReport {
        let counts = tier_counts(groups);
        let messages: Vec<OutboundEmail> = groups
            .iter()
            .filter(|(_, codes)| !codes.is_empty())
            .map(|(tier, codes)| {
                let rendered =
                    templates::digest(*tier, codes, day, &self.sender, &self.base_url);
                self.envelope(self.team_email.clone(), rendered)
            })
            .collect();

        let mut report = self.deliver(&messages, "tier digests").await;
        report.tiers = Some(counts);
        report
    }

    pub async fn send_letter(
        &self,
        kind: LetterKind,
        property: &Property,
        broker_email: Option<String>,
        day: NaiveDate,
    ) -> DispatchReport {
        let recipient = broker_email
            .filter(|email| !email.trim().is_empty())
            .unwrap_or_else(|| self.team_email.clone());
        let rendered = templates::broker_letter(kind, property, day, &self.sender);
        let message = self.envelope(recipient.clone(), rendered);

        let mut report = self.deliver(std::slice::from_ref(&message), "broker letter").await;
        report.recipient = Some(recipient);
        report
    }

    fn envelope(&self, to: String, rendered: templates::Rendered) -> OutboundEmail {
        OutboundEmail {
            from: self.sender.clone(),
            to,
            subject: rendered.subject,
            plain: rendered.plain,
            html: rendered.html,
        }
    }

    async fn deliver(&self, messages: &[OutboundEmail], what: &str) -> DispatchReport {
        let Some(transport) = &self.transport else {
            info!(what, "mail transport not configured; skipping send");
            return DispatchReport::new(DispatchStatus::Skipped).with_reason(NOT_CONFIGURED);
        };

        match transport.send(messages).await {
            Ok(()) => {
                info!(what, count = messages.len(), "mail sent");
                DispatchReport::new(DispatchStatus::Sent)
            }
            Err(err) => {
                warn!(what, error = %err, "mail delivery failed");
                DispatchReport::new(DispatchStatus::Error).with_reason(err.to_string())
            }
        }
    }
}
