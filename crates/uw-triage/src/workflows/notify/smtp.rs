use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::config::SmtpSettings;

use super::{MailTransport, OutboundEmail, TransportFailure};

/// STARTTLS relay with login credentials.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, TransportFailure> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|err| TransportFailure::Delivery(err.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self { transport })
    }
}

fn mailbox(raw: &str) -> Result<Mailbox, TransportFailure> {
    raw.parse()
        .map_err(|_| TransportFailure::Address(raw.to_string()))
}

pub(crate) fn build_message(email: &OutboundEmail) -> Result<Message, TransportFailure> {
    Message::builder()
        .from(mailbox(&email.from)?)
        .to(mailbox(&email.to)?)
        .subject(email.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            email.plain.clone(),
            email.html.clone(),
        ))
        .map_err(|err| TransportFailure::Message(err.to_string()))
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, messages: &[OutboundEmail]) -> Result<(), TransportFailure> {
        for email in messages {
            let message = build_message(email)?;
            self.transport
                .send(message)
                .await
                .map_err(|err| TransportFailure::Delivery(err.to_string()))?;
            debug!(to = %email.to, subject = %email.subject, "smtp accepted message");
        }
        Ok(())
    }
}
