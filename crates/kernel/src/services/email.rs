//! Outbound account notifications.
//!
//! [`Notifier`] is the seam between the account flows and email delivery.
//! [`SmtpNotifier`] delivers through lettre; [`LogNotifier`] is used when no
//! SMTP host is configured and only writes the message to the log.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::Config;

/// Sends account emails.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a verification code.
    async fn notify_verification(&self, email: &str, code: &str) -> Result<()>;

    /// Greet a user whose address has just been verified.
    async fn notify_welcome(&self, email: &str, username: &str) -> Result<()>;
}

/// Which notification to send from a detached task.
#[derive(Debug, Clone)]
pub enum Notification {
    Verification { email: String, code: String },
    Welcome { email: String, username: String },
}

/// Send `notification` in the background.
///
/// Delivery never blocks the caller; failures are logged and dropped.
pub fn dispatch(notifier: &Arc<dyn Notifier>, notification: Notification) {
    let notifier = Arc::clone(notifier);
    tokio::spawn(async move {
        let result = match &notification {
            Notification::Verification { email, code } => {
                notifier.notify_verification(email, code).await
            }
            Notification::Welcome { email, username } => {
                notifier.notify_welcome(email, username).await
            }
        };
        if let Err(e) = result {
            warn!(error = %e, ?notification, "failed to deliver notification");
        }
    });
}

/// Build the notifier described by `config`.
pub fn from_config(config: &Config) -> Result<Arc<dyn Notifier>> {
    let Some(host) = config.smtp_host.as_deref() else {
        info!("SMTP_HOST not set; notifications will be logged only");
        return Ok(Arc::new(LogNotifier));
    };

    Ok(Arc::new(SmtpNotifier::from_config(host, config)?))
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpEncryption {
    StartTls,
    Tls,
    /// Plaintext. Local relays only.
    None,
}

impl FromStr for SmtpEncryption {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starttls" => Ok(Self::StartTls),
            "tls" | "smtps" => Ok(Self::Tls),
            "none" => Ok(Self::None),
            other => anyhow::bail!("unknown SMTP_ENCRYPTION mode {other:?}"),
        }
    }
}

/// Account emails delivered through an SMTP relay.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpNotifier {
    /// Connect lazily to `host` using the SMTP settings in `config`.
    ///
    /// The sender address is checked here so a bad `SMTP_FROM_EMAIL` fails at
    /// startup rather than on every send.
    pub fn from_config(host: &str, config: &Config) -> Result<Self> {
        let encryption: SmtpEncryption = config.smtp_encryption.parse()?;
        let credentials = config
            .smtp_username
            .as_ref()
            .zip(config.smtp_password.as_ref())
            .map(|(user, pass)| Credentials::new(user.clone(), pass.clone()));

        let transport = relay(host, config.smtp_port, encryption, credentials)?;
        let from = &config.smtp_from_email;
        let sender = from
            .parse()
            .with_context(|| format!("SMTP_FROM_EMAIL {from:?} is not a mailbox"))?;

        Ok(Self { transport, sender })
    }

    fn message(&self, to: &str, subject: &str, body: String) -> Result<Message> {
        let recipient: Mailbox = to.parse().context("invalid recipient address")?;
        Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .context("failed to build email message")
    }

    async fn deliver(&self, message: Message) -> Result<()> {
        self.transport
            .send(message)
            .await
            .context("SMTP relay rejected the message")?;
        Ok(())
    }
}

fn relay(
    host: &str,
    port: u16,
    encryption: SmtpEncryption,
    credentials: Option<Credentials>,
) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
    type Transport = AsyncSmtpTransport<Tokio1Executor>;

    let builder = match encryption {
        SmtpEncryption::StartTls => Transport::starttls_relay(host)
            .with_context(|| format!("cannot use {host} as a STARTTLS relay"))?,
        SmtpEncryption::Tls => {
            Transport::relay(host).with_context(|| format!("cannot use {host} as a TLS relay"))?
        }
        SmtpEncryption::None => Transport::builder_dangerous(host),
    };

    let builder = builder.port(port);
    Ok(match credentials {
        Some(credentials) => builder.credentials(credentials).build(),
        None => builder.build(),
    })
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify_verification(&self, email: &str, code: &str) -> Result<()> {
        let message = self.message(
            email,
            "Verify your MenuMaster account",
            verification_body(code),
        )?;
        self.deliver(message).await?;
        info!(email = %email, "verification email sent");
        Ok(())
    }

    async fn notify_welcome(&self, email: &str, username: &str) -> Result<()> {
        let message = self.message(email, "Welcome to MenuMaster", welcome_body(username))?;
        self.deliver(message).await?;
        info!(email = %email, "welcome email sent");
        Ok(())
    }
}

/// Writes notifications to the log instead of sending them.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_verification(&self, email: &str, code: &str) -> Result<()> {
        info!(email = %email, code = %code, "verification code (SMTP disabled)");
        Ok(())
    }

    async fn notify_welcome(&self, email: &str, username: &str) -> Result<()> {
        info!(email = %email, username = %username, "welcome message (SMTP disabled)");
        Ok(())
    }
}

fn verification_body(code: &str) -> String {
    format!(
        "Your MenuMaster verification code is: {code}\n\n\
         The code expires shortly. If you did not create an account, \
         you can ignore this email."
    )
}

fn welcome_body(username: &str) -> String {
    format!(
        "Hi {username},\n\n\
         Your email address is verified and your MenuMaster account is ready.\n\
         You can now log in and start building your menus."
    )
}
