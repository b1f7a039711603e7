//! Fire-and-forget email about leave decisions.
//!
//! Sending happens on a spawned task; failures are logged and never reach the
//! caller whose decision triggered the email.

use anyhow::Result;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{info, warn};

use crate::config::SmtpConfig;
use crate::model::leave_request::LeaveRequest;

#[derive(Clone)]
struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

#[derive(Clone, Default)]
pub struct Notifier {
    mailer: Option<Mailer>,
}

/// Rendered email, independent of transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl LeaveEmail {
    pub fn decision(recipient_name: &str, recipient_email: &str, leave: &LeaveRequest) -> Self {
        let subject = format!("Your {} leave request was {}", leave.leave_type, leave.status);
        let comment = leave
            .manager_comment
            .as_deref()
            .map(|c| format!("\nComment: {c}"))
            .unwrap_or_default();
        let body = format!(
            "Hello {recipient_name},\n\n\
             Your {} leave request #{} from {} to {} ({} day(s)) was {}.{comment}\n",
            leave.leave_type, leave.id, leave.start_date, leave.end_date, leave.days, leave.status,
        );

        Self {
            to: recipient_email.to_string(),
            subject,
            body,
        }
    }
}

impl Notifier {
    /// Log-only notifier, used when SMTP is not configured.
    pub fn disabled() -> Self {
        Self { mailer: None }
    }

    pub fn from_config(smtp: Option<&SmtpConfig>) -> Result<Self> {
        let Some(smtp) = smtp else {
            info!("SMTP not configured, leave emails are disabled");
            return Ok(Self::disabled());
        };

        let builder = if smtp.tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
        }
        .port(smtp.port);

        let builder = match (&smtp.username, &smtp.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            mailer: Some(Mailer {
                transport: builder.build(),
                from: smtp.from.parse()?,
            }),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    /// Queue the email and return immediately.
    pub fn dispatch(&self, email: LeaveEmail) {
        let Some(mailer) = self.mailer.clone() else {
            info!(to = %email.to, subject = %email.subject, "Email disabled, skipping");
            return;
        };

        actix_web::rt::spawn(async move {
            if let Err(e) = send(&mailer, &email).await {
                warn!(error = %e, to = %email.to, "Failed to send leave email");
            }
        });
    }
}

async fn send(mailer: &Mailer, email: &LeaveEmail) -> Result<()> {
    let to: Mailbox = email.to.parse()?;
    let message = Message::builder()
        .from(mailer.from.clone())
        .to(to)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())?;

    mailer.transport.send(message).await?;
    info!(to = %email.to, "Leave email sent");
    Ok(())
}
