//! Outgoing mail seam. The default implementation writes messages to the log.

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: Mail) -> anyhow::Result<()>;
}

/// Logs each message instead of delivering it.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: Mail) -> anyhow::Result<()> {
        info!(to = %mail.to, subject = %mail.subject, body = %mail.body, "mail_sent");
        Ok(())
    }
}

/// Keeps sent messages in memory.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<Mail>>,
}

impl MemoryMailer {
    pub fn sent(&self) -> Vec<Mail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: Mail) -> anyhow::Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("mailbox poisoned"))?
            .push(mail);
        Ok(())
    }
}

pub fn verification_mail(to: &str, name: &str, link: &str, valid_hours: i64) -> Mail {
    Mail {
        to: to.to_string(),
        subject: "Verify your email address".into(),
        body: format!("Hi {name},\n\nPlease confirm your email address by opening:\n{link}\n\nThis link expires in {valid_hours} hours."),
    }
}

pub fn password_reset_mail(to: &str, name: &str, link: &str, valid_hours: i64) -> Mail {
    Mail {
        to: to.to_string(),
        subject: "Reset your password".into(),
        body: format!("Hi {name},\n\nA password reset was requested for your account. Open the link below to choose a new password:\n{link}\n\nThis link expires in {valid_hours} hour(s). If you did not request it, ignore this email."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_mailer_keeps_messages() {
        let m = MemoryMailer::default();
        m.send(verification_mail("a@b.com", "A", "http://x/verify?token=1", 24)).await.unwrap();
        let sent = m.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("token=1"));
    }
}
