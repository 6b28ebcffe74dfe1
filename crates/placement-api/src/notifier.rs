//! OTP delivery.
//!
//! One [`Notifier`] is configured at startup. A failed send is an error for
//! the caller to report; nothing falls back to another channel.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Where a one-time code goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Recipient {
    Email(String),
    Phone(String),
}

impl Recipient {
    /// Normalize an email (trimmed, lowercase) or phone number (`+91` added
    /// when no country code is present).
    pub fn from_parts(email: Option<&str>, phone: Option<&str>) -> Option<Self> {
        if let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) {
            return Some(Recipient::Email(email.to_lowercase()));
        }
        let phone: String = phone?.chars().filter(|c| !c.is_whitespace()).collect();
        if phone.is_empty() {
            return None;
        }
        if phone.starts_with('+') {
            Some(Recipient::Phone(phone))
        } else {
            Some(Recipient::Phone(format!("+91{}", phone)))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Recipient::Email(s) | Recipient::Phone(s) => s,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_otp(&self, to: &Recipient, code: &str) -> Result<()>;
}

/// Writes codes to the log. Development only.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_otp(&self, to: &Recipient, code: &str) -> Result<()> {
        info!("OTP for {}: {}", to.as_str(), code);
        Ok(())
    }
}

/// Sends OTP emails through the Resend HTTP API.
pub struct ResendNotifier {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendNotifier {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send_otp(&self, to: &Recipient, code: &str) -> Result<()> {
        let Recipient::Email(email) = to else {
            bail!("SMS delivery is not configured");
        };

        let body = json!({
            "from": self.from,
            "to": [email],
            "subject": "Your verification code",
            "html": format!(
                "<p>Your verification code is <strong>{code}</strong>.</p>\
                 <p>It expires in 5 minutes.</p>"
            ),
        });

        self.client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Resend request failed")?
            .error_for_status()
            .context("Resend rejected the message")?;

        info!("OTP email sent to {}", email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_takes_precedence_and_is_normalized() {
        assert_eq!(
            Recipient::from_parts(Some("  Asha@Uni.EDU "), Some("98765")),
            Some(Recipient::Email("asha@uni.edu".into()))
        );
    }

    #[test]
    fn phone_without_country_code_gets_india_prefix() {
        assert_eq!(
            Recipient::from_parts(None, Some("98765 43210")),
            Some(Recipient::Phone("+919876543210".into()))
        );
        assert_eq!(
            Recipient::from_parts(None, Some("+14155550100")),
            Some(Recipient::Phone("+14155550100".into()))
        );
        assert_eq!(Recipient::from_parts(Some(" "), None), None);
    }

    #[tokio::test]
    async fn resend_refuses_phone_numbers() {
        let notifier = ResendNotifier::new("key".into(), "Portal <noreply@example.com>".into());
        let err = notifier
            .send_otp(&Recipient::Phone("+911234567890".into()), "123456")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SMS"));
    }
}
