//! Best-effort welcome message sent when an admin creates a user.
//!
//! Delivery runs on a spawned task; failures are logged and never reach the
//! request that created the user.

use engine::User;
use reqwest::{Client, StatusCode};
use serde::Serialize;

#[derive(Clone, Debug)]
pub enum WelcomeNotifier {
    /// Write the welcome to the log only.
    Log,
    /// POST the welcome as JSON to `url`.
    Webhook { client: Client, url: String },
}

#[derive(Debug, Serialize)]
struct Welcome {
    email: String,
    name: String,
    role: &'static str,
    subject: &'static str,
}

#[derive(Debug, thiserror::Error)]
enum NotifyError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("webhook answered {0}")]
    Rejected(StatusCode),
}

impl WelcomeNotifier {
    /// Webhook delivery when a URL is configured, log-only otherwise.
    pub fn from_webhook(url: Option<String>) -> Self {
        match url {
            Some(url) if !url.trim().is_empty() => Self::Webhook {
                client: Client::new(),
                url,
            },
            _ => Self::Log,
        }
    }

    /// Spawns delivery of the welcome for `user` and returns immediately.
    pub fn welcome(&self, user: &User) {
        let message = Welcome {
            email: user.email.clone(),
            name: user.full_name(),
            role: user.role.as_str(),
            subject: "Welcome to Haulage",
        };
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(err) = notifier.deliver(&message).await {
                tracing::warn!(email = %message.email, "welcome notification failed: {err}");
            }
        });
    }

    async fn deliver(&self, message: &Welcome) -> Result<(), NotifyError> {
        match self {
            Self::Log => {
                tracing::info!(email = %message.email, role = message.role, "welcome sent");
                Ok(())
            }
            Self::Webhook { client, url } => {
                let resp = client.post(url).json(message).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(NotifyError::Rejected(status));
                }
                tracing::debug!(email = %message.email, "welcome delivered to webhook");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_webhook_falls_back_to_log() {
        assert!(matches!(WelcomeNotifier::from_webhook(None), WelcomeNotifier::Log));
        assert!(matches!(
            WelcomeNotifier::from_webhook(Some("  ".to_string())),
            WelcomeNotifier::Log
        ));
        assert!(matches!(
            WelcomeNotifier::from_webhook(Some("http://127.0.0.1:9/hook".to_string())),
            WelcomeNotifier::Webhook { .. }
        ));
    }
}
