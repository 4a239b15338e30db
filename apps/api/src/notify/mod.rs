//! Push notifications via Pushover.
//!
//! Recording tools hand their text to a `Notifier`; delivery is best-effort
//! and callers decide what to do with a failure (the tools only log it).

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Pushover returned status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

#[derive(Clone)]
pub struct PushoverClient {
    client: Client,
    token: String,
    user: String,
}

impl PushoverClient {
    pub fn new(token: String, user: String) -> Self {
        Self {
            client: Client::new(),
            token,
            user,
        }
    }
}

#[async_trait]
impl Notifier for PushoverClient {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let form = [
            ("token", self.token.as_str()),
            ("user", self.user.as_str()),
            ("message", message),
        ];

        let response = self.client.post(PUSHOVER_API_URL).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Pushover notification delivered");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Captures every message; optionally fails each delivery after capturing it.
    #[derive(Default)]
    pub struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingNotifier {
        pub fn failing() -> Self {
            Self {
                messages: Mutex::default(),
                fail: true,
            }
        }

        pub fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: &str) -> Result<(), NotifyError> {
            self.messages.lock().unwrap().push(message.to_string());
            if self.fail {
                return Err(NotifyError::Rejected {
                    status: 400,
                    body: "invalid token".to_string(),
                });
            }
            Ok(())
        }
    }
}
