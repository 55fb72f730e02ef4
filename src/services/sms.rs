//! SMS delivery providers
//!
//! Dispatch goes through the `SmsProvider` trait so the OTP service never
//! knows which gateway is behind it. Production uses MSG91; development and
//! tests use the console provider, which only logs.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::CONFIG;
use crate::error::{AppError, Result};

pub type SmsNotifier = Arc<dyn SmsProvider>;

#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Deliver a message to an E.164 phone number
    async fn send(&self, phone: &str, message: &str) -> Result<()>;
}

/// Build the provider the configuration asks for
pub fn notifier_from_config() -> SmsNotifier {
    if CONFIG.sms.gateway_enabled {
        Arc::new(Msg91Provider::new(
            CONFIG.sms.msg91_api_key.clone(),
            CONFIG.sms.sender_id.clone(),
        ))
    } else {
        Arc::new(ConsoleProvider)
    }
}

// ============================================================================
// MSG91 gateway
// ============================================================================

pub struct Msg91Provider {
    client: reqwest::Client,
    api_key: String,
    sender_id: String,
}

impl Msg91Provider {
    pub fn new(api_key: String, sender_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            sender_id,
        }
    }
}

#[async_trait]
impl SmsProvider for Msg91Provider {
    fn name(&self) -> &'static str {
        "msg91"
    }

    async fn send(&self, phone: &str, message: &str) -> Result<()> {
        // MSG91 expects the number without the leading "+"
        let mobiles = phone.trim_start_matches('+');

        let response = self
            .client
            .get("https://control.msg91.com/api/sendhttp.php")
            .query(&[
                ("authkey", self.api_key.as_str()),
                ("mobiles", mobiles),
                ("message", message),
                ("sender", self.sender_id.as_str()),
                ("route", "4"),
                ("country", "91"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Sms(format!("MSG91 request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Sms(format!(
                "MSG91 returned {}: {}",
                status, body
            )));
        }

        tracing::debug!(provider = self.name(), "SMS dispatched");
        Ok(())
    }
}

// ============================================================================
// Console provider (development / tests)
// ============================================================================

pub struct ConsoleProvider;

#[async_trait]
impl SmsProvider for ConsoleProvider {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn send(&self, phone: &str, message: &str) -> Result<()> {
        tracing::info!(phone = %phone, message = %message, "SMS (console provider)");
        Ok(())
    }
}
