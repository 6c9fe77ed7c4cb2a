//! Outbound mail
//!
//! Thin client for an HTTP mail provider (Resend-compatible API). Templates
//! live here; whether a failure is surfaced or swallowed is the caller's
//! decision.

use prody_common::ProdyError;
use serde_json::json;
use tracing::error;

#[derive(Clone)]
pub struct MailService {
    api_url: String,
    api_key: String,
    from: String,
    frontend_url: String,
    http_client: reqwest::Client,
}

impl MailService {
    pub fn new(api_url: String, api_key: String, from: String, frontend_url: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_url,
            api_key,
            from,
            frontend_url,
            http_client,
        }
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await
            .map_err(|e| ProdyError::DependencyFailure(format!("mail provider unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, "mail provider rejected message: {}", body);
            return Err(ProdyError::DependencyFailure(format!(
                "mail provider returned {}",
                status
            ))
            .into());
        }

        Ok(())
    }

    pub async fn send_otp(&self, email: &str, otp: &str) -> anyhow::Result<()> {
        let html = format!(
            "<div style=\"font-family: sans-serif; padding: 20px;\">\
             <h2>Verification Code</h2>\
             <p>Your OTP is: <strong style=\"font-size: 24px;\">{}</strong></p>\
             <p>It expires in 10 minutes.</p>\
             </div>",
            otp
        );
        self.send(email, "Verification Code", &html).await
    }

    pub async fn send_welcome(&self, email: &str, name: &str) -> anyhow::Result<()> {
        let html = format!("<p>Hi {}, welcome to Prody! Your email is verified.</p>", name);
        self.send(email, "Welcome to Prody!", &html).await
    }

    pub async fn send_password_reset(&self, email: &str, token: &str) -> anyhow::Result<()> {
        let url = format!("{}/reset-password?token={}", self.frontend_url, token);
        let html = format!("<p>Click <a href=\"{}\">here</a> to reset your password.</p>", url);
        self.send(email, "Reset Your Password", &html).await
    }
}
