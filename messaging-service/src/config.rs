use std::env;

/// WhatsApp Business API connection settings
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Base URL of the message endpoint, e.g. the Cloud API phone-number URL
    pub api_url: String,
    /// Bearer token for the API
    pub access_token: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl WhatsAppConfig {
    /// Read the WhatsApp configuration from the environment.
    ///
    /// Returns `None` when `WHATSAPP_API_URL` or `WHATSAPP_ACCESS_TOKEN` is
    /// unset; callers fall back to a log-only sender in that case.
    pub fn from_env() -> Option<Self> {
        let api_url = env::var("WHATSAPP_API_URL").ok()?;
        let access_token = env::var("WHATSAPP_ACCESS_TOKEN").ok()?;

        let timeout_seconds = env::var("WHATSAPP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Some(Self {
            api_url,
            access_token,
            timeout_seconds,
        })
    }
}
