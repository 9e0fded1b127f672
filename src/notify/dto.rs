use serde::Deserialize;

/// Body of `POST /send_sms`; the phone falls back to the caller's profile.
#[derive(Debug, Deserialize)]
pub struct SendSmsRequest {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
