use tracing::info;

use super::gateway::{DeliveryReceipt, SmsGateway};
use crate::error::AppError;

/// Single attempt, no retry or queueing.
pub async fn send(
    gateway: &dyn SmsGateway,
    phone_number: &str,
    message: &str,
) -> Result<DeliveryReceipt, AppError> {
    let phone_number = phone_number.trim();
    let message = message.trim();
    if phone_number.is_empty() || message.is_empty() {
        return Err(AppError::InvalidRequest(
            "phone_number and message are required".into(),
        ));
    }

    let receipt = gateway.deliver(phone_number, message).await?;
    info!(status = receipt.status, "sms sent");
    Ok(receipt)
}
