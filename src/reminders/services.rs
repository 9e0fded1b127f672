use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{CreateReminderRequest, UpdateReminderRequest},
    repo::{Reminder, ReminderStore},
};
use crate::{auth::repo::Account, error::AppError};

/// The owner is always the acting account.
pub async fn add(
    store: &dyn ReminderStore,
    acting: &Account,
    req: CreateReminderRequest,
) -> Result<Reminder, AppError> {
    let new = req.validate().map_err(AppError::Validation)?;
    let reminder = store.insert(acting.id, new).await?;
    info!(account_id = %acting.id, reminder_id = %reminder.id, "reminder created");
    Ok(reminder)
}

pub async fn list(store: &dyn ReminderStore, acting: &Account) -> Result<Vec<Reminder>, AppError> {
    store.list_by_owner(acting.id).await
}

/// A reminder owned by someone else is reported exactly like a missing one.
pub async fn update(
    store: &dyn ReminderStore,
    acting: &Account,
    reminder_id: Uuid,
    req: UpdateReminderRequest,
) -> Result<Reminder, AppError> {
    let patch = req.validate().map_err(AppError::Validation)?;
    match store.update_owned(acting.id, reminder_id, patch).await? {
        Some(reminder) => {
            info!(account_id = %acting.id, %reminder_id, "reminder updated");
            Ok(reminder)
        }
        None => {
            warn!(account_id = %acting.id, %reminder_id, "update of unknown reminder");
            Err(AppError::NotFound)
        }
    }
}

pub async fn delete(
    store: &dyn ReminderStore,
    acting: &Account,
    reminder_id: Uuid,
) -> Result<(), AppError> {
    if store.delete_owned(acting.id, reminder_id).await? {
        info!(account_id = %acting.id, %reminder_id, "reminder deleted");
        Ok(())
    } else {
        warn!(account_id = %acting.id, %reminder_id, "delete of unknown reminder");
        Err(AppError::NotFound)
    }
}
