use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid, // owner, fixed at creation
    pub reminder_type: String,
    pub due_date: String,
    pub due_time: String,
    pub presentation_type: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewReminder {
    pub reminder_type: String,
    pub due_date: String,
    pub due_time: String,
    pub presentation_type: Option<String>,
}

/// Fields to overwrite; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ReminderPatch {
    pub reminder_type: Option<String>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    /// `Some(None)` clears it.
    pub presentation_type: Option<Option<String>>,
}

/// Every lookup is keyed by owner; another owner's row is simply absent.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn insert(&self, owner: Uuid, new: NewReminder) -> Result<Reminder, AppError>;
    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Reminder>, AppError>;
    async fn update_owned(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: ReminderPatch,
    ) -> Result<Option<Reminder>, AppError>;
    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgReminderStore {
    db: PgPool,
}

impl PgReminderStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReminderStore for PgReminderStore {
    async fn insert(&self, owner: Uuid, new: NewReminder) -> Result<Reminder, AppError> {
        let row = sqlx::query_as::<_, Reminder>(
            r#"
            INSERT INTO reminders (id, user_id, reminder_type, due_date, due_time, presentation_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, reminder_type, due_date, due_time, presentation_type, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner)
        .bind(&new.reminder_type)
        .bind(&new.due_date)
        .bind(&new.due_time)
        .bind(new.presentation_type.as_deref())
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Reminder>, AppError> {
        let rows = sqlx::query_as::<_, Reminder>(
            r#"
            SELECT id, user_id, reminder_type, due_date, due_time, presentation_type, created_at
              FROM reminders
             WHERE user_id = $1
             ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update_owned(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: ReminderPatch,
    ) -> Result<Option<Reminder>, AppError> {
        let row = sqlx::query_as::<_, Reminder>(
            r#"
            UPDATE reminders
               SET reminder_type     = COALESCE($3, reminder_type),
                   due_date          = COALESCE($4, due_date),
                   due_time          = COALESCE($5, due_time),
                   presentation_type = CASE WHEN $6 THEN $7 ELSE presentation_type END
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, reminder_type, due_date, due_time, presentation_type, created_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(patch.reminder_type.as_deref())
        .bind(patch.due_date.as_deref())
        .bind(patch.due_time.as_deref())
        .bind(patch.presentation_type.is_some())
        .bind(patch.presentation_type.flatten())
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete_owned(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM reminders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
