use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{map_unique_violation, AppError};

/// Account joined with its profile attributes.
#[derive(Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String, // argon2 PHC string, never serialized
    pub university: String,
    pub phone_number: Option<String>,
    pub created_at: OffsetDateTime,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("university", &self.university)
            .field("phone_number", &self.phone_number)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Validated registration data with the secret already hashed.
#[derive(Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub university: String,
    pub phone_number: Option<String>,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError>;
    async fn username_exists(&self, username: &str) -> Result<bool, AppError>;
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;
    /// Persists the account and its profile together, or neither.
    async fn create(&self, new: NewAccount) -> Result<Account, AppError>;
    async fn list(&self) -> Result<Vec<Account>, AppError>;
}

const SELECT_ACCOUNT: &str = r#"
    SELECT u.id, u.username, u.email, u.password_hash,
           COALESCE(p.university, '') AS university, p.phone_number, u.created_at
      FROM users u
      LEFT JOIN profiles p ON p.user_id = u.id
"#;

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(&format!("{SELECT_ACCOUNT} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(account)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        let account =
            sqlx::query_as::<_, Account>(&format!("{SELECT_ACCOUNT} WHERE u.username = $1"))
                .bind(username)
                .fetch_optional(&self.db)
                .await?;
        Ok(account)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.db)
                .await?;
        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.db)
            .await?;
        Ok(exists)
    }

    async fn create(&self, new: NewAccount) -> Result<Account, AppError> {
        let id = Uuid::new_v4();
        let mut tx = self.db.begin().await?;

        let created_at: OffsetDateTime = sqlx::query_scalar(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING created_at
            "#,
        )
        .bind(id)
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, university, phone_number)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(&new.university)
        .bind(new.phone_number.as_deref())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Account {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            university: new.university,
            phone_number: new.phone_number,
            created_at,
        })
    }

    async fn list(&self) -> Result<Vec<Account>, AppError> {
        let rows = sqlx::query_as::<_, Account>(&format!("{SELECT_ACCOUNT} ORDER BY u.created_at ASC, u.id ASC"))
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }
}
