use tracing::{debug, info, warn};

use super::{
    claims::TokenKind,
    dto::{RegisterRequest, TokenPair},
    jwt::JwtKeys,
    password::{hash_secret, verify_against_dummy, verify_secret},
    repo::{Account, AccountStore, NewAccount},
};
use crate::error::AppError;

/// Creates an account and its profile. Duplicates are rejected before anything is written.
pub async fn register(
    accounts: &dyn AccountStore,
    req: RegisterRequest,
) -> Result<Account, AppError> {
    let req = req
        .normalize()
        .map_err(|errors| AppError::BadRequest(errors.summary()))?;

    if accounts.username_exists(&req.username).await? {
        warn!(username = %req.username, "username already taken");
        return Err(AppError::DuplicateUsername);
    }
    if accounts.email_exists(&req.email).await? {
        warn!(email = %req.email, "email already taken");
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = hash_secret(&req.password)?;
    let account = accounts
        .create(NewAccount {
            username: req.username,
            email: req.email,
            password_hash,
            university: req.university,
            phone_number: req.phone_number,
        })
        .await?;

    info!(account_id = %account.id, username = %account.username, "user registered");
    Ok(account)
}

/// Unknown username and wrong secret produce the same error.
pub async fn authenticate(
    accounts: &dyn AccountStore,
    username: &str,
    secret: &str,
) -> Result<Account, AppError> {
    let Some(account) = accounts.find_by_username(username.trim()).await? else {
        verify_against_dummy(secret);
        warn!("login with unknown username");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_secret(secret, &account.password_hash)? {
        warn!(account_id = %account.id, "login with invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(account_id = %account.id, "user authenticated");
    Ok(account)
}

pub fn issue_tokens(keys: &JwtKeys, account: &Account) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access: keys.sign_access(account.id)?,
        refresh: keys.sign_refresh(account.id)?,
    })
}

/// Resolves an access token to the account it was issued for.
pub async fn verify(
    accounts: &dyn AccountStore,
    keys: &JwtKeys,
    access_token: &str,
) -> Result<Account, AppError> {
    let claims = keys.verify(access_token, TokenKind::Access).map_err(|e| {
        debug!(error = %e, "access token rejected");
        AppError::Unauthenticated("Invalid or expired token")
    })?;
    accounts
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::Unauthenticated("Invalid or expired token"))
}

/// Exchanges a refresh token for a new access token.
pub async fn refresh(
    accounts: &dyn AccountStore,
    keys: &JwtKeys,
    refresh_token: &str,
) -> Result<String, AppError> {
    let claims = keys.verify(refresh_token, TokenKind::Refresh).map_err(|e| {
        debug!(error = %e, "refresh token rejected");
        AppError::Unauthenticated("Token is invalid or expired")
    })?;
    let account = accounts
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::Unauthenticated("Token is invalid or expired"))?;
    Ok(keys.sign_access(account.id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_keys, MemoryAccounts};

    fn alice() -> RegisterRequest {
        RegisterRequest {
            username: "alice".into(),
            email: "a@x.com".into(),
            password: "p1".into(),
            university: "MIT".into(),
            phone_number: None,
        }
    }

    #[tokio::test]
    async fn register_hashes_secret_and_keeps_profile() {
        let accounts = MemoryAccounts::default();
        let account = register(&accounts, alice()).await.unwrap();
        assert_eq!(account.university, "MIT");
        assert_ne!(account.password_hash, "p1");
        assert!(verify_secret("p1", &account.password_hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_and_not_stored() {
        let accounts = MemoryAccounts::default();
        register(&accounts, alice()).await.unwrap();

        let mut again = alice();
        again.email = "other@x.com".into();
        let err = register(&accounts, again).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));

        let all = accounts.list().await.unwrap();
        assert_eq!(all.iter().filter(|a| a.username == "alice").count(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let accounts = MemoryAccounts::default();
        register(&accounts, alice()).await.unwrap();

        let mut bob = alice();
        bob.username = "bob".into();
        bob.email = "A@X.COM".into();
        let err = register(&accounts, bob).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
        assert_eq!(accounts.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_registration_writes_nothing() {
        let accounts = MemoryAccounts::default();
        let mut bad = alice();
        bad.email = "not-an-email".into();
        let err = register(&accounts, bad).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(accounts.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn authentication_failures_are_symmetric() {
        let accounts = MemoryAccounts::default();
        register(&accounts, alice()).await.unwrap();

        let ok = authenticate(&accounts, "alice", "p1").await.unwrap();
        assert_eq!(ok.username, "alice");

        let wrong_secret = authenticate(&accounts, "alice", "nope").await.unwrap_err();
        let unknown_user = authenticate(&accounts, "mallory", "p1").await.unwrap_err();
        assert!(matches!(wrong_secret, AppError::InvalidCredentials));
        assert!(matches!(unknown_user, AppError::InvalidCredentials));
        assert_eq!(wrong_secret.to_string(), unknown_user.to_string());
        assert_eq!(wrong_secret.status(), unknown_user.status());
    }

    #[tokio::test]
    async fn issued_tokens_verify_and_refresh() {
        let accounts = MemoryAccounts::default();
        let keys = test_keys();
        let account = register(&accounts, alice()).await.unwrap();
        let pair = issue_tokens(&keys, &account).unwrap();

        let who = verify(&accounts, &keys, &pair.access).await.unwrap();
        assert_eq!(who.id, account.id);
        assert_eq!(who.university, "MIT");

        let access = refresh(&accounts, &keys, &pair.refresh).await.unwrap();
        assert_eq!(verify(&accounts, &keys, &access).await.unwrap().id, account.id);
    }

    #[tokio::test]
    async fn verify_and_refresh_reject_wrong_kind_and_garbage() {
        let accounts = MemoryAccounts::default();
        let keys = test_keys();
        let account = register(&accounts, alice()).await.unwrap();
        let pair = issue_tokens(&keys, &account).unwrap();

        assert!(matches!(
            verify(&accounts, &keys, &pair.refresh).await,
            Err(AppError::Unauthenticated(_))
        ));
        assert!(matches!(
            refresh(&accounts, &keys, &pair.access).await,
            Err(AppError::Unauthenticated(_))
        ));
        assert!(matches!(
            verify(&accounts, &keys, "garbage").await,
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn tokens_for_unknown_accounts_are_rejected() {
        let accounts = MemoryAccounts::default();
        let keys = test_keys();
        let ghost = keys.sign_access(uuid::Uuid::new_v4()).unwrap();
        assert!(matches!(
            verify(&accounts, &keys, &ghost).await,
            Err(AppError::Unauthenticated(_))
        ));
    }
}
