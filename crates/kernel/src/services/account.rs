//! Account registration, email verification and login.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{RegisterUser, User};
use crate::services::email::{self, Notification, Notifier};
use crate::services::password::PasswordService;
use crate::services::token::{AccessToken, TokenService};
use crate::services::verification::{CodeCheck, ResendOutcome, VerificationCodes};
use crate::store::{Store, StoreError};

/// Orchestrates the account lifecycle over the store and notifier.
#[derive(Clone)]
pub struct AccountService {
    inner: Arc<AccountServiceInner>,
}

struct AccountServiceInner {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    passwords: PasswordService,
    codes: VerificationCodes,
    tokens: TokenService,
}

impl AccountService {
    /// Create a new account service.
    pub fn new(
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
        passwords: PasswordService,
        codes: VerificationCodes,
        tokens: TokenService,
    ) -> Self {
        Self {
            inner: Arc::new(AccountServiceInner {
                store,
                notifier,
                passwords,
                codes,
                tokens,
            }),
        }
    }

    /// Register a new, unverified user and send them a verification code.
    ///
    /// Email and username must both be unused.
    pub async fn register(&self, input: RegisterUser, now: DateTime<Utc>) -> AppResult<User> {
        input.validate()?;
        let store = &self.inner.store;

        if store.find_user_by_email(&input.email).await?.is_some() {
            return Err(AppError::AlreadyExists("email"));
        }
        if store.find_user_by_username(&input.username).await?.is_some() {
            return Err(AppError::AlreadyExists("username"));
        }

        let password_hash = self.inner.passwords.hash(&input.password)?;
        let mut user = User::new(input.username, input.email, password_hash, input.role);
        let (code, _) = self.inner.codes.issue(&mut user, now);

        // A concurrent registration can still win the race to the unique index
        store.insert_user(&user).await.map_err(|e| match e {
            StoreError::Conflict(constraint) if constraint.contains("username") => {
                AppError::AlreadyExists("username")
            }
            StoreError::Conflict(_) => AppError::AlreadyExists("email"),
            other => AppError::from(other),
        })?;

        email::dispatch(
            &self.inner.notifier,
            Notification::Verification {
                email: user.email.clone(),
                code,
            },
        );

        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Check a verification code for the account registered under `email`.
    ///
    /// An unknown email is reported as an invalid code.
    pub async fn verify_email(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<User> {
        let Some(mut user) = self.inner.store.find_user_by_email(email).await? else {
            return Err(AppError::InvalidCode);
        };

        match self.inner.codes.check(&mut user, code, now) {
            CodeCheck::Invalid => Err(AppError::InvalidCode),
            CodeCheck::Expired => Err(AppError::ExpiredCode),
            CodeCheck::Success => {
                self.inner.store.save_user(&user).await?;

                email::dispatch(
                    &self.inner.notifier,
                    Notification::Welcome {
                        email: user.email.clone(),
                        username: user.username.clone(),
                    },
                );

                info!(user_id = %user.id, "email verified");
                Ok(user)
            }
        }
    }

    /// Replace the pending code for `email` and send it again.
    pub async fn resend_code(&self, email: &str, now: DateTime<Utc>) -> AppResult<ResendOutcome> {
        let mut user = self.inner.store.find_user_by_email(email).await?;
        let outcome = self.inner.codes.resend(user.as_mut(), now);

        if let (ResendOutcome::Issued { code }, Some(user)) = (&outcome, &user) {
            self.inner.store.save_user(user).await?;

            email::dispatch(
                &self.inner.notifier,
                Notification::Verification {
                    email: user.email.clone(),
                    code: code.clone(),
                },
            );
            info!(user_id = %user.id, "verification code reissued");
        }

        Ok(outcome)
    }

    /// Check credentials and issue a session token.
    ///
    /// Unverified accounts are refused even when the password is correct.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> AppResult<AccessToken> {
        let Some(user) = self.inner.store.find_user_by_email(email).await? else {
            return Err(AppError::InvalidCredentials);
        };

        if !self.inner.passwords.verify(password, &user.password_hash) {
            warn!(user_id = %user.id, "failed login attempt");
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_verified {
            return Err(AppError::EmailNotVerified);
        }

        let token = self.inner.tokens.issue(&user, now)?;

        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::AuthSettings;
    use crate::models::Role;
    use crate::services::email::LogNotifier;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn setup() -> (AccountService, Arc<MemoryStore>) {
        let settings = AuthSettings {
            hash_memory_kib: 1024,
            hash_iterations: 1,
            ..AuthSettings::default()
        };
        let store = Arc::new(MemoryStore::new());
        let service = AccountService::new(
            store.clone(),
            Arc::new(LogNotifier),
            PasswordService::new(&settings).unwrap(),
            VerificationCodes::new(settings.code_ttl),
            TokenService::new(settings.jwt_secret.as_bytes(), settings.token_ttl),
        );
        (service, store)
    }

    fn alice() -> RegisterUser {
        RegisterUser {
            username: "alice".into(),
            email: "alice@x.com".into(),
            password: "secret123".into(),
            role: Role::Owner,
        }
    }

    async fn pending_code(store: &MemoryStore, email: &str) -> String {
        store
            .find_user_by_email(email)
            .await
            .unwrap()
            .unwrap()
            .verification_code
            .unwrap()
    }

    #[tokio::test]
    async fn register_creates_unverified_user_with_code() {
        let (accounts, store) = setup();
        let now = Utc::now();

        let user = accounts.register(alice(), now).await.unwrap();
        assert!(!user.is_verified);
        assert_eq!(user.role, Role::Owner);
        assert_eq!(user.code_expires_at, Some(now + Duration::minutes(10)));

        let stored = store.find_user(user.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "secret123");
        assert_eq!(stored.verification_code, user.verification_code);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (accounts, _) = setup();
        accounts.register(alice(), Utc::now()).await.unwrap();

        let again = RegisterUser {
            username: "alice2".into(),
            ..alice()
        };
        let err = accounts.register(again, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists("email")));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (accounts, _) = setup();
        accounts.register(alice(), Utc::now()).await.unwrap();

        let again = RegisterUser {
            email: "other@x.com".into(),
            ..alice()
        };
        let err = accounts.register(again, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists("username")));
    }

    #[tokio::test]
    async fn login_requires_verified_email() {
        let (accounts, store) = setup();
        let now = Utc::now();
        accounts.register(alice(), now).await.unwrap();

        let err = accounts
            .login("alice@x.com", "secret123", now)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmailNotVerified));

        let code = pending_code(&store, "alice@x.com").await;
        accounts
            .verify_email("alice@x.com", &code, now)
            .await
            .unwrap();

        let token = accounts.login("alice@x.com", "secret123", now).await;
        assert!(token.is_ok());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (accounts, _) = setup();
        accounts.register(alice(), Utc::now()).await.unwrap();

        let wrong = accounts
            .login("alice@x.com", "not-the-password", Utc::now())
            .await
            .unwrap_err();
        let unknown = accounts
            .login("nobody@x.com", "secret123", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn verification_is_one_shot() {
        let (accounts, store) = setup();
        let now = Utc::now();
        accounts.register(alice(), now).await.unwrap();
        let code = pending_code(&store, "alice@x.com").await;

        let user = accounts
            .verify_email("alice@x.com", &code, now)
            .await
            .unwrap();
        assert!(user.is_verified);

        let again = accounts
            .verify_email("alice@x.com", &code, now)
            .await
            .unwrap_err();
        assert!(matches!(again, AppError::InvalidCode));
    }

    #[tokio::test]
    async fn expired_code_is_reported_and_kept() {
        let (accounts, store) = setup();
        let now = Utc::now();
        accounts.register(alice(), now).await.unwrap();
        let code = pending_code(&store, "alice@x.com").await;

        let late = now + Duration::minutes(10) + Duration::seconds(1);
        let err = accounts
            .verify_email("alice@x.com", &code, late)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExpiredCode));
        assert_eq!(pending_code(&store, "alice@x.com").await, code);
    }

    #[tokio::test]
    async fn unknown_email_verifies_as_invalid_code() {
        let (accounts, _) = setup();
        let err = accounts
            .verify_email("ghost@x.com", "123456", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCode));
    }

    #[tokio::test]
    async fn resend_issues_fresh_code_until_verified() {
        let (accounts, store) = setup();
        let now = Utc::now();
        accounts.register(alice(), now).await.unwrap();

        let later = now + Duration::minutes(20);
        let outcome = accounts.resend_code("alice@x.com", later).await.unwrap();
        let ResendOutcome::Issued { code } = outcome else {
            panic!("expected a new code, got {outcome:?}");
        };
        assert_eq!(pending_code(&store, "alice@x.com").await, code);

        accounts
            .verify_email("alice@x.com", &code, later)
            .await
            .unwrap();

        let outcome = accounts.resend_code("alice@x.com", later).await.unwrap();
        assert_eq!(outcome, ResendOutcome::AlreadyVerified);
        let stored = store
            .find_user_by_email("alice@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.verification_code, None);
        assert_eq!(stored.code_expires_at, None);
    }

    #[tokio::test]
    async fn resend_for_unknown_email_is_not_found() {
        let (accounts, _) = setup();
        let outcome = accounts.resend_code("ghost@x.com", Utc::now()).await;
        assert_eq!(outcome.unwrap(), ResendOutcome::NotFound);
    }
}
