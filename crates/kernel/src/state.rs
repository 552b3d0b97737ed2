//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{AuthSettings, Config};
use crate::db;
use crate::services::account::AccountService;
use crate::services::catalog::CatalogService;
use crate::services::email::{self, Notifier};
use crate::services::password::PasswordService;
use crate::services::token::TokenService;
use crate::services::verification::VerificationCodes;
use crate::store::{PgStore, Store};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Backing store for every record.
    store: Arc<dyn Store>,

    /// Session token signer, also used by the authorization gate.
    tokens: TokenService,

    /// Registration, verification and login.
    accounts: AccountService,

    /// Restaurants and menus.
    catalog: CatalogService,
}

impl AppState {
    /// Create new application state backed by PostgreSQL.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;

        info!("database migrations applied");

        let notifier = email::from_config(config).context("failed to build notifier")?;

        Self::from_parts(&config.auth, Arc::new(PgStore::new(pool)), notifier)
    }

    /// Assemble state from an explicit store and notifier.
    pub fn from_parts(
        settings: &AuthSettings,
        store: Arc<dyn Store>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let passwords = PasswordService::new(settings)?;
        let codes = VerificationCodes::new(settings.code_ttl);
        let tokens = TokenService::new(settings.jwt_secret.as_bytes(), settings.token_ttl);

        let accounts = AccountService::new(
            Arc::clone(&store),
            notifier,
            passwords,
            codes,
            tokens.clone(),
        );
        let catalog = CatalogService::new(Arc::clone(&store));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                store,
                tokens,
                accounts,
                catalog,
            }),
        })
    }

    /// Get the backing store.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.inner.store
    }

    /// Get the session token service.
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get the account service.
    pub fn accounts(&self) -> &AccountService {
        &self.inner.accounts
    }

    /// Get the catalog service.
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Check if the backing store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.store.is_healthy().await
    }
}
