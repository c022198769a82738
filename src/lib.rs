//! opsboard — operational status board.
//!
//! Issues JWT bearer tokens against a seeded credential store and serves a
//! health report aggregated from static checks plus one live, pool-backed
//! stuck-jobs probe.

use std::sync::Arc;

pub mod api;
pub mod auth;
pub mod checks;
pub mod config;
pub mod errors;
pub mod pool;

use auth::credentials::CredentialStore;
use auth::token::TokenService;
use checks::statics::ServiceCheck;
use checks::StatusAggregator;
use pool::Pool;

/// Shared application state passed to handlers and middleware. Built once
/// at bootstrap; everything but the pool is read-only afterwards.
pub struct AppState {
    pub config: config::Config,
    pub credentials: CredentialStore,
    pub tokens: TokenService,
    pub pool: Pool,
    pub aggregator: StatusAggregator,
    pub crm_messenger: ServiceCheck,
}

impl AppState {
    pub fn new(config: config::Config, pool: Pool) -> anyhow::Result<Arc<Self>> {
        let credentials = CredentialStore::from_config(&config.accounts)?;
        let tokens = TokenService::from_config(&config.jwt)?;
        let aggregator = StatusAggregator::new(checks::registry(pool.clone()));
        let crm_messenger = ServiceCheck::crm_messenger(&config.checks);

        Ok(Arc::new(Self {
            config,
            credentials,
            tokens,
            pool,
            aggregator,
            crm_messenger,
        }))
    }
}
