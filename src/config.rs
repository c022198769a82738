use serde::Deserialize;

const PLACEHOLDER_SECRET: &str = "CHANGE_ME_DEV_ONLY_SECRET";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub db: DbConfig,
    pub pool: PoolConfig,
    pub checks: ChecksConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    /// Seeded credential accounts. Empty means "use the dev fixture".
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret_key: String,
    /// Signing algorithm name; only the HMAC family is supported.
    pub algorithm: String,
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    /// Connection URL for the backing store, unless DATABASE_URL overrides it.
    pub fn url(&self) -> String {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            return url;
        }
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    pub min: usize,
    pub max: usize,
    pub increment: usize,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChecksConfig {
    /// Name of the CRM Messenger service to look up in the service table.
    pub crm_messenger_service: String,
    /// Mock service table standing in for the OS service manager.
    #[serde(default)]
    pub services: std::collections::HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allow_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    pub username: String,
    /// Argon2 PHC string, e.g. from `opsboard hash-password`.
    pub password_hash: String,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let path = std::env::var("OPSBOARD_CONFIG").unwrap_or_else(|_| "config.yaml".into());
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("cannot read config file '{}': {}", path, e))?;
    let mut cfg: Config = serde_yaml::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("invalid config file '{}': {}", path, e))?;

    if let Ok(secret) = std::env::var("OPSBOARD_SECRET_KEY") {
        cfg.jwt.secret_key = secret;
    }

    if cfg.jwt.secret_key == PLACEHOLDER_SECRET {
        let env_mode = std::env::var("OPSBOARD_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "jwt.secret_key is still the insecure placeholder. \
                 Set OPSBOARD_SECRET_KEY before running in production."
            );
        }
        eprintln!("⚠️  jwt.secret_key is the insecure placeholder — fine for dev, never for production.");
    }

    if !matches!(cfg.jwt.algorithm.as_str(), "HS256" | "HS384" | "HS512") {
        anyhow::bail!(
            "unsupported jwt.algorithm '{}': only HS256/HS384/HS512 are supported",
            cfg.jwt.algorithm
        );
    }

    if cfg.pool.min > cfg.pool.max || cfg.pool.max == 0 {
        anyhow::bail!(
            "invalid pool bounds: min={} max={}",
            cfg.pool.min,
            cfg.pool.max
        );
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let yaml = r#"
server: { host: 127.0.0.1, port: 9000 }
jwt: { secret_key: s3cret, algorithm: HS256, token_ttl_minutes: 15 }
db: { host: dbhost, port: 5432, database: status, user: u, password: p }
pool: { min: 1, max: 3, increment: 1, acquire_timeout_secs: 2 }
checks:
  crm_messenger_service: CRMMessenger_CXDEV
  services: { CRMMessenger_CXDEV: running }
cors:
  allow_origins: ["http://localhost:3000"]
accounts:
  - { username: ops, password_hash: "$argon2id$fake" }
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.jwt.token_ttl_minutes, 15);
        assert_eq!(cfg.pool.max, 3);
        assert_eq!(cfg.accounts.len(), 1);
        assert_eq!(
            cfg.checks.services.get("CRMMessenger_CXDEV").unwrap(),
            "running"
        );
    }

    #[test]
    fn db_url_is_assembled_from_parts() {
        let db = DbConfig {
            host: "dbhost".into(),
            port: 5432,
            database: "status".into(),
            user: "u".into(),
            password: "p".into(),
        };
        // Only meaningful when DATABASE_URL is unset in the test environment.
        if std::env::var("DATABASE_URL").is_err() {
            assert_eq!(db.url(), "postgres://u:p@dbhost:5432/status");
        }
    }

    #[test]
    fn accounts_default_to_empty() {
        let yaml = r#"
server: { host: 127.0.0.1, port: 9000 }
jwt: { secret_key: s3cret, algorithm: HS256, token_ttl_minutes: 15 }
db: { host: dbhost, port: 5432, database: status, user: u, password: p }
pool: { min: 1, max: 3, increment: 1, acquire_timeout_secs: 2 }
checks: { crm_messenger_service: svc }
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.accounts.is_empty());
        assert!(cfg.cors.allow_origins.is_empty());
    }
}
