/// Configuration management for Blog Service
///
/// Values come from environment variables (with `__` as the section
/// separator, e.g. `DATABASE__URL`, `JWT__SECRET`) layered over defaults.
/// A `.env` file is honoured when present.
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application environment (development, staging, production)
    #[serde(default = "default_env")]
    pub env: String,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Which repository backend to wire at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing secret, at least 32 bytes
    pub secret: String,
    pub issuer: String,
    pub expiry_hours: i64,
}

/// Account ensured at startup with the Admin role
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

const DEV_JWT_SECRET: &str = "development-secret-change-in-production!";
const DEV_ADMIN_PASSWORD: &str = "Admin123";

fn default_env() -> String {
    "development".to_string()
}

impl Config {
    /// Load configuration from the environment
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .set_default("env", "development")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("cors.allowed_origins", "http://localhost:4200")?
            .set_default("storage.backend", "postgres")?
            .set_default("database.url", "postgres://localhost/blog")?
            .set_default("database.max_connections", 10)?
            .set_default("jwt.secret", DEV_JWT_SECRET)?
            .set_default("jwt.issuer", "blog-service")?
            .set_default("jwt.expiry_hours", 24)?
            .set_default("admin.username", "admin")?
            .set_default("admin.email", "admin@blog.dev")?
            .set_default("admin.password", DEV_ADMIN_PASSWORD)?
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }

    /// Reject settings that are only acceptable for local development
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt.expiry_hours <= 0 {
            anyhow::bail!("JWT__EXPIRY_HOURS must be positive");
        }

        if !self.is_production() {
            return Ok(());
        }

        if self.jwt.secret == DEV_JWT_SECRET {
            anyhow::bail!("JWT__SECRET must be set in production");
        }
        if self.admin.password == DEV_ADMIN_PASSWORD {
            anyhow::bail!("ADMIN__PASSWORD must be set in production");
        }
        if self.cors.allowed_origins.trim() == "*" {
            anyhow::bail!("CORS__ALLOWED_ORIGINS cannot be '*' in production");
        }
        if self.storage.backend == StorageBackend::Memory {
            anyhow::bail!("STORAGE__BACKEND=memory is not allowed in production");
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "ENV",
            "SERVER__PORT",
            "STORAGE__BACKEND",
            "JWT__SECRET",
            "JWT__EXPIRY_HOURS",
            "ADMIN__PASSWORD",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::load().expect("defaults load");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.jwt.expiry_hours, 24);
        assert_eq!(config.admin.username, "admin");
        assert!(!config.is_production());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("SERVER__PORT", "9090");
        std::env::set_var("STORAGE__BACKEND", "memory");

        let config = Config::load().expect("overrides load");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.bind_address(), "0.0.0.0:9090");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_production_rejects_dev_secret() {
        clear_env();
        std::env::set_var("ENV", "production");

        assert!(Config::load().is_err());

        clear_env();
    }
}
