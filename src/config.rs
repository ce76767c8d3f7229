use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL for users, accounts and the ledger
    pub postgres_url: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// HS256 signing secret for session tokens
    pub jwt_secret: String,
    /// Registration gate password (the original read this from the
    /// environment at call time; here it is injected at process start)
    pub admin_password: String,
    #[serde(default)]
    pub otp: OtpConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OtpConfig {
    pub expiry_minutes: i64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self { expiry_minutes: 10 }
    }
}

/// Connection-pool tuning; every field has a workable default.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
log_level: info
log_dir: logs
log_file: app.log
use_json: false
rotation: daily
gateway:
  host: 127.0.0.1
  port: 8080
postgres_url: postgres://localhost/test
jwt_secret: secret
admin_password: pw
"#;

    #[test]
    fn pool_settings_default_when_absent() {
        let config: AppConfig = serde_yaml::from_str(BASE).unwrap();
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.database.acquire_timeout_secs, 5);
        assert_eq!(config.otp.expiry_minutes, 10);
    }

    #[test]
    fn pool_settings_read_from_yaml() {
        let yaml = format!(
            "{BASE}database:\n  max_connections: 3\n  acquire_timeout_secs: 1\n"
        );
        let config: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.database.acquire_timeout_secs, 1);
    }
}
