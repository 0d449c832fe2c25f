use serde::{Deserialize, Serialize};
use std::fs;

use crate::core_types::Point;
use crate::service::DEFAULT_MAX_BALANCE;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Balance ceiling applied uniformly to all users.
    pub max_balance: Point,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_balance: DEFAULT_MAX_BALANCE,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", config_path, e))?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_section_defaults_when_absent() {
        let yaml = r#"
log_level: info
log_dir: ./logs
log_file: point-ledger.log
use_json: false
rotation: daily
gateway:
  host: 127.0.0.1
  port: 8080
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.ledger.max_balance, DEFAULT_MAX_BALANCE);
        assert_eq!(config.gateway.port, 8080);
    }

    #[test]
    fn max_balance_is_tunable() {
        let yaml = r#"
log_level: debug
log_dir: ./logs
log_file: point-ledger.log
use_json: true
rotation: hourly
gateway:
  host: 0.0.0.0
  port: 9000
ledger:
  max_balance: 500
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.ledger.max_balance, 500);
    }
}
