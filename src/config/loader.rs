//! Configuration loading from disk.

use std::path::Path;
use std::fs;
use crate::config::schema::LotteryConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<LotteryConfig, ConfigError> {
    let config: LotteryConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LotteryConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let config = parse_config(
            r#"
            [blockchain]
            rpc_url = "http://127.0.0.1:8545"
            chain_id = 11155111

            [lottery]
            contract_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
            "#,
        )
        .unwrap();
        assert_eq!(config.blockchain.chain_id, 11155111);
    }

    #[test]
    fn test_parse_error_reported() {
        let err = parse_config("[lottery\ncontract_address = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_reported() {
        let err = parse_config("[lottery]\ncontract_address = \"nope\"").unwrap_err();
        assert!(err.to_string().contains("lottery.contract_address"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = parse_config(include_str!("../../lottery.example.toml")).unwrap();
        assert_eq!(config.lottery.poll_interval_ms, 4000);
        assert_eq!(config.wallet.private_keys_env, "LOTTERY_PRIVATE_KEYS");
    }
}
