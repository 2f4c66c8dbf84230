use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub allocation: AllocationRules,
}

/// Tunables for the allocation engine. Defaults match the product rules;
/// config files and environment can override per deployment.
#[derive(Debug, Deserialize, Clone)]
pub struct AllocationRules {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_cooldown_days")]
    pub cooldown_days: i64,
    #[serde(default = "default_rejection_threshold")]
    pub rejection_threshold: i32,
    #[serde(default = "default_expiry_margin_minutes")]
    pub expiry_margin_minutes: i64,
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
    #[serde(default = "default_reference_country")]
    pub reference_country: String,
}

fn default_batch_size() -> usize {
    perk_core::models::BATCH_SIZE
}

fn default_cooldown_days() -> i64 {
    perk_core::models::COOLDOWN_DAYS
}

fn default_rejection_threshold() -> i32 {
    perk_core::models::REJECTION_THRESHOLD
}

fn default_expiry_margin_minutes() -> i64 {
    perk_core::models::EXPIRY_MARGIN_MINUTES
}

fn default_store_timeout_ms() -> u64 {
    2_000
}

fn default_reference_country() -> String {
    perk_core::geo::DEFAULT_COUNTRY.to_string()
}

impl Default for AllocationRules {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            cooldown_days: default_cooldown_days(),
            rejection_threshold: default_rejection_threshold(),
            expiry_margin_minutes: default_expiry_margin_minutes(),
            store_timeout_ms: default_store_timeout_ms(),
            reference_country: default_reference_country(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("PERK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_rules_default_to_product_constants() {
        let rules = AllocationRules::default();
        assert_eq!(rules.batch_size, 5);
        assert_eq!(rules.cooldown_days, 30);
        assert_eq!(rules.rejection_threshold, 3);
        assert_eq!(rules.expiry_margin_minutes, 60);
        assert_eq!(rules.reference_country, "US");
    }
}
