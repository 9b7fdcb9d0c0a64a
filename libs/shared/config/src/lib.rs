use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";
pub const DEFAULT_DAYS_AHEAD: u32 = 14;
pub const DEFAULT_MAX_RESULTS: usize = 8;

/// Which bookings a shared doctor id is checked against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictScope {
    /// Doctor and room clashes only count inside the same clinic.
    #[default]
    Clinic,
    /// A shared doctor clashes across clinics too. Rooms stay clinic-local.
    Global,
}

impl FromStr for ConflictScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clinic" => Ok(ConflictScope::Clinic),
            "global" => Ok(ConflictScope::Global),
            other => Err(format!("unknown conflict scope '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_path: String,
    pub default_days_ahead: u32,
    pub default_max_results: usize,
    pub conflict_scope: ConflictScope,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: DEFAULT_CATALOG_PATH.to_string(),
            default_days_ahead: DEFAULT_DAYS_AHEAD,
            default_max_results: DEFAULT_MAX_RESULTS,
            conflict_scope: ConflictScope::Clinic,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            catalog_path: env::var("CATALOG_PATH")
                .unwrap_or_else(|_| {
                    warn!("CATALOG_PATH not set, using default");
                    DEFAULT_CATALOG_PATH.to_string()
                }),
            default_days_ahead: parse_or_default("SLOT_SEARCH_DAYS_AHEAD", DEFAULT_DAYS_AHEAD),
            default_max_results: parse_or_default("SLOT_SEARCH_MAX_RESULTS", DEFAULT_MAX_RESULTS),
            conflict_scope: parse_or_default("CONFLICT_SCOPE", ConflictScope::Clinic),
        };

        if config.conflict_scope == ConflictScope::Global {
            warn!("CONFLICT_SCOPE=global: doctors are checked for clashes across clinics");
        }

        config
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.catalog_path, "data/catalog.json");
        assert_eq!(config.default_days_ahead, 14);
        assert_eq!(config.default_max_results, 8);
        assert_eq!(config.conflict_scope, ConflictScope::Clinic);
    }

    #[test]
    fn test_conflict_scope_parsing() {
        assert_eq!("clinic".parse::<ConflictScope>(), Ok(ConflictScope::Clinic));
        assert_eq!(" GLOBAL ".parse::<ConflictScope>(), Ok(ConflictScope::Global));
        assert!("everywhere".parse::<ConflictScope>().is_err());
    }
}
