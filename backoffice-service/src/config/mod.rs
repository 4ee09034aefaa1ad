use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

use crate::services::payroll::PayrollDefaults;

#[derive(Debug, Clone, Deserialize)]
pub struct BackofficeConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub store_backend: StoreBackend,
    pub mongodb: MongoConfig,
    pub storage: StorageConfig,
    pub tax: TaxConfig,
    pub payroll: PayrollConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub local_path: String,
    pub public_base_url: String,
}

/// Default tax table. A single labelled rate covers the common case;
/// anything richer comes in through the environment as a JSON map.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxConfig {
    pub taxable_label: String,
    pub rate_percent: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayrollConfig {
    pub overtime_rate_per_km: f64,
    pub fallback_base_pay: f64,
    pub tax_percent_of_base: f64,
    pub flat_deduction: f64,
}

impl From<&PayrollConfig> for PayrollDefaults {
    fn from(cfg: &PayrollConfig) -> Self {
        PayrollDefaults {
            overtime_rate_per_km: cfg.overtime_rate_per_km,
            fallback_base_pay: cfg.fallback_base_pay,
            tax_percent_of_base: cfg.tax_percent_of_base,
            flat_deduction: cfg.flat_deduction,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

impl BackofficeConfig {
    pub fn load() -> Result<Self, AppError> {
        // Common config handles .env and the APP__ prefix.
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(BackofficeConfig {
            common: common_config,
            service_name: get_env("SERVICE_NAME", Some("backoffice-service"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            store_backend: get_env("STORE_BACKEND", Some("mongo"), is_prod)?
                .parse()
                .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("backoffice_db"), is_prod)?,
            },
            storage: StorageConfig {
                local_path: get_env("STORAGE_LOCAL_PATH", Some("storage"), is_prod)?,
                public_base_url: get_env(
                    "STORAGE_PUBLIC_BASE_URL",
                    Some("http://localhost:8080/files"),
                    is_prod,
                )?,
            },
            tax: TaxConfig {
                taxable_label: get_env("TAX_LABEL", Some("Tax on Sales (15%)"), is_prod)?,
                rate_percent: parse_f64(get_env("TAX_RATE_PERCENT", Some("15"), is_prod)?, 15.0),
            },
            payroll: PayrollConfig {
                overtime_rate_per_km: parse_f64(
                    get_env("OVERTIME_RATE_PER_KM", Some("0.45"), is_prod)?,
                    0.45,
                ),
                fallback_base_pay: parse_f64(
                    get_env("PAYROLL_FALLBACK_BASE_PAY", Some("0"), is_prod)?,
                    0.0,
                ),
                tax_percent_of_base: parse_f64(
                    get_env("PAYROLL_TAX_PERCENT", Some("0"), is_prod)?,
                    0.0,
                ),
                flat_deduction: parse_f64(
                    get_env("PAYROLL_FLAT_DEDUCTION", Some("0"), is_prod)?,
                    0.0,
                ),
            },
        })
    }
}

fn parse_f64(value: String, default: f64) -> f64 {
    value.parse().unwrap_or(default)
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}
