use figment::{
    providers::{Env, Serialized},
    Figment,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Result, StressError};

pub const DEFAULT_PROXY_URL: &str = "https://localhost:17443";

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct Config {
    /// Base URL every target path is appended to.
    #[validate(url)]
    pub proxy_url: String,
    #[validate(length(min = 1))]
    pub targets: Vec<String>,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            targets: vec!["/1mb.img".to_string()],
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Built-in defaults, overridden by `PROXY_URL` and `STRESS_LOG_FORMAT`.
    /// Targets are only ever the in-source list.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(&["PROXY_URL"]))
            .merge(Env::prefixed("STRESS_").only(&["LOG_FORMAT"]))
    }

    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        cfg.base_url()?;
        Ok(cfg)
    }

    /// Parsed base URL; only http and https are accepted.
    pub fn base_url(&self) -> Result<Url> {
        let invalid = |reason: String| StressError::InvalidBaseUrl {
            url: self.proxy_url.clone(),
            reason,
        };
        let url = Url::parse(&self.proxy_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme {other:?}"))),
        }
    }
}
