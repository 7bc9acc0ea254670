use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::error::ReportError;
use crate::model::SCROLL_CHAIN_ID;

pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";
pub const API_KEY_VAR: &str = "ZERO_EX_API_KEY";
pub const RPC_URL_VAR: &str = "ALCHEMY_HTTP_TRANSPORT_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Non-secret report settings. Every field has a default so the file is optional.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReportConfig {
    pub api_url: String,
    pub chain_id: u64,
    pub sell_token: String,
    pub buy_token: String,
    /// Human-readable amount of `sell_token`, converted with its on-chain decimals.
    pub sell_amount: String,
    /// Affiliate fee in basis points (1 bp = 0.01%). Defaults to 100 (1%)
    pub fee_bps: u16,
    /// Defaults to the taker address
    pub fee_recipient: Option<String>,
    /// Defaults to the buy token
    pub fee_token: Option<String>,
    /// Per-request timeout. Defaults to 30s
    pub request_timeout_secs: Option<u64>,
    /// TCP/TLS connect timeout. Defaults to 5s
    pub connect_timeout_secs: Option<u64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.0x.org".to_string(),
            chain_id: SCROLL_CHAIN_ID,
            // WETH on Scroll
            sell_token: "0x5300000000000000000000000000000000000004".to_string(),
            // wstETH on Scroll
            buy_token: "0xf610A9dfB7C89644979b4A0f27063E9e7d7Cda32".to_string(),
            sell_amount: "0.1".to_string(),
            fee_bps: 100,
            fee_recipient: None,
            fee_token: None,
            request_timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

/// Addresses resolved out of a validated [`ReportConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub sell_token: Address,
    pub buy_token: Address,
    pub fee_recipient: Option<Address>,
    pub fee_token: Option<Address>,
}

impl ReportConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| anyhow!(e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS))
    }

    pub fn validate(&self) -> Result<TokenPair, ReportError> {
        if self.api_url.trim().is_empty() {
            return Err(ReportError::Config("api_url must not be empty".to_string()));
        }
        if self.fee_bps > 10_000 {
            return Err(ReportError::Config(format!(
                "fee_bps must be at most 10000, got {}",
                self.fee_bps
            )));
        }
        let amount = self.sell_amount.trim();
        if amount.is_empty() || amount.starts_with('-') {
            return Err(ReportError::Config(format!(
                "sell_amount must be a positive decimal, got {:?}",
                self.sell_amount
            )));
        }
        Ok(TokenPair {
            sell_token: parse_address("sell_token", &self.sell_token)?,
            buy_token: parse_address("buy_token", &self.buy_token)?,
            fee_recipient: self
                .fee_recipient
                .as_deref()
                .map(|a| parse_address("fee_recipient", a))
                .transpose()?,
            fee_token: self
                .fee_token
                .as_deref()
                .map(|a| parse_address("fee_token", a))
                .transpose()?,
        })
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address, ReportError> {
    Address::from_str(value.trim())
        .map_err(|e| ReportError::Config(format!("{field} is not a valid address ({value}): {e}")))
}

/// Loads `.env` from the working directory (or a parent) into the process
/// environment. Returns false when there is no such file.
pub fn load_dotenv() -> Result<bool, ReportError> {
    tolerate_missing(dotenvy::dotenv().map(|_| ()))
}

pub fn load_dotenv_from(path: &Path) -> Result<bool, ReportError> {
    tolerate_missing(dotenvy::from_path(path))
}

fn tolerate_missing(res: std::result::Result<(), dotenvy::Error>) -> Result<bool, ReportError> {
    match res {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(ReportError::Config(format!("cannot load .env: {e}"))),
    }
}

/// Secrets read from the process environment.
#[derive(Clone)]
pub struct Credentials {
    pub private_key: String,
    pub api_key: String,
    pub rpc_url: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("private_key", &"<redacted>")
            .field("api_key", &"<redacted>")
            .field("rpc_url", &self.rpc_url)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ReportError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Checks the variables in a fixed order and reports the first one missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ReportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ReportError::MissingEnv(name))
        };
        Ok(Self {
            private_key: require(PRIVATE_KEY_VAR)?,
            api_key: require(API_KEY_VAR)?,
            rpc_url: require(RPC_URL_VAR)?,
        })
    }
}
