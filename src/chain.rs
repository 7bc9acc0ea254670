//! On-chain collaborators: the signer that acts as taker and the ERC-20
//! `decimals()` read needed to express the sell amount in base units.

use std::str::FromStr;

use alloy::primitives::utils::{parse_units, ParseUnits};
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::transports::http::reqwest::Url;

use crate::error::{ReportError, Result};

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
    }
}

pub fn signer_from_key(key: &str) -> Result<PrivateKeySigner> {
    let key = key.trim();
    let key = key.strip_prefix("0x").unwrap_or(key);
    PrivateKeySigner::from_str(key)
        .map_err(|e| ReportError::Config(format!("PRIVATE_KEY is not a valid secp256k1 key: {e}")))
}

fn rpc_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| ReportError::Config(format!("invalid RPC url {url}: {e}")))
}

pub async fn token_decimals(url: &str, token: Address) -> Result<u8> {
    let provider = ProviderBuilder::new().on_http(rpc_url(url)?);
    let erc20 = IERC20::new(token, &provider);
    let decimals = erc20
        .decimals()
        .call()
        .await
        .map_err(|e| ReportError::Rpc(format!("decimals() on {token} failed: {e}")))?
        ._0;
    log::debug!("token {token} has {decimals} decimals");
    Ok(decimals)
}

pub async fn rpc_chain_id(url: &str) -> Result<u64> {
    let provider = ProviderBuilder::new().on_http(rpc_url(url)?);
    provider
        .get_chain_id()
        .await
        .map_err(|e| ReportError::Rpc(format!("eth_chainId failed: {e}")))
}

/// Converts a human-readable amount ("0.1") into the token's smallest unit.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();
    let parsed = parse_units(amount, decimals)
        .map_err(|e| ReportError::Amount(format!("{amount}: {e}")))?;
    match parsed {
        ParseUnits::U256(value) if !value.is_zero() => Ok(value),
        ParseUnits::U256(_) => Err(ReportError::Amount(format!("{amount} is zero"))),
        ParseUnits::I256(_) => Err(ReportError::Amount(format!("{amount} is negative"))),
    }
}
