use alloy::primitives::{Address, U256};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::error::{ReportError, Result};

pub const SCROLL_CHAIN_ID: u64 = 534352;

/// Affiliate fee layered on top of a quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapFee {
    pub recipient: Address,
    /// Fee rate in basis points of the fee token amount.
    pub bps: u16,
    pub token: Address,
}

/// Parameters shared by the price and quote endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapQuoteRequest {
    pub chain_id: u64,
    pub sell_token: Address,
    pub buy_token: Address,
    /// Smallest-unit amount of `sell_token`.
    pub sell_amount: U256,
    pub taker: Address,
    pub fee: Option<SwapFee>,
}

impl SwapQuoteRequest {
    pub fn new(
        chain_id: u64,
        sell_token: Address,
        buy_token: Address,
        sell_amount: U256,
        taker: Address,
    ) -> Result<Self> {
        if sell_amount.is_zero() {
            return Err(ReportError::Amount(
                "sell amount must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            chain_id,
            sell_token,
            buy_token,
            sell_amount,
            taker,
            fee: None,
        })
    }

    pub fn with_fee(&self, fee: SwapFee) -> Self {
        Self {
            fee: Some(fee),
            ..self.clone()
        }
    }

    /// Query string in the order the aggregator documents it.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("chainId", self.chain_id.to_string()),
            ("sellToken", self.sell_token.to_string()),
            ("buyToken", self.buy_token.to_string()),
            ("sellAmount", self.sell_amount.to_string()),
            ("taker", self.taker.to_string()),
        ];
        if let Some(fee) = &self.fee {
            pairs.push(("swapFeeRecipient", fee.recipient.to_string()));
            pairs.push(("swapFeeBps", fee.bps.to_string()));
            pairs.push(("swapFeeToken", fee.token.to_string()));
        }
        pairs
    }
}

fn liquidity_default() -> bool {
    true
}

// Distinguishes `"fees": null` (kept) from a missing key (rejected later).
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// One slice of the order routed to a single venue.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub source: String,
    // the live API sends bps as decimal strings
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub proportion_bps: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub fills: Vec<Fill>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(default = "liquidity_default")]
    pub liquidity_available: bool,
    #[serde(default)]
    pub route: Option<Route>,
    #[serde(default, deserialize_with = "present")]
    pub fees: Option<Value>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTaxMetadata {
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub buy_tax_bps: Option<u32>,
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub sell_tax_bps: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    #[serde(default)]
    pub buy_token: Option<TokenTaxMetadata>,
    #[serde(default)]
    pub sell_token: Option<TokenTaxMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    #[serde(default = "liquidity_default")]
    pub liquidity_available: bool,
    #[serde(default)]
    pub token_metadata: Option<TokenMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesResponse {
    pub sources: Vec<String>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    pub name: Option<String>,
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn describe(&self) -> Option<String> {
        match (&self.name, &self.message) {
            (Some(name), Some(message)) => Some(format!("{name}: {message}")),
            (None, Some(message)) => Some(message.clone()),
            (Some(name), None) => Some(name.clone()),
            (None, None) => None,
        }
    }
}

pub fn chain_name(chain_id: u64) -> String {
    let name = match chain_id {
        1 => "Ethereum",
        10 => "Optimism",
        56 => "BNB Chain",
        137 => "Polygon",
        5000 => "Mantle",
        8453 => "Base",
        42161 => "Arbitrum",
        43114 => "Avalanche",
        59144 => "Linea",
        81457 => "Blast",
        SCROLL_CHAIN_ID => "Scroll",
        other => return format!("chain {other}"),
    };
    name.to_string()
}
