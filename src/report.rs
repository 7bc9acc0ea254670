use std::fmt;

use serde_json::Value;

use crate::error::{ReportError, Result};
use crate::model::{chain_name, PriceResponse, QuoteResponse, SourcesResponse, TokenTaxMetadata};
use crate::swap_client::{PRICE_PATH, QUOTE_PATH};

/// Share of the swap volume routed through one venue.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceShare {
    pub source: String,
    pub percentage: f64,
}

/// Buy/sell tax of one token, in basis points as reported by the aggregator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenTaxInfo {
    pub buy_tax_bps: u32,
    pub sell_tax_bps: u32,
}

impl TokenTaxInfo {
    // tax bps are scaled by 1000, fill proportions by 100
    pub fn buy_tax_percent(&self) -> f64 {
        f64::from(self.buy_tax_bps) / 1000.0
    }

    pub fn sell_tax_percent(&self) -> f64 {
        f64::from(self.sell_tax_bps) / 1000.0
    }
}

impl From<&TokenTaxMetadata> for TokenTaxInfo {
    fn from(meta: &TokenTaxMetadata) -> Self {
        Self {
            buy_tax_bps: meta.buy_tax_bps.unwrap_or(0),
            sell_tax_bps: meta.sell_tax_bps.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenTaxes {
    pub buy_token: TokenTaxInfo,
    pub sell_token: TokenTaxInfo,
}

pub fn report_source_breakdown(quote: &QuoteResponse) -> Result<Vec<SourceShare>> {
    if !quote.liquidity_available {
        return Err(ReportError::NoLiquidity {
            endpoint: QUOTE_PATH,
        });
    }
    let route = quote.route.as_ref().ok_or(ReportError::MissingField {
        endpoint: QUOTE_PATH,
        field: "route",
    })?;
    let total: u64 = route.fills.iter().map(|f| u64::from(f.proportion_bps)).sum();
    log::debug!("{} fills covering {} bps", route.fills.len(), total);
    Ok(route
        .fills
        .iter()
        .map(|fill| SourceShare {
            source: fill.source.clone(),
            percentage: f64::from(fill.proportion_bps) / 100.0,
        })
        .collect())
}

pub fn report_fees(quote: &QuoteResponse) -> Result<Value> {
    if !quote.liquidity_available {
        return Err(ReportError::NoLiquidity {
            endpoint: QUOTE_PATH,
        });
    }
    quote.fees.clone().ok_or(ReportError::MissingField {
        endpoint: QUOTE_PATH,
        field: "fees",
    })
}

pub fn report_token_taxes(price: &PriceResponse) -> Result<TokenTaxes> {
    if !price.liquidity_available {
        return Err(ReportError::NoLiquidity {
            endpoint: PRICE_PATH,
        });
    }
    let Some(meta) = &price.token_metadata else {
        return Ok(TokenTaxes::default());
    };
    Ok(TokenTaxes {
        buy_token: meta.buy_token.as_ref().map(TokenTaxInfo::from).unwrap_or_default(),
        sell_token: meta.sell_token.as_ref().map(TokenTaxInfo::from).unwrap_or_default(),
    })
}

pub fn list_liquidity_sources(catalog: &SourcesResponse) -> Vec<String> {
    catalog.sources.clone()
}

/// A rendered section of the console output.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    SourceBreakdown(Vec<SourceShare>),
    Fees(Value),
    Taxes(TokenTaxes),
    LiquiditySources { chain_id: u64, sources: Vec<String> },
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::SourceBreakdown(shares) => {
                write!(f, "{} Sources", shares.len())?;
                for share in shares {
                    write!(f, "\n{}: {}%", share.source, share.percentage)?;
                }
                Ok(())
            }
            Report::Fees(fees) => {
                let pretty = serde_json::to_string_pretty(fees).map_err(|_| fmt::Error)?;
                write!(f, "fee {pretty}")
            }
            Report::Taxes(taxes) => {
                writeln!(f, "Buy token Buy tax: {}%", taxes.buy_token.buy_tax_percent())?;
                writeln!(f, "Buy token Sell tax: {}%", taxes.buy_token.sell_tax_percent())?;
                writeln!(f, "Sell token Buy tax: {}%", taxes.sell_token.buy_tax_percent())?;
                write!(f, "Sell token Sell tax: {}%", taxes.sell_token.sell_tax_percent())
            }
            Report::LiquiditySources { chain_id, sources } => {
                write!(f, "Liquidity sources for {} chain:", chain_name(*chain_id))?;
                for source in sources {
                    write!(f, "\n\t {source}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fill, Route, TokenMetadata};
    use serde_json::json;

    fn quote(fills: Vec<(&str, u32)>) -> QuoteResponse {
        QuoteResponse {
            liquidity_available: true,
            route: Some(Route {
                fills: fills
                    .into_iter()
                    .map(|(source, bps)| Fill {
                        source: source.to_string(),
                        proportion_bps: bps,
                    })
                    .collect(),
            }),
            fees: Some(json!({ "integratorFee": null })),
        }
    }

    #[test]
    fn breakdown_keeps_input_order() {
        let shares = report_source_breakdown(&quote(vec![("Uniswap_V3", 8000), ("Curve", 2000)]))
            .unwrap();
        assert_eq!(
            shares,
            vec![
                SourceShare { source: "Uniswap_V3".into(), percentage: 80.0 },
                SourceShare { source: "Curve".into(), percentage: 20.0 },
            ]
        );
    }

    #[test]
    fn breakdown_is_not_sorted_by_size() {
        let shares =
            report_source_breakdown(&quote(vec![("A", 125), ("B", 9000), ("C", 875)])).unwrap();
        let labels: Vec<_> = shares.iter().map(|s| s.source.as_str()).collect();
        assert_eq!(labels, ["A", "B", "C"]);
        assert_eq!(shares[0].percentage, 1.25);
        assert_eq!(shares[2].percentage, 8.75);
    }

    #[test]
    fn out_of_range_bps_do_not_overflow() {
        let shares =
            report_source_breakdown(&quote(vec![("Broken", u32::MAX), ("Curve", 1)])).unwrap();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].percentage, f64::from(u32::MAX) / 100.0);
        assert_eq!(shares[1].percentage, 0.01);
    }

    #[test]
    fn empty_fill_list_yields_empty_breakdown() {
        let shares = report_source_breakdown(&quote(vec![])).unwrap();
        assert!(shares.is_empty());
        assert_eq!(Report::SourceBreakdown(shares).to_string(), "0 Sources");
    }

    #[test]
    fn breakdown_without_route_or_liquidity_fails() {
        let mut q = quote(vec![]);
        q.route = None;
        assert!(matches!(
            report_source_breakdown(&q),
            Err(ReportError::MissingField { field: "route", .. })
        ));
        q.liquidity_available = false;
        assert!(matches!(
            report_source_breakdown(&q),
            Err(ReportError::NoLiquidity { .. })
        ));
    }

    #[test]
    fn fees_pass_through_unchanged() {
        let fees = json!({
            "integratorFee": { "amount": "1000", "token": "0xf610", "type": "volume" },
            "zeroExFee": { "amount": "15", "token": "0xf610", "type": "volume" },
            "gasFee": null
        });
        let mut q = quote(vec![("Curve", 10_000)]);
        q.fees = Some(fees.clone());
        assert_eq!(report_fees(&q).unwrap(), fees);
    }

    #[test]
    fn missing_fees_is_a_contract_error() {
        let mut q = quote(vec![]);
        q.fees = None;
        assert!(matches!(
            report_fees(&q),
            Err(ReportError::MissingField { field: "fees", .. })
        ));
    }

    #[test]
    fn tax_bps_are_divided_by_one_thousand() {
        let price = PriceResponse {
            liquidity_available: true,
            token_metadata: Some(TokenMetadata {
                buy_token: Some(TokenTaxMetadata {
                    buy_tax_bps: Some(500),
                    sell_tax_bps: Some(250),
                }),
                sell_token: None,
            }),
        };
        let taxes = report_token_taxes(&price).unwrap();
        assert_eq!(taxes.buy_token.buy_tax_percent(), 0.5);
        assert_eq!(taxes.buy_token.sell_tax_percent(), 0.25);
        assert_eq!(taxes.sell_token, TokenTaxInfo::default());
    }

    #[test]
    fn untaxed_tokens_report_zero() {
        let price = PriceResponse {
            liquidity_available: true,
            token_metadata: None,
        };
        let taxes = report_token_taxes(&price).unwrap();
        assert_eq!(
            Report::Taxes(taxes).to_string(),
            "Buy token Buy tax: 0%\n\
             Buy token Sell tax: 0%\n\
             Sell token Buy tax: 0%\n\
             Sell token Sell tax: 0%"
        );
    }

    #[test]
    fn liquidity_sources_keep_catalog_order() {
        let catalog = SourcesResponse {
            sources: vec!["Uniswap_V3".into(), "Ambient".into(), "0x_RFQ".into()],
        };
        let sources = list_liquidity_sources(&catalog);
        assert_eq!(sources, catalog.sources);
        let rendered = Report::LiquiditySources {
            chain_id: crate::model::SCROLL_CHAIN_ID,
            sources,
        }
        .to_string();
        assert_eq!(
            rendered,
            "Liquidity sources for Scroll chain:\n\t Uniswap_V3\n\t Ambient\n\t 0x_RFQ"
        );
    }

    #[test]
    fn breakdown_renders_percentages() {
        let shares = report_source_breakdown(&quote(vec![("Uniswap_V3", 8000), ("Curve", 2000)]))
            .unwrap();
        assert_eq!(
            Report::SourceBreakdown(shares).to_string(),
            "2 Sources\nUniswap_V3: 80%\nCurve: 20%"
        );
    }

    #[test]
    fn fees_render_as_json() {
        let rendered = Report::Fees(json!({ "gasFee": null })).to_string();
        assert_eq!(rendered, "fee {\n  \"gasFee\": null\n}");
    }
}
