use std::fmt;

use crate::error::Result;
use crate::model::{SwapFee, SwapQuoteRequest};
use crate::report::{
    list_liquidity_sources, report_fees, report_source_breakdown, report_token_taxes, Report,
};
use crate::swap_client::SwapApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    SourceBreakdown,
    Fees,
    Taxes,
    LiquiditySources,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportKind::SourceBreakdown => "source breakdown",
            ReportKind::Fees => "affiliate fees",
            ReportKind::Taxes => "token taxes",
            ReportKind::LiquiditySources => "liquidity sources",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct ReportOutcome {
    pub kind: ReportKind,
    pub result: Result<Report>,
}

pub struct ReportRunner<A> {
    api: A,
    request: SwapQuoteRequest,
    fee: SwapFee,
}

impl<A: SwapApi> ReportRunner<A> {
    pub fn new(api: A, request: SwapQuoteRequest, fee: SwapFee) -> Self {
        Self { api, request, fee }
    }

    /// Fetches every report's data concurrently and returns the outcomes in
    /// print order. A failed fetch only fails its own report.
    pub async fn run(&self) -> Vec<ReportOutcome> {
        let chain_id = self.request.chain_id;
        let fee_request = self.request.with_fee(self.fee.clone());

        let (price, quote, catalog, fee_quote) = tokio::join!(
            self.api.price(&self.request),
            self.api.quote(&self.request),
            self.api.sources(chain_id),
            self.api.quote(&fee_request),
        );

        vec![
            ReportOutcome {
                kind: ReportKind::SourceBreakdown,
                result: quote
                    .and_then(|q| report_source_breakdown(&q))
                    .map(Report::SourceBreakdown),
            },
            ReportOutcome {
                kind: ReportKind::Fees,
                result: fee_quote.and_then(|q| report_fees(&q)).map(Report::Fees),
            },
            ReportOutcome {
                kind: ReportKind::Taxes,
                result: price.and_then(|p| report_token_taxes(&p)).map(Report::Taxes),
            },
            ReportOutcome {
                kind: ReportKind::LiquiditySources,
                result: catalog.map(|c| Report::LiquiditySources {
                    chain_id,
                    sources: list_liquidity_sources(&c),
                }),
            },
        ]
    }
}
