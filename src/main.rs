//! Swap quote reporter for the 0x swap API.
//! For one sell/buy token pair it prints:
//! - the percentage breakdown of liquidity sources filling the quote
//! - the affiliate fee summary of a fee-augmented quote
//! - buy/sell tax of both tokens
//! - every liquidity source available on the chain

mod chain;
mod config;
mod error;
mod model;
mod report;
mod runner;
mod swap_client;

use anyhow::{bail, Result};
use config::{Credentials, ReportConfig};
use model::{chain_name, SwapFee, SwapQuoteRequest};
use runner::ReportRunner;
use structopt::StructOpt;
use swap_client::ZeroExClient;

#[derive(StructOpt, Debug)]
#[structopt(name = "swap_quote_report")]
struct Cli {
    /// Optional TOML file overriding the default token pair and API settings
    #[structopt(short, long)]
    config: Option<String>,

    /// Human-readable sell amount, e.g. 0.1
    #[structopt(long)]
    sell_amount: Option<String>,

    /// Affiliate fee in basis points
    #[structopt(long)]
    fee_bps: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::from_args();

    // secrets first: nothing touches the network until they are all present
    if !config::load_dotenv()? {
        log::debug!("no .env file found, using process environment");
    }
    let creds = Credentials::from_env()?;

    let mut cfg = match &args.config {
        Some(path) => ReportConfig::from_file(path)?,
        None => ReportConfig::default(),
    };
    if let Some(amount) = args.sell_amount {
        cfg.sell_amount = amount;
    }
    if let Some(bps) = args.fee_bps {
        cfg.fee_bps = bps;
    }
    let pair = cfg.validate()?;

    let signer = chain::signer_from_key(&creds.private_key)?;
    let taker = signer.address();
    log::info!("taker {} on {}", taker, chain_name(cfg.chain_id));

    match chain::rpc_chain_id(&creds.rpc_url).await {
        Ok(id) if id != cfg.chain_id => log::warn!(
            "RPC endpoint reports chain {id}, reports are requested for chain {}",
            cfg.chain_id
        ),
        Ok(_) => {}
        Err(e) => log::warn!("could not confirm RPC chain id: {e}"),
    }

    let decimals = chain::token_decimals(&creds.rpc_url, pair.sell_token).await?;
    let sell_amount = chain::to_base_units(&cfg.sell_amount, decimals)?;

    let request =
        SwapQuoteRequest::new(cfg.chain_id, pair.sell_token, pair.buy_token, sell_amount, taker)?;
    let fee = SwapFee {
        recipient: pair.fee_recipient.unwrap_or(taker),
        bps: cfg.fee_bps,
        token: pair.fee_token.unwrap_or(pair.buy_token),
    };

    let client = ZeroExClient::new(
        &cfg.api_url,
        &creds.api_key,
        cfg.request_timeout(),
        cfg.connect_timeout(),
    )?;
    let runner = ReportRunner::new(client, request, fee);

    let mut failed = 0;
    for outcome in runner.run().await {
        match outcome.result {
            Ok(report) => println!("{report}"),
            Err(e) => {
                failed += 1;
                log::error!("{} report failed: {e}", outcome.kind);
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of 4 reports failed");
    }
    Ok(())
}
