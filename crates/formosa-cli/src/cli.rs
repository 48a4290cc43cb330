//! CLI argument definitions for formosa.
//!
//! Every fetch command takes the same shape: an optional `--date` (ISO,
//! defaults to today in exchange-local time) and a record printed as JSON,
//! `null` when the provider reports no data for that date.
//!
//! # Commands
//!
//! | Command | Source | Description |
//! |---------|--------|-------------|
//! | `trades` | TWSE/TPEx | Daily aggregate market trading |
//! | `breadth` | TWSE | Advancing/declining issue counts |
//! | `institutional` | TWSE | Institutional net buy/sell value |
//! | `margin` | TWSE | Margin and short-sale balances |
//! | `futures-oi` | TAIFEX | Institutional TXF open interest |
//! | `market-oi` | TAIFEX | Total TX open interest |
//! | `options-oi` | TAIFEX | Institutional TXO open interest |
//! | `retail` | TAIFEX | Derived retail TX positioning |
//! | `instruments` | TWSE ISIN | Listed instrument registry |

use clap::{Args, Parser, Subcommand, ValueEnum};

use formosa_core::Market;

/// End-of-day Taiwan market statistics fetcher.
#[derive(Debug, Parser)]
#[command(
    name = "formosa",
    author,
    version,
    about = "End-of-day Taiwan market statistics (TWSE, TPEx, TAIFEX)"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Trading date to query (ISO, e.g. 2024-05-02). Defaults to today in
    /// exchange-local time.
    #[arg(long, global = true)]
    pub date: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Market selector shared by the commands that exist per market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarketSelector {
    /// Centralized market (TWSE).
    Tse,
    /// Over-the-counter market (TPEx).
    Otc,
}

impl From<MarketSelector> for Market {
    fn from(selector: MarketSelector) -> Self {
        match selector {
            MarketSelector::Tse => Market::Tse,
            MarketSelector::Otc => Market::Otc,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Daily aggregate trading for one equity market.
    Trades(MarketArgs),

    /// Advancing/declining issue counts for the centralized market.
    Breadth,

    /// Institutional investor net buy/sell value.
    Institutional,

    /// Outstanding margin and short-sale balances.
    Margin,

    /// Institutional TXF futures open-interest positions.
    FuturesOi,

    /// Total TX open interest, regular session.
    MarketOi,

    /// Institutional TXO options open-interest positions.
    OptionsOi,

    /// Derived retail TX futures positioning.
    Retail,

    /// Listed instruments from the ISIN registry.
    Instruments(MarketArgs),
}

/// Arguments for commands that exist per equity market.
#[derive(Debug, Args)]
pub struct MarketArgs {
    /// Which market to query.
    #[arg(long, value_enum, default_value_t = MarketSelector::Tse)]
    pub market: MarketSelector,
}
