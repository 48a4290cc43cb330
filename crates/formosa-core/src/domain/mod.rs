//! Canonical domain records shared by all provider adapters.

mod records;
mod trading_date;

pub use records::{
    FuturesMarketOi, InstitutionalFuturesOi, InstitutionalNetFlow, InstitutionalOptionsOi,
    ListedInstrument, MarginBalance, MarketBreadth, RetailPosition, TradeSummary,
};
pub use trading_date::TradingDate;
