use serde::{Deserialize, Serialize};

use crate::{Market, TradingDate};

/// End-of-day aggregate trading activity for one equity market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSummary {
    pub date: TradingDate,
    pub trade_volume: Option<f64>,
    pub trade_value: Option<f64>,
    pub transaction: Option<f64>,
    pub price: Option<f64>,
    pub change: Option<f64>,
}

/// Advancing/declining issue counts for the centralized market.
///
/// `up`/`down` carry limit-up/limit-down sub-counts packed into composite
/// cells upstream; `unmatched` folds the exchange's "no trade" and "no
/// comparable price" categories together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketBreadth {
    pub date: TradingDate,
    pub up: Option<f64>,
    pub limit_up: Option<f64>,
    pub down: Option<f64>,
    pub limit_down: Option<f64>,
    pub unchanged: Option<f64>,
    pub unmatched: Option<f64>,
}

/// Net buy/sell value of the three institutional investor categories.
///
/// Foreign institutions and dealers are each reported as two sub-rows
/// upstream (foreign + foreign dealers, self-trading + hedging); the
/// schema sums them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionalNetFlow {
    pub date: TradingDate,
    pub fini_net_buy_sell: Option<f64>,
    pub sitc_net_buy_sell: Option<f64>,
    pub dealers_net_buy_sell: Option<f64>,
}

/// Outstanding margin-financed and short-sale balances.
///
/// A zero balance is legitimate data (`Some(0.0)`), distinct from an
/// absent cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginBalance {
    pub date: TradingDate,
    pub margin_balance: Option<f64>,
    pub margin_balance_change: Option<f64>,
    pub margin_balance_value: Option<f64>,
    pub margin_balance_value_change: Option<f64>,
    pub short_balance: Option<f64>,
    pub short_balance_change: Option<f64>,
}

/// Institutional open-interest positions in one futures class.
///
/// `long_oi`/`short_oi` aggregate the dealer, trust, and foreign rows;
/// the per-category fields carry net (long minus short) contracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionalFuturesOi {
    pub date: TradingDate,
    pub dealers_net_oi: Option<f64>,
    pub sitc_net_oi: Option<f64>,
    pub fini_net_oi: Option<f64>,
    pub long_oi: Option<f64>,
    pub short_oi: Option<f64>,
}

/// Total outstanding contracts in one futures class across expiry months,
/// regular session only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuturesMarketOi {
    pub date: TradingDate,
    pub open_interest: Option<f64>,
}

/// Institutional open-interest positions in one options class, split by
/// calls and puts, in contracts and thousand-dollar notional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionalOptionsOi {
    pub date: TradingDate,
    pub fini_calls_net_oi: Option<f64>,
    pub fini_calls_net_oi_value: Option<f64>,
    pub sitc_calls_net_oi: Option<f64>,
    pub sitc_calls_net_oi_value: Option<f64>,
    pub dealers_calls_net_oi: Option<f64>,
    pub dealers_calls_net_oi_value: Option<f64>,
    pub fini_puts_net_oi: Option<f64>,
    pub fini_puts_net_oi_value: Option<f64>,
    pub sitc_puts_net_oi: Option<f64>,
    pub sitc_puts_net_oi_value: Option<f64>,
    pub dealers_puts_net_oi: Option<f64>,
    pub dealers_puts_net_oi_value: Option<f64>,
}

/// Inferred retail (non-institutional) futures positioning, derived from
/// market open interest and institutional positions fetched independently.
///
/// Never partially computed: the record exists only when both upstream
/// records and all contributing fields are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetailPosition {
    pub date: TradingDate,
    pub retail_long_oi: f64,
    pub retail_short_oi: f64,
    pub retail_net_oi: f64,
    /// Net position as a share of market open interest, rounded to four
    /// decimal places for output comparability.
    pub retail_long_short_ratio: f64,
}

/// One listed instrument from the exchange ISIN registry pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedInstrument {
    pub symbol: String,
    pub name: String,
    pub market: Market,
    pub industry: Option<String>,
}
