//! TWSE (Taiwan Stock Exchange) adapter.
//!
//! The after-trading endpoints respond with JSON table objects: a `stat`
//! field that reads `"OK"` only when the query produced data, plus either a
//! flat `data` array or a `tables[i].data` array of rows. Row dates are
//! ROC-era, query dates compact Gregorian (`yyyyMMdd`). A non-`OK` `stat`
//! is the provider's "no data for this date" shape (holidays, weekends,
//! queries outside retention) and arrives at the assembler as an empty
//! table.
//!
//! Instrument listings come from the ISIN registry pages instead, which are
//! Big5-encoded HTML.

use std::sync::Arc;

use serde_json::Value;
use time::Date;
use tracing::{debug, warn};

use super::transport_error;
use crate::calendar;
use crate::clock::{Clock, SystemClock};
use crate::decode::{self, TextEncoding};
use crate::domain::{
    InstitutionalNetFlow, ListedInstrument, MarginBalance, MarketBreadth, TradeSummary,
};
use crate::error::SourceError;
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::schema::{
    self, CellParse, CellRef, DateColumn, DateStyle, FieldSpec, MetricSchema, RowRef, RowSelector,
};
use crate::source::{Market, ProviderId};
use crate::table::Table;

/// FMTQIK `data` rows: ROC date, trade volume, trade value, transaction
/// count, weighted index, index change.
const MARKET_TRADES: MetricSchema = MetricSchema {
    metric: "twse.market_trades",
    header: None,
    selector: RowSelector {
        date: Some(DateColumn {
            column: 0,
            style: DateStyle::RocSlash,
        }),
        filters: &[],
    },
    fields: &[
        FieldSpec::cell("trade_volume", RowRef::Selected, 1),
        FieldSpec::cell("trade_value", RowRef::Selected, 2),
        FieldSpec::cell("transaction", RowRef::Selected, 3),
        FieldSpec::cell("price", RowRef::Selected, 4),
        FieldSpec::cell("change", RowRef::Selected, 5),
    ],
};

/// MI_INDEX `tables[7]` rows are fixed categories (up, down, unchanged,
/// untraded, no-comparable-price) with the count in column 2. The up and
/// down cells pack limit counts parenthetically; the last two categories
/// fold into `unmatched`.
const MARKET_BREADTH: MetricSchema = MetricSchema {
    metric: "twse.market_breadth",
    header: None,
    selector: RowSelector::NONE,
    fields: &[
        FieldSpec::composite("up", RowRef::Index(0), 2, CellParse::CompositePrimary),
        FieldSpec::composite("limit_up", RowRef::Index(0), 2, CellParse::CompositeSecondary),
        FieldSpec::composite("down", RowRef::Index(1), 2, CellParse::CompositePrimary),
        FieldSpec::composite("limit_down", RowRef::Index(1), 2, CellParse::CompositeSecondary),
        FieldSpec::cell("unchanged", RowRef::Index(2), 2),
        FieldSpec::sum("unmatched", &[CellRef::at(3, 2), CellRef::at(4, 2)]),
    ],
};

/// BFI82U rows are fixed categories (dealers self-trading, dealers hedging,
/// investment trust, foreign, foreign dealers) with net buy/sell value in
/// column 3. Foreign and dealer aggregates are sums of their two sub-rows.
const INSTITUTIONAL_NET_FLOW: MetricSchema = MetricSchema {
    metric: "twse.institutional_net_flow",
    header: None,
    selector: RowSelector::NONE,
    fields: &[
        FieldSpec::sum("fini_net_buy_sell", &[CellRef::at(3, 3), CellRef::at(4, 3)]),
        FieldSpec::cell("sitc_net_buy_sell", RowRef::Index(2), 3),
        FieldSpec::sum("dealers_net_buy_sell", &[CellRef::at(0, 3), CellRef::at(1, 3)]),
    ],
};

/// MI_MARGN (selectType=MS) `tables[0]` rows: margin contracts, short
/// contracts, margin value. Column 4 is the previous-day balance, column 5
/// today's; changes are declared as differences so a legitimate zero
/// balance stays `Some(0.0)` rather than becoming absent.
const MARGIN_BALANCE: MetricSchema = MetricSchema {
    metric: "twse.margin_balance",
    header: None,
    selector: RowSelector::NONE,
    fields: &[
        FieldSpec::cell("margin_balance", RowRef::Index(0), 5),
        FieldSpec::diff("margin_balance_change", CellRef::at(0, 5), CellRef::at(0, 4)),
        FieldSpec::cell("margin_balance_value", RowRef::Index(2), 5),
        FieldSpec::diff(
            "margin_balance_value_change",
            CellRef::at(2, 5),
            CellRef::at(2, 4),
        ),
        FieldSpec::cell("short_balance", RowRef::Index(1), 5),
        FieldSpec::diff("short_balance_change", CellRef::at(1, 5), CellRef::at(1, 4)),
    ],
};

/// Adapter for the centralized (TSE) market statistics endpoints.
#[derive(Clone)]
pub struct TwseAdapter {
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    base_url: String,
    isin_base_url: String,
}

impl Default for TwseAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            clock: Arc::new(SystemClock),
            base_url: String::from("https://www.twse.com.tw/rwd/zh"),
            isin_base_url: String::from("https://isin.twse.com.tw/isin"),
        }
    }
}

impl TwseAdapter {
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_isin_base_url(mut self, isin_base_url: impl Into<String>) -> Self {
        self.isin_base_url = isin_base_url.into();
        self
    }

    fn resolve_date(&self, date: Option<Date>) -> Date {
        date.unwrap_or_else(|| self.clock.today())
    }

    /// Daily aggregate trading for the centralized market.
    pub async fn market_trades(
        &self,
        date: Option<Date>,
    ) -> Result<Option<TradeSummary>, SourceError> {
        let date = self.resolve_date(date);
        let url = format!(
            "{}/afterTrading/FMTQIK?date={}&response=json",
            self.base_url,
            calendar::to_compact(date)
        );
        let payload = self.fetch_json(&url).await?;
        let table = data_table(&payload);

        Ok(
            schema::assemble(&table, &MARKET_TRADES, date).map(|record| TradeSummary {
                date: record.date(),
                trade_volume: record.value("trade_volume"),
                trade_value: record.value("trade_value"),
                transaction: record.value("transaction"),
                price: record.value("price"),
                change: record.value("change"),
            }),
        )
    }

    /// Advancing/declining issue counts.
    pub async fn market_breadth(
        &self,
        date: Option<Date>,
    ) -> Result<Option<MarketBreadth>, SourceError> {
        let date = self.resolve_date(date);
        let url = format!(
            "{}/afterTrading/MI_INDEX?date={}&response=json",
            self.base_url,
            calendar::to_compact(date)
        );
        let payload = self.fetch_json(&url).await?;
        let table = nested_table(&payload, 7);

        Ok(
            schema::assemble(&table, &MARKET_BREADTH, date).map(|record| MarketBreadth {
                date: record.date(),
                up: record.value("up"),
                limit_up: record.value("limit_up"),
                down: record.value("down"),
                limit_down: record.value("limit_down"),
                unchanged: record.value("unchanged"),
                unmatched: record.value("unmatched"),
            }),
        )
    }

    /// Net buy/sell value of the three institutional investor categories.
    pub async fn institutional_net_flow(
        &self,
        date: Option<Date>,
    ) -> Result<Option<InstitutionalNetFlow>, SourceError> {
        let date = self.resolve_date(date);
        let url = format!(
            "{}/fund/BFI82U?dayDate={}&type=day&response=json",
            self.base_url,
            calendar::to_compact(date)
        );
        let payload = self.fetch_json(&url).await?;
        let table = data_table(&payload);

        Ok(schema::assemble(&table, &INSTITUTIONAL_NET_FLOW, date).map(|record| {
            InstitutionalNetFlow {
                date: record.date(),
                fini_net_buy_sell: record.value("fini_net_buy_sell"),
                sitc_net_buy_sell: record.value("sitc_net_buy_sell"),
                dealers_net_buy_sell: record.value("dealers_net_buy_sell"),
            }
        }))
    }

    /// Outstanding margin and short-sale balances.
    pub async fn margin_balance(
        &self,
        date: Option<Date>,
    ) -> Result<Option<MarginBalance>, SourceError> {
        let date = self.resolve_date(date);
        let url = format!(
            "{}/marginTrading/MI_MARGN?date={}&selectType=MS&response=json",
            self.base_url,
            calendar::to_compact(date)
        );
        let payload = self.fetch_json(&url).await?;
        let table = nested_table(&payload, 0);

        Ok(
            schema::assemble(&table, &MARGIN_BALANCE, date).map(|record| MarginBalance {
                date: record.date(),
                margin_balance: record.value("margin_balance"),
                margin_balance_change: record.value("margin_balance_change"),
                margin_balance_value: record.value("margin_balance_value"),
                margin_balance_value_change: record.value("margin_balance_value_change"),
                short_balance: record.value("short_balance"),
                short_balance_change: record.value("short_balance_change"),
            }),
        )
    }

    /// Listed instruments from the ISIN registry pages (Big5 HTML).
    ///
    /// A page that fails to decode yields an empty listing, not an error.
    pub async fn listed_instruments(
        &self,
        market: Market,
    ) -> Result<Vec<ListedInstrument>, SourceError> {
        let url = match market {
            Market::Tse => format!("{}/class_main.jsp?market=1&issuetype=1", self.isin_base_url),
            Market::Otc => format!("{}/class_main.jsp?market=2&issuetype=4", self.isin_base_url),
        };
        debug!(provider = %ProviderId::Twse, %url, "fetching listing page");

        let response = self
            .http_client
            .execute(HttpRequest::get(&url))
            .await
            .map_err(|error| transport_error(ProviderId::Twse, error))?;
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "twse upstream returned status {}",
                response.status
            )));
        }

        let Some(page) = decode::decode(&response.body, TextEncoding::Big5) else {
            warn!(provider = %ProviderId::Twse, %url, "listing page failed to decode");
            return Ok(Vec::new());
        };

        let table = Table::from_html(&page, ".h4 tr");
        let instruments = table
            .rows()
            .iter()
            .skip(1)
            .filter_map(|row| {
                let symbol = row.get(2)?;
                if symbol.is_empty() {
                    return None;
                }
                Some(ListedInstrument {
                    symbol: symbol.clone(),
                    name: row.get(3)?.clone(),
                    market,
                    industry: row.get(6).filter(|industry| !industry.is_empty()).cloned(),
                })
            })
            .collect();
        Ok(instruments)
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, SourceError> {
        debug!(provider = %ProviderId::Twse, %url, "fetching");
        let response = self
            .http_client
            .execute(HttpRequest::get(url))
            .await
            .map_err(|error| transport_error(ProviderId::Twse, error))?;
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "twse upstream returned status {}",
                response.status
            )));
        }

        serde_json::from_slice(&response.body)
            .map_err(|error| SourceError::internal(format!("failed to parse twse response: {error}")))
    }
}

fn stat_ok(payload: &Value) -> bool {
    payload.get("stat").and_then(Value::as_str) == Some("OK")
}

fn data_table(payload: &Value) -> Table {
    if !stat_ok(payload) {
        return Table::default();
    }
    payload
        .get("data")
        .and_then(Value::as_array)
        .map(|rows| Table::from_json_rows(rows))
        .unwrap_or_default()
}

fn nested_table(payload: &Value, index: usize) -> Table {
    if !stat_ok(payload) {
        return Table::default();
    }
    payload
        .get("tables")
        .and_then(Value::as_array)
        .and_then(|tables| tables.get(index))
        .and_then(|table| table.get("data"))
        .and_then(Value::as_array)
        .map(|rows| Table::from_json_rows(rows))
        .unwrap_or_default()
}
