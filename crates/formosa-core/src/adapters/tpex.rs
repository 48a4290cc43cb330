//! TPEx (Taipei Exchange) adapter.
//!
//! The after-trading endpoint takes its query date as a ROC-era string and
//! answers with a DataTables-style JSON object: `iTotalRecords` counts the
//! rows in `aaData`. Zero records is the provider's "no data" shape and
//! arrives at the assembler as an empty table.

use std::sync::Arc;

use serde_json::Value;
use time::Date;
use tracing::debug;

use super::transport_error;
use crate::calendar;
use crate::clock::{Clock, SystemClock};
use crate::domain::TradeSummary;
use crate::error::SourceError;
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::schema::{self, DateColumn, DateStyle, FieldSpec, MetricSchema, RowRef, RowSelector};
use crate::source::ProviderId;
use crate::table::Table;

/// st41 `aaData` rows: ROC date, trade volume (thousand shares), trade
/// value (thousand dollars), transaction count, weighted index, index
/// change.
const MARKET_TRADES: MetricSchema = MetricSchema {
    metric: "tpex.market_trades",
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

/// Adapter for the over-the-counter (OTC) market statistics endpoints.
#[derive(Clone)]
pub struct TpexAdapter {
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl Default for TpexAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            clock: Arc::new(SystemClock),
            base_url: String::from("https://www.tpex.org.tw/web/stock/aftertrading"),
        }
    }
}

impl TpexAdapter {
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

    fn resolve_date(&self, date: Option<Date>) -> Date {
        date.unwrap_or_else(|| self.clock.today())
    }

    /// Daily aggregate trading for the OTC market.
    pub async fn market_trades(
        &self,
        date: Option<Date>,
    ) -> Result<Option<TradeSummary>, SourceError> {
        let date = self.resolve_date(date);
        let url = format!(
            "{}/daily_trading_index/st41_result.php?d={}&o=json",
            self.base_url,
            urlencoding::encode(&calendar::to_roc(date))
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

    async fn fetch_json(&self, url: &str) -> Result<Value, SourceError> {
        debug!(provider = %ProviderId::Tpex, %url, "fetching");
        let response = self
            .http_client
            .execute(HttpRequest::get(url))
            .await
            .map_err(|error| transport_error(ProviderId::Tpex, error))?;
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "tpex upstream returned status {}",
                response.status
            )));
        }

        serde_json::from_slice(&response.body)
            .map_err(|error| SourceError::internal(format!("failed to parse tpex response: {error}")))
    }
}

fn data_table(payload: &Value) -> Table {
    let records = payload
        .get("iTotalRecords")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    if records == 0 {
        return Table::default();
    }
    payload
        .get("aaData")
        .and_then(Value::as_array)
        .map(|rows| Table::from_json_rows(rows))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::http_client::{HttpError, HttpResponse};
    use std::future::Future;
    use std::pin::Pin;
    use time::macros::date;

    struct StaticHttpClient {
        response: Result<HttpResponse, HttpError>,
    }

    impl StaticHttpClient {
        fn json(body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(HttpResponse::ok_json(body)),
            })
        }
    }

    impl HttpClient for StaticHttpClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn adapter(client: Arc<StaticHttpClient>) -> TpexAdapter {
        TpexAdapter::default()
            .with_http_client(client)
            .with_clock(Arc::new(FixedClock(date!(2024 - 05 - 02))))
    }

    #[tokio::test]
    async fn market_trades_matches_requested_roc_date() {
        let client = StaticHttpClient::json(
            r#"{"iTotalRecords":2,"aaData":[
                ["113/05/01","600,000","20,000","300,000","230.00","-1.50"],
                ["113/05/02","650,000","23,500","310,000","231.51","1.51"]
            ]}"#,
        );
        let record = adapter(client)
            .market_trades(None)
            .await
            .expect("fetch must succeed")
            .expect("date is present in table");

        assert_eq!(record.date.format_iso(), "2024-05-02");
        assert_eq!(record.trade_value, Some(23_500.0));
        assert_eq!(record.price, Some(231.51));
    }

    #[tokio::test]
    async fn zero_total_records_is_no_data() {
        let client = StaticHttpClient::json(r#"{"iTotalRecords":0,"aaData":[]}"#);
        let record = adapter(client)
            .market_trades(None)
            .await
            .expect("fetch must succeed");
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn other_dates_only_is_no_data() {
        let client = StaticHttpClient::json(
            r#"{"iTotalRecords":1,"aaData":[
                ["113/04/30","1","2","3","4","5"]
            ]}"#,
        );
        let record = adapter(client)
            .market_trades(None)
            .await
            .expect("fetch must succeed");
        assert!(record.is_none());
    }
}
