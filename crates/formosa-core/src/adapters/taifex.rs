//! TAIFEX (Taiwan Futures Exchange) adapter.
//!
//! The download endpoints take their query as a POST form with slash-dated
//! Gregorian start/end fields and answer with a Big5-encoded CSV file.
//! Validity is signalled in-band: the first cell of a data-bearing file is
//! the date header label, anything else (error pages, empty downloads) is
//! "no data". A payload that fails Big5 decoding is treated the same way.
//!
//! The retail positioning metric is derived here because both of its
//! inputs come from this provider; the two fetches fan out concurrently
//! and fan in with an all-or-nothing join.

use std::sync::Arc;

use time::Date;
use tracing::{debug, warn};

use super::transport_error;
use crate::calendar;
use crate::clock::{Clock, SystemClock};
use crate::decode::{self, TextEncoding};
use crate::derive;
use crate::domain::{
    FuturesMarketOi, InstitutionalFuturesOi, InstitutionalOptionsOi, RetailPosition,
};
use crate::error::SourceError;
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::schema::{
    self, CellRef, DateColumn, DateStyle, FieldSpec, HeaderCell, MetricSchema, RowRef, RowSelector,
};
use crate::source::ProviderId;
use crate::table::Table;

/// futContractsDateDown (single commodity): rows 1..=3 are dealers, trust,
/// foreign. Column 9 is long OI, 11 short OI, 13 net OI.
const INSTITUTIONAL_TXF_OI: MetricSchema = MetricSchema {
    metric: "taifex.institutional_futures_oi",
    header: Some(HeaderCell {
        row: 0,
        column: 0,
        value: "日期",
    }),
    selector: RowSelector::NONE,
    fields: &[
        FieldSpec::cell("dealers_net_oi", RowRef::Index(1), 13),
        FieldSpec::cell("sitc_net_oi", RowRef::Index(2), 13),
        FieldSpec::cell("fini_net_oi", RowRef::Index(3), 13),
        FieldSpec::sum(
            "long_oi",
            &[CellRef::at(1, 9), CellRef::at(2, 9), CellRef::at(3, 9)],
        ),
        FieldSpec::sum(
            "short_oi",
            &[CellRef::at(1, 11), CellRef::at(2, 11), CellRef::at(3, 11)],
        ),
    ],
};

/// futDataDown: one row per expiry month and session. Column 1 is the
/// contract code, 17 the session label, 11 open interest. Market OI is the
/// regular-session sum across expiry months.
const MARKET_TX_OI: MetricSchema = MetricSchema {
    metric: "taifex.market_oi",
    header: Some(HeaderCell {
        row: 0,
        column: 0,
        value: "交易日期",
    }),
    selector: RowSelector {
        date: Some(DateColumn {
            column: 0,
            style: DateStyle::GregorianSlash,
        }),
        filters: &[(1, "TX"), (17, "一般")],
    },
    fields: &[FieldSpec::sum_selected("open_interest", 11)],
};

/// callsAndPutsDateDown (single commodity): rows 1..=3 are the call side
/// (dealers, trust, foreign), rows 4..=6 the put side. Column 14 is net OI
/// in contracts, 15 net OI value in thousand dollars.
const INSTITUTIONAL_TXO_OI: MetricSchema = MetricSchema {
    metric: "taifex.institutional_options_oi",
    header: Some(HeaderCell {
        row: 0,
        column: 0,
        value: "日期",
    }),
    selector: RowSelector::NONE,
    fields: &[
        FieldSpec::cell("dealers_calls_net_oi", RowRef::Index(1), 14),
        FieldSpec::cell("dealers_calls_net_oi_value", RowRef::Index(1), 15),
        FieldSpec::cell("sitc_calls_net_oi", RowRef::Index(2), 14),
        FieldSpec::cell("sitc_calls_net_oi_value", RowRef::Index(2), 15),
        FieldSpec::cell("fini_calls_net_oi", RowRef::Index(3), 14),
        FieldSpec::cell("fini_calls_net_oi_value", RowRef::Index(3), 15),
        FieldSpec::cell("dealers_puts_net_oi", RowRef::Index(4), 14),
        FieldSpec::cell("dealers_puts_net_oi_value", RowRef::Index(4), 15),
        FieldSpec::cell("sitc_puts_net_oi", RowRef::Index(5), 14),
        FieldSpec::cell("sitc_puts_net_oi_value", RowRef::Index(5), 15),
        FieldSpec::cell("fini_puts_net_oi", RowRef::Index(6), 14),
        FieldSpec::cell("fini_puts_net_oi_value", RowRef::Index(6), 15),
    ],
};

/// Adapter for the futures exchange CSV download endpoints.
#[derive(Clone)]
pub struct TaifexAdapter {
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl Default for TaifexAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            clock: Arc::new(SystemClock),
            base_url: String::from("https://www.taifex.com.tw/cht"),
        }
    }
}

impl TaifexAdapter {
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

    /// Institutional open-interest positions in TXF (index futures).
    pub async fn institutional_futures_oi(
        &self,
        date: Option<Date>,
    ) -> Result<Option<InstitutionalFuturesOi>, SourceError> {
        let date = self.resolve_date(date);
        let day = calendar::to_slash(date);
        let table = self
            .fetch_csv(
                "/3/futContractsDateDown",
                &[
                    ("queryStartDate", day.as_str()),
                    ("queryEndDate", day.as_str()),
                    ("commodityId", "TXF"),
                ],
            )
            .await?;

        Ok(table
            .and_then(|table| schema::assemble(&table, &INSTITUTIONAL_TXF_OI, date))
            .map(|record| InstitutionalFuturesOi {
                date: record.date(),
                dealers_net_oi: record.value("dealers_net_oi"),
                sitc_net_oi: record.value("sitc_net_oi"),
                fini_net_oi: record.value("fini_net_oi"),
                long_oi: record.value("long_oi"),
                short_oi: record.value("short_oi"),
            }))
    }

    /// Total TX open interest, regular session, summed across expiry
    /// months.
    pub async fn market_oi(
        &self,
        date: Option<Date>,
    ) -> Result<Option<FuturesMarketOi>, SourceError> {
        let date = self.resolve_date(date);
        let day = calendar::to_slash(date);
        let table = self
            .fetch_csv(
                "/3/futDataDown",
                &[
                    ("down_type", "1"),
                    ("queryStartDate", day.as_str()),
                    ("queryEndDate", day.as_str()),
                    ("commodity_id", "TX"),
                ],
            )
            .await?;

        Ok(table
            .and_then(|table| schema::assemble(&table, &MARKET_TX_OI, date))
            .map(|record| FuturesMarketOi {
                date: record.date(),
                open_interest: record.value("open_interest"),
            }))
    }

    /// Institutional open-interest positions in TXO (index options).
    pub async fn institutional_options_oi(
        &self,
        date: Option<Date>,
    ) -> Result<Option<InstitutionalOptionsOi>, SourceError> {
        let date = self.resolve_date(date);
        let day = calendar::to_slash(date);
        let table = self
            .fetch_csv(
                "/3/callsAndPutsDateDown",
                &[
                    ("queryStartDate", day.as_str()),
                    ("queryEndDate", day.as_str()),
                    ("commodityId", "TXO"),
                ],
            )
            .await?;

        Ok(table
            .and_then(|table| schema::assemble(&table, &INSTITUTIONAL_TXO_OI, date))
            .map(|record| InstitutionalOptionsOi {
                date: record.date(),
                fini_calls_net_oi: record.value("fini_calls_net_oi"),
                fini_calls_net_oi_value: record.value("fini_calls_net_oi_value"),
                sitc_calls_net_oi: record.value("sitc_calls_net_oi"),
                sitc_calls_net_oi_value: record.value("sitc_calls_net_oi_value"),
                dealers_calls_net_oi: record.value("dealers_calls_net_oi"),
                dealers_calls_net_oi_value: record.value("dealers_calls_net_oi_value"),
                fini_puts_net_oi: record.value("fini_puts_net_oi"),
                fini_puts_net_oi_value: record.value("fini_puts_net_oi_value"),
                sitc_puts_net_oi: record.value("sitc_puts_net_oi"),
                sitc_puts_net_oi_value: record.value("sitc_puts_net_oi_value"),
                dealers_puts_net_oi: record.value("dealers_puts_net_oi"),
                dealers_puts_net_oi_value: record.value("dealers_puts_net_oi_value"),
            }))
    }

    /// Inferred retail TX positioning: market OI and the institutional
    /// aggregate fetched concurrently, joined all-or-nothing, then derived.
    pub async fn retail_position(
        &self,
        date: Option<Date>,
    ) -> Result<Option<RetailPosition>, SourceError> {
        let date = self.resolve_date(date);
        let (market, institutional) = tokio::try_join!(
            self.market_oi(Some(date)),
            self.institutional_futures_oi(Some(date))
        )?;

        Ok(derive::join_present(market, institutional)
            .and_then(|(market, institutional)| derive::retail_position(&market, &institutional)))
    }

    /// POST a download form and decode the Big5 CSV body into a table.
    ///
    /// `Ok(None)` means the payload could not be decoded; downstream this
    /// is indistinguishable from a valid "no data" file, by the same
    /// absence-as-value rule.
    async fn fetch_csv(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<Option<Table>, SourceError> {
        let url = format!("{}{path}", self.base_url);
        debug!(provider = %ProviderId::Taifex, %url, "fetching");

        let response = self
            .http_client
            .execute(HttpRequest::post(&url).with_form(form))
            .await
            .map_err(|error| transport_error(ProviderId::Taifex, error))?;
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "taifex upstream returned status {}",
                response.status
            )));
        }

        let Some(text) = decode::decode(&response.body, TextEncoding::Big5) else {
            warn!(provider = %ProviderId::Taifex, %url, "payload failed to decode");
            return Ok(None);
        };
        Ok(Some(Table::from_csv(&text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::http_client::{HttpError, HttpResponse};
    use encoding_rs::BIG5;
    use std::future::Future;
    use std::pin::Pin;
    use time::macros::date;

    struct StaticHttpClient {
        response: Result<HttpResponse, HttpError>,
    }

    impl StaticHttpClient {
        fn big5_csv(text: &str) -> Arc<Self> {
            let (bytes, _, _) = BIG5.encode(text);
            Arc::new(Self {
                response: Ok(HttpResponse::ok(bytes.into_owned())),
            })
        }

        fn bytes(body: Vec<u8>) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(HttpResponse::ok(body)),
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

    fn adapter(client: Arc<StaticHttpClient>) -> TaifexAdapter {
        TaifexAdapter::default()
            .with_http_client(client)
            .with_clock(Arc::new(FixedClock(date!(2024 - 05 - 02))))
    }

    fn institutional_csv() -> String {
        let mut csv = String::from(
            "日期,商品名稱,身份別,多方交易口數,多方契約金額,空方交易口數,空方契約金額,\
             多空交易口數淨額,多空契約金額淨額,多方未平倉口數,多方未平倉契約金額,\
             空方未平倉口數,空方未平倉契約金額,多空未平倉口數淨額,多空未平倉契約金額淨額\n",
        );
        csv.push_str(
            "2024/05/02,臺股期貨,自營商,100,1,200,2,-100,-1,10000,1,12000,2,-2000,-1\n",
        );
        csv.push_str("2024/05/02,臺股期貨,投信,50,1,20,2,30,1,9000,1,1000,2,8000,1\n");
        csv.push_str(
            "2024/05/02,臺股期貨,外資及陸資,300,1,250,2,50,1,41000,1,37000,2,4000,1\n",
        );
        csv
    }

    #[tokio::test]
    async fn institutional_oi_sums_category_rows() {
        let record = adapter(StaticHttpClient::big5_csv(&institutional_csv()))
            .institutional_futures_oi(None)
            .await
            .expect("fetch must succeed")
            .expect("table is valid");

        assert_eq!(record.dealers_net_oi, Some(-2000.0));
        assert_eq!(record.sitc_net_oi, Some(8000.0));
        assert_eq!(record.fini_net_oi, Some(4000.0));
        assert_eq!(record.long_oi, Some(60_000.0));
        assert_eq!(record.short_oi, Some(50_000.0));
    }

    #[tokio::test]
    async fn missing_header_label_is_no_data() {
        let record = adapter(StaticHttpClient::big5_csv("查詢日期不在範圍內\n"))
            .institutional_futures_oi(None)
            .await
            .expect("fetch must succeed");
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn undecodable_payload_is_no_data() {
        let record = adapter(StaticHttpClient::bytes(vec![0xFF, 0xFF, 0xFF]))
            .institutional_futures_oi(None)
            .await
            .expect("fetch must succeed");
        assert!(record.is_none());
    }

    fn market_csv() -> String {
        let mut csv = String::from(
            "交易日期,契約,到期月份(週別),開盤價,最高價,最低價,收盤價,漲跌價,漲跌%,\
             成交量,結算價,未沖銷契約數,最後最佳買價,最後最佳賣價,歷史最高價,歷史最低價,\
             是否因訊息面暫停交易,交易時段\n",
        );
        csv.push_str(
            "2024/05/02,TX,202405,20400,20500,20300,20450,50,0.2,100000,20450,80000,1,2,3,4,,一般\n",
        );
        csv.push_str(
            "2024/05/02,TX,202406,20300,20400,20200,20350,50,0.2,5000,20350,20000,1,2,3,4,,一般\n",
        );
        csv.push_str(
            "2024/05/02,TX,202405,20400,20500,20300,20450,50,0.2,900,20450,700,1,2,3,4,,盤後\n",
        );
        csv.push_str(
            "2024/05/02,MTX,202405,5100,5125,5075,5110,10,0.2,3000,5110,600,1,2,3,4,,一般\n",
        );
        csv
    }

    #[tokio::test]
    async fn market_oi_sums_regular_session_tx_rows() {
        let record = adapter(StaticHttpClient::big5_csv(&market_csv()))
            .market_oi(None)
            .await
            .expect("fetch must succeed")
            .expect("table is valid");

        assert_eq!(record.open_interest, Some(100_000.0));
    }

    #[tokio::test]
    async fn retail_position_joins_both_downloads() {
        // Both endpoints answer with the same body; the market table sums
        // to 100,000 OI and the institutional table is header-mismatched,
        // so the join must come up empty.
        let record = adapter(StaticHttpClient::big5_csv(&market_csv()))
            .retail_position(None)
            .await
            .expect("fetch must succeed");
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn options_oi_reads_call_and_put_rows() {
        let mut csv = String::from(
            "日期,商品名稱,買賣權別,身份別,買方交易口數,買方契約金額,賣方交易口數,\
             賣方契約金額,交易口數買賣淨額,契約金額買賣淨額,買方未平倉口數,\
             買方未平倉契約金額,賣方未平倉口數,賣方未平倉契約金額,未平倉口數買賣淨額,\
             未平倉契約金額買賣淨額\n",
        );
        csv.push_str("2024/05/02,臺指選擇權,買權,自營商,1,2,3,4,5,6,7,8,9,10,120,11\n");
        csv.push_str("2024/05/02,臺指選擇權,買權,投信,1,2,3,4,5,6,7,8,9,10,30,12\n");
        csv.push_str("2024/05/02,臺指選擇權,買權,外資及陸資,1,2,3,4,5,6,7,8,9,10,4400,13\n");
        csv.push_str("2024/05/02,臺指選擇權,賣權,自營商,1,2,3,4,5,6,7,8,9,10,-250,14\n");
        csv.push_str("2024/05/02,臺指選擇權,賣權,投信,1,2,3,4,5,6,7,8,9,10,0,15\n");
        csv.push_str("2024/05/02,臺指選擇權,賣權,外資及陸資,1,2,3,4,5,6,7,8,9,10,1800,16\n");

        let record = adapter(StaticHttpClient::big5_csv(&csv))
            .institutional_options_oi(None)
            .await
            .expect("fetch must succeed")
            .expect("table is valid");

        assert_eq!(record.dealers_calls_net_oi, Some(120.0));
        assert_eq!(record.sitc_calls_net_oi, Some(30.0));
        assert_eq!(record.fini_calls_net_oi, Some(4400.0));
        assert_eq!(record.dealers_puts_net_oi, Some(-250.0));
        assert_eq!(record.sitc_puts_net_oi, Some(0.0));
        assert_eq!(record.fini_puts_net_oi, Some(1800.0));
        assert_eq!(record.fini_puts_net_oi_value, Some(16.0));
    }
}
