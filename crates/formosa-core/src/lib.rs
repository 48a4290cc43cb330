//! Core contracts for formosa.
//!
//! This crate contains:
//! - Canonical domain records and the trading-date type
//! - Provider identifiers and the HTTP transport contract
//! - Calendar, numeric, decoding, and table-extraction primitives
//! - Metric schemas, the record assembler, and derived metrics
//! - One adapter per exchange (TWSE, TPEx, TAIFEX)

pub mod adapters;
pub mod calendar;
pub mod clock;
pub mod decode;
pub mod derive;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod numeric;
pub mod schema;
pub mod source;
pub mod table;

pub use adapters::{TaifexAdapter, TpexAdapter, TwseAdapter};
pub use clock::{Clock, FixedClock, SystemClock};
pub use decode::TextEncoding;
pub use domain::{
    FuturesMarketOi, InstitutionalFuturesOi, InstitutionalNetFlow, InstitutionalOptionsOi,
    ListedInstrument, MarginBalance, MarketBreadth, RetailPosition, TradeSummary, TradingDate,
};
pub use error::{SourceError, SourceErrorKind, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use schema::{AssembledRecord, MetricSchema};
pub use source::{Market, ProviderId};
pub use table::Table;
