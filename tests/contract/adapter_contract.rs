//! Contract tests every provider adapter must satisfy.
//!
//! With the default no-op transport each operation must complete without
//! error and report absence: never a panic, never a partially populated
//! record. Transport content is irrelevant here; only the contract shape
//! is under test.

use formosa_core::{Market, ProviderId, SourceError, SourceErrorKind, TaifexAdapter, TpexAdapter, TwseAdapter};

#[tokio::test]
async fn twse_operations_report_absence_on_empty_transport() {
    let adapter = TwseAdapter::default();

    assert!(adapter.market_trades(None).await.expect("contract").is_none());
    assert!(adapter.market_breadth(None).await.expect("contract").is_none());
    assert!(adapter
        .institutional_net_flow(None)
        .await
        .expect("contract")
        .is_none());
    assert!(adapter.margin_balance(None).await.expect("contract").is_none());
}

#[tokio::test]
async fn twse_listings_report_empty_on_empty_transport() {
    let adapter = TwseAdapter::default();

    assert!(adapter
        .listed_instruments(Market::Tse)
        .await
        .expect("contract")
        .is_empty());
    assert!(adapter
        .listed_instruments(Market::Otc)
        .await
        .expect("contract")
        .is_empty());
}

#[tokio::test]
async fn tpex_operations_report_absence_on_empty_transport() {
    let adapter = TpexAdapter::default();
    assert!(adapter.market_trades(None).await.expect("contract").is_none());
}

#[tokio::test]
async fn taifex_operations_report_absence_on_empty_transport() {
    let adapter = TaifexAdapter::default();

    assert!(adapter
        .institutional_futures_oi(None)
        .await
        .expect("contract")
        .is_none());
    assert!(adapter.market_oi(None).await.expect("contract").is_none());
    assert!(adapter
        .institutional_options_oi(None)
        .await
        .expect("contract")
        .is_none());
    assert!(adapter.retail_position(None).await.expect("contract").is_none());
}

#[test]
fn provider_ids_round_trip_through_text() {
    for provider in ProviderId::ALL {
        let parsed: ProviderId = provider
            .as_str()
            .parse()
            .expect("identifier must round-trip");
        assert_eq!(parsed, provider);
    }
}

#[test]
fn source_error_codes_are_stable() {
    assert_eq!(SourceError::unavailable("x").code(), "source.unavailable");
    assert_eq!(SourceError::invalid_request("x").code(), "source.invalid_request");
    assert_eq!(SourceError::internal("x").code(), "source.internal");

    assert!(SourceError::unavailable("x").retryable());
    assert_eq!(SourceError::internal("x").kind(), SourceErrorKind::Internal);
}
