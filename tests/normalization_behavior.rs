//! Behavior-driven tests for payload normalization.
//!
//! These tests verify HOW raw provider payloads become positional tables
//! and numbers: legacy encodings, local calendars, and loosely formatted
//! numerals.

use formosa_core::{calendar, decode, numeric, Table, TextEncoding};
use serde_json::json;

// =============================================================================
// Normalization: Calendars
// =============================================================================

#[test]
fn when_row_date_is_roc_era_system_matches_it_to_gregorian() {
    // Given: A row date as published by TWSE and TPEx
    let row_date = "113/05/02";

    // When: The date is normalized
    let parsed = calendar::from_roc(row_date);

    // Then: It matches the equivalent Gregorian query date
    let query_date = calendar::parse_iso("2024-05-02").expect("valid ISO date");
    assert_eq!(parsed, Some(query_date));
}

#[test]
fn when_query_date_is_formatted_for_each_provider_forms_differ_only_in_notation() {
    let date = calendar::parse_iso("2024-05-02").expect("valid ISO date");

    assert_eq!(calendar::to_compact(date), "20240502");
    assert_eq!(calendar::to_roc(date), "113/05/02");
    assert_eq!(calendar::to_slash(date), "2024/05/02");
}

#[test]
fn when_a_date_cell_is_a_header_label_it_never_matches() {
    assert_eq!(calendar::from_roc("日期"), None);
    assert_eq!(calendar::from_slash("交易日期"), None);
}

// =============================================================================
// Normalization: Numerals
// =============================================================================

#[test]
fn when_numerals_carry_thousands_separators_system_strips_them() {
    assert_eq!(numeric::parse_decimal("6,339,292"), Some(6_339_292.0));
    assert_eq!(numeric::parse_decimal(" 102.74 "), Some(102.74));
}

#[test]
fn when_a_cell_is_a_placeholder_value_it_is_absent_not_zero() {
    // Providers pad empty cells with dashes or leave them blank; neither
    // is the number zero.
    assert_eq!(numeric::parse_decimal("--"), None);
    assert_eq!(numeric::parse_decimal(""), None);
    assert_eq!(numeric::parse_decimal("0"), Some(0.0));
}

#[test]
fn when_a_cell_packs_two_counts_system_splits_them() {
    // "986(15)": 986 advancing issues, 15 of them limit-up.
    let (primary, secondary) = numeric::split_composite("986(15)");
    assert_eq!(primary, Some(986.0));
    assert_eq!(secondary, Some(15.0));
}

// =============================================================================
// Normalization: Encodings and table extraction
// =============================================================================

#[test]
fn when_payload_is_big5_system_decodes_it_to_utf8() {
    let (bytes, _, _) = encoding_rs::BIG5.encode("日期,契約,未沖銷契約數");
    let text = decode::decode(&bytes, TextEncoding::Big5).expect("valid Big5 payload");
    assert_eq!(text, "日期,契約,未沖銷契約數");
}

#[test]
fn when_big5_payload_is_corrupted_decode_reports_absence() {
    assert_eq!(decode::decode(&[0xFF, 0xFF], TextEncoding::Big5), None);
}

#[test]
fn when_csv_and_json_sources_carry_the_same_rows_tables_are_identical() {
    let from_csv = Table::from_csv("113/05/02,6,339\n");
    let from_json = Table::from_json_rows(&[json!(["113/05/02", "6", "339"])]);
    assert_eq!(from_csv, from_json);
}

#[test]
fn when_html_listing_page_is_extracted_rows_follow_document_order() {
    let page = "<table class=\"h4\">\
        <tr><td>有價證券代號及名稱</td></tr>\
        <tr><td></td><td></td><td>2330</td><td>台積電</td></tr>\
        </table>";
    let table = Table::from_html(page, ".h4 tr");

    assert_eq!(table.len(), 2);
    assert_eq!(table.cell(1, 2), Some("2330"));
    assert_eq!(table.cell(1, 3), Some("台積電"));
}
