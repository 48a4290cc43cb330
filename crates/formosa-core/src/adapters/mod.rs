//! Provider adapters.
//!
//! One adapter per exchange; each owns the static metric schemas for the
//! tables that provider publishes and maps assembled rows to domain
//! records. Adapters build request descriptors only; the injected
//! [`HttpClient`](crate::http_client::HttpClient) owns the wire.

mod taifex;
mod tpex;
mod twse;

pub use taifex::TaifexAdapter;
pub use tpex::TpexAdapter;
pub use twse::TwseAdapter;

use crate::error::SourceError;
use crate::http_client::HttpError;
use crate::source::ProviderId;

/// Transport failures propagate unchanged in meaning: retryable transport
/// problems stay retryable, everything else is structural.
pub(crate) fn transport_error(provider: ProviderId, error: HttpError) -> SourceError {
    if error.retryable() {
        SourceError::unavailable(format!("{provider} transport error: {}", error.message()))
    } else {
        SourceError::internal(format!("{provider} transport error: {}", error.message()))
    }
}
