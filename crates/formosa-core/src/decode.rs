//! Legacy text-encoding decode for providers that do not emit UTF-8.
//!
//! TAIFEX CSV downloads and the TWSE ISIN listing pages arrive as Big5
//! bytes. A corrupted byte sequence is reported as an absent payload, never
//! a crash; upstream layers turn that into an explicit "no data" result.

use encoding_rs::BIG5;

/// Declared source encoding of a raw payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Big5,
}

/// Decode raw response bytes into normalized text.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Option<String> {
    match encoding {
        TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
        TextEncoding::Big5 => {
            let (text, _, had_errors) = BIG5.decode(bytes);
            (!had_errors).then(|| text.into_owned())
        }
    }
}
