use super::wire::WireLedger;
use crate::domain::ledger::Ledger;
use crate::error::{DecodeError, LedgerError, Result};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::fmt;
use std::io::{Read, Write};
use thiserror::Error;

/// Query parameter a share URL carries the token in.
pub const TOKEN_QUERY_PARAM: &str = "d";

/// Upper bound on the inflated JSON of a token.
pub const DEFAULT_MAX_INFLATED_LEN: u64 = 1024 * 1024;

/// Base64 with `-` and `_` in place of `+` and `/`, written without `=`.
///
/// Padding is optional on the way in; the decoder infers it from the token
/// length, so a length of 1 modulo 4 is rejected.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Why a token was rejected. Only ever logged; callers see [`DecodeError`].
#[derive(Error, Debug)]
pub(crate) enum DecodeFailure {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("corrupt deflate stream: {0}")]
    Inflate(#[from] std::io::Error),
    #[error("inflated payload exceeds {0} bytes")]
    TooLarge(u64),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not a number: {0}")]
    InvalidNumber(String),
    #[error("invalid ledger: {0}")]
    Ledger(#[from] LedgerError),
}

/// Compact, URL-safe encoding of a whole [`Ledger`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShareToken(String);

impl ShareToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Appends the token to `base` as the `d` query parameter.
    pub fn share_url(&self, base: &str) -> String {
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{base}{separator}{TOKEN_QUERY_PARAM}={}", self.0)
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts ledgers to share tokens and back.
///
/// A token is the ledger as compact JSON, zlib-compressed and written in
/// unpadded URL-safe base64. The format has no version marker, so any
/// token that does not match the expected shape exactly is rejected.
#[derive(Debug, Clone, Copy)]
pub struct ShareCodec {
    pub compression: Compression,
    pub max_inflated_len: u64,
}

impl Default for ShareCodec {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            max_inflated_len: DEFAULT_MAX_INFLATED_LEN,
        }
    }
}

impl ShareCodec {
    pub fn encode(&self, ledger: &Ledger) -> Result<ShareToken> {
        let json = serde_json::to_vec(&WireLedger::from(ledger))?;

        let mut encoder = ZlibEncoder::new(Vec::new(), self.compression);
        encoder.write_all(&json)?;
        let compressed = encoder.finish()?;

        let token = TOKEN_ENGINE.encode(compressed);
        tracing::debug!(
            json_len = json.len(),
            token_len = token.len(),
            "encoded share token"
        );
        Ok(ShareToken(token))
    }

    /// Rebuilds a ledger from a token.
    ///
    /// Every kind of failure, from bad base64 to an out-of-range participant
    /// index, comes back as the same [`DecodeError`]. No partial ledger is
    /// ever returned.
    pub fn decode(&self, token: &str) -> std::result::Result<Ledger, DecodeError> {
        self.try_decode(token).map_err(|cause| {
            tracing::debug!(%cause, token_len = token.len(), "rejected share token");
            DecodeError
        })
    }

    fn try_decode(&self, token: &str) -> std::result::Result<Ledger, DecodeFailure> {
        let compressed = TOKEN_ENGINE.decode(token)?;

        let mut json = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .take(self.max_inflated_len + 1)
            .read_to_end(&mut json)?;
        if json.len() as u64 > self.max_inflated_len {
            return Err(DecodeFailure::TooLarge(self.max_inflated_len));
        }

        let wire: WireLedger = serde_json::from_slice(&json)?;
        wire.into_ledger()
    }
}

/// Encodes with the default [`ShareCodec`].
pub fn encode(ledger: &Ledger) -> Result<ShareToken> {
    ShareCodec::default().encode(ledger)
}

/// Decodes with the default [`ShareCodec`].
pub fn decode(token: &str) -> std::result::Result<Ledger, DecodeError> {
    ShareCodec::default().decode(token)
}

/// Decodes a token, starting over with an empty ledger if it is unusable.
pub fn decode_or_empty(token: &str) -> Ledger {
    decode(token).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::expense::Expense;
    use crate::domain::money::{Quantity, UnitCost};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn token_for(json: &str) -> String {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(json.as_bytes()).unwrap();
        TOKEN_ENGINE.encode(encoder.finish().unwrap())
    }

    fn inflate(token: &ShareToken) -> String {
        let compressed = TOKEN_ENGINE.decode(token.as_str()).unwrap();
        let mut json = String::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_string(&mut json)
            .unwrap();
        json
    }

    fn pizza_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.add_participant("Alice").unwrap();
        ledger.add_participant("Bob").unwrap();
        ledger
            .add_expense(
                Expense::new(
                    "Pizza",
                    Quantity::ONE,
                    UnitCost::new(dec!(20)).unwrap(),
                    0,
                    [0, 1],
                )
                .unwrap(),
            )
            .unwrap();
        ledger
    }

    #[test]
    fn test_wire_shape() {
        let token = encode(&pizza_ledger()).unwrap();
        assert_eq!(
            inflate(&token),
            r#"{"u":["Alice","Bob"],"c":[["Pizza",1,20,0,[0,1]]]}"#
        );
    }

    #[test]
    fn test_token_is_url_safe_and_unpadded() {
        let token = encode(&pizza_ledger()).unwrap();
        assert!(
            token
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_round_trip() {
        let ledger = pizza_ledger();
        let token = encode(&ledger).unwrap();
        assert_eq!(decode(token.as_str()), Ok(ledger));
    }

    #[test]
    fn test_round_trip_empty_ledger() {
        let token = encode(&Ledger::new()).unwrap();
        assert_eq!(inflate(&token), r#"{"u":[],"c":[]}"#);
        assert_eq!(decode(token.as_str()), Ok(Ledger::new()));
    }

    #[test]
    fn test_round_trip_non_ascii_and_fractional_cost() {
        let mut ledger = Ledger::new();
        ledger.add_participant("João").unwrap();
        ledger.add_participant("Zoë 🍕").unwrap();
        ledger
            .add_expense(
                Expense::new(
                    "Café",
                    Quantity::new(dec!(2.5)).unwrap(),
                    UnitCost::new(dec!(3.33)).unwrap(),
                    1,
                    [0, 1],
                )
                .unwrap(),
            )
            .unwrap();

        let decoded = decode(encode(&ledger).unwrap().as_str()).unwrap();
        assert_eq!(decoded, ledger);
        assert_eq!(decoded.expenses()[0].cost().value(), dec!(3.33));
        assert_eq!(decoded.participants()[1].name(), "Zoë 🍕");
    }

    #[test]
    fn test_padded_token_is_accepted() {
        let token = encode(&pizza_ledger()).unwrap();
        let padding = (4 - token.as_str().len() % 4) % 4;
        let padded = format!("{}{}", token, "=".repeat(padding));
        assert_eq!(decode(&padded), Ok(pizza_ledger()));
    }

    #[test]
    fn test_string_cost_from_older_tokens() {
        let token = token_for(r#"{"u":["A","B"],"c":[["Wine",1,"12.5",1,[0,1]]]}"#);
        let ledger = decode(&token).unwrap();
        assert_eq!(ledger.expenses()[0].cost().value(), dec!(12.5));
        assert_eq!(ledger.expenses()[0].total(), Decimal::new(125, 1));
    }

    #[test]
    fn test_string_amount_is_accepted() {
        let token = token_for(r#"{"u":["A","B"],"c":[["Beer"," 4 ","2.5",0,[0,1]]]}"#);
        let ledger = decode(&token).unwrap();
        assert_eq!(ledger.expenses()[0].amount().value(), dec!(4));
        assert_eq!(ledger.expenses()[0].total(), dec!(10));
    }

    #[test]
    fn test_round_trip_keeps_full_precision() {
        let mut ledger = Ledger::new();
        ledger.add_participant("A").unwrap();
        ledger.add_participant("B").unwrap();
        for (amount, cost) in [
            (dec!(1), dec!(0.12345678901234567891)),
            (dec!(1), dec!(12345678901234567890123)),
            (dec!(1.000000000000000001), dec!(3.33)),
        ] {
            let expense = Expense::new(
                "precise",
                Quantity::new(amount).unwrap(),
                UnitCost::new(cost).unwrap(),
                0,
                [0, 1],
            )
            .unwrap();
            ledger.add_expense(expense).unwrap();
        }

        let decoded = decode(encode(&ledger).unwrap().as_str()).unwrap();
        assert_eq!(decoded, ledger);
        assert_eq!(
            decoded.expenses()[0].cost().value(),
            dec!(0.12345678901234567891)
        );
        assert_eq!(
            decoded.expenses()[1].cost().value(),
            dec!(12345678901234567890123)
        );
    }

    #[test]
    fn test_overflowing_totals_are_rejected() {
        let rejected = [
            r#"{"u":["A","B"],"c":[["x",1e20,1e20,0,[0,1]]]}"#,
            r#"{"u":["A","B"],"c":[["x",1,5e28,0,[1]],["y",1,5e28,1,[0]]]}"#,
        ];
        for json in rejected {
            assert_eq!(decode(&token_for(json)), Err(DecodeError), "{json}");
        }

        let token = token_for(r#"{"u":["A","B"],"c":[["x",1,5e28,0,[1]]]}"#);
        let balances = decode(&token).unwrap().balances();
        assert_eq!(
            balances[0].value(),
            Decimal::from_i128_with_scale(5 * 10_i128.pow(28), 0)
        );
    }

    #[test]
    fn test_invalid_tokens_yield_decode_error() {
        assert_eq!(decode("not-a-valid-token"), Err(DecodeError));
        assert_eq!(decode("%%%"), Err(DecodeError));
        assert_eq!(decode(""), Err(DecodeError));
        // valid base64, not a zlib stream
        assert_eq!(decode("aGVsbG8gd29ybGQ"), Err(DecodeError));
    }

    #[test]
    fn test_truncated_token_is_rejected() {
        let token = encode(&pizza_ledger()).unwrap();
        let truncated = &token.as_str()[..token.as_str().len() / 2];
        assert_eq!(decode(truncated), Err(DecodeError));
    }

    #[test]
    fn test_shape_mismatches_are_rejected() {
        let rejected = [
            r#"{"u":["A"]}"#,
            r#"{"u":"A","c":[]}"#,
            r#"{"u":["A"],"c":[],"v":2}"#,
            r#"{"u":["A"],"c":[["x",1,2,0]]}"#,
            r#"{"u":["A"],"c":[["x",1,2,0,[0],9]]}"#,
            r#"{"u":["A"],"c":[["x",1,2,"0",[0]]]}"#,
            r#"{"u":["A"],"c":[["x",1,2,0,[1]]]}"#,
            r#"{"u":["A"],"c":[["x",1,2,3,[0]]]}"#,
            r#"{"u":["A"],"c":[["x",1,2,0,[]]]}"#,
            r#"{"u":["A"],"c":[["x",0,2,0,[0]]]}"#,
            r#"{"u":["A"],"c":[["x",1,-2,0,[0]]]}"#,
            r#"{"u":[""],"c":[]}"#,
            r#"[]"#,
        ];
        for json in rejected {
            assert_eq!(decode(&token_for(json)), Err(DecodeError), "{json}");
        }
    }

    #[test]
    fn test_oversized_payload_is_rejected() {
        let codec = ShareCodec {
            max_inflated_len: 16,
            ..ShareCodec::default()
        };
        let token = codec.encode(&pizza_ledger()).unwrap();
        assert_eq!(codec.decode(token.as_str()), Err(DecodeError));
        assert!(ShareCodec::default().decode(token.as_str()).is_ok());
    }

    #[test]
    fn test_compression_level_does_not_change_meaning() {
        let fast = ShareCodec {
            compression: Compression::fast(),
            ..ShareCodec::default()
        };
        let token = fast.encode(&pizza_ledger()).unwrap();
        assert_eq!(decode(token.as_str()), Ok(pizza_ledger()));
    }

    #[test]
    fn test_decode_or_empty_falls_back() {
        assert!(decode_or_empty("garbage!").is_empty());
        let token = encode(&pizza_ledger()).unwrap();
        assert_eq!(decode_or_empty(token.as_str()), pizza_ledger());
    }

    #[test]
    fn test_share_url() {
        let token = ShareToken("abc".to_string());
        assert_eq!(
            token.share_url("https://example.org/split"),
            "https://example.org/split?d=abc"
        );
        assert_eq!(
            token.share_url("https://example.org/?lang=pt"),
            "https://example.org/?lang=pt&d=abc"
        );
    }

    #[test]
    fn test_compression_shrinks_repetitive_payload() {
        let mut ledger = Ledger::new();
        for name in ["Alice", "Bob", "Carol", "Dave"] {
            ledger.add_participant(name).unwrap();
        }
        for _ in 0..20 {
            ledger
                .add_expense(
                    Expense::new(
                        "Groceries",
                        Quantity::ONE,
                        UnitCost::new(dec!(42.10)).unwrap(),
                        2,
                        [0, 1, 2, 3],
                    )
                    .unwrap(),
                )
                .unwrap();
        }
        let token = encode(&ledger).unwrap();
        let json = serde_json::to_string(&WireLedger::from(&ledger)).unwrap();
        assert!(token.as_str().len() < json.len());
    }
}
