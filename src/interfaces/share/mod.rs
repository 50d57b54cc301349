//! Share tokens: the whole ledger packed into one URL-safe string.

mod codec;
mod wire;

pub use codec::{
    DEFAULT_MAX_INFLATED_LEN, ShareCodec, ShareToken, TOKEN_QUERY_PARAM, decode, decode_or_empty,
    encode,
};
