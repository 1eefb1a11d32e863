//! Asset payloads embedded in assistant replies.
//!
//! - `payload`: the structured record (`AssetPayload`, `AssetMetadata`, `Track`)
//! - `parser`: strict-then-lenient decoding of reply text

mod parser;
mod payload;

pub use parser::{AssetParseError, ParseOutcome, classify, lenient_extract, parse, strict_decode};
pub use payload::{
    ASSET_TYPE, AssetMetadata, AssetPayload, DEFAULT_DISPLAY_STYLE, MP3_URLS_KEY, Track,
    UNKNOWN_STYLE,
};
