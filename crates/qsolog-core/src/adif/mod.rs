//! ADIF interchange codec.
//!
//! ADIF is a tag-length-prefixed text format: every field is written as
//! `<NAME:LEN>` (optionally `<NAME:LEN:TYPE>`) followed by exactly `LEN`
//! characters of value. Records end with `<EOR>`; an optional free-text
//! header ends with `<EOH>`. Markers are case-insensitive.
//!
//! The codec is split into three stages:
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Tokenize | [`tokenizer`] | [`RawRecord`]s borrowing from the input |
//! | Decode | [`decoder`] | canonical [`QsoRecord`](crate::models::QsoRecord)s |
//! | Encode | [`encoder`] | ADIF text, plus the export preamble |

mod scan;

pub mod decoder;
pub mod encoder;
pub mod tokenizer;

pub use decoder::{decode_all, Decoder};
pub use encoder::{encode_record, write_adif, write_header, ExportHeader};
pub use scan::find_ci;
pub use tokenizer::{tokenize, RawRecord, RawToken, Records};
