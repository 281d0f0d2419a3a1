//! # bencode-serde
//!
//! A pure-Rust implementation of bencode (BEP-3) serialization and
//! deserialization, built on top of the `serde` framework.
//!
//! ## Overview
//!
//! Bencode is the encoding the BitTorrent protocol family uses for torrent
//! metainfo files, tracker exchanges, and DHT messages. It has four
//! productions: byte strings (`4:spam`), integers (`i-42e`), lists
//! (`l...e`), and dictionaries (`d...e`) whose keys are byte strings written
//! in ascending byte-wise order (canonical form). This crate always writes
//! canonical bytes and is lenient about what it reads: wire key order is not
//! checked and non-canonical integers (leading zeros) are accepted.
//!
//! ## Serde type mapping
//!
//! | Rust / serde type | Bencode encoding |
//! |-------------------|------------------|
//! | `i8`–`i64`, `u8`–`u64` | integer `i<digits>e` |
//! | `&str`, `String`  | byte string `<len>:<bytes>`, UTF-8 required on decode |
//! | `serde_bytes::ByteBuf`, `bytes::Bytes` | byte string, raw bytes |
//! | `char`            | byte string of one Unicode scalar |
//! | `Vec<T>`, tuples  | list `l...e` |
//! | `Vec<u8>` under plain derive | list of integers; wrap with `serde_bytes` for a byte string |
//! | struct, map       | dictionary `d...e`, keys sorted byte-wise |
//! | unit enum variant | byte string of the variant name |
//! | `Option<T>`       | `Some(v)` as `v`; `None` is unrepresentable (skip the field) |
//! | `bool`, `f32`/`f64`, unit, variants with data | unsupported |
//!
//! ## Field mapping
//!
//! Dictionary keys bind to struct fields through the usual serde attributes:
//!
//! - `#[serde(rename = "...")]` — explicit key; otherwise the field's name
//!   is the key verbatim
//! - `#[serde(skip)]` — field never encoded and never matched on decode
//! - `#[serde(skip_serializing_if = "is_default", default)]` — omit the
//!   field when it equals its zero value (see [`is_default`]) and tolerate
//!   its absence on decode
//! - `#[serde(default)]` — required on any field the wire may omit: bencode
//!   cannot encode absence, so without it a missing key is a
//!   `missing field` error
//!
//! Unknown dictionary keys are skipped without error, so decoding works
//! against documents that carry extra fields.
//!
//! ## Example
//!
//! ```rust
//! use bencode_serde::{from_bytes, to_bytes};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Announce {
//!     #[serde(rename = "info_hash")]
//!     hash: String,
//!     port: u16,
//!     #[serde(default, skip_serializing_if = "bencode_serde::is_default")]
//!     uploaded: i64,
//! }
//!
//! let req = Announce { hash: "abc".into(), port: 6881, uploaded: 0 };
//!
//! // Keys come out in ascending byte-wise order; `uploaded` is omitted
//! // because it equals its zero value.
//! let bytes = to_bytes(&req).unwrap();
//! assert_eq!(bytes, b"d9:info_hash3:abc4:porti6881ee");
//!
//! let back: Announce = from_bytes(&bytes).unwrap();
//! assert_eq!(req, back);
//! ```
//!
//! ## Streaming
//!
//! [`Encoder`] and [`Decoder`] handle back-to-back documents over one
//! stream, with a clean [`Error::Eof`] at the end:
//!
//! ```rust
//! use bencode_serde::{Decoder, Encoder};
//!
//! let mut enc = Encoder::new(Vec::new());
//! for n in [1i64, 2, 3] {
//!     enc.encode(&n).unwrap();
//! }
//! let stream = enc.into_writer();
//! assert_eq!(stream, b"i1ei2ei3e");
//!
//! let mut dec = Decoder::new(stream.as_slice());
//! let mut total = 0;
//! loop {
//!     match dec.decode::<i64>() {
//!         Ok(n) => total += n,
//!         Err(e) if e.is_eof() => break,
//!         Err(e) => panic!("{e}"),
//!     }
//! }
//! assert_eq!(total, 6);
//! ```

pub mod de;
pub mod error;
pub mod ser;
pub mod value;

pub use de::{Decoder, Deserializer, from_bytes, from_reader};
pub use error::{Error, Result};
pub use ser::{Encoder, Serializer, is_default, to_bytes, to_writer};
pub use value::Value;

pub use serde::{Deserialize, Serialize};
