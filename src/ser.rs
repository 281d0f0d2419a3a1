//! Bencode serializer.
//!
//! The [`Serializer`] is generic over any `W: std::io::Write`, enabling both
//! in-memory serialization (`to_bytes`) and streaming serialization
//! (`to_writer`).
//!
//! ## Wire format summary
//! - Integers: `i<decimal digits>e`, with a leading `-` for negatives and no
//!   padding; zero is `i0e`
//! - Byte strings: `<decimal length>:<raw bytes>`, length computed before
//!   anything is written
//! - Lists: `l` + elements back-to-back + `e`
//! - Dictionaries: `d` + key/value pairs + `e`; keys are byte strings and are
//!   emitted in ascending byte-wise order regardless of source order
//! - Bools, floats, unit, `None`, and data-carrying enum variants have no
//!   bencode production and fail with [`Error::Unsupported`]

use crate::error::{Error, Result};
use serde::ser::{self, Impossible, Serialize};
use std::io::Write;

// ── Public entry points ────────────────────────────────────────────────────

/// Serialize `value` into a freshly allocated `Vec<u8>` of bencode bytes.
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut ser = Serializer::new(Vec::new());
    value.serialize(&mut ser)?;
    Ok(ser.into_writer())
}

/// Serialize `value` as bencode bytes, writing directly into `writer`.
///
/// Unlike [`to_bytes`], this never allocates a buffer for the document as a
/// whole and writes as it walks the value, so a mid-value failure can leave
/// a partial document on the sink. Use [`Encoder`] when the sink must only
/// ever see complete documents.
pub fn to_writer<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    let mut ser = Serializer::new(&mut writer);
    value.serialize(&mut ser)
}

/// Zero-value predicate for `#[serde(skip_serializing_if = "...")]`: true
/// when `value` equals its type's default (0 for integers, empty for strings
/// and sequences). This is how a field is omitted when empty:
///
/// ```rust
/// use bencode_serde::{is_default, to_bytes};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Stats {
///     downloaded: i64,
///     #[serde(skip_serializing_if = "is_default")]
///     uploaded: i64,
/// }
///
/// let bytes = to_bytes(&Stats { downloaded: 1, uploaded: 0 }).unwrap();
/// assert_eq!(bytes, b"d10:downloadedi1ee");
/// ```
pub fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

// ── Serializer ─────────────────────────────────────────────────────────────

/// The bencode serializer. Generic over any `W: Write`.
///
/// Obtain one via [`to_bytes`] / [`to_writer`], or construct directly for
/// advanced use cases:
///
/// ```rust
/// use bencode_serde::ser::Serializer;
/// use serde::Serialize;
///
/// let mut buf = Vec::new();
/// let mut ser = Serializer::new(&mut buf);
/// 42i64.serialize(&mut ser).unwrap();
/// assert_eq!(buf, b"i42e");
/// ```
pub struct Serializer<W: Write> {
    writer: W,
}

impl<W: Write> Serializer<W> {
    /// Create a new serializer that writes into `writer`.
    pub fn new(writer: W) -> Self {
        Serializer { writer }
    }

    /// Consume the serializer and return the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    // ── Internal helpers ───────────────────────────────────────────────────

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    /// Byte string production: decimal length, `:`, raw bytes.
    fn write_byte_string(&mut self, bytes: &[u8]) -> Result<()> {
        write!(self.writer, "{}:", bytes.len())?;
        self.write_all(bytes)
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        write!(self.writer, "i{}e", v)?;
        Ok(())
    }

    fn write_u64(&mut self, v: u64) -> Result<()> {
        write!(self.writer, "i{}e", v)?;
        Ok(())
    }
}

// ── serde::Serializer impl ─────────────────────────────────────────────────

impl<'a, W: Write> ser::Serializer for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = DictSerializer<'a, W>;
    type SerializeStruct = DictSerializer<'a, W>;
    type SerializeStructVariant = Impossible<(), Error>;

    // ── Primitives ─────────────────────────────────────────────────────────

    fn serialize_bool(self, _v: bool) -> Result<()> {
        Err(Error::Unsupported("bool"))
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.write_i64(v as i64)
    }
    fn serialize_i16(self, v: i16) -> Result<()> {
        self.write_i64(v as i64)
    }
    fn serialize_i32(self, v: i32) -> Result<()> {
        self.write_i64(v as i64)
    }
    /// Integer production: `i<digits>e` in decimal
    fn serialize_i64(self, v: i64) -> Result<()> {
        self.write_i64(v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.write_u64(v as u64)
    }
    fn serialize_u16(self, v: u16) -> Result<()> {
        self.write_u64(v as u64)
    }
    fn serialize_u32(self, v: u32) -> Result<()> {
        self.write_u64(v as u64)
    }
    /// Integer production; the full `u64` range is representable since
    /// bencode digits are unbounded
    fn serialize_u64(self, v: u64) -> Result<()> {
        self.write_u64(v)
    }

    fn serialize_f32(self, _v: f32) -> Result<()> {
        Err(Error::Unsupported("f32"))
    }
    fn serialize_f64(self, _v: f64) -> Result<()> {
        Err(Error::Unsupported("f64"))
    }

    /// One Unicode scalar as a byte string of its 1–4 UTF-8 bytes
    fn serialize_char(self, v: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.write_byte_string(v.encode_utf8(&mut buf).as_bytes())
    }

    /// Byte string production: `<len>:<bytes>`, length counted in bytes
    fn serialize_str(self, v: &str) -> Result<()> {
        self.write_byte_string(v.as_bytes())
    }

    /// Byte string production: `<len>:<bytes>`
    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.write_byte_string(v)
    }

    /// Bencode cannot represent absence; omit optional fields with
    /// `#[serde(skip_serializing_if = "Option::is_none")]` instead
    fn serialize_none(self) -> Result<()> {
        Err(Error::Unsupported("None"))
    }

    /// `Some(value)` encodes as `value` with no wrapper
    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Err(Error::Unsupported("unit"))
    }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Err(Error::Unsupported("unit struct"))
    }

    /// Unit enum variants encode as a byte string of the variant name
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.write_byte_string(variant.as_bytes())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()> {
        Err(Error::Unsupported("enum variant with data"))
    }

    /// List production: `l`, then each element, then `e`
    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        self.write_all(b"l")?;
        Ok(self)
    }

    /// Tuples encode as lists (fixed arity, element types may differ)
    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        self.write_all(b"l")?;
        Ok(self)
    }
    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.write_all(b"l")?;
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::Unsupported("enum variant with data"))
    }

    /// Dictionary production; entries are staged and sorted by key bytes
    /// before emission, regardless of the map's iteration order
    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(DictSerializer::new(self, len.unwrap_or(0)))
    }

    /// Dictionary production from struct fields; key names come from the
    /// field names as adjusted by `#[serde(rename)]`, skipped fields never
    /// reach the serializer
    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        Ok(DictSerializer::new(self, len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::Unsupported("enum variant with data"))
    }
}

// ── Compound serializer impls ──────────────────────────────────────────────

macro_rules! forward_serialize_element {
    ($t:ty) => {
        impl<'a, W: Write> $t for &'a mut Serializer<W> {
            type Ok = ();
            type Error = Error;
            fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
                value.serialize(&mut **self)
            }
            fn end(self) -> Result<()> {
                self.write_all(b"e")
            }
        }
    };
}

forward_serialize_element!(ser::SerializeSeq);
forward_serialize_element!(ser::SerializeTuple);

impl<'a, W: Write> ser::SerializeTupleStruct for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;
    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }
    fn end(self) -> Result<()> {
        self.write_all(b"e")
    }
}

// ── DictSerializer ─────────────────────────────────────────────────────────

/// Compound serializer for the dictionary production (maps and structs).
///
/// Canonical bencode requires keys in ascending byte-wise order, but struct
/// declaration order and map iteration order are arbitrary, so every entry
/// is staged as a `(raw key, encoded value)` pair and the whole dictionary
/// is sorted and emitted in [`end`](ser::SerializeMap::end).
pub struct DictSerializer<'a, W: Write> {
    ser: &'a mut Serializer<W>,
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    key: Option<Vec<u8>>,
}

impl<'a, W: Write> DictSerializer<'a, W> {
    fn new(ser: &'a mut Serializer<W>, len: usize) -> Self {
        DictSerializer {
            ser,
            entries: Vec::with_capacity(len),
            key: None,
        }
    }

    fn encode_value<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
        let mut ser = Serializer::new(Vec::new());
        value.serialize(&mut ser)?;
        Ok(ser.into_writer())
    }

    fn finish(self) -> Result<()> {
        let DictSerializer {
            ser, mut entries, ..
        } = self;
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        ser.write_all(b"d")?;
        for (key, value) in &entries {
            ser.write_byte_string(key)?;
            ser.write_all(value)?;
        }
        ser.write_all(b"e")
    }
}

impl<'a, W: Write> ser::SerializeMap for DictSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = match self.key.take() {
            Some(key) => key,
            None => {
                return Err(ser::Error::custom(
                    "serialize_value called before serialize_key",
                ));
            }
        };
        self.entries.push((key, Self::encode_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a, W: Write> ser::SerializeStruct for DictSerializer<'a, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.entries
            .push((key.as_bytes().to_vec(), Self::encode_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

// ── KeySerializer ──────────────────────────────────────────────────────────
//
// A restricted serializer that captures one dictionary key as raw bytes so
// entries can be sorted before emission. Bencode dictionary keys are byte
// strings, so only string-shaped keys are accepted.

const KEY_KIND: &str = "map key (must be a string or byte string)";

struct KeySerializer;

macro_rules! key_must_be_bytes {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(fn $method(self, _v: $ty) -> Result<Vec<u8>> {
            Err(Error::Unsupported(KEY_KIND))
        })*
    };
}

impl ser::Serializer for KeySerializer {
    type Ok = Vec<u8>;
    type Error = Error;

    type SerializeSeq = Impossible<Vec<u8>, Error>;
    type SerializeTuple = Impossible<Vec<u8>, Error>;
    type SerializeTupleStruct = Impossible<Vec<u8>, Error>;
    type SerializeTupleVariant = Impossible<Vec<u8>, Error>;
    type SerializeMap = Impossible<Vec<u8>, Error>;
    type SerializeStruct = Impossible<Vec<u8>, Error>;
    type SerializeStructVariant = Impossible<Vec<u8>, Error>;

    fn serialize_str(self, v: &str) -> Result<Vec<u8>> {
        Ok(v.as_bytes().to_vec())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Vec<u8>> {
        Ok(v.to_vec())
    }

    fn serialize_char(self, v: char) -> Result<Vec<u8>> {
        let mut buf = [0u8; 4];
        Ok(v.encode_utf8(&mut buf).as_bytes().to_vec())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Vec<u8>> {
        Ok(variant.as_bytes().to_vec())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Vec<u8>> {
        value.serialize(self)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Vec<u8>> {
        value.serialize(self)
    }

    key_must_be_bytes! {
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_f32: f32,
        serialize_f64: f64,
    }

    fn serialize_none(self) -> Result<Vec<u8>> {
        Err(Error::Unsupported(KEY_KIND))
    }

    fn serialize_unit(self) -> Result<Vec<u8>> {
        Err(Error::Unsupported(KEY_KIND))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Vec<u8>> {
        Err(Error::Unsupported(KEY_KIND))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Vec<u8>> {
        Err(Error::Unsupported(KEY_KIND))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Error::Unsupported(KEY_KIND))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Error::Unsupported(KEY_KIND))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(Error::Unsupported(KEY_KIND))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::Unsupported(KEY_KIND))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::Unsupported(KEY_KIND))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Error::Unsupported(KEY_KIND))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::Unsupported(KEY_KIND))
    }
}

// ── Encoder ────────────────────────────────────────────────────────────────

/// Streaming encoder writing a sequence of bencode documents to one sink.
///
/// Each [`encode`](Encoder::encode) call stages the whole document in memory
/// and only then writes and flushes it, so a failed call (unsupported shape,
/// I/O error) leaves no partial document visible on the sink, and the
/// encoder stays usable for further documents.
///
/// ```rust
/// use bencode_serde::Encoder;
///
/// let mut enc = Encoder::new(Vec::new());
/// enc.encode(&1i64).unwrap();
/// enc.encode("two").unwrap();
/// assert_eq!(enc.into_writer(), b"i1e3:two");
/// ```
pub struct Encoder<W: Write> {
    writer: W,
}

impl<W: Write> Encoder<W> {
    /// Create an encoder that writes into `writer`.
    pub fn new(writer: W) -> Self {
        Encoder { writer }
    }

    /// Encode one value as a complete bencode document, write it to the
    /// sink, and flush.
    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let buf = to_bytes(value)?;
        self.writer.write_all(&buf)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Consume the encoder and return the inner writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}
