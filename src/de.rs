//! Bencode deserializer.
//!
//! The [`Deserializer`] reads from any `R: std::io::Read` through an
//! internal [`BufReader`], which supplies the one byte of lookahead the
//! grammar needs (peek without consuming) plus the delimiter scans and
//! discard primitives. Parsing is recursive descent: the peeked byte selects
//! the production (a digit opens a byte string, `i` an integer, `l` a list,
//! `d` a dictionary), and a mismatch against the requested target shape
//! fails with [`Error::TypeMismatch`].
//!
//! Decoding is strictly sequential and the deserializer may buffer ahead of
//! the bytes logically consumed; callers must not mix direct reads of the
//! source with decoding calls on it.

use crate::error::{Error, Result};
use serde::de::{
    self, DeserializeOwned, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor,
};
use std::io::{BufRead, BufReader, Read};
use std::str;

/// Containers nested deeper than this are rejected with
/// [`Error::NestingTooDeep`], so adversarial input cannot overflow the stack.
const MAX_DEPTH: usize = 64;

// ── Public entry points ────────────────────────────────────────────────────

/// Deserialize a value from one bencode document at the start of `input`.
///
/// Bytes after the document are ignored; use [`Decoder`] to read a stream of
/// back-to-back documents.
pub fn from_bytes<T: DeserializeOwned>(input: &[u8]) -> Result<T> {
    let mut de = Deserializer::new(input);
    T::deserialize(&mut de)
}

/// Deserialize a value from one bencode document read from `reader`.
pub fn from_reader<R: Read, T: DeserializeOwned>(reader: R) -> Result<T> {
    let mut de = Deserializer::new(reader);
    T::deserialize(&mut de)
}

// ── Deserializer ───────────────────────────────────────────────────────────

/// The bencode deserializer. Reads from any `R: Read` behind its own buffer.
pub struct Deserializer<R: Read> {
    reader: BufReader<R>,
    depth: usize,
}

impl<R: Read> Deserializer<R> {
    pub fn new(reader: R) -> Self {
        Deserializer {
            reader: BufReader::new(reader),
            depth: 0,
        }
    }

    // ── Buffer primitives ──────────────────────────────────────────────────

    /// One byte of lookahead without consuming it. `None` at end of input.
    fn peek_maybe(&mut self) -> Result<Option<u8>> {
        let buf = self.reader.fill_buf()?;
        Ok(buf.first().copied())
    }

    /// One byte of lookahead; end of input here means a value was cut short.
    fn peek_byte(&mut self) -> Result<u8> {
        self.peek_maybe()?.ok_or(Error::UnexpectedEof)
    }

    /// Consume the byte last returned by a peek.
    fn consume_byte(&mut self) {
        self.reader.consume(1);
    }

    /// Require `expected` at the cursor and consume it.
    fn expect_byte(&mut self, expected: u8, production: &'static str) -> Result<()> {
        let b = self.peek_byte()?;
        if b != expected {
            return Err(Error::TypeMismatch {
                expected: production,
                found: b as char,
            });
        }
        self.consume_byte();
        Ok(())
    }

    /// Require a length digit at the cursor (the start of a byte string).
    /// Does not consume; the digit belongs to the length prefix.
    fn expect_digit(&mut self, production: &'static str) -> Result<()> {
        let b = self.peek_byte()?;
        if !b.is_ascii_digit() {
            return Err(Error::TypeMismatch {
                expected: production,
                found: b as char,
            });
        }
        Ok(())
    }

    /// Discard exactly `len` bytes through the buffer.
    fn discard_exact(&mut self, mut len: usize) -> Result<()> {
        while len > 0 {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                return Err(Error::UnexpectedEof);
            }
            let n = available.len().min(len);
            self.reader.consume(n);
            len -= n;
        }
        Ok(())
    }

    // ── Productions ────────────────────────────────────────────────────────

    /// Parse a byte string's length prefix: decimal digits through `:`.
    fn read_length(&mut self) -> Result<usize> {
        let mut digits = Vec::new();
        self.reader.read_until(b':', &mut digits)?;
        if digits.pop() != Some(b':') {
            return Err(Error::UnexpectedEof);
        }
        str::from_utf8(&digits)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| Error::InvalidLength(String::from_utf8_lossy(&digits).into_owned()))
    }

    /// Read a byte string's payload: exactly `len` raw bytes, looping on
    /// partial reads. The buffer grows as bytes arrive instead of trusting
    /// the declared length, so a lying prefix cannot force a huge up-front
    /// allocation.
    fn read_byte_string(&mut self) -> Result<Vec<u8>> {
        let len = self.read_length()?;
        let mut buf = Vec::new();
        let read = (&mut self.reader).take(len as u64).read_to_end(&mut buf)?;
        if read < len {
            return Err(Error::UnexpectedEof);
        }
        Ok(buf)
    }

    /// Byte string production decoded as UTF-8 text.
    fn read_text(&mut self) -> Result<String> {
        self.expect_digit("byte string")?;
        let buf = self.read_byte_string()?;
        String::from_utf8(buf).map_err(|_| Error::InvalidUtf8)
    }

    /// Scan the integer production's payload through `e`. The leading `i`
    /// must already have been peeked; it is consumed here.
    fn read_integer_token(&mut self) -> Result<Vec<u8>> {
        self.consume_byte();
        let mut token = Vec::new();
        self.reader.read_until(b'e', &mut token)?;
        if token.pop() != Some(b'e') {
            return Err(Error::UnexpectedEof);
        }
        Ok(token)
    }

    /// Integer production: optional `-`, decimal digits. Parses to the
    /// widest fitting native width and lets serde's standard visitors narrow
    /// with range checks. Leading zeros are tolerated on input; the encoder
    /// never writes them.
    fn parse_integer<'de, V: Visitor<'de>>(&mut self, visitor: V) -> Result<V::Value> {
        let b = self.peek_byte()?;
        if b != b'i' {
            return Err(Error::TypeMismatch {
                expected: "integer",
                found: b as char,
            });
        }
        let token = self.read_integer_token()?;
        let text = str::from_utf8(&token).map_err(|_| invalid_integer(&token))?;
        if text.starts_with('-') {
            visitor.visit_i64(text.parse().map_err(|_| invalid_integer(&token))?)
        } else {
            visitor.visit_u64(text.parse().map_err(|_| invalid_integer(&token))?)
        }
    }

    // ── Discard ────────────────────────────────────────────────────────────

    /// Consume one well-formed value of any production without decoding it.
    /// This is how values under unknown dictionary keys are skipped; keys
    /// are discarded as arbitrary values too, so a non-string key in foreign
    /// data does not abort the skip.
    fn skip_value(&mut self) -> Result<()> {
        match self.peek_byte()? {
            b'0'..=b'9' => {
                let len = self.read_length()?;
                self.discard_exact(len)
            }
            b'i' => {
                self.read_integer_token()?;
                Ok(())
            }
            b'l' => {
                self.consume_byte();
                self.enter_container()?;
                loop {
                    if self.peek_byte()? == b'e' {
                        self.consume_byte();
                        break;
                    }
                    self.skip_value()?;
                }
                self.leave_container();
                Ok(())
            }
            b'd' => {
                self.consume_byte();
                self.enter_container()?;
                loop {
                    if self.peek_byte()? == b'e' {
                        self.consume_byte();
                        break;
                    }
                    self.skip_value()?;
                    self.skip_value()?;
                }
                self.leave_container();
                Ok(())
            }
            other => Err(Error::UnexpectedChar(other as char)),
        }
    }

    fn enter_container(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::NestingTooDeep);
        }
        Ok(())
    }

    fn leave_container(&mut self) {
        self.depth -= 1;
    }
}

fn invalid_integer(token: &[u8]) -> Error {
    Error::InvalidInteger(String::from_utf8_lossy(token).into_owned())
}

// ── Main Deserializer impl ─────────────────────────────────────────────────

impl<'de, 'a, R: Read> de::Deserializer<'de> for &'a mut Deserializer<R> {
    type Error = Error;

    /// Self-describing dispatch on the lookahead byte, for untyped targets
    /// such as [`Value`](crate::Value).
    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.peek_byte()? {
            b'0'..=b'9' => visitor.visit_byte_buf(self.read_byte_string()?),
            b'i' => self.parse_integer(visitor),
            b'l' => self.deserialize_seq(visitor),
            b'd' => self.deserialize_map(visitor),
            other => Err(Error::UnexpectedChar(other as char)),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Unsupported("bool"))
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.parse_integer(visitor)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.parse_integer(visitor)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.parse_integer(visitor)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.parse_integer(visitor)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.parse_integer(visitor)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.parse_integer(visitor)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.parse_integer(visitor)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.parse_integer(visitor)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Unsupported("f32"))
    }

    fn deserialize_f64<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Unsupported("f64"))
    }

    /// A byte string holding exactly one Unicode scalar
    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let s = self.read_text()?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(de::Error::invalid_value(
                de::Unexpected::Str(&s),
                &"a byte string holding one character",
            )),
        }
    }

    /// Byte string production; text targets require valid UTF-8
    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.read_text()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.read_text()?)
    }

    /// Byte string production, raw bytes (no UTF-8 requirement)
    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect_digit("byte string")?;
        visitor.visit_byte_buf(self.read_byte_string()?)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect_digit("byte string")?;
        visitor.visit_byte_buf(self.read_byte_string()?)
    }

    /// Bencode has no absent production, so a present value is always
    /// `Some`; a missing dictionary key becomes `None` through
    /// `#[serde(default)]` without reaching the deserializer
    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value> {
        Err(Error::Unsupported("unit"))
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _visitor: V,
    ) -> Result<V::Value> {
        Err(Error::Unsupported("unit struct"))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    /// List production: `l`, elements until the `e` terminator. The access
    /// below reports end-of-list without consuming the terminator; it is
    /// consumed here after the visitor returns, so a fixed-arity target that
    /// stops early fails on the unconsumed element instead of desyncing the
    /// stream.
    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect_byte(b'l', "list")?;
        self.enter_container()?;
        let value = visitor.visit_seq(ListAccess { de: &mut *self })?;
        self.leave_container();
        self.expect_byte(b'e', "end of list")?;
        Ok(value)
    }

    /// Fixed-arity list; the element count is the tuple's arity
    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    /// Dictionary production: `d`, key/value pairs until the terminator.
    /// Wire key order is not checked (lenient on read, strict on write).
    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect_byte(b'd', "dictionary")?;
        self.enter_container()?;
        let value = visitor.visit_map(DictAccess { de: &mut *self })?;
        self.leave_container();
        self.expect_byte(b'e', "end of dictionary")?;
        Ok(value)
    }

    /// Dictionary production into named fields. Unknown keys are routed by
    /// the derive to [`deserialize_ignored_any`] and skipped unparsed;
    /// missing keys follow the derive's rules (`#[serde(default)]` for
    /// leniency).
    ///
    /// [`deserialize_ignored_any`]: de::Deserializer::deserialize_ignored_any
    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_map(visitor)
    }

    /// Unit variants bind to byte strings holding the variant name;
    /// variants with data have no bencode production
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_enum(UnitVariantAccess { de: self })
    }

    /// Identifiers (dictionary keys naming fields, variant names) are byte
    /// strings; the raw bytes are handed to serde's field matching
    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.expect_digit("byte string")?;
        visitor.visit_byte_buf(self.read_byte_string()?)
    }

    /// An ignored value is discarded unparsed via the skip routine
    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.skip_value()?;
        visitor.visit_unit()
    }
}

// ── ListAccess ─────────────────────────────────────────────────────────────

struct ListAccess<'a, R: Read> {
    de: &'a mut Deserializer<R>,
}

impl<'de, 'a, R: Read> SeqAccess<'de> for ListAccess<'a, R> {
    type Error = Error;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>> {
        if self.de.peek_byte()? == b'e' {
            return Ok(None);
        }
        seed.deserialize(&mut *self.de).map(Some)
    }
}

// ── DictAccess ─────────────────────────────────────────────────────────────

struct DictAccess<'a, R: Read> {
    de: &'a mut Deserializer<R>,
}

impl<'de, 'a, R: Read> MapAccess<'de> for DictAccess<'a, R> {
    type Error = Error;

    fn next_key_seed<K: de::DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        if self.de.peek_byte()? == b'e' {
            return Ok(None);
        }
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn next_value_seed<V: de::DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        seed.deserialize(&mut *self.de)
    }
}

// ── UnitVariantAccess ──────────────────────────────────────────────────────

struct UnitVariantAccess<'a, R: Read> {
    de: &'a mut Deserializer<R>,
}

impl<'de, 'a, R: Read> EnumAccess<'de> for UnitVariantAccess<'a, R> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: de::DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant)> {
        let variant = seed.deserialize(&mut *self.de)?;
        Ok((variant, self))
    }
}

impl<'de, 'a, R: Read> VariantAccess<'de> for UnitVariantAccess<'a, R> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T: de::DeserializeSeed<'de>>(self, _seed: T) -> Result<T::Value> {
        Err(Error::Unsupported("enum variant with data"))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, _visitor: V) -> Result<V::Value> {
        Err(Error::Unsupported("enum variant with data"))
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value> {
        Err(Error::Unsupported("enum variant with data"))
    }
}

// ── Decoder ────────────────────────────────────────────────────────────────

/// Streaming decoder reading a sequence of bencode documents from one
/// source.
///
/// The decoder owns its read buffer and may read ahead of the bytes
/// logically consumed, so the source must not be read directly between
/// calls. Documents sit back-to-back with no delimiter; calling
/// [`decode`](Decoder::decode) at a clean boundary with the source exhausted
/// returns [`Error::Eof`], distinct from [`Error::UnexpectedEof`] for a
/// source that ran dry mid-value.
///
/// ```rust
/// use bencode_serde::Decoder;
///
/// let mut dec = Decoder::new(&b"i7e3:abc"[..]);
/// assert_eq!(dec.decode::<i64>().unwrap(), 7);
/// assert_eq!(dec.decode::<String>().unwrap(), "abc");
/// assert!(dec.decode::<i64>().unwrap_err().is_eof());
/// ```
pub struct Decoder<R: Read> {
    de: Deserializer<R>,
}

impl<R: Read> Decoder<R> {
    /// Create a decoder reading from `reader`.
    pub fn new(reader: R) -> Self {
        Decoder {
            de: Deserializer::new(reader),
        }
    }

    /// Decode the next document from the stream.
    pub fn decode<T: DeserializeOwned>(&mut self) -> Result<T> {
        // a failed call may have aborted inside a container
        self.de.depth = 0;
        match self.de.peek_maybe()? {
            None => Err(Error::Eof),
            Some(_) => T::deserialize(&mut self.de),
        }
    }
}
