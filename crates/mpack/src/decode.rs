//! Decoding of MessagePack values from a byte source.
//!
//! The [`Reader`] consumes one leading byte, looks up the owning
//! [`ValueType`] in the dispatch table and hands the rest of the stream to
//! that type's unpacker. Containers recurse back into the reader for each
//! element (twice per map entry).
//!
//! ```
//! use mpack::{Reader, Value};
//!
//! let bytes = [0x92u8, 0x01, 0xC3]; // [1, true]
//! let value = Reader::new().read(&mut &bytes[..]).unwrap();
//! assert_eq!(value, Value::from(vec![Value::from(1), Value::from(true)]));
//! ```

use std::io::Read;

use crate::error::{Error, Result};
use crate::tag::{
    FLOAT32, FLOAT64, INT8, INT16, INT32, INT64, TRUE, Tag, UINT8, UINT16, UINT32, UINT64,
    ValueType, read_uint_be,
};
use crate::value::{Float, Map, Value};

/// Default container nesting limit of [`Reader::new`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Upper bound on elements preallocated from an untrusted length header.
const PREALLOC_LIMIT: usize = 4096;

/// Decodes one complete (possibly nested) value per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reader {
    max_depth: usize,
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader {
    /// Create a reader with [`DEFAULT_MAX_DEPTH`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Create a reader that rejects containers nested deeper than `max_depth`.
    #[must_use]
    pub const fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Read one value from `src`.
    ///
    /// # Errors
    ///
    /// - `Error::TruncatedStream` if `src` ends inside the value
    /// - `Error::UnrecognizedTag` if a leading byte belongs to no type
    /// - `Error::InvalidUtf8`, `Error::IntegerOverflow` for bad payloads
    /// - `Error::MaxDepthExceeded` if containers nest too deeply
    pub fn read<R: Read + ?Sized>(&self, src: &mut R) -> Result<Value> {
        self.read_at(src, 0)
    }

    /// Decode the value whose leading byte `first` was already consumed.
    ///
    /// # Errors
    ///
    /// See [`Reader::read`].
    pub fn unpack<R: Read + ?Sized>(&self, first: u8, src: &mut R) -> Result<Value> {
        self.unpack_at(first, src, 0)
    }

    fn read_at<R: Read + ?Sized>(&self, src: &mut R, depth: usize) -> Result<Value> {
        let first = read_byte(src)?;
        self.unpack_at(first, src, depth)
    }

    fn unpack_at<R: Read + ?Sized>(&self, first: u8, src: &mut R, depth: usize) -> Result<Value> {
        match ValueType::of(first) {
            Some(ValueType::Nil) => unpack_nil(first),
            Some(ValueType::Bool) => unpack_bool(first),
            Some(ValueType::Int) => unpack_int(first, src),
            Some(ValueType::Float) => unpack_float(first, src),
            Some(ValueType::Str) => unpack_str(first, src),
            Some(ValueType::Bin) => unpack_bin(first, src),
            Some(ValueType::Array) => self.unpack_array(first, src, depth),
            Some(ValueType::Map) => self.unpack_map(first, src, depth),
            None => Err(Error::UnrecognizedTag(first)),
        }
    }

    fn unpack_array<R: Read + ?Sized>(&self, first: u8, src: &mut R, depth: usize) -> Result<Value> {
        expect(ValueType::Array, first)?;
        self.enter(depth)?;
        let len = read_len(first, src)?;
        let mut items = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            items.push(self.read_at(src, depth + 1)?);
        }
        Ok(Value::Array(items))
    }

    /// Duplicate keys on the wire keep the last value.
    fn unpack_map<R: Read + ?Sized>(&self, first: u8, src: &mut R, depth: usize) -> Result<Value> {
        expect(ValueType::Map, first)?;
        self.enter(depth)?;
        let len = read_len(first, src)?;
        let mut map = Map::new();
        for _ in 0..len {
            let key = self.read_at(src, depth + 1)?;
            let value = self.read_at(src, depth + 1)?;
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }

    fn enter(&self, depth: usize) -> Result<()> {
        if depth >= self.max_depth {
            return Err(Error::MaxDepthExceeded(self.max_depth));
        }
        Ok(())
    }
}

/// Read one value from `src` with the default reader.
///
/// # Errors
///
/// See [`Reader::read`].
pub fn from_reader<R: Read + ?Sized>(src: &mut R) -> Result<Value> {
    Reader::new().read(src)
}

/// Decode a buffer holding exactly one value.
///
/// # Errors
///
/// See [`Reader::read`]; additionally returns `Error::TrailingBytes` if
/// bytes remain after the value.
pub fn from_slice(bytes: &[u8]) -> Result<Value> {
    let mut rest = bytes;
    let value = Reader::new().read(&mut rest)?;
    if !rest.is_empty() {
        return Err(Error::TrailingBytes(rest.len()));
    }
    Ok(value)
}

// --- per-type unpackers ---

/// Unpack a nil value.
///
/// # Errors
///
/// Returns `Error::InvalidFixedTag` if `first` is not the nil tag.
pub fn unpack_nil(first: u8) -> Result<Value> {
    expect(ValueType::Nil, first)?;
    Ok(Value::Nil)
}

/// Unpack a boolean value.
///
/// # Errors
///
/// Returns `Error::InvalidFixedTag` if `first` is not a bool tag.
pub fn unpack_bool(first: u8) -> Result<Value> {
    expect(ValueType::Bool, first)?;
    Ok(Value::Bool(first == TRUE))
}

/// Unpack an integer of any width into a signed 64-bit value.
///
/// # Errors
///
/// Returns `Error::IntegerOverflow` for a uint64 above `i64::MAX`.
pub fn unpack_int<R: Read + ?Sized>(first: u8, src: &mut R) -> Result<Value> {
    let tag = Tag::from_byte(first);
    let n = match first {
        _ if tag.is_fixnum() => tag.fixnum(),
        UINT8 => i64::from(read_byte(src)?),
        UINT16 => i64::from(u16::from_be_bytes(read_fixed(src)?)),
        UINT32 => i64::from(u32::from_be_bytes(read_fixed(src)?)),
        UINT64 => {
            let n = u64::from_be_bytes(read_fixed(src)?);
            i64::try_from(n).map_err(|_| Error::IntegerOverflow(n))?
        }
        INT8 => i64::from(i8::from_be_bytes(read_fixed(src)?)),
        INT16 => i64::from(i16::from_be_bytes(read_fixed(src)?)),
        INT32 => i64::from(i32::from_be_bytes(read_fixed(src)?)),
        INT64 => i64::from_be_bytes(read_fixed(src)?),
        _ => return Err(invalid(ValueType::Int, first)),
    };
    Ok(Value::Int(n))
}

/// Unpack a float, recording its wire width as the precision.
///
/// # Errors
///
/// Returns `Error::InvalidFixedTag` if `first` is not a float tag.
pub fn unpack_float<R: Read + ?Sized>(first: u8, src: &mut R) -> Result<Value> {
    let f = match first {
        FLOAT32 => Float::f32(f32::from_bits(u32::from_be_bytes(read_fixed(src)?))),
        FLOAT64 => Float::f64(f64::from_bits(u64::from_be_bytes(read_fixed(src)?))),
        _ => return Err(invalid(ValueType::Float, first)),
    };
    Ok(Value::Float(f))
}

/// Unpack a UTF-8 string.
///
/// # Errors
///
/// Returns `Error::InvalidUtf8` if the payload is not valid UTF-8.
pub fn unpack_str<R: Read + ?Sized>(first: u8, src: &mut R) -> Result<Value> {
    expect(ValueType::Str, first)?;
    let len = read_len(first, src)?;
    let bytes = read_payload(src, len)?;
    let s = String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?;
    Ok(Value::Str(s))
}

/// Unpack binary data.
///
/// # Errors
///
/// Returns `Error::TruncatedStream` if fewer than the declared bytes remain.
pub fn unpack_bin<R: Read + ?Sized>(first: u8, src: &mut R) -> Result<Value> {
    expect(ValueType::Bin, first)?;
    let len = read_len(first, src)?;
    Ok(Value::Bin(read_payload(src, len)?))
}

// --- byte source helpers ---

fn expect(ty: ValueType, first: u8) -> Result<()> {
    if ty.owns(first) {
        Ok(())
    } else {
        Err(invalid(ty, first))
    }
}

fn invalid(ty: ValueType, found: u8) -> Error {
    Error::InvalidFixedTag {
        expected: ty.name(),
        found,
    }
}

/// Read the element count or byte length following a length-prefixed tag.
fn read_len<R: Read + ?Sized>(first: u8, src: &mut R) -> Result<usize> {
    let tag = Tag::from_byte(first);
    if let Some(len) = tag.fix_len() {
        return Ok(len);
    }
    let width = tag.length_width().ok_or(Error::UnrecognizedTag(first))?;
    let mut buf = [0u8; 4];
    src.read_exact(&mut buf[..width])?;
    let len = read_uint_be(&buf[..width]).ok_or(Error::UnrecognizedTag(first))?;
    usize::try_from(len).map_err(|_| Error::LengthOverflow(usize::MAX))
}

fn read_byte<R: Read + ?Sized>(src: &mut R) -> Result<u8> {
    let [b] = read_fixed::<1, R>(src)?;
    Ok(b)
}

fn read_fixed<const N: usize, R: Read + ?Sized>(src: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    src.read_exact(&mut buf)?;
    Ok(buf)
}

/// Read exactly `len` payload bytes without trusting `len` for allocation.
fn read_payload<R: Read + ?Sized>(src: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len.min(PREALLOC_LIMIT));
    Read::take(&mut *src, len as u64).read_to_end(&mut buf)?;
    if buf.len() < len {
        return Err(Error::TruncatedStream);
    }
    Ok(buf)
}
