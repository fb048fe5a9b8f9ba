//! Encoding of values into the MessagePack binary format.
//!
//! # The `Pack` Trait
//!
//! The [`Pack`] trait writes a value's canonical form into any
//! [`std::io::Write`] sink. It is implemented for [`Value`] and for the
//! primitive Rust types that map directly onto a wire type:
//!
//! | Rust Type         | Wire Type                    |
//! |-------------------|------------------------------|
//! | `Nil`             | nil                          |
//! | `bool`            | bool                         |
//! | `i64`             | int (narrowest width)        |
//! | `f32` / `f64`     | float32 / float64            |
//! | `str` / `String`  | str                          |
//! | `Bin`             | bin                          |
//!
//! Every writer picks the narrowest encoding: integers use fixnums before
//! sized forms and unsigned forms for non-negative values; strings, binaries,
//! arrays and maps use the shortest header that holds their length.

use std::io::Write;

use crate::error::{Error, Result};
use crate::tag::{
    ARRAY_TAGS, BIN_TAGS, FLOAT32, FLOAT64, INT8, INT16, INT32, INT64, LengthTags, MAP_TAGS,
    NIL, STR_TAGS, Tag, UINT8, UINT16, UINT32, UINT64,
};
use crate::value::{Float, Precision, Value};

/// Trait for types that can be packed as MessagePack values.
pub trait Pack {
    /// Write this value's binary form to `out`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the sink fails, or `Error::LengthOverflow` if a
    /// length does not fit a 32-bit length field.
    fn pack<W: Write + ?Sized>(&self, out: &mut W) -> Result<()>;
}

/// Nil value marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nil;

impl Pack for Nil {
    fn pack<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write_nil(out)
    }
}

impl Pack for bool {
    fn pack<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write_bool(out, *self)
    }
}

impl Pack for i64 {
    fn pack<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write_int(out, *self)
    }
}

impl Pack for f32 {
    fn pack<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write_float(out, Float::f32(*self))
    }
}

impl Pack for f64 {
    fn pack<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write_float(out, Float::f64(*self))
    }
}

impl Pack for str {
    fn pack<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write_str(out, self)
    }
}

impl Pack for String {
    fn pack<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write_str(out, self)
    }
}

/// Binary data wrapper (to distinguish from arrays of small integers).
#[derive(Debug, Clone, Copy)]
pub struct Bin<'a>(pub &'a [u8]);

impl Pack for Bin<'_> {
    fn pack<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write_bin(out, self.0)
    }
}

impl Pack for Value {
    fn pack<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        match self {
            Value::Nil => write_nil(out),
            Value::Bool(b) => write_bool(out, *b),
            Value::Int(n) => write_int(out, *n),
            Value::Float(f) => write_float(out, *f),
            Value::Str(s) => write_str(out, s),
            Value::Bin(b) => write_bin(out, b),
            Value::Array(items) => {
                write_header(out, &ARRAY_TAGS, items.len())?;
                for item in items {
                    item.pack(out)?;
                }
                Ok(())
            }
            Value::Map(map) => {
                write_header(out, &MAP_TAGS, map.len())?;
                for (key, value) in map {
                    key.pack(out)?;
                    value.pack(out)?;
                }
                Ok(())
            }
        }
    }
}

impl Value {
    /// Write this value's binary form to `out`.
    ///
    /// # Errors
    ///
    /// See [`Pack::pack`].
    pub fn pack<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        Pack::pack(self, out)
    }

    /// Number of bytes [`Value::pack`] writes for this value.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        match self {
            Value::Nil | Value::Bool(_) => 1,
            Value::Int(n) => int_len(*n),
            Value::Float(f) => match f.precision() {
                Precision::F32 => 5,
                Precision::F64 => 9,
            },
            Value::Str(s) => header_len(&STR_TAGS, s.len()) + s.len(),
            Value::Bin(b) => header_len(&BIN_TAGS, b.len()) + b.len(),
            Value::Array(items) => {
                header_len(&ARRAY_TAGS, items.len())
                    + items.iter().map(Value::encoded_len).sum::<usize>()
            }
            Value::Map(map) => {
                header_len(&MAP_TAGS, map.len())
                    + map
                        .iter()
                        .map(|(k, v)| k.encoded_len() + v.encoded_len())
                        .sum::<usize>()
            }
        }
    }
}

/// Pack a value into a freshly allocated buffer.
///
/// # Errors
///
/// Returns `Error::LengthOverflow` if a length does not fit a 32-bit field.
pub fn to_vec(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(value.encoded_len());
    value.pack(&mut out)?;
    Ok(out)
}

/// Write a nil value (1 byte).
pub fn write_nil<W: Write + ?Sized>(out: &mut W) -> Result<()> {
    out.write_all(&[NIL])?;
    Ok(())
}

/// Write a boolean value (1 byte).
pub fn write_bool<W: Write + ?Sized>(out: &mut W, value: bool) -> Result<()> {
    out.write_all(&[Tag::encode_bool(value)])?;
    Ok(())
}

/// Write an integer using the narrowest encoding that holds it.
pub fn write_int<W: Write + ?Sized>(out: &mut W, n: i64) -> Result<()> {
    match n {
        0..=0x7F => out.write_all(&[Tag::encode_positive_fixnum(n as u8)])?,
        0x80..=0xFF => out.write_all(&[UINT8, n as u8])?,
        0x100..=0xFFFF => write_tagged(out, UINT16, &(n as u16).to_be_bytes())?,
        0x1_0000..=0xFFFF_FFFF => write_tagged(out, UINT32, &(n as u32).to_be_bytes())?,
        0x1_0000_0000.. => write_tagged(out, UINT64, &(n as u64).to_be_bytes())?,
        -32..=-1 => out.write_all(&[Tag::encode_negative_fixnum(n as i8)])?,
        -0x80..=-33 => out.write_all(&[INT8, n as i8 as u8])?,
        -0x8000..=-0x81 => write_tagged(out, INT16, &(n as i16).to_be_bytes())?,
        -0x8000_0000..=-0x8001 => write_tagged(out, INT32, &(n as i32).to_be_bytes())?,
        _ => write_tagged(out, INT64, &n.to_be_bytes())?,
    }
    Ok(())
}

/// Write a float at its stored precision.
pub fn write_float<W: Write + ?Sized>(out: &mut W, f: Float) -> Result<()> {
    match f.precision() {
        Precision::F32 => write_tagged(out, FLOAT32, &(f.value() as f32).to_bits().to_be_bytes())?,
        Precision::F64 => write_tagged(out, FLOAT64, &f.value().to_bits().to_be_bytes())?,
    }
    Ok(())
}

/// Write a string; the header carries its UTF-8 byte length.
pub fn write_str<W: Write + ?Sized>(out: &mut W, s: &str) -> Result<()> {
    write_header(out, &STR_TAGS, s.len())?;
    out.write_all(s.as_bytes())?;
    Ok(())
}

/// Write binary data.
pub fn write_bin<W: Write + ?Sized>(out: &mut W, data: &[u8]) -> Result<()> {
    write_header(out, &BIN_TAGS, data.len())?;
    out.write_all(data)?;
    Ok(())
}

/// Write an array header for `len` elements. The caller packs the elements.
pub fn write_array_header<W: Write + ?Sized>(out: &mut W, len: usize) -> Result<()> {
    write_header(out, &ARRAY_TAGS, len)
}

/// Write a map header for `len` entries. The caller packs each key then value.
pub fn write_map_header<W: Write + ?Sized>(out: &mut W, len: usize) -> Result<()> {
    write_header(out, &MAP_TAGS, len)
}

/// Write the shortest header of a length-prefixed family.
///
/// # Errors
///
/// Returns `Error::LengthOverflow` if `len` exceeds `u32::MAX`.
pub fn write_header<W: Write + ?Sized>(out: &mut W, tags: &LengthTags, len: usize) -> Result<()> {
    if let Some((base, max)) = tags.fix
        && len <= max
    {
        out.write_all(&[Tag::encode_fix(base, len as u8)])?;
        return Ok(());
    }
    if let Some(len8) = tags.len8
        && len <= 0xFF
    {
        out.write_all(&[len8, len as u8])?;
        return Ok(());
    }
    if len <= 0xFFFF {
        write_tagged(out, tags.len16, &(len as u16).to_be_bytes())?;
    } else {
        let len32 = u32::try_from(len).map_err(|_| Error::LengthOverflow(len))?;
        write_tagged(out, tags.len32, &len32.to_be_bytes())?;
    }
    Ok(())
}

/// Size of the header [`write_header`] emits for `len`.
#[must_use]
pub fn header_len(tags: &LengthTags, len: usize) -> usize {
    match tags.fix {
        Some((_, max)) if len <= max => 1,
        _ if tags.len8.is_some() && len <= 0xFF => 2,
        _ if len <= 0xFFFF => 3,
        _ => 5,
    }
}

/// Size of the encoding [`write_int`] emits for `n`.
#[must_use]
pub fn int_len(n: i64) -> usize {
    match n {
        -32..=0x7F => 1,
        -0x80..=0xFF => 2,
        -0x8000..=0xFFFF => 3,
        -0x8000_0000..=0xFFFF_FFFF => 5,
        _ => 9,
    }
}

fn write_tagged<W: Write + ?Sized>(out: &mut W, tag: u8, payload: &[u8]) -> std::io::Result<()> {
    out.write_all(&[tag])?;
    out.write_all(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed<P: Pack + ?Sized>(value: &P) -> Vec<u8> {
        let mut out = Vec::new();
        value.pack(&mut out).unwrap();
        out
    }

    #[test]
    fn test_encode_nil_and_bool() {
        assert_eq!(packed(&Nil), vec![0xC0]);
        assert_eq!(packed(&false), vec![0xC2]);
        assert_eq!(packed(&true), vec![0xC3]);
    }

    #[test]
    fn test_encode_int_boundaries() {
        let cases: &[(i64, &[u8])] = &[
            (0, &[0x00]),
            (127, &[0x7F]),
            (128, &[0xCC, 0x80]),
            (255, &[0xCC, 0xFF]),
            (256, &[0xCD, 0x01, 0x00]),
            (65535, &[0xCD, 0xFF, 0xFF]),
            (65536, &[0xCE, 0x00, 0x01, 0x00, 0x00]),
            (4_294_967_295, &[0xCE, 0xFF, 0xFF, 0xFF, 0xFF]),
            (
                4_294_967_296,
                &[0xCF, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00],
            ),
            (-1, &[0xFF]),
            (-32, &[0xE0]),
            (-33, &[0xD0, 0xDF]),
            (-128, &[0xD0, 0x80]),
            (-129, &[0xD1, 0xFF, 0x7F]),
            (-32768, &[0xD1, 0x80, 0x00]),
            (-32769, &[0xD2, 0xFF, 0xFF, 0x7F, 0xFF]),
            (i64::from(i32::MIN), &[0xD2, 0x80, 0x00, 0x00, 0x00]),
            (
                i64::MIN,
                &[0xD3, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            ),
        ];
        for &(n, expected) in cases {
            assert_eq!(packed(&n), expected, "encoding of {n}");
            assert_eq!(int_len(n), expected.len(), "int_len of {n}");
        }
    }

    #[test]
    fn test_encode_float() {
        assert_eq!(packed(&1.5f32), vec![0xCA, 0x3F, 0xC0, 0x00, 0x00]);
        assert_eq!(
            packed(&1.5f64),
            vec![0xCB, 0x3F, 0xF8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_encode_str() {
        assert_eq!(packed("hi"), vec![0xA2, b'h', b'i']);
        assert_eq!(packed(""), vec![0xA0]);

        let s = "a".repeat(32);
        let encoded = packed(s.as_str());
        assert_eq!(&encoded[..2], &[0xD9, 0x20]);
        assert_eq!(&encoded[2..], s.as_bytes());

        // Length counts UTF-8 bytes, not chars
        assert_eq!(packed("🤓")[0], 0xA4);
    }

    #[test]
    fn test_encode_bin_has_no_fix_form() {
        assert_eq!(packed(&Bin(&[])), vec![0xC4, 0x00]);
        assert_eq!(packed(&Bin(&[1, 3, 3, 7])), vec![0xC4, 0x04, 1, 3, 3, 7]);
        assert_eq!(&packed(&Bin(&[0; 256]))[..3], &[0xC5, 0x01, 0x00]);
    }

    #[test]
    fn test_header_selection() {
        let cases: &[(&LengthTags, usize, &[u8])] = &[
            (&STR_TAGS, 31, &[0xBF]),
            (&STR_TAGS, 255, &[0xD9, 0xFF]),
            (&STR_TAGS, 65536, &[0xDB, 0x00, 0x01, 0x00, 0x00]),
            (&BIN_TAGS, 65535, &[0xC5, 0xFF, 0xFF]),
            (&ARRAY_TAGS, 15, &[0x9F]),
            (&ARRAY_TAGS, 16, &[0xDC, 0x00, 0x10]),
            (&ARRAY_TAGS, 65536, &[0xDD, 0x00, 0x01, 0x00, 0x00]),
            (&MAP_TAGS, 0, &[0x80]),
            (&MAP_TAGS, 16, &[0xDE, 0x00, 0x10]),
        ];
        for &(tags, len, expected) in cases {
            let mut out = Vec::new();
            write_header(&mut out, tags, len).unwrap();
            assert_eq!(out, expected, "header for len {len}");
            assert_eq!(header_len(tags, len), expected.len());
            if expected.len() > 1 {
                let width = Tag::from_byte(expected[0]).length_width();
                assert_eq!(width, Some(expected.len() - 1));
            }
        }
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_header_length_overflow() {
        let mut out = Vec::new();
        let err = write_header(&mut out, &BIN_TAGS, 1 << 32).unwrap_err();
        assert!(matches!(err, Error::LengthOverflow(_)));
    }

    #[test]
    fn test_encode_demo_map() {
        let value: Value = [
            (Value::from("compact"), Value::from(true)),
            (Value::from("schema"), Value::from(0)),
        ]
        .into_iter()
        .collect();
        let mut expected = vec![0x82, 0xA7];
        expected.extend_from_slice(b"compact");
        expected.extend_from_slice(&[0xC3, 0xA6]);
        expected.extend_from_slice(b"schema");
        expected.push(0x00);
        assert_eq!(to_vec(&value).unwrap(), expected);
        assert_eq!(value.encoded_len(), expected.len());
    }

    #[test]
    fn test_encode_nested_array() {
        let value = Value::from(vec![
            Value::from(1),
            Value::from(vec![Value::nil()]),
            Value::from("a"),
        ]);
        assert_eq!(
            to_vec(&value).unwrap(),
            vec![0x93, 0x01, 0x91, 0xC0, 0xA1, b'a']
        );
    }

    #[test]
    fn test_sink_errors_propagate() {
        struct Full;
        impl Write for Full {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let err = Value::from("x").pack(&mut Full).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
