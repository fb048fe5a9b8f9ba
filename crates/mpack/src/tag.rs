//! Leading-byte constants and dispatch for MessagePack values.
//!
//! Every value starts with a 1-byte tag. Small values and lengths are
//! embedded in the tag itself (fixnum, fixstr, fixarray, fixmap); everything
//! else uses a fixed tag followed by a big-endian length or payload.

pub const POSITIVE_FIXNUM_MAX: u8 = 0x7F;
pub const FIXMAP: u8 = 0x80;
pub const FIXARRAY: u8 = 0x90;
pub const FIXSTR: u8 = 0xA0;
pub const NIL: u8 = 0xC0;
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;
pub const BIN8: u8 = 0xC4;
pub const BIN16: u8 = 0xC5;
pub const BIN32: u8 = 0xC6;
pub const FLOAT32: u8 = 0xCA;
pub const FLOAT64: u8 = 0xCB;
pub const UINT8: u8 = 0xCC;
pub const UINT16: u8 = 0xCD;
pub const UINT32: u8 = 0xCE;
pub const UINT64: u8 = 0xCF;
pub const INT8: u8 = 0xD0;
pub const INT16: u8 = 0xD1;
pub const INT32: u8 = 0xD2;
pub const INT64: u8 = 0xD3;
pub const STR8: u8 = 0xD9;
pub const STR16: u8 = 0xDA;
pub const STR32: u8 = 0xDB;
pub const ARRAY16: u8 = 0xDC;
pub const ARRAY32: u8 = 0xDD;
pub const MAP16: u8 = 0xDE;
pub const MAP32: u8 = 0xDF;
pub const NEGATIVE_FIXNUM: u8 = 0xE0;

/// Value type owning a leading byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ValueType {
    Nil = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    Str = 4,
    Bin = 5,
    Array = 6,
    Map = 7,
}

/// Leading byte to owning type. `None` marks bytes no type claims
/// (0xC1 and the extension tags).
static DISPATCH: [Option<ValueType>; 256] = build_dispatch();

const fn build_dispatch() -> [Option<ValueType>; 256] {
    let mut table = [None; 256];
    let mut b = 0usize;
    while b < 256 {
        let byte = b as u8;
        table[b] = match byte {
            0x00..=0x7F | 0xE0..=0xFF => Some(ValueType::Int),
            0x80..=0x8F | MAP16 | MAP32 => Some(ValueType::Map),
            0x90..=0x9F | ARRAY16 | ARRAY32 => Some(ValueType::Array),
            0xA0..=0xBF | STR8 | STR16 | STR32 => Some(ValueType::Str),
            NIL => Some(ValueType::Nil),
            FALSE | TRUE => Some(ValueType::Bool),
            BIN8 | BIN16 | BIN32 => Some(ValueType::Bin),
            FLOAT32 | FLOAT64 => Some(ValueType::Float),
            UINT8..=INT64 => Some(ValueType::Int),
            _ => None,
        };
        b += 1;
    }
    table
}

impl ValueType {
    /// Identify the type owning a leading byte.
    #[inline]
    #[must_use]
    pub fn of(byte: u8) -> Option<Self> {
        DISPATCH[byte as usize]
    }

    /// Check whether this type claims the given leading byte.
    #[inline]
    #[must_use]
    pub fn owns(self, byte: u8) -> bool {
        Self::of(byte) == Some(self)
    }

    /// Get the type name as a string (for error messages).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Nil => "nil",
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Str => "str",
            ValueType::Bin => "bin",
            ValueType::Array => "array",
            ValueType::Map => "map",
        }
    }
}

/// Tag bytes for one length-prefixed family.
///
/// `fix` is the base tag and maximum length of the embedded-length form, if
/// the family has one. `len8` is the 1-byte length tag, if any.
#[derive(Debug, Clone, Copy)]
pub struct LengthTags {
    pub fix: Option<(u8, usize)>,
    pub len8: Option<u8>,
    pub len16: u8,
    pub len32: u8,
}

pub const STR_TAGS: LengthTags = LengthTags {
    fix: Some((FIXSTR, 31)),
    len8: Some(STR8),
    len16: STR16,
    len32: STR32,
};

pub const BIN_TAGS: LengthTags = LengthTags {
    fix: None,
    len8: Some(BIN8),
    len16: BIN16,
    len32: BIN32,
};

pub const ARRAY_TAGS: LengthTags = LengthTags {
    fix: Some((FIXARRAY, 15)),
    len8: None,
    len16: ARRAY16,
    len32: ARRAY32,
};

pub const MAP_TAGS: LengthTags = LengthTags {
    fix: Some((FIXMAP, 15)),
    len8: None,
    len16: MAP16,
    len32: MAP32,
};

/// Parsed tag byte - cheaply constructed, no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag(u8);

impl Tag {
    /// Create a Tag from a raw byte.
    #[inline]
    #[must_use]
    pub const fn from_byte(b: u8) -> Self {
        Tag(b)
    }

    /// Get the raw tag byte.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Get the owning value type, if any.
    #[inline]
    #[must_use]
    pub fn value_type(self) -> Option<ValueType> {
        ValueType::of(self.0)
    }

    /// Embedded value of a positive or negative fixnum.
    /// Only valid for bytes 0x00-0x7F and 0xE0-0xFF.
    #[inline]
    #[must_use]
    pub const fn fixnum(self) -> i64 {
        self.0 as i8 as i64
    }

    /// Check if this is a positive or negative fixnum.
    #[inline]
    #[must_use]
    pub const fn is_fixnum(self) -> bool {
        self.0 <= POSITIVE_FIXNUM_MAX || self.0 >= NEGATIVE_FIXNUM
    }

    /// Length embedded in a fixstr (low 5 bits) or fixarray/fixmap (low 4 bits).
    /// Returns `None` for tags with a separate length field.
    #[inline]
    #[must_use]
    pub const fn fix_len(self) -> Option<usize> {
        match self.0 {
            0x80..=0x9F => Some((self.0 & 0x0F) as usize),
            0xA0..=0xBF => Some((self.0 & 0x1F) as usize),
            _ => None,
        }
    }

    /// Number of big-endian length bytes following a length-prefixed tag.
    #[inline]
    #[must_use]
    pub const fn length_width(self) -> Option<usize> {
        match self.0 {
            STR8 | BIN8 => Some(1),
            STR16 | BIN16 | ARRAY16 | MAP16 => Some(2),
            STR32 | BIN32 | ARRAY32 | MAP32 => Some(4),
            _ => None,
        }
    }

    // --- Encoding ---

    /// Encode a positive fixnum (0-127).
    #[inline]
    #[must_use]
    pub const fn encode_positive_fixnum(value: u8) -> u8 {
        value & POSITIVE_FIXNUM_MAX
    }

    /// Encode a negative fixnum (-32..-1).
    #[inline]
    #[must_use]
    pub const fn encode_negative_fixnum(value: i8) -> u8 {
        value as u8 | NEGATIVE_FIXNUM
    }

    /// Encode a fix-length tag from its family base tag.
    #[inline]
    #[must_use]
    pub const fn encode_fix(base: u8, len: u8) -> u8 {
        base | len
    }

    /// Encode a bool tag.
    #[inline]
    #[must_use]
    pub const fn encode_bool(value: bool) -> u8 {
        if value { TRUE } else { FALSE }
    }
}

/// Read a big-endian unsigned integer of 1, 2, 4 or 8 bytes.
/// Returns None if the slice is empty or longer than 8 bytes.
#[must_use]
pub fn read_uint_be(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return None;
    }
    let mut buf = [0u8; 8];
    buf[8 - bytes.len()..].copy_from_slice(bytes);
    Some(u64::from_be_bytes(buf))
}
