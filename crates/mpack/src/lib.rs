//! A compact, self-describing binary value codec compatible with the core
//! MessagePack type set.
//!
//! ```
//! use mpack::{Value, from_slice, to_vec};
//!
//! let value: Value = [
//!     (Value::from("compact"), Value::from(true)),
//!     (Value::from("schema"), Value::from(0)),
//! ]
//! .into_iter()
//! .collect();
//!
//! let bytes = to_vec(&value).unwrap();
//! assert_eq!(bytes[0], 0x82);
//! assert_eq!(from_slice(&bytes).unwrap(), value);
//! assert_eq!(value.to_json(), "{\n  \"compact\": true,\n  \"schema\": 0\n}");
//! ```

pub mod decode;
pub mod encode;
pub mod error;
pub mod json;
pub mod tag;
pub mod value;

pub use decode::{DEFAULT_MAX_DEPTH, Reader, from_reader, from_slice};
pub use encode::{Bin, Nil, Pack, to_vec};
pub use error::{Error, ErrorKind, Result};
pub use tag::ValueType;
pub use value::{Float, Map, Precision, Value};
