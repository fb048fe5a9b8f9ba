//! Tests using the `vectors.json` test vectors.
//!
//! Every valid vector is checked both ways: the bytes decode to the
//! expected value, and packing that value yields exactly the same bytes.

use mpack::{Error, Map, Value, from_slice, to_vec};
use serde::Deserialize;

fn hex_to_bytes(hex: &str) -> Vec<u8> {
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
        .collect()
}

#[derive(Deserialize)]
struct TestVectors {
    nil: Vec<NilTest>,
    bool: Vec<BoolTest>,
    int: Vec<IntTest>,
    float: Vec<FloatTest>,
    str: Vec<StrTest>,
    bin: Vec<BinTest>,
    array: Vec<ArrayTest>,
    map: Vec<MapTest>,
    invalid: Vec<InvalidTest>,
}

#[derive(Deserialize)]
struct NilTest {
    description: String,
    bytes: String,
}

#[derive(Deserialize)]
struct BoolTest {
    description: String,
    bytes: String,
    value: bool,
}

#[derive(Deserialize)]
struct IntTest {
    description: String,
    bytes: String,
    value: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum PrecisionName {
    F32,
    F64,
}

#[derive(Deserialize)]
struct FloatTest {
    description: String,
    bytes: String,
    value: f64,
    precision: PrecisionName,
}

#[derive(Deserialize)]
struct StrTest {
    description: String,
    bytes: String,
    value: String,
}

#[derive(Deserialize)]
struct BinTest {
    description: String,
    bytes: String,
    value: String, // hex-encoded
}

/// An array of `nil_count` nils.
#[derive(Deserialize)]
struct ArrayTest {
    description: String,
    bytes: String,
    nil_count: usize,
}

/// A map from each integer in `0..int_keys` to nil.
#[derive(Deserialize)]
struct MapTest {
    description: String,
    bytes: String,
    int_keys: i64,
}

#[derive(Deserialize)]
struct InvalidTest {
    description: String,
    bytes: String,
    error: String,
}

fn load_test_vectors() -> TestVectors {
    let json = include_str!("testdata/vectors.json");
    serde_json::from_str(json).expect("Failed to parse test vectors")
}

fn check(description: &str, hex: &str, expected: &Value) {
    let bytes = hex_to_bytes(hex);
    let decoded = from_slice(&bytes)
        .unwrap_or_else(|e| panic!("decode failed for '{description}': {e}"));
    assert_eq!(&decoded, expected, "Wrong value for '{description}'");

    let packed = to_vec(expected)
        .unwrap_or_else(|e| panic!("encode failed for '{description}': {e}"));
    assert_eq!(
        packed, bytes,
        "Byte mismatch for '{description}'\nExpected: {bytes:02x?}\nActual:   {packed:02x?}"
    );
    assert_eq!(expected.encoded_len(), bytes.len(), "Wrong encoded_len for '{description}'");
}

#[test]
fn test_nil_vectors() {
    for test in &load_test_vectors().nil {
        check(&test.description, &test.bytes, &Value::Nil);
    }
}

#[test]
fn test_bool_vectors() {
    for test in &load_test_vectors().bool {
        check(&test.description, &test.bytes, &Value::from(test.value));
    }
}

#[test]
fn test_int_vectors() {
    for test in &load_test_vectors().int {
        check(&test.description, &test.bytes, &Value::from(test.value));
    }
}

#[test]
#[allow(clippy::cast_possible_truncation)]
fn test_float_vectors() {
    for test in &load_test_vectors().float {
        let expected = match test.precision {
            PrecisionName::F32 => Value::from(test.value as f32),
            PrecisionName::F64 => Value::from(test.value),
        };
        check(&test.description, &test.bytes, &expected);
    }
}

#[test]
fn test_str_vectors() {
    for test in &load_test_vectors().str {
        check(&test.description, &test.bytes, &Value::from(test.value.as_str()));
    }
}

#[test]
fn test_bin_vectors() {
    for test in &load_test_vectors().bin {
        check(&test.description, &test.bytes, &Value::from(hex_to_bytes(&test.value)));
    }
}

#[test]
fn test_array_vectors() {
    for test in &load_test_vectors().array {
        let expected = Value::Array(vec![Value::Nil; test.nil_count]);
        check(&test.description, &test.bytes, &expected);
    }
}

#[test]
fn test_map_vectors() {
    for test in &load_test_vectors().map {
        let expected: Map = (0..test.int_keys).map(|k| (Value::from(k), Value::Nil)).collect();
        check(&test.description, &test.bytes, &Value::Map(expected));
    }
}

#[test]
fn test_invalid_vectors() {
    for test in &load_test_vectors().invalid {
        let bytes = hex_to_bytes(&test.bytes);
        let err = match from_slice(&bytes) {
            Ok(v) => panic!("Expected error for '{}', got {v:?}", test.description),
            Err(e) => e,
        };
        let matched = match test.error.as_str() {
            "truncated_stream" => matches!(err, Error::TruncatedStream),
            "unrecognized_tag" => matches!(err, Error::UnrecognizedTag(b) if b == bytes[0]),
            "invalid_utf8" => matches!(err, Error::InvalidUtf8),
            "integer_overflow" => matches!(err, Error::IntegerOverflow(_)),
            "trailing_bytes" => matches!(err, Error::TrailingBytes(_)),
            other => panic!("Unknown error name '{other}' in '{}'", test.description),
        };
        assert!(matched, "Wrong error for '{}': {err:?}", test.description);
    }
}
