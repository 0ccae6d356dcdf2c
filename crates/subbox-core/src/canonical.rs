//! # Canonical Serialization: Checksum Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! used in config checksum computation.
//!
//! ## Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()`, which converts the value
//! into a JSON tree and writes it in canonical form. Any function requiring
//! checksum input must accept `&CanonicalBytes`, so the "wrong serialization
//! path" mistake cannot compile.
//!
//! ## Byte Layout
//!
//! Checksums published in export metadata are consumed by agents that
//! recompute them with
//! `json.dumps(config, sort_keys=True, separators=(",", ":"))`. The layout
//! here reproduces that output exactly:
//!
//! 1. **Sorted keys**: object keys ordered by Unicode code point, at every
//!    nesting level.
//! 2. **Compact separators**: `,` between items and `:` between key and
//!    value, no other whitespace.
//! 3. **ASCII-only output**: `"` and `\` are backslash-escaped, `\n`, `\r`,
//!    `\t`, `\b`, `\f` use their short forms, every other character outside
//!    printable ASCII becomes `\uXXXX` (UTF-16 surrogate pairs above the BMP).
//! 4. **Numbers**: integers verbatim; floats in shortest round-trip form,
//!    positional for exponents in `[-4, 16)` (always with a fractional part),
//!    scientific otherwise with a signed, at-least-two-digit exponent.
//!    NaN and infinities are rejected. `serde_json::to_value` would turn them
//!    into `null`, so the input is walked for them before conversion.

use std::fmt::{self, Write as _};

use serde::ser::{self, Serialize};
use serde_json::{Number, Value};

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by canonical JSON serialization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - Object keys are sorted at every level.
/// - Separators are compact; there is no insignificant whitespace.
/// - The byte sequence is pure ASCII (and therefore valid UTF-8).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::NonFiniteFloat` if the value contains
    /// NaN or an infinity, and `CanonicalizationError::SerializationFailed`
    /// if it cannot be represented as a JSON value tree (for example a map
    /// with non-string keys).
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        reject_non_finite(obj)?;
        let value = serde_json::to_value(obj)?;
        let mut out = String::new();
        write_value(&value, &mut out);
        Ok(Self(out.into_bytes()))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_non_finite(obj: &impl Serialize) -> Result<(), CanonicalizationError> {
    match obj.serialize(FloatCheck) {
        Err(FloatCheckError::NonFinite(f)) => Err(CanonicalizationError::NonFiniteFloat(f)),
        // Anything else is reported by the `to_value` conversion that follows.
        Ok(()) | Err(FloatCheckError::Custom(_)) => Ok(()),
    }
}

#[derive(Debug)]
enum FloatCheckError {
    NonFinite(f64),
    Custom(String),
}

impl fmt::Display for FloatCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite(v) => write!(f, "non-finite float {v}"),
            Self::Custom(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for FloatCheckError {}

impl ser::Error for FloatCheckError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}

/// Serializer that produces nothing and fails on the first NaN or infinity.
#[derive(Clone, Copy)]
struct FloatCheck;

macro_rules! accept {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(fn $method(self, _: $ty) -> Result<(), FloatCheckError> {
            Ok(())
        })*
    };
}

impl ser::Serializer for FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    accept! {
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_char: char,
        serialize_str: &str,
        serialize_bytes: &[u8],
        serialize_unit_struct: &'static str,
    }

    fn serialize_f32(self, v: f32) -> Result<(), FloatCheckError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), FloatCheckError> {
        if v.is_finite() {
            Ok(())
        } else {
            Err(FloatCheckError::NonFinite(v))
        }
    }

    fn serialize_none(self) -> Result<(), FloatCheckError> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), FloatCheckError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), FloatCheckError> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<(), FloatCheckError> {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), FloatCheckError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), FloatCheckError> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self, FloatCheckError> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self, FloatCheckError> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self, FloatCheckError> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, FloatCheckError> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self, FloatCheckError> {
        Ok(self)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self, FloatCheckError> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, FloatCheckError> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), FloatCheckError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FloatCheckError> {
        Ok(())
    }
}

impl ser::SerializeTuple for FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), FloatCheckError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FloatCheckError> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), FloatCheckError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FloatCheckError> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), FloatCheckError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FloatCheckError> {
        Ok(())
    }
}

impl ser::SerializeMap for FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), FloatCheckError> {
        key.serialize(*self)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), FloatCheckError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FloatCheckError> {
        Ok(())
    }
}

impl ser::SerializeStruct for FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), FloatCheckError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FloatCheckError> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FloatCheck {
    type Ok = ();
    type Error = FloatCheckError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), FloatCheckError> {
        value.serialize(*self)
    }

    fn end(self) -> Result<(), FloatCheckError> {
        Ok(())
    }
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_value(item, out);
            }
            out.push('}');
        }
    }
}

fn write_number(n: &Number, out: &mut String) {
    if n.is_i64() || n.is_u64() {
        out.push_str(&n.to_string());
    } else if let Some(f) = n.as_f64() {
        out.push_str(&float_repr(f));
    } else {
        out.push_str(&n.to_string());
    }
}

/// Shortest round-trip float rendering in the positional/scientific split
/// used by `repr(float)`.
fn float_repr(f: f64) -> String {
    if f == 0.0 {
        return if f.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "-1.2345e-5".
    let sci = format!("{f:e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if (-4..16).contains(&exp) {
        if exp >= 0 {
            let point = exp as usize + 1;
            if digits.len() <= point {
                let zeros = "0".repeat(point - digits.len());
                format!("{sign}{digits}{zeros}.0")
            } else {
                let (int_part, frac_part) = digits.split_at(point);
                format!("{sign}{int_part}.{frac_part}")
            }
        } else {
            let zeros = "0".repeat((-exp - 1) as usize);
            format!("{sign}0.{zeros}{digits}")
        }
    } else {
        let mantissa = if digits.len() == 1 {
            digits
        } else {
            format!("{}.{}", &digits[..1], &digits[1..])
        };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{sign}{mantissa}e{exp_sign}{:02}", exp.abs())
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // Writing into a String cannot fail.
                    let _ = write!(out, "\\u{unit:04x}");
                }
            }
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(value: &Value) -> String {
        let cb = CanonicalBytes::new(value).expect("should canonicalize");
        String::from_utf8(cb.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_canonical_bytes_simple_dict() {
        let data = serde_json::json!({"b": 2, "a": 1, "c": "hello"});
        assert_eq!(canonical(&data), r#"{"a":1,"b":2,"c":"hello"}"#);
    }

    #[test]
    fn test_canonical_bytes_nested() {
        let data = serde_json::json!({
            "outer": {"b": 2, "a": 1},
            "list": [3, 2, 1]
        });
        assert_eq!(canonical(&data), r#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn test_clash_style_keys_sort_by_code_point() {
        // '-' (0x2d) sorts before 'p' and after uppercase letters.
        let data = serde_json::json!({"proxy-groups": [], "proxies": [], "Port": 1, "mode": "rule"});
        assert_eq!(
            canonical(&data),
            r#"{"Port":1,"mode":"rule","proxies":[],"proxy-groups":[]}"#
        );
    }

    #[test]
    fn test_literals() {
        let data = serde_json::json!({"flag": true, "other": false, "none": null});
        assert_eq!(canonical(&data), r#"{"flag":true,"none":null,"other":false}"#);
    }

    #[test]
    fn test_empty_containers() {
        assert_eq!(canonical(&serde_json::json!({})), "{}");
        assert_eq!(canonical(&serde_json::json!([])), "[]");
    }

    #[test]
    fn test_integers_verbatim() {
        let data = serde_json::json!({"neg": -42, "big": 9999999999i64, "max": u64::MAX});
        assert_eq!(
            canonical(&data),
            r#"{"big":9999999999,"max":18446744073709551615,"neg":-42}"#
        );
    }

    #[test]
    fn test_non_ascii_escaped() {
        let data = serde_json::json!({"name": "é"});
        assert_eq!(canonical(&data), r#"{"name":"\u00e9"}"#);
    }

    #[test]
    fn test_astral_plane_uses_surrogate_pair() {
        let data = serde_json::json!("🚀");
        assert_eq!(canonical(&data), r#""\ud83d\ude80""#);
    }

    #[test]
    fn test_control_characters() {
        let data = serde_json::json!("a\"b\\c\nd\te\u{01}\u{7f}");
        assert_eq!(canonical(&data), r#""a\"b\\c\nd\te\u0001\u007f""#);
    }

    #[test]
    fn test_float_positional_range() {
        assert_eq!(float_repr(1.5), "1.5");
        assert_eq!(float_repr(1.0), "1.0");
        assert_eq!(float_repr(-0.25), "-0.25");
        assert_eq!(float_repr(0.0001), "0.0001");
        assert_eq!(float_repr(123456789.0), "123456789.0");
        assert_eq!(float_repr(0.0), "0.0");
    }

    #[test]
    fn test_float_scientific_range() {
        assert_eq!(float_repr(1e16), "1e+16");
        assert_eq!(float_repr(1.5e-5), "1.5e-05");
        assert_eq!(float_repr(2.5e100), "2.5e+100");
    }

    #[test]
    fn test_float_inside_document() {
        let data = serde_json::json!({"weight": 0.5});
        assert_eq!(canonical(&data), r#"{"weight":0.5}"#);
    }

    #[test]
    fn test_non_string_map_keys_rejected() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(vec![1u8], 1);
        assert!(CanonicalBytes::new(&map).is_err());
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        for f in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                CanonicalBytes::new(&f),
                Err(CanonicalizationError::NonFiniteFloat(_))
            ));
        }
    }

    #[test]
    fn test_nested_non_finite_float_rejected() {
        #[derive(serde::Serialize)]
        struct Outbound {
            tag: &'static str,
            weights: Vec<f32>,
        }

        let outbound = Outbound { tag: "x", weights: vec![0.5, f32::NAN] };
        assert!(matches!(
            CanonicalBytes::new(&outbound),
            Err(CanonicalizationError::NonFiniteFloat(_))
        ));

        let mut map = std::collections::BTreeMap::new();
        map.insert("w", f64::INFINITY);
        assert!(matches!(
            CanonicalBytes::new(&map),
            Err(CanonicalizationError::NonFiniteFloat(f)) if f == f64::INFINITY
        ));
    }

    #[test]
    fn test_finite_floats_still_accepted() {
        let mut map = std::collections::BTreeMap::new();
        map.insert("w", 0.25f64);
        let cb = CanonicalBytes::new(&map).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"w":0.25}"#);
    }

    #[test]
    fn test_len_and_is_empty() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        assert!(!cb.is_empty());
        assert_eq!(cb.len(), 7);
    }
}
