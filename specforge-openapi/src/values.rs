use serde_json::Value;
use specforge_core::{IntWidth, Type, TypeDef, TypeStore};

use crate::error::ParseError;

/// Convert annotation text to a value typed after `ty`.
///
/// Pointers are dereferenced to arbitrary depth before parsing. A type
/// carrying an example-parser capability takes precedence over the
/// built-in conversions.
pub fn parse_value(store: &TypeStore, ty: Type, text: &str) -> Result<Value, ParseError> {
    let (base, _) = store.deref(ty);
    if let Some(parser) = store.caps(base).example_parser {
        return parser(text).map_err(ParseError::Custom);
    }
    let conversion = |target: &str| ParseError::Conversion {
        value: text.to_string(),
        target: target.to_string(),
    };
    match store.def(base) {
        TypeDef::Int(w) => parse_int(text, *w)
            .map(Value::from)
            .ok_or_else(|| conversion(&store.describe(base))),
        TypeDef::Uint(w) => parse_uint(text, *w)
            .map(Value::from)
            .ok_or_else(|| conversion(&store.describe(base))),
        // Floats are width-checked like integers: a value outside the
        // f32 range is a conversion error for an f32-typed target.
        TypeDef::Float32 => text
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && (*f as f32).is_finite())
            .map(Value::from)
            .ok_or_else(|| conversion(&store.describe(base))),
        TypeDef::Float64 => text
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::from)
            .ok_or_else(|| conversion(&store.describe(base))),
        TypeDef::Bool => parse_bool(text)
            .map(Value::from)
            .ok_or_else(|| conversion("bool")),
        TypeDef::Str | TypeDef::Bytes | TypeDef::Url | TypeDef::Ip => {
            Ok(Value::String(text.to_string()))
        }
        TypeDef::Instant => chrono::DateTime::parse_from_rfc3339(text)
            .map(|_| Value::String(text.to_string()))
            .map_err(|_| conversion("date-time")),
        TypeDef::Duration => {
            if is_duration(text) {
                Ok(Value::String(text.to_string()))
            } else {
                Err(conversion("duration"))
            }
        }
        TypeDef::Uuid => uuid::Uuid::parse_str(text)
            .map(|_| Value::String(text.to_string()))
            .map_err(|_| conversion("uuid")),
        TypeDef::ObjectId => {
            if text.len() == 24 && text.chars().all(|c| c.is_ascii_hexdigit()) {
                Ok(Value::String(text.to_string()))
            } else {
                Err(conversion("objectid"))
            }
        }
        _ => Err(ParseError::UnsupportedTarget(store.describe(base))),
    }
}

fn parse_int(text: &str, width: IntWidth) -> Option<i64> {
    match width {
        IntWidth::W8 => text.parse::<i8>().ok().map(i64::from),
        IntWidth::W16 => text.parse::<i16>().ok().map(i64::from),
        IntWidth::W32 => text.parse::<i32>().ok().map(i64::from),
        IntWidth::W64 | IntWidth::Machine => text.parse::<i64>().ok(),
    }
}

fn parse_uint(text: &str, width: IntWidth) -> Option<u64> {
    match width {
        IntWidth::W8 => text.parse::<u8>().ok().map(u64::from),
        IntWidth::W16 => text.parse::<u16>().ok().map(u64::from),
        IntWidth::W32 => text.parse::<u32>().ok().map(u64::from),
        IntWidth::W64 | IntWidth::Machine => text.parse::<u64>().ok(),
    }
}

/// Strict boolean literals: `1`, `t`, `T`, `true`, `TRUE`, `True` and
/// their false counterparts.
pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Validate duration text of the form `300ms`, `1.5h` or `2h45m`.
/// A signed sequence of decimal numbers, each with an optional fraction
/// and a mandatory unit (`ns`, `us`, `µs`, `ms`, `s`, `m`, `h`).
fn is_duration(text: &str) -> bool {
    let mut s = text.strip_prefix(['+', '-']).unwrap_or(text);
    if s == "0" {
        return true;
    }
    if s.is_empty() {
        return false;
    }
    while !s.is_empty() {
        let digits = s
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(s.len());
        let number = &s[..digits];
        if number.is_empty() || number.parse::<f64>().is_err() {
            return false;
        }
        s = &s[digits..];
        let unit = ["ns", "us", "µs", "ms", "s", "m", "h"]
            .iter()
            .find(|u| s.starts_with(**u) && {
                // "m" must not swallow the "m" of "ms".
                let rest = &s[u.len()..];
                rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_digit() || c == '.')
            });
        match unit {
            Some(u) => s = &s[u.len()..],
            None => return false,
        }
    }
    true
}
