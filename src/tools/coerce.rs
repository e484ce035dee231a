//! Parameter coercion: raw string arguments to native values.
//!
//! Rules are checked in declaration order of `ParamType`; types without a
//! rule keep the raw text. A missing or empty value never fails: it becomes
//! the type's default. A malformed non-empty value always fails.

use crate::tools::args::ArgValue;
use crate::tools::catalog::ParamType;
use crate::types::{Error, Result};
use std::fmt::Display;
use std::str::FromStr;

/// Convert a non-empty raw value to the declared type.
pub fn coerce(param_type: &ParamType, raw: &str) -> Result<ArgValue> {
    match param_type {
        ParamType::String => Ok(ArgValue::Str(raw.to_string())),
        ParamType::Int => parse_number(raw, param_type).map(ArgValue::Int),
        ParamType::Long => parse_number(raw, param_type).map(ArgValue::Long),
        ParamType::Double => parse_number(raw, param_type).map(ArgValue::Double),
        ParamType::Float => parse_number(raw, param_type).map(ArgValue::Float),
        ParamType::Short => parse_number(raw, param_type).map(ArgValue::Short),
        ParamType::Byte => parse_number(raw, param_type).map(ArgValue::Byte),
        ParamType::Bool => Ok(ArgValue::Bool(raw.eq_ignore_ascii_case("true"))),
        ParamType::Enum(members) => members
            .iter()
            .find(|m| m.as_str() == raw)
            .map(|m| ArgValue::Enum(m.clone()))
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "cannot convert '{}' to enum {}",
                    raw, param_type
                ))
            }),
        ParamType::Char | ParamType::StringList | ParamType::Other(_) => {
            Ok(ArgValue::Str(raw.to_string()))
        }
    }
}

/// Value used when no raw argument was supplied.
pub fn default_for(param_type: &ParamType) -> ArgValue {
    match param_type {
        ParamType::Int => ArgValue::Int(0),
        ParamType::Long => ArgValue::Long(0),
        ParamType::Short => ArgValue::Short(0),
        ParamType::Byte => ArgValue::Byte(0),
        ParamType::Float => ArgValue::Float(0.0),
        ParamType::Double => ArgValue::Double(0.0),
        ParamType::Bool => ArgValue::Bool(false),
        ParamType::Char => ArgValue::Char('\0'),
        ParamType::String
        | ParamType::Enum(_)
        | ParamType::StringList
        | ParamType::Other(_) => ArgValue::Null,
    }
}

/// Coerce an optional raw value, substituting the default when missing or empty.
pub fn resolve(param_type: &ParamType, raw: Option<&str>) -> Result<ArgValue> {
    match raw {
        Some(value) if !value.is_empty() => coerce(param_type, value),
        _ => Ok(default_for(param_type)),
    }
}

fn parse_number<T>(raw: &str, param_type: &ParamType) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|e| {
        Error::parse(format!(
            "cannot parse '{}' as {}: {}",
            raw, param_type, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_string_passes_through() {
        assert_eq!(
            coerce(&ParamType::String, " 42 ").unwrap(),
            ArgValue::Str(" 42 ".to_string())
        );
    }

    #[test]
    fn test_numeric_widths() {
        assert_eq!(coerce(&ParamType::Int, "-17").unwrap(), ArgValue::Int(-17));
        assert_eq!(
            coerce(&ParamType::Long, "9000000000").unwrap(),
            ArgValue::Long(9_000_000_000)
        );
        assert_eq!(coerce(&ParamType::Short, "300").unwrap(), ArgValue::Short(300));
        assert_eq!(coerce(&ParamType::Byte, "-128").unwrap(), ArgValue::Byte(-128));
        assert_eq!(coerce(&ParamType::Double, "2.5e3").unwrap(), ArgValue::Double(2500.0));
        assert_eq!(coerce(&ParamType::Float, "0.5").unwrap(), ArgValue::Float(0.5));
    }

    #[test]
    fn test_malformed_number_is_parse_error() {
        let err = coerce(&ParamType::Int, "12abc").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("'12abc'"));

        // Out of range for the declared width.
        assert!(matches!(
            coerce(&ParamType::Byte, "200").unwrap_err(),
            Error::Parse(_)
        ));
    }

    #[test]
    fn test_lenient_boolean() {
        assert_eq!(coerce(&ParamType::Bool, "TRUE").unwrap(), ArgValue::Bool(true));
        assert_eq!(coerce(&ParamType::Bool, "True").unwrap(), ArgValue::Bool(true));
        assert_eq!(coerce(&ParamType::Bool, "yes").unwrap(), ArgValue::Bool(false));
        assert_eq!(coerce(&ParamType::Bool, "1").unwrap(), ArgValue::Bool(false));
    }

    #[test]
    fn test_enum_members() {
        let pt = ParamType::choice(["A", "B"]);
        assert_eq!(coerce(&pt, "B").unwrap(), ArgValue::Enum("B".to_string()));

        let err = coerce(&pt, "Z").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().starts_with("invalid argument"));

        // Member names match exactly.
        assert!(coerce(&pt, "b").is_err());
    }

    #[test]
    fn test_fallback_keeps_raw_text() {
        assert_eq!(
            coerce(&ParamType::StringList, "a,b").unwrap(),
            ArgValue::Str("a,b".to_string())
        );
        assert_eq!(
            coerce(&ParamType::Other("Money".to_string()), "12.00").unwrap(),
            ArgValue::Str("12.00".to_string())
        );
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_for(&ParamType::Int), ArgValue::Int(0));
        assert_eq!(default_for(&ParamType::Double), ArgValue::Double(0.0));
        assert_eq!(default_for(&ParamType::Bool), ArgValue::Bool(false));
        assert_eq!(default_for(&ParamType::Char), ArgValue::Char('\0'));
        assert_eq!(default_for(&ParamType::String), ArgValue::Null);
        assert_eq!(default_for(&ParamType::choice(["A"])), ArgValue::Null);
    }

    #[test]
    fn test_resolve_missing_and_empty_use_default() {
        assert_eq!(resolve(&ParamType::Int, None).unwrap(), ArgValue::Int(0));
        assert_eq!(resolve(&ParamType::Int, Some("")).unwrap(), ArgValue::Int(0));
        assert_eq!(
            resolve(&ParamType::choice(["A"]), Some("")).unwrap(),
            ArgValue::Null
        );
        assert!(resolve(&ParamType::Int, Some("x")).is_err());
    }

    proptest! {
        #[test]
        fn prop_int_literals_round_trip(n in any::<i32>()) {
            prop_assert_eq!(coerce(&ParamType::Int, &n.to_string()).unwrap(), ArgValue::Int(n));
        }

        #[test]
        fn prop_long_literals_round_trip(n in any::<i64>()) {
            prop_assert_eq!(coerce(&ParamType::Long, &n.to_string()).unwrap(), ArgValue::Long(n));
        }

        #[test]
        fn prop_short_and_byte_literals_round_trip(s in any::<i16>(), b in any::<i8>()) {
            prop_assert_eq!(coerce(&ParamType::Short, &s.to_string()).unwrap(), ArgValue::Short(s));
            prop_assert_eq!(coerce(&ParamType::Byte, &b.to_string()).unwrap(), ArgValue::Byte(b));
        }

        #[test]
        fn prop_finite_doubles_round_trip(
            x in any::<f64>().prop_filter("finite", |x| x.is_finite())
        ) {
            prop_assert_eq!(
                coerce(&ParamType::Double, &x.to_string()).unwrap(),
                ArgValue::Double(x)
            );
        }

        #[test]
        fn prop_alphabetic_text_is_not_an_integer(s in "[a-zA-Z]{1,12}") {
            prop_assert!(matches!(coerce(&ParamType::Int, &s), Err(Error::Parse(_))));
        }
    }
}
