use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;

use super::error::ValidationError;

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(0|((\d+(\.\d*)?|\.\d+)(ns|us|µs|μs|ms|s|m|h))+)$")
        .expect("duration pattern compiles")
});

static HEX_BYTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9a-fA-F]{2})*$").expect("hex pattern compiles"));

/// Format rule for a text editor. The empty string always passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    Int,
    UInt,
    Float,
    Duration,
    Timestamp,
    Bytes,
}

impl Validator {
    pub fn check(self, raw: &str) -> Result<(), ValidationError> {
        if raw.is_empty() {
            return Ok(());
        }
        let ok = match self {
            Validator::Int => raw.parse::<i64>().is_ok(),
            Validator::UInt => raw.parse::<u64>().is_ok(),
            Validator::Float => raw.parse::<f64>().is_ok(),
            Validator::Duration => DURATION.is_match(raw),
            Validator::Timestamp => DateTime::parse_from_rfc3339(raw).is_ok(),
            Validator::Bytes => HEX_BYTES.is_match(raw),
        };
        if ok {
            Ok(())
        } else {
            Err(ValidationError::new(self.message()))
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Validator::Int => "must be a valid integer",
            Validator::UInt => "must be a valid positive integer",
            Validator::Float => "must be a valid number",
            Validator::Duration => "must be a valid duration (e.g., 10s)",
            Validator::Timestamp => {
                "must be a valid RFC 3339 timestamp (e.g., 2017-01-15T01:30:15.01Z)"
            }
            Validator::Bytes => "must be hex-encoded bytes",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_always_valid() {
        for validator in [
            Validator::Int,
            Validator::UInt,
            Validator::Float,
            Validator::Duration,
            Validator::Timestamp,
            Validator::Bytes,
        ] {
            assert!(validator.check("").is_ok(), "{validator:?}");
        }
    }

    #[test]
    fn integers() {
        assert!(Validator::Int.check("-12").is_ok());
        assert!(Validator::Int.check("9223372036854775807").is_ok());
        assert_eq!(
            Validator::Int.check("12x"),
            Err(ValidationError::new("must be a valid integer"))
        );
        assert!(Validator::UInt.check("-1").is_err());
        assert!(Validator::UInt.check("18446744073709551615").is_ok());
    }

    #[test]
    fn floats() {
        assert!(Validator::Float.check("1.5e3").is_ok());
        assert!(Validator::Float.check("-0.25").is_ok());
        assert!(Validator::Float.check("one").is_err());
    }

    #[test]
    fn durations() {
        for ok in ["10s", "1h30m", "1.5s", "300ms", "2µs", "-3m", "0"] {
            assert!(Validator::Duration.check(ok).is_ok(), "{ok}");
        }
        for bad in ["10", "s", "1d", "1h 30m"] {
            assert!(Validator::Duration.check(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn timestamps() {
        assert!(Validator::Timestamp.check("2017-01-15T01:30:15.01Z").is_ok());
        assert!(Validator::Timestamp.check("2017-01-15T01:30:15+02:00").is_ok());
        assert!(Validator::Timestamp.check("2017-01-15").is_err());
    }

    #[test]
    fn hex_bytes() {
        assert!(Validator::Bytes.check("deadBEEF").is_ok());
        assert!(Validator::Bytes.check("abc").is_err());
        assert!(Validator::Bytes.check("zz").is_err());
    }
}
