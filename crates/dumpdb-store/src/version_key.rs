//! Timestamp keys identifying stored versions
//!
//! A key has the fixed-width form `T%Y%m%d_%H%M%S_%f` with six-digit
//! microseconds, e.g. `T20140512_093001_123456`. Fixed width makes string
//! order equal to time order for years 0 through 9999.

use crate::error::{Result, StoreError};
use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const KEY_LEN: usize = 23;

/// Identifier of one dumped version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionKey {
    key: String,
    timestamp: NaiveDateTime,
}

impl VersionKey {
    /// Key for the current local time
    pub fn generate() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    /// Key for the current local time, strictly after `latest`
    ///
    /// When the clock has not advanced past `latest` (same microsecond or a
    /// backwards step) the key is `latest` plus one microsecond.
    pub fn generate_after(latest: Option<&Self>) -> Result<Self> {
        let now = Self::generate();
        match latest {
            Some(latest) if now <= *latest => latest.successor(),
            _ => Ok(now),
        }
    }

    /// Key for a given time, truncated to microseconds
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        // Leap seconds report nanoseconds past 999_999_999
        let micros = (datetime.nanosecond() / 1_000).min(999_999);
        let timestamp = datetime.with_nanosecond(micros * 1_000).unwrap_or(datetime);
        let key = format!("{}_{micros:06}", timestamp.format("T%Y%m%d_%H%M%S"));
        Self { key, timestamp }
    }

    /// Parse a key string
    pub fn parse(key: &str) -> Result<Self> {
        let malformed = || StoreError::MalformedKey(key.to_string());

        let bytes = key.as_bytes();
        if bytes.len() != KEY_LEN || bytes[0] != b'T' || bytes[9] != b'_' || bytes[16] != b'_' {
            return Err(malformed());
        }
        let digits_ok = bytes
            .iter()
            .enumerate()
            .filter(|(i, _)| !matches!(i, 0 | 9 | 16))
            .all(|(_, b)| b.is_ascii_digit());
        if !digits_ok {
            return Err(malformed());
        }

        let field = |range: std::ops::Range<usize>| -> Result<u32> {
            key[range].parse::<u32>().map_err(|_| malformed())
        };
        let year = i32::try_from(field(1..5)?).map_err(|_| malformed())?;

        let timestamp = NaiveDate::from_ymd_opt(year, field(5..7)?, field(7..9)?)
            .and_then(|date| {
                date.and_hms_micro_opt(
                    field(10..12).ok()?,
                    field(12..14).ok()?,
                    field(14..16).ok()?,
                    field(17..23).ok()?,
                )
            })
            .ok_or_else(malformed)?;

        Ok(Self {
            key: key.to_string(),
            timestamp,
        })
    }

    /// Key one microsecond after this one
    pub fn successor(&self) -> Result<Self> {
        self.timestamp
            .checked_add_signed(TimeDelta::microseconds(1))
            .map(Self::from_datetime)
            .ok_or_else(|| StoreError::MalformedKey(self.key.clone()))
    }

    /// The key string
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Calendar time encoded in the key
    pub const fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for VersionKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

impl FromStr for VersionKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionKey {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VersionKey> for String {
    fn from(key: VersionKey) -> Self {
        key.key
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn datetime(micros: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 5, 12)
            .and_then(|d| d.and_hms_micro_opt(9, 30, 1, micros))
            .expect("valid date")
    }

    #[test]
    fn test_key_format() {
        let key = VersionKey::from_datetime(datetime(123_456));
        assert_eq!(key.as_str(), "T20140512_093001_123456");

        let padded = VersionKey::from_datetime(datetime(42));
        assert_eq!(padded.as_str(), "T20140512_093001_000042");
    }

    #[test]
    fn test_parse_recovers_timestamp() {
        let key = VersionKey::parse("T20140512_093001_123456").expect("parse");
        assert_eq!(key.timestamp(), datetime(123_456));
        assert_eq!(key.to_string(), "T20140512_093001_123456");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "20140512_093001_123456",
            "X20140512_093001_123456",
            "T20140512-093001_123456",
            "T20140512_093001_12345",
            "T20140512_093001_1234567",
            "T2014O512_093001_123456",
            "T20141332_093001_123456",
            "T20140512_253001_123456",
            "T20140512_093001_+23456",
        ] {
            assert!(
                matches!(VersionKey::parse(bad), Err(StoreError::MalformedKey(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_nanoseconds_truncated() {
        let dt = datetime(0)
            .with_nanosecond(123_456_789)
            .expect("valid nanos");
        let key = VersionKey::from_datetime(dt);
        assert_eq!(key.as_str(), "T20140512_093001_123456");
        assert_eq!(key.timestamp(), datetime(123_456));
    }

    #[test]
    fn test_successor_rolls_over() {
        let key = VersionKey::parse("T20141231_235959_999999").expect("parse");
        assert_eq!(
            key.successor().expect("successor").as_str(),
            "T20150101_000000_000000"
        );
    }

    #[test]
    fn test_generate_after_is_strictly_greater() {
        let future = VersionKey::from_datetime(datetime(0) + TimeDelta::days(365 * 500));
        let next = VersionKey::generate_after(Some(&future)).expect("generate");
        assert!(next > future);
        assert_eq!(next, future.successor().expect("successor"));

        let past = VersionKey::from_datetime(datetime(0));
        assert!(VersionKey::generate_after(Some(&past)).expect("generate") > past);
        assert!(VersionKey::generate_after(None).is_ok());
    }

    #[test]
    fn test_serde_as_string() {
        let key = VersionKey::from_datetime(datetime(7));
        let json = serde_json::to_string(&key).expect("serialize");
        assert_eq!(json, "\"T20140512_093001_000007\"");
        let back: VersionKey = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, key);
        assert!(serde_json::from_str::<VersionKey>("\"nope\"").is_err());
    }

    proptest! {
        #[test]
        fn keys_order_like_time(a in 0i64..253_402_300_799_999_999, b in 0i64..253_402_300_799_999_999) {
            let epoch = NaiveDate::from_ymd_opt(1, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .expect("valid date");
            let ta = epoch + TimeDelta::microseconds(a % 250_000_000_000_000_000);
            let tb = epoch + TimeDelta::microseconds(b % 250_000_000_000_000_000);
            let ka = VersionKey::from_datetime(ta);
            let kb = VersionKey::from_datetime(tb);

            prop_assert_eq!(ta.cmp(&tb), ka.as_str().cmp(kb.as_str()));
            prop_assert_eq!(VersionKey::parse(ka.as_str()).expect("parse").timestamp(), ta);
        }

        #[test]
        fn generated_chain_is_strictly_increasing(steps in 1usize..50) {
            let mut latest: Option<VersionKey> = None;
            for _ in 0..steps {
                let next = VersionKey::generate_after(latest.as_ref()).expect("generate");
                if let Some(prev) = &latest {
                    prop_assert!(next.as_str() > prev.as_str());
                }
                latest = Some(next);
            }
        }
    }
}
