use std::fmt;

use log::error;
use serde::{Deserialize, Serialize};
use time::{macros::format_description, OffsetDateTime};

/// Milliseconds since the unix epoch.
#[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn now() -> Self {
        let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
        Self((nanos / 1_000_000) as i64)
    }

    pub fn as_millis(self) -> i64 {
        self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self(0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(fmt, "<epoch>");
        }

        use ::time::format_description::well_known::Rfc3339;

        let formatted = OffsetDateTime::from_unix_timestamp_nanos(self.0 as i128 * 1_000_000)
            .ok()
            .and_then(|when| when.format(&Rfc3339).ok());

        match formatted {
            Some(s) => write!(fmt, "{}", s),
            None => write!(fmt, "{}", self.0),
        }
    }
}

/// Today's calendar date in UTC, as `YYYY-MM-DD`.
pub fn today() -> Result<String, ()> {
    OffsetDateTime::now_utc()
        .date()
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| {
            error!("couldn't format today's date: {e:?}");
        })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn today_is_an_iso_date() {
        let today = today().unwrap();
        let parts: Vec<_> = today.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 4);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 2);
        assert!(parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())));

        let date = OffsetDateTime::now_utc().date();
        assert_eq!(parts[0].parse::<i32>().unwrap(), date.year());
        assert_eq!(parts[1].parse::<u8>().unwrap(), u8::from(date.month()));
        assert_eq!(parts[2].parse::<u8>().unwrap(), date.day());
    }

    #[test]
    fn timestamp_display() {
        assert_eq!(Timestamp::default().to_string(), "<epoch>");
        assert_eq!(
            Timestamp(1_000).to_string(),
            "1970-01-01T00:00:01Z"
        );
        assert!(Timestamp::now() > Timestamp::default());
    }
}
