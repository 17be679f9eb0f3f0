//! Cookie date parsing (RFC 6265 §5.1.1).
//!
//! ```text
//! cookie-date     = *delimiter date-token-list *delimiter
//! date-token-list = date-token *( 1*delimiter date-token )
//! date-token      = 1*non-delimiter
//!
//! delimiter       = %x09 / %x20-2F / %x3B-40 / %x5B-60 / %x7B-7E
//! non-delimiter   = everything else
//! ```
//!
//! Tokens are matched against time, day-of-month, month and year in that
//! order; the first field a token fits (and that is still unset) claims it.

use crate::cookies::error::DateParseError;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

const MONTHS: [(&str, Month); 12] = [
    ("jan", Month::January),
    ("feb", Month::February),
    ("mar", Month::March),
    ("apr", Month::April),
    ("may", Month::May),
    ("jun", Month::June),
    ("jul", Month::July),
    ("aug", Month::August),
    ("sep", Month::September),
    ("oct", Month::October),
    ("nov", Month::November),
    ("dec", Month::December),
];

fn is_delimiter(byte: u8) -> bool {
    matches!(byte, 0x09 | 0x20..=0x2F | 0x3B..=0x40 | 0x5B..=0x60 | 0x7B..=0x7E)
}

/// Iterator over the date-tokens of a cookie date.
///
/// Every delimiter is ASCII, so token boundaries always fall on UTF-8
/// character boundaries.
pub struct DateTokens<'a> {
    rest: &'a str,
}

impl<'a> DateTokens<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { rest: input }
    }
}

impl<'a> Iterator for DateTokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.rest.as_bytes();
        let start = bytes.iter().position(|b| !is_delimiter(*b))?;
        let len = bytes[start..]
            .iter()
            .position(|b| is_delimiter(*b))
            .unwrap_or(bytes.len() - start);

        let token = &self.rest[start..start + len];
        self.rest = &self.rest[start + len..];
        Some(token)
    }
}

/// The fields of a cookie date before calendar validation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CookieDate {
    pub time: Option<(u8, u8, u8)>,
    pub day_of_month: Option<u8>,
    pub month: Option<Month>,
    pub year: Option<i32>,
}

impl CookieDate {
    /// Run the tokenizer over `input` and fill in whatever fields it finds.
    pub fn scan(input: &str) -> Self {
        let mut date = CookieDate::default();

        for token in DateTokens::new(input) {
            if date.time.is_none() {
                if let Some(hms) = parse_hms(token) {
                    date.time = Some(hms);
                    continue;
                }
            }
            if date.day_of_month.is_none() && is_digits(token, 1, 2) {
                date.day_of_month = token.parse().ok();
                continue;
            }
            if date.month.is_none() {
                if let Some(month) = find_month(token) {
                    date.month = Some(month);
                    continue;
                }
            }
            if date.year.is_none() && is_digits(token, 2, 4) {
                date.year = token.parse().ok();
            }
        }

        if let Some(year) = date.year.as_mut() {
            match *year {
                70..=99 => *year += 1900,
                0..=69 => *year += 2000,
                _ => {}
            }
        }

        date
    }

    fn error(&self) -> DateParseError {
        DateParseError {
            found_time: self.time.is_some(),
            found_day_of_month: self.day_of_month.is_some(),
            found_month: self.month.is_some(),
            found_year: self.year.is_some(),
        }
    }

    /// Validate the collected fields and build a UTC timestamp.
    pub fn to_datetime(&self) -> Result<OffsetDateTime, DateParseError> {
        let (Some((hour, minute, second)), Some(day), Some(month), Some(year)) =
            (self.time, self.day_of_month, self.month, self.year)
        else {
            return Err(self.error());
        };

        if !(1..=31).contains(&day) || year < 1601 || hour > 23 || minute > 59 || second > 59 {
            return Err(self.error());
        }

        // Day 31 of a 30-day month passes the range check but has no calendar date.
        let date = Date::from_calendar_date(year, month, day).map_err(|_| self.error())?;
        let time = Time::from_hms(hour, minute, second).map_err(|_| self.error())?;
        Ok(PrimitiveDateTime::new(date, time).assume_utc())
    }
}

fn is_digits(token: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_digit())
}

fn parse_hms(token: &str) -> Option<(u8, u8, u8)> {
    let mut parts = token.split(':');
    let (h, m, s) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || ![h, m, s].iter().all(|p| is_digits(p, 1, 2)) {
        return None;
    }
    Some((h.parse().ok()?, m.parse().ok()?, s.parse().ok()?))
}

fn find_month(token: &str) -> Option<Month> {
    let lower = token.to_ascii_lowercase();
    MONTHS
        .iter()
        .filter_map(|(abbr, month)| lower.find(abbr).map(|pos| (pos, *month)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, month)| month)
}

/// Parse a cookie date into a UTC timestamp.
pub fn parse_cookie_date(input: &str) -> Result<OffsetDateTime, DateParseError> {
    CookieDate::scan(input).to_datetime()
}

/// Render a timestamp as `Sun, 08 Jan 1984 11:12:13 GMT`.
pub fn format_cookie_date(time: OffsetDateTime) -> String {
    let format = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    time.to_offset(time::UtcOffset::UTC)
        .format(&format)
        .unwrap_or_else(|_| time.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn flags(input: &str) -> String {
        parse_cookie_date(input).unwrap_err().flags()
    }

    #[test]
    fn test_tokenizer_skips_delimiter_runs() {
        let tokens: Vec<_> = DateTokens::new("  Sun, 08-Jan-84 11:12:13 GMT;").collect();
        assert_eq!(tokens, vec!["Sun", "08", "Jan", "84", "11:12:13", "GMT"]);
        assert_eq!(DateTokens::new(" ,;- ").count(), 0);
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(
            parse_cookie_date("Sun, 08-Jan-84 11:12:13 GMT").unwrap(),
            datetime!(1984-01-08 11:12:13 UTC)
        );
        assert_eq!(
            parse_cookie_date("Sun, 08-Jan-14 11:12:13 GMT").unwrap(),
            datetime!(2014-01-08 11:12:13 UTC)
        );
    }

    #[test]
    fn test_normalized_output() {
        let parsed = parse_cookie_date("Sun, 01-Jan-35 11:12:13 GMT").unwrap();
        assert_eq!(format_cookie_date(parsed), "Mon, 01 Jan 2035 11:12:13 GMT");
    }

    #[test]
    fn test_missing_field_flags() {
        assert_eq!(flags("Sun, 08-Jan-14 11:12013 GMT"), "0111");
        assert_eq!(flags("Sun, 08-Jaf-14 11:12:13 GMT"), "1101");
        assert_eq!(flags("Sun, 08-Jan- 11:12:13 GMT"), "1110");
        assert_eq!(flags("Sun, -Jan- 11:12:13 GMT"), "1010");
    }

    #[test]
    fn test_out_of_range_fields() {
        assert_eq!(flags("Sun, 32-Jan-14 11:12:13 GMT"), "1111");
        assert_eq!(flags("Sun, 08-Jan-1600 11:12:13 GMT"), "1111");
        assert_eq!(flags("Sun, 08-Jan-14 24:12:13 GMT"), "1111");
        assert_eq!(flags("Sun, 08-Jan-14 11:60:13 GMT"), "1111");
        assert_eq!(flags("Sun, 08-Jan-14 11:12:60 GMT"), "1111");
        assert_eq!(flags("31 Feb 2014 00:00:00"), "1111");
    }

    #[test]
    fn test_month_substring_is_case_insensitive() {
        assert_eq!(
            parse_cookie_date("1 JANUARY 2020 1:2:3").unwrap(),
            datetime!(2020-01-01 01:02:03 UTC)
        );
    }

    #[test]
    fn test_first_time_token_wins() {
        assert_eq!(
            parse_cookie_date("10:00:00 08 Jan 2014 23:59:59").unwrap(),
            datetime!(2014-01-08 10:00:00 UTC)
        );
    }
}
