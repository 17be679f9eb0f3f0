//! Errors local to the cookie engine.
//!
//! These never leave the engine: a bad `Expires` value only drops that
//! attribute. Anything surfaced to callers is a [`NetError`](crate::base::neterror::NetError).

use thiserror::Error;

/// A cookie date that could not be turned into a timestamp.
///
/// Records which of the four required fields the tokenizer found, in the
/// order time, day-of-month, month, year.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("date parsing failed; flags: {}", self.flags())]
pub struct DateParseError {
    pub found_time: bool,
    pub found_day_of_month: bool,
    pub found_month: bool,
    pub found_year: bool,
}

impl DateParseError {
    /// Four characters, `1` for a field that was found and `0` for one that was not.
    pub fn flags(&self) -> String {
        [
            self.found_time,
            self.found_day_of_month,
            self.found_month,
            self.found_year,
        ]
        .iter()
        .map(|found| if *found { '1' } else { '0' })
        .collect()
    }
}
