//! Partial dates and date ranges.
//!
//! Genealogical sources rarely give a full calendar day. A [`Date`] may carry
//! only a year, a year and a month, or even just a month and a day, and may be
//! flagged as fuzzy ("around 1970"). A [`DateRange`] has an optional start and
//! an optional end, each of which may be marked as a *boundary*: a known hard
//! limit rather than an estimate. [`Datey`] is the union of the two and is what
//! events carry.
//!
//! # Comparison model
//!
//! Comparisons return `Option<bool>`. `None` means the operands are
//! incomparable (a missing year, a range without comparable bounds, or a cell
//! of the range ordering table that is undefined). Nothing here panics or
//! errors on malformed input.
//!
//! - Two complete dates compare by `(year, month, day)`.
//! - Otherwise both dates are expanded with [`Date::to_range`] and compared as
//!   ranges.
//! - Date equality is exact on the raw parts and is never range-expanded, so
//!   `1970-01` is not equal to `1970-01-01` even though one lies inside the
//!   other.
//! - Range ordering is a fixed lookup table keyed by which bounds are present
//!   on either side. Some cells are deliberately asymmetric and some are
//!   undefined.
//! - A date compared against a range is answered by the range, mirrored.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LineageError, Result};

/// Treat an incomparable outcome as `false`.
fn holds(outcome: Option<bool>) -> bool {
    outcome.unwrap_or(false)
}

// ── Date ────────────────────────────────────────────────────────────────────

/// A possibly partial Gregorian calendar date.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Date {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    /// Approximate ("around"). Does not take part in equality or ordering.
    #[serde(default)]
    pub fuzzy: bool,
}

/// Two dates after promotion, ready for comparison.
enum Promoted {
    Parts((i32, u32, u32), (i32, u32, u32)),
    Ranges(DateRange, DateRange),
}

impl Date {
    /// A complete date.
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self::partial(Some(year), Some(month), Some(day))
    }

    /// A date known only to the year.
    pub fn year(year: i32) -> Self {
        Self::partial(Some(year), None, None)
    }

    /// A date known to the year and month.
    pub fn year_month(year: i32, month: u32) -> Self {
        Self::partial(Some(year), Some(month), None)
    }

    pub fn partial(year: Option<i32>, month: Option<u32>, day: Option<u32>) -> Self {
        Self {
            year,
            month,
            day,
            fuzzy: false,
        }
    }

    pub fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    /// Today's date in UTC.
    pub fn today() -> Self {
        let now = Utc::now().date_naive();
        Self::new(now.year(), now.month(), now.day())
    }

    /// The same date shifted `years` into the past. Dates without a year are
    /// returned unchanged.
    pub fn years_before(&self, years: u32) -> Self {
        let years = i32::try_from(years).unwrap_or(i32::MAX);
        Self {
            year: self.year.map(|year| year.saturating_sub(years)),
            ..*self
        }
    }

    /// Whether this date can be ordered at all (it has a year).
    pub fn comparable(&self) -> bool {
        self.year.is_some()
    }

    /// Whether year, month and day are all known.
    pub fn complete(&self) -> bool {
        self.year.is_some() && self.month.is_some() && self.day.is_some()
    }

    pub fn parts(&self) -> (Option<i32>, Option<u32>, Option<u32>) {
        (self.year, self.month, self.day)
    }

    fn complete_parts(&self) -> Option<(i32, u32, u32)> {
        Some((self.year?, self.month?, self.day?))
    }

    /// Expand this date into the calendar interval it could denote.
    ///
    /// An unknown month spans January to December. An unknown day spans the
    /// first to the last day of the resolved month (of the end month when the
    /// month is unknown as well).
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::IncomparableDate`] if the year is unknown, or
    /// [`LineageError::InvalidDate`] if the month is not in `1..=12`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage_engine::{Date, DateRange};
    ///
    /// let range = Date::year_month(2000, 2).to_range().unwrap();
    /// assert_eq!(range, DateRange::new(Date::new(2000, 2, 1), Date::new(2000, 2, 29)));
    /// ```
    pub fn to_range(&self) -> Result<DateRange> {
        let year = self.year.ok_or_else(|| {
            LineageError::IncomparableDate(format!(
                "cannot convert {self} to a date range without a year"
            ))
        })?;
        let (month_start, month_end) = match self.month {
            Some(month) => (month, month),
            None => (1, 12),
        };
        let (day_start, day_end) = match self.day {
            Some(day) => (day, day),
            None => (1, days_in_month(year, month_end)?),
        };
        if !(1..=12).contains(&month_start) {
            return Err(LineageError::InvalidDate(format!(
                "month {month_start} out of range in {self}"
            )));
        }
        Ok(DateRange::new(
            Date::new(year, month_start, day_start),
            Date::new(year, month_end, day_end),
        ))
    }

    fn promote(&self, other: &Date) -> Option<Promoted> {
        if !self.comparable() || !other.comparable() {
            return None;
        }
        if let (Some(a), Some(b)) = (self.complete_parts(), other.complete_parts()) {
            return Some(Promoted::Parts(a, b));
        }
        let a = self.to_range().ok()?;
        let b = other.to_range().ok()?;
        Some(Promoted::Ranges(a, b))
    }

    pub fn lt(&self, other: &Date) -> Option<bool> {
        match self.promote(other)? {
            Promoted::Parts(a, b) => Some(a < b),
            Promoted::Ranges(a, b) => a.lt_range(&b),
        }
    }

    pub fn le(&self, other: &Date) -> Option<bool> {
        match self.promote(other)? {
            Promoted::Parts(a, b) => Some(a <= b),
            Promoted::Ranges(a, b) => Some(a.lt_range(&b)? || a == b),
        }
    }

    pub fn gt(&self, other: &Date) -> Option<bool> {
        match self.promote(other)? {
            Promoted::Parts(a, b) => Some(a > b),
            Promoted::Ranges(a, b) => Some(!a.lt_range(&b)? && a != b),
        }
    }

    pub fn ge(&self, other: &Date) -> Option<bool> {
        match self.promote(other)? {
            Promoted::Parts(a, b) => Some(a >= b),
            Promoted::Ranges(a, b) => Some(!a.lt_range(&b)?),
        }
    }

    /// A date contains an equal date, or any range it falls within.
    pub fn contains(&self, other: &Datey) -> bool {
        match other {
            Datey::Date(date) => self == date,
            Datey::Range(range) => range.contains(&Datey::Date(*self)),
        }
    }
}

impl PartialEq for Date {
    fn eq(&self, other: &Self) -> bool {
        self.parts() == other.parts()
    }
}

impl Eq for Date {}

fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let invalid = || LineageError::InvalidDate(format!("no month {month} in year {year}"));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    Ok(next.signed_duration_since(first).num_days() as u32)
}

impl fmt::Display for Date {
    /// `1970-02-03`, `1970-02`, `1970`, `?-02-03`, prefixed with `~` if fuzzy.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fuzzy {
            write!(f, "~")?;
        }
        let year = match self.year {
            Some(year) => format!("{year:04}"),
            None => "?".to_string(),
        };
        let mut parts = vec![year];
        if self.month.is_some() || self.day.is_some() {
            parts.push(self.month.map_or("?".to_string(), |m| format!("{m:02}")));
        }
        if let Some(day) = self.day {
            parts.push(format!("{day:02}"));
        }
        write!(f, "{}", parts.join("-"))
    }
}

impl FromStr for Date {
    type Err = LineageError;

    /// Parse the form produced by [`Display`](fmt::Display).
    ///
    /// ```
    /// use lineage_engine::Date;
    ///
    /// let date: Date = "~1970-02".parse().unwrap();
    /// assert_eq!(date, Date::year_month(1970, 2));
    /// assert!(date.fuzzy);
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || LineageError::InvalidDate(format!("cannot parse {s:?}"));
        let trimmed = s.trim();
        let (fuzzy, body) = match trimmed.strip_prefix('~') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let fields: Vec<&str> = body.split('-').collect();
        if body.is_empty() || fields.len() > 3 {
            return Err(invalid());
        }

        fn field<T: FromStr>(raw: Option<&&str>) -> std::result::Result<Option<T>, ()> {
            match raw {
                None | Some(&"?") => Ok(None),
                Some(value) => value.parse().map(Some).map_err(|_| ()),
            }
        }

        let year: Option<i32> = field(fields.first()).map_err(|_| invalid())?;
        let month: Option<u32> = field(fields.get(1)).map_err(|_| invalid())?;
        let day: Option<u32> = field(fields.get(2)).map_err(|_| invalid())?;

        if month.is_some_and(|m| !(1..=12).contains(&m))
            || day.is_some_and(|d| !(1..=31).contains(&d))
        {
            return Err(invalid());
        }
        if let (Some(y), Some(m), Some(d)) = (year, month, day) {
            NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid)?;
        }

        Ok(Date::partial(year, month, day).with_fuzzy(fuzzy))
    }
}

// ── DateRange ───────────────────────────────────────────────────────────────

/// A span between two optional dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
    /// The start is a known hard limit, not an estimate.
    #[serde(default)]
    pub start_is_boundary: bool,
    /// The end is a known hard limit, not an estimate.
    #[serde(default)]
    pub end_is_boundary: bool,
}

fn comparable_bound(bound: &Option<Date>) -> Option<&Date> {
    bound.as_ref().filter(|date| date.comparable())
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    /// An open-ended range starting at `start`.
    pub fn since(start: Date) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    /// A range with no known start, ending at `end`.
    pub fn until(end: Date) -> Self {
        Self {
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn with_start_boundary(mut self) -> Self {
        self.start_is_boundary = true;
        self
    }

    pub fn with_end_boundary(mut self) -> Self {
        self.end_is_boundary = true;
        self
    }

    pub fn comparable(&self) -> bool {
        comparable_bound(&self.start).is_some() || comparable_bound(&self.end).is_some()
    }

    /// Range-vs-range ordering table.
    fn lt_range(&self, other: &DateRange) -> Option<bool> {
        let self_start = comparable_bound(&self.start);
        let self_end = comparable_bound(&self.end);
        let other_start = comparable_bound(&other.start);
        let other_end = comparable_bound(&other.end);

        match (self_start, self_end, other_start, other_end) {
            (Some(ss), Some(_), Some(os), Some(_)) => ss.lt(os),
            (Some(ss), Some(_), Some(os), None) => ss.le(os),
            (Some(ss), Some(se), None, Some(oe)) => match ss.lt(oe)? {
                true => Some(true),
                false => se.le(oe),
            },
            (Some(_), Some(_), None, None) => None,
            (Some(ss), None, Some(os), Some(_)) => ss.lt(os),
            (Some(ss), None, Some(os), None) => ss.lt(os),
            (Some(ss), None, None, Some(oe)) => ss.lt(oe),
            (Some(_), None, None, None) => None,
            (None, Some(se), Some(os), Some(_)) => se.le(os),
            (None, Some(se), Some(os), None) => se.le(os),
            (None, Some(se), None, Some(oe)) => se.lt(oe),
            (None, Some(_), None, None) => None,
            (None, None, Some(_), Some(_)) => None,
            (None, None, Some(_), None) => None,
            (None, None, None, Some(_)) => None,
            (None, None, None, None) => None,
        }
    }

    /// Range-vs-date ordering table.
    fn lt_date(&self, other: &Date) -> Option<bool> {
        match (comparable_bound(&self.start), comparable_bound(&self.end)) {
            (Some(start), Some(_)) => start.lt(other),
            (Some(start), None) => start.lt(other),
            (None, Some(end)) => end.le(other),
            (None, None) => None,
        }
    }

    fn eq_datey(&self, other: &Datey) -> bool {
        match other {
            Datey::Date(_) => false,
            Datey::Range(range) => self == range,
        }
    }

    pub fn lt(&self, other: &Datey) -> Option<bool> {
        match other {
            Datey::Date(date) => self.lt_date(date),
            Datey::Range(range) => self.lt_range(range),
        }
    }

    pub fn le(&self, other: &Datey) -> Option<bool> {
        Some(self.lt(other)? || self.eq_datey(other))
    }

    pub fn gt(&self, other: &Datey) -> Option<bool> {
        Some(!self.lt(other)? && !self.eq_datey(other))
    }

    pub fn ge(&self, other: &Datey) -> Option<bool> {
        Some(!self.lt(other)?)
    }

    /// Whether `other` falls within, or overlaps, this range.
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage_engine::{Date, DateRange, Datey};
    ///
    /// let february = DateRange::new(Date::new(1970, 2, 1), Date::new(1970, 2, 3));
    /// assert!(february.contains(&Datey::Date(Date::new(1970, 2, 2))));
    /// assert!(!february.contains(&Datey::Date(Date::new(1970, 2, 4))));
    /// ```
    pub fn contains(&self, other: &Datey) -> bool {
        if !self.comparable() {
            return false;
        }

        let other_range = match other {
            Datey::Date(_) => None,
            Datey::Range(range) => Some(range),
        };
        let others: Vec<&Date> = match other {
            Datey::Date(date) => vec![date],
            Datey::Range(range) => {
                if !range.comparable() {
                    return false;
                }
                [comparable_bound(&range.start), comparable_bound(&range.end)]
                    .into_iter()
                    .flatten()
                    .collect()
            }
        };
        let between = |low: &Date, date: &Date, high: &Date| {
            holds(low.le(date)) && holds(date.le(high))
        };

        match (&self.start, &self.end) {
            (Some(start), Some(end)) => {
                if let Some(range) = other_range {
                    match (&range.start, &range.end) {
                        (None, Some(other_end)) => {
                            return holds(start.le(other_end)) || holds(end.le(other_end));
                        }
                        (Some(other_start), None) => {
                            return holds(start.ge(other_start)) || holds(end.ge(other_start));
                        }
                        _ => {}
                    }
                }
                if others.iter().any(|date| between(start, *date, end)) {
                    return true;
                }
                if let Some(DateRange {
                    start: Some(other_start),
                    end: Some(other_end),
                    ..
                }) = other_range
                {
                    return [start, end]
                        .into_iter()
                        .any(|date| between(other_start, date, other_end));
                }
                false
            }
            // Two ranges with only a start always overlap.
            (Some(start), None) => {
                if other_range.is_some_and(|range| range.end.is_none()) {
                    return true;
                }
                others.iter().any(|date| holds(start.le(date)))
            }
            // Two ranges with only an end always overlap.
            (None, Some(end)) => {
                if other_range.is_some_and(|range| range.start.is_none()) {
                    return true;
                }
                others.iter().any(|date| holds(date.le(end)))
            }
            (None, None) => false,
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = &self.start {
            write!(f, "{start}")?;
        }
        write!(f, "..")?;
        if let Some(end) = &self.end {
            write!(f, "{end}")?;
        }
        Ok(())
    }
}

// ── Datey ───────────────────────────────────────────────────────────────────

/// Either a single (partial) date or a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Datey {
    Date(Date),
    Range(DateRange),
}

impl Datey {
    pub fn comparable(&self) -> bool {
        match self {
            Datey::Date(date) => date.comparable(),
            Datey::Range(range) => range.comparable(),
        }
    }

    pub fn as_date(&self) -> Option<&Date> {
        match self {
            Datey::Date(date) => Some(date),
            Datey::Range(_) => None,
        }
    }

    pub fn as_range(&self) -> Option<&DateRange> {
        match self {
            Datey::Date(_) => None,
            Datey::Range(range) => Some(range),
        }
    }

    pub fn lt(&self, other: &Datey) -> Option<bool> {
        match (self, other) {
            (Datey::Date(a), Datey::Date(b)) => a.lt(b),
            (Datey::Range(a), _) => a.lt(other),
            (Datey::Date(_), Datey::Range(b)) => b.gt(self),
        }
    }

    pub fn le(&self, other: &Datey) -> Option<bool> {
        match (self, other) {
            (Datey::Date(a), Datey::Date(b)) => a.le(b),
            (Datey::Range(a), _) => a.le(other),
            (Datey::Date(_), Datey::Range(b)) => b.ge(self),
        }
    }

    pub fn gt(&self, other: &Datey) -> Option<bool> {
        match (self, other) {
            (Datey::Date(a), Datey::Date(b)) => a.gt(b),
            (Datey::Range(a), _) => a.gt(other),
            (Datey::Date(_), Datey::Range(b)) => b.lt(self),
        }
    }

    pub fn ge(&self, other: &Datey) -> Option<bool> {
        match (self, other) {
            (Datey::Date(a), Datey::Date(b)) => a.ge(b),
            (Datey::Range(a), _) => a.ge(other),
            (Datey::Date(_), Datey::Range(b)) => b.le(self),
        }
    }

    pub fn contains(&self, other: &Datey) -> bool {
        match self {
            Datey::Date(date) => date.contains(other),
            Datey::Range(range) => range.contains(other),
        }
    }
}

impl From<Date> for Datey {
    fn from(date: Date) -> Self {
        Datey::Date(date)
    }
}

impl From<DateRange> for Datey {
    fn from(range: DateRange) -> Self {
        Datey::Range(range)
    }
}

impl fmt::Display for Datey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datey::Date(date) => write!(f, "{date}"),
            Datey::Range(range) => write!(f, "{range}"),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> Date {
        Date::new(year, month, day)
    }

    fn date(year: i32, month: u32, day: u32) -> Datey {
        Datey::Date(d(year, month, day))
    }

    // ── Date ordering ───────────────────────────────────────────────────

    #[test]
    fn test_complete_dates_compare_lexicographically() {
        assert_eq!(d(1970, 1, 1).lt(&d(1970, 1, 2)), Some(true));
        assert_eq!(d(1970, 1, 2).lt(&d(1970, 1, 1)), Some(false));
        assert_eq!(d(1969, 12, 31).lt(&d(1970, 1, 1)), Some(true));
        assert_eq!(d(1970, 1, 1).le(&d(1970, 1, 1)), Some(true));
        assert_eq!(d(1970, 1, 1).ge(&d(1970, 1, 1)), Some(true));
        assert_eq!(d(1971, 1, 1).gt(&d(1970, 12, 31)), Some(true));
    }

    #[test]
    fn test_incomplete_dates_are_range_promoted() {
        assert_eq!(Date::year(1970).lt(&d(1971, 1, 1)), Some(true));
        assert_eq!(Date::year_month(1970, 2).lt(&d(1970, 2, 15)), Some(true));
        assert_eq!(Date::year(1971).gt(&Date::year(1970)), Some(true));
        // Same start after promotion: neither is less.
        assert_eq!(Date::year(1970).lt(&d(1970, 1, 1)), Some(false));
        assert_eq!(d(1970, 1, 1).lt(&Date::year(1970)), Some(false));
    }

    #[test]
    fn test_promoted_greater_than_is_not_less_and_not_equal() {
        // Ranges 1970-01-01..1970-12-31 and 1970-01-01..1970-01-01 are
        // neither less nor equal, so each is "greater" than the other.
        assert_eq!(Date::year(1970).gt(&d(1970, 1, 1)), Some(true));
        assert_eq!(d(1970, 1, 1).gt(&Date::year(1970)), Some(true));
        assert_eq!(Date::year(1970).le(&d(1970, 1, 1)), Some(false));
    }

    #[test]
    fn test_date_without_year_is_incomparable() {
        let no_year = Date::partial(None, Some(1), Some(1));
        assert!(!no_year.comparable());
        assert_eq!(no_year.lt(&d(1970, 1, 1)), None);
        assert_eq!(d(1970, 1, 1).gt(&no_year), None);
    }

    #[test]
    fn test_fuzzy_does_not_affect_ordering() {
        let fuzzy = d(1970, 1, 1).with_fuzzy(true);
        assert_eq!(fuzzy.lt(&d(1970, 1, 2)), Some(true));
        assert_eq!(fuzzy, d(1970, 1, 1));
    }

    // ── Date equality ───────────────────────────────────────────────────

    #[test]
    fn test_equality_is_exact_on_parts() {
        assert_eq!(d(1970, 1, 1), d(1970, 1, 1));
        assert_ne!(Date::partial(Some(1970), Some(1), None), d(1970, 1, 1));
        assert_ne!(Date::year(1970), Date::year_month(1970, 1));
    }

    #[test]
    fn test_date_never_equals_range() {
        let single = Datey::Range(DateRange::new(d(1970, 1, 1), d(1970, 1, 1)));
        assert_ne!(date(1970, 1, 1), single);
    }

    // ── to_range ────────────────────────────────────────────────────────

    #[test]
    fn test_to_range_year_only() {
        let range = Date::year(1970).to_range().unwrap();
        assert_eq!(range, DateRange::new(d(1970, 1, 1), d(1970, 12, 31)));
    }

    #[test]
    fn test_to_range_leap_february() {
        assert_eq!(Date::year_month(2000, 2).to_range().unwrap().end, Some(d(2000, 2, 29)));
        assert_eq!(Date::year_month(1900, 2).to_range().unwrap().end, Some(d(1900, 2, 28)));
    }

    #[test]
    fn test_to_range_day_without_month() {
        let range = Date::partial(Some(1970), None, Some(5)).to_range().unwrap();
        assert_eq!(range, DateRange::new(d(1970, 1, 5), d(1970, 12, 5)));
    }

    #[test]
    fn test_to_range_complete_date_is_single_day() {
        let range = d(1970, 6, 15).to_range().unwrap();
        assert_eq!(range, DateRange::new(d(1970, 6, 15), d(1970, 6, 15)));
    }

    #[test]
    fn test_to_range_without_year_fails() {
        let err = Date::partial(None, Some(2), None).to_range().unwrap_err();
        assert!(matches!(err, LineageError::IncomparableDate(_)), "got: {err}");
    }

    #[test]
    fn test_to_range_invalid_month_fails() {
        let err = Date::year_month(1970, 13).to_range().unwrap_err();
        assert!(err.to_string().contains("Invalid date"), "got: {err}");
    }

    // ── DateRange ordering ──────────────────────────────────────────────

    #[test]
    fn test_open_start_range_less_than_later_date() {
        let range = DateRange::since(d(1970, 2, 2));
        assert_eq!(range.lt(&date(1970, 2, 3)), Some(true));
        assert_eq!(range.lt(&date(1970, 2, 1)), Some(false));
    }

    #[test]
    fn test_open_end_range_compares_end_inclusively() {
        let range = DateRange::until(d(1970, 2, 2));
        assert_eq!(range.lt(&date(1970, 2, 2)), Some(true));
        assert_eq!(range.lt(&date(1970, 2, 1)), Some(false));
    }

    #[test]
    fn test_range_without_bounds_is_incomparable() {
        assert_eq!(DateRange::default().lt(&date(1970, 1, 1)), None);
        let no_year = DateRange::since(Date::partial(None, Some(1), None));
        assert_eq!(no_year.lt(&date(1970, 1, 1)), None);
    }

    #[test]
    fn test_range_table_full_vs_full() {
        let a = DateRange::new(d(1970, 1, 1), d(1980, 1, 1));
        let b = DateRange::new(d(1975, 1, 1), d(1976, 1, 1));
        assert_eq!(a.lt(&b.into()), Some(true));
        assert_eq!(b.lt(&a.into()), Some(false));
    }

    #[test]
    fn test_range_table_full_vs_start_only_is_inclusive() {
        let a = DateRange::new(d(1970, 1, 1), d(1980, 1, 1));
        let b = DateRange::since(d(1970, 1, 1));
        assert_eq!(a.lt(&b.into()), Some(true));
    }

    #[test]
    fn test_range_table_full_vs_end_only() {
        let a = DateRange::new(d(1970, 1, 1), d(1980, 1, 1));
        assert_eq!(a.lt(&DateRange::until(d(1975, 1, 1)).into()), Some(true));
        assert_eq!(a.lt(&DateRange::until(d(1960, 1, 1)).into()), Some(false));
    }

    #[test]
    fn test_range_table_end_only_vs_start_only() {
        let a = DateRange::until(d(1970, 1, 1));
        assert_eq!(a.lt(&DateRange::since(d(1970, 1, 1)).into()), Some(true));
        assert_eq!(a.lt(&DateRange::since(d(1969, 1, 1)).into()), Some(false));
    }

    #[test]
    fn test_range_table_undefined_cells() {
        let full = DateRange::new(d(1970, 1, 1), d(1980, 1, 1));
        let empty = DateRange::default();
        assert_eq!(full.lt(&empty.into()), None);
        assert_eq!(DateRange::since(d(1970, 1, 1)).lt(&empty.into()), None);
        assert_eq!(DateRange::until(d(1970, 1, 1)).lt(&empty.into()), None);
        assert_eq!(empty.lt(&full.into()), None);
        assert_eq!(empty.gt(&full.into()), None);
    }

    #[test]
    fn test_range_equality_includes_boundary_flags() {
        let plain = DateRange::new(d(1970, 1, 1), d(1980, 1, 1));
        let bounded = plain.with_end_boundary();
        assert_ne!(plain, bounded);
        assert_eq!(plain.le(&plain.into()), Some(true));
        assert_eq!(plain.gt(&plain.into()), Some(false));
    }

    #[test]
    fn test_range_table_start_only_vs_full() {
        let a = DateRange::since(d(1970, 1, 1));
        assert_eq!(a.lt(&DateRange::new(d(1975, 1, 1), d(1980, 1, 1)).into()), Some(true));
        assert_eq!(a.lt(&DateRange::new(d(1970, 1, 1), d(1980, 1, 1)).into()), Some(false));
    }

    #[test]
    fn test_range_table_start_only_vs_start_only() {
        let a = DateRange::since(d(1970, 1, 1));
        assert_eq!(a.lt(&DateRange::since(d(1975, 1, 1)).into()), Some(true));
        assert_eq!(a.lt(&DateRange::since(d(1970, 1, 1)).into()), Some(false));
        assert_eq!(a.lt(&DateRange::since(d(1960, 1, 1)).into()), Some(false));
    }

    #[test]
    fn test_range_table_start_only_vs_end_only() {
        let a = DateRange::since(d(1970, 1, 1));
        assert_eq!(a.lt(&DateRange::until(d(1975, 1, 1)).into()), Some(true));
        assert_eq!(a.lt(&DateRange::until(d(1970, 1, 1)).into()), Some(false));
    }

    #[test]
    fn test_range_table_end_only_vs_full_is_inclusive() {
        let a = DateRange::until(d(1970, 1, 1));
        assert_eq!(a.lt(&DateRange::new(d(1970, 1, 1), d(1980, 1, 1)).into()), Some(true));
        assert_eq!(a.lt(&DateRange::new(d(1969, 1, 1), d(1980, 1, 1)).into()), Some(false));
    }

    #[test]
    fn test_range_table_end_only_vs_end_only() {
        let a = DateRange::until(d(1970, 1, 1));
        assert_eq!(a.lt(&DateRange::until(d(1975, 1, 1)).into()), Some(true));
        assert_eq!(a.lt(&DateRange::until(d(1970, 1, 1)).into()), Some(false));
    }

    #[test]
    fn test_range_table_full_vs_date_uses_start() {
        let a = DateRange::new(d(1970, 1, 1), d(1980, 1, 1));
        assert_eq!(a.lt(&date(1975, 1, 1)), Some(true));
        assert_eq!(a.lt(&date(1970, 1, 1)), Some(false));
        assert_eq!(a.lt(&date(1960, 1, 1)), Some(false));
    }

    // ── Date vs DateRange ───────────────────────────────────────────────

    #[test]
    fn test_date_against_range_is_mirrored() {
        let since_1990 = Datey::Range(DateRange::since(d(1990, 1, 1)));
        assert_eq!(date(1985, 1, 1).lt(&since_1990), Some(true));
        assert_eq!(date(1995, 1, 1).lt(&since_1990), Some(false));
        assert_eq!(date(1995, 1, 1).gt(&since_1990), Some(true));

        let until_1980 = Datey::Range(DateRange::until(d(1980, 1, 1)));
        assert_eq!(date(1970, 1, 1).lt(&until_1980), Some(true));
        assert_eq!(date(1990, 1, 1).lt(&until_1980), Some(false));
    }

    // ── Containment ─────────────────────────────────────────────────────

    #[test]
    fn test_date_in_closed_range() {
        let inside = DateRange::new(d(1970, 2, 1), d(1970, 2, 3));
        let after = DateRange::new(d(1970, 2, 3), d(1970, 2, 5));
        assert!(inside.contains(&date(1970, 2, 2)));
        assert!(!after.contains(&date(1970, 2, 2)));
        assert!(inside.contains(&date(1970, 2, 1)));
        assert!(inside.contains(&date(1970, 2, 3)));
    }

    #[test]
    fn test_start_only_ranges_always_overlap() {
        let a = DateRange::since(d(1990, 1, 1));
        let b = DateRange::since(d(1970, 1, 1));
        assert!(a.contains(&b.into()));
        assert!(b.contains(&a.into()));
    }

    #[test]
    fn test_end_only_ranges_always_overlap() {
        let a = DateRange::until(d(1990, 1, 1));
        let b = DateRange::until(d(1970, 1, 1));
        assert!(a.contains(&b.into()));
    }

    #[test]
    fn test_start_only_range_contains_later_dates() {
        let range = DateRange::since(d(1970, 1, 1));
        assert!(range.contains(&date(1980, 1, 1)));
        assert!(!range.contains(&date(1960, 1, 1)));
    }

    #[test]
    fn test_end_only_range_contains_earlier_dates() {
        let range = DateRange::until(d(1970, 1, 1));
        assert!(range.contains(&date(1960, 1, 1)));
        assert!(!range.contains(&date(1980, 1, 1)));
    }

    #[test]
    fn test_closed_range_against_open_ranges() {
        let range = DateRange::new(d(1970, 1, 1), d(1980, 1, 1));
        assert!(range.contains(&DateRange::until(d(1975, 1, 1)).into()));
        assert!(!range.contains(&DateRange::until(d(1960, 1, 1)).into()));
        assert!(range.contains(&DateRange::since(d(1975, 1, 1)).into()));
        assert!(!range.contains(&DateRange::since(d(1990, 1, 1)).into()));
    }

    #[test]
    fn test_closed_ranges_overlap() {
        let range = DateRange::new(d(1970, 1, 1), d(1975, 1, 1));
        assert!(range.contains(&DateRange::new(d(1974, 1, 1), d(1990, 1, 1)).into()));
        assert!(range.contains(&DateRange::new(d(1960, 1, 1), d(1990, 1, 1)).into()));
        assert!(!range.contains(&DateRange::new(d(1976, 1, 1), d(1990, 1, 1)).into()));
    }

    #[test]
    fn test_incomparable_containment_is_false() {
        assert!(!DateRange::default().contains(&date(1970, 1, 1)));
        let range = DateRange::new(d(1970, 1, 1), d(1980, 1, 1));
        assert!(!range.contains(&DateRange::default().into()));
    }

    #[test]
    fn test_date_contains() {
        assert!(d(1970, 1, 1).contains(&date(1970, 1, 1)));
        assert!(!d(1970, 1, 1).contains(&Datey::Date(Date::year(1970))));
        let range = DateRange::new(d(1960, 1, 1), d(1980, 1, 1));
        assert!(d(1970, 1, 1).contains(&range.into()));
    }

    // ── Parsing and display ─────────────────────────────────────────────

    #[test]
    fn test_parse_partial_dates() {
        assert_eq!("1970-02-03".parse::<Date>().unwrap(), d(1970, 2, 3));
        assert_eq!("1970".parse::<Date>().unwrap(), Date::year(1970));
        assert_eq!(
            "?-02-03".parse::<Date>().unwrap(),
            Date::partial(None, Some(2), Some(3))
        );
        assert!("~1970".parse::<Date>().unwrap().fuzzy);
    }

    #[test]
    fn test_parse_rejects_invalid_dates() {
        for input in ["", "abc", "1970-13", "1970-02-30", "1970-01-01-01", "1970-00"] {
            let result = input.parse::<Date>();
            assert!(result.is_err(), "expected error for {input:?}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(d(1970, 2, 3).to_string(), "1970-02-03");
        assert_eq!(Date::year(1970).with_fuzzy(true).to_string(), "~1970");
        assert_eq!(Date::partial(None, Some(2), Some(3)).to_string(), "?-02-03");
        assert_eq!(Date::partial(Some(1970), None, Some(3)).to_string(), "1970-?-03");
        assert_eq!(DateRange::since(Date::year(1970)).to_string(), "1970..");
    }

    #[test]
    fn test_years_before() {
        assert_eq!(d(2026, 10, 16).years_before(125), d(1901, 10, 16));
        assert_eq!(Date::default().years_before(10), Date::default());
    }

    // ── Serialization ───────────────────────────────────────────────────

    #[test]
    fn test_datey_json_shape() {
        let range = Datey::Range(DateRange::since(d(1975, 1, 1)));
        assert_eq!(
            serde_json::to_value(range).unwrap(),
            serde_json::json!({
                "type": "range",
                "start": {"year": 1975, "month": 1, "day": 1, "fuzzy": false},
                "end": null,
                "start_is_boundary": false,
                "end_is_boundary": false,
            })
        );

        let single = Datey::Date(Date::year(1975).with_fuzzy(true));
        assert_eq!(
            serde_json::to_value(single).unwrap(),
            serde_json::json!({
                "type": "date",
                "year": 1975,
                "month": null,
                "day": null,
                "fuzzy": true,
            })
        );
    }

    #[test]
    fn test_datey_json_round_trip() {
        let bounded =
            Datey::Range(DateRange::new(d(1990, 1, 1), d(1999, 1, 1)).with_end_boundary());
        let json = serde_json::to_string(&bounded).unwrap();
        let back: Datey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bounded);
        assert!(back.as_range().unwrap().end_is_boundary);
    }

    #[test]
    fn test_datey_json_flags_default_to_false() {
        let json = r#"{"type": "range", "start": {"year": 1975}, "end": null}"#;
        let range: Datey = serde_json::from_str(json).unwrap();
        let range = range.as_range().unwrap();
        assert_eq!(range.start, Some(Date::year(1975)));
        assert!(!range.start_is_boundary);
        assert!(!range.end_is_boundary);
        assert!(!range.start.unwrap().fuzzy);

        let json = r#"{"type": "date", "year": 1975, "month": 2}"#;
        let single: Datey = serde_json::from_str(json).unwrap();
        assert_eq!(single, Datey::Date(Date::year_month(1975, 2)));
        assert!(!single.as_date().unwrap().fuzzy);
    }
}
