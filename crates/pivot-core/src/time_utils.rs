use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Number of weekly total columns emitted in the output.
pub const WEEKS_IN_OUTPUT: i32 = 52;

/// English month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// ── Date parsing ──────────────────────────────────────────────────────────────

const DATE_FMTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const DATETIME_FMTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a column-dimension cell as a calendar date.
///
/// Timestamps keep the date as written; an RFC 3339 offset is not applied.
/// Returns `None` for anything that is not a recognised date.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use pivot_core::time_utils::parse_date;
///
/// let jan1 = NaiveDate::from_ymd_opt(2023, 1, 1);
/// assert_eq!(parse_date("2023-01-01"), jan1);
/// assert_eq!(parse_date("2023/01/01"), jan1);
/// assert_eq!(parse_date("2023-01-01T23:30:00+09:00"), jan1);
/// assert_eq!(parse_date("x"), None);
/// ```
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FMTS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_local().date())
}

// ── Period numbering ──────────────────────────────────────────────────────────

/// Week number of `date`, anchored on January 4th of its year.
///
/// `ceil((days_since_jan4 + weekday(jan4) + 1) / 7)` with Sunday as weekday 0.
/// This is not ISO-8601 numbering: early-January dates can land in week 0
/// and late-December dates in week 53.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use pivot_core::time_utils::week_number;
///
/// let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
/// assert_eq!(week_number(d(2023, 1, 1)), 1);
/// assert_eq!(week_number(d(2023, 12, 31)), 53);
/// ```
pub fn week_number(date: NaiveDate) -> i32 {
    // Jan 4th has ordinal0 == 3.
    let days_since_anchor = date.ordinal0() as i32 - 3;
    let anchor_weekday =
        (date.weekday().num_days_from_sunday() as i32 - days_since_anchor).rem_euclid(7);
    let n = days_since_anchor + anchor_weekday + 1;
    (n + 6).div_euclid(7)
}

/// Calendar month of `date`, 1 through 12.
pub fn month_number(date: NaiveDate) -> u32 {
    date.month()
}

// ── Header labels ─────────────────────────────────────────────────────────────

/// Header label for a weekly total column, e.g. `"Week 3 Total"`.
pub fn week_label(week: i32) -> String {
    format!("Week {} Total", week)
}

/// Header label for a monthly total column, e.g. `"March Total"`.
///
/// `month` is 1-based; values outside 1..=12 yield `None`.
pub fn month_label(month: u32) -> Option<String> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(idx).map(|name| format!("{} Total", name))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
