use std::time::Duration;

/// Format a summed value for a table cell.
///
/// Integral values carry no decimal point, other values use the shortest
/// representation that round-trips. Negative zero prints as `0`.
///
/// # Examples
///
/// ```
/// use pivot_core::formatting::format_value;
///
/// assert_eq!(format_value(15.0), "15");
/// assert_eq!(format_value(-2.5), "-2.5");
/// assert_eq!(format_value(0.1 + 0.2), "0.30000000000000004");
/// assert_eq!(format_value(-0.0), "0");
/// ```
pub fn format_value(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Format a count with thousands separators.
///
/// # Examples
///
/// ```
/// use pivot_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(999), "999");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
pub fn format_count(count: usize) -> String {
    group_thousands(&count.to_string())
}

/// Format an elapsed wall-clock duration for log output.
///
/// * `< 1 s` → `"42 ms"`
/// * otherwise → `"1.25 s"`
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use pivot_core::formatting::format_elapsed;
///
/// assert_eq!(format_elapsed(Duration::from_millis(42)), "42 ms");
/// assert_eq!(format_elapsed(Duration::from_millis(1250)), "1.25 s");
/// ```
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1000 {
        format!("{} ms", millis)
    } else {
        format!("{:.2} s", elapsed.as_secs_f64())
    }
}

/// Insert commas every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
