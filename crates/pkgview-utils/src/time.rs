use std::time::Duration;

/// Parses a duration string into a number of milliseconds.
///
/// Accepts any sequence of `<digits><unit>` pairs where the unit is one of `ms`,
/// `s`, `m`, `h` or `d`, e.g. `1m30s` or `250ms`. An empty string is zero.
///
/// Returns `None` if the input is malformed or the total overflows.
///
/// # Examples
///
/// ```
/// use pkgview_utils::time::parse_duration;
///
/// assert_eq!(parse_duration("1s500ms"), Some(1500));
/// ```
pub fn parse_duration(input: &str) -> Option<u128> {
    let mut total: u128 = 0;
    let mut chars = input.trim().chars().peekable();

    while chars.peek().is_some() {
        let mut number_str = String::new();
        while let Some(c) = chars.next_if(char::is_ascii_digit) {
            number_str.push(c);
        }

        if number_str.is_empty() {
            return None;
        }

        let number: u128 = number_str.parse().ok()?;
        let multiplier = match chars.next()? {
            'm' if chars.next_if_eq(&'s').is_some() => 1,
            's' => 1000,
            'm' => 60 * 1000,
            'h' => 60 * 60 * 1000,
            'd' => 24 * 60 * 60 * 1000,
            _ => return None,
        };

        total = total.checked_add(number.checked_mul(multiplier)?)?;
    }

    Some(total)
}

/// Same as [`parse_duration`], as a [`Duration`].
pub fn parse_std_duration(input: &str) -> Option<Duration> {
    let millis = parse_duration(input)?;
    u64::try_from(millis).ok().map(Duration::from_millis)
}
