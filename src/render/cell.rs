use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use serde_json::{Number, Value};

const MIN_FRACTION_DIGITS: usize = 2;
const MAX_FRACTION_DIGITS: usize = 6;

const DATE_DISPLAY: &str = "%m/%d/%Y";
const DATETIME_DISPLAY: &str = "%m/%d/%Y, %I:%M:%S %p";
const TIME_DISPLAY: &str = "%I:%M:%S %p";
const END_OF_DAY: &str = "24:00:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Null,
    Integer,
    Decimal,
    Boolean,
    Date,
    Datetime,
    Time,
    Json,
    Object,
    String,
    Unknown,
}

/// Visual treatment of a cell, decided from its kind alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellTone {
    Muted,
    Numeric,
    Boolean,
    Temporal,
    Json,
    Plain,
}

impl CellKind {
    pub fn tone(self) -> CellTone {
        match self {
            CellKind::Null => CellTone::Muted,
            CellKind::Integer | CellKind::Decimal => CellTone::Numeric,
            CellKind::Boolean => CellTone::Boolean,
            CellKind::Date | CellKind::Datetime | CellKind::Time => CellTone::Temporal,
            CellKind::Json => CellTone::Json,
            CellKind::Object | CellKind::String | CellKind::Unknown => CellTone::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedCell {
    pub text: String,
    pub kind: CellKind,
}

impl FormattedCell {
    fn new(text: impl Into<String>, kind: CellKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// Counted in characters, strictly greater than `threshold`.
    pub fn is_long_text(&self, threshold: usize) -> bool {
        self.text.chars().count() > threshold
    }
}

/// Classify a raw cell and render its display text (en-US conventions).
pub fn format(value: &Value) -> FormattedCell {
    match value {
        Value::Null => FormattedCell::new("NULL", CellKind::Null),
        Value::Number(n) => format_number(n),
        Value::Bool(b) => FormattedCell::new(if *b { "TRUE" } else { "FALSE" }, CellKind::Boolean),
        Value::String(s) => format_string(s),
        Value::Array(_) | Value::Object(_) => match serde_json::to_string_pretty(value) {
            Ok(text) => FormattedCell::new(text, CellKind::Json),
            Err(_) => FormattedCell::new(value.to_string(), CellKind::Object),
        },
    }
}

/// Thousands-grouped count, e.g. `12,345`.
pub fn format_count(n: usize) -> String {
    group_digits(&n.to_string())
}

fn format_number(n: &Number) -> FormattedCell {
    if let Some(i) = n.as_i64() {
        return FormattedCell::new(signed(i < 0, group_digits(&i.unsigned_abs().to_string())), CellKind::Integer);
    }
    if let Some(u) = n.as_u64() {
        return FormattedCell::new(group_digits(&u.to_string()), CellKind::Integer);
    }
    match n.as_f64() {
        Some(f) if f.fract() != 0.0 => FormattedCell::new(format_decimal(f), CellKind::Decimal),
        Some(f) => {
            let digits = format!("{:.0}", f.abs());
            FormattedCell::new(signed(f < 0.0, group_digits(&digits)), CellKind::Integer)
        }
        None => FormattedCell::new(n.to_string(), CellKind::Unknown),
    }
}

/// Rounds half away from zero on the shortest decimal form of `f`, so `0.0078125`
/// becomes `0.007813` rather than the banker's `0.007812`.
fn format_decimal(f: f64) -> String {
    let shortest = f.abs().to_string();
    let (int_part, frac_part) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));
    let (int_part, frac_part) = round_fraction(int_part, frac_part, MAX_FRACTION_DIGITS);
    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < MIN_FRACTION_DIGITS {
        frac.push('0');
    }
    signed(f < 0.0, format!("{}.{}", group_digits(&int_part), frac))
}

fn round_fraction(int_part: &str, frac_part: &str, max_digits: usize) -> (String, String) {
    if frac_part.len() <= max_digits {
        return (int_part.to_string(), frac_part.to_string());
    }
    let round_up = frac_part.as_bytes()[max_digits] >= b'5';
    let mut digits: Vec<u8> = int_part.bytes().chain(frac_part[..max_digits].bytes()).collect();
    if round_up {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }
    let split = digits.len() - max_digits;
    let int_part = String::from_utf8_lossy(&digits[..split]).into_owned();
    let frac_part = String::from_utf8_lossy(&digits[split..]).into_owned();
    (int_part, frac_part)
}

fn signed(negative: bool, body: String) -> String {
    if negative {
        format!("-{body}")
    } else {
        body
    }
}

fn group_digits(digits: &str) -> String {
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

fn format_string(s: &str) -> FormattedCell {
    if matches_prefix(s, b"dddd-dd-dd dd:dd:dd") || matches_prefix(s, b"dddd-dd-ddTdd:dd:dd") {
        if let Some(dt) = parse_datetime(s) {
            return FormattedCell::new(dt.format(DATETIME_DISPLAY).to_string(), CellKind::Datetime);
        }
    } else if matches_exact(s, b"dddd-dd-dd") {
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return FormattedCell::new(date.format(DATE_DISPLAY).to_string(), CellKind::Date);
        }
    } else if matches_exact(s, b"dd:dd:dd") {
        if let Some(time) = parse_time(s) {
            return FormattedCell::new(time.format(TIME_DISPLAY).to_string(), CellKind::Time);
        }
    }
    FormattedCell::new(s, CellKind::String)
}

/// Wall-clock value of a date-time string. Offsets are honoured for validation but
/// the time is shown as written, so output does not depend on the host timezone.
///
/// `24:00:00` is midnight at the end of the day; leap seconds are not times.
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    // Shape check guarantees the first 19 bytes are ASCII.
    let end_of_day = s[11..].starts_with(END_OF_DAY);
    let normalized = if end_of_day {
        format!("{}T00{}", &s[..10], &s[13..])
    } else {
        format!("{}T{}", &s[..10], &s[11..])
    };
    let dt = parse_wall_clock(&normalized)?;
    if is_leap_second(dt.nanosecond()) {
        return None;
    }
    if end_of_day {
        if dt.nanosecond() != 0 {
            return None;
        }
        return dt.checked_add_days(Days::new(1));
    }
    Some(dt)
}

fn parse_wall_clock(normalized: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(normalized) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(normalized, "%Y-%m-%dT%H:%M:%S%.f%#z") {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(normalized, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    if s == END_OF_DAY {
        return NaiveTime::from_hms_opt(0, 0, 0);
    }
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .ok()
        .filter(|time| !is_leap_second(time.nanosecond()))
}

/// chrono encodes `:60` as a nanosecond count past one second.
fn is_leap_second(nanosecond: u32) -> bool {
    nanosecond >= 1_000_000_000
}

/// `d` in the pattern stands for any ASCII digit; every other byte is literal.
fn matches_prefix(s: &str, pattern: &[u8]) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= pattern.len()
        && pattern.iter().zip(bytes).all(|(p, b)| match p {
            b'd' => b.is_ascii_digit(),
            lit => lit == b,
        })
}

fn matches_exact(s: &str, pattern: &[u8]) -> bool {
    s.len() == pattern.len() && matches_prefix(s, pattern)
}
