//! Form validation and sanitization
//!
//! Each form is described by an ordered table of [`FieldRule`]s. Processing a
//! raw submission runs every rule's check against the incoming value and then
//! applies the rule's sanitizers regardless of the outcome, so the handler
//! always gets both the failures and the cleaned values.

use chrono::{NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use validator::ValidateLength;

/// Raw form body as submitted
pub type RawForm = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Non-empty after trimming
    Required,
    /// Absent or empty, or an ISO-8601 date/date-time
    OptionalIsoDate,
    /// Sanitized only
    Unchecked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    Trim,
    Escape,
    ToDate,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub check: Check,
    pub message: &'static str,
    pub sanitizers: &'static [Sanitizer],
}

pub const BOOK_INSTANCE_RULES: &[FieldRule] = &[
    FieldRule {
        field: "book",
        check: Check::Required,
        message: "Book must be specified",
        sanitizers: &[Sanitizer::Trim, Sanitizer::Escape],
    },
    FieldRule {
        field: "imprint",
        check: Check::Required,
        message: "Imprint must be specified",
        sanitizers: &[Sanitizer::Trim, Sanitizer::Escape],
    },
    FieldRule {
        field: "due_back",
        check: Check::OptionalIsoDate,
        message: "Invalid date",
        sanitizers: &[Sanitizer::ToDate],
    },
    FieldRule {
        field: "status",
        check: Check::Unchecked,
        message: "",
        sanitizers: &[Sanitizer::Trim, Sanitizer::Escape],
    },
];

pub const GENRE_RULES: &[FieldRule] = &[FieldRule {
    field: "name",
    check: Check::Required,
    message: "Genre name required",
    sanitizers: &[Sanitizer::Trim, Sanitizer::Escape],
}];

/// A failed check
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
    /// Value as submitted, before sanitization
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(Option<NaiveDate>),
}

/// Sanitized values plus any failures
#[derive(Debug, Clone, Default)]
pub struct Submission {
    values: HashMap<&'static str, FieldValue>,
    pub errors: Vec<FieldError>,
}

impl Submission {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Sanitized text of a field, empty when absent or not text
    pub fn text(&self, field: &str) -> &str {
        match self.values.get(field) {
            Some(FieldValue::Text(s)) => s,
            _ => "",
        }
    }

    /// Coerced date of a field
    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.values.get(field) {
            Some(FieldValue::Date(d)) => *d,
            _ => None,
        }
    }
}

/// Run every rule against the raw form. Never fails.
pub fn process(raw: &RawForm, rules: &[FieldRule]) -> Submission {
    let mut submission = Submission::default();

    for rule in rules {
        let input = raw.get(rule.field).map(String::as_str).unwrap_or("");

        if !passes(rule.check, input) {
            submission.errors.push(FieldError {
                field: rule.field,
                message: rule.message,
                value: input.to_string(),
            });
        }

        let value = rule
            .sanitizers
            .iter()
            .fold(FieldValue::Text(input.to_string()), |value, s| {
                sanitize(*s, value)
            });
        submission.values.insert(rule.field, value);
    }

    submission
}

fn passes(check: Check, input: &str) -> bool {
    match check {
        Check::Required => input.trim().validate_length(Some(1), None, None),
        Check::OptionalIsoDate => input.is_empty() || parse_iso8601(input).is_some(),
        Check::Unchecked => true,
    }
}

/// HTML entity escaping, including backslash and backtick
fn escape(input: &str) -> String {
    html_escape::encode_safe(input)
        .replace('\\', "&#x5C;")
        .replace('`', "&#96;")
}

fn sanitize(sanitizer: Sanitizer, value: FieldValue) -> FieldValue {
    match (sanitizer, value) {
        (Sanitizer::Trim, FieldValue::Text(s)) => FieldValue::Text(s.trim().to_string()),
        (Sanitizer::Escape, FieldValue::Text(s)) => {
            FieldValue::Text(escape(&s))
        }
        (Sanitizer::ToDate, FieldValue::Text(s)) => FieldValue::Date(parse_iso8601(&s)),
        (_, value) => value,
    }
}

/// ISO-8601 dates and date-times: extended and basic forms, reduced
/// precision, week and ordinal dates. A sign is only accepted on a six-digit
/// expanded year.
static ISO8601: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<year>[0-9]{4}|[+-][0-9]{6})",
        r"(?:(?:",
        r"-(?P<month>0[1-9]|1[0-2])(?:-(?P<day>0[1-9]|[12][0-9]|3[01]))?",
        r"|(?P<bmonth>0[1-9]|1[0-2])(?P<bday>0[1-9]|[12][0-9]|3[01])",
        r"|-W(?P<week>0[1-9]|[1-4][0-9]|5[0-3])(?:-(?P<weekday>[1-7]))?",
        r"|W(?P<bweek>0[1-9]|[1-4][0-9]|5[0-3])(?P<bweekday>[1-7])?",
        r"|-?(?P<ordinal>00[1-9]|0[1-9][0-9]|[12][0-9]{2}|3(?:[0-5][0-9]|6[0-6]))",
        r")",
        r"(?:[T ](?:(?:[01][0-9]|2[0-3])(?::?[0-5][0-9](?::?[0-5][0-9])?)?|24(?::?00){1,2})",
        r"(?:[.,][0-9]+)?",
        r"(?:[zZ]|[+-](?:[01][0-9]|2[0-3])(?::?[0-5][0-9])?)?)?",
        r")?$",
    ))
    .expect("ISO-8601 pattern is valid")
});

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Calendar date of an ISO-8601 date or date-time.
///
/// The date is kept as written; any time and offset are ignored. Reduced
/// precision and week dates resolve to their first day.
pub fn parse_iso8601(input: &str) -> Option<NaiveDate> {
    let caps = ISO8601.captures(input)?;
    let number = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

    let year: i32 = caps.name("year")?.as_str().parse().ok()?;

    if let Some(month) = number("month").or_else(|| number("bmonth")) {
        let day = number("day").or_else(|| number("bday")).unwrap_or(1);
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    if let Some(week) = number("week").or_else(|| number("bweek")) {
        let weekday = number("weekday").or_else(|| number("bweekday")).unwrap_or(1);
        let weekday = *WEEKDAYS.get(usize::try_from(weekday).ok()?.checked_sub(1)?)?;
        return NaiveDate::from_isoywd_opt(year, week, weekday);
    }
    if let Some(ordinal) = number("ordinal") {
        return NaiveDate::from_yo_opt(year, ordinal);
    }
    NaiveDate::from_ymd_opt(year, 1, 1)
}
