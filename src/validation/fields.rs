//! Declarative field validation.
//!
//! A form is described by a static table of [`FieldRule`]s. One engine,
//! [`validate`], interprets the table against an untyped JSON object and
//! returns every field either sanitized or with an error message.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*\.[a-z]{2,}$")
        .expect("email regex compiles")
});

/// Email length bounds from RFC 5321.
pub const EMAIL_MIN_LEN: usize = 5;
pub const EMAIL_MAX_LEN: usize = 254;

/// Field name → error message.
pub type FieldErrors = BTreeMap<String, String>;

/// What kind of value a field holds, and so which checks apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text such as a person's name or a location.
    Name,
    /// Email address; lower-cased on the way through.
    Email,
    /// Digits, whitespace, `+`, `-` and parentheses only.
    Phone,
    /// Absolute http(s) URL, optionally pinned to a domain.
    Url { domain: Option<&'static str> },
    /// One of a fixed set of values.
    Choice(&'static [&'static str]),
    /// Multi-line free text.
    FreeText,
    /// Date or timestamp; defaults to the validation time when absent.
    Date,
    /// Job title, checked against the open positions when supplied.
    JobTitle,
    /// Hidden field that humans leave empty.
    Honeypot,
}

impl FieldKind {
    fn is_single_line(&self) -> bool {
        !matches!(self, FieldKind::FreeText | FieldKind::Honeypot)
    }
}

/// Whether a field must be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// Validation rule for one field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    /// JSON key.
    pub name: &'static str,
    /// Human-readable name used in messages.
    pub label: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    /// Bounds in characters, applied after trimming.
    pub min_len: usize,
    pub max_len: usize,
}

/// Per-call inputs that are not part of the record.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Stand-in for absent date fields.
    pub now: DateTime<Utc>,
    /// Titles currently open; `None` or empty skips the cross-check.
    pub open_positions: Option<&'a [String]>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            open_positions: None,
        }
    }

    pub fn with_open_positions(mut self, titles: &'a [String]) -> Self {
        self.open_positions = Some(titles);
        self
    }
}

/// Cleaned field values, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizedRecord(BTreeMap<String, String>);

impl SanitizedRecord {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value of `name`, or the empty string.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, name: &str, value: String) {
        self.0.insert(name.to_string(), value);
    }
}

/// Result of validating a record against a rule table.
///
/// Every rule's field ends up in exactly one of `errors` or `sanitized`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: FieldErrors,
    pub sanitized: SanitizedRecord,
    /// A honeypot field was filled in.
    pub spam_detected: bool,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<SanitizedRecord, FieldErrors> {
        if self.errors.is_empty() {
            Ok(self.sanitized)
        } else {
            Err(self.errors)
        }
    }
}

/// Validate `record` against `rules`. Pure: same inputs, same output.
///
/// Fields are checked independently and every error is collected.
pub fn validate(
    record: &Map<String, Value>,
    rules: &[FieldRule],
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let mut result = ValidationResult::default();

    for rule in rules {
        match check_field(rule, record.get(rule.name), ctx) {
            Ok(value) => result.sanitized.insert(rule.name, value),
            Err(FieldFailure::Spam) => {
                result.spam_detected = true;
                result
                    .errors
                    .insert(rule.name.to_string(), "Invalid submission".to_string());
            }
            Err(FieldFailure::Invalid(message)) => {
                result.errors.insert(rule.name.to_string(), message);
            }
        }
    }

    result
}

enum FieldFailure {
    Invalid(String),
    Spam,
}

impl From<String> for FieldFailure {
    fn from(message: String) -> Self {
        FieldFailure::Invalid(message)
    }
}

fn check_field(
    rule: &FieldRule,
    raw: Option<&Value>,
    ctx: &ValidationContext<'_>,
) -> Result<String, FieldFailure> {
    if rule.kind == FieldKind::Honeypot {
        return match raw {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(String::new()),
            Some(_) => Err(FieldFailure::Spam),
        };
    }

    let value = match raw {
        None | Some(Value::Null) => "",
        Some(Value::String(s)) => s.trim(),
        Some(_) => return Err(format!("{} must be a string", rule.label).into()),
    };

    if value.is_empty() {
        return match (rule.presence, rule.kind) {
            (Presence::Required, _) => Err(format!("{} is required", rule.label).into()),
            (Presence::Optional, FieldKind::Date) => Ok(format_timestamp(ctx.now)),
            (Presence::Optional, _) => Ok(String::new()),
        };
    }

    if rule.kind.is_single_line() && value.contains(['\r', '\n']) {
        return Err(format!("{} must not contain line breaks", rule.label).into());
    }

    // Email bounds are part of the address check and share its message.
    let len = value.chars().count();
    if rule.kind != FieldKind::Email && (len < rule.min_len || len > rule.max_len) {
        return Err(length_message(rule).into());
    }

    match rule.kind {
        FieldKind::Name | FieldKind::FreeText => Ok(value.to_string()),
        FieldKind::Email => check_email(value).map_err(Into::into),
        FieldKind::Phone => check_phone(rule, value).map_err(Into::into),
        FieldKind::Url { domain } => check_url(rule, value, domain).map_err(Into::into),
        FieldKind::Choice(allowed) => {
            if allowed.contains(&value) {
                Ok(value.to_string())
            } else {
                Err(format!("{} must be one of: {}", rule.label, allowed.join(", ")).into())
            }
        }
        FieldKind::Date => parse_date(value)
            .map(format_timestamp)
            .ok_or_else(|| format!("{} must be a valid date", rule.label).into()),
        FieldKind::JobTitle => match ctx.open_positions {
            Some(open) if !open.is_empty() && !open.iter().any(|t| t.trim() == value) => Err(
                "This position is no longer accepting applications"
                    .to_string()
                    .into(),
            ),
            _ => Ok(value.to_string()),
        },
        FieldKind::Honeypot => Ok(String::new()),
    }
}

fn length_message(rule: &FieldRule) -> String {
    if rule.min_len <= 1 {
        format!("{} must be at most {} characters", rule.label, rule.max_len)
    } else {
        format!(
            "{} must be between {} and {} characters",
            rule.label, rule.min_len, rule.max_len
        )
    }
}

fn check_email(value: &str) -> Result<String, String> {
    let email = value.to_lowercase();
    let len = email.chars().count();
    if !(EMAIL_MIN_LEN..=EMAIL_MAX_LEN).contains(&len)
        || email.contains("..")
        || !EMAIL_REGEX.is_match(&email)
    {
        return Err("Please provide a valid email address".to_string());
    }
    Ok(email)
}

fn check_phone(rule: &FieldRule, value: &str) -> Result<String, String> {
    let allowed = |c: char| c.is_ascii_digit() || c.is_whitespace() || "+-()".contains(c);
    if !value.chars().all(allowed) {
        return Err(format!("{} contains invalid characters", rule.label));
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(format!("{} must contain digits", rule.label));
    }
    Ok(value.to_string())
}

fn check_url(rule: &FieldRule, value: &str, domain: Option<&str>) -> Result<String, String> {
    let invalid = || format!("{} must be a valid http(s) URL", rule.label);

    let url = url::Url::parse(value).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    let host = url.host_str().ok_or_else(invalid)?.to_ascii_lowercase();

    if let Some(domain) = domain {
        let on_domain = host == domain || host.ends_with(&format!(".{}", domain));
        if !on_domain {
            return Err(format!("{} must be a {} address", rule.label, domain));
        }
    }
    Ok(value.to_string())
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS` and plain dates (UTC).
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
