//! Rule tables for each form.

use crate::validation::fields::{FieldKind, FieldRule, Presence, EMAIL_MAX_LEN, EMAIL_MIN_LEN};

/// Allowed answers for the experience bucket.
pub const EXPERIENCE_BUCKETS: &[&str] = &["0-1", "1-3", "3-5", "5-10", "10+"];

/// Allowed answers for relocation willingness.
pub const RELOCATION_ANSWERS: &[&str] = &["yes", "no", "maybe"];

/// Hidden field filled in only by bots.
pub const HONEYPOT_FIELD: &str = "website";

const MAX_TEXT: usize = 5000;

const fn rule(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    presence: Presence,
    min_len: usize,
    max_len: usize,
) -> FieldRule {
    FieldRule {
        name,
        label,
        kind,
        presence,
        min_len,
        max_len,
    }
}

const EMAIL: FieldRule = rule(
    "email",
    "Email",
    FieldKind::Email,
    Presence::Required,
    EMAIL_MIN_LEN,
    EMAIL_MAX_LEN,
);

const HONEYPOT: FieldRule = rule(
    HONEYPOT_FIELD,
    "Website",
    FieldKind::Honeypot,
    Presence::Optional,
    0,
    0,
);

/// Contact form.
pub const CONTACT_FORM: &[FieldRule] = &[
    rule("name", "Name", FieldKind::Name, Presence::Required, 2, 100),
    EMAIL,
    rule("phone", "Phone number", FieldKind::Phone, Presence::Optional, 1, 30),
    rule("company", "Company", FieldKind::Name, Presence::Optional, 1, 100),
    rule("message", "Message", FieldKind::FreeText, Presence::Required, 1, MAX_TEXT),
    rule("submittedAt", "Submission date", FieldKind::Date, Presence::Optional, 1, 64),
    HONEYPOT,
];

/// Job application form. The resume is checked separately.
pub const APPLICATION_FORM: &[FieldRule] = &[
    rule("fullName", "Full name", FieldKind::Name, Presence::Required, 2, 100),
    EMAIL,
    rule("phone", "Phone number", FieldKind::Phone, Presence::Required, 7, 30),
    rule("location", "Location", FieldKind::Name, Presence::Optional, 1, 100),
    rule(
        "linkedinUrl",
        "LinkedIn URL",
        FieldKind::Url {
            domain: Some("linkedin.com"),
        },
        Presence::Optional,
        1,
        500,
    ),
    rule(
        "portfolioUrl",
        "Portfolio URL",
        FieldKind::Url { domain: None },
        Presence::Optional,
        1,
        500,
    ),
    rule(
        "yearsOfExperience",
        "Years of experience",
        FieldKind::Choice(EXPERIENCE_BUCKETS),
        Presence::Optional,
        1,
        10,
    ),
    rule(
        "willingToRelocate",
        "Relocation preference",
        FieldKind::Choice(RELOCATION_ANSWERS),
        Presence::Optional,
        1,
        10,
    ),
    rule("coverLetter", "Cover letter", FieldKind::FreeText, Presence::Required, 1, MAX_TEXT),
    rule("jobTitle", "Job title", FieldKind::JobTitle, Presence::Required, 2, 200),
    rule("submittedAt", "Submission date", FieldKind::Date, Presence::Optional, 1, 64),
];

/// Pre-meeting notification form.
pub const PRE_MEETING_FORM: &[FieldRule] = &[
    rule("name", "Name", FieldKind::Name, Presence::Required, 2, 100),
    EMAIL,
    rule("company", "Company", FieldKind::Name, Presence::Optional, 1, 100),
    rule("phone", "Phone number", FieldKind::Phone, Presence::Optional, 1, 30),
    rule("meetingDate", "Meeting date", FieldKind::Date, Presence::Optional, 1, 64),
    rule("topics", "Topics", FieldKind::FreeText, Presence::Optional, 1, MAX_TEXT),
    HONEYPOT,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_names_unique() {
        for form in [CONTACT_FORM, APPLICATION_FORM, PRE_MEETING_FORM] {
            let names: HashSet<_> = form.iter().map(|r| r.name).collect();
            assert_eq!(names.len(), form.len());
        }
    }

    #[test]
    fn test_bounds_are_sane() {
        for form in [CONTACT_FORM, APPLICATION_FORM, PRE_MEETING_FORM] {
            for r in form.iter().filter(|r| r.kind != FieldKind::Honeypot) {
                assert!(r.min_len >= 1 && r.min_len <= r.max_len, "{}", r.name);
            }
        }
    }
}
