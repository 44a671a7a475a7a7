//! Message composition.
//!
//! # Responsibilities
//! - Escape every user-supplied value before it reaches HTML
//! - Build the internal notification (always) and the submitter
//!   confirmation (only for forms that send one)
//! - Attach a validated resume to the internal notification
//!
//! # Design Decisions
//! - Subjects are plain text; single-line fields already reject CR/LF
//! - Empty optional fields are left out of the notification table

use crate::mail::{Attachment, OutboundMessage};
use crate::submission::forms::FormKind;
use crate::submission::templates::{self, Row};
use crate::validation::{FieldKind, SanitizedRecord, ValidatedFile};

/// Escape `& < > " ' /` as HTML entities.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped text with line breaks kept visible.
fn escape_multiline(input: &str) -> String {
    escape_html(input).replace("\r\n", "\n").replace('\n', "<br>")
}

/// Messages produced for one accepted submission.
#[derive(Debug, Clone)]
pub struct ComposedMessages {
    pub notification: OutboundMessage,
    pub confirmation: Option<OutboundMessage>,
}

/// Builds outbound messages with the fixed sender and operator address.
#[derive(Debug, Clone)]
pub struct MessageComposer {
    from: String,
    operator: String,
}

impl MessageComposer {
    pub fn new(from: impl Into<String>, operator: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            operator: operator.into(),
        }
    }

    pub fn compose(
        &self,
        form: FormKind,
        record: &SanitizedRecord,
        resume: Option<&ValidatedFile>,
    ) -> ComposedMessages {
        let name = record.text(form.name_field());
        let email = record.text("email");

        let rows: Vec<Row<'_>> = form
            .rules()
            .iter()
            .filter(|rule| rule.kind != FieldKind::Honeypot)
            .filter_map(|rule| {
                let value = record.get(rule.name).filter(|v| !v.is_empty())?;
                let value = match rule.kind {
                    FieldKind::FreeText => escape_multiline(value),
                    _ => escape_html(value),
                };
                Some(Row {
                    label: rule.label,
                    value,
                })
            })
            .chain(resume.map(|file| Row {
                label: "Resume",
                value: format!(
                    "{} ({}, {} bytes)",
                    escape_html(&file.filename),
                    file.kind.extension().to_uppercase(),
                    file.size
                ),
            }))
            .collect();

        let (subject, heading) = match form {
            FormKind::Contact => (
                format!("New contact form submission from {name}"),
                "New contact form submission".to_string(),
            ),
            FormKind::Application => {
                let title = record.text("jobTitle");
                (
                    format!("New application: {title} - {name}"),
                    format!("New application for {}", escape_html(title)),
                )
            }
            FormKind::PreMeeting => (
                format!("Pre-meeting notes from {name}"),
                "New pre-meeting notification".to_string(),
            ),
        };

        let footer = format!("Submitted via {}", escape_html(form.path()));
        let notification = OutboundMessage {
            from: self.from.clone(),
            to: vec![self.operator.clone()],
            reply_to: Some(email.to_string()).filter(|e| !e.is_empty()),
            subject,
            html: templates::notification(&heading, &rows, &footer),
            attachments: resume
                .map(|file| Attachment {
                    filename: file.filename.clone(),
                    content: file.content.clone(),
                })
                .into_iter()
                .collect(),
        };

        let confirmation = form.sends_confirmation().then(|| {
            let title = record.text("jobTitle");
            OutboundMessage {
                from: self.from.clone(),
                to: vec![email.to_string()],
                reply_to: None,
                subject: format!("We received your application for {title}"),
                html: templates::application_confirmation(
                    &escape_html(name),
                    &escape_html(title),
                ),
                attachments: Vec::new(),
            }
        });

        ComposedMessages {
            notification,
            confirmation,
        }
    }
}
