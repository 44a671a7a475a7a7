//! HTML email bodies.
//!
//! Every function here takes text that is already entity-escaped; none of
//! them escape again.

/// One labelled value in a notification table.
pub struct Row<'a> {
    pub label: &'a str,
    /// Escaped HTML fragment.
    pub value: String,
}

const STYLE: &str = "font-family:Arial,Helvetica,sans-serif;color:#1f2933;line-height:1.5";

/// Internal notification listing every submitted field.
pub fn notification(heading: &str, rows: &[Row<'_>], footer: &str) -> String {
    let mut html = String::with_capacity(512 + rows.len() * 96);
    html.push_str(&format!("<div style=\"{STYLE}\">"));
    html.push_str(&format!("<h2>{heading}</h2>"));
    html.push_str("<table cellpadding=\"6\" style=\"border-collapse:collapse\">");
    for row in rows {
        html.push_str(&format!(
            "<tr><td style=\"font-weight:bold;vertical-align:top\">{}</td><td>{}</td></tr>",
            row.label, row.value
        ));
    }
    html.push_str("</table>");
    html.push_str(&format!("<p style=\"color:#7b8794;font-size:12px\">{footer}</p>"));
    html.push_str("</div>");
    html
}

/// Confirmation sent to an applicant.
pub fn application_confirmation(name: &str, job_title: &str) -> String {
    format!(
        "<div style=\"{STYLE}\">\
         <p>Hi {name},</p>\
         <p>Thank you for applying for the <strong>{job_title}</strong> position. \
         We have received your application and will review it carefully.</p>\
         <p>If your experience matches what we are looking for, we will reach out \
         to schedule a conversation.</p>\
         <p>Best regards,<br>The Hiring Team</p>\
         </div>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_contains_rows() {
        let rows = [Row {
            label: "Name",
            value: "Jane".to_string(),
        }];
        let html = notification("New contact", &rows, "sent at now");
        assert!(html.contains("<h2>New contact</h2>"));
        assert!(html.contains(">Name</td><td>Jane</td>"));
    }
}
