//! The three public forms and their per-route settings.

use crate::config::{LimitsConfig, RouteLimit};
use crate::validation::rules::{APPLICATION_FORM, CONTACT_FORM, PRE_MEETING_FORM};
use crate::validation::FieldRule;

/// A form endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Contact,
    Application,
    PreMeeting,
}

impl FormKind {
    pub const ALL: [FormKind; 3] = [Self::Contact, Self::Application, Self::PreMeeting];

    /// Key used for rate limiting, metrics and audit events.
    pub fn route_key(&self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Application => "apply",
            Self::PreMeeting => "pre_meeting",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::Contact => "/api/contact",
            Self::Application => "/api/apply",
            Self::PreMeeting => "/api/pre-meeting",
        }
    }

    pub fn rules(&self) -> &'static [FieldRule] {
        match self {
            Self::Contact => CONTACT_FORM,
            Self::Application => APPLICATION_FORM,
            Self::PreMeeting => PRE_MEETING_FORM,
        }
    }

    pub fn limit<'a>(&self, limits: &'a LimitsConfig) -> &'a RouteLimit {
        match self {
            Self::Contact => &limits.contact,
            Self::Application => &limits.apply,
            Self::PreMeeting => &limits.pre_meeting,
        }
    }

    /// Whether the submitter gets an automatic confirmation.
    pub fn sends_confirmation(&self) -> bool {
        matches!(self, Self::Application)
    }

    pub fn accepts_resume(&self) -> bool {
        matches!(self, Self::Application)
    }

    /// Whether the job title is checked against open positions.
    pub fn checks_open_positions(&self) -> bool {
        matches!(self, Self::Application)
    }

    /// Field holding the submitter's name.
    pub fn name_field(&self) -> &'static str {
        match self {
            Self::Application => "fullName",
            Self::Contact | Self::PreMeeting => "name",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Contact => "Message sent successfully",
            Self::Application => "Application submitted successfully",
            Self::PreMeeting => "Notification sent successfully",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_per_route() {
        let limits = LimitsConfig::default();
        assert_eq!(FormKind::Application.limit(&limits).max_requests, 3);
        assert_eq!(FormKind::Application.limit(&limits).window_secs, 3600);
        assert_eq!(FormKind::Contact.limit(&limits).max_requests, 5);
        assert_eq!(FormKind::PreMeeting.limit(&limits).window_secs, 60);
    }

    #[test]
    fn test_only_applications_confirm() {
        for form in FormKind::ALL {
            assert_eq!(form.sends_confirmation(), form == FormKind::Application);
        }
    }

    #[test]
    fn test_name_field_in_rules() {
        for form in FormKind::ALL {
            assert!(form.rules().iter().any(|r| r.name == form.name_field()));
        }
    }
}
