use chrono::NaiveDate;
use fv_api_types::ApiLead;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Position of a lead in the six-step admission pipeline.
///
/// Variants are declared in pipeline order, so `Ord` follows progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Enquiry,
    Counselling,
    #[serde(rename = "Free Batch")]
    FreeBatch,
    #[serde(rename = "Lead Conversion")]
    LeadConversion,
    #[serde(rename = "Paid Batch")]
    PaidBatch,
    Admission,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Enquiry,
        Stage::Counselling,
        Stage::FreeBatch,
        Stage::LeadConversion,
        Stage::PaidBatch,
        Stage::Admission,
    ];

    /// Wire / display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Enquiry => "Enquiry",
            Stage::Counselling => "Counselling",
            Stage::FreeBatch => "Free Batch",
            Stage::LeadConversion => "Lead Conversion",
            Stage::PaidBatch => "Paid Batch",
            Stage::Admission => "Admission",
        }
    }

    /// Exact match on the wire label. Anything else is `None`.
    pub fn parse(value: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Zero-based lane index.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Option<Stage> {
        Stage::ALL.get(self.index() + 1).copied()
    }

    /// Stages from Lead Conversion onwards count as converted.
    pub fn is_converted(&self) -> bool {
        *self >= Stage::LeadConversion
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Lead attribute enums
// ---------------------------------------------------------------------------

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn parse(value: &str) -> Option<$name> {
                Self::ALL.iter().copied().find(|v| v.as_str() == value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

labelled_enum!(
    /// Where the enquiry came from.
    LeadSource {
        WalkIn => "Walk-in",
        Facebook => "Facebook",
        Google => "Google",
        Instagram => "Instagram",
        Referral => "Referral",
        Other => "Other",
    }
);

labelled_enum!(
    CourseCategory {
        Basic => "Basic",
        Advanced => "Advanced",
        BasicAdvanced => "Basic+Advanced",
        Advisory => "Advisory",
    }
);

labelled_enum!(
    /// Free or paid instructional cohort.
    BatchType {
        Free => "Free",
        Paid => "Paid",
    }
);

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Staff,
    Telecaller,
    Counselor,
    Student,
}

impl UserRole {
    /// Case-insensitive; accepts the British spelling of counsellor too.
    pub fn parse(value: &str) -> Option<UserRole> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "staff" => Some(UserRole::Staff),
            "telecaller" => Some(UserRole::Telecaller),
            "counselor" | "counsellor" => Some(UserRole::Counselor),
            "student" => Some(UserRole::Student),
            _ => None,
        }
    }

    pub fn is_staff_like(&self) -> bool {
        matches!(self, UserRole::Staff | UserRole::Telecaller | UserRole::Counselor)
    }
}

// ---------------------------------------------------------------------------
// Typed views over ApiLead
// ---------------------------------------------------------------------------

/// Typed accessors over the string fields of a wire lead.
pub trait LeadView {
    fn stage(&self) -> Option<Stage>;
    fn source(&self) -> Option<LeadSource>;
    fn batch(&self) -> Option<BatchType>;
    fn follow_up_day(&self) -> Option<NaiveDate>;
    /// Converted flag set by the server, or a stage at/after Lead Conversion.
    fn is_converted(&self) -> bool;
}

impl LeadView for ApiLead {
    fn stage(&self) -> Option<Stage> {
        Stage::parse(&self.stage)
    }

    fn source(&self) -> Option<LeadSource> {
        LeadSource::parse(&self.lead_source)
    }

    fn batch(&self) -> Option<BatchType> {
        BatchType::parse(&self.batch_type)
    }

    fn follow_up_day(&self) -> Option<NaiveDate> {
        let raw = self.follow_up_date.as_deref()?;
        // Accept both "2026-10-20" and "2026-10-20T00:00:00.000Z".
        let date_part = raw.get(..10)?;
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    fn is_converted(&self) -> bool {
        self.converted || self.stage().is_some_and(|s| s.is_converted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_is_pipeline_order() {
        assert!(Stage::Enquiry < Stage::Counselling);
        assert!(Stage::PaidBatch < Stage::Admission);
        assert_eq!(Stage::FreeBatch.index(), 2);
        assert_eq!(Stage::Admission.next(), None);
        assert_eq!(Stage::Enquiry.next(), Some(Stage::Counselling));
    }

    #[test]
    fn stage_parse_is_exact() {
        assert_eq!(Stage::parse("Free Batch"), Some(Stage::FreeBatch));
        assert_eq!(Stage::parse("free batch"), None);
        assert_eq!(Stage::parse("Prospect"), None);
    }

    #[test]
    fn stage_serde_uses_labels() {
        let json = serde_json::to_string(&Stage::LeadConversion).unwrap();
        assert_eq!(json, "\"Lead Conversion\"");
    }

    #[test]
    fn attribute_labels_round_trip() {
        assert_eq!(LeadSource::parse("Walk-in"), Some(LeadSource::WalkIn));
        assert_eq!(CourseCategory::parse("Basic+Advanced"), Some(CourseCategory::BasicAdvanced));
        assert_eq!(BatchType::Paid.as_str(), "Paid");
        assert_eq!(BatchType::parse("Trial"), None);
    }

    #[test]
    fn role_parse_accepts_variants() {
        assert_eq!(UserRole::parse("Counsellor"), Some(UserRole::Counselor));
        assert_eq!(UserRole::parse(" ADMIN "), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("guest"), None);
        assert!(UserRole::Telecaller.is_staff_like());
        assert!(!UserRole::Student.is_staff_like());
    }

    #[test]
    fn follow_up_day_reads_date_prefix() {
        let mut lead = ApiLead {
            follow_up_date: Some("2026-10-20T00:00:00.000Z".into()),
            ..Default::default()
        };
        assert_eq!(lead.follow_up_day(), NaiveDate::from_ymd_opt(2026, 10, 20));
        lead.follow_up_date = Some("soon".into());
        assert_eq!(lead.follow_up_day(), None);
    }

    #[test]
    fn converted_flag_or_stage() {
        let mut lead = ApiLead {
            stage: "Counselling".into(),
            ..Default::default()
        };
        assert!(!lead.is_converted());
        lead.converted = true;
        assert!(lead.is_converted());
        lead.converted = false;
        lead.stage = "Paid Batch".into();
        assert!(lead.is_converted());
    }
}
