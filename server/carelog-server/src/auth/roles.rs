use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Actor role carried by every identity token.
///
/// - `Clinic`: a doctor's practice; owns patients and writes clinical notes
/// - `Corporate`: an organization consuming redacted reporting views
/// - `Individual`: a patient reading their own record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Clinic,
    Corporate,
    Individual,
}

impl Role {
    /// Wire-level role string, as stored on the account row
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Clinic => "CLINIC",
            Role::Corporate => "CORPORATE",
            Role::Individual => "INDIVIDUAL",
        }
    }

    /// Parse the wire-level role string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CLINIC" => Some(Role::Clinic),
            "CORPORATE" => Some(Role::Corporate),
            "INDIVIDUAL" => Some(Role::Individual),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route allow-lists. Declared once so a route's permitted roles are visible
/// at the registration site.
pub const CLINIC_ONLY: &[Role] = &[Role::Clinic];
pub const CLINIC_OR_CORPORATE: &[Role] = &[Role::Clinic, Role::Corporate];
pub const INDIVIDUAL_ONLY: &[Role] = &[Role::Individual];

/// Membership test for the authorization gate. Pure on purpose: the gate
/// must enforce exactly this predicate and nothing else.
pub fn role_allowed(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_is_allowed() {
        assert!(role_allowed(Role::Clinic, CLINIC_ONLY));
        assert!(role_allowed(Role::Corporate, CLINIC_OR_CORPORATE));
        assert!(role_allowed(Role::Individual, INDIVIDUAL_ONLY));
    }

    #[test]
    fn test_non_member_is_rejected() {
        assert!(!role_allowed(Role::Individual, CLINIC_ONLY));
        assert!(!role_allowed(Role::Corporate, CLINIC_ONLY));
        assert!(!role_allowed(Role::Clinic, INDIVIDUAL_ONLY));
    }

    #[test]
    fn test_empty_list_rejects_everyone() {
        assert!(!role_allowed(Role::Clinic, &[]));
        assert!(!role_allowed(Role::Corporate, &[]));
        assert!(!role_allowed(Role::Individual, &[]));
    }

    #[test]
    fn test_wire_format_round_trip() {
        for role in [Role::Clinic, Role::Corporate, Role::Individual] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("ADMIN"), None);
    }

    #[test]
    fn test_serde_uses_uppercase() {
        let json = serde_json::to_string(&Role::Clinic).unwrap();
        assert_eq!(json, "\"CLINIC\"");

        let role: Role = serde_json::from_str("\"INDIVIDUAL\"").unwrap();
        assert_eq!(role, Role::Individual);
    }
}
