//! Role checks shared by the submission and review paths.
//!
//! Every operation names its own allowed roles; there is no hierarchy, so `ADMIN` only passes
//! where it is listed explicitly.

use super::domain::Role;

pub const SUBMIT_REPORT: &[Role] = &[Role::Inspector, Role::Admin];
pub const DECIDE_REPORT: &[Role] = &[Role::Admin];
pub const VIEW_STATS: &[Role] = &[Role::Admin, Role::Manager, Role::HotelManager];
pub const LIST_REPORTS: &[Role] = &Role::ALL;

/// Raised when a caller's role is outside an operation's allowed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("role {actual} is not permitted (requires one of: {})", render_roles(.allowed))]
pub struct AccessDenied {
    pub actual: Role,
    pub allowed: Vec<Role>,
}

fn render_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|role| role.label())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn require(actual: Role, allowed: &[Role]) -> Result<(), AccessDenied> {
    if allowed.contains(&actual) {
        Ok(())
    } else {
        Err(AccessDenied {
            actual,
            allowed: allowed.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_roles_pass() {
        assert!(require(Role::Inspector, SUBMIT_REPORT).is_ok());
        assert!(require(Role::Admin, SUBMIT_REPORT).is_ok());
        assert!(require(Role::HotelManager, VIEW_STATS).is_ok());
        for role in Role::ALL {
            assert!(require(role, LIST_REPORTS).is_ok());
        }
    }

    #[test]
    fn admin_is_not_implied() {
        let denied = require(Role::Admin, &[Role::Inspector]).expect_err("admin not listed");
        assert_eq!(denied.actual, Role::Admin);
        assert_eq!(denied.allowed, vec![Role::Inspector]);
    }

    #[test]
    fn denial_message_names_the_allowed_roles() {
        let denied = require(Role::Manager, DECIDE_REPORT).expect_err("manager cannot decide");
        assert_eq!(
            denied.to_string(),
            "role MANAGER is not permitted (requires one of: ADMIN)"
        );
    }
}
