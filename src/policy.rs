//! Role-based access policy
//!
//! Every guarded operation is a `(Resource, Action)` pair evaluated against a
//! fixed role matrix. Record-level rules (a technician's own refurbishments,
//! fields a role may not edit) live in the services.

use crate::models::enums::Role;

/// Record types guarded by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Institution,
    User,
    Donation,
    Equipment,
    Assignment,
    Refurbishment,
    Support,
    /// Admin dashboard counters
    Dashboard,
}

/// Operations on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Create, Action::Read, Action::Update, Action::Delete];
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Institution,
        Resource::User,
        Resource::Donation,
        Resource::Equipment,
        Resource::Assignment,
        Resource::Refurbishment,
        Resource::Support,
        Resource::Dashboard,
    ];
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::Institution => "institutions",
            Resource::User => "users",
            Resource::Donation => "donations",
            Resource::Equipment => "equipment",
            Resource::Assignment => "assignments",
            Resource::Refurbishment => "refurbishments",
            Resource::Support => "support tickets",
            Resource::Dashboard => "the dashboard",
        };
        f.write_str(name)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

const CRUD: &[Action] = &Action::ALL;
const NO_DELETE: &[Action] = &[Action::Create, Action::Read, Action::Update];
const READ_ONLY: &[Action] = &[Action::Read];
const NONE: &[Action] = &[];

/// Actions a role may perform on a resource
pub fn permitted(role: Role, resource: Resource) -> &'static [Action] {
    match (role, resource) {
        (Role::Admin, Resource::Dashboard) => READ_ONLY,
        (Role::Admin, _) => CRUD,

        (Role::Technician, Resource::Equipment)
        | (Role::Technician, Resource::Refurbishment)
        | (Role::Technician, Resource::Support) => CRUD,
        (Role::Technician, _) => NONE,

        (Role::Volunteer, Resource::Donation) => NO_DELETE,
        (Role::Volunteer, _) => NONE,
    }
}

/// Evaluate the policy; accounts without a recognized role are always denied
pub fn allows(role: Option<Role>, resource: Resource, action: Action) -> bool {
    role.map(|r| permitted(r, resource).contains(&action))
        .unwrap_or(false)
}

/// Landing route for a role after login
pub fn landing_route(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::Technician) => "/api/v1/refurbishments",
        Some(Role::Volunteer) => "/api/v1/donations",
        Some(Role::Admin) | None => "/api/v1/dashboard/summary",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_may_do_everything_on_records() {
        for resource in Resource::ALL.iter().filter(|r| **r != Resource::Dashboard) {
            for action in Action::ALL {
                assert!(allows(Some(Role::Admin), *resource, action), "{action} {resource}");
            }
        }
        assert!(allows(Some(Role::Admin), Resource::Dashboard, Action::Read));
    }

    #[test]
    fn volunteer_cannot_delete_donations() {
        assert!(allows(Some(Role::Volunteer), Resource::Donation, Action::Create));
        assert!(allows(Some(Role::Volunteer), Resource::Donation, Action::Update));
        assert!(!allows(Some(Role::Volunteer), Resource::Donation, Action::Delete));
    }

    #[test]
    fn technician_cannot_list_institutions() {
        assert!(!allows(Some(Role::Technician), Resource::Institution, Action::Read));
        assert!(!allows(Some(Role::Technician), Resource::User, Action::Read));
        assert!(!allows(Some(Role::Technician), Resource::Donation, Action::Read));
    }

    #[test]
    fn technician_manages_workshop_records() {
        for resource in [Resource::Equipment, Resource::Refurbishment, Resource::Support] {
            for action in Action::ALL {
                assert!(allows(Some(Role::Technician), resource, action));
            }
        }
    }

    #[test]
    fn volunteer_sees_only_donations() {
        for resource in Resource::ALL.iter().filter(|r| **r != Resource::Donation) {
            for action in Action::ALL {
                assert!(!allows(Some(Role::Volunteer), *resource, action));
            }
        }
    }

    #[test]
    fn missing_role_is_denied_everywhere() {
        for resource in Resource::ALL {
            for action in Action::ALL {
                assert!(!allows(None, resource, action));
            }
        }
    }

    #[test]
    fn landing_routes_follow_role() {
        assert_eq!(landing_route(Some(Role::Technician)), "/api/v1/refurbishments");
        assert_eq!(landing_route(Some(Role::Volunteer)), "/api/v1/donations");
        assert_eq!(landing_route(None), "/api/v1/dashboard/summary");
    }
}
