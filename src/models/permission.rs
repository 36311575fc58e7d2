//! Per-action access rules, kept as a lookup table

use crate::error::AppError;

use super::user::Caller;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Books,
    Borrows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

/// Minimum caller standing needed for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Anyone,
    Authenticated,
    Admin,
}

const POLICY: &[(Resource, Action, Requirement)] = &[
    (Resource::Books, Action::List, Requirement::Anyone),
    (Resource::Books, Action::Retrieve, Requirement::Anyone),
    (Resource::Books, Action::Create, Requirement::Admin),
    (Resource::Books, Action::Update, Requirement::Admin),
    (Resource::Books, Action::Delete, Requirement::Admin),
    (Resource::Borrows, Action::List, Requirement::Authenticated),
    (Resource::Borrows, Action::Retrieve, Requirement::Authenticated),
    (Resource::Borrows, Action::Create, Requirement::Authenticated),
    (Resource::Borrows, Action::Update, Requirement::Admin),
    (Resource::Borrows, Action::Delete, Requirement::Admin),
];

pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const NOT_PERMITTED: &str = "You do not have permission to perform this action.";

/// Requirement for an action. Pairs missing from the table fall back to `Admin`.
pub fn requirement(resource: Resource, action: Action) -> Requirement {
    POLICY
        .iter()
        .find(|(r, a, _)| *r == resource && *a == action)
        .map(|(_, _, req)| *req)
        .unwrap_or(Requirement::Admin)
}

impl Requirement {
    pub fn check(self, caller: &Caller) -> Result<(), AppError> {
        match self {
            Requirement::Anyone => Ok(()),
            Requirement::Authenticated | Requirement::Admin if !caller.is_authenticated() => {
                Err(AppError::Authorization(NOT_AUTHENTICATED.to_string()))
            }
            Requirement::Authenticated => Ok(()),
            Requirement::Admin if caller.is_admin() => Ok(()),
            Requirement::Admin => Err(AppError::Authorization(NOT_PERMITTED.to_string())),
        }
    }
}

impl Caller {
    /// Check the caller against the policy table
    pub fn authorize(&self, resource: Resource, action: Action) -> Result<(), AppError> {
        let result = requirement(resource, action).check(self);
        if result.is_err() {
            let account = self.claims().map(|c| c.account_type.as_str()).unwrap_or("anonymous");
            tracing::debug!(?resource, ?action, account, "permission denied");
        }
        result
    }
}
