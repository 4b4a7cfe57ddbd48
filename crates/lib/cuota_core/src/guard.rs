//! Role-based navigation decisions.
//!
//! A convenience layer only: the real authorization boundary is enforced
//! server-side. A role mismatch is treated as a navigation mistake and
//! redirects to that role's own landing page, not to an error view.

use crate::models::{Role, Session};

/// What the host should do with a view that requires a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session satisfies the requirement; render the view.
    Render,
    /// No authenticated session; go to the login view.
    RedirectToLogin,
    /// Authenticated under a different role; go to that role's dashboard.
    RedirectToDashboard(Role),
}

/// Decide whether a view requiring `required` may render for `session`.
///
/// An authenticated session whose role claim is unknown is routed to
/// login; there is no dashboard to send it to.
pub fn decide(required: Role, session: &Session) -> RouteDecision {
    if !session.is_authenticated {
        return RouteDecision::RedirectToLogin;
    }
    let actual = session
        .user
        .as_ref()
        .and_then(|user| Role::from_claim(&user.role));
    match actual {
        None => RouteDecision::RedirectToLogin,
        Some(role) if role == required => RouteDecision::Render,
        Some(role) => RouteDecision::RedirectToDashboard(role),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn session_with_role(role: &str) -> Session {
        Session {
            user: Some(User {
                email: "ana@example.com".into(),
                role: role.into(),
            }),
            access_token: Some("a.b.c".into()),
            refresh_token: Some("refresh".into()),
            is_authenticated: true,
            is_loading: false,
        }
    }

    #[test]
    fn unauthenticated_goes_to_login() {
        assert_eq!(
            decide(Role::User, &Session::default()),
            RouteDecision::RedirectToLogin
        );
        assert_eq!(
            decide(Role::Admin, &Session::default()),
            RouteDecision::RedirectToLogin
        );
    }

    #[test]
    fn matching_role_renders() {
        assert_eq!(
            decide(Role::User, &session_with_role("ROLE_USER")),
            RouteDecision::Render
        );
        assert_eq!(
            decide(Role::Admin, &session_with_role("ROLE_ADMIN")),
            RouteDecision::Render
        );
    }

    #[test]
    fn mismatched_role_goes_to_own_dashboard() {
        assert_eq!(
            decide(Role::Admin, &session_with_role("ROLE_USER")),
            RouteDecision::RedirectToDashboard(Role::User)
        );
        assert_eq!(
            decide(Role::User, &session_with_role("ROLE_ADMIN")),
            RouteDecision::RedirectToDashboard(Role::Admin)
        );
    }

    #[test]
    fn unknown_role_goes_to_login() {
        assert_eq!(
            decide(Role::User, &session_with_role("ROLE_AUDITOR")),
            RouteDecision::RedirectToLogin
        );
    }
}
