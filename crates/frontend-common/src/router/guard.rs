//! Pre-navigation route guard

use super::{Location, RouteName};
use crate::auth::SessionState;

/// Outcome of evaluating one transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Commit the navigation unchanged
    Allow,
    /// Cancel the navigation and go to this route instead
    Redirect(RouteName),
}

/// Keeps anonymous users out of protected routes and signed-in users out of
/// the login and registration pages.
///
/// The guard only reads the session; it never mutates it and keeps no state of
/// its own between evaluations.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionState,
}

impl RouteGuard {
    pub fn new(session: SessionState) -> Self {
        Self { session }
    }

    /// Decide the transition `from -> to`
    pub fn evaluate(&self, from: Option<&Location>, to: &Location) -> GuardDecision {
        let authenticated = self.session.is_authenticated();

        let decision = if to.requires_auth && !authenticated {
            GuardDecision::Redirect(RouteName::Login)
        } else if matches!(to.name, RouteName::Login | RouteName::Register) && authenticated {
            GuardDecision::Redirect(RouteName::Home)
        } else {
            GuardDecision::Allow
        };

        if let GuardDecision::Redirect(target) = decision {
            debug!(
                from = from.map(|l| l.path.as_str()),
                to = %to.path,
                redirect = target.as_str(),
                "Navigation redirected by guard"
            );
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::context::tests::{authenticated_session, sample_user};
    use std::collections::BTreeMap;

    fn location(name: RouteName, path: &str, requires_auth: bool) -> Location {
        Location {
            name,
            path: path.to_string(),
            params: BTreeMap::new(),
            requires_auth,
        }
    }

    #[test]
    fn test_protected_route_requires_session() {
        let guard = RouteGuard::new(SessionState::default());
        let to = location(RouteName::LabelManager, "/labels", true);
        assert_eq!(
            guard.evaluate(None, &to),
            GuardDecision::Redirect(RouteName::Login)
        );

        let guard = RouteGuard::new(authenticated_session(sample_user(), "token"));
        assert_eq!(guard.evaluate(None, &to), GuardDecision::Allow);
    }

    #[test]
    fn test_signed_in_users_skip_login_and_register() {
        let guard = RouteGuard::new(authenticated_session(sample_user(), "token"));
        let home = location(RouteName::Home, "/", false);

        for to in [
            location(RouteName::Login, "/login", false),
            location(RouteName::Register, "/register", false),
        ] {
            assert_eq!(
                guard.evaluate(Some(&home), &to),
                GuardDecision::Redirect(RouteName::Home)
            );
        }
    }

    #[test]
    fn test_unguarded_routes_never_redirect() {
        let anonymous = RouteGuard::new(SessionState::default());
        let signed_in = RouteGuard::new(authenticated_session(sample_user(), "token"));

        for to in [
            location(RouteName::Home, "/", false),
            location(RouteName::IssueDetail, "/issues/3", false),
        ] {
            assert_eq!(anonymous.evaluate(None, &to), GuardDecision::Allow);
            assert_eq!(signed_in.evaluate(None, &to), GuardDecision::Allow);
        }

        let login = location(RouteName::Login, "/login", false);
        assert_eq!(anonymous.evaluate(None, &login), GuardDecision::Allow);
    }
}
