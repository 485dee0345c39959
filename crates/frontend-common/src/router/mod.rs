//! Client-side routing
//!
//! Owns the route table and the navigation history. Every transition, whether
//! a push, a replace or a step back, is checked by the [`RouteGuard`] before it
//! is committed.

pub mod guard;

pub use guard::{GuardDecision, RouteGuard};

use crate::auth::SessionState;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Named routes of the issue tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Home,
    IssueCreate,
    IssueDetail,
    LabelManager,
    Login,
    Register,
}

impl RouteName {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::IssueCreate => "issue-create",
            Self::IssueDetail => "issue-detail",
            Self::LabelManager => "label-manager",
            Self::Login => "login",
            Self::Register => "register",
        }
    }
}

impl std::fmt::Display for RouteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDef {
    pub name: RouteName,
    /// Path template; `:name` segments capture parameters
    pub path: &'static str,
    pub requires_auth: bool,
}

/// The issue tracker's routes
pub const ROUTES: &[RouteDef] = &[
    RouteDef {
        name: RouteName::Home,
        path: "/",
        requires_auth: false,
    },
    RouteDef {
        name: RouteName::IssueCreate,
        path: "/issues/new",
        requires_auth: true,
    },
    RouteDef {
        name: RouteName::IssueDetail,
        path: "/issues/:id",
        requires_auth: false,
    },
    RouteDef {
        name: RouteName::LabelManager,
        path: "/labels",
        requires_auth: true,
    },
    RouteDef {
        name: RouteName::Login,
        path: "/login",
        requires_auth: false,
    },
    RouteDef {
        name: RouteName::Register,
        path: "/register",
        requires_auth: false,
    },
];

/// A resolved navigation target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: RouteName,
    pub path: String,
    pub params: BTreeMap<String, String>,
    pub requires_auth: bool,
}

/// Navigation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("No route matches {0}")]
    NotFound(String),

    #[error("Route {0} is not registered")]
    UnknownRoute(RouteName),

    #[error("Route {0} needs path parameters")]
    MissingParams(RouteName),
}

/// Something that can move the user to a named route
pub trait Navigator: Send + Sync {
    /// Navigate to `route`, replacing the current history entry
    fn replace_route(&self, route: RouteName);
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Push,
    Replace,
}

/// Route table plus navigation history
#[derive(Debug)]
pub struct Router {
    routes: Vec<RouteDef>,
    guard: RouteGuard,
    history: Mutex<Vec<Location>>,
}

impl Router {
    /// Router over the standard route table
    pub fn new(session: SessionState) -> Self {
        Self::with_routes(ROUTES.to_vec(), session)
    }

    pub fn with_routes(routes: Vec<RouteDef>, session: SessionState) -> Self {
        Self {
            routes,
            guard: RouteGuard::new(session),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Match a path against the route table.
    ///
    /// Static segments win over parameters, so `/issues/new` never resolves
    /// to the issue detail route.
    pub fn resolve(&self, path: &str) -> Result<Location, NavigationError> {
        let clean = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = clean.split('/').filter(|s| !s.is_empty()).collect();

        self.routes
            .iter()
            .filter_map(|route| {
                match_template(route.path, &segments).map(|params| (route, params))
            })
            .min_by_key(|(_, params)| params.len())
            .map(|(route, params)| Location {
                name: route.name,
                path: normalize(&segments),
                params,
                requires_auth: route.requires_auth,
            })
            .ok_or_else(|| NavigationError::NotFound(path.to_string()))
    }

    /// Location of a parameterless named route
    pub fn location_for(&self, name: RouteName) -> Result<Location, NavigationError> {
        let route = self
            .routes
            .iter()
            .find(|route| route.name == name)
            .ok_or(NavigationError::UnknownRoute(name))?;

        if route.path.split('/').any(|s| s.starts_with(':')) {
            return Err(NavigationError::MissingParams(name));
        }

        Ok(Location {
            name,
            path: route.path.to_string(),
            params: BTreeMap::new(),
            requires_auth: route.requires_auth,
        })
    }

    /// Navigate to `path`, adding a history entry
    pub fn push(&self, path: &str) -> Result<Location, NavigationError> {
        let to = self.resolve(path)?;
        self.commit(to, Mode::Push)
    }

    /// Navigate to `path`, replacing the current history entry
    pub fn replace(&self, path: &str) -> Result<Location, NavigationError> {
        let to = self.resolve(path)?;
        self.commit(to, Mode::Replace)
    }

    /// Step back one history entry, as the browser back button does.
    ///
    /// Returns the location that is current afterwards, or `None` when there
    /// is nothing to go back to.
    pub fn back(&self) -> Result<Option<Location>, NavigationError> {
        let mut history = self.history();
        if history.len() < 2 {
            return Ok(None);
        }
        let from = history.pop();
        let Some(to) = history.last().cloned() else {
            return Ok(None);
        };

        let target = match self.guard.evaluate(from.as_ref(), &to) {
            GuardDecision::Allow => to,
            GuardDecision::Redirect(name) => self.location_for(name)?,
        };

        let mut entries = self.lock();
        entries.pop();
        if let Some(last) = entries.last_mut() {
            *last = target.clone();
        }
        Ok(Some(target))
    }

    /// Current location, if any navigation has happened
    pub fn current(&self) -> Option<Location> {
        self.lock().last().cloned()
    }

    /// Snapshot of the history stack, oldest first
    pub fn history(&self) -> Vec<Location> {
        self.lock().clone()
    }

    fn commit(&self, to: Location, mode: Mode) -> Result<Location, NavigationError> {
        let from = self.current();
        // A redirect is final for this transition and is not re-checked.
        let target = match self.guard.evaluate(from.as_ref(), &to) {
            GuardDecision::Allow => to,
            GuardDecision::Redirect(name) => self.location_for(name)?,
        };

        let mut history = self.lock();
        match (mode, history.last_mut()) {
            (Mode::Replace, Some(last)) => *last = target.clone(),
            _ => history.push(target.clone()),
        }
        debug!(route = target.name.as_str(), path = %target.path, ?mode, "Navigation committed");
        Ok(target)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Location>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for Router {
    fn replace_route(&self, route: RouteName) {
        let result = self
            .location_for(route)
            .and_then(|to| self.commit(to, Mode::Replace));
        if let Err(e) = result {
            warn!("Failed to navigate to {route}: {e}");
        }
    }
}

fn match_template(template: &str, segments: &[&str]) -> Option<BTreeMap<String, String>> {
    let parts: Vec<&str> = template.split('/').filter(|s| !s.is_empty()).collect();
    if parts.len() != segments.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (part, segment) in parts.iter().zip(segments) {
        if let Some(name) = part.strip_prefix(':') {
            params.insert(name.to_string(), (*segment).to_string());
        } else if part != segment {
            return None;
        }
    }
    Some(params)
}

fn normalize(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::context::tests::{authenticated_session, sample_user};

    fn paths(router: &Router) -> Vec<String> {
        router.history().into_iter().map(|l| l.path).collect()
    }

    #[test]
    fn test_resolve_prefers_static_segments() {
        let router = Router::new(SessionState::default());

        let create = router.resolve("/issues/new").unwrap();
        assert_eq!(create.name, RouteName::IssueCreate);
        assert!(create.params.is_empty());

        let detail = router.resolve("/issues/42?tab=comments").unwrap();
        assert_eq!(detail.name, RouteName::IssueDetail);
        assert_eq!(detail.params["id"], "42");
        assert_eq!(detail.path, "/issues/42");

        assert_eq!(
            router.resolve("/nowhere"),
            Err(NavigationError::NotFound("/nowhere".into()))
        );
    }

    #[test]
    fn test_push_redirects_anonymous_users_to_login() {
        let router = Router::new(SessionState::default());
        router.push("/").unwrap();

        let landed = router.push("/labels").unwrap();
        assert_eq!(landed.name, RouteName::Login);
        assert_eq!(paths(&router), vec!["/", "/login"]);
    }

    #[test]
    fn test_push_redirects_signed_in_users_home() {
        let router = Router::new(authenticated_session(sample_user(), "token"));
        router.push("/labels").unwrap();

        let landed = router.push("/register").unwrap();
        assert_eq!(landed.name, RouteName::Home);
        assert_eq!(paths(&router), vec!["/labels", "/"]);
    }

    #[test]
    fn test_replace_route_overwrites_current_entry() {
        let router = Router::new(SessionState::default());
        router.push("/").unwrap();
        router.push("/issues/7").unwrap();

        router.replace_route(RouteName::Login);
        assert_eq!(paths(&router), vec!["/", "/login"]);

        // Replacing again with the same target leaves history unchanged
        router.replace_route(RouteName::Login);
        assert_eq!(paths(&router), vec!["/", "/login"]);
    }

    #[test]
    fn test_back_is_guarded() {
        let session = authenticated_session(sample_user(), "token");
        let router = Router::new(session);
        router.push("/labels").unwrap();
        router.push("/issues/1").unwrap();

        let previous = router.back().unwrap().unwrap();
        assert_eq!(previous.name, RouteName::LabelManager);
        assert_eq!(router.back().unwrap(), None);
    }

    #[test]
    fn test_location_for_rejects_parameterized_routes() {
        let router = Router::new(SessionState::default());
        assert_eq!(
            router.location_for(RouteName::IssueDetail),
            Err(NavigationError::MissingParams(RouteName::IssueDetail))
        );
        assert_eq!(router.location_for(RouteName::Home).unwrap().path, "/");

        let empty = Router::with_routes(Vec::new(), SessionState::default());
        assert_eq!(
            empty.location_for(RouteName::Login),
            Err(NavigationError::UnknownRoute(RouteName::Login))
        );
    }
}
