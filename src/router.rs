// src/router.rs
// Client route table and the authentication guard

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::ClientError;
use crate::stores::AuthStore;

/// Named client routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteName {
    Root,
    Logs,
    UserProfile,
    ApiTokenNew,
    Sources,
    Connections,
    ConnectionNew,
    Connection,
    ConnectionEdit,
    Explore,
    SourceNew,
    Source,
    SourceEdit,
    RbacGroupNew,
    Rbac,
    RbacGroup,
    RbacGroupEdit,
    RbacGroups,
    Login,
    RbacUsers,
    RbacUserNew,
    RbacRoles,
}

/// Every route with its path pattern. `:name` segments capture a parameter.
pub const ROUTES: &[(RouteName, &str)] = &[
    (RouteName::Root, "/"),
    (RouteName::Logs, "/logs"),
    (RouteName::UserProfile, "/profile"),
    (RouteName::ApiTokenNew, "/profile/new_api_token"),
    (RouteName::Sources, "/sources"),
    (RouteName::Connections, "/connections"),
    (RouteName::ConnectionNew, "/connections/new"),
    (RouteName::Connection, "/connections/:connectionId"),
    (RouteName::ConnectionEdit, "/connections/:connectionId/edit"),
    (RouteName::Explore, "/sources/:sourceSlug/explore"),
    (RouteName::SourceNew, "/sources/new"),
    (RouteName::Source, "/sources/:sourceSlug"),
    (RouteName::SourceEdit, "/sources/:sourceSlug/edit"),
    (RouteName::RbacGroupNew, "/rbac/groups/new"),
    (RouteName::Rbac, "/rbac"),
    (RouteName::RbacGroup, "/rbac/groups/:groupId"),
    (RouteName::RbacGroupEdit, "/rbac/groups/:groupId/edit"),
    (RouteName::RbacGroups, "/rbac/groups"),
    (RouteName::Login, "/login"),
    (RouteName::RbacUsers, "/rbac/users"),
    (RouteName::RbacUserNew, "/rbac/users/new"),
    (RouteName::RbacRoles, "/rbac/roles"),
];

impl RouteName {
    /// Name used in the route table, e.g. `rbacGroupEdit`
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteName::Root => "root",
            RouteName::Logs => "logs",
            RouteName::UserProfile => "userProfile",
            RouteName::ApiTokenNew => "apiTokenNew",
            RouteName::Sources => "sources",
            RouteName::Connections => "connections",
            RouteName::ConnectionNew => "connectionNew",
            RouteName::Connection => "connection",
            RouteName::ConnectionEdit => "connectionEdit",
            RouteName::Explore => "explore",
            RouteName::SourceNew => "sourceNew",
            RouteName::Source => "source",
            RouteName::SourceEdit => "sourceEdit",
            RouteName::RbacGroupNew => "rbacGroupNew",
            RouteName::Rbac => "rbac",
            RouteName::RbacGroup => "rbacGroup",
            RouteName::RbacGroupEdit => "rbacGroupEdit",
            RouteName::RbacGroups => "rbacGroups",
            RouteName::Login => "login",
            RouteName::RbacUsers => "rbacUsers",
            RouteName::RbacUserNew => "rbacUserNew",
            RouteName::RbacRoles => "rbacRoles",
        }
    }

    pub fn pattern(&self) -> &'static str {
        ROUTES
            .iter()
            .find(|(name, _)| name == self)
            .map(|(_, pattern)| *pattern)
            .unwrap_or("/")
    }

    /// Fill the pattern's parameters. Missing parameters are an error.
    pub fn path(&self, params: &BTreeMap<String, String>) -> Result<String, ClientError> {
        let mut out = String::new();
        for segment in split_path(self.pattern()) {
            out.push('/');
            match segment.strip_prefix(':') {
                Some(param) => {
                    let value = params
                        .get(param)
                        .ok_or_else(|| ClientError::InvalidInput(format!("missing route parameter '{}'", param)))?;
                    out.push_str(value);
                }
                None => out.push_str(segment),
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        Ok(out)
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteName {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ROUTES
            .iter()
            .map(|(name, _)| *name)
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ClientError::InvalidInput(format!("unknown route '{}'", s)))
    }
}

/// A resolved path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub name: RouteName,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Outcome of a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(RouteName),
    NotFound,
}

/// Path resolution over [`ROUTES`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Router;

impl Router {
    pub fn new() -> Self {
        Self
    }

    /// Match a path against the table. Query strings, fragments and
    /// trailing slashes are ignored; literal segments beat parameters.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = split_path(path).collect();

        ROUTES
            .iter()
            .filter_map(|(name, pattern)| {
                match_pattern(pattern, &segments).map(|(params, literals)| (literals, *name, params))
            })
            .max_by_key(|(literals, _, _)| *literals)
            .map(|(_, name, params)| RouteMatch { name, params })
    }

    /// Authentication guard run before every navigation.
    ///
    /// Runs the login check first if it has never run. Anonymous users go
    /// to the login page; logged in users are sent away from it.
    pub async fn guard(&self, auth: &mut AuthStore, to: &RouteMatch) -> Navigation {
        if !auth.is_checked() {
            auth.login().await;
        }

        let logged_in = auth.logged_in();
        let decision = match (logged_in, to.name) {
            (false, RouteName::Login) => Navigation::Proceed,
            (false, _) => Navigation::Redirect(RouteName::Login),
            (true, RouteName::Login) => Navigation::Redirect(RouteName::Root),
            (true, _) => Navigation::Proceed,
        };
        debug!(route = %to.name, logged_in, decision = ?decision, "Navigation guard");
        decision
    }

    /// Resolve `path` and run the guard
    pub async fn navigate(&self, auth: &mut AuthStore, path: &str) -> Navigation {
        match self.resolve(path) {
            Some(to) => self.guard(auth, &to).await,
            None => {
                debug!(path, "No route matches");
                Navigation::NotFound
            }
        }
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Captured parameters and the number of literal segments matched
fn match_pattern(pattern: &str, segments: &[&str]) -> Option<(BTreeMap<String, String>, usize)> {
    let parts: Vec<&str> = split_path(pattern).collect();
    if parts.len() != segments.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    let mut literals = 0;
    for (part, segment) in parts.iter().zip(segments) {
        match part.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), segment.to_string());
            }
            None if part == segment => literals += 1,
            None => return None,
        }
    }
    Some((params, literals))
}
