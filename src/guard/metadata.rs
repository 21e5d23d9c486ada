//! Route metadata read by the guard.
//!
//! Tags are declared once while the router is assembled, per route (optionally
//! per method) or per controller (a path prefix). For each tag the route-level
//! value overrides the controller-level one.

use std::collections::HashMap;

use axum::http::Method;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub public: Option<bool>,
    pub optional: Option<bool>,
    pub roles: Option<Vec<String>>,
}

impl RouteMeta {
    /// Anyone may call the route; the session is still resolved.
    pub fn public() -> Self {
        Self {
            public: Some(true),
            ..Self::default()
        }
    }

    /// Anonymous callers are let through with an empty session.
    pub fn optional() -> Self {
        Self {
            optional: Some(true),
            ..Self::default()
        }
    }

    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_roles(roles)
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_public(&self) -> bool {
        self.public.unwrap_or(false)
    }

    pub fn is_optional(&self) -> bool {
        self.optional.unwrap_or(false)
    }

    /// Required roles, if any. An empty list counts as none.
    pub fn required_roles(&self) -> Option<&[String]> {
        self.roles.as_deref().filter(|r| !r.is_empty())
    }

    /// Per tag: `self` if set, otherwise `fallback`.
    pub fn or(&self, fallback: &RouteMeta) -> RouteMeta {
        RouteMeta {
            public: self.public.or(fallback.public),
            optional: self.optional.or(fallback.optional),
            roles: self.roles.clone().or_else(|| fallback.roles.clone()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    routes: HashMap<String, RouteMeta>,
    handlers: HashMap<(Method, String), RouteMeta>,
    controllers: Vec<(String, RouteMeta)>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag every method of a route. `path` is the axum route pattern
    /// (`/users/{id}`), as reported by `MatchedPath`.
    pub fn route(mut self, path: impl Into<String>, meta: RouteMeta) -> Self {
        self.routes.insert(path.into(), meta);
        self
    }

    /// Tag one method of a route.
    pub fn handler(mut self, method: Method, path: impl Into<String>, meta: RouteMeta) -> Self {
        self.handlers.insert((method, path.into()), meta);
        self
    }

    /// Tag every route under `prefix`.
    pub fn controller(mut self, prefix: impl Into<String>, meta: RouteMeta) -> Self {
        let prefix = prefix.into().trim_end_matches('/').to_string();
        self.controllers.push((prefix, meta));
        self
    }

    pub fn lookup(&self, method: &Method, path: &str) -> RouteMeta {
        let route = self
            .handlers
            .get(&(method.clone(), path.to_string()))
            .or_else(|| self.routes.get(path))
            .cloned()
            .unwrap_or_default();

        match self.controller_for(path) {
            Some(controller) => route.or(controller),
            None => route,
        }
    }

    // longest matching prefix, on segment boundaries
    fn controller_for(&self, path: &str) -> Option<&RouteMeta> {
        self.controllers
            .iter()
            .filter(|(prefix, _)| is_under(path, prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, meta)| meta)
    }
}

/// `path` equals `prefix` or continues it with a new segment.
pub(crate) fn is_under(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
