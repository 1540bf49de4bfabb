//! Route groups and their mount table.
//!
//! # Responsibilities
//! - Name the five API groups and their fixed prefixes
//! - Collect the routers supplied by the group handlers
//! - Nest them under their prefixes in a fixed order
//!
//! # Design Decisions
//! - Immutable after construction
//! - Unsupplied groups are not mounted; their paths fall through to 404
//! - The gateway never looks inside a group's router

use axum::Router;

use crate::http::server::AppState;
use crate::routing::matcher::PathPrefixMatcher;

/// One of the mounted API route groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteGroup {
    Auth,
    Users,
    Instructors,
    Classes,
    Youtube,
}

impl RouteGroup {
    /// All groups in mount order.
    pub const ALL: [RouteGroup; 5] = [
        RouteGroup::Auth,
        RouteGroup::Users,
        RouteGroup::Instructors,
        RouteGroup::Classes,
        RouteGroup::Youtube,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            RouteGroup::Auth => "/api/auth",
            RouteGroup::Users => "/api/users",
            RouteGroup::Instructors => "/api/instructores",
            RouteGroup::Classes => "/api/classes",
            RouteGroup::Youtube => "/api/youtube",
        }
    }

    pub fn matcher(&self) -> PathPrefixMatcher {
        PathPrefixMatcher::new(self.prefix())
    }

    /// Group whose prefix covers `path`, if any.
    pub fn resolve(path: &str) -> Option<RouteGroup> {
        Self::ALL.into_iter().find(|g| g.matcher().matches_path(path))
    }
}

/// Routers supplied by the route-group handlers, keyed by group.
#[derive(Default)]
pub struct ApiRoutes {
    mounted: Vec<(RouteGroup, Router<AppState>)>,
}

impl ApiRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `router` under `group`'s prefix, replacing any earlier router.
    pub fn mount(mut self, group: RouteGroup, router: Router<AppState>) -> Self {
        self.mounted.retain(|(g, _)| *g != group);
        self.mounted.push((group, router));
        self
    }

    pub fn is_mounted(&self, group: RouteGroup) -> bool {
        self.mounted.iter().any(|(g, _)| *g == group)
    }

    /// Mounted groups in mount order.
    pub fn groups(&self) -> Vec<RouteGroup> {
        RouteGroup::ALL
            .into_iter()
            .filter(|g| self.is_mounted(*g))
            .collect()
    }

    /// Nest every mounted router under its prefix.
    pub fn into_router(mut self) -> Router<AppState> {
        let mut router = Router::new();
        for group in RouteGroup::ALL {
            if let Some(pos) = self.mounted.iter().position(|(g, _)| *g == group) {
                let (_, group_router) = self.mounted.swap_remove(pos);
                tracing::debug!(prefix = group.prefix(), "Mounting route group");
                router = router.nest(group.prefix(), group_router);
            }
        }
        router
    }
}
