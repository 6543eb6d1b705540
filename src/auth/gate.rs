//! Route classification and access decisions
//!
//! The gate is a pure function over the request path and the session claims;
//! it never touches the store and never mutates the claim.

use crate::auth::session::SessionClaims;
use crate::models::Role;

/// Protection tier of a route, first matching prefix governs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Admin role required
    AdminOnly,
    /// Leader tier required (admin, pastor, leader)
    LeaderTier,
    /// Any authenticated account
    Authenticated,
    /// No session required
    Public,
}

/// Outcome of a gate evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request through
    Allow,
    /// No session on a protected path; send to sign-in and come back
    RedirectToSignIn {
        /// The originally requested URL, to return to after sign-in
        callback_url: String,
    },
    /// Session present but the role tier is insufficient
    RedirectHome,
}

/// Admin-only path prefixes
const ADMIN_PREFIXES: &[&str] = &["/dashboard", "/notifications"];

/// Leader-tier path prefixes
const LEADER_PREFIXES: &[&str] = &["/members/new", "/groups/new"];

/// Remaining protected creation paths; any signed-in account may use them
const AUTHENTICATED_PREFIXES: &[&str] = &[
    "/events/new",
    "/donations/new",
    "/announcements/new",
    "/attendance/new",
];

/// Static asset prefixes the gate never evaluates
const STATIC_PREFIXES: &[&str] = &["/static", "/assets", "/favicon.ico"];

/// Whether the path points at a static asset
pub fn is_static_asset(path: &str) -> bool {
    STATIC_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Whether the path is an API route; API handlers do their own auth
pub fn is_api_route(path: &str) -> bool {
    path.starts_with("/api")
}

/// Classify a path into its protection tier
pub fn classify(path: &str) -> RouteClass {
    if ADMIN_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteClass::AdminOnly
    } else if LEADER_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteClass::LeaderTier
    } else if AUTHENTICATED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        RouteClass::Authenticated
    } else {
        RouteClass::Public
    }
}

/// Decide what happens to a request
pub fn decide(path: &str, claims: Option<&SessionClaims>) -> GateDecision {
    let class = classify(path);

    if class == RouteClass::Public {
        return GateDecision::Allow;
    }

    let Some(claims) = claims else {
        return GateDecision::RedirectToSignIn {
            callback_url: path.to_string(),
        };
    };

    match class {
        RouteClass::AdminOnly if claims.role != Role::Admin => GateDecision::RedirectHome,
        RouteClass::LeaderTier if !claims.role.at_least(Role::Leader) => {
            GateDecision::RedirectHome
        }
        _ => GateDecision::Allow,
    }
}
