//! Viewer/device context used for override selection and template scopes.

use serde::Serialize;

/// The runtime context an effective configuration is resolved against.
///
/// Built once per page load from host state; never derived from the
/// document itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewerContext {
    /// Viewer (account) name. Matching is case-sensitive.
    pub user: String,
    /// Device name the viewer is browsing from.
    pub device: String,
    /// Raw user-agent string of the viewer's browser.
    pub user_agent: String,
    /// Whether the viewer has the admin flag.
    pub is_admin: bool,
    /// Whether the viewer owns the installation.
    pub is_owner: bool,
}
