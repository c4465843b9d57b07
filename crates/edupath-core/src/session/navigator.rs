//! Navigation seam between the stores and the host shell.

/// Abstracts the host's routing so the auth-expiry glue can capture the
/// current location and redirect without knowing about any view framework.
pub trait Navigator: Send + Sync {
    /// Current location including query string, e.g.
    /// `/dashboard/messages?x=1`.
    fn current_location(&self) -> String;

    /// Navigates the host to `path`.
    fn navigate(&self, path: &str);
}
