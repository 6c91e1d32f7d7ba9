//! Resolution of local image references to hosted URLs.

use std::path::Path;

/// Turns a local image file into a URL the document store can display.
///
/// Implementations return `None` (or an empty string) when the file cannot
/// be hosted. The converter then substitutes a placeholder image and keeps
/// going.
pub trait ResourceResolver {
    fn resolve(&self, path: &Path) -> Option<String>;
}

/// Resolver that never hosts anything.
///
/// Used for dry runs and by callers without image hosting configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineResolver;

impl ResourceResolver for OfflineResolver {
    fn resolve(&self, path: &Path) -> Option<String> {
        tracing::debug!(path = %path.display(), "Image hosting disabled");
        None
    }
}
