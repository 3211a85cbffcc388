//! Value types held by the virtual module store.

use serde::Serialize;

/// Generated CSS for one source file, stored under its virtual resource path.
///
/// A fragment is always replaced as a whole unit when its source file is
/// re-transformed; it is never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualCssFragment {
    /// Raw CSS text produced by the extraction step.
    pub css_text: String,

    /// Whether the author declared these styles global (unscoped) rather
    /// than module-scoped.
    pub is_global: bool,
}

impl VirtualCssFragment {
    pub fn new(css_text: impl Into<String>, is_global: bool) -> Self {
        Self {
            css_text: css_text.into(),
            is_global,
        }
    }
}
