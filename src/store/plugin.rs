//! Bundler-plugin adapter for the virtual module store.
//!
//! The host bundler resolves module requests against its own filesystem; a
//! virtual CSS path has no file behind it, so each compilation pass gets a
//! [`VirtualCssModulesPlugin`] that intercepts those requests and answers
//! them from the shared store instead of failing with "file not found".

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::VirtualModuleStore;
use crate::paths;

/// A module resolved from somewhere other than the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualModule {
    /// The module's content (raw CSS text).
    pub css_text: String,

    /// Files whose edit must invalidate this module on rebuild. For a
    /// virtual CSS module this is the JS file that produced it.
    pub dependencies: Vec<PathBuf>,
}

/// What the host bundler consumes: a named hook asked during module
/// resolution whether a request can be served without a file on disk.
pub trait ResolverPlugin: Send + Sync {
    /// Stable plugin name, used by the host for diagnostics and ordering.
    fn name(&self) -> &str;

    /// Resolve `request` as a virtual module, or `None` to let the host's
    /// normal filesystem resolution proceed.
    fn resolve(&self, request: &Path) -> Option<VirtualModule>;
}

/// Per-compilation handle binding the process-wide store into one
/// compilation's module graph.
///
/// Created by [`VirtualModuleStore::bind_to_compilation`]. Every handle
/// shares the same store, so a fragment registered while building one
/// bundle is resolvable from every other bundle in the same process.
#[derive(Debug, Clone)]
pub struct VirtualCssModulesPlugin {
    compilation: String,
    store: Arc<VirtualModuleStore>,
}

impl VirtualCssModulesPlugin {
    pub(super) fn new(compilation: impl Into<String>, store: Arc<VirtualModuleStore>) -> Self {
        Self {
            compilation: compilation.into(),
            store,
        }
    }

    /// Name of the compilation pass this handle is attached to.
    pub fn compilation(&self) -> &str {
        &self.compilation
    }

    /// The store backing this handle.
    pub fn store(&self) -> &Arc<VirtualModuleStore> {
        &self.store
    }
}

impl ResolverPlugin for VirtualCssModulesPlugin {
    fn name(&self) -> &str {
        "stylink-virtual-css-modules"
    }

    fn resolve(&self, request: &Path) -> Option<VirtualModule> {
        if !paths::is_virtual_css_path(request) {
            return None;
        }
        let fragment = self.store.lookup(request)?;
        Some(VirtualModule {
            css_text: fragment.css_text,
            dependencies: self.store.dependencies_of(request),
        })
    }
}
