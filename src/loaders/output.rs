//! Output filter: emits a virtual CSS module's content as build output.

use std::sync::Arc;

use super::{LoaderContext, LoaderError};
use crate::store::VirtualModuleStore;

/// Loader stage appended to the rule tree for virtual CSS resource paths.
///
/// Content originates from the producing JS file, not from any file behind
/// the resource path, so every emission marks the module uncacheable and
/// re-declares its file dependencies; the bundler then refetches on each
/// rebuild instead of trusting file-modification times.
#[derive(Debug, Clone)]
pub struct OutputCssLoader {
    store: Arc<VirtualModuleStore>,
}

impl OutputCssLoader {
    pub fn new(store: Arc<VirtualModuleStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<VirtualModuleStore> {
        &self.store
    }

    /// Emit the registered CSS for the module being built.
    ///
    /// Fails with [`LoaderError::MissingVirtualModule`] if nothing has been
    /// registered for the path; the producing JS module's transform must
    /// run before its CSS can be emitted.
    pub fn emit(&self, ctx: &mut LoaderContext) -> Result<String, LoaderError> {
        ctx.set_cacheable(false);

        let resource = ctx.resource_path().to_path_buf();
        let fragment = self
            .store
            .lookup(&resource)
            .ok_or(LoaderError::MissingVirtualModule(resource.clone()))?;

        for dep in self.store.dependencies_of(&resource) {
            ctx.add_dependency(dep);
        }

        Ok(fragment.css_text)
    }
}
