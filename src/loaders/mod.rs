//! The two loader stages injected into the host bundler's rule tree.
//!
//! | Stage | Matches | Purpose |
//! |-------|---------|---------|
//! | [`TransformLoader`] | JS/TS source files | run the extraction transform, register generated CSS |
//! | [`OutputCssLoader`] | virtual CSS paths  | emit registered CSS as the module's build output |
//!
//! Both stages are synchronous from the pipeline's perspective; scheduling
//! belongs to the host bundler's own loader-invocation protocol.

pub mod output;
pub mod transform;

pub use output::OutputCssLoader;
pub use transform::{CssExtractor, ExtractedFragment, Extraction, TransformLoader};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Loader-stage errors. All of them fail the current compilation pass.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The output stage was asked to emit a path nothing has registered.
    /// Never silently substituted with empty CSS: an empty stylesheet would
    /// mask an ordering bug in the pipeline.
    #[error("no virtual css module registered for `{}`", .0.display())]
    MissingVirtualModule(PathBuf),

    /// Failure inside the external extraction transform, propagated
    /// unchanged to the host bundler's own error reporting.
    #[error(transparent)]
    Transform(#[from] anyhow::Error),
}

/// The slice of the host bundler's per-module loader protocol these stages
/// touch: the resource being built, its cacheability, and the file
/// dependencies declared while building it.
#[derive(Debug, Clone)]
pub struct LoaderContext {
    resource_path: PathBuf,
    cacheable: bool,
    file_dependencies: Vec<PathBuf>,
}

impl LoaderContext {
    pub fn new(resource_path: impl Into<PathBuf>) -> Self {
        Self {
            resource_path: resource_path.into(),
            cacheable: true,
            file_dependencies: Vec::new(),
        }
    }

    /// Path of the module currently being built.
    pub fn resource_path(&self) -> &Path {
        &self.resource_path
    }

    /// Tell the bundler whether this module's output may be served from
    /// cache based on its own input alone.
    pub fn set_cacheable(&mut self, cacheable: bool) {
        self.cacheable = cacheable;
    }

    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    /// Declare a file whose change must invalidate this module.
    pub fn add_dependency(&mut self, path: PathBuf) {
        self.file_dependencies.push(path);
    }

    pub fn file_dependencies(&self) -> &[PathBuf] {
        &self.file_dependencies
    }
}
