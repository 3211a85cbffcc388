//! stylink - build-time CSS-in-JS wiring for bundler configurations.
//!
//! Source files containing tagged CSS-in-JS expressions are transformed at
//! build time into plain JS plus synthetic CSS that the bundler treats as a
//! real, cacheable, dependency-tracked module even though no such file
//! exists on disk.
//!
//! # Architecture
//!
//! ```text
//! source file
//!     │ TransformLoader (extraction adapter)
//!     ▼
//! rewritten JS + generated CSS ──register──► VirtualModuleStore
//!                                                │     ▲
//! bundler resolves implicit CSS import ──────────┘     │
//!     │ VirtualCssModulesPlugin answers from the store │
//!     ▼                                                │
//! OutputCssLoader ──lookup──────────────────────────────┘
//!     │ emits CSS, re-declares dependency on the JS file
//!     ▼
//! stylesheet in the bundle
//! ```
//!
//! One [`VirtualModuleStore`] exists per process, shared across every
//! compilation pass (client, server, ...) so all passes observe the same
//! generated content. Entry point: [`with_css_extraction`] rewires a host
//! configuration's bundler hook; the extraction transform itself stays
//! external behind the [`CssExtractor`] trait.

pub mod config;
pub mod loaders;
pub mod logger;
pub mod paths;
pub mod store;

pub use config::{
    BuildEnv, BundlerConfig, CompilationContext, ConfigError, ConfigHook, CssModulesOptions,
    HostConfig, LoaderSpec, ModeSetting, ModuleOptions, PathMatcher, ResolvedTransformOptions,
    RuleNode, RuleOptions, RuleUse, ScopingMode, TransformOptions, with_css_extraction,
};
pub use loaders::{
    CssExtractor, ExtractedFragment, Extraction, LoaderContext, LoaderError, OutputCssLoader,
    TransformLoader,
};
pub use store::{
    ResolverPlugin, VirtualCssFragment, VirtualCssModulesPlugin, VirtualModule, VirtualModuleStore,
};
