//! Bundler configuration model and the orchestrator that rewires it.
//!
//! # Data flow
//!
//! ```text
//! HostConfig { css options, existing bundler hook, ... }
//!        │ with_css_extraction()
//!        ▼
//! HostConfig with a replaced bundler hook; per compilation pass the hook:
//!   1. passes non-bundler-shaped configs through unmodified
//!   2. rewires existing CSS-Modules rules (classifier)
//!   3. fetches the process-wide VirtualModuleStore (created on first use)
//!   4. attaches a store plugin handle for this compilation
//!   5. appends the output-filter rule for virtual CSS paths
//!   6. appends the extraction-adapter rule for JS/TS sources
//!   7. chains any pre-existing user hook on the mutated config
//! ```

mod classifier;
mod error;
mod options;
mod rules;

pub use classifier::{
    force_local_for_global, is_css_loader, is_css_module, passthrough_generated_idents,
    rewire_css_rules,
};
pub use error::ConfigError;
pub use options::{BuildEnv, ResolvedTransformOptions, TransformOptions};
pub use rules::{
    CssModulesOptions, LoaderSpec, LocalIdentFn, ModeFn, ModeSetting, PathMatcher, RuleNode,
    RuleOptions, RuleUse, ScopingMode, default_local_ident,
};

use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::loaders::{CssExtractor, OutputCssLoader, TransformLoader};
use crate::log;
use crate::store::{ResolverPlugin, VirtualModuleStore};

// ============================================================================
// Configuration Model
// ============================================================================

/// Identifies one bundler configuration instance within a build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompilationContext {
    /// Build target name (e.g. `"client"`, `"server"`, `"edge"`).
    pub name: String,
    /// Whether this is a development build.
    pub dev: bool,
}

impl CompilationContext {
    pub fn new(name: impl Into<String>, dev: bool) -> Self {
        Self {
            name: name.into(),
            dev,
        }
    }
}

/// The bundler-configuration hook: called once per compilation pass with
/// that pass's configuration, returning the configuration to build with.
pub type ConfigHook =
    Arc<dyn Fn(BundlerConfig, &CompilationContext) -> Result<BundlerConfig> + Send + Sync>;

/// The `module` section of a bundler configuration.
#[derive(Debug, Clone, Default)]
pub struct ModuleOptions {
    pub rules: Vec<RuleNode>,
}

/// One compilation pass's bundler configuration.
///
/// `module` and `plugins` are optional because the host may hand us
/// something that is not bundler-shaped at all; such configs pass through
/// unmodified.
#[derive(Clone, Default)]
pub struct BundlerConfig {
    pub name: String,
    pub module: Option<ModuleOptions>,
    pub plugins: Option<Vec<Arc<dyn ResolverPlugin>>>,
}

impl fmt::Debug for BundlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundlerConfig")
            .field("name", &self.name)
            .field("module", &self.module)
            .field(
                "plugins",
                &self.plugins.as_ref().map(|p| {
                    p.iter().map(|plugin| plugin.name()).collect::<Vec<_>>()
                }),
            )
            .finish()
    }
}

/// The host framework's configuration as handed to [`with_css_extraction`].
#[derive(Clone, Default)]
pub struct HostConfig {
    /// CSS-in-JS transform options; consumed by the orchestrator.
    pub css: Option<TransformOptions>,

    /// Pre-existing bundler-configuration hook, chained after ours.
    pub bundler: Option<ConfigHook>,

    /// Host configuration fields this system does not interpret.
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConfig")
            .field("css", &self.css)
            .field("bundler", &self.bundler.as_ref().map(|_| "<hook>"))
            .field("extra", &self.extra)
            .finish()
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Rewire a host configuration for build-time CSS-in-JS extraction.
///
/// Returns the host configuration with its bundler hook replaced: the new
/// hook mutates each compilation pass's configuration (see module docs) and
/// then delegates to any hook the host had installed, preserving further
/// mutation the host wants to apply. Transform options are resolved once,
/// against the environment detected at call time.
pub fn with_css_extraction(host: HostConfig, extractor: Arc<dyn CssExtractor>) -> HostConfig {
    let HostConfig {
        css,
        bundler: previous,
        extra,
    } = host;
    let options = css.unwrap_or_default().resolve(BuildEnv::detect());

    let hook: ConfigHook = Arc::new(move |config, ctx| {
        let config = augment(config, &options, &extractor)?;
        match &previous {
            Some(prev) => prev(config, ctx),
            None => Ok(config),
        }
    });

    HostConfig {
        css: None,
        bundler: Some(hook),
        extra,
    }
}

/// Apply steps 1-6 to one compilation pass's configuration.
fn augment(
    mut config: BundlerConfig,
    options: &ResolvedTransformOptions,
    extractor: &Arc<dyn CssExtractor>,
) -> Result<BundlerConfig, ConfigError> {
    let (Some(module), Some(plugins)) = (config.module.as_mut(), config.plugins.as_mut()) else {
        // Not bundler-shaped; nothing to rewire.
        return Ok(config);
    };

    rewire_css_rules(&mut module.rules)?;

    let store = VirtualModuleStore::shared();
    plugins.push(Arc::new(store.clone().bind_to_compilation(&config.name)));

    module.rules.push(output_css_rule(&store));
    module.rules.push(transform_rule(options, extractor, &store));

    log!("config"; "wired css extraction into `{}`", config.name);
    Ok(config)
}

/// Rule serving registered CSS for virtual resource paths.
fn output_css_rule(store: &Arc<VirtualModuleStore>) -> RuleNode {
    RuleNode {
        test: Some(PathMatcher::virtual_css()),
        exclude: Some(PathMatcher::node_modules()),
        use_: Some(RuleUse::List(vec![RuleNode {
            loader: Some(LoaderSpec::CssOutput(OutputCssLoader::new(store.clone()))),
            ..RuleNode::default()
        }])),
        ..RuleNode::default()
    }
}

/// Rule running the extraction transform over project sources.
fn transform_rule(
    options: &ResolvedTransformOptions,
    extractor: &Arc<dyn CssExtractor>,
    store: &Arc<VirtualModuleStore>,
) -> RuleNode {
    RuleNode {
        test: Some(PathMatcher::source_files()),
        exclude: Some(PathMatcher::node_modules()),
        use_: Some(RuleUse::List(vec![RuleNode {
            loader: Some(LoaderSpec::CssTransform(TransformLoader::new(
                options.clone(),
                extractor.clone(),
                store.clone(),
            ))),
            ..RuleNode::default()
        }])),
        ..RuleNode::default()
    }
}
