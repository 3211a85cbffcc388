//! Typed model of the host bundler's rule tree.
//!
//! A rule is either a leaf with a matcher-plus-loader, a node with a nested
//! `use` chain, or a node with `oneOf` branches; the tree is heterogeneous
//! and self-referential, so the variants are tagged explicitly instead of
//! duck-typing field presence. Host payloads we have no typed shape for
//! travel as [`RuleUse::Opaque`] and fail traversal as a typed error rather
//! than a runtime type check.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use crate::loaders::{OutputCssLoader, TransformLoader};
use crate::paths;

static SOURCE_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(tsx|ts|js|mjs|jsx)$").unwrap());

static NODE_MODULES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"node_modules").unwrap());

// ============================================================================
// Path Matching
// ============================================================================

/// Resource-path matcher attached to a rule's `test`/`exclude` fields.
#[derive(Clone)]
pub struct PathMatcher(Regex);

impl PathMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.0.is_match(&path.to_string_lossy())
    }

    /// The source pattern, for diagnostics and comparisons.
    pub fn pattern(&self) -> &str {
        self.0.as_str()
    }

    /// Matches the virtual CSS resources produced by this pipeline.
    pub fn virtual_css() -> Self {
        Self(paths::VIRTUAL_CSS_RE.clone())
    }

    /// Matches JS/TS source extensions eligible for extraction.
    pub fn source_files() -> Self {
        Self(SOURCE_FILE_RE.clone())
    }

    /// Matches dependency trees not owned by the project.
    pub fn node_modules() -> Self {
        Self(NODE_MODULES_RE.clone())
    }
}

impl fmt::Debug for PathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathMatcher({:?})", self.0.as_str())
    }
}

// ============================================================================
// CSS-Modules Options
// ============================================================================

/// How a CSS rule scopes class names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopingMode {
    /// Exported names are mechanically renamed for uniqueness.
    Local,
    /// Names are used verbatim.
    Global,
}

/// Local-identifier naming function: `(resource path, export name) -> ident`.
pub type LocalIdentFn = Arc<dyn Fn(&Path, &str) -> String + Send + Sync>;

/// Per-path scoping decision function.
pub type ModeFn = Arc<dyn Fn(&Path) -> ScopingMode + Send + Sync>;

/// A CSS rule's `mode` setting: a fixed value or a per-path function.
#[derive(Clone)]
pub enum ModeSetting {
    Value(ScopingMode),
    PerPath(ModeFn),
}

impl ModeSetting {
    pub fn resolve(&self, path: &Path) -> ScopingMode {
        match self {
            Self::Value(mode) => *mode,
            Self::PerPath(f) => f(path),
        }
    }
}

impl fmt::Debug for ModeSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(mode) => write!(f, "ModeSetting::Value({mode:?})"),
            Self::PerPath(_) => write!(f, "ModeSetting::PerPath(..)"),
        }
    }
}

/// CSS-Modules configuration on a css-loader rule.
#[derive(Clone)]
pub struct CssModulesOptions {
    pub mode: ModeSetting,
    pub get_local_ident: LocalIdentFn,
}

impl CssModulesOptions {
    pub fn new(mode: ModeSetting, get_local_ident: LocalIdentFn) -> Self {
        Self {
            mode,
            get_local_ident,
        }
    }

    /// Options with the host-independent default ident function.
    pub fn with_default_ident(mode: ModeSetting) -> Self {
        Self::new(mode, Arc::new(default_local_ident))
    }
}

impl fmt::Debug for CssModulesOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CssModulesOptions")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Fallback local-ident naming: `<file stem>__<export name>`.
pub fn default_local_ident(path: &Path, export_name: &str) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}__{export_name}")
}

// ============================================================================
// Rule Tree
// ============================================================================

/// Per-rule loader options.
#[derive(Debug, Clone, Default)]
pub struct RuleOptions {
    /// Present iff the rule enables CSS-Modules handling.
    pub modules: Option<CssModulesOptions>,
}

/// What a rule runs when it matches.
#[derive(Clone)]
pub enum LoaderSpec {
    /// Loader owned by the host, addressed by name (e.g. `"css-loader"`).
    Host(String),
    /// Injected extraction adapter stage.
    CssTransform(TransformLoader),
    /// Injected output filter stage.
    CssOutput(OutputCssLoader),
}

impl fmt::Debug for LoaderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host(name) => write!(f, "LoaderSpec::Host({name:?})"),
            Self::CssTransform(_) => write!(f, "LoaderSpec::CssTransform(..)"),
            Self::CssOutput(_) => write!(f, "LoaderSpec::CssOutput(..)"),
        }
    }
}

/// A rule's nested `use` value.
#[derive(Debug, Clone)]
pub enum RuleUse {
    /// Single loader entry (object form).
    Entry(Box<RuleNode>),
    /// Loader chain (array form).
    List(Vec<RuleNode>),
    /// Host-supplied shape the traversal cannot visit. Surfaced as
    /// [`crate::config::ConfigError::UnexpectedUseShape`].
    Opaque(Value),
}

/// One node of the bundler's rule tree.
#[derive(Debug, Clone, Default)]
pub struct RuleNode {
    pub test: Option<PathMatcher>,
    pub exclude: Option<PathMatcher>,
    pub loader: Option<LoaderSpec>,
    pub options: Option<RuleOptions>,
    pub use_: Option<RuleUse>,
    pub one_of: Vec<RuleNode>,
}

impl RuleNode {
    /// Leaf rule running a host loader.
    pub fn host_loader(name: impl Into<String>) -> Self {
        Self {
            loader: Some(LoaderSpec::Host(name.into())),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_path_matcher_presets() {
        assert!(PathMatcher::source_files().matches(Path::new("src/app.tsx")));
        assert!(!PathMatcher::source_files().matches(Path::new("src/app.css")));
        assert!(
            PathMatcher::virtual_css().matches(Path::new("src/app.stylink.module.css"))
        );
        assert!(PathMatcher::node_modules().matches(Path::new("node_modules/lib/index.js")));
    }

    #[test]
    fn test_mode_setting_resolution() {
        let fixed = ModeSetting::Value(ScopingMode::Global);
        assert_eq!(fixed.resolve(Path::new("a.css")), ScopingMode::Global);

        let per_path = ModeSetting::PerPath(Arc::new(|path: &Path| {
            if path.to_string_lossy().contains("scoped") {
                ScopingMode::Local
            } else {
                ScopingMode::Global
            }
        }));
        assert_eq!(per_path.resolve(Path::new("scoped.css")), ScopingMode::Local);
        assert_eq!(per_path.resolve(Path::new("plain.css")), ScopingMode::Global);
    }

    #[test]
    fn test_default_local_ident() {
        assert_eq!(
            default_local_ident(&PathBuf::from("src/button.module.css"), "primary"),
            "button.module__primary"
        );
    }
}
