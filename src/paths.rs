//! Reserved resource-path conventions for generated CSS modules.
//!
//! Every virtual CSS module produced by the extraction step is addressed by a
//! synthetic path derived from the originating JS file:
//!
//! | Originating file | Scoping | Virtual resource path          |
//! |------------------|---------|--------------------------------|
//! | `button.ts`      | module  | `button.stylink.module.css`    |
//! | `theme.ts`       | global  | `theme.stylink.global.css`     |
//!
//! The global pattern is a strict subset of the general pattern: every path
//! matched by [`is_global_css_path`] is also matched by
//! [`is_virtual_css_path`]. Matching is bit-exact on the path suffix; the
//! rest of the pipeline (rule injection, the store, the output loader) all
//! key off these two predicates, so they live here as the single source of
//! truth.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Suffix appended to a JS path to form its module-scoped virtual CSS path.
pub const MODULE_CSS_SUFFIX: &str = "stylink.module.css";

/// Suffix appended to a JS path to form its global virtual CSS path.
pub const GLOBAL_CSS_SUFFIX: &str = "stylink.global.css";

/// Matches every virtual CSS resource path this pipeline produces.
pub static VIRTUAL_CSS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.stylink\.(module|global)\.css$").unwrap());

/// Matches only the global-styling subset of [`VIRTUAL_CSS_RE`].
pub static GLOBAL_CSS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.stylink\.global\.css$").unwrap());

/// Is `path` a synthetic CSS resource produced by this pipeline?
pub fn is_virtual_css_path(path: &Path) -> bool {
    VIRTUAL_CSS_RE.is_match(&path.to_string_lossy())
}

/// Is `path` a synthetic CSS resource carrying global (unscoped) styles?
pub fn is_global_css_path(path: &Path) -> bool {
    GLOBAL_CSS_RE.is_match(&path.to_string_lossy())
}

/// Derive the virtual CSS resource path for a source file.
///
/// The virtual path sits next to the originating file so relative imports
/// emitted by the extraction step resolve within the same directory.
pub fn virtual_css_path_for(js_path: &Path, is_global: bool) -> PathBuf {
    let suffix = if is_global {
        GLOBAL_CSS_SUFFIX
    } else {
        MODULE_CSS_SUFFIX
    };
    let stem = js_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    js_path.with_file_name(format!("{stem}.{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_css_patterns() {
        assert!(is_virtual_css_path(Path::new("src/button.stylink.module.css")));
        assert!(is_virtual_css_path(Path::new("src/theme.stylink.global.css")));
        assert!(!is_virtual_css_path(Path::new("src/button.module.css")));
        assert!(!is_virtual_css_path(Path::new("src/button.css")));
        assert!(!is_virtual_css_path(Path::new("src/button.ts")));
    }

    #[test]
    fn test_global_pattern_is_subset_of_general() {
        let global = Path::new("app/theme.stylink.global.css");
        assert!(is_global_css_path(global));
        assert!(is_virtual_css_path(global));

        let module = Path::new("app/button.stylink.module.css");
        assert!(!is_global_css_path(module));
        assert!(is_virtual_css_path(module));
    }

    #[test]
    fn test_virtual_css_path_derivation() {
        assert_eq!(
            virtual_css_path_for(Path::new("src/button.ts"), false),
            PathBuf::from("src/button.stylink.module.css")
        );
        assert_eq!(
            virtual_css_path_for(Path::new("src/theme.tsx"), true),
            PathBuf::from("src/theme.stylink.global.css")
        );
    }

    #[test]
    fn test_derived_paths_round_trip_through_predicates() {
        let module = virtual_css_path_for(Path::new("a/b/c.jsx"), false);
        assert!(is_virtual_css_path(&module));
        assert!(!is_global_css_path(&module));

        let global = virtual_css_path_for(Path::new("a/b/c.jsx"), true);
        assert!(is_virtual_css_path(&global));
        assert!(is_global_css_path(&global));
    }
}
