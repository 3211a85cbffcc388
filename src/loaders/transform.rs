//! Extraction adapter: the loader stage that runs the external CSS-in-JS
//! transform and lands its output in the shared store.
//!
//! The transform itself is a black box behind [`CssExtractor`]: given source
//! text and options it returns rewritten JS plus zero or more generated CSS
//! fragments. This stage owns only the bookkeeping around that call -
//! deriving each fragment's virtual resource path, merging fragments that
//! share one, registering the result (overwrite semantics, so watch-mode
//! rebuilds replace stale CSS), and recording the dependency edge back to
//! the producing JS file.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{LoaderContext, LoaderError};
use crate::config::ResolvedTransformOptions;
use crate::log;
use crate::paths;
use crate::store::VirtualModuleStore;

/// One generated CSS fragment for a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFragment {
    pub css_text: String,
    pub is_global: bool,
}

/// Result of running the external transform over one source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    /// Rewritten JS source with the style expressions stripped/replaced.
    pub code: String,

    /// Generated CSS, empty when the file contains no CSS-in-JS.
    pub fragments: Vec<ExtractedFragment>,
}

/// The external CSS-in-JS extraction transform, as this pipeline sees it.
///
/// Errors propagate unchanged; this system does not wrap, retry, or
/// suppress them.
pub trait CssExtractor: Send + Sync {
    fn extract(
        &self,
        source: &str,
        path: &Path,
        options: &ResolvedTransformOptions,
    ) -> anyhow::Result<Extraction>;
}

/// Loader stage appended to the rule tree for JS/TS source extensions.
#[derive(Clone)]
pub struct TransformLoader {
    options: ResolvedTransformOptions,
    extractor: Arc<dyn CssExtractor>,
    store: Arc<VirtualModuleStore>,
}

impl TransformLoader {
    pub fn new(
        options: ResolvedTransformOptions,
        extractor: Arc<dyn CssExtractor>,
        store: Arc<VirtualModuleStore>,
    ) -> Self {
        Self {
            options,
            extractor,
            store,
        }
    }

    /// Merged transform options this stage was configured with.
    pub fn options(&self) -> &ResolvedTransformOptions {
        &self.options
    }

    /// The store fragments are registered into.
    pub fn store(&self) -> &Arc<VirtualModuleStore> {
        &self.store
    }

    /// Transform one source file, registering any generated CSS.
    ///
    /// Returns the rewritten JS source. A file without CSS-in-JS passes
    /// through with no store activity.
    pub fn run(&self, ctx: &LoaderContext, source: &str) -> Result<String, LoaderError> {
        let extraction = self
            .extractor
            .extract(source, ctx.resource_path(), &self.options)?;

        // A source file yields at most two virtual paths (module + global);
        // same-scope fragments are concatenated into one module so later
        // fragments never clobber earlier ones.
        let mut merged: BTreeMap<PathBuf, (String, bool)> = BTreeMap::new();
        for fragment in extraction.fragments {
            let css_path = paths::virtual_css_path_for(ctx.resource_path(), fragment.is_global);
            match merged.get_mut(&css_path) {
                Some((css_text, _)) => {
                    css_text.push('\n');
                    css_text.push_str(&fragment.css_text);
                }
                None => {
                    merged.insert(css_path, (fragment.css_text, fragment.is_global));
                }
            }
        }

        for (css_path, (css_text, is_global)) in merged {
            self.store.register(&css_path, css_text, is_global);
            self.store
                .add_dependencies(&css_path, vec![ctx.resource_path().to_path_buf()]);
            log!("transform"; "registered `{}`", css_path.display());
        }

        Ok(extraction.code)
    }
}

impl fmt::Debug for TransformLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformLoader")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformOptions;
    use anyhow::bail;
    use std::path::PathBuf;

    /// Stand-in for the external transform: everything after a `/*css*/`
    /// marker becomes one module-scoped fragment.
    struct MarkerExtractor;

    impl CssExtractor for MarkerExtractor {
        fn extract(
            &self,
            source: &str,
            _path: &Path,
            _options: &ResolvedTransformOptions,
        ) -> anyhow::Result<Extraction> {
            match source.split_once("/*css*/") {
                Some((code, css)) => Ok(Extraction {
                    code: code.trim().to_string(),
                    fragments: vec![ExtractedFragment {
                        css_text: css.trim().to_string(),
                        is_global: false,
                    }],
                }),
                None => Ok(Extraction {
                    code: source.to_string(),
                    fragments: Vec::new(),
                }),
            }
        }
    }

    /// Emits one module-scoped fragment per input line plus a fixed global
    /// fragment, without rewriting the source.
    struct PerLineExtractor;

    impl CssExtractor for PerLineExtractor {
        fn extract(
            &self,
            source: &str,
            _path: &Path,
            _options: &ResolvedTransformOptions,
        ) -> anyhow::Result<Extraction> {
            let mut fragments: Vec<ExtractedFragment> = source
                .lines()
                .map(|line| ExtractedFragment {
                    css_text: line.to_string(),
                    is_global: false,
                })
                .collect();
            fragments.push(ExtractedFragment {
                css_text: "body { margin: 0 }".to_string(),
                is_global: true,
            });
            Ok(Extraction {
                code: String::new(),
                fragments,
            })
        }
    }

    struct FailingExtractor;

    impl CssExtractor for FailingExtractor {
        fn extract(
            &self,
            _source: &str,
            path: &Path,
            _options: &ResolvedTransformOptions,
        ) -> anyhow::Result<Extraction> {
            bail!("unexpected token in {}", path.display())
        }
    }

    fn loader(extractor: Arc<dyn CssExtractor>) -> TransformLoader {
        let options = TransformOptions::default().resolve(crate::config::BuildEnv::Development);
        TransformLoader::new(options, extractor, Arc::new(VirtualModuleStore::new()))
    }

    #[test]
    fn test_run_registers_fragment_under_derived_path() {
        let loader = loader(Arc::new(MarkerExtractor));
        let ctx = LoaderContext::new("src/button.ts");

        let code = loader
            .run(&ctx, "export const a = 1; /*css*/ .btn { color: red }")
            .unwrap();
        assert_eq!(code, "export const a = 1;");

        let css_path = PathBuf::from("src/button.stylink.module.css");
        let fragment = loader.store().lookup(&css_path).unwrap();
        assert_eq!(fragment.css_text, ".btn { color: red }");
        assert_eq!(
            loader.store().dependencies_of(&css_path),
            vec![PathBuf::from("src/button.ts")]
        );
    }

    #[test]
    fn test_run_without_css_leaves_store_untouched() {
        let loader = loader(Arc::new(MarkerExtractor));
        let ctx = LoaderContext::new("src/util.ts");

        let code = loader.run(&ctx, "export const b = 2;").unwrap();
        assert_eq!(code, "export const b = 2;");
        assert!(loader.store().is_empty());
    }

    #[test]
    fn test_rebuild_replaces_fragment() {
        let loader = loader(Arc::new(MarkerExtractor));
        let ctx = LoaderContext::new("src/button.ts");
        let css_path = PathBuf::from("src/button.stylink.module.css");

        loader.run(&ctx, "a /*css*/ .btn { color: red }").unwrap();
        loader.run(&ctx, "a /*css*/ .btn { color: blue }").unwrap();

        let fragment = loader.store().lookup(&css_path).unwrap();
        assert_eq!(fragment.css_text, ".btn { color: blue }");
        assert_eq!(loader.store().len(), 1);
    }

    #[test]
    fn test_same_scope_fragments_merge_into_one_module() {
        let loader = loader(Arc::new(PerLineExtractor));
        let ctx = LoaderContext::new("src/button.ts");

        loader
            .run(&ctx, ".a { color: red }\n.b { color: blue }")
            .unwrap();

        // One module-scoped entry and one global entry, nothing clobbered.
        assert_eq!(loader.store().len(), 2);
        let fragment = loader
            .store()
            .lookup(Path::new("src/button.stylink.module.css"))
            .unwrap();
        assert_eq!(fragment.css_text, ".a { color: red }\n.b { color: blue }");

        let global = loader
            .store()
            .lookup(Path::new("src/button.stylink.global.css"))
            .unwrap();
        assert_eq!(global.css_text, "body { margin: 0 }");
        assert!(global.is_global);
    }

    #[test]
    fn test_extractor_failure_propagates_unchanged() {
        let loader = loader(Arc::new(FailingExtractor));
        let ctx = LoaderContext::new("src/broken.ts");

        let err = loader.run(&ctx, "???").unwrap_err();
        assert!(matches!(err, LoaderError::Transform(_)));
        assert!(format!("{err}").contains("src/broken.ts"));
    }
}
