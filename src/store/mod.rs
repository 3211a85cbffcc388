//! Process-wide registry for generated virtual CSS modules.
//!
//! The same source tree is typically compiled more than once per process
//! (client bundle, server bundle, ...), but each source file is transformed
//! once conceptually: whichever pass runs the transform first registers the
//! generated CSS here, and every pass resolves it from the same place.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    VirtualModuleStore (one per process)          │
//! │                                                                  │
//! │  TransformLoader ──register──► path → VirtualCssFragment         │
//! │  TransformLoader ──add_deps──► path → [producing js files]       │
//! │                                                                  │
//! │  "client" plugin ──lookup──┐                                     │
//! │  "server" plugin ──lookup──┼──► same mapping, latest write wins  │
//! │  OutputCssLoader ──lookup──┘                                     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Lifecycle
//!
//! The shared instance is created lazily on the first configuration pass
//! and lives for the process lifetime; build tools are invoked once per
//! process, so there is no teardown. Components never reach for the global
//! directly: they are handed an `Arc` at construction, which keeps the
//! single-instance contract while letting tests build private stores.

mod fragment;
mod plugin;

pub use fragment::VirtualCssFragment;
pub use plugin::{ResolverPlugin, VirtualCssModulesPlugin, VirtualModule};

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::log;

/// The process-wide instance, created on first use (invariant: at most one).
static SHARED: OnceLock<Arc<VirtualModuleStore>> = OnceLock::new();

/// Thread-safe registry mapping virtual CSS resource paths to their
/// generated content and to the source files that produced them.
///
/// # Thread Safety
///
/// Loader invocations are scheduled by the host bundler and may interleave;
/// `RwLock` keeps each keyed write atomic, so a re-transform replaces a
/// fragment as a whole unit and readers always observe the latest write.
#[derive(Debug, Default)]
pub struct VirtualModuleStore {
    fragments: RwLock<BTreeMap<PathBuf, VirtualCssFragment>>,
    /// Virtual CSS path → files whose edit must invalidate it.
    dependencies: RwLock<BTreeMap<PathBuf, Vec<PathBuf>>>,
    /// Compilation names a plugin handle has been created for.
    compilations: RwLock<Vec<String>>,
}

impl VirtualModuleStore {
    /// Create a new empty store.
    ///
    /// Production code goes through [`VirtualModuleStore::shared`]; this is
    /// public so tests can construct isolated instances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the process-wide store, creating it on first use.
    pub fn shared() -> Arc<Self> {
        SHARED
            .get_or_init(|| {
                log!("store"; "created process-wide virtual module store");
                Arc::new(Self::new())
            })
            .clone()
    }

    /// Insert or replace the fragment for `resource_path`.
    ///
    /// Safe to call repeatedly for the same path; watch-mode re-transforms
    /// overwrite the previous entry, they never append to it.
    pub fn register(&self, resource_path: &Path, css_text: impl Into<String>, is_global: bool) {
        self.fragments.write().insert(
            resource_path.to_path_buf(),
            VirtualCssFragment::new(css_text, is_global),
        );
    }

    /// Fetch the most recently registered fragment for `resource_path`.
    pub fn lookup(&self, resource_path: &Path) -> Option<VirtualCssFragment> {
        self.fragments.read().get(resource_path).cloned()
    }

    /// Replace the dependency set recorded for `resource_path`.
    ///
    /// The output loader re-declares these to the bundler on every emission
    /// so editing the producing JS file invalidates the CSS module.
    pub fn add_dependencies(&self, resource_path: &Path, deps: Vec<PathBuf>) {
        self.dependencies
            .write()
            .insert(resource_path.to_path_buf(), deps);
    }

    /// Files recorded as producing `resource_path` (empty if none).
    pub fn dependencies_of(&self, resource_path: &Path) -> Vec<PathBuf> {
        self.dependencies
            .read()
            .get(resource_path)
            .cloned()
            .unwrap_or_default()
    }

    /// Create a plugin handle binding this store into one compilation's
    /// module graph. Takes the `Arc` the store lives in; callers clone.
    pub fn bind_to_compilation(self: Arc<Self>, name: &str) -> VirtualCssModulesPlugin {
        self.compilations.write().push(name.to_string());
        log!("store"; "bound to compilation `{name}`");
        VirtualCssModulesPlugin::new(name, self)
    }

    /// Compilation names this store has been bound to, in binding order.
    pub fn bound_compilations(&self) -> Vec<String> {
        self.compilations.read().clone()
    }

    /// Number of registered fragments.
    pub fn len(&self) -> usize {
        self.fragments.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_lookup_round_trip() {
        let store = VirtualModuleStore::new();
        let path = Path::new("src/button.stylink.module.css");
        store.register(path, "color:red", false);

        let fragment = store.lookup(path).unwrap();
        assert_eq!(fragment.css_text, "color:red");
        assert!(!fragment.is_global);
    }

    #[test]
    fn test_register_overwrites_previous_entry() {
        let store = VirtualModuleStore::new();
        let path = Path::new("src/button.stylink.module.css");
        store.register(path, ".a { color: red }", false);
        store.register(path, ".a { color: blue }", false);

        let fragment = store.lookup(path).unwrap();
        assert_eq!(fragment.css_text, ".a { color: blue }");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_lookup_unregistered_path_is_not_found() {
        let store = VirtualModuleStore::new();
        assert!(store.lookup(Path::new("never.stylink.module.css")).is_none());
    }

    #[test]
    fn test_dependencies_are_replaced_not_accumulated() {
        let store = VirtualModuleStore::new();
        let path = Path::new("src/button.stylink.module.css");
        store.add_dependencies(path, vec![PathBuf::from("src/button.ts")]);
        store.add_dependencies(path, vec![PathBuf::from("src/button.tsx")]);

        assert_eq!(
            store.dependencies_of(path),
            vec![PathBuf::from("src/button.tsx")]
        );
        assert!(store.dependencies_of(Path::new("other.css")).is_empty());
    }

    #[test]
    fn test_shared_returns_one_instance_per_process() {
        let first = VirtualModuleStore::shared();
        let second = VirtualModuleStore::shared();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_bind_records_compilation_names() {
        let store = Arc::new(VirtualModuleStore::new());
        store.clone().bind_to_compilation("client");
        store.clone().bind_to_compilation("server");
        assert_eq!(store.bound_compilations(), vec!["client", "server"]);
    }

    #[test]
    fn test_writes_from_one_binding_visible_through_another() {
        let store = Arc::new(VirtualModuleStore::new());
        let client = store.clone().bind_to_compilation("client");
        let server = store.clone().bind_to_compilation("server");

        let path = Path::new("src/shared.stylink.module.css");
        client.store().register(path, ".s { margin: 0 }", false);

        let resolved = server.resolve(path).unwrap();
        assert_eq!(resolved.css_text, ".s { margin: 0 }");
    }
}
