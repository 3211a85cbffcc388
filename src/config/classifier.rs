//! Loader-rule classification and in-place rewiring.
//!
//! The host's rule tree already knows how to build stylesheets; what it
//! does not know is that some CSS never exists on disk and arrives with its
//! class names already finalized by the extraction step. This pass visits
//! every rule once and, for each CSS-Modules rule, decorates its two
//! per-file decision functions:
//!
//! - the local-ident function passes export names through untouched for
//!   generated CSS paths (naming is owned by the extraction step) and
//!   delegates unchanged for everything else;
//! - the scoping-mode function forces `Local` for global-CSS paths so they
//!   stay eligible for the same mechanical pipeline (the extraction step
//!   has already stripped real scoping semantics for those files), and
//!   delegates unchanged for everything else.
//!
//! Rewiring is not idempotent: running it twice stacks decorators. The
//! orchestrator is the only caller and runs it exactly once per
//! configuration object.

use std::sync::Arc;

use super::error::ConfigError;
use super::rules::{
    CssModulesOptions, LoaderSpec, LocalIdentFn, ModeSetting, RuleNode, RuleUse, ScopingMode,
};
use crate::paths;

/// Does this rule run the host's css-loader?
pub fn is_css_loader(rule: &RuleNode) -> bool {
    matches!(&rule.loader, Some(LoaderSpec::Host(name)) if name.contains("css-loader"))
}

/// Does this rule enable CSS-Modules local scoping?
pub fn is_css_module(rule: &RuleNode) -> bool {
    is_css_loader(rule) && rule.options.as_ref().is_some_and(|o| o.modules.is_some())
}

/// Decorate a local-ident function: generated CSS paths get their export
/// name verbatim, every other path delegates to `next`.
pub fn passthrough_generated_idents(next: LocalIdentFn) -> LocalIdentFn {
    Arc::new(move |path, export_name| {
        if paths::is_virtual_css_path(path) {
            export_name.to_string()
        } else {
            next(path, export_name)
        }
    })
}

/// Decorate a scoping-mode setting: global-CSS paths are forced to `Local`
/// scoping, every other path delegates to `next`.
pub fn force_local_for_global(next: ModeSetting) -> ModeSetting {
    ModeSetting::PerPath(Arc::new(move |path| {
        if paths::is_global_css_path(path) {
            ScopingMode::Local
        } else {
            next.resolve(path)
        }
    }))
}

/// Visit every rule in the tree once, rewiring CSS-Modules rules in place.
///
/// Non-CSS rules are left untouched. Must be called exactly once per
/// configuration object; see the module docs on idempotency.
pub fn rewire_css_rules(rules: &mut [RuleNode]) -> Result<(), ConfigError> {
    for rule in rules {
        if is_css_module(rule)
            && let Some(modules) = rule.options.as_mut().and_then(|o| o.modules.as_mut())
        {
            rewire_modules_options(modules);
        }

        if matches!(rule.use_, Some(RuleUse::Opaque(_))) {
            return Err(ConfigError::UnexpectedUseShape {
                rule: describe_rule(rule),
            });
        }

        match rule.use_.as_mut() {
            Some(RuleUse::Entry(entry)) => rewire_css_rules(std::slice::from_mut(entry.as_mut()))?,
            Some(RuleUse::List(list)) => rewire_css_rules(list)?,
            Some(RuleUse::Opaque(_)) | None => {}
        }

        rewire_css_rules(&mut rule.one_of)?;
    }
    Ok(())
}

fn rewire_modules_options(modules: &mut CssModulesOptions) {
    let next_mode = std::mem::replace(&mut modules.mode, ModeSetting::Value(ScopingMode::Local));
    modules.mode = force_local_for_global(next_mode);

    let next_ident = modules.get_local_ident.clone();
    modules.get_local_ident = passthrough_generated_idents(next_ident);
}

fn describe_rule(rule: &RuleNode) -> String {
    rule.test
        .as_ref()
        .map(|m| m.pattern().to_string())
        .unwrap_or_else(|| "<untested rule>".to_string())
}
