//! Type registry for plan documents
//!
//! Maps the `type` strings of a plan to constructors. Parameters are
//! deserialized into fully-populated structs when the plan is parsed, so
//! checks and actions never resolve defaults at run time. New variants are
//! added with [`Registry::register_check`] / [`Registry::register_action`];
//! the interpreter does not change.

use crate::action::{
    Action, ActionConditions, OverwriteDirectoryAction, OverwriteFileAction, OverwriteParams,
};
use crate::check::{
    Check, FileUnalteredChecker, FileUnalteredParams, PathExistsChecker, RepoIsCleanChecker,
    RepoParams,
};
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Builds a check from its raw parameters
pub type CheckBuilder = Box<dyn Fn(Value) -> Result<Box<dyn Check>> + Send + Sync>;

/// Builds an action from its raw parameters and parsed conditions
pub type ActionBuilder =
    Box<dyn Fn(Value, ActionConditions) -> Result<Box<dyn Action>> + Send + Sync>;

/// Registry of check and action constructors keyed by type string
#[derive(Default)]
pub struct Registry {
    checks: HashMap<String, CheckBuilder>,
    actions: HashMap<String, ActionBuilder>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut checks: Vec<_> = self.checks.keys().collect();
        let mut actions: Vec<_> = self.actions.keys().collect();
        checks.sort();
        actions.sort();
        f.debug_struct("Registry")
            .field("checks", &checks)
            .field("actions", &actions)
            .finish()
    }
}

impl Registry {
    /// A registry with no types
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry with every built-in check and action
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry
            .register_check(RepoIsCleanChecker::KIND, |raw| {
                let params: RepoParams = params(RepoIsCleanChecker::KIND, raw)?;
                Ok(Box::new(RepoIsCleanChecker { params }))
            })
            .register_check(PathExistsChecker::KIND, |raw| {
                let params: RepoParams = params(PathExistsChecker::KIND, raw)?;
                Ok(Box::new(PathExistsChecker { params }))
            })
            .register_check(FileUnalteredChecker::KIND, |raw| {
                let params: FileUnalteredParams = params(FileUnalteredChecker::KIND, raw)?;
                Ok(Box::new(FileUnalteredChecker { params }))
            })
            .register_action(OverwriteFileAction::KIND, |raw, conditions| {
                let params: OverwriteParams = params(OverwriteFileAction::KIND, raw)?;
                Ok(Box::new(OverwriteFileAction { conditions, params }))
            })
            .register_action(OverwriteDirectoryAction::KIND, |raw, conditions| {
                let params: OverwriteParams = params(OverwriteDirectoryAction::KIND, raw)?;
                Ok(Box::new(OverwriteDirectoryAction { conditions, params }))
            });
        registry
    }

    /// Register (or replace) a check type
    pub fn register_check<F>(&mut self, kind: impl Into<String>, builder: F) -> &mut Self
    where
        F: Fn(Value) -> Result<Box<dyn Check>> + Send + Sync + 'static,
    {
        self.checks.insert(kind.into(), Box::new(builder));
        self
    }

    /// Register (or replace) an action type
    pub fn register_action<F>(&mut self, kind: impl Into<String>, builder: F) -> &mut Self
    where
        F: Fn(Value, ActionConditions) -> Result<Box<dyn Action>> + Send + Sync + 'static,
    {
        self.actions.insert(kind.into(), Box::new(builder));
        self
    }

    /// Build a check of type `kind`
    ///
    /// # Errors
    ///
    /// Fails for unknown types and for parameters that do not match the type.
    pub fn build_check(&self, kind: &str, raw: Value) -> Result<Box<dyn Check>> {
        let builder = self.checks.get(kind).ok_or_else(|| Error::UnknownCheck {
            kind: kind.to_string(),
        })?;
        builder(raw)
    }

    /// Build an action of type `kind` guarded by `conditions`
    ///
    /// # Errors
    ///
    /// Fails for unknown types and for parameters that do not match the type.
    pub fn build_action(
        &self,
        kind: &str,
        raw: Value,
        conditions: ActionConditions,
    ) -> Result<Box<dyn Action>> {
        let builder = self.actions.get(kind).ok_or_else(|| Error::UnknownAction {
            kind: kind.to_string(),
        })?;
        builder(raw, conditions)
    }

    /// Whether a check type is registered
    pub fn has_check(&self, kind: &str) -> bool {
        self.checks.contains_key(kind)
    }

    /// Whether an action type is registered
    pub fn has_action(&self, kind: &str) -> bool {
        self.actions.contains_key(kind)
    }
}

/// Deserialize type-specific parameters, treating absent/null as all defaults
pub fn params<T>(kind: &str, raw: Value) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if raw.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(raw).map_err(|e| Error::InvalidParams {
        kind: kind.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_types() {
        let registry = Registry::builtin();
        for kind in ["repo_is_clean", "exists", "file_unaltered"] {
            assert!(registry.has_check(kind), "{kind}");
        }
        for kind in ["overwrite_file", "overwrite_directory"] {
            assert!(registry.has_action(kind), "{kind}");
        }
    }

    #[test]
    fn test_unknown_types() {
        let registry = Registry::builtin();
        let err = registry.build_check("nil", Value::Null).unwrap_err();
        assert!(matches!(err, Error::UnknownCheck { .. }));
        assert_eq!(err.to_string(), "unknown checker type \"nil\"");

        let err = registry
            .build_action("merge_go_mod", Value::Null, ActionConditions::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownAction { .. }));
    }

    #[test]
    fn test_invalid_params() {
        let registry = Registry::builtin();
        let err = registry
            .build_check("exists", json!({"repo": "upstream"}))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParams { .. }));

        let err = registry
            .build_action(
                "overwrite_file",
                json!({"create": "yes"}),
                ActionConditions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParams { .. }));
    }

    #[test]
    fn test_register_custom_check() {
        #[derive(Debug)]
        struct Always;
        impl Check for Always {
            fn kind(&self) -> &str {
                "always"
            }
            fn check(
                &self,
                _path: &skelsync_core::path::RelPath,
                _setup: &crate::setup::Setup,
            ) -> Result<()> {
                Ok(())
            }
        }

        let mut registry = Registry::empty();
        assert!(!registry.has_check("always"));
        registry.register_check("always", |_| Ok(Box::new(Always)));
        assert_eq!(registry.build_check("always", json!({})).unwrap().kind(), "always");
    }

    #[test]
    fn test_null_params_are_defaults() {
        let params: OverwriteParams = params("overwrite_file", Value::Null).unwrap();
        assert!(!params.create);
    }
}
