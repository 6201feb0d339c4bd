//! Rule lookup by game-type tag.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{GameRule, RuleError, TicTacToe};

/// Checks that `tag` is a non-empty run of ASCII letters, digits, and `-`.
///
/// # Errors
/// [`RuleError::UnknownGameType`] for anything else.
pub fn validate_game_type(tag: &str) -> Result<(), RuleError> {
    let well_formed =
        !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if well_formed {
        Ok(())
    } else {
        Err(RuleError::UnknownGameType(tag.to_string()))
    }
}

/// Named rule implementations.
///
/// Built once at startup and shared read-only afterwards, so lookups need no
/// locking.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Arc<dyn GameRule>>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the canonical 3×3 tic-tac-toe.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TicTacToe::default());
        registry
    }

    /// Adds `rule` under its own name, replacing any rule already there.
    pub fn register(&mut self, rule: impl GameRule) -> &mut Self {
        let name = rule.name().to_string();
        if self.rules.insert(name.clone(), Arc::new(rule)).is_some() {
            tracing::warn!(game_type = %name, "rule replaced");
        }
        self
    }

    /// Looks up the rule for `tag`.
    ///
    /// # Errors
    /// [`RuleError::UnknownGameType`] if the tag is malformed or nothing is
    /// registered under it.
    pub fn get(&self, tag: &str) -> Result<Arc<dyn GameRule>, RuleError> {
        validate_game_type(tag)?;
        self.rules
            .get(tag)
            .cloned()
            .ok_or_else(|| RuleError::UnknownGameType(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.rules.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
