//! Token-to-skill registry.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::skill::Skill;

/// A command token must start with `/`, have something after it and contain
/// no whitespace.
pub fn is_valid_token(token: &str) -> bool {
    match token.strip_prefix('/') {
        Some(rest) => !rest.is_empty() && !rest.chars().any(char::is_whitespace),
        None => false,
    }
}

/// Flat mapping from command token to skill.
///
/// Aliases are indistinguishable from primary tokens once registered. The
/// last registration for a token wins.
#[derive(Default, Clone)]
pub struct SkillRegistry {
    skills: HashMap<String, Arc<dyn Skill>>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from candidates in order.
    ///
    /// Invalid candidates are skipped with a warning; they never abort the
    /// rest of the load.
    pub fn discover<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Skill>>,
    {
        let mut registry = Self::new();
        for skill in candidates {
            registry.register(skill);
        }
        info!(tokens = ?registry.tokens(), "Skills registered");
        registry
    }

    /// Register a skill under its primary token and every valid alias.
    ///
    /// Returns the number of tokens registered; zero when the primary token
    /// is invalid.
    pub fn register(&mut self, skill: Arc<dyn Skill>) -> usize {
        let primary = skill.command().to_string();
        if !is_valid_token(&primary) {
            warn!(command = %primary, "Skipping skill with invalid command token");
            return 0;
        }

        let mut registered = 0;
        self.insert(primary.clone(), Arc::clone(&skill));
        registered += 1;
        info!(command = %primary, "Loaded skill");

        for alias in skill.aliases() {
            if !is_valid_token(alias) {
                warn!(command = %primary, alias, "Skipping invalid alias");
                continue;
            }
            self.insert(alias.to_string(), Arc::clone(&skill));
            registered += 1;
            info!(alias, command = %primary, "Alias registered");
        }
        registered
    }

    fn insert(&mut self, token: String, skill: Arc<dyn Skill>) {
        if let Some(previous) = self.skills.insert(token.clone(), skill) {
            warn!(
                token = %token,
                previous = previous.command(),
                "Command token already registered; replacing previous skill"
            );
        }
    }

    pub fn get(&self, token: &str) -> Option<Arc<dyn Skill>> {
        self.skills.get(token).cloned()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.skills.contains_key(token)
    }

    /// All registered tokens, sorted.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self.skills.keys().cloned().collect();
        tokens.sort();
        tokens
    }

    /// `(token, description)` pairs, sorted by token.
    pub fn describe(&self) -> Vec<(String, String)> {
        self.tokens()
            .into_iter()
            .filter_map(|t| {
                self.skills
                    .get(&t)
                    .map(|s| (t.clone(), s.description().to_string()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::SkillError;
    use crate::skill::SkillContext;
    use async_trait::async_trait;

    /// Echoes its name, the invoked token and the argument.
    pub(crate) struct NamedSkill {
        pub name: &'static str,
        pub command: &'static str,
        pub aliases: Vec<&'static str>,
    }

    impl NamedSkill {
        pub fn new(name: &'static str, command: &'static str, aliases: &[&'static str]) -> Arc<dyn Skill> {
            Arc::new(Self {
                name,
                command,
                aliases: aliases.to_vec(),
            })
        }
    }

    #[async_trait]
    impl Skill for NamedSkill {
        fn command(&self) -> &str {
            self.command
        }

        fn aliases(&self) -> &[&str] {
            &self.aliases
        }

        fn description(&self) -> &str {
            "test skill"
        }

        async fn run(&self, arg: &str, ctx: &SkillContext) -> Result<String, SkillError> {
            Ok(format!("{}|{}|{}", self.name, ctx.invoked, arg))
        }
    }

    // ---- Token validation ----

    #[test]
    fn test_is_valid_token() {
        assert!(is_valid_token("/help"));
        assert!(is_valid_token("/clear_notes"));
        assert!(!is_valid_token("help"));
        assert!(!is_valid_token("/"));
        assert!(!is_valid_token(""));
        assert!(!is_valid_token("/two words"));
    }

    // ---- Registration ----

    #[test]
    fn test_register_primary_and_aliases() {
        let mut registry = SkillRegistry::new();
        let n = registry.register(NamedSkill::new("calc", "/calc", &["/calculate"]));
        assert_eq!(n, 2);
        assert!(registry.contains("/calc"));
        assert!(registry.contains("/calculate"));
        assert_eq!(registry.tokens(), vec!["/calc", "/calculate"]);
    }

    #[test]
    fn test_invalid_primary_skipped() {
        let mut registry = SkillRegistry::new();
        assert_eq!(registry.register(NamedSkill::new("bad", "bad", &["/alias"])), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_alias_skipped_alone() {
        let mut registry = SkillRegistry::new();
        let n = registry.register(NamedSkill::new("x", "/x", &["y", "/z"]));
        assert_eq!(n, 2);
        assert_eq!(registry.tokens(), vec!["/x", "/z"]);
    }

    #[test]
    fn test_discover_skips_invalid_and_continues() {
        let registry = SkillRegistry::discover(vec![
            NamedSkill::new("a", "/a", &[]),
            NamedSkill::new("broken", "", &[]),
            NamedSkill::new("b", "/b", &[]),
        ]);
        assert_eq!(registry.tokens(), vec!["/a", "/b"]);
    }

    #[test]
    fn test_collision_last_registration_wins() {
        let registry = SkillRegistry::discover(vec![
            NamedSkill::new("memory", "/remember", &[]),
            NamedSkill::new("notes", "/notes", &["/remember", "/clear_notes"]),
        ]);
        assert_eq!(registry.len(), 3);
        let skill = registry.get("/remember").unwrap();
        assert_eq!(skill.command(), "/notes");
    }

    #[test]
    fn test_describe_sorted() {
        let registry = SkillRegistry::discover(vec![
            NamedSkill::new("b", "/b", &[]),
            NamedSkill::new("a", "/a", &[]),
        ]);
        let described = registry.describe();
        assert_eq!(described[0], ("/a".to_string(), "test skill".to_string()));
        assert_eq!(described[1].0, "/b");
    }
}
