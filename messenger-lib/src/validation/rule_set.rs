//! Ordered rule tables, one per form

use std::sync::LazyLock;

use regex::Regex;

use super::FieldRule;

/// Field name of the username input.
pub const LOGIN_FIELD: &str = "login";
/// Field name of the password input.
pub const PASSWORD_FIELD: &str = "password";
/// Field name of the password confirmation input.
pub const CONFIRM_PASSWORD_FIELD: &str = "confirmPassword";

static LOGIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("login pattern is a valid regex"));

/// An ordered mapping from field name to [`FieldRule`].
///
/// Iteration and validation follow insertion order. Adding a rule for a
/// field that already has one replaces it in place.
#[derive(Debug, Clone, Default)]
pub struct FormRuleSet {
    rules: Vec<FieldRule>,
}

impl FormRuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, replacing any existing rule for the same field.
    pub fn with(mut self, rule: FieldRule) -> Self {
        match self
            .rules
            .iter_mut()
            .find(|r| r.field_name() == rule.field_name())
        {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        self
    }

    /// Returns the rule for a field.
    pub fn get(&self, field_name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.field_name() == field_name)
    }

    /// Iterates rules in order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules for the registration form: `login`, `password`, `confirmPassword`.
    pub fn registration() -> Self {
        Self::new()
            .with(
                FieldRule::new(LOGIN_FIELD, "Username")
                    .required()
                    .min_length(3)
                    .max_length(50)
                    .pattern(LOGIN_PATTERN.clone())
                    .pattern_message(
                        "Username can only contain letters, numbers, hyphens, and underscores",
                    ),
            )
            .with(
                FieldRule::new(PASSWORD_FIELD, "Password")
                    .required()
                    .min_length(6)
                    .max_length(100),
            )
            .with(
                FieldRule::new(CONFIRM_PASSWORD_FIELD, "Password confirmation")
                    .required()
                    .matches(PASSWORD_FIELD)
                    .mismatch_message("Passwords do not match"),
            )
    }

    /// Rules for the login form: `login`, `password`.
    pub fn login() -> Self {
        Self::new()
            .with(FieldRule::new(LOGIN_FIELD, "Username").required())
            .with(FieldRule::new(PASSWORD_FIELD, "Password").required())
    }
}

impl<'a> IntoIterator for &'a FormRuleSet {
    type Item = &'a FieldRule;
    type IntoIter = std::slice::Iter<'a, FieldRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
