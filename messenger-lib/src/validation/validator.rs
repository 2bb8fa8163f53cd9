//! Field and form validation
//!
//! Everything here is pure: the same inputs always produce the same
//! messages, so callers may validate on every keystroke, on blur, or on
//! submit without coordination.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::hash::Hash;

use super::FieldRule;
use super::FormRuleSet;
use crate::error::FieldValidationError;
use crate::error::ValidationErrors;

// =============================================================================
// ValidationResult
// =============================================================================

/// Ordered error messages for one field. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    /// Returns `true` if the field has no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns the first error, which is what single-message UIs display.
    pub fn first(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    fn push(&mut self, message: String) {
        self.errors.push(message);
    }
}

impl IntoIterator for ValidationResult {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

// =============================================================================
// Field validation
// =============================================================================

/// Validates one value against one rule.
///
/// Checks run on the trimmed value in this order:
///
/// 1. required: an empty required value reports "`{label} is required`" and
///    nothing else; an empty optional value reports nothing at all
/// 2. minimum and maximum length (in characters)
/// 3. pattern
/// 4. equality with `sibling`, when a non-empty sibling value is given
///
/// Stages 2 to 4 each append independently.
///
/// # Example
///
/// ```
/// use messenger_lib::validation::{validate_field, FieldRule};
///
/// let rule = FieldRule::new("login", "Username").min_length(3);
/// let result = validate_field("ab", &rule, None);
/// assert_eq!(result.first(), Some("Username must be at least 3 characters"));
/// ```
pub fn validate_field(value: &str, rule: &FieldRule, sibling: Option<&str>) -> ValidationResult {
    let mut result = ValidationResult::default();
    let trimmed = value.trim();

    if trimmed.is_empty() {
        if rule.is_required() {
            result.push(rule.required_message());
        }
        return result;
    }

    let length = trimmed.chars().count();

    if let Some(min) = rule.min_len().filter(|&min| length < min) {
        result.push(rule.min_length_message(min));
    }

    if let Some(max) = rule.max_len().filter(|&max| length > max) {
        result.push(rule.max_length_message(max));
    }

    if rule
        .pattern_regex()
        .is_some_and(|pattern| !pattern.is_match(trimmed))
    {
        result.push(rule.pattern_failure_message());
    }

    // Passwords are submitted untrimmed, so equality compares raw values.
    if sibling.is_some_and(|sibling| !sibling.is_empty() && sibling != value) {
        result.push(rule.mismatch_failure_message());
    }

    result
}

// =============================================================================
// Form values
// =============================================================================

/// A snapshot of raw form input, looked up by field name.
///
/// Missing fields are treated as empty strings.
pub trait FieldValues {
    /// Returns the raw value of `field`, if present.
    fn value(&self, field: &str) -> Option<&str>;
}

impl<K, V, S> FieldValues for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn value(&self, field: &str) -> Option<&str> {
        self.get(field).map(AsRef::as_ref)
    }
}

impl<K, V> FieldValues for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn value(&self, field: &str) -> Option<&str> {
        self.get(field).map(AsRef::as_ref)
    }
}

impl<K, V> FieldValues for [(K, V)]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn value(&self, field: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.as_ref() == field)
            .map(|(_, v)| v.as_ref())
    }
}

impl<K, V, const N: usize> FieldValues for [(K, V); N]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn value(&self, field: &str) -> Option<&str> {
        self.as_slice().value(field)
    }
}

// =============================================================================
// Form validation
// =============================================================================

/// Per-field results of validating a whole form, in rule-set order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValidation {
    fields: Vec<(String, ValidationResult)>,
}

impl FormValidation {
    /// Returns `true` if every field is valid.
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|(_, result)| result.is_valid())
    }

    /// Returns the result for one field.
    pub fn get(&self, field: &str) -> Option<&ValidationResult> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, result)| result)
    }

    /// Returns the first error of one field.
    pub fn first_error(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(ValidationResult::first)
    }

    /// Iterates `(field, result)` pairs in rule-set order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationResult)> {
        self.fields
            .iter()
            .map(|(name, result)| (name.as_str(), result))
    }

    /// Total number of errors across all fields.
    pub fn error_count(&self) -> usize {
        self.fields.iter().map(|(_, result)| result.len()).sum()
    }

    /// Flattens every error into [`FieldValidationError`]s.
    pub fn field_errors(&self) -> Vec<FieldValidationError> {
        self.fields
            .iter()
            .flat_map(|(name, result)| {
                result
                    .errors()
                    .iter()
                    .map(move |message| FieldValidationError::new(name.clone(), message.clone()))
            })
            .collect()
    }

    /// Returns `Ok(())` when valid, otherwise every violation.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ValidationErrors::new(self.field_errors()))
        }
    }
}

/// Validates every field of `rule_set` against one snapshot of `values`.
///
/// Confirmation rules compare against the sibling's value from the same
/// snapshot, so revalidating after either field changes gives consistent
/// results.
pub fn validate_form<V>(values: &V, rule_set: &FormRuleSet) -> FormValidation
where
    V: FieldValues + ?Sized,
{
    let fields = rule_set
        .iter()
        .map(|rule| {
            (
                rule.field_name().to_string(),
                check_rule(values, rule),
            )
        })
        .collect();

    FormValidation { fields }
}

/// Validates a single field of a form, e.g. on blur.
///
/// Returns `None` if `rule_set` has no rule for `field`.
pub fn validate_form_field<V>(values: &V, rule_set: &FormRuleSet, field: &str) -> Option<ValidationResult>
where
    V: FieldValues + ?Sized,
{
    rule_set.get(field).map(|rule| check_rule(values, rule))
}

fn check_rule<V>(values: &V, rule: &FieldRule) -> ValidationResult
where
    V: FieldValues + ?Sized,
{
    let value = values.value(rule.field_name()).unwrap_or_default();
    let sibling = rule
        .sibling()
        .map(|name| values.value(name).unwrap_or_default());
    validate_field(value, rule, sibling)
}
