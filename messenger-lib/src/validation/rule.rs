//! Per-field validation rules

use regex::Regex;

/// Static validation configuration for one form field.
///
/// Rules are immutable once built. Construct them with [`FieldRule::new`] and
/// the chained setters:
///
/// ```
/// use messenger_lib::validation::FieldRule;
///
/// let rule = FieldRule::new("login", "Username")
///     .required()
///     .min_length(3)
///     .max_length(50);
///
/// assert!(rule.is_required());
/// assert_eq!(rule.min_len(), Some(3));
/// ```
#[derive(Debug, Clone)]
pub struct FieldRule {
    field_name: String,
    label: String,
    required: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<Regex>,
    pattern_message: Option<String>,
    matches: Option<String>,
    mismatch_message: Option<String>,
}

impl FieldRule {
    /// Creates an optional rule with no constraints.
    ///
    /// # Arguments
    ///
    /// * `field_name` - Key the field is submitted under (e.g., `login`)
    /// * `label` - Human-readable name used in error messages (e.g., `Username`)
    pub fn new(field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            label: label.into(),
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            pattern_message: None,
            matches: None,
            mismatch_message: None,
        }
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the minimum length, in characters, of the trimmed value.
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Sets the maximum length, in characters, of the trimmed value.
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Requires the trimmed value to match `pattern`.
    ///
    /// Without a custom message, failures read "`{label} format is invalid`".
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Sets the message reported when the pattern does not match.
    pub fn pattern_message(mut self, message: impl Into<String>) -> Self {
        self.pattern_message = Some(message.into());
        self
    }

    /// Requires the value to equal the value of the sibling field `field_name`.
    pub fn matches(mut self, field_name: impl Into<String>) -> Self {
        self.matches = Some(field_name.into());
        self
    }

    /// Sets the message reported when the value differs from its sibling.
    ///
    /// Without a custom message, failures read "`{label} does not match`".
    pub fn mismatch_message(mut self, message: impl Into<String>) -> Self {
        self.mismatch_message = Some(message.into());
        self
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn min_len(&self) -> Option<usize> {
        self.min_length
    }

    pub fn max_len(&self) -> Option<usize> {
        self.max_length
    }

    pub fn pattern_regex(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Returns the name of the sibling field this one must equal, if any.
    pub fn sibling(&self) -> Option<&str> {
        self.matches.as_deref()
    }

    pub(crate) fn required_message(&self) -> String {
        format!("{} is required", self.label)
    }

    pub(crate) fn min_length_message(&self, min: usize) -> String {
        format!("{} must be at least {} characters", self.label, min)
    }

    pub(crate) fn max_length_message(&self, max: usize) -> String {
        format!("{} must be no more than {} characters", self.label, max)
    }

    pub(crate) fn pattern_failure_message(&self) -> String {
        self.pattern_message
            .clone()
            .unwrap_or_else(|| format!("{} format is invalid", self.label))
    }

    pub(crate) fn mismatch_failure_message(&self) -> String {
        self.mismatch_message
            .clone()
            .unwrap_or_else(|| format!("{} does not match", self.label))
    }
}
