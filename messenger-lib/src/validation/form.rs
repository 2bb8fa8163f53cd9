//! Typed registration and login forms

use std::sync::LazyLock;

use super::CONFIRM_PASSWORD_FIELD;
use super::FormRuleSet;
use super::FormValidation;
use super::LOGIN_FIELD;
use super::PASSWORD_FIELD;
use super::ValidationResult;
use super::validate_form;
use super::validate_form_field;
use crate::error::ValidationErrors;
use crate::model::Credentials;

static REGISTRATION_RULES: LazyLock<FormRuleSet> = LazyLock::new(FormRuleSet::registration);
static LOGIN_RULES: LazyLock<FormRuleSet> = LazyLock::new(FormRuleSet::login);

/// Raw input of the registration form.
///
/// # Example
///
/// ```
/// use messenger_lib::validation::RegistrationForm;
///
/// let form = RegistrationForm::new(" bob ", "secret1", "secret1");
/// let credentials = form.into_credentials().unwrap();
/// assert_eq!(credentials.login, "bob");
/// ```
#[derive(Clone, Default)]
pub struct RegistrationForm {
    pub login: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn new(
        login: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Returns the rule set this form validates against.
    pub fn rules() -> &'static FormRuleSet {
        &REGISTRATION_RULES
    }

    fn values(&self) -> [(&str, &str); 3] {
        [
            (LOGIN_FIELD, self.login.as_str()),
            (PASSWORD_FIELD, self.password.as_str()),
            (CONFIRM_PASSWORD_FIELD, self.confirm_password.as_str()),
        ]
    }

    /// Validates every field.
    pub fn validate(&self) -> FormValidation {
        validate_form(&self.values(), Self::rules())
    }

    /// Validates one field against the current values of the others.
    pub fn validate_field(&self, field: &str) -> Option<ValidationResult> {
        validate_form_field(&self.values(), Self::rules(), field)
    }

    /// Converts valid input into the registration request body.
    ///
    /// The login is trimmed; the password is sent exactly as typed.
    pub fn into_credentials(self) -> Result<Credentials, ValidationErrors> {
        self.validate().into_result()?;
        Ok(Credentials::new(self.login.trim(), self.password))
    }
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .finish()
    }
}

/// Raw input of the login form.
#[derive(Clone, Default)]
pub struct LoginForm {
    pub login: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }

    /// Returns the rule set this form validates against.
    pub fn rules() -> &'static FormRuleSet {
        &LOGIN_RULES
    }

    fn values(&self) -> [(&str, &str); 2] {
        [
            (LOGIN_FIELD, self.login.as_str()),
            (PASSWORD_FIELD, self.password.as_str()),
        ]
    }

    pub fn validate(&self) -> FormValidation {
        validate_form(&self.values(), Self::rules())
    }

    pub fn validate_field(&self, field: &str) -> Option<ValidationResult> {
        validate_form_field(&self.values(), Self::rules(), field)
    }

    /// Converts valid input into the login request body.
    pub fn into_credentials(self) -> Result<Credentials, ValidationErrors> {
        self.validate().into_result()?;
        Ok(Credentials::new(self.login.trim(), self.password))
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
