//! Client-side form validation

mod form;
mod rule;
mod rule_set;
mod validator;

pub use form::*;
pub use rule::*;
pub use rule_set::*;
pub use validator::*;
