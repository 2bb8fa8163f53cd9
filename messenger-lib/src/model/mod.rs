//! Request and response bodies of the account endpoints

mod user;

pub use user::*;
