//! Messenger client library
//!
//! Client-side core of the messenger's registration and login flow:
//! form validation, and a JSON-over-HTTP client whose every call resolves to
//! a uniform [`Outcome`] instead of an error. It has no UI dependency and is
//! meant to be shared by every front end.

pub mod api;
pub mod auth;
pub mod debounce;
pub mod error;
pub mod model;
pub mod validation;

mod client;
mod config;
mod outcome;

pub use client::*;
pub use config::*;
pub use outcome::*;
pub use reqwest::Method;
