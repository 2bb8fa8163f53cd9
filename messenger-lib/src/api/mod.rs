//! Backend endpoints

mod account;

pub use account::*;

/// Endpoint paths consumed by the client.
pub mod endpoints {
    pub const HEALTH: &str = "/health";
    pub const REGISTER: &str = "/register";
    pub const LOGIN: &str = "/login";
    pub const CURRENT_USER: &str = "/user/me";
}
