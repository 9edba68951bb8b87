//! Session module.
//!
//! Provides:
//! - Cookie parsing and the file-backed cookie store
//! - The explicit session context passed to every HTTP call

pub mod context;
pub mod cookies;

pub use context::SessionContext;
pub use cookies::{cookie_header, parse_cookie_string, Cookie, CookieStore, DEFAULT_COOKIE_DOMAIN};
