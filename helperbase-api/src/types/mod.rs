//! API Request and Response Types
//!
//! Request bodies, query parameters and response envelopes for the
//! Helperbase REST API. Records themselves come from `helperbase_core`.

// Helper types
mod helper;
pub use helper::*;

// Incident types
mod incident;
pub use incident::*;

// User types
mod user;
pub use user::*;

// Session types
mod session;
pub use session::*;

// Form step validation types
mod form;
pub use form::*;

// Cache administration types
mod cache;
pub use cache::*;
