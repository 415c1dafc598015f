//! Stateless HTTP calls to the hosted services.

pub mod clerk_api;
pub mod gemini_api;
