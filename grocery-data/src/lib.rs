//! External data sources for the grocery reminder engine.
//!
//! Responsibilities:
//! - Implement the `grocery-core` service traits against real backends.
//! - Encapsulate wire formats so the core never sees JSON.
//!
//! Boundaries:
//! - Do not encode domain rules (filtering, throttling and persistence live
//!   in `grocery-core`).
//! - Keep the async HTTP client behind the synchronous core traits.

pub mod places;
