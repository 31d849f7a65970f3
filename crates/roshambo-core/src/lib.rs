//! Roshambo Core - Fundamental types and rules
//!
//! This crate defines the types shared across the session runtime:
//! - Identifiers (PlayerId) and id generation
//! - Domain model (Player, Choice, Status, round and game results)
//! - The scoring and ranking rule table
//! - Error taxonomy

pub mod error;
pub mod id;
pub mod model;
pub mod rules;

pub use error::*;
pub use id::*;
pub use model::*;
pub use rules::*;
