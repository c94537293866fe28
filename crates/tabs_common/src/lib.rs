//! Shared foundational types used across the tabs workspace.
//!
//! This crate provides the content digest used to fingerprint table
//! configurations, the scalar [`Value`] type shared by dataset cells and
//! table parameters, and the ordered [`Kwargs`] configuration map.

#![warn(missing_docs)]

pub mod hash;
pub mod value;

pub use hash::ContentHash;
pub use value::{KwargTypeError, Kwargs, Value};
