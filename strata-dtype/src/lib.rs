#![deny(missing_docs)]

//! A type system for Strata
//!
//! This crate contains the logical types that a graph schema declares for element identities and
//! properties, and the physical types of the leaf columns they are stored in. Resolving one into
//! the other is the job of `strata-codec`.

pub use composite::*;
pub use dtype::*;
pub use physical::*;
pub use scalar::*;
pub use schema::*;

mod composite;
mod dtype;
mod physical;
mod scalar;
mod schema;
