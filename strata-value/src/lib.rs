//! Values flowing through the Strata codec.
//!
//! [`LogicalValue`] is what callers put into element properties, [`ScalarValue`] is what a single
//! physical leaf column holds, and [`Element`] is the graph record that ties them to a group.

pub use composite::*;
pub use element::*;
pub use logical::*;
pub use map::*;
pub use scalar::*;

mod composite;
mod element;
mod logical;
mod map;
mod scalar;
