use std::fmt::Debug;
use std::sync::Arc;

use strata_dtype::{CompositeId, PhysicalType};
use strata_error::StrataResult;
use strata_value::{CompositeObject, CompositeRef, ScalarValue};

/// Converts the composite objects of one [`CompositeId`] to and from a fixed, ordered set of
/// physical leaves.
///
/// `to_physical` must return exactly `leaves().len()` values, each either null or of the
/// declared physical type, in the same order for every object. `to_logical` receives them back
/// in that order.
pub trait CompositeConverter: Debug + Send + Sync {
    fn id(&self) -> CompositeId;

    /// The physical types of the leaves, in write order.
    fn leaves(&self) -> &[PhysicalType];

    fn to_physical(&self, value: &dyn CompositeObject) -> StrataResult<Vec<Option<ScalarValue>>>;

    fn to_logical(&self, leaves: &[Option<ScalarValue>]) -> StrataResult<CompositeRef>;
}

/// An atomic shared reference to a [`CompositeConverter`].
pub type CompositeConverterRef = Arc<dyn CompositeConverter>;
