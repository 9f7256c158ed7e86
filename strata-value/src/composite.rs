use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;

use strata_dtype::CompositeId;

/// An opaque, group-specific value that is stored by fanning it out into several physical leaves.
///
/// The codec never looks inside a composite object; the converter registered for its
/// [`CompositeId`] does.
pub trait CompositeObject: Debug + Send + Sync + 'static {
    /// The id of the composite type, used to select its converter.
    fn composite_id(&self) -> CompositeId;

    fn as_any(&self) -> &dyn Any;

    /// Equality against another, possibly differently typed, composite object.
    fn eq_composite(&self, other: &dyn CompositeObject) -> bool;
}

/// A shared reference to a composite object.
pub type CompositeRef = Arc<dyn CompositeObject>;

impl dyn CompositeObject {
    pub fn downcast_ref<T: CompositeObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}
