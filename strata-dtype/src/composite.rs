use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// A unique identifier for a composite type.
///
/// Composite values are opaque to the codec; the identifier selects the converter that knows how
/// to fan them out into physical leaves.
#[derive(Debug, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct CompositeId(Arc<str>);

impl CompositeId {
    /// Constructs a new `CompositeId` from a string
    pub fn new(value: Arc<str>) -> Self {
        Self(value)
    }
}

impl Display for CompositeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CompositeId {
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}

impl From<&str> for CompositeId {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}
