use std::fmt::{Display, Formatter};

use itertools::Itertools;
use strata_value::ScalarValue;

/// The physical form of a value for one field of the layout tree.
///
/// This is what the value converter produces for the encoder and what the decoder reassembles
/// from a physical record before converting back into a logical value.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalValue {
    /// The field is not written.
    Null,
    /// A primitive leaf value.
    Scalar(ScalarValue),
    /// The elements of a LIST field.
    List(Vec<PhysicalValue>),
    /// The key/value entries of a MAP field.
    Map(Vec<(PhysicalValue, PhysicalValue)>),
    /// The leaves of a nested composite written as a group.
    Group(Vec<PhysicalValue>),
}

impl PhysicalValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PhysicalValue::Null)
    }

    /// A short name for the shape of this value, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            PhysicalValue::Null => "null",
            PhysicalValue::Scalar(_) => "scalar",
            PhysicalValue::List(_) => "list",
            PhysicalValue::Map(_) => "map",
            PhysicalValue::Group(_) => "group",
        }
    }
}

impl From<Option<ScalarValue>> for PhysicalValue {
    fn from(value: Option<ScalarValue>) -> Self {
        value.map_or(PhysicalValue::Null, PhysicalValue::Scalar)
    }
}

impl Display for PhysicalValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PhysicalValue::Null => write!(f, "null"),
            PhysicalValue::Scalar(s) => write!(f, "{s}"),
            PhysicalValue::List(items) => write!(f, "[{}]", items.iter().format(", ")),
            PhysicalValue::Group(leaves) => write!(f, "({})", leaves.iter().format(", ")),
            PhysicalValue::Map(entries) => {
                let entries = entries.iter().map(|(k, v)| format!("{k}: {v}"));
                write!(f, "{{{}}}", entries.format(", "))
            }
        }
    }
}
