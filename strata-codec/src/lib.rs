//! Schema-driven codec between graph [elements](strata_value::Element) and nested columnar
//! records.
//!
//! A [`GroupSchema`](strata_dtype::GroupSchema) is resolved once into a [`FieldLayout`]: an
//! ordered tree of physical fields whose sibling indices are contiguous from zero. Elements are
//! then encoded into a stream of record events pushed into a [`RecordConsumer`], and physical
//! records are decoded back into elements against the same layout.
//!
//! ```text
//! GroupSchema --SchemaResolver--> FieldLayout
//! Element --RecordEncoder--> RecordConsumer events --RecordBuffer--> PhysicalRecord
//! PhysicalRecord --RecordDecoder--> Element
//! ```

pub use codec::*;
pub use convert::*;
pub use decoder::*;
pub use encoder::*;
pub use layout::*;
pub use options::*;
pub use record::*;
pub use sink::*;

mod codec;
mod convert;
mod decoder;
mod encoder;
mod layout;
mod options;
mod record;
mod sink;

/// Name of the vertex field of entity groups.
pub const VERTEX: &str = "vertex";
/// Name of the source field of edge groups.
pub const SOURCE: &str = "source";
/// Name of the destination field of edge groups.
pub const DESTINATION: &str = "destination";
/// Name of the direction flag of edge groups.
pub const DIRECTED: &str = "directed";

/// Name of the repeated wrapper group inside a LIST field.
pub const LIST_WRAPPER: &str = "list";
/// Name of the element field inside a LIST wrapper.
pub const LIST_ELEMENT: &str = "element";
/// Name of the repeated wrapper group inside a MAP field.
pub const MAP_WRAPPER: &str = "key_value";
/// Name of the key field inside a MAP wrapper.
pub const MAP_KEY: &str = "key";
/// Name of the value field inside a MAP wrapper.
pub const MAP_VALUE: &str = "value";
