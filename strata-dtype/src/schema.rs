use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::{LogicalType, PhysicalType};

/// A name for a property or physical field
pub type FieldName = Arc<str>;
/// The name of an element group
pub type GroupName = Arc<str>;

/// Whether a group describes entities (one vertex) or edges (a source and destination pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ElementKind {
    /// Elements identified by a single vertex
    Entity,
    /// Elements identified by a source, a destination and a direction flag
    Edge,
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::Entity => write!(f, "entity"),
            ElementKind::Edge => write!(f, "edge"),
        }
    }
}

/// A single declared property of a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyDef {
    name: FieldName,
    dtype: LogicalType,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    physical: Option<PhysicalType>,
}

impl PropertyDef {
    /// A property stored in the natural physical type of its logical type.
    pub fn new(name: impl Into<FieldName>, dtype: LogicalType) -> Self {
        Self {
            name: name.into(),
            dtype,
            physical: None,
        }
    }

    /// A scalar property stored in an explicitly chosen physical type.
    pub fn stored_as(
        name: impl Into<FieldName>,
        dtype: LogicalType,
        physical: PhysicalType,
    ) -> Self {
        Self {
            name: name.into(),
            dtype,
            physical: Some(physical),
        }
    }

    /// The property name
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// The logical type of the property
    pub fn dtype(&self) -> &LogicalType {
        &self.dtype
    }

    /// The explicitly requested physical type, if any
    pub fn physical(&self) -> Option<PhysicalType> {
        self.physical
    }
}

/// The logical schema of one element group.
///
/// Properties are kept in declaration order, which becomes their physical order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupSchema {
    group: GroupName,
    kind: ElementKind,
    identity: LogicalType,
    #[cfg_attr(feature = "serde", serde(default))]
    properties: Vec<PropertyDef>,
}

impl GroupSchema {
    /// Create a group schema with no properties.
    pub fn new(group: impl Into<GroupName>, kind: ElementKind, identity: LogicalType) -> Self {
        Self {
            group: group.into(),
            kind,
            identity,
            properties: Vec::new(),
        }
    }

    /// An entity group whose vertices have type `vertex`.
    pub fn entity(group: impl Into<GroupName>, vertex: LogicalType) -> Self {
        Self::new(group, ElementKind::Entity, vertex)
    }

    /// An edge group whose sources and destinations have type `vertex`.
    pub fn edge(group: impl Into<GroupName>, vertex: LogicalType) -> Self {
        Self::new(group, ElementKind::Edge, vertex)
    }

    /// Append a property stored in its natural physical type.
    pub fn with_property(mut self, name: impl Into<FieldName>, dtype: LogicalType) -> Self {
        self.properties.push(PropertyDef::new(name, dtype));
        self
    }

    /// Append a property stored in an explicit physical type.
    pub fn with_property_stored_as(
        mut self,
        name: impl Into<FieldName>,
        dtype: LogicalType,
        physical: PhysicalType,
    ) -> Self {
        self.properties
            .push(PropertyDef::stored_as(name, dtype, physical));
        self
    }

    /// The group name
    pub fn group(&self) -> &GroupName {
        &self.group
    }

    /// Whether the group holds entities or edges
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// The type of the vertex (entities) or of the source and destination (edges)
    pub fn identity(&self) -> &LogicalType {
        &self.identity
    }

    /// The declared properties, in declaration order
    pub fn properties(&self) -> &[PropertyDef] {
        &self.properties
    }

    /// Find a declared property by name
    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name.as_ref() == name)
    }
}

/// The set of group schemas bound to a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Schema {
    groups: Vec<GroupSchema>,
}

impl Schema {
    /// Create a schema from a list of groups.
    pub fn new(groups: Vec<GroupSchema>) -> Self {
        Self { groups }
    }

    /// Append a group.
    pub fn with_group(mut self, group: GroupSchema) -> Self {
        self.groups.push(group);
        self
    }

    /// All groups, in declaration order
    pub fn groups(&self) -> &[GroupSchema] {
        &self.groups
    }

    /// Find a group by name
    pub fn group(&self, name: &str) -> Option<&GroupSchema> {
        self.groups.iter().find(|g| g.group.as_ref() == name)
    }
}

impl FromIterator<GroupSchema> for Schema {
    fn from_iter<T: IntoIterator<Item = GroupSchema>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
