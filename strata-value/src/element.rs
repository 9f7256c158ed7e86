use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use strata_dtype::{ElementKind, FieldName, GroupName};

use crate::LogicalValue;

/// The named properties of an element.
///
/// A missing key and a key holding [`LogicalValue::Null`] are different things to a caller, even
/// though both are stored as an absent physical field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(BTreeMap<FieldName, LogicalValue>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<FieldName>,
        value: impl Into<LogicalValue>,
    ) -> Option<LogicalValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&LogicalValue> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<LogicalValue> {
        self.0.remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldName, &LogicalValue)> + '_ {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &FieldName> + '_ {
        self.0.keys()
    }
}

impl<K: Into<FieldName>, V: Into<LogicalValue>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Display for Properties {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.0.iter().map(|(k, v)| format!("{k}: {v}")).join(", ")
        )
    }
}

/// A graph record identified by a single vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    group: GroupName,
    vertex: LogicalValue,
    properties: Properties,
}

impl Entity {
    pub fn new(group: impl Into<GroupName>, vertex: impl Into<LogicalValue>) -> Self {
        Self {
            group: group.into(),
            vertex: vertex.into(),
            properties: Properties::new(),
        }
    }

    pub fn with_property(
        mut self,
        name: impl Into<FieldName>,
        value: impl Into<LogicalValue>,
    ) -> Self {
        self.properties.insert(name, value);
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn group(&self) -> &GroupName {
        &self.group
    }

    pub fn vertex(&self) -> &LogicalValue {
        &self.vertex
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

/// A graph record connecting a source vertex to a destination vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    group: GroupName,
    source: LogicalValue,
    destination: LogicalValue,
    directed: bool,
    properties: Properties,
}

impl Edge {
    pub fn new(
        group: impl Into<GroupName>,
        source: impl Into<LogicalValue>,
        destination: impl Into<LogicalValue>,
        directed: bool,
    ) -> Self {
        Self {
            group: group.into(),
            source: source.into(),
            destination: destination.into(),
            directed,
            properties: Properties::new(),
        }
    }

    pub fn with_property(
        mut self,
        name: impl Into<FieldName>,
        value: impl Into<LogicalValue>,
    ) -> Self {
        self.properties.insert(name, value);
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn group(&self) -> &GroupName {
        &self.group
    }

    pub fn source(&self) -> &LogicalValue {
        &self.source
    }

    pub fn destination(&self) -> &LogicalValue {
        &self.destination
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

/// Either kind of graph record.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Entity(Entity),
    Edge(Edge),
}

impl Element {
    pub fn group(&self) -> &GroupName {
        match self {
            Element::Entity(e) => e.group(),
            Element::Edge(e) => e.group(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Entity(_) => ElementKind::Entity,
            Element::Edge(_) => ElementKind::Edge,
        }
    }

    pub fn properties(&self) -> &Properties {
        match self {
            Element::Entity(e) => e.properties(),
            Element::Edge(e) => e.properties(),
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Element::Entity(e) => Some(e),
            Element::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Element::Edge(e) => Some(e),
            Element::Entity(_) => None,
        }
    }
}

impl From<Entity> for Element {
    fn from(value: Entity) -> Self {
        Element::Entity(value)
    }
}

impl From<Edge> for Element {
    fn from(value: Edge) -> Self {
        Element::Edge(value)
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Entity(e) => write!(f, "{}[{}] {}", e.group, e.vertex, e.properties),
            Element::Edge(e) => write!(
                f,
                "{}[{} {} {}] {}",
                e.group,
                e.source,
                if e.directed { "->" } else { "--" },
                e.destination,
                e.properties
            ),
        }
    }
}
