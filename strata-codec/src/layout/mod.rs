//! The resolved, physical shape of a group.
//!
//! A [`FieldLayout`] is built once per group by the [`SchemaResolver`] and is immutable from then
//! on. Its top-level fields start with the fixed identity fields (`vertex`, or `source`,
//! `destination` and `directed`) followed by the properties in declaration order. Every node
//! carries its index among its siblings; indices are contiguous from zero at every level.

mod cache;
mod display;
mod resolve;

use std::ops::Range;

pub use cache::*;
pub use resolve::*;
use strata_dtype::{
    ElementKind, FieldName, GroupName, LogicalType, PhysicalType, Repetition, ScalarType,
};
use strata_error::{FieldLocation, StrataResult, strata_bail};

use crate::{CompositeConverterRef, ConversionRule, ValueConverter};

/// A primitive leaf: its physical type and, for schema-declared scalars, the logical type it
/// holds. Leaves of composite properties are opaque and have no logical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveField {
    physical: PhysicalType,
    logical: Option<ScalarType>,
}

impl PrimitiveField {
    pub fn new(physical: PhysicalType, logical: ScalarType) -> Self {
        Self {
            physical,
            logical: Some(logical),
        }
    }

    /// A leaf written and read by a composite converter.
    pub fn opaque(physical: PhysicalType) -> Self {
        Self {
            physical,
            logical: None,
        }
    }

    pub fn physical(&self) -> PhysicalType {
        self.physical
    }

    pub fn logical(&self) -> Option<ScalarType> {
        self.logical
    }
}

/// What a node of the layout tree holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A single scalar leaf.
    Primitive(PrimitiveField),
    /// A LIST group: a repeated `list` wrapper whose groups hold one `element` field.
    List(Box<FieldNode>),
    /// A MAP group: a repeated `key_value` wrapper whose groups hold a `key` and a `value` field.
    Map(Box<FieldNode>, Box<FieldNode>),
    /// A composite nested inside a LIST or MAP.
    Composite(CompositeField),
}

/// A composite value inside a LIST or MAP, written through its registered converter.
///
/// A composite with a single leaf is written as that primitive leaf. Otherwise the field holds a
/// group with one field per leaf, named `{name}{sep}{i}` and indexed from zero.
#[derive(Debug, Clone)]
pub struct CompositeField {
    converter: CompositeConverterRef,
    leaves: Vec<FieldNode>,
}

impl CompositeField {
    pub(crate) fn new(converter: CompositeConverterRef, leaves: Vec<FieldNode>) -> Self {
        Self { converter, leaves }
    }

    pub fn converter(&self) -> &CompositeConverterRef {
        &self.converter
    }

    pub fn leaves(&self) -> &[FieldNode] {
        &self.leaves
    }

    /// Whether the composite is written as a single primitive leaf rather than a group.
    pub fn is_flat(&self) -> bool {
        self.leaves.len() == 1
    }
}

impl PartialEq for CompositeField {
    fn eq(&self, other: &Self) -> bool {
        self.converter.id() == other.converter.id() && self.leaves == other.leaves
    }
}

impl Eq for CompositeField {}

/// Which logical slot a top-level physical field belongs to.
///
/// This is recorded when the layout is resolved so that nothing downstream has to recover the
/// owning property by parsing physical field names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldOrigin {
    owner: FieldName,
    leaf: usize,
}

impl FieldOrigin {
    /// The identity slot (`vertex`, `source`, ...) or property the field belongs to.
    pub fn owner(&self) -> &FieldName {
        &self.owner
    }

    /// Position of the field among the leaves of its owner.
    pub fn leaf(&self) -> usize {
        self.leaf
    }
}

/// A node of the layout tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNode {
    index: usize,
    name: FieldName,
    repetition: Repetition,
    kind: FieldKind,
    origin: Option<FieldOrigin>,
}

impl FieldNode {
    pub(crate) fn new(
        index: usize,
        name: impl Into<FieldName>,
        repetition: Repetition,
        kind: FieldKind,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            repetition,
            kind,
            origin: None,
        }
    }

    pub(crate) fn with_origin(mut self, owner: FieldName, leaf: usize) -> Self {
        self.origin = Some(FieldOrigin { owner, leaf });
        self
    }

    /// The index of this field among its siblings.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &FieldName {
        &self.name
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// The owning slot of a top-level field; `None` for fields nested inside a LIST or MAP.
    pub fn origin(&self) -> Option<&FieldOrigin> {
        self.origin.as_ref()
    }

    /// The fields directly nested inside this one, skipping the implicit repeated wrapper.
    ///
    /// The leaf of a flat composite is listed too, although it is written in place of its parent.
    pub fn children(&self) -> Vec<&FieldNode> {
        match &self.kind {
            FieldKind::Primitive(_) => vec![],
            FieldKind::List(element) => vec![element.as_ref()],
            FieldKind::Map(key, value) => vec![key.as_ref(), value.as_ref()],
            FieldKind::Composite(composite) => composite.leaves.iter().collect(),
        }
    }
}

/// How one logical slot (an identity component or a property) maps onto top-level fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyLayout {
    name: FieldName,
    dtype: LogicalType,
    rule: ConversionRule,
    fields: Range<usize>,
    required: bool,
}

impl PropertyLayout {
    pub(crate) fn new(
        name: FieldName,
        dtype: LogicalType,
        rule: ConversionRule,
        fields: Range<usize>,
        required: bool,
    ) -> Self {
        Self {
            name,
            dtype,
            rule,
            fields,
            required,
        }
    }

    pub fn name(&self) -> &FieldName {
        &self.name
    }

    pub fn dtype(&self) -> &LogicalType {
        &self.dtype
    }

    pub fn rule(&self) -> &ConversionRule {
        &self.rule
    }

    /// The top-level physical indices occupied by this slot.
    pub fn field_range(&self) -> Range<usize> {
        self.fields.clone()
    }

    /// Number of top-level physical fields this slot expands into.
    pub fn leaf_count(&self) -> usize {
        self.fields.len()
    }

    /// Identity slots are required; properties are optional.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Location of this slot's first field, for error reporting.
    pub fn location(&self) -> FieldLocation {
        FieldLocation::property(self.name.clone(), self.fields.start)
    }
}

/// The resolved physical layout of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    group: GroupName,
    kind: ElementKind,
    fields: Vec<FieldNode>,
    identity: Vec<PropertyLayout>,
    properties: Vec<PropertyLayout>,
}

impl FieldLayout {
    pub(crate) fn new(
        group: GroupName,
        kind: ElementKind,
        fields: Vec<FieldNode>,
        identity: Vec<PropertyLayout>,
        properties: Vec<PropertyLayout>,
    ) -> Self {
        Self {
            group,
            kind,
            fields,
            identity,
            properties,
        }
    }

    pub fn group(&self) -> &GroupName {
        &self.group
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// All top-level fields in physical order.
    pub fn fields(&self) -> &[FieldNode] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldNode> {
        self.fields.get(index)
    }

    /// The fixed identity slots, in physical order.
    pub fn identity(&self) -> &[PropertyLayout] {
        &self.identity
    }

    /// The property slots, in physical order.
    pub fn properties(&self) -> &[PropertyLayout] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyLayout> {
        self.properties.iter().find(|p| p.name.as_ref() == name)
    }

    /// Number of primitive leaves in the whole tree.
    pub fn leaf_count(&self) -> usize {
        fn count(node: &FieldNode) -> usize {
            match node.kind() {
                FieldKind::Primitive(_) => 1,
                _ => node.children().into_iter().map(count).sum(),
            }
        }
        self.fields.iter().map(count).sum()
    }

    /// Number of top-level fields taken by the identity slots.
    pub fn identity_field_count(&self) -> usize {
        self.identity.last().map(|p| p.fields.end).unwrap_or(0)
    }

    /// The top-level fields of one slot.
    pub fn slot_fields(&self, slot: &PropertyLayout) -> &[FieldNode] {
        &self.fields[slot.field_range()]
    }

    /// The value converter for one slot of this layout.
    pub fn converter<'a>(&'a self, slot: &'a PropertyLayout) -> ValueConverter<'a> {
        ValueConverter::new(slot, self.slot_fields(slot))
    }

    /// Check that sibling indices are exactly `0..n` at every level of the tree.
    pub fn check_contiguous(&self) -> StrataResult<()> {
        check_siblings(self.fields.iter().collect(), &self.group)
    }
}

fn check_siblings(siblings: Vec<&FieldNode>, group: &GroupName) -> StrataResult<()> {
    for (expected, node) in siblings.iter().enumerate() {
        if node.index != expected {
            strata_bail!(
                SchemaResolution @ FieldLocation::group(group.clone()).with_index(expected) =>
                "field `{}` has index {} but sits at position {}",
                node.name,
                node.index,
                expected
            );
        }
        check_siblings(node.children(), group)?;
    }
    Ok(())
}
