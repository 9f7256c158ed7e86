//! Conversion between logical values and the physical values of their fields.

mod composite;
mod context;
mod physical;

pub use composite::*;
pub use context::*;
pub use physical::*;
use strata_dtype::{PhysicalType, Repetition, ScalarType};
use strata_error::{FieldLocation, StrataResult, StrataResultExt, strata_bail, strata_err};
use strata_value::{LogicalMap, LogicalValue, ScalarValue};

use crate::{CompositeField, FieldKind, FieldNode, PrimitiveField, PropertyLayout};

/// How the value of one slot is expanded into physical leaves. Fixed at resolution time.
#[derive(Debug, Clone)]
pub enum ConversionRule {
    /// One primitive leaf holding a scalar, possibly widened.
    Scalar {
        logical: ScalarType,
        physical: PhysicalType,
    },
    /// One LIST or MAP field walked recursively.
    Nested,
    /// Fan-out through a registered composite converter.
    Composite(CompositeConverterRef),
}

impl ConversionRule {
    /// Number of top-level physical fields a value converted by this rule occupies.
    pub fn leaf_count(&self) -> usize {
        match self {
            ConversionRule::Scalar { .. } | ConversionRule::Nested => 1,
            ConversionRule::Composite(converter) => converter.leaves().len(),
        }
    }
}

impl PartialEq for ConversionRule {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                ConversionRule::Scalar { logical, physical },
                ConversionRule::Scalar {
                    logical: other_logical,
                    physical: other_physical,
                },
            ) => logical == other_logical && physical == other_physical,
            (ConversionRule::Nested, ConversionRule::Nested) => true,
            (ConversionRule::Composite(a), ConversionRule::Composite(b)) => {
                a.id() == b.id() && a.leaves() == b.leaves()
            }
            _ => false,
        }
    }
}

impl Eq for ConversionRule {}

/// Converts the value of one slot to and from the physical values of its top-level fields.
///
/// The output of [`ValueConverter::to_physical`] always has one entry per field of the slot,
/// null or not, so the encoder never has to guess how many index slots a property takes.
pub struct ValueConverter<'a> {
    slot: &'a PropertyLayout,
    nodes: &'a [FieldNode],
}

impl<'a> ValueConverter<'a> {
    pub fn new(slot: &'a PropertyLayout, nodes: &'a [FieldNode]) -> Self {
        Self { slot, nodes }
    }

    fn location(&self, node: &FieldNode) -> FieldLocation {
        FieldLocation::property(self.slot.name().clone(), node.index())
    }

    /// Convert a logical value, or its absence, to one physical value per field.
    pub fn to_physical(&self, value: Option<&LogicalValue>) -> StrataResult<Vec<PhysicalValue>> {
        let value = match value {
            None | Some(LogicalValue::Null) => {
                if self.slot.is_required() {
                    strata_bail!(
                        Conversion @ self.slot.location() =>
                        "required field `{}` has no value",
                        self.slot.name()
                    );
                }
                return Ok(vec![PhysicalValue::Null; self.nodes.len()]);
            }
            Some(value) => value,
        };

        match self.slot.rule() {
            ConversionRule::Composite(converter) => {
                let leaves = composite_to_leaves(converter, value, &self.slot.location())?;
                if leaves.len() != self.nodes.len() {
                    strata_bail!(
                        Conversion @ self.slot.location() =>
                        "converter for {} produced {} leaves, expected {}",
                        converter.id(),
                        leaves.len(),
                        self.nodes.len()
                    );
                }
                leaves
                    .into_iter()
                    .zip(self.nodes)
                    .map(|(leaf, node)| self.check_leaf(leaf, node).map(PhysicalValue::from))
                    .collect()
            }
            ConversionRule::Scalar { .. } | ConversionRule::Nested => {
                let [node] = self.nodes else {
                    strata_bail!(
                        Conversion @ self.slot.location() =>
                        "expected a single field, layout has {}",
                        self.nodes.len()
                    );
                };
                Ok(vec![value_to_physical(value, node, &self.location(node))?])
            }
        }
    }

    /// Convert the physical values of every field of the slot back to a logical value.
    ///
    /// Returns `None` when every field is null, i.e. the slot was not written.
    pub fn to_logical(&self, values: Vec<PhysicalValue>) -> StrataResult<Option<LogicalValue>> {
        if values.len() != self.nodes.len() {
            strata_bail!(
                Conversion @ self.slot.location() =>
                "expected {} leaves, found {}",
                self.nodes.len(),
                values.len()
            );
        }
        if values.iter().all(PhysicalValue::is_null) {
            if self.slot.is_required() {
                strata_bail!(
                    Conversion @ self.slot.location() =>
                    "required field `{}` is missing",
                    self.slot.name()
                );
            }
            return Ok(None);
        }

        match self.slot.rule() {
            ConversionRule::Composite(converter) => {
                let leaves = values
                    .into_iter()
                    .zip(self.nodes)
                    .map(|(value, node)| match value {
                        PhysicalValue::Null => self.check_leaf(None, node),
                        PhysicalValue::Scalar(s) => self.check_leaf(Some(s), node),
                        other => Err(strata_err!(
                            Conversion @ self.location(node) =>
                            "expected a primitive leaf, found {}",
                            other.shape()
                        )),
                    })
                    .collect::<StrataResult<Vec<_>>>()?;
                let object = converter
                    .to_logical(&leaves)
                    .context(format!("rebuilding composite {}", converter.id()))?;
                Ok(Some(LogicalValue::Composite(object)))
            }
            ConversionRule::Scalar { .. } | ConversionRule::Nested => {
                let (Some(value), [node]) = (values.into_iter().next(), self.nodes) else {
                    strata_bail!(
                        Conversion @ self.slot.location() =>
                        "expected a single field, layout has {}",
                        self.nodes.len()
                    );
                };
                physical_to_value(value, node, &self.location(node)).map(Some)
            }
        }
    }

    fn check_leaf(
        &self,
        leaf: Option<ScalarValue>,
        node: &FieldNode,
    ) -> StrataResult<Option<ScalarValue>> {
        check_leaf(leaf, node, self.slot.is_required(), &self.location(node))
    }
}

/// Check one composite leaf against the physical type of its field.
fn check_leaf(
    leaf: Option<ScalarValue>,
    node: &FieldNode,
    required: bool,
    loc: &FieldLocation,
) -> StrataResult<Option<ScalarValue>> {
    let FieldKind::Primitive(field) = node.kind() else {
        strata_bail!(
            Conversion @ loc =>
            "composite leaf `{}` is not a primitive field",
            node.name()
        );
    };
    match leaf {
        None if required => Err(strata_err!(
            Conversion @ loc =>
            "required leaf `{}` is null",
            node.name()
        )),
        Some(scalar) if scalar.physical_type() != field.physical() => Err(strata_err!(
            Conversion @ loc =>
            "leaf `{}` expects {}, found {}",
            node.name(),
            field.physical(),
            scalar.physical_type()
        )),
        leaf => Ok(leaf),
    }
}

/// Run a composite value through its converter.
fn composite_to_leaves(
    converter: &CompositeConverterRef,
    value: &LogicalValue,
    loc: &FieldLocation,
) -> StrataResult<Vec<Option<ScalarValue>>> {
    let Some(object) = value.as_composite() else {
        strata_bail!(
            Conversion @ loc =>
            "expected composite {}, found {}",
            converter.id(),
            value.type_name()
        );
    };
    if object.composite_id() != converter.id() {
        strata_bail!(
            UnsupportedValue @ loc =>
            "no conversion from {} to composite {}",
            value.type_name(),
            converter.id()
        );
    }
    converter.to_physical(object)
}

fn value_to_physical(
    value: &LogicalValue,
    node: &FieldNode,
    loc: &FieldLocation,
) -> StrataResult<PhysicalValue> {
    if value.is_null() {
        if node.repetition() == Repetition::Required {
            strata_bail!(Conversion @ loc => "required field `{}` is null", node.name());
        }
        return Ok(PhysicalValue::Null);
    }

    match node.kind() {
        FieldKind::Primitive(field) => {
            scalar_to_physical(value, *field, loc).map(PhysicalValue::Scalar)
        }
        FieldKind::List(element) => {
            let LogicalValue::List(items) = value else {
                strata_bail!(
                    Conversion @ loc =>
                    "expected list for `{}`, found {}",
                    node.name(),
                    value.type_name()
                );
            };
            items
                .iter()
                .map(|item| value_to_physical(item, element, loc))
                .collect::<StrataResult<Vec<_>>>()
                .map(PhysicalValue::List)
        }
        FieldKind::Map(key, val) => {
            let LogicalValue::Map(entries) = value else {
                strata_bail!(
                    Conversion @ loc =>
                    "expected map for `{}`, found {}",
                    node.name(),
                    value.type_name()
                );
            };
            entries
                .iter()
                .map(|(k, v)| {
                    Ok((
                        value_to_physical(k, key, loc)?,
                        value_to_physical(v, val, loc)?,
                    ))
                })
                .collect::<StrataResult<Vec<_>>>()
                .map(PhysicalValue::Map)
        }
        FieldKind::Composite(composite) => {
            let leaves = composite_to_leaves(composite.converter(), value, loc)?;
            if leaves.len() != composite.leaves().len() {
                strata_bail!(
                    Conversion @ loc =>
                    "converter for {} produced {} leaves, expected {}",
                    composite.converter().id(),
                    leaves.len(),
                    composite.leaves().len()
                );
            }
            let leaves = leaves
                .into_iter()
                .zip(composite.leaves())
                .map(|(leaf, node)| check_leaf(leaf, node, false, loc).map(PhysicalValue::from))
                .collect::<StrataResult<Vec<_>>>()?;
            Ok(match <[PhysicalValue; 1]>::try_from(leaves) {
                Ok([leaf]) => leaf,
                Err(leaves) => PhysicalValue::Group(leaves),
            })
        }
    }
}

fn scalar_to_physical(
    value: &LogicalValue,
    field: PrimitiveField,
    loc: &FieldLocation,
) -> StrataResult<ScalarValue> {
    let Some(actual) = value.scalar_type() else {
        strata_bail!(Conversion @ loc => "expected a scalar leaf, found {}", value.type_name());
    };
    if field.logical() != Some(actual) {
        strata_bail!(
            UnsupportedValue @ loc =>
            "value of type {} cannot be written to {} leaf",
            actual,
            field.physical()
        );
    }

    Ok(match (value, field.physical()) {
        (LogicalValue::Utf8(s), PhysicalType::Binary) => ScalarValue::utf8(s),
        (LogicalValue::Binary(b), PhysicalType::Binary) => ScalarValue::Binary(b.clone()),
        (LogicalValue::Bool(b), PhysicalType::Boolean) => ScalarValue::Boolean(*b),
        (LogicalValue::I32(v), PhysicalType::Int32) => ScalarValue::Int32(*v),
        (LogicalValue::I32(v), PhysicalType::Int64) => ScalarValue::Int64(i64::from(*v)),
        (LogicalValue::I64(v), PhysicalType::Int64) => ScalarValue::Int64(*v),
        (LogicalValue::F32(v), PhysicalType::Float) => ScalarValue::Float(*v),
        (LogicalValue::F32(v), PhysicalType::Double) => ScalarValue::Double(f64::from(*v)),
        (LogicalValue::F64(v), PhysicalType::Double) => ScalarValue::Double(*v),
        (value, physical) => strata_bail!(
            UnsupportedValue @ loc =>
            "value of type {} cannot be written to {} leaf",
            value.type_name(),
            physical
        ),
    })
}

fn physical_to_value(
    value: PhysicalValue,
    node: &FieldNode,
    loc: &FieldLocation,
) -> StrataResult<LogicalValue> {
    match (value, node.kind()) {
        (PhysicalValue::Null, _) => {
            if node.repetition() == Repetition::Required {
                strata_bail!(Conversion @ loc => "required field `{}` is missing", node.name());
            }
            Ok(LogicalValue::Null)
        }
        (PhysicalValue::Scalar(scalar), FieldKind::Primitive(field)) => {
            physical_to_scalar(scalar, *field, loc)
        }
        (PhysicalValue::List(items), FieldKind::List(element)) => items
            .into_iter()
            .map(|item| physical_to_value(item, element, loc))
            .collect::<StrataResult<Vec<_>>>()
            .map(LogicalValue::List),
        (PhysicalValue::Map(entries), FieldKind::Map(key, val)) => {
            let mut map = LogicalMap::new();
            for (k, v) in entries {
                let k = physical_to_value(k, key, loc)?;
                let v = physical_to_value(v, val, loc)?;
                if map.insert(k.clone(), v).is_some() {
                    strata_bail!(
                        Conversion @ loc =>
                        "map `{}` holds key {} more than once",
                        node.name(),
                        k
                    );
                }
            }
            Ok(LogicalValue::Map(map))
        }
        (PhysicalValue::Scalar(scalar), FieldKind::Composite(composite)) if composite.is_flat() => {
            composite_from_leaves(vec![PhysicalValue::Scalar(scalar)], composite, loc)
        }
        (PhysicalValue::Group(leaves), FieldKind::Composite(composite)) if !composite.is_flat() => {
            composite_from_leaves(leaves, composite, loc)
        }
        (value, kind) => Err(strata_err!(
            Conversion @ loc =>
            "field `{}` is {}, found {} value",
            node.name(),
            kind_name(kind),
            value.shape()
        )),
    }
}

/// Reassemble a nested composite from exactly as many leaves as its converter declares.
fn composite_from_leaves(
    values: Vec<PhysicalValue>,
    composite: &CompositeField,
    loc: &FieldLocation,
) -> StrataResult<LogicalValue> {
    if values.len() != composite.leaves().len() {
        strata_bail!(
            Conversion @ loc =>
            "composite {} has {} leaves, found {}",
            composite.converter().id(),
            composite.leaves().len(),
            values.len()
        );
    }
    let leaves = values
        .into_iter()
        .zip(composite.leaves())
        .map(|(value, node)| match value {
            PhysicalValue::Null => check_leaf(None, node, false, loc),
            PhysicalValue::Scalar(s) => check_leaf(Some(s), node, false, loc),
            other => Err(strata_err!(
                Conversion @ loc =>
                "expected a primitive leaf, found {}",
                other.shape()
            )),
        })
        .collect::<StrataResult<Vec<_>>>()?;
    let converter = composite.converter();
    let object = converter
        .to_logical(&leaves)
        .context(format!("rebuilding composite {}", converter.id()))?;
    Ok(LogicalValue::Composite(object))
}

#[allow(clippy::cast_possible_truncation)]
fn physical_to_scalar(
    scalar: ScalarValue,
    field: PrimitiveField,
    loc: &FieldLocation,
) -> StrataResult<LogicalValue> {
    if scalar.physical_type() != field.physical() {
        strata_bail!(
            Conversion @ loc =>
            "expected {} leaf, found {}",
            field.physical(),
            scalar.physical_type()
        );
    }
    let Some(logical) = field.logical() else {
        strata_bail!(Conversion @ loc => "leaf has no logical type");
    };

    Ok(match (logical, scalar) {
        (ScalarType::Utf8, ScalarValue::Binary(b)) => String::from_utf8(b.to_vec())
            .map(LogicalValue::Utf8)
            .map_err(|e| strata_err!(Conversion @ loc => "invalid UTF-8: {}", e))?,
        (ScalarType::Binary, ScalarValue::Binary(b)) => LogicalValue::Binary(b),
        (ScalarType::Bool, ScalarValue::Boolean(b)) => LogicalValue::Bool(b),
        (ScalarType::I32, ScalarValue::Int32(v)) => LogicalValue::I32(v),
        (ScalarType::I32, ScalarValue::Int64(v)) => i32::try_from(v)
            .map(LogicalValue::I32)
            .map_err(|_| strata_err!(Conversion @ loc => "{} is out of range for i32", v))?,
        (ScalarType::I64, ScalarValue::Int64(v)) => LogicalValue::I64(v),
        (ScalarType::F32, ScalarValue::Float(v)) => LogicalValue::F32(v),
        (ScalarType::F32, ScalarValue::Double(v)) => {
            let narrowed = v as f32;
            if !v.is_nan() && f64::from(narrowed).to_bits() != v.to_bits() {
                strata_bail!(Conversion @ loc => "{} cannot be represented as f32", v);
            }
            LogicalValue::F32(narrowed)
        }
        (ScalarType::F64, ScalarValue::Double(v)) => LogicalValue::F64(v),
        (logical, scalar) => strata_bail!(
            Conversion @ loc =>
            "cannot read {} from {} leaf",
            logical,
            scalar.physical_type()
        ),
    })
}

fn kind_name(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Primitive(_) => "primitive",
        FieldKind::List(_) => "a list",
        FieldKind::Map(..) => "a map",
        FieldKind::Composite(_) => "a composite",
    }
}
