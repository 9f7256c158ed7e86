use strata_dtype::ElementKind;
use strata_error::{FieldLocation, StrataResult, StrataResultExt, strata_bail, strata_err};
use strata_value::{Edge, Element, Entity, LogicalValue, Properties};

use crate::{
    FieldKind, FieldLayout, FieldNode, LIST_WRAPPER, MAP_WRAPPER, PhysicalRecord, PhysicalValue,
    RecordField, RecordGroup, RecordValue,
};

/// Reads elements of one group back from physical records.
pub struct RecordDecoder<'a> {
    layout: &'a FieldLayout,
}

impl<'a> RecordDecoder<'a> {
    pub fn new(layout: &'a FieldLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &FieldLayout {
        self.layout
    }

    /// Decode one record. Properties whose fields were not written are left out of the result.
    pub fn decode(&self, record: &PhysicalRecord) -> StrataResult<Element> {
        let element = self.decode_record(record).in_group(self.layout.group())?;
        log::trace!("Decoded {}", element);
        Ok(element)
    }

    fn decode_record(&self, record: &PhysicalRecord) -> StrataResult<Element> {
        let root = record.root();
        for field in root.fields() {
            match self.layout.field(field.index()) {
                Some(node) if node.name() == field.name() => {}
                _ => strata_bail!(
                    Conversion @ FieldLocation::property(field.name().clone(), field.index()) =>
                    "record has field `{}` at index {} which is not part of the layout",
                    field.name(),
                    field.index()
                ),
            }
        }

        let mut values = self
            .layout
            .fields()
            .iter()
            .map(|node| {
                let loc = match node.origin() {
                    Some(origin) => FieldLocation::property(origin.owner().clone(), node.index()),
                    None => FieldLocation::property(node.name().clone(), node.index()),
                };
                read_field(root.field(node.index()), node, &loc)
            })
            .collect::<StrataResult<Vec<_>>>()?
            .into_iter();

        let mut identity = Vec::with_capacity(self.layout.identity().len());
        for slot in self.layout.identity() {
            let leaves = values.by_ref().take(slot.leaf_count()).collect();
            let value = self.layout.converter(slot).to_logical(leaves)?.ok_or_else(|| {
                strata_err!(Conversion @ slot.location() => "identity `{}` is missing", slot.name())
            })?;
            identity.push(value);
        }

        let mut properties = Properties::new();
        for slot in self.layout.properties() {
            let leaves = values.by_ref().take(slot.leaf_count()).collect();
            if let Some(value) = self.layout.converter(slot).to_logical(leaves)? {
                properties.insert(slot.name().clone(), value);
            }
        }

        let group = self.layout.group().clone();
        let mut identity = identity.into_iter();
        Ok(match (self.layout.kind(), identity.next(), identity.next(), identity.next()) {
            (ElementKind::Entity, Some(vertex), None, None) => {
                Entity::new(group, vertex)
                    .with_properties(properties)
                    .into()
            }
            (
                ElementKind::Edge,
                Some(source),
                Some(destination),
                Some(LogicalValue::Bool(directed)),
            ) => Edge::new(group, source, destination, directed)
                .with_properties(properties)
                .into(),
            (kind, ..) => strata_bail!(
                Conversion @ FieldLocation::unknown() =>
                "identity fields do not describe {} element",
                kind
            ),
        })
    }
}

/// Read the physical value of one field. A field that was not written reads as null.
fn read_field(
    field: Option<&RecordField>,
    node: &FieldNode,
    loc: &FieldLocation,
) -> StrataResult<PhysicalValue> {
    let Some(field) = field else {
        return Ok(PhysicalValue::Null);
    };
    if field.name() != node.name() {
        strata_bail!(
            Conversion @ loc =>
            "expected field `{}` at index {}, found `{}`",
            node.name(),
            node.index(),
            field.name()
        );
    }
    match field.values() {
        [value] => read_value(value, node, loc),
        values => Err(strata_err!(
            Conversion @ loc =>
            "field `{}` holds {} values, expected one",
            node.name(),
            values.len()
        )),
    }
}

fn read_value(
    value: &RecordValue,
    node: &FieldNode,
    loc: &FieldLocation,
) -> StrataResult<PhysicalValue> {
    match (node.kind(), value) {
        (FieldKind::Primitive(_), RecordValue::Scalar(scalar)) => {
            Ok(PhysicalValue::Scalar(scalar.clone()))
        }
        (FieldKind::List(element), RecordValue::Group(group)) => {
            let items = wrapper_groups(group, LIST_WRAPPER, node, loc)?
                .map(|entry| {
                    check_fields(entry, &[element.as_ref()], loc)?;
                    read_field(entry.field(0), element, loc)
                })
                .collect::<StrataResult<Vec<_>>>()?;
            Ok(PhysicalValue::List(items))
        }
        (FieldKind::Map(key, val), RecordValue::Group(group)) => {
            let entries = wrapper_groups(group, MAP_WRAPPER, node, loc)?
                .map(|entry| {
                    check_fields(entry, &[key.as_ref(), val.as_ref()], loc)?;
                    Ok((
                        read_field(entry.field(key.index()), key, loc)?,
                        read_field(entry.field(val.index()), val, loc)?,
                    ))
                })
                .collect::<StrataResult<Vec<_>>>()?;
            Ok(PhysicalValue::Map(entries))
        }
        (FieldKind::Composite(composite), RecordValue::Scalar(scalar)) if composite.is_flat() => {
            Ok(PhysicalValue::Scalar(scalar.clone()))
        }
        (FieldKind::Composite(composite), RecordValue::Group(group)) if !composite.is_flat() => {
            let leaves: Vec<&FieldNode> = composite.leaves().iter().collect();
            check_fields(group, &leaves, loc)?;
            leaves
                .into_iter()
                .map(|leaf| read_field(group.field(leaf.index()), leaf, loc))
                .collect::<StrataResult<Vec<_>>>()
                .map(PhysicalValue::Group)
        }
        (FieldKind::Primitive(_) | FieldKind::Composite(_), RecordValue::Group(_)) => {
            Err(strata_err!(
                Conversion @ loc =>
                "field `{}` is primitive but holds a group",
                node.name()
            ))
        }
        (_, RecordValue::Scalar(scalar)) => Err(strata_err!(
            Conversion @ loc =>
            "field `{}` is a group but holds {}",
            node.name(),
            scalar
        )),
    }
}

/// The groups of the repeated wrapper field inside a LIST or MAP group. An empty collection has
/// no wrapper field.
fn wrapper_groups<'r>(
    group: &'r RecordGroup,
    wrapper: &str,
    node: &FieldNode,
    loc: &FieldLocation,
) -> StrataResult<impl Iterator<Item = &'r RecordGroup> + use<'r>> {
    let values = match group.fields() {
        [] => &[][..],
        [field] if field.index() == 0 && field.name().as_ref() == wrapper => field.values(),
        _ => strata_bail!(
            Conversion @ loc =>
            "group `{}` must hold only a repeated `{}` field",
            node.name(),
            wrapper
        ),
    };
    if let Some(scalar) = values.iter().find_map(RecordValue::as_scalar) {
        strata_bail!(
            Conversion @ loc =>
            "repeated `{}` of `{}` holds {} instead of a group",
            wrapper,
            node.name(),
            scalar
        );
    }
    Ok(values.iter().filter_map(RecordValue::as_group))
}

/// Check that a wrapper group holds no fields other than `expected`.
fn check_fields(
    group: &RecordGroup,
    expected: &[&FieldNode],
    loc: &FieldLocation,
) -> StrataResult<()> {
    for field in group.fields() {
        if !expected
            .iter()
            .any(|node| node.index() == field.index() && node.name() == field.name())
        {
            strata_bail!(
                Conversion @ loc =>
                "unexpected field `{}` at index {}",
                field.name(),
                field.index()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use strata_dtype::{GroupSchema, LogicalType};
    use strata_value::ScalarValue;

    use super::*;
    use crate::SchemaResolver;

    fn layout() -> FieldLayout {
        SchemaResolver::default()
            .resolve(
                &GroupSchema::entity("Person", LogicalType::UTF8)
                    .with_property("age", LogicalType::I32)
                    .with_property(
                        "scores",
                        LogicalType::map(LogicalType::UTF8, LogicalType::I32),
                    ),
            )
            .unwrap()
    }

    fn entry(key: &str, value: Option<i32>) -> RecordValue {
        let mut group =
            RecordGroup::new().with_field(RecordField::scalar("key", 0, ScalarValue::utf8(key)));
        if let Some(value) = value {
            group = group.with_field(RecordField::scalar("value", 1, value));
        }
        RecordValue::Group(group)
    }

    #[test]
    fn decodes_map_in_any_entry_order() {
        let layout = layout();
        let record = PhysicalRecord::new(
            RecordGroup::new()
                .with_field(RecordField::scalar("vertex", 0, ScalarValue::utf8("1")))
                .with_field(RecordField::group(
                    "scores",
                    2,
                    RecordGroup::new().with_field(RecordField::new(
                        "key_value",
                        0,
                        vec![entry("y", Some(2)), entry("x", Some(1)), entry("z", None)],
                    )),
                )),
        );

        let element = RecordDecoder::new(&layout).decode(&record).unwrap();
        let expected: Element = Entity::new("Person", "1")
            .with_property(
                "scores",
                LogicalValue::map([
                    ("x", LogicalValue::I32(1)),
                    ("y", LogicalValue::I32(2)),
                    ("z", LogicalValue::Null),
                ]),
            )
            .into();
        assert_eq!(element, expected);
        assert!(!element.properties().contains_key("age"));
    }

    #[test]
    fn missing_identity_fails() {
        let layout = layout();
        let record = PhysicalRecord::new(
            RecordGroup::new().with_field(RecordField::scalar("age", 1, 30i32)),
        );
        let err = RecordDecoder::new(&layout).decode(&record).unwrap_err();
        assert!(err.is_conversion(), "{err}");
        assert_eq!(err.location().unwrap().property_name(), Some("vertex"));
    }

    #[test]
    fn rejects_unexpected_fields() {
        let layout = layout();
        let record = PhysicalRecord::new(
            RecordGroup::new()
                .with_field(RecordField::scalar("vertex", 0, ScalarValue::utf8("1")))
                .with_field(RecordField::scalar("height", 3, 1.8f64)),
        );
        let err = RecordDecoder::new(&layout).decode(&record).unwrap_err();
        assert!(err.is_conversion(), "{err}");
    }

    #[test]
    fn rejects_wrong_physical_type() {
        let layout = layout();
        let record = PhysicalRecord::new(
            RecordGroup::new()
                .with_field(RecordField::scalar("vertex", 0, ScalarValue::utf8("1")))
                .with_field(RecordField::scalar("age", 1, 30i64)),
        );
        let err = RecordDecoder::new(&layout).decode(&record).unwrap_err();
        assert!(err.is_conversion(), "{err}");
        assert_eq!(err.location().unwrap().physical_index(), Some(1));
    }

    #[test]
    fn rejects_repeated_values_in_optional_field() {
        let layout = layout();
        let record = PhysicalRecord::new(
            RecordGroup::new()
                .with_field(RecordField::scalar("vertex", 0, ScalarValue::utf8("1")))
                .with_field(RecordField::new(
                    "age",
                    1,
                    vec![
                        RecordValue::Scalar(ScalarValue::Int32(1)),
                        RecordValue::Scalar(ScalarValue::Int32(2)),
                    ],
                )),
        );
        let err = RecordDecoder::new(&layout).decode(&record).unwrap_err();
        assert!(err.is_conversion(), "{err}");
    }

    #[test]
    fn rejects_duplicate_map_keys() {
        let layout = layout();
        let record = PhysicalRecord::new(
            RecordGroup::new()
                .with_field(RecordField::scalar("vertex", 0, ScalarValue::utf8("1")))
                .with_field(RecordField::group(
                    "scores",
                    2,
                    RecordGroup::new().with_field(RecordField::new(
                        "key_value",
                        0,
                        vec![entry("x", Some(1)), entry("x", Some(2))],
                    )),
                )),
        );
        let err = RecordDecoder::new(&layout).decode(&record).unwrap_err();
        assert!(err.is_conversion(), "{err}");
        let loc = err.location().unwrap();
        assert_eq!(loc.property_name(), Some("scores"));
        assert_eq!(loc.physical_index(), Some(2));
    }
}
