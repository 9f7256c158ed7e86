use std::collections::HashSet;
use std::sync::Arc;

use strata_dtype::{
    CompositeId, ElementKind, FieldName, GroupSchema, LogicalType, PhysicalType, Repetition,
};
use strata_error::{FieldLocation, StrataResult, StrataResultExt, strata_bail, strata_err};

use crate::{
    CodecOptions, CompositeConverterRef, CompositeField, ConversionRule, ConverterContext,
    ConverterContextRef, DESTINATION, DIRECTED, FieldKind, FieldLayout, FieldNode, LIST_ELEMENT,
    MAP_KEY, MAP_VALUE, PrimitiveField, PropertyLayout, SOURCE, VERTEX,
};

/// Resolves group schemas into [`FieldLayout`]s.
///
/// Resolution is a pure function of the group schema, the registered composite converters and
/// the options, so a layout can be cached by group name for the lifetime of the resolver.
#[derive(Debug, Clone)]
pub struct SchemaResolver {
    converters: ConverterContextRef,
    options: CodecOptions,
}

impl Default for SchemaResolver {
    fn default() -> Self {
        Self::new(
            Arc::new(ConverterContext::default()),
            CodecOptions::default(),
        )
    }
}

impl SchemaResolver {
    pub fn new(converters: ConverterContextRef, options: CodecOptions) -> Self {
        Self {
            converters,
            options,
        }
    }

    pub fn converters(&self) -> &ConverterContextRef {
        &self.converters
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Resolve the physical layout of one group.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(group = %schema.group())))]
    pub fn resolve(&self, schema: &GroupSchema) -> StrataResult<FieldLayout> {
        self.resolve_group(schema).in_group(schema.group())
    }

    fn resolve_group(&self, schema: &GroupSchema) -> StrataResult<FieldLayout> {
        let identity_type = schema.identity();
        if !matches!(
            identity_type,
            LogicalType::Scalar(_) | LogicalType::Composite(_)
        ) {
            strata_bail!(
                SchemaResolution @ FieldLocation::unknown() =>
                "identity of a group must be a scalar or composite, found {}",
                identity_type
            );
        }

        let identity_slots: Vec<(&str, LogicalType)> = match schema.kind() {
            ElementKind::Entity => vec![(VERTEX, identity_type.clone())],
            ElementKind::Edge => vec![
                (SOURCE, identity_type.clone()),
                (DESTINATION, identity_type.clone()),
                (DIRECTED, LogicalType::BOOL),
            ],
        };

        let mut fields = Vec::new();
        let identity = identity_slots
            .into_iter()
            .map(|(name, dtype)| self.resolve_slot(name.into(), &dtype, None, true, &mut fields))
            .collect::<StrataResult<Vec<_>>>()?;

        let properties = schema
            .properties()
            .iter()
            .map(|def| {
                self.resolve_slot(
                    def.name().clone(),
                    def.dtype(),
                    def.physical(),
                    false,
                    &mut fields,
                )
            })
            .collect::<StrataResult<Vec<_>>>()?;

        let mut seen = HashSet::with_capacity(fields.len());
        for node in &fields {
            if !seen.insert(node.name().clone()) {
                let owner = node
                    .origin()
                    .map(|o| o.owner().clone())
                    .unwrap_or_else(|| node.name().clone());
                strata_bail!(
                    SchemaResolution @ FieldLocation::property(owner, node.index()) =>
                    "physical field name `{}` is used more than once",
                    node.name()
                );
            }
        }

        let layout = FieldLayout::new(
            schema.group().clone(),
            schema.kind(),
            fields,
            identity,
            properties,
        );
        layout.check_contiguous()?;

        log::debug!(
            "Resolved {} group {} into {} fields ({} leaves)",
            layout.kind(),
            layout.group(),
            layout.fields().len(),
            layout.leaf_count()
        );
        log::trace!("{}", layout);

        Ok(layout)
    }

    /// Resolve one identity component or property, appending its top-level fields.
    fn resolve_slot(
        &self,
        name: FieldName,
        dtype: &LogicalType,
        physical: Option<PhysicalType>,
        required: bool,
        fields: &mut Vec<FieldNode>,
    ) -> StrataResult<PropertyLayout> {
        let start = fields.len();
        let loc = FieldLocation::property(name.clone(), start);
        let repetition = if required {
            Repetition::Required
        } else {
            Repetition::Optional
        };

        if physical.is_some() && dtype.as_scalar().is_none() {
            strata_bail!(
                SchemaResolution @ loc =>
                "a physical type can only be given for scalar properties, `{}` is {}",
                name,
                dtype
            );
        }

        let rule = match dtype {
            LogicalType::Scalar(scalar) => {
                let physical = physical.unwrap_or_else(|| scalar.natural_physical());
                if !physical.can_store(*scalar, self.options.numeric_widening()) {
                    strata_bail!(
                        SchemaResolution @ loc =>
                        "{} property `{}` cannot be stored as {}",
                        scalar,
                        name,
                        physical
                    );
                }
                fields.push(
                    FieldNode::new(
                        start,
                        name.clone(),
                        repetition,
                        FieldKind::Primitive(PrimitiveField::new(physical, *scalar)),
                    )
                    .with_origin(name.clone(), 0),
                );
                ConversionRule::Scalar {
                    logical: *scalar,
                    physical,
                }
            }
            LogicalType::List(_) | LogicalType::Map(..) => {
                let node = self.resolve_node(start, name.clone(), dtype, repetition, &loc)?;
                fields.push(node.with_origin(name.clone(), 0));
                ConversionRule::Nested
            }
            LogicalType::Composite(id) => {
                let converter = self.converter(id, &loc)?;
                let leaves = converter.leaves();
                for (leaf, physical) in leaves.iter().enumerate() {
                    fields.push(
                        FieldNode::new(
                            start + leaf,
                            self.leaf_name(&name, leaf, leaves.len()),
                            repetition,
                            FieldKind::Primitive(PrimitiveField::opaque(*physical)),
                        )
                        .with_origin(name.clone(), leaf),
                    );
                }
                ConversionRule::Composite(converter)
            }
        };

        Ok(PropertyLayout::new(name, dtype.clone(), rule, start..fields.len(), required))
    }

    /// Resolve a field nested inside a LIST or MAP, and everything nested inside it.
    fn resolve_node(
        &self,
        index: usize,
        name: FieldName,
        dtype: &LogicalType,
        repetition: Repetition,
        loc: &FieldLocation,
    ) -> StrataResult<FieldNode> {
        let kind = match dtype {
            LogicalType::Scalar(scalar) => {
                FieldKind::Primitive(PrimitiveField::new(scalar.natural_physical(), *scalar))
            }
            LogicalType::List(element) => FieldKind::List(Box::new(self.resolve_node(
                0,
                LIST_ELEMENT.into(),
                element,
                Repetition::Optional,
                loc,
            )?)),
            LogicalType::Map(key, value) => {
                if key.as_scalar().is_none() {
                    strata_bail!(
                        SchemaResolution @ loc =>
                        "map keys must be scalar, found {}",
                        key
                    );
                }
                FieldKind::Map(
                    Box::new(self.resolve_node(0, MAP_KEY.into(), key, Repetition::Required, loc)?),
                    Box::new(self.resolve_node(
                        1,
                        MAP_VALUE.into(),
                        value,
                        Repetition::Optional,
                        loc,
                    )?),
                )
            }
            LogicalType::Composite(id) => {
                let converter = self.converter(id, loc)?;
                let leaves = converter
                    .leaves()
                    .iter()
                    .enumerate()
                    .map(|(leaf, physical)| {
                        FieldNode::new(
                            leaf,
                            self.leaf_name(&name, leaf, converter.leaves().len()),
                            Repetition::Optional,
                            FieldKind::Primitive(PrimitiveField::opaque(*physical)),
                        )
                    })
                    .collect();
                FieldKind::Composite(CompositeField::new(converter, leaves))
            }
        };
        Ok(FieldNode::new(index, name, repetition, kind))
    }

    /// The registered converter of a composite type, which must declare at least one leaf.
    fn converter(
        &self,
        id: &CompositeId,
        loc: &FieldLocation,
    ) -> StrataResult<CompositeConverterRef> {
        let converter = self.converters.lookup(id).ok_or_else(|| {
            strata_err!(
                SchemaResolution @ loc =>
                "no converter registered for composite {}",
                id
            )
        })?;
        if converter.leaves().is_empty() {
            strata_bail!(
                SchemaResolution @ loc =>
                "converter for composite {} declares no leaves",
                id
            );
        }
        Ok(converter)
    }

    /// Physical name of one leaf of a composite; a single leaf keeps the name of its field.
    fn leaf_name(&self, name: &FieldName, leaf: usize, count: usize) -> FieldName {
        if count == 1 {
            name.clone()
        } else {
            format!("{}{}{}", name, self.options.leaf_separator(), leaf).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use strata_dtype::{GroupSchema, LogicalType, PhysicalType, Repetition};
    use strata_value::{CompositeObject, CompositeRef, ScalarValue};

    use super::*;
    use crate::CompositeConverter;

    /// Declares leaves only; resolution never converts values.
    #[derive(Debug)]
    struct Leaves(&'static str, Vec<PhysicalType>);

    impl CompositeConverter for Leaves {
        fn id(&self) -> CompositeId {
            self.0.into()
        }

        fn leaves(&self) -> &[PhysicalType] {
            &self.1
        }

        fn to_physical(&self, _: &dyn CompositeObject) -> StrataResult<Vec<Option<ScalarValue>>> {
            strata_bail!("{} is never converted", self.0)
        }

        fn to_logical(&self, _: &[Option<ScalarValue>]) -> StrataResult<CompositeRef> {
            strata_bail!("{} is never converted", self.0)
        }
    }

    fn resolver(widening: bool) -> SchemaResolver {
        SchemaResolver::new(
            Arc::new(ConverterContext::default()),
            CodecOptions::default().with_numeric_widening(widening),
        )
    }

    #[test]
    fn entity_identity_comes_first() {
        let schema = GroupSchema::entity("Person", LogicalType::UTF8)
            .with_property("age", LogicalType::I32)
            .with_property("tags", LogicalType::list(LogicalType::UTF8));
        let layout = SchemaResolver::default().resolve(&schema).unwrap();

        let names: Vec<&str> = layout.fields().iter().map(|f| f.name().as_ref()).collect();
        assert_eq!(names, vec!["vertex", "age", "tags"]);
        assert_eq!(layout.identity_field_count(), 1);
        assert_eq!(layout.fields()[0].repetition(), Repetition::Required);
        assert_eq!(layout.fields()[1].repetition(), Repetition::Optional);
        assert_eq!(layout.property("tags").unwrap().field_range(), 2..3);
    }

    #[test]
    fn edge_identity_fields() {
        let schema =
            GroupSchema::edge("Knows", LogicalType::I64).with_property("weight", LogicalType::F64);
        let layout = SchemaResolver::default().resolve(&schema).unwrap();

        let names: Vec<&str> = layout.fields().iter().map(|f| f.name().as_ref()).collect();
        assert_eq!(names, vec!["source", "destination", "directed", "weight"]);
        assert_eq!(layout.identity_field_count(), 3);
        assert_eq!(
            layout.fields()[2].kind(),
            &FieldKind::Primitive(PrimitiveField::new(
                PhysicalType::Boolean,
                strata_dtype::ScalarType::Bool
            ))
        );
    }

    #[test]
    fn map_is_a_required_key_and_optional_value() {
        let schema = GroupSchema::entity("Player", LogicalType::UTF8)
            .with_property(
                "scores",
                LogicalType::map(LogicalType::UTF8, LogicalType::I32),
            );
        let layout = SchemaResolver::default().resolve(&schema).unwrap();

        let FieldKind::Map(key, value) = layout.fields()[1].kind() else {
            panic!("expected a map field");
        };
        assert_eq!((key.index(), key.name().as_ref()), (0, "key"));
        assert_eq!(key.repetition(), Repetition::Required);
        assert_eq!((value.index(), value.name().as_ref()), (1, "value"));
        assert_eq!(value.repetition(), Repetition::Optional);
        assert!(layout.fields()[1].origin().is_some());
        assert!(key.origin().is_none());
    }

    #[rstest]
    #[case(LogicalType::I64, PhysicalType::Int32, true)]
    #[case(LogicalType::F64, PhysicalType::Float, true)]
    #[case(LogicalType::I32, PhysicalType::Int64, false)]
    #[case(LogicalType::UTF8, PhysicalType::Int64, true)]
    #[case(LogicalType::list(LogicalType::I32), PhysicalType::Int32, true)]
    fn rejects_unrepresentable_widths(
        #[case] dtype: LogicalType,
        #[case] physical: PhysicalType,
        #[case] widening: bool,
    ) {
        let schema = GroupSchema::entity("Counter", LogicalType::UTF8)
            .with_property_stored_as("count", dtype, physical);
        let err = resolver(widening).resolve(&schema).unwrap_err();
        assert!(err.is_schema_resolution(), "{err}");
        assert_eq!(err.location().unwrap().group_name(), Some("Counter"));
        assert_eq!(err.location().unwrap().property_name(), Some("count"));
    }

    #[rstest]
    #[case(LogicalType::I32, PhysicalType::Int64)]
    #[case(LogicalType::F32, PhysicalType::Double)]
    #[case(LogicalType::I64, PhysicalType::Int64)]
    fn accepts_widening(#[case] dtype: LogicalType, #[case] physical: PhysicalType) {
        let schema = GroupSchema::entity("Counter", LogicalType::UTF8)
            .with_property_stored_as("count", dtype, physical);
        let layout = resolver(true).resolve(&schema).unwrap();
        let FieldKind::Primitive(field) = layout.fields()[1].kind() else {
            panic!("expected a primitive field");
        };
        assert_eq!(field.physical(), physical);
    }

    #[rstest]
    #[case(LogicalType::map(LogicalType::list(LogicalType::UTF8), LogicalType::I32))]
    #[case(LogicalType::list(LogicalType::composite("unregistered")))]
    #[case(LogicalType::map(LogicalType::I32, LogicalType::composite("unregistered")))]
    #[case(LogicalType::composite("unregistered"))]
    fn rejects_unresolvable_types(#[case] dtype: LogicalType) {
        let schema = GroupSchema::entity("Thing", LogicalType::UTF8).with_property("p", dtype);
        let err = SchemaResolver::default().resolve(&schema).unwrap_err();
        assert!(err.is_schema_resolution(), "{err}");
    }

    #[test]
    fn nested_composites_become_leaves() {
        let converters = ConverterContext::default().with_converters([
            Arc::new(Leaves("point", vec![PhysicalType::Double, PhysicalType::Double]))
                as CompositeConverterRef,
            Arc::new(Leaves("celsius", vec![PhysicalType::Float])),
        ]);
        let schema = GroupSchema::entity("Station", LogicalType::UTF8)
            .with_property(
                "readings",
                LogicalType::list(LogicalType::composite("point")),
            )
            .with_property(
                "temperatures",
                LogicalType::map(LogicalType::UTF8, LogicalType::composite("celsius")),
            );
        let layout = SchemaResolver::new(Arc::new(converters), CodecOptions::default())
            .resolve(&schema)
            .unwrap();

        let FieldKind::List(element) = layout.fields()[1].kind() else {
            panic!("expected a list field");
        };
        let FieldKind::Composite(point) = element.kind() else {
            panic!("expected a composite element");
        };
        assert!(!point.is_flat());
        let leaves: Vec<(usize, &str)> = point
            .leaves()
            .iter()
            .map(|leaf| (leaf.index(), leaf.name().as_ref()))
            .collect();
        assert_eq!(leaves, vec![(0, "element_0"), (1, "element_1")]);

        let FieldKind::Map(_, value) = layout.fields()[2].kind() else {
            panic!("expected a map field");
        };
        let FieldKind::Composite(celsius) = value.kind() else {
            panic!("expected a composite value");
        };
        assert!(celsius.is_flat());
        assert_eq!(celsius.leaves()[0].name().as_ref(), "value");
        assert_eq!(celsius.converter().id(), CompositeId::from("celsius"));
        assert_eq!(layout.leaf_count(), 5);
        layout.check_contiguous().unwrap();
    }

    #[rstest]
    #[case("vertex")]
    #[case("age")]
    fn rejects_colliding_names(#[case] name: &str) {
        let schema = GroupSchema::entity("Person", LogicalType::UTF8)
            .with_property("age", LogicalType::I32)
            .with_property(name, LogicalType::I64);
        let err = SchemaResolver::default().resolve(&schema).unwrap_err();
        assert!(err.is_schema_resolution(), "{err}");
    }

    #[test]
    fn rejects_list_identity() {
        let schema = GroupSchema::entity("Person", LogicalType::list(LogicalType::UTF8));
        let err = SchemaResolver::default().resolve(&schema).unwrap_err();
        assert!(err.is_schema_resolution(), "{err}");
    }

    #[test]
    fn resolution_is_deterministic() {
        let schema = GroupSchema::entity("Person", LogicalType::UTF8)
            .with_property(
                "tags",
                LogicalType::list(LogicalType::list(LogicalType::I64)),
            )
            .with_property(
                "attrs",
                LogicalType::map(LogicalType::I32, LogicalType::BINARY),
            );
        let resolver = SchemaResolver::default();
        assert_eq!(
            resolver.resolve(&schema).unwrap(),
            resolver.resolve(&schema).unwrap()
        );
    }
}
