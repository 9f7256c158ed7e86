use strata_error::{FieldLocation, StrataResult, StrataResultExt, strata_bail, strata_err};
use strata_value::{Element, LogicalValue};

use crate::{
    FieldKind, FieldLayout, FieldNode, LIST_WRAPPER, MAP_WRAPPER, PhysicalValue, RecordConsumer,
};

/// Writes elements of one group as messages of record events.
///
/// Every property is converted before the first event is emitted, so a value that cannot be
/// converted never leaves a partial message behind. If the consumer itself fails part way through
/// a message, the message is aborted before the error is returned.
pub struct RecordEncoder<'a> {
    layout: &'a FieldLayout,
}

impl<'a> RecordEncoder<'a> {
    pub fn new(layout: &'a FieldLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &FieldLayout {
        self.layout
    }

    /// Encode one element as a single message.
    pub fn encode(&self, element: &Element, sink: &mut dyn RecordConsumer) -> StrataResult<()> {
        let prepared = self.prepare(element).in_group(self.layout.group())?;

        if let Err(e) = self.write_message(&prepared, sink) {
            sink.abort_message();
            return Err(e.in_group(self.layout.group()));
        }

        log::trace!("Encoded {}", element);
        Ok(())
    }

    /// Convert an element into one physical value per top-level field.
    pub fn prepare(&self, element: &Element) -> StrataResult<Vec<PhysicalValue>> {
        if element.group() != self.layout.group() {
            strata_bail!(
                Conversion @ FieldLocation::group(element.group().clone()) =>
                "element of group {} cannot be written with the layout of {}",
                element.group(),
                self.layout.group()
            );
        }
        if element.kind() != self.layout.kind() {
            strata_bail!(
                Conversion @ FieldLocation::unknown() =>
                "{} cannot be written to {} group",
                element.kind(),
                self.layout.kind()
            );
        }

        if let Some(name) = element
            .properties()
            .names()
            .find(|name| self.layout.property(name).is_none())
        {
            strata_bail!(
                UnsupportedValue @ FieldLocation::unknown() =>
                "property `{}` is not declared by the group",
                name
            );
        }

        let directed;
        let identity: Vec<&LogicalValue> = match element {
            Element::Entity(entity) => vec![entity.vertex()],
            Element::Edge(edge) => {
                directed = LogicalValue::Bool(edge.is_directed());
                vec![edge.source(), edge.destination(), &directed]
            }
        };

        let mut values = Vec::with_capacity(self.layout.fields().len());
        for (slot, value) in self.layout.identity().iter().zip(identity) {
            values.extend(self.layout.converter(slot).to_physical(Some(value))?);
        }
        for slot in self.layout.properties() {
            let value = element.properties().get(slot.name());
            values.extend(self.layout.converter(slot).to_physical(value)?);
        }
        Ok(values)
    }

    fn write_message(
        &self,
        prepared: &[PhysicalValue],
        sink: &mut dyn RecordConsumer,
    ) -> StrataResult<()> {
        sink.start_message()?;
        let mut index = 0;
        for (node, value) in self.layout.fields().iter().zip(prepared) {
            let loc = match node.origin() {
                Some(origin) => FieldLocation::property(origin.owner().clone(), node.index()),
                None => FieldLocation::property(node.name().clone(), node.index()),
            };
            index = write_field(node, value, index, sink, &loc)?;
        }
        sink.end_message()
    }
}

/// Write one field at `index`, returning the index of the next sibling.
///
/// Null values reserve their index without emitting anything.
fn write_field(
    node: &FieldNode,
    value: &PhysicalValue,
    index: usize,
    sink: &mut dyn RecordConsumer,
    loc: &FieldLocation,
) -> StrataResult<usize> {
    if node.index() != index {
        strata_bail!(
            Conversion @ loc =>
            "field `{}` has index {} but is written at {}",
            node.name(),
            node.index(),
            index
        );
    }
    if value.is_null() {
        return Ok(index + 1);
    }

    sink.start_field(node.name(), index)?;
    write_value(node, value, sink, loc)?;
    sink.end_field(node.name(), index)?;
    Ok(index + 1)
}

fn write_value(
    node: &FieldNode,
    value: &PhysicalValue,
    sink: &mut dyn RecordConsumer,
    loc: &FieldLocation,
) -> StrataResult<()> {
    match (node.kind(), value) {
        (FieldKind::Primitive(_), PhysicalValue::Scalar(scalar)) => sink.add_scalar(scalar),
        (FieldKind::List(element), PhysicalValue::List(items)) => {
            sink.start_group()?;
            if !items.is_empty() {
                sink.start_field(LIST_WRAPPER, 0)?;
                for item in items {
                    sink.start_group()?;
                    write_field(element, item, 0, sink, loc)?;
                    sink.end_group()?;
                }
                sink.end_field(LIST_WRAPPER, 0)?;
            }
            sink.end_group()
        }
        (FieldKind::Map(key, val), PhysicalValue::Map(entries)) => {
            sink.start_group()?;
            if !entries.is_empty() {
                sink.start_field(MAP_WRAPPER, 0)?;
                for (k, v) in entries {
                    sink.start_group()?;
                    let next = write_field(key, k, 0, sink, loc)?;
                    write_field(val, v, next, sink, loc)?;
                    sink.end_group()?;
                }
                sink.end_field(MAP_WRAPPER, 0)?;
            }
            sink.end_group()
        }
        (FieldKind::Composite(composite), PhysicalValue::Scalar(scalar)) if composite.is_flat() => {
            sink.add_scalar(scalar)
        }
        (FieldKind::Composite(composite), PhysicalValue::Group(leaves))
            if leaves.len() == composite.leaves().len() && !composite.is_flat() =>
        {
            sink.start_group()?;
            let mut index = 0;
            for (leaf, value) in composite.leaves().iter().zip(leaves) {
                index = write_field(leaf, value, index, sink, loc)?;
            }
            sink.end_group()
        }
        (kind, value) => Err(strata_err!(
            Conversion @ loc =>
            "cannot write {} value to {} field `{}`",
            value.shape(),
            match kind {
                FieldKind::Primitive(_) => "primitive",
                FieldKind::List(_) => "list",
                FieldKind::Map(..) => "map",
                FieldKind::Composite(_) => "composite",
            },
            node.name()
        )),
    }
}
