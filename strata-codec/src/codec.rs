use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use strata_dtype::{GroupName, Schema};
use strata_error::{FieldLocation, StrataError, StrataResult, strata_bail, strata_err};
use strata_value::Element;

use crate::{
    CodecOptions, ConverterContextRef, FieldLayout, LayoutCache, PhysicalRecord, RecordBuffer,
    RecordConsumer, RecordDecoder, RecordEncoder, RecordEvent, SchemaResolver, replay,
};

/// Encodes and decodes the elements of every group of a schema.
///
/// All layouts are resolved when the codec is built, so a schema that cannot be resolved is
/// rejected before any element is processed. The codec holds no per-element state and can be
/// shared between threads.
#[derive(Debug)]
pub struct ElementCodec {
    schema: Schema,
    layouts: LayoutCache,
}

impl ElementCodec {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn try_new(
        schema: Schema,
        converters: ConverterContextRef,
        options: CodecOptions,
    ) -> StrataResult<Self> {
        let mut seen = HashSet::new();
        for group in schema.groups() {
            if !seen.insert(group.group().clone()) {
                strata_bail!(
                    SchemaResolution @ FieldLocation::group(group.group().clone()) =>
                    "group {} is declared more than once",
                    group.group()
                );
            }
        }

        let layouts = LayoutCache::new(SchemaResolver::new(converters, options));
        for group in schema.groups() {
            layouts.get_or_resolve(group)?;
        }
        log::debug!("Resolved layouts of {} groups", layouts.len());

        Ok(Self { schema, layouts })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &CodecOptions {
        self.layouts.resolver().options()
    }

    /// The resolved layout of `group`.
    pub fn layout(&self, group: &str) -> StrataResult<Arc<FieldLayout>> {
        if let Some(layout) = self.layouts.get(group) {
            return Ok(layout);
        }
        let schema = self.schema.group(group).ok_or_else(|| {
            strata_err!(
                UnsupportedValue @ FieldLocation::group(group) =>
                "group {} is not part of the schema",
                group
            )
        })?;
        self.layouts.get_or_resolve(schema)
    }

    /// Encode one element as a single message on `sink`.
    pub fn encode(&self, element: &Element, sink: &mut dyn RecordConsumer) -> StrataResult<()> {
        let layout = self.layout(element.group())?;
        RecordEncoder::new(&layout).encode(element, sink)
    }

    pub fn decode(&self, group: &str, record: &PhysicalRecord) -> StrataResult<Element> {
        let layout = self.layout(group)?;
        RecordDecoder::new(&layout).decode(record)
    }

    /// Decode the events of exactly one message.
    pub fn decode_events<'a, I>(&self, group: &str, events: I) -> StrataResult<Element>
    where
        I: IntoIterator<Item = &'a RecordEvent>,
    {
        let mut buffer = RecordBuffer::new();
        replay(events, &mut buffer)?;
        if buffer.in_message() {
            strata_bail!(InvalidRecord: "events end inside an unfinished message");
        }
        match buffer.records() {
            [record] => self.decode(group, record),
            records => Err(strata_err!(
                InvalidRecord: "expected the events of one message, found {}",
                records.len()
            )),
        }
    }

    /// Encode every element, one message each.
    ///
    /// A failing element has its message aborted and is reported in the summary; the remaining
    /// elements are still written.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn write_all<'a, I>(&self, elements: I, sink: &mut dyn RecordConsumer) -> WriteSummary
    where
        I: IntoIterator<Item = &'a Element>,
    {
        let mut summary = WriteSummary::default();
        for (position, element) in elements.into_iter().enumerate() {
            match self.encode(element, sink) {
                Ok(()) => summary.written += 1,
                Err(error) => {
                    log::warn!(
                        "Skipping element {} of group {}: {}",
                        position,
                        element.group(),
                        error
                    );
                    summary.failures.push(ElementFailure {
                        position,
                        group: element.group().clone(),
                        error,
                    });
                }
            }
        }
        summary
    }

    /// Decode records of one group lazily, one result per record.
    pub fn read_all<'a, I>(
        &'a self,
        group: &'a str,
        records: I,
    ) -> impl Iterator<Item = StrataResult<Element>> + 'a
    where
        I: IntoIterator<Item = &'a PhysicalRecord>,
        I::IntoIter: 'a,
    {
        records
            .into_iter()
            .map(move |record| self.decode(group, record))
    }
}

/// The outcome of [`ElementCodec::write_all`].
#[derive(Debug, Default)]
pub struct WriteSummary {
    written: usize,
    failures: Vec<ElementFailure>,
}

impl WriteSummary {
    /// Number of elements whose message was committed.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn failures(&self) -> &[ElementFailure] {
        &self.failures
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Display for WriteSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} written, {} failed",
            self.written,
            self.failures.len()
        )
    }
}

/// An element that could not be written.
#[derive(Debug)]
pub struct ElementFailure {
    position: usize,
    group: GroupName,
    error: StrataError,
}

impl ElementFailure {
    /// Position of the element in the written sequence.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn group(&self) -> &GroupName {
        &self.group
    }

    pub fn error(&self) -> &StrataError {
        &self.error
    }

    pub fn into_error(self) -> StrataError {
        self.error
    }
}
