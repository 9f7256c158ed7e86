//! Random-access physical records assembled from record events.

mod buffer;

use std::fmt::{Display, Formatter};

pub use buffer::*;
use itertools::Itertools;
use strata_dtype::FieldName;
use strata_value::ScalarValue;

/// One complete message: the top-level group of an encoded element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicalRecord {
    root: RecordGroup,
}

impl PhysicalRecord {
    pub fn new(root: RecordGroup) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &RecordGroup {
        &self.root
    }

    pub fn into_root(self) -> RecordGroup {
        self.root
    }

    /// The top-level field with physical index `index`, if it was written.
    pub fn field(&self, index: usize) -> Option<&RecordField> {
        self.root.field(index)
    }
}

impl Display for PhysicalRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// The fields written inside one group, ordered by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordGroup {
    fields: Vec<RecordField>,
}

impl RecordGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, keeping the group ordered by index. A field with the same index is replaced.
    pub fn with_field(mut self, field: RecordField) -> Self {
        match self.fields.binary_search_by_key(&field.index, |f| f.index) {
            Ok(pos) => self.fields[pos] = field,
            Err(pos) => self.fields.insert(pos, field),
        }
        self
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&RecordField> {
        self.fields
            .binary_search_by_key(&index, |f| f.index)
            .ok()
            .map(|pos| &self.fields[pos])
    }

    pub fn remove_field(&mut self, index: usize) -> Option<RecordField> {
        self.fields
            .binary_search_by_key(&index, |f| f.index)
            .ok()
            .map(|pos| self.fields.remove(pos))
    }

    pub fn last_index(&self) -> Option<usize> {
        self.fields.last().map(|f| f.index)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append a field whose index is known to be greater than every existing one.
    pub(crate) fn push(&mut self, field: RecordField) {
        self.fields.push(field);
    }
}

impl Display for RecordGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.fields.iter().format(", "))
    }
}

/// A written field and its values. Only repeated fields hold more than one value.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    name: FieldName,
    index: usize,
    values: Vec<RecordValue>,
}

impl RecordField {
    pub fn new(name: impl Into<FieldName>, index: usize, values: Vec<RecordValue>) -> Self {
        Self {
            name: name.into(),
            index,
            values,
        }
    }

    /// A field holding a single scalar.
    pub fn scalar(name: impl Into<FieldName>, index: usize, value: impl Into<ScalarValue>) -> Self {
        Self::new(name, index, vec![RecordValue::Scalar(value.into())])
    }

    /// A field holding a single group.
    pub fn group(name: impl Into<FieldName>, index: usize, group: RecordGroup) -> Self {
        Self::new(name, index, vec![RecordValue::Group(group)])
    }

    pub fn name(&self) -> &FieldName {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn values(&self) -> &[RecordValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<RecordValue> {
        self.values
    }

    pub(crate) fn push(&mut self, value: RecordValue) {
        self.values.push(value);
    }
}

impl Display for RecordField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} = ", self.index, self.name)?;
        match self.values.as_slice() {
            [value] => write!(f, "{value}"),
            values => write!(f, "[{}]", values.iter().format(", ")),
        }
    }
}

/// A single value of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Scalar(ScalarValue),
    Group(RecordGroup),
}

impl RecordValue {
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            RecordValue::Scalar(s) => Some(s),
            RecordValue::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&RecordGroup> {
        match self {
            RecordValue::Group(g) => Some(g),
            RecordValue::Scalar(_) => None,
        }
    }
}

impl Display for RecordValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordValue::Scalar(s) => write!(f, "{s}"),
            RecordValue::Group(g) => write!(f, "{g}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_stay_ordered() {
        let group = RecordGroup::new()
            .with_field(RecordField::scalar("age", 1, 30i32))
            .with_field(RecordField::scalar("vertex", 0, ScalarValue::utf8("1")));

        assert_eq!(group.last_index(), Some(1));
        assert_eq!(group.field(0).unwrap().name().as_ref(), "vertex");
        assert!(group.field(2).is_none());
        assert_eq!(group.to_string(), "{0: vertex = 0x31, 1: age = 30i32}");
    }

    #[test]
    fn remove_field() {
        let mut group = RecordGroup::new()
            .with_field(RecordField::scalar("vertex", 0, ScalarValue::utf8("1")))
            .with_field(RecordField::scalar("age", 1, 30i32));

        assert_eq!(group.remove_field(1).unwrap().index(), 1);
        assert!(group.remove_field(1).is_none());
        assert_eq!(group.fields().len(), 1);
    }

    #[test]
    fn record_root() {
        let record = PhysicalRecord::new(
            RecordGroup::new().with_field(RecordField::scalar("vertex", 0, ScalarValue::utf8("1"))),
        );
        assert_eq!(record.field(0).unwrap().name().as_ref(), "vertex");

        let mut root = record.into_root();
        assert!(root.remove_field(0).is_some());
        assert!(root.is_empty());
    }
}
