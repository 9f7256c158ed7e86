use strata_error::{StrataResult, strata_bail};
use strata_value::ScalarValue;

use crate::{PhysicalRecord, RecordConsumer, RecordField, RecordGroup, RecordValue};

#[derive(Debug)]
enum Frame {
    Group(RecordGroup),
    Field(RecordField),
}

/// A [`RecordConsumer`] that assembles committed messages into [`PhysicalRecord`]s.
///
/// The event protocol is validated as it arrives: fields must be started in strictly increasing
/// index order within their group, ended with the same name and index, and hold at least one
/// value. Violations fail with an invalid record error and leave the message open, so the caller
/// is expected to abort it.
#[derive(Debug, Default)]
pub struct RecordBuffer {
    records: Vec<PhysicalRecord>,
    stack: Vec<Frame>,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed records, in write order.
    pub fn records(&self) -> &[PhysicalRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PhysicalRecord> {
        self.records
    }

    /// Take the committed records, leaving the buffer empty of them.
    pub fn take_records(&mut self) -> Vec<PhysicalRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn in_message(&self) -> bool {
        !self.stack.is_empty()
    }

    fn top(&mut self, event: &str) -> StrataResult<&mut Frame> {
        match self.stack.last_mut() {
            Some(frame) => Ok(frame),
            None => strata_bail!(InvalidRecord: "{} outside of a message", event),
        }
    }

    fn current_field(&mut self, event: &str) -> StrataResult<&mut RecordField> {
        match self.top(event)? {
            Frame::Field(field) => Ok(field),
            Frame::Group(_) => strata_bail!(InvalidRecord: "{} outside of a field", event),
        }
    }
}

impl RecordConsumer for RecordBuffer {
    fn start_message(&mut self) -> StrataResult<()> {
        if self.in_message() {
            strata_bail!(InvalidRecord: "start_message while a message is open");
        }
        self.stack.push(Frame::Group(RecordGroup::new()));
        Ok(())
    }

    fn end_message(&mut self) -> StrataResult<()> {
        match self.stack.as_slice() {
            [Frame::Group(_)] => {}
            [] => strata_bail!(InvalidRecord: "end_message without start_message"),
            _ => strata_bail!(
                InvalidRecord: "end_message with {} unclosed fields or groups",
                self.stack.len() - 1
            ),
        }
        if let Some(Frame::Group(root)) = self.stack.pop() {
            self.records.push(PhysicalRecord::new(root));
        }
        Ok(())
    }

    fn abort_message(&mut self) {
        self.stack.clear();
    }

    fn start_field(&mut self, name: &str, index: usize) -> StrataResult<()> {
        let Frame::Group(group) = self.top("start_field")? else {
            strata_bail!(InvalidRecord: "field `{}` started inside another field", name);
        };
        if let Some(last) = group.last_index() {
            if index <= last {
                strata_bail!(
                    InvalidRecord: "field `{}` at index {} written after index {}",
                    name,
                    index,
                    last
                );
            }
        }
        self.stack
            .push(Frame::Field(RecordField::new(name, index, Vec::new())));
        Ok(())
    }

    fn end_field(&mut self, name: &str, index: usize) -> StrataResult<()> {
        let field = self.current_field("end_field")?;
        if field.name().as_ref() != name || field.index() != index {
            strata_bail!(
                InvalidRecord: "end_field({}, {}) does not match start_field({}, {})",
                name,
                index,
                field.name(),
                field.index()
            );
        }
        if field.values().is_empty() {
            strata_bail!(InvalidRecord: "field `{}` at index {} has no values", name, index);
        }

        if let Some(Frame::Field(field)) = self.stack.pop() {
            match self.stack.last_mut() {
                Some(Frame::Group(group)) => group.push(field),
                _ => strata_bail!(InvalidRecord: "field `{}` has no enclosing group", name),
            }
        }
        Ok(())
    }

    fn start_group(&mut self) -> StrataResult<()> {
        self.current_field("start_group")?;
        self.stack.push(Frame::Group(RecordGroup::new()));
        Ok(())
    }

    fn end_group(&mut self) -> StrataResult<()> {
        if self.stack.len() < 2 {
            strata_bail!(InvalidRecord: "end_group without start_group");
        }
        if !matches!(self.stack.last(), Some(Frame::Group(_))) {
            strata_bail!(InvalidRecord: "end_group inside an open field");
        }
        let Some(Frame::Group(group)) = self.stack.pop() else {
            strata_bail!(InvalidRecord: "end_group without start_group");
        };
        self.current_field("end_group")?
            .push(RecordValue::Group(group));
        Ok(())
    }

    fn add_scalar(&mut self, value: &ScalarValue) -> StrataResult<()> {
        self.current_field("add_scalar")?
            .push(RecordValue::Scalar(value.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_field(buffer: &mut RecordBuffer, name: &str, index: usize, value: ScalarValue) {
        buffer.start_field(name, index).unwrap();
        buffer.add_scalar(&value).unwrap();
        buffer.end_field(name, index).unwrap();
    }

    fn rejected(result: StrataResult<()>) -> bool {
        result.is_err_and(|err| err.is_invalid_record())
    }

    #[test]
    fn assembles_nested_groups() {
        let mut buffer = RecordBuffer::new();
        buffer.start_message().unwrap();
        scalar_field(&mut buffer, "vertex", 0, ScalarValue::utf8("1"));
        buffer.start_field("tags", 2).unwrap();
        buffer.start_group().unwrap();
        buffer.start_field("list", 0).unwrap();
        for tag in ["a", "b"] {
            buffer.start_group().unwrap();
            scalar_field(&mut buffer, "element", 0, ScalarValue::utf8(tag));
            buffer.end_group().unwrap();
        }
        buffer.end_field("list", 0).unwrap();
        buffer.end_group().unwrap();
        buffer.end_field("tags", 2).unwrap();
        buffer.end_message().unwrap();

        let record = &buffer.records()[0];
        assert!(record.field(1).is_none());
        let tags = record.field(2).unwrap().values()[0].as_group().unwrap();
        let list = tags.field(0).unwrap();
        assert_eq!(list.values().len(), 2);
        assert_eq!(
            record.to_string(),
            "{0: vertex = 0x31, 2: tags = {0: list = [{0: element = 0x61}, {0: element = 0x62}]}}"
        );
    }

    #[test]
    fn rejects_out_of_order_fields() {
        let mut buffer = RecordBuffer::new();
        buffer.start_message().unwrap();
        scalar_field(&mut buffer, "age", 1, ScalarValue::Int32(1));
        assert!(rejected(buffer.start_field("vertex", 0)));
        assert!(rejected(buffer.start_field("age", 1)));
    }

    #[test]
    fn rejects_mismatched_and_empty_fields() {
        let mut buffer = RecordBuffer::new();
        buffer.start_message().unwrap();
        buffer.start_field("vertex", 0).unwrap();
        assert!(rejected(buffer.end_field("vertex", 0)));
        buffer.add_scalar(&ScalarValue::utf8("1")).unwrap();
        assert!(rejected(buffer.end_field("vertex", 1)));
        assert!(rejected(buffer.end_message()));
    }

    #[test]
    fn rejects_scalars_outside_fields() {
        let mut buffer = RecordBuffer::new();
        assert!(rejected(buffer.add_scalar(&ScalarValue::Int32(1))));
        buffer.start_message().unwrap();
        assert!(rejected(buffer.add_scalar(&ScalarValue::Int32(1))));
        assert!(rejected(buffer.start_group()));
        assert!(rejected(buffer.start_message()));
    }

    #[test]
    fn abort_discards_open_message() {
        let mut buffer = RecordBuffer::new();
        buffer.start_message().unwrap();
        scalar_field(&mut buffer, "vertex", 0, ScalarValue::utf8("1"));
        buffer.abort_message();
        assert!(!buffer.in_message());
        assert!(buffer.is_empty());

        buffer.start_message().unwrap();
        scalar_field(&mut buffer, "vertex", 0, ScalarValue::utf8("2"));
        buffer.end_message().unwrap();
        assert_eq!(buffer.len(), 1);

        let records = buffer.take_records();
        assert_eq!(records[0].to_string(), "{0: vertex = 0x32}");
        assert!(buffer.is_empty());
    }
}
