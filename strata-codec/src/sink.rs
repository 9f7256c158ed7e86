use std::fmt::{Display, Formatter};

use strata_dtype::FieldName;
use strata_error::{StrataResult, strata_bail};
use strata_value::ScalarValue;

/// The event interface of a nested columnar writer.
///
/// One message is written per element. Within a message fields are started and ended by name and
/// index, in strictly increasing index order within their enclosing group, and each holds one or
/// more scalars or groups. A consumer must not expose a message until `end_message` has been
/// called; `abort_message` discards everything written since `start_message`.
pub trait RecordConsumer {
    fn start_message(&mut self) -> StrataResult<()>;

    fn end_message(&mut self) -> StrataResult<()>;

    /// Discard the message in progress, if any.
    fn abort_message(&mut self);

    fn start_field(&mut self, name: &str, index: usize) -> StrataResult<()>;

    fn end_field(&mut self, name: &str, index: usize) -> StrataResult<()>;

    fn start_group(&mut self) -> StrataResult<()>;

    fn end_group(&mut self) -> StrataResult<()>;

    fn add_scalar(&mut self, value: &ScalarValue) -> StrataResult<()>;
}

impl<C: RecordConsumer + ?Sized> RecordConsumer for &mut C {
    fn start_message(&mut self) -> StrataResult<()> {
        (**self).start_message()
    }

    fn end_message(&mut self) -> StrataResult<()> {
        (**self).end_message()
    }

    fn abort_message(&mut self) {
        (**self).abort_message()
    }

    fn start_field(&mut self, name: &str, index: usize) -> StrataResult<()> {
        (**self).start_field(name, index)
    }

    fn end_field(&mut self, name: &str, index: usize) -> StrataResult<()> {
        (**self).end_field(name, index)
    }

    fn start_group(&mut self) -> StrataResult<()> {
        (**self).start_group()
    }

    fn end_group(&mut self) -> StrataResult<()> {
        (**self).end_group()
    }

    fn add_scalar(&mut self, value: &ScalarValue) -> StrataResult<()> {
        (**self).add_scalar(value)
    }
}

/// A single call on a [`RecordConsumer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordEvent {
    StartMessage,
    EndMessage,
    StartField { name: FieldName, index: usize },
    EndField { name: FieldName, index: usize },
    StartGroup,
    EndGroup,
    Scalar(ScalarValue),
}

impl RecordEvent {
    pub fn start_field(name: impl Into<FieldName>, index: usize) -> Self {
        RecordEvent::StartField {
            name: name.into(),
            index,
        }
    }

    pub fn end_field(name: impl Into<FieldName>, index: usize) -> Self {
        RecordEvent::EndField {
            name: name.into(),
            index,
        }
    }

    /// Apply this event to a consumer.
    pub fn apply<C: RecordConsumer + ?Sized>(&self, consumer: &mut C) -> StrataResult<()> {
        match self {
            RecordEvent::StartMessage => consumer.start_message(),
            RecordEvent::EndMessage => consumer.end_message(),
            RecordEvent::StartField { name, index } => consumer.start_field(name, *index),
            RecordEvent::EndField { name, index } => consumer.end_field(name, *index),
            RecordEvent::StartGroup => consumer.start_group(),
            RecordEvent::EndGroup => consumer.end_group(),
            RecordEvent::Scalar(value) => consumer.add_scalar(value),
        }
    }
}

impl Display for RecordEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordEvent::StartMessage => write!(f, "start_message"),
            RecordEvent::EndMessage => write!(f, "end_message"),
            RecordEvent::StartField { name, index } => write!(f, "start_field({name}, {index})"),
            RecordEvent::EndField { name, index } => write!(f, "end_field({name}, {index})"),
            RecordEvent::StartGroup => write!(f, "start_group"),
            RecordEvent::EndGroup => write!(f, "end_group"),
            RecordEvent::Scalar(value) => write!(f, "scalar({value})"),
        }
    }
}

/// Replay recorded events onto a consumer, stopping at the first error.
pub fn replay<'a, I, C>(events: I, consumer: &mut C) -> StrataResult<()>
where
    I: IntoIterator<Item = &'a RecordEvent>,
    C: RecordConsumer + ?Sized,
{
    events
        .into_iter()
        .try_for_each(|event| event.apply(consumer))
}

/// A consumer that records the events of every committed message.
///
/// Events of an aborted message are dropped along with it.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    messages: Vec<Vec<RecordEvent>>,
    pending: Option<Vec<RecordEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed messages, each starting with [`RecordEvent::StartMessage`] and ending with
    /// [`RecordEvent::EndMessage`].
    pub fn messages(&self) -> &[Vec<RecordEvent>] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Vec<RecordEvent>> {
        self.messages
    }

    /// All committed events in write order.
    pub fn events(&self) -> impl Iterator<Item = &RecordEvent> + '_ {
        self.messages.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn in_message(&self) -> bool {
        self.pending.is_some()
    }

    fn push(&mut self, event: RecordEvent) -> StrataResult<()> {
        match self.pending.as_mut() {
            Some(pending) => {
                pending.push(event);
                Ok(())
            }
            None => strata_bail!(InvalidRecord: "{} outside of a message", event),
        }
    }
}

impl RecordConsumer for EventLog {
    fn start_message(&mut self) -> StrataResult<()> {
        if self.pending.is_some() {
            strata_bail!(InvalidRecord: "start_message while a message is open");
        }
        self.pending = Some(vec![RecordEvent::StartMessage]);
        Ok(())
    }

    fn end_message(&mut self) -> StrataResult<()> {
        let Some(mut pending) = self.pending.take() else {
            strata_bail!(InvalidRecord: "end_message without start_message");
        };
        pending.push(RecordEvent::EndMessage);
        self.messages.push(pending);
        Ok(())
    }

    fn abort_message(&mut self) {
        self.pending = None;
    }

    fn start_field(&mut self, name: &str, index: usize) -> StrataResult<()> {
        self.push(RecordEvent::start_field(name, index))
    }

    fn end_field(&mut self, name: &str, index: usize) -> StrataResult<()> {
        self.push(RecordEvent::end_field(name, index))
    }

    fn start_group(&mut self) -> StrataResult<()> {
        self.push(RecordEvent::StartGroup)
    }

    fn end_group(&mut self) -> StrataResult<()> {
        self.push(RecordEvent::EndGroup)
    }

    fn add_scalar(&mut self, value: &ScalarValue) -> StrataResult<()> {
        self.push(RecordEvent::Scalar(value.clone()))
    }
}
