use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::LogicalValue;

/// The entries of a map-valued property.
///
/// Entry order is not part of a map's value: two maps are equal when they hold the same entries,
/// in any order. Keys are unique; inserting an existing key replaces its value.
#[derive(Debug, Clone, Default)]
pub struct LogicalMap {
    entries: Vec<(LogicalValue, LogicalValue)>,
}

impl LogicalMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the value previously held for `key`.
    pub fn insert(&mut self, key: LogicalValue, value: LogicalValue) -> Option<LogicalValue> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &LogicalValue) -> Option<&LogicalValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LogicalValue, &LogicalValue)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl PartialEq for LogicalMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}

impl FromIterator<(LogicalValue, LogicalValue)> for LogicalMap {
    fn from_iter<T: IntoIterator<Item = (LogicalValue, LogicalValue)>>(iter: T) -> Self {
        let mut map = LogicalMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for LogicalMap {
    type Item = (LogicalValue, LogicalValue);
    type IntoIter = std::vec::IntoIter<(LogicalValue, LogicalValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Display for LogicalMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.entries
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_order() {
        let a = LogicalValue::map([("x", 1i32), ("y", 2i32)]);
        let b = LogicalValue::map([("y", 2i32), ("x", 1i32)]);
        let c = LogicalValue::map([("y", 2i32), ("x", 3i32)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, LogicalValue::map([("x", 1i32)]));
    }

    #[test]
    fn insert_replaces() {
        let mut map = LogicalMap::new();
        assert!(map.insert("k".into(), 1i32.into()).is_none());
        assert_eq!(
            map.insert("k".into(), 2i32.into()),
            Some(LogicalValue::I32(1))
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&"k".into()), Some(&LogicalValue::I32(2)));
    }
}
