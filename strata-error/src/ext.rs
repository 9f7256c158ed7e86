use std::sync::Arc;

use crate::{ErrString, StrataResult};

/// Extension trait for StrataResult
pub trait StrataResultExt<T>: private::Sealed {
    /// Attach a group to the error's location, see [`crate::StrataError::in_group`].
    fn in_group(self, group: &Arc<str>) -> StrataResult<T>;

    /// Wrap the error with additional context.
    fn context<M: Into<ErrString>>(self, msg: M) -> StrataResult<T>;
}

mod private {
    use crate::StrataResult;

    pub trait Sealed {}

    impl<T> Sealed for StrataResult<T> {}
}

impl<T> StrataResultExt<T> for StrataResult<T> {
    fn in_group(self, group: &Arc<str>) -> StrataResult<T> {
        self.map_err(|e| e.in_group(group))
    }

    fn context<M: Into<ErrString>>(self, msg: M) -> StrataResult<T> {
        self.map_err(|e| e.with_context(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldLocation, strata_err};

    #[test]
    fn context_keeps_the_root_error() {
        let result: StrataResult<()> =
            Err(strata_err!(Conversion @ FieldLocation::property("age", 1) => "bad width"));
        let err = result
            .context("writing Person")
            .in_group(&Arc::from("Person"))
            .unwrap_err();

        assert!(err.is_conversion());
        let loc = err.location().unwrap();
        assert_eq!(loc.group_name(), Some("Person"));
        assert_eq!(loc.property_name(), Some("age"));
        let msg = err.to_string();
        assert!(msg.starts_with("writing Person: conversion"), "{msg}");
        assert!(msg.contains("property `age`, index 1): bad width"), "{msg}");
    }
}
