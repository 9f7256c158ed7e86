/// Options controlling how group schemas are resolved into physical layouts.
///
/// Options are fixed once a [`crate::SchemaResolver`] or [`crate::ElementCodec`] has been built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOptions {
    leaf_separator: char,
    numeric_widening: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            leaf_separator: '_',
            numeric_widening: true,
        }
    }
}

impl CodecOptions {
    /// The separator placed between a property name and the leaf position when a composite
    /// property fans out into several physical fields (`location_0`, `location_1`, ...).
    pub fn with_leaf_separator(mut self, separator: char) -> Self {
        self.leaf_separator = separator;
        self
    }

    /// Allow 32-bit integers and floats to be stored in 64-bit physical leaves when a schema
    /// asks for it. Narrowing is never allowed.
    pub fn with_numeric_widening(mut self, widening: bool) -> Self {
        self.numeric_widening = widening;
        self
    }

    pub fn leaf_separator(&self) -> char {
        self.leaf_separator
    }

    pub fn numeric_widening(&self) -> bool {
        self.numeric_widening
    }
}
