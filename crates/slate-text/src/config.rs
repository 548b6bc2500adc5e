//! Parser and writer configuration.

/// Configuration for [`Parser`](crate::Parser).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum nesting depth of arrays and objects. Deeper input fails
    /// with [`InvalidJson`](slate_value::ResultCode::InvalidJson).
    ///
    /// Default: 512.
    pub max_depth: usize,
}

impl ParserConfig {
    /// Default nesting limit.
    pub const DEFAULT_MAX_DEPTH: usize = 512;
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Configuration for [`TextWriter`](crate::TextWriter).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextWriterConfig {
    /// Written once per nesting level before each member.
    ///
    /// Default: `"\t"`.
    pub indent: String,
    /// Written after each member and after the document.
    ///
    /// Default: `"\n"`.
    pub eol: String,
    /// Written between a key and its value.
    ///
    /// Default: `": "`.
    pub key_separator: String,
    /// Write object members in key order instead of insertion order.
    ///
    /// Default: `false`.
    pub sort_keys: bool,
    /// Maximum nesting depth of arrays and objects.
    ///
    /// Default: 512.
    pub max_depth: usize,
}

impl TextWriterConfig {
    /// Default nesting limit.
    pub const DEFAULT_MAX_DEPTH: usize = 512;

    /// Single-line output with no insignificant whitespace.
    pub fn compact() -> Self {
        Self {
            indent: String::new(),
            eol: String::new(),
            key_separator: ":".to_owned(),
            ..Self::default()
        }
    }

    /// Indent with `n` spaces instead of a tab.
    pub fn with_spaces(mut self, n: usize) -> Self {
        self.indent = " ".repeat(n);
        self
    }

    /// Set key sorting.
    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }
}

impl Default for TextWriterConfig {
    fn default() -> Self {
        Self {
            indent: "\t".to_owned(),
            eol: "\n".to_owned(),
            key_separator: ": ".to_owned(),
            sort_keys: false,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
