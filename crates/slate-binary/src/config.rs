//! Encoder and decoder configuration.

/// How the writer stores non-integral floats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FloatWidth {
    /// Always `DOUBLE` (f64). Lossless.
    #[default]
    Double,
    /// Always `FLOAT` (f32). Lossy for most values.
    Single,
    /// `FLOAT` when the value survives the round trip through `f32`,
    /// `DOUBLE` otherwise.
    Shortest,
}

/// Configuration for [`BinaryWriter`](crate::BinaryWriter).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriterConfig {
    /// Width used for non-integral floats.
    ///
    /// Default: [`FloatWidth::Double`].
    pub float_width: FloatWidth,

    /// Emit map members ordered by key instead of insertion order.
    ///
    /// Default: `true`, so equal maps encode to equal bytes.
    pub sort_keys: bool,

    /// Maximum nesting depth of arrays and maps.
    ///
    /// Default: 512. Deeper trees (including cyclic ones) fail with
    /// [`EncodeError::DepthExceeded`](crate::EncodeError::DepthExceeded).
    pub max_depth: usize,
}

impl WriterConfig {
    /// Default nesting limit.
    pub const DEFAULT_MAX_DEPTH: usize = 512;
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            float_width: FloatWidth::Double,
            sort_keys: true,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Configuration for [`BinaryParser`](crate::BinaryParser).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Maximum nesting depth of arrays and maps.
    ///
    /// Default: 512.
    pub max_depth: usize,
}

impl ReaderConfig {
    /// Default nesting limit.
    pub const DEFAULT_MAX_DEPTH: usize = 512;
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}
