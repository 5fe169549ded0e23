//! Parser configuration.

/// What to do with a string that does not fit its destination buffer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StringPolicy {
    /// Keep the first `capacity - 1` bytes and terminate.
    #[default]
    Truncate,
    /// Fail the parse with [`ErrorKind::StringTooLong`](crate::ErrorKind::StringTooLong).
    Reject,
}

/// What to do with an integer that does not fit the declared width.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum IntegerPolicy {
    /// Fail the parse with [`ErrorKind::OutOfRange`](crate::ErrorKind::OutOfRange).
    #[default]
    Reject,
    /// Keep the low bits, as an `as` cast does.
    Wrap,
}

/// Options accepted by [`parse_with`](crate::parse_with) and
/// [`parse_source`](crate::parse_source).
///
/// ```
/// use toml_slots::{IntegerPolicy, Options, StringPolicy};
///
/// let options = Options::default()
///     .with_max_depth(8)
///     .with_strings(StringPolicy::Reject)
///     .with_integers(IntegerPolicy::Reject);
/// assert_eq!(options.max_depth, 8);
/// assert!(options.dotted_keys);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Maximum nesting of inline tables and arrays inside one value.
    pub max_depth: usize,
    /// Policy for strings longer than their destination.
    pub strings: StringPolicy,
    /// Policy for integers outside the range of their destination.
    pub integers: IntegerPolicy,
    /// Whether `a.b = 1` and `[a.b]` are accepted.
    pub dotted_keys: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: 32,
            strings: StringPolicy::default(),
            integers: IntegerPolicy::default(),
            dotted_keys: true,
        }
    }
}

impl Options {
    /// Sets the maximum nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the string truncation policy.
    pub fn with_strings(mut self, policy: StringPolicy) -> Self {
        self.strings = policy;
        self
    }

    /// Sets the integer narrowing policy.
    pub fn with_integers(mut self, policy: IntegerPolicy) -> Self {
        self.integers = policy;
        self
    }

    /// Enables or disables dotted keys.
    pub fn with_dotted_keys(mut self, enabled: bool) -> Self {
        self.dotted_keys = enabled;
        self
    }
}
