use crate::Span;
use std::fmt::{self, Debug, Display};

#[cfg(test)]
#[path = "./error_tests.rs"]
mod tests;

/// Error that can occur while parsing a document into a schema.
///
/// Every error is fatal to the parse. Destinations bound before the failure
/// point keep their values; nothing after it is written.
#[derive(Debug, Clone)]
pub struct Error {
    /// The error kind
    pub kind: ErrorKind,
    /// The byte span where the error occurs.
    pub span: Span,
    /// 1-based line and column of the error, only available for errors
    /// coming from the parser
    pub line_info: Option<(usize, usize)>,
}

impl Error {
    /// The error kind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The byte span where the error occurs.
    pub fn span(&self) -> Span {
        self.span
    }

    /// The 1-based line of the error, if known.
    pub fn line(&self) -> Option<usize> {
        self.line_info.map(|(line, _)| line)
    }

    /// The 1-based column of the error, if known.
    pub fn column(&self) -> Option<usize> {
        self.line_info.map(|(_, column)| column)
    }
}

impl std::error::Error for Error {}

impl From<(ErrorKind, Span)> for Error {
    fn from((kind, span): (ErrorKind, Span)) -> Self {
        Self {
            kind,
            span,
            line_info: None,
        }
    }
}

/// Errors that can occur when parsing a document.
#[derive(Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// EOF was reached when looking for a value.
    UnexpectedEof,

    /// The input is larger than the maximum supported size of 4GiB.
    FileTooLarge,

    /// Reading from the character source failed.
    Io(std::io::ErrorKind),

    /// An unexpected character was encountered.
    Unexpected(char),

    /// A non-ASCII byte was found outside of a string or comment.
    NonAscii(u8),

    /// An invalid character not allowed in a string was found.
    InvalidCharInString(char),

    /// An invalid character was found as an escape.
    InvalidEscape(char),

    /// An invalid character was found in a hex escape.
    InvalidHexEscape(char),

    /// An invalid escape value was specified in a hex escape in a string.
    ///
    /// Valid values are in the plane of unicode codepoints.
    InvalidEscapeValue(u32),

    /// An unterminated string was found where EOF, or a newline for
    /// single-line strings, was found before the closing delimiter.
    UnterminatedString,

    /// A multiline string was closed by more than five quotes.
    TooManyQuotes,

    /// A number failed to parse.
    InvalidNumber,

    /// A date-time lexeme failed to decode.
    InvalidDatetime,

    /// A token was longer than the scanner's lexeme buffer.
    LexemeTooLong,

    /// The number cannot be stored losslessly in the destination type.
    OutOfRange(&'static str),

    /// Wanted one sort of token, but found another.
    Wanted {
        /// Expected token type.
        expected: &'static str,
        /// Actually found token type.
        found: &'static str,
    },

    /// The value found does not match the kind declared by the schema.
    Mismatch {
        /// Kind declared by the schema entry.
        expected: &'static str,
        /// Syntactic kind of the value found.
        found: &'static str,
    },

    /// Unquoted text was found when a quoted string was expected.
    UnquotedString,

    /// A key is not declared in the current scope.
    UnknownKey {
        /// The unknown key
        key: String,
    },

    /// A dotted key was used while dotted keys are disabled.
    DottedKey,

    /// Multiline strings are not allowed for key.
    MultilineStringKey,

    /// A `[table]` header named an entry that is not a table.
    NotATable {
        /// The header key
        key: String,
    },

    /// A `[[array]]` header named an entry that is not an array of tables.
    NotAnArrayOfTables {
        /// The header key
        key: String,
    },

    /// An array was found as an array element.
    NestedArray,

    /// More elements than the destination can hold.
    ArrayTooLong {
        /// Number of elements the destination holds.
        capacity: usize,
    },

    /// A string does not fit its destination.
    StringTooLong {
        /// Size of the destination in bytes, terminator included.
        capacity: usize,
    },

    /// Inline tables and arrays are nested deeper than allowed.
    TooDeep(usize),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnexpectedEof => "unexpected-eof",
            Self::FileTooLarge => "file-too-large",
            Self::Io(..) => "io",
            Self::Unexpected(..) => "unexpected",
            Self::NonAscii(..) => "non-ascii",
            Self::InvalidCharInString(..) => "invalid-char-in-string",
            Self::InvalidEscape(..) => "invalid-escape",
            Self::InvalidHexEscape(..) => "invalid-hex-escape",
            Self::InvalidEscapeValue(..) => "invalid-escape-value",
            Self::UnterminatedString => "unterminated-string",
            Self::TooManyQuotes => "too-many-quotes",
            Self::InvalidNumber => "invalid-number",
            Self::InvalidDatetime => "invalid-datetime",
            Self::LexemeTooLong => "lexeme-too-long",
            Self::OutOfRange(_) => "out-of-range",
            Self::Wanted { .. } => "wanted",
            Self::Mismatch { .. } => "mismatch",
            Self::UnquotedString => "unquoted-string",
            Self::UnknownKey { .. } => "unknown-key",
            Self::DottedKey => "dotted-key",
            Self::MultilineStringKey => "multiline-string-key",
            Self::NotATable { .. } => "not-a-table",
            Self::NotAnArrayOfTables { .. } => "not-an-array-of-tables",
            Self::NestedArray => "nested-array",
            Self::ArrayTooLong { .. } => "array-too-long",
            Self::StringTooLong { .. } => "string-too-long",
            Self::TooDeep(..) => "too-deep",
        };
        f.write_str(text)
    }
}

impl Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

struct Escape(char);

impl fmt::Display for Escape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write as _;

        if self.0.is_whitespace() || self.0.is_control() {
            for esc in self.0.escape_default() {
                f.write_char(esc)?;
            }
            Ok(())
        } else {
            f.write_char(self.0)
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::UnexpectedEof => f.write_str("unexpected eof encountered")?,
            ErrorKind::FileTooLarge => f.write_str("file is too large (maximum 4GiB)")?,
            ErrorKind::Io(kind) => write!(f, "failed to read input: {kind}")?,
            ErrorKind::Unexpected(c) => write!(
                f,
                "unexpected character `{}` ({:#x})",
                Escape(*c),
                u32::from(*c)
            )?,
            ErrorKind::NonAscii(b) => write!(f, "unexpected non-ascii byte {b:#x}")?,
            ErrorKind::InvalidCharInString(c) => {
                write!(f, "invalid character in string: `{}`", Escape(*c))?
            }
            ErrorKind::InvalidEscape(c) => {
                write!(f, "invalid escape sequence in string: `\\{}`", Escape(*c))?
            }
            ErrorKind::InvalidHexEscape(c) => {
                write!(f, "invalid hex escape character in string: `{}`", Escape(*c))?
            }
            ErrorKind::InvalidEscapeValue(v) => write!(f, "invalid escape value: `{v:#x}`")?,
            ErrorKind::UnterminatedString => f.write_str("unterminated string")?,
            ErrorKind::TooManyQuotes => {
                f.write_str("too many quotes at the end of multiline string")?
            }
            ErrorKind::InvalidNumber => f.write_str("invalid number")?,
            ErrorKind::InvalidDatetime => f.write_str("invalid date-time")?,
            ErrorKind::LexemeTooLong => f.write_str("token is too long")?,
            ErrorKind::OutOfRange(kind) => write!(f, "out of range of '{kind}'")?,
            ErrorKind::Wanted { expected, found } => write!(f, "expected {expected}, found {found}")?,
            ErrorKind::Mismatch { expected, found } => {
                write!(f, "type mismatch: expected {expected}, found {found}")?
            }
            ErrorKind::UnquotedString => {
                f.write_str("invalid TOML value, did you mean to use a quoted string?")?
            }
            ErrorKind::UnknownKey { key } => write!(f, "unknown key `{key}`")?,
            ErrorKind::DottedKey => f.write_str("dotted keys are not enabled")?,
            ErrorKind::MultilineStringKey => {
                f.write_str("multiline strings are not allowed for key")?
            }
            ErrorKind::NotATable { key } => write!(f, "`{key}` is not declared as a table")?,
            ErrorKind::NotAnArrayOfTables { key } => {
                write!(f, "`{key}` is not declared as an array of tables")?
            }
            ErrorKind::NestedArray => f.write_str("arrays of arrays are not supported")?,
            ErrorKind::ArrayTooLong { capacity } => {
                write!(f, "too many array elements (capacity {capacity})")?
            }
            ErrorKind::StringTooLong { capacity } => {
                write!(f, "string does not fit its destination ({capacity} bytes)")?
            }
            ErrorKind::TooDeep(limit) => write!(f, "values nested deeper than {limit} levels")?,
        }
        if let Some((line, column)) = self.line_info {
            write!(f, " at line {line}, column {column}")?;
        }
        Ok(())
    }
}
