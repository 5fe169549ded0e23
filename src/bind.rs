//! Conversion of scanned scalars into their destinations.
//!
//! Every function here either writes the destination or returns the reason
//! it could not; positions are attached by the parser.

use crate::options::{IntegerPolicy, Options, StringPolicy};
use crate::scanner::{LEXEME_CAPACITY, Token, TokenKind};
use crate::schema::{Items, Kind, StrArray, Target};
use crate::str::{Fill, append_terminated, fill_terminated, fits};
use crate::{Datetime, ErrorKind, Span};
use std::cell::Cell;
use std::num::IntErrorKind;

#[cfg(test)]
#[path = "./bind_tests.rs"]
mod tests;

/// A scanned value token with its decoded text.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Scalar<'s> {
    pub token: Token,
    pub text: &'s [u8],
    /// The string was longer than the scanner's lexeme buffer.
    pub truncated: bool,
}

/// Writes `value` into a scalar target.
///
/// Tables and arrays are bound by the parser, so reaching them here means
/// the value token cannot open one.
pub(crate) fn scalar(
    target: &Target<'_>,
    value: &Scalar<'_>,
    options: &Options,
) -> Result<(), ErrorKind> {
    match *target {
        Target::I8(cell) => set_integer(cell, value, options),
        Target::I16(cell) => set_integer(cell, value, options),
        Target::I32(cell) => set_integer(cell, value, options),
        Target::I64(cell) => set_integer(cell, value, options),
        Target::U8(cell) => set_integer(cell, value, options),
        Target::U16(cell) => set_integer(cell, value, options),
        Target::U32(cell) => set_integer(cell, value, options),
        Target::U64(cell) => set_integer(cell, value, options),
        Target::F64(cell) => float(value).map(|f| cell.set(f)),
        Target::Bool(cell) => boolean(value).map(|b| cell.set(b)),
        Target::Datetime(cell) => datetime(value).map(|d| cell.set(d)),
        Target::Str(buf) => string(buf, value, options),
        Target::Table(_) | Target::Record(_) | Target::Array(_) => {
            Err(mismatch(target.kind(), value))
        }
    }
}

/// Writes `value` as element `index` of `items`.
pub(crate) fn element(
    items: &Items<'_>,
    index: usize,
    value: &Scalar<'_>,
    options: &Options,
) -> Result<(), ErrorKind> {
    if index >= items.capacity() {
        return Err(ErrorKind::ArrayTooLong {
            capacity: items.capacity(),
        });
    }
    match *items {
        Items::I8(cells) => set_integer(&cells[index], value, options),
        Items::I16(cells) => set_integer(&cells[index], value, options),
        Items::I32(cells) => set_integer(&cells[index], value, options),
        Items::I64(cells) => set_integer(&cells[index], value, options),
        Items::U8(cells) => set_integer(&cells[index], value, options),
        Items::U16(cells) => set_integer(&cells[index], value, options),
        Items::U32(cells) => set_integer(&cells[index], value, options),
        Items::U64(cells) => set_integer(&cells[index], value, options),
        Items::F64(cells) => float(value).map(|f| cells[index].set(f)),
        Items::Bool(cells) => boolean(value).map(|b| cells[index].set(b)),
        Items::Datetime(cells) => datetime(value).map(|d| cells[index].set(d)),
        Items::Str(strings) => string_element(&strings, index, value),
        Items::Tables(_) => Err(mismatch(Kind::Table, value)),
    }
}

#[cold]
fn mismatch(expected: Kind, value: &Scalar<'_>) -> ErrorKind {
    ErrorKind::Mismatch {
        expected: expected.describe(),
        found: value.token.kind.describe(),
    }
}

fn expect(value: &Scalar<'_>, token: TokenKind, kind: Kind) -> Result<(), ErrorKind> {
    if value.token.kind == token {
        Ok(())
    } else {
        Err(mismatch(kind, value))
    }
}

// -- integers ---------------------------------------------------------------

/// A destination integer width.
trait Integer: Copy {
    const KIND: Kind;
    const NAME: &'static str;
    fn narrow(value: i128, policy: IntegerPolicy) -> Result<Self, ErrorKind>;
}

macro_rules! integer {
    ($($num:ty => $kind:ident),+ $(,)?) => {$(
        impl Integer for $num {
            const KIND: Kind = Kind::$kind;
            const NAME: &'static str = stringify!($num);

            fn narrow(value: i128, policy: IntegerPolicy) -> Result<Self, ErrorKind> {
                match policy {
                    IntegerPolicy::Reject => match <$num>::try_from(value) {
                        Ok(i) => Ok(i),
                        Err(_) => Err(ErrorKind::OutOfRange(stringify!($num))),
                    },
                    IntegerPolicy::Wrap => Ok(value as $num),
                }
            }
        }
    )+};
}

integer!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
);

fn set_integer<T: Integer>(
    cell: &Cell<T>,
    value: &Scalar<'_>,
    options: &Options,
) -> Result<(), ErrorKind> {
    expect(value, TokenKind::Integer, T::KIND)?;
    let i = integer(value.text, T::NAME)?;
    cell.set(T::narrow(i, options.integers)?);
    Ok(())
}

/// Parses an integer lexeme, which has its separators already stripped.
fn integer(text: &[u8], name: &'static str) -> Result<i128, ErrorKind> {
    let Ok(text) = std::str::from_utf8(text) else {
        return Err(ErrorKind::InvalidNumber);
    };
    let (radix, digits) = if let Some(rest) = text.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = text.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = text.strip_prefix("0b") {
        (2, rest)
    } else {
        let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
        if unsigned.len() > 1 && unsigned.starts_with('0') {
            return Err(ErrorKind::InvalidNumber);
        }
        (10, text)
    };
    match i128::from_str_radix(digits, radix) {
        Ok(i) => Ok(i),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                Err(ErrorKind::OutOfRange(name))
            }
            _ => Err(ErrorKind::InvalidNumber),
        },
    }
}

// -- other scalars ----------------------------------------------------------

fn float(value: &Scalar<'_>) -> Result<f64, ErrorKind> {
    expect(value, TokenKind::Float, Kind::F64)?;
    let text = value.text;
    let (negative, unsigned) = match text {
        [b'-', rest @ ..] => (true, rest),
        [b'+', rest @ ..] => (false, rest),
        _ => (false, text),
    };
    let sign = if negative { -1.0 } else { 1.0 };
    match unsigned {
        b"inf" => return Ok(f64::INFINITY.copysign(sign)),
        b"nan" => return Ok(f64::NAN.copysign(sign)),
        _ => {}
    }
    if !is_float_grammar(unsigned) {
        return Err(ErrorKind::InvalidNumber);
    }
    let Ok(text) = std::str::from_utf8(text) else {
        return Err(ErrorKind::InvalidNumber);
    };
    let Ok(f) = text.parse::<f64>() else {
        return Err(ErrorKind::InvalidNumber);
    };
    if f.is_infinite() || (f == 0.0 && has_nonzero_mantissa(unsigned)) {
        return Err(ErrorKind::OutOfRange("f64"));
    }
    Ok(f)
}

/// `int [ "." digits ] [ ("e" | "E") [sign] digits ]` with at least one of
/// the optional parts, and no leading zeros in `int`.
fn is_float_grammar(s: &[u8]) -> bool {
    fn digits(s: &[u8], mut i: usize) -> usize {
        while s.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    }

    let int_end = digits(s, 0);
    if int_end == 0 || (int_end > 1 && s[0] == b'0') {
        return false;
    }
    let mut i = int_end;
    let mut decorated = false;
    if s.get(i) == Some(&b'.') {
        let end = digits(s, i + 1);
        if end == i + 1 {
            return false;
        }
        i = end;
        decorated = true;
    }
    if let Some(b'e' | b'E') = s.get(i) {
        i += 1;
        if let Some(b'+' | b'-') = s.get(i) {
            i += 1;
        }
        let end = digits(s, i);
        if end == i {
            return false;
        }
        i = end;
        decorated = true;
    }
    decorated && i == s.len()
}

fn has_nonzero_mantissa(s: &[u8]) -> bool {
    s.iter()
        .take_while(|&&b| b != b'e' && b != b'E')
        .any(|&b| matches!(b, b'1'..=b'9'))
}

fn boolean(value: &Scalar<'_>) -> Result<bool, ErrorKind> {
    expect(value, TokenKind::Bool, Kind::Bool)?;
    Ok(value.text == b"true")
}

fn datetime(value: &Scalar<'_>) -> Result<Datetime, ErrorKind> {
    expect(value, TokenKind::Datetime, Kind::Datetime)?;
    match Datetime::parse(value.text) {
        Some(d) => Ok(d),
        None => Err(ErrorKind::InvalidDatetime),
    }
}

fn expect_string(value: &Scalar<'_>) -> Result<(), ErrorKind> {
    match value.token.kind {
        TokenKind::String | TokenKind::MultilineString => Ok(()),
        TokenKind::BareKey
        | TokenKind::Integer
        | TokenKind::Float
        | TokenKind::Bool
        | TokenKind::Datetime => Err(ErrorKind::UnquotedString),
        _ => Err(mismatch(Kind::Str, value)),
    }
}

fn string(buf: &[Cell<u8>], value: &Scalar<'_>, options: &Options) -> Result<(), ErrorKind> {
    expect_string(value)?;
    // The scanner cut the lexeme short of what the buffer could hold.
    if value.truncated && buf.len().saturating_sub(1) > LEXEME_CAPACITY {
        return Err(ErrorKind::LexemeTooLong);
    }
    let too_long = ErrorKind::StringTooLong {
        capacity: buf.len(),
    };
    match fill_terminated(buf, value.text) {
        Fill::NoRoom => Err(too_long),
        Fill::Complete if !value.truncated => Ok(()),
        _ => match options.strings {
            StringPolicy::Truncate => Ok(()),
            StringPolicy::Reject => Err(too_long),
        },
    }
}

/// Appends element `index`, which starts right after the terminator of
/// element `index - 1`.
fn string_element(strings: &StrArray<'_>, index: usize, value: &Scalar<'_>) -> Result<(), ErrorKind> {
    expect_string(value)?;
    let offset = match index.checked_sub(1) {
        Some(prev) => strings.spans[prev].get().end as usize + 1,
        None => 0,
    };
    let store = strings.store;
    let too_long = ErrorKind::StringTooLong {
        capacity: store.len(),
    };
    if value.truncated || offset > store.len() || !fits(&store[offset..], value.text) {
        return Err(too_long);
    }
    let Some(span) = store_span(offset, offset + value.text.len()) else {
        return Err(too_long);
    };
    append_terminated(store, offset, value.text);
    strings.spans[index].set(span);
    Ok(())
}

/// `start..end` as a [`Span`], if both ends fit in a `u32`.
fn store_span(start: usize, end: usize) -> Option<Span> {
    Some(Span::new(u32::try_from(start).ok()?, u32::try_from(end).ok()?))
}
