//! Caller-declared document shape.
//!
//! A schema is a slice of [`Key`]s. Each key names one entry of a table and
//! carries a [`Target`]: the caller-owned cell, buffer, nested schema or
//! array descriptor the value is written into. Destinations are [`Cell`]s so
//! a schema can be an ordinary shared value that outlives many parses.
//!
//! Tables that repeat, as the elements of `[[name]]` headers or of arrays of
//! inline tables, are described by types implementing [`Record`]. A record
//! resolves its own field names, which lets a single element type be
//! reused for every slot of a fixed array.
//!
//! ```
//! use std::cell::Cell;
//! use toml_slots::{Array, Key, Record, Target, parse};
//!
//! #[derive(Default)]
//! struct Channel {
//!     enable: Cell<bool>,
//!     radio: Cell<u8>,
//! }
//!
//! impl Record for Channel {
//!     fn entry(&self, name: &str) -> Option<Target<'_>> {
//!         match name {
//!             "enable" => Some(Target::from(&self.enable)),
//!             "radio" => Some(Target::from(&self.radio)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let channels: [Channel; 4] = Default::default();
//! let count = Cell::new(0);
//! let schema = [Key::new("chan", Array::tables(&channels, &count))];
//!
//! parse("[[chan]]\nenable = true\n[[chan]]\nradio = 1\n", &schema)?;
//! assert_eq!(count.get(), 2);
//! assert!(channels[0].enable.get());
//! assert_eq!(channels[1].radio.get(), 1);
//! # Ok::<(), toml_slots::Error>(())
//! ```

use crate::{Datetime, Span};
use std::cell::Cell;
use std::fmt;

#[cfg(test)]
#[path = "./schema_tests.rs"]
mod tests;

/// One expected entry of a table: a key name and where its value goes.
#[derive(Copy, Clone, Debug)]
pub struct Key<'a> {
    /// The key as written in the document, without quotes.
    pub name: &'a str,
    /// Where the value is written.
    pub target: Target<'a>,
}

impl<'a> Key<'a> {
    pub fn new(name: &'a str, target: impl Into<Target<'a>>) -> Self {
        Key {
            name,
            target: target.into(),
        }
    }
}

/// Write target of a [`Key`].
#[derive(Copy, Clone)]
pub enum Target<'a> {
    I8(&'a Cell<i8>),
    I16(&'a Cell<i16>),
    I32(&'a Cell<i32>),
    I64(&'a Cell<i64>),
    U8(&'a Cell<u8>),
    U16(&'a Cell<u16>),
    U32(&'a Cell<u32>),
    U64(&'a Cell<u64>),
    F64(&'a Cell<f64>),
    Bool(&'a Cell<bool>),
    /// A terminated string buffer. Its length, terminator included, is the
    /// capacity.
    Str(&'a [Cell<u8>]),
    Datetime(&'a Cell<Datetime>),
    /// A nested table, as a `[header]` or an inline table.
    Table(&'a [Key<'a>]),
    /// A nested table whose fields are resolved by the caller.
    Record(&'a dyn Record),
    Array(Array<'a>),
}

impl Target<'_> {
    /// The value kind this target accepts.
    pub fn kind(&self) -> Kind {
        match self {
            Target::I8(_) => Kind::I8,
            Target::I16(_) => Kind::I16,
            Target::I32(_) => Kind::I32,
            Target::I64(_) => Kind::I64,
            Target::U8(_) => Kind::U8,
            Target::U16(_) => Kind::U16,
            Target::U32(_) => Kind::U32,
            Target::U64(_) => Kind::U64,
            Target::F64(_) => Kind::F64,
            Target::Bool(_) => Kind::Bool,
            Target::Str(_) => Kind::Str,
            Target::Datetime(_) => Kind::Datetime,
            Target::Table(_) | Target::Record(_) => Kind::Table,
            Target::Array(_) => Kind::Array,
        }
    }
}

impl fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Table(keys) => f.debug_tuple("Table").field(keys).finish(),
            Target::Array(array) => f.debug_tuple("Array").field(array).finish(),
            Target::Str(buf) => write!(f, "Str({} bytes)", buf.len()),
            other => f.debug_tuple("Target").field(&other.kind()).finish(),
        }
    }
}

/// Value kind of a [`Target`] or an array element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F64,
    Bool,
    Str,
    Datetime,
    Table,
    Array,
}

impl Kind {
    /// Describes the kind for error messages, as in "an i32".
    pub fn describe(self) -> &'static str {
        match self {
            Kind::I8 => "an i8",
            Kind::I16 => "an i16",
            Kind::I32 => "an i32",
            Kind::I64 => "an i64",
            Kind::U8 => "a u8",
            Kind::U16 => "a u16",
            Kind::U32 => "a u32",
            Kind::U64 => "a u64",
            Kind::F64 => "a float",
            Kind::Bool => "a boolean",
            Kind::Str => "a string",
            Kind::Datetime => "a date-time",
            Kind::Table => "a table",
            Kind::Array => "an array",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A table whose entries are resolved by name at parse time.
///
/// Implemented by the element type of an array of tables, and usable on its
/// own through [`Target::Record`].
pub trait Record {
    /// Returns the target for the entry `name`, or `None` if the table has
    /// no such entry.
    fn entry(&self, name: &str) -> Option<Target<'_>>;
}

/// A fixed collection of [`Record`]s backing an array of tables.
pub trait Records {
    /// Number of elements that can be stored.
    fn capacity(&self) -> usize;
    /// The element at `index`, `None` past the capacity.
    fn record(&self, index: usize) -> Option<&dyn Record>;
}

impl<R: Record, const N: usize> Records for [R; N] {
    fn capacity(&self) -> usize {
        N
    }

    fn record(&self, index: usize) -> Option<&dyn Record> {
        self.get(index).map(|r| r as &dyn Record)
    }
}

/// Array descriptor: fixed element storage plus the cell receiving the
/// number of elements parsed.
#[derive(Copy, Clone)]
pub struct Array<'a> {
    pub items: Items<'a>,
    pub len: &'a Cell<usize>,
}

impl<'a> Array<'a> {
    pub fn new(items: impl Into<Items<'a>>, len: &'a Cell<usize>) -> Self {
        Array {
            items: items.into(),
            len,
        }
    }

    /// An array of tables backed by `records`.
    pub fn tables(records: &'a dyn Records, len: &'a Cell<usize>) -> Self {
        Array::new(Items::Tables(records), len)
    }

    /// An array of strings packed into `store`.
    pub fn strings(spans: &'a [Cell<Span>], store: &'a [Cell<u8>], len: &'a Cell<usize>) -> Self {
        Array::new(StrArray::new(spans, store), len)
    }

    /// Maximum number of elements.
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Whether `self` and `other` count into the same cell.
    pub(crate) fn same(&self, other: &Array<'_>) -> bool {
        std::ptr::eq(self.len, other.len)
    }
}

impl fmt::Debug for Array<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("kind", &self.items.kind())
            .field("capacity", &self.capacity())
            .field("len", &self.len.get())
            .finish()
    }
}

/// Element storage of an [`Array`]. Elements are never themselves arrays.
#[derive(Copy, Clone)]
pub enum Items<'a> {
    I8(&'a [Cell<i8>]),
    I16(&'a [Cell<i16>]),
    I32(&'a [Cell<i32>]),
    I64(&'a [Cell<i64>]),
    U8(&'a [Cell<u8>]),
    U16(&'a [Cell<u16>]),
    U32(&'a [Cell<u32>]),
    U64(&'a [Cell<u64>]),
    F64(&'a [Cell<f64>]),
    Bool(&'a [Cell<bool>]),
    Datetime(&'a [Cell<Datetime>]),
    Str(StrArray<'a>),
    /// Tables, from `[[name]]` headers or inline tables.
    Tables(&'a dyn Records),
}

impl Items<'_> {
    /// Maximum number of elements.
    pub fn capacity(&self) -> usize {
        match self {
            Items::I8(s) => s.len(),
            Items::I16(s) => s.len(),
            Items::I32(s) => s.len(),
            Items::I64(s) => s.len(),
            Items::U8(s) => s.len(),
            Items::U16(s) => s.len(),
            Items::U32(s) => s.len(),
            Items::U64(s) => s.len(),
            Items::F64(s) => s.len(),
            Items::Bool(s) => s.len(),
            Items::Datetime(s) => s.len(),
            Items::Str(s) => s.spans.len(),
            Items::Tables(r) => r.capacity(),
        }
    }

    /// Kind of every element.
    pub fn kind(&self) -> Kind {
        match self {
            Items::I8(_) => Kind::I8,
            Items::I16(_) => Kind::I16,
            Items::I32(_) => Kind::I32,
            Items::I64(_) => Kind::I64,
            Items::U8(_) => Kind::U8,
            Items::U16(_) => Kind::U16,
            Items::U32(_) => Kind::U32,
            Items::U64(_) => Kind::U64,
            Items::F64(_) => Kind::F64,
            Items::Bool(_) => Kind::Bool,
            Items::Datetime(_) => Kind::Datetime,
            Items::Str(_) => Kind::Str,
            Items::Tables(_) => Kind::Table,
        }
    }
}

/// Storage for an array of strings.
///
/// Elements are packed into `store`, each followed by a NUL; the byte range
/// of element `i` (terminator excluded) is written to `spans[i]`. Spans are
/// `u32` offsets, so an element ending past 4 GiB into `store` fails with
/// [`ErrorKind::StringTooLong`](crate::ErrorKind::StringTooLong).
#[derive(Copy, Clone, Debug)]
pub struct StrArray<'a> {
    pub spans: &'a [Cell<Span>],
    pub store: &'a [Cell<u8>],
}

impl<'a> StrArray<'a> {
    pub fn new(spans: &'a [Cell<Span>], store: &'a [Cell<u8>]) -> Self {
        StrArray { spans, store }
    }
}

/// Views a cell holding an array as an array of cells.
pub fn cells<T, const N: usize>(cell: &Cell<[T; N]>) -> &[Cell<T>] {
    let cell: &Cell<[T]> = cell;
    cell.as_slice_of_cells()
}

macro_rules! scalar_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {$(
        impl<'a> From<&'a Cell<$ty>> for Target<'a> {
            fn from(cell: &'a Cell<$ty>) -> Self {
                Target::$variant(cell)
            }
        }

        impl<'a> From<&'a [Cell<$ty>]> for Items<'a> {
            fn from(cells: &'a [Cell<$ty>]) -> Self {
                Items::$variant(cells)
            }
        }

        impl<'a, const N: usize> From<&'a [Cell<$ty>; N]> for Items<'a> {
            fn from(cells: &'a [Cell<$ty>; N]) -> Self {
                Items::$variant(cells)
            }
        }

        impl<'a, const N: usize> From<&'a Cell<[$ty; N]>> for Items<'a> {
            fn from(cell: &'a Cell<[$ty; N]>) -> Self {
                Items::$variant(cells(cell))
            }
        }
    )*};
}

scalar_conversions! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f64 => F64,
    bool => Bool,
    Datetime => Datetime,
}

impl<'a> From<&'a [Cell<u8>]> for Target<'a> {
    fn from(buf: &'a [Cell<u8>]) -> Self {
        Target::Str(buf)
    }
}

impl<'a, const N: usize> From<&'a [Cell<u8>; N]> for Target<'a> {
    fn from(buf: &'a [Cell<u8>; N]) -> Self {
        Target::Str(buf)
    }
}

impl<'a, const N: usize> From<&'a Cell<[u8; N]>> for Target<'a> {
    fn from(buf: &'a Cell<[u8; N]>) -> Self {
        Target::Str(cells(buf))
    }
}

impl<'a> From<&'a [Key<'a>]> for Target<'a> {
    fn from(keys: &'a [Key<'a>]) -> Self {
        Target::Table(keys)
    }
}

impl<'a, const N: usize> From<&'a [Key<'a>; N]> for Target<'a> {
    fn from(keys: &'a [Key<'a>; N]) -> Self {
        Target::Table(keys)
    }
}

impl<'a> From<&'a dyn Record> for Target<'a> {
    fn from(record: &'a dyn Record) -> Self {
        Target::Record(record)
    }
}

impl<'a> From<Array<'a>> for Target<'a> {
    fn from(array: Array<'a>) -> Self {
        Target::Array(array)
    }
}

impl<'a> From<StrArray<'a>> for Items<'a> {
    fn from(strings: StrArray<'a>) -> Self {
        Items::Str(strings)
    }
}

impl<'a> From<&'a dyn Records> for Items<'a> {
    fn from(records: &'a dyn Records) -> Self {
        Items::Tables(records)
    }
}
