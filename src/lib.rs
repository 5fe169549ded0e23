//! A schema-directed TOML parser that writes values straight into
//! caller-owned, fixed-size storage.
//!
//! Instead of building a document tree, the caller declares the expected
//! shape up front as a slice of [`Key`]s, each pointing at a destination: a
//! [`Cell`](std::cell::Cell) for scalars, a byte buffer for strings, a
//! nested schema for tables, or an [`Array`] descriptor with fixed element
//! storage and a count. The parser streams tokens from the input and binds
//! each value the moment it is read. Nothing is allocated on the success
//! path, and every capacity is decided by the caller.
//!
//! Anything the schema does not describe is an error: unknown keys, values
//! of the wrong kind, arrays longer than their storage.
//!
//! # Examples
//!
//! ```
//! use std::cell::Cell;
//! use toml_slots::{Array, Key, Record, Target, str::terminated_str};
//!
//! #[derive(Default)]
//! struct Thing {
//!     name: Cell<[u8; 16]>,
//!     value: Cell<u32>,
//! }
//!
//! impl Record for Thing {
//!     fn entry(&self, name: &str) -> Option<Target<'_>> {
//!         match name {
//!             "name" => Some(Target::from(&self.name)),
//!             "value" => Some(Target::from(&self.value)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let content = r#"
//! dev-mode = true
//!
//! [[things]]
//! name = "hammer"
//! value = 43
//!
//! [[things]]
//! name = "drill"
//! value = 300
//! "#;
//!
//! let dev_mode = Cell::new(false);
//! let things: [Thing; 4] = Default::default();
//! let count = Cell::new(0);
//! let schema = [
//!     Key::new("dev-mode", &dev_mode),
//!     Key::new("things", Array::tables(&things, &count)),
//! ];
//!
//! toml_slots::parse(content, &schema)?;
//!
//! assert!(dev_mode.get());
//! assert_eq!(count.get(), 2);
//! assert_eq!(terminated_str(&things[0].name.get()), Ok("hammer"));
//! assert_eq!(things[1].value.get(), 300);
//! # Ok::<(), toml_slots::Error>(())
//! ```

mod bind;
mod error;
mod options;
mod parser;
mod scanner;
mod schema;
mod source;
mod span;
pub mod str;
mod time;

pub use error::{Error, ErrorKind};
pub use options::{IntegerPolicy, Options, StringPolicy};
pub use parser::{parse, parse_reader, parse_source, parse_with};
pub use scanner::{LEXEME_CAPACITY, Scanner, Token, TokenKind};
pub use schema::{Array, Items, Key, Kind, Record, Records, StrArray, Target, cells};
pub use source::{ReadSource, SliceSource, Source};
pub use span::Span;
pub use time::{Date, Datetime, Time, TimeOffset};

#[cfg(feature = "serde")]
pub mod impl_serde;
