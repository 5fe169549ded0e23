//! Helpers for NUL-terminated string destinations.
//!
//! A string destination is a fixed buffer whose last byte is always a
//! terminator after a successful bind. Declare one as `Cell<[u8; N]>`, hand
//! `&cell` to the schema, and read it back with [`Cell::get`] and
//! [`terminated_str`].
//!
//! ```
//! use std::cell::Cell;
//! use toml_slots::{Key, parse, str::terminated_str};
//!
//! let name = Cell::new([0u8; 8]);
//! parse("name = \"slots\"", &[Key::new("name", &name)])?;
//! assert_eq!(terminated_str(&name.get()), Ok("slots"));
//! # Ok::<(), toml_slots::Error>(())
//! ```

use std::cell::Cell;
use std::str::Utf8Error;

#[cfg(test)]
#[path = "./str_tests.rs"]
mod tests;

/// Returns the bytes of `buf` before the first NUL, or all of `buf` if it
/// has none.
pub fn terminated(buf: &[u8]) -> &[u8] {
    match buf.iter().position(|&b| b == 0) {
        Some(end) => &buf[..end],
        None => buf,
    }
}

/// Like [`terminated`], decoded as UTF-8.
pub fn terminated_str(buf: &[u8]) -> Result<&str, Utf8Error> {
    std::str::from_utf8(terminated(buf))
}

/// Outcome of writing a string into a terminated destination.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Fill {
    /// Every byte fit.
    Complete,
    /// The payload was cut to `capacity - 1` bytes.
    Truncated,
    /// The destination has no room even for the terminator.
    NoRoom,
}

/// Copies at most `dst.len() - 1` bytes of `src` into `dst` and NUL-fills
/// the rest, so the destination is always terminated.
pub(crate) fn fill_terminated(dst: &[Cell<u8>], src: &[u8]) -> Fill {
    let Some(room) = dst.len().checked_sub(1) else {
        return Fill::NoRoom;
    };
    let n = src.len().min(room);
    for (cell, &b) in dst.iter().zip(&src[..n]) {
        cell.set(b);
    }
    for cell in &dst[n..] {
        cell.set(0);
    }
    if n < src.len() {
        Fill::Truncated
    } else {
        Fill::Complete
    }
}

/// Whether `src` and its terminator fit in `dst`.
pub(crate) fn fits(dst: &[Cell<u8>], src: &[u8]) -> bool {
    src.len() < dst.len()
}

/// Appends `src` and a terminator to `store` at `offset`, returning the end
/// of the payload. The caller checks that it [`fits`].
pub(crate) fn append_terminated(store: &[Cell<u8>], offset: usize, src: &[u8]) -> usize {
    let end = offset + src.len();
    for (cell, &b) in store[offset..end].iter().zip(src) {
        cell.set(b);
    }
    store[end].set(0);
    end
}
