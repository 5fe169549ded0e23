//! Byte-at-a-time tokenizer.
//!
//! The scanner pulls bytes from a [`Source`] with one byte of look-ahead and
//! decodes each token into a fixed lexeme buffer: escapes are resolved,
//! number separators are stripped, and string quotes are removed. The
//! buffer is reused by every call, so a lexeme is only valid until the next
//! token is scanned.

use crate::{Datetime, Error, ErrorKind, Source, Span};

#[cfg(test)]
#[path = "./scanner_tests.rs"]
mod tests;

/// Size of the lexeme buffer. Longer strings are truncated; any other
/// longer token is an error.
pub const LEXEME_CAPACITY: usize = 1024;

/// Lexical class of a [`Token`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    LeftBracket,
    RightBracket,
    DoubleLeftBracket,
    DoubleRightBracket,
    Equals,
    LeftBrace,
    RightBrace,
    Comma,
    Period,
    BareKey,
    /// A basic or literal string on one line.
    String,
    /// A `"""` or `'''` string.
    MultilineString,
    Integer,
    Float,
    Bool,
    Datetime,
    Newline,
    Eof,
}

impl TokenKind {
    /// Describes the token for error messages, as in "an equals".
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::LeftBracket => "a left bracket",
            TokenKind::RightBracket => "a right bracket",
            TokenKind::DoubleLeftBracket => "a double left bracket",
            TokenKind::DoubleRightBracket => "a double right bracket",
            TokenKind::Equals => "an equals",
            TokenKind::LeftBrace => "a left brace",
            TokenKind::RightBrace => "a right brace",
            TokenKind::Comma => "a comma",
            TokenKind::Period => "a period",
            TokenKind::BareKey => "an identifier",
            TokenKind::String => "a string",
            TokenKind::MultilineString => "a multiline string",
            TokenKind::Integer => "an integer",
            TokenKind::Float => "a float",
            TokenKind::Bool => "a boolean",
            TokenKind::Datetime => "a date-time",
            TokenKind::Newline => "a newline",
            TokenKind::Eof => "eof",
        }
    }
}

/// A scanned token. Its text is [`Scanner::lexeme`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range of the token in the input.
    pub span: Span,
    /// 1-based line of the first byte.
    pub line: u32,
    /// 1-based column of the first byte.
    pub column: u32,
}

#[derive(Copy, Clone, Debug)]
struct Pos {
    offset: u32,
    line: u32,
    column: u32,
}

impl Pos {
    const START: Pos = Pos {
        offset: 0,
        line: 1,
        column: 1,
    };
}

/// Tokenizer over a [`Source`].
///
/// Keys and values are scanned in separate contexts: [`next_key`] reads any
/// run of `A-Za-z0-9_-` as a bare key, so keys like `1234` or `true` are not
/// mistaken for values, while [`next_token`] classifies numbers, booleans
/// and date-times.
///
/// [`next_key`]: Scanner::next_key
/// [`next_token`]: Scanner::next_token
pub struct Scanner<S> {
    source: S,
    // `None` until the next byte has been pulled from the source.
    ahead: Option<Option<u8>>,
    pos: Pos,
    after_cr: bool,
    start: Pos,
    err_at: Pos,
    lexeme: [u8; LEXEME_CAPACITY],
    len: usize,
    truncated: bool,
}

impl<S: Source> Scanner<S> {
    pub fn new(source: S) -> Self {
        Scanner {
            source,
            ahead: None,
            pos: Pos::START,
            after_cr: false,
            start: Pos::START,
            err_at: Pos::START,
            lexeme: [0; LEXEME_CAPACITY],
            len: 0,
            truncated: false,
        }
    }

    /// Text of the last token: decoded string contents, a number without
    /// separators, or the raw text of anything else.
    pub fn lexeme(&self) -> &[u8] {
        &self.lexeme[..self.len]
    }

    /// Whether the last string token was longer than the lexeme buffer.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Scans the next token in value position.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        match self.scan_value() {
            Ok(kind) => Ok(self.token(kind)),
            Err(kind) => Err(self.error(kind)),
        }
    }

    /// Scans the next token in key position.
    pub fn next_key(&mut self) -> Result<Token, Error> {
        let scanned = match self.skip_trivia() {
            Ok(()) => {
                self.begin();
                match self.peek() {
                    Ok(Some(b)) if is_keylike_byte(b) => {
                        self.keylike().map(|()| TokenKind::BareKey)
                    }
                    Ok(_) => self.scan_value(),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e),
        };
        match scanned {
            Ok(kind) => Ok(self.token(kind)),
            Err(kind) => Err(self.error(kind)),
        }
    }

    fn token(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            span: Span::new(self.start.offset, self.pos.offset),
            line: self.start.line,
            column: self.start.column,
        }
    }

    #[cold]
    fn error(&self, kind: ErrorKind) -> Error {
        let start = self.err_at.offset;
        Error {
            kind,
            span: Span::new(start, self.pos.offset.max(start.saturating_add(1))),
            line_info: Some((self.err_at.line as usize, self.err_at.column as usize)),
        }
    }

    // -- cursor operations --------------------------------------------------

    #[inline]
    fn peek(&mut self) -> Result<Option<u8>, ErrorKind> {
        if let Some(ahead) = self.ahead {
            return Ok(ahead);
        }
        let b = self.source.next_byte()?;
        if b.is_some() && self.pos.offset == u32::MAX {
            return Err(ErrorKind::FileTooLarge);
        }
        self.ahead = Some(b);
        Ok(b)
    }

    /// Consumes the byte returned by the last [`peek`](Self::peek).
    #[inline]
    fn bump(&mut self) {
        let Some(Some(b)) = self.ahead else {
            return;
        };
        self.ahead = None;
        self.pos.offset += 1;
        if b == b'\r' || (b == b'\n' && !self.after_cr) {
            self.pos.line += 1;
            self.pos.column = 1;
        } else if b != b'\n' {
            self.pos.column += 1;
        }
        self.after_cr = b == b'\r';
    }

    fn eat(&mut self, b: u8) -> Result<bool, ErrorKind> {
        if self.peek()? == Some(b) {
            self.bump();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn begin(&mut self) {
        self.start = self.pos;
        self.err_at = self.pos;
        self.len = 0;
        self.truncated = false;
    }

    fn push(&mut self, b: u8) -> Result<(), ErrorKind> {
        if self.len == LEXEME_CAPACITY {
            return Err(ErrorKind::LexemeTooLong);
        }
        self.lexeme[self.len] = b;
        self.len += 1;
        Ok(())
    }

    fn push_str(&mut self, b: u8) {
        if self.len == LEXEME_CAPACITY {
            self.truncated = true;
        } else {
            self.lexeme[self.len] = b;
            self.len += 1;
        }
    }

    #[cold]
    fn fail_at(&mut self, at: Pos, kind: ErrorKind) -> ErrorKind {
        self.err_at = at;
        kind
    }

    fn skip_trivia(&mut self) -> Result<(), ErrorKind> {
        loop {
            match self.peek()? {
                Some(b' ' | b'\t') => self.bump(),
                Some(b'#') => {
                    self.bump();
                    while let Some(b) = self.peek()? {
                        match b {
                            b'\n' | b'\r' => break,
                            0x00..=0x08 | 0x0a..=0x1f | 0x7f => {
                                self.begin();
                                return Err(ErrorKind::Unexpected(b as char));
                            }
                            _ => self.bump(),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    // -- tokens -------------------------------------------------------------

    fn scan_value(&mut self) -> Result<TokenKind, ErrorKind> {
        self.skip_trivia()?;
        self.begin();
        let Some(b) = self.peek()? else {
            return Ok(TokenKind::Eof);
        };
        let single = match b {
            b'\n' => TokenKind::Newline,
            b'\r' => {
                self.bump();
                self.eat(b'\n')?;
                return Ok(TokenKind::Newline);
            }
            b'[' => {
                self.bump();
                return Ok(if self.eat(b'[')? {
                    TokenKind::DoubleLeftBracket
                } else {
                    TokenKind::LeftBracket
                });
            }
            b']' => {
                self.bump();
                return Ok(if self.eat(b']')? {
                    TokenKind::DoubleRightBracket
                } else {
                    TokenKind::RightBracket
                });
            }
            b'=' => TokenKind::Equals,
            b'{' => TokenKind::LeftBrace,
            b'}' => TokenKind::RightBrace,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Period,
            b'"' => {
                self.bump();
                return self.basic_string();
            }
            b'\'' => {
                self.bump();
                return self.literal_string();
            }
            b'+' | b'-' => {
                self.bump();
                self.push(b)?;
                return self.signed();
            }
            b'0'..=b'9' => return self.number(false),
            b if is_keylike_byte(b) => return self.word(),
            0x80.. => return Err(ErrorKind::NonAscii(b)),
            _ => return Err(ErrorKind::Unexpected(b as char)),
        };
        self.bump();
        Ok(single)
    }

    fn keylike(&mut self) -> Result<(), ErrorKind> {
        while let Some(b) = self.peek()? {
            if !is_keylike_byte(b) {
                break;
            }
            self.bump();
            self.push(b)?;
        }
        Ok(())
    }

    fn word(&mut self) -> Result<TokenKind, ErrorKind> {
        self.keylike()?;
        Ok(match self.lexeme() {
            b"true" | b"false" => TokenKind::Bool,
            b"inf" | b"nan" => TokenKind::Float,
            _ => TokenKind::BareKey,
        })
    }

    // -- numbers ------------------------------------------------------------

    /// After a `+` or `-`.
    fn signed(&mut self) -> Result<TokenKind, ErrorKind> {
        match self.peek()? {
            Some(b'0'..=b'9') => self.number(true),
            Some(b'i' | b'n') => {
                self.keylike()?;
                if !matches!(&self.lexeme()[1..], b"inf" | b"nan") {
                    return Err(ErrorKind::InvalidNumber);
                }
                match self.peek()? {
                    None | Some(b' ' | b'\t' | b'\n' | b'\r' | b',' | b']' | b'}' | b'#') => {
                        Ok(TokenKind::Float)
                    }
                    _ => Err(ErrorKind::InvalidNumber),
                }
            }
            _ => Err(ErrorKind::InvalidNumber),
        }
    }

    fn number(&mut self, signed: bool) -> Result<TokenKind, ErrorKind> {
        if self.peek()? == Some(b'0') {
            self.bump();
            self.push(b'0')?;
            if let Some(prefix @ (b'x' | b'o' | b'b')) = self.peek()? {
                if signed {
                    return Err(ErrorKind::InvalidNumber);
                }
                self.bump();
                self.push(prefix)?;
                let radix = match prefix {
                    b'x' => 16,
                    b'o' => 8,
                    _ => 2,
                };
                self.radix_digits(radix)?;
                return self.end_number(TokenKind::Integer);
            }
        }

        let mut kind = TokenKind::Integer;
        let mut prev_digit = self.lexeme().last().is_some_and(u8::is_ascii_digit);
        while let Some(b) = self.peek()? {
            match (kind, b) {
                (_, b'0'..=b'9') => prev_digit = true,
                (TokenKind::Integer | TokenKind::Float, b'_') => {
                    self.bump();
                    if !prev_digit || !self.peek()?.is_some_and(|b| b.is_ascii_digit()) {
                        return Err(ErrorKind::InvalidNumber);
                    }
                    continue;
                }
                (TokenKind::Integer, b'.' | b'e' | b'E') => {
                    kind = TokenKind::Float;
                    prev_digit = false;
                }
                (TokenKind::Integer, b'-' | b':') if !signed => {
                    kind = TokenKind::Datetime;
                    prev_digit = false;
                }
                (TokenKind::Float, b'.' | b'e' | b'E' | b'+' | b'-') => prev_digit = false,
                (
                    TokenKind::Datetime,
                    b'+' | b'-' | b'.' | b't' | b'T' | b':' | b' ' | b'Z' | b'z',
                ) => {}
                _ => break,
            }
            self.bump();
            self.push(b)?;
        }

        if kind == TokenKind::Datetime {
            while self.len > 0 && self.lexeme[self.len - 1] == b' ' {
                self.len -= 1;
            }
            if Datetime::parse(self.lexeme()).is_none() {
                return Err(ErrorKind::InvalidDatetime);
            }
        }
        self.end_number(kind)
    }

    fn radix_digits(&mut self, radix: u32) -> Result<(), ErrorKind> {
        let digits_start = self.len;
        while let Some(b) = self.peek()? {
            if char::from(b).is_digit(radix) {
                self.bump();
                self.push(b)?;
            } else if b == b'_' {
                self.bump();
                let next_is_digit = self
                    .peek()?
                    .is_some_and(|n| char::from(n).is_digit(radix));
                if self.len == digits_start || !next_is_digit {
                    return Err(ErrorKind::InvalidNumber);
                }
            } else {
                break;
            }
        }
        if self.len == digits_start {
            return Err(ErrorKind::InvalidNumber);
        }
        Ok(())
    }

    /// A number must not run into an identifier, as in `12ab` or `0o8`.
    fn end_number(&mut self, kind: TokenKind) -> Result<TokenKind, ErrorKind> {
        match self.peek()? {
            Some(b) if is_keylike_byte(b) => Err(if kind == TokenKind::Datetime {
                ErrorKind::InvalidDatetime
            } else {
                ErrorKind::InvalidNumber
            }),
            _ => Ok(kind),
        }
    }

    // -- strings ------------------------------------------------------------

    /// After the opening `"`.
    fn basic_string(&mut self) -> Result<TokenKind, ErrorKind> {
        if self.eat(b'"')? {
            if self.eat(b'"')? {
                return self.multiline_string(b'"');
            }
            return Ok(TokenKind::String);
        }
        loop {
            let at = self.pos;
            match self.peek()? {
                None | Some(b'\n' | b'\r') => return Err(ErrorKind::UnterminatedString),
                Some(b'"') => {
                    self.bump();
                    return Ok(TokenKind::String);
                }
                Some(b'\\') => {
                    self.bump();
                    self.escape(at, false)?;
                }
                Some(b @ (0x00..=0x08 | 0x0a..=0x1f | 0x7f)) => {
                    return Err(self.fail_at(at, ErrorKind::InvalidCharInString(b as char)));
                }
                Some(b) => {
                    self.bump();
                    self.push_str(b);
                }
            }
        }
    }

    /// After the opening `'`.
    fn literal_string(&mut self) -> Result<TokenKind, ErrorKind> {
        if self.eat(b'\'')? {
            if self.eat(b'\'')? {
                return self.multiline_string(b'\'');
            }
            return Ok(TokenKind::String);
        }
        loop {
            let at = self.pos;
            match self.peek()? {
                None | Some(b'\n' | b'\r') => return Err(ErrorKind::UnterminatedString),
                Some(b'\'') => {
                    self.bump();
                    return Ok(TokenKind::String);
                }
                Some(b @ (0x00..=0x08 | 0x0a..=0x1f | 0x7f)) => {
                    return Err(self.fail_at(at, ErrorKind::InvalidCharInString(b as char)));
                }
                Some(b) => {
                    self.bump();
                    self.push_str(b);
                }
            }
        }
    }

    /// After the opening `"""` or `'''`. Escapes are only decoded in basic
    /// strings.
    fn multiline_string(&mut self, delim: u8) -> Result<TokenKind, ErrorKind> {
        match self.peek()? {
            Some(b'\n') => self.bump(),
            Some(b'\r') => {
                self.bump();
                self.eat(b'\n')?;
            }
            _ => {}
        }
        loop {
            let at = self.pos;
            let Some(b) = self.peek()? else {
                return Err(ErrorKind::UnterminatedString);
            };
            match b {
                _ if b == delim => {
                    let mut run = 0;
                    while self.eat(delim)? {
                        run += 1;
                    }
                    match run {
                        0..=2 => {
                            for _ in 0..run {
                                self.push_str(delim);
                            }
                        }
                        // Up to two quotes may sit right before the closing delimiter.
                        3..=5 => {
                            for _ in 3..run {
                                self.push_str(delim);
                            }
                            return Ok(TokenKind::MultilineString);
                        }
                        _ => return Err(self.fail_at(at, ErrorKind::TooManyQuotes)),
                    }
                }
                b'\\' if delim == b'"' => {
                    self.bump();
                    self.escape(at, true)?;
                }
                b'\t' | b'\n' | b'\r' => {
                    self.bump();
                    self.push_str(b);
                }
                0x00..=0x1f | 0x7f => {
                    return Err(self.fail_at(at, ErrorKind::InvalidCharInString(b as char)));
                }
                _ => {
                    self.bump();
                    self.push_str(b);
                }
            }
        }
    }

    /// After a `\` at `at`.
    fn escape(&mut self, at: Pos, multiline: bool) -> Result<(), ErrorKind> {
        let Some(b) = self.peek()? else {
            return Err(ErrorKind::UnterminatedString);
        };
        let decoded = match b {
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'"' => b'"',
            b'\\' => b'\\',
            b'u' | b'U' => {
                self.bump();
                return self.unicode_escape(at, if b == b'u' { 4 } else { 8 });
            }
            // Line continuation: drop all whitespace up to the next
            // non-blank byte.
            b' ' | b'\t' | b'\n' | b'\r' if multiline => {
                while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek()? {
                    self.bump();
                }
                return Ok(());
            }
            0x80.. => return Err(self.fail_at(at, ErrorKind::NonAscii(b))),
            _ => return Err(self.fail_at(at, ErrorKind::InvalidEscape(b as char))),
        };
        self.bump();
        self.push_str(decoded);
        Ok(())
    }

    fn unicode_escape(&mut self, at: Pos, digits: usize) -> Result<(), ErrorKind> {
        let mut value = 0u32;
        for _ in 0..digits {
            let digit_at = self.pos;
            let Some(b) = self.peek()? else {
                return Err(ErrorKind::UnterminatedString);
            };
            let Some(digit) = char::from(b).to_digit(16) else {
                return Err(self.fail_at(digit_at, ErrorKind::InvalidHexEscape(b as char)));
            };
            self.bump();
            value = (value << 4) | digit;
        }
        let Some(ch) = char::from_u32(value) else {
            return Err(self.fail_at(at, ErrorKind::InvalidEscapeValue(value)));
        };
        let mut buf = [0u8; 4];
        for &b in ch.encode_utf8(&mut buf).as_bytes() {
            self.push_str(b);
        }
        Ok(())
    }
}

impl<S> std::fmt::Debug for Scanner<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("offset", &self.pos.offset)
            .field("line", &self.pos.line)
            .field("column", &self.pos.column)
            .finish_non_exhaustive()
    }
}

#[inline]
pub(crate) fn is_keylike_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}
