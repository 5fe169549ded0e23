use crate::{
    Span,
    bind::{self, Scalar},
    error::{Error, ErrorKind},
    options::Options,
    scanner::{LEXEME_CAPACITY, Scanner, Token, TokenKind},
    schema::{Array, Items, Key, Record, Target},
    source::{ReadSource, SliceSource, Source},
};
use std::io;

// Returned by every parser method. The error itself is already stored in
// `Parser::error` by the time this is.

#[derive(Copy, Clone)]
struct ParseError;

/// The entries bare keys are currently resolved against.
#[derive(Copy, Clone)]
enum Scope<'a> {
    Keys(&'a [Key<'a>]),
    Record(&'a dyn Record),
}

impl<'a> Scope<'a> {
    fn resolve(self, name: &[u8]) -> Option<Target<'a>> {
        match self {
            Scope::Keys(keys) => keys
                .iter()
                .find(|key| key.name.as_bytes() == name)
                .map(|key| key.target),
            Scope::Record(record) => record.entry(std::str::from_utf8(name).ok()?),
        }
    }

    /// The scope of a table target.
    fn of_table(target: Target<'a>) -> Option<Scope<'a>> {
        match target {
            Target::Table(keys) => Some(Scope::Keys(keys)),
            Target::Record(record) => Some(Scope::Record(record)),
            _ => None,
        }
    }

    /// The scope a dotted key continues into: a table, or the latest element
    /// of an array of tables.
    fn of_segment(target: Target<'a>) -> Option<Scope<'a>> {
        if let Target::Array(Array {
            items: Items::Tables(records),
            len,
        }) = target
        {
            let last = len.get().checked_sub(1)?;
            return records.record(last).map(Scope::Record);
        }
        Scope::of_table(target)
    }
}

/// Most arrays of tables one header path can keep open at once.
const MAX_RUNS: usize = 8;

/// The array-of-tables element a `[[name]]` header opened.
#[derive(Copy, Clone)]
struct Run<'a> {
    array: Array<'a>,
    index: usize,
}

struct Parser<'a, S> {
    scanner: Scanner<S>,
    options: Options,
    root: &'a [Key<'a>],
    scope: Scope<'a>,
    // Open runs, outermost first. Unused slots are `None`.
    runs: [Option<Run<'a>>; MAX_RUNS],
    // Arrays of tables the last key path stepped through, outermost first.
    stepped: [Option<Array<'a>>; MAX_RUNS],
    stepped_len: usize,
    depth: usize,
    error: Option<Error>,
    // Copy of the last resolved key segment, for error messages.
    key: [u8; LEXEME_CAPACITY],
    key_len: usize,
}

impl<'a, S: Source> Parser<'a, S> {
    fn new(source: S, root: &'a [Key<'a>], options: Options) -> Self {
        Parser {
            scanner: Scanner::new(source),
            options,
            root,
            scope: Scope::Keys(root),
            runs: [None; MAX_RUNS],
            stepped: [None; MAX_RUNS],
            stepped_len: 0,
            depth: 0,
            error: None,
            key: [0; LEXEME_CAPACITY],
            key_len: 0,
        }
    }

    // -- error helpers ------------------------------------------------------

    #[cold]
    fn set_error(&mut self, token: &Token, kind: ErrorKind) -> ParseError {
        self.error = Some(Error {
            kind,
            span: token.span,
            line_info: Some((token.line as usize, token.column as usize)),
        });
        ParseError
    }

    #[cold]
    fn wanted(&mut self, token: &Token, expected: &'static str) -> ParseError {
        self.set_error(
            token,
            ErrorKind::Wanted {
                expected,
                found: token.kind.describe(),
            },
        )
    }

    fn take_error(&mut self) -> Error {
        match self.error.take() {
            Some(error) => error,
            None => Error::from((ErrorKind::UnexpectedEof, Span::default())),
        }
    }

    fn key_name(&self) -> String {
        String::from_utf8_lossy(&self.key[..self.key_len]).into_owned()
    }

    // -- token stream -------------------------------------------------------

    fn next_token(&mut self) -> Result<Token, ParseError> {
        match self.scanner.next_token() {
            Ok(token) => Ok(token),
            Err(e) => {
                self.error = Some(e);
                Err(ParseError)
            }
        }
    }

    fn next_key(&mut self) -> Result<Token, ParseError> {
        match self.scanner.next_key() {
            Ok(token) => Ok(token),
            Err(e) => {
                self.error = Some(e);
                Err(ParseError)
            }
        }
    }

    /// Inside arrays and inline tables, values may span lines.
    fn next_token_multiline(&mut self) -> Result<Token, ParseError> {
        loop {
            let token = self.next_token()?;
            if token.kind != TokenKind::Newline {
                return Ok(token);
            }
        }
    }

    fn next_key_multiline(&mut self) -> Result<Token, ParseError> {
        loop {
            let token = self.next_key()?;
            if token.kind != TokenKind::Newline {
                return Ok(token);
            }
        }
    }

    fn enter(&mut self, open: &Token) -> Result<(), ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(self.set_error(open, ErrorKind::TooDeep(self.options.max_depth)));
        }
        self.depth += 1;
        Ok(())
    }

    // -- keys ---------------------------------------------------------------

    /// Resolves one key segment in `scope`.
    fn resolve(&mut self, scope: Scope<'a>, token: &Token) -> Result<Target<'a>, ParseError> {
        match token.kind {
            TokenKind::BareKey | TokenKind::String => {}
            TokenKind::MultilineString => {
                return Err(self.set_error(token, ErrorKind::MultilineStringKey));
            }
            _ => return Err(self.wanted(token, "a key")),
        }
        if self.scanner.is_truncated() {
            return Err(self.set_error(token, ErrorKind::LexemeTooLong));
        }
        let name = self.scanner.lexeme();
        self.key[..name.len()].copy_from_slice(name);
        self.key_len = name.len();
        match scope.resolve(name) {
            Some(target) => {
                log::trace!("key `{}` -> {}", String::from_utf8_lossy(name), target.kind());
                Ok(target)
            }
            None => {
                let key = self.key_name();
                Err(self.set_error(token, ErrorKind::UnknownKey { key }))
            }
        }
    }

    /// Reads a key made of one or more dotted segments, starting at `first`.
    /// Returns the target of the last segment and the token after the key.
    fn key_path(
        &mut self,
        first: Token,
        mut scope: Scope<'a>,
    ) -> Result<(Target<'a>, Token), ParseError> {
        let mut token = first;
        self.stepped_len = 0;
        loop {
            let target = self.resolve(scope, &token)?;
            let next = self.next_token()?;
            if next.kind != TokenKind::Period {
                return Ok((target, next));
            }
            if !self.options.dotted_keys {
                return Err(self.set_error(&next, ErrorKind::DottedKey));
            }
            scope = match Scope::of_segment(target) {
                Some(scope) => scope,
                None => {
                    let key = self.key_name();
                    return Err(self.set_error(&token, ErrorKind::NotATable { key }));
                }
            };
            if let Target::Array(array) = target
                && self.stepped_len < MAX_RUNS
            {
                self.stepped[self.stepped_len] = Some(array);
                self.stepped_len += 1;
            }
            token = self.next_key()?;
        }
    }

    // -- values -------------------------------------------------------------

    fn key_value(&mut self, first: Token, scope: Scope<'a>) -> Result<(), ParseError> {
        let (target, next) = self.key_path(first, scope)?;
        if next.kind != TokenKind::Equals {
            return Err(self.wanted(&next, "an equals"));
        }
        let value = self.next_token()?;
        self.value(target, value)
    }

    fn value(&mut self, target: Target<'a>, token: Token) -> Result<(), ParseError> {
        if token.kind == TokenKind::LeftBrace
            && let Some(scope) = Scope::of_table(target)
        {
            return self.inline_table(scope, &token);
        }
        match (target, token.kind) {
            (Target::Array(array), TokenKind::LeftBracket) => self.array(array, &token),
            (Target::Array(_), TokenKind::DoubleLeftBracket) => {
                Err(self.set_error(&token, ErrorKind::NestedArray))
            }
            _ => self.scalar(&target, token),
        }
    }

    fn scalar(&mut self, target: &Target<'a>, token: Token) -> Result<(), ParseError> {
        let value = Scalar {
            token,
            text: self.scanner.lexeme(),
            truncated: self.scanner.is_truncated(),
        };
        match bind::scalar(target, &value, &self.options) {
            Ok(()) => Ok(()),
            Err(kind) => Err(self.set_error(&token, kind)),
        }
    }

    /// After the `{` of an inline table.
    fn inline_table(&mut self, scope: Scope<'a>, open: &Token) -> Result<(), ParseError> {
        self.enter(open)?;
        let mut token = self.next_key_multiline()?;
        while token.kind != TokenKind::RightBrace {
            self.key_value(token, scope)?;
            let next = self.next_token_multiline()?;
            match next.kind {
                TokenKind::Comma => token = self.next_key_multiline()?,
                TokenKind::RightBrace => break,
                _ => return Err(self.wanted(&next, "a comma")),
            }
        }
        self.depth -= 1;
        Ok(())
    }

    /// After the `[` of an array value.
    fn array(&mut self, array: Array<'a>, open: &Token) -> Result<(), ParseError> {
        self.enter(open)?;
        let mut index = 0;
        let mut token = self.next_token_multiline()?;
        while token.kind != TokenKind::RightBracket {
            self.element(&array, index, token)?;
            index += 1;
            let next = self.next_token_multiline()?;
            match next.kind {
                TokenKind::Comma => token = self.next_token_multiline()?,
                TokenKind::RightBracket => break,
                _ => return Err(self.wanted(&next, "a comma")),
            }
        }
        array.len.set(index);
        self.depth -= 1;
        Ok(())
    }

    fn element(&mut self, array: &Array<'a>, index: usize, token: Token) -> Result<(), ParseError> {
        match (array.items, token.kind) {
            (_, TokenKind::LeftBracket | TokenKind::DoubleLeftBracket) => {
                Err(self.set_error(&token, ErrorKind::NestedArray))
            }
            (Items::Tables(records), TokenKind::LeftBrace) => match records.record(index) {
                Some(record) => self.inline_table(Scope::Record(record), &token),
                None => Err(self.set_error(
                    &token,
                    ErrorKind::ArrayTooLong {
                        capacity: records.capacity(),
                    },
                )),
            },
            (items, _) => {
                let value = Scalar {
                    token,
                    text: self.scanner.lexeme(),
                    truncated: self.scanner.is_truncated(),
                };
                match bind::element(&items, index, &value, &self.options) {
                    Ok(()) => Ok(()),
                    Err(kind) => Err(self.set_error(&token, kind)),
                }
            }
        }
    }

    // -- document -----------------------------------------------------------

    fn document(&mut self) -> Result<(), ParseError> {
        loop {
            let token = self.next_key()?;
            match token.kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Newline => continue,
                TokenKind::LeftBracket => self.table_header(&token)?,
                TokenKind::DoubleLeftBracket => self.array_header(&token)?,
                _ => self.key_value(token, self.scope)?,
            }
            let end = self.next_token()?;
            match end.kind {
                TokenKind::Newline => {}
                TokenKind::Eof => return Ok(()),
                _ => return Err(self.wanted(&end, "a newline")),
            }
        }
    }

    /// Number of open runs, counted from the outermost, that the last header
    /// path stepped through.
    fn runs_stepped_through(&self) -> usize {
        self.runs
            .iter()
            .zip(&self.stepped[..self.stepped_len])
            .take_while(|(run, array)| match (run, array) {
                (Some(run), Some(array)) => run.array.same(array),
                _ => false,
            })
            .count()
    }

    fn end_runs_from(&mut self, level: usize) {
        for run in &mut self.runs[level..] {
            *run = None;
        }
    }

    /// `[a.b]`, resolved from the root. Ends every array-of-tables run whose
    /// current element the header does not name a table inside.
    fn table_header(&mut self, open: &Token) -> Result<(), ParseError> {
        let first = self.next_key()?;
        let (target, close) = self.key_path(first, Scope::Keys(self.root))?;
        let kept = self.runs_stepped_through();
        self.end_runs_from(kept);
        if close.kind != TokenKind::RightBracket {
            return Err(self.wanted(&close, "a right bracket"));
        }
        match Scope::of_table(target) {
            Some(scope) => {
                log::trace!("[{}]", self.key_name());
                self.scope = scope;
                Ok(())
            }
            None => {
                let key = self.key_name();
                Err(self.set_error(open, ErrorKind::NotATable { key }))
            }
        }
    }

    /// `[[a.b]]`: opens the next element when it repeats the previous array
    /// header at this level, the first element otherwise. Runs the path
    /// steps through stay open, deeper ones end.
    fn array_header(&mut self, open: &Token) -> Result<(), ParseError> {
        let first = self.next_key()?;
        let (target, close) = self.key_path(first, Scope::Keys(self.root))?;
        if close.kind != TokenKind::DoubleRightBracket {
            return Err(self.wanted(&close, "a double right bracket"));
        }
        let (array, records) = match target {
            Target::Array(
                array @ Array {
                    items: Items::Tables(records),
                    ..
                },
            ) => (array, records),
            _ => {
                let key = self.key_name();
                return Err(self.set_error(open, ErrorKind::NotAnArrayOfTables { key }));
            }
        };
        let level = self.runs_stepped_through();
        if level == MAX_RUNS {
            return Err(self.set_error(open, ErrorKind::TooDeep(MAX_RUNS)));
        }
        let index = match self.runs[level] {
            Some(run) if run.array.same(&array) => run.index + 1,
            _ => 0,
        };
        let Some(record) = records.record(index) else {
            return Err(self.set_error(
                open,
                ErrorKind::ArrayTooLong {
                    capacity: records.capacity(),
                },
            ));
        };
        log::trace!("[[{}]] element {index}", self.key_name());
        array.len.set(index + 1);
        self.runs[level] = Some(Run { array, index });
        self.end_runs_from(level + 1);
        self.scope = Scope::Record(record);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Top-level parse entry points
// ---------------------------------------------------------------------------

/// Parses `input` into the destinations declared by `schema`, with default
/// [`Options`].
///
/// On error, destinations bound before the failing token keep their new
/// values and nothing after it is written.
pub fn parse(input: &str, schema: &[Key<'_>]) -> Result<(), Error> {
    parse_with(input, schema, &Options::default())
}

/// Like [`parse`], with explicit options.
pub fn parse_with(input: &str, schema: &[Key<'_>], options: &Options) -> Result<(), Error> {
    if input.len() > u32::MAX as usize {
        return Err(Error::from((ErrorKind::FileTooLarge, Span::default())));
    }
    parse_source(SliceSource::from(input), schema, options)
}

/// Parses a document read from `reader`, such as an open file, with default
/// [`Options`].
pub fn parse_reader<R: io::Read>(reader: R, schema: &[Key<'_>]) -> Result<(), Error> {
    parse_source(ReadSource::new(reader), schema, &Options::default())
}

/// Parses a document pulled byte by byte from `source`.
pub fn parse_source<S: Source>(
    source: S,
    schema: &[Key<'_>],
    options: &Options,
) -> Result<(), Error> {
    log::debug!("parsing document against {} root keys", schema.len());
    let mut parser = Parser::new(source, schema, *options);
    match parser.document() {
        Ok(()) => {
            log::debug!("document parsed");
            Ok(())
        }
        Err(ParseError) => {
            let error = parser.take_error();
            log::debug!("parse failed: {error}");
            Err(error)
        }
    }
}

#[cfg(test)]
#[path = "./parser_tests.rs"]
mod tests;
