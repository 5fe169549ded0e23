use super::*;
use crate::schema::{Array, Key};

fn value(kind: TokenKind, text: &str) -> Scalar<'_> {
    Scalar {
        token: Token {
            kind,
            span: Span::new(0, text.len() as u32),
            line: 1,
            column: 1,
        },
        text: text.as_bytes(),
        truncated: false,
    }
}

fn int(text: &str) -> Scalar<'_> {
    value(TokenKind::Integer, text)
}

fn float_value(text: &str) -> Scalar<'_> {
    value(TokenKind::Float, text)
}

fn string_value(text: &str) -> Scalar<'_> {
    value(TokenKind::String, text)
}

fn bytes(cells: &[Cell<u8>]) -> Vec<u8> {
    cells.iter().map(Cell::get).collect()
}

#[test]
fn integers_in_every_radix() {
    let opts = Options::default();
    let x = Cell::new(0i64);
    let cases = [
        ("42", 42),
        ("+17", 17),
        ("-100", -100),
        ("0", 0),
        ("-0", 0),
        ("0xDEADBEEF", 0xDEAD_BEEF),
        ("0xff", 255),
        ("0o755", 0o755),
        ("0b1101", 0b1101),
        ("9223372036854775807", i64::MAX),
        ("-9223372036854775808", i64::MIN),
    ];
    for (text, expected) in cases {
        scalar(&Target::I64(&x), &int(text), &opts).unwrap();
        assert_eq!(x.get(), expected, "input: {text}");
    }

    let u = Cell::new(0u64);
    scalar(&Target::U64(&u), &int("18446744073709551615"), &opts).unwrap();
    assert_eq!(u.get(), u64::MAX);
    scalar(&Target::U64(&u), &int("0xffffffffffffffff"), &opts).unwrap();
    assert_eq!(u.get(), u64::MAX);
}

#[test]
fn integer_format_errors() {
    let opts = Options::default();
    let x = Cell::new(0i32);
    for text in ["012", "+01", "-007", "0x", "1.5"] {
        assert_eq!(
            scalar(&Target::I32(&x), &int(text), &opts),
            Err(ErrorKind::InvalidNumber),
            "input: {text}"
        );
    }
    assert_eq!(
        scalar(
            &Target::I64(&Cell::new(0)),
            &int("999999999999999999999999999999999999999999"),
            &opts
        ),
        Err(ErrorKind::OutOfRange("i64"))
    );
}

#[test]
fn integer_narrowing_policies() {
    let reject = Options::default();
    let wrap = Options::default().with_integers(IntegerPolicy::Wrap);

    let b = Cell::new(0u8);
    scalar(&Target::U8(&b), &int("255"), &reject).unwrap();
    assert_eq!(b.get(), 255);
    assert_eq!(
        scalar(&Target::U8(&b), &int("256"), &reject),
        Err(ErrorKind::OutOfRange("u8"))
    );
    assert_eq!(
        scalar(&Target::U8(&b), &int("-1"), &reject),
        Err(ErrorKind::OutOfRange("u8"))
    );
    assert_eq!(b.get(), 255, "failed binds leave the destination alone");

    scalar(&Target::U8(&b), &int("256"), &wrap).unwrap();
    assert_eq!(b.get(), 0);
    scalar(&Target::U8(&b), &int("-1"), &wrap).unwrap();
    assert_eq!(b.get(), 255);

    let s = Cell::new(0i16);
    assert_eq!(
        scalar(&Target::I16(&s), &int("40000"), &reject),
        Err(ErrorKind::OutOfRange("i16"))
    );
    scalar(&Target::I16(&s), &int("40000"), &wrap).unwrap();
    assert_eq!(s.get(), 40000u16 as i16);

    let w = Cell::new(0i32);
    assert_eq!(
        scalar(&Target::I32(&w), &int("2147483648"), &reject),
        Err(ErrorKind::OutOfRange("i32"))
    );
    let u = Cell::new(0u32);
    scalar(&Target::U32(&u), &int("4294967295"), &reject).unwrap();
    assert_eq!(u.get(), u32::MAX);
    let n = Cell::new(0i8);
    scalar(&Target::I8(&n), &int("-128"), &reject).unwrap();
    assert_eq!(n.get(), i8::MIN);
    let h = Cell::new(0u16);
    scalar(&Target::U16(&h), &int("0xffff"), &reject).unwrap();
    assert_eq!(h.get(), u16::MAX);
}

#[test]
fn floats() {
    let opts = Options::default();
    let f = Cell::new(0.0f64);
    let cases = [
        ("3.25", 3.25),
        ("-0.5", -0.5),
        ("+1.0", 1.0),
        ("1e3", 1000.0),
        ("6.626E-34", 6.626e-34),
        ("5e+22", 5e22),
        ("-2.5e-3", -2.5e-3),
        ("0.0", 0.0),
    ];
    for (text, expected) in cases {
        scalar(&Target::F64(&f), &float_value(text), &opts).unwrap();
        assert_eq!(f.get(), expected, "input: {text}");
    }

    scalar(&Target::F64(&f), &float_value("inf"), &opts).unwrap();
    assert_eq!(f.get(), f64::INFINITY);
    scalar(&Target::F64(&f), &float_value("-inf"), &opts).unwrap();
    assert_eq!(f.get(), f64::NEG_INFINITY);
    scalar(&Target::F64(&f), &float_value("+inf"), &opts).unwrap();
    assert_eq!(f.get(), f64::INFINITY);
    scalar(&Target::F64(&f), &float_value("nan"), &opts).unwrap();
    assert!(f.get().is_nan() && f.get().is_sign_positive());
    scalar(&Target::F64(&f), &float_value("-nan"), &opts).unwrap();
    assert!(f.get().is_nan() && f.get().is_sign_negative());
}

#[test]
fn float_errors() {
    let opts = Options::default();
    let f = Cell::new(0.0f64);
    for text in ["1.", ".5", "01.5", "1e", "1e+", "1.5.5", "1.e5", "1e5e5", "1-2"] {
        assert_eq!(
            scalar(&Target::F64(&f), &float_value(text), &opts),
            Err(ErrorKind::InvalidNumber),
            "input: {text}"
        );
    }
    assert_eq!(
        scalar(&Target::F64(&f), &float_value("1e400"), &opts),
        Err(ErrorKind::OutOfRange("f64"))
    );
    assert_eq!(
        scalar(&Target::F64(&f), &float_value("1e-400"), &opts),
        Err(ErrorKind::OutOfRange("f64"))
    );
    scalar(&Target::F64(&f), &float_value("0e-400"), &opts).unwrap();
    assert_eq!(f.get(), 0.0);
}

#[test]
fn booleans_and_datetimes() {
    let opts = Options::default();
    let b = Cell::new(false);
    scalar(&Target::Bool(&b), &value(TokenKind::Bool, "true"), &opts).unwrap();
    assert!(b.get());
    scalar(&Target::Bool(&b), &value(TokenKind::Bool, "false"), &opts).unwrap();
    assert!(!b.get());

    let d = Cell::new(Datetime::default());
    scalar(
        &Target::Datetime(&d),
        &value(TokenKind::Datetime, "1979-05-27T07:32:00Z"),
        &opts,
    )
    .unwrap();
    assert_eq!(d.get().to_string(), "1979-05-27T07:32:00Z");
    assert_eq!(
        scalar(
            &Target::Datetime(&d),
            &value(TokenKind::Datetime, "1979-13-27"),
            &opts
        ),
        Err(ErrorKind::InvalidDatetime)
    );
}

#[test]
fn kind_mismatches() {
    let opts = Options::default();
    let x = Cell::new(0i32);
    assert_eq!(
        scalar(&Target::I32(&x), &string_value("7"), &opts),
        Err(ErrorKind::Mismatch {
            expected: "an i32",
            found: "a string",
        })
    );
    assert_eq!(
        scalar(&Target::I32(&x), &float_value("7.0"), &opts),
        Err(ErrorKind::Mismatch {
            expected: "an i32",
            found: "a float",
        })
    );
    let b = Cell::new(false);
    assert_eq!(
        scalar(&Target::Bool(&b), &value(TokenKind::BareKey, "yes"), &opts),
        Err(ErrorKind::Mismatch {
            expected: "a boolean",
            found: "an identifier",
        })
    );
    let f = Cell::new(0.0);
    assert_eq!(
        scalar(&Target::F64(&f), &int("1"), &opts),
        Err(ErrorKind::Mismatch {
            expected: "a float",
            found: "an integer",
        })
    );
    let keys: [Key<'_>; 0] = [];
    assert_eq!(
        scalar(&Target::Table(&keys), &int("1"), &opts),
        Err(ErrorKind::Mismatch {
            expected: "a table",
            found: "an integer",
        })
    );
}

#[test]
fn strings_fit_truncate_or_reject() {
    let truncate = Options::default();
    let reject = Options::default().with_strings(StringPolicy::Reject);
    let buf: [Cell<u8>; 6] = Default::default();

    scalar(&Target::Str(&buf), &string_value("hello"), &reject).unwrap();
    assert_eq!(bytes(&buf), b"hello\0");

    scalar(&Target::Str(&buf), &string_value("hi"), &reject).unwrap();
    assert_eq!(bytes(&buf), b"hi\0\0\0\0");

    scalar(&Target::Str(&buf), &string_value("goodbye"), &truncate).unwrap();
    assert_eq!(bytes(&buf), b"goodb\0");

    assert_eq!(
        scalar(&Target::Str(&buf), &string_value("goodbye"), &reject),
        Err(ErrorKind::StringTooLong { capacity: 6 })
    );

    let mut long = string_value("abc");
    long.truncated = true;
    assert_eq!(
        scalar(&Target::Str(&buf), &long, &reject),
        Err(ErrorKind::StringTooLong { capacity: 6 })
    );
    scalar(&Target::Str(&buf), &long, &truncate).unwrap();

    let empty: [Cell<u8>; 0] = [];
    assert_eq!(
        scalar(&Target::Str(&empty), &string_value(""), &truncate),
        Err(ErrorKind::StringTooLong { capacity: 0 })
    );
}

#[test]
fn cut_lexemes_fail_when_the_buffer_has_room() {
    let truncate = Options::default();
    let cut = "a".repeat(LEXEME_CAPACITY);
    let mut long = string_value(&cut);
    long.truncated = true;

    let roomy: Vec<Cell<u8>> = (0..LEXEME_CAPACITY + 2).map(|_| Cell::new(0)).collect();
    assert_eq!(
        scalar(&Target::Str(&roomy[..]), &long, &truncate),
        Err(ErrorKind::LexemeTooLong)
    );

    // The buffer is the limit either way.
    let exact: Vec<Cell<u8>> = (0..LEXEME_CAPACITY + 1).map(|_| Cell::new(0)).collect();
    scalar(&Target::Str(&exact[..]), &long, &truncate).unwrap();
    assert_eq!(&bytes(&exact)[..LEXEME_CAPACITY], cut.as_bytes());
    assert_eq!(exact[LEXEME_CAPACITY].get(), 0);
}

#[test]
fn strings_require_quotes() {
    let opts = Options::default();
    let buf: [Cell<u8>; 8] = Default::default();
    for kind in [
        TokenKind::BareKey,
        TokenKind::Integer,
        TokenKind::Float,
        TokenKind::Bool,
        TokenKind::Datetime,
    ] {
        assert_eq!(
            scalar(&Target::Str(&buf), &value(kind, "7"), &opts),
            Err(ErrorKind::UnquotedString)
        );
    }
    scalar(
        &Target::Str(&buf),
        &value(TokenKind::MultilineString, "a\nb"),
        &opts,
    )
    .unwrap();
    assert_eq!(&bytes(&buf)[..4], b"a\nb\0");
}

#[test]
fn scalar_array_elements() {
    let opts = Options::default();
    let cells: [Cell<i32>; 2] = Default::default();
    let items = Items::from(&cells);
    element(&items, 0, &int("1"), &opts).unwrap();
    element(&items, 1, &int("2"), &opts).unwrap();
    assert_eq!(
        element(&items, 2, &int("3"), &opts),
        Err(ErrorKind::ArrayTooLong { capacity: 2 })
    );
    assert_eq!(cells[0].get(), 1);
    assert_eq!(cells[1].get(), 2);
    assert_eq!(
        element(&items, 1, &string_value("3"), &opts),
        Err(ErrorKind::Mismatch {
            expected: "an i32",
            found: "a string",
        })
    );

    let flags: [Cell<bool>; 3] = Default::default();
    let items = Items::from(&flags);
    element(&items, 2, &value(TokenKind::Bool, "true"), &opts).unwrap();
    assert!(flags[2].get());
}

#[test]
fn string_array_elements_pack_into_store() {
    let opts = Options::default();
    let spans: [Cell<Span>; 3] = Default::default();
    let store: [Cell<u8>; 12] = Default::default();
    let count = Cell::new(0);
    let array = Array::strings(&spans, &store, &count);

    element(&array.items, 0, &string_value("red"), &opts).unwrap();
    element(&array.items, 1, &string_value(""), &opts).unwrap();
    element(&array.items, 2, &string_value("green"), &opts).unwrap();
    assert_eq!(spans[0].get(), Span::new(0, 3));
    assert_eq!(spans[1].get(), Span::new(4, 4));
    assert_eq!(spans[2].get(), Span::new(5, 10));
    assert_eq!(&bytes(&store)[..11], b"red\0\0green\0");
}

#[test]
fn string_array_store_overflow() {
    let opts = Options::default();
    let spans: [Cell<Span>; 4] = Default::default();
    let store: [Cell<u8>; 2] = Default::default();
    let items = Items::Str(StrArray::new(&spans, &store));

    element(&items, 0, &string_value("a"), &opts).unwrap();
    assert_eq!(
        element(&items, 1, &string_value("b"), &opts),
        Err(ErrorKind::StringTooLong { capacity: 2 })
    );

    let store: [Cell<u8>; 4] = Default::default();
    let items = Items::Str(StrArray::new(&spans, &store));
    assert_eq!(
        element(&items, 0, &string_value("four"), &opts),
        Err(ErrorKind::StringTooLong { capacity: 4 })
    );
    assert_eq!(
        element(&items, 0, &int("4"), &opts),
        Err(ErrorKind::UnquotedString)
    );
}

#[test]
fn store_spans_are_u32_offsets() {
    assert_eq!(store_span(5, 10), Some(Span::new(5, 10)));
    let last = u32::MAX as usize;
    assert_eq!(store_span(last, last), Some(Span::new(u32::MAX, u32::MAX)));
    #[cfg(target_pointer_width = "64")]
    {
        assert_eq!(store_span(last, last + 1), None);
        assert_eq!(store_span(last + 1, last + 2), None);
    }
}
