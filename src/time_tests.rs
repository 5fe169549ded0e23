use super::*;

#[track_caller]
fn roundtrip(input: &str) {
    let value = Datetime::parse(input.as_bytes())
        .unwrap_or_else(|| panic!("failed to decode {input:?}"));
    assert_eq!(value.to_string(), input, "roundtrip mismatch for {input:?}");
}

#[track_caller]
fn roundtrip_lossy(input: &str, expected: &str) {
    let value = Datetime::parse(input.as_bytes())
        .unwrap_or_else(|| panic!("failed to decode {input:?}"));
    assert_eq!(value.to_string(), expected, "roundtrip mismatch for {input:?}");
}

#[track_caller]
fn expect_err(input: &str) {
    assert!(Datetime::parse(input.as_bytes()).is_none(), "for {input:?}");
}

#[test]
fn exact_roundtrips() {
    for input in [
        "1979-05-27T07:32:00Z",
        "1979-05-27T00:32:00-23:00",
        "2000-12-17T00:32:00.5-07:00",
        "1979-05-27T00:32:00.999999+21:20",
        "1979-05-27T07:32:00",
        "1979-05-27T07:32:00.123456789",
        "1979-05-27",
        "0000-01-01",
        "07:32:00",
        "00:32:00.5",
    ] {
        roundtrip(input);
    }
}

#[test]
fn lossy_roundtrips() {
    roundtrip_lossy("1979-05-27 07:32:00Z", "1979-05-27T07:32:00Z");
    roundtrip_lossy("1979-05-27T07:32Z", "1979-05-27T07:32:00Z");
    roundtrip_lossy("23:59", "23:59:00");
    roundtrip_lossy("1987-07-05t17:45:00z", "1987-07-05T17:45:00Z");
    roundtrip_lossy("2024-02-29 12:00+00:00", "2024-02-29T12:00:00Z");
}

#[test]
fn field_ranges() {
    expect_err("2023-13-01");
    expect_err("2023-00-01");
    expect_err("2023-01-32");
    expect_err("2023-01-00");
    expect_err("24:00:00");
    expect_err("12:60:00");
    expect_err("12:00:61");
    expect_err("2023-01-01T00:00:00+24:00");
    // No calendar check: every month has 31 days.
    roundtrip("2023-02-31");
    roundtrip("12:00:60");
}

#[test]
fn malformed_lexemes() {
    expect_err("");
    expect_err("12");
    expect_err("1979");
    expect_err("79-05-27");
    expect_err("1979-5-27");
    expect_err("1979-05-27T");
    expect_err("12:30:");
    expect_err("12:30:00.");
    expect_err("12:30:00Z");
    expect_err("1979-05-27x");
    expect_err("1979-05-27T07:32:00+05");
}

#[test]
fn accessors() {
    let value = Datetime::parse(b"1979-05-27T07:32:09.25-07:30").unwrap();
    assert_eq!(
        value.date(),
        Some(Date {
            year: 1979,
            month: 5,
            day: 27
        })
    );
    let time = value.time().unwrap();
    assert_eq!(time.hour, 7);
    assert_eq!(time.minute, 32);
    assert_eq!(time.second, 9);
    assert_eq!(time.nanosecond, 250_000_000);
    assert_eq!(time.subsecond_precision(), 2);
    assert!(time.has_seconds());
    assert_eq!(value.offset(), Some(TimeOffset::Custom { minutes: -450 }));

    let date_only = Datetime::parse(b"2024-01-02").unwrap();
    assert!(date_only.time().is_none());
    assert!(date_only.offset().is_none());

    let time_only = Datetime::parse(b"10:15").unwrap();
    assert!(time_only.date().is_none());
    assert!(!time_only.time().unwrap().has_seconds());

    let zulu = Datetime::parse(b"2024-01-02T03:04:05Z").unwrap();
    assert_eq!(zulu.offset(), Some(TimeOffset::Z));
}

#[test]
fn default_is_empty() {
    let value = Datetime::default();
    assert!(value.date().is_none());
    assert!(value.time().is_none());
    assert!(value.offset().is_none());
    assert_eq!(value.to_string(), "");
}

#[test]
fn munch_reports_consumed_prefix() {
    let (len, value) = Datetime::munch(b"1979-05-27 # comment").unwrap();
    assert_eq!(len, 10);
    assert_eq!(value.to_string(), "1979-05-27");
}
