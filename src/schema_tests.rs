use super::*;

#[derive(Default)]
struct Point {
    x: Cell<i32>,
    y: Cell<i32>,
}

impl Record for Point {
    fn entry(&self, name: &str) -> Option<Target<'_>> {
        match name {
            "x" => Some(Target::from(&self.x)),
            "y" => Some(Target::from(&self.y)),
            _ => None,
        }
    }
}

#[test]
fn targets_report_their_kind() {
    let small = Cell::new(0i8);
    let wide = Cell::new(0u64);
    let ratio = Cell::new(0.0f64);
    let flag = Cell::new(false);
    let name = Cell::new([0u8; 16]);
    let when = Cell::new(Datetime::default());
    let point = Point::default();

    assert_eq!(Target::from(&small).kind(), Kind::I8);
    assert_eq!(Target::from(&wide).kind(), Kind::U64);
    assert_eq!(Target::from(&ratio).kind(), Kind::F64);
    assert_eq!(Target::from(&flag).kind(), Kind::Bool);
    assert_eq!(Target::from(&name).kind(), Kind::Str);
    assert_eq!(Target::from(&when).kind(), Kind::Datetime);
    assert_eq!(Target::Record(&point).kind(), Kind::Table);

    let nested = [Key::new("flag", &flag)];
    assert_eq!(Target::from(&nested).kind(), Kind::Table);
}

#[test]
fn kinds_describe_themselves() {
    assert_eq!(Kind::I32.describe(), "an i32");
    assert_eq!(Kind::U8.describe(), "a u8");
    assert_eq!(Kind::F64.to_string(), "a float");
    assert_eq!(Kind::Table.to_string(), "a table");
    assert_eq!(Kind::Array.to_string(), "an array");
}

#[test]
fn string_buffers_keep_their_full_length() {
    let name = Cell::new([0u8; 16]);
    let Target::Str(buf) = Target::from(&name) else {
        panic!("expected a string target");
    };
    assert_eq!(buf.len(), 16);

    let raw = [const { Cell::new(0u8) }; 4];
    let Target::Str(buf) = Target::from(&raw) else {
        panic!("expected a string target");
    };
    assert_eq!(buf.len(), 4);
}

#[test]
fn array_capacity_follows_storage() {
    let len = Cell::new(0);
    let ints = Cell::new([0i64; 5]);
    let array = Array::new(&ints, &len);
    assert_eq!(array.capacity(), 5);
    assert_eq!(array.items.kind(), Kind::I64);

    let spans = [const { Cell::new(Span::new(0, 0)) }; 3];
    let store = [const { Cell::new(0u8) }; 32];
    let strings = Array::strings(&spans, &store, &len);
    assert_eq!(strings.capacity(), 3);
    assert_eq!(strings.items.kind(), Kind::Str);

    let points: [Point; 2] = Default::default();
    let tables = Array::tables(&points, &len);
    assert_eq!(tables.capacity(), 2);
    assert_eq!(tables.items.kind(), Kind::Table);
}

#[test]
fn records_stop_at_capacity() {
    let points: [Point; 2] = Default::default();
    assert_eq!(points.capacity(), 2);
    assert!(points.record(1).is_some());
    assert!(points.record(2).is_none());

    let Some(Target::I32(y)) = points.record(1).and_then(|p| p.entry("y")) else {
        panic!("expected an i32 entry");
    };
    y.set(9);
    assert_eq!(points[1].y.get(), 9);
    assert!(points[0].entry("z").is_none());
}

#[test]
fn arrays_are_identified_by_their_count() {
    let first = Cell::new(0);
    let second = Cell::new(0);
    let points: [Point; 2] = Default::default();

    let a = Array::tables(&points, &first);
    let b = Array::tables(&points, &first);
    let c = Array::tables(&points, &second);
    assert!(a.same(&b));
    assert!(!a.same(&c));
}

#[test]
fn cells_views_every_element() {
    let store = Cell::new([1u16, 2, 3]);
    let view = cells(&store);
    assert_eq!(view.len(), 3);
    view[2].set(7);
    assert_eq!(store.get(), [1, 2, 7]);
}

#[test]
fn debug_output_is_compact() {
    let len = Cell::new(2);
    let ints = Cell::new([0u8; 4]);
    let array = Array::new(&ints, &len);
    assert_eq!(
        format!("{array:?}"),
        "Array { kind: U8, capacity: 4, len: 2 }"
    );

    let name = Cell::new([0u8; 8]);
    assert_eq!(format!("{:?}", Target::from(&name)), "Str(8 bytes)");
}
