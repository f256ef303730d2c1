//! Codec properties: round trips, escaping, faults, multicall shape, truncation.

#![allow(unused_crate_dependencies)]
#![allow(missing_docs)]

use std::collections::BTreeMap;

use proptest::prelude::*;
use rtorrent_xmlrpc::{
    DateTime, Error, Fault, MethodCall, MethodResponse, Value, decode_call, decode_response,
    encode_call, encode_fault, encode_response,
};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(Value::Int),
        any::<i64>().prop_map(Value::Long),
        any::<bool>().prop_map(Value::Bool),
        "\\PC{0,16}".prop_map(Value::String),
        (-1.0e12f64..1.0e12).prop_map(Value::Double),
        (0u16..=9999, 1u8..=12, 1u8..=28, 0u8..24, 0u8..60, 0u8..60).prop_map(
            |(y, mo, d, h, mi, s)| Value::DateTime(DateTime::new(y, mo, d, h, mi, s).unwrap())
        ),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(Value::Binary),
        Just(Value::Nil),
    ]
}

fn value_tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            proptest::collection::btree_map("[a-z_]{1,8}", inner, 0..6).prop_map(Value::Struct),
        ]
    })
}

proptest! {
    #[test]
    fn response_round_trip(value in value_tree()) {
        let decoded = decode_response(&encode_response(&value)).unwrap();
        prop_assert_eq!(decoded, MethodResponse::Success(value));
    }

    #[test]
    fn call_round_trip(args in proptest::collection::vec(value_tree(), 0..4)) {
        let decoded = decode_call(&encode_call("m", &args)).unwrap();
        prop_assert_eq!(decoded, MethodCall::new("m", args));
    }
}

#[test]
fn escaped_strings_survive() {
    let original = r#"a & b < c > d ' e " f &amp;"#;
    let doc = encode_call("d.custom1.set", &[Value::from("hash"), Value::from(original)]);
    let text = String::from_utf8(doc.clone()).unwrap();
    assert!(!text.contains(original));

    let call = decode_call(&doc).unwrap();
    assert_eq!(call.params[1].as_str(), Ok(original));

    let response = decode_response(&encode_response(&Value::from(original))).unwrap();
    assert_eq!(response, MethodResponse::Success(Value::from(original)));
}

#[test]
fn fault_round_trip() {
    let decoded = decode_response(&encode_fault(500, "Method not found")).unwrap();
    assert_eq!(
        decoded,
        MethodResponse::Fault(Fault {
            code: 500,
            message: "Method not found".into(),
        })
    );
    assert_eq!(
        decoded.into_result(),
        Err(Error::RemoteFault {
            code: 500,
            message: "Method not found".into(),
        })
    );
}

#[test]
fn multicall_rows_keep_their_order() {
    let row = |a: &str, b: i32, c: &str| {
        Value::Array(vec![Value::from(a), Value::Int(b), Value::from(c)])
    };
    let shape = Value::Array(vec![Value::Array(vec![row("a", 1, "c"), row("d", 2, "f")])]);
    let decoded = decode_response(&encode_response(&shape)).unwrap().into_result().unwrap();

    let outer = decoded.as_array().unwrap();
    assert_eq!(outer.len(), 1);
    let rows = outer[0].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], row("a", 1, "c"));
    assert_eq!(rows[1], row("d", 2, "f"));
}

#[test]
fn lenient_integers_only_for_digits() {
    assert_eq!(Value::from("42").as_int(), Ok(42));
    assert!(matches!(Value::from("abc").as_int(), Err(Error::TypeMismatch { .. })));
}

#[test]
fn truncated_struct_is_never_a_success() {
    let mut members = BTreeMap::new();
    members.insert("complete".to_string(), Value::Int(1));
    members.insert("label".to_string(), Value::from("café & co"));
    members.insert("name".to_string(), Value::from("ubuntu.iso"));
    let doc = encode_response(&Value::Struct(members));
    let text = String::from_utf8(doc.clone()).unwrap();

    let struct_start = text.find("<struct>").unwrap();
    let struct_end = text.find("</struct>").unwrap();
    for end in (struct_start + 1)..struct_end {
        let cut = &doc[..end];
        assert_eq!(
            decode_response(cut),
            Err(Error::IncompleteInput),
            "cut at {end}: {}",
            String::from_utf8_lossy(cut)
        );
    }
}
