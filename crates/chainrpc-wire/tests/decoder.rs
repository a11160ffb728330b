//! Integration tests for the wire decoder.
//!
//! These exercise the decoder the way an RPC client does: a small
//! polymorphic `Result` interface with a few registered concrete types,
//! and structs declared through `wire_struct!`.

use std::any::Any;

use chainrpc_wire::{
    ByteArray, Bytes, DecodeError, InterfaceDef, Poly, Registry, WireDecode, WireStruct, decode,
    decode_into, encode, wire_struct,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

trait NodeResult: Any + Send + Sync + std::fmt::Debug {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync + std::fmt::Debug> NodeResult for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl chainrpc_wire::Interface for Box<dyn NodeResult> {
    fn as_any(&self) -> &dyn Any {
        NodeResult::as_any(&**self)
    }
}

fn boxed<C: NodeResult>(concrete: C) -> Box<dyn NodeResult> {
    Box::new(concrete)
}

wire_struct! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct ResultStatus {
        pub moniker: String => "moniker",
        pub latest_block_hash: ByteArray<4> => "latest_block_hash",
        pub latest_block_height: u64 => "latest_block_height",
        pub latest_block_time: DateTime<Utc> => "latest_block_time",
    }
}

wire_struct! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct ResultBlockchainInfo {
        pub last_height: u64 => "last_height",
        pub heights: Vec<u64> => "heights",
    }
}

wire_struct! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Height {
        pub value: u64 => unwrap,
    }
}

wire_struct! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct HeightObject {
        pub value: u64 => "value",
    }
}

wire_struct! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct PeerStats {
        pub peer: String => "peer",
        pub score: f64 => "score" [unsafe],
        pub ratio: f64 => "ratio",
        pub data: Option<Bytes> => "data",
    }
}

wire_struct! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Ratio {
        pub value: f64 => unwrap [unsafe],
    }
}

wire_struct! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct PlainRatio {
        pub value: f64 => unwrap,
    }
}

wire_struct! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct BlockId {
        pub hash: [u8; 32] => "hash",
        pub parts_hash: Vec<u8> => "parts_hash",
        pub votes: Vec<u16> => "votes",
    }
}

wire_struct! {
    #[derive(Debug, Default)]
    pub struct Holder {
        pub inner: Poly<Box<dyn NodeResult>> => "inner",
        pub note: String => "note",
    }
}

fn registry() -> Registry {
    Registry::builder()
        .register(
            InterfaceDef::<Box<dyn NodeResult>>::new()
                .variant(0x10, boxed::<ResultStatus>)
                .variant(0x11, boxed::<ResultBlockchainInfo>)
                .variant(0x12, boxed::<Height>),
        )
        .expect("registration should succeed")
        .build()
}

fn status_json() -> serde_json::Value {
    json!({
        "moniker": "node-0",
        "latest_block_hash": "deadbeef",
        "latest_block_height": 1200,
        "latest_block_time": "2017-03-04T05:06:07.089Z",
    })
}

// ---------------------------------------------------------------------------
// Interfaces
// ---------------------------------------------------------------------------

#[test]
fn test_interface_decode_matches_direct_concrete_decode() {
    let registry = registry();

    let direct: ResultStatus = decode(&status_json(), &registry).expect("direct decode");
    let poly: Poly<Box<dyn NodeResult>> =
        decode(&json!([0x10, status_json()]), &registry).expect("interface decode");

    let via_interface = poly
        .downcast_ref::<ResultStatus>()
        .expect("concrete type should be ResultStatus");
    assert_eq!(via_interface, &direct);
    assert_eq!(direct.latest_block_hash.0, [0xde, 0xad, 0xbe, 0xef]);
}

#[test]
fn test_unregistered_tag_is_unknown_variant() {
    let err = decode::<Poly<Box<dyn NodeResult>>>(&json!([99, {}]), &registry()).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownVariant { tag: 99, .. }));
}

#[test]
fn test_tag_outside_byte_range_is_rejected() {
    // Tags 0x00 and 0xff are the ones a saturating conversion would hit.
    let registry = Registry::builder()
        .register(
            InterfaceDef::<Box<dyn NodeResult>>::new()
                .variant(0x00, boxed::<Height>)
                .variant(0xff, boxed::<Height>),
        )
        .expect("registration should succeed")
        .build();

    for tag in [json!(-1), json!(256), json!(-0.5e3), json!(1e10)] {
        let err = decode::<Poly<Box<dyn NodeResult>>>(&json!([tag, 7]), &registry)
            .expect_err("out-of-range tag should fail");
        assert!(
            matches!(err, DecodeError::OutOfRange { target: "tag byte", .. }),
            "tag {tag}: {err:?}"
        );
    }

    let low: Poly<Box<dyn NodeResult>> = decode(&json!([0, 7]), &registry).expect("tag 0");
    assert_eq!(low.downcast_ref::<Height>(), Some(&Height { value: 7 }));
    let high: Poly<Box<dyn NodeResult>> = decode(&json!([255, 8]), &registry).expect("tag 255");
    assert_eq!(high.downcast_ref::<Height>(), Some(&Height { value: 8 }));
}

#[test]
fn test_null_interface_is_empty() {
    let poly: Poly<Box<dyn NodeResult>> = decode(&json!(null), &registry()).unwrap();
    assert!(poly.is_empty());
}

#[test]
fn test_unregistered_interface_is_rejected() {
    #[derive(Debug)]
    struct Other;
    impl chainrpc_wire::Interface for Other {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    let err = decode::<Poly<Other>>(&json!([1, {}]), &registry()).unwrap_err();
    assert!(matches!(err, DecodeError::UnregisteredInterface { .. }));
}

#[test]
fn test_interface_payload_must_be_a_pair() {
    let err = decode::<Poly<Box<dyn NodeResult>>>(&json!([0x10]), &registry()).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::LengthMismatch {
            expected: 2,
            found: 1
        }
    ));
}

#[test]
fn test_interface_inside_struct_keeps_field_path() {
    let raw = json!({
        "note": "n",
        "inner": [0x11, {"last_height": 3, "heights": [1, -2]}],
    });
    let err = decode::<Holder>(&raw, &registry()).unwrap_err();
    assert_eq!(err.path(), Some("inner.heights[1]"));
    assert!(matches!(
        err.innermost(),
        DecodeError::NegativeForUnsigned { .. }
    ));
}

#[test]
fn test_interface_encode_decode_preserves_concrete_type() {
    let registry = registry();
    let info = ResultBlockchainInfo {
        last_height: 7,
        heights: vec![5, 6, 7],
    };

    let encoded = encode(&Poly::new(boxed(info.clone())), &registry).expect("encode");
    assert_eq!(encoded[0], json!(0x11));

    let decoded: Poly<Box<dyn NodeResult>> = decode(&encoded, &registry).expect("decode");
    assert_eq!(decoded.downcast_ref::<ResultBlockchainInfo>(), Some(&info));
}

// ---------------------------------------------------------------------------
// Byte arrays
// ---------------------------------------------------------------------------

#[test]
fn test_byte_array_exact_length() {
    let registry = registry();

    let ok: ByteArray<4> = decode(&json!("deadbeef"), &registry).unwrap();
    assert_eq!(ok.0, [0xde, 0xad, 0xbe, 0xef]);

    let err = decode::<ByteArray<4>>(&json!("dead"), &registry).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::LengthMismatch {
            expected: 4,
            found: 2
        }
    ));
}

#[test]
fn test_byte_array_survives_encode_decode() {
    let registry = registry();
    let key = ByteArray::<32>::from([0x5a; 32]);
    let encoded = encode(&key, &registry).unwrap();
    let decoded: ByteArray<32> = decode(&encoded, &registry).unwrap();
    assert_eq!(decoded, key);
}

#[test]
fn test_native_byte_fields_read_hex() {
    let hash = "AB".repeat(32);
    let raw = json!({"hash": hash.clone(), "parts_hash": "0x0102", "votes": [3, 4]});
    let block: BlockId = decode(&raw, &registry()).expect("should decode block id");
    assert_eq!(block.hash, [0xab; 32]);
    assert_eq!(block.parts_hash, vec![0x01, 0x02]);
    assert_eq!(block.votes, vec![3, 4]);

    let err = decode::<BlockId>(&json!({"hash": "abcd"}), &registry()).unwrap_err();
    assert_eq!(err.path(), Some("hash"));
    assert!(matches!(
        err.innermost(),
        DecodeError::LengthMismatch {
            expected: 32,
            found: 2
        }
    ));

    let back = encode(&block, &registry()).expect("should encode block id");
    assert_eq!(back["hash"], json!(hash));
    assert_eq!(back["parts_hash"], json!("0102"));
    assert_eq!(back["votes"], json!([3, 4]));
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

#[test]
fn test_absent_field_keeps_sentinel() {
    let mut status = ResultStatus {
        moniker: "sentinel".to_owned(),
        ..ResultStatus::default()
    };
    decode_into(&mut status, &json!({"latest_block_height": 5}), &registry()).unwrap();

    assert_eq!(status.moniker, "sentinel");
    assert_eq!(status.latest_block_height, 5);
}

#[test]
fn test_unknown_keys_are_ignored() {
    let info: ResultBlockchainInfo = decode(
        &json!({"last_height": 2, "heights": [], "extra": true}),
        &registry(),
    )
    .unwrap();
    assert_eq!(info.last_height, 2);
}

#[test]
fn test_struct_needs_object() {
    let err = decode::<ResultBlockchainInfo>(&json!([1, 2]), &registry()).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::TypeMismatch {
            expected: "object",
            found: "array"
        }
    ));
}

#[test]
fn test_unwrap_struct_equals_object_form() {
    let registry = registry();
    let unwrapped: Height = decode(&json!(42), &registry).unwrap();
    let object: HeightObject = decode(&json!({"value": 42}), &registry).unwrap();
    assert_eq!(unwrapped.value, object.value);

    assert!(Height::is_unwrap());
    assert!(!HeightObject::is_unwrap());
    assert_eq!(encode(&unwrapped, &registry).unwrap(), json!(42));
}

#[test]
fn test_unwrap_struct_takes_unsafe_option() {
    let ratio: Ratio = decode(&json!(1.5), &registry()).expect("unsafe unwrap float");
    assert_eq!(ratio.value, 1.5);
    assert_eq!(encode(&ratio, &registry()).expect("should encode"), json!(1.5));
    assert!(Ratio::FIELDS[0].options.unwrap);
    assert!(Ratio::FIELDS[0].options.unsafe_float);

    let err = decode::<PlainRatio>(&json!(1.5), &registry()).unwrap_err();
    assert!(matches!(err, DecodeError::UnsafeFloatDisabled));
}

#[test]
fn test_field_layout_is_described() {
    let (index, field) = ResultStatus::field("latest_block_time").expect("field exists");
    assert_eq!(index, 3);
    assert_eq!(field.name, "latest_block_time");
    assert!(field.type_name.starts_with("DateTime"));
    assert!(PeerStats::field("score").unwrap().1.options.unsafe_float);
    assert!(!PeerStats::field("ratio").unwrap().1.options.unsafe_float);
}

#[test]
fn test_float_fields_need_unsafe_option() {
    let registry = registry();
    let stats: PeerStats = decode(&json!({"peer": "a", "score": 0.75}), &registry).unwrap();
    assert_eq!(stats.score, 0.75);

    let err = decode::<PeerStats>(&json!({"ratio": 0.5}), &registry).unwrap_err();
    assert_eq!(err.path(), Some("ratio"));
    assert!(matches!(err.innermost(), DecodeError::UnsafeFloatDisabled));
}

#[test]
fn test_optional_bytes_field() {
    let registry = registry();
    let stats: PeerStats = decode(&json!({"data": "0A0B"}), &registry).unwrap();
    assert_eq!(stats.data.as_deref().map(|b| b.as_slice()), Some(&[0x0a, 0x0b][..]));

    let stats: PeerStats = decode(&json!({"data": null}), &registry).unwrap();
    assert!(stats.data.is_none());
}

#[test]
fn test_timestamp_field_and_encoding() {
    let registry = registry();
    let status: ResultStatus = decode(&status_json(), &registry).unwrap();
    let expected = Utc
        .with_ymd_and_hms(2017, 3, 4, 5, 6, 7)
        .unwrap()
        .checked_add_signed(chrono::TimeDelta::milliseconds(89))
        .unwrap();
    assert_eq!(status.latest_block_time, expected);

    let encoded = encode(&status, &registry).unwrap();
    assert_eq!(
        encoded["latest_block_time"],
        json!("2017-03-04T05:06:07.089Z")
    );
    assert_eq!(encoded["latest_block_hash"], json!("DEADBEEF"));
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

#[test]
fn test_u32_boundaries() {
    let registry = registry();

    let err = decode::<u32>(&json!(-1), &registry).unwrap_err();
    assert!(matches!(err, DecodeError::NegativeForUnsigned { .. }));

    let raw: serde_json::Value = serde_json::from_str("4294967295.0").unwrap();
    assert_eq!(decode::<u32>(&raw, &registry).unwrap(), u32::MAX);

    let raw: serde_json::Value = serde_json::from_str("4294967296").unwrap();
    assert!(matches!(
        decode::<u32>(&raw, &registry),
        Err(DecodeError::OutOfRange { target: "u32", .. })
    ));
}

#[test]
fn test_decode_into_reuses_existing_target() {
    let registry = registry();
    let mut height = Height { value: 1 };
    height
        .decode_into(&json!(2), &chainrpc_wire::WireContext::new(&registry))
        .unwrap();
    assert_eq!(height.value, 2);
}
