use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use proptest::prelude::*;

use super::*;
use crate::record;

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Person {
        pub age: i64,
        pub name: String,
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Contact {
        pub first_name: String => "first name",
        pub last_name: String => "last name",
        pub age: u8,
        pub spouse: Option<Box<Contact>> => "spouse,omitempty",
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Announce {
        pub url: String,
        pub interval: i64 => "interval,omitempty",
        pub peers: Option<Vec<String>> => "peers,omitempty",
        pub scratch: String => "-",
        cache: u32,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timestamp(SystemTime);

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp(UNIX_EPOCH)
    }
}

impl Timestamp {
    fn from_secs(secs: u64) -> Self {
        Timestamp(UNIX_EPOCH + Duration::from_secs(secs))
    }
}

impl MarshalBencode for Timestamp {
    fn marshal_bencode(&self) -> Result<Vec<u8>, BencodeError> {
        let secs = self
            .0
            .duration_since(UNIX_EPOCH)
            .map_err(BencodeError::custom)?;
        marshal(&secs.as_secs())
    }
}

impl UnmarshalBencode for Timestamp {
    fn unmarshal_bencode(&mut self, data: &[u8]) -> Result<usize, BencodeError> {
        let mut secs = 0u64;
        let n = unmarshal(data, &mut secs)?;
        self.0 = UNIX_EPOCH + Duration::from_secs(secs);
        Ok(n)
    }
}

impl Encode for Timestamp {
    fn shape(&self) -> Shape<'_> {
        Shape::Unsupported("Timestamp")
    }

    fn encode_hook(&self) -> Option<&dyn MarshalBencode> {
        Some(self)
    }

    fn is_zero(&self) -> bool {
        self.0 == UNIX_EPOCH
    }
}

impl Decode for Timestamp {
    fn target(&mut self) -> Target<'_> {
        Target::Unsupported("Timestamp")
    }

    fn decode_hook(&mut self) -> Option<&mut dyn UnmarshalBencode> {
        Some(self)
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Bundle {
        pub people: Vec<Contact>,
        pub thing: Vec<u8> => "thing",
        pub double_slice: Vec<Vec<i32>> => "double slice",
        pub len: u32 => "len,omitempty",
        pub created: Timestamp => "created,omitempty",
        pub history: Vec<Timestamp>,
        pub digests: [[u8; 4]; 2],
        pub tags: BTreeMap<String, Vec<String>>,
    }
}

fn sample_bundle() -> Bundle {
    let thing = b"Some bytes".to_vec();
    Bundle {
        people: vec![
            Contact {
                first_name: "John".into(),
                last_name: "Doe".into(),
                age: 32,
                spouse: Some(Box::new(Contact {
                    first_name: "Jane".into(),
                    last_name: "Doe".into(),
                    age: 31,
                    spouse: None,
                })),
            },
            Contact::default(),
        ],
        len: thing.len() as u32,
        thing,
        double_slice: vec![vec![1, 2], vec![], vec![3]],
        created: Timestamp::from_secs(1_700_000_000),
        history: vec![Timestamp::from_secs(1), Timestamp::from_secs(2)],
        digests: [*b"abcd", *b"efgh"],
        tags: BTreeMap::from([("lang".to_string(), vec!["en".to_string(), "fr".to_string()])]),
    }
}

#[test]
fn test_decode_integer() {
    assert_eq!(decode(b"i42e").unwrap(), Value::Integer(42));
    assert_eq!(decode(b"i-42e").unwrap(), Value::Integer(-42));
    assert_eq!(decode(b"i0e").unwrap(), Value::Integer(0));
    assert_eq!(decode(b"i-5e").unwrap(), Value::Integer(-5));
}

#[test]
fn test_decode_integer_invalid() {
    assert!(decode(b"i-0e").is_err());
    assert!(decode(b"i03e").is_err());
    assert!(decode(b"ie").is_err());
}

#[test]
fn test_decode_bytes() {
    assert_eq!(
        decode(b"4:spam").unwrap(),
        Value::Bytes(Bytes::from_static(b"spam"))
    );
    assert_eq!(decode(b"0:").unwrap(), Value::Bytes(Bytes::new()));
}

#[test]
fn test_decode_list() {
    let result = decode(b"l4:spami42ee").unwrap();
    let list = result.as_list().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0], Value::string("spam"));
    assert_eq!(list[1], Value::Integer(42));
}

#[test]
fn test_decode_empty_containers() {
    assert_eq!(decode(b"le").unwrap(), Value::List(vec![]));
    assert_eq!(decode(b"de").unwrap(), Value::Dict(BTreeMap::new()));

    let mut map: HashMap<String, Value> = HashMap::new();
    assert_eq!(unmarshal(b"de", &mut map).unwrap(), 2);
    assert!(map.is_empty());
}

#[test]
fn test_decode_dict() {
    let result = decode(b"d3:cow3:moo4:spam4:eggse").unwrap();
    let dict = result.as_dict().unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(result.get(b"cow"), Some(&Value::string("moo")));
}

#[test]
fn test_decode_into_generic_map() {
    let mut map: HashMap<String, Value> = HashMap::new();
    unmarshal(
        b"d3:keyi10e5:value9:something5:thingli11ei12ei13eee",
        &mut map,
    )
    .unwrap();

    assert_eq!(map["key"], Value::Integer(10));
    assert_eq!(map["value"].as_str(), Some("something"));
    assert_eq!(map["thing"].as_list().map(|items| items.len()), Some(3));
}

#[test]
fn test_encode_scalars() {
    assert_eq!(marshal(&42i64).unwrap(), b"i42e");
    assert_eq!(marshal(&-42i32).unwrap(), b"i-42e");
    assert_eq!(marshal(&0u8).unwrap(), b"i0e");
    assert_eq!(marshal(&true).unwrap(), b"i1e");
    assert_eq!(marshal("spam").unwrap(), b"4:spam");
    assert_eq!(marshal(&String::new()).unwrap(), b"0:");
}

#[test]
fn test_encode_byte_sequences_as_strings() {
    assert_eq!(marshal(&vec![0x53u8, 0x6f, 0x6d, 0x65]).unwrap(), b"4:Some");
    assert_eq!(marshal(b"Some").unwrap(), b"4:Some");
    assert_eq!(marshal(&Bytes::from_static(b"Some")).unwrap(), b"4:Some");
    assert_eq!(marshal(&vec![83u16, 111]).unwrap(), b"li83ei111ee");
}

#[test]
fn test_encode_heterogeneous_list() {
    let list = Value::List(vec![Value::Integer(1), Value::string("two")]);
    assert_eq!(encode(&list).unwrap(), b"li1e3:twoe");
}

#[test]
fn test_encode_sorts_keys() {
    let mut map = HashMap::new();
    map.insert("b".to_string(), 2);
    map.insert("hello".to_string(), 3);
    map.insert("a".to_string(), 1);
    assert_eq!(marshal(&map).unwrap(), b"d1:ai1e1:bi2e5:helloi3ee");

    let mut dict = BTreeMap::new();
    dict.insert(Bytes::from_static(b"b"), Value::Integer(2));
    dict.insert(Bytes::from_static(b"a"), Value::Integer(1));
    assert_eq!(encode(&Value::Dict(dict)).unwrap(), b"d1:ai1e1:bi2ee");
}

#[test]
fn test_record_scenario() {
    let mut person = Person::default();
    let consumed = unmarshal(b"d3:agei10e4:name4:Johne", &mut person).unwrap();

    assert_eq!(consumed, 23);
    assert_eq!(
        person,
        Person {
            age: 10,
            name: "John".into()
        }
    );
    assert_eq!(marshal(&person).unwrap(), b"d3:agei10e4:name4:Johne");
}

#[test]
fn test_record_wire_names() {
    let contact = Contact {
        first_name: "John".into(),
        last_name: "Doe".into(),
        age: 32,
        spouse: None,
    };
    assert_eq!(
        marshal(&contact).unwrap(),
        b"d3:agei32e10:first name4:John9:last name3:Doee"
    );
}

#[test]
fn test_record_omission() {
    let mut announce = Announce {
        url: "u".into(),
        scratch: "kept in memory".into(),
        cache: 7,
        ..Default::default()
    };
    assert_eq!(marshal(&announce).unwrap(), b"d3:url1:ue");

    announce.interval = 1800;
    announce.peers = Some(vec![]);
    assert_eq!(
        marshal(&announce).unwrap(),
        b"d8:intervali1800e5:peersle3:url1:ue"
    );
}

#[test]
fn test_record_ignores_unknown_and_hidden_keys() {
    let mut announce = Announce::default();
    unmarshal(
        b"d5:cachei9e5:extrali1ei2ee7:scratch1:x3:url1:ue",
        &mut announce,
    )
    .unwrap();

    assert_eq!(announce.url, "u");
    assert_eq!(announce.cache, 0);
    assert!(announce.scratch.is_empty());
}

#[test]
fn test_record_roundtrip() {
    let bundle = sample_bundle();
    let encoded = marshal(&bundle).unwrap();

    let mut decoded = Bundle::default();
    let consumed = unmarshal(&encoded, &mut decoded).unwrap();

    assert_eq!(consumed, encoded.len());
    assert_eq!(decoded, bundle);
    assert_eq!(marshal(&decoded).unwrap(), encoded);
}

#[test]
fn test_record_generic_roundtrip() {
    let encoded = marshal(&sample_bundle()).unwrap();

    let mut generic: BTreeMap<String, Value> = BTreeMap::new();
    unmarshal(&encoded, &mut generic).unwrap();
    assert_eq!(marshal(&generic).unwrap(), encoded);

    let value = decode(&encoded).unwrap();
    assert_eq!(encode(&value).unwrap(), encoded);
}

#[test]
fn test_hook_encodes_as_integer() {
    let bundle = Bundle {
        created: Timestamp::from_secs(1_700_000_000),
        ..Default::default()
    };
    let encoded = marshal(&bundle).unwrap();
    let text = String::from_utf8(encoded).unwrap();
    assert!(text.contains("7:createdi1700000000e"));
    assert!(text.contains("7:historyle6:people"));

    assert_eq!(marshal(&Timestamp::from_secs(5)).unwrap(), b"i5e");
    let mut ts = Timestamp::default();
    assert_eq!(unmarshal(b"i5eextra", &mut ts).unwrap(), 3);
    assert_eq!(ts, Timestamp::from_secs(5));
}

#[test]
fn test_hook_errors_are_shifted() {
    let mut bundle = Bundle::default();
    let err = unmarshal(b"d7:createdi1x2ee", &mut bundle).unwrap_err();
    assert!(matches!(err, BencodeError::MalformedInteger { .. }));
    assert_eq!(err.offset(), Some(11));
}

#[test]
fn test_optional_values() {
    let none: Option<i64> = None;
    assert_eq!(marshal(&none).unwrap(), b"");
    assert_eq!(marshal(&Some(3i64)).unwrap(), b"i3e");

    let mut map: BTreeMap<String, Option<i64>> = BTreeMap::new();
    map.insert("a".into(), None);
    map.insert("b".into(), Some(1));
    assert_eq!(marshal(&map).unwrap(), b"d1:bi1ee");

    let mut dest: Option<Person> = None;
    unmarshal(b"d4:name3:Bobe", &mut dest).unwrap();
    assert_eq!(dest.map(|p| p.name), Some("Bob".to_string()));
}

#[test]
fn test_unsupported_types() {
    assert!(matches!(
        marshal(&1.5f64),
        Err(BencodeError::UnsupportedType("f64"))
    ));
    assert!(matches!(
        marshal(&vec![0.5f64]),
        Err(BencodeError::UnsupportedType(_))
    ));

    let mut bad_values = BTreeMap::new();
    bad_values.insert("ratio", 0.5f64);
    assert!(marshal(&bad_values).is_err());

    let mut bad_keys = HashMap::new();
    bad_keys.insert(0i32, 0i32);
    assert!(matches!(
        marshal(&bad_keys),
        Err(BencodeError::UnsupportedKeyType(_))
    ));

    assert!(matches!(
        marshal(&u64::MAX),
        Err(BencodeError::UnsupportedType(_))
    ));
}

#[test]
fn test_not_a_reference() {
    let shared = Rc::new(0i64);
    let mut dest = Rc::clone(&shared);
    assert!(matches!(
        unmarshal(b"i1e", &mut dest),
        Err(BencodeError::NotAReference(_))
    ));

    drop(shared);
    unmarshal(b"i7e", &mut dest).unwrap();
    assert_eq!(*dest, 7);
}

#[test]
fn test_structural_errors() {
    let mut value = Value::default();
    assert!(matches!(
        unmarshal(b"", &mut value),
        Err(BencodeError::TruncatedBuffer { offset: 0 })
    ));
    assert!(matches!(
        unmarshal(b"li1e", &mut value),
        Err(BencodeError::UnterminatedContainer { offset: 0 })
    ));
    assert!(matches!(
        unmarshal(b"d e", &mut value),
        Err(BencodeError::UnexpectedChar { offset: 1, .. })
    ));
    assert!(matches!(
        unmarshal(b"x", &mut value),
        Err(BencodeError::UnexpectedChar { offset: 0, .. })
    ));
    assert!(matches!(
        unmarshal(b"5:spam", &mut value),
        Err(BencodeError::TruncatedBuffer { .. })
    ));

    let mut person = Person::default();
    assert!(matches!(
        unmarshal(b"d3:agei1e", &mut person),
        Err(BencodeError::UnterminatedContainer { offset: 0 })
    ));
}

#[test]
fn test_error_offsets() {
    let mut person = Person::default();

    let err = unmarshal(b"d3:agei1x0e4:name4:Johne", &mut person).unwrap_err();
    assert!(matches!(err, BencodeError::MalformedInteger { .. }));
    assert_eq!(err.offset(), Some(7));

    let err = unmarshal(b"d3:agel4:spame4:name4:Johne", &mut person).unwrap_err();
    assert!(matches!(
        err,
        BencodeError::TypeMismatch {
            offset: 6,
            found: "list",
            ..
        }
    ));
}

#[test]
fn test_array_overflow() {
    let mut digests = [0u32; 2];
    assert!(matches!(
        unmarshal(b"li1ei2ei3ee", &mut digests),
        Err(BencodeError::ArrayOverflow {
            capacity: 2,
            found: 3,
            ..
        })
    ));

    let mut hash = [0u8; 4];
    unmarshal(b"4:abcd", &mut hash).unwrap();
    assert_eq!(&hash, b"abcd");
    assert!(unmarshal(b"5:abcde", &mut hash).is_err());
}

#[test]
fn test_nesting_too_deep() {
    let mut data = vec![b'l'; MAX_DEPTH + 2];
    data.extend(vec![b'e'; MAX_DEPTH + 2]);
    assert!(matches!(
        decode(&data),
        Err(BencodeError::NestingTooDeep { .. })
    ));

    let mut data = vec![b'l'; MAX_DEPTH];
    data.extend(vec![b'e'; MAX_DEPTH]);
    assert!(decode(&data).is_ok());
}

#[test]
fn test_trailing_data() {
    assert!(matches!(
        decode(b"i42eextra"),
        Err(BencodeError::TrailingData { offset: 4 })
    ));

    let mut i = 0i64;
    assert_eq!(unmarshal(b"i42eextra", &mut i).unwrap(), 4);
    assert_eq!(i, 42);
}

#[test]
fn test_roundtrip() {
    // Keys must be sorted lexicographically for bencode roundtrip
    let original = b"d8:announce15:http://test.com4:infod4:name4:test12:piece lengthi16384eee";
    let decoded = decode(original).unwrap();
    let encoded = encode(&decoded).unwrap();
    assert_eq!(encoded, original);
}

#[test]
fn test_stream_roundtrip() {
    let bundle = sample_bundle();

    let mut encoder = Encoder::new(Vec::new());
    encoder.encode(&bundle).unwrap();
    let written = encoder.into_inner();
    assert_eq!(written, marshal(&bundle).unwrap());

    let mut decoder = Decoder::new(written.as_slice());
    let mut decoded = Bundle::default();
    assert_eq!(decoder.decode(&mut decoded).unwrap(), written.len());
    assert_eq!(decoded, bundle);
}

#[test]
fn test_encoder_writes_nothing_on_error() {
    let mut encoder = Encoder::new(Vec::new());
    assert!(encoder.encode(&vec![1.0f64]).is_err());
    assert!(encoder.get_ref().is_empty());
}

#[test]
fn test_value_accessors() {
    let value = Value::Integer(42);
    assert_eq!(value.as_integer(), Some(42));
    assert!(value.as_bytes().is_none());
    assert_eq!(value.kind(), "integer");

    let value = Value::Bytes(Bytes::from_static(b"test"));
    assert_eq!(value.as_str(), Some("test"));
    assert!(value.as_integer().is_none());

    let value = Value::List(vec![]);
    assert!(value.as_list().is_some());
    assert!(value.as_dict().is_none());
}

record! {
    #[derive(Debug, Default, PartialEq)]
    pub struct Fingerprint {
        pub hash: [u8; 4] => "hash,omitempty",
        pub ports: [u16; 2] => "ports,omitempty",
    }
}

record! {
    #[derive(Debug, Default)]
    pub struct Samples {
        pub nums: Vec<i64>,
        pub named: BTreeMap<String, i64>,
        pub stamps: Vec<Timestamp>,
    }
}

/// Claims one byte more than it was given.
#[derive(Default)]
struct Greedy;

impl UnmarshalBencode for Greedy {
    fn unmarshal_bencode(&mut self, data: &[u8]) -> Result<usize, BencodeError> {
        Ok(data.len() + 1)
    }
}

impl Decode for Greedy {
    fn target(&mut self) -> Target<'_> {
        Target::Unsupported("Greedy")
    }

    fn decode_hook(&mut self) -> Option<&mut dyn UnmarshalBencode> {
        Some(self)
    }
}

/// Claims to have read nothing.
#[derive(Default)]
struct Idle;

impl UnmarshalBencode for Idle {
    fn unmarshal_bencode(&mut self, _data: &[u8]) -> Result<usize, BencodeError> {
        Ok(0)
    }
}

impl Decode for Idle {
    fn target(&mut self) -> Target<'_> {
        Target::Unsupported("Idle")
    }

    fn decode_hook(&mut self) -> Option<&mut dyn UnmarshalBencode> {
        Some(self)
    }
}

#[test]
fn test_omitempty_fixed_arrays() {
    assert_eq!(marshal(&Fingerprint::default()).unwrap(), b"de");

    let fingerprint = Fingerprint {
        hash: [0, 0, 0, 1],
        ports: [0, 6881],
    };
    let encoded = marshal(&fingerprint).unwrap();
    assert_eq!(encoded, b"d4:hash4:\0\0\0\x015:portsli0ei6881eee");

    let mut decoded = Fingerprint::default();
    unmarshal(&encoded, &mut decoded).unwrap();
    assert_eq!(decoded, fingerprint);
}

#[test]
fn test_nested_error_offsets() {
    let mut samples = Samples::default();

    let err = unmarshal(b"d4:numsli1e4:spamee", &mut samples).unwrap_err();
    assert!(matches!(
        err,
        BencodeError::TypeMismatch {
            offset: 11,
            found: "byte string",
            ..
        }
    ));

    let err = unmarshal(b"d5:namedd1:ai1e1:b1:xee", &mut samples).unwrap_err();
    assert!(matches!(err, BencodeError::TypeMismatch { offset: 18, .. }));

    let err = unmarshal(b"d6:stampsli1ei1x2eee", &mut samples).unwrap_err();
    assert!(matches!(err, BencodeError::MalformedInteger { .. }));
    assert_eq!(err.offset(), Some(14));

    let mut fingerprint = Fingerprint::default();
    let err = unmarshal(b"d5:portsli1ei2ei3eee", &mut fingerprint).unwrap_err();
    assert!(matches!(
        err,
        BencodeError::ArrayOverflow {
            offset: 8,
            capacity: 2,
            found: 3
        }
    ));
}

#[test]
fn test_nested_values_decode_in_place() {
    let mut samples = Samples {
        nums: vec![9, 9, 9],
        ..Default::default()
    };
    let consumed = unmarshal(
        b"d5:namedd1:ai1ee4:numsli1ei-2ee6:stampsli5eee",
        &mut samples,
    )
    .unwrap();

    assert_eq!(consumed, 45);
    assert_eq!(samples.nums, [1, -2]);
    assert_eq!(samples.named.get("a"), Some(&1));
    assert_eq!(samples.stamps, [Timestamp::from_secs(5)]);
}

#[test]
fn test_hook_consumed_count_is_bounded() {
    assert!(matches!(
        unmarshal(b"i1e", &mut Greedy),
        Err(BencodeError::TruncatedBuffer { offset: 3 })
    ));

    let mut greedy: Vec<Greedy> = Vec::new();
    assert!(matches!(
        unmarshal(b"li1ee", &mut greedy),
        Err(BencodeError::TruncatedBuffer { .. })
    ));

    let mut idle: Vec<Idle> = Vec::new();
    assert!(matches!(
        unmarshal(b"li1ee", &mut idle),
        Err(BencodeError::Custom(_))
    ));
}

#[test]
fn test_from_value() {
    let bundle = sample_bundle();
    let value = decode(&marshal(&bundle).unwrap()).unwrap();

    let mut decoded = Bundle::default();
    from_value(value, &mut decoded).unwrap();
    assert_eq!(decoded, bundle);

    let mut number = 0i64;
    assert!(matches!(
        from_value(Value::string("x"), &mut number),
        Err(BencodeError::TypeMismatch { offset: 0, .. })
    ));
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
            proptest::collection::btree_map(
                proptest::collection::vec(any::<u8>(), 0..8).prop_map(Bytes::from),
                inner,
                0..6,
            )
            .prop_map(Value::Dict),
        ]
    })
}

proptest! {
    #[test]
    fn prop_encoding_is_canonical(value in arb_value()) {
        let encoded = encode(&value).unwrap();
        let decoded = decode(&encoded).unwrap();
        prop_assert_eq!(&decoded, &value);
        prop_assert_eq!(encode(&decoded).unwrap(), encoded);
    }
}
