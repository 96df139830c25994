//! Property tests for the header round trip.

use std::collections::BTreeMap;

use docvault_common::AttributeValue;
use docvault_frontmatter::{parse, serialize, Header};
use proptest::prelude::*;

fn value_strategy() -> impl Strategy<Value = AttributeValue> {
    prop_oneof![
        any::<String>().prop_map(AttributeValue::Scalar),
        prop::collection::vec(any::<String>(), 0..5).prop_map(AttributeValue::List),
    ]
}

fn header_strategy() -> impl Strategy<Value = BTreeMap<String, AttributeValue>> {
    prop::collection::btree_map("[a-zA-Z_][a-zA-Z0-9_-]{0,12}", value_strategy(), 0..8)
}

fn as_map(header: &Header) -> BTreeMap<String, AttributeValue> {
    header
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

proptest! {
    #[test]
    fn parse_inverts_serialize(fields in header_strategy(), body in any::<String>()) {
        let header: Header = fields.clone().into_iter().collect();
        let text = serialize(&header, &body);
        let parsed = parse(&text);

        prop_assert_eq!(as_map(&parsed.header), fields);
        prop_assert_eq!(parsed.body, body);
    }

    #[test]
    fn serialize_is_stable(fields in header_strategy(), body in "\\PC*") {
        let header: Header = fields.into_iter().collect();
        let once = serialize(&header, &body);
        let parsed = parse(&once);
        let twice = serialize(&parsed.header, &parsed.body);

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn list_order_is_preserved(items in prop::collection::vec(any::<String>(), 1..6)) {
        let header = Header::new().with("tags", items.clone());
        let parsed = parse(&serialize(&header, ""));

        prop_assert_eq!(
            parsed.header.get("tags").and_then(AttributeValue::as_list),
            Some(items.as_slice())
        );
    }
}
