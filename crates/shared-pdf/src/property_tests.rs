//! Property-based tests for field extraction
//!
//! Fixtures are generated from arbitrary page/field layouts and the
//! extractor output is compared against the layout that produced them.

use proptest::prelude::*;

use crate::fields::extract_from_bytes;
use crate::fixtures::{FixtureField, FormFixture};

/// A field layout: (name, optional value, is_signature)
fn field_spec() -> impl Strategy<Value = (String, Option<String>, bool)> {
    (
        "[A-Z][a-z]{2,8}( [A-Z][a-z]{2,8})?[1-5]?",
        proptest::option::of("[A-Za-z0-9 ]{1,12}"),
        any::<bool>(),
    )
}

fn layout() -> impl Strategy<Value = Vec<Vec<(String, Option<String>, bool)>>> {
    prop::collection::vec(prop::collection::vec(field_spec(), 0..5), 1..4)
}

fn build(layout: &[Vec<(String, Option<String>, bool)>]) -> Vec<u8> {
    let mut fixture = FormFixture::new();
    for page in layout {
        let fields = page
            .iter()
            .map(|(name, value, is_signature)| {
                if *is_signature {
                    FixtureField::signature(name, value.as_deref())
                } else {
                    FixtureField::text(name, value.as_deref())
                }
            })
            .collect();
        fixture = fixture.page(fields);
    }
    fixture.to_bytes()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: extracting the same bytes twice gives identical output
    #[test]
    fn extraction_is_idempotent(layout in layout()) {
        let bytes = build(&layout);
        let first = extract_from_bytes(&bytes).unwrap();
        let second = extract_from_bytes(&bytes).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property: one record per annotation, in page order, with 1-indexed pages
    #[test]
    fn one_record_per_annotation(layout in layout()) {
        let bytes = build(&layout);
        let extracted = extract_from_bytes(&bytes).unwrap();

        let expected: Vec<(String, u32)> = layout
            .iter()
            .enumerate()
            .flat_map(|(idx, page)| page.iter().map(move |(name, _, _)| (name.clone(), idx as u32 + 1)))
            .collect();
        let actual: Vec<(String, u32)> = extracted
            .fields
            .iter()
            .map(|f| (f.name.clone().unwrap_or_default(), f.page))
            .collect();
        prop_assert_eq!(actual, expected);
    }

    /// Property: signature records mirror exactly the signature-typed fields
    #[test]
    fn signatures_follow_signature_fields(layout in layout()) {
        let bytes = build(&layout);
        let extracted = extract_from_bytes(&bytes).unwrap();

        let expected: Vec<bool> = layout
            .iter()
            .flatten()
            .filter(|(_, _, is_signature)| *is_signature)
            .map(|(_, value, _)| value.is_some())
            .collect();
        let actual: Vec<bool> = extracted.signatures.iter().map(|s| s.signed).collect();
        prop_assert_eq!(actual, expected);
    }
}
