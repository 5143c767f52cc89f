//! Property-based tests for the results module format

use glossa::generation::Description;
use glossa::store::literal::{parse, serialize};
use glossa::store::Descriptions;
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Any title and description text survives a write and a read
#[test]
fn test_text_survives_serialization_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(any::<String>(), any::<String>(), "[0-9]{1,6}|[a-zA-Z_][a-zA-Z0-9_-]{0,8}"),
            |(title, description, id)| {
                let mut descriptions = Descriptions::new();
                descriptions.insert(id.clone(), Description::new(title, description));

                let text = serialize(&descriptions);
                let parsed = parse(&text).unwrap();
                prop_assert_eq!(parsed, descriptions);
                Ok(())
            },
        )
        .unwrap();
}

/// Numeric ids are written in numeric order, regardless of insertion order
#[test]
fn test_numeric_ids_are_ordered_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &proptest::collection::btree_set(0u32..100_000, 1..20),
            |ids: BTreeSet<u32>| {
                let descriptions: Descriptions = ids
                    .iter()
                    .map(|id| (id.to_string(), Description::new("t", "d")))
                    .collect();

                let text = serialize(&descriptions);
                let positions: Vec<usize> = ids
                    .iter()
                    .map(|id| text.find(&format!("  \"{}\": {{", id)).unwrap())
                    .collect();
                prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
                Ok(())
            },
        )
        .unwrap();
}
