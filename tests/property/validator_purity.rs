//! Validation is a pure function of the artifact and the policy.

use nbforge::artifact::{validate, validate_encoded, Artifact, Block, BlockKind, ValidationPolicy};
use proptest::prelude::*;

fn block_strategy() -> impl Strategy<Value = Block> {
    (
        prop_oneof![
            Just(BlockKind::Narrative),
            Just(BlockKind::Executable),
            Just(BlockKind::Raw)
        ],
        prop::collection::vec("[A-Za-z0-9 #`]{0,30}", 0..8),
    )
        .prop_map(|(kind, lines)| Block::new(kind, &lines.join("\n")))
}

proptest! {
    #[test]
    fn validating_twice_gives_identical_results(
        blocks in prop::collection::vec(block_strategy(), 0..45),
        max_lines in 1usize..10,
    ) {
        let artifact = Artifact::new(blocks);
        let policy = ValidationPolicy {
            max_executable_lines: max_lines,
            ..ValidationPolicy::default()
        };
        let snapshot = artifact.clone();

        let first = validate(&artifact, &policy);
        let second = validate(&artifact, &policy);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&artifact, &snapshot);
    }

    #[test]
    fn encoded_validation_matches_in_memory_validation(
        blocks in prop::collection::vec(block_strategy(), 0..45),
    ) {
        let artifact = Artifact::new(blocks);
        let policy = ValidationPolicy::default();
        let encoded = artifact.to_json_string().unwrap();

        prop_assert_eq!(validate_encoded(&encoded, &policy), validate(&artifact, &policy));
    }
}
