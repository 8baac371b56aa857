//! Title repair is idempotent and only ever touches the first block.

use nbforge::artifact::{
    canonical_heading, repair_artifact, validate, Artifact, Block, RepairOutcome,
    ValidationPolicy,
};
use proptest::prelude::*;

fn id_strategy() -> impl Strategy<Value = String> {
    "[0-9]{3}"
}

fn title_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 &()-]{0,30}"
}

fn first_block_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[#A-Za-z0-9 :.-]{0,20}", 0..6).prop_map(|lines| lines.join("\n"))
}

fn artifact(first: &str, body: &[String]) -> Artifact {
    let mut blocks = vec![Block::narrative(first)];
    for (i, text) in body.iter().enumerate() {
        if i % 2 == 0 {
            blocks.push(Block::executable(text));
        } else {
            blocks.push(Block::narrative(text));
        }
    }
    Artifact::new(blocks)
}

proptest! {
    #[test]
    fn second_repair_is_a_no_op(
        id in id_strategy(),
        title in title_strategy(),
        first in first_block_text(),
        body in prop::collection::vec("[a-z =0-9\n]{0,40}", 0..6),
    ) {
        let mut once = artifact(&first, &body);
        repair_artifact(&mut once, &id, &title);
        let policy = ValidationPolicy::default();
        let after_once = validate(&once, &policy);

        let mut twice = once.clone();
        let outcome = repair_artifact(&mut twice, &id, &title);

        prop_assert_eq!(outcome, RepairOutcome::Unchanged { anomaly: None });
        prop_assert_eq!(&twice, &once);
        prop_assert_eq!(validate(&twice, &policy), after_once);
        prop_assert_eq!(once.blocks[0].first_line(), canonical_heading(&id, &title));
    }

    #[test]
    fn repair_leaves_other_blocks_untouched(
        id in id_strategy(),
        title in title_strategy(),
        first in first_block_text(),
        body in prop::collection::vec("[a-z =0-9\n]{0,40}", 1..6),
    ) {
        let original = artifact(&first, &body);
        let mut repaired = original.clone();
        repair_artifact(&mut repaired, &id, &title);

        prop_assert_eq!(repaired.blocks.len(), original.blocks.len());
        prop_assert_eq!(&repaired.blocks[1..], &original.blocks[1..]);
    }
}
