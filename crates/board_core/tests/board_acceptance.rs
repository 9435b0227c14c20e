use std::sync::Arc;

use board_core::DemoBoard;
use kv_client::{KvStore, MemoryKv};
use shared::domain::{ReactionKind, ReactionTally};

#[tokio::test]
async fn full_session_acceptance() {
    let store = Arc::new(MemoryKv::new());
    let board = DemoBoard::new(Arc::clone(&store) as Arc<dyn KvStore>);

    // Fresh board: initial mount sees no demos.
    assert!(board.list_demos().await.expect("initial list").is_empty());

    let sprint_review = board.create_demo("Sprint review").await.expect("create");
    let onboarding = board.create_demo("Onboarding flow").await.expect("create");
    assert_eq!(board.list_demos().await.expect("list").len(), 2);

    // Vote and comment on the first demo.
    board.select_demo(&sprint_review).await.expect("select");
    board.add_reaction(ReactionKind::Smile).await.expect("react");
    board.add_reaction(ReactionKind::Smile).await.expect("react");
    board.add_reaction(ReactionKind::Frown).await.expect("react");
    board
        .submit_feedback("Great demo!")
        .await
        .expect("feedback");

    // Switching demos replaces the projection wholesale.
    let other_view = board.select_demo(&onboarding).await.expect("switch");
    assert_eq!(other_view.reactions, ReactionTally::default());
    assert!(other_view.feedback.is_empty());

    // Coming back recomputes the tally from stored events and it matches
    // what was counted click by click.
    let back = board.select_demo(&sprint_review).await.expect("reselect");
    assert_eq!(
        back.reactions,
        ReactionTally {
            smile: 2,
            meh: 0,
            frown: 1
        }
    );
    assert_eq!(back.feedback, vec!["Great demo!"]);

    // A second client against the same store sees the same data.
    let second = DemoBoard::new(Arc::clone(&store) as Arc<dyn KvStore>);
    let demos = second.list_demos().await.expect("list");
    assert_eq!(demos.len(), 2);
    let view = second.select_demo(&sprint_review).await.expect("select");
    assert_eq!(view.reactions, back.reactions);
    assert_eq!(view.feedback, back.feedback);
}
