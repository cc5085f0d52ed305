mod common;

use common::{loaded_service, topic_named};
use sheetsync_core::{Operation, SheetPersistence, StoreError, SyncError, TopicId};

#[tokio::test]
async fn reorder_keeps_the_same_ids_in_the_new_order() {
    let service = loaded_service().await;
    let order = service.read(|state| state.topic_order().to_vec());
    let (a, b, c) = (order[0].clone(), order[1].clone(), order[2].clone());

    service
        .reorder_topics(vec![c.clone(), a.clone(), b.clone()])
        .await
        .unwrap();

    assert_eq!(
        service.read(|state| state.topic_order().to_vec()),
        vec![c.clone(), a.clone(), b.clone()]
    );
    let remote = service.remote().inner().get_sheet().await.unwrap();
    assert_eq!(remote.topic_order, vec![c, a, b]);
}

#[tokio::test]
async fn failed_reorder_restores_the_previous_order() {
    let service = loaded_service().await;
    let mut notices = service.subscribe();
    let order = service.read(|state| state.topic_order().to_vec());
    let rotated = vec![order[2].clone(), order[0].clone(), order[1].clone()];
    service.remote().fail_calls(true);

    let err = service.reorder_topics(rotated).await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Remote {
            operation: Operation::ReorderTopics,
            ..
        }
    ));
    assert_eq!(service.read(|state| state.topic_order().to_vec()), order);
    assert_eq!(notices.try_recv().unwrap().message, "Failed to reorder topics");
}

#[tokio::test]
async fn malformed_order_is_rejected_without_side_effects() {
    let service = loaded_service().await;
    let order = service.read(|state| state.topic_order().to_vec());
    let calls = service.remote().calls();

    let repeated = vec![order[0].clone(), order[0].clone(), order[1].clone()];
    let err = service.reorder_topics(repeated).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Store(StoreError::InvalidOrder { .. })
    ));

    let mut foreign = order.clone();
    foreign[1] = TopicId::new("topic-foreign");
    assert!(service.reorder_topics(foreign).await.is_err());

    assert_eq!(service.read(|state| state.topic_order().to_vec()), order);
    assert_eq!(service.remote().calls(), calls);
}

#[tokio::test]
async fn failed_question_reorder_reverts_only_that_sub_topic() {
    let service = loaded_service().await;
    let topic_id = topic_named(&service, "Arrays");
    let (sub_topic_id, questions) = service.read(|state| {
        let sub_topic_id = state.topic(&topic_id).unwrap().sub_topic_ids[1].clone();
        let questions = state.sub_topic(&sub_topic_id).unwrap().question_ids.clone();
        (sub_topic_id, questions)
    });
    assert_eq!(questions.len(), 2);
    let before = service.snapshot();
    service.remote().fail_calls(true);

    let reversed: Vec<_> = questions.iter().rev().cloned().collect();
    service
        .reorder_questions(&sub_topic_id, reversed)
        .await
        .unwrap_err();

    assert_eq!(service.snapshot(), before);
}

#[tokio::test]
async fn move_builds_the_permutation_like_a_drag() {
    let service = loaded_service().await;
    let topic_id = topic_named(&service, "Recursion");
    let before = service.read(|state| state.topic(&topic_id).unwrap().sub_topic_ids.clone());
    assert_eq!(before.len(), 3);

    service.move_sub_topic(&topic_id, 0, 2).await.unwrap();

    let after = service.read(|state| state.topic(&topic_id).unwrap().sub_topic_ids.clone());
    assert_eq!(after, vec![before[1].clone(), before[2].clone(), before[0].clone()]);
    let remote = service.remote().inner().get_sheet().await.unwrap();
    assert_eq!(remote.topics[&topic_id].sub_topic_ids, after);
}

#[tokio::test]
async fn move_to_the_same_position_skips_the_remote() {
    let service = loaded_service().await;
    let mut notices = service.subscribe();
    let calls = service.remote().calls();

    service.move_topic(1, 1).await.unwrap();
    assert!(notices.try_recv().is_err());

    assert_eq!(service.remote().calls(), calls);
    assert!(matches!(
        service.move_topic(0, 9).await,
        Err(SyncError::Store(StoreError::PositionOutOfRange { position: 9, len: 3 }))
    ));
    assert_eq!(notices.try_recv().unwrap().message, "Failed to reorder topics");
}
