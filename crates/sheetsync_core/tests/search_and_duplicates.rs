mod common;

use common::{loaded_service, question_titled};
use sheetsync_core::model::ids::{QuestionId, SubTopicId, TopicId};
use sheetsync_core::model::question::{Question, QuestionDraft};
use sheetsync_core::model::sheet::{SubTopic, Topic};
use sheetsync_core::search::duplicates::{find_duplicates, scan_duplicates};
use sheetsync_core::search::filter::filter;
use sheetsync_core::SheetState;

fn arrays_sheet() -> SheetState {
    let mut state = SheetState::new();
    state
        .insert_topic(Topic::new(TopicId::new("t1"), "Arrays"))
        .unwrap();
    state
        .insert_sub_topic(
            &TopicId::new("t1"),
            SubTopic::new(SubTopicId::new("s1"), "Sliding Window"),
        )
        .unwrap();
    state
        .insert_question(
            &SubTopicId::new("s1"),
            Question::from_draft(QuestionId::new("q1"), &QuestionDraft::new("Two Sum")),
        )
        .unwrap();
    state
}

#[test]
fn topic_match_propagates_down_without_counting_descendants() {
    let state = arrays_sheet();
    let matches = filter(&state, "array").unwrap();

    assert_eq!(matches.total_matches, 1);
    assert!(matches.topic_direct_matches.contains(&TopicId::new("t1")));
    assert!(matches.visible_topic_ids.contains(&TopicId::new("t1")));
    assert!(matches.visible_sub_topic_ids.contains(&SubTopicId::new("s1")));
    assert!(matches.visible_question_ids.contains(&QuestionId::new("q1")));
    assert!(matches.sub_topic_direct_matches.is_empty());
    assert!(matches.question_direct_matches.is_empty());
}

#[test]
fn question_match_propagates_up() {
    let state = arrays_sheet();
    let matches = filter(&state, "TWO").unwrap();

    assert_eq!(matches.total_matches, 1);
    assert_eq!(matches.question_direct_matches.len(), 1);
    assert!(matches.topic_direct_matches.is_empty());
    assert!(matches.visible_topic_ids.contains(&TopicId::new("t1")));
    assert!(matches.visible_sub_topic_ids.contains(&SubTopicId::new("s1")));
}

#[test]
fn blank_query_disables_filtering() {
    let state = arrays_sheet();
    assert!(filter(&state, "").is_none());
    assert!(filter(&state, "   ").is_none());
}

#[test]
fn matches_at_every_tier_are_all_counted() {
    let mut state = arrays_sheet();
    state
        .rename_sub_topic(&SubTopicId::new("s1"), "Arrays Window".to_string())
        .unwrap();
    let matches = filter(&state, "arrays").unwrap();
    assert_eq!(matches.total_matches, 2);
    assert!(filter(&state, "no such text").unwrap().visible_topic_ids.is_empty());
}

#[tokio::test]
async fn sub_topic_match_shows_owner_and_all_questions() {
    let service = loaded_service().await;
    let matches = service.search("medium problems").unwrap();

    assert_eq!(matches.total_matches, 1);
    assert_eq!(matches.visible_topic_ids.len(), 1);
    assert_eq!(matches.visible_sub_topic_ids.len(), 1);
    assert_eq!(matches.visible_question_ids.len(), 2);
}

#[tokio::test]
async fn duplicate_report_excludes_the_edited_question() {
    let service = loaded_service().await;
    let (sub_topic_id, _) = question_titled(&service, "Two Sum");
    let url = "https://leetcode.com/problems/maximum-subarray/";
    let (_, kadane) = question_titled(&service, "Kadane's Algorithm, Maximum Subarray Sum");
    let added = service
        .add_question(&sub_topic_id, &QuestionDraft::new("Max Subarray again").with_problem_url(url))
        .await
        .unwrap();

    let locations = service.find_duplicates(url, Some(&added));
    assert_eq!(locations.len(), 2);
    assert!(locations.iter().all(|location| location.question_id != added));
    assert_eq!(locations[0].question_id, kadane);
    assert_eq!(locations[0].topic_name, "Arrays");
    assert_eq!(locations[0].sub_topic_name, "Medium");
    assert_eq!(locations[1].topic_name, "Recursion");

    assert!(service.find_duplicates("", None).is_empty());
    assert!(service
        .find_duplicates("https://example.com/unused", None)
        .is_empty());
}

#[tokio::test]
async fn indexed_lookup_matches_the_reference_walk() {
    let service = loaded_service().await;
    let state = service.snapshot();
    for question in state.questions().values() {
        let Some(url) = question.url() else {
            continue;
        };
        assert_eq!(
            find_duplicates(&state, url, Some(&question.id)),
            scan_duplicates(&state, url, Some(&question.id))
        );
        assert_eq!(
            find_duplicates(&state, url, None),
            scan_duplicates(&state, url, None)
        );
    }
}

#[tokio::test]
async fn padded_candidate_link_finds_the_stored_holders() {
    let service = loaded_service().await;
    let state = service.snapshot();
    let url = "https://leetcode.com/problems/maximum-subarray/";
    let padded = format!("  {url}\t");

    let locations = service.find_duplicates(&padded, None);
    assert_eq!(locations.len(), 2);
    assert_eq!(locations, service.find_duplicates(url, None));
    assert_eq!(scan_duplicates(&state, &padded, None), locations);
    assert!(service.find_duplicates("   ", None).is_empty());
}
