use proptest::prelude::*;
use sheetsync_core::model::ids::{QuestionId, SubTopicId, TopicId};
use sheetsync_core::model::question::{Question, QuestionDraft, QuestionPatch};
use sheetsync_core::model::sheet::{SubTopic, Topic};
use sheetsync_core::store::mutation::{Mutation, Undo};
use sheetsync_core::store::url_index::UrlIndex;
use sheetsync_core::SheetState;

#[derive(Debug, Clone)]
enum Op {
    AddTopic,
    AddSubTopic(usize),
    AddQuestion(usize, Option<u8>),
    SetUrl(usize, Option<u8>),
    ToggleSolved(usize),
    DeleteQuestion(usize),
    DeleteSubTopic(usize),
    DeleteTopic(usize),
    ReverseQuestions(usize),
    RotateTopics,
}

fn op() -> impl Strategy<Value = Op> {
    let url = proptest::option::of(0u8..4);
    prop_oneof![
        Just(Op::AddTopic),
        any::<usize>().prop_map(Op::AddSubTopic),
        (any::<usize>(), url.clone()).prop_map(|(at, url)| Op::AddQuestion(at, url)),
        (any::<usize>(), url).prop_map(|(at, url)| Op::SetUrl(at, url)),
        any::<usize>().prop_map(Op::ToggleSolved),
        any::<usize>().prop_map(Op::DeleteQuestion),
        any::<usize>().prop_map(Op::DeleteSubTopic),
        any::<usize>().prop_map(Op::DeleteTopic),
        any::<usize>().prop_map(Op::ReverseQuestions),
        Just(Op::RotateTopics),
    ]
}

fn link(slot: u8) -> String {
    format!("https://lc/problem-{slot}")
}

fn base_state() -> SheetState {
    let mut state = SheetState::new();
    for t in 0..2 {
        let topic_id = TopicId::new(format!("t{t}"));
        state
            .insert_topic(Topic::new(topic_id.clone(), format!("Topic {t}")))
            .unwrap();
        for s in 0..2 {
            let sub_topic_id = SubTopicId::new(format!("t{t}s{s}"));
            state
                .insert_sub_topic(&topic_id, SubTopic::new(sub_topic_id.clone(), "Sub"))
                .unwrap();
            for q in 0..2u8 {
                let id = QuestionId::new(format!("t{t}s{s}q{q}"));
                let draft = QuestionDraft::new("Question").with_problem_url(link(q));
                state
                    .insert_question(&sub_topic_id, Question::from_draft(id, &draft))
                    .unwrap();
            }
        }
    }
    state
}

fn pick<T: Clone>(items: &[T], at: usize) -> Option<T> {
    (!items.is_empty()).then(|| items[at % items.len()].clone())
}

fn sub_topics(state: &SheetState) -> Vec<(TopicId, SubTopicId)> {
    state
        .topics_in_order()
        .flat_map(|topic| {
            topic
                .sub_topic_ids
                .iter()
                .map(move |id| (topic.id.clone(), id.clone()))
        })
        .collect()
}

fn questions(state: &SheetState) -> Vec<(SubTopicId, QuestionId)> {
    state
        .walk()
        .map(|(_, sub_topic, question)| (sub_topic.id.clone(), question.id.clone()))
        .collect()
}

fn entity_count(state: &SheetState) -> usize {
    state.topics().len() + state.sub_topics().len() + state.questions().len()
}

/// Maps an operation to a mutation command; create operations are applied
/// directly and yield `None`.
fn prepare(state: &mut SheetState, op: Op, serial: usize) -> Option<Mutation> {
    match op {
        Op::AddTopic => {
            let id = TopicId::new(format!("new-t{serial}"));
            state.insert_topic(Topic::new(id, "New")).unwrap();
            None
        }
        Op::AddSubTopic(at) => {
            let topic_id = pick(state.topic_order(), at)?;
            let id = SubTopicId::new(format!("new-s{serial}"));
            state
                .insert_sub_topic(&topic_id, SubTopic::new(id, "New"))
                .unwrap();
            None
        }
        Op::AddQuestion(at, url) => {
            let (_, sub_topic_id) = pick(&sub_topics(state), at)?;
            let mut draft = QuestionDraft::new("New");
            if let Some(slot) = url {
                draft = draft.with_problem_url(link(slot));
            }
            let id = QuestionId::new(format!("new-q{serial}"));
            state
                .insert_question(&sub_topic_id, Question::from_draft(id, &draft))
                .unwrap();
            None
        }
        Op::SetUrl(at, url) => {
            let (_, id) = pick(&questions(state), at)?;
            let patch = QuestionPatch {
                problem_url: Some(url.map(link).unwrap_or_default()),
                ..QuestionPatch::default()
            };
            Some(Mutation::UpdateQuestion { id, patch })
        }
        Op::ToggleSolved(at) => {
            let (_, id) = pick(&questions(state), at)?;
            let solved = state.question(&id)?.is_solved;
            Some(Mutation::UpdateQuestion {
                id,
                patch: QuestionPatch::solved(!solved),
            })
        }
        Op::DeleteQuestion(at) => {
            let (sub_topic_id, id) = pick(&questions(state), at)?;
            Some(Mutation::DeleteQuestion { sub_topic_id, id })
        }
        Op::DeleteSubTopic(at) => {
            let (topic_id, id) = pick(&sub_topics(state), at)?;
            Some(Mutation::DeleteSubTopic { topic_id, id })
        }
        Op::DeleteTopic(at) => {
            let id = pick(state.topic_order(), at)?;
            Some(Mutation::DeleteTopic { id })
        }
        Op::ReverseQuestions(at) => {
            let (_, sub_topic_id) = pick(&sub_topics(state), at)?;
            let mut order = state.sub_topic(&sub_topic_id)?.question_ids.clone();
            order.reverse();
            Some(Mutation::ReorderQuestions {
                sub_topic_id,
                order,
            })
        }
        Op::RotateTopics => {
            let mut order = state.topic_order().to_vec();
            if !order.is_empty() {
                order.rotate_left(1);
            }
            Some(Mutation::ReorderTopics { order })
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn integrity_and_index_fidelity_hold_after_every_operation(
        ops in prop::collection::vec((op(), any::<bool>()), 1..40)
    ) {
        let mut state = base_state();
        for (serial, (op, revert)) in ops.into_iter().enumerate() {
            let Some(mutation) = prepare(&mut state, op, serial) else {
                prop_assert!(state.check_integrity().is_ok());
                continue;
            };
            let before = state.clone();
            let undo = mutation.apply(&mut state).unwrap();

            if let Undo::Topic(removed) = &undo {
                prop_assert_eq!(entity_count(&before) - entity_count(&state), removed.entity_count());
            }
            prop_assert!(state.check_integrity().is_ok());
            prop_assert_eq!(state.url_index(), &UrlIndex::rebuild(state.questions().values()));

            if revert {
                undo.revert(&mut state);
                prop_assert_eq!(&state, &before);
            }
        }
    }

    #[test]
    fn deleting_a_topic_removes_exactly_its_subtree(at in any::<usize>()) {
        let mut state = base_state();
        let id = pick(state.topic_order(), at).unwrap();
        let owned: Vec<QuestionId> = {
            let topic = state.topic(&id).unwrap();
            state
                .sub_topics_of(topic)
                .flat_map(|sub_topic| sub_topic.question_ids.clone())
                .collect()
        };
        let before = entity_count(&state);

        let removed = state.remove_topic(&id).unwrap();

        prop_assert_eq!(removed.entity_count(), 1 + 2 + owned.len());
        prop_assert_eq!(entity_count(&state), before - removed.entity_count());
        for (_, ids) in state.url_index().iter() {
            prop_assert!(owned.iter().all(|question_id| !ids.contains(question_id)));
        }
    }
}
