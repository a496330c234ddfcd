use learning_backend::error::Error;
use learning_backend::services::completion_service::{
    check_course_completable, check_module_confirmable, CompletionTarget,
};
use learning_backend::services::evaluator::{
    CourseTree, Evaluator, ModuleNode, ProgressSnapshot, VideoNode,
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

fn tree(videos_per_module: &[usize]) -> CourseTree {
    CourseTree {
        course_id: Uuid::new_v4(),
        modules: videos_per_module
            .iter()
            .enumerate()
            .map(|(mi, &n)| ModuleNode {
                id: Uuid::new_v4(),
                title: format!("Module {}", mi),
                order_index: mi as i32,
                videos: (0..n)
                    .map(|vi| VideoNode {
                        id: Uuid::new_v4(),
                        title: format!("Video {}", vi),
                        order_index: vi as i32,
                        question_ids: Vec::new(),
                        required_assignment_id: None,
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[test]
fn module_confirmation_requires_every_video() {
    let eval = Evaluator::new(95);
    let tree = tree(&[2]);
    let module_id = tree.modules[0].id;
    let mut snap = ProgressSnapshot::default();
    snap.record_watch(tree.modules[0].videos[0].id, 100, true);

    let err = assert_err!(check_module_confirmable(&eval.evaluate(&tree, &snap), module_id));
    match err {
        Error::Conflict(msg) => assert!(msg.starts_with("precondition_failed: 1 video")),
        other => panic!("unexpected error: {:?}", other),
    }

    snap.record_watch(tree.modules[0].videos[1].id, 96, true);
    assert_ok!(check_module_confirmable(&eval.evaluate(&tree, &snap), module_id));
}

#[test]
fn locked_module_cannot_be_confirmed() {
    let eval = Evaluator::new(95);
    let tree = tree(&[1, 1]);
    let mut snap = ProgressSnapshot::default();
    for m in &tree.modules {
        snap.record_watch(m.videos[0].id, 100, true);
    }

    let err = assert_err!(check_module_confirmable(
        &eval.evaluate(&tree, &snap),
        tree.modules[1].id
    ));
    assert!(matches!(err, Error::Forbidden(ref code) if code == "content_locked"));
}

#[test]
fn unknown_module_is_not_found() {
    let eval = Evaluator::new(95);
    let tree = tree(&[1]);
    let state = eval.evaluate(&tree, &ProgressSnapshot::default());
    let err = assert_err!(check_module_confirmable(&state, Uuid::new_v4()));
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn course_completion_requires_every_module() {
    let eval = Evaluator::new(95);
    let tree = tree(&[1, 1]);
    let mut snap = ProgressSnapshot::default();
    snap.complete_module(tree.modules[0].id);
    assert_err!(check_course_completable(&eval.evaluate(&tree, &snap)));

    snap.complete_module(tree.modules[1].id);
    assert_ok!(check_course_completable(&eval.evaluate(&tree, &snap)));
}

#[test]
fn empty_course_cannot_be_completed() {
    let eval = Evaluator::new(95);
    let state = eval.evaluate(&tree(&[]), &ProgressSnapshot::default());
    assert_err!(check_course_completable(&state));
}

#[test]
fn completion_target_is_a_tagged_value() {
    let id = Uuid::new_v4();
    let target: CompletionTarget =
        serde_json::from_value(json!({ "target": "module", "id": id })).expect("parse");
    assert_eq!(target, CompletionTarget::Module(id));
    assert_eq!(target.kind(), "module");
    assert_eq!(target.id(), id);

    let unknown = serde_json::from_value::<CompletionTarget>(json!({ "target": "lesson", "id": id }));
    assert!(unknown.is_err());
}
