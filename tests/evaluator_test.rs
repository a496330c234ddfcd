use chrono::Utc;
use learning_backend::models::assignment::{Assignment, GradedSubmission};
use learning_backend::models::course::{Module, ModuleVideo};
use learning_backend::models::progress::{ModuleSubscription, VideoProgress};
use learning_backend::models::question::VideoAnswer;
use learning_backend::services::evaluator::{
    CourseTree, Evaluator, ModuleNode, ProgressSnapshot, VideoNode,
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn video(order_index: i32, questions: usize, assignment: Option<Uuid>) -> VideoNode {
    VideoNode {
        id: Uuid::new_v4(),
        title: format!("Video {}", order_index + 1),
        order_index,
        question_ids: (0..questions).map(|_| Uuid::new_v4()).collect(),
        required_assignment_id: assignment,
    }
}

fn module(order_index: i32, videos: Vec<VideoNode>) -> ModuleNode {
    ModuleNode {
        id: Uuid::new_v4(),
        title: format!("Module {}", order_index + 1),
        order_index,
        videos,
    }
}

fn course(modules: Vec<ModuleNode>) -> CourseTree {
    CourseTree {
        course_id: Uuid::new_v4(),
        modules,
    }
}

fn watched(snap: &mut ProgressSnapshot, v: &VideoNode) {
    snap.record_watch(v.id, 100, true);
}

#[test]
fn first_module_is_always_unlocked() {
    let eval = Evaluator::new(95);
    let tree = course(vec![
        module(0, vec![video(0, 1, None)]),
        module(1, vec![video(0, 0, None)]),
    ]);

    let empty = ProgressSnapshot::default();
    let state = eval.evaluate(&tree, &empty);
    assert!(state.modules[0].unlocked);
    assert!(state.modules[0].videos[0].unlocked);

    let mut busy = ProgressSnapshot::default();
    busy.complete_module(tree.modules[1].id);
    busy.record_answer(tree.modules[0].videos[0].question_ids[0], false);
    assert!(eval.module_unlocked(&busy, &tree.modules, 0));
}

#[test]
fn later_module_unlocks_only_after_previous_is_confirmed() {
    let eval = Evaluator::new(95);
    let tree = course(vec![
        module(0, vec![video(0, 0, None)]),
        module(1, vec![video(0, 0, None), video(1, 0, None)]),
        module(2, vec![video(0, 0, None)]),
    ]);

    let mut snap = ProgressSnapshot::default();
    watched(&mut snap, &tree.modules[0].videos[0]);
    // Every video done is still not a confirmation.
    assert!(!eval.module_unlocked(&snap, &tree.modules, 1));

    snap.complete_module(tree.modules[0].id);
    assert!(eval.module_unlocked(&snap, &tree.modules, 1));
    assert!(!eval.module_unlocked(&snap, &tree.modules, 2));

    snap.complete_module(tree.modules[1].id);
    assert!(eval.module_unlocked(&snap, &tree.modules, 2));
}

#[test]
fn locked_module_locks_its_first_video() {
    let eval = Evaluator::new(95);
    let tree = course(vec![
        module(0, vec![video(0, 0, None)]),
        module(1, vec![video(0, 0, None), video(1, 0, None)]),
    ]);
    let mut snap = ProgressSnapshot::default();
    watched(&mut snap, &tree.modules[0].videos[0]);

    let state = eval.evaluate(&tree, &snap);
    assert!(!state.modules[1].unlocked);
    assert!(state.modules[1].videos.iter().all(|v| !v.unlocked));
}

#[test]
fn next_video_unlocks_after_watch_with_no_quiz() {
    let eval = Evaluator::new(95);
    let tree = course(vec![module(0, vec![video(0, 0, None), video(1, 0, None)])]);
    let mut snap = ProgressSnapshot::default();
    assert!(!eval.video_unlocked(&snap, &tree.modules, 0, 1));

    watched(&mut snap, &tree.modules[0].videos[0]);
    assert!(eval.video_unlocked(&snap, &tree.modules, 0, 1));
}

#[test]
fn wrong_answer_keeps_next_video_locked() {
    let eval = Evaluator::new(95);
    let tree = course(vec![module(0, vec![video(0, 1, None), video(1, 0, None)])]);
    let v1 = &tree.modules[0].videos[0];

    let mut snap = ProgressSnapshot::default();
    watched(&mut snap, v1);
    snap.record_answer(v1.question_ids[0], false);

    let state = eval.evaluate(&tree, &snap);
    assert!(state.modules[0].videos[0].watch_complete);
    assert!(!state.modules[0].videos[0].quiz_complete);
    assert!(!state.modules[0].videos[1].unlocked);

    snap.record_answer(v1.question_ids[0], true);
    let state = eval.evaluate(&tree, &snap);
    assert!(state.modules[0].videos[1].unlocked);
}

#[test]
fn unanswered_question_is_not_complete() {
    let eval = Evaluator::new(95);
    let v = video(0, 2, None);
    let mut snap = ProgressSnapshot::default();
    snap.record_answer(v.question_ids[0], true);
    assert!(!eval.quiz_complete(&snap, &v));
    snap.record_answer(v.question_ids[1], true);
    assert!(eval.quiz_complete(&snap, &v));
}

#[test]
fn video_without_questions_has_quiz_complete() {
    let eval = Evaluator::new(95);
    let v = video(0, 0, None);
    assert!(eval.quiz_complete(&ProgressSnapshot::default(), &v));
}

#[test]
fn resubmitting_correct_answer_keeps_quiz_complete() {
    let eval = Evaluator::new(95);
    let v = video(0, 1, None);
    let q = v.question_ids[0];

    let mut snap = ProgressSnapshot::default();
    snap.record_answer(q, true);
    assert!(eval.quiz_complete(&snap, &v));
    snap.record_answer(q, true);
    assert!(eval.quiz_complete(&snap, &v));
    assert_eq!(snap.answers.len(), 1);

    snap.record_answer(q, false);
    assert!(eval.quiz_complete(&snap, &v));
}

#[test]
fn required_assignment_gates_next_video() {
    let eval = Evaluator::new(95);
    let assignment_id = Uuid::new_v4();
    let tree = course(vec![module(
        0,
        vec![video(0, 0, Some(assignment_id)), video(1, 0, None)],
    )]);

    let mut snap = ProgressSnapshot::default();
    watched(&mut snap, &tree.modules[0].videos[0]);
    assert!(!eval.video_unlocked(&snap, &tree.modules, 0, 1));

    snap.pass_assignment(assignment_id);
    assert!(eval.video_unlocked(&snap, &tree.modules, 0, 1));
}

#[test]
fn fully_complete_never_regresses_under_later_writes() {
    let eval = Evaluator::new(95);
    let v = video(0, 1, None);

    let mut snap = ProgressSnapshot::default();
    watched(&mut snap, &v);
    snap.record_answer(v.question_ids[0], true);
    assert!(eval.video_fully_complete(&snap, &v));

    // Stale progress report and a wrong resubmission arrive afterwards.
    snap.record_watch(v.id, 40, false);
    snap.record_answer(v.question_ids[0], false);
    assert!(eval.video_fully_complete(&snap, &v));
    assert_eq!(snap.watched[&v.id].completion_percentage, 100);
}

#[test]
fn progress_counts_fully_complete_videos() {
    let eval = Evaluator::new(95);
    let tree = course(vec![
        module(0, vec![video(0, 0, None), video(1, 0, None)]),
        module(1, vec![video(0, 0, None), video(1, 0, None)]),
    ]);
    let mut snap = ProgressSnapshot::default();
    watched(&mut snap, &tree.modules[0].videos[0]);

    let state = eval.evaluate(&tree, &snap);
    assert_eq!(state.total_videos, 4);
    assert_eq!(state.completed_videos, 1);
    assert_eq!(state.progress_percentage, 25);
    assert!(!state.course_complete);

    for m in &tree.modules {
        for v in &m.videos {
            watched(&mut snap, v);
        }
        snap.complete_module(m.id);
    }
    let state = eval.evaluate(&tree, &snap);
    assert_eq!(state.progress_percentage, 100);
    assert_eq!(state.completed_modules, 2);
    assert!(state.course_complete);
}

#[test]
fn threshold_applies_uniformly() {
    let strict = Evaluator::new(100);
    let lenient = Evaluator::new(70);
    let v = video(0, 0, None);

    let mut snap = ProgressSnapshot::default();
    snap.record_watch(v.id, 80, true);
    assert!(!strict.video_watch_complete(&snap, &v));
    assert!(lenient.video_watch_complete(&snap, &v));
}

#[test]
fn tree_is_built_in_order_index_order() {
    let course_id = Uuid::new_v4();
    let now = Utc::now();
    let m_first = Module {
        id: Uuid::new_v4(),
        course_id,
        title: "Intro".into(),
        description: None,
        order_index: 0,
        created_at: now,
    };
    let m_second = Module {
        id: Uuid::new_v4(),
        course_id,
        title: "Advanced".into(),
        description: None,
        order_index: 1,
        created_at: now,
    };
    let foreign = Module {
        id: Uuid::new_v4(),
        course_id: Uuid::new_v4(),
        title: "Elsewhere".into(),
        description: None,
        order_index: 0,
        created_at: now,
    };

    let mv = |module_id: Uuid, order_index: i32| ModuleVideo {
        id: Uuid::new_v4(),
        module_id,
        order_index,
        title: format!("clip {}", order_index),
        url: "https://cdn.example.com/clip.mp4".into(),
        duration_seconds: 60,
    };
    let late = mv(m_first.id, 2);
    let early = mv(m_first.id, 1);
    let other = mv(m_second.id, 0);

    let required = Assignment {
        id: Uuid::new_v4(),
        video_id: early.id,
        title: "Homework".into(),
        description: None,
        max_score: Decimal::new(10, 0),
        is_required: true,
        created_at: now,
    };
    let optional = Assignment {
        id: Uuid::new_v4(),
        video_id: late.id,
        title: "Extra".into(),
        description: None,
        max_score: Decimal::new(10, 0),
        is_required: false,
        created_at: now,
    };
    let question = Uuid::new_v4();

    let tree = CourseTree::build(
        course_id,
        vec![m_second.clone(), foreign, m_first.clone()],
        vec![late.clone(), other.clone(), early.clone()],
        vec![(early.id, question)],
        vec![required.clone(), optional],
    );

    assert_eq!(tree.modules.len(), 2);
    assert_eq!(tree.modules[0].id, m_first.id);
    assert_eq!(tree.modules[1].id, m_second.id);
    assert_eq!(tree.modules[0].videos[0].id, early.id);
    assert_eq!(tree.modules[0].videos[1].id, late.id);
    assert_eq!(tree.modules[0].videos[0].question_ids, vec![question]);
    assert_eq!(tree.modules[0].videos[0].required_assignment_id, Some(required.id));
    assert_eq!(tree.modules[0].videos[1].required_assignment_id, None);
    assert_eq!(tree.total_videos(), 3);
    assert_eq!(tree.locate_video(other.id), Some((1, 0)));
}

#[test]
fn snapshot_from_rows_merges_stored_progress() {
    let student_id = Uuid::new_v4();
    let now = Utc::now();
    let video_id = Uuid::new_v4();
    let module_id = Uuid::new_v4();
    let open_module = Uuid::new_v4();
    let question_id = Uuid::new_v4();
    let passed = Uuid::new_v4();
    let failed = Uuid::new_v4();
    let ungraded = Uuid::new_v4();

    let progress = vec![VideoProgress {
        student_id,
        video_id,
        watch_time_seconds: 300,
        completion_percentage: 97,
        completed_at: Some(now),
        updated_at: now,
    }];
    let subscriptions = vec![
        ModuleSubscription {
            student_id,
            module_id,
            subscribed_at: now,
            completed_at: Some(now),
        },
        ModuleSubscription {
            student_id,
            module_id: open_module,
            subscribed_at: now,
            completed_at: None,
        },
    ];
    let answers = vec![VideoAnswer {
        video_id,
        question_id,
        is_correct: true,
    }];
    let submissions = vec![
        GradedSubmission {
            video_id,
            assignment_id: passed,
            score: Some(Decimal::new(8, 0)),
            max_score: Decimal::new(10, 0),
        },
        GradedSubmission {
            video_id,
            assignment_id: failed,
            score: Some(Decimal::new(6, 0)),
            max_score: Decimal::new(10, 0),
        },
        GradedSubmission {
            video_id,
            assignment_id: ungraded,
            score: None,
            max_score: Decimal::new(10, 0),
        },
    ];

    let snap = ProgressSnapshot::from_rows(&progress, &subscriptions, &answers, &submissions);
    assert_eq!(snap.watched[&video_id].completion_percentage, 97);
    assert!(snap.watched[&video_id].marked_complete);
    assert!(snap.completed_modules.contains(&module_id));
    assert!(!snap.completed_modules.contains(&open_module));
    assert_eq!(snap.answers.get(&question_id), Some(&true));
    assert!(snap.passed_assignments.contains(&passed));
    assert!(!snap.passed_assignments.contains(&failed));
    assert!(!snap.passed_assignments.contains(&ungraded));
}
