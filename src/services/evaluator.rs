//! Sequential gating for courses, modules and videos.
//!
//! Everything here is a pure function of a [`CourseTree`] and a student's
//! [`ProgressSnapshot`]. Nothing is cached between evaluations; callers rebuild
//! the snapshot from the database whenever they need a fresh answer.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::assignment::{is_passing, Assignment, GradedSubmission};
use crate::models::course::{Module, ModuleVideo};
use crate::models::progress::{ModuleSubscription, VideoProgress};
use crate::models::question::VideoAnswer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoNode {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub question_ids: Vec<Uuid>,
    pub required_assignment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleNode {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub videos: Vec<VideoNode>,
}

/// Course content in gating order: modules by `order_index`, and videos by
/// their `order_index` inside each module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseTree {
    pub course_id: Uuid,
    pub modules: Vec<ModuleNode>,
}

impl CourseTree {
    pub fn build(
        course_id: Uuid,
        modules: Vec<Module>,
        videos: Vec<ModuleVideo>,
        questions: Vec<(Uuid, Uuid)>,
        assignments: Vec<Assignment>,
    ) -> Self {
        let mut questions_by_video: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (video_id, question_id) in questions {
            questions_by_video.entry(video_id).or_default().push(question_id);
        }

        let mut assignment_by_video: HashMap<Uuid, Uuid> = HashMap::new();
        for a in assignments.into_iter().filter(|a| a.is_required) {
            assignment_by_video.entry(a.video_id).or_insert(a.id);
        }

        let mut videos_by_module: HashMap<Uuid, Vec<VideoNode>> = HashMap::new();
        for v in videos {
            videos_by_module.entry(v.module_id).or_default().push(VideoNode {
                id: v.id,
                title: v.title,
                order_index: v.order_index,
                question_ids: questions_by_video.get(&v.id).cloned().unwrap_or_default(),
                required_assignment_id: assignment_by_video.get(&v.id).copied(),
            });
        }

        let mut module_nodes: Vec<ModuleNode> = modules
            .into_iter()
            .filter(|m| m.course_id == course_id)
            .map(|m| {
                let mut videos = videos_by_module.remove(&m.id).unwrap_or_default();
                videos.sort_by_key(|v| v.order_index);
                ModuleNode {
                    id: m.id,
                    title: m.title,
                    order_index: m.order_index,
                    videos,
                }
            })
            .collect();
        module_nodes.sort_by_key(|m| m.order_index);

        Self {
            course_id,
            modules: module_nodes,
        }
    }

    pub fn total_videos(&self) -> usize {
        self.modules.iter().map(|m| m.videos.len()).sum()
    }

    /// Index of the module holding `video_id` and the video's index inside it.
    pub fn locate_video(&self, video_id: Uuid) -> Option<(usize, usize)> {
        self.modules.iter().enumerate().find_map(|(mi, m)| {
            m.videos
                .iter()
                .position(|v| v.id == video_id)
                .map(|vi| (mi, vi))
        })
    }

    pub fn locate_module(&self, module_id: Uuid) -> Option<usize> {
        self.modules.iter().position(|m| m.id == module_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchRecord {
    pub completion_percentage: i32,
    pub marked_complete: bool,
}

/// One student's stored progress, reduced to what gating needs.
#[derive(Debug, Clone, Default)]
pub struct ProgressSnapshot {
    pub watched: HashMap<Uuid, WatchRecord>,
    pub completed_modules: HashSet<Uuid>,
    /// question id -> answered correctly
    pub answers: HashMap<Uuid, bool>,
    pub passed_assignments: HashSet<Uuid>,
}

impl ProgressSnapshot {
    pub fn from_rows(
        progress: &[VideoProgress],
        subscriptions: &[ModuleSubscription],
        answers: &[VideoAnswer],
        submissions: &[GradedSubmission],
    ) -> Self {
        let mut snapshot = Self::default();
        for p in progress {
            snapshot.record_watch(p.video_id, p.completion_percentage, p.completed_at.is_some());
        }
        for s in subscriptions.iter().filter(|s| s.completed_at.is_some()) {
            snapshot.completed_modules.insert(s.module_id);
        }
        for a in answers {
            snapshot.record_answer(a.question_id, a.is_correct);
        }
        for s in submissions {
            if let Some(score) = s.score {
                if is_passing(score, s.max_score) {
                    snapshot.passed_assignments.insert(s.assignment_id);
                }
            }
        }
        snapshot
    }

    /// Merges a watch record; percentage only moves up and the completion mark
    /// is never cleared.
    pub fn record_watch(&mut self, video_id: Uuid, completion_percentage: i32, marked_complete: bool) {
        let entry = self.watched.entry(video_id).or_default();
        entry.completion_percentage = entry.completion_percentage.max(completion_percentage);
        entry.marked_complete |= marked_complete;
    }

    /// A question stays correct once it has been answered correctly.
    pub fn record_answer(&mut self, question_id: Uuid, is_correct: bool) {
        let entry = self.answers.entry(question_id).or_insert(false);
        *entry |= is_correct;
    }

    pub fn complete_module(&mut self, module_id: Uuid) {
        self.completed_modules.insert(module_id);
    }

    pub fn pass_assignment(&mut self, assignment_id: Uuid) {
        self.passed_assignments.insert(assignment_id);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoState {
    pub video_id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub unlocked: bool,
    pub watch_complete: bool,
    pub quiz_complete: bool,
    pub assignment_complete: bool,
    pub fully_complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleState {
    pub module_id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub unlocked: bool,
    pub complete: bool,
    pub all_videos_complete: bool,
    pub videos: Vec<VideoState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseState {
    pub course_id: Uuid,
    pub modules: Vec<ModuleState>,
    pub total_videos: usize,
    pub completed_videos: usize,
    pub completed_modules: usize,
    pub progress_percentage: i32,
    pub course_complete: bool,
}

impl CourseState {
    pub fn module(&self, module_id: Uuid) -> Option<&ModuleState> {
        self.modules.iter().find(|m| m.module_id == module_id)
    }

    pub fn video(&self, video_id: Uuid) -> Option<(&ModuleState, &VideoState)> {
        self.modules.iter().find_map(|m| {
            m.videos
                .iter()
                .find(|v| v.video_id == video_id)
                .map(|v| (m, v))
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    watch_threshold: i32,
}

impl Evaluator {
    pub fn new(watch_threshold: i32) -> Self {
        Self {
            watch_threshold: watch_threshold.clamp(0, 100),
        }
    }

    pub fn from_config() -> Self {
        Self::new(crate::config::get_config().watch_completion_threshold)
    }

    pub fn watch_threshold(&self) -> i32 {
        self.watch_threshold
    }

    pub fn video_watch_complete(&self, snapshot: &ProgressSnapshot, video: &VideoNode) -> bool {
        snapshot
            .watched
            .get(&video.id)
            .map(|w| w.marked_complete && w.completion_percentage >= self.watch_threshold)
            .unwrap_or(false)
    }

    pub fn quiz_complete(&self, snapshot: &ProgressSnapshot, video: &VideoNode) -> bool {
        video
            .question_ids
            .iter()
            .all(|q| snapshot.answers.get(q).copied().unwrap_or(false))
    }

    pub fn assignment_complete(&self, snapshot: &ProgressSnapshot, video: &VideoNode) -> bool {
        match video.required_assignment_id {
            None => true,
            Some(id) => snapshot.passed_assignments.contains(&id),
        }
    }

    pub fn video_fully_complete(&self, snapshot: &ProgressSnapshot, video: &VideoNode) -> bool {
        self.video_watch_complete(snapshot, video)
            && self.quiz_complete(snapshot, video)
            && self.assignment_complete(snapshot, video)
    }

    pub fn module_complete(&self, snapshot: &ProgressSnapshot, module: &ModuleNode) -> bool {
        snapshot.completed_modules.contains(&module.id)
    }

    pub fn module_unlocked(&self, snapshot: &ProgressSnapshot, modules: &[ModuleNode], index: usize) -> bool {
        match index {
            0 => true,
            i => modules
                .get(i - 1)
                .map(|prev| self.module_complete(snapshot, prev))
                .unwrap_or(false),
        }
    }

    pub fn video_unlocked(
        &self,
        snapshot: &ProgressSnapshot,
        modules: &[ModuleNode],
        module_index: usize,
        video_index: usize,
    ) -> bool {
        if !self.module_unlocked(snapshot, modules, module_index) {
            return false;
        }
        let Some(module) = modules.get(module_index) else {
            return false;
        };
        match video_index {
            0 => true,
            i => module
                .videos
                .get(i - 1)
                .map(|prev| self.video_fully_complete(snapshot, prev))
                .unwrap_or(false),
        }
    }

    pub fn evaluate(&self, tree: &CourseTree, snapshot: &ProgressSnapshot) -> CourseState {
        let mut modules = Vec::with_capacity(tree.modules.len());
        let mut completed_videos = 0;
        let mut completed_modules = 0;

        for (mi, module) in tree.modules.iter().enumerate() {
            let module_unlocked = self.module_unlocked(snapshot, &tree.modules, mi);
            let mut previous_complete = true;
            let mut videos = Vec::with_capacity(module.videos.len());

            for video in &module.videos {
                let watch_complete = self.video_watch_complete(snapshot, video);
                let quiz_complete = self.quiz_complete(snapshot, video);
                let assignment_complete = self.assignment_complete(snapshot, video);
                let fully_complete = watch_complete && quiz_complete && assignment_complete;
                if fully_complete {
                    completed_videos += 1;
                }

                videos.push(VideoState {
                    video_id: video.id,
                    title: video.title.clone(),
                    order_index: video.order_index,
                    unlocked: module_unlocked && previous_complete,
                    watch_complete,
                    quiz_complete,
                    assignment_complete,
                    fully_complete,
                });
                previous_complete = fully_complete;
            }

            let complete = self.module_complete(snapshot, module);
            if complete {
                completed_modules += 1;
            }
            modules.push(ModuleState {
                module_id: module.id,
                title: module.title.clone(),
                order_index: module.order_index,
                unlocked: module_unlocked,
                complete,
                all_videos_complete: videos.iter().all(|v| v.fully_complete),
                videos,
            });
        }

        let total_videos = tree.total_videos();
        let progress_percentage = if total_videos == 0 {
            0
        } else {
            ((completed_videos * 100) / total_videos) as i32
        };

        CourseState {
            course_id: tree.course_id,
            course_complete: !modules.is_empty() && completed_modules == modules.len(),
            modules,
            total_videos,
            completed_videos,
            completed_modules,
            progress_percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(order_index: i32) -> VideoNode {
        VideoNode {
            id: Uuid::new_v4(),
            title: format!("v{}", order_index),
            order_index,
            question_ids: Vec::new(),
            required_assignment_id: None,
        }
    }

    #[test]
    fn watch_requires_mark_and_threshold() {
        let eval = Evaluator::new(95);
        let v = video(0);
        let mut snap = ProgressSnapshot::default();
        snap.record_watch(v.id, 100, false);
        assert!(!eval.video_watch_complete(&snap, &v));
        snap.record_watch(v.id, 50, true);
        assert!(eval.video_watch_complete(&snap, &v));
    }

    #[test]
    fn below_threshold_is_not_watched() {
        let eval = Evaluator::new(95);
        let v = video(0);
        let mut snap = ProgressSnapshot::default();
        snap.record_watch(v.id, 94, true);
        assert!(!eval.video_watch_complete(&snap, &v));
    }

    #[test]
    fn correct_answer_is_sticky() {
        let q = Uuid::new_v4();
        let mut snap = ProgressSnapshot::default();
        snap.record_answer(q, true);
        snap.record_answer(q, false);
        assert_eq!(snap.answers.get(&q), Some(&true));
    }

    #[test]
    fn threshold_is_clamped() {
        assert_eq!(Evaluator::new(140).watch_threshold(), 100);
        assert_eq!(Evaluator::new(-3).watch_threshold(), 0);
    }
}
