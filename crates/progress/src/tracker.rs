//! Progress tracking over a course snapshot.
//!
//! Every function here is pure: updates return a new `Course` and leave the
//! input untouched, so callers can swap the result in as a whole value.

use std::sync::Arc;
use chrono::{DateTime, Utc};
use coursetrack_core::{Course, CoreError, LessonId, ModuleId, Position};

/// Completion percentage of a course in [0, 100].
///
/// A course without lessons is 0% complete.
pub fn compute_progress_percent(course: &Course) -> f32 {
    let total = course.total_lessons();
    let percentage = if total > 0 {
        (course.completed_lessons() as f32 / total as f32) * 100.0
    } else {
        0.0
    };
    percentage.clamp(0.0, 100.0)
}

/// Result of a completion mutation.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Course after the mutation (the input itself when nothing changed)
    pub course: Arc<Course>,

    /// Completion percentage of `course`
    pub percent: f32,

    /// Whether the lesson was newly completed
    pub changed: bool,
}

/// Mark the lesson at `position` completed.
///
/// Completing an already completed lesson is a no-op that hands back the
/// same course value.
pub fn mark_complete(course: &Arc<Course>, position: Position) -> Result<Completion, CoreError> {
    let lesson = course.lesson_at(position).ok_or(CoreError::OutOfRange {
        module_index: position.module_index,
        lesson_index: position.lesson_index,
    })?;

    if lesson.progress.completed {
        return Ok(Completion {
            course: Arc::clone(course),
            percent: compute_progress_percent(course),
            changed: false,
        });
    }

    let now = Utc::now();
    let updated = course.update_lesson(position, |l| {
        l.progress.mark_completed(now);
    })?;
    let percent = compute_progress_percent(&updated);

    Ok(Completion {
        course: Arc::new(updated),
        percent,
        changed: true,
    })
}

/// Apply a playback report to the lesson with `lesson_id`.
///
/// Returns `None` when the lesson is not part of `course`, e.g. after the
/// course was replaced by a fetch.
pub fn apply_playback(course: &Course, lesson_id: &LessonId, seconds: u64) -> Option<Course> {
    let position = course.position_of(lesson_id)?;
    course
        .update_lesson(position, |l| {
            let duration = l.duration;
            l.progress.record_playback(seconds, duration);
        })
        .ok()
}

/// A snapshot of course progress at a point in time.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    /// When snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Overall percentage (0-100)
    pub percentage: f32,

    /// Completed lessons
    pub completed_lessons: usize,

    /// Total lessons
    pub total_lessons: usize,

    /// Progress by module, in course order
    pub modules: Vec<ModuleProgress>,
}

/// Progress of a single module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleProgress {
    /// Module id
    pub module_id: ModuleId,

    /// Completed lessons
    pub completed_lessons: usize,

    /// Total lessons
    pub total_lessons: usize,

    /// Percentage complete (0-100)
    pub percentage: f32,
}

/// Take a progress snapshot of `course`.
pub fn snapshot(course: &Course) -> ProgressSnapshot {
    let modules = course
        .modules
        .iter()
        .map(|module| {
            let total = module.lessons.len();
            let completed = module.lessons.iter().filter(|l| l.progress.completed).count();
            let percentage = if total > 0 {
                (completed as f32 / total as f32) * 100.0
            } else {
                0.0
            };
            ModuleProgress {
                module_id: module.id.clone(),
                completed_lessons: completed,
                total_lessons: total,
                percentage,
            }
        })
        .collect();

    ProgressSnapshot {
        timestamp: Utc::now(),
        percentage: compute_progress_percent(course),
        completed_lessons: course.completed_lessons(),
        total_lessons: course.total_lessons(),
        modules,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use coursetrack_core::{Course, CourseId, Lesson, LessonId, LessonType, Module, ModuleId, Progress};

    pub fn course(layout: &[&[&str]]) -> Course {
        Course {
            id: CourseId::new("c1"),
            slug: "course-one".to_string(),
            title: "Course One".to_string(),
            modules: layout
                .iter()
                .enumerate()
                .map(|(m, lessons)| Module {
                    id: ModuleId::new(format!("m{}", m + 1)),
                    title: format!("Module {}", m + 1),
                    lessons: lessons
                        .iter()
                        .map(|id| Lesson {
                            id: LessonId::new(*id),
                            title: id.to_uppercase(),
                            kind: LessonType::Video,
                            content_url: None,
                            duration: Some(600),
                            progress: Progress::default(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Module A holds L1 and L2, module B holds L3.
    pub fn three_lessons() -> Course {
        course(&[&["l1", "l2"], &["l3"]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::fixtures;

    #[test]
    fn test_percent_of_empty_course_is_zero() {
        let course = fixtures::course(&[]);
        assert_eq!(compute_progress_percent(&course), 0.0);

        let course = fixtures::course(&[&[]]);
        let percent = compute_progress_percent(&course);
        assert!(!percent.is_nan());
        assert_eq!(percent, 0.0);
    }

    #[test]
    fn test_percent_matches_ratio() {
        let mut course = fixtures::course(&[&["a", "b", "c"], &["d", "e", "f", "g"]]);
        for (m, l) in [(0, 0), (1, 2), (1, 3)] {
            course.modules[m].lessons[l].progress.completed = true;
        }

        let expected = 3.0 / 7.0 * 100.0;
        assert!((compute_progress_percent(&course) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_mark_complete_updates_copy() {
        let course = Arc::new(fixtures::three_lessons());

        let completion = mark_complete(&course, Position::new(0, 0)).unwrap();

        assert!(completion.changed);
        assert!((completion.percent - 33.333).abs() < 0.01);
        let progress = &completion.course.modules[0].lessons[0].progress;
        assert!(progress.completed);
        assert!(progress.completed_at.is_some());
        assert!(!course.modules[0].lessons[0].progress.completed);
    }

    #[test]
    fn test_mark_complete_is_idempotent() {
        let course = Arc::new(fixtures::three_lessons());

        let once = mark_complete(&course, Position::new(0, 1)).unwrap();
        let twice = mark_complete(&once.course, Position::new(0, 1)).unwrap();

        assert!(!twice.changed);
        assert!(Arc::ptr_eq(&once.course, &twice.course));
        assert_eq!(once.percent, twice.percent);
    }

    #[test]
    fn test_mark_complete_out_of_range() {
        let course = Arc::new(fixtures::three_lessons());

        let err = mark_complete(&course, Position::new(1, 1)).unwrap_err();
        assert_eq!(err, CoreError::OutOfRange { module_index: 1, lesson_index: 1 });
    }

    #[test]
    fn test_apply_playback_targets_lesson_by_id() {
        let course = fixtures::three_lessons();

        let updated = apply_playback(&course, &LessonId::new("l3"), 42).unwrap();
        assert_eq!(updated.modules[1].lessons[0].progress.last_position, 42);
        assert_eq!(updated.modules[1].lessons[0].progress.watched_seconds, 42);

        assert!(apply_playback(&course, &LessonId::new("gone"), 42).is_none());
    }

    #[test]
    fn test_snapshot_per_module() {
        let mut course = fixtures::three_lessons();
        course.modules[0].lessons[0].progress.completed = true;

        let snap = snapshot(&course);

        assert_eq!(snap.completed_lessons, 1);
        assert_eq!(snap.total_lessons, 3);
        assert_eq!(snap.modules.len(), 2);
        assert_eq!(snap.modules[0].percentage, 50.0);
        assert_eq!(snap.modules[1].percentage, 0.0);
    }
}
