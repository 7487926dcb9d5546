//! Read-only navigation and lookups over a course snapshot.
//!
//! Modules without lessons are skipped when stepping between modules, so
//! every position produced here addresses an existing lesson.

use crate::course::{Course, Lesson};
use crate::error::{CoreError, Result};
use crate::id::LessonId;
use crate::position::Position;

impl Course {
    /// Lesson at `position`, or `None` when out of range.
    pub fn lesson_at(&self, position: Position) -> Option<&Lesson> {
        self.modules
            .get(position.module_index)?
            .lessons
            .get(position.lesson_index)
    }

    /// Total number of lessons across all modules.
    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// Number of lessons the current user has completed.
    pub fn completed_lessons(&self) -> usize {
        self.lessons().filter(|(_, l)| l.progress.completed).count()
    }

    /// All lessons in navigation order with their positions.
    pub fn lessons(&self) -> impl Iterator<Item = (Position, &Lesson)> + '_ {
        self.modules.iter().enumerate().flat_map(|(m, module)| {
            module
                .lessons
                .iter()
                .enumerate()
                .map(move |(l, lesson)| (Position::new(m, l), lesson))
        })
    }

    /// Check that the indices address an existing lesson.
    pub fn validate(&self, module_index: usize, lesson_index: usize) -> Result<Position> {
        let position = Position::new(module_index, lesson_index);
        match self.lesson_at(position) {
            Some(_) => Ok(position),
            None => Err(CoreError::OutOfRange { module_index, lesson_index }),
        }
    }

    /// Position of the first lesson, `None` when the course is empty.
    pub fn first_position(&self) -> Option<Position> {
        self.lessons().next().map(|(p, _)| p)
    }

    /// Position of the first lesson not yet completed.
    pub fn first_incomplete_position(&self) -> Option<Position> {
        self.lessons()
            .find(|(_, l)| !l.progress.completed)
            .map(|(p, _)| p)
    }

    /// Find a lesson by id.
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons().find(|(_, l)| &l.id == id).map(|(_, l)| l)
    }

    /// Find the position of a lesson by id.
    pub fn position_of(&self, id: &LessonId) -> Option<Position> {
        self.lessons().find(|(_, l)| &l.id == id).map(|(p, _)| p)
    }

    /// Position after `position`, `None` at the last lesson or when
    /// `position` is out of range.
    pub fn next_position(&self, position: Position) -> Option<Position> {
        let module = self.modules.get(position.module_index)?;
        if position.lesson_index >= module.lessons.len() {
            return None;
        }
        if position.lesson_index + 1 < module.lessons.len() {
            return Some(Position::new(position.module_index, position.lesson_index + 1));
        }
        self.modules
            .iter()
            .enumerate()
            .skip(position.module_index + 1)
            .find(|(_, m)| !m.lessons.is_empty())
            .map(|(m, _)| Position::new(m, 0))
    }

    /// Position before `position`, `None` at the first lesson or when
    /// `position` is out of range.
    pub fn previous_position(&self, position: Position) -> Option<Position> {
        self.lesson_at(position)?;
        if position.lesson_index > 0 {
            return Some(Position::new(position.module_index, position.lesson_index - 1));
        }
        self.modules[..position.module_index]
            .iter()
            .enumerate()
            .rev()
            .find(|(_, m)| !m.lessons.is_empty())
            .map(|(m, module)| Position::new(m, module.lessons.len() - 1))
    }

    /// Whether a lesson follows `position`.
    pub fn has_next(&self, position: Position) -> bool {
        self.next_position(position).is_some()
    }

    /// Whether a lesson precedes `position`.
    pub fn has_previous(&self, position: Position) -> bool {
        self.previous_position(position).is_some()
    }

    /// Return a copy of the course with the lesson at `position` modified.
    pub fn update_lesson(&self, position: Position, f: impl FnOnce(&mut Lesson)) -> Result<Course> {
        self.validate(position.module_index, position.lesson_index)?;
        let mut updated = self.clone();
        f(&mut updated.modules[position.module_index].lessons[position.lesson_index]);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CourseId, LessonType, Module, ModuleId, Progress};

    fn lesson(id: &str) -> Lesson {
        Lesson {
            id: LessonId::new(id),
            title: id.to_uppercase(),
            kind: LessonType::Video,
            content_url: None,
            duration: Some(600),
            progress: Progress::default(),
        }
    }

    fn module(id: &str, lessons: &[&str]) -> Module {
        Module {
            id: ModuleId::new(id),
            title: id.to_string(),
            lessons: lessons.iter().map(|l| lesson(l)).collect(),
        }
    }

    fn course(modules: Vec<Module>) -> Course {
        Course {
            id: CourseId::new("c1"),
            slug: "c1".to_string(),
            title: "Course".to_string(),
            modules,
        }
    }

    #[test]
    fn test_lesson_lookup_and_counts() {
        let mut c = course(vec![module("a", &["l1", "l2"]), module("b", &["l3"])]);
        c.modules[0].lessons[1].progress.completed = true;

        assert_eq!(c.total_lessons(), 3);
        assert_eq!(c.completed_lessons(), 1);
        assert_eq!(c.lesson_at(Position::new(1, 0)).unwrap().id.as_str(), "l3");
        assert!(c.lesson_at(Position::new(1, 1)).is_none());
        assert!(c.lesson_at(Position::new(2, 0)).is_none());
        assert_eq!(c.position_of(&LessonId::new("l2")), Some(Position::new(0, 1)));
        assert_eq!(c.first_incomplete_position(), Some(Position::new(0, 0)));
    }

    #[test]
    fn test_next_crosses_module_boundary() {
        let c = course(vec![module("a", &["l1", "l2"]), module("b", &["l3"])]);

        assert_eq!(c.next_position(Position::new(0, 0)), Some(Position::new(0, 1)));
        assert_eq!(c.next_position(Position::new(0, 1)), Some(Position::new(1, 0)));
        assert_eq!(c.next_position(Position::new(1, 0)), None);
        assert!(!c.has_next(Position::new(1, 0)));
    }

    #[test]
    fn test_previous_lands_on_last_lesson_of_prior_module() {
        let c = course(vec![module("a", &["l1", "l2"]), module("b", &["l3"])]);

        assert_eq!(c.previous_position(Position::new(1, 0)), Some(Position::new(0, 1)));
        assert_eq!(c.previous_position(Position::new(0, 1)), Some(Position::new(0, 0)));
        assert_eq!(c.previous_position(Position::new(0, 0)), None);
        assert!(!c.has_previous(Position::new(0, 0)));
    }

    #[test]
    fn test_empty_modules_are_skipped() {
        let c = course(vec![module("a", &["l1"]), module("empty", &[]), module("b", &["l2"])]);

        assert_eq!(c.next_position(Position::new(0, 0)), Some(Position::new(2, 0)));
        assert_eq!(c.previous_position(Position::new(2, 0)), Some(Position::new(0, 0)));
    }

    #[test]
    fn test_next_then_previous_round_trips() {
        let c = course(vec![module("a", &["l1", "l2", "l3"]), module("b", &["l4", "l5"])]);

        for (position, _) in c.lessons() {
            if let Some(next) = c.next_position(position) {
                assert_eq!(c.previous_position(next), Some(position));
            }
        }
    }

    #[test]
    fn test_out_of_range_positions() {
        let c = course(vec![module("a", &["l1"]), module("b", &["l2"])]);

        assert_eq!(
            c.validate(5, 0),
            Err(CoreError::OutOfRange { module_index: 5, lesson_index: 0 })
        );
        assert!(c.next_position(Position::new(0, 3)).is_none());
        assert!(c.previous_position(Position::new(4, 0)).is_none());
    }

    #[test]
    fn test_empty_course_has_no_position() {
        let c = course(vec![module("empty", &[])]);

        assert_eq!(c.total_lessons(), 0);
        assert!(c.first_position().is_none());
    }

    #[test]
    fn test_update_lesson_leaves_original_untouched() {
        let c = course(vec![module("a", &["l1"])]);

        let updated = c
            .update_lesson(Position::origin(), |l| l.progress.completed = true)
            .unwrap();

        assert!(!c.modules[0].lessons[0].progress.completed);
        assert!(updated.modules[0].lessons[0].progress.completed);
        assert!(c.update_lesson(Position::new(0, 1), |_| {}).is_err());
    }
}
