//! Current-position state machine.

use std::sync::Arc;
use coursetrack_core::{CoreError, Course, CourseId, LessonId, Position};
use tracing::debug;

/// Video player collaborator.
///
/// The player owns its transient error/loading flags; the controller only
/// tells it when they must be dropped.
pub trait PlayerHandle: Send + Sync {
    /// Clear playback error and loading state.
    fn reset_transient_state(&self);
}

/// Where to place the pointer when a course is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resume {
    /// First lesson of the course
    #[default]
    Start,
    /// First lesson not completed yet, falling back to the first lesson
    FirstIncomplete,
}

/// Holds the current position and applies transitions.
///
/// The position is `None` while no course is loaded or the course has no
/// lessons. Otherwise it always addresses an existing lesson of the course
/// passed to the last `reset_for`.
#[derive(Default)]
pub struct NavigationController {
    position: Option<Position>,
    /// Course and lesson the position points at
    anchor: Option<(CourseId, LessonId)>,
    player: Option<Arc<dyn PlayerHandle>>,
}

impl NavigationController {
    /// Create a controller with no position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the player that receives reset signals.
    pub fn with_player(mut self, player: Arc<dyn PlayerHandle>) -> Self {
        self.player = Some(player);
        self
    }

    /// Replace the attached player.
    pub fn set_player(&mut self, player: Option<Arc<dyn PlayerHandle>>) {
        self.player = player;
    }

    /// Current position.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Position the pointer for a freshly loaded `course`.
    ///
    /// When the course is a new version of the current one and still holds
    /// the current lesson, the pointer follows that lesson. Otherwise the
    /// `resume` strategy picks the lesson.
    pub fn reset_for(&mut self, course: &Course, resume: Resume) -> Option<Position> {
        let kept = self
            .anchor
            .as_ref()
            .filter(|(course_id, _)| *course_id == course.id)
            .and_then(|(_, lesson_id)| course.position_of(lesson_id));
        if let Some(found) = kept {
            if self.position == Some(found) {
                return Some(found);
            }
            return Some(self.transition(course, found));
        }

        let target = match resume {
            Resume::Start => course.first_position(),
            Resume::FirstIncomplete => course
                .first_incomplete_position()
                .or_else(|| course.first_position()),
        };
        match target {
            Some(position) => Some(self.transition(course, position)),
            None => {
                self.clear();
                None
            }
        }
    }

    /// Drop the position, e.g. when the course is unloaded.
    pub fn clear(&mut self) {
        self.position = None;
        self.anchor = None;
    }

    /// Whether the pointer is at the last lesson of the last module.
    pub fn is_terminal(&self, course: &Course) -> bool {
        self.position.map_or(true, |p| !course.has_next(p))
    }

    /// Step forward. Returns the new position, or `None` when there is no
    /// next lesson (the position is left unchanged).
    pub fn next(&mut self, course: &Course) -> Option<Position> {
        let target = course.next_position(self.position?)?;
        Some(self.transition(course, target))
    }

    /// Step backward. Returns the new position, or `None` when there is no
    /// previous lesson (the position is left unchanged).
    pub fn previous(&mut self, course: &Course) -> Option<Position> {
        let target = course.previous_position(self.position?)?;
        Some(self.transition(course, target))
    }

    /// Jump straight to a lesson.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::OutOfRange` and keeps the position when the indices
    /// do not address a lesson of `course`.
    pub fn jump_to(
        &mut self,
        course: &Course,
        module_index: usize,
        lesson_index: usize,
    ) -> Result<Position, CoreError> {
        let target = course.validate(module_index, lesson_index)?;
        Ok(self.transition(course, target))
    }

    fn transition(&mut self, course: &Course, to: Position) -> Position {
        debug!("Navigating {:?} -> {}", self.position.map(|p| p.to_string()), to);
        self.position = Some(to);
        self.anchor = course
            .lesson_at(to)
            .map(|lesson| (course.id.clone(), lesson.id.clone()));
        if let Some(player) = &self.player {
            player.reset_transient_state();
        }
        to
    }
}
