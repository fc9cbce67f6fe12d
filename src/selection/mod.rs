//! Turns pointer gestures into a committed rectangle or lasso selection.

pub mod machine;

use serde::{Deserialize, Serialize};

use crate::error::{AppResult, ValidationError};
use crate::geometry::{
    bounds_from_polygon, normalize_rectangle, Bounds, Point, MIN_LASSO_POINTS, MIN_RECTANGLE_SIZE,
};

pub use machine::{GestureError, GestureEvent, GestureMachine, GestureState, GestureTransition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    #[default]
    Rectangle,
    Lasso,
}

/// A committed selection. `bounds` is always the envelope of `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    mode: SelectionMode,
    path: Vec<Point>,
    bounds: Bounds,
}

impl Selection {
    pub fn rectangle(bounds: Bounds) -> Self {
        Self {
            mode: SelectionMode::Rectangle,
            path: bounds.corners().to_vec(),
            bounds,
        }
    }

    /// Closed polygon selection; `None` when fewer than three points were recorded.
    pub fn lasso(points: Vec<Point>) -> Option<Self> {
        if points.len() < MIN_LASSO_POINTS {
            return None;
        }
        let bounds = bounds_from_polygon(&points)?;
        Some(Self {
            mode: SelectionMode::Lasso,
            path: points,
            bounds,
        })
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn path(&self) -> &[Point] {
        &self.path
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

#[derive(Debug, Default)]
pub struct SelectionEngine {
    machine: GestureMachine,
    gesture_mode: SelectionMode,
    points: Vec<Point>,
    live_path: Vec<Point>,
    live_bounds: Option<Bounds>,
    selection: Option<Selection>,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.machine.state()
    }

    pub fn is_drawing(&self) -> bool {
        self.machine.state() == GestureState::Drawing
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.selection.as_ref().map(Selection::bounds)
    }

    /// Outline of the gesture in progress, for overlay rendering.
    pub fn live_path(&self) -> Option<&[Point]> {
        (self.is_drawing() && !self.live_path.is_empty()).then_some(self.live_path.as_slice())
    }

    pub fn live_bounds(&self) -> Option<Bounds> {
        self.live_bounds.filter(|_| self.is_drawing())
    }

    /// Starts a gesture, silently dropping the preview of any gesture still running.
    pub fn begin(&mut self, mode: SelectionMode, point: Point) -> Result<(), GestureError> {
        if self.is_drawing() {
            self.cancel();
        }
        self.machine.transition(GestureEvent::Begin)?;
        self.gesture_mode = mode;
        self.points.clear();
        self.points.push(point);
        self.live_path.clear();
        self.live_bounds = None;
        if mode == SelectionMode::Lasso {
            self.live_path.push(point);
        }
        Ok(())
    }

    pub fn extend(&mut self, point: Point) -> Result<(), GestureError> {
        self.machine.transition(GestureEvent::Extend)?;
        match self.gesture_mode {
            SelectionMode::Rectangle => {
                let bounds = self.rectangle_to(point);
                self.live_path = bounds.corners().to_vec();
                self.live_bounds = Some(bounds);
            }
            SelectionMode::Lasso => {
                self.points.push(point);
                self.live_path = self.points.clone();
                self.live_bounds = bounds_from_polygon(&self.live_path);
            }
        }
        Ok(())
    }

    /// Finalizes the running gesture at `point`.
    ///
    /// Too-small gestures are rejected and the previously committed selection,
    /// if any, stays in place.
    pub fn finish(&mut self, point: Point) -> AppResult<Bounds> {
        if !self.is_drawing() {
            return Err(GestureError::InvalidTransition {
                from: self.machine.state(),
                event: GestureEvent::Commit,
            }
            .into());
        }

        let candidate = match self.gesture_mode {
            SelectionMode::Rectangle => {
                let bounds = self.rectangle_to(point);
                if bounds.width < MIN_RECTANGLE_SIZE || bounds.height < MIN_RECTANGLE_SIZE {
                    Err(ValidationError::SelectionTooSmall {
                        width: bounds.width,
                        height: bounds.height,
                    })
                } else {
                    Ok(Selection::rectangle(bounds))
                }
            }
            SelectionMode::Lasso => {
                let count = self.points.len();
                Selection::lasso(std::mem::take(&mut self.points))
                    .ok_or(ValidationError::TooFewLassoPoints { count })
            }
        };

        match candidate {
            Ok(selection) => {
                self.machine.transition(GestureEvent::Commit)?;
                let bounds = selection.bounds();
                tracing::debug!(mode = ?selection.mode(), ?bounds, "selection committed");
                self.selection = Some(selection);
                self.reset_gesture();
                Ok(bounds)
            }
            Err(err) => {
                tracing::warn!(%err, "selection rejected");
                self.machine.transition(GestureEvent::Reject)?;
                self.reset_gesture();
                Err(err.into())
            }
        }
    }

    /// Abandons the running gesture, keeping whatever was committed before it.
    pub fn cancel(&mut self) {
        if self.is_drawing() && self.machine.transition(GestureEvent::Reject).is_ok() {
            self.reset_gesture();
        }
    }

    pub fn clear(&mut self) {
        if self.machine.transition(GestureEvent::Clear).is_ok() {
            self.selection = None;
            self.reset_gesture();
        }
    }

    fn rectangle_to(&self, point: Point) -> Bounds {
        let anchor = self.points.first().copied().unwrap_or(point);
        normalize_rectangle(anchor.x, anchor.y, point.x - anchor.x, point.y - anchor.y)
    }

    fn reset_gesture(&mut self) {
        self.points.clear();
        self.live_path.clear();
        self.live_bounds = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn drag_rectangle(
        engine: &mut SelectionEngine,
        from: (f64, f64),
        to: (f64, f64),
    ) -> AppResult<Bounds> {
        engine
            .begin(SelectionMode::Rectangle, Point::new(from.0, from.1))
            .expect("begin should work");
        engine
            .extend(Point::new(to.0, to.1))
            .expect("extend should work");
        engine.finish(Point::new(to.0, to.1))
    }

    #[test]
    fn rectangle_drag_commits_normalized_bounds_and_corner_path() {
        let mut engine = SelectionEngine::new();
        let bounds = drag_rectangle(&mut engine, (150.0, 150.0), (50.0, 50.0))
            .expect("100px drag should commit");
        assert_eq!(bounds, Bounds::new(50, 50, 100, 100));
        assert_eq!(engine.state(), GestureState::Committed);

        let selection = engine.selection().expect("selection should exist");
        assert_eq!(selection.mode(), SelectionMode::Rectangle);
        assert_eq!(selection.path(), &Bounds::new(50, 50, 100, 100).corners());
        assert!(engine.live_path().is_none());
    }

    #[test]
    fn small_rectangle_is_rejected_and_prior_selection_is_kept() {
        let mut engine = SelectionEngine::new();
        drag_rectangle(&mut engine, (10.0, 10.0), (60.0, 60.0)).expect("first drag commits");
        let before = engine.selection().cloned();

        let err = drag_rectangle(&mut engine, (100.0, 100.0), (104.0, 180.0))
            .expect_err("4px wide drag should be rejected");
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::SelectionTooSmall { width: 4, .. })
        ));
        assert_eq!(engine.selection().cloned(), before);
        assert_eq!(engine.state(), GestureState::Committed);
    }

    #[test]
    fn small_rectangle_without_prior_selection_returns_to_idle() {
        let mut engine = SelectionEngine::new();
        assert!(drag_rectangle(&mut engine, (0.0, 0.0), (30.0, 4.4)).is_err());
        assert_eq!(engine.state(), GestureState::Idle);
        assert!(engine.selection().is_none());
    }

    #[test]
    fn rectangle_preview_follows_pointer() {
        let mut engine = SelectionEngine::new();
        engine
            .begin(SelectionMode::Rectangle, Point::new(20.0, 20.0))
            .expect("begin");
        assert!(engine.live_path().is_none());
        engine.extend(Point::new(5.0, 40.0)).expect("extend");
        assert_eq!(engine.live_bounds(), Some(Bounds::new(5, 20, 15, 20)));
        assert_eq!(engine.live_path().map(<[Point]>::len), Some(4));
    }

    #[test]
    fn lasso_rebuilds_live_path_and_commits_polygon() {
        let mut engine = SelectionEngine::new();
        engine
            .begin(SelectionMode::Lasso, Point::new(10.0, 10.0))
            .expect("begin");
        engine.extend(Point::new(40.0, 12.0)).expect("extend");
        assert_eq!(engine.live_path().map(<[Point]>::len), Some(2));
        engine.extend(Point::new(25.0, 44.5)).expect("extend");
        assert_eq!(engine.live_path().map(<[Point]>::len), Some(3));

        let bounds = engine
            .finish(Point::new(0.0, 0.0))
            .expect("three points should commit");
        assert_eq!(bounds, Bounds::new(10, 10, 30, 35));
        let selection = engine.selection().expect("selection should exist");
        assert_eq!(selection.mode(), SelectionMode::Lasso);
        assert_eq!(selection.path().len(), 3);
    }

    #[test]
    fn lasso_with_fewer_than_three_points_is_rejected() {
        for extra_points in 0..2_u32 {
            let mut engine = SelectionEngine::new();
            engine
                .begin(SelectionMode::Lasso, Point::new(1.0, 1.0))
                .expect("begin");
            for step in 0..extra_points {
                engine
                    .extend(Point::new(10.0 + f64::from(step), 20.0))
                    .expect("extend");
            }
            let err = engine
                .finish(Point::new(50.0, 50.0))
                .expect_err("short lasso should be rejected");
            assert!(matches!(
                err,
                AppError::Validation(ValidationError::TooFewLassoPoints { count }) if count == (extra_points + 1) as usize
            ));
            assert!(engine.selection().is_none());
        }
    }

    #[test]
    fn new_gesture_discards_running_preview() {
        let mut engine = SelectionEngine::new();
        engine
            .begin(SelectionMode::Lasso, Point::new(0.0, 0.0))
            .expect("begin");
        engine.extend(Point::new(9.0, 9.0)).expect("extend");
        engine
            .begin(SelectionMode::Rectangle, Point::new(50.0, 50.0))
            .expect("second begin should cancel the first");
        assert!(engine.live_path().is_none());
        let bounds = engine
            .finish(Point::new(70.0, 80.0))
            .expect("rectangle should commit");
        assert_eq!(bounds, Bounds::new(50, 50, 20, 30));
    }

    #[test]
    fn clear_drops_selection() {
        let mut engine = SelectionEngine::new();
        drag_rectangle(&mut engine, (0.0, 0.0), (20.0, 20.0)).expect("commit");
        engine.clear();
        assert!(engine.selection().is_none());
        assert_eq!(engine.state(), GestureState::Idle);
    }

    #[test]
    fn finish_without_gesture_is_an_invalid_transition() {
        let mut engine = SelectionEngine::new();
        assert!(matches!(
            engine.finish(Point::new(1.0, 1.0)),
            Err(AppError::Gesture(GestureError::InvalidTransition { .. }))
        ));
    }
}
