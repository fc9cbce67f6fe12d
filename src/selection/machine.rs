use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Drawing,
    Committed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    Begin,
    Extend,
    Commit,
    Reject,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureTransition {
    pub from: GestureState,
    pub event: GestureEvent,
    pub to: GestureState,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GestureError {
    #[error("invalid selection transition: from {from:?} using event {event:?}")]
    InvalidTransition {
        from: GestureState,
        event: GestureEvent,
    },
}

#[derive(Debug, Default)]
pub struct GestureMachine {
    state: GestureState,
    /// State to fall back to when the running gesture is rejected.
    resume: GestureState,
    last_transition: Option<GestureTransition>,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn last_transition(&self) -> Option<GestureTransition> {
        self.last_transition
    }

    pub fn can_transition(&self, event: GestureEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: GestureEvent) -> Option<GestureState> {
        use GestureEvent::*;
        match (self.state, event) {
            (GestureState::Idle | GestureState::Committed, Begin) => Some(GestureState::Drawing),
            (GestureState::Drawing, Extend) => Some(GestureState::Drawing),
            (GestureState::Drawing, Commit) => Some(GestureState::Committed),
            (GestureState::Drawing, Reject) => Some(self.resume),
            (_, Clear) => Some(GestureState::Idle),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: GestureEvent) -> Result<GestureState, GestureError> {
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid selection transition requested");
            GestureError::InvalidTransition { from, event }
        })?;

        if next != self.state {
            tracing::debug!(from = ?self.state, event = ?event, to = ?next, "selection transition");
        }
        match event {
            GestureEvent::Begin => self.resume = self.state,
            GestureEvent::Commit => self.resume = GestureState::Committed,
            GestureEvent::Clear => self.resume = GestureState::Idle,
            GestureEvent::Extend | GestureEvent::Reject => {}
        }
        self.last_transition = Some(GestureTransition {
            from: self.state,
            event,
            to: next,
        });
        self.state = next;

        Ok(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_transition_tracks_valid_and_invalid_events() {
        let mut machine = GestureMachine::new();
        assert!(machine.can_transition(GestureEvent::Begin));
        assert!(machine.can_transition(GestureEvent::Clear));
        assert!(!machine.can_transition(GestureEvent::Commit));
        assert!(!machine.can_transition(GestureEvent::Extend));

        machine
            .transition(GestureEvent::Begin)
            .expect("idle -> drawing should transition");
        assert!(machine.can_transition(GestureEvent::Extend));
        assert!(machine.can_transition(GestureEvent::Commit));
        assert!(machine.can_transition(GestureEvent::Reject));
        assert!(!machine.can_transition(GestureEvent::Begin));
    }

    #[test]
    fn reject_returns_to_the_state_before_the_gesture() {
        let mut machine = GestureMachine::new();
        machine.transition(GestureEvent::Begin).expect("begin");
        assert_eq!(
            machine.transition(GestureEvent::Reject).expect("reject"),
            GestureState::Idle
        );

        machine.transition(GestureEvent::Begin).expect("begin");
        machine.transition(GestureEvent::Commit).expect("commit");
        machine.transition(GestureEvent::Begin).expect("begin again");
        machine.transition(GestureEvent::Extend).expect("extend");
        assert_eq!(
            machine.transition(GestureEvent::Reject).expect("reject"),
            GestureState::Committed
        );
    }

    #[test]
    fn clear_resets_from_any_state_and_forgets_prior_commit() {
        let mut machine = GestureMachine::new();
        machine.transition(GestureEvent::Begin).expect("begin");
        machine.transition(GestureEvent::Commit).expect("commit");
        machine.transition(GestureEvent::Clear).expect("clear");
        assert_eq!(machine.state(), GestureState::Idle);

        machine.transition(GestureEvent::Begin).expect("begin");
        machine.transition(GestureEvent::Clear).expect("clear mid-gesture");
        assert_eq!(machine.state(), GestureState::Idle);
        assert_eq!(
            machine.last_transition(),
            Some(GestureTransition {
                from: GestureState::Drawing,
                event: GestureEvent::Clear,
                to: GestureState::Idle,
            })
        );
    }

    #[test]
    fn invalid_transition_returns_error_without_mutating_state() {
        let mut machine = GestureMachine::new();
        let err = machine
            .transition(GestureEvent::Commit)
            .expect_err("idle -> commit should fail");
        assert!(matches!(
            err,
            GestureError::InvalidTransition {
                from: GestureState::Idle,
                event: GestureEvent::Commit
            }
        ));
        assert_eq!(machine.state(), GestureState::Idle);
        assert!(machine.last_transition().is_none());
    }
}
