//! Lifecycle of a single change request

/// What the assistant is doing right now. At most one request is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkState {
    #[default]
    Idle,
    /// Reading site files and waiting for the model.
    Fetching,
    /// Writing the proposed files back.
    Applying,
}

/// Why a submission was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyInstruction,
    Busy(WorkState),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::EmptyInstruction => write!(f, "instruction is empty"),
            Rejection::Busy(state) => write!(f, "a request is already in progress ({:?})", state),
        }
    }
}

impl WorkState {
    pub fn is_working(&self) -> bool {
        !matches!(self, WorkState::Idle)
    }

    /// Check whether `instruction` may start a new request, returning the
    /// trimmed instruction. Does not change the state.
    pub fn accepts(&self, instruction: &str) -> Result<String, Rejection> {
        if self.is_working() {
            return Err(Rejection::Busy(*self));
        }
        let trimmed = instruction.trim();
        if trimmed.is_empty() {
            return Err(Rejection::EmptyInstruction);
        }
        Ok(trimmed.to_string())
    }

    /// Idle → Fetching.
    pub fn begin(&mut self, instruction: &str) -> Result<String, Rejection> {
        let accepted = self.accepts(instruction)?;
        *self = WorkState::Fetching;
        Ok(accepted)
    }

    /// Fetching → Applying. Returns false from any other state.
    pub fn start_applying(&mut self) -> bool {
        if *self == WorkState::Fetching {
            *self = WorkState::Applying;
            true
        } else {
            false
        }
    }

    /// Any state → Idle.
    pub fn finish(&mut self) {
        *self = WorkState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(WorkState::default(), WorkState::Idle);
        assert!(!WorkState::Idle.is_working());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut state = WorkState::Idle;

        assert_eq!(state.begin("  make it blue  ").unwrap(), "make it blue");
        assert_eq!(state, WorkState::Fetching);
        assert!(state.is_working());

        assert!(state.start_applying());
        assert_eq!(state, WorkState::Applying);

        state.finish();
        assert_eq!(state, WorkState::Idle);
    }

    #[test]
    fn test_empty_instruction_is_rejected() {
        let mut state = WorkState::Idle;
        assert_eq!(state.begin(""), Err(Rejection::EmptyInstruction));
        assert_eq!(state.begin(" \n\t "), Err(Rejection::EmptyInstruction));
        assert_eq!(state, WorkState::Idle);
    }

    #[test]
    fn test_busy_state_rejects_submission() {
        let mut state = WorkState::Fetching;
        assert_eq!(
            state.begin("another change"),
            Err(Rejection::Busy(WorkState::Fetching))
        );
        assert_eq!(state, WorkState::Fetching);

        let mut state = WorkState::Applying;
        assert_eq!(
            state.begin("another change"),
            Err(Rejection::Busy(WorkState::Applying))
        );
    }

    #[test]
    fn test_start_applying_only_from_fetching() {
        let mut state = WorkState::Idle;
        assert!(!state.start_applying());
        assert_eq!(state, WorkState::Idle);

        let mut state = WorkState::Applying;
        assert!(!state.start_applying());
    }

    #[test]
    fn test_finish_from_fetching() {
        let mut state = WorkState::Fetching;
        state.finish();
        assert_eq!(state, WorkState::Idle);
    }
}
