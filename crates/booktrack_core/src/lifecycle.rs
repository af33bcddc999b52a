//! Reading lifecycle state machine.
//!
//! # Responsibility
//! - Decide which target state each command may produce.
//! - Compute the timestamps each transition stamps.
//!
//! # Invariants
//! - `start` always produces `Reading` and stamps `started_at`.
//! - `finish` only targets `Finished` or `Dnf`, stamps `finished_at`, and
//!   treats `Finished`/`Dnf` as terminal.
//! - `add` and `update` accept any target state. `update` can move a
//!   terminal record back to any state; `finish` cannot re-finish it.
//! - Existence preconditions are enforced by `guard`, not here.

use crate::model::book::ReadingState;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Commands that create or mutate a record's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleCommand {
    Add,
    Start,
    Finish,
    Update,
}

impl LifecycleCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Start => "start",
            Self::Finish => "finish",
            Self::Update => "update",
        }
    }
}

impl Display for LifecycleCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    InvalidStateForTransition {
        command: LifecycleCommand,
        /// Current stored state; `None` when the record does not exist yet.
        from: Option<ReadingState>,
        requested: ReadingState,
    },
}

impl Display for TransitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStateForTransition {
                command,
                from: Some(from),
                requested,
            } => write!(
                f,
                "cannot {command} a book from state {from} into state {requested}"
            ),
            Self::InvalidStateForTransition {
                command,
                from: None,
                requested,
            } => write!(f, "cannot {command} a new book into state {requested}"),
        }
    }
}

impl Error for TransitionError {}

/// State and timestamps written by one transition.
///
/// `None` timestamps leave the stored value untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: ReadingState,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
}

/// Returns whether `command` may move a record from `from` to `to`.
///
/// `from == None` means the record does not exist yet.
pub fn is_legal(command: LifecycleCommand, from: Option<ReadingState>, to: ReadingState) -> bool {
    match command {
        LifecycleCommand::Start => to == ReadingState::Reading,
        LifecycleCommand::Finish => {
            matches!(to, ReadingState::Finished | ReadingState::Dnf)
                && !from.is_some_and(ReadingState::is_terminal)
        }
        LifecycleCommand::Add | LifecycleCommand::Update => true,
    }
}

/// Checks `is_legal` and reports the rejected transition.
pub fn check_transition(
    command: LifecycleCommand,
    from: Option<ReadingState>,
    to: ReadingState,
) -> Result<(), TransitionError> {
    if is_legal(command, from, to) {
        Ok(())
    } else {
        Err(TransitionError::InvalidStateForTransition {
            command,
            from,
            requested: to,
        })
    }
}

/// `start`: new record in `Reading`, started at `started_at` or `now`.
pub fn start_transition(started_at: Option<i64>, now: i64) -> Transition {
    Transition {
        state: ReadingState::Reading,
        started_at: Some(started_at.unwrap_or(now)),
        finished_at: None,
    }
}

/// `finish`: existing record in `current` moves to `Finished` or the
/// explicit `requested` state, finished at `finished_at` or `now`.
pub fn finish_transition(
    current: ReadingState,
    requested: Option<ReadingState>,
    finished_at: Option<i64>,
    now: i64,
) -> Result<Transition, TransitionError> {
    let target = requested.unwrap_or(ReadingState::Finished);
    check_transition(LifecycleCommand::Finish, Some(current), target)?;
    Ok(Transition {
        state: target,
        started_at: None,
        finished_at: Some(finished_at.unwrap_or(now)),
    })
}

/// `add`: backfill with any state (default `None`) and the given timestamps.
///
/// No start-before-finish ordering is enforced.
pub fn add_transition(
    state: Option<ReadingState>,
    started_at: Option<i64>,
    finished_at: Option<i64>,
) -> Transition {
    Transition {
        state: state.unwrap_or_default(),
        started_at,
        finished_at,
    }
}
