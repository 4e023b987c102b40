//! Success/failure algebra for composing execution results.
//!
//! [`CommandOutcome`] is a monoid under [`Monoid::combine`]: successes
//! merge their subjects, any failure absorbs a success, and two
//! failures concatenate their messages newline-joined. The identity
//! element is a success carrying no subject, which makes folding an
//! empty batch of actions well-defined.

use std::fmt;

use crate::report::Subject;
use crate::target::Continuation;

/// A type with an associative combine operation and an identity
/// element.
///
/// Implementations must uphold, for all `a`, `b`, `c`:
/// `combine(combine(a, b), c) == combine(a, combine(b, c))` and
/// `combine(identity(), a) == a == combine(a, identity())`.
pub trait Monoid: Sized {
    /// The identity element.
    fn identity() -> Self;

    /// Combine two values.
    fn combine(self, other: Self) -> Self;
}

/// The outcome of running one or more actions.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Execution succeeded, optionally with a reportable subject.
    Success(Option<Subject>),
    /// Execution failed with a message.
    Failure(String),
}

impl CommandOutcome {
    /// Merge a second outcome into this one.
    ///
    /// Subjects of two successes are appended; a failure absorbs any
    /// success; two failures join their messages with a newline so a
    /// multi-action report enumerates every failure.
    pub fn append(self, second: CommandOutcome) -> CommandOutcome {
        use CommandOutcome::{Failure, Success};
        match (self, second) {
            (Success(Some(left)), Success(Some(right))) => Success(Some(left.append(right))),
            (Success(Some(left)), Success(None)) => Success(Some(left)),
            (Success(None), Success(Some(right))) => Success(Some(right)),
            (Success(None), Success(None)) => Success(None),
            (Success(_), Failure(message)) => Failure(message),
            (Failure(message), Success(_)) => Failure(message),
            (Failure(first), Failure(second)) => Failure(format!("{}\n{}", first, second)),
        }
    }

    /// Whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success(_))
    }
}

impl Monoid for CommandOutcome {
    fn identity() -> Self {
        CommandOutcome::Success(None)
    }

    fn combine(self, other: Self) -> Self {
        self.append(other)
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Success(_) => write!(f, "Success"),
            CommandOutcome::Failure(message) => write!(f, "Failure '{}'", message),
        }
    }
}

/// The full result of one runner invocation: an outcome plus the
/// continuations of any operations still running.
#[derive(Debug)]
pub struct CommandResult {
    pub outcome: CommandOutcome,
    pub continuations: Vec<Continuation>,
}

impl CommandResult {
    /// A successful result with no continuations.
    pub fn success(subject: Option<Subject>) -> Self {
        Self {
            outcome: CommandOutcome::Success(subject),
            continuations: Vec::new(),
        }
    }

    /// A failed result with no continuations.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            outcome: CommandOutcome::Failure(message.into()),
            continuations: Vec::new(),
        }
    }

    /// Merge a second result into this one.
    ///
    /// Outcomes combine per the outcome algebra; continuation lists
    /// concatenate in order, never dropping a handle.
    pub fn append(self, second: CommandResult) -> CommandResult {
        let mut continuations = self.continuations;
        continuations.extend(second.continuations);
        CommandResult {
            outcome: self.outcome.append(second.outcome),
            continuations,
        }
    }
}

impl Monoid for CommandResult {
    fn identity() -> Self {
        CommandResult::success(None)
    }

    fn combine(self, other: Self) -> Self {
        self.append(other)
    }
}
