//! Core data model: actions, commands, identifiers, and the outcome
//! algebra that composes execution results.

pub mod action;
pub mod outcome;
pub mod types;
