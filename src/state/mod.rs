/// State management module
///
/// This module handles all session state, including:
/// - Shared data structures (data.rs)
/// - The session controller and its transitions (session.rs)
/// - The append-only feedback journal (journal.rs)

pub mod data;
pub mod journal;
pub mod session;
