//! Application layer for Tether.
//!
//! Coordinates the domain types of `tether-core` with the collaborators of
//! `tether-infrastructure` to implement the client session lifecycle.

pub mod session;
pub mod texts;

pub use session::{SessionController, SessionFactory};
