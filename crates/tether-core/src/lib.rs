//! Domain model for the Tether chat client.
//!
//! Holds the session state machine types, the error taxonomy, and the
//! interfaces of the external collaborators (auth API, credential store,
//! real-time transport). Implementations live in `tether-infrastructure`.

pub mod auth;
pub mod config;
pub mod credentials;
pub mod error;
pub mod session;
pub mod transport;

pub use error::{AuthError, Result, SessionError};
