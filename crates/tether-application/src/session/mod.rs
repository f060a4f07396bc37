//! Session application services.
//!
//! The session controller drives the login / connect / refresh lifecycle;
//! the factory wires it to the production collaborators.

mod controller;
mod factory;
mod refresh_timer;

#[cfg(test)]
mod test_support;

pub use controller::SessionController;
pub use factory::{CredentialBackend, SessionFactory};
pub use refresh_timer::RefreshTimer;
