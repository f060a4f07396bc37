//! Session domain module.
//!
//! # Module Structure
//!
//! - `state`: UI-mode state machine states (`SessionState`)
//! - `message`: transcript entries (`Message`, `MessageOrigin`)
//! - `transcript`: the ordered in-memory message list (`Transcript`)
//! - `event`: inbound events the controller reacts to (`SessionEvent`, `TransportEvent`)
//! - `view`: rendering instructions for the UI surface (`ViewUpdate`)

mod event;
mod message;
mod state;
mod transcript;
mod view;

pub use event::{InboundKind, SessionEvent, TransportEvent};
pub use message::{Message, MessageOrigin};
pub use state::SessionState;
pub use transcript::Transcript;
pub use view::{Section, StatusKind, ViewUpdate};
