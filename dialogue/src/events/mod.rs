//! Dialogue events and the bus that carries them.
//!
//! The controller publishes one event per accepted move, per appended
//! statement, per skipped turn and at session start and end. Observers
//! (renderers, loggers, the CLI) subscribe without affecting the dialogue.

pub mod bus;
pub mod types;

pub use bus::{EventBus, SessionReceiver, SharedEventBus};
pub use types::DialogueEvent;
