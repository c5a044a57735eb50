//! Dialogue sessions — the state machine and its drivers.
//!
//! ```text
//!                 challenge/rebut (no target)
//!  AwaitingMove ─────────────────────────────▶ AwaitingMoveTarget
//!     ▲  │                                       │ target
//!     │  │ challenge(target)                     ├──────────────▶ ComposingRebuttal
//!     │  ▼                                       │ (rebut)            │ text
//!  AwaitingJustificationSelection ◀──────────────┘ (challenge)        │
//!     │ justify / skip                                                │
//!     └──────────────▶ AwaitingMove(other side) ◀─────────────────────┘
//!
//!  accept (any phase) / both sides out of turns / abandon ──▶ Ended
//! ```
//!
//! [`DialogueController`] owns one [`SessionState`] and applies
//! [`Command`]s to it. [`LiveSession`] wraps a controller with its turn
//! clock for interactive use.

pub mod command;
pub mod controller;
pub mod error;
pub mod live;
pub mod state;

pub use command::{Command, Outcome};
pub use controller::DialogueController;
pub use error::{DialogueError, ErrorCategory, IllegalMove};
pub use live::LiveSession;
pub use state::{EndReason, Phase, SessionState, TargetKind};
