//! keysync translation core
//!
//! Translates raw platform keyboard events into the canonical event stream
//! consumed by a UI runtime, keeping a derived picture of pressed keys and
//! enabled lock modes consistent with the hardware's declared modifier
//! bitmask by synthesizing corrective events.
//!
//! The entry point is [`EventTranslator`]: feed it [`RawKeyEvent`]s, give
//! it an [`EventSink`] to dispatch [`KeyEvent`]s into, and await each
//! [`EventDisposition`] for the runtime's "handled" verdict.

mod error;
mod event;
mod records;
pub mod resolver;
mod sink;
mod stage;
mod translator;

pub use error::{SinkError, TranslateError};
pub use event::{KeyEvent, KeyEventKind, RawKeyEvent};
pub use sink::{AckSender, EventAck, EventSink};
pub use stage::LockStage;
pub use translator::{EventDisposition, EventTranslator, LockPolarity};
