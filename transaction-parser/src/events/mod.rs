//! Decoding of the program's `Program data:` events.

mod pad_event;

pub use pad_event::*;
