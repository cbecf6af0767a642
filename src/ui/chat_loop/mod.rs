//! Terminal chat interface: event loop, key handling and side effects.

mod event_loop;
mod executor;
mod keybindings;
mod lifecycle;

pub use event_loop::{run_chat, ChatOptions};
