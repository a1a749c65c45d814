//! Full-screen chat session: terminal setup, key routing, and the event loop.

mod event_loop;
mod keybindings;
mod lifecycle;

pub use event_loop::run_chat;
