//! Lumiera is a full-screen terminal chat client for hosted generative AI
//! models.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns runtime state: users, chat sessions, the model catalog,
//!   the conversation reducer, and background vendor requests.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives user input and display updates.
//! - [`api`] defines the wire payloads exchanged with the model service.
//! - [`cli`] parses arguments and dispatches into the UI or one-shot
//!   commands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
