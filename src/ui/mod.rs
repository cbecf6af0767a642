//! Terminal UI layer for interactive chat sessions.
//!
//! - [`chat_loop`]: the event loop that turns input into app actions and
//!   runs their side effects.
//! - [`renderer`] and [`markdown`]: frame composition.
//! - [`theme`]: color policy.
//!
//! This layer presents and captures interaction state; [`crate::core`]
//! owns the domain logic.

pub mod chat_loop;
pub mod markdown;
pub mod renderer;
pub mod theme;
