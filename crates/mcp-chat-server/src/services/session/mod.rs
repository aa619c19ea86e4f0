//! Process-local chat sessions.
//!
//! One entry per browser session: an opaque id plus the ordered turns shown in
//! the chat pane. Nothing here is persisted.

mod store;
mod types;

pub use store::SessionStore;
pub use types::SessionState;
