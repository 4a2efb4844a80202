// Conversation Manager: one bounded turn history per application id, driving the
// start → next* → finalize interview protocol over the hosted model.
// The registry owns all session state; the manager never touches the database.

pub mod handlers;
pub mod manager;
pub mod prompts;
pub mod registry;

pub use manager::ConversationManager;
pub use registry::SessionRegistry;
