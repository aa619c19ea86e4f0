pub mod chat;
pub mod turn_record;

pub use chat::{ChatMessage, ChatTurn, Role, SessionId};
pub use turn_record::{ConversationTurnRecord, SessionConversations};
