pub mod chat_service;
pub mod conversation_store;
pub mod llm_service;
pub mod pinecone;
pub mod response_generator;
pub mod session;
pub mod vector_index;

pub use chat_service::{ChatOutcome, ChatService, NoticeLevel, StartupNotice};
pub use conversation_store::ConversationStore;
pub use llm_service::{CompletionProvider, LlmService};
pub use pinecone::{PineconeClient, PineconeIndex};
pub use response_generator::{PromptBuilder, ResponseGenerator};
pub use session::{SessionState, SessionStore};
pub use vector_index::VectorIndex;
