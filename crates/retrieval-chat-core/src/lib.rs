pub mod chat;
pub mod config;
pub mod error;
pub mod retrieval;
pub mod session;
pub mod state;
pub mod window;

// Re-export main types for convenience
pub use chat::{ChatSession, PendingQuery, Submission};
pub use config::Config;
pub use error::{ConfigError, RetrievalError};
pub use retrieval::{Citation, RetrievalClient, SearchParams, SearchResponse, SearchType};
pub use session::SessionId;
pub use state::{ChatMessage, ChatRole, MessageId, MessageStatus};
pub use window::{DragState, HitTarget, PointerEvent, WindowChrome, Zoom};
