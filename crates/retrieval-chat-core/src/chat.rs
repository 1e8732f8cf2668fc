//! Request/response lifecycle of one chat session
//!
//! `ChatSession` owns the transcript and the single in-flight query slot.
//! It never performs I/O itself: `submit` hands back a [`PendingQuery`] for the
//! caller to run (see [`run_query`]) and the result is fed back through
//! [`ChatSession::resolve`].

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::RetrievalError;
use crate::retrieval::{RetrievalClient, SearchParams, SearchResponse};
use crate::session::SessionId;
use crate::state::{ChatMessage, ChatRole, MessageId, MessageStatus};

/// A query that has been accepted and is waiting for the retrieval service.
#[derive(Debug, Clone)]
pub struct PendingQuery {
    /// Placeholder message this query resolves
    pub id: MessageId,
    pub query: String,
    pub cancel: CancellationToken,
}

/// Outcome of [`ChatSession::submit`].
#[derive(Debug)]
pub enum Submission {
    /// Blank input; nothing changed
    Ignored,
    /// Another query is still pending; nothing changed
    Busy,
    Dispatched(PendingQuery),
}

pub struct ChatSession {
    session_id: SessionId,
    messages: Vec<ChatMessage>,
    pending: Option<(MessageId, CancellationToken)>,
    next_id: u64,
    scroll_requested: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_session_id(SessionId::generate())
    }

    pub fn with_session_id(session_id: SessionId) -> Self {
        Self {
            session_id,
            messages: Vec::new(),
            pending: None,
            next_id: 0,
            scroll_requested: false,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn submit(&mut self, text: &str) -> Submission {
        let query = text.trim();
        if query.is_empty() {
            return Submission::Ignored;
        }
        if self.pending.is_some() {
            return Submission::Busy;
        }

        let user_id = self.allocate_id();
        self.messages.push(ChatMessage::user(user_id, query));

        let placeholder_id = self.allocate_id();
        self.messages.push(ChatMessage::placeholder(placeholder_id));

        let cancel = CancellationToken::new();
        self.pending = Some((placeholder_id, cancel.clone()));
        self.scroll_requested = true;

        Submission::Dispatched(PendingQuery {
            id: placeholder_id,
            query: query.to_string(),
            cancel,
        })
    }

    /// Fill the placeholder `id` with a result.
    ///
    /// Returns false when `id` is not the pending placeholder any more (the
    /// transcript was cleared while the request was in flight); the result is
    /// then dropped.
    pub fn resolve(&mut self, id: MessageId, result: Result<SearchResponse, RetrievalError>) -> bool {
        match &self.pending {
            Some((pending_id, _)) if *pending_id == id => {}
            _ => return false,
        }
        self.pending = None;

        let Some(message) = self
            .messages
            .iter_mut()
            .find(|m| m.id == id && m.role == ChatRole::Assistant)
        else {
            return false;
        };

        match result {
            Ok(response) => {
                message.content = response.answer;
                message.citations = response.citations.unwrap_or_default();
                message.status = MessageStatus::Complete;
            }
            Err(err) => {
                message.content = format!("Error: {}", err);
                message.citations.clear();
                message.status = MessageStatus::Failed;
            }
        }

        self.scroll_requested = true;
        true
    }

    /// Drop every message and cancel the in-flight query, if any.
    ///
    /// The returned token is the cancelled query's, for callers that track it.
    pub fn clear(&mut self) -> Option<CancellationToken> {
        self.messages.clear();
        self.scroll_requested = true;
        self.pending.take().map(|(_, cancel)| {
            cancel.cancel();
            cancel
        })
    }

    /// True once after any transcript change the view should scroll to.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `pending` against the retrieval service.
pub async fn run_query(
    client: &RetrievalClient,
    session_id: &SessionId,
    params: &SearchParams,
    pending: &PendingQuery,
) -> Result<SearchResponse, RetrievalError> {
    let result = client
        .search(session_id, &pending.query, params, &pending.cancel)
        .await;
    if let Err(err) = &result {
        warn!(id = pending.id.0, error = %err, "search failed");
    }
    result
}

/// Best-effort remote history clear. Failures are logged and swallowed.
pub async fn clear_remote(client: &RetrievalClient, session_id: &SessionId) {
    match client.clear_history(session_id).await {
        Ok(()) => info!(session = %session_id, "remote history cleared"),
        Err(err) => warn!(session = %session_id, error = %err, "error clearing chat history"),
    }
}
