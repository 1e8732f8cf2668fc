pub mod client;
pub mod types;

pub use client::RetrievalClient;
pub use types::{Citation, HistoryResponse, SearchParams, SearchResponse, SearchType};
