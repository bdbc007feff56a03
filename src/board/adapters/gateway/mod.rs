//! Chat-completion gateway adapters.

mod http;

pub use http::HttpChatCompletionClient;
