//! GigaChat API plumbing.
//!
//! # Example
//!
//! ```ignore
//! use gigachat::provider::{ChatClient, ChatParams, ClientOptions, HttpClient, DEFAULT_CHAT_URL};
//!
//! let http = HttpClient::new(&ClientOptions::default())?;
//! let chat = ChatClient::new(http, DEFAULT_CHAT_URL, ChatParams::default(), tokens);
//! let reply = chat.send_request("Hello").await?;
//! ```

mod error;
pub mod gigachat;
pub mod http;

pub use error::{Error, format_api_error};
pub use gigachat::{ChatClient, ChatParams, DEFAULT_CHAT_URL};
pub use http::{ClientOptions, HttpClient};
