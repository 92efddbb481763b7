//! HTTP boundary: the JSON request/response contract and a server exposing it.

pub mod server;
pub mod types;

pub use server::{AppState, router, serve};
pub use types::{ChatRequest, ChatResponse, ErrorResponse};
