//! # Core Application Logic
//!
//! Everything between a caller's request and the provider adapters.
//! It knows nothing about HTTP or the terminal.
//!
//! ```text
//!     ┌────────────┐      ┌────────────┐
//!     │    CLI     │      │  HTTP API  │
//!     │  (ask)     │      │  (serve)   │
//!     └─────┬──────┘      └─────┬──────┘
//!           └─────────┬─────────┘
//!                     ▼
//!        ┌─────────────────────────┐
//!        │          CORE           │
//!        │  • config               │
//!        │  • credentials (lookup) │
//!        │  • orchestrator         │
//!        └────────────┬────────────┘
//!                     ▼
//!        openai · google · anthropic
//! ```
//!
//! ## Modules
//!
//! - [`config`]: settings with defaults → file → env → CLI precedence
//! - [`credentials`]: the `CredentialStore` boundary
//! - [`orchestrator`]: fan-out, partial failure and reply composition

pub mod config;
pub mod credentials;
pub mod orchestrator;

pub use credentials::{CredentialStore, EnvCredentialStore, StaticCredentialStore};
pub use orchestrator::Orchestrator;
