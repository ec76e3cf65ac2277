//! Cookie keyed, in-memory sessions for axum.
//!
//! [`AxumSessionLayer`] loads the payload of the caller's session (or creates a
//! new one), hands it to handlers as an [`AxumSession`] extractor and stores it
//! back after the response. Idle sessions expire after
//! [`AxumSessionConfig::with_idle_timeout`].

pub mod config;
pub mod layer;
mod service;
pub mod session;
mod session_data;
pub mod session_store;

pub use config::AxumSessionConfig;
pub use layer::AxumSessionLayer;
pub use service::AxumSessionService;
pub use session::AxumSession;
pub use session_store::AxumSessionStore;
