//! Client-side case workspace for the Avukat AI legal assistant.
//!
//! For a single legal case, the workspace coordinates three concurrently
//! evolving streams — the retrieval-augmented chat conversation, the
//! document upload/indexing lifecycle, and template draft generation —
//! under one asynchronous, optimistic-update, tabbed session. The backend
//! that stores cases and answers questions is an external HTTP service
//! consumed through [`api::ApiClient`].

pub mod api;
pub mod config;
pub mod error;
pub mod workspace;
