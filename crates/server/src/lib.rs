//! HTTP frontend for the corrective-action deck generator.
//!
//! One route does the work: `POST /generate-pptx` takes a feedback
//! payload and answers with the finished .pptx as a download. `GET
//! /health` exists for monitoring. Everything else lives in deck-core
//! (validation, grouping) and deck-pptx (rendering).

pub mod config;
pub mod routes;

pub use config::ServerConfig;
pub use routes::{router, AppState};
