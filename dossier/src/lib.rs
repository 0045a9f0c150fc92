//! dossier — a self-hostable document query service.
//!
//! Documents are uploaded (`POST /upload`) and ingested: text is extracted
//! per format, chunked into overlapping windows, embedded, and indexed for
//! vector search. Queries (`POST /query`) retrieve the top-k chunks and
//! synthesize a grounded summary plus an ordered list of recommendations,
//! returning source filenames and a token-usage breakdown.
//!
//! See [`config::Config`] for the environment the service reads.

pub mod api;
pub mod config;
pub mod db;
pub mod embeddings;
pub mod error;
pub mod llm;
pub mod models;
pub mod processing;
pub mod services;
