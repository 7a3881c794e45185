//! Tests for the multi-endpoint fallback client, organized into:
//!
//! - **ordering**: endpoints are tried in order until one answers
//! - **caching**: responses are cached per payload with per-operation TTLs

mod caching;
mod ordering;
