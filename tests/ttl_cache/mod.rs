//! Tests for the TTL cache, organized into:
//!
//! - **expiry**: per-entry TTL, lazy and background removal
//! - **eviction**: bounded size and oldest-first eviction
//! - **concurrency**: shared handles, cache-aside without de-duplication

mod concurrency;
mod eviction;
mod expiry;
