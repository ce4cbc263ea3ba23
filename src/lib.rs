//! Screenplay Graph — character co-occurrence graphs from screenplays.
//!
//! Splits screenplay text into scenes on `INT.`/`EXT.` headings, detects
//! which known characters appear in each scene, accumulates a weighted
//! co-occurrence graph, and renders it colored by narrative role.

pub mod config;
pub mod core;
pub mod schema;
