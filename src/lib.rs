//! Framemerge: Frame-Chain Video Merging
//!
//! Resolves the chain of frames leading to a selected frame on a canvas, collects
//! the clips generated along that chain, and drives a single merge of those clips
//! through an external merge service.

pub mod config;
pub mod delivery;
pub mod error;
pub mod graph;
pub mod logging;
pub mod merge;
pub mod notify;
pub mod path;
pub mod sequence;
pub mod tooling;
pub mod types;
