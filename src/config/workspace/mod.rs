//! Per-workspace settings.

pub mod storage_paths;
