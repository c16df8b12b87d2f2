// Integration tests for ddlsync

pub mod helpers;
pub mod properties;
pub mod scenarios;
pub mod snapshots;
