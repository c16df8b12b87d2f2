// Diff scenarios: single-object alters and whole-database pipelines

pub mod alters;
pub mod pipeline;
