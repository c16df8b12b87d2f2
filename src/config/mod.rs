pub mod builder;
pub mod defaults;
pub mod merge;
pub mod types;


pub use builder::SettingsBuilder;
pub use merge::Merge;
pub use types::*;

use anyhow::{Context, Result};

impl SettingsInput {
    /// Parse a YAML settings document. An empty document yields empty input.
    pub fn from_yaml(contents: &str) -> Result<SettingsInput> {
        if contents.trim().is_empty() {
            return Ok(SettingsInput::default());
        }
        serde_yaml::from_str(contents).context("Failed to parse settings YAML")
    }
}
