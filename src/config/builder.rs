use tracing::debug;

use crate::config::{merge::Merge, types::*};

/// Layers settings inputs (file, then overrides) over the defaults.
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    input: SettingsInput,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, file_input: SettingsInput) -> Self {
        self.input = self.input.merge(file_input);
        self
    }

    pub fn with_overrides(mut self, overrides: SettingsInput) -> Self {
        self.input = self.input.merge(overrides);
        self
    }

    pub fn resolve(self) -> Settings {
        let defaults = Settings::default();
        let input = self.input;

        let settings = Settings {
            ignore_column_order: input
                .ignore_column_order
                .unwrap_or(defaults.ignore_column_order),
            ignore_privileges: input.ignore_privileges.unwrap_or(defaults.ignore_privileges),
            generate_exists: input.generate_exists.unwrap_or(defaults.generate_exists),
            generate_exists_do_block: input
                .generate_exists_do_block
                .unwrap_or(defaults.generate_exists_do_block),
            drop_if_exists: input.drop_if_exists.unwrap_or(defaults.drop_if_exists),
            concurrently: input.concurrently.unwrap_or(defaults.concurrently),
            print_using: input.print_using.unwrap_or(defaults.print_using),
            comments_to_end: input.comments_to_end.unwrap_or(defaults.comments_to_end),
            script_in_transaction: input
                .script_in_transaction
                .unwrap_or(defaults.script_in_transaction),
            disable_check_function_bodies: input
                .disable_check_function_bodies
                .unwrap_or(defaults.disable_check_function_bodies),
        };
        debug!(?settings, "Resolved settings");
        settings
    }
}
