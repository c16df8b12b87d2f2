use crate::config::types::*;

impl Default for Settings {
    fn default() -> Self {
        Self {
            ignore_column_order: false,
            ignore_privileges: false,
            generate_exists: false,
            generate_exists_do_block: false,
            drop_if_exists: false,
            concurrently: false,
            print_using: true,
            comments_to_end: false,
            script_in_transaction: false,
            disable_check_function_bodies: false,
        }
    }
}
