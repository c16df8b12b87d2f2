use crate::config::types::*;

/// Trait for merging optional settings values; the later layer wins.
pub trait Merge<T> {
    fn merge(self, other: T) -> T;
}

impl<T> Merge<Option<T>> for Option<T> {
    fn merge(self, other: Option<T>) -> Option<T> {
        other.or(self)
    }
}

impl Merge<SettingsInput> for SettingsInput {
    fn merge(self, other: SettingsInput) -> SettingsInput {
        SettingsInput {
            ignore_column_order: self.ignore_column_order.merge(other.ignore_column_order),
            ignore_privileges: self.ignore_privileges.merge(other.ignore_privileges),
            generate_exists: self.generate_exists.merge(other.generate_exists),
            generate_exists_do_block: self
                .generate_exists_do_block
                .merge(other.generate_exists_do_block),
            drop_if_exists: self.drop_if_exists.merge(other.drop_if_exists),
            concurrently: self.concurrently.merge(other.concurrently),
            print_using: self.print_using.merge(other.print_using),
            comments_to_end: self.comments_to_end.merge(other.comments_to_end),
            script_in_transaction: self
                .script_in_transaction
                .merge(other.script_in_transaction),
            disable_check_function_bodies: self
                .disable_check_function_bodies
                .merge(other.disable_check_function_bodies),
        }
    }
}
