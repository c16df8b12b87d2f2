use std::hash::{Hash, Hasher};

use crate::catalog::statement::Statement;

pub type Statistics = Statement<StatisticsBody>;

/// MS SQL `CREATE STATISTICS` object.
///
/// `parent_has_data` is table state, not definition, and takes no part in
/// equality or hashing. Only [`StatisticsBody::compare_sample`] reads it.
#[derive(Debug, Clone, Eq)]
pub struct StatisticsBody {
    pub columns: Vec<String>,
    pub filter: Option<String>,
    pub sample_percent: Option<u8>,
    pub norecompute: bool,
    pub incremental: bool,
    /// Whether the owning table holds rows. Sample settings are meaningless
    /// on an empty table.
    pub parent_has_data: bool,
}

impl StatisticsBody {
    fn key(&self) -> (&[String], Option<&str>, Option<u8>, bool, bool) {
        (
            &self.columns,
            self.filter.as_deref(),
            self.sample_percent,
            self.norecompute,
            self.incremental,
        )
    }

    pub fn on<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            filter: None,
            sample_percent: None,
            norecompute: false,
            incremental: false,
            parent_has_data: true,
        }
    }

    /// Sample settings are equal when they match or when neither side's
    /// table holds any data.
    pub fn compare_sample(&self, other: &StatisticsBody) -> bool {
        if !self.parent_has_data && !other.parent_has_data {
            return true;
        }
        self.sample_percent == other.sample_percent
    }
}

impl PartialEq for StatisticsBody {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Hash for StatisticsBody {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}
