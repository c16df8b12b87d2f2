use std::fmt;

use crate::catalog::statement::Statement;

pub type Trigger = Statement<TriggerBody>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
    /// MS SQL `FOR`.
    For,
}

impl fmt::Display for TriggerTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TriggerTiming::Before => "BEFORE",
            TriggerTiming::After => "AFTER",
            TriggerTiming::InsteadOf => "INSTEAD OF",
            TriggerTiming::For => "FOR",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
    Truncate,
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TriggerEvent::Insert => "INSERT",
            TriggerEvent::Update => "UPDATE",
            TriggerEvent::Delete => "DELETE",
            TriggerEvent::Truncate => "TRUNCATE",
        })
    }
}

/// Firing state of a trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TriggerState {
    #[default]
    Enabled,
    Disabled,
    /// PG `ENABLE REPLICA`.
    Replica,
    /// PG `ENABLE ALWAYS`.
    Always,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriggerBody {
    pub timing: TriggerTiming,
    pub events: Vec<TriggerEvent>,
    pub state: TriggerState,
    pub flavor: TriggerFlavor,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TriggerFlavor {
    Pg(PgTrigger),
    Ms(MsTrigger),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PgTrigger {
    /// Function call, e.g. `audit.log_change('users')`.
    pub function: String,
    pub for_each_row: bool,
    pub update_columns: Vec<String>,
    pub when: Option<String>,
    pub constraint: bool,
    pub deferrable: bool,
    pub initially_deferred: bool,
    pub old_table: Option<String>,
    pub new_table: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MsTrigger {
    /// Statement text after `AS`.
    pub body: String,
    pub ansi_nulls: bool,
    pub quoted_identifier: bool,
    pub not_for_replication: bool,
    /// `WITH` options such as `EXECUTE AS CALLER`.
    pub options: Vec<String>,
}

impl Default for MsTrigger {
    fn default() -> Self {
        Self {
            body: String::new(),
            ansi_nulls: true,
            quoted_identifier: true,
            not_for_replication: false,
            options: Vec::new(),
        }
    }
}

impl TriggerBody {
    pub fn pg(timing: TriggerTiming, events: Vec<TriggerEvent>, function: impl Into<String>) -> Self {
        Self {
            timing,
            events,
            state: TriggerState::Enabled,
            flavor: TriggerFlavor::Pg(PgTrigger {
                function: function.into(),
                for_each_row: true,
                ..PgTrigger::default()
            }),
        }
    }

    pub fn ms(timing: TriggerTiming, events: Vec<TriggerEvent>, body: impl Into<String>) -> Self {
        Self {
            timing,
            events,
            state: TriggerState::Enabled,
            flavor: TriggerFlavor::Ms(MsTrigger {
                body: body.into(),
                ..MsTrigger::default()
            }),
        }
    }

    pub fn pg_attrs(&self) -> Option<&PgTrigger> {
        match &self.flavor {
            TriggerFlavor::Pg(pg) => Some(pg),
            TriggerFlavor::Ms(_) => None,
        }
    }

    pub fn ms_attrs(&self) -> Option<&MsTrigger> {
        match &self.flavor {
            TriggerFlavor::Ms(ms) => Some(ms),
            TriggerFlavor::Pg(_) => None,
        }
    }

    pub fn pg_attrs_mut(&mut self) -> Option<&mut PgTrigger> {
        match &mut self.flavor {
            TriggerFlavor::Pg(pg) => Some(pg),
            TriggerFlavor::Ms(_) => None,
        }
    }

    pub fn ms_attrs_mut(&mut self) -> Option<&mut MsTrigger> {
        match &mut self.flavor {
            TriggerFlavor::Ms(ms) => Some(ms),
            TriggerFlavor::Pg(_) => None,
        }
    }

    /// Everything but the firing state.
    pub fn same_definition(&self, other: &TriggerBody) -> bool {
        self.timing == other.timing && self.events == other.events && self.flavor == other.flavor
    }
}
