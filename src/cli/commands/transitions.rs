use anyhow::Result;

use super::{print_json, Command};
use crate::state_machine::TransitionTable;

pub struct TransitionsCommand {
    table: TransitionTable,
}

impl TransitionsCommand {
    pub fn new() -> Self {
        Self {
            table: TransitionTable::bundle_lifecycle(),
        }
    }
}

impl Default for TransitionsCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for TransitionsCommand {
    async fn execute(&self) -> Result<()> {
        print_json(&self.table)
    }
}
