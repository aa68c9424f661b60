use anyhow::Result;
use serde::Serialize;

pub mod config;
pub mod simulate;
pub mod transitions;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Commands print machine-readable JSON on stdout; logs go to stderr
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
