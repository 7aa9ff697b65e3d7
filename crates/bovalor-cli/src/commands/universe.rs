use bovalor_core::universe;
use serde::Serialize;

use crate::cli::Cli;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct UniverseResponseData {
    tickers: Vec<String>,
    count: usize,
}

pub fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let tickers = universe::load(&cli.universe_file)?;

    let data = serde_json::to_value(UniverseResponseData {
        count: tickers.len(),
        tickers: tickers.into_iter().map(String::from).collect(),
    })?;

    Ok(CommandResult::ok(data))
}
