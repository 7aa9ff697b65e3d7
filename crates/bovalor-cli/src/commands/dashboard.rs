use bovalor_core::dashboard::DashboardData;
use bovalor_core::{EnvelopeError, MarketDataSource};

use crate::cli::SeriesArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(
    args: &SeriesArgs,
    source: &dyn MarketDataSource,
) -> Result<CommandResult, CliError> {
    let ticker = super::parse_ticker(&args.ticker)?;
    let range = super::parse_range(args)?;

    let data = DashboardData::load(source, std::slice::from_ref(&ticker)).await;
    let warnings = data.warnings();

    match data.view(&ticker, range) {
        Ok(view) => Ok(CommandResult::ok(serde_json::to_value(view)?).with_warnings(warnings)),
        Err(error) => {
            Ok(CommandResult::fail(EnvelopeError::from(&error)).with_warnings(warnings))
        }
    }
}
