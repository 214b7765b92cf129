use serde::Serialize;
use tickwatch_core::{PricePoint, Symbol};

use crate::cli::SeriesArgs;
use crate::error::CliError;

use super::{CommandResult, Context};

#[derive(Debug, Serialize)]
struct SeriesResponseData<'a> {
    symbol: &'a Symbol,
    name: Option<String>,
    points: &'a [PricePoint],
}

pub async fn run(args: &SeriesArgs, context: &Context) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let lookup = context.provider.fetch_series(&symbol).await?;

    let data = serde_json::to_value(SeriesResponseData {
        symbol: &symbol,
        name: lookup.name,
        points: lookup.series.tail(args.limit),
    })?;
    Ok(CommandResult::ok(data))
}
