use crate::cli::QuoteArgs;
use crate::error::CliError;

use super::{CommandResult, Context};

pub async fn run(args: &QuoteArgs, context: &Context) -> Result<CommandResult, CliError> {
    let quotes = context
        .service
        .aggregator()
        .resolve_tickers(&args.symbols)
        .await;

    let warnings = quotes
        .iter()
        .filter_map(|quote| {
            quote
                .failure()
                .map(|failure| format!("{}: {failure}", quote.symbol))
        })
        .collect::<Vec<_>>();

    Ok(CommandResult::ok(serde_json::to_value(&quotes)?).with_warnings(warnings))
}
