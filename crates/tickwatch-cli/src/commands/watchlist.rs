use serde_json::json;
use tickwatch_core::Symbol;

use crate::cli::{WatchlistArgs, WatchlistCommand};
use crate::error::CliError;

use super::{failure_warnings, CommandResult, Context};

pub async fn run(args: &WatchlistArgs, context: &Context) -> Result<CommandResult, CliError> {
    match args.command.as_ref().unwrap_or(&WatchlistCommand::Show) {
        WatchlistCommand::Show => {
            let views = context.service.watchlist(&context.user).await?;
            let warnings = failure_warnings(
                views
                    .iter()
                    .map(|view| (view.symbol.as_str(), view.error.as_ref())),
            );
            Ok(CommandResult::ok(serde_json::to_value(&views)?).with_warnings(warnings))
        }
        WatchlistCommand::Add { symbol } => {
            let symbol = Symbol::parse(symbol)?;
            let added = context.store.add_watch(&context.user, symbol.clone()).await?;
            Ok(CommandResult::ok(json!({ "symbol": symbol, "added": added })))
        }
        WatchlistCommand::Remove { symbol } => {
            let symbol = Symbol::parse(symbol)?;
            context.store.remove_watch(&context.user, &symbol).await?;
            Ok(CommandResult::ok(json!({ "symbol": symbol, "removed": true })))
        }
    }
}
