use serde_json::json;
use tickwatch_core::{PriceAlert, Symbol};

use crate::cli::{AlertsArgs, AlertsCommand};
use crate::error::CliError;

use super::{failure_warnings, CommandResult, Context};

pub async fn run(args: &AlertsArgs, context: &Context) -> Result<CommandResult, CliError> {
    match args.command.as_ref().unwrap_or(&AlertsCommand::Show) {
        AlertsCommand::Show => {
            let views = context.service.alerts(&context.user).await?;
            let warnings = failure_warnings(
                views
                    .iter()
                    .map(|view| (view.symbol.as_str(), view.error.as_ref())),
            );
            Ok(CommandResult::ok(serde_json::to_value(&views)?).with_warnings(warnings))
        }
        AlertsCommand::Set { symbol, target } => {
            let alert = PriceAlert::new(Symbol::parse(symbol)?, *target)?;
            let replaced = context.store.set_alert(&context.user, alert.clone()).await?;
            Ok(CommandResult::ok(json!({ "alert": alert, "replaced": replaced })))
        }
        AlertsCommand::Clear { symbol } => {
            let symbol = Symbol::parse(symbol)?;
            let cleared = context.store.clear_alert(&context.user, &symbol).await?;
            Ok(CommandResult::ok(json!({ "cleared": cleared })))
        }
    }
}
