use serde_json::json;
use tickwatch_core::{PortfolioPosition, Symbol};

use crate::cli::{PortfolioArgs, PortfolioCommand};
use crate::error::CliError;

use super::{failure_warnings, CommandResult, Context};

pub async fn run(args: &PortfolioArgs, context: &Context) -> Result<CommandResult, CliError> {
    match args.command.as_ref().unwrap_or(&PortfolioCommand::Show) {
        PortfolioCommand::Show => {
            let views = context.service.portfolio(&context.user).await?;
            let warnings = failure_warnings(
                views
                    .iter()
                    .map(|view| (view.symbol.as_str(), view.error.as_ref())),
            );
            Ok(CommandResult::ok(serde_json::to_value(&views)?).with_warnings(warnings))
        }
        PortfolioCommand::Open {
            symbol,
            quantity,
            price,
        } => {
            let position = PortfolioPosition::new(Symbol::parse(symbol)?, *quantity, *price)?;
            context
                .store
                .open_position(&context.user, position.clone())
                .await?;
            Ok(CommandResult::ok(json!({ "opened": position })))
        }
        PortfolioCommand::Close { symbol } => {
            let symbol = Symbol::parse(symbol)?;
            let closed = context.store.close_position(&context.user, &symbol).await?;
            Ok(CommandResult::ok(json!({ "closed": closed })))
        }
    }
}
