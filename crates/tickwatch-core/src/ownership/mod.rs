//! # Ownership Records
//!
//! Per-user watchlists, positions and alerts, behind the [`OwnershipStore`]
//! contract. The aggregation layer only reads; mutations come from the CLI.
//!
//! | Store | Backing |
//! |-------|---------|
//! | [`InMemoryOwnershipStore`] | process memory |
//! | [`JsonFileStore`] | one JSON document keyed by user |
//!
//! Rules shared by every store:
//!
//! - unknown users read as empty collections
//! - watching an already watched symbol is a no-op
//! - a user holds at most one position per symbol
//! - setting an alert replaces any existing alert for that symbol
//! - removing something that is not there is [`OwnershipError::NotFound`]

mod json_file;
mod memory;
mod records;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Symbol, ValidationError};

pub use json_file::JsonFileStore;
pub use memory::InMemoryOwnershipStore;
pub use records::{PortfolioPosition, PriceAlert, WatchlistEntry};

/// Non-empty, trimmed user identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Which per-user collection an operation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Watchlist,
    Portfolio,
    Alerts,
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Watchlist => "watchlist",
            Self::Portfolio => "portfolio",
            Self::Alerts => "alerts",
        })
    }
}

#[derive(Debug, Error)]
pub enum OwnershipError {
    #[error("{symbol} is not in the {collection} of user '{user}'")]
    NotFound {
        user: String,
        collection: Collection,
        symbol: String,
    },

    #[error("user '{user}' already holds a position in {symbol}")]
    DuplicatePosition { user: String, symbol: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("ownership store failure: {message}")]
    Storage { message: String },
}

impl OwnershipError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "ownership.not_found",
            Self::DuplicatePosition { .. } => "ownership.duplicate_position",
            Self::Validation(_) => "ownership.invalid_record",
            Self::Storage { .. } => "ownership.storage",
        }
    }
}

pub type OwnershipFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, OwnershipError>> + Send + 'a>>;

/// Per-user ownership collaborator.
pub trait OwnershipStore: Send + Sync {
    fn watchlist<'a>(&'a self, user: &'a UserId) -> OwnershipFuture<'a, Vec<WatchlistEntry>>;

    fn positions<'a>(&'a self, user: &'a UserId) -> OwnershipFuture<'a, Vec<PortfolioPosition>>;

    fn alerts<'a>(&'a self, user: &'a UserId) -> OwnershipFuture<'a, Vec<PriceAlert>>;

    /// Returns `false` when the symbol was already watched.
    fn add_watch<'a>(&'a self, user: &'a UserId, symbol: Symbol) -> OwnershipFuture<'a, bool>;

    fn remove_watch<'a>(&'a self, user: &'a UserId, symbol: &'a Symbol) -> OwnershipFuture<'a, ()>;

    fn open_position<'a>(
        &'a self,
        user: &'a UserId,
        position: PortfolioPosition,
    ) -> OwnershipFuture<'a, ()>;

    /// Returns the closed position.
    fn close_position<'a>(
        &'a self,
        user: &'a UserId,
        symbol: &'a Symbol,
    ) -> OwnershipFuture<'a, PortfolioPosition>;

    /// Returns the alert it replaced, if any.
    fn set_alert<'a>(
        &'a self,
        user: &'a UserId,
        alert: PriceAlert,
    ) -> OwnershipFuture<'a, Option<PriceAlert>>;

    /// Returns the cleared alert.
    fn clear_alert<'a>(&'a self, user: &'a UserId, symbol: &'a Symbol) -> OwnershipFuture<'a, PriceAlert>;
}

/// Everything one user owns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Holdings {
    #[serde(default)]
    pub watchlist: Vec<WatchlistEntry>,
    #[serde(default)]
    pub positions: Vec<PortfolioPosition>,
    #[serde(default)]
    pub alerts: Vec<PriceAlert>,
}

/// All users' holdings; the unit both stores persist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct OwnershipDocument {
    #[serde(default)]
    pub users: BTreeMap<UserId, Holdings>,
}

impl OwnershipDocument {
    pub fn holdings(&self, user: &UserId) -> Holdings {
        self.users.get(user).cloned().unwrap_or_default()
    }

    pub fn add_watch(&mut self, user: &UserId, symbol: Symbol) -> bool {
        let holdings = self.users.entry(user.clone()).or_default();
        if holdings.watchlist.iter().any(|entry| entry.symbol == symbol) {
            return false;
        }
        holdings.watchlist.push(WatchlistEntry::new(symbol));
        true
    }

    pub fn remove_watch(&mut self, user: &UserId, symbol: &Symbol) -> Result<(), OwnershipError> {
        let watchlist = self
            .users
            .get_mut(user)
            .map(|holdings| &mut holdings.watchlist);
        take_by_symbol(watchlist, symbol, |entry| &entry.symbol)
            .map(|_| ())
            .ok_or_else(|| not_found(user, Collection::Watchlist, symbol))
    }

    pub fn open_position(
        &mut self,
        user: &UserId,
        position: PortfolioPosition,
    ) -> Result<(), OwnershipError> {
        let holdings = self.users.entry(user.clone()).or_default();
        if holdings
            .positions
            .iter()
            .any(|held| held.symbol == position.symbol)
        {
            return Err(OwnershipError::DuplicatePosition {
                user: user.to_string(),
                symbol: position.symbol.to_string(),
            });
        }
        holdings.positions.push(position);
        Ok(())
    }

    pub fn close_position(
        &mut self,
        user: &UserId,
        symbol: &Symbol,
    ) -> Result<PortfolioPosition, OwnershipError> {
        let positions = self
            .users
            .get_mut(user)
            .map(|holdings| &mut holdings.positions);
        take_by_symbol(positions, symbol, |position| &position.symbol)
            .ok_or_else(|| not_found(user, Collection::Portfolio, symbol))
    }

    pub fn set_alert(&mut self, user: &UserId, alert: PriceAlert) -> Option<PriceAlert> {
        let holdings = self.users.entry(user.clone()).or_default();
        match holdings
            .alerts
            .iter_mut()
            .find(|held| held.symbol == alert.symbol)
        {
            Some(held) => Some(std::mem::replace(held, alert)),
            None => {
                holdings.alerts.push(alert);
                None
            }
        }
    }

    pub fn clear_alert(&mut self, user: &UserId, symbol: &Symbol) -> Result<PriceAlert, OwnershipError> {
        let alerts = self.users.get_mut(user).map(|holdings| &mut holdings.alerts);
        take_by_symbol(alerts, symbol, |alert| &alert.symbol)
            .ok_or_else(|| not_found(user, Collection::Alerts, symbol))
    }
}

fn take_by_symbol<T>(
    items: Option<&mut Vec<T>>,
    symbol: &Symbol,
    symbol_of: impl Fn(&T) -> &Symbol,
) -> Option<T> {
    let items = items?;
    let index = items.iter().position(|item| symbol_of(item) == symbol)?;
    Some(items.remove(index))
}

fn not_found(user: &UserId, collection: Collection, symbol: &Symbol) -> OwnershipError {
    OwnershipError::NotFound {
        user: user.to_string(),
        collection,
        symbol: symbol.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn user() -> UserId {
        UserId::parse("alice").expect("valid user")
    }

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[test]
    fn user_ids_are_trimmed_and_non_empty() {
        assert_eq!(UserId::parse("  bob ").expect("valid").as_str(), "bob");
        assert!(matches!(UserId::parse(" "), Err(ValidationError::EmptyUserId)));
    }

    #[test]
    fn watching_twice_keeps_one_entry() {
        let mut document = OwnershipDocument::default();

        assert!(document.add_watch(&user(), symbol("AAPL")));
        assert!(!document.add_watch(&user(), symbol("aapl")));
        assert_eq!(document.holdings(&user()).watchlist.len(), 1);
    }

    #[test]
    fn removing_absent_entries_is_not_found() {
        let mut document = OwnershipDocument::default();

        let error = document
            .remove_watch(&user(), &symbol("AAPL"))
            .expect_err("nothing to remove");
        assert_eq!(error.code(), "ownership.not_found");
        assert!(error.to_string().contains("watchlist"));
    }

    #[test]
    fn set_alert_replaces_existing_target() {
        let mut document = OwnershipDocument::default();
        let first = PriceAlert::new(symbol("TSLA"), dec!(200)).expect("valid");
        let second = PriceAlert::new(symbol("TSLA"), dec!(250)).expect("valid");

        assert_eq!(document.set_alert(&user(), first.clone()), None);
        assert_eq!(document.set_alert(&user(), second), Some(first));

        let alerts = document.holdings(&user()).alerts;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].target_price, dec!(250));
    }

    #[test]
    fn second_position_in_same_symbol_is_rejected() {
        let mut document = OwnershipDocument::default();
        let position = PortfolioPosition::new(symbol("IBM"), dec!(5), dec!(120)).expect("valid");

        document
            .open_position(&user(), position.clone())
            .expect("first open");
        let error = document
            .open_position(&user(), position)
            .expect_err("duplicate");
        assert!(matches!(error, OwnershipError::DuplicatePosition { .. }));
    }
}
