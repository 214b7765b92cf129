//! # Domain Models
//!
//! Canonical market-data types shared by the provider client, resolver and
//! views.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, uppercase ticker |
//! | [`PricePoint`] | One daily close |
//! | [`PriceSeries`] | Ascending daily closes for one symbol |
//!
//! All constructors validate their invariants, so a `PriceSeries` in hand is
//! always sorted with unique dates and non-negative prices.

mod price;
mod symbol;

pub use price::{PricePoint, PriceSeries};
pub use symbol::Symbol;
