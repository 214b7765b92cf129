use std::sync::Arc;

use tokio::sync::RwLock;

use super::{
    OwnershipDocument, OwnershipFuture, OwnershipStore, PortfolioPosition, PriceAlert, UserId,
    WatchlistEntry,
};
use crate::Symbol;

/// Process-local store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOwnershipStore {
    inner: Arc<RwLock<OwnershipDocument>>,
}

impl InMemoryOwnershipStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OwnershipStore for InMemoryOwnershipStore {
    fn watchlist<'a>(&'a self, user: &'a UserId) -> OwnershipFuture<'a, Vec<WatchlistEntry>> {
        Box::pin(async move { Ok(self.inner.read().await.holdings(user).watchlist) })
    }

    fn positions<'a>(&'a self, user: &'a UserId) -> OwnershipFuture<'a, Vec<PortfolioPosition>> {
        Box::pin(async move { Ok(self.inner.read().await.holdings(user).positions) })
    }

    fn alerts<'a>(&'a self, user: &'a UserId) -> OwnershipFuture<'a, Vec<PriceAlert>> {
        Box::pin(async move { Ok(self.inner.read().await.holdings(user).alerts) })
    }

    fn add_watch<'a>(&'a self, user: &'a UserId, symbol: Symbol) -> OwnershipFuture<'a, bool> {
        Box::pin(async move { Ok(self.inner.write().await.add_watch(user, symbol)) })
    }

    fn remove_watch<'a>(&'a self, user: &'a UserId, symbol: &'a Symbol) -> OwnershipFuture<'a, ()> {
        Box::pin(async move { self.inner.write().await.remove_watch(user, symbol) })
    }

    fn open_position<'a>(
        &'a self,
        user: &'a UserId,
        position: PortfolioPosition,
    ) -> OwnershipFuture<'a, ()> {
        Box::pin(async move { self.inner.write().await.open_position(user, position) })
    }

    fn close_position<'a>(
        &'a self,
        user: &'a UserId,
        symbol: &'a Symbol,
    ) -> OwnershipFuture<'a, PortfolioPosition> {
        Box::pin(async move { self.inner.write().await.close_position(user, symbol) })
    }

    fn set_alert<'a>(
        &'a self,
        user: &'a UserId,
        alert: PriceAlert,
    ) -> OwnershipFuture<'a, Option<PriceAlert>> {
        Box::pin(async move { Ok(self.inner.write().await.set_alert(user, alert)) })
    }

    fn clear_alert<'a>(&'a self, user: &'a UserId, symbol: &'a Symbol) -> OwnershipFuture<'a, PriceAlert> {
        Box::pin(async move { self.inner.write().await.clear_alert(user, symbol) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ownership::OwnershipError;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn unknown_users_read_as_empty() {
        let store = InMemoryOwnershipStore::new();
        let user = UserId::parse("nobody").expect("valid user");

        assert!(store.watchlist(&user).await.expect("read").is_empty());
        assert!(store.positions(&user).await.expect("read").is_empty());
        assert!(store.alerts(&user).await.expect("read").is_empty());
    }

    #[tokio::test]
    async fn users_are_isolated_from_each_other() {
        let store = InMemoryOwnershipStore::new();
        let alice = UserId::parse("alice").expect("valid user");
        let bob = UserId::parse("bob").expect("valid user");
        let aapl = Symbol::parse("AAPL").expect("valid symbol");

        store.add_watch(&alice, aapl.clone()).await.expect("add");
        store
            .open_position(
                &alice,
                PortfolioPosition::new(aapl.clone(), dec!(1), dec!(1)).expect("valid"),
            )
            .await
            .expect("open");

        assert!(store.watchlist(&bob).await.expect("read").is_empty());
        let error = store
            .close_position(&bob, &aapl)
            .await
            .expect_err("bob holds nothing");
        assert!(matches!(error, OwnershipError::NotFound { .. }));
        assert_eq!(store.positions(&alice).await.expect("read").len(), 1);
    }
}
