use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use super::{
    OwnershipDocument, OwnershipError, OwnershipFuture, OwnershipStore, PortfolioPosition,
    PriceAlert, UserId, WatchlistEntry,
};
use crate::Symbol;

/// Store backed by one JSON document on disk.
///
/// A missing file reads as an empty document. Every mutation is a locked
/// read-modify-write that replaces the file through a sibling temp file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<OwnershipDocument, OwnershipError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Ok(OwnershipDocument::default())
            }
            Err(error) => {
                return Err(OwnershipError::storage(format!(
                    "failed to read '{}': {error}",
                    self.path.display()
                )))
            }
        };

        if raw.trim().is_empty() {
            return Ok(OwnershipDocument::default());
        }

        serde_json::from_str(&raw).map_err(|error| {
            OwnershipError::storage(format!(
                "'{}' is not a valid ownership document: {error}",
                self.path.display()
            ))
        })
    }

    async fn save(&self, document: &OwnershipDocument) -> Result<(), OwnershipError> {
        let body = serde_json::to_string_pretty(document)
            .map_err(|error| OwnershipError::storage(format!("failed to encode document: {error}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                OwnershipError::storage(format!(
                    "failed to create '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, body).await.map_err(|error| {
            OwnershipError::storage(format!("failed to write '{}': {error}", staging.display()))
        })?;
        tokio::fs::rename(&staging, &self.path).await.map_err(|error| {
            OwnershipError::storage(format!(
                "failed to replace '{}': {error}",
                self.path.display()
            ))
        })?;

        debug!(path = %self.path.display(), users = document.users.len(), "ownership document saved");
        Ok(())
    }

    async fn read<R>(
        &self,
        view: impl FnOnce(&OwnershipDocument) -> R,
    ) -> Result<R, OwnershipError> {
        let document = self.load().await?;
        Ok(view(&document))
    }

    async fn mutate<R>(
        &self,
        change: impl FnOnce(&mut OwnershipDocument) -> Result<R, OwnershipError>,
    ) -> Result<R, OwnershipError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load().await?;
        let outcome = change(&mut document)?;
        self.save(&document).await?;
        Ok(outcome)
    }
}

impl OwnershipStore for JsonFileStore {
    fn watchlist<'a>(&'a self, user: &'a UserId) -> OwnershipFuture<'a, Vec<WatchlistEntry>> {
        Box::pin(self.read(move |document| document.holdings(user).watchlist))
    }

    fn positions<'a>(&'a self, user: &'a UserId) -> OwnershipFuture<'a, Vec<PortfolioPosition>> {
        Box::pin(self.read(move |document| document.holdings(user).positions))
    }

    fn alerts<'a>(&'a self, user: &'a UserId) -> OwnershipFuture<'a, Vec<PriceAlert>> {
        Box::pin(self.read(move |document| document.holdings(user).alerts))
    }

    fn add_watch<'a>(&'a self, user: &'a UserId, symbol: Symbol) -> OwnershipFuture<'a, bool> {
        Box::pin(self.mutate(move |document| Ok(document.add_watch(user, symbol))))
    }

    fn remove_watch<'a>(&'a self, user: &'a UserId, symbol: &'a Symbol) -> OwnershipFuture<'a, ()> {
        Box::pin(self.mutate(move |document| document.remove_watch(user, symbol)))
    }

    fn open_position<'a>(
        &'a self,
        user: &'a UserId,
        position: PortfolioPosition,
    ) -> OwnershipFuture<'a, ()> {
        Box::pin(self.mutate(move |document| document.open_position(user, position)))
    }

    fn close_position<'a>(
        &'a self,
        user: &'a UserId,
        symbol: &'a Symbol,
    ) -> OwnershipFuture<'a, PortfolioPosition> {
        Box::pin(self.mutate(move |document| document.close_position(user, symbol)))
    }

    fn set_alert<'a>(
        &'a self,
        user: &'a UserId,
        alert: PriceAlert,
    ) -> OwnershipFuture<'a, Option<PriceAlert>> {
        Box::pin(self.mutate(move |document| Ok(document.set_alert(user, alert))))
    }

    fn clear_alert<'a>(&'a self, user: &'a UserId, symbol: &'a Symbol) -> OwnershipFuture<'a, PriceAlert> {
        Box::pin(self.mutate(move |document| document.clear_alert(user, symbol)))
    }
}
