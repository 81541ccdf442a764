//! Record set snapshot
//!
//! The only writer of the listing. A full `load` is the single refresh
//! primitive; a failed load leaves nothing displayable.

use crate::api::SchoolApi;
use crate::error::{DirectoryError, Result};
use school_directory_common::Record;
use tracing::{error, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ListingState {
    #[default]
    Unloaded,
    Loading,
    Ready(Vec<Record>),
    Failed(String),
}

#[derive(Debug, Default)]
pub struct ListingStore {
    state: ListingState,
    loads: u64,
}

impl ListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the complete record set, replacing the current snapshot
    pub async fn load<A: SchoolApi>(&mut self, api: &A) -> Result<&[Record]> {
        self.state = ListingState::Loading;
        self.loads += 1;

        match api.fetch_schools().await {
            Ok(records) => {
                info!(count = records.len(), "listing loaded");
                self.state = ListingState::Ready(records);
                Ok(self.records())
            }
            Err(e) => {
                error!("listing fetch failed: {}", e);
                self.state = ListingState::Failed(e.message.clone());
                Err(DirectoryError::FetchFailed(e.message))
            }
        }
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    /// Current records; empty unless the last load succeeded
    pub fn records(&self) -> &[Record] {
        match &self.state {
            ListingState::Ready(records) => records,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ListingState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ListingState::Ready(_))
    }

    /// Number of loads started so far
    pub fn loads(&self) -> u64 {
        self.loads
    }
}
