//! Listing view: store + filter + carousel
//!
//! Every load and every criteria change recomputes the visible subset and
//! re-syncs the carousel to it.

use crate::api::SchoolApi;
use crate::carousel::CarouselScheduler;
use crate::error::Result;
use crate::listing::ListingStore;
use school_directory_common::{
    badge_counts, filter_records, option_counts, BadgeCounts, FilterCriteria, ImageReference,
    OptionCounts, Record, RecordId,
};
use std::time::Duration;

pub struct ListingView {
    store: ListingStore,
    criteria: FilterCriteria,
    carousel: CarouselScheduler,
}

impl ListingView {
    pub fn new(carousel_interval: Duration) -> Self {
        Self {
            store: ListingStore::new(),
            criteria: FilterCriteria::default(),
            carousel: CarouselScheduler::new(carousel_interval),
        }
    }

    /// Fetch the record set (initial mount or refresh)
    pub async fn load<A: SchoolApi>(&mut self, api: &A) -> Result<()> {
        let result = self.store.load(api).await.map(|_| ());
        self.resync();
        result
    }

    fn resync(&mut self) {
        let visible = filter_records(self.store.records(), &self.criteria);
        self.carousel.sync(visible);
    }

    pub fn store(&self) -> &ListingStore {
        &self.store
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_name_query(&mut self, query: impl Into<String>) {
        self.criteria.name_query = query.into();
        self.resync();
    }

    pub fn set_city(&mut self, city: Option<String>) {
        self.criteria.city = city;
        self.resync();
    }

    pub fn set_state(&mut self, state: Option<String>) {
        self.criteria.state = state;
        self.resync();
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.resync();
    }

    /// Clear search, city and state in one step
    pub fn reset_filters(&mut self) {
        self.criteria.reset();
        self.resync();
    }

    pub fn visible(&self) -> Vec<&Record> {
        filter_records(self.store.records(), &self.criteria)
    }

    pub fn option_counts(&self) -> OptionCounts {
        option_counts(self.store.records())
    }

    pub fn badges(&self) -> BadgeCounts {
        badge_counts(&self.visible(), &self.criteria)
    }

    pub fn error(&self) -> Option<&str> {
        self.store.error()
    }

    pub fn carousel(&self) -> &CarouselScheduler {
        &self.carousel
    }

    pub fn carousel_mut(&mut self) -> &mut CarouselScheduler {
        &mut self.carousel
    }

    pub fn next_image(&mut self, record: RecordId) -> Option<usize> {
        self.carousel.next(record)
    }

    pub fn prev_image(&mut self, record: RecordId) -> Option<usize> {
        self.carousel.prev(record)
    }

    pub fn current_image<'a>(&self, record: &'a Record) -> Option<&'a ImageReference> {
        self.carousel.current_image(record)
    }
}
