//! Directory application: submission form plus listing view over one
//! transport

use crate::api::SchoolApi;
use crate::error::Result;
use crate::form::SchoolForm;
use crate::upload::{ScheduledRefresh, UploadCoordinator};
use crate::view::ListingView;
use std::time::Duration;
use tracing::debug;

pub struct Directory<A> {
    api: A,
    form: SchoolForm,
    listing: ListingView,
    refresh_delay: Duration,
    pending_refresh: Option<ScheduledRefresh>,
}

impl<A: SchoolApi> Directory<A> {
    pub fn new(api: A, carousel_interval: Duration, refresh_delay: Duration) -> Self {
        Self {
            api,
            form: SchoolForm::new(),
            listing: ListingView::new(carousel_interval),
            refresh_delay,
            pending_refresh: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn form(&self) -> &SchoolForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SchoolForm {
        &mut self.form
    }

    pub fn listing(&self) -> &ListingView {
        &self.listing
    }

    pub fn listing_mut(&mut self) -> &mut ListingView {
        &mut self.listing
    }

    /// Initial listing fetch
    pub async fn mount(&mut self) -> Result<()> {
        self.listing.load(&self.api).await
    }

    /// Submit the form.
    ///
    /// On success the listing refresh is scheduled and returned. The
    /// listing is not reloaded until the caller runs [`Directory::settle`];
    /// callers must do so before reading the listing again.
    pub async fn submit(&mut self) -> Result<ScheduledRefresh> {
        let coordinator = UploadCoordinator::new(&self.api);
        let refresh = self.form.submit(&coordinator, self.refresh_delay).await?;
        debug!(delay_ms = self.refresh_delay.as_millis() as u64, "listing refresh scheduled");
        self.pending_refresh = Some(refresh);
        Ok(refresh)
    }

    pub fn pending_refresh(&self) -> Option<ScheduledRefresh> {
        self.pending_refresh
    }

    /// Run the scheduled refresh once it is due: clear the success
    /// indicator and reload the listing. Returns false when none was
    /// scheduled.
    pub async fn settle(&mut self) -> Result<bool> {
        let Some(refresh) = self.pending_refresh.take() else {
            return Ok(false);
        };
        refresh.wait().await;
        self.form.clear_success();
        self.listing.load(&self.api).await?;
        Ok(true)
    }
}
