//! Per-record image carousel
//!
//! Each visible record with more than one image gets one timer task that
//! sends a tick every period. Ticks carry the generation of the timer that
//! produced them, so a tick queued just before its timer was replaced is
//! ignored instead of causing a double advance.
//!
//! Timers are tokio tasks; `sync`, `next` and `prev` must run inside a
//! runtime.

use school_directory_common::{ImageReference, Record, RecordId};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Auto-advance period
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselPhase {
    /// At most one image, no timer
    Idle,
    /// Timer active over `len` images
    Cycling { len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tick {
    record: RecordId,
    generation: u64,
}

/// Armed timer; aborted on drop
struct CarouselTimer {
    len: usize,
    generation: u64,
    handle: AbortHandle,
}

impl Drop for CarouselTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct CarouselScheduler {
    period: Duration,
    // Kept for records that leave the view so they resume where they were
    indices: HashMap<RecordId, usize>,
    lengths: HashMap<RecordId, usize>,
    timers: HashMap<RecordId, CarouselTimer>,
    next_generation: u64,
    tx: UnboundedSender<Tick>,
    rx: UnboundedReceiver<Tick>,
}

impl CarouselScheduler {
    /// A zero period falls back to [`DEFAULT_INTERVAL`]
    pub fn new(period: Duration) -> Self {
        let period = if period.is_zero() {
            warn!("zero carousel interval, using {}ms", DEFAULT_INTERVAL.as_millis());
            DEFAULT_INTERVAL
        } else {
            period
        };
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            period,
            indices: HashMap::new(),
            lengths: HashMap::new(),
            timers: HashMap::new(),
            next_generation: 0,
            tx,
            rx,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Rebuild the timer set for a new visible record set.
    ///
    /// Every existing timer is cancelled first; fresh timers are armed only
    /// for visible records with more than one image.
    pub fn sync<'a>(&mut self, visible: impl IntoIterator<Item = &'a Record>) {
        let cancelled = self.timers.len();
        self.timers.clear();
        self.lengths.clear();

        for record in visible {
            let len = record.images.len();
            self.lengths.insert(record.id, len);
            if record.is_multi_image() {
                self.arm(record.id, len);
            }
        }
        debug!(cancelled, armed = self.timers.len(), "carousel synced");
    }

    fn arm(&mut self, record: RecordId, len: usize) {
        // Cancel before replacing
        if let Some(old) = self.timers.remove(&record) {
            drop(old);
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        let tx = self.tx.clone();
        let period = self.period;
        let start = Instant::now() + period;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Tick { record, generation }).is_err() {
                    break;
                }
            }
        })
        .abort_handle();

        self.timers.insert(
            record,
            CarouselTimer {
                len,
                generation,
                handle,
            },
        );
    }

    fn cycling_len(&self, record: RecordId) -> Option<usize> {
        self.lengths.get(&record).copied().filter(|&len| len > 1)
    }

    /// Step forward now and restart the record's timer
    pub fn next(&mut self, record: RecordId) -> Option<usize> {
        let len = self.cycling_len(record)?;
        let index = (self.index(record) + 1) % len;
        self.indices.insert(record, index);
        self.arm(record, len);
        Some(index)
    }

    /// Step back now (wrapping from 0 to len - 1) and restart the timer
    pub fn prev(&mut self, record: RecordId) -> Option<usize> {
        let len = self.cycling_len(record)?;
        let index = (self.index(record) + len - 1) % len;
        self.indices.insert(record, index);
        self.arm(record, len);
        Some(index)
    }

    /// Current display index of a visible record
    pub fn index(&self, record: RecordId) -> usize {
        let raw = self.indices.get(&record).copied().unwrap_or(0);
        match self.lengths.get(&record) {
            Some(&len) if len > 0 => raw % len,
            _ => 0,
        }
    }

    /// Image currently shown for `record`
    pub fn current_image<'a>(&self, record: &'a Record) -> Option<&'a ImageReference> {
        if record.images.is_empty() {
            return None;
        }
        let raw = self.indices.get(&record.id).copied().unwrap_or(0);
        record.images.get(raw % record.images.len())
    }

    pub fn phase(&self, record: RecordId) -> CarouselPhase {
        match self.timers.get(&record) {
            Some(timer) => CarouselPhase::Cycling { len: timer.len },
            None => CarouselPhase::Idle,
        }
    }

    pub fn has_timer(&self, record: RecordId) -> bool {
        self.timers.contains_key(&record)
    }

    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    /// Wait for the next auto-advance and apply it.
    ///
    /// Returns `None` at once when no timer is armed.
    pub async fn tick(&mut self) -> Option<RecordId> {
        loop {
            if self.timers.is_empty() {
                return None;
            }
            let tick = self.rx.recv().await?;
            if let Some(record) = self.apply(tick) {
                return Some(record);
            }
        }
    }

    /// Apply ticks already queued without waiting. Returns how many
    /// advanced a record.
    pub fn drain_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(tick) = self.rx.try_recv() {
            if self.apply(tick).is_some() {
                applied += 1;
            }
        }
        applied
    }

    fn apply(&mut self, tick: Tick) -> Option<RecordId> {
        let timer = self.timers.get(&tick.record)?;
        if timer.generation != tick.generation {
            return None;
        }
        let len = timer.len;
        let index = self.indices.entry(tick.record).or_insert(0);
        *index = (*index % len + 1) % len;
        Some(tick.record)
    }
}

impl Default for CarouselScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: RecordId, images: usize) -> Record {
        Record {
            id,
            name: format!("School {}", id),
            address: String::new(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            contact_number: String::new(),
            email_id: String::new(),
            images: (0..images)
                .map(|i| ImageReference::new(format!("{}-{}.jpg", id, i)))
                .collect(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_image_never_has_timer() {
        let mut carousel = CarouselScheduler::default();
        let records = vec![record(1, 1), record(2, 0)];
        carousel.sync(&records);

        assert_eq!(carousel.active_timers(), 0);
        assert_eq!(carousel.phase(1), CarouselPhase::Idle);
        assert_eq!(carousel.next(1), None);
        assert_eq!(carousel.prev(2), None);
        assert_eq!(carousel.active_timers(), 0);
        assert_eq!(carousel.tick().await, None);
        assert_eq!(carousel.current_image(&records[1]), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_at_fixed_interval() {
        let mut carousel = CarouselScheduler::default();
        let records = vec![record(1, 3)];
        carousel.sync(&records);
        assert_eq!(carousel.phase(1), CarouselPhase::Cycling { len: 3 });

        let mut seen = vec![carousel.index(1)];
        for _ in 0..3 {
            let start = Instant::now();
            assert_eq!(carousel.tick().await, Some(1));
            assert_eq!(start.elapsed(), DEFAULT_INTERVAL);
            seen.push(carousel.index(1));
        }
        assert_eq!(seen, vec![0, 1, 2, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_uses_default() {
        let mut carousel = CarouselScheduler::new(Duration::ZERO);
        assert_eq!(carousel.period(), DEFAULT_INTERVAL);

        carousel.sync(&[record(1, 3)]);
        let start = Instant::now();
        assert_eq!(carousel.tick().await, Some(1));
        assert_eq!(start.elapsed(), DEFAULT_INTERVAL);
        assert_eq!(carousel.index(1), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_step_restarts_timer() {
        let mut carousel = CarouselScheduler::default();
        carousel.sync(&[record(1, 3)]);

        tokio::time::advance(Duration::from_millis(2000)).await;
        assert_eq!(carousel.next(1), Some(1));

        // Next auto-advance is a full period after the click
        let start = Instant::now();
        assert_eq!(carousel.tick().await, Some(1));
        assert_eq!(start.elapsed(), DEFAULT_INTERVAL);
        assert_eq!(carousel.index(1), 2);
        assert_eq!(carousel.active_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prev_wraps_to_last() {
        let mut carousel = CarouselScheduler::default();
        let records = vec![record(1, 4)];
        carousel.sync(&records);
        assert_eq!(carousel.prev(1), Some(3));
        assert_eq!(carousel.current_image(&records[0]).unwrap().as_str(), "1-3.jpg");
        assert_eq!(carousel.next(1), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_tick_is_ignored() {
        let mut carousel = CarouselScheduler::default();
        carousel.sync(&[record(1, 3)]);
        let old_generation = carousel.timers[&1].generation;

        carousel.next(1);
        // A tick from the replaced timer that was already queued
        carousel
            .tx
            .send(Tick {
                record: 1,
                generation: old_generation,
            })
            .unwrap();
        assert_eq!(carousel.drain_ready(), 0);
        assert_eq!(carousel.index(1), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_replaces_all_timers() {
        let mut carousel = CarouselScheduler::default();
        let all = vec![record(1, 2), record(2, 1), record(3, 3)];
        carousel.sync(&all);
        assert_eq!(carousel.active_timers(), 2);
        assert!(carousel.has_timer(1));
        assert!(!carousel.has_timer(2));

        carousel.sync(&all[2..]);
        assert_eq!(carousel.active_timers(), 1);
        assert!(!carousel.has_timer(1));
        assert!(carousel.has_timer(3));

        // Re-syncing the same set never duplicates timers
        carousel.sync(&all[2..]);
        assert_eq!(carousel.active_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timers_deliver_nothing() {
        let mut carousel = CarouselScheduler::default();
        carousel.sync(&[record(1, 2), record(2, 2)]);
        carousel.sync(std::iter::empty());
        assert_eq!(carousel.active_timers(), 0);

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert_eq!(carousel.drain_ready(), 0);
        assert_eq!(carousel.tick().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_index_survives_filter_round_trip() {
        let mut carousel = CarouselScheduler::default();
        let records = vec![record(1, 3), record(2, 2)];
        carousel.sync(&records);
        carousel.next(1);

        carousel.sync(&records[1..]);
        carousel.sync(&records);
        assert_eq!(carousel.index(1), 1);
    }
}
