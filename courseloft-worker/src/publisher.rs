/// Publication scheduler
///
/// Periodically re-evaluates pending content items and publishes the ones
/// whose release date has arrived. One evaluation pass is a *tick*:
///
/// 1. fetch every item with status `pending`
/// 2. keep those with `release_date <= today`
/// 3. flip each kept item to `published`
///
/// Ticks are idempotent (a pass with nothing eligible changes nothing) and
/// monotonic (status only ever moves pending -> published). Items are
/// published one by one so a failing row is logged and retried on the next
/// tick without blocking the rest of the batch.
///
/// The scheduler owns its lifecycle: [`PublicationScheduler::run`] loops
/// until the shutdown token is cancelled, and the store it evaluates is
/// injected, so a tick can be driven directly in tests with a fixed date.
///
/// # Example
///
/// ```no_run
/// use courseloft_worker::publisher::{PublicationScheduler, SchedulerConfig};
/// use courseloft_shared::store::Stores;
///
/// # async fn example() -> anyhow::Result<()> {
/// let stores = Stores::memory();
/// let scheduler = PublicationScheduler::new(stores.content, SchedulerConfig::default());
///
/// let shutdown = scheduler.shutdown_token();
/// tokio::spawn(async move {
///     tokio::signal::ctrl_c().await.ok();
///     shutdown.cancel();
/// });
///
/// scheduler.run().await;
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use courseloft_shared::store::{ContentStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Scheduler cadence configuration
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    /// Fixed interval between ticks; `None` means once daily at 00:00 UTC
    pub tick_interval: Option<Duration>,
}

/// Result of one evaluation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// Pending items examined
    pub examined: usize,

    /// Items flipped to published this pass
    pub published: usize,

    /// Items whose publish write failed (retried next tick)
    pub failed: usize,
}

/// Timer-driven publisher of released course content
pub struct PublicationScheduler {
    content: Arc<dyn ContentStore>,
    config: SchedulerConfig,
    shutdown_token: CancellationToken,
}

impl PublicationScheduler {
    /// Creates a scheduler over the given content store
    pub fn new(content: Arc<dyn ContentStore>, config: SchedulerConfig) -> Self {
        Self {
            content,
            config,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Token used to signal graceful shutdown from external handlers
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs the scheduler loop until shutdown is requested
    pub async fn run(&self) {
        tracing::info!("publication scheduler starting");

        loop {
            let delay = self.delay_until_next_tick(Utc::now());

            tokio::select! {
                _ = sleep(delay) => {
                    let today = Utc::now().date_naive();
                    match self.tick(today).await {
                        Ok(summary) => {
                            tracing::info!(
                                examined = summary.examined,
                                published = summary.published,
                                failed = summary.failed,
                                "publication tick complete"
                            );
                        }
                        Err(e) => {
                            // Listing failed; everything stays pending and
                            // the next tick retries the whole pass
                            tracing::error!(error = %e, "publication tick failed");
                        }
                    }
                }
                _ = self.shutdown_token.cancelled() => {
                    tracing::info!("publication scheduler shut down");
                    break;
                }
            }
        }
    }

    /// One evaluation pass with an explicit "today"
    ///
    /// # Errors
    ///
    /// Returns an error only when the pending listing itself fails;
    /// individual publish failures are counted in the summary instead.
    pub async fn tick(&self, today: NaiveDate) -> Result<TickSummary, StoreError> {
        let pending = self.content.list_pending().await?;
        let mut summary = TickSummary {
            examined: pending.len(),
            published: 0,
            failed: 0,
        };

        for item in pending.into_iter().filter(|c| c.release_date <= today) {
            match self.content.mark_published(item.id).await {
                Ok(true) => summary.published += 1,
                // Already flipped by a concurrent pass; nothing to do
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        content_id = %item.id,
                        course_id = %item.course_id,
                        error = %e,
                        "failed to publish content item"
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Time to wait before the next tick
    ///
    /// With a fixed interval configured, that interval; otherwise the
    /// duration until the next 00:00 UTC.
    fn delay_until_next_tick(&self, now: DateTime<Utc>) -> Duration {
        if let Some(interval) = self.config.tick_interval {
            return interval;
        }

        let next_midnight = match now.date_naive().succ_opt() {
            Some(tomorrow) => tomorrow.and_time(NaiveTime::MIN).and_utc(),
            // Past the end of the calendar; fall back to a day
            None => return Duration::from_secs(86_400),
        };

        (next_midnight - now)
            .to_std()
            .unwrap_or(Duration::from_secs(86_400))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use courseloft_shared::models::{ContentStatus, CourseContent, NewCourseContent};
    use courseloft_shared::store::memory::MemoryContentStore;
    use uuid::Uuid;

    fn new_item(release_date: NaiveDate, status: ContentStatus) -> NewCourseContent {
        NewCourseContent {
            course_id: Uuid::new_v4(),
            description: "lesson".to_string(),
            video_ref: "videos/lesson.mp4".to_string(),
            release_date,
            status,
            course_module: "Module 1".to_string(),
        }
    }

    async fn statuses(store: &MemoryContentStore, ids: &[Uuid]) -> Vec<ContentStatus> {
        let mut out = Vec::new();
        for id in ids {
            out.push(store.find(*id).await.unwrap().unwrap().status);
        }
        out
    }

    #[tokio::test]
    async fn test_tick_publishes_due_items_only() {
        let store = Arc::new(MemoryContentStore::default());
        let today = Utc::now().date_naive();

        let due = store
            .create(new_item(today, ContentStatus::Pending))
            .await
            .unwrap();
        let overdue = store
            .create(new_item(today - ChronoDuration::days(3), ContentStatus::Pending))
            .await
            .unwrap();
        let future = store
            .create(new_item(today + ChronoDuration::days(2), ContentStatus::Pending))
            .await
            .unwrap();

        let scheduler = PublicationScheduler::new(store.clone(), SchedulerConfig::default());
        let summary = scheduler.tick(today).await.unwrap();

        assert_eq!(summary.examined, 3);
        assert_eq!(summary.published, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(
            statuses(&store, &[due.id, overdue.id, future.id]).await,
            vec![
                ContentStatus::Published,
                ContentStatus::Published,
                ContentStatus::Pending
            ]
        );
    }

    #[tokio::test]
    async fn test_item_publishes_once_release_date_arrives() {
        let store = Arc::new(MemoryContentStore::default());
        let today = Utc::now().date_naive();

        let item = store
            .create(new_item(today + ChronoDuration::days(2), ContentStatus::Pending))
            .await
            .unwrap();
        let scheduler = PublicationScheduler::new(store.clone(), SchedulerConfig::default());

        // Two ticks spanning the release date
        let before = scheduler.tick(today).await.unwrap();
        assert_eq!(before.published, 0);

        let after = scheduler
            .tick(today + ChronoDuration::days(2))
            .await
            .unwrap();
        assert_eq!(after.published, 1);
        assert_eq!(
            store.find(item.id).await.unwrap().unwrap().status,
            ContentStatus::Published
        );

        // Stays published on further ticks
        let again = scheduler
            .tick(today + ChronoDuration::days(3))
            .await
            .unwrap();
        assert_eq!(again.examined, 0);
        assert_eq!(again.published, 0);
        assert_eq!(
            store.find(item.id).await.unwrap().unwrap().status,
            ContentStatus::Published
        );
    }

    #[tokio::test]
    async fn test_empty_tick_is_a_noop() {
        let store = Arc::new(MemoryContentStore::default());
        let scheduler = PublicationScheduler::new(store, SchedulerConfig::default());

        let summary = scheduler.tick(Utc::now().date_naive()).await.unwrap();
        assert_eq!(
            summary,
            TickSummary {
                examined: 0,
                published: 0,
                failed: 0
            }
        );
    }

    /// Store whose writes fail for one poisoned item
    struct FlakyContentStore {
        inner: MemoryContentStore,
        poisoned: Uuid,
    }

    #[async_trait]
    impl ContentStore for FlakyContentStore {
        async fn create(&self, data: NewCourseContent) -> Result<CourseContent, StoreError> {
            self.inner.create(data).await
        }

        async fn find(&self, id: Uuid) -> Result<Option<CourseContent>, StoreError> {
            self.inner.find(id).await
        }

        async fn list_by_course(
            &self,
            course_id: Uuid,
        ) -> Result<Vec<CourseContent>, StoreError> {
            self.inner.list_by_course(course_id).await
        }

        async fn list_pending(&self) -> Result<Vec<CourseContent>, StoreError> {
            self.inner.list_pending().await
        }

        async fn mark_published(&self, id: Uuid) -> Result<bool, StoreError> {
            if id == self.poisoned {
                return Err(StoreError::Backend("disk on fire".to_string()));
            }
            self.inner.mark_published(id).await
        }
    }

    #[tokio::test]
    async fn test_one_bad_row_does_not_block_the_batch() {
        let inner = MemoryContentStore::default();
        let today = Utc::now().date_naive();

        let poisoned = inner
            .create(new_item(today, ContentStatus::Pending))
            .await
            .unwrap();
        let healthy = inner
            .create(new_item(today, ContentStatus::Pending))
            .await
            .unwrap();

        let store = Arc::new(FlakyContentStore {
            inner,
            poisoned: poisoned.id,
        });
        let scheduler = PublicationScheduler::new(store.clone(), SchedulerConfig::default());

        let summary = scheduler.tick(today).await.unwrap();
        assert_eq!(summary.published, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            store.find(healthy.id).await.unwrap().unwrap().status,
            ContentStatus::Published
        );

        // The failed row is still pending and picked up next tick
        assert_eq!(
            store.find(poisoned.id).await.unwrap().unwrap().status,
            ContentStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let store = Arc::new(MemoryContentStore::default());
        let scheduler = PublicationScheduler::new(
            store,
            SchedulerConfig {
                tick_interval: Some(Duration::from_millis(10)),
            },
        );

        let token = scheduler.shutdown_token();
        let handle = tokio::spawn(async move { scheduler.run().await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
        handle.await.unwrap();
    }

    #[test]
    fn test_daily_cadence_targets_next_midnight() {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryContentStore::default());
        let scheduler = PublicationScheduler::new(store, SchedulerConfig::default());

        let now = NaiveDate::from_ymd_opt(2026, 8, 28)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap()
            .and_utc();
        let delay = scheduler.delay_until_next_tick(now);
        assert_eq!(delay, Duration::from_secs(5 * 3600 + 30 * 60));
    }

    #[test]
    fn test_fixed_interval_overrides_daily_cadence() {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryContentStore::default());
        let scheduler = PublicationScheduler::new(
            store,
            SchedulerConfig {
                tick_interval: Some(Duration::from_secs(5)),
            },
        );
        assert_eq!(
            scheduler.delay_until_next_tick(Utc::now()),
            Duration::from_secs(5)
        );
    }
}
