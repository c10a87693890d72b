// SPDX-License-Identifier: Apache-2.0

//! Grade monitor.
//!
//! Polls the final grades of the running term, compares them with the last
//! notified snapshot and pushes one notification per changed discipline.
//! A cycle goes Fetching, then Reconciling, then back to Idle; cycles never
//! overlap and a failed fetch leaves the cache untouched.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use crate::academic::AcademicService;
use crate::cache;
use crate::client::EducationClient;
use crate::config::{AppConfig, MonitorConfig};
use crate::error::{ApiError, StoreError};
use crate::models::NOT_AVAILABLE;
use crate::notify::Notifier;

/// Discipline name to final grade value.
pub type GradeSnapshot = BTreeMap<String, Value>;

/// Shortest interval the runner accepts.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Message sent when a cycle finds nothing new.
pub const NO_CHANGES_MESSAGE: &str = "👍 Nenhuma alteração nas notas.";

/// Value a discipline missing from the cache is compared against.
#[must_use]
pub fn unseen_grade() -> Value {
    json!(0)
}

/// How a discipline absent from the cache is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstSeen {
    /// Compare against [`unseen_grade`] and notify when different.
    #[default]
    Notify,
    /// Record the current value silently.
    Baseline,
}

/// A grade change to announce.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    /// Discipline name.
    pub discipline: String,
    /// Value the discipline had in the cache.
    pub previous: Value,
    /// Freshly fetched value.
    pub current: Value,
}

fn display_grade(value: &Value) -> String {
    match value {
        Value::Null => NOT_AVAILABLE.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl NotificationEvent {
    /// Markdown message announcing this change.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "📢 *Nova nota disponível!* 📢\n\n\
             📄 *Disciplina:* {}\n\
             📊 *Nota Anterior:* `{}`\n\
             ✅ *Nova Nota:* `{}`\n\n\
             Boa sorte! 🍀",
            self.discipline,
            display_grade(&self.previous),
            display_grade(&self.current),
        )
    }
}

/// Result of comparing a fetched snapshot with the cache.
#[derive(Debug, Default, PartialEq)]
pub struct Diff {
    /// Changes to notify.
    pub events: Vec<NotificationEvent>,
    /// New disciplines recorded without notification.
    pub baselined: Vec<String>,
}

/// Compares `current` against `cached`.
///
/// Disciplines only present in the cache are ignored.
#[must_use]
pub fn diff_snapshots(current: &GradeSnapshot, cached: &GradeSnapshot, first_seen: FirstSeen) -> Diff {
    let mut diff = Diff::default();
    for (discipline, value) in current {
        let previous = match (cached.get(discipline), first_seen) {
            (Some(previous), _) => previous.clone(),
            (None, FirstSeen::Notify) => unseen_grade(),
            (None, FirstSeen::Baseline) => {
                diff.baselined.push(discipline.clone());
                continue;
            }
        };
        if previous != *value {
            diff.events.push(NotificationEvent {
                discipline: discipline.clone(),
                previous,
                current: value.clone(),
            });
        }
    }
    diff
}

/// JSON file holding the last notified snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    /// Cache backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last saved snapshot; empty when missing or unreadable.
    #[must_use]
    pub fn load(&self) -> GradeSnapshot {
        match cache::read_json(&self.path) {
            Ok(snapshot) => snapshot.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "⚠️ Ignoring unreadable grade cache");
                GradeSnapshot::new()
            }
        }
    }

    /// Replaces the cached snapshot.
    pub fn save(&self, snapshot: &GradeSnapshot) -> Result<(), StoreError> {
        cache::write_json_atomic(&self.path, snapshot)
    }
}

/// Monitor timing and policy.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Time between cycle starts.
    pub interval: Duration,
    /// Lifetime of the "no changes" notice.
    pub no_change_ttl: Duration,
    /// Pause between per-course grade requests.
    pub request_delay: Duration,
    /// Treatment of new disciplines.
    pub first_seen: FirstSeen,
    /// Academic period queried for courses.
    pub period: u64,
}

impl MonitorSettings {
    /// Interval for a period given in minutes, at least one minute.
    #[must_use]
    pub fn interval_for(minutes: u64) -> Duration {
        Duration::from_secs(minutes.max(1).saturating_mul(60))
    }

    /// Settings from the application config.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let monitor: &MonitorConfig = &config.monitor;
        Self {
            interval: Self::interval_for(monitor.interval_minutes),
            no_change_ttl: Duration::from_secs(monitor.no_change_ttl_seconds),
            request_delay: Duration::from_secs(config.http.request_delay_seconds),
            first_seen: if monitor.notify_new_disciplines {
                FirstSeen::Notify
            } else {
                FirstSeen::Baseline
            },
            period: config.academic.period,
        }
    }
}

/// What a cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was still running.
    Skipped,
    /// Fetching failed; nothing was notified or saved.
    Aborted,
    /// Changes were dispatched and the cache replaced.
    Notified {
        /// Number of changed disciplines.
        changes: usize,
    },
    /// Nothing changed.
    Unchanged,
}

/// Periodic grade watcher.
pub struct GradeMonitor {
    client: EducationClient,
    notifier: Arc<dyn Notifier>,
    cache: SnapshotCache,
    settings: MonitorSettings,
    in_flight: Mutex<()>,
}

impl GradeMonitor {
    /// Creates a monitor around an authenticated client.
    pub fn new(
        client: EducationClient,
        notifier: Arc<dyn Notifier>,
        cache: SnapshotCache,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            client,
            notifier,
            cache,
            settings,
            in_flight: Mutex::new(()),
        }
    }

    /// Current grades of the running term.
    #[instrument(skip(self))]
    pub async fn fetch_grades(&self) -> Result<GradeSnapshot, ApiError> {
        let profile = self.client.get_me().await?;
        info!(
            "👤 Profile: {} ({})",
            profile.user.name.as_deref().unwrap_or(NOT_AVAILABLE),
            profile.user.email.as_deref().unwrap_or(NOT_AVAILABLE)
        );

        let academic = AcademicService::new(&self.client);
        let courses = academic.active_disciplines(self.settings.period).await?;
        if courses.is_empty() {
            info!("No courses in the running term");
            return Ok(GradeSnapshot::new());
        }

        academic
            .grades_by_course(&courses, self.settings.request_delay)
            .await
    }

    /// Runs one fetch/reconcile cycle.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self) -> CycleOutcome {
        info!("Checking grades");

        let current = match self.fetch_grades().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "❌ Grade check aborted");
                return CycleOutcome::Aborted;
            }
        };

        let cached = self.cache.load();
        let diff = diff_snapshots(&current, &cached, self.settings.first_seen);

        if !diff.events.is_empty() {
            for event in &diff.events {
                info!(
                    discipline = %event.discipline,
                    previous = %event.previous,
                    current = %event.current,
                    "🔄 Grade changed"
                );
            }

            let deliveries = diff.events.iter().map(|event| async move {
                let result = self.notifier.send(&event.message()).await;
                (event, result)
            });
            for (event, result) in join_all(deliveries).await {
                match result {
                    Ok(_) => info!(discipline = %event.discipline, "✅ Notification sent"),
                    Err(e) => {
                        warn!(discipline = %event.discipline, error = %e, "❌ Notification failed");
                    }
                }
            }

            self.persist(&current);
            return CycleOutcome::Notified {
                changes: diff.events.len(),
            };
        }

        if !diff.baselined.is_empty() {
            debug!(disciplines = ?diff.baselined, "Recording new disciplines");
            self.persist(&current);
        }

        info!("👍 No grade changes");
        self.announce_no_changes().await;
        CycleOutcome::Unchanged
    }

    fn persist(&self, snapshot: &GradeSnapshot) {
        match self.cache.save(snapshot) {
            Ok(()) => debug!(path = %self.cache.path().display(), "💾 Grade cache updated"),
            Err(e) => warn!(error = %e, "❌ Failed to save grade cache"),
        }
    }

    async fn announce_no_changes(&self) {
        let id = match self.notifier.send(NO_CHANGES_MESSAGE).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Failed to send no-changes notice");
                return;
            }
        };
        tokio::time::sleep(self.settings.no_change_ttl).await;
        if let Err(e) = self.notifier.delete(id).await {
            warn!(error = %e, "Failed to delete no-changes notice");
        }
    }

    /// Runs a cycle unless one is already in flight.
    pub async fn tick(&self) -> CycleOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("Previous cycle still running, skipping tick");
            return CycleOutcome::Skipped;
        };
        self.run_cycle().await
    }

    /// Runs cycles until `shutdown` resolves.
    ///
    /// The first cycle starts immediately. Ticks that fire while a cycle is
    /// running are skipped. On shutdown the running cycle is cancelled and
    /// the notifier closed.
    pub async fn run(self: Arc<Self>, shutdown: impl Future<Output = ()>) {
        let period = self.settings.interval.max(MIN_INTERVAL);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut cycles = JoinSet::new();
        tokio::pin!(shutdown);

        info!(
            interval_secs = period.as_secs(),
            "🗓️ Grade monitor started"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    while cycles.try_join_next().is_some() {}
                    let monitor = Arc::clone(&self);
                    cycles.spawn(async move { monitor.tick().await });
                }
            }
        }

        info!("🛑 Grade monitor stopping");
        cycles.abort_all();
        while cycles.join_next().await.is_some() {}

        if let Err(e) = self.notifier.close().await {
            warn!(error = %e, "Failed to close notifier");
        }
    }
}
