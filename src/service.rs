//! Request orchestration: status cache, layout, render, snapshot cache.

use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::data_fetcher::cache::{
    SharedResult, Snapshot, SnapshotCache, SnapshotKey, StatusCache, create_snapshot_cache,
    create_status_cache,
};
use crate::data_fetcher::{Roster, StatusSource, fetch_roster};
use crate::error::AppError;
use crate::scoreboard::{FontRegistry, Padding, compute_layout, render_font_test, render_scoreboard};

/// Produces rosters and rendered scoreboards, backed by both cache tiers.
///
/// Cloning is cheap; clones share the caches.
pub struct ScoreboardService<S> {
    source: Arc<S>,
    fonts: FontRegistry,
    default_server_name: Option<String>,
    status_cache: Arc<StatusCache>,
    snapshot_cache: Arc<SnapshotCache>,
}

impl<S> Clone for ScoreboardService<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            fonts: self.fonts.clone(),
            default_server_name: self.default_server_name.clone(),
            status_cache: Arc::clone(&self.status_cache),
            snapshot_cache: Arc::clone(&self.snapshot_cache),
        }
    }
}

impl<S: StatusSource> ScoreboardService<S> {
    pub fn new(source: S, fonts: FontRegistry, config: &Config) -> Self {
        Self {
            source: Arc::new(source),
            fonts,
            default_server_name: config.default_server_name.clone(),
            status_cache: Arc::new(create_status_cache(&config.cache)),
            snapshot_cache: Arc::new(create_snapshot_cache(&config.cache)),
        }
    }

    pub fn status_cache(&self) -> &StatusCache {
        &self.status_cache
    }

    pub fn snapshot_cache(&self) -> &SnapshotCache {
        &self.snapshot_cache
    }

    /// Roster for the server matching `server_name`, or the configured
    /// default when absent. Concurrent callers within the status TTL share
    /// one upstream fetch.
    #[instrument(skip(self))]
    pub async fn roster(&self, server_name: Option<&str>) -> SharedResult<Arc<Roster>> {
        let key = normalize(server_name);
        let filter = key.clone().or_else(|| self.default_server_name.clone());
        let source = Arc::clone(&self.source);

        self.status_cache
            .get_or_compute(key, move || async move {
                fetch_roster(source.as_ref(), filter.as_deref())
                    .await
                    .map(Arc::new)
                    .map_err(Arc::new)
            })
            .await
    }

    /// Rendered scoreboard. With a timestamp token the result is stored in
    /// and served from the snapshot cache, so the same token always yields
    /// the same bytes. Without one it is rendered afresh from the
    /// status-cached roster.
    #[instrument(skip(self))]
    pub async fn snapshot(
        &self,
        server_name: Option<&str>,
        padding: Padding,
        timestamp: Option<&str>,
    ) -> SharedResult<Snapshot> {
        let server_name = normalize(server_name);
        let Some(timestamp) = normalize(timestamp) else {
            return self.render_snapshot(server_name, padding).await;
        };

        let key = SnapshotKey {
            server_name: server_name.clone(),
            padding,
            timestamp,
        };
        let this = self.clone();
        self.snapshot_cache
            .get_or_compute(key, move || async move {
                this.render_snapshot(server_name, padding).await
            })
            .await
    }

    async fn render_snapshot(
        &self,
        server_name: Option<String>,
        padding: Padding,
    ) -> SharedResult<Snapshot> {
        let roster = self.roster(server_name.as_deref()).await?;
        let fonts = self.fonts.clone();
        let render_roster = Arc::clone(&roster);

        let image = tokio::task::spawn_blocking(move || {
            let plan = compute_layout(&render_roster, &padding, &fonts);
            debug!(
                "Layout {}x{}, {} columns, gutter {}",
                plan.canvas_width,
                plan.canvas_height,
                plan.column_count(),
                plan.gutter
            );
            render_scoreboard(&render_roster, &plan, &fonts)
        })
        .await
        .map_err(|e| Arc::new(AppError::task_failed(e.to_string())))?
        .map_err(Arc::new)?;

        info!(
            "Rendered scoreboard for {} ({} players)",
            roster.map, roster.player_count
        );
        Ok(Snapshot {
            image: Bytes::from(image),
            roster,
        })
    }

    /// Font test diagnostic image.
    pub async fn font_test(&self) -> Result<Bytes, AppError> {
        let fonts = self.fonts.clone();
        let image = tokio::task::spawn_blocking(move || render_font_test(&fonts))
            .await
            .map_err(|e| AppError::task_failed(e.to_string()))??;
        Ok(Bytes::from(image))
    }
}

/// Treats empty query values as absent.
fn normalize(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
