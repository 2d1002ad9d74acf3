use crate::config::{ConfigError, ExportOptions, RenderConfig};
use crate::export::{self, ExportError, ExportSummary};
use crate::model::QueryResult;
use crate::render::{RenderPass, ResultView};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("No open result view with id: {0}")]
    NotFound(String),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Open result views, keyed by id. Each view owns its own page, scroll and
/// expansion state; nothing is shared between them.
pub struct ResultViewManager {
    views: RwLock<HashMap<String, ResultView>>,
    config: RwLock<RenderConfig>,
}

impl Default for ResultViewManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultViewManager {
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            views: RwLock::new(HashMap::new()),
            config: RwLock::new(config),
        }
    }

    pub async fn config(&self) -> RenderConfig {
        self.config.read().await.clone()
    }

    /// Replace the config used for views opened from now on.
    pub async fn set_config(&self, config: RenderConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.config.write().await = config;
        Ok(())
    }

    pub async fn open(&self, result: QueryResult) -> String {
        let config = self.config().await;
        let id = uuid::Uuid::new_v4().to_string();
        let view = ResultView::new(result, config);
        tracing::debug!(
            view_id = %id,
            rows = view.result().len(),
            strategy = ?view.strategy(),
            "opened result view"
        );
        self.views.write().await.insert(id.clone(), view);
        id
    }

    pub async fn close(&self, view_id: &str) -> Result<(), ViewError> {
        self.views
            .write()
            .await
            .remove(view_id)
            .map(|_| tracing::debug!(view_id, "closed result view"))
            .ok_or_else(|| ViewError::NotFound(view_id.to_string()))
    }

    pub async fn len(&self) -> usize {
        self.views.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.views.read().await.is_empty()
    }

    pub async fn read<T>(
        &self,
        view_id: &str,
        f: impl FnOnce(&ResultView) -> T,
    ) -> Result<T, ViewError> {
        let views = self.views.read().await;
        views
            .get(view_id)
            .map(f)
            .ok_or_else(|| ViewError::NotFound(view_id.to_string()))
    }

    pub async fn update<T>(
        &self,
        view_id: &str,
        f: impl FnOnce(&mut ResultView) -> T,
    ) -> Result<T, ViewError> {
        let mut views = self.views.write().await;
        views
            .get_mut(view_id)
            .map(f)
            .ok_or_else(|| ViewError::NotFound(view_id.to_string()))
    }

    pub async fn render(&self, view_id: &str) -> Result<RenderPass, ViewError> {
        self.read(view_id, ResultView::render).await
    }

    /// Apply an interaction and return the pass to paint afterwards.
    pub async fn update_and_render(
        &self,
        view_id: &str,
        f: impl FnOnce(&mut ResultView),
    ) -> Result<RenderPass, ViewError> {
        self.update(view_id, |view| {
            f(view);
            view.render()
        })
        .await
    }

    pub async fn export_csv(
        &self,
        view_id: &str,
        options: &ExportOptions,
    ) -> Result<String, ViewError> {
        let csv = self
            .read(view_id, |view| export::export_csv(view.result(), options))
            .await??;
        Ok(csv)
    }

    /// Fails when the view is unknown or has nothing to export, so callers can
    /// bail out before asking the user for a destination.
    pub async fn ensure_exportable(&self, view_id: &str) -> Result<(), ViewError> {
        if self.read(view_id, |view| view.result().is_empty()).await? {
            return Err(ExportError::EmptyResult.into());
        }
        Ok(())
    }

    pub async fn save_csv(
        &self,
        view_id: &str,
        options: &ExportOptions,
        path: &Path,
    ) -> Result<ExportSummary, ViewError> {
        let summary = self
            .read(view_id, |view| export::save_csv(view.result(), options, path))
            .await??;
        tracing::info!(
            view_id,
            path = %path.display(),
            rows = summary.rows,
            bytes = summary.bytes,
            "exported CSV"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Strategy;
    use serde_json::json;

    fn result(rows: usize) -> QueryResult {
        QueryResult::new(
            vec!["id".into()],
            (0..rows).map(|i| vec![json!(i)]).collect(),
        )
    }

    #[tokio::test]
    async fn views_are_independent() {
        let manager = ResultViewManager::new();
        let first = manager.open(result(2500)).await;
        let second = manager.open(result(2500)).await;
        assert_ne!(first, second);
        assert_eq!(manager.len().await, 2);

        manager.update(&first, |view| view.go_to_page(4)).await.unwrap();

        let first_page = manager.read(&first, |v| v.current_page()).await.unwrap();
        let second_page = manager.read(&second, |v| v.current_page()).await.unwrap();
        assert_eq!(first_page, 4);
        assert_eq!(second_page, 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_rejected() {
        let manager = ResultViewManager::new();
        assert!(matches!(
            manager.render("missing").await,
            Err(ViewError::NotFound(id)) if id == "missing"
        ));
        assert!(matches!(
            manager.close("missing").await,
            Err(ViewError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn close_removes_the_view() {
        let manager = ResultViewManager::new();
        let id = manager.open(result(3)).await;
        manager.close(&id).await.unwrap();
        assert!(manager.is_empty().await);
        assert!(manager.render(&id).await.is_err());
    }

    #[tokio::test]
    async fn config_applies_to_new_views_only() {
        let manager = ResultViewManager::new();
        let before = manager.open(result(50)).await;

        manager
            .set_config(RenderConfig {
                pagination_threshold: 10,
                virtual_scroll_threshold: 40,
                ..Default::default()
            })
            .await
            .unwrap();
        let after = manager.open(result(50)).await;

        assert_eq!(manager.read(&before, |v| v.strategy()).await.unwrap(), Strategy::Full);
        assert_eq!(manager.read(&after, |v| v.strategy()).await.unwrap(), Strategy::Virtual);
    }

    #[tokio::test]
    async fn invalid_config_is_refused() {
        let manager = ResultViewManager::new();
        let err = manager
            .set_config(RenderConfig {
                items_per_page: 0,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err, ConfigError::Zero("itemsPerPage"));
        assert_eq!(manager.config().await, RenderConfig::default());
    }

    #[tokio::test]
    async fn interactions_return_fresh_render_pass() {
        let manager = ResultViewManager::new();
        let id = manager.open(result(6000)).await;
        let pass = manager
            .update_and_render(&id, |view| view.scroll_to(400.0))
            .await
            .unwrap();
        assert_eq!(pass.window.range(), 10..25);
    }

    #[tokio::test]
    async fn export_covers_the_full_result_regardless_of_page() {
        let manager = ResultViewManager::new();
        let id = manager.open(result(1500)).await;
        manager.update(&id, |view| view.go_to_page(2)).await.unwrap();

        let csv = manager.export_csv(&id, &ExportOptions::default()).await.unwrap();
        assert_eq!(csv.lines().count(), 1501);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("query_results.csv");
        let summary = manager
            .save_csv(&id, &ExportOptions::default(), &path)
            .await
            .unwrap();
        assert_eq!(summary.rows, 1500);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), summary.bytes);
    }

    #[tokio::test]
    async fn exporting_an_empty_view_fails_visibly() {
        let manager = ResultViewManager::new();
        let id = manager.open(QueryResult::new(vec!["a".into()], vec![])).await;
        assert!(matches!(
            manager.export_csv(&id, &ExportOptions::default()).await,
            Err(ViewError::Export(ExportError::EmptyResult))
        ));
    }

    #[tokio::test]
    async fn empty_or_unknown_views_are_not_exportable() {
        let manager = ResultViewManager::new();
        let empty = manager.open(QueryResult::new(vec!["a".into()], vec![])).await;
        let full = manager.open(result(3)).await;

        assert!(matches!(
            manager.ensure_exportable(&empty).await,
            Err(ViewError::Export(ExportError::EmptyResult))
        ));
        assert!(matches!(
            manager.ensure_exportable("missing").await,
            Err(ViewError::NotFound(_))
        ));
        assert!(manager.ensure_exportable(&full).await.is_ok());
    }

    #[tokio::test]
    async fn failed_save_leaves_the_chosen_file_alone() {
        let manager = ResultViewManager::new();
        let empty = manager.open(QueryResult::new(vec!["a".into()], vec![])).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("existing.csv");
        std::fs::write(&path, "previous export").unwrap();

        assert!(manager
            .save_csv(&empty, &ExportOptions::default(), &path)
            .await
            .is_err());
        assert!(manager
            .save_csv("missing", &ExportOptions::default(), &path)
            .await
            .is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous export");
    }
}
