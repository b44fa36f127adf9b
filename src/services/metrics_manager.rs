use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default, Clone, Serialize)]
pub struct MetricsData {
    /// `lookup`, `completion` or `completion_error`.
    pub reply_sources: HashMap<String, u64>,
    pub artifacts: HashMap<String, u64>,
    pub stage_failures: HashMap<String, u64>,
}

#[derive(Debug, Clone)]
pub struct MetricsManager {
    inner: Arc<RwLock<MetricsData>>,
}

impl Default for MetricsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsData::default())),
        }
    }

    pub async fn increment_source(&self, source: &str) {
        let mut data = self.inner.write().await;
        *data.reply_sources.entry(source.to_string()).or_insert(0) += 1;
    }

    pub async fn increment_artifact(&self, kind: &str) {
        let mut data = self.inner.write().await;
        *data.artifacts.entry(kind.to_string()).or_insert(0) += 1;
    }

    pub async fn increment_failure(&self, stage: &str) {
        let mut data = self.inner.write().await;
        *data.stage_failures.entry(stage.to_string()).or_insert(0) += 1;
    }

    pub async fn get_metrics(&self) -> MetricsData {
        self.inner.read().await.clone()
    }
}
