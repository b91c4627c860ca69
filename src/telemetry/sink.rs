//! Write interface of the columnar analytics sink
//!
//! The storage engine itself is external; this crate only consumes its write
//! operation. Durability, batching and retries are the engine's contract,
//! not ours — a failed write is reported to the caller and nothing else.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// One positional row: partition keys plus the two value channels.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub indexes: Vec<String>,
    pub blobs: Vec<String>,
    pub doubles: Vec<f64>,
}

#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn write_data_point(&self, point: DataPoint) -> Result<()>;
}

/// Sink that only logs the row. Default wiring when no real engine is
/// configured.
pub struct TraceSink;

#[async_trait]
impl AnalyticsSink for TraceSink {
    async fn write_data_point(&self, point: DataPoint) -> Result<()> {
        debug!(
            indexes = ?point.indexes,
            blobs = ?point.blobs,
            doubles = ?point.doubles,
            "analytics data point"
        );
        Ok(())
    }
}

/// Sink that retains every row in memory, for tests and local inspection.
#[derive(Default)]
pub struct MemorySink {
    points: Mutex<Vec<DataPoint>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn points(&self) -> Vec<DataPoint> {
        self.points.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.points.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.points.lock().await.is_empty()
    }
}

#[async_trait]
impl AnalyticsSink for MemorySink {
    async fn write_data_point(&self, point: DataPoint) -> Result<()> {
        self.points.lock().await.push(point);
        Ok(())
    }
}
