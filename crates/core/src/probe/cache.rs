use super::ToolDetectionResult;
use std::sync::{Arc, PoisonError, RwLock};

/// Process-wide memo of the last completed detection.
#[derive(Debug, Clone, Default)]
pub struct DetectionCache {
    inner: Arc<RwLock<Option<ToolDetectionResult>>>,
}

impl DetectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<ToolDetectionResult> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, result: ToolDetectionResult) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(result);
    }

    pub fn invalidate(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
