//! Batch queue, up-front validation and sequential batch execution.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use matbake_core::{AssetStore, BakeError, BakeRequest, Result};
use matbake_render::{EncoderFactory, Renderer};
use serde::{Deserialize, Serialize};

use crate::pipeline::{BakeOutput, Baker};

/// Cooperative cancellation flag shared between a batch and its caller.
///
/// Cancelling never interrupts the bake in progress; the batch stops before
/// starting the next one.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

fn check_entry(index: usize, request: &BakeRequest) -> Result<()> {
    if request.material.is_none() {
        return Err(BakeError::Validation(format!("entry {index}: no material selected")));
    }
    if request.baked_name.is_empty() {
        return Err(BakeError::Validation(format!("entry {index}: baked name is empty")));
    }
    Ok(())
}

/// Validates a whole batch before anything is baked.
///
/// Every entry needs a material and a non-empty name, and no two entries may
/// share an output path and name.
pub fn validate_batch(requests: &[BakeRequest]) -> Result<()> {
    if requests.is_empty() {
        return Err(BakeError::Validation("batch is empty".into()));
    }
    let mut seen = HashSet::new();
    for (index, request) in requests.iter().enumerate() {
        check_entry(index, request)?;
        if !seen.insert((request.output_path.as_path(), request.baked_name.as_str())) {
            return Err(BakeError::Validation(format!(
                "entry {index}: duplicate output '{}' in '{}'",
                request.baked_name,
                request.output_path.display()
            )));
        }
    }
    Ok(())
}

/// An ordered list of pending bakes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BakeQueue {
    requests: Vec<BakeRequest>,
}

impl BakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request. Requests without a material or name are rejected.
    pub fn push(&mut self, request: BakeRequest) -> Result<()> {
        check_entry(self.requests.len(), &request)?;
        self.requests.push(request);
        Ok(())
    }

    /// Replaces the request at `index`.
    pub fn update(&mut self, index: usize, request: BakeRequest) -> Result<()> {
        check_entry(index, &request)?;
        let slot = self.requests.get_mut(index).ok_or_else(|| {
            BakeError::Validation(format!("no queue entry at index {index}"))
        })?;
        *slot = request;
        Ok(())
    }

    /// Removes and returns the request at `index`.
    pub fn remove(&mut self, index: usize) -> Option<BakeRequest> {
        (index < self.requests.len()).then(|| self.requests.remove(index))
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BakeRequest> {
        self.requests.iter()
    }

    pub fn as_slice(&self) -> &[BakeRequest] {
        &self.requests
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    /// Saves the queue as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Loads a queue saved with [`BakeQueue::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Result of one batch entry.
#[derive(Debug)]
pub enum BatchOutcome {
    Baked(BakeOutput),
    Failed(BakeError),
    /// Not attempted because the batch was cancelled.
    Skipped,
}

/// Per-entry outcomes of a batch, in queue order.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
    /// The batch stopped early on cancellation.
    pub cancelled: bool,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Baked(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, BatchOutcome::Skipped))
    }

    /// True when every entry was baked.
    pub fn is_complete_success(&self) -> bool {
        !self.cancelled && self.succeeded() == self.outcomes.len()
    }

    fn count(&self, pred: impl Fn(&BatchOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

impl<R: Renderer, A: AssetStore, E: EncoderFactory> Baker<R, A, E> {
    /// Validates `requests`, then bakes them one at a time.
    ///
    /// A failed entry is recorded and the batch moves on. `cancel` is checked
    /// before each entry; once set, remaining entries are skipped. Completed
    /// bakes are kept either way.
    pub fn bake_batch(
        &mut self,
        requests: &[BakeRequest],
        cancel: &CancelToken,
    ) -> Result<BatchReport> {
        validate_batch(requests)?;
        log::info!("baking batch of {} entries", requests.len());

        let mut outcomes = Vec::with_capacity(requests.len());
        let mut cancelled = false;
        for (index, request) in requests.iter().enumerate() {
            if cancelled || cancel.is_cancelled() {
                if !cancelled {
                    log::warn!("batch cancelled before entry {index}");
                }
                cancelled = true;
                outcomes.push(BatchOutcome::Skipped);
                continue;
            }
            log::debug!("batch entry {}/{}", index + 1, requests.len());
            match self.bake(request) {
                Ok(output) => outcomes.push(BatchOutcome::Baked(output)),
                Err(e) => {
                    log::error!("batch entry {index} ('{}') failed: {e}", request.baked_name);
                    outcomes.push(BatchOutcome::Failed(e));
                }
            }
        }

        let report = BatchReport {
            outcomes,
            cancelled,
        };
        log::info!(
            "batch finished: {} baked, {} failed, {} skipped",
            report.succeeded(),
            report.failed(),
            report.skipped()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matbake_core::{BakeErrorKind, Material, Vec3};
    use proptest::prelude::*;

    fn request(name: &str) -> BakeRequest {
        BakeRequest::new(Material::solid("M", Vec3::Y), name).with_size(2, 2)
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let err = validate_batch(&[request("T_A"), request("T_B"), request("T_A")]).unwrap_err();
        assert_eq!(err.kind(), BakeErrorKind::Validation);
        assert!(err.to_string().contains("entry 2"));
    }

    #[test]
    fn test_same_name_in_different_paths_is_allowed() {
        let other = request("T_A").with_output_path("/Game/Other");
        assert!(validate_batch(&[request("T_A"), other]).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_batch() {
        assert!(validate_batch(&[]).is_err());
    }

    #[test]
    fn test_queue_push_rejects_invalid() {
        let mut queue = BakeQueue::new();
        assert!(queue.push(request("")).is_err());
        let missing = BakeRequest {
            baked_name: "T_A".into(),
            ..BakeRequest::default()
        };
        assert!(queue.push(missing).is_err());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_edit() {
        let mut queue = BakeQueue::new();
        queue.push(request("T_A")).unwrap();
        queue.push(request("T_B")).unwrap();
        queue.update(1, request("T_C")).unwrap();
        assert!(queue.update(5, request("T_D")).is_err());
        assert_eq!(queue.remove(0).map(|r| r.baked_name), Some("T_A".to_string()));
        assert!(queue.remove(3).is_none());
        let names: Vec<_> = queue.iter().map(|r| r.baked_name.as_str()).collect();
        assert_eq!(names, ["T_C"]);
        queue.clear();
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancelled_batch_skips_everything() {
        let mut baker: Baker = Baker::default();
        let token = CancelToken::new();
        token.cancel();
        let report = baker
            .bake_batch(&[request("T_A"), request("T_B")], &token)
            .unwrap();
        assert!(report.cancelled);
        assert_eq!(report.skipped(), 2);
        assert!(baker.assets().is_empty());
    }

    proptest! {
        #[test]
        fn prop_validation_matches_name_uniqueness(
            names in proptest::collection::vec("T_[A-D]", 1..8),
        ) {
            let batch: Vec<_> = names.iter().map(|n| request(n)).collect();
            let unique: HashSet<_> = names.iter().collect();
            prop_assert_eq!(validate_batch(&batch).is_ok(), unique.len() == names.len());
        }
    }
}
