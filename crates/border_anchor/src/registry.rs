//! # Border Positioning Registry
//!
//! Flat list of active anchors, ticked once per rendered frame in
//! registration order. The registry only holds weak handles: dropping the
//! last owner handle retires the anchor, and unregistering never destroys
//! it.

use std::sync::{Arc, Weak};

use border_scene::SceneGraph;
use parking_lot::Mutex;

use crate::anchor::{AnchorId, AnchorInstance, SharedAnchor, TickOutcome};
use crate::error::{AnchorError, AnchorResult};

/// Per-frame summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Anchors ticked this frame.
    pub ticked: usize,
    /// Anchors that were placed.
    pub placed: usize,
    /// Anchors that reported an error.
    pub failed: usize,
    /// Dead handles pruned.
    pub pruned: usize,
}

struct Entry {
    id: AnchorId,
    anchor: Weak<Mutex<AnchorInstance>>,
}

/// Ticks every registered anchor once per frame.
#[derive(Default)]
pub struct BorderPositioningSystem {
    entries: Vec<Entry>,
    frame: u64,
}

impl BorderPositioningSystem {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an anchor at the end of the tick order. Registering the same
    /// anchor twice keeps its original position.
    pub fn register(&mut self, anchor: &SharedAnchor) -> AnchorId {
        let id = anchor.lock().id();
        if self.contains(id) {
            tracing::warn!("Anchor {} registered twice; keeping original slot", id);
        } else {
            self.entries.push(Entry {
                id,
                anchor: Arc::downgrade(anchor),
            });
        }
        id
    }

    /// Removes an anchor. The instance itself is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AnchorError::NotRegistered`] if the anchor is not present.
    pub fn unregister(&mut self, id: AnchorId) -> AnchorResult<()> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(AnchorError::NotRegistered(id))?;
        self.entries.remove(index);
        Ok(())
    }

    /// True if the anchor is registered.
    #[must_use]
    pub fn contains(&self, id: AnchorId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Registered anchor IDs in tick order.
    pub fn ids(&self) -> impl Iterator<Item = AnchorId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// Number of registered anchors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frames ticked so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Runs one frame: every live anchor ticks in registration order.
    ///
    /// An anchor's error is logged and counted; the remaining anchors
    /// still tick.
    pub fn tick(&mut self, scene: &mut dyn SceneGraph) -> TickReport {
        self.frame += 1;
        let mut report = TickReport::default();

        for entry in &self.entries {
            let Some(anchor) = entry.anchor.upgrade() else {
                report.pruned += 1;
                continue;
            };
            report.ticked += 1;

            let result = anchor.lock().tick(scene);
            match result {
                Ok(TickOutcome::Placed(_)) => report.placed += 1,
                Ok(TickOutcome::Idle(_) | TickOutcome::Inactive) => {}
                Err(e) if e.is_transient() => {
                    report.failed += 1;
                    tracing::trace!("Anchor {} deferred on frame {}: {}", entry.id, self.frame, e);
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!("Anchor {} failed on frame {}: {}", entry.id, self.frame, e);
                }
            }
        }

        if report.pruned > 0 {
            self.entries.retain(|e| e.anchor.strong_count() > 0);
            tracing::debug!("Pruned {} dropped anchors", report.pruned);
        }

        report
    }
}
