//! Mark collection for a single document.

use crate::mark::{Mark, MarkId, MarkKind};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mark extent must be non-negative, got {width}x{height}")]
    InvalidGeometry { width: f64, height: f64 },
    #[error("mark not found: {0}")]
    NotFound(MarkId),
}

/// Per-kind mark counts, for host UI badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkTally {
    pub strikes: usize,
    pub checks: usize,
    pub reviewed: usize,
}

/// Owns the set of marks on a document.
///
/// Marks are kept in placement order, which doubles as the stacking
/// order for hit testing (most recently placed wins).
#[derive(Debug, Clone, Default)]
pub struct MarkStore {
    /// All marks, keyed by ID.
    marks: HashMap<MarkId, Mark>,
    /// Placement order (back to front).
    order: Vec<MarkId>,
}

impl MarkStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mark. Fails when any extent dimension is negative.
    pub fn add(
        &mut self,
        kind: MarkKind,
        origin: Point,
        extent: Option<Size>,
    ) -> Result<MarkId, StoreError> {
        if let Some(size) = extent {
            if size.width < 0.0 || size.height < 0.0 {
                return Err(StoreError::InvalidGeometry {
                    width: size.width,
                    height: size.height,
                });
            }
        }
        let mark = Mark::new(kind, origin, extent);
        let id = mark.id();
        self.order.push(id);
        self.marks.insert(id, mark);
        Ok(id)
    }

    /// Re-insert a previously serialized mark, keeping its identity.
    /// Used when rehydrating a session from a saved record.
    pub fn restore(&mut self, mark: Mark) -> Result<MarkId, StoreError> {
        if let Some(size) = mark.extent {
            if size.width < 0.0 || size.height < 0.0 {
                return Err(StoreError::InvalidGeometry {
                    width: size.width,
                    height: size.height,
                });
            }
        }
        let id = mark.id();
        if !self.marks.contains_key(&id) {
            self.order.push(id);
        }
        self.marks.insert(id, mark);
        Ok(id)
    }

    /// Flag a mark as being repositioned.
    pub fn begin_move(&mut self, id: MarkId) -> Result<(), StoreError> {
        let mark = self.marks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        mark.being_moved = true;
        Ok(())
    }

    /// Clear the repositioning flag. Idempotent, including for ids that
    /// no longer exist.
    pub fn end_move(&mut self, id: MarkId) {
        if let Some(mark) = self.marks.get_mut(&id) {
            mark.being_moved = false;
        }
    }

    /// Reposition a mark. Only its origin changes, and only while the
    /// mark is flagged as being moved; otherwise this is a geometric
    /// no-op. Fails when the id is unknown.
    pub fn move_to(&mut self, id: MarkId, new_origin: Point) -> Result<(), StoreError> {
        let mark = self.marks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if mark.being_moved {
            mark.origin = new_origin;
        }
        Ok(())
    }

    /// Delete a mark.
    pub fn remove(&mut self, id: MarkId) -> Result<Mark, StoreError> {
        self.order.retain(|&mark_id| mark_id != id);
        self.marks.remove(&id).ok_or(StoreError::NotFound(id))
    }

    /// Remove all marks.
    pub fn clear(&mut self) {
        self.marks.clear();
        self.order.clear();
    }

    /// Number of live marks of the given kind.
    pub fn count_by_kind(&self, kind: MarkKind) -> usize {
        self.marks.values().filter(|m| m.kind == kind).count()
    }

    /// Per-kind counts in one pass.
    pub fn tally(&self) -> MarkTally {
        let mut tally = MarkTally::default();
        for mark in self.marks.values() {
            match mark.kind {
                MarkKind::Strike => tally.strikes += 1,
                MarkKind::Check => tally.checks += 1,
                MarkKind::Reviewed => tally.reviewed += 1,
            }
        }
        tally
    }

    /// Find the topmost mark at a point, front to back.
    pub fn mark_at_point(&self, point: Point, tolerance: f64) -> Option<MarkId> {
        self.order
            .iter()
            .rev()
            .find(|&&id| {
                self.marks
                    .get(&id)
                    .map(|m| m.hit_test(point, tolerance))
                    .unwrap_or(false)
            })
            .copied()
    }

    /// Get a mark by ID.
    pub fn get(&self, id: MarkId) -> Option<&Mark> {
        self.marks.get(&id)
    }

    /// Iterate marks in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &Mark> {
        self.order.iter().filter_map(|id| self.marks.get(id))
    }

    /// Clone the marks in placement order, for snapshotting.
    pub fn to_vec(&self) -> Vec<Mark> {
        self.iter().cloned().collect()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Get the number of marks.
    pub fn len(&self) -> usize {
        self.marks.len()
    }
}
