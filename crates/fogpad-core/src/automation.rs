//! Collapsing host automation into the parameter model.
//!
//! The host delivers one queue of timestamped points per changed parameter.
//! The engine applies parameters per block, so only the last point of each
//! queue matters. Merging never allocates and never syncs; the caller syncs
//! once after the whole batch.

use crate::parameters::{ParameterId, ParameterModel};
use crate::types::{ParamId, ParamValue};

/// One automation point: a value at a sample offset within the block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationPoint {
    pub sample_offset: i32,
    pub value: ParamValue,
}

/// Read access to a host automation queue for one parameter.
pub trait ParameterQueue {
    /// Host id of the parameter this queue automates.
    fn parameter_id(&self) -> ParamId;

    /// Number of points in the queue.
    fn point_count(&self) -> usize;

    /// Point at `index`, `None` if the host fails to deliver it.
    fn point(&self, index: usize) -> Option<AutomationPoint>;

    /// The final point, which is the only one the engine honors.
    fn last_point(&self) -> Option<AutomationPoint> {
        match self.point_count() {
            0 => None,
            count => self.point(count - 1),
        }
    }
}

/// An in-memory automation queue.
#[derive(Debug, Clone, Copy)]
pub struct AutomationEvent<'a> {
    pub id: ParamId,
    pub points: &'a [AutomationPoint],
}

impl<'a> AutomationEvent<'a> {
    pub fn new(id: ParamId, points: &'a [AutomationPoint]) -> Self {
        Self { id, points }
    }
}

impl ParameterQueue for AutomationEvent<'_> {
    fn parameter_id(&self) -> ParamId {
        self.id
    }

    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn point(&self, index: usize) -> Option<AutomationPoint> {
        self.points.get(index).copied()
    }
}

impl<Q: ParameterQueue + ?Sized> ParameterQueue for &Q {
    fn parameter_id(&self) -> ParamId {
        (**self).parameter_id()
    }

    fn point_count(&self) -> usize {
        (**self).point_count()
    }

    fn point(&self, index: usize) -> Option<AutomationPoint> {
        (**self).point(index)
    }
}

/// Apply a batch of automation queues to `model`.
///
/// For each queue the last point's value is written to the matching field.
/// Queues for unknown ids and empty queues are skipped. When several queues
/// target the same field, the one visited last wins.
///
/// Returns the number of queues visited, so the caller can decide whether a
/// sync is due.
pub fn merge<I>(batch: I, model: &mut ParameterModel) -> usize
where
    I: IntoIterator,
    I::Item: ParameterQueue,
{
    let mut visited = 0;
    for queue in batch {
        visited += 1;
        let Some(id) = ParameterId::from_raw(queue.parameter_id()) else {
            continue;
        };
        if let Some(point) = queue.last_point() {
            model.set(id, point.value as f32);
        }
    }
    visited
}
