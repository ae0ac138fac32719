// Sliding window of the most recent points
use super::telemetry::Point;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

/// Immutable view of the window handed to the renderer.
///
/// `sequence` counts publications since the window was created; the initial
/// empty snapshot has sequence 0.
#[derive(Debug, Clone, Serialize)]
pub struct WindowSnapshot {
    pub sequence: u64,
    pub capacity: usize,
    pub points: Arc<[Point]>,
}

impl WindowSnapshot {
    pub fn empty(capacity: usize) -> Self {
        Self {
            sequence: 0,
            capacity,
            points: Arc::from(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&Point> {
        self.points.last()
    }
}

/// Bounded, arrival-ordered buffer of points.
///
/// Points are never re-sorted. Once `capacity` is reached every append evicts
/// exactly one point from the front.
#[derive(Debug)]
pub struct SlidingWindow {
    points: VecDeque<Point>,
    capacity: usize,
    sequence: u64,
}

impl SlidingWindow {
    /// `capacity` must be at least 1; the config loader rejects anything else.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be at least 1");
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            sequence: 0,
        }
    }

    pub fn last(&self) -> Option<&Point> {
        self.points.back()
    }

    /// Append `point` and return the resulting snapshot.
    pub fn append(&mut self, point: Point) -> WindowSnapshot {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
        debug_assert!(
            self.points.len() <= self.capacity,
            "window holds {} points, capacity is {}",
            self.points.len(),
            self.capacity
        );
        self.sequence += 1;
        self.snapshot()
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            sequence: self.sequence,
            capacity: self.capacity,
            points: self.points.iter().copied().collect(),
        }
    }
}
