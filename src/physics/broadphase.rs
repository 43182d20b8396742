//! Exhaustive pair enumeration.

use std::collections::HashSet;

use super::body::{Body, BodyHandle};

/// Unordered body pairs already handled during the current step.
#[derive(Debug, Default, Clone)]
pub struct VisitedPairs {
    pairs: HashSet<(BodyHandle, BodyHandle)>,
}

impl VisitedPairs {
    fn key(a: BodyHandle, b: BodyHandle) -> (BodyHandle, BodyHandle) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Mark a pair. Returns `false` if it was already marked in either order.
    pub fn insert(&mut self, a: BodyHandle, b: BodyHandle) -> bool {
        self.pairs.insert(Self::key(a, b))
    }

    pub fn contains(&self, a: BodyHandle, b: BodyHandle) -> bool {
        self.pairs.contains(&Self::key(a, b))
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Brute-force pair finder over every live body (O(n^2), in slot order).
#[derive(Debug, Default)]
pub struct AllPairs {
    visited: VisitedPairs,
}

impl AllPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect each unordered pair of live bodies once.
    ///
    /// Pairs are walked as ordered `(a, b)`, `a != b`, in slot order, and the
    /// visited set drops the mirrored pair, so the result is deterministic.
    /// Pairs of two static bodies are kept so their overlap is still reported.
    pub fn find_pairs(&mut self, slots: &[Option<Body>]) -> Vec<(BodyHandle, BodyHandle)> {
        self.visited.clear();
        let mut pairs = Vec::new();

        for (i, body_a) in slots.iter().enumerate() {
            if body_a.is_none() {
                continue;
            }
            for (j, body_b) in slots.iter().enumerate() {
                if i == j || body_b.is_none() {
                    continue;
                }

                let (a, b) = (BodyHandle(i as u32), BodyHandle(j as u32));
                if self.visited.insert(a, b) {
                    pairs.push((a, b));
                }
            }
        }
        pairs
    }

    /// Pairs marked during the last [`find_pairs`](Self::find_pairs).
    pub fn visited(&self) -> &VisitedPairs {
        &self.visited
    }
}
