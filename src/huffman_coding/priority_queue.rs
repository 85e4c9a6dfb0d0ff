//! Binary min-heap ordered by a caller supplied `less` comparison.
//!
//! Ties are not broken by any secondary key. Given one sequence of inserts and extracts the
//! output order is always the same, but two insertion orders of equal items may extract
//! differently.

use crate::error::{BzError, Result};

#[derive(Debug, Clone)]
pub struct PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    heap: Vec<T>,
    less: F,
}

impl<T, F> PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    /// `less(a, b)` must return true only when a is strictly smaller than b.
    pub fn new(less: F) -> Self {
        Self { heap: vec![], less }
    }

    pub fn with_capacity(capacity: usize, less: F) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            less,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Add an item and restore the heap order above it.
    pub fn insert(&mut self, item: T) {
        self.heap.push(item);
        self.sift_up(self.heap.len() - 1);
    }

    /// Remove and return the minimum. Fails with `EmptyQueue` when there is nothing to take.
    pub fn extract_min(&mut self) -> Result<T> {
        if self.heap.is_empty() {
            return Err(BzError::EmptyQueue);
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let min = self.heap.pop().ok_or(BzError::EmptyQueue)?;
        self.sift_down(0);
        Ok(min)
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !(self.less)(&self.heap[i], &self.heap[parent]) {
                break;
            }
            self.heap.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.heap.len();
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            // The right child only wins when strictly smaller, so ties go left
            let mut child = left;
            if left + 1 < n && (self.less)(&self.heap[left + 1], &self.heap[left]) {
                child = left + 1;
            }
            if !(self.less)(&self.heap[child], &self.heap[i]) {
                break;
            }
            self.heap.swap(i, child);
            i = child;
        }
    }
}
