//! Priority queue entries of the shortest path search.

use std::cmp::Ordering;

/// Best known distance to a node during a search.
///
/// Entries are ordered by `tentative_distance + estimate`, so a min-heap of
/// them yields plain Dijkstra order when every estimate is zero and A*
/// order otherwise. An entry is replaced, never mutated, when a shorter
/// path to its node shows up.
#[derive(Debug, Clone)]
pub struct TentativeDistance<N, E> {
    pub node: N,
    /// The edge the node was reached by; `None` for sources.
    pub parent_edge: Option<E>,
    pub tentative_distance: f64,
    /// Lower bound on the remaining distance to the destination.
    pub estimate: f64,
}

impl<N, E> TentativeDistance<N, E> {
    pub fn new(node: N, parent_edge: Option<E>, tentative_distance: f64, estimate: f64) -> Self {
        Self {
            node,
            parent_edge,
            tentative_distance,
            estimate,
        }
    }

    /// The key the search orders entries by.
    pub fn priority(&self) -> f64 {
        self.tentative_distance + self.estimate
    }
}

impl<N, E> PartialEq for TentativeDistance<N, E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N, E> Eq for TentativeDistance<N, E> {}

impl<N, E> PartialOrd for TentativeDistance<N, E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N, E> Ord for TentativeDistance<N, E> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority()
            .total_cmp(&other.priority())
            // Prefer entries closer to the source among equal priorities
            .then_with(|| self.tentative_distance.total_cmp(&other.tentative_distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    fn entry(node: u32, tentative: f64, estimate: f64) -> TentativeDistance<u32, ()> {
        TentativeDistance::new(node, None, tentative, estimate)
    }

    #[test]
    fn ordered_by_tentative_plus_estimate() {
        assert!(entry(1, 1.0, 5.0) > entry(2, 3.0, 2.0));
        assert!(entry(1, 1.0, 0.0) < entry(2, 3.0, 0.0));
        assert_eq!(entry(1, 2.0, 2.0).priority(), 4.0);
    }

    #[test]
    fn ties_prefer_smaller_tentative() {
        assert!(entry(1, 1.0, 3.0) < entry(2, 3.0, 1.0));
    }

    #[test]
    fn min_heap_pops_smallest_key() {
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(entry(1, 5.0, 0.0)));
        heap.push(Reverse(entry(2, 1.0, 1.0)));
        heap.push(Reverse(entry(3, 3.0, 0.0)));

        let order: Vec<u32> = std::iter::from_fn(|| heap.pop().map(|Reverse(e)| e.node)).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }
}
