// src/graph/traversal.rs

//! Visitor protocol shared by every traversal in the crate.

/// What a traversal should do after a visitor has seen a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalAction<T> {
    /// Keep walking, descending into the node's children.
    Continue,
    /// Keep walking, but do not descend below this node.
    SkipChildren,
    /// End the traversal; the value becomes the traversal's result.
    Stop(T),
}

impl<T> TraversalAction<T> {
    /// `Stop(value)` when the option holds a value, `Continue` otherwise.
    ///
    /// Handy for "find the first node matching ..." visitors.
    pub fn stop_if_some(value: Option<T>) -> Self {
        match value {
            Some(v) => TraversalAction::Stop(v),
            None => TraversalAction::Continue,
        }
    }
}
