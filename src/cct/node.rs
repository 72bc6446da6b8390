//! CCT node structure and collapsed-stack derivation.

use std::collections::HashMap;

/// A single collapsed stack entry
///
/// **Public** - used by metrics and the flamegraph generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Weight (samples, bytes, ...) attributed to this exact stack
    pub weight: u64,
}

impl CollapsedStack {
    /// Create a new collapsed stack
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }
}

/// One node of a calling-context tree.
///
/// `self_weight` is the weight recorded directly at this frame,
/// `total_weight` includes all descendants. `hits` counts events whose
/// innermost frame landed here.
#[derive(Debug, Clone, Default)]
pub struct CctNode {
    /// Frame label (function name, allocation site, class name, ...)
    pub frame: String,

    /// Weight attributed directly to this frame
    pub self_weight: u64,

    /// Weight of this frame plus all descendants
    pub total_weight: u64,

    /// Number of events terminating at this frame
    pub hits: u64,

    /// Child frames keyed by label
    pub children: HashMap<String, CctNode>,
}

impl CctNode {
    /// Create an empty node with the given frame label
    pub fn new(frame: impl Into<String>) -> Self {
        Self {
            frame: frame.into(),
            self_weight: 0,
            total_weight: 0,
            hits: 0,
            children: HashMap::new(),
        }
    }

    /// Merge one calling context into the tree.
    ///
    /// `frames` is ordered outermost-first. The weight lands on the
    /// innermost frame's `self_weight`; `total_weight` accumulates on
    /// every node along the path.
    pub fn insert_path<S: AsRef<str>>(&mut self, frames: &[S], weight: u64) {
        self.insert_path_counted(frames, weight, 1);
    }

    /// Like [`insert_path`](Self::insert_path), but attributes `hits`
    /// events to the innermost frame (used when one record stands for
    /// several identical events, e.g. an allocation count).
    pub fn insert_path_counted<S: AsRef<str>>(&mut self, frames: &[S], weight: u64, hits: u64) {
        self.total_weight += weight;
        match frames.split_first() {
            None => {
                self.self_weight += weight;
                self.hits += hits;
            }
            Some((head, tail)) => {
                let child = self
                    .children
                    .entry(head.as_ref().to_string())
                    .or_insert_with(|| CctNode::new(head.as_ref()));
                child.insert_path_counted(tail, weight, hits);
            }
        }
    }

    /// Number of nodes in the tree, this node included
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(CctNode::node_count).sum::<usize>()
    }

    /// Depth of the tree below this node (0 for a leaf)
    pub fn depth(&self) -> usize {
        self.children
            .values()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Derive collapsed stacks from the tree, sorted by weight (descending).
    ///
    /// The root node's own label is omitted from the stack strings; only
    /// frames with nonzero self weight or hits produce an entry.
    pub fn collapsed_stacks(&self) -> Vec<CollapsedStack> {
        let mut stacks = Vec::new();
        for child in self.children.values() {
            child.collect_stacks(String::new(), &mut stacks);
        }
        stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then(a.stack.cmp(&b.stack)));
        stacks
    }

    fn collect_stacks(&self, prefix: String, out: &mut Vec<CollapsedStack>) {
        let path = if prefix.is_empty() {
            self.frame.clone()
        } else {
            format!("{};{}", prefix, self.frame)
        };

        if self.self_weight > 0 || self.hits > 0 {
            out.push(CollapsedStack::new(path.clone(), self.self_weight));
        }

        for child in self.children.values() {
            child.collect_stacks(path.clone(), out);
        }
    }
}
