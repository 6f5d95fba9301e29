//! Ordered multiset used by the percentile aggregates.
//!
//! Each distinct key is stored once together with the number of times it was
//! inserted. Nodes live in an arena and are linked by index; the tree is kept
//! balanced with AA-tree levels so insertion stays O(log n) even when rows
//! arrive already sorted, which is the common case for `ORDER BY` subqueries.
//!
//! ```text
//!            [2 x2] (level 2)
//!           /       \
//!       [1 x1]     [3 x1] -> [5 x1]     (right links at equal level)
//! ```

use std::cmp::Ordering;

const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<T> {
    value: T,
    count: u64,
    left: usize,
    right: usize,
    level: u32,
}

/// A multiset ordered by a caller-supplied three-way comparator.
pub struct OrderedMultiset<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    nodes: Vec<Node<T>>,
    root: usize,
    cmp: C,
    total: u64,
}

impl<T: Ord> OrderedMultiset<T, fn(&T, &T) -> Ordering> {
    /// Multiset ordered by `T`'s own `Ord`.
    pub fn new_ord() -> Self {
        OrderedMultiset::new(T::cmp as fn(&T, &T) -> Ordering)
    }
}

impl<T, C> OrderedMultiset<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    pub fn new(cmp: C) -> Self {
        Self {
            nodes: Vec::new(),
            root: NIL,
            cmp,
            total: 0,
        }
    }

    /// Add one occurrence of `value`.
    ///
    /// If an equal key is already present its count is bumped and `value`
    /// is dropped.
    pub fn insert(&mut self, value: T) {
        self.total += 1;

        let mut cur = self.root;
        while cur != NIL {
            let node = &self.nodes[cur];
            match (self.cmp)(&value, &node.value) {
                Ordering::Less => cur = node.left,
                Ordering::Greater => cur = node.right,
                Ordering::Equal => {
                    self.nodes[cur].count += 1;
                    return;
                }
            }
        }

        let idx = self.nodes.len();
        self.nodes.push(Node {
            value,
            count: 1,
            left: NIL,
            right: NIL,
            level: 1,
        });
        self.root = self.link(self.root, idx);
    }

    // Recursion depth is bounded by the tree height, which AA levels keep
    // logarithmic.
    fn link(&mut self, t: usize, idx: usize) -> usize {
        if t == NIL {
            return idx;
        }
        if (self.cmp)(&self.nodes[idx].value, &self.nodes[t].value) == Ordering::Less {
            let left = self.link(self.nodes[t].left, idx);
            self.nodes[t].left = left;
        } else {
            let right = self.link(self.nodes[t].right, idx);
            self.nodes[t].right = right;
        }
        let t = self.skew(t);
        self.split(t)
    }

    fn skew(&mut self, t: usize) -> usize {
        let l = self.nodes[t].left;
        if l != NIL && self.nodes[l].level == self.nodes[t].level {
            self.nodes[t].left = self.nodes[l].right;
            self.nodes[l].right = t;
            return l;
        }
        t
    }

    fn split(&mut self, t: usize) -> usize {
        let r = self.nodes[t].right;
        if r == NIL {
            return t;
        }
        let rr = self.nodes[r].right;
        if rr != NIL && self.nodes[rr].level == self.nodes[t].level {
            self.nodes[t].right = self.nodes[r].left;
            self.nodes[r].left = t;
            self.nodes[r].level += 1;
            return r;
        }
        t
    }

    /// Visit every distinct value with its count, in ascending order.
    pub fn iterate<F>(&self, mut visit: F)
    where
        F: FnMut(&T, u64),
    {
        for (value, count) in self.iter() {
            visit(value, count);
        }
    }

    /// In-order iterator over `(value, count)` pairs.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            nodes: &self.nodes,
            stack: Vec::new(),
        };
        iter.push_left(self.root);
        iter
    }

    /// Release every node and stored value.
    pub fn destroy(self) {
        drop(self);
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of insertions, duplicates included.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Longest root-to-leaf path, counted in nodes.
    pub fn height(&self) -> usize {
        let mut best = 0;
        let mut stack = Vec::new();
        if self.root != NIL {
            stack.push((self.root, 1usize));
        }
        while let Some((idx, depth)) = stack.pop() {
            best = best.max(depth);
            let node = &self.nodes[idx];
            if node.left != NIL {
                stack.push((node.left, depth + 1));
            }
            if node.right != NIL {
                stack.push((node.right, depth + 1));
            }
        }
        best
    }
}

/// In-order traversal over an [`OrderedMultiset`].
pub struct Iter<'a, T> {
    nodes: &'a [Node<T>],
    stack: Vec<usize>,
}

impl<'a, T> Iter<'a, T> {
    fn push_left(&mut self, mut idx: usize) {
        while idx != NIL {
            self.stack.push(idx);
            idx = self.nodes[idx].left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (&'a T, u64);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = &self.nodes[idx];
        self.push_left(node.right);
        Some((&node.value, node.count))
    }
}

/// Three-way comparison for integer keys.
pub fn int_cmp(a: &i64, b: &i64) -> Ordering {
    a.cmp(b)
}

/// Three-way comparison for real keys.
pub fn real_cmp(a: &f64, b: &f64) -> Ordering {
    a.total_cmp(b)
}
