//! Red-black interval tree keyed by [`Range`].
//!
//! Every key owns a bucket of values that share exactly that range, so two
//! annotations over the same offsets live in one node. Nodes are stored in an
//! arena and linked by index; the parent link is a plain index, never an
//! owning reference.
//!
//! Each node caches `max_end`, the largest end offset in its subtree. The cache
//! is rebuilt in one sweep with [`IntervalIndex::rebuild_max_end`] after a bulk
//! load instead of being maintained on every rotation.

use std::cmp::Ordering;

use super::range::Range;

type NodeId = usize;

#[derive(Debug, Clone)]
struct Node<V> {
    key: Range,
    values: Vec<V>,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    red: bool,
    max_end: usize,
}

#[derive(Debug, Clone)]
pub struct IntervalIndex<V> {
    nodes: Vec<Node<V>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    buckets: usize,
    len: usize,
    stale: bool,
}

impl<V> Default for IntervalIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> IntervalIndex<V> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            buckets: 0,
            len: 0,
            stale: false,
        }
    }

    /// Number of values across all buckets.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct ranges.
    pub fn bucket_count(&self) -> usize {
        self.buckets
    }

    /// True when inserts or removals happened since the last
    /// [`rebuild_max_end`](Self::rebuild_max_end).
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Adds `value` under `key`. Returns true if a new bucket was created,
    /// false if the value joined an existing bucket.
    pub fn insert(&mut self, key: Range, value: V) -> bool {
        let mut parent = None;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            parent = Some(id);
            cursor = match key.cmp(&self.nodes[id].key) {
                Ordering::Equal => {
                    self.nodes[id].values.push(value);
                    self.len += 1;
                    return false;
                }
                Ordering::Less => self.nodes[id].left,
                Ordering::Greater => self.nodes[id].right,
            };
        }

        let id = self.alloc(key, value, parent);
        match parent {
            None => self.root = Some(id),
            Some(p) if key < self.nodes[p].key => self.nodes[p].left = Some(id),
            Some(p) => self.nodes[p].right = Some(id),
        }
        self.insert_fixup(id);

        self.len += 1;
        self.buckets += 1;
        self.stale = true;
        true
    }

    /// Removes one occurrence of `value` from the bucket at `key`. The node is
    /// deleted only once its bucket is empty.
    pub fn remove(&mut self, key: Range, value: &V) -> bool
    where
        V: PartialEq,
    {
        let Some(id) = self.find_node(key) else {
            return false;
        };
        let Some(pos) = self.nodes[id].values.iter().position(|v| v == value) else {
            return false;
        };
        self.nodes[id].values.remove(pos);
        self.len -= 1;

        if self.nodes[id].values.is_empty() {
            self.delete_node(id);
            self.buckets -= 1;
            self.stale = true;
        }
        true
    }

    /// Recomputes the `max_end` cache of every node.
    pub fn rebuild_max_end(&mut self) {
        if let Some(root) = self.root {
            self.rebuild_from(root);
        }
        self.stale = false;
    }

    /// All values whose range overlaps `query` and that satisfy `predicate`,
    /// in key order. An empty range lying inside `query` counts as overlapping.
    pub fn find<P>(&self, query: Range, mut predicate: P) -> Vec<&V>
    where
        P: FnMut(&V) -> bool,
    {
        debug_assert!(!self.stale, "interval index queried before rebuild_max_end");
        let mut out = Vec::new();
        self.search(self.root, query, &mut predicate, &mut out);
        out
    }

    /// The bucket stored under exactly `key`.
    pub fn get(&self, key: Range) -> Option<&[V]> {
        self.find_node(key).map(|id| self.nodes[id].values.as_slice())
    }

    pub fn min(&self) -> Option<(Range, &[V])> {
        self.root.map(|r| self.entry(self.leftmost(r)))
    }

    pub fn max(&self) -> Option<(Range, &[V])> {
        self.root.map(|r| self.entry(self.rightmost(r)))
    }

    /// A cursor positioned before the first and after the last bucket.
    pub fn cursor(&self) -> Cursor<'_, V> {
        Cursor {
            index: self,
            node: None,
        }
    }

    /// Buckets in ascending key order.
    pub fn buckets(&self) -> Buckets<'_, V> {
        Buckets {
            cursor: self.cursor(),
            forward: true,
            done: false,
        }
    }

    /// Buckets in descending key order.
    pub fn buckets_rev(&self) -> Buckets<'_, V> {
        Buckets {
            cursor: self.cursor(),
            forward: false,
            done: false,
        }
    }

    fn entry(&self, id: NodeId) -> (Range, &[V]) {
        (self.nodes[id].key, self.nodes[id].values.as_slice())
    }

    fn alloc(&mut self, key: Range, value: V, parent: Option<NodeId>) -> NodeId {
        let node = Node {
            key,
            values: vec![value],
            parent,
            left: None,
            right: None,
            red: true,
            max_end: key.end,
        };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        let node = &mut self.nodes[id];
        node.values.clear();
        node.parent = None;
        node.left = None;
        node.right = None;
        self.free.push(id);
    }

    fn find_node(&self, key: Range) -> Option<NodeId> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            cursor = match key.cmp(&self.nodes[id].key) {
                Ordering::Equal => return Some(id),
                Ordering::Less => self.nodes[id].left,
                Ordering::Greater => self.nodes[id].right,
            };
        }
        None
    }

    fn search<'a, P>(
        &'a self,
        node: Option<NodeId>,
        query: Range,
        predicate: &mut P,
        out: &mut Vec<&'a V>,
    ) where
        P: FnMut(&V) -> bool,
    {
        let Some(id) = node else {
            return;
        };
        let n = &self.nodes[id];

        // Nothing in this subtree reaches the query.
        if query.start > n.max_end {
            return;
        }

        self.search(n.left, query, predicate, out);

        if n.key.overlaps(query) || query.includes(n.key) {
            out.extend(n.values.iter().filter(|v| predicate(v)));
        }

        // Right subtree starts even later.
        if query.end < n.key.start {
            return;
        }

        self.search(n.right, query, predicate, out);
    }

    fn rebuild_from(&mut self, id: NodeId) -> usize {
        let left = self.nodes[id].left.map_or(0, |c| self.rebuild_from(c));
        let right = self.nodes[id].right.map_or(0, |c| self.rebuild_from(c));
        let max_end = self.nodes[id].key.end.max(left).max(right);
        self.nodes[id].max_end = max_end;
        max_end
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        id
    }

    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.nodes[id].right {
            return Some(self.leftmost(right));
        }
        let mut child = id;
        let mut parent = self.nodes[id].parent;
        while let Some(p) = parent {
            if self.nodes[p].right != Some(child) {
                break;
            }
            child = p;
            parent = self.nodes[p].parent;
        }
        parent
    }

    fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.nodes[id].left {
            return Some(self.rightmost(left));
        }
        let mut child = id;
        let mut parent = self.nodes[id].parent;
        while let Some(p) = parent {
            if self.nodes[p].left != Some(child) {
                break;
            }
            child = p;
            parent = self.nodes[p].parent;
        }
        parent
    }

    fn is_red(&self, node: Option<NodeId>) -> bool {
        node.is_some_and(|id| self.nodes[id].red)
    }

    fn set_black(&mut self, node: Option<NodeId>) {
        if let Some(id) = node {
            self.nodes[id].red = false;
        }
    }

    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(p) if self.nodes[p].left == Some(old) => self.nodes[p].left = new,
            Some(p) => self.nodes[p].right = new,
        }
    }

    fn rotate_left(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].right else {
            return;
        };
        let inner = self.nodes[y].left;
        self.nodes[x].right = inner;
        if let Some(c) = inner {
            self.nodes[c].parent = Some(x);
        }
        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));
        self.nodes[y].left = Some(x);
        self.nodes[x].parent = Some(y);
    }

    fn rotate_right(&mut self, x: NodeId) {
        let Some(y) = self.nodes[x].left else {
            return;
        };
        let inner = self.nodes[y].right;
        self.nodes[x].left = inner;
        if let Some(c) = inner {
            self.nodes[c].parent = Some(x);
        }
        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        self.replace_child(parent, x, Some(y));
        self.nodes[y].right = Some(x);
        self.nodes[x].parent = Some(y);
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while let Some(p) = self.nodes[z].parent {
            if !self.nodes[p].red {
                break;
            }
            let Some(g) = self.nodes[p].parent else {
                break;
            };
            if self.nodes[g].left == Some(p) {
                let uncle = self.nodes[g].right;
                if self.is_red(uncle) {
                    self.nodes[p].red = false;
                    self.set_black(uncle);
                    self.nodes[g].red = true;
                    z = g;
                    continue;
                }
                if self.nodes[p].right == Some(z) {
                    z = p;
                    self.rotate_left(z);
                }
                let Some(p) = self.nodes[z].parent else {
                    break;
                };
                let Some(g) = self.nodes[p].parent else {
                    break;
                };
                self.nodes[p].red = false;
                self.nodes[g].red = true;
                self.rotate_right(g);
            } else {
                let uncle = self.nodes[g].left;
                if self.is_red(uncle) {
                    self.nodes[p].red = false;
                    self.set_black(uncle);
                    self.nodes[g].red = true;
                    z = g;
                    continue;
                }
                if self.nodes[p].left == Some(z) {
                    z = p;
                    self.rotate_right(z);
                }
                let Some(p) = self.nodes[z].parent else {
                    break;
                };
                let Some(g) = self.nodes[p].parent else {
                    break;
                };
                self.nodes[p].red = false;
                self.nodes[g].red = true;
                self.rotate_left(g);
            }
        }
        let root = self.root;
        self.set_black(root);
    }

    fn transplant(&mut self, u: NodeId, v: Option<NodeId>) {
        let parent = self.nodes[u].parent;
        self.replace_child(parent, u, v);
        if let Some(v) = v {
            self.nodes[v].parent = parent;
        }
    }

    fn delete_node(&mut self, z: NodeId) {
        let z_left = self.nodes[z].left;
        let z_right = self.nodes[z].right;

        let (x, x_parent, removed_red) = match (z_left, z_right) {
            (None, _) => {
                let parent = self.nodes[z].parent;
                let red = self.nodes[z].red;
                self.transplant(z, z_right);
                (z_right, parent, red)
            }
            (Some(_), None) => {
                let parent = self.nodes[z].parent;
                let red = self.nodes[z].red;
                self.transplant(z, z_left);
                (z_left, parent, red)
            }
            (Some(left), Some(right)) => {
                let y = self.leftmost(right);
                let red = self.nodes[y].red;
                let x = self.nodes[y].right;
                let x_parent = if self.nodes[y].parent == Some(z) {
                    Some(y)
                } else {
                    let parent = self.nodes[y].parent;
                    self.transplant(y, x);
                    self.nodes[y].right = Some(right);
                    self.nodes[right].parent = Some(y);
                    parent
                };
                self.transplant(z, Some(y));
                self.nodes[y].left = Some(left);
                self.nodes[left].parent = Some(y);
                self.nodes[y].red = self.nodes[z].red;
                (x, x_parent, red)
            }
        };

        if !removed_red {
            self.delete_fixup(x, x_parent);
        }
        self.release(z);
    }

    fn delete_fixup(&mut self, mut x: Option<NodeId>, mut parent: Option<NodeId>) {
        while x != self.root && !self.is_red(x) {
            let Some(p) = parent else {
                break;
            };
            if self.nodes[p].left == x {
                let mut w = self.nodes[p].right;
                if self.is_red(w) {
                    self.set_black(w);
                    self.nodes[p].red = true;
                    self.rotate_left(p);
                    w = self.nodes[p].right;
                }
                let Some(wi) = w else {
                    x = Some(p);
                    parent = self.nodes[p].parent;
                    continue;
                };
                if !self.is_red(self.nodes[wi].left) && !self.is_red(self.nodes[wi].right) {
                    self.nodes[wi].red = true;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if !self.is_red(self.nodes[wi].right) {
                        let inner = self.nodes[wi].left;
                        self.set_black(inner);
                        self.nodes[wi].red = true;
                        self.rotate_right(wi);
                    }
                    let Some(wi) = self.nodes[p].right else {
                        break;
                    };
                    self.nodes[wi].red = self.nodes[p].red;
                    self.nodes[p].red = false;
                    let outer = self.nodes[wi].right;
                    self.set_black(outer);
                    self.rotate_left(p);
                    x = self.root;
                    parent = None;
                }
            } else {
                let mut w = self.nodes[p].left;
                if self.is_red(w) {
                    self.set_black(w);
                    self.nodes[p].red = true;
                    self.rotate_right(p);
                    w = self.nodes[p].left;
                }
                let Some(wi) = w else {
                    x = Some(p);
                    parent = self.nodes[p].parent;
                    continue;
                };
                if !self.is_red(self.nodes[wi].left) && !self.is_red(self.nodes[wi].right) {
                    self.nodes[wi].red = true;
                    x = Some(p);
                    parent = self.nodes[p].parent;
                } else {
                    if !self.is_red(self.nodes[wi].left) {
                        let inner = self.nodes[wi].right;
                        self.set_black(inner);
                        self.nodes[wi].red = true;
                        self.rotate_left(wi);
                    }
                    let Some(wi) = self.nodes[p].left else {
                        break;
                    };
                    self.nodes[wi].red = self.nodes[p].red;
                    self.nodes[p].red = false;
                    let outer = self.nodes[wi].left;
                    self.set_black(outer);
                    self.rotate_right(p);
                    x = self.root;
                    parent = None;
                }
            }
        }
        self.set_black(x);
    }
}

impl<V> FromIterator<(Range, V)> for IntervalIndex<V> {
    fn from_iter<I: IntoIterator<Item = (Range, V)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (key, value) in iter {
            index.insert(key, value);
        }
        index.rebuild_max_end();
        index
    }
}

/// Re-entrant bidirectional cursor over the buckets of an [`IntervalIndex`].
///
/// A fresh cursor sits on no bucket. `next()` from there yields the first
/// bucket, `prev()` the last; stepping past either end returns `None` and
/// puts the cursor back on no bucket, so iteration can start over.
pub struct Cursor<'a, V> {
    index: &'a IntervalIndex<V>,
    node: Option<NodeId>,
}

impl<'a, V> Cursor<'a, V> {
    pub fn current(&self) -> Option<(Range, &'a [V])> {
        self.node.map(|id| self.index.entry(id))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(Range, &'a [V])> {
        self.node = match self.node {
            None => self.index.root.map(|r| self.index.leftmost(r)),
            Some(id) => self.index.successor(id),
        };
        self.current()
    }

    pub fn prev(&mut self) -> Option<(Range, &'a [V])> {
        self.node = match self.node {
            None => self.index.root.map(|r| self.index.rightmost(r)),
            Some(id) => self.index.predecessor(id),
        };
        self.current()
    }

    pub fn reset(&mut self) {
        self.node = None;
    }
}

/// Iterator adapter over a [`Cursor`]; stops at the first end it reaches.
pub struct Buckets<'a, V> {
    cursor: Cursor<'a, V>,
    forward: bool,
    done: bool,
}

impl<'a, V> Iterator for Buckets<'a, V> {
    type Item = (Range, &'a [V]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = if self.forward {
            self.cursor.next()
        } else {
            self.cursor.prev()
        };
        self.done = item.is_none();
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// Asserts red-black shape, key order and the `max_end` cache.
    fn check_invariants<V>(index: &IntervalIndex<V>) {
        fn walk<V>(index: &IntervalIndex<V>, node: Option<NodeId>, parent: Option<NodeId>) -> usize {
            let Some(id) = node else {
                return 1;
            };
            let n = &index.nodes[id];
            assert_eq!(n.parent, parent, "broken parent link at {}", n.key);
            assert!(!n.values.is_empty(), "empty bucket at {}", n.key);
            if n.red {
                assert!(!index.is_red(n.left) && !index.is_red(n.right), "red-red at {}", n.key);
            }
            if let Some(l) = n.left {
                assert!(index.nodes[l].key < n.key);
                assert!(n.max_end >= index.nodes[l].max_end);
            }
            if let Some(r) = n.right {
                assert!(index.nodes[r].key > n.key);
                assert!(n.max_end >= index.nodes[r].max_end);
            }
            assert!(n.max_end >= n.key.end);
            let lh = walk(index, n.left, Some(id));
            let rh = walk(index, n.right, Some(id));
            assert_eq!(lh, rh, "unequal black height at {}", n.key);
            lh + usize::from(!n.red)
        }
        assert!(!index.is_red(index.root), "red root");
        walk(index, index.root, None);
    }

    fn sample() -> IntervalIndex<&'static str> {
        [
            (Range::new(0, 10), "page"),
            (Range::new(0, 4), "line1"),
            (Range::new(4, 10), "line2"),
            (Range::new(2, 3), "hi"),
            (Range::new(0, 4), "zone-ish"),
            (Range::new(6, 6), "anchor"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn insert_reports_new_buckets() {
        let mut index = IntervalIndex::new();
        assert!(index.insert(Range::new(0, 2), 1));
        assert!(!index.insert(Range::new(0, 2), 2));
        assert!(index.insert(Range::new(0, 3), 3));
        assert_eq!(index.len(), 3);
        assert_eq!(index.bucket_count(), 2);
        assert_eq!(index.get(Range::new(0, 2)), Some(&[1, 2][..]));
    }

    #[test]
    fn find_returns_overlapping_values_in_key_order() {
        let index = sample();
        let found = index.find(Range::new(3, 5), |_| true);
        assert_eq!(found, vec![&"page", &"line1", &"zone-ish", &"line2"]);
    }

    #[test]
    fn find_includes_empty_ranges_inside_query() {
        let index = sample();
        assert_eq!(index.find(Range::new(6, 6), |_| true), vec![&"anchor"]);
        let found = index.find(Range::new(5, 7), |v| v.starts_with('a'));
        assert_eq!(found, vec![&"anchor"]);
    }

    #[test]
    fn min_max_and_cursor() {
        let index = sample();
        assert_eq!(index.min().map(|(r, _)| r), Some(Range::new(0, 10)));
        assert_eq!(index.max().map(|(r, _)| r), Some(Range::new(6, 6)));

        let mut cursor = index.cursor();
        assert!(cursor.current().is_none());
        let forward: Vec<Range> = std::iter::from_fn(|| cursor.next().map(|(r, _)| r)).collect();
        assert_eq!(forward.len(), 5);
        // exhausted cursor restarts from the other end
        assert_eq!(cursor.prev().map(|(r, _)| r), Some(Range::new(6, 6)));
        cursor.reset();
        assert_eq!(cursor.next().map(|(r, _)| r), Some(Range::new(0, 10)));

        let backward: Vec<Range> = index.buckets_rev().map(|(r, _)| r).collect();
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(backward, reversed);
    }

    #[test]
    fn remove_is_bucket_aware() {
        let mut index = sample();
        assert!(index.remove(Range::new(0, 4), &"line1"));
        assert_eq!(index.bucket_count(), 5);
        assert_eq!(index.get(Range::new(0, 4)), Some(&["zone-ish"][..]));
        assert!(index.remove(Range::new(0, 4), &"zone-ish"));
        assert_eq!(index.bucket_count(), 4);
        assert!(!index.remove(Range::new(0, 4), &"zone-ish"));
        assert!(!index.remove(Range::new(2, 3), &"nope"));
        index.rebuild_max_end();
        check_invariants(&index);
        assert_eq!(index.find(Range::new(0, 1), |_| true), vec![&"page"]);
    }

    #[test]
    fn sequential_inserts_stay_balanced() {
        let mut index = IntervalIndex::new();
        for i in 0..500 {
            index.insert(Range::new(i, i + 3), i);
        }
        index.rebuild_max_end();
        check_invariants(&index);
        let found: Vec<usize> = index.find(Range::new(100, 102), |_| true).into_iter().copied().collect();
        assert_eq!(found, vec![98, 99, 100, 101]);
    }

    fn entries() -> impl Strategy<Value = Vec<(Range, usize)>> {
        prop::collection::vec((0usize..60, 0usize..15), 0..80).prop_map(|pairs| {
            pairs
                .into_iter()
                .enumerate()
                .map(|(i, (start, len))| (Range::new(start, start + len), i))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn find_matches_brute_force(
            entries in entries(),
            shuffle in any::<prop::sample::Index>(),
            qs in 0usize..70,
            ql in 0usize..20,
        ) {
            let query = Range::new(qs, qs + ql);
            let mut ordered = entries.clone();
            let pivot = if ordered.is_empty() { 0 } else { shuffle.index(ordered.len()) };
            ordered.rotate_left(pivot);

            let index: IntervalIndex<usize> = ordered.into_iter().collect();
            check_invariants(&index);

            let mut found: Vec<usize> = index.find(query, |_| true).into_iter().copied().collect();
            found.sort_unstable();
            let mut expected: Vec<usize> = entries
                .iter()
                .filter(|(r, _)| r.overlaps(query) || query.includes(*r))
                .map(|(_, v)| *v)
                .collect();
            expected.sort_unstable();
            prop_assert_eq!(found, expected);
        }

        #[test]
        fn removals_keep_tree_valid(entries in entries(), keep in 0usize..80) {
            let mut index: IntervalIndex<usize> = entries.iter().copied().collect();
            for (range, value) in entries.iter().skip(keep) {
                prop_assert!(index.remove(*range, value));
            }
            index.rebuild_max_end();
            check_invariants(&index);
            prop_assert_eq!(index.len(), entries.len().min(keep));
            let all: Vec<usize> = index.buckets().flat_map(|(_, vs)| vs.iter().copied()).collect();
            prop_assert_eq!(all.len(), index.len());
        }
    }
}
