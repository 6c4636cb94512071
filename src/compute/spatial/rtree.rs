//! Bounding-box R-tree with OMT bulk loading and R*-style node splits.
//!
//! The tree is generic over its payload and never looks at it; every decision
//! is made on [`BoundingBox`] values alone.
//!
//! ## Bulk loading
//!
//! [`RTree::build`] packs a complete item list with the OMT ("overlap
//! minimizing top-down") variant of sort-tile-recursive loading. The target
//! height is chosen up front, the root fan-out is reduced so that every level
//! is as full as possible, and items are cut into near-square tiles with
//! [`multi_select`], first by `min_x`, then by `min_y` within each slab.
//!
//! ## Incremental insertion
//!
//! [`RTree::insert`] descends along the child needing the least area
//! enlargement, appends the entry to a leaf, and splits overflowing nodes on
//! the way back up. Splits pick the axis with the smaller total margin and
//! the cut with the smallest overlap, then the smallest total area.
//!
//! ## Example
//!
//! ```rust
//! use polylocate::compute::spatial::rtree::{Entry, RTree};
//! use polylocate::BoundingBox;
//!
//! let items = (0..100)
//!     .map(|i| {
//!         let x = i as f64;
//!         Entry::new(BoundingBox::new(x, 0.0, x + 0.5, 1.0), i)
//!     })
//!     .collect();
//! let tree = RTree::build(9, items);
//!
//! let hits = tree.search(&BoundingBox::new(10.0, 0.0, 12.0, 1.0));
//! let mut ids: Vec<_> = hits.iter().map(|e| e.payload).collect();
//! ids.sort();
//! assert_eq!(ids, vec![10, 11, 12]);
//! ```

use polylocate_types::bbox::BoundingBox;
use smallvec::SmallVec;

use super::select::multi_select;

/// Default maximum number of children per node.
pub const DEFAULT_MAX_ENTRIES: usize = 9;

/// Smallest accepted `max_entries`; smaller requests are raised to this.
pub const MIN_MAX_ENTRIES: usize = 4;

type InsertPath = SmallVec<[usize; 16]>;

/// An indexed item: a bounding box plus an opaque payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    pub bbox: BoundingBox,
    pub payload: T,
}

impl<T> Entry<T> {
    pub fn new(bbox: BoundingBox, payload: T) -> Self {
        Self { bbox, payload }
    }
}

/// A tree node. Leaves own entries, internal nodes own child nodes.
#[derive(Debug, Clone)]
pub struct Node<T> {
    bbox: BoundingBox,
    height: usize,
    kind: NodeKind<T>,
}

#[derive(Debug, Clone)]
enum NodeKind<T> {
    Leaf(Vec<Entry<T>>),
    Internal(Vec<Node<T>>),
}

/// Something that sits in a node and has a box: an entry or a child node.
trait Bounded {
    fn bounds(&self) -> &BoundingBox;
}

impl<T> Bounded for Entry<T> {
    fn bounds(&self) -> &BoundingBox {
        &self.bbox
    }
}

impl<T> Bounded for Node<T> {
    fn bounds(&self) -> &BoundingBox {
        &self.bbox
    }
}

/// What gets inserted: a leaf-level entry, or a whole subtree during `load`.
enum Child<T> {
    Entry(Entry<T>),
    Node(Node<T>),
}

impl<T> Child<T> {
    fn bbox(&self) -> BoundingBox {
        match self {
            Child::Entry(entry) => entry.bbox,
            Child::Node(node) => node.bbox,
        }
    }
}

fn union_of<C: Bounded>(items: &[C]) -> BoundingBox {
    items.iter().fold(BoundingBox::empty(), |mut acc, item| {
        acc.extend(item.bounds());
        acc
    })
}

impl<T> Node<T> {
    fn leaf(entries: Vec<Entry<T>>) -> Self {
        Self {
            bbox: union_of(&entries),
            height: 1,
            kind: NodeKind::Leaf(entries),
        }
    }

    fn internal(children: Vec<Node<T>>, height: usize) -> Self {
        debug_assert!(height > 1, "internal node must sit above the leaves");
        Self {
            bbox: union_of(&children),
            height,
            kind: NodeKind::Internal(children),
        }
    }

    /// Tight box around every entry below this node.
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Height counted from the leaves; a leaf has height 1.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Child nodes of an internal node; empty for a leaf.
    pub fn children(&self) -> &[Node<T>] {
        match &self.kind {
            NodeKind::Internal(children) => children,
            NodeKind::Leaf(_) => &[],
        }
    }

    /// Entries of a leaf; empty for an internal node.
    pub fn entries(&self) -> &[Entry<T>] {
        match &self.kind {
            NodeKind::Leaf(entries) => entries,
            NodeKind::Internal(_) => &[],
        }
    }

    /// Number of direct children or entries.
    pub fn len(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(entries) => entries.len(),
            NodeKind::Internal(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn recalc_bbox(&mut self) {
        self.bbox = match &self.kind {
            NodeKind::Leaf(entries) => union_of(entries),
            NodeKind::Internal(children) => union_of(children),
        };
    }

    fn descendant_mut(&mut self, path: &[usize]) -> &mut Node<T> {
        let mut node = self;
        for &index in path {
            node = match node.kind {
                NodeKind::Internal(ref mut children) => &mut children[index],
                NodeKind::Leaf(_) => unreachable!("insert path descends below a leaf"),
            };
        }
        node
    }

    /// Appends a child of matching kind, or hands it back.
    fn try_push(&mut self, child: Child<T>) -> Result<(), Child<T>> {
        match (&mut self.kind, child) {
            (NodeKind::Leaf(entries), Child::Entry(entry)) => {
                self.bbox.extend(&entry.bbox);
                entries.push(entry);
                Ok(())
            }
            (NodeKind::Internal(children), Child::Node(node)) if node.height + 1 == self.height => {
                self.bbox.extend(&node.bbox);
                children.push(node);
                Ok(())
            }
            (_, child) => Err(child),
        }
    }

    /// Splits an overflowing node in place, returning the new right sibling.
    fn split(&mut self, min_entries: usize) -> Node<T> {
        let height = self.height;
        let mut sibling = match &mut self.kind {
            NodeKind::Leaf(entries) => Node::leaf(split_children(entries, min_entries)),
            NodeKind::Internal(children) => {
                Node::internal(split_children(children, min_entries), height)
            }
        };
        sibling.height = height;
        self.recalc_bbox();
        sibling
    }

    /// Moves every entry below this node out, in traversal order.
    fn into_entries(self) -> Vec<Entry<T>> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node.kind {
                NodeKind::Leaf(entries) => out.extend(entries),
                NodeKind::Internal(children) => stack.extend(children),
            }
        }
        out
    }
}

/// Sorts `children` along the better axis and splits off the suffix.
fn split_children<C: Bounded>(children: &mut Vec<C>, min_entries: usize) -> Vec<C> {
    let total = children.len();
    debug_assert!(
        2 * min_entries <= total,
        "cannot split {total} children into halves of at least {min_entries}"
    );

    choose_split_axis(children, min_entries);
    let index = choose_split_index(children, min_entries);
    let suffix = children.split_off(index);

    debug_assert!(children.len() >= min_entries && suffix.len() >= min_entries);
    suffix
}

fn sort_by_min_x<C: Bounded>(children: &mut [C]) {
    children.sort_by(|a, b| a.bounds().min_x.total_cmp(&b.bounds().min_x));
}

fn sort_by_min_y<C: Bounded>(children: &mut [C]) {
    children.sort_by(|a, b| a.bounds().min_y.total_cmp(&b.bounds().min_y));
}

/// Total margin of every split distribution where both sides hold at least `m`.
fn all_dist_margin<C: Bounded>(children: &[C], m: usize) -> f64 {
    let total = children.len();
    let mut left = union_of(&children[..m]);
    let mut right = union_of(&children[total - m..]);
    let mut margin = left.margin() + right.margin();

    for child in &children[m..total - m] {
        left.extend(child.bounds());
        margin += left.margin();
    }
    for child in children[m..total - m].iter().rev() {
        right.extend(child.bounds());
        margin += right.margin();
    }
    margin
}

fn choose_split_axis<C: Bounded>(children: &mut [C], m: usize) {
    sort_by_min_x(children);
    let x_margin = all_dist_margin(children, m);
    sort_by_min_y(children);
    let y_margin = all_dist_margin(children, m);

    // Ties go to x.
    if x_margin <= y_margin {
        sort_by_min_x(children);
    }
}

fn choose_split_index<C: Bounded>(children: &[C], m: usize) -> usize {
    let total = children.len();

    // prefix[i] covers children[..=i], suffix[i] covers children[i..].
    let mut prefix = Vec::with_capacity(total);
    let mut acc = BoundingBox::empty();
    for child in children {
        acc.extend(child.bounds());
        prefix.push(acc);
    }
    let mut suffix = vec![BoundingBox::empty(); total];
    let mut acc = BoundingBox::empty();
    for (i, child) in children.iter().enumerate().rev() {
        acc.extend(child.bounds());
        suffix[i] = acc;
    }

    let mut index = total - m;
    let mut min_overlap = f64::INFINITY;
    let mut min_area = f64::INFINITY;

    for i in m..=total - m {
        let left = &prefix[i - 1];
        let right = &suffix[i];
        let overlap = left.intersection_area(right);
        let area = left.area() + right.area();

        if overlap < min_overlap {
            min_overlap = overlap;
            min_area = area;
            index = i;
        } else if overlap == min_overlap && area < min_area {
            min_area = area;
            index = i;
        }
    }
    index
}

/// Splits `items` into consecutive owned chunks of `size` (the last may be shorter).
fn chunk_owned<E>(mut items: Vec<E>, size: usize) -> Vec<Vec<E>> {
    let mut bounds: Vec<usize> = (size..items.len()).step_by(size).collect();
    let mut chunks = Vec::with_capacity(bounds.len() + 1);
    while let Some(at) = bounds.pop() {
        chunks.push(items.split_off(at));
    }
    chunks.push(items);
    chunks.reverse();
    chunks
}

/// Summary of the tree's shape, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeShape {
    pub height: usize,
    pub nodes: usize,
    pub leaves: usize,
    pub entries: usize,
}

/// R-tree over bounding boxes with payload `T`.
#[derive(Debug, Clone)]
pub struct RTree<T> {
    root: Node<T>,
    max_entries: usize,
    min_entries: usize,
    len: usize,
}

impl<T> Default for RTree<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl<T> RTree<T> {
    /// Create an empty tree. `max_entries` is raised to at least 4.
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(MIN_MAX_ENTRIES);
        // ceil(0.4 * max_entries), at least 2
        let min_entries = (max_entries * 2).div_ceil(5).max(2);
        Self {
            root: Node::leaf(Vec::new()),
            max_entries,
            min_entries,
            len: 0,
        }
    }

    /// Bulk-build a packed tree from a complete item list.
    pub fn build(max_entries: usize, items: Vec<Entry<T>>) -> Self {
        let mut tree = Self::new(max_entries);
        tree.load(items);
        tree
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn height(&self) -> usize {
        self.root.height
    }

    /// Root node, for inspection.
    pub fn root(&self) -> &Node<T> {
        &self.root
    }

    /// Drop every entry, keeping the fill parameters.
    pub fn clear(&mut self) {
        self.root = Node::leaf(Vec::new());
        self.len = 0;
    }

    /// Insert a batch of entries.
    ///
    /// An empty tree is bulk-built from scratch. Batches smaller than
    /// `min_entries` are inserted one by one. Otherwise the batch is packed
    /// into its own subtree and grafted onto the existing tree: at equal
    /// heights both become children of a new root, else the shorter tree is
    /// inserted into the taller one at the level where the heights match.
    pub fn load(&mut self, items: Vec<Entry<T>>) {
        if items.is_empty() {
            return;
        }

        if items.len() < self.min_entries {
            for entry in items {
                self.insert_entry(entry);
            }
            return;
        }

        let count = items.len();
        let mut node = self.build_node(items, None);
        self.len += count;

        if self.root.is_empty() {
            self.root = node;
        } else if self.root.height == node.height {
            self.grow_root(node);
        } else {
            if self.root.height < node.height {
                std::mem::swap(&mut self.root, &mut node);
            }
            let level = self.root.height - node.height - 1;
            self.insert_child(Child::Node(node), level);
        }

        log::debug!(
            "loaded {} entries (total {}, height {})",
            count,
            self.len,
            self.root.height
        );
    }

    /// Insert a single entry at leaf level.
    pub fn insert(&mut self, bbox: BoundingBox, payload: T) {
        self.insert_entry(Entry::new(bbox, payload));
    }

    fn insert_entry(&mut self, entry: Entry<T>) {
        let level = self.root.height - 1;
        self.insert_child(Child::Entry(entry), level);
        self.len += 1;
    }

    fn build_node(&self, mut items: Vec<Entry<T>>, height: Option<usize>) -> Node<T> {
        let count = items.len();
        let mut fan_out = self.max_entries;

        let height = match height {
            Some(height) => height,
            None if count <= fan_out => return Node::leaf(items),
            None => {
                // Smallest height whose capacity holds every item.
                let mut height = 1;
                let mut capacity = fan_out;
                while capacity < count {
                    capacity = capacity.saturating_mul(fan_out);
                    height += 1;
                }
                // Root fan-out that keeps the lower levels full.
                let per_child = fan_out.saturating_pow(height as u32 - 1);
                fan_out = count.div_ceil(per_child);
                height
            }
        };
        if height == 1 {
            debug_assert!(count <= fan_out, "{count} items overflow a leaf");
            return Node::leaf(items);
        }
        // Groups that would fit a leaf above height 1 still recurse, so every
        // child ends up exactly one level lower.
        let group = count.div_ceil(fan_out);
        let slab = group * (fan_out as f64).sqrt().ceil() as usize;

        multi_select(&mut items, 0, count - 1, slab, &|e: &Entry<T>| e.bbox.min_x);

        let mut children = Vec::with_capacity(fan_out);
        for mut slab_items in chunk_owned(items, slab) {
            let last = slab_items.len() - 1;
            multi_select(&mut slab_items, 0, last, group, &|e: &Entry<T>| e.bbox.min_y);

            for tile in chunk_owned(slab_items, group) {
                children.push(self.build_node(tile, Some(height - 1)));
            }
        }

        Node::internal(children, height)
    }

    /// Descend from the root picking the child that needs the least enlargement.
    ///
    /// Stops at depth `level` or at a leaf, whichever comes first. Returns the
    /// child indices taken at each step.
    fn choose_subtree(&self, bbox: &BoundingBox, level: usize) -> InsertPath {
        let mut path = InsertPath::new();
        let mut node = &self.root;

        loop {
            let children = match &node.kind {
                NodeKind::Internal(children) if path.len() != level => children,
                _ => break,
            };
            debug_assert!(!children.is_empty(), "internal node without children");

            let mut target = 0;
            let mut min_area = f64::INFINITY;
            let mut min_enlargement = f64::INFINITY;

            for (i, child) in children.iter().enumerate() {
                let area = child.bbox.area();
                let enlargement = bbox.enlarged_area(&child.bbox) - area;

                if enlargement < min_enlargement {
                    min_enlargement = enlargement;
                    min_area = area;
                    target = i;
                } else if enlargement == min_enlargement && area < min_area {
                    min_area = area;
                    target = i;
                }
            }

            path.push(target);
            node = &children[target];
        }
        path
    }

    fn insert_child(&mut self, child: Child<T>, level: usize) {
        let bbox = child.bbox();
        let path = self.choose_subtree(&bbox, level);

        if let Err(rejected) = self.root.descendant_mut(&path).try_push(child) {
            // A subtree found no parent of the right height (bulk loads can
            // leave short leaves); fall back to inserting its entries.
            match rejected {
                Child::Node(node) => {
                    for entry in node.into_entries() {
                        self.insert_child(Child::Entry(entry), self.root.height - 1);
                    }
                }
                Child::Entry(_) => unreachable!("entry insertion always ends at a leaf"),
            }
            return;
        }

        let mut depth = path.len();
        loop {
            let node = self.root.descendant_mut(&path[..depth]);
            if node.len() <= self.max_entries {
                break;
            }

            let sibling = node.split(self.min_entries);
            if depth == 0 {
                self.grow_root(sibling);
                return;
            }

            let parent = self.root.descendant_mut(&path[..depth - 1]);
            if parent.try_push(Child::Node(sibling)).is_err() {
                unreachable!("split sibling has the same height as its origin");
            }
            depth -= 1;
        }

        for d in 0..=depth {
            self.root.descendant_mut(&path[..d]).bbox.extend(&bbox);
        }
    }

    /// Replace the root by a new one holding the old root and `sibling`.
    fn grow_root(&mut self, sibling: Node<T>) {
        let height = self.root.height + 1;
        let old_root = std::mem::replace(&mut self.root, Node::leaf(Vec::new()));
        self.root = Node::internal(vec![old_root, sibling], height);
        log::trace!("root split, tree height is now {}", height);
    }

    /// All entries whose box intersects `query`, in traversal order.
    pub fn search(&self, query: &BoundingBox) -> Vec<&Entry<T>> {
        let mut result = Vec::new();
        if !query.intersects(&self.root.bbox) {
            return result;
        }

        let mut stack: Vec<&Node<T>> = vec![&self.root];
        while let Some(node) = stack.pop() {
            match &node.kind {
                NodeKind::Leaf(entries) => {
                    result.extend(entries.iter().filter(|e| query.intersects(&e.bbox)));
                }
                NodeKind::Internal(children) => {
                    for child in children {
                        if !query.intersects(&child.bbox) {
                            continue;
                        }
                        if query.contains(&child.bbox) {
                            collect_all(child, &mut result);
                        } else {
                            stack.push(child);
                        }
                    }
                }
            }
        }
        result
    }

    /// Returns true if any entry's box intersects `query`.
    pub fn collides(&self, query: &BoundingBox) -> bool {
        if !query.intersects(&self.root.bbox) {
            return false;
        }

        let mut stack: Vec<&Node<T>> = vec![&self.root];
        while let Some(node) = stack.pop() {
            match &node.kind {
                NodeKind::Leaf(entries) => {
                    if entries.iter().any(|e| query.intersects(&e.bbox)) {
                        return true;
                    }
                }
                NodeKind::Internal(children) => {
                    for child in children {
                        if !query.intersects(&child.bbox) {
                            continue;
                        }
                        if query.contains(&child.bbox) {
                            return true;
                        }
                        stack.push(child);
                    }
                }
            }
        }
        false
    }

    /// Every entry in the tree, in traversal order.
    pub fn all_items(&self) -> Vec<&Entry<T>> {
        let mut result = Vec::with_capacity(self.len);
        collect_all(&self.root, &mut result);
        result
    }

    /// Node counts and height.
    pub fn shape(&self) -> TreeShape {
        let mut shape = TreeShape {
            height: self.root.height,
            ..TreeShape::default()
        };
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            shape.nodes += 1;
            match &node.kind {
                NodeKind::Leaf(entries) => {
                    shape.leaves += 1;
                    shape.entries += entries.len();
                }
                NodeKind::Internal(children) => stack.extend(children.iter()),
            }
        }
        shape
    }
}

fn collect_all<'a, T>(node: &'a Node<T>, result: &mut Vec<&'a Entry<T>>) {
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        match &node.kind {
            NodeKind::Leaf(entries) => result.extend(entries.iter()),
            NodeKind::Internal(children) => stack.extend(children.iter()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct XorShift(u64);

    impl XorShift {
        fn next(&mut self) -> f64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            (x >> 11) as f64 / (1u64 << 53) as f64
        }

        fn bbox(&mut self, extent: f64, max_size: f64) -> BoundingBox {
            let x = self.next() * extent;
            let y = self.next() * extent;
            BoundingBox::new(
                x,
                y,
                x + self.next() * max_size,
                y + self.next() * max_size,
            )
        }
    }

    fn random_entries(n: usize, seed: u64) -> Vec<Entry<usize>> {
        let mut rng = XorShift(seed);
        (0..n).map(|i| Entry::new(rng.bbox(100.0, 5.0), i)).collect()
    }

    fn sorted_ids(entries: &[&Entry<usize>]) -> Vec<usize> {
        let mut ids: Vec<usize> = entries.iter().map(|e| e.payload).collect();
        ids.sort_unstable();
        ids
    }

    fn brute_force(items: &[Entry<usize>], query: &BoundingBox) -> Vec<usize> {
        let mut ids: Vec<usize> = items
            .iter()
            .filter(|e| query.intersects(&e.bbox))
            .map(|e| e.payload)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Every bbox is the exact union of its children.
    fn assert_tight<T>(node: &Node<T>) {
        let expected = match &node.kind {
            NodeKind::Leaf(entries) => union_of(entries),
            NodeKind::Internal(children) => {
                children.iter().for_each(assert_tight);
                union_of(children)
            }
        };
        assert_eq!(node.bbox, expected, "bbox is not the union of its children");
    }

    fn assert_uniform_height<T>(node: &Node<T>) {
        for child in node.children() {
            assert_eq!(child.height + 1, node.height, "non-uniform child height");
            assert_uniform_height(child);
        }
        if node.is_leaf() {
            assert_eq!(node.height, 1);
        }
    }

    fn assert_fill<T>(node: &Node<T>, is_root: bool, min: usize, max: usize) {
        assert!(node.len() <= max, "node holds {} > {}", node.len(), max);
        if !is_root {
            assert!(node.len() >= min, "node holds {} < {}", node.len(), min);
        }
        for child in node.children() {
            assert_fill(child, false, min, max);
        }
    }

    #[test]
    fn test_fill_parameters() {
        let tree: RTree<()> = RTree::new(9);
        assert_eq!(tree.max_entries(), 9);
        assert_eq!(tree.min_entries(), 4);

        let tree: RTree<()> = RTree::new(1);
        assert_eq!(tree.max_entries(), 4);
        assert_eq!(tree.min_entries(), 2);

        let tree: RTree<()> = RTree::new(16);
        assert_eq!(tree.min_entries(), 7);
    }

    #[test]
    fn test_empty_tree() {
        let tree: RTree<usize> = RTree::default();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert!(tree.root().is_leaf());
        assert!(tree.root().bbox().is_empty());
        assert!(tree.search(&BoundingBox::new(-1e9, -1e9, 1e9, 1e9)).is_empty());
        assert!(tree.all_items().is_empty());
        assert!(!tree.collides(&BoundingBox::from_point(0.0, 0.0)));
    }

    #[test]
    fn test_build_small_is_single_leaf() {
        let tree = RTree::build(9, random_entries(7, 1));
        assert!(tree.root().is_leaf());
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.root().entries().len(), 7);
        assert_tight(tree.root());
    }

    #[test]
    fn test_build_round_trip() {
        for &n in &[10, 81, 82, 500, 3000] {
            let items = random_entries(n, n as u64 + 3);
            let tree = RTree::build(9, items);
            assert_eq!(tree.len(), n);
            assert_eq!(sorted_ids(&tree.all_items()), (0..n).collect::<Vec<_>>());
            assert_tight(tree.root());
            assert_uniform_height(tree.root());
            assert_fill(tree.root(), true, 1, tree.max_entries());
        }
    }

    #[test]
    fn test_build_keeps_uniform_height() {
        for max in [4, 5, 6, 7, 9, 16] {
            for n in (1..700).step_by(13).chain([max * max + 1, max * max * max + 1]) {
                let tree = RTree::build(max, random_entries(n, (n * max) as u64 + 1));
                assert_eq!(tree.len(), n, "max={max} n={n}");
                assert_uniform_height(tree.root());
                assert_tight(tree.root());
                assert_fill(tree.root(), true, 1, tree.max_entries());
            }
        }
    }

    #[test]
    fn test_build_node_short_group_reaches_leaf_level() {
        let tree: RTree<usize> = RTree::new(4);
        let node = tree.build_node(random_entries(3, 21), Some(3));
        assert_eq!(node.height(), 3);
        assert_uniform_height(&node);
        assert_tight(&node);
        assert_eq!(node.len(), 3);
        assert!(node.children().iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_build_height_is_minimal() {
        let tree = RTree::build(9, random_entries(81, 5));
        assert_eq!(tree.height(), 2);
        let tree = RTree::build(9, random_entries(82, 5));
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.root().len(), 2);
    }

    #[test]
    fn test_search_matches_brute_force_after_build() {
        let items = random_entries(2000, 99);
        let tree = RTree::build(9, items.clone());
        let mut rng = XorShift(1234);
        for _ in 0..200 {
            let query = rng.bbox(100.0, 20.0);
            assert_eq!(sorted_ids(&tree.search(&query)), brute_force(&items, &query));
            assert_eq!(tree.collides(&query), !brute_force(&items, &query).is_empty());
        }
    }

    #[test]
    fn test_search_with_covering_query_returns_everything() {
        let items = random_entries(400, 17);
        let tree = RTree::build(6, items);
        let all = tree.search(&BoundingBox::new(-1.0, -1.0, 200.0, 200.0));
        assert_eq!(sorted_ids(&all), (0..400).collect::<Vec<_>>());
    }

    #[test]
    fn test_search_disjoint_query_is_empty() {
        let tree = RTree::build(9, random_entries(300, 8));
        assert!(tree.search(&BoundingBox::new(500.0, 500.0, 600.0, 600.0)).is_empty());
    }

    #[test]
    fn test_insert_keeps_invariants() {
        let items = random_entries(1500, 31);
        let mut tree = RTree::new(9);
        for entry in items.iter().cloned() {
            tree.insert(entry.bbox, entry.payload);
        }
        assert_eq!(tree.len(), 1500);
        assert!(tree.height() > 2);
        assert_tight(tree.root());
        assert_uniform_height(tree.root());
        assert_fill(tree.root(), true, tree.min_entries(), tree.max_entries());
        assert_eq!(sorted_ids(&tree.all_items()), (0..1500).collect::<Vec<_>>());
    }

    #[test]
    fn test_insert_invariants_with_minimum_fan_out() {
        let items = random_entries(600, 77);
        let mut tree = RTree::new(4);
        for entry in items {
            tree.insert(entry.bbox, entry.payload);
        }
        assert_tight(tree.root());
        assert_uniform_height(tree.root());
        assert_fill(tree.root(), true, 2, 4);
    }

    #[test]
    fn test_root_split_grows_height() {
        let mut tree = RTree::new(4);
        for i in 0..4 {
            let x = i as f64;
            tree.insert(BoundingBox::new(x, x, x + 1.0, x + 1.0), i);
        }
        assert_eq!(tree.height(), 1);

        tree.insert(BoundingBox::new(10.0, 10.0, 11.0, 11.0), 4);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.root().len(), 2);
        assert_tight(tree.root());
        assert_fill(tree.root(), true, 2, 4);
    }

    #[test]
    fn test_search_matches_brute_force_after_insert() {
        let items = random_entries(800, 4242);
        let mut tree = RTree::new(5);
        for entry in items.iter().cloned() {
            tree.insert(entry.bbox, entry.payload);
        }
        let mut rng = XorShift(777);
        for _ in 0..200 {
            let query = rng.bbox(100.0, 15.0);
            assert_eq!(sorted_ids(&tree.search(&query)), brute_force(&items, &query));
        }
    }

    #[test]
    fn test_split_prefers_separated_groups() {
        let mut tree = RTree::new(4);
        let boxes = [
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            BoundingBox::new(100.0, 0.0, 101.0, 1.0),
            BoundingBox::new(1.0, 0.0, 2.0, 1.0),
            BoundingBox::new(101.0, 0.0, 102.0, 1.0),
            BoundingBox::new(2.0, 0.0, 3.0, 1.0),
        ];
        for (i, b) in boxes.iter().enumerate() {
            tree.insert(*b, i);
        }
        let halves: Vec<Vec<usize>> = tree
            .root()
            .children()
            .iter()
            .map(|c| {
                let mut ids: Vec<usize> = c.entries().iter().map(|e| e.payload).collect();
                ids.sort_unstable();
                ids
            })
            .collect();
        assert!(halves.contains(&vec![0, 2, 4]));
        assert!(halves.contains(&vec![1, 3]));
    }

    #[test]
    fn test_load_into_non_empty_tree() {
        let first = random_entries(300, 1);
        let second: Vec<_> = random_entries(50, 2)
            .into_iter()
            .map(|e| Entry::new(e.bbox, e.payload + 300))
            .collect();

        let mut tree = RTree::build(9, first);
        tree.load(second);
        assert_eq!(tree.len(), 350);
        assert_eq!(sorted_ids(&tree.all_items()), (0..350).collect::<Vec<_>>());
        assert_tight(tree.root());
        assert_uniform_height(tree.root());
    }

    #[test]
    fn test_load_taller_batch_swaps_roots() {
        let small = random_entries(12, 3);
        let big: Vec<_> = random_entries(900, 4)
            .into_iter()
            .map(|e| Entry::new(e.bbox, e.payload + 12))
            .collect();

        let mut tree = RTree::build(9, small);
        let small_height = tree.height();
        tree.load(big);
        assert!(tree.height() > small_height);
        assert_eq!(sorted_ids(&tree.all_items()), (0..912).collect::<Vec<_>>());
        assert_tight(tree.root());
        assert_uniform_height(tree.root());
    }

    #[test]
    fn test_load_equal_heights_splits_root() {
        let mut tree = RTree::build(9, random_entries(5, 10));
        let more: Vec<_> = random_entries(6, 11)
            .into_iter()
            .map(|e| Entry::new(e.bbox, e.payload + 5))
            .collect();
        tree.load(more);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.root().len(), 2);
        assert_eq!(sorted_ids(&tree.all_items()), (0..11).collect::<Vec<_>>());
        assert_uniform_height(tree.root());
    }

    #[test]
    fn test_load_tiny_batch_inserts_individually() {
        let mut tree = RTree::build(9, random_entries(40, 12));
        tree.load(vec![Entry::new(BoundingBox::new(1.0, 1.0, 2.0, 2.0), 40)]);
        assert_eq!(tree.len(), 41);
        assert_tight(tree.root());
        assert_uniform_height(tree.root());
        tree.load(Vec::new());
        assert_eq!(tree.len(), 41);
    }

    #[test]
    fn test_clear() {
        let mut tree = RTree::build(9, random_entries(100, 13));
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert!(tree.all_items().is_empty());
    }

    #[test]
    fn test_shape_counts() {
        let tree = RTree::build(4, random_entries(64, 14));
        let shape = tree.shape();
        assert_eq!(shape.entries, 64);
        assert_eq!(shape.height, tree.height());
        assert!(shape.leaves >= 16);
        assert!(shape.nodes > shape.leaves);
    }

    #[test]
    fn test_degenerate_point_boxes() {
        let items: Vec<_> = (0..50)
            .map(|i| Entry::new(BoundingBox::from_point(i as f64, 0.0), i))
            .collect();
        let tree = RTree::build(4, items);
        let hits = tree.search(&BoundingBox::from_point(7.0, 0.0));
        assert_eq!(sorted_ids(&hits), vec![7]);
    }

    #[test]
    fn test_chunk_owned() {
        let chunks = chunk_owned((0..10).collect::<Vec<_>>(), 4);
        assert_eq!(chunks, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
        let chunks = chunk_owned((0..8).collect::<Vec<_>>(), 4);
        assert_eq!(chunks.len(), 2);
    }
}
