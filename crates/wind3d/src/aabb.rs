//! Linear-array AABB tree used to cull scheduling blocks against source volumes.
//!
//! The tree is a flat vector of packed nodes plus an index permutation over
//! the input boxes; "children" are array indices, never pointers. It is
//! rebuilt from scratch whenever the volume set changes, which is cheaper
//! than incremental mutation for the handful of volumes a wind field carries.
//!
//! Queries walk the tree with a fixed 64-entry stack, which is deep enough
//! for any realistic volume population (leaves hold at most two primitives,
//! so depth grows with log2 of the input size).

use glam::Vec3;

/// Axis-aligned box, stored as min/max corners.
///
/// A freshly constructed box is inverted (`min = +MAX`, `max = -MAX`) so the
/// first expansion snaps it to the expanded point or box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(-f32::MAX),
        }
    }
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box spanning `center ± half_extents`.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Grow to include a point.
    #[inline]
    pub fn expand_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grow to include another box.
    #[inline]
    pub fn expand_box(&mut self, b: &Aabb) {
        self.min = self.min.min(b.min);
        self.max = self.max.max(b.max);
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Closed-interval overlap test on all six half-planes.
    #[inline]
    pub fn overlaps(&self, o: &Aabb) -> bool {
        self.max.x >= o.min.x
            && self.min.x <= o.max.x
            && self.max.y >= o.min.y
            && self.min.y <= o.max.y
            && self.max.z >= o.min.z
            && self.min.z <= o.max.z
    }

    /// Slab test. Returns the near-t when the ray hits the box.
    ///
    /// The returned t may be negative when the origin is inside the box;
    /// callers that need a forward hit filter on `t >= 0` themselves.
    #[inline]
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let t1 = (self.min - ray.origin) * ray.inv_dir;
        let t2 = (self.max - ray.origin) * ray.inv_dir;
        let t_min = t1.min(t2).max_element();
        let t_max = t1.max(t2).min_element();
        (t_max >= t_min && t_max >= 0.0).then_some(t_min)
    }
}

/// Ray with precomputed reciprocal direction for the slab test.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
    pub inv_dir: Vec3,
}

impl Ray {
    /// Axis-aligned near-zero direction components get a signed large
    /// reciprocal instead of dividing by zero, keeping the slab test's
    /// interval ordering consistent with the direction's sign.
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        let recip = |c: f32| {
            if c.abs() > 1e-6 {
                1.0 / c
            } else if c < 0.0 {
                -f32::MAX
            } else {
                f32::MAX
            }
        };
        Self {
            origin,
            dir,
            inv_dir: Vec3::new(recip(dir.x), recip(dir.y), recip(dir.z)),
        }
    }
}

/// Packed tree node: bounds plus either a left-child index (interior) or a
/// first-primitive offset (leaf). A node is a leaf iff `count > 0`.
#[derive(Clone, Copy, Debug)]
struct Node {
    bounds: Aabb,
    left_first: u32,
    count: u32,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            bounds: Aabb::default(),
            left_first: 0,
            count: 0,
        }
    }
}

impl Node {
    #[inline]
    fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

const QUERY_STACK_DEPTH: usize = 64;

/// Bounding-volume hierarchy over a set of boxes.
#[derive(Default)]
pub struct AabbTree {
    nodes: Vec<Node>,
    indices: Vec<u32>,
    boxes: Vec<Aabb>,
}

impl AabbTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the tree over `boxes`, keeping an internal copy for the
    /// primitive-level tests. An empty input leaves the tree empty.
    pub fn build(&mut self, boxes: &[Aabb]) {
        self.nodes.clear();
        self.indices.clear();
        self.boxes.clear();
        if boxes.is_empty() {
            return;
        }

        self.boxes.extend_from_slice(boxes);
        self.indices.extend(0..boxes.len() as u32);
        self.nodes.reserve(boxes.len() * 2);
        self.nodes.push(Node::default());
        self.build_recursive(0, 0, boxes.len() as u32);
    }

    /// True iff any primitive box overlaps `query`.
    pub fn query_overlap(&self, query: &Aabb) -> bool {
        if self.nodes.is_empty() || !self.nodes[0].bounds.overlaps(query) {
            return false;
        }

        let mut stack = [0u32; QUERY_STACK_DEPTH];
        let mut sp = 0;
        stack[sp] = 0;
        sp += 1;

        while sp > 0 {
            sp -= 1;
            let node = &self.nodes[stack[sp] as usize];
            if node.is_leaf() {
                for i in 0..node.count {
                    let prim = self.indices[(node.left_first + i) as usize] as usize;
                    if self.boxes[prim].overlaps(query) {
                        return true;
                    }
                }
            } else {
                let left = node.left_first as usize;
                if self.nodes[left].bounds.overlaps(query) {
                    stack[sp] = left as u32;
                    sp += 1;
                }
                if self.nodes[left + 1].bounds.overlaps(query) {
                    stack[sp] = (left + 1) as u32;
                    sp += 1;
                }
            }
        }
        false
    }

    /// True iff `p` lies inside any primitive box.
    pub fn query_point(&self, p: Vec3) -> bool {
        if self.nodes.is_empty() || !self.nodes[0].bounds.contains(p) {
            return false;
        }

        let mut stack = [0u32; QUERY_STACK_DEPTH];
        let mut sp = 0;
        stack[sp] = 0;
        sp += 1;

        while sp > 0 {
            sp -= 1;
            let node = &self.nodes[stack[sp] as usize];
            if node.is_leaf() {
                for i in 0..node.count {
                    let prim = self.indices[(node.left_first + i) as usize] as usize;
                    if self.boxes[prim].contains(p) {
                        return true;
                    }
                }
            } else {
                let left = node.left_first as usize;
                if self.nodes[left].bounds.contains(p) {
                    stack[sp] = left as u32;
                    sp += 1;
                }
                if self.nodes[left + 1].bounds.contains(p) {
                    stack[sp] = (left + 1) as u32;
                    sp += 1;
                }
            }
        }
        false
    }

    /// Closest forward hit of `ray` against any primitive box.
    ///
    /// Returns the primitive index and its near-t, or `None` when the tree
    /// is empty or nothing is hit. Subtrees whose entry distance already
    /// exceeds the best hit are pruned; when both children are hit the
    /// nearer one is descended first.
    pub fn query_ray(&self, ray: &Ray) -> Option<(usize, f32)> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut closest_prim = None;
        let mut closest_t = f32::MAX;

        let mut stack = [(0u32, 0.0f32); QUERY_STACK_DEPTH];
        let mut sp = 0;
        if let Some(t) = self.nodes[0].bounds.intersect(ray) {
            stack[sp] = (0, t);
            sp += 1;
        }

        while sp > 0 {
            sp -= 1;
            let (node_idx, entry_t) = stack[sp];
            if entry_t >= closest_t {
                continue;
            }
            let node = &self.nodes[node_idx as usize];
            if node.is_leaf() {
                for i in 0..node.count {
                    let prim = self.indices[(node.left_first + i) as usize] as usize;
                    if let Some(t) = self.boxes[prim].intersect(ray) {
                        if t >= 0.0 && t < closest_t {
                            closest_t = t;
                            closest_prim = Some(prim);
                        }
                    }
                }
            } else {
                let left = node.left_first;
                let hit_l = self.nodes[left as usize].bounds.intersect(ray);
                let hit_r = self.nodes[left as usize + 1].bounds.intersect(ray);
                match (hit_l, hit_r) {
                    (Some(tl), Some(tr)) => {
                        // Push the far child first so the near one pops next.
                        if tl < tr {
                            stack[sp] = (left + 1, tr);
                            stack[sp + 1] = (left, tl);
                        } else {
                            stack[sp] = (left, tl);
                            stack[sp + 1] = (left + 1, tr);
                        }
                        sp += 2;
                    }
                    (Some(tl), None) => {
                        stack[sp] = (left, tl);
                        sp += 1;
                    }
                    (None, Some(tr)) => {
                        stack[sp] = (left + 1, tr);
                        sp += 1;
                    }
                    (None, None) => {}
                }
            }
        }

        closest_prim.map(|prim| (prim, closest_t))
    }

    /// Top-down midpoint build over `indices[start..start + count]`.
    fn build_recursive(&mut self, node_idx: usize, start: u32, count: u32) {
        let mut bounds = Aabb::default();
        let mut centroids = Aabb::default();
        for i in 0..count {
            let b = &self.boxes[self.indices[(start + i) as usize] as usize];
            bounds.expand_box(b);
            centroids.expand_point(b.center());
        }
        self.nodes[node_idx].bounds = bounds;

        if count <= 2 {
            self.nodes[node_idx].left_first = start;
            self.nodes[node_idx].count = count;
            return;
        }

        // Split on the widest centroid axis; ties resolve x over y over z.
        let extent = centroids.max - centroids.min;
        let mut axis = 0;
        if extent.y > extent.x {
            axis = 1;
        }
        if extent.z > extent[axis] {
            axis = 2;
        }
        let split = centroids.min[axis] + extent[axis] * 0.5;

        let boxes = &self.boxes;
        let range = &mut self.indices[start as usize..(start + count) as usize];
        let mut left_count = 0;
        for i in 0..range.len() {
            if boxes[range[i] as usize].center()[axis] < split {
                range.swap(i, left_count);
                left_count += 1;
            }
        }

        // Midpoint split can degenerate when the centroids cluster on one
        // side; fall back to a median split along the same axis.
        if left_count == 0 || left_count == range.len() {
            left_count = range.len() / 2;
            range.select_nth_unstable_by(left_count, |a, b| {
                boxes[*a as usize].center()[axis].total_cmp(&boxes[*b as usize].center()[axis])
            });
        }
        let left_count = left_count as u32;

        let left_child = self.nodes.len();
        self.nodes.push(Node::default());
        self.nodes.push(Node::default());
        self.nodes[node_idx].left_first = left_child as u32;
        self.nodes[node_idx].count = 0;

        self.build_recursive(left_child, start, left_count);
        self.build_recursive(left_child + 1, start + left_count, count - left_count);
    }
}
