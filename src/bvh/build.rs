//! SAH-based BVH builder.
//!
//! Builds an arena-indexed binary tree over triangle indices: nodes live in
//! one `Vec`, children are referenced by index rather than `Box`/`Rc`, so the
//! tree allocates once and survives relocation. The split search evaluates
//! every candidate position exactly (no binning) per axis, which is correct
//! but quadratic in the worst case — acceptable for the triangle counts this
//! renderer targets.

use crate::scene::types::{BoundingBox, Triangle};

const TRAVERSAL_COST: f32 = 1.0;
const INTERSECT_COST: f32 = 1.0;

/// One node of the build-time tree. Leaves carry a non-empty
/// `triangle_indices`; internal nodes carry `left`/`right` and an empty
/// index list.
#[derive(Debug, Clone)]
pub struct BuildNode {
    pub bounds: BoundingBox,
    pub depth: u32,
    pub is_leaf: bool,
    pub triangle_indices: Vec<u32>,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl BuildNode {
    fn empty_internal(bounds: BoundingBox, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            is_leaf: false,
            triangle_indices: Vec::new(),
            left: None,
            right: None,
        }
    }

    fn leaf(bounds: BoundingBox, depth: u32, triangle_indices: Vec<u32>) -> Self {
        Self {
            bounds,
            depth,
            is_leaf: true,
            triangle_indices,
            left: None,
            right: None,
        }
    }
}

/// Arena of build-time nodes. The root is always at index 0.
#[derive(Debug, Clone)]
pub struct BuildTree {
    pub nodes: Vec<BuildNode>,
}

impl BuildTree {
    pub fn root(&self) -> &BuildNode {
        &self.nodes[0]
    }

    pub fn max_depth(&self) -> u32 {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }
}

struct Task {
    node_idx: usize,
    indices: Vec<u32>,
    depth: u32,
}

#[inline]
fn centroid_component(triangles: &[Triangle], idx: u32, axis: usize) -> f32 {
    let c = triangles[idx as usize].centroid();
    match axis {
        0 => c.x,
        1 => c.y,
        _ => c.z,
    }
}

fn bounds_of(indices: &[u32], triangles: &[Triangle]) -> BoundingBox {
    let mut b = BoundingBox::EMPTY;
    for &idx in indices {
        b.grow(&triangles[idx as usize].bounds());
    }
    b
}

/// Best split found along one axis: `(cost, split_value)`. `split_value` is
/// the midpoint between the two adjacent sorted centroids that straddle the
/// chosen split index.
fn evaluate_axis(indices: &[u32], triangles: &[Triangle], axis: usize, box_b: &BoundingBox) -> Option<(f32, f32)> {
    let n = indices.len();
    if n < 2 {
        return None;
    }

    let mut sorted = indices.to_vec();
    sorted.sort_by(|&a, &b| {
        centroid_component(triangles, a, axis)
            .partial_cmp(&centroid_component(triangles, b, axis))
            .unwrap()
    });

    let mut prefix = Vec::with_capacity(n + 1);
    let mut running = BoundingBox::EMPTY;
    prefix.push(running);
    for &idx in &sorted {
        running.grow(&triangles[idx as usize].bounds());
        prefix.push(running);
    }

    let mut suffix = vec![BoundingBox::EMPTY; n + 1];
    let mut running = BoundingBox::EMPTY;
    for i in (0..n).rev() {
        running.grow(&triangles[sorted[i] as usize].bounds());
        suffix[i] = running;
    }

    let sa_b = box_b.surface_area();
    let mut best: Option<(f32, f32)> = None;
    for i in 1..n {
        let box_l = prefix[i];
        let box_r = suffix[i];
        let cost = TRAVERSAL_COST
            + INTERSECT_COST
                * (box_l.surface_area() / sa_b * i as f32
                    + box_r.surface_area() / sa_b * (n - i) as f32);

        if best.map_or(true, |(best_cost, _)| cost < best_cost) {
            let c_left = centroid_component(triangles, sorted[i - 1], axis);
            let c_right = centroid_component(triangles, sorted[i], axis);
            best = Some((cost, (c_left + c_right) * 0.5));
        }
    }

    best
}

/// Partition `indices` by centroid comparison to `split_value` on `axis`.
/// Falls back to a median split on the axis-sorted order if one side would
/// be empty — a degenerate SAH split on coincident centroids.
fn partition(indices: Vec<u32>, triangles: &[Triangle], axis: usize, split_value: f32) -> (Vec<u32>, Vec<u32>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for &idx in &indices {
        if centroid_component(triangles, idx, axis) < split_value {
            left.push(idx);
        } else {
            right.push(idx);
        }
    }

    if left.is_empty() || right.is_empty() {
        let mut sorted = indices;
        sorted.sort_by(|&a, &b| {
            centroid_component(triangles, a, axis)
                .partial_cmp(&centroid_component(triangles, b, axis))
                .unwrap()
        });
        let median = sorted.len() / 2;
        let right = sorted.split_off(median);
        return (sorted, right);
    }

    (left, right)
}

/// Build a SAH binary tree over `triangles`. An empty input yields a single
/// degenerate leaf at the origin, per the data model's empty-box convention.
#[tracing::instrument(skip_all, fields(tri_count = triangles.len()))]
pub fn build(triangles: &[Triangle]) -> BuildTree {
    if triangles.is_empty() {
        return BuildTree {
            nodes: vec![BuildNode::leaf(BoundingBox::ZERO, 0, Vec::new())],
        };
    }

    let mut nodes = vec![BuildNode::empty_internal(BoundingBox::ZERO, 0)];
    let root_indices: Vec<u32> = (0..triangles.len() as u32).collect();
    let mut stack = vec![Task {
        node_idx: 0,
        indices: root_indices,
        depth: 0,
    }];

    while let Some(task) = stack.pop() {
        let bounds = bounds_of(&task.indices, triangles);

        if task.indices.len() <= 1 {
            nodes[task.node_idx] = BuildNode::leaf(bounds, task.depth, task.indices);
            continue;
        }

        let mut best: Option<(usize, f32, f32)> = None; // (axis, cost, split_value)
        for axis in 0..3 {
            if let Some((cost, split_value)) = evaluate_axis(&task.indices, triangles, axis, &bounds) {
                if best.map_or(true, |(_, best_cost, _)| cost < best_cost) {
                    best = Some((axis, cost, split_value));
                }
            }
        }

        let leaf_cost = INTERSECT_COST * task.indices.len() as f32;
        let Some((axis, cost, split_value)) = best else {
            nodes[task.node_idx] = BuildNode::leaf(bounds, task.depth, task.indices);
            continue;
        };
        if cost >= leaf_cost {
            nodes[task.node_idx] = BuildNode::leaf(bounds, task.depth, task.indices);
            continue;
        }

        let (left_indices, right_indices) = partition(task.indices, triangles, axis, split_value);

        let left_idx = nodes.len();
        nodes.push(BuildNode::empty_internal(BoundingBox::ZERO, task.depth + 1));
        let right_idx = nodes.len();
        nodes.push(BuildNode::empty_internal(BoundingBox::ZERO, task.depth + 1));

        nodes[task.node_idx] = BuildNode {
            bounds,
            depth: task.depth,
            is_leaf: false,
            triangle_indices: Vec::new(),
            left: Some(left_idx),
            right: Some(right_idx),
        };

        stack.push(Task {
            node_idx: right_idx,
            indices: right_indices,
            depth: task.depth + 1,
        });
        stack.push(Task {
            node_idx: left_idx,
            indices: left_indices,
            depth: task.depth + 1,
        });
    }

    BuildTree { nodes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use glam::Vec3;

    fn make_tri(cx: f32, cy: f32, cz: f32) -> Triangle {
        Triangle::new(
            Vec3::new(cx - 0.5, cy - 0.5, cz),
            Vec3::new(cx + 0.5, cy - 0.5, cz),
            Vec3::new(cx, cy + 0.5, cz),
            Material::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_bvh() {
        let tree = build(&[]);
        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.root().is_leaf);
        assert!(tree.root().triangle_indices.is_empty());
    }

    #[test]
    fn test_single_triangle() {
        let tris = vec![make_tri(0.0, 0.0, 0.0)];
        let tree = build(&tris);
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.root().triangle_indices, vec![0]);
    }

    #[test]
    fn test_leaf_count_correct() {
        let tris = vec![make_tri(0.0, 0.0, 0.0)];
        let tree = build(&tris);
        assert!(tree.root().is_leaf);
    }

    #[test]
    fn test_many_triangles_builds_tree() {
        let tris: Vec<Triangle> = (0..100).map(|i| make_tri(i as f32 * 2.0, 0.0, 0.0)).collect();
        let tree = build(&tris);
        assert!(tree.nodes.len() > 1, "BVH should have internal nodes");

        let mut covered: Vec<u32> = tree
            .nodes
            .iter()
            .filter(|n| n.is_leaf)
            .flat_map(|n| n.triangle_indices.clone())
            .collect();
        covered.sort();
        assert_eq!(covered, (0..100).collect::<Vec<u32>>());

        let root = tree.root();
        assert!(root.bounds.min.x < 0.0);
        assert!(root.bounds.max.x > 198.0);
    }

    #[test]
    fn degenerate_centroid_split_falls_back_to_median() {
        // All triangles share one centroid exactly; SAH partition-by-threshold
        // degenerates (every triangle compares on the same side), so the
        // median-index fallback must still produce a balanced split.
        let tris: Vec<Triangle> = (0..8)
            .map(|i| {
                let offset = i as f32 * 0.001; // breaks exact vertex duplication, not centroid
                Triangle::new(
                    Vec3::new(-0.5 + offset, -0.5, 0.0),
                    Vec3::new(0.5 - offset, -0.5, 0.0),
                    Vec3::new(0.0, 0.5, 0.0),
                    Material::default(),
                )
                .unwrap()
            })
            .collect();
        let tree = build(&tris);

        let mut covered: Vec<u32> = tree
            .nodes
            .iter()
            .filter(|n| n.is_leaf)
            .flat_map(|n| n.triangle_indices.clone())
            .collect();
        covered.sort();
        assert_eq!(covered, (0..8).collect::<Vec<u32>>());
    }
}
