//! Aggregate statistics over a built tree, used for diagnostics and as the
//! basis for the BVH coverage/conservation properties.

use crate::bvh::build::BuildTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BvhStats {
    pub total_nodes: usize,
    pub leaf_nodes: usize,
    pub total_triangles: usize,
    pub max_depth: u32,
}

pub fn stats(tree: &BuildTree) -> BvhStats {
    let leaf_nodes = tree.nodes.iter().filter(|n| n.is_leaf).count();
    let total_triangles = tree
        .nodes
        .iter()
        .filter(|n| n.is_leaf)
        .map(|n| n.triangle_indices.len())
        .sum();
    BvhStats {
        total_nodes: tree.nodes.len(),
        leaf_nodes,
        total_triangles,
        max_depth: tree.max_depth(),
    }
}

/// Every vertex of every triangle a leaf references lies within that leaf's
/// box, and every internal node's box contains the union of its children's
/// boxes. Used by tests, not by the hot path.
pub fn check_coverage(tree: &BuildTree, triangles: &[crate::scene::types::Triangle], eps: f32) -> bool {
    fn recurse(tree: &BuildTree, idx: usize, triangles: &[crate::scene::types::Triangle], eps: f32) -> bool {
        let node = &tree.nodes[idx];
        if node.is_leaf {
            node.triangle_indices.iter().all(|&ti| {
                let t = &triangles[ti as usize];
                node.bounds.contains_point(t.v0, eps)
                    && node.bounds.contains_point(t.v1, eps)
                    && node.bounds.contains_point(t.v2, eps)
            })
        } else {
            let left = node.left.unwrap();
            let right = node.right.unwrap();
            let left_ok = recurse(tree, left, triangles, eps);
            let right_ok = recurse(tree, right, triangles, eps);
            let left_contained = node.bounds.contains_point(tree.nodes[left].bounds.min, eps)
                && node.bounds.contains_point(tree.nodes[left].bounds.max, eps);
            let right_contained = node.bounds.contains_point(tree.nodes[right].bounds.min, eps)
                && node.bounds.contains_point(tree.nodes[right].bounds.max, eps);
            left_ok && right_ok && left_contained && right_contained
        }
    }
    recurse(tree, 0, triangles, eps)
}

/// The multiset union of leaf triangle indices equals `{0, ..., n-1}`
/// exactly once.
pub fn check_conservation(tree: &BuildTree, n: usize) -> bool {
    let mut seen = vec![false; n];
    for node in &tree.nodes {
        if !node.is_leaf {
            continue;
        }
        for &idx in &node.triangle_indices {
            let i = idx as usize;
            if i >= n || seen[i] {
                return false;
            }
            seen[i] = true;
        }
    }
    seen.into_iter().all(|b| b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::build::build;
    use crate::material::Material;
    use crate::scene::types::Triangle;
    use glam::Vec3;
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

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
    fn coverage_and_conservation_hold_for_random_triangles() {
        let mut rng = StdRng::seed_from_u64(42);
        let tris: Vec<Triangle> = (0..1000)
            .map(|_| {
                make_tri(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                )
            })
            .collect();
        let tree = build(&tris);
        let s = stats(&tree);

        assert_eq!(s.total_triangles, 1000);
        assert!(s.total_nodes <= 2 * s.leaf_nodes - 1 || s.leaf_nodes == 1);
        assert!((s.max_depth as f64) <= (1000f64).log2().ceil() + 8.0);

        assert!(check_conservation(&tree, 1000));
        assert!(check_coverage(&tree, &tris, 1e-4));
    }

    #[test]
    fn empty_scene_has_zero_triangles() {
        let tree = build(&[]);
        let s = stats(&tree);
        assert_eq!(s.total_triangles, 0);
        assert_eq!(s.total_nodes, 1);
    }
}
