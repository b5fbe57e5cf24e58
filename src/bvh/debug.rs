//! BVH wireframe overlay geometry: depth-first box edge enumeration for the
//! debug line-list pass.

use glam::Vec3;

use crate::bvh::build::BuildTree;
use crate::scene::types::BoundingBox;

/// One endpoint of a wireframe edge: world-space position and a color whose
/// red channel encodes `node.depth / max_depth`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireVertex {
    pub position: Vec3,
    pub color: Vec3,
}

/// Box inflation factor applied about the minimum corner, to avoid coplanar
/// z-fighting with contained geometry.
const INFLATE: f32 = 1.01;

fn inflated_corners(b: &BoundingBox) -> [Vec3; 8] {
    let extent = (b.max - b.min) * INFLATE;
    let min = b.min;
    let max = min + extent;
    [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(min.x, max.y, max.z),
    ]
}

/// The 12 edges of a box as pairs of corner indices (from `inflated_corners`).
const EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 2), (2, 3), (3, 0), // bottom face
    (4, 5), (5, 6), (6, 7), (7, 4), // top face
    (0, 4), (1, 5), (2, 6), (3, 7), // verticals
];

/// Depth-first enumeration of wireframe edges for every node up to and
/// including `max_depth`. Each box yields its 12 edges as 24 endpoints.
pub fn wireframe(tree: &BuildTree, max_depth: u32) -> Vec<WireVertex> {
    let tree_max_depth = tree.max_depth().max(1);
    let mut out = Vec::new();
    visit(tree, 0, max_depth, tree_max_depth, &mut out);
    out
}

fn visit(tree: &BuildTree, node_idx: usize, depth_limit: u32, tree_max_depth: u32, out: &mut Vec<WireVertex>) {
    let node = &tree.nodes[node_idx];
    if node.depth > depth_limit {
        return;
    }

    let red = node.depth as f32 / tree_max_depth as f32;
    let color = Vec3::new(red, 0.0, 0.0);
    let corners = inflated_corners(&node.bounds);
    for &(a, b) in &EDGES {
        out.push(WireVertex { position: corners[a], color });
        out.push(WireVertex { position: corners[b], color });
    }

    if !node.is_leaf {
        visit(tree, node.left.unwrap(), depth_limit, tree_max_depth, out);
        visit(tree, node.right.unwrap(), depth_limit, tree_max_depth, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::build::build;
    use crate::material::Material;
    use crate::scene::types::Triangle;

    fn make_tri(cx: f32) -> Triangle {
        Triangle::new(
            Vec3::new(cx - 0.5, -0.5, 0.0),
            Vec3::new(cx + 0.5, -0.5, 0.0),
            Vec3::new(cx, 0.5, 0.0),
            Material::default(),
        )
        .unwrap()
    }

    #[test]
    fn root_only_depth_yields_one_box_worth_of_edges() {
        let tris: Vec<Triangle> = (0..64).map(|i| make_tri(i as f32 * 2.0)).collect();
        let tree = build(&tris);
        let verts = wireframe(&tree, 0);
        assert_eq!(verts.len(), 24); // 12 edges * 2 endpoints
    }

    #[test]
    fn depth_above_tree_depth_yields_full_tree() {
        let tris: Vec<Triangle> = (0..64).map(|i| make_tri(i as f32 * 2.0)).collect();
        let tree = build(&tris);
        let shallow = wireframe(&tree, tree.max_depth());
        let deep = wireframe(&tree, tree.max_depth() + 50);
        assert_eq!(shallow.len(), deep.len());
    }

    #[test]
    fn box_is_inflated_about_min_corner() {
        let tree = build(&[make_tri(0.0)]);
        let verts = wireframe(&tree, 0);
        let b = tree.root().bounds;
        let extent = b.max - b.min;
        let inflated_extent = extent * INFLATE;
        // every vertex position's max-corner-relative coordinate should not
        // exceed the inflated extent from min.
        for v in &verts {
            let rel = v.position - b.min;
            assert!(rel.x <= inflated_extent.x + 1e-5);
            assert!(rel.y <= inflated_extent.y + 1e-5);
            assert!(rel.z <= inflated_extent.z + 1e-5);
        }
    }
}
