//! Depth-first flattening of the build-time tree into the GPU-facing node
//! array the kernel actually traverses.

use bytemuck::{Pod, Zeroable};

use crate::bvh::build::BuildTree;

/// GPU-facing BVH node, 48 bytes (per the contractual resource layout):
/// `minBounds(12) pad(4) maxBounds(12) slot0(4) slot1(4) isLeaf(4) pad(8)`.
///
/// `slot0`/`slot1` are `leftChildIndex`/`rightChildIndex` for an internal
/// node, or `triangleStart`/`triangleCount` for a leaf.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FlatNode {
    pub min_bounds: [f32; 3],
    pub _pad0: f32,
    pub max_bounds: [f32; 3],
    pub slot0: u32,
    pub slot1: u32,
    pub is_leaf: u32,
    pub _pad1: [u32; 2],
}

const _: () = assert!(std::mem::size_of::<FlatNode>() == 48);

impl FlatNode {
    fn placeholder() -> Self {
        Self {
            min_bounds: [0.0; 3],
            _pad0: 0.0,
            max_bounds: [0.0; 3],
            slot0: 0,
            slot1: 0,
            is_leaf: 0,
            _pad1: [0; 2],
        }
    }
}

/// The flattened BVH: a node array (root at index 0) plus the triangle
/// index array leaves slice into.
#[derive(Debug, Clone)]
pub struct FlatBvh {
    pub nodes: Vec<FlatNode>,
    pub triangle_indices: Vec<u32>,
}

/// Flatten a build-time tree depth-first. Leaves append their triangle
/// indices contiguously; internal nodes record child indices after their
/// subtrees have been flattened.
pub fn flatten(tree: &BuildTree) -> FlatBvh {
    let mut nodes = vec![FlatNode::placeholder(); tree.nodes.len()];
    let mut triangle_indices = Vec::new();

    flatten_node(tree, 0, &mut nodes, &mut triangle_indices);

    FlatBvh { nodes, triangle_indices }
}

fn flatten_node(tree: &BuildTree, build_idx: usize, out_nodes: &mut [FlatNode], out_indices: &mut Vec<u32>) -> usize {
    let node = &tree.nodes[build_idx];
    let flat_idx = build_idx;

    if node.is_leaf {
        let start = out_indices.len() as u32;
        out_indices.extend_from_slice(&node.triangle_indices);
        out_nodes[flat_idx] = FlatNode {
            min_bounds: node.bounds.min.to_array(),
            _pad0: 0.0,
            max_bounds: node.bounds.max.to_array(),
            slot0: start,
            slot1: node.triangle_indices.len() as u32,
            is_leaf: 1,
            _pad1: [0; 2],
        };
    } else {
        let left = node.left.expect("internal node must have a left child");
        let right = node.right.expect("internal node must have a right child");
        flatten_node(tree, left, out_nodes, out_indices);
        flatten_node(tree, right, out_nodes, out_indices);
        out_nodes[flat_idx] = FlatNode {
            min_bounds: node.bounds.min.to_array(),
            _pad0: 0.0,
            max_bounds: node.bounds.max.to_array(),
            slot0: left as u32,
            slot1: right as u32,
            is_leaf: 0,
            _pad1: [0; 2],
        };
    }

    flat_idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::build::build;
    use crate::material::Material;
    use crate::scene::types::Triangle;
    use glam::Vec3;

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
    fn flat_node_is_48_bytes() {
        assert_eq!(std::mem::size_of::<FlatNode>(), 48);
    }

    #[test]
    fn flattening_round_trip_preserves_topology_and_leaf_contents() {
        let tris: Vec<Triangle> = (0..64).map(|i| make_tri(i as f32 * 2.0)).collect();
        let tree = build(&tris);
        let flat = flatten(&tree);

        // Rebuild the tree from the flat arrays by following child indices,
        // and check it is isomorphic (same topology, boxes, leaf contents)
        // to the original build-time tree.
        fn check(tree: &BuildTree, build_idx: usize, flat: &FlatBvh, flat_idx: usize) {
            let build_node = &tree.nodes[build_idx];
            let flat_node = &flat.nodes[flat_idx];

            assert_eq!(build_node.is_leaf, flat_node.is_leaf == 1);
            assert_eq!(build_node.bounds.min.to_array(), flat_node.min_bounds);
            assert_eq!(build_node.bounds.max.to_array(), flat_node.max_bounds);

            if build_node.is_leaf {
                let start = flat_node.slot0 as usize;
                let count = flat_node.slot1 as usize;
                let rebuilt: Vec<u32> = flat.triangle_indices[start..start + count].to_vec();
                assert_eq!(rebuilt, build_node.triangle_indices);
            } else {
                check(tree, build_node.left.unwrap(), flat, flat_node.slot0 as usize);
                check(tree, build_node.right.unwrap(), flat, flat_node.slot1 as usize);
            }
        }

        check(&tree, 0, &flat, 0);

        let mut covered = flat.triangle_indices.clone();
        covered.sort();
        assert_eq!(covered, (0..64).collect::<Vec<u32>>());
    }

    #[test]
    fn empty_tree_flattens_to_single_leaf() {
        let tree = build(&[]);
        let flat = flatten(&tree);
        assert_eq!(flat.nodes.len(), 1);
        assert_eq!(flat.nodes[0].is_leaf, 1);
        assert_eq!(flat.nodes[0].slot1, 0);
    }
}
