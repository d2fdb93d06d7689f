//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and refer to each other by index. Leaves own a
//! contiguous range of a permutation of primitive indices, so the scene's
//! primitive array is never reordered.

use rayon::prelude::*;

use crate::{
    hit::{Hit, Hittable},
    Primitive, Ray,
};
use lumen_math::{Aabb, DVec3, Interval};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Traversal stack depth. Median splits keep the tree depth near log2(n), far
/// below this for any scene that fits in memory.
const STACK_SIZE: usize = 64;

/// BVH node - either a branch with two children or a leaf with primitives.
#[derive(Debug, Clone, Copy)]
enum BvhNode {
    Branch { bbox: Aabb, left: u32, right: u32 },
    Leaf { bbox: Aabb, start: u32, count: u32 },
}

impl BvhNode {
    fn bbox(&self) -> &Aabb {
        match self {
            BvhNode::Branch { bbox, .. } | BvhNode::Leaf { bbox, .. } => bbox,
        }
    }
}

/// Per-primitive data needed only while building.
struct BuildItem {
    index: u32,
    bbox: Aabb,
    centroid: DVec3,
}

/// Statistics about a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BvhStats {
    pub nodes: usize,
    pub leaves: usize,
    pub depth: usize,
}

/// Bounding volume hierarchy over a primitive slice.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    indices: Vec<u32>,
}

impl Bvh {
    /// Build a BVH over `primitives`.
    ///
    /// Simple median-split approach: sort by centroid on the longest axis of
    /// the centroid bounds, split in half, recurse.
    pub fn build(primitives: &[Primitive]) -> Self {
        let mut items: Vec<BuildItem> = primitives
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let bbox = p.bounding_box();
                BuildItem {
                    index: i as u32,
                    bbox,
                    centroid: bbox.centroid(),
                }
            })
            .collect();

        let mut bvh = Self {
            nodes: Vec::with_capacity(2 * items.len() / LEAF_MAX_SIZE + 1),
            indices: Vec::with_capacity(items.len()),
        };

        if !items.is_empty() {
            bvh.build_node(&mut items);
        }

        log::debug!(
            "Built BVH over {} primitives: {:?}",
            primitives.len(),
            bvh.stats()
        );

        bvh
    }

    /// Recursive construction; returns the index of the new node.
    fn build_node(&mut self, items: &mut [BuildItem]) -> u32 {
        let bounds = items
            .iter()
            .fold(Aabb::EMPTY, |acc, item| Aabb::surrounding(&acc, &item.bbox));

        let node_index = self.nodes.len() as u32;

        // Create leaf for small sets
        if items.len() <= LEAF_MAX_SIZE {
            let start = self.indices.len() as u32;
            self.indices.extend(items.iter().map(|item| item.index));
            self.nodes.push(BvhNode::Leaf {
                bbox: bounds,
                start,
                count: items.len() as u32,
            });
            return node_index;
        }

        // Choose split axis based on centroid spread
        let centroid_bounds = items.iter().fold(Aabb::EMPTY, |acc, item| {
            Aabb::surrounding(&acc, &Aabb::from_points(item.centroid, item.centroid))
        });
        let axis = centroid_bounds.longest_axis();

        items.par_sort_unstable_by(|a, b| {
            a.centroid[axis]
                .total_cmp(&b.centroid[axis])
                .then(a.index.cmp(&b.index))
        });

        // Reserve this node's slot, then fill it once the children exist
        self.nodes.push(BvhNode::Leaf {
            bbox: bounds,
            start: 0,
            count: 0,
        });

        let mid = items.len() / 2;
        let (left_items, right_items) = items.split_at_mut(mid);
        let left = self.build_node(left_items);
        let right = self.build_node(right_items);

        self.nodes[node_index as usize] = BvhNode::Branch {
            bbox: bounds,
            left,
            right,
        };

        node_index
    }

    /// Find the nearest hit among `primitives`, which must be the slice the
    /// tree was built over.
    ///
    /// Ties in `t` go to the lowest primitive index, matching a front-to-back
    /// linear scan.
    pub fn intersect<'a>(
        &self,
        primitives: &'a [Primitive],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<Hit<'a>> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut closest: Option<(u32, Hit<'a>)> = None;
        let mut stack = [0u32; STACK_SIZE];
        let mut top = 1;

        while top > 0 {
            top -= 1;
            let node = &self.nodes[stack[top] as usize];

            let range = ray_t.with_max(closest.map_or(ray_t.max, |(_, hit)| hit.t));
            if !node.bbox().hit(ray, range) {
                continue;
            }

            match *node {
                BvhNode::Leaf { start, count, .. } => {
                    let leaf = &self.indices[start as usize..(start + count) as usize];
                    for &index in leaf {
                        let range =
                            ray_t.with_max(closest.map_or(ray_t.max, |(_, hit)| hit.t));
                        let Some(hit) = primitives[index as usize].intersect(ray, range) else {
                            continue;
                        };
                        let better = match closest {
                            None => true,
                            Some((best_index, best)) => {
                                hit.t < best.t || (hit.t == best.t && index < best_index)
                            }
                        };
                        if better {
                            closest = Some((index, hit));
                        }
                    }
                }
                BvhNode::Branch { left, right, .. } => {
                    if top + 2 > STACK_SIZE {
                        log::warn!("BVH traversal stack exhausted; subtree skipped");
                        continue;
                    }
                    stack[top] = right;
                    stack[top + 1] = left;
                    top += 2;
                }
            }
        }

        closest.map(|(_, hit)| hit)
    }

    /// Bounds of the whole tree.
    pub fn bounding_box(&self) -> Aabb {
        self.nodes.first().map_or(Aabb::EMPTY, |n| *n.bbox())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node count, leaf count and depth.
    pub fn stats(&self) -> BvhStats {
        if self.nodes.is_empty() {
            return BvhStats::default();
        }

        let mut stats = BvhStats::default();
        let mut pending = vec![(0u32, 1usize)];
        while let Some((index, depth)) = pending.pop() {
            stats.nodes += 1;
            stats.depth = stats.depth.max(depth);
            match self.nodes[index as usize] {
                BvhNode::Leaf { .. } => stats.leaves += 1,
                BvhNode::Branch { left, right, .. } => {
                    pending.push((left, depth + 1));
                    pending.push((right, depth + 1));
                }
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Lambertian, Material, Sphere, Triangle};
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::sync::Arc;

    fn grey() -> Arc<Material> {
        Arc::new(Lambertian::new(Color::splat(0.5)).into())
    }

    fn sphere_row(n: usize) -> Vec<Primitive> {
        (0..n)
            .map(|i| {
                Sphere::new(DVec3::new(i as f64, 0.0, -5.0), 0.5, grey())
                    .unwrap()
                    .into()
            })
            .collect()
    }

    /// Reference nearest hit: lowest t, first primitive on ties.
    fn linear<'a>(primitives: &'a [Primitive], ray: &Ray, ray_t: Interval) -> Option<Hit<'a>> {
        let mut closest: Option<Hit<'a>> = None;
        for p in primitives {
            if let Some(hit) = p.intersect(ray, ray_t) {
                if closest.map_or(true, |c| hit.t < c.t) {
                    closest = Some(hit);
                }
            }
        }
        closest
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = Bvh::build(&[]);
        assert!(bvh.is_empty());

        let ray = Ray::new(DVec3::ZERO, DVec3::Z);
        assert!(bvh.intersect(&[], &ray, Interval::UNIVERSE).is_none());
    }

    #[test]
    fn test_bvh_single_sphere() {
        let prims = sphere_row(1);
        let bvh = Bvh::build(&prims);

        assert_eq!(
            bvh.stats(),
            BvhStats {
                nodes: 1,
                leaves: 1,
                depth: 1
            }
        );

        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        let hit = bvh.intersect(&prims, &ray, Interval::new(0.001, f64::INFINITY));
        assert!(hit.is_some());
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let prims = sphere_row(10);
        let bvh = Bvh::build(&prims);

        // Ray that hits the sphere at x=5
        let ray = Ray::new(DVec3::new(5.0, 0.0, 0.0), DVec3::new(0.0, 0.0, -1.0));
        let hit = bvh
            .intersect(&prims, &ray, Interval::new(0.001, f64::INFINITY))
            .unwrap();

        // Sphere at z=-5, radius 0.5
        assert!((hit.p.z - (-4.5)).abs() < 1e-9);
    }

    #[test]
    fn test_every_primitive_in_one_leaf() {
        let prims = sphere_row(37);
        let bvh = Bvh::build(&prims);

        let mut seen = bvh.indices.clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..37).collect::<Vec<u32>>());

        let stats = bvh.stats();
        assert_eq!(stats.nodes, 2 * stats.leaves - 1);
        assert!(stats.depth < STACK_SIZE);
    }

    #[test]
    fn test_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut prims: Vec<Primitive> = Vec::new();

        for _ in 0..60 {
            let c = DVec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            );
            prims.push(Sphere::new(c, rng.gen_range(0.1..0.8), grey()).unwrap().into());
        }
        for _ in 0..60 {
            let base = DVec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            );
            let a = base + DVec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), 0.3);
            let b = base + DVec3::new(rng.gen_range(-1.0..1.0), 0.4, rng.gen_range(-1.0..1.0));
            if let Ok(t) = Triangle::new(base, a, b, grey()) {
                prims.push(t.into());
            }
        }

        let bvh = Bvh::build(&prims);
        let range = Interval::new(1e-3, 1e12);

        for _ in 0..2000 {
            let origin = DVec3::new(
                rng.gen_range(-8.0..8.0),
                rng.gen_range(-8.0..8.0),
                rng.gen_range(-8.0..8.0),
            );
            let target = DVec3::new(
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
                rng.gen_range(-4.0..4.0),
            );
            let ray = Ray::new(origin, target - origin);

            let expected = linear(&prims, &ray, range).map(|h| (h.t, h.p));
            let actual = bvh.intersect(&prims, &ray, range).map(|h| (h.t, h.p));
            assert_eq!(expected, actual);
        }
    }

    #[test]
    fn test_vertex_and_edge_hits_match_linear_scan() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut triangles: Vec<Triangle> = Vec::new();
        while triangles.len() < 200 {
            let mut corner = || {
                DVec3::new(
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-3.0..3.0),
                )
            };
            let (a, b, c) = (corner(), corner(), corner());
            if let Ok(t) = Triangle::new(a, b, c, grey()) {
                triangles.push(t);
            }
        }

        // Vertices and edge midpoints sit on the faces of the triangle's box
        let targets: Vec<DVec3> = triangles
            .iter()
            .flat_map(|t| {
                let [a, b, c] = t.vertices();
                [a, b, c, (a + b) * 0.5, (b + c) * 0.5, (c + a) * 0.5]
            })
            .collect();

        let prims: Vec<Primitive> = triangles.into_iter().map(Primitive::from).collect();
        let bvh = Bvh::build(&prims);
        let range = Interval::new(1e-3, 1e12);

        for target in targets {
            for _ in 0..8 {
                let origin = DVec3::new(
                    rng.gen_range(-9.0..9.0),
                    rng.gen_range(-9.0..9.0),
                    rng.gen_range(-9.0..9.0),
                );
                let ray = Ray::new(origin, target - origin);

                let expected = linear(&prims, &ray, range).map(|h| (h.t, h.p));
                let actual = bvh.intersect(&prims, &ray, range).map(|h| (h.t, h.p));
                assert_eq!(expected, actual, "ray {origin:?} -> {target:?}");
            }
        }
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        // Two identical spheres: every hit is a tie
        let first: Arc<Material> = Arc::new(Lambertian::new(Color::X).into());
        let prims: Vec<Primitive> = (0..9)
            .map(|i| {
                let material = if i == 3 { first.clone() } else { grey() };
                let x = if i == 3 || i == 7 { 0.0 } else { 10.0 + i as f64 };
                Sphere::new(DVec3::new(x, 0.0, 5.0), 1.0, material).unwrap().into()
            })
            .collect();

        let bvh = Bvh::build(&prims);
        let ray = Ray::new(DVec3::ZERO, DVec3::Z);
        let hit = bvh.intersect(&prims, &ray, Interval::new(1e-3, 1e12)).unwrap();

        assert!(std::ptr::eq(hit.material, first.as_ref()));
    }
}
