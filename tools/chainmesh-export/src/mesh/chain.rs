//! Triangle chaining
//!
//! Greedily partitions an object's triangles into chains of edge-adjacent
//! triangles. Inside a chain every triangle after the seed shares an edge with
//! its predecessor, so only one new corner per triangle has to be stored.
//!
//! Edges are directed corner pairs; a neighbour with consistent winding owns
//! the reversed edge. Corners are compared whole (vertex, texcoord and normal)
//! because the decoder copies the two shared corners verbatim.

use hashbrown::HashMap;

use chainmesh_format::MAX_CHAIN_LEN;

use super::{Corner, Triangle};
use crate::error::{MeshError, MeshResult};

/// Which edge of the previous triangle a chained triangle shares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkType {
    /// Previous triangle's closing edge `(c, a)`
    Closing = 0,
    /// Previous triangle's middle edge `(b, c)`
    Middle = 1,
    /// Previous triangle's leading edge `(a, b)`; only possible right after
    /// the seed and normalized away before a chain is emitted
    Leading = 2,
}

/// A seed triangle followed by edge-linked triangles
///
/// Every linked triangle is oriented so that its first edge is the reversed
/// shared edge; its third corner is the only new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub seed: Triangle,
    pub links: Vec<(LinkType, Triangle)>,
}

impl Chain {
    /// Number of triangles (1..=65535)
    pub fn len(&self) -> usize {
        1 + self.links.len()
    }

    /// All triangles in chain order
    pub fn triangles(&self) -> impl Iterator<Item = &Triangle> {
        std::iter::once(&self.seed).chain(self.links.iter().map(|(_, t)| t))
    }

    /// Seed corners, then the new corner of each linked triangle
    pub fn emitted_corners(&self) -> impl Iterator<Item = &Corner> {
        self.seed
            .iter()
            .chain(self.links.iter().map(|(_, t)| &t[2]))
    }
}

type Edge = (Corner, Corner);

fn edge(t: &Triangle, i: usize) -> Edge {
    (t[i], t[(i + 1) % 3])
}

fn reverse(e: Edge) -> Edge {
    (e.1, e.0)
}

/// Adjacency, availability and scan cursor for one object
struct ChainBuilder<'a> {
    triangles: &'a [Triangle],
    object: usize,
    edges: HashMap<Edge, Vec<usize>>,
    available: Vec<bool>,
    remaining: usize,
    cursor: usize,
}

impl<'a> ChainBuilder<'a> {
    fn new(triangles: &'a [Triangle], object: usize) -> Self {
        let mut edges: HashMap<Edge, Vec<usize>> = HashMap::new();
        for (i, t) in triangles.iter().enumerate() {
            for k in 0..3 {
                edges.entry(edge(t, k)).or_default().push(i);
            }
        }
        Self {
            triangles,
            object,
            edges,
            available: vec![true; triangles.len()],
            remaining: triangles.len(),
            cursor: 0,
        }
    }

    /// Next unused triangle in source order, marked used
    fn next_seed(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        while !self.available[self.cursor] {
            self.cursor += 1;
        }
        Some(self.take(self.cursor))
    }

    /// An unused triangle owning edge `e`, marked used
    ///
    /// Candidates are consumed from the back of the edge's list.
    fn take_with_edge(&mut self, e: Edge) -> Option<usize> {
        let candidates = self.edges.get_mut(&e)?;
        while let Some(i) = candidates.pop() {
            if self.available[i] {
                self.available[i] = false;
                self.remaining -= 1;
                return Some(i);
            }
        }
        None
    }

    fn take(&mut self, i: usize) -> usize {
        self.available[i] = false;
        self.remaining -= 1;
        i
    }

    fn integrity_error(&self, triangle: usize, e: Edge) -> MeshError {
        MeshError::Integrity {
            object: self.object,
            triangle,
            edge: (e.0.vertex, e.1.vertex),
        }
    }

    /// The edge following `e` in `t`
    fn edge_after(&self, t: &Triangle, source: usize, e: Edge) -> MeshResult<Edge> {
        (0..3)
            .find(|&k| edge(t, k) == e)
            .map(|k| edge(t, (k + 1) % 3))
            .ok_or_else(|| self.integrity_error(source, e))
    }

    /// Rotate `t` so that it starts with edge `e`
    fn rotate_to_edge(&self, t: &Triangle, source: usize, e: Edge) -> MeshResult<Triangle> {
        (0..3)
            .find(|&k| edge(t, k) == e)
            .map(|k| [t[k], t[(k + 1) % 3], t[(k + 2) % 3]])
            .ok_or_else(|| self.integrity_error(source, e))
    }

    fn build_chain(&mut self, seed: usize) -> MeshResult<Chain> {
        let mut chain = Chain {
            seed: self.triangles[seed],
            links: Vec::new(),
        };
        let mut current = chain.seed;
        let mut current_source = seed;
        let mut e = edge(&current, 2);

        while chain.len() < MAX_CHAIN_LEN {
            // Seed-only chains try all three edges, extended chains two
            let tries = if chain.links.is_empty() { 3 } else { 2 };
            let mut found = None;
            for _ in 0..tries {
                e = self.edge_after(&current, current_source, e)?;
                if let Some(next) = self.take_with_edge(reverse(e)) {
                    found = Some(next);
                    break;
                }
            }
            let Some(next) = found else {
                break;
            };

            let prev = &current;
            if e == edge(prev, 0) && !chain.links.is_empty() {
                return Err(MeshError::Consistency(format!(
                    "object {}: chain continued through the leading edge of triangle {}",
                    self.object, current_source
                )));
            }
            let link = if e == edge(prev, 1) {
                LinkType::Middle
            } else if e == edge(prev, 2) {
                LinkType::Closing
            } else if e == edge(prev, 0) {
                LinkType::Leading
            } else {
                return Err(self.integrity_error(current_source, e));
            };

            e = reverse(e);
            current = self.rotate_to_edge(&self.triangles[next], next, e)?;
            current_source = next;
            chain.links.push((link, current));
        }

        normalize_seed(&mut chain);
        Ok(chain)
    }
}

/// A first link through the seed's leading edge becomes a closing-edge link
/// by rotating the seed one corner forward.
fn normalize_seed(chain: &mut Chain) {
    if let Some((link, _)) = chain.links.first_mut() {
        if *link == LinkType::Leading {
            chain.seed.rotate_left(1);
            *link = LinkType::Closing;
        }
    }
}

/// Partition one object's triangles into chains
///
/// `object` is only used to identify the object in errors.
pub fn build_chains(triangles: &[Triangle], object: usize) -> MeshResult<Vec<Chain>> {
    let mut builder = ChainBuilder::new(triangles, object);
    let mut chains = Vec::new();
    while let Some(seed) = builder.next_seed() {
        chains.push(builder.build_chain(seed)?);
    }

    tracing::debug!(
        "object {}: {} triangles in {} chains",
        object,
        triangles.len(),
        chains.len()
    );
    Ok(chains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::parse_obj;
    use hashbrown::HashSet;

    fn tri(a: u32, b: u32, c: u32) -> Triangle {
        [a, b, c].map(|vertex| Corner {
            vertex,
            ..Default::default()
        })
    }

    fn verts(t: &Triangle) -> [u32; 3] {
        t.map(|c| c.vertex)
    }

    /// Canonical form up to rotation (winding preserved)
    fn canonical(t: &Triangle) -> [u32; 3] {
        let v = verts(t);
        (0..3)
            .map(|k| [v[k], v[(k + 1) % 3], v[(k + 2) % 3]])
            .min()
            .unwrap()
    }

    fn assert_covers(triangles: &[Triangle], chains: &[Chain]) {
        let total: usize = chains.iter().map(Chain::len).sum();
        assert_eq!(total, triangles.len());
        let mut expected: Vec<[u32; 3]> = triangles.iter().map(canonical).collect();
        let mut got: Vec<[u32; 3]> = chains.iter().flat_map(Chain::triangles).map(canonical).collect();
        expected.sort();
        got.sort();
        assert_eq!(got, expected);
    }

    /// Every linked triangle starts with its predecessor's shared edge reversed
    fn assert_links_consistent(chain: &Chain) {
        let mut prev = chain.seed;
        for (link, t) in &chain.links {
            let shared = match link {
                LinkType::Closing => edge(&prev, 2),
                LinkType::Middle => edge(&prev, 1),
                LinkType::Leading => panic!("leading link survived normalization"),
            };
            assert_eq!(edge(t, 0), reverse(shared));
            prev = *t;
        }
    }

    #[test]
    fn test_two_triangles_sharing_edge() {
        let triangles = vec![tri(0, 1, 2), tri(2, 1, 3)];
        let chains = build_chains(&triangles, 0).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 2);
        assert_links_consistent(&chains[0]);
        assert_covers(&triangles, &chains);
    }

    #[test]
    fn test_leading_edge_link_rotates_seed() {
        // Neighbour across the seed's first edge (0,1)
        let triangles = vec![tri(0, 1, 2), tri(1, 0, 3)];
        let chains = build_chains(&triangles, 0).unwrap();
        let chain = &chains[0];
        assert_eq!(verts(&chain.seed), [1, 2, 0]);
        assert_eq!(chain.links[0].0, LinkType::Closing);
        assert_eq!(verts(&chain.links[0].1), [1, 0, 3]);
        assert_links_consistent(chain);
    }

    #[test]
    fn test_seed_tries_its_closing_edge_last() {
        // Only neighbour sits across the seed's third edge (2,0)
        let triangles = vec![tri(0, 1, 2), tri(0, 2, 3)];
        let chains = build_chains(&triangles, 0).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 2);
        assert_eq!(chains[0].links[0].0, LinkType::Closing);
        assert_links_consistent(&chains[0]);
    }

    #[test]
    fn test_extended_chain_skips_leading_edge() {
        // (1,2,9) also borders the seed; once the chain is extended the
        // leading edge of (2,1,3) is never searched
        let triangles = vec![tri(0, 1, 2), tri(2, 1, 3), tri(1, 2, 9)];
        let chains = build_chains(&triangles, 0).unwrap();
        let lens: Vec<usize> = chains.iter().map(Chain::len).collect();
        assert_eq!(lens, vec![2, 1]);
        assert_covers(&triangles, &chains);
    }

    #[test]
    fn test_disjoint_triangles_make_separate_chains() {
        let triangles = vec![tri(0, 1, 2), tri(3, 4, 5), tri(6, 7, 8)];
        let chains = build_chains(&triangles, 0).unwrap();
        assert_eq!(chains.len(), 3);
        assert!(chains.iter().all(|c| c.len() == 1));
        assert_eq!(verts(&chains[1].seed), [3, 4, 5]);
    }

    #[test]
    fn test_opposite_winding_not_chained() {
        // Same directed edge (0,1) on both: not a consistent neighbour
        let triangles = vec![tri(0, 1, 2), tri(0, 1, 3)];
        let chains = build_chains(&triangles, 0).unwrap();
        assert_eq!(chains.len(), 2);
    }

    #[test]
    fn test_texcoord_seam_breaks_chain() {
        let mut triangles = vec![tri(0, 1, 2), tri(2, 1, 3)];
        triangles[1][0].texcoord = 7;
        let chains = build_chains(&triangles, 0).unwrap();
        assert_eq!(chains.len(), 2);
    }

    #[test]
    fn test_strip_is_single_chain() {
        // A strip of 8 triangles over a 2 x 5 vertex grid
        let mut triangles = Vec::new();
        for i in 0..4u32 {
            let (a, b, c, d) = (2 * i, 2 * i + 1, 2 * i + 2, 2 * i + 3);
            triangles.push(tri(a, b, c));
            triangles.push(tri(c, b, d));
        }
        let chains = build_chains(&triangles, 0).unwrap();
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 8);
        assert_links_consistent(&chains[0]);
        assert_covers(&triangles, &chains);
    }

    #[test]
    fn test_closed_cube_coverage() {
        let src = "v -1 -1 -1\nv 1 -1 -1\nv 1 1 -1\nv -1 1 -1\n\
                   v -1 -1 1\nv 1 -1 1\nv 1 1 1\nv -1 1 1\n\
                   f 1 4 3 2\nf 5 6 7 8\nf 1 2 6 5\nf 2 3 7 6\nf 3 4 8 7\nf 4 1 5 8\n";
        let mesh = parse_obj(src.as_bytes()).unwrap();
        let triangles = &mesh.objects[0].triangles;
        let chains = build_chains(triangles, 0).unwrap();
        assert_covers(triangles, &chains);
        for chain in &chains {
            assert_links_consistent(chain);
        }
        assert!(chains.len() < triangles.len());
    }

    #[test]
    fn test_each_triangle_used_once() {
        // Fan around vertex 0 with a duplicated triangle
        let triangles = vec![tri(0, 1, 2), tri(0, 2, 3), tri(0, 3, 4), tri(0, 2, 3)];
        let chains = build_chains(&triangles, 0).unwrap();
        assert_covers(&triangles, &chains);
        let used: HashSet<[u32; 3]> = chains
            .iter()
            .flat_map(Chain::triangles)
            .map(canonical)
            .collect();
        assert_eq!(used.len(), 3);
    }

    #[test]
    fn test_emitted_corners() {
        let triangles = vec![tri(0, 1, 2), tri(2, 1, 3)];
        let chains = build_chains(&triangles, 0).unwrap();
        let emitted: Vec<u32> = chains[0].emitted_corners().map(|c| c.vertex).collect();
        assert_eq!(emitted.len(), 4);
        assert_eq!(emitted[3], 3);
    }
}
