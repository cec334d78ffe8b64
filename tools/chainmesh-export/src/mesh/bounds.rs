//! Bounding boxes and optional unit-cube normalization

use glam::Vec3;

use super::ChainedMesh;

/// Decimal places kept in the reported model bounding box
const BOUNDS_PRECISION: i32 = 2;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }
}

impl Bounds {
    /// Componentwise min/max; `None` for an empty set
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f32; 3]>) -> Option<Self> {
        let mut points = points.into_iter().map(|p| Vec3::from_array(*p));
        let first = points.next()?;
        Some(points.fold(
            Self {
                min: first,
                max: first,
            },
            |b, p| Self {
                min: b.min.min(p),
                max: b.max.max(p),
            },
        ))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Every bound rounded to `places` decimals, exact ties to even
    pub fn rounded(&self, places: i32) -> Self {
        let scale = 10f64.powi(places);
        let round = |v: Vec3| {
            Vec3::from_array(
                v.to_array()
                    .map(|x| ((x as f64 * scale).round_ties_even() / scale) as f32),
            )
        };
        Self {
            min: round(self.min),
            max: round(self.max),
        }
    }

    /// `[xmin, xmax, ymin, ymax, zmin, zmax]`
    pub fn to_array(&self) -> [f32; 6] {
        [
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z,
        ]
    }
}

/// Optionally center the positions on the origin and scale them into
/// `[-1, 1]^3`, then report the (rounded) bounding box of the result.
///
/// The scale factor is the reciprocal of the largest half-extent, so the
/// aspect ratio is kept. A model with zero extent is only translated.
pub fn recenter_and_rescale(vertices: &[[f32; 3]], normalize: bool) -> (Vec<[f32; 3]>, Bounds) {
    let Some(bounds) = Bounds::from_points(vertices) else {
        return (Vec::new(), Bounds::default());
    };
    if !normalize {
        return (vertices.to_vec(), bounds.rounded(BOUNDS_PRECISION));
    }

    let center = bounds.center();
    let extent = bounds.half_extents().max_element();
    let scale = if extent > 0.0 { extent.recip() } else { 1.0 };
    if extent <= 0.0 {
        tracing::warn!("model has zero extent, skipping rescale");
    }

    let moved: Vec<[f32; 3]> = vertices
        .iter()
        .map(|p| ((Vec3::from_array(*p) - center) * scale).to_array())
        .collect();
    let bounds = Bounds::from_points(&moved).unwrap_or_default();
    (moved, bounds.rounded(BOUNDS_PRECISION))
}

/// Per-object box over the vertices its chains reference (not rounded)
pub fn object_bounds(mesh: &ChainedMesh) -> Vec<Bounds> {
    let vertices = &mesh.attributes.vertices;
    mesh.objects
        .iter()
        .map(|object| {
            let points = object
                .chains
                .iter()
                .flat_map(|c| c.triangles())
                .flatten()
                .filter_map(|c| vertices.get(c.vertex as usize));
            Bounds::from_points(points).unwrap_or_default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Chain, ChainedObject, Corner};

    fn cube(half: f32) -> Vec<[f32; 3]> {
        let mut v = Vec::new();
        for x in [-half, half] {
            for y in [-half, half] {
                for z in [-half, half] {
                    v.push([x, y, z]);
                }
            }
        }
        v
    }

    #[test]
    fn test_normalized_cube_fits_unit_box() {
        let (vertices, bounds) = recenter_and_rescale(&cube(2.0), true);
        for p in &vertices {
            for c in p {
                assert!((-1.0..=1.0).contains(c));
            }
        }
        assert_eq!(bounds.to_array(), [-1.0, 1.0, -1.0, 1.0, -1.0, 1.0]);
    }

    #[test]
    fn test_normalize_keeps_aspect_ratio() {
        let vertices = [[10.0, 0.0, 0.0], [14.0, 1.0, 0.5]];
        let (moved, bounds) = recenter_and_rescale(&vertices, true);
        assert_eq!(moved[0], [-1.0, -0.25, -0.125]);
        assert_eq!(bounds.to_array(), [-1.0, 1.0, -0.25, 0.25, -0.12, 0.12]);
    }

    #[test]
    fn test_without_normalize_only_rounds_bounds() {
        let vertices = [[0.123, -4.5678, 1.0], [2.0, 3.0, 1.004]];
        let (moved, bounds) = recenter_and_rescale(&vertices, false);
        assert_eq!(moved, vertices.to_vec());
        assert_eq!(bounds.to_array(), [0.12, 2.0, -4.57, 3.0, 1.0, 1.0]);
    }

    #[test]
    fn test_rounding_ties_go_to_even() {
        let vertices = [[0.125, -0.625, 0.0], [0.625, 0.375, 1.0]];
        let (_, bounds) = recenter_and_rescale(&vertices, false);
        assert_eq!(bounds.to_array(), [0.12, 0.62, -0.62, 0.38, 0.0, 1.0]);
    }

    #[test]
    fn test_zero_extent_is_translated_only() {
        let (moved, bounds) = recenter_and_rescale(&[[3.0, 3.0, 3.0]; 2], true);
        assert_eq!(moved, vec![[0.0; 3]; 2]);
        assert_eq!(bounds, Bounds::default());
    }

    #[test]
    fn test_object_bounds_use_referenced_vertices_only() {
        let corner = |vertex| Corner {
            vertex,
            ..Default::default()
        };
        let chain = |a, b, c| Chain {
            seed: [corner(a), corner(b), corner(c)],
            links: Vec::new(),
        };
        let mesh = ChainedMesh {
            attributes: crate::mesh::Attributes {
                vertices: vec![
                    [0.0, 0.0, 0.0],
                    [1.0, 0.0, 0.0],
                    [0.0, 1.0, 0.0],
                    [5.0, 5.0, 5.0],
                    [6.0, 5.0, 5.0],
                    [5.0, 6.0, 7.0],
                ],
                ..Default::default()
            },
            objects: vec![
                ChainedObject {
                    tag: "a".into(),
                    chains: vec![chain(0, 1, 2)],
                },
                ChainedObject {
                    tag: "b".into(),
                    chains: vec![chain(3, 4, 5)],
                },
            ],
        };
        let boxes = object_bounds(&mesh);
        assert_eq!(boxes[0].to_array(), [0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(boxes[1].to_array(), [5.0, 6.0, 5.0, 6.0, 5.0, 7.0]);
    }
}
