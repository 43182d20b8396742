//! Triangle buffers fed to the half-edge builder, and a few primitive generators.

use glam::Vec3;

use crate::error::ShapeError;

/// Indexed triangle list in a body's local frame.
///
/// Triangles are wound counter-clockwise when seen from outside the shape, so
/// `(b - a).cross(c - a)` points outward. Vertices must be shared between
/// adjacent triangles for the half-edge builder to pair their edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate over index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }

    /// Check the buffers are non-empty, triangulated and in range.
    pub fn validate(&self) -> Result<(), ShapeError> {
        if self.positions.is_empty() || self.indices.is_empty() {
            return Err(ShapeError::EmptyMesh);
        }
        if self.indices.len() % 3 != 0 {
            return Err(ShapeError::IndexCountNotTriangles(self.indices.len()));
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.positions.len())
        {
            return Err(ShapeError::IndexOutOfRange {
                index,
                vertex_count: self.positions.len(),
            });
        }
        Ok(())
    }

    /// Axis-aligned box centered on the origin.
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        // Vertex i has +x when bit 0 is set, +y for bit 1, +z for bit 2.
        let positions = (0..8u32)
            .map(|i| {
                Vec3::new(
                    if i & 1 != 0 { h.x } else { -h.x },
                    if i & 2 != 0 { h.y } else { -h.y },
                    if i & 4 != 0 { h.z } else { -h.z },
                )
            })
            .collect();

        let quads: [[u32; 4]; 6] = [
            [1, 3, 7, 5], // +x
            [0, 4, 6, 2], // -x
            [2, 6, 7, 3], // +y
            [0, 1, 5, 4], // -y
            [4, 5, 7, 6], // +z
            [0, 2, 3, 1], // -z
        ];

        let mut indices = Vec::with_capacity(36);
        for [a, b, c, d] in quads {
            indices.extend_from_slice(&[a, b, c, a, c, d]);
        }

        Self { positions, indices }
    }

    /// Prism with a regular `segments`-gon cross-section, axis along Y.
    ///
    /// Caps are triangle fans around a center vertex; the coplanar merge
    /// removes those centers from the final hull.
    pub fn cylinder(radius: f32, half_height: f32, segments: u32) -> Self {
        let n = segments.max(3);
        let mut positions = Vec::with_capacity(2 * n as usize + 2);

        for y in [-half_height, half_height] {
            for i in 0..n {
                let theta = std::f32::consts::TAU * i as f32 / n as f32;
                positions.push(Vec3::new(radius * theta.cos(), y, radius * theta.sin()));
            }
        }
        let bottom_center = positions.len() as u32;
        positions.push(Vec3::new(0.0, -half_height, 0.0));
        let top_center = positions.len() as u32;
        positions.push(Vec3::new(0.0, half_height, 0.0));

        let mut indices = Vec::with_capacity(12 * n as usize);
        for i in 0..n {
            let j = (i + 1) % n;
            let (bi, bj, ti, tj) = (i, j, n + i, n + j);

            // Side quad
            indices.extend_from_slice(&[bi, ti, tj, bi, tj, bj]);
            // Caps
            indices.extend_from_slice(&[top_center, tj, ti]);
            indices.extend_from_slice(&[bottom_center, bi, bj]);
        }

        Self { positions, indices }
    }

    /// Pyramid with a regular `segments`-gon base at `-half_height` and apex at `+half_height`.
    pub fn cone(radius: f32, half_height: f32, segments: u32) -> Self {
        let n = segments.max(3);
        let mut positions = Vec::with_capacity(n as usize + 2);

        for i in 0..n {
            let theta = std::f32::consts::TAU * i as f32 / n as f32;
            positions.push(Vec3::new(
                radius * theta.cos(),
                -half_height,
                radius * theta.sin(),
            ));
        }
        let apex = positions.len() as u32;
        positions.push(Vec3::new(0.0, half_height, 0.0));
        let base_center = positions.len() as u32;
        positions.push(Vec3::new(0.0, -half_height, 0.0));

        let mut indices = Vec::with_capacity(6 * n as usize);
        for i in 0..n {
            let j = (i + 1) % n;
            indices.extend_from_slice(&[i, apex, j]);
            indices.extend_from_slice(&[base_center, i, j]);
        }

        Self { positions, indices }
    }
}
