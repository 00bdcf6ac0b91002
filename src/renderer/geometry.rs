use crate::{
    color::ColorRect,
    math::{Point, Rect},
    renderer::TextureId,
};

/// A single vertex of a textured, colored triangle.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Screen position and depth.
    pub position: [f32; 3],
    /// Normalized texture coordinates.
    pub tex_coords: [f32; 2],
    /// RGBA color multiplied with the texture.
    pub color: [f32; 4],
}

/// Selects which diagonal splits a quad into its two triangles. The diagonal
/// changes how corner color gradients interpolate across the quad.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuadSplitMode {
    /// The shared edge runs from the top-left to the bottom-right corner.
    TopLeftToBottomRight,
    /// The shared edge runs from the bottom-left to the top-right corner.
    BottomLeftToTopRight,
}

impl Default for QuadSplitMode {
    fn default() -> Self {
        Self::TopLeftToBottomRight
    }
}

/// Vertices that share one texture.
#[derive(Clone, Debug)]
pub struct GeometryBatch {
    /// The texture sampled by every vertex in this batch.
    pub texture: TextureId,
    /// Triangle list, six vertices per quad.
    pub vertices: Vec<Vertex>,
}

/// Collects quads emitted while drawing. Consecutive quads using the same
/// texture are merged into one batch.
#[derive(Clone, Debug, Default)]
pub struct GeometryBuffer {
    batches: Vec<GeometryBatch>,
}

impl GeometryBuffer {
    /// Returns an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a quad covering `rect` at depth `z`, sampling `tex_rect` of
    /// `texture`.
    pub fn push_quad(
        &mut self,
        texture: TextureId,
        rect: Rect<f32>,
        z: f32,
        tex_rect: Rect<f32>,
        colors: &ColorRect,
        split: QuadSplitMode,
    ) {
        let vertex = |position: Point<f32>, tex: Point<f32>, color: crate::Color| Vertex {
            position: [position.x, position.y, z],
            tex_coords: [tex.x, tex.y],
            color: color.rgba(),
        };
        let top_left = vertex(
            Point::new(rect.x1(), rect.y1()),
            Point::new(tex_rect.x1(), tex_rect.y1()),
            colors.top_left,
        );
        let top_right = vertex(
            Point::new(rect.x2(), rect.y1()),
            Point::new(tex_rect.x2(), tex_rect.y1()),
            colors.top_right,
        );
        let bottom_left = vertex(
            Point::new(rect.x1(), rect.y2()),
            Point::new(tex_rect.x1(), tex_rect.y2()),
            colors.bottom_left,
        );
        let bottom_right = vertex(
            Point::new(rect.x2(), rect.y2()),
            Point::new(tex_rect.x2(), tex_rect.y2()),
            colors.bottom_right,
        );

        let triangles = match split {
            QuadSplitMode::TopLeftToBottomRight => [
                top_left,
                bottom_right,
                bottom_left,
                top_left,
                top_right,
                bottom_right,
            ],
            QuadSplitMode::BottomLeftToTopRight => [
                bottom_left,
                top_right,
                top_left,
                bottom_left,
                bottom_right,
                top_right,
            ],
        };

        match self.batches.last_mut() {
            Some(batch) if batch.texture == texture => batch.vertices.extend_from_slice(&triangles),
            _ => self.batches.push(GeometryBatch {
                texture,
                vertices: triangles.to_vec(),
            }),
        }
    }

    /// The batches collected so far, in draw order.
    #[must_use]
    pub fn batches(&self) -> &[GeometryBatch] {
        &self.batches
    }

    /// The total number of quads in this buffer.
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.batches
            .iter()
            .map(|batch| batch.vertices.len() / 6)
            .sum()
    }

    /// Returns the screen-space bounds of every quad, in draw order.
    #[must_use]
    pub fn quad_rects(&self) -> Vec<Rect<f32>> {
        self.batches
            .iter()
            .flat_map(|batch| batch.vertices.chunks_exact(6))
            .map(|quad| {
                let (mut min, mut max) = (
                    Point::new(f32::MAX, f32::MAX),
                    Point::new(f32::MIN, f32::MIN),
                );
                for vertex in quad {
                    min.x = min.x.min(vertex.position[0]);
                    min.y = min.y.min(vertex.position[1]);
                    max.x = max.x.max(vertex.position[0]);
                    max.y = max.y.max(vertex.position[1]);
                }
                Rect::new(min, max)
            })
            .collect()
    }

    /// Returns true if no quads have been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Removes all geometry.
    pub fn clear(&mut self) {
        self.batches.clear();
    }

    /// Returns every vertex as raw bytes, suitable for uploading to a vertex
    /// buffer.
    #[must_use]
    pub fn vertex_bytes(&self) -> Vec<u8> {
        self.batches
            .iter()
            .flat_map(|batch| bytemuck::cast_slice::<Vertex, u8>(&batch.vertices).iter().copied())
            .collect()
    }
}
