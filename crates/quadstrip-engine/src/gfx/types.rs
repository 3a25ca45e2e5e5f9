use std::ops::BitOr;

/// Buffer binding points. Only vertex data is needed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferTarget {
    Array,
}

/// Upload frequency hint.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferUsage {
    Static,
}

/// Toggleable fixed-function state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Capability {
    DepthTest,
}

/// Depth comparison used when depth testing is enabled.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DepthFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

impl DepthFunc {
    pub(crate) fn to_wgpu(self) -> wgpu::CompareFunction {
        match self {
            DepthFunc::Never => wgpu::CompareFunction::Never,
            DepthFunc::Less => wgpu::CompareFunction::Less,
            DepthFunc::Equal => wgpu::CompareFunction::Equal,
            DepthFunc::LessEqual => wgpu::CompareFunction::LessEqual,
            DepthFunc::Greater => wgpu::CompareFunction::Greater,
            DepthFunc::NotEqual => wgpu::CompareFunction::NotEqual,
            DepthFunc::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
            DepthFunc::Always => wgpu::CompareFunction::Always,
        }
    }
}

/// Which buffers a `clear` touches. Combine with `|`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR: ClearMask = ClearMask {
        color: true,
        depth: false,
    };
    pub const DEPTH: ClearMask = ClearMask {
        color: false,
        depth: true,
    };
}

impl BitOr for ClearMask {
    type Output = ClearMask;

    fn bitor(self, rhs: ClearMask) -> ClearMask {
        ClearMask {
            color: self.color || rhs.color,
            depth: self.depth || rhs.depth,
        }
    }
}

/// Primitive assembly mode for `draw_arrays`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

impl Topology {
    pub(crate) fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::Points => wgpu::PrimitiveTopology::PointList,
            Topology::Lines => wgpu::PrimitiveTopology::LineList,
            Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

/// Component type of a vertex attribute in the buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttribType {
    Float,
}

/// How one attribute is read out of the bound array buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttribLayout {
    /// Components per vertex (1..=4).
    pub components: u8,
    pub ty: AttribType,
    /// Only meaningful for integer types; ignored for floats.
    pub normalized: bool,
    /// Byte distance between vertices. `0` means tightly packed.
    pub stride: u64,
    /// Byte offset of the first vertex.
    pub offset: u64,
}

impl AttribLayout {
    /// Tightly packed, non-normalized `f32` components starting at offset 0.
    pub const fn floats(components: u8) -> Self {
        Self {
            components,
            ty: AttribType::Float,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> u64 {
        match self.ty {
            AttribType::Float => 4 * u64::from(self.components),
        }
    }

    /// Effective stride, resolving `0` to the element size.
    pub fn effective_stride(&self) -> u64 {
        if self.stride == 0 {
            self.element_size()
        } else {
            self.stride
        }
    }

    pub(crate) fn vertex_format(&self) -> Option<wgpu::VertexFormat> {
        match (self.ty, self.components) {
            (AttribType::Float, 1) => Some(wgpu::VertexFormat::Float32),
            (AttribType::Float, 2) => Some(wgpu::VertexFormat::Float32x2),
            (AttribType::Float, 3) => Some(wgpu::VertexFormat::Float32x3),
            (AttribType::Float, 4) => Some(wgpu::VertexFormat::Float32x4),
            _ => None,
        }
    }
}

/// Straight-alpha RGBA color in `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Clamps every channel into `[0, 1]`, as GL does for clear values.
    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_mask_combines() {
        let both = ClearMask::COLOR | ClearMask::DEPTH;
        assert!(both.color && both.depth);
        assert_eq!(ClearMask::COLOR | ClearMask::COLOR, ClearMask::COLOR);
    }

    #[test]
    fn packed_stride_resolves_to_element_size() {
        let layout = AttribLayout::floats(2);
        assert_eq!(layout.element_size(), 8);
        assert_eq!(layout.effective_stride(), 8);

        let strided = AttribLayout {
            stride: 16,
            ..layout
        };
        assert_eq!(strided.effective_stride(), 16);
    }

    #[test]
    fn float_layouts_map_to_vertex_formats() {
        assert_eq!(
            AttribLayout::floats(2).vertex_format(),
            Some(wgpu::VertexFormat::Float32x2)
        );
        assert_eq!(AttribLayout::floats(5).vertex_format(), None);
    }

    #[test]
    fn clear_color_is_clamped() {
        let c = Color::rgba(2.0, -1.0, 0.5, 1.0).clamped();
        assert_eq!(c, Color::rgba(1.0, 0.0, 0.5, 1.0));
    }
}
