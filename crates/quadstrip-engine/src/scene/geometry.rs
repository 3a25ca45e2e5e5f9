/// Two floats per vertex.
pub const COMPONENTS_PER_VERTEX: u8 = 2;

/// Vertices in [`STRIP_POSITIONS`].
pub const VERTEX_COUNT: u32 = 5;

/// A quad with one extra triangle hanging below it, as a triangle strip.
///
/// The first four vertices form the quad; the fifth closes a triangle with
/// the bottom edge.
pub const STRIP_POSITIONS: [f32; 10] = [
    1.0, 1.0, //
    -1.0, 1.0, //
    1.0, -1.0, //
    -1.0, -1.0, //
    0.0, -1.5,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_holds_five_2d_vertices() {
        assert_eq!(
            STRIP_POSITIONS.len(),
            VERTEX_COUNT as usize * COMPONENTS_PER_VERTEX as usize
        );
        assert_eq!(&STRIP_POSITIONS[8..], &[0.0, -1.5]);
    }
}
