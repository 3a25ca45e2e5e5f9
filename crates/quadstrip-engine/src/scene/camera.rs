use glam::{Mat4, Vec3};

/// Fixed perspective camera parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view, in degrees.
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Translation applied to the model-view matrix.
    pub eye_translation: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            z_near: 0.1,
            z_far: 100.0,
            eye_translation: Vec3::new(0.0, 0.0, -6.0),
        }
    }
}

/// Projection and model-view matrices, computed once.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub projection: Mat4,
    pub model_view: Mat4,
}

impl Camera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let projection = Mat4::perspective_rh(
            config.fov_y_degrees.to_radians(),
            aspect,
            config.z_near,
            config.z_far,
        );
        let model_view = Mat4::IDENTITY * Mat4::from_translation(config.eye_translation);

        Self {
            projection,
            model_view,
        }
    }

    /// Column-major projection elements.
    pub fn projection_cols(&self) -> [f32; 16] {
        self.projection.to_cols_array()
    }

    /// Column-major model-view elements.
    pub fn model_view_cols(&self) -> [f32; 16] {
        self.model_view.to_cols_array()
    }
}

/// Width over height; a zero height is treated as square.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_is_perspective() {
        let camera = Camera::new(&CameraConfig::default(), aspect_ratio(640, 480));
        let cols = camera.projection_cols();

        assert_eq!(cols[11], -1.0);
        assert_eq!(cols[15], 0.0);
        assert_ne!(camera.projection, Mat4::IDENTITY);
    }

    #[test]
    fn projection_scales_by_fov_and_aspect() {
        let camera = Camera::new(&CameraConfig::default(), 2.0);
        let cols = camera.projection_cols();

        let f = 1.0 / (45.0f32.to_radians() / 2.0).tan();
        assert!((cols[5] - f).abs() < 1e-5);
        assert!((cols[0] - f / 2.0).abs() < 1e-5);
    }

    #[test]
    fn model_view_translates_away_from_the_eye() {
        let camera = Camera::new(&CameraConfig::default(), 1.0);
        let cols = camera.model_view_cols();

        assert_eq!(&cols[12..16], &[0.0, 0.0, -6.0, 1.0]);
        assert_eq!(cols[0], 1.0);
        assert_eq!(cols[5], 1.0);
        assert_eq!(cols[10], 1.0);
    }

    #[test]
    fn zero_height_is_square() {
        assert_eq!(aspect_ratio(640, 0), 1.0);
        assert_eq!(aspect_ratio(800, 400), 2.0);
    }
}
