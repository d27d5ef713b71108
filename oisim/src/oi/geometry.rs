//! Derived image-plane geometry.
//!
//! Distance and horizontal field of view are the only stored geometric
//! primitives. Everything else is recomputed on each read:
//!
//! - width = 2 · distance · tan(hfov / 2)
//! - sample size = width / cols
//! - height = sample size · rows
//!
//! Row and column counts come from the photon data, or from a companion
//! scene when the image has not been computed.

use shared::units::LengthUnit;

use super::{OiError, OpticalImage};
use crate::scene::SceneGeometry;

impl OpticalImage {
    /// `(rows, cols)` of the photon data, else of the companion scene
    pub fn size(&self, scene: Option<&dyn SceneGeometry>) -> Option<(usize, usize)> {
        self.cube
            .spatial_size()
            .or_else(|| scene.map(|s| s.size()))
    }

    fn require_size(&self, scene: Option<&dyn SceneGeometry>) -> Result<(usize, usize), OiError> {
        match self.size(scene) {
            Some((rows, cols)) if rows > 0 && cols > 0 => Ok((rows, cols)),
            _ => Err(OiError::NoSpatialSize),
        }
    }

    pub fn rows(&self, scene: Option<&dyn SceneGeometry>) -> Option<usize> {
        self.size(scene).map(|(rows, _)| rows)
    }

    pub fn cols(&self, scene: Option<&dyn SceneGeometry>) -> Option<usize> {
        self.size(scene).map(|(_, cols)| cols)
    }

    /// Lens to image plane distance in `unit`
    pub fn distance(&self, unit: LengthUnit) -> f64 {
        self.distance_m * unit.scale_from_meters()
    }

    pub fn set_distance(&mut self, meters: f64) -> Result<(), OiError> {
        if !meters.is_finite() || meters <= 0.0 {
            return Err(OiError::InvalidValue {
                param: "distance".to_string(),
                reason: format!("must be positive, got {meters}"),
            });
        }
        self.distance_m = meters;
        Ok(())
    }

    /// Horizontal field of view in degrees
    pub fn hfov(&self) -> f64 {
        self.hfov_deg
    }

    pub fn set_hfov(&mut self, degrees: f64) -> Result<(), OiError> {
        if !degrees.is_finite() || degrees <= 0.0 || degrees >= 180.0 {
            return Err(OiError::InvalidValue {
                param: "hfov".to_string(),
                reason: format!("must lie in (0, 180) degrees, got {degrees}"),
            });
        }
        self.hfov_deg = degrees;
        Ok(())
    }

    fn width_m(&self) -> f64 {
        2.0 * self.distance_m * (self.hfov_deg.to_radians() / 2.0).tan()
    }

    /// Physical width of the image plane
    pub fn width(&self, unit: LengthUnit) -> f64 {
        self.width_m() * unit.scale_from_meters()
    }

    /// Width of one sample; samples are square
    pub fn sample_size(
        &self,
        unit: LengthUnit,
        scene: Option<&dyn SceneGeometry>,
    ) -> Result<f64, OiError> {
        let (_, cols) = self.require_size(scene)?;
        Ok(self.width_m() / cols as f64 * unit.scale_from_meters())
    }

    /// Physical height of the image plane
    pub fn height(&self, unit: LengthUnit, scene: Option<&dyn SceneGeometry>) -> Result<f64, OiError> {
        let (rows, _) = self.require_size(scene)?;
        Ok(self.sample_size(unit, scene)? * rows as f64)
    }

    /// Height times width; `unit` is squared
    pub fn area(&self, unit: LengthUnit, scene: Option<&dyn SceneGeometry>) -> Result<f64, OiError> {
        let meters = self.height(LengthUnit::Meters, scene)? * self.width_m();
        Ok(meters * unit.area_scale_from_meters())
    }

    pub fn diagonal(&self, unit: LengthUnit, scene: Option<&dyn SceneGeometry>) -> Result<f64, OiError> {
        let height = self.height(unit, scene)?;
        Ok(height.hypot(self.width(unit)))
    }

    /// Sample spacing as `(row direction, col direction)`
    pub fn sample_spacing(
        &self,
        unit: LengthUnit,
        scene: Option<&dyn SceneGeometry>,
    ) -> Result<(f64, f64), OiError> {
        let (rows, cols) = self.require_size(scene)?;
        let height = self.height(unit, scene)?;
        Ok((height / rows as f64, self.width(unit) / cols as f64))
    }

    /// Rows divided by columns
    pub fn aspect_ratio(&self, scene: Option<&dyn SceneGeometry>) -> Result<f64, OiError> {
        let (rows, cols) = self.require_size(scene)?;
        Ok(rows as f64 / cols as f64)
    }

    /// Vertical field of view in degrees
    pub fn vfov(&self, scene: Option<&dyn SceneGeometry>) -> Result<f64, OiError> {
        let height = self.height(LengthUnit::Meters, scene)?;
        Ok(2.0 * (height / (2.0 * self.distance_m)).atan().to_degrees())
    }

    /// Degrees per sample as `(row direction, col direction)`
    pub fn angular_resolution(
        &self,
        scene: Option<&dyn SceneGeometry>,
    ) -> Result<(f64, f64), OiError> {
        let (rows, cols) = self.require_size(scene)?;
        Ok((self.vfov(scene)? / rows as f64, self.hfov_deg / cols as f64))
    }

    /// Sample centre positions along columns (xs) and rows (ys), centred on
    /// the optical axis
    pub fn spatial_support(
        &self,
        unit: LengthUnit,
        scene: Option<&dyn SceneGeometry>,
    ) -> Result<(Vec<f64>, Vec<f64>), OiError> {
        let (rows, cols) = self.require_size(scene)?;
        let (dy, dx) = self.sample_spacing(unit, scene)?;
        let centred = |n: usize, step: f64| {
            let mid = (n as f64 - 1.0) / 2.0;
            (0..n).map(|i| (i as f64 - mid) * step).collect::<Vec<_>>()
        };
        Ok((centred(cols, dx), centred(rows, dy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneDescriptor;
    use crate::spectral::WaveSamples;
    use approx::assert_relative_eq;

    fn oi(rows: usize, cols: usize) -> OpticalImage {
        let wave = WaveSamples::monochromatic(550.0).unwrap();
        let mut oi = OpticalImage::uniform(wave, rows, cols, 1.0).unwrap();
        oi.set_distance(0.01).unwrap();
        oi.set_hfov(20.0).unwrap();
        oi
    }

    #[test]
    fn test_width_from_distance_and_fov() {
        let oi = oi(10, 20);
        let expected = 2.0 * 0.01 * (10f64.to_radians()).tan();
        assert_relative_eq!(oi.width(LengthUnit::Meters), expected, max_relative = 1e-12);
        assert_relative_eq!(
            oi.sample_size(LengthUnit::Meters, None).unwrap(),
            expected / 20.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            oi.height(LengthUnit::Meters, None).unwrap(),
            expected / 2.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(oi.aspect_ratio(None).unwrap(), 0.5);
    }

    #[test]
    fn test_geometry_tracks_distance() {
        let mut oi = oi(8, 8);
        let before = oi.width(LengthUnit::Millimeters);
        oi.set_distance(0.02).unwrap();
        assert_relative_eq!(oi.width(LengthUnit::Millimeters), 2.0 * before, max_relative = 1e-12);
        assert!(oi.set_distance(0.0).is_err());
        assert!(oi.set_hfov(180.0).is_err());
    }

    #[test]
    fn test_area_and_diagonal() {
        let oi = oi(3, 4);
        let w = oi.width(LengthUnit::Micrometers);
        let h = oi.height(LengthUnit::Micrometers, None).unwrap();
        assert_relative_eq!(oi.diagonal(LengthUnit::Micrometers, None).unwrap(), 5.0 * w / 4.0, max_relative = 1e-12);
        assert_relative_eq!(
            oi.area(LengthUnit::Micrometers, None).unwrap(),
            w * h,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_vfov_matches_square_hfov() {
        let oi = oi(16, 16);
        assert_relative_eq!(oi.vfov(None).unwrap(), 20.0, max_relative = 1e-12);
        let (row_res, col_res) = oi.angular_resolution(None).unwrap();
        assert_relative_eq!(row_res, 20.0 / 16.0, max_relative = 1e-12);
        assert_relative_eq!(col_res, 20.0 / 16.0, max_relative = 1e-12);
    }

    #[test]
    fn test_spatial_support_is_centred() {
        let oi = oi(3, 4);
        let (xs, ys) = oi.spatial_support(LengthUnit::Micrometers, None).unwrap();
        let dx = oi.sample_size(LengthUnit::Micrometers, None).unwrap();
        assert_eq!(xs.len(), 4);
        assert_eq!(ys.len(), 3);
        assert_relative_eq!(xs[0], -1.5 * dx, max_relative = 1e-12);
        assert_relative_eq!(ys[1], 0.0);
        assert_relative_eq!(xs.iter().sum::<f64>(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_size_falls_back_to_scene() {
        let oi = OpticalImage::default();
        let scene = SceneDescriptor::new(12, 16);
        assert_eq!(oi.size(None), None);
        assert_eq!(oi.size(Some(&scene)), Some((12, 16)));
        assert!(matches!(oi.height(LengthUnit::Meters, None), Err(OiError::NoSpatialSize)));
        assert!(oi.height(LengthUnit::Meters, Some(&scene)).is_ok());
    }
}
