use crate::config::ViewConfig;
use geo::bounding_rect::BoundingRect;
use geo::{MultiPolygon, Rect};

/// Metres spanned by one degree of longitude at the equator.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Geographic rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Extent {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self { west, south, east, north }
    }

    pub fn of(geometry: &MultiPolygon<f64>) -> Option<Self> {
        geometry.bounding_rect().map(Self::from)
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.west + self.east) / 2.0, (self.south + self.north) / 2.0)
    }

    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }

    /// Grows the extent by `ratio * max(width, height)` on every side.
    pub fn padded(&self, ratio: f64) -> Extent {
        let pad = self.width().max(self.height()) * ratio;
        Extent {
            west: self.west - pad,
            south: self.south - pad,
            east: self.east + pad,
            north: self.north + pad,
        }
    }

    pub fn as_aabb(&self) -> rstar::AABB<[f64; 2]> {
        rstar::AABB::from_corners([self.west, self.south], [self.east, self.north])
    }
}

impl From<Rect<f64>> for Extent {
    fn from(rect: Rect<f64>) -> Self {
        Extent::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

/// Camera position and orientation; angles in degrees, height in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPosition {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl From<ViewConfig> for CameraPosition {
    fn from(v: ViewConfig) -> Self {
        Self {
            longitude: v.longitude,
            latitude: v.latitude,
            height: v.height,
            heading: v.heading,
            pitch: v.pitch,
            roll: v.roll,
        }
    }
}

impl CameraPosition {
    /// Ground extent seen from this position by a top-down 2D view with the given aspect
    /// (width / height).
    pub fn visible_extent(&self, aspect: f64) -> Extent {
        let span_x = self.height / METERS_PER_DEGREE;
        let span_y = if aspect > 0.0 { span_x / aspect } else { span_x };
        Extent::new(
            self.longitude - span_x / 2.0,
            self.latitude - span_y / 2.0,
            self.longitude + span_x / 2.0,
            self.latitude + span_y / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraTarget {
    Extent(Extent),
    Position(CameraPosition),
}

/// Padded extent that frames a selected region.
pub fn fit_target(region: &Extent, padding_ratio: f64) -> CameraTarget {
    CameraTarget::Extent(region.padded(padding_ratio))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn padding_uses_larger_side_on_every_edge() {
        // W = 4, H = 1 -> pad = 2
        let raw = Extent::new(36.0, -2.0, 40.0, -1.0);
        let padded = raw.padded(0.5);
        assert!(close(raw.west - padded.west, 2.0));
        assert!(close(raw.south - padded.south, 2.0));
        assert!(close(padded.east - raw.east, 2.0));
        assert!(close(padded.north - raw.north, 2.0));

        // W = 0.5, H = 3 -> pad = 1.5
        let tall = Extent::new(34.0, 0.0, 34.5, 3.0).padded(0.5);
        assert!(close(tall.west, 32.5));
        assert!(close(tall.north, 4.5));
    }

    #[test]
    fn fit_target_wraps_padded_extent() {
        let raw = Extent::new(0.0, 0.0, 2.0, 2.0);
        assert_eq!(
            fit_target(&raw, 0.5),
            CameraTarget::Extent(Extent::new(-1.0, -1.0, 3.0, 3.0))
        );
    }

    #[test]
    fn extent_of_geometry() {
        let mp = MultiPolygon::new(vec![polygon![
            (x: 36.6, y: -1.45),
            (x: 37.1, y: -1.45),
            (x: 37.1, y: -1.15),
            (x: 36.6, y: -1.15),
        ]]);
        let e = Extent::of(&mp).expect("extent");
        assert!(close(e.width(), 0.5));
        assert!(close(e.height(), 0.3));
    }

    #[test]
    fn home_view_extent_is_centered() {
        let home = CameraPosition::from(ViewConfig::default());
        let e = home.visible_extent(2.0);
        let (lon, lat) = e.center();
        assert!(close(lon, 37.9062));
        assert!(close(lat, 0.0236));
        assert!(close(e.width(), 2.0 * e.height()));
    }
}
