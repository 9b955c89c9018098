use crate::camera::CameraTarget;
use crate::style::{OutlineOverlay, StyleDescriptor};
use crate::types::{Region, RegionId};

/// Pixel coordinate on the map canvas, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a pick hit. Only `Region` counts as a county.
#[derive(Debug, Clone, PartialEq)]
pub enum Picked {
    Region(RegionId),
    Overlay(RegionId),
}

impl Picked {
    pub fn region(self) -> Option<RegionId> {
        match self {
            Picked::Region(id) => Some(id),
            Picked::Overlay(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

/// Boundary to whatever draws the map.
pub trait MapEngine {
    fn load_regions(&mut self, regions: Vec<Region>) -> Vec<RegionId>;

    fn region(&self, id: &RegionId) -> Option<&Region>;

    fn pick(&self, point: ScreenPoint) -> Option<Picked>;

    fn set_style(&mut self, id: &RegionId, style: &StyleDescriptor);

    /// `None` removes the overlay.
    fn set_outline(&mut self, id: &RegionId, overlay: Option<&OutlineOverlay>);

    fn fly_to(&mut self, target: CameraTarget, duration_secs: f64);

    fn set_cursor(&mut self, cursor: Cursor);

    fn destroy(&mut self);
}
