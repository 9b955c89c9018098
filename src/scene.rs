use crate::camera::{CameraTarget, Extent};
use crate::config::ViewportConfig;
use crate::engine::{Cursor, MapEngine, Picked, ScreenPoint};
use crate::style::{style_for, OutlineOverlay, RegionVisual, StyleDescriptor};
use crate::types::{Region, RegionId};
use geo::algorithm::contains::Contains;
use geo::{Coord, EuclideanDistance, Point};
use rstar::{RTree, RTreeObject, AABB};
use std::collections::HashMap;
use tracing::{debug, info};

// Wrapper for RTree indexing
struct RegionIndex {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for RegionIndex {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

/// A camera transition the scene was asked to perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flight {
    pub target: CameraTarget,
    pub duration: f64,
}

/// In-process map scene: counties on a flat lon/lat canvas seen through a fixed-size viewport.
pub struct HeadlessScene {
    width: u32,
    height: u32,
    view: Extent,
    regions: Vec<Region>,
    by_id: HashMap<RegionId, usize>,
    tree: RTree<RegionIndex>,
    styles: HashMap<RegionId, StyleDescriptor>,
    outlines: HashMap<RegionId, OutlineOverlay>,
    cursor: Cursor,
    flights: Vec<Flight>,
    destroyed: bool,
}

impl HeadlessScene {
    pub fn new(viewport: ViewportConfig, view: Extent) -> Self {
        info!(width = viewport.width, height = viewport.height, "creating headless scene");
        Self {
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            view,
            regions: Vec::new(),
            by_id: HashMap::new(),
            tree: RTree::new(),
            styles: HashMap::new(),
            outlines: HashMap::new(),
            cursor: Cursor::Default,
            flights: Vec::new(),
            destroyed: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn view(&self) -> Extent {
        self.view
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn style_of(&self, id: &RegionId) -> Option<&StyleDescriptor> {
        self.styles.get(id)
    }

    pub fn outline_of(&self, id: &RegionId) -> Option<&OutlineOverlay> {
        self.outlines.get(id)
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Regions currently drawn with the given look.
    pub fn regions_styled(&self, visual: RegionVisual) -> Vec<RegionId> {
        let wanted = style_for(visual);
        let mut ids: Vec<RegionId> = self
            .styles
            .iter()
            .filter(|(_, s)| **s == wanted)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn screen_to_geo(&self, point: ScreenPoint) -> Coord<f64> {
        Coord {
            x: self.view.west + point.x / self.width as f64 * self.view.width(),
            y: self.view.north - point.y / self.height as f64 * self.view.height(),
        }
    }

    pub fn geo_to_screen(&self, coord: Coord<f64>) -> ScreenPoint {
        ScreenPoint {
            x: (coord.x - self.view.west) / self.view.width() * self.width as f64,
            y: (self.view.north - coord.y) / self.view.height() * self.height as f64,
        }
    }

    /// Degrees covered by one screen pixel, horizontally.
    pub fn degrees_per_pixel(&self) -> f64 {
        self.view.width() / self.width as f64
    }

    /// Index of the first-loaded region whose polygon contains `coord`.
    pub fn region_at(&self, coord: Coord<f64>) -> Option<usize> {
        let envelope = AABB::from_point([coord.x, coord.y]);
        let point = Point::from(coord);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|candidate| self.regions[candidate.index].geometry.contains(&point))
            .map(|candidate| candidate.index)
            .min()
    }

    /// Distance in pixels from `coord` to the boundary of region `index`.
    pub fn boundary_distance_px(&self, index: usize, coord: Coord<f64>) -> f64 {
        let point = Point::from(coord);
        let degrees = self.regions[index]
            .geometry
            .iter()
            .flat_map(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
            .map(|ring| point.euclidean_distance(ring))
            .fold(f64::INFINITY, f64::min);
        degrees / self.degrees_per_pixel()
    }

    /// Indices of regions whose bounds come within `margin_px` of `coord`.
    pub fn regions_near(&self, coord: Coord<f64>, margin_px: f64) -> Vec<usize> {
        let margin = margin_px * self.degrees_per_pixel();
        let envelope = AABB::from_corners(
            [coord.x - margin, coord.y - margin],
            [coord.x + margin, coord.y + margin],
        );
        let mut found: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|c| c.index)
            .collect();
        found.sort_unstable();
        found
    }

    fn overlay_at(&self, coord: Coord<f64>) -> Option<RegionId> {
        self.outlines.iter().find_map(|(id, overlay)| {
            let index = *self.by_id.get(id)?;
            let reach = overlay.width as f64 / 2.0;
            (self.boundary_distance_px(index, coord) <= reach).then(|| id.clone())
        })
    }
}

impl MapEngine for HeadlessScene {
    fn load_regions(&mut self, regions: Vec<Region>) -> Vec<RegionId> {
        let offset = self.regions.len();
        let mut ids = Vec::with_capacity(regions.len());
        for (i, region) in regions.into_iter().enumerate() {
            let index = offset + i;
            self.tree.insert(RegionIndex {
                index,
                aabb: region.extent.as_aabb(),
            });
            self.by_id.insert(region.id.clone(), index);
            ids.push(region.id.clone());
            self.regions.push(region);
        }
        debug!(added = ids.len(), total = self.regions.len(), "regions added to scene");
        ids
    }

    fn region(&self, id: &RegionId) -> Option<&Region> {
        self.by_id.get(id).map(|&i| &self.regions[i])
    }

    fn pick(&self, point: ScreenPoint) -> Option<Picked> {
        if point.x < 0.0
            || point.y < 0.0
            || point.x > self.width as f64
            || point.y > self.height as f64
        {
            return None;
        }
        let coord = self.screen_to_geo(point);
        if let Some(id) = self.overlay_at(coord) {
            return Some(Picked::Overlay(id));
        }
        self.region_at(coord)
            .map(|i| Picked::Region(self.regions[i].id.clone()))
    }

    fn set_style(&mut self, id: &RegionId, style: &StyleDescriptor) {
        if self.by_id.contains_key(id) {
            self.styles.insert(id.clone(), *style);
        }
    }

    fn set_outline(&mut self, id: &RegionId, overlay: Option<&OutlineOverlay>) {
        match overlay {
            Some(o) if self.by_id.contains_key(id) => {
                self.outlines.insert(id.clone(), *o);
            }
            Some(_) => {}
            None => {
                if self.outlines.remove(id).is_some() {
                    debug!(%id, "removed outline overlay");
                }
            }
        }
    }

    fn fly_to(&mut self, target: CameraTarget, duration_secs: f64) {
        self.view = match target {
            CameraTarget::Extent(extent) => fit_aspect(extent, self.aspect()),
            CameraTarget::Position(position) => position.visible_extent(self.aspect()),
        };
        debug!(?target, duration_secs, "camera flight");
        self.flights.push(Flight {
            target,
            duration: duration_secs,
        });
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        info!(regions = self.regions.len(), "destroying headless scene");
        self.regions.clear();
        self.by_id.clear();
        self.tree = RTree::new();
        self.styles.clear();
        self.outlines.clear();
        self.destroyed = true;
    }
}

/// Smallest extent with the viewport's aspect that contains `extent`, same center.
fn fit_aspect(extent: Extent, aspect: f64) -> Extent {
    let (cx, cy) = extent.center();
    let mut w = extent.width();
    let mut h = extent.height();
    if w <= 0.0 && h <= 0.0 {
        return extent;
    }
    if w / aspect > h {
        h = w / aspect;
    } else {
        w = h * aspect;
    }
    Extent::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
}
