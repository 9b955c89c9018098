use crate::camera::{fit_target, CameraPosition, CameraTarget};
use crate::config::CameraConfig;
use crate::engine::{Cursor, MapEngine, ScreenPoint};
use crate::style::{overlay_for, style_for, RegionVisual};
use crate::types::{CountyData, Region, RegionId};
use tracing::{debug, info};

/// Result of a click, as seen by the popup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClickOutcome {
    pub deselected: Option<RegionId>,
    pub selected: Option<CountyData>,
}

/// Hover and selection state machine over a map engine.
///
/// The controller owns the engine; dropping the controller destroys it.
pub struct SelectionController<E: MapEngine> {
    engine: E,
    hovered: Option<RegionId>,
    selected: Option<RegionId>,
    home: CameraPosition,
    camera: CameraConfig,
}

impl<E: MapEngine> SelectionController<E> {
    pub fn new(engine: E, home: CameraPosition, camera: CameraConfig) -> Self {
        Self {
            engine,
            hovered: None,
            selected: None,
            home,
            camera,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn hovered(&self) -> Option<&RegionId> {
        self.hovered.as_ref()
    }

    pub fn selected(&self) -> Option<&RegionId> {
        self.selected.as_ref()
    }

    pub fn home(&self) -> CameraPosition {
        self.home
    }

    /// Look a region should have given the current interaction state.
    pub fn visual_for(&self, id: &RegionId) -> RegionVisual {
        if self.selected.as_ref() == Some(id) {
            RegionVisual::Selected
        } else if self.hovered.as_ref() == Some(id) {
            RegionVisual::Hovered
        } else {
            RegionVisual::Default
        }
    }

    fn restyle(&mut self, id: &RegionId) {
        let visual = self.visual_for(id);
        self.engine.set_style(id, &style_for(visual));
        self.engine.set_outline(id, overlay_for(visual).as_ref());
    }

    /// Hands counties to the engine, styles them and frames all of them.
    pub fn load_regions(&mut self, regions: Vec<Region>) -> Vec<RegionId> {
        let bounds = regions
            .iter()
            .map(|r| r.extent)
            .reduce(|acc, e| acc.union(&e));

        let ids = self.engine.load_regions(regions);
        for id in &ids {
            self.restyle(id);
        }
        if let Some(bounds) = bounds {
            self.engine
                .fly_to(CameraTarget::Extent(bounds), self.camera.load_duration);
        }
        ids
    }

    fn resolve(&self, point: ScreenPoint) -> Option<RegionId> {
        self.engine
            .pick(point)
            .and_then(|picked| picked.region())
            .filter(|id| self.engine.region(id).is_some())
    }

    pub fn on_pointer_move(&mut self, point: ScreenPoint) {
        let picked = self.resolve(point);

        if picked != self.hovered {
            let previous = std::mem::replace(&mut self.hovered, picked.clone());
            if let Some(old) = previous {
                self.restyle(&old);
            }
            if let Some(new) = &picked {
                self.restyle(new);
            }
        }

        self.engine.set_cursor(if picked.is_some() {
            Cursor::Pointer
        } else {
            Cursor::Default
        });
    }

    pub fn on_pointer_click(&mut self, point: ScreenPoint) -> ClickOutcome {
        // Pick before clearing: the selection border is only pickable while it is drawn.
        let hit = self.resolve(point).and_then(|id| {
            let region = self.engine.region(&id)?;
            let data = CountyData::from(&region.properties);
            let target = fit_target(&region.extent, self.camera.fit_padding_ratio);
            Some((id, data, target))
        });

        let deselected = self.clear_selection();

        let Some((id, data, target)) = hit else {
            if deselected.is_some() {
                self.fly_home();
            }
            return ClickOutcome {
                deselected,
                selected: None,
            };
        };

        info!(%id, name = %data.shape_name, "county selected");
        self.selected = Some(id.clone());
        self.restyle(&id);
        self.engine.fly_to(target, self.camera.fly_duration);

        ClickOutcome {
            deselected,
            selected: Some(data),
        }
    }

    pub fn on_close_popup(&mut self) {
        self.clear_selection();
        self.fly_home();
    }

    /// Drops the selection, if any, and returns what was selected.
    fn clear_selection(&mut self) -> Option<RegionId> {
        let previous = self.selected.take()?;
        debug!(id = %previous, "clearing selection");
        self.restyle(&previous);
        Some(previous)
    }

    fn fly_home(&mut self) {
        self.engine
            .fly_to(CameraTarget::Position(self.home), self.camera.fly_duration);
    }
}

impl<E: MapEngine> Drop for SelectionController<E> {
    fn drop(&mut self) {
        self.engine.destroy();
    }
}
