use crate::camera::CameraPosition;
use crate::config::AppConfig;
use crate::controller::SelectionController;
use crate::data;
use crate::engine::{MapEngine, ScreenPoint};
use crate::popup::{CountyDetails, StatsSource};
use tracing::{error, info};

/// The county explorer page: the map plus the county popup.
pub struct App<E: MapEngine> {
    controller: SelectionController<E>,
    stats: Box<dyn StatsSource>,
    popup: Option<CountyDetails>,
    county_count: usize,
}

impl<E: MapEngine> App<E> {
    /// Loads the counties into `engine`. A failed load is logged and leaves the map empty.
    pub async fn start(engine: E, config: &AppConfig, stats: Box<dyn StatsSource>) -> Self {
        let mut controller = SelectionController::new(
            engine,
            CameraPosition::from(config.view),
            config.camera,
        );

        let county_count = match data::load_regions(&config.input.geography).await {
            Ok(regions) => controller.load_regions(regions).len(),
            Err(e) => {
                error!(
                    path = ?config.input.geography,
                    error = ?e,
                    "Error loading Kenya counties data"
                );
                0
            }
        };
        info!(county_count, "map ready");

        Self {
            controller,
            stats,
            popup: None,
            county_count,
        }
    }

    pub fn county_count(&self) -> usize {
        self.county_count
    }

    pub fn controller(&self) -> &SelectionController<E> {
        &self.controller
    }

    pub fn engine(&self) -> &E {
        self.controller.engine()
    }

    pub fn popup(&self) -> Option<&CountyDetails> {
        self.popup.as_ref()
    }

    pub fn pointer_move(&mut self, point: ScreenPoint) {
        self.controller.on_pointer_move(point);
    }

    /// Returns the freshly opened popup, if the click selected a county.
    pub fn click(&mut self, point: ScreenPoint) -> Option<&CountyDetails> {
        let outcome = self.controller.on_pointer_click(point);
        self.popup = outcome
            .selected
            .map(|county| CountyDetails::build(county, self.stats.as_mut()));
        self.popup.as_ref()
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
        self.controller.on_close_popup();
    }
}
