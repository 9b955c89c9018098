use crate::engine::ScreenPoint;
use crate::scene::HeadlessScene;
use crate::style::Color;
use anyhow::{Context, Result};
use image::{ImageBuffer, Rgba, RgbaImage};
use rayon::prelude::*;
use std::path::Path;
use tracing::info;

const BACKGROUND: &str = "#e0f2fe";

/// Rasterises the scene as it currently looks: fills, outlines, then selection overlays.
pub fn snapshot(scene: &HeadlessScene) -> RgbaImage {
    let width = scene.width();
    let height = scene.height();
    let background = Color::from_hex(BACKGROUND).to_rgba();

    let rows: Vec<Vec<Rgba<u8>>> = (0..height)
        .into_par_iter()
        .map(|y| {
            (0..width)
                .map(|x| shade_pixel(scene, x, y, background))
                .collect()
        })
        .collect();

    let mut img: RgbaImage = ImageBuffer::new(width, height);
    for (y, row) in rows.into_iter().enumerate() {
        for (x, pixel) in row.into_iter().enumerate() {
            img.put_pixel(x as u32, y as u32, pixel);
        }
    }
    img
}

fn shade_pixel(scene: &HeadlessScene, x: u32, y: u32, background: Rgba<u8>) -> Rgba<u8> {
    // Sample at the pixel center.
    let coord = scene.screen_to_geo(ScreenPoint::new(x as f64 + 0.5, y as f64 + 0.5));
    let mut pixel = background;

    if let Some(index) = scene.region_at(coord) {
        let id = &scene.regions()[index].id;
        if let Some(style) = scene.style_of(id) {
            pixel = style.fill.blend_onto(pixel);
        }
    }

    // Widest stroke is the overlay; anything further than that can be skipped.
    for index in scene.regions_near(coord, 3.0) {
        let id = &scene.regions()[index].id;
        let style = scene.style_of(id);
        let overlay = scene.outline_of(id);
        if style.is_none() && overlay.is_none() {
            continue;
        }
        let distance = scene.boundary_distance_px(index, coord);
        if let Some(style) = style {
            if distance <= style.outline_width as f64 / 2.0 {
                pixel = style.outline.blend_onto(pixel);
            }
        }
        if let Some(overlay) = overlay {
            if distance <= overlay.width as f64 / 2.0 {
                pixel = overlay.color.blend_onto(pixel);
            }
        }
    }

    pixel
}

pub fn save_snapshot(scene: &HeadlessScene, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create snapshot directory: {:?}", parent))?;
    }
    let img = snapshot(scene);
    img.save(path)
        .with_context(|| format!("Failed to save snapshot: {:?}", path))?;
    info!(?path, width = img.width(), height = img.height(), "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MapEngine;
    use crate::scene::tests::square_scene;
    use crate::style::{overlay_for, style_for, RegionVisual};
    use crate::types::RegionId;

    #[test]
    fn selected_county_is_yellow_and_others_green() {
        let mut scene = square_scene();
        let west = RegionId::new("W");
        let east = RegionId::new("E");
        scene.set_style(&west, &style_for(RegionVisual::Selected));
        scene.set_outline(&west, overlay_for(RegionVisual::Selected).as_ref());
        scene.set_style(&east, &style_for(RegionVisual::Default));

        let img = snapshot(&scene);
        assert_eq!(img.dimensions(), (100, 100));

        let background = Color::from_hex(BACKGROUND).to_rgba();
        assert_eq!(*img.get_pixel(50, 50), background);

        let inside_west = img.get_pixel(25, 50);
        assert!(inside_west[0] > 200 && inside_west[1] > 200 && inside_west[2] < 200);

        let inside_east = img.get_pixel(75, 50);
        assert!(inside_east[1] > inside_east[0]);

        // W's western edge sits at x = 10; the overlay is opaque yellow.
        assert_eq!(*img.get_pixel(10, 50), Rgba([255, 255, 0, 255]));
    }

    #[test]
    fn writes_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out").join("map.png");
        save_snapshot(&square_scene(), &path).expect("save");
        let reloaded = image::open(&path).expect("open");
        assert_eq!(reloaded.width(), 100);
    }
}
