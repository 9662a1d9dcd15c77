use image::{GrayImage, Luma};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::BTreeMap;

use crate::types::{InstanceMask, PixelBbox, PolygonAnnotation};

const FOREGROUND: Luma<u8> = Luma([1u8]);

/// Scale a polygon's normalized vertices to integer pixel coordinates for a
/// (height, width) image, rounding to the nearest pixel.
fn pixel_vertices(polygon: &PolygonAnnotation, height: u32, width: u32) -> Vec<Point<i32>> {
    let mut points: Vec<Point<i32>> = polygon
        .points
        .iter()
        .map(|&(x, y)| {
            Point::new(
                (x * width as f64).round() as i32,
                (y * height as f64).round() as i32,
            )
        })
        .collect();

    // draw_polygon_mut requires an open ring with no repeated endpoints;
    // rounding can collapse neighboring vertices.
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Fill one polygon into the accumulator mask. Degenerate polygons that
/// round to a point or a segment still mark their pixels.
fn fill_polygon(mask: &mut GrayImage, points: &[Point<i32>]) {
    match points.len() {
        0 => {}
        1 => {
            let p = points[0];
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < mask.width() && (p.y as u32) < mask.height() {
                mask.put_pixel(p.x as u32, p.y as u32, FOREGROUND);
            }
        }
        2 => draw_line_segment_mut(
            mask,
            (points[0].x as f32, points[0].y as f32),
            (points[1].x as f32, points[1].y as f32),
            FOREGROUND,
        ),
        _ => draw_polygon_mut(mask, points, FOREGROUND),
    }
}

/// Rasterize all polygons into a single (height, width) binary accumulator.
pub fn rasterize_polygons(polygons: &[PolygonAnnotation], height: u32, width: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for polygon in polygons {
        let points = pixel_vertices(polygon, height, width);
        fill_polygon(&mut mask, &points);
    }
    mask
}

// Coerce an accumulator image to a strictly {0, 1} instance mask.
fn mask_from_image(image: &GrayImage) -> InstanceMask {
    InstanceMask {
        width: image.width(),
        height: image.height(),
        data: image.pixels().map(|p| u8::from(p.0[0] != 0)).collect(),
    }
}

/// Split a rasterized accumulator into per-instance masks and boxes via
/// connected-component labeling. Background (label 0) is excluded; instances
/// are ordered by ascending component label.
pub fn split_into_instances(
    accumulator: &GrayImage,
    connectivity: Connectivity,
) -> (Vec<InstanceMask>, Vec<PixelBbox>) {
    if accumulator.pixels().all(|p| p.0[0] == 0) {
        return (Vec::new(), Vec::new());
    }

    let labels = connected_components(accumulator, connectivity, Luma([0u8]));

    // One pass to collect each component's pixel extent.
    let mut extents: BTreeMap<u32, (u32, u32, u32, u32)> = BTreeMap::new();
    for (x, y, pixel) in labels.enumerate_pixels() {
        let label = pixel.0[0];
        if label == 0 {
            continue;
        }
        let extent = extents.entry(label).or_insert((x, y, x, y));
        extent.0 = extent.0.min(x);
        extent.1 = extent.1.min(y);
        extent.2 = extent.2.max(x);
        extent.3 = extent.3.max(y);
    }

    let index_of: BTreeMap<u32, usize> = extents
        .keys()
        .enumerate()
        .map(|(index, &label)| (label, index))
        .collect();

    let mut masks =
        vec![InstanceMask::new(accumulator.width(), accumulator.height()); extents.len()];
    for (x, y, pixel) in labels.enumerate_pixels() {
        let label = pixel.0[0];
        if label != 0 {
            masks[index_of[&label]].set(x, y, 1);
        }
    }

    let boxes = extents
        .values()
        .map(|&(x_min, y_min, x_max, y_max)| PixelBbox {
            x_min,
            y_min,
            x_max: x_max + 1,
            y_max: y_max + 1,
        })
        .collect();

    (masks, boxes)
}

/// Extract per-instance masks and index-aligned pixel boxes for one image.
///
/// The default path fills every polygon into a shared accumulator before
/// component labeling, so touching polygons merge into one instance. With
/// `split_polygons`, each polygon becomes its own instance and the merge
/// step is skipped.
pub fn extract_masks_and_boxes(
    polygons: &[PolygonAnnotation],
    height: u32,
    width: u32,
    connectivity: Connectivity,
    split_polygons: bool,
) -> (Vec<InstanceMask>, Vec<PixelBbox>) {
    if split_polygons {
        let mut masks = Vec::new();
        let mut boxes = Vec::new();
        for polygon in polygons {
            let image = rasterize_polygons(std::slice::from_ref(polygon), height, width);
            let mask = mask_from_image(&image);
            // A polygon that rasterizes to nothing (fully out of frame)
            // yields no instance.
            if let Some(bbox) = mask.foreground_bbox() {
                masks.push(mask);
                boxes.push(bbox);
            }
        }
        (masks, boxes)
    } else {
        let accumulator = rasterize_polygons(polygons, height, width);
        split_into_instances(&accumulator, connectivity)
    }
}
