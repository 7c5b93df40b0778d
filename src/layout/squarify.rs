//! Squarified treemap partitioning (Bruls, Huizing & van Wijk).
//!
//! Sizes are expected to be pre-normalized to the target rectangle, i.e. they
//! sum to `width * height`, and sorted from largest to smallest.

use super::types::{Bounds, Orientation, Rect};
use crate::error::{LayoutError, Result};

/// Relative tolerance for the size-sum/area check.
pub const AREA_TOLERANCE: f64 = 1e-9;

/// Scales `sizes` so they sum to `width * height`.
pub fn normalize_sizes(sizes: &[f64], width: f64, height: f64) -> Vec<f64> {
    let total: f64 = sizes.iter().sum();
    if total <= 0.0 {
        return vec![0.0; sizes.len()];
    }
    let area = width * height;
    sizes.iter().map(|size| size * area / total).collect()
}

/// Partitions `bounds` into one rectangle per size, in input order.
pub fn squarify(sizes: &[f64], bounds: Bounds) -> Result<Vec<Rect>> {
    validate_sizes(sizes, bounds)?;

    let mut rects = Vec::with_capacity(sizes.len());
    let mut remaining = sizes;
    let mut current = bounds;
    let mut pass = 0;
    while !remaining.is_empty() {
        let orientation = Orientation::for_bounds(current.width, current.height);
        let split = grow_prefix(remaining, current);
        let (head, tail) = remaining.split_at(split);

        let placed = if is_degenerate(head, current) {
            head.iter()
                .map(|_| Bounds::new(current.x, current.y, 0.0, 0.0))
                .collect()
        } else {
            layout_strip(head, current)
        };
        rects.extend(placed.into_iter().map(|b| Rect {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
            orientation,
            pass,
        }));

        current = leftover(head, current);
        remaining = tail;
        pass += 1;
    }
    Ok(rects)
}

/// Lays `sizes` out as a single strip filling the short side of `bounds`.
pub fn layout_strip(sizes: &[f64], bounds: Bounds) -> Vec<Bounds> {
    if is_degenerate(sizes, bounds) {
        return sizes
            .iter()
            .map(|_| Bounds::new(bounds.x, bounds.y, 0.0, 0.0))
            .collect();
    }
    let covered: f64 = sizes.iter().sum();
    match Orientation::for_bounds(bounds.width, bounds.height) {
        Orientation::Row => {
            let width = covered / bounds.height;
            let mut y = bounds.y;
            sizes
                .iter()
                .map(|size| {
                    let height = size / width;
                    let rect = Bounds::new(bounds.x, y, width, height);
                    y += height;
                    rect
                })
                .collect()
        }
        Orientation::Column => {
            let height = covered / bounds.width;
            let mut x = bounds.x;
            sizes
                .iter()
                .map(|size| {
                    let width = size / height;
                    let rect = Bounds::new(x, bounds.y, width, height);
                    x += width;
                    rect
                })
                .collect()
        }
    }
}

/// The part of `bounds` left over once `sizes` are placed as a strip.
pub fn leftover(sizes: &[f64], bounds: Bounds) -> Bounds {
    if is_degenerate(sizes, bounds) {
        return bounds;
    }
    let covered: f64 = sizes.iter().sum();
    match Orientation::for_bounds(bounds.width, bounds.height) {
        Orientation::Row => {
            let width = covered / bounds.height;
            Bounds::new(
                bounds.x + width,
                bounds.y,
                (bounds.width - width).max(0.0),
                bounds.height,
            )
        }
        Orientation::Column => {
            let height = covered / bounds.width;
            Bounds::new(
                bounds.x,
                bounds.y + height,
                bounds.width,
                (bounds.height - height).max(0.0),
            )
        }
    }
}

/// Worst aspect ratio among the rectangles a strip of `sizes` would produce.
pub fn worst_ratio(sizes: &[f64], bounds: Bounds) -> f64 {
    if is_degenerate(sizes, bounds) {
        return f64::INFINITY;
    }
    layout_strip(sizes, bounds)
        .iter()
        .map(Bounds::aspect_ratio)
        .fold(0.0, f64::max)
}

/// Insets `rect` by `margin` on each side along every dimension that is
/// larger than twice the margin.
pub fn pad_rect(rect: Rect, margin: f64) -> Rect {
    let padded = rect.bounds().inset(margin);
    Rect {
        x: padded.x,
        y: padded.y,
        width: padded.width,
        height: padded.height,
        ..rect
    }
}

fn grow_prefix(sizes: &[f64], bounds: Bounds) -> usize {
    let mut split = 1;
    while split < sizes.len()
        && worst_ratio(&sizes[..split], bounds) >= worst_ratio(&sizes[..=split], bounds)
    {
        split += 1;
    }
    split
}

fn is_degenerate(sizes: &[f64], bounds: Bounds) -> bool {
    let covered: f64 = sizes.iter().sum();
    covered <= 0.0 || bounds.width <= 0.0 || bounds.height <= 0.0
}

fn validate_sizes(sizes: &[f64], bounds: Bounds) -> Result<()> {
    for (index, &size) in sizes.iter().enumerate() {
        if !size.is_finite() || size < 0.0 {
            return Err(LayoutError::InvalidSize { index, size });
        }
        if index > 0 && size > sizes[index - 1] {
            return Err(LayoutError::UnsortedSizes { index });
        }
    }
    if sizes.is_empty() {
        return Ok(());
    }
    let expected = bounds.area();
    let actual: f64 = sizes.iter().sum();
    if (expected - actual).abs() > AREA_TOLERANCE * expected.abs().max(1.0) {
        return Err(LayoutError::AreaMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn overlap_area(a: &Rect, b: &Rect) -> f64 {
        let w = (a.x + a.width).min(b.x + b.width) - a.x.max(b.x);
        let h = (a.y + a.height).min(b.y + b.height) - a.y.max(b.y);
        if w <= 0.0 || h <= 0.0 { 0.0 } else { w * h }
    }

    fn assert_tiles(rects: &[Rect], bounds: Bounds) {
        let total: f64 = rects.iter().map(Rect::area).sum();
        assert!((total - bounds.area()).abs() < EPS * bounds.area().max(1.0));
        for (i, a) in rects.iter().enumerate() {
            assert!(a.x >= bounds.x - EPS && a.y >= bounds.y - EPS);
            assert!(a.x + a.width <= bounds.right() + EPS);
            assert!(a.y + a.height <= bounds.bottom() + EPS);
            for b in &rects[i + 1..] {
                assert!(overlap_area(a, b) < EPS, "{a:?} overlaps {b:?}");
            }
        }
        let hull = rects
            .iter()
            .map(Rect::bounds)
            .reduce(Bounds::union)
            .expect("non-empty");
        assert!((hull.x - bounds.x).abs() < EPS);
        assert!((hull.y - bounds.y).abs() < EPS);
        assert!((hull.width - bounds.width).abs() < EPS);
        assert!((hull.height - bounds.height).abs() < EPS);
    }

    #[test]
    fn tiles_the_paper_example() {
        let bounds = Bounds::new(0.0, 0.0, 6.0, 4.0);
        let sizes = normalize_sizes(&[6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0], 6.0, 4.0);
        let rects = squarify(&sizes, bounds).unwrap();
        assert_eq!(rects.len(), 7);
        assert_tiles(&rects, bounds);
        for (rect, size) in rects.iter().zip(&sizes) {
            assert!((rect.area() - size).abs() < EPS);
        }
    }

    #[test]
    fn tiles_offset_tall_boxes() {
        let bounds = Bounds::new(3.0, -2.0, 7.0, 31.0);
        let raw: Vec<f64> = (1..=23).rev().map(|v| (v * v) as f64).collect();
        let sizes = normalize_sizes(&raw, bounds.width, bounds.height);
        let rects = squarify(&sizes, bounds).unwrap();
        assert_tiles(&rects, bounds);
    }

    #[test]
    fn places_four_clusters_in_separate_passes() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let rects = squarify(&[50.0, 30.0, 15.0, 5.0], bounds).unwrap();
        let passes: Vec<usize> = rects.iter().map(|r| r.pass).collect();
        assert_eq!(passes, vec![0, 1, 2, 3]);
        assert_eq!(rects[0].orientation, Orientation::Row);
        assert_eq!(rects[1].orientation, Orientation::Column);
        assert!((rects[0].width - 5.0).abs() < EPS && (rects[0].height - 10.0).abs() < EPS);
        assert!((rects[1].x - 5.0).abs() < EPS && (rects[1].height - 6.0).abs() < EPS);
        assert!((rects[2].width - 3.75).abs() < EPS);
        assert!((rects[3].x - 8.75).abs() < EPS);
    }

    #[test]
    fn prefix_growth_never_worsens_accepted_strip() {
        let bounds = Bounds::new(0.0, 0.0, 9.0, 5.0);
        let raw = [20.0, 13.0, 13.0, 9.0, 7.0, 5.0, 5.0, 3.0, 2.0, 1.0, 1.0];
        let sizes = normalize_sizes(&raw, bounds.width, bounds.height);
        let rects = squarify(&sizes, bounds).unwrap();
        let last_pass = rects.last().unwrap().pass;
        let mut start = 0;
        for pass in 0..=last_pass {
            let strip_len = rects.iter().filter(|r| r.pass == pass).count();
            let strip_bounds = rects[start..]
                .iter()
                .map(Rect::bounds)
                .reduce(Bounds::union)
                .unwrap();
            let strip = &sizes[start..start + strip_len];
            for k in 1..strip_len {
                let grown = worst_ratio(&strip[..=k], strip_bounds);
                assert!(grown <= worst_ratio(&strip[..k], strip_bounds));
            }
            if start + strip_len < sizes.len() {
                let extended = &sizes[start..=start + strip_len];
                assert!(worst_ratio(extended, strip_bounds) > worst_ratio(strip, strip_bounds));
            }
            start += strip_len;
        }
    }

    #[test]
    fn single_size_fills_the_box() {
        let bounds = Bounds::new(1.0, 2.0, 3.0, 4.0);
        let rects = squarify(&[12.0], bounds).unwrap();
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].bounds(), bounds);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let rects = squarify(&[], Bounds::new(0.0, 0.0, 5.0, 5.0)).unwrap();
        assert!(rects.is_empty());
    }

    #[test]
    fn zero_sizes_stay_finite() {
        let bounds = Bounds::new(0.0, 0.0, 4.0, 2.0);
        let rects = squarify(&[5.0, 3.0, 0.0, 0.0], bounds).unwrap();
        assert_eq!(rects.len(), 4);
        for rect in &rects {
            assert!(rect.x.is_finite() && rect.y.is_finite());
            assert!(rect.width.is_finite() && rect.height.is_finite());
        }
        assert_eq!(rects[3].area(), 0.0);
    }

    #[test]
    fn rejects_area_mismatch() {
        let err = squarify(&[3.0, 2.0], Bounds::new(0.0, 0.0, 2.0, 2.0)).unwrap_err();
        assert!(matches!(err, LayoutError::AreaMismatch { .. }));
    }

    #[test]
    fn rejects_unsorted_and_negative_sizes() {
        let bounds = Bounds::new(0.0, 0.0, 2.0, 2.0);
        assert_eq!(
            squarify(&[1.0, 3.0], bounds).unwrap_err(),
            LayoutError::UnsortedSizes { index: 1 }
        );
        assert!(matches!(
            squarify(&[5.0, -1.0], bounds).unwrap_err(),
            LayoutError::InvalidSize { index: 1, .. }
        ));
    }

    #[test]
    fn pads_only_large_enough_sides() {
        let rect = Rect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 1.5,
            orientation: Orientation::Row,
            pass: 0,
        };
        let padded = pad_rect(rect, 1.0);
        assert_eq!(padded.x, 1.0);
        assert_eq!(padded.width, 8.0);
        assert_eq!(padded.y, 0.0);
        assert_eq!(padded.height, 1.5);
    }
}
