//! Connected regions of a [`Mask`] and their shape descriptors.
//!
//! Regions are grown with an explicit stack, never by recursion, and a shared
//! visited mask guarantees each pixel is claimed by at most one region. A
//! region's member pixels double as its "contour": area and hull come from
//! the filled pixel set, while perimeter and circularity come from the outer
//! boundary traced around it.

use std::f32::consts::{PI, SQRT_2};

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, PixelPoint};
use crate::Mask;

/// Regions must have more than this many pixels to be reported as contours.
pub const MIN_CONTOUR_PIXELS: usize = 10;

const NEIGHBOURS_4: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const NEIGHBOURS_8: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Pixel adjacency used when growing regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Connectivity {
    Four,
    Eight,
}

impl Connectivity {
    fn offsets(self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Four => &NEIGHBOURS_4,
            Connectivity::Eight => &NEIGHBOURS_8,
        }
    }
}

/// Non-empty set of pixels with its cached bounding box.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pixels: Vec<PixelPoint>,
    bbox: BoundingBox,
}

impl Region {
    /// `None` for an empty pixel list.
    pub fn from_pixels(pixels: Vec<PixelPoint>) -> Option<Self> {
        let bbox = BoundingBox::from_points(&pixels)?;
        Some(Self { pixels, bbox })
    }

    pub fn pixels(&self) -> &[PixelPoint] {
        &self.pixels
    }

    /// Pixel count.
    #[inline]
    pub fn area(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Membership grid over the bounding box, row-major.
    fn local_occupancy(&self) -> Vec<bool> {
        let (w, h) = (self.bbox.width as usize, self.bbox.height as usize);
        let mut grid = vec![false; w * h];
        for p in &self.pixels {
            let lx = (p.x - self.bbox.x) as usize;
            let ly = (p.y - self.bbox.y) as usize;
            grid[ly * w + lx] = true;
        }
        grid
    }
}

/// Grow the region containing `seed` over foreground pixels.
///
/// Pixels already marked in `visited` are skipped and every claimed pixel is
/// marked, so repeated calls over one image touch each pixel once. Returns an
/// empty list when the seed is background, out of range or already visited.
pub fn flood_fill(
    mask: &Mask,
    seed: PixelPoint,
    connectivity: Connectivity,
    visited: &mut Mask,
) -> Vec<PixelPoint> {
    let claim = |x: i32, y: i32, visited: &mut Mask| -> bool {
        if !mask.get_or_background(x, y) || visited.get(x as usize, y as usize) {
            return false;
        }
        visited.set(x as usize, y as usize, true);
        true
    };

    let mut members = Vec::new();
    if !claim(seed.x, seed.y, visited) {
        return members;
    }
    let mut stack = vec![seed];
    while let Some(p) = stack.pop() {
        members.push(p);
        for &(dx, dy) in connectivity.offsets() {
            let (nx, ny) = (p.x + dx, p.y + dy);
            if claim(nx, ny, visited) {
                stack.push(PixelPoint::new(nx, ny));
            }
        }
    }
    members
}

/// 4-connected [`flood_fill`].
pub fn flood_fill4(mask: &Mask, seed: PixelPoint, visited: &mut Mask) -> Vec<PixelPoint> {
    flood_fill(mask, seed, Connectivity::Four, visited)
}

/// Every connected foreground region with more than `min_pixels` pixels,
/// in raster order of their first pixel.
pub fn connected_components(
    mask: &Mask,
    connectivity: Connectivity,
    min_pixels: usize,
) -> Vec<Region> {
    let mut visited = Mask::empty_like_dims(mask.width(), mask.height());
    let mut regions = Vec::new();
    for seed in mask.foreground() {
        if visited.get(seed.x as usize, seed.y as usize) {
            continue;
        }
        let members = flood_fill(mask, seed, connectivity, &mut visited);
        if members.len() > min_pixels {
            regions.extend(Region::from_pixels(members));
        }
    }
    regions
}

/// 8-connected components larger than [`MIN_CONTOUR_PIXELS`].
pub fn trace_contours(mask: &Mask) -> Vec<Region> {
    connected_components(mask, Connectivity::Eight, MIN_CONTOUR_PIXELS)
}

/// Moore neighbourhood in clockwise order (y down), starting east.
const RING: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

fn ring_index(offset: (i32, i32)) -> usize {
    RING.iter().position(|&o| o == offset).unwrap_or(0)
}

/// Outer boundary of a region, traced through the centers of its pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Boundary {
    /// Chain-code length: 1 per axial step, `sqrt(2)` per diagonal step.
    pub length: f32,
    /// Area enclosed by the boundary polygon.
    pub enclosed_area: f32,
}

/// Trace the outer boundary with Moore-neighbour following.
///
/// Tracing starts at the first pixel in raster order and stops when it is
/// about to repeat its first move. Holes are ignored. A single pixel has a
/// zero-length boundary and a one-pixel-wide line encloses no area.
pub fn outer_boundary(region: &Region) -> Boundary {
    let bbox = region.bbox();
    let (w, h) = (bbox.width, bbox.height);
    let grid = region.local_occupancy();
    let inside =
        |x: i32, y: i32| x >= 0 && y >= 0 && x < w && y < h && grid[(y * w + x) as usize];
    let Some(first) = grid.iter().position(|&on| on) else {
        return Boundary::default();
    };
    let start = (first as i32 % w, first as i32 / w);

    // First member clockwise after `back`, the ring direction taken, and the
    // backtrack direction as seen from the new pixel.
    let advance = |p: (i32, i32), back: usize| {
        (1..=8).find_map(|i| {
            let dir = (back + i) % 8;
            let q = (p.0 + RING[dir].0, p.1 + RING[dir].1);
            if !inside(q.0, q.1) {
                return None;
            }
            let outside = RING[(back + i - 1) % 8];
            let next_back = ring_index((p.0 + outside.0 - q.0, p.1 + outside.1 - q.1));
            Some((q, dir, next_back))
        })
    };

    // West of the first raster pixel is never a member.
    let mut back = 4;
    let mut current = start;
    let mut first_move = None;
    let mut length = 0.0f32;
    let mut twice_area = 0i64;
    for _ in 0..4 * region.area() + 8 {
        let Some((next, dir, next_back)) = advance(current, back) else {
            break;
        };
        if current == start && first_move == Some(next) {
            break;
        }
        if first_move.is_none() {
            first_move = Some(next);
        }
        length += if dir % 2 == 0 { 1.0 } else { SQRT_2 };
        twice_area += current.0 as i64 * next.1 as i64 - next.0 as i64 * current.1 as i64;
        current = next;
        back = next_back;
    }
    Boundary {
        length,
        enclosed_area: twice_area.abs() as f32 * 0.5,
    }
}

/// Length of the traced outer boundary (see [`outer_boundary`]).
pub fn perimeter(region: &Region) -> f32 {
    outer_boundary(region).length
}

fn cross(o: (i64, i64), a: (i64, i64), b: (i64, i64)) -> i64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Area of the convex hull of the region's pixel squares.
///
/// Each pixel contributes its four corners, so a solid axis-aligned rectangle
/// has a hull area equal to its pixel count.
pub fn convex_hull_area(region: &Region) -> f32 {
    let bbox = region.bbox();
    let h = bbox.height as usize;
    // Only the leftmost and rightmost pixel of each row can reach the hull.
    let mut extents: Vec<Option<(i32, i32)>> = vec![None; h];
    for p in region.pixels() {
        let row = &mut extents[(p.y - bbox.y) as usize];
        *row = Some(match *row {
            Some((lo, hi)) => (lo.min(p.x), hi.max(p.x)),
            None => (p.x, p.x),
        });
    }

    let mut pts: Vec<(i64, i64)> = Vec::with_capacity(h * 4);
    for (dy, ext) in extents.iter().enumerate() {
        if let Some((lo, hi)) = *ext {
            let y = (bbox.y + dy as i32) as i64;
            let (lo, hi) = (lo as i64, hi as i64 + 1);
            pts.extend([(lo, y), (lo, y + 1), (hi, y), (hi, y + 1)]);
        }
    }
    pts.sort_unstable();
    pts.dedup();
    if pts.len() < 3 {
        return 0.0;
    }

    let mut hull: Vec<(i64, i64)> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();

    let twice: i64 = (0..hull.len())
        .map(|i| {
            let (a, b) = (hull[i], hull[(i + 1) % hull.len()]);
            a.0 * b.1 - b.0 * a.1
        })
        .sum();
    twice.abs() as f32 * 0.5
}

/// `4 pi area / perimeter^2`; 0 when the perimeter is 0.
pub fn circularity(area: f32, perimeter: f32) -> f32 {
    if perimeter <= 0.0 {
        return 0.0;
    }
    4.0 * PI * area / (perimeter * perimeter)
}

/// `area / hull_area`; 0 when the hull is degenerate.
pub fn solidity(area: f32, hull_area: f32) -> f32 {
    if hull_area <= 0.0 {
        return 0.0;
    }
    area / hull_area
}

/// `1 - area / max(bbox_area, 1)`.
///
/// Uses the bounding box as a stand-in for the convex hull, so elongated or
/// rotated regions read as more irregular than they are.
pub fn irregularity(region: &Region) -> f32 {
    let bbox_area = region.bbox().area().max(1) as f32;
    1.0 - region.area() as f32 / bbox_area
}

/// Shape summary of one region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub area: f32,
    pub bbox: BoundingBox,
    pub center: PixelPoint,
    pub perimeter: f32,
    /// Uses the area enclosed by the boundary, so it stays within `[0, 1]`.
    pub circularity: f32,
    pub solidity: f32,
    pub aspect_ratio: f32,
}

pub fn describe(region: &Region) -> RegionStats {
    let area = region.area() as f32;
    let bbox = region.bbox();
    let boundary = outer_boundary(region);
    RegionStats {
        area,
        bbox,
        center: bbox.center(),
        perimeter: boundary.length,
        circularity: circularity(boundary.enclosed_area, boundary.length),
        solidity: solidity(area, convex_hull_area(region)),
        aspect_ratio: bbox.aspect_ratio(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mask_with(w: usize, h: usize, on: impl Fn(i32, i32) -> bool) -> Mask {
        Mask::from_fn(w, h, |x, y| on(x as i32, y as i32))
    }

    fn rect_region(x: i32, y: i32, w: i32, h: i32) -> Region {
        let pixels = (y..y + h)
            .flat_map(|yy| (x..x + w).map(move |xx| PixelPoint::new(xx, yy)))
            .collect();
        Region::from_pixels(pixels).expect("non-empty")
    }

    #[test]
    fn flood_fill_threads_the_visited_mask() {
        let m = mask_with(6, 4, |x, _| x != 2);
        let mut visited = Mask::empty_like_dims(6, 4);
        let left = flood_fill4(&m, PixelPoint::new(0, 0), &mut visited);
        assert_eq!(left.len(), 8);
        assert!(flood_fill4(&m, PixelPoint::new(1, 3), &mut visited).is_empty());
        assert!(flood_fill4(&m, PixelPoint::new(2, 0), &mut visited).is_empty());
        assert_eq!(flood_fill4(&m, PixelPoint::new(5, 3), &mut visited).len(), 12);
        assert_eq!(visited.count(), 20);
    }

    #[test]
    fn diagonal_pixels_join_only_under_eight_connectivity() {
        let m = mask_with(4, 4, |x, y| x == y);
        assert_eq!(connected_components(&m, Connectivity::Four, 0).len(), 4);
        assert_eq!(connected_components(&m, Connectivity::Eight, 0).len(), 1);
    }

    #[test]
    fn trace_contours_drops_small_components() {
        let m = mask_with(20, 10, |x, y| (x < 3 && y < 3) || (x >= 10 && y >= 5 && x < 14));
        let contours = trace_contours(&m);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].area(), 20);
        assert_eq!(contours[0].bbox(), BoundingBox::new(10, 5, 4, 5));
    }

    #[test]
    fn rectangle_descriptors() {
        let r = rect_region(2, 3, 4, 3);
        // Center polygon is 3 x 2.
        assert_relative_eq!(perimeter(&r), 10.0);
        assert_relative_eq!(outer_boundary(&r).enclosed_area, 6.0);
        assert_relative_eq!(convex_hull_area(&r), 12.0);
        let stats = describe(&r);
        assert_relative_eq!(stats.solidity, 1.0);
        assert_relative_eq!(stats.aspect_ratio, 4.0 / 3.0);
        assert_relative_eq!(stats.circularity, 4.0 * PI * 6.0 / 100.0);
        assert_eq!(stats.center, PixelPoint::new(4, 4));
        assert_relative_eq!(irregularity(&r), 0.0);
    }

    #[test]
    fn l_shape_is_less_solid_than_its_hull() {
        let mut pixels: Vec<PixelPoint> = (0..5).map(|y| PixelPoint::new(0, y)).collect();
        pixels.extend((1..5).map(|x| PixelPoint::new(x, 4)));
        let r = Region::from_pixels(pixels).expect("non-empty");
        // Hull corners: (0,0), (1,0), (5,4), (5,5), (0,5).
        assert_relative_eq!(convex_hull_area(&r), 17.0);
        assert_relative_eq!(solidity(9.0, convex_hull_area(&r)), 9.0 / 17.0);
        assert_relative_eq!(irregularity(&r), 1.0 - 9.0 / 25.0);
    }

    #[test]
    fn disk_is_rounder_than_a_square_of_similar_area() {
        let disk = mask_with(32, 32, |x, y| (x - 15).pow(2) + (y - 15).pow(2) <= 100);
        let square = mask_with(32, 32, |x, y| (5..23).contains(&x) && (5..23).contains(&y));
        let disk = describe(&trace_contours(&disk)[0]);
        let square = describe(&trace_contours(&square)[0]);
        assert_eq!(disk.area, 317.0);
        assert_eq!(square.area, 324.0);
        assert_relative_eq!(square.circularity, PI / 4.0, epsilon = 1e-6);
        assert!(disk.circularity > 0.8, "{disk:?}");
        assert!(disk.circularity > square.circularity);
        assert!(disk.circularity <= 1.0);
    }

    #[test]
    fn boundary_steps_are_chain_coded() {
        let line = rect_region(0, 0, 6, 1);
        let b = outer_boundary(&line);
        assert_relative_eq!(b.length, 10.0);
        assert_eq!(b.enclosed_area, 0.0);
        assert_eq!(describe(&line).circularity, 0.0);

        let diagonal = Region::from_pixels((0..3).map(|i| PixelPoint::new(i, i)).collect())
            .expect("non-empty");
        assert_relative_eq!(perimeter(&diagonal), 4.0 * SQRT_2);

        let dot = rect_region(4, 4, 1, 1);
        assert_eq!(outer_boundary(&dot), Boundary::default());
    }

    #[test]
    fn degenerate_metrics_are_zero() {
        assert_eq!(circularity(10.0, 0.0), 0.0);
        assert_eq!(solidity(10.0, 0.0), 0.0);
        assert!(Region::from_pixels(Vec::new()).is_none());
    }
}
