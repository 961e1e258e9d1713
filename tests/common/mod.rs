#![allow(dead_code)]

use cgar_nef::{
    CgarRational, NefPolyhedron, Point3, PolygonSoup, Polyhedron,
};

pub type T = CgarRational;
pub type Nef = NefPolyhedron<T>;

/// Outward quads of the box `[lo, hi]`, corners numbered bottom then top,
/// counter-clockwise seen from above.
const BOX_QUADS: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [3, 7, 6, 2],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
];

pub fn box_soup(lo: [i32; 3], hi: [i32; 3]) -> PolygonSoup<T> {
    let points = vec![
        Point3::from_ints(lo[0], lo[1], lo[2]),
        Point3::from_ints(hi[0], lo[1], lo[2]),
        Point3::from_ints(hi[0], hi[1], lo[2]),
        Point3::from_ints(lo[0], hi[1], lo[2]),
        Point3::from_ints(lo[0], lo[1], hi[2]),
        Point3::from_ints(hi[0], lo[1], hi[2]),
        Point3::from_ints(hi[0], hi[1], hi[2]),
        Point3::from_ints(lo[0], hi[1], hi[2]),
    ];
    let polygons = BOX_QUADS
        .iter()
        .flat_map(|&[a, b, c, d]| [vec![a, b, c], vec![a, c, d]])
        .collect();
    PolygonSoup { points, polygons }
}

/// Triangulated box: 8 vertices, 12 triangles.
pub fn box_mesh(lo: [i32; 3], hi: [i32; 3]) -> Polyhedron<T> {
    Polyhedron::from_polygon_soup(&box_soup(lo, hi)).unwrap()
}

pub fn unit_cube() -> Polyhedron<T> {
    box_mesh([0, 0, 0], [1, 1, 1])
}

pub fn box_nef(lo: [i32; 3], hi: [i32; 3]) -> Nef {
    Nef::from_polyhedron(&box_mesh(lo, hi)).unwrap()
}

/// Corner tetrahedron `o, o + x, o + y, o + z`, scaled by `s`; a negative
/// `s` mirrors it through `o`.
pub fn tetrahedron_soup(s: i32) -> PolygonSoup<T> {
    let points = vec![
        Point3::from_ints(0, 0, 0),
        Point3::from_ints(s, 0, 0),
        Point3::from_ints(0, s, 0),
        Point3::from_ints(0, 0, s),
    ];
    let mut polygons = vec![vec![0, 2, 1], vec![0, 1, 3], vec![0, 3, 2], vec![1, 2, 3]];
    if s < 0 {
        for p in &mut polygons {
            p.reverse();
        }
    }
    PolygonSoup { points, polygons }
}

/// Two tetrahedra touching only at the origin, stored as one mesh with the
/// shared corner duplicated.
pub fn bowtie_mesh() -> Polyhedron<T> {
    let mut soup = tetrahedron_soup(1);
    let other = tetrahedron_soup(-1);
    let offset = soup.points.len();
    soup.points.extend(other.points);
    soup.polygons
        .extend(other.polygons.into_iter().map(|p| p.into_iter().map(|v| v + offset).collect()));
    Polyhedron::from_polygon_soup(&soup).unwrap()
}

/// `[0,3]^2 x [0,1]` with the square column `[1,2]^2` drilled through.
pub fn square_torus() -> Nef {
    let slab = box_nef([0, 0, 0], [3, 3, 1]);
    let drill = box_nef([1, 1, -1], [2, 2, 2]);
    slab.difference(&drill).regularization()
}

/// The octahedron `|x| + |y| + |z| <= r`.
pub fn octahedron_soup(r: i32) -> PolygonSoup<T> {
    let points = vec![
        Point3::from_ints(r, 0, 0),
        Point3::from_ints(-r, 0, 0),
        Point3::from_ints(0, r, 0),
        Point3::from_ints(0, -r, 0),
        Point3::from_ints(0, 0, r),
        Point3::from_ints(0, 0, -r),
    ];
    let polygons = vec![
        vec![0, 2, 4],
        vec![2, 1, 4],
        vec![1, 3, 4],
        vec![3, 0, 4],
        vec![2, 0, 5],
        vec![1, 2, 5],
        vec![3, 1, 5],
        vec![0, 3, 5],
    ];
    PolygonSoup { points, polygons }
}

pub fn octahedron_nef(r: i32) -> Nef {
    Nef::from_polyhedron(&Polyhedron::from_polygon_soup(&octahedron_soup(r)).unwrap()).unwrap()
}

/// Prism of height 1 over the convex polygon through `(k, k^2)`,
/// `k = 0..n`, with polygonal caps.
pub fn parabola_prism(n: usize) -> Polyhedron<T> {
    let mut points = Vec::with_capacity(2 * n);
    for z in [0, 1] {
        for k in 0..n as i32 {
            points.push(Point3::from_ints(k, k * k, z));
        }
    }
    let mut polygons = vec![(0..n).rev().collect::<Vec<_>>(), (n..2 * n).collect()];
    for i in 0..n {
        let j = (i + 1) % n;
        polygons.push(vec![i, j, j + n, i + n]);
    }
    Polyhedron::from_polygon_soup(&PolygonSoup { points, polygons }).unwrap()
}
