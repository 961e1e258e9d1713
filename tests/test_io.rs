mod common;

use approx::assert_relative_eq;
use cgar_nef::{
    FacetMode, NefError, PolygonSoup, Polyhedron, StlFormat,
    io::{
        read_off, read_polygon_mesh, read_polygon_soup, read_stl, write_off, write_polygon_mesh,
        write_stl, write_stl_file,
    },
};
use common::*;

fn converted_cube(mode: FacetMode) -> Polyhedron<T> {
    Nef::from_polyhedron(&unit_cube()).unwrap().to_polyhedron(mode).unwrap()
}

fn f32_at(bytes: &[u8], at: usize) -> f32 {
    f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[test]
fn binary_stl_of_a_cube() {
    let cube = converted_cube(FacetMode::Triangulate);
    let mut bytes = Vec::new();
    write_stl(&mut bytes, &cube, StlFormat::Binary).unwrap();

    assert_eq!(bytes.len(), 80 + 4 + 12 * 50);
    let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]);
    assert_eq!(count, 12);

    for t in 0..12 {
        let record = 84 + 50 * t;
        let n = [f32_at(&bytes, record), f32_at(&bytes, record + 4), f32_at(&bytes, record + 8)];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert_relative_eq!(len, 1.0, epsilon = 1e-6);
        // Axis aligned cube: one component is +-1.
        assert_relative_eq!(n.iter().map(|c| c.abs()).sum::<f32>(), 1.0, epsilon = 1e-6);
    }
}

#[test]
fn ascii_stl_grammar() {
    let cube = converted_cube(FacetMode::Triangulate);
    let mut bytes = Vec::new();
    write_stl(&mut bytes, &cube, StlFormat::Ascii).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 2 + 12 * 7);
    assert_eq!(lines[0], "solid");
    assert_eq!(*lines.last().unwrap(), "endsolid");
    for facet in lines[1..lines.len() - 1].chunks(7) {
        assert!(facet[0].starts_with("facet normal "));
        assert_eq!(facet[1], "outer loop");
        assert!(facet[2..5].iter().all(|l| l.starts_with("vertex ")));
        assert_eq!(facet[5], "endloop");
        assert_eq!(facet[6], "endfacet");
    }
}

#[test]
fn stl_needs_triangles() {
    let quads = converted_cube(FacetMode::Preserve);
    let mut bytes = Vec::new();
    assert!(matches!(
        write_stl(&mut bytes, &quads, StlFormat::Binary),
        Err(NefError::NotTriangulated { degree: 4, .. })
    ));
}

#[test]
fn stl_round_trip_rebuilds_the_solid() {
    let cube = converted_cube(FacetMode::Triangulate);
    for format in [StlFormat::Ascii, StlFormat::Binary] {
        let mut bytes = Vec::new();
        write_stl(&mut bytes, &cube, format).unwrap();
        let soup: PolygonSoup<T> = read_stl(bytes.as_slice()).unwrap();
        assert_eq!(soup.points.len(), 8);
        assert_eq!(soup.polygons.len(), 12);

        let mesh = Polyhedron::from_polygon_soup(&soup).unwrap();
        assert!(mesh.is_closed());
        assert_eq!(mesh.volume(), T::from(1));
    }
}

#[test]
fn off_round_trip() {
    let quads = converted_cube(FacetMode::Preserve);
    let mut bytes = Vec::new();
    write_off(&mut bytes, &quads).unwrap();

    let soup: PolygonSoup<T> = read_off(bytes.as_slice()).unwrap();
    assert_eq!(soup, quads.to_polygon_soup());

    let mesh = Polyhedron::from_polygon_soup(&soup).unwrap();
    assert_eq!(mesh.size_of_vertices(), 8);
    assert_eq!(mesh.size_of_facets(), 6);
    let again = Nef::from_polyhedron(&mesh).unwrap();
    assert!(again.same_selection(&Nef::from_polyhedron(&unit_cube()).unwrap()));
}

#[test]
fn files_dispatch_on_extension() {
    let dir = std::env::temp_dir();
    let torus = square_torus().to_polyhedron(FacetMode::Triangulate).unwrap();

    for name in ["cgar_nef_torus.off", "cgar_nef_torus.stl"] {
        let path = dir.join(name);
        write_polygon_mesh(&path, &torus).unwrap();
        let soup: PolygonSoup<T> = read_polygon_soup(&path).unwrap();
        let mesh: Polyhedron<T> = read_polygon_mesh(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(soup.points.len(), torus.size_of_vertices());
        assert_eq!(soup.polygons.len(), torus.size_of_facets());
        assert_eq!(mesh.size_of_facets(), torus.size_of_facets());
        assert_eq!(mesh.euler_characteristics()[0].characteristic(), 0);
    }

    let missing = dir.join("cgar_nef_does_not_exist.off");
    assert!(matches!(read_polygon_mesh::<T, _>(&missing), Err(NefError::Io(_))));
    assert!(matches!(
        read_polygon_mesh::<T, _>(dir.join("mesh.obj")),
        Err(NefError::UnsupportedFormat { .. })
    ));
}

#[test]
fn flipped_triangle_is_repaired_on_read() {
    let mut soup = box_soup([0, 0, 0], [1, 1, 1]);
    soup.polygons[3].reverse();
    assert!(matches!(
        Polyhedron::from_polygon_soup(&soup),
        Err(NefError::NonManifoldEdge { .. })
    ));

    let path = std::env::temp_dir().join("cgar_nef_flipped_cube.stl");
    write_stl_file(&path, &soup, StlFormat::Binary).unwrap();
    let mesh: Polyhedron<T> = read_polygon_mesh(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(mesh.size_of_vertices(), 8);
    assert_eq!(mesh.size_of_facets(), 12);
    assert!(mesh.is_closed());
    assert_eq!(mesh.volume(), T::from(1));
    let nef = Nef::from_polyhedron(&mesh).unwrap();
    assert!(nef.same_selection(&box_nef([0, 0, 0], [1, 1, 1])));
}

#[test]
fn three_sheets_on_one_edge_are_refused() {
    let path = std::env::temp_dir().join("cgar_nef_three_sheets.off");
    std::fs::write(
        &path,
        "OFF\n5 3 0\n0 0 0\n1 0 0\n0 1 0\n0 -1 0\n0 0 1\n3 0 1 2\n3 1 0 3\n3 0 1 4\n",
    )
    .unwrap();
    let result = read_polygon_mesh::<T, _>(&path);
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(result, Err(NefError::NotPolygonMesh { .. })));
}
