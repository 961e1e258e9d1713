mod common;

use cgar_nef::{
    MeshBuilder, NefError, Point3, PolygonSoup, Polyhedron, PolyhedronBuilder, Scalar,
};
use common::*;

#[test]
fn cube_navigation() {
    let cube = unit_cube();
    assert_eq!(cube.size_of_halfedges(), 36);
    assert_eq!(cube.size_of_edges(), 18);
    assert!(cube.is_pure_triangle());
    assert!(cube.is_valid());

    for h in 0..cube.size_of_halfedges() {
        assert_eq!(cube.opposite(cube.opposite(h)), h);
        assert_eq!(cube.prev(cube.next(h)), h);
        assert_eq!(cube.source(h), cube.target(cube.opposite(h)));
        assert!(cube.face(h).is_some());
    }
    assert_eq!(cube.outgoing_half_edges(0).len(), 6);
}

#[test]
fn open_mesh_is_not_a_nef_polyhedron() {
    let mut soup = box_soup([0, 0, 0], [1, 1, 1]);
    soup.polygons.truncate(10);
    let open = Polyhedron::from_polygon_soup(&soup).unwrap();
    assert!(!open.is_closed());
    assert_eq!(open.border_halfedges(), 4);
    assert!(matches!(
        Nef::from_polyhedron(&open),
        Err(NefError::NotClosed { border_halfedges: 4 })
    ));
}

#[test]
fn builder_rejects_bad_faces() {
    let mut builder = PolyhedronBuilder::<T>::new();
    for p in [[0, 0, 0], [1, 0, 0], [0, 1, 0], [0, 0, 1]] {
        builder.add_vertex(Point3::from_ints(p[0], p[1], p[2]));
    }
    builder.add_face(&[0, 1, 2]).unwrap();
    assert!(matches!(
        builder.add_face(&[0, 1, 3]),
        Err(NefError::NonManifoldEdge { from: 0, to: 1 })
    ));
    assert!(matches!(builder.add_face(&[0, 9, 3]), Err(NefError::InvalidFace { .. })));
    assert!(matches!(builder.add_face(&[0, 3]), Err(NefError::InvalidFace { .. })));

    builder.add_face(&[0, 3, 1]).unwrap();
    let mesh = builder.finalize().unwrap();
    assert_eq!(mesh.size_of_facets(), 2);
    assert!(!mesh.is_closed());
    assert!(mesh.is_valid());
}

#[test]
fn triangulate_faces_keeps_the_solid() {
    let mut quads = Nef::from_polyhedron(&unit_cube())
        .unwrap()
        .to_polyhedron(cgar_nef::FacetMode::Preserve)
        .unwrap();
    quads.triangulate_faces().unwrap();
    assert_eq!(quads.size_of_vertices(), 8);
    assert_eq!(quads.size_of_facets(), 12);
    assert!(quads.is_pure_triangle());
    assert!(quads.is_closed());
    assert_eq!(quads.volume(), T::from(1));
}

#[test]
fn components_of_a_bowtie() {
    let bowtie = bowtie_mesh();
    assert!(bowtie.is_closed());
    assert_eq!(bowtie.connected_components().len(), 2);
    let chis: Vec<i64> = bowtie
        .euler_characteristics()
        .iter()
        .map(|c| c.characteristic())
        .collect();
    assert_eq!(chis, vec![2, 2]);
}

#[test]
fn soup_round_trip() {
    let soup: PolygonSoup<T> = tetrahedron_soup(3);
    let mesh = Polyhedron::from_polygon_soup(&soup).unwrap();
    assert_eq!(mesh.to_polygon_soup().points, soup.points);
    assert_eq!(mesh.volume(), T::from_num_den(27, 6));
}
