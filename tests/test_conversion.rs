mod common;

use cgar_nef::{
    ConversionOptions, FacetMode, NefError, PolygonSoup, convert_nef_polyhedron_to_polygon_mesh,
};
use common::*;

#[test]
fn unit_cube_round_trip() {
    let cube = unit_cube();
    assert_eq!(cube.size_of_vertices(), 8);
    assert_eq!(cube.size_of_facets(), 12);
    assert!(cube.is_closed());

    let nef = Nef::from_polyhedron(&cube).unwrap();
    assert!(nef.is_simple());

    let back = nef.to_polyhedron(FacetMode::Triangulate).unwrap();
    assert_eq!(back.size_of_vertices(), 8);
    assert_eq!(back.size_of_facets(), 12);
    assert_eq!(back.size_of_halfedges(), 36);
    assert!(back.is_closed());
    assert!(back.is_valid());
    assert_eq!(back.volume(), T::from(1));
}

#[test]
fn preserve_mode_merges_coplanar_triangles() {
    let nef = Nef::from_polyhedron(&unit_cube()).unwrap();
    let mesh = nef.to_polyhedron(FacetMode::Preserve).unwrap();
    assert_eq!(mesh.size_of_vertices(), 8);
    assert_eq!(mesh.size_of_facets(), 6);
    assert!((0..6).all(|f| mesh.facet_degree(f) == 4));
}

#[test]
fn round_trip_keeps_vertex_count() {
    for soup in [tetrahedron_soup(2), box_soup([-1, 0, 2], [3, 1, 5])] {
        let mesh = cgar_nef::Polyhedron::from_polygon_soup(&soup).unwrap();
        let nef = Nef::from_polyhedron(&mesh).unwrap();
        let back = nef.to_polyhedron(FacetMode::Triangulate).unwrap();
        assert_eq!(back.size_of_vertices(), mesh.size_of_vertices());
        assert_eq!(back.volume(), mesh.volume());
    }
}

#[test]
fn conversion_is_deterministic() {
    let nef = box_nef([0, 0, 0], [2, 2, 2]).join(&box_nef([1, 1, 1], [3, 3, 3]));
    let first = nef.to_polyhedron(FacetMode::Preserve).unwrap();
    let second = nef.to_polyhedron(FacetMode::Preserve).unwrap();
    assert_eq!(first.size_of_vertices(), second.size_of_vertices());
    assert_eq!(first.size_of_facets(), second.size_of_facets());
    assert_eq!(first.size_of_halfedges(), second.size_of_halfedges());
    assert_eq!(first.to_polygon_soup(), second.to_polygon_soup());
}

#[test]
fn triangulation_only_adds_facets() {
    let nef = box_nef([0, 0, 0], [2, 1, 1]).join(&box_nef([0, 1, 0], [1, 2, 1]));
    let polygons = nef.to_polyhedron(FacetMode::Preserve).unwrap();
    let triangles = nef.to_polyhedron(FacetMode::Triangulate).unwrap();

    assert_eq!(polygons.size_of_vertices(), triangles.size_of_vertices());
    assert!(triangles.size_of_facets() > polygons.size_of_facets());
    assert!(triangles.is_pure_triangle());
    assert_eq!(polygons.volume(), triangles.volume());
}

#[test]
fn euler_characteristic_of_cube_is_two() {
    let mesh = Nef::from_polyhedron(&unit_cube())
        .unwrap()
        .to_polyhedron(FacetMode::Preserve)
        .unwrap();
    let components = mesh.euler_characteristics();
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].characteristic(), 2);
    assert_eq!(components[0].genus(), Some(0));
}

#[test]
fn euler_characteristic_of_torus_is_zero() {
    let torus = square_torus();
    assert!(torus.is_simple());

    for mode in [FacetMode::Preserve, FacetMode::Triangulate] {
        let mesh = torus.to_polyhedron(mode).unwrap();
        assert!(mesh.is_closed_surface());
        assert_eq!(mesh.size_of_vertices(), 16);
        assert_eq!(mesh.volume(), T::from(8));

        let components = mesh.euler_characteristics();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].characteristic(), 0);
        assert_eq!(components[0].genus(), Some(1));
    }
}

#[test]
fn disjoint_solids_give_one_component_each() {
    let pair = box_nef([0, 0, 0], [1, 1, 1]).join(&box_nef([3, 0, 0], [4, 1, 1]));
    let mesh = pair.to_polyhedron(FacetMode::Triangulate).unwrap();
    assert_eq!(mesh.size_of_vertices(), 16);
    assert_eq!(mesh.size_of_facets(), 24);
    let components = mesh.euler_characteristics();
    assert_eq!(components.len(), 2);
    assert!(components.iter().all(|c| c.characteristic() == 2));
}

#[test]
fn soup_builder_gets_the_same_surface() {
    let nef = Nef::from_polyhedron(&unit_cube()).unwrap();
    let mut soup = PolygonSoup::new();
    convert_nef_polyhedron_to_polygon_mesh(&nef, &mut soup, &ConversionOptions::default()).unwrap();
    assert_eq!(soup.points.len(), 8);
    assert_eq!(soup.polygons.len(), 6);
}

#[test]
fn non_manifold_solid_is_refused() {
    let nef = Nef::from_polyhedron(&bowtie_mesh()).unwrap();
    assert!(!nef.is_simple());
    assert!(matches!(
        nef.to_polyhedron(FacetMode::Triangulate),
        Err(NefError::NotManifold)
    ));

    let mut soup = PolygonSoup::new();
    let result =
        convert_nef_polyhedron_to_polygon_mesh(&nef, &mut soup, &ConversionOptions::default());
    assert!(matches!(result, Err(NefError::NotManifold)));
    assert!(soup.polygons.is_empty());
}

#[test]
fn unbounded_selection_is_refused() {
    let outside = Nef::from_polyhedron(&unit_cube()).unwrap().complement();
    assert!(!outside.is_bounded());
    assert!(matches!(
        outside.to_polyhedron(FacetMode::Preserve),
        Err(NefError::Unbounded)
    ));
}

#[test]
fn prism_size_follows_its_facets() {
    let small = parabola_prism(16);
    let large = parabola_prism(32);
    let small_nef = Nef::from_polyhedron(&small).unwrap();
    let large_nef = Nef::from_polyhedron(&large).unwrap();

    assert_eq!(large_nef.number_of_planes(), 34);
    assert_eq!(large_nef.number_of_vertices(), 64);
    assert_eq!(large_nef.number_of_edges(), 96);
    assert_eq!(large_nef.number_of_facets(), 34);
    // Doubling the facets may not quadruple the tree.
    assert!(large_nef.tree().size() <= 3 * small_nef.tree().size());

    let back = large_nef.to_polyhedron(FacetMode::Preserve).unwrap();
    assert_eq!(back.size_of_vertices(), 64);
    assert_eq!(back.size_of_facets(), 34);
    assert_eq!(back.volume(), large.volume());
}
