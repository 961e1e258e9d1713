// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Features of the point set a BSP tree describes: vertices, edges,
//! facets and volumes, read off the leaf cells by local analysis. Only
//! cells the tree actually splits are visited, so the work follows the
//! size of the result rather than the number of planes cubed.

use std::{
    collections::{BTreeMap, BTreeSet},
    ops::Bound::Excluded,
};

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::{
    error::{NefError, NefResult},
    geometry::{Point2, Point3, PointOps, Vector3, VectorOps, centroid},
    kernel::{TrianglePosition, compare_angle_around, locate_in_ring2d, polygon_normal, rank},
    mesh::topology::UnionFind,
    nef::{
        bsp::BspTree,
        region::{Region, frame_bound},
        simple::SimplicityViolation,
        sphere_map::{CircleMap, SphereMap},
    },
    numeric::scalar::{Scalar, Sign},
};

#[derive(Clone, Debug)]
pub struct SkeletonVertex<T: Scalar> {
    /// Index into [`Skeleton::points`].
    pub point: usize,
    /// Neighbourhood reduced to the planes the marks depend on.
    pub sphere: SphereMap<T>,
}

/// Maximal piece of a line carrying an edge. An end without a vertex runs
/// out to infinity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkeletonEdge {
    pub source: Option<usize>,
    pub target: Option<usize>,
}

/// Connected region of one plane with the same marks below, on and above.
#[derive(Clone, Debug)]
pub struct SkeletonFacet {
    pub plane: usize,
    pub below: bool,
    pub on: bool,
    pub above: bool,
    /// Counter-clockwise around the plane normal.
    pub outer: Vec<usize>,
    /// Clockwise around the plane normal.
    pub holes: Vec<Vec<usize>>,
    pub touches_frame: bool,
}

#[derive(Clone, Debug)]
pub struct Skeleton<T: Scalar> {
    pub points: Vec<Point3<T>>,
    pub vertices: Vec<SkeletonVertex<T>>,
    pub edges: Vec<SkeletonEdge>,
    pub facets: Vec<SkeletonFacet>,
    pub volumes: usize,
    pub bounded: bool,
    pub violation: Option<SimplicityViolation>,
}

/// Convex part of a 2-cell with one leaf below and one above.
struct Piece {
    plane: usize,
    ring: Vec<usize>,
    marks: (bool, bool, bool),
    touches_frame: bool,
}

type FacetKey = (usize, bool, bool, bool);

struct FacetCycle {
    vertices: Vec<usize>,
    holes: Vec<Vec<usize>>,
}

struct PointTable<T: Scalar> {
    points: Vec<Point3<T>>,
    index: AHashMap<Point3<T>, usize>,
}

impl<T: Scalar> PointTable<T> {
    fn new() -> Self {
        PointTable {
            points: Vec::new(),
            index: AHashMap::new(),
        }
    }

    fn insert(&mut self, p: Point3<T>) -> usize {
        if let Some(&i) = self.index.get(&p) {
            return i;
        }
        let i = self.points.len();
        self.index.insert(p.clone(), i);
        self.points.push(p);
        i
    }
}

impl<T: Scalar> Skeleton<T> {
    pub fn derive(tree: &BspTree<T>) -> Self {
        let planes = tree.planes();
        let bound = frame_bound(planes);
        let on_frame = |p: &Point3<T>| p.max_abs_coord() == bound;
        let cells = tree.partition(Region::frame(&bound), None);
        let bounded = cells.iter().all(|c| !c.mark || !c.region.touches_frame(&bound));

        let volume_of: AHashMap<&[u8], usize> = cells
            .iter()
            .filter(|c| c.region.dimension() == 3)
            .enumerate()
            .map(|(i, c)| (c.path.as_slice(), i))
            .collect();
        let mut volumes = UnionFind::new(volume_of.len());

        let mut table = PointTable::new();
        let mut pieces: Vec<Piece> = Vec::new();
        let mut segments: BTreeSet<(usize, usize)> = BTreeSet::new();
        for cell in &cells {
            match &cell.region {
                Region::Solid(_) => {}
                Region::Polygon(_) => {
                    let Some(&plane) = cell.on_planes.first() else {
                        continue;
                    };
                    let normal = planes[plane].normal();
                    for below in tree.partition(cell.region.clone(), Some(&-&normal)) {
                        if below.region.dimension() != 2 {
                            continue;
                        }
                        for above in tree.partition(below.region.clone(), Some(&normal)) {
                            let Region::Polygon(ring) = &above.region else {
                                continue;
                            };
                            let marks = (below.mark, cell.mark, above.mark);
                            if marks.0 == marks.1 && marks.1 == marks.2 {
                                if let (Some(&b), Some(&a)) = (
                                    volume_of.get(below.path.as_slice()),
                                    volume_of.get(above.path.as_slice()),
                                ) {
                                    volumes.union(b, a);
                                }
                            }
                            let mut ring = ring.clone();
                            if polygon_normal(&ring).dot(&normal).is_negative() {
                                ring.reverse();
                            }
                            let ids: Vec<usize> = ring.into_iter().map(|p| table.insert(p)).collect();
                            for i in 0..ids.len() {
                                segments.insert(ordered(ids[i], ids[(i + 1) % ids.len()]));
                            }
                            pieces.push(Piece {
                                plane,
                                ring: ids,
                                marks,
                                touches_frame: above.region.touches_frame(&bound),
                            });
                        }
                    }
                }
                Region::Segment(a, b) => {
                    let axis = b - a;
                    let normals: Vec<Vector3<T>> = planes
                        .iter()
                        .filter(|h| h.has_on(a) && h.has_on(b))
                        .map(|h| h.normal())
                        .collect();
                    let (rays, sectors) = CircleMap::directions(&axis, &normals);
                    let mut stops = vec![a.clone(), b.clone()];
                    for d in rays.iter().chain(&sectors) {
                        for part in tree.partition(cell.region.clone(), Some(d)) {
                            stops.extend(part.region.vertices());
                        }
                    }
                    stops.sort_by(|p, q| (p - a).dot(&axis).cmp(&(q - a).dot(&axis)));
                    stops.dedup();
                    let ids: Vec<usize> = stops.into_iter().map(|p| table.insert(p)).collect();
                    for w in ids.windows(2) {
                        segments.insert(ordered(w[0], w[1]));
                    }
                }
                Region::Point(p) => {
                    table.insert(p.clone());
                }
            }
        }
        let points = table.points;

        let mut piece_violation = None;
        for piece in &pieces {
            let (below, on, above) = piece.marks;
            if below == above && on != below {
                piece_violation = Some(SimplicityViolation::InconsistentFeature {
                    dimension: 2,
                    at: witness(&points, &piece.ring),
                });
                break;
            }
        }

        // Vertices: points whose neighbourhood is not invariant along any
        // line through them.
        let mut vertex_of: Vec<Option<usize>> = vec![None; points.len()];
        let mut on_plane: AHashMap<usize, Vec<usize>> = AHashMap::new();
        let mut vertices = Vec::new();
        for (id, p) in points.iter().enumerate() {
            if on_frame(p) {
                continue;
            }
            let through: Vec<usize> = (0..planes.len()).filter(|&i| planes[i].has_on(p)).collect();
            let center = tree.mark_at(p, None);
            let mark_of = |d: &Vector3<T>| tree.mark_at(p, Some(d));
            let map = SphereMap::build(through.iter().map(|&i| planes[i].normal()).collect(), center, mark_of);
            let sphere = match map.essential_circles() {
                None => map,
                Some(kept) => {
                    let normals: Vec<Vector3<T>> = kept.iter().map(|&k| map.normals[k].clone()).collect();
                    if rank(&normals) < 3 {
                        continue;
                    }
                    SphereMap::build(normals, center, mark_of)
                }
            };
            for &h in &through {
                on_plane.entry(h).or_default().push(id);
            }
            vertex_of[id] = Some(vertices.len());
            vertices.push(SkeletonVertex { point: id, sphere });
        }

        // Edges: candidate segments whose surroundings change across the
        // line, merged into maximal runs and cut at vertices.
        let mut edge_violation = None;
        let mut lines: BTreeMap<(Vector3<T>, Point3<T>), Vec<(T, T)>> = BTreeMap::new();
        for &(i, j) in &segments {
            let (a, b) = (&points[i], &points[j]);
            let m = a.midpoint(b);
            if on_frame(&m) {
                continue;
            }
            let axis = b - a;
            let normals = planes
                .iter()
                .filter(|h| h.has_on(a) && h.has_on(b))
                .map(|h| h.normal())
                .collect();
            let circle = CircleMap::build(&axis, normals, tree.mark_at(&m, None), |d| tree.mark_at(&m, Some(d)));
            if edge_violation.is_none() {
                let at = m.to_f64();
                if circle.is_isolated() {
                    edge_violation = Some(SimplicityViolation::InconsistentFeature { dimension: 1, at });
                } else if circle.has_dangling_ray() {
                    edge_violation = Some(SimplicityViolation::InconsistentFeature { dimension: 2, at });
                } else if !matches!(circle.boundary_fan(), 0 | 2) {
                    edge_violation = Some(SimplicityViolation::EdgeNotManifold {
                        at,
                        facets: circle.boundary_fan(),
                    });
                }
            }
            if circle.is_edge() {
                let (direction, base) = line_key(a, &axis);
                let (s, t) = (a.as_vector().dot(&direction), b.as_vector().dot(&direction));
                let span = if s < t { (s, t) } else { (t, s) };
                lines.entry((direction, base)).or_default().push(span);
            }
        }

        let mut edges = Vec::new();
        for ((direction, base), mut spans) in lines {
            let stops: BTreeMap<T, usize> = vertices
                .iter()
                .enumerate()
                .filter(|(_, v)| (&points[v.point] - &base).cross(&direction).is_zero())
                .map(|(k, v)| (points[v.point].as_vector().dot(&direction), k))
                .collect();
            spans.sort();
            let mut runs: Vec<(T, T)> = Vec::new();
            for (s, t) in spans {
                match runs.last_mut() {
                    Some(last) if s <= last.1 => {
                        if t > last.1 {
                            last.1 = t;
                        }
                    }
                    _ => runs.push((s, t)),
                }
            }
            for (s, t) in runs {
                let mut cuts = vec![s.clone()];
                cuts.extend(stops.range((Excluded(&s), Excluded(&t))).map(|(k, _)| k.clone()));
                cuts.push(t);
                for w in cuts.windows(2) {
                    edges.push(SkeletonEdge {
                        source: stops.get(&w[0]).copied(),
                        target: stops.get(&w[1]).copied(),
                    });
                }
            }
        }

        let mut vertex_violation = None;
        for (k, v) in vertices.iter().enumerate() {
            if v.sphere.is_isolated() {
                vertex_violation = Some(SimplicityViolation::InconsistentFeature {
                    dimension: 0,
                    at: points[v.point].to_f64(),
                });
                break;
            }
            if !v.sphere.boundary_is_single_cycle() {
                vertex_violation = Some(SimplicityViolation::VertexNotManifold { vertex: k });
                break;
            }
        }

        let mut groups: BTreeMap<FacetKey, Vec<&Piece>> = BTreeMap::new();
        for piece in &pieces {
            let (below, on, above) = piece.marks;
            if below == on && on == above {
                continue;
            }
            groups.entry((piece.plane, below, on, above)).or_default().push(piece);
        }
        let mut facets = Vec::new();
        for ((plane, below, on, above), group) in groups {
            let normal = planes[plane].normal();
            let touches_frame = group.iter().any(|p| p.touches_frame);
            let rings: Vec<Vec<usize>> = group.iter().map(|p| p.ring.clone()).collect();
            let no_vertices = Vec::new();
            let known = on_plane.get(&plane).unwrap_or(&no_vertices);
            let cycles = assemble(&points, &rings, &normal, known, |v| {
                touches_frame || vertex_of[v].is_some()
            })
            .unwrap_or_else(|err| {
                warn!(plane, %err, "facet pieces do not chain, keeping them apart");
                rings
                    .into_iter()
                    .map(|vertices| FacetCycle {
                        vertices,
                        holes: Vec::new(),
                    })
                    .collect()
            });
            for cycle in cycles {
                facets.push(SkeletonFacet {
                    plane,
                    below,
                    on,
                    above,
                    outer: cycle.vertices,
                    holes: cycle.holes,
                    touches_frame,
                });
            }
        }

        let mut roots = BTreeSet::new();
        for i in 0..volume_of.len() {
            roots.insert(volumes.find(i));
        }

        let skeleton = Skeleton {
            points,
            vertices,
            edges,
            facets,
            volumes: roots.len(),
            bounded,
            violation: piece_violation.or(edge_violation).or(vertex_violation),
        };
        debug!(
            cells = cells.len(),
            vertices = skeleton.vertices.len(),
            edges = skeleton.edges.len(),
            facets = skeleton.facets.len(),
            volumes = skeleton.volumes,
            "derived skeleton"
        );
        skeleton
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

fn witness<T: Scalar>(points: &[Point3<T>], ring: &[usize]) -> [f64; 3] {
    centroid(ring.iter().map(|&v| &points[v]))
        .map(|c| c.to_f64())
        .unwrap_or_default()
}

/// Direction with a positive leading coordinate and the point of the line
/// closest to the origin.
fn line_key<T: Scalar>(a: &Point3<T>, axis: &Vector3<T>) -> (Vector3<T>, Point3<T>) {
    let mut d = axis.direction_key();
    if d.coords.iter().find(|c| c.sign() != Sign::Zero).is_some_and(|c| c.sign() == Sign::Negative) {
        d = -d;
    }
    let v = a.as_vector();
    let t = v.dot(&d) / d.dot(&d);
    let base = Point3::from_vector(&v - &d.scale(&t));
    (d, base)
}

/// Members of `candidates` strictly inside the segment from `a` to `b`,
/// ordered from `a`.
fn between<T: Scalar>(points: &[Point3<T>], a: usize, b: usize, candidates: &[usize]) -> Vec<usize> {
    let u = &points[b] - &points[a];
    let length = u.dot(&u);
    let mut inside: Vec<(T, usize)> = candidates
        .iter()
        .filter_map(|&c| {
            let w = &points[c] - &points[a];
            if !u.cross(&w).is_zero() {
                return None;
            }
            let t = w.dot(&u);
            (t.is_positive() && t < length).then_some((t, c))
        })
        .collect();
    inside.sort();
    inside.dedup();
    inside.into_iter().map(|(_, c)| c).collect()
}

/// Inserts into each edge of `cycle` the `candidates` lying on it.
fn subdivide<T: Scalar>(points: &[Point3<T>], cycle: &[usize], candidates: &[usize]) -> Vec<usize> {
    let n = cycle.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        out.push(cycle[i]);
        out.extend(between(points, cycle[i], cycle[(i + 1) % n], candidates));
    }
    out
}

/// Merges the convex pieces of one facet group into cycles with holes.
/// Points on a cycle are kept when `keep` says so or they are corners;
/// `vertices` lying on a cycle edge are threaded in first.
fn assemble<T, F>(
    points: &[Point3<T>],
    rings: &[Vec<usize>],
    normal: &Vector3<T>,
    vertices: &[usize],
    keep: F,
) -> NefResult<Vec<FacetCycle>>
where
    T: Scalar,
    F: Fn(usize) -> bool,
{
    // Pieces meet edge to edge only after T-junctions are split.
    let corners: Vec<usize> = rings.iter().flatten().copied().collect::<BTreeSet<_>>().into_iter().collect();
    let rings: Vec<Vec<usize>> = rings.iter().map(|r| subdivide(points, r, &corners)).collect();
    let cycles = chain_cycles(points, &rings, normal)?
        .into_iter()
        .map(|cycle| {
            let cycle = subdivide(points, &cycle, vertices);
            let n = cycle.len();
            (0..n)
                .filter(|&i| keep(cycle[i]) || is_corner(points, cycle[(i + n - 1) % n], cycle[i], cycle[(i + 1) % n]))
                .map(|i| cycle[i])
                .collect()
        })
        .collect();
    nest_cycles(points, cycles, normal)
}

/// Cancels edges shared by coplanar pieces and links the remaining edges
/// into cycles. At a point with several outgoing edges the leftmost turn
/// is taken, so a cycle never crosses into a neighbouring region of the
/// same plane that only touches it at that point.
fn chain_cycles<T: Scalar>(
    points: &[Point3<T>],
    polygons: &[Vec<usize>],
    normal: &Vector3<T>,
) -> NefResult<Vec<Vec<usize>>> {
    let mut count: AHashMap<(usize, usize), usize> = AHashMap::new();
    for polygon in polygons {
        let n = polygon.len();
        for i in 0..n {
            let (a, b) = (polygon[i], polygon[(i + 1) % n]);
            let reverse = count.get(&(b, a)).copied().unwrap_or(0);
            if reverse > 0 {
                count.insert((b, a), reverse - 1);
            } else {
                *count.entry((a, b)).or_insert(0) += 1;
            }
        }
    }
    let mut remaining: BTreeSet<(usize, usize)> = count
        .into_iter()
        .filter(|&(_, c)| c > 0)
        .map(|(e, _)| e)
        .collect();

    let mut cycles = Vec::new();
    while let Some(start) = remaining.pop_first() {
        let (first, second) = start;
        let mut cycle = vec![first];
        let (mut prev, mut cur) = start;
        loop {
            let back = &points[prev] - &points[cur];
            let mut candidates: Vec<usize> = remaining
                .range((cur, 0)..=(cur, usize::MAX))
                .map(|&(_, b)| b)
                .collect();
            if cur == first {
                candidates.push(second);
            }
            let next = candidates
                .into_iter()
                .max_by(|&a, &b| {
                    compare_angle_around(normal, &back, &(&points[a] - &points[cur]), &(&points[b] - &points[cur]))
                })
                .ok_or_else(|| NefError::topology(format!("facet cycle breaks at point {}", cur)))?;
            if cur == first && next == second {
                break;
            }
            remaining.remove(&(cur, next));
            cycle.push(cur);
            prev = cur;
            cur = next;
        }
        cycles.push(cycle);
    }
    Ok(cycles)
}

/// `b` is a corner unless `a → b → c` runs straight on.
fn is_corner<T: Scalar>(points: &[Point3<T>], a: usize, b: usize, c: usize) -> bool {
    let u = &points[b] - &points[a];
    let w = &points[c] - &points[b];
    !u.cross(&w).is_zero() || u.dot(&w).sign() != Sign::Positive
}

/// Splits the cycles of one facet group into outer cycles (counter-clockwise
/// around `normal`) and holes, each hole attached to the smallest outer
/// cycle containing it.
fn nest_cycles<T: Scalar>(
    points: &[Point3<T>],
    cycles: Vec<Vec<usize>>,
    normal: &Vector3<T>,
) -> NefResult<Vec<FacetCycle>> {
    let axis = normal.dominant_axis();
    let mut outers: Vec<(T, FacetCycle)> = Vec::new();
    let mut holes: Vec<Vec<usize>> = Vec::new();
    for cycle in cycles {
        let area = polygon_normal(cycle.iter().map(|&v| &points[v])).dot(normal);
        match area.sign() {
            Sign::Positive => outers.push((
                area,
                FacetCycle {
                    vertices: cycle,
                    holes: Vec::new(),
                },
            )),
            Sign::Negative => holes.push(cycle),
            Sign::Zero => {
                return Err(NefError::topology("degenerate facet cycle"));
            }
        }
    }

    for hole in holes {
        let mut best: Option<usize> = None;
        for (k, (area, outer)) in outers.iter().enumerate() {
            let ring: Vec<_> = outer.vertices.iter().map(|&v| points[v].project(axis)).collect();
            if !encloses(points, &ring, &hole, axis) {
                continue;
            }
            if best.is_none_or(|b| area < &outers[b].0) {
                best = Some(k);
            }
        }
        let k = best.ok_or_else(|| NefError::topology("hole outside every facet cycle"))?;
        debug!(hole = hole.len(), outer = outers[k].1.vertices.len(), "attached hole");
        outers[k].1.holes.push(hole);
    }
    Ok(outers.into_iter().map(|(_, f)| f).collect())
}

fn encloses<T: Scalar>(points: &[Point3<T>], ring: &[Point2<T>], hole: &[usize], axis: usize) -> bool {
    let vertices = hole.iter().map(|&v| points[v].clone());
    let midpoints = (0..hole.len()).map(|i| points[hole[i]].midpoint(&points[hole[(i + 1) % hole.len()]]));
    for p in vertices.chain(midpoints) {
        match locate_in_ring2d(ring, &p.project(axis)) {
            TrianglePosition::Inside => return true,
            TrianglePosition::Outside => return false,
            TrianglePosition::OnBoundary => {}
        }
    }
    false
}
