//! Narrow-phase intersection tests and contact generation.
//!
//! Every generator has the same contract: given primitives with up-to-date
//! world transforms and a [`ContactSet`] with remaining capacity, write
//! `0..=k` contacts (never past the capacity) and return how many were
//! written. Disjoint pairs and full buffers both yield 0 — the silent
//! bounded-return convention of the whole pipeline.
//!
//! Box–box pairs go through the Separating Axis Theorem over 15 candidate
//! axes: each box's three face normals and the nine pairwise cross products
//! of their axes. Near-parallel cross products are skipped as numerically
//! unreliable rather than treated as separating.

use nalgebra::{Point3, Vector3};

use anvil_contact::ContactSet;

use crate::primitive::{CollisionPrimitive, PrimitiveShape};

/// Cross-product axes with squared magnitude below this are skipped.
const CROSS_AXIS_EPSILON: f64 = 1e-4;

/// Squared-distance threshold below which a closest point is treated as
/// coincident with the sphere centre.
const COINCIDENT_EPSILON: f64 = 1e-12;

/// World axes of an oriented box plus its half-extents and centre, cached
/// once per pair test.
struct Obb {
    axes: [Vector3<f64>; 3],
    half_extents: Vector3<f64>,
    center: Point3<f64>,
}

impl Obb {
    fn new(primitive: &CollisionPrimitive, half_extents: Vector3<f64>) -> Self {
        let rotation = primitive.rotation_matrix();
        Self {
            axes: [
                rotation.column(0).into_owned(),
                rotation.column(1).into_owned(),
                rotation.column(2).into_owned(),
            ],
            half_extents,
            center: primitive.position(),
        }
    }

    /// Half-length of the box's projection interval on `axis`.
    fn project_onto(&self, axis: &Vector3<f64>) -> f64 {
        self.half_extents.x * self.axes[0].dot(axis).abs()
            + self.half_extents.y * self.axes[1].dot(axis).abs()
            + self.half_extents.z * self.axes[2].dot(axis).abs()
    }
}

/// Signed overlap of the two boxes on `axis`: positive means overlap,
/// negative means `axis` separates them.
fn penetration_on_axis(one: &Obb, two: &Obb, axis: &Vector3<f64>, to_center: &Vector3<f64>) -> f64 {
    let one_project = one.project_onto(axis);
    let two_project = two.project_onto(axis);
    let distance = to_center.dot(axis).abs();

    one_project + two_project - distance
}

/// Test one candidate axis, tracking the smallest penetration seen so far.
///
/// Returns `false` when the axis separates the boxes. Degenerate axes
/// (near-parallel cross products) are skipped without being treated as
/// separating.
#[allow(clippy::too_many_arguments)]
fn try_axis(
    one: &Obb,
    two: &Obb,
    axis: Vector3<f64>,
    to_center: &Vector3<f64>,
    index: usize,
    smallest_penetration: &mut f64,
    smallest_case: &mut Option<usize>,
) -> bool {
    if axis.norm_squared() < CROSS_AXIS_EPSILON {
        return true;
    }
    let axis = axis.normalize();

    let penetration = penetration_on_axis(one, two, &axis, to_center);
    if penetration < 0.0 {
        return false;
    }
    if penetration < *smallest_penetration {
        *smallest_penetration = penetration;
        *smallest_case = Some(index);
    }
    true
}

// --- fast yes/no intersection tests ------------------------------------

/// Whether two sphere primitives overlap (strictly).
#[must_use]
pub fn spheres_intersect(one: &CollisionPrimitive, two: &CollisionPrimitive) -> bool {
    let (&PrimitiveShape::Sphere { radius: radius_one }, &PrimitiveShape::Sphere { radius: radius_two }) =
        (one.shape(), two.shape())
    else {
        return false;
    };

    let distance_squared = (one.position() - two.position()).norm_squared();
    let radii = radius_one + radius_two;
    distance_squared < radii * radii
}

/// Whether a sphere reaches into a half-space.
#[must_use]
pub fn sphere_and_half_space_intersect(
    sphere: &CollisionPrimitive,
    plane: &CollisionPrimitive,
) -> bool {
    let (&PrimitiveShape::Sphere { radius }, &PrimitiveShape::Plane { normal, offset }) =
        (sphere.shape(), plane.shape())
    else {
        return false;
    };

    normal.dot(&sphere.position().coords) - radius < offset
}

/// Whether a box reaches into a half-space, via its projection interval.
#[must_use]
pub fn box_and_half_space_intersect(
    box_prim: &CollisionPrimitive,
    plane: &CollisionPrimitive,
) -> bool {
    let (&PrimitiveShape::Box { half_extents }, &PrimitiveShape::Plane { normal, offset }) =
        (box_prim.shape(), plane.shape())
    else {
        return false;
    };

    let obb = Obb::new(box_prim, half_extents);
    let projected_radius = obb.project_onto(&normal);
    let distance = normal.dot(&box_prim.position().coords) - projected_radius;

    distance <= offset
}

/// Whether two boxes overlap on all fifteen separating-axis candidates.
#[must_use]
pub fn boxes_intersect(one: &CollisionPrimitive, two: &CollisionPrimitive) -> bool {
    let (&PrimitiveShape::Box { half_extents: h_one }, &PrimitiveShape::Box { half_extents: h_two }) =
        (one.shape(), two.shape())
    else {
        return false;
    };

    let box_one = Obb::new(one, h_one);
    let box_two = Obb::new(two, h_two);
    let to_center = box_two.center - box_one.center;

    let mut smallest = f64::MAX;
    let mut case = None;

    for i in 0..3 {
        if !try_axis(&box_one, &box_two, box_one.axes[i], &to_center, i, &mut smallest, &mut case) {
            return false;
        }
        if !try_axis(
            &box_one,
            &box_two,
            box_two.axes[i],
            &to_center,
            3 + i,
            &mut smallest,
            &mut case,
        ) {
            return false;
        }
    }
    for i in 0..3 {
        for j in 0..3 {
            let axis = box_one.axes[i].cross(&box_two.axes[j]);
            if !try_axis(
                &box_one,
                &box_two,
                axis,
                &to_center,
                6 + i * 3 + j,
                &mut smallest,
                &mut case,
            ) {
                return false;
            }
        }
    }
    true
}

// --- contact generation -------------------------------------------------

/// Generate contacts for an arbitrary primitive pair.
///
/// Dispatches exhaustively on the shape pair; two half-spaces never
/// produce contacts.
pub fn generate_contacts(
    one: &CollisionPrimitive,
    two: &CollisionPrimitive,
    data: &mut ContactSet,
) -> usize {
    use PrimitiveShape::{Box, Plane, Sphere};

    match (one.shape(), two.shape()) {
        (Sphere { .. }, Sphere { .. }) => sphere_and_sphere(one, two, data),
        (Sphere { .. }, Plane { .. }) => sphere_and_half_space(one, two, data),
        (Plane { .. }, Sphere { .. }) => sphere_and_half_space(two, one, data),
        (Box { .. }, Plane { .. }) => box_and_half_space(one, two, data),
        (Plane { .. }, Box { .. }) => box_and_half_space(two, one, data),
        (Box { .. }, Sphere { .. }) => box_and_sphere(one, two, data),
        (Sphere { .. }, Box { .. }) => box_and_sphere(two, one, data),
        (Box { .. }, Box { .. }) => box_and_box(one, two, data),
        (Plane { .. }, Plane { .. }) => 0,
    }
}

/// Sphere–sphere contact: one contact at the midpoint between centres.
pub fn sphere_and_sphere(
    one: &CollisionPrimitive,
    two: &CollisionPrimitive,
    data: &mut ContactSet,
) -> usize {
    let (&PrimitiveShape::Sphere { radius: radius_one }, &PrimitiveShape::Sphere { radius: radius_two }) =
        (one.shape(), two.shape())
    else {
        return 0;
    };
    if !data.has_room() {
        return 0;
    }

    let position_one = one.position();
    let position_two = two.position();

    let midline = position_one - position_two;
    let distance = midline.norm();
    if distance <= 0.0 || distance >= radius_one + radius_two {
        return 0;
    }

    let normal = midline / distance;
    let point = Point3::from((position_one.coords + position_two.coords) * 0.5);

    data.add(
        [one.body(), two.body()],
        point,
        normal,
        radius_one + radius_two - distance,
    )
}

/// Sphere–half-space contact.
///
/// The half-space is solid: a sphere entirely behind the plane still
/// generates a contact pushing it back out along the plane normal.
pub fn sphere_and_half_space(
    sphere: &CollisionPrimitive,
    plane: &CollisionPrimitive,
    data: &mut ContactSet,
) -> usize {
    let (&PrimitiveShape::Sphere { radius }, &PrimitiveShape::Plane { normal, offset }) =
        (sphere.shape(), plane.shape())
    else {
        return 0;
    };
    if !data.has_room() {
        return 0;
    }

    let center = sphere.position();
    let distance = normal.dot(&center.coords) - radius - offset;
    if distance >= 0.0 {
        return 0;
    }

    let point = center - normal * (distance + radius);
    data.add([sphere.body(), plane.body()], point, normal, -distance)
}

/// Box–half-space contacts: one per submerged vertex, up to the buffer
/// limit. A box resting flat on the plane yields exactly four.
pub fn box_and_half_space(
    box_prim: &CollisionPrimitive,
    plane: &CollisionPrimitive,
    data: &mut ContactSet,
) -> usize {
    let (&PrimitiveShape::Box { half_extents }, &PrimitiveShape::Plane { normal, offset }) =
        (box_prim.shape(), plane.shape())
    else {
        return 0;
    };
    if !data.has_room() {
        return 0;
    }
    if !box_and_half_space_intersect(box_prim, plane) {
        return 0;
    }

    // Each signed combination of the half-extents is one vertex.
    const VERTEX_MULTS: [[f64; 3]; 8] = [
        [1.0, 1.0, 1.0],
        [-1.0, 1.0, 1.0],
        [1.0, -1.0, 1.0],
        [-1.0, -1.0, 1.0],
        [1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [1.0, -1.0, -1.0],
        [-1.0, -1.0, -1.0],
    ];

    let mut written = 0;
    for mults in VERTEX_MULTS {
        let local = Point3::new(
            mults[0] * half_extents.x,
            mults[1] * half_extents.y,
            mults[2] * half_extents.z,
        );
        let vertex = box_prim.transform() * local;

        let vertex_distance = vertex.coords.dot(&normal);
        if vertex_distance <= offset {
            // Contact point halfway between the vertex and the plane.
            let point = vertex + normal * ((offset - vertex_distance) * 0.5);
            written += data.add(
                [box_prim.body(), plane.body()],
                point,
                normal,
                offset - vertex_distance,
            );
            if !data.has_room() {
                return written;
            }
        }
    }
    written
}

/// Box–sphere contact via the closest point on the box to the sphere
/// centre.
pub fn box_and_sphere(
    box_prim: &CollisionPrimitive,
    sphere: &CollisionPrimitive,
    data: &mut ContactSet,
) -> usize {
    let (&PrimitiveShape::Box { half_extents }, &PrimitiveShape::Sphere { radius }) =
        (box_prim.shape(), sphere.shape())
    else {
        return 0;
    };
    if !data.has_room() {
        return 0;
    }

    // Work in box-local space so the box is axis-aligned.
    let center = sphere.position();
    let relative_center = box_prim.transform().inverse_transform_point(&center);

    if relative_center.x.abs() - radius > half_extents.x
        || relative_center.y.abs() - radius > half_extents.y
        || relative_center.z.abs() - radius > half_extents.z
    {
        return 0;
    }

    let mut closest = Point3::new(
        relative_center.x.clamp(-half_extents.x, half_extents.x),
        relative_center.y.clamp(-half_extents.y, half_extents.y),
        relative_center.z.clamp(-half_extents.z, half_extents.z),
    );

    let distance_squared = (closest - relative_center).norm_squared();
    if distance_squared > radius * radius {
        return 0;
    }

    if distance_squared < COINCIDENT_EPSILON {
        // Sphere centre inside the box: the clamp left the closest point on
        // the centre itself, so push out through the face of least depth
        // instead of normalizing a zero-length vector.
        let mut axis = 0;
        let mut min_depth = half_extents.x - relative_center.x.abs();
        for i in 1..3 {
            let depth = half_extents[i] - relative_center[i].abs();
            if depth < min_depth {
                min_depth = depth;
                axis = i;
            }
        }
        let sign = if relative_center[axis] < 0.0 { -1.0 } else { 1.0 };
        closest[axis] = sign * half_extents[axis];

        let closest_world = box_prim.transform() * closest;
        let normal = box_prim.axis(axis) * sign;
        return data.add(
            [box_prim.body(), sphere.body()],
            closest_world,
            normal,
            radius + min_depth,
        );
    }

    let closest_world = box_prim.transform() * closest;
    let normal = (closest_world - center).normalize();

    data.add(
        [box_prim.body(), sphere.body()],
        closest_world,
        normal,
        radius - distance_squared.sqrt(),
    )
}

/// Closest point between two finite edge segments, for edge–edge box
/// contacts.
///
/// Falls back to one edge's anchor point when the lines are parallel or
/// the closest approach lies outside either segment; `use_one` picks which
/// anchor, based on which box's face axis had the shallower penetration.
#[allow(clippy::too_many_arguments)]
fn closest_point_on_edges(
    p_one: &Point3<f64>,
    d_one: &Vector3<f64>,
    one_size: f64,
    p_two: &Point3<f64>,
    d_two: &Vector3<f64>,
    two_size: f64,
    use_one: bool,
) -> Point3<f64> {
    let sm_one = d_one.norm_squared();
    let sm_two = d_two.norm_squared();
    let dp_one_two = d_two.dot(d_one);

    let to_st = p_one - p_two;
    let dp_sta_one = d_one.dot(&to_st);
    let dp_sta_two = d_two.dot(&to_st);

    let denom = sm_one * sm_two - dp_one_two * dp_one_two;

    // Parallel lines have no unique closest point.
    if denom.abs() < 1e-4 {
        return if use_one { *p_one } else { *p_two };
    }

    let mua = (dp_one_two * dp_sta_two - sm_two * dp_sta_one) / denom;
    let mub = (sm_one * dp_sta_two - dp_one_two * dp_sta_one) / denom;

    // Closest approach outside either edge means this is really an
    // edge-face contact; use the known on-edge anchor.
    if mua > one_size || mua < -one_size || mub > two_size || mub < -two_size {
        if use_one {
            *p_one
        } else {
            *p_two
        }
    } else {
        let c_one = p_one + d_one * mua;
        let c_two = p_two + d_two * mub;
        Point3::from((c_one.coords + c_two.coords) * 0.5)
    }
}

/// Fill the contact for a vertex of `vertex_box` touching a face of
/// `face_box` (SAT cases 0–5).
#[allow(clippy::too_many_arguments)]
fn point_face_contact(
    face_prim: &CollisionPrimitive,
    face_box: &Obb,
    vertex_prim: &CollisionPrimitive,
    vertex_box: &Obb,
    to_center: &Vector3<f64>,
    axis_index: usize,
    penetration: f64,
    data: &mut ContactSet,
) -> usize {
    // The winning axis names the face pair; pick the face pointing at the
    // other box.
    let mut normal = face_box.axes[axis_index];
    if normal.dot(to_center) > 0.0 {
        normal = -normal;
    }

    // The touching vertex is the one whose half-extent signs all point
    // against the contact normal.
    let mut vertex = vertex_box.half_extents;
    for i in 0..3 {
        if vertex_box.axes[i].dot(&normal) < 0.0 {
            vertex[i] = -vertex[i];
        }
    }

    let point = vertex_prim.transform() * Point3::from(vertex);
    data.add(
        [face_prim.body(), vertex_prim.body()],
        point,
        normal,
        penetration,
    )
}

/// Box–box contact via the Separating Axis Theorem.
///
/// Returns 0 as soon as any axis separates the boxes. Otherwise the axis of
/// least interpenetration classifies the contact: cases 0–2 put a vertex of
/// `two` on a face of `one`, cases 3–5 the symmetric opposite, and cases 6
/// and up are edge–edge. Each classified case writes exactly one contact.
pub fn box_and_box(
    one: &CollisionPrimitive,
    two: &CollisionPrimitive,
    data: &mut ContactSet,
) -> usize {
    let (&PrimitiveShape::Box { half_extents: h_one }, &PrimitiveShape::Box { half_extents: h_two }) =
        (one.shape(), two.shape())
    else {
        return 0;
    };
    if !data.has_room() {
        return 0;
    }

    let box_one = Obb::new(one, h_one);
    let box_two = Obb::new(two, h_two);
    let to_center = box_two.center - box_one.center;

    let mut penetration = f64::MAX;
    let mut best: Option<usize> = None;

    // Face axes of box one, then box two.
    for i in 0..3 {
        if !try_axis(
            &box_one,
            &box_two,
            box_one.axes[i],
            &to_center,
            i,
            &mut penetration,
            &mut best,
        ) {
            return 0;
        }
    }
    for i in 0..3 {
        if !try_axis(
            &box_one,
            &box_two,
            box_two.axes[i],
            &to_center,
            3 + i,
            &mut penetration,
            &mut best,
        ) {
            return 0;
        }
    }

    // Remember the best of the face axes alone; the edge-edge case uses it
    // to pick an anchor when the edges turn out nearly parallel.
    let best_single_axis = best;

    for i in 0..3 {
        for j in 0..3 {
            let axis = box_one.axes[i].cross(&box_two.axes[j]);
            if !try_axis(
                &box_one,
                &box_two,
                axis,
                &to_center,
                6 + i * 3 + j,
                &mut penetration,
                &mut best,
            ) {
                return 0;
            }
        }
    }

    let Some(best) = best else {
        return 0;
    };

    if best < 3 {
        // Vertex of box two on a face of box one.
        point_face_contact(one, &box_one, two, &box_two, &to_center, best, penetration, data)
    } else if best < 6 {
        // Vertex of box one on a face of box two: same algorithm with the
        // boxes (and the centre line) swapped.
        point_face_contact(
            two,
            &box_two,
            one,
            &box_one,
            &(-to_center),
            best - 3,
            penetration,
            data,
        )
    } else {
        // Edge-edge contact.
        let best = best - 6;
        let one_axis_index = best / 3;
        let two_axis_index = best % 3;
        let one_axis = box_one.axes[one_axis_index];
        let two_axis = box_two.axes[two_axis_index];

        // The contact axis is the common perpendicular, pointing from box
        // one toward box two.
        let mut axis = one_axis.cross(&two_axis).normalize();
        if axis.dot(&to_center) > 0.0 {
            axis = -axis;
        }

        // Each box has four edges parallel to the contact axis; find the
        // one nearest the other box by picking, per free axis, the
        // half-extent sign pointing against the contact axis.
        let mut pt_on_one_edge = box_one.half_extents;
        let mut pt_on_two_edge = box_two.half_extents;
        for i in 0..3 {
            if i == one_axis_index {
                pt_on_one_edge[i] = 0.0;
            } else if box_one.axes[i].dot(&axis) > 0.0 {
                pt_on_one_edge[i] = -pt_on_one_edge[i];
            }

            if i == two_axis_index {
                pt_on_two_edge[i] = 0.0;
            } else if box_two.axes[i].dot(&axis) < 0.0 {
                pt_on_two_edge[i] = -pt_on_two_edge[i];
            }
        }

        let pt_one = one.transform() * Point3::from(pt_on_one_edge);
        let pt_two = two.transform() * Point3::from(pt_on_two_edge);

        let point = closest_point_on_edges(
            &pt_one,
            &one_axis,
            box_one.half_extents[one_axis_index],
            &pt_two,
            &two_axis,
            box_two.half_extents[two_axis_index],
            best_single_axis.is_some_and(|index| index > 2),
        );

        data.add([one.body(), two.body()], point, axis, penetration)
    }
}
