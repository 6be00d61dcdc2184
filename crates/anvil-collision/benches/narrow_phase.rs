//! Microbenchmarks for the narrow-phase hot path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::{Isometry3, UnitQuaternion, Vector3};

use anvil_collision::{narrow_phase, CollisionPrimitive, ContactSet, PrimitiveShape};

fn box_pair() -> (CollisionPrimitive, CollisionPrimitive) {
    let one = CollisionPrimitive::new(
        PrimitiveShape::Box {
            half_extents: Vector3::new(1.0, 1.0, 1.0),
        },
        None,
        Isometry3::from_parts(
            Vector3::zeros().into(),
            UnitQuaternion::from_euler_angles(0.3, 0.1, 0.4),
        ),
    )
    .unwrap();
    let two = CollisionPrimitive::new(
        PrimitiveShape::Box {
            half_extents: Vector3::new(0.8, 1.2, 0.6),
        },
        None,
        Isometry3::from_parts(
            Vector3::new(1.4, 0.3, 0.2).into(),
            UnitQuaternion::from_euler_angles(0.0, 0.5, 0.2),
        ),
    )
    .unwrap();
    (one, two)
}

fn bench_narrow_phase(c: &mut Criterion) {
    let (box_one, box_two) = box_pair();
    let mut contacts = ContactSet::new(16);

    c.bench_function("box_and_box_sat", |b| {
        b.iter(|| {
            contacts.clear();
            narrow_phase::box_and_box(black_box(&box_one), black_box(&box_two), &mut contacts)
        });
    });

    let sphere_one = CollisionPrimitive::new(
        PrimitiveShape::Sphere { radius: 1.0 },
        None,
        Isometry3::translation(0.0, 0.0, 0.0),
    )
    .unwrap();
    let sphere_two = CollisionPrimitive::new(
        PrimitiveShape::Sphere { radius: 1.0 },
        None,
        Isometry3::translation(1.5, 0.0, 0.0),
    )
    .unwrap();

    c.bench_function("sphere_and_sphere", |b| {
        b.iter(|| {
            contacts.clear();
            narrow_phase::sphere_and_sphere(
                black_box(&sphere_one),
                black_box(&sphere_two),
                &mut contacts,
            )
        });
    });
}

criterion_group!(benches, bench_narrow_phase);
criterion_main!(benches);
