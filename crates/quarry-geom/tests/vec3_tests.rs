use quarry_geom::{IVec3, Vec3};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn vec3_add_sub_neg() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(-4.0, 5.0, -6.0);
    let c = a + b;
    assert!(vec3_approx_eq(c, Vec3::new(-3.0, 7.0, -3.0), 1e-6));
    assert!(vec3_approx_eq(c - a, b, 1e-6));
    assert!(vec3_approx_eq(-a, Vec3::new(-1.0, -2.0, -3.0), 1e-6));
}

#[test]
fn vec3_normalized_zero_is_noop() {
    let v = Vec3::new(3.0, 4.0, 0.0);
    assert!(vec3_approx_eq(v.normalized(), Vec3::new(0.6, 0.8, 0.0), 1e-6));
    assert!(vec3_approx_eq(Vec3::ZERO.normalized(), Vec3::ZERO, 1e-6));
}

#[test]
fn rounding_picks_nearest_voxel_center() {
    // A hit on the +X face of voxel (2,0,0) sits at x = 2.5.
    let hit = Vec3::new(2.5, 0.2, -0.3);
    let normal = Vec3::new(1.0, 0.0, 0.0);
    assert_eq!((hit - normal * 0.05).round_to_ivec(), IVec3::new(2, 0, 0));
    assert_eq!((hit + normal * 0.05).round_to_ivec(), IVec3::new(3, 0, 0));
}

#[test]
fn flooring_handles_negatives() {
    assert_eq!(Vec3::new(-0.5, 0.5, -16.0).floor_to_ivec(), IVec3::new(-1, 0, -16));
}
