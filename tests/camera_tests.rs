/// Camera basis and control tests
use approx::assert_relative_eq;
use glam::Vec3;
use splat_engine::camera::basis_from_angles;
use splat_engine::*;

fn assert_orthonormal(camera: &Camera) {
    let (f, r, u) = (camera.front(), camera.right(), camera.up());
    assert_relative_eq!(f.length(), 1.0, epsilon = 1e-5);
    assert_relative_eq!(r.length(), 1.0, epsilon = 1e-5);
    assert_relative_eq!(u.length(), 1.0, epsilon = 1e-5);
    assert_relative_eq!(f.dot(r), 0.0, epsilon = 1e-5);
    assert_relative_eq!(f.dot(u), 0.0, epsilon = 1e-5);
    assert_relative_eq!(r.dot(u), 0.0, epsilon = 1e-5);
    // Right-handed: right x front = up
    assert_relative_eq!((r.cross(f) - u).length(), 0.0, epsilon = 1e-5);
}

#[test]
fn basis_is_orthonormal_across_orientations() {
    let mut yaw = -360.0;
    while yaw <= 360.0 {
        let mut pitch = -89.0;
        while pitch <= 89.0 {
            assert_orthonormal(&Camera::new(Vec3::ZERO, yaw, pitch));
            pitch += 17.8;
        }
        yaw += 22.5;
    }
}

#[test]
fn front_follows_spherical_angles() {
    let camera = Camera::new(Vec3::ZERO, 90.0, 0.0);
    assert_relative_eq!(camera.front().z, 1.0, epsilon = 1e-6);

    let camera = Camera::new(Vec3::ZERO, 0.0, 45.0);
    let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
    assert_relative_eq!((camera.front() - expected).length(), 0.0, epsilon = 1e-6);
    // Up tilts backwards when pitching up
    assert!(camera.up().x < 0.0);
}

#[test]
fn look_delta_applies_sensitivity_and_refreshes_basis() {
    let mut camera = Camera::new(Vec3::ZERO, 0.0, 0.0);
    camera.apply_look_delta(900.0, 0.0, true);
    assert_relative_eq!(camera.yaw(), 90.0, epsilon = 1e-4);

    let (front, right, up) = basis_from_angles(camera.yaw(), camera.pitch());
    assert_eq!(camera.front(), front);
    assert_eq!(camera.right(), right);
    assert_eq!(camera.up(), up);
}

#[test]
fn constrained_pitch_is_clamped() {
    let mut camera = Camera::default();
    camera.apply_look_delta(0.0, 5_000.0, true);
    assert_eq!(camera.pitch(), 89.0);
    assert_orthonormal(&camera);

    camera.apply_look_delta(0.0, -50_000.0, true);
    assert_eq!(camera.pitch(), -89.0);
    assert_orthonormal(&camera);
}

#[test]
fn unconstrained_pitch_is_free() {
    let mut camera = Camera::default();
    camera.apply_look_delta(0.0, 1_200.0, false);
    assert_relative_eq!(camera.pitch(), 120.0, epsilon = 1e-4);
    assert!(camera.front().is_finite());
}

#[test]
fn set_orientation_refreshes_basis() {
    let mut camera = Camera::default();
    camera.set_orientation(0.0, 0.0);
    assert_eq!(camera.front(), Vec3::X);
    assert_eq!(camera.right(), Vec3::Z);
}

#[test]
fn custom_config_changes_sensitivities() {
    let config = CameraConfig {
        movement_multiplier: 1.0,
        mouse_sensitivity: 1.0,
        pitch_limit: 30.0,
    };
    let mut camera = Camera::with_config(Vec3::ZERO, 0.0, 0.0, config);
    camera.move_along(CameraMovement::Forward, 3.0);
    assert_relative_eq!(camera.position.x, 3.0);

    camera.apply_look_delta(10.0, 45.0, true);
    assert_relative_eq!(camera.yaw(), 10.0);
    assert_eq!(camera.pitch(), 30.0);
}

#[test]
fn world_to_camera_matches_renderer_transform() {
    let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), 37.0, -12.0);
    let view = rendering::FrameView::new(&camera, 64, 64, 90.0);
    let point = Vec3::new(-4.0, 0.5, 9.0);
    assert_eq!(camera.world_to_camera(point), view.to_camera_space(point));
}
