use std::time::Duration;

use cgmath::{Deg, InnerSpace, Rad};
use reflect_ngin::camera::{
    Axis, Camera, CameraController, CameraUniform, DEFAULT_FOV, MAX_FOV, MAX_PITCH, MIN_FOV,
    Projection,
};

const EPS: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPS
}

#[test]
fn should_start_above_the_table_looking_down() {
    let camera = Camera::default();
    let eye = camera.eye();
    assert!(approx(eye.x, 0.0) && approx(eye.y, 5.0) && approx(eye.z, 10.0), "{eye:?}");
    assert!(approx(camera.pitch().0, Rad::from(Deg(12.0f32)).0));
}

#[test]
fn should_clamp_velocity_to_max_speed() {
    let mut camera = Camera::default();
    let mut controller = CameraController::default();
    controller.press(Axis::Z, 1.0);
    for _ in 0..10 {
        controller.update(&mut camera, Duration::from_secs(1));
    }
    assert!(approx(controller.velocity().z, 4.0));

    controller.set_boost(true);
    for _ in 0..10 {
        controller.update(&mut camera, Duration::from_secs(1));
    }
    assert!(approx(controller.velocity().z, 20.0));

    controller.press(Axis::Z, -1.0);
    for _ in 0..20 {
        controller.update(&mut camera, Duration::from_secs(1));
    }
    assert!(approx(controller.velocity().z, -20.0));
}

#[test]
fn should_stop_an_axis_on_release() {
    let mut camera = Camera::default();
    let mut controller = CameraController::default();
    controller.press(Axis::X, 1.0);
    controller.press(Axis::Y, -1.0);
    controller.update(&mut camera, Duration::from_millis(500));
    assert!(controller.velocity().x > 0.0);
    assert!(controller.velocity().y < 0.0);

    controller.release(Axis::X);
    assert_eq!(controller.velocity().x, 0.0);
    assert!(controller.velocity().y < 0.0);

    let before = camera.eye();
    controller.release(Axis::Y);
    controller.update(&mut camera, Duration::from_secs(1));
    assert!((camera.eye() - before).magnitude() < EPS);
}

#[test]
fn should_move_forward_without_sinking() {
    let mut camera = Camera::default();
    let mut controller = CameraController::default();
    controller.press(Axis::Z, 1.0);
    // v = 4 * 0.5 = 2 u/s, moved 1 unit
    controller.update(&mut camera, Duration::from_millis(500));
    let eye = camera.eye();
    assert!(approx(eye.y, 5.0), "pitch leaked into motion: {eye:?}");
    assert!(approx(eye.z, 9.0), "{eye:?}");
    assert!(approx(camera.pitch().0, Rad::from(Deg(12.0f32)).0));
}

#[test]
fn should_strafe_left_on_positive_x() {
    let mut camera = Camera::default();
    let mut controller = CameraController::default();
    controller.press(Axis::X, 1.0);
    controller.update(&mut camera, Duration::from_millis(500));
    assert!(camera.eye().x < 0.0);
}

#[test]
fn should_limit_pitch_when_looking_around() {
    let mut camera = Camera::default();
    let controller = CameraController::default();
    let max = Rad::from(MAX_PITCH).0;
    for _ in 0..40 {
        assert!(controller.look(&mut camera, 0.0, 50.0));
        assert!(camera.pitch().0 <= max + EPS);
    }
    assert!(approx(camera.pitch().0, max));

    for _ in 0..80 {
        assert!(controller.look(&mut camera, 10.0, -50.0));
        assert!(camera.pitch().0 >= -max - EPS);
    }
    assert!(approx(camera.pitch().0, -max));
}

#[test]
fn should_keep_the_eye_in_place_when_looking_around() {
    let mut camera = Camera::default();
    let controller = CameraController::default();
    controller.look(&mut camera, 40.0, -20.0);
    controller.look(&mut camera, -15.0, 30.0);
    let eye = camera.eye();
    assert!(approx(eye.x, 0.0) && approx(eye.y, 5.0) && approx(eye.z, 10.0), "{eye:?}");
}

#[test]
fn should_ignore_pointer_jumps() {
    let mut camera = Camera::default();
    let controller = CameraController::default();
    let before = camera.clone();
    assert!(!controller.look(&mut camera, 100.0, 0.0));
    assert!(!controller.look(&mut camera, 0.0, -61.0));
    assert_eq!(camera, before);
}

#[test]
fn should_clamp_field_of_view() {
    let mut projection = Projection::new(1280, 720, DEFAULT_FOV, 0.02, 1000.0);
    projection.zoom(1.0);
    assert_eq!(projection.fovy(), Deg(55.0));

    for _ in 0..100 {
        projection.zoom(1.0);
    }
    assert_eq!(projection.fovy(), MIN_FOV);

    for _ in 0..100 {
        projection.zoom(-1.0);
    }
    assert_eq!(projection.fovy(), MAX_FOV);

    projection.reset_fov();
    assert_eq!(projection.fovy(), DEFAULT_FOV);
}

#[test]
fn should_follow_window_aspect() {
    let mut projection = Projection::new(1280, 720, DEFAULT_FOV, 0.02, 1000.0);
    assert!(approx(projection.aspect(), 1280.0 / 720.0));
    projection.resize(500, 1000);
    assert!(approx(projection.aspect(), 0.5));
    // a minimised window must not divide by zero
    projection.resize(500, 0);
    assert!(projection.aspect().is_finite());
}

#[test]
fn should_enable_reflections_for_the_main_camera() {
    let camera = Camera::default();
    let projection = Projection::new(800, 600, DEFAULT_FOV, 0.02, 1000.0);
    let mut uniform = CameraUniform::new();
    uniform.update_view_proj(&camera, &projection);
    assert_eq!(uniform.eye[3], 1.0);
    assert!(approx(uniform.eye[1], 5.0));
}
