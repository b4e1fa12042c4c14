//! Orbit controller state machine and reset determinism across mixed
//! input sequences.

use approx::assert_relative_eq;
use cgmath::{EuclideanSpace, InnerSpace, Point3};
use test_case::test_case;
use web_time::Duration;

use voxel_sandbox::engine_state::camera_state::camera::{
    DEFAULT_PHI, DEFAULT_RADIUS, DEFAULT_THETA, MAX_DISTANCE, MIN_DISTANCE, PHI_MAX, PHI_MIN,
};
use voxel_sandbox::engine_state::camera_state::{
    ControllerState, MoveCommand, OrbitController, PointerButton,
};

fn assert_at_reset_pose(controller: &OrbitController) {
    assert_relative_eq!(controller.camera.radius, DEFAULT_RADIUS);
    assert_relative_eq!(controller.camera.theta, DEFAULT_THETA);
    assert_relative_eq!(controller.camera.phi, DEFAULT_PHI);
    assert_relative_eq!(
        controller.camera.target.to_vec().magnitude(),
        0.0,
        epsilon = 1e-6
    );
}

#[test_case(PointerButton::Primary, ControllerState::Orbiting)]
#[test_case(PointerButton::Secondary, ControllerState::Panning)]
#[test_case(PointerButton::Middle, ControllerState::Panning)]
fn button_press_enters_expected_state(button: PointerButton, expected: ControllerState) {
    let mut controller = OrbitController::new();
    controller.pointer_down(button);
    assert_eq!(controller.state(), expected);
    controller.pointer_up();
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[test]
fn orbit_drag_changes_angles_only() {
    let mut controller = OrbitController::new();
    controller.pointer_down(PointerButton::Primary);
    controller.pointer_delta(50.0, 30.0);

    assert!(controller.camera.theta != DEFAULT_THETA);
    assert!(controller.camera.phi != DEFAULT_PHI);
    assert_relative_eq!(controller.camera.radius, DEFAULT_RADIUS);
    assert_relative_eq!(
        controller.camera.target.to_vec().magnitude(),
        0.0,
        epsilon = 1e-6
    );
}

#[test]
fn pan_drag_moves_target_and_keeps_orbit_center() {
    let mut controller = OrbitController::new();
    controller.pointer_down(PointerButton::Secondary);
    controller.pointer_delta(40.0, -10.0);
    let panned_target = controller.camera.target;
    assert!(panned_target.to_vec().magnitude() > 0.0);

    // Subsequent orbiting revolves around the panned target.
    controller.pointer_up();
    controller.pointer_down(PointerButton::Primary);
    controller.pointer_delta(25.0, 0.0);
    assert_eq!(controller.camera.target, panned_target);
}

#[test]
fn wheel_zoom_is_single_shot_and_stateless() {
    let mut controller = OrbitController::new();
    let before = controller.camera.radius;
    controller.wheel(2.0);
    assert!(controller.camera.radius > before);
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[test]
fn radius_respects_clamp_under_repeated_zoom() {
    let mut controller = OrbitController::new();
    for _ in 0..200 {
        controller.wheel(5.0);
    }
    assert_relative_eq!(controller.camera.radius, MAX_DISTANCE);
    for _ in 0..200 {
        controller.wheel(-5.0);
    }
    assert_relative_eq!(controller.camera.radius, MIN_DISTANCE);
}

#[test]
fn phi_respects_pole_clamp_under_violent_orbit() {
    let mut controller = OrbitController::new();
    controller.pointer_down(PointerButton::Primary);
    for _ in 0..500 {
        controller.pointer_delta(0.0, 100.0);
    }
    assert_relative_eq!(controller.camera.phi, PHI_MAX);
    for _ in 0..500 {
        controller.pointer_delta(0.0, -100.0);
    }
    assert_relative_eq!(controller.camera.phi, PHI_MIN);
}

#[test]
fn pinch_gesture_lifecycle() {
    let mut controller = OrbitController::new();
    controller.pinch_start(120.0);
    assert_eq!(
        controller.state(),
        ControllerState::Zooming {
            last_pinch_distance: 120.0
        }
    );

    let before = controller.camera.radius;
    controller.pinch_move(180.0);
    assert!(controller.camera.radius < before, "fingers apart zooms in");
    assert_eq!(
        controller.state(),
        ControllerState::Zooming {
            last_pinch_distance: 180.0
        }
    );

    controller.touch_end();
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[test]
fn keyboard_commands_apply_in_any_pointer_state() {
    let mut controller = OrbitController::new();
    controller.pinch_start(100.0);
    controller.command(MoveCommand::Up);
    assert_relative_eq!(controller.camera.target.y, 2.0);
    assert!(matches!(
        controller.state(),
        ControllerState::Zooming { .. }
    ));
}

#[test]
fn reset_is_deterministic_after_arbitrary_sequences() {
    let sequences: [&dyn Fn(&mut OrbitController); 3] = [
        &|controller| {
            controller.pointer_down(PointerButton::Primary);
            controller.pointer_delta(300.0, -120.0);
            controller.pointer_up();
        },
        &|controller| {
            controller.pointer_down(PointerButton::Secondary);
            controller.pointer_delta(-80.0, 45.0);
            controller.pointer_up();
            controller.wheel(-4.0);
        },
        &|controller| {
            controller.pinch_start(60.0);
            controller.pinch_move(10.0);
            controller.touch_end();
            controller.command(MoveCommand::Forward);
            controller.command(MoveCommand::Left);
            controller.focus_on(Point3::new(9.0, 9.0, 9.0), Some(42.0));
            controller.update(Duration::from_millis(200));
        },
    ];

    for sequence in sequences {
        let mut controller = OrbitController::new();
        sequence(&mut controller);
        controller.command(MoveCommand::Reset);
        assert_at_reset_pose(&controller);

        // Reset also cancels any in-flight focus animation.
        controller.update(Duration::from_millis(500));
        assert_at_reset_pose(&controller);
    }
}
