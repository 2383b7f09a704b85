//! Demo of prop attachment without a window
//!
//! Builds a small arm with an idle and a pickup clip, then plays a scripted
//! sequence of key presses: 2 to start the pickup, and 1 to go back to idle
//! after the prop has been attached for a while. The prop position is logged
//! every half second of simulated time, so run with `RUST_LOG=info`.
//!
//! Frame deltas come from a `FrameClock` fed with simulated instants one
//! frame step apart, so the output is the same on every run.
//!
//! An optional argument names a YAML file with `AttachConfig` values.
use bonemount::{
    animation::{
        Animation, BoneChannel, Clip, Interpolation, Keyframe, Skeleton, Trs,
    },
    config::AttachConfig,
    frame_clock::FrameClock,
    keyboard::Keyboard,
    session::Session,
    types::{Movement, MovementHandler},
    util,
};
use log::info;
use nalgebra_glm as glm;
use std::{
    f32::consts::FRAC_PI_2,
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};
use winit::event::VirtualKeyCode;

const SIM_RATE: f32 = 1.0 / 30.0;
const FRAMES: usize = 180;
const PRESS_2_FRAME: usize = 15;
const PRESS_1_FRAME: usize = 150;
const CAMERA_SPEED: f32 = 2.5;
const MAX_DELTA: f32 = 0.1;

/// Stands in for a camera
#[derive(Default)]
struct Camera {
    position: glm::Vec3,
}

impl MovementHandler for Camera {
    fn movement(&mut self, movement: Movement, delta: f32) {
        let step = CAMERA_SPEED * delta;
        match movement {
            Movement::Forward => self.position.z -= step,
            Movement::Backward => self.position.z += step,
            Movement::Left => self.position.x -= step,
            Movement::Right => self.position.x += step,
        }
    }
}

fn arm() -> Arc<Skeleton> {
    let up = Trs {
        translation: glm::vec3(0.0, 0.3, 0.0),
        ..Trs::default()
    };
    Arc::new(Skeleton::from_bind_pose(
        "arm",
        &[
            ("mixamorig_Hips", None, Trs::default()),
            ("mixamorig_RightForeArm", Some(0), up),
            ("mixamorig_RightHand", Some(1), up),
            ("mixamorig_RightHandThumb3", Some(2), up),
        ],
    ))
}

fn clips() -> (Clip, Clip) {
    let skeleton = arm();

    let mut bob = BoneChannel::new(Interpolation::Linear);
    bob.translations = vec![
        Keyframe::new(0.0, glm::Vec3::zeros()),
        Keyframe::new(30.0, glm::vec3(0.0, 0.05, 0.0)),
        Keyframe::new(60.0, glm::Vec3::zeros()),
    ];
    // Times in frames at 30 ticks per second
    let idle = Animation::new("idle", 60.0, 30.0).with_channel(0, bob);

    let mut lift = BoneChannel::new(Interpolation::Linear);
    lift.rotations = vec![
        Keyframe::new(0.0, glm::Quat::identity()),
        Keyframe::new(
            1.5,
            glm::quat_angle_axis(-FRAC_PI_2, &glm::vec3(1.0, 0.0, 0.0)),
        ),
        Keyframe::new(3.0, glm::Quat::identity()),
    ];
    let pickup = Animation::new("pickup", 3.0, 1.0).with_channel(1, lift);

    (
        Clip::new(skeleton.clone(), idle).unwrap(),
        Clip::new(skeleton, pickup).unwrap(),
    )
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let config = if args.len() < 2 {
        AttachConfig::default()
    } else {
        AttachConfig::load(Path::new(&args[1])).unwrap()
    };

    let (idle, pickup) = clips();
    let mut session = Session::new(&config, idle, pickup).unwrap();
    let mut keyboard = Keyboard::new();
    let mut camera = Camera::default();
    let mut clock = FrameClock::new().with_max_delta(MAX_DELTA);
    let start = Instant::now();
    let step = Duration::from_secs_f32(SIM_RATE);

    for frame in 0..FRAMES {
        let now = start + step * u32::try_from(frame).unwrap();
        let delta = clock.delta_at(now);
        keyboard.set(VirtualKeyCode::Key2, frame == PRESS_2_FRAME);
        keyboard.set(VirtualKeyCode::Key1, frame == PRESS_1_FRAME);
        keyboard.set(VirtualKeyCode::W, frame < 10);

        let prop = session.frame(&keyboard, delta, &mut camera).prop;
        if frame % 15 == 0 {
            match prop {
                Some(prop) => info!(
                    "frame {frame} {:?} prop at {:?}",
                    session.mode(),
                    util::transform(&glm::Vec3::zeros(), &prop)
                ),
                None => info!("frame {frame} {:?}", session.mode()),
            }
        }
        keyboard.tick();
        if session.close_requested() {
            break;
        }
    }
    info!(
        "camera ended at {:?} after {} frames",
        camera.position,
        clock.frame_count()
    );
}
