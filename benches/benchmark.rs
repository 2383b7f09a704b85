//! Recommend using with
//! `RUSTFLAGS="-C target-cpu=x86-64-v2" cargo bench`
//!
//! Compares the cost of a playback tick, which walks the whole hierarchy,
//! with the cost of recovering one bone's transform from its final matrix.
//! The second is what the attachment controller does every frame instead of
//! walking the hierarchy again.

use bonemount::{
    animation::{
        Animation, BoneChannel, Clip, Interpolation, Keyframe, Playback,
        Skeleton, Trs,
    },
    attachment,
    config::AttachConfig,
    session::Session,
    trigger::Command,
    types::ClipSlot,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra_glm as glm;
use std::sync::Arc;

const CHAIN: usize = 64;
const SIM_RATE: f32 = 1.0 / 60.0;

/// A long chain of joints, each one unit above its parent and rotating
fn use_this_clip() -> Clip {
    let names: Vec<String> = (0..CHAIN).map(|i| format!("bone{i}")).collect();
    let up = Trs {
        translation: glm::vec3(0.0, 1.0, 0.0),
        ..Trs::default()
    };
    let joints: Vec<(&str, Option<usize>, Trs)> = names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i.checked_sub(1), up))
        .collect();
    let skeleton = Arc::new(Skeleton::from_bind_pose("chain", &joints));

    let mut animation = Animation::new("wave", 2.0, 1.0);
    for bone in 0..CHAIN {
        let mut channel = BoneChannel::new(Interpolation::Linear);
        channel.rotations = vec![
            Keyframe::new(0.0, glm::Quat::identity()),
            Keyframe::new(
                1.0,
                glm::quat_angle_axis(0.1, &glm::vec3(0.0, 0.0, 1.0)),
            ),
            Keyframe::new(2.0, glm::Quat::identity()),
        ];
        animation = animation.with_channel(bone, channel);
    }
    Clip::new(skeleton, animation).unwrap()
}

fn playback_tick(c: &mut Criterion) {
    let mut playback = Playback::new(vec![use_this_clip()]).unwrap();
    c.bench_function(
        "playback tick", //
        |b| b.iter(|| playback.tick(black_box(SIM_RATE))),
    );
}

fn bone_global(c: &mut Criterion) {
    let mut playback = Playback::new(vec![use_this_clip()]).unwrap();
    playback.tick(0.7);
    let final_matrix = black_box(playback.final_matrices()[CHAIN - 1]);
    let offset = black_box(
        playback.active_clip().skeleton().joints[CHAIN - 1].inv_bind,
    );
    c.bench_function(
        "bone global", //
        |b| b.iter(|| attachment::bone_global(&final_matrix, &offset)),
    );
}

fn session_frame(c: &mut Criterion) {
    let config = AttachConfig {
        bone_name: format!("bone{}", CHAIN - 1),
        ..AttachConfig::default()
    };
    let mut session =
        Session::new(&config, use_this_clip(), use_this_clip()).unwrap();
    session.apply(Command::SwitchClip(ClipSlot::Secondary));
    session.advance(3.0);
    c.bench_function(
        "attached session frame", //
        |b| {
            b.iter(|| {
                let _ = session.advance(black_box(SIM_RATE)).prop;
            })
        },
    );
}

criterion_group!(benches, playback_tick, bone_global, session_frame);
criterion_main!(benches);
