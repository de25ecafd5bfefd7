/// INTEGRATION TESTS: scene threads and the renderer sharing the frame gate
use std::{
    thread,
    time::{Duration, Instant},
};

use scenesync_bridge::{AcquireOutcome, BridgeConfig, BridgeError, GateConfig, GateMode};
use scenesync_shared::BatchKind;
use scenesync_test::{
    assert_component, build_batch, read_batch, scene_entity, TestHarness, TestMessageBuilder,
    TRANSFORM_COMPONENT,
};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn wait_for(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition never became true");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn scene_blocks_until_renderer_ends_frame() {
    init_logger();
    let mut harness = TestHarness::default();
    let port = harness.add_scene(1);
    let entity = scene_entity(512);

    harness.driver.begin_frame(&mut harness.world).unwrap();
    assert!(harness.driver.is_in_frame());

    let scene = thread::spawn(move || {
        let batch = build_batch(
            BatchKind::Crdt,
            &[TestMessageBuilder::new(entity)
                .component(TRANSFORM_COMPONENT)
                .timestamp(1)
                .put(&[9])],
        );
        port.send_to_renderer(&batch)
    });

    let gate = harness.gate.clone();
    wait_for(|| gate.waiting() == 1);
    assert!(!scene.is_finished());
    assert!(harness.world.object_for(entity).is_none());

    harness.driver.end_frame(&harness.world);
    let response = scene.join().unwrap().unwrap();
    let (kind, messages) = read_batch(&response);
    assert_eq!(kind, BatchKind::Crdt);
    assert!(messages.is_empty());

    harness.run_frame();
    assert_component!(harness.world, entity, TRANSFORM_COMPONENT, [9]);
}

#[test]
fn reject_mode_refuses_scene_during_frame() {
    let mut harness = TestHarness::new(BridgeConfig {
        gate: GateConfig {
            mode: GateMode::Reject,
            max_wait: None,
        },
        ..Default::default()
    });
    let port = harness.add_scene(1);

    harness.driver.begin_frame(&mut harness.world).unwrap();
    let error = port
        .send_to_renderer(&[BatchKind::Crdt.to_u8()])
        .unwrap_err();
    assert!(matches!(
        error,
        BridgeError::GateUnavailable {
            outcome: AcquireOutcome::Rejected,
            ..
        }
    ));
    assert_eq!(
        format!("{}", error),
        "Frame gate could not be acquired by `scene-1#1`: Rejected"
    );

    harness.driver.end_frame(&harness.world);
    assert!(port.send_to_renderer(&[BatchKind::Crdt.to_u8()]).is_ok());
}

#[test]
fn bounded_wait_times_out() {
    let mut harness = TestHarness::new(BridgeConfig {
        gate: GateConfig {
            mode: GateMode::Block,
            max_wait: Some(Duration::from_millis(20)),
        },
        ..Default::default()
    });
    let port = harness.add_scene(1);

    harness.driver.begin_frame(&mut harness.world).unwrap();
    let started = Instant::now();
    let result = port.get_state();
    assert!(started.elapsed() >= Duration::from_millis(20));
    assert!(matches!(
        result,
        Err(BridgeError::GateUnavailable {
            outcome: AcquireOutcome::TimedOut,
            ..
        })
    ));
    assert_eq!(harness.gate.waiting(), 0);
    harness.driver.end_frame(&harness.world);
}

#[test]
fn renderer_is_refused_a_second_frame_while_scene_holds_gate() {
    let mut harness = TestHarness::new(BridgeConfig {
        gate: GateConfig {
            mode: GateMode::Reject,
            max_wait: None,
        },
        ..Default::default()
    });
    let port = harness.add_scene(1);

    let scene_owner = port.shared().owner().clone();
    let guard = harness.gate.lock(&scene_owner).unwrap();
    assert_eq!(
        harness.driver.begin_frame(&mut harness.world).unwrap_err(),
        AcquireOutcome::Rejected
    );
    assert!(!harness.driver.is_in_frame());
    drop(guard);

    assert!(harness.driver.begin_frame(&mut harness.world).is_ok());
    harness.driver.end_frame(&harness.world);
}

#[test]
fn concurrent_scenes_converge_on_latest_writes() {
    init_logger();
    const WRITES: u32 = 40;

    let mut harness = TestHarness::default();
    let scenes: Vec<_> = (1..=3).map(|id| harness.add_scene(id)).collect();

    let threads: Vec<_> = scenes
        .into_iter()
        .enumerate()
        .map(|(index, port)| {
            thread::spawn(move || {
                let entity = scene_entity(512 + index as u16);
                for timestamp in 1..=WRITES {
                    let batch = build_batch(
                        BatchKind::Crdt,
                        &[TestMessageBuilder::new(entity)
                            .component(TRANSFORM_COMPONENT)
                            .timestamp(timestamp)
                            .put(&timestamp.to_le_bytes())],
                    );
                    port.send_to_renderer(&batch).unwrap();
                }
            })
        })
        .collect();

    while threads.iter().any(|scene| !scene.is_finished()) {
        harness.run_frame();
        thread::yield_now();
    }
    for scene in threads {
        scene.join().unwrap();
    }
    harness.run_frame();

    for index in 0..3u16 {
        assert_component!(
            harness.world,
            scene_entity(512 + index),
            TRANSFORM_COMPONENT,
            WRITES.to_le_bytes()
        );
    }
    assert!(!harness.gate.is_locked());
}
