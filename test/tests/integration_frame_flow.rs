/// INTEGRATION TESTS: scene batch → store → world → renderer writes → scene
use scenesync_bridge::{BridgeConfig, BridgeError};
use scenesync_shared::{BatchKind, CrdtMessage, NO_SYNC_COMPONENT_ID};
use scenesync_test::{
    assert_component, assert_no_entity, build_batch, read_batch, scene_entity, TestHarness,
    TestMessageBuilder, MESH_COMPONENT, POINTER_EVENTS_COMPONENT, TAG_COMPONENT,
    TRANSFORM_COMPONENT,
};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

#[test]
fn scene_changes_reach_world_on_next_frame() {
    init_logger();
    let mut harness = TestHarness::default();
    let port = harness.add_scene(1);
    let entity = scene_entity(512);

    let batch = build_batch(
        BatchKind::Crdt,
        &[
            TestMessageBuilder::new(entity)
                .component(TRANSFORM_COMPONENT)
                .timestamp(1)
                .put(&[1, 2, 3]),
            TestMessageBuilder::new(entity)
                .component(MESH_COMPONENT)
                .timestamp(1)
                .put(&[9]),
        ],
    );
    port.send_to_renderer(&batch).unwrap();

    // nothing touches the world outside a frame
    assert_eq!(harness.world.entity_count(), 0);

    harness.run_frame();

    assert_eq!(harness.world.entity_count(), 1);
    assert_component!(harness.world, entity, TRANSFORM_COMPONENT, [1, 2, 3]);
    assert_component!(harness.world, entity, MESH_COMPONENT, [9]);
}

#[test]
fn stale_and_collapsed_changes_are_not_applied() {
    init_logger();
    let mut harness = TestHarness::default();
    let port = harness.add_scene(1);
    let entity = scene_entity(512);
    let transform = TestMessageBuilder::new(entity).component(TRANSFORM_COMPONENT);

    port.send_to_renderer(&build_batch(
        BatchKind::Crdt,
        &[transform.timestamp(5).put(&[5])],
    ))
    .unwrap();
    harness.run_frame();

    let transform = TestMessageBuilder::new(entity).component(TRANSFORM_COMPONENT);
    let mesh = TestMessageBuilder::new(entity).component(MESH_COMPONENT);
    port.send_to_renderer(&build_batch(
        BatchKind::Crdt,
        &[
            transform.timestamp(4).put(&[4]),
            mesh.timestamp(1).put(&[1]),
            TestMessageBuilder::new(entity)
                .component(MESH_COMPONENT)
                .timestamp(2)
                .delete(),
        ],
    ))
    .unwrap();
    let writes_before = harness.world.writes;
    harness.run_frame();

    assert_component!(harness.world, entity, TRANSFORM_COMPONENT, [5]);
    assert_eq!(harness.world.component(entity, MESH_COMPONENT), None);
    assert_eq!(harness.world.writes, writes_before);
}

#[test]
fn renderer_writes_flow_back_to_scene() {
    init_logger();
    let mut harness = TestHarness::default();
    let port = harness.add_scene(7);
    let entity = scene_entity(600);

    port.send_to_renderer(&build_batch(
        BatchKind::Crdt,
        &[TestMessageBuilder::new(entity)
            .component(TRANSFORM_COMPONENT)
            .timestamp(1)
            .put(&[1])],
    ))
    .unwrap();

    harness.driver.begin_frame(&mut harness.world).unwrap();
    let bridge = harness.driver.bridge_mut(7).unwrap();
    bridge.put_component(entity, POINTER_EVENTS_COMPONENT, &[0xEE]);
    bridge.append_component(entity, POINTER_EVENTS_COMPONENT + 10, &[1]);
    assert_eq!(harness.driver.end_frame(&harness.world), 2);

    let response = port
        .send_to_renderer(&build_batch(BatchKind::Crdt, &[]))
        .unwrap();
    let (kind, messages) = read_batch(&response);

    assert_eq!(kind, BatchKind::Crdt);
    assert_eq!(
        messages,
        vec![
            CrdtMessage::put(entity, POINTER_EVENTS_COMPONENT, 0, vec![0xEE]),
            CrdtMessage::append(entity, POINTER_EVENTS_COMPONENT + 10, 0, vec![1]),
        ]
    );

    // delivered once
    let (_, messages) = read_batch(&port.send_to_renderer(&[BatchKind::Crdt.to_u8()]).unwrap());
    assert!(messages.is_empty());
}

#[test]
fn state_request_returns_full_state() {
    init_logger();
    let mut harness = TestHarness::default();
    let port = harness.add_scene(1);
    let entity = scene_entity(512);

    port.send_to_renderer(&build_batch(
        BatchKind::Crdt,
        &[
            TestMessageBuilder::new(entity)
                .component(TRANSFORM_COMPONENT)
                .timestamp(3)
                .put(&[3]),
            TestMessageBuilder::new(scene_entity(513)).delete_entity(),
        ],
    ))
    .unwrap();

    let (kind, messages) = read_batch(
        &port
            .send_to_renderer(&[BatchKind::ReqCrdtState.to_u8()])
            .unwrap(),
    );

    assert_eq!(kind, BatchKind::ResCrdtState);
    assert_eq!(
        messages,
        vec![
            CrdtMessage::delete_entity(scene_entity(513)),
            CrdtMessage::put(entity, TRANSFORM_COMPONENT, 3, vec![3]),
        ]
    );
    assert_eq!(read_batch(&port.get_state().unwrap()).1, messages);
    harness.run_frame();
}

#[test]
fn no_sync_network_puts_never_reach_the_store() {
    init_logger();
    let mut harness = TestHarness::default();
    let port = harness.add_scene(1);
    let entity = scene_entity(512);

    port.send_to_renderer(&build_batch(
        BatchKind::Crdt,
        &[TestMessageBuilder::new(entity)
            .component(NO_SYNC_COMPONENT_ID)
            .timestamp(1)
            .network(3)
            .put(&[1])],
    ))
    .unwrap();

    let state = port.shared().state();
    assert!(state.protocol().slot(entity, NO_SYNC_COMPONENT_ID).is_none());
    assert_eq!(state.pending_buffers(), 0);
}

#[test]
fn malformed_tail_keeps_good_prefix() {
    init_logger();
    let mut harness = TestHarness::default();
    let port = harness.add_scene(1);
    let entity = scene_entity(512);

    let mut batch = build_batch(
        BatchKind::Crdt,
        &[TestMessageBuilder::new(entity)
            .component(TRANSFORM_COMPONENT)
            .timestamp(1)
            .put(&[1])],
    );
    // a complete header with an unknown type
    batch.extend([8, 0, 0, 0, 42, 0, 0, 0]);

    port.send_to_renderer(&batch).unwrap();
    harness.run_frame();

    assert_component!(harness.world, entity, TRANSFORM_COMPONENT, [1]);
}

#[test]
fn invalid_payloads_and_unknown_components_are_skipped() {
    init_logger();
    let mut harness = TestHarness::default();
    let port = harness.add_scene(1);
    let entity = scene_entity(512);

    port.send_to_renderer(&build_batch(
        BatchKind::Crdt,
        &[
            TestMessageBuilder::new(entity)
                .component(TAG_COMPONENT)
                .timestamp(1)
                .put(&[1, 2]),
            TestMessageBuilder::new(entity)
                .component(999)
                .timestamp(1)
                .put(&[1]),
        ],
    ))
    .unwrap();
    harness.run_frame();

    assert_no_entity!(harness.world, entity);

    port.send_to_renderer(&build_batch(
        BatchKind::Crdt,
        &[TestMessageBuilder::new(entity)
            .component(TAG_COMPONENT)
            .timestamp(2)
            .put(&[1, 2, 3, 4])],
    ))
    .unwrap();
    harness.run_frame();

    assert_component!(harness.world, entity, TAG_COMPONENT, [1, 2, 3, 4]);
}

#[test]
fn ingest_budget_defers_to_later_frames() {
    init_logger();
    let mut harness = TestHarness::new(BridgeConfig {
        ingest_ops_per_frame: Some(2),
        ..BridgeConfig::default()
    });
    let port = harness.add_scene(1);

    let messages: Vec<CrdtMessage<'static>> = (0..5u16)
        .map(|offset| {
            TestMessageBuilder::new(scene_entity(512 + offset))
                .component(TRANSFORM_COMPONENT)
                .timestamp(1)
                .put(&[offset as u8])
        })
        .collect();
    port.send_to_renderer(&build_batch(BatchKind::Crdt, &messages))
        .unwrap();

    let report = harness.driver.begin_frame(&mut harness.world).unwrap();
    harness.driver.end_frame(&harness.world);
    assert_eq!(report.ingested.applied, 2);
    assert_eq!(report.ingested.deferred, 3);

    harness.run_frame();
    harness.run_frame();
    assert_eq!(harness.world.entity_count(), 5);
}

#[test]
fn shared_budget_reaches_every_scene() {
    init_logger();
    let mut harness = TestHarness::new(BridgeConfig {
        ingest_ops_per_frame: Some(2),
        ..BridgeConfig::default()
    });
    let busy = harness.add_scene(1);
    let quiet = harness.add_scene(2);
    let quiet_entity = scene_entity(600);

    quiet
        .send_to_renderer(&build_batch(
            BatchKind::Crdt,
            &[TestMessageBuilder::new(quiet_entity)
                .component(TRANSFORM_COMPONENT)
                .timestamp(1)
                .put(&[7])],
        ))
        .unwrap();

    for frame in 0..50u32 {
        let messages: Vec<CrdtMessage<'static>> = (0..2u16)
            .map(|offset| {
                TestMessageBuilder::new(scene_entity(512 + offset))
                    .component(TRANSFORM_COMPONENT)
                    .timestamp(frame + 1)
                    .put(&[frame as u8])
            })
            .collect();
        busy.send_to_renderer(&build_batch(BatchKind::Crdt, &messages))
            .unwrap();
        harness.run_frame();
    }

    assert_eq!(harness.driver.bridge(2).map(|bridge| bridge.pending()), Some(0));
    assert!(harness.world.object_for(quiet_entity).is_some());
    assert_component!(harness.world, quiet_entity, TRANSFORM_COMPONENT, [7]);
}

#[test]
fn state_request_ignores_trailing_messages() {
    init_logger();
    let mut harness = TestHarness::default();
    let port = harness.add_scene(1);
    let entity = scene_entity(512);

    let request = build_batch(
        BatchKind::ReqCrdtState,
        &[
            TestMessageBuilder::new(entity)
                .component(TRANSFORM_COMPONENT)
                .timestamp(1)
                .put(&[1]),
            TestMessageBuilder::new(entity)
                .component(NO_SYNC_COMPONENT_ID)
                .timestamp(1)
                .network(3)
                .put(&[2]),
        ],
    );
    let (kind, messages) = read_batch(&port.send_to_renderer(&request).unwrap());

    assert_eq!(kind, BatchKind::ResCrdtState);
    assert!(messages.is_empty());
    {
        let state = port.shared().state();
        assert_eq!(state.protocol().messages_count(), 0);
        assert_eq!(state.pending_buffers(), 0);
    }

    harness.run_frame();
    assert_no_entity!(harness.world, entity);
}

#[test]
fn unknown_batch_kind_is_an_error() {
    init_logger();
    let mut harness = TestHarness::default();
    let port = harness.add_scene(1);

    assert!(matches!(
        port.send_to_renderer(&[9]),
        Err(BridgeError::BatchKind(_))
    ));
    assert!(matches!(
        port.send_to_renderer(&[]),
        Err(BridgeError::EmptyBatch)
    ));
}
