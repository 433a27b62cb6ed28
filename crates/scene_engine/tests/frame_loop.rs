//! Frame loop integration tests
//!
//! Drives the whole engine headlessly: scene built from RON, animated,
//! propagated and submitted to the recording backend.

use approx::assert_relative_eq;
use scene_engine::prelude::*;
use scene_engine::render::api::{uniforms, UniformValue};
use scene_engine::render::FrameUniforms;
use scene_engine::scene::GeometryRef;

const ROOM: &str = r#"
    SceneDescription(
        camera: Fixed(position: (0.0, 2.0, -20.0), pitch: 0.3, yaw: 0.1),
        occluder: Some((node: "ball", radius: 3.0)),
        nodes: [
            (
                name: "room",
                position: (0.0, -10.0, -80.0),
                kind: Geometry(mesh: Cube(dimensions: (180.0, 90.0, 90.0), tiling: true, inverted: true)),
            ),
            (
                name: "ball",
                parent: Some("room"),
                position: (0.0, 5.0, 0.0),
                kind: Geometry(mesh: Sphere(radius: 3.0, slices: 8, layers: 8)),
                motion: Some(Spin(rates: (0.0, 2.0, 0.0))),
            ),
            (
                name: "light",
                position: (10.0, 20.0, -40.0),
                kind: PointLight(light_id: 0, color: (1.0, 1.0, 1.0)),
            ),
            (
                name: "slab",
                kind: Geometry(mesh: Model(path: "slab.obj")),
            ),
        ],
    )
"#;

fn quad() -> Mesh {
    Mesh::new(
        vec![
            Vertex::new([-1.0, -1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([1.0, -1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([1.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex::new([-1.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
        ],
        vec![0, 1, 2, 0, 2, 3],
    )
}

fn room_engine() -> Engine<RecordingBackend> {
    scene_engine::foundation::logging::init_for_tests();
    let description = SceneDescription::from_ron(ROOM).unwrap();
    let mut assets = InMemoryAssets::new().with_model("slab.obj", quad());
    Engine::initialize(EngineConfig::default(), RecordingBackend::new(), &mut assets, &description).unwrap()
}

#[test]
fn test_frame_draws_pre_order_then_screen_quad() {
    let mut engine = room_engine();
    let mut platform = HeadlessPlatform::new(1366, 768, 100);

    platform.poll_events();
    engine.update_frame(0.016, &platform);
    engine.backend_mut().clear_log();
    let stats = engine.render_frame(platform.window_size());

    assert_eq!(stats.draw_calls, 3);
    assert_eq!(stats.lights_bound, 1);
    assert_eq!(stats.indices_submitted, 36 + 8 * 8 * 6 + 6);

    let pipeline = engine.pipeline();
    let draws = engine.backend().draw_calls();
    let counts: Vec<u32> = draws.iter().map(|draw| draw.count).collect();
    assert_eq!(counts, vec![36, 384, 6, 6]);
    assert!(draws[..3].iter().all(|draw| draw.indexed && draw.depth_test));
    assert!(draws[..3].iter().all(|draw| draw.target == Some(pipeline.targets().target)));

    let quad = &draws[3];
    assert!(!quad.indexed);
    assert_eq!(quad.target, None);
    assert_eq!(quad.program, Some(pipeline.post_program()));
}

#[test]
fn test_occluder_and_light_follow_world_positions() {
    let mut engine = room_engine();
    let mut platform = HeadlessPlatform::new(1366, 768, 100);

    platform.poll_events();
    engine.update_frame(0.016, &platform);
    engine.backend_mut().clear_log();
    engine.render_frame(platform.window_size());

    let (position, radius) = engine.frame_uniforms().occluder.unwrap();
    assert_relative_eq!(position, Vec3::new(0.0, -5.0, -80.0), epsilon = 1e-4);
    assert_relative_eq!(radius, 3.0);

    let first = &engine.backend().draw_calls()[0];
    assert_eq!(first.uniform(uniforms::OCCLUDER_RADIUS), Some(UniformValue::Float(3.0)));
    assert_eq!(
        first.uniform(uniforms::CAMERA_POSITION),
        Some(UniformValue::Vec3(Vec3::new(0.0, 2.0, -20.0)))
    );

    let program = engine.pipeline().scene_program();
    let location = engine
        .backend()
        .uniform_location(program, &uniforms::light_position_name(0))
        .unwrap();
    let Some(UniformValue::Vec3(light)) = engine.backend().uniform(program, location) else {
        panic!("light position should be bound");
    };
    assert_relative_eq!(light, Vec3::new(10.0, 20.0, -40.0), epsilon = 1e-4);
}

#[test]
fn test_scripted_clicks_start_and_pause() {
    let mut engine = room_engine();
    let mut platform = HeadlessPlatform::new(800, 600, 100).with_script([
        vec![MouseButton::Left],
        vec![],
        vec![MouseButton::Right],
        vec![],
        vec![MouseButton::Right],
    ]);

    let mut states = Vec::new();
    for _ in 0..5 {
        platform.poll_events();
        states.push(engine.update_frame(0.5, &platform));
    }

    let game_states: Vec<GameState> = states.iter().map(|state| state.game_state).collect();
    assert_eq!(
        game_states,
        vec![
            GameState::Running,
            GameState::Running,
            GameState::Paused,
            GameState::Paused,
            GameState::Running,
        ]
    );
    // the start frame resets both clocks; paused frames only move the total clock
    assert_relative_eq!(states[4].game_elapsed, 1.0);
    assert_relative_eq!(states[4].total_elapsed, 2.0);
}

#[test]
fn test_run_until_platform_closes() {
    let mut engine = room_engine();
    let mut platform = HeadlessPlatform::new(1366, 768, 4);

    let summary = engine.run(&mut platform);

    assert_eq!(summary.frames, 4);
    assert_eq!(platform.presented_frames(), 4);
    assert_eq!(summary.last_frame.draw_calls, 3);
}

#[test]
fn test_single_geometry_under_identity_camera() {
    let mut backend = RecordingBackend::new();
    let program = backend.load_program(&ShaderSource::new("scene.vert", "scene.frag")).unwrap();
    let mesh = quad();
    let handle = backend.register_mesh(&mesh).unwrap();

    let mut graph = SceneGraph::new();
    graph
        .add_child(
            NodeId::ROOT,
            SceneNode::new(NodeKind::Geometry {
                geometry: Some(GeometryRef { mesh: handle, index_count: 6 }),
            }),
        )
        .unwrap();

    propagate_scene(&mut graph, &Mat4::identity());
    backend.use_program(program);
    let frame = FrameUniforms { camera_position: Vec3::zeros(), occluder: None };
    let stats = RenderDispatcher::new().render_scene(&mut backend, program, &graph, &frame);

    assert_eq!(stats.draw_calls, 1);
    let draws = backend.draw_calls();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].count, 6);
    assert_eq!(draws[0].uniform(uniforms::MVP), Some(UniformValue::Mat4(Mat4::identity())));
    assert_eq!(draws[0].uniform(uniforms::MODEL), Some(UniformValue::Mat4(Mat4::identity())));
}
