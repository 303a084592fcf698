//! End-to-end: OBJ through the converter and loader into a rendered frame

use std::fs;
use std::path::{Path, PathBuf};

use garage_renderer::assets::{convert, load_model, ModelFile};
use garage_renderer::prelude::*;
use garage_renderer::render::backends::Command;
use garage_renderer::render::{BlendMode, MeshHandle, RenderTarget};
use garage_renderer::scene::create_garage;
use tempfile::TempDir;

const MTL: &str = "\
newmtl paint
Ka 0.1 0.0 0.0
Kd 0.8 0.1 0.1
Ks 1.0 1.0 1.0
Ns 64.0
d 1.0

newmtl glass
Kd 0.6 0.7 0.9
Ns 128.0
d 0.4
";

/// A body triangle at the origin and two glass panes at z = +5 and z = -5
const OBJ: &str = "\
mtllib car.mtl
v -0.5 0.0 0.0
v 0.5 0.0 0.0
v 0.0 1.0 0.0
v -0.5 0.0 5.0
v 0.5 0.0 5.0
v 0.0 1.0 5.0
v -0.5 0.0 -5.0
v 0.5 0.0 -5.0
v 0.0 1.0 -5.0
vn 0.0 0.0 1.0
o body
usemtl paint
f 1//1 2//1 3//1
o glass_front
usemtl glass
f 4//1 5//1 6//1
o glass_back
usemtl glass
f 7//1 8//1 9//1
";

fn write_car(dir: &TempDir) -> (PathBuf, PathBuf) {
    fs::write(dir.path().join("car.mtl"), MTL).unwrap();
    let obj = dir.path().join("car.obj");
    fs::write(&obj, OBJ).unwrap();
    (obj, dir.path().join("car.model"))
}

fn forward_draws(commands: &[Command]) -> Vec<MeshHandle> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::Draw {
                mesh,
                target: RenderTarget::Window,
                blend: BlendMode::Alpha,
                ..
            } => Some(*mesh),
            _ => None,
        })
        .collect()
}

#[test]
fn test_converted_file_reads_back() {
    let dir = TempDir::new().unwrap();
    let (obj, model) = write_car(&dir);

    let written = convert(&obj, &model).unwrap();
    assert_eq!(written.objects.len(), 3);
    assert_eq!(written.materials.len(), 2);
    assert_eq!(written.vertices.len(), 9);

    let read = ModelFile::read_from_path(&model).unwrap();
    assert_eq!(read, written);
    assert_eq!(read.materials[1].alpha, 0.4);
    assert_eq!(read.objects[1].material_index, read.objects[2].material_index);
}

/// Two triangles sharing an edge, no material library, awkward float values
const BARE_QUAD: &str = "\
v 0.1 -2.75 0.001
v 1.3333334 -2.75 0.001
v 0.1 7.5e-3 -0.2
v 1.3333334 7.5e-3 -0.2
vn 0.0 0.57735026 0.8164966
vn -0.0 -1.0 0.0
f 1//1 2//1 3//1
f 3//2 2//2 4//2
";

#[test]
fn test_decoded_vertices_match_obj_input() {
    let dir = TempDir::new().unwrap();
    let obj = dir.path().join("quad.obj");
    let model = dir.path().join("quad.model");
    fs::write(&obj, BARE_QUAD).unwrap();
    convert(&obj, &model).unwrap();

    let positions = [
        [0.1, -2.75, 0.001],
        [1.333_333_4, -2.75, 0.001],
        [0.1, 7.5e-3, -0.2],
        [1.333_333_4, 7.5e-3, -0.2],
    ];
    let up = [0.0, 0.577_350_26, 0.816_496_6];
    let down = [-0.0, -1.0, 0.0];

    // Shared corners keep one vertex per distinct (position, normal)
    let expected = [
        (positions[0], up),
        (positions[1], up),
        (positions[2], up),
        (positions[2], down),
        (positions[1], down),
        (positions[3], down),
    ];

    let read = ModelFile::read_from_path(&model).unwrap();
    assert_eq!(read.vertices.len(), expected.len());
    for (vertex, (position, normal)) in read.vertices.iter().zip(expected) {
        assert_eq!(vertex.position.map(f32::to_bits), position.map(f32::to_bits));
        assert_eq!(vertex.normal.map(f32::to_bits), normal.map(f32::to_bits));
    }
    assert_eq!(read.objects.len(), 1);
    assert_eq!(read.objects[0].indices, vec![0, 1, 2, 3, 4, 5]);

    let mut device = HeadlessDevice::new();
    let loaded = load_model(&mut device, &model).unwrap();
    let uploaded = device.vertex_buffer(loaded.vertex_buffer()).unwrap();
    for (vertex, (position, normal)) in uploaded.iter().zip(expected) {
        assert_eq!(vertex.position, position);
        assert_eq!(vertex.normal.map(f32::to_bits), normal.map(f32::to_bits));
    }
}

#[test]
fn test_faces_without_material_decode_to_default_material() {
    let dir = TempDir::new().unwrap();
    let obj = dir.path().join("quad.obj");
    let model = dir.path().join("quad.model");
    fs::write(&obj, BARE_QUAD).unwrap();
    convert(&obj, &model).unwrap();

    let read = ModelFile::read_from_path(&model).unwrap();
    assert_eq!(read.materials.len(), 1);
    let material = read.materials[read.objects[0].material_index as usize];
    assert_eq!(material.ambient, Vec3::new(0.0, 0.0, 0.0));
    assert_eq!(material.diffuse, Vec3::new(1.0, 1.0, 1.0));
    assert_eq!(material.specular, Vec3::new(1.0, 1.0, 1.0));
    assert_eq!(material.specular_exponent, 1.0);
    assert_eq!(material.alpha, 1.0);

    let mut device = HeadlessDevice::new();
    let loaded = load_model(&mut device, &model).unwrap();
    assert_eq!(loaded.sub_object(0).unwrap().material, read.materials[0]);
}

#[test]
fn test_one_frame_of_the_converted_car() {
    let dir = TempDir::new().unwrap();
    let (obj, model) = write_car(&dir);
    convert(&obj, &model).unwrap();

    let config = DemoConfig::default();
    let mut context = RenderContext::new(HeadlessDevice::new(), &config.render, &config.assets).unwrap();
    let garage = create_garage(context.device_mut());
    let car = load_model(context.device_mut(), &model).unwrap();
    assert_eq!(car.num_models(), 3);

    let [body, front, back] = [0, 1, 2].map(|i| car.sub_object(i).unwrap().mesh);
    let garage_mesh = garage.mesh;
    let demo = GarageDemo::from_parts(OrbitCamera::default(), garage, Some(car), None, (1280, 720));

    context.device_mut().take_commands();
    let stats = context.render(&demo.scene_view());
    let commands = context.device().commands();

    // The default camera looks from the +Z side, so the back pane is drawn first
    assert_eq!(forward_draws(commands), vec![garage_mesh, body, back, front]);
    assert_eq!(stats.opaque.draws, 2);
    assert_eq!(stats.transparent.draws, 2);
    assert_eq!(stats.transparent_objects, 2);

    // Six faces of garage plus the opaque body, which may be culled per face
    assert_eq!(stats.shadow.draws + stats.shadow.culled, 12);
    assert_eq!(stats.reflection.draws, 6);

    assert_eq!(commands.last(), Some(&Command::Present));
    assert_eq!(context.frames_rendered(), 1);
    assert_eq!(context.device().skipped_draws(), 0);
}

#[test]
fn test_launch_with_converted_assets() {
    let dir = TempDir::new().unwrap();
    let (obj, model) = write_car(&dir);
    convert(&obj, &model).unwrap();

    let mut config = DemoConfig::default();
    config.assets.car_model = path_string(&model);
    config.assets.stage_light_model = Some(path_string(&model));

    let mut window = HeadlessWindow::new(640, 480, 1.0 / 30.0).with_idle_frames(5);
    assert_eq!(launch(&config, HeadlessDevice::new().without_recording(), &mut window).unwrap(), 5);
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
