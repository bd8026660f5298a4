use std::io::Cursor;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::math::approx_eq;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn photo_file(w: u32, h: u32) -> SelectedFile {
    SelectedFile::new("photo.png", Some("image/png"), png_bytes(w, h, [200, 40, 40, 255]))
}

fn session() -> SceneCompositor {
    SceneCompositor::new(EditorConfig::default(), ContainerMeasurement::full_width(800)).unwrap()
}

fn session_with_photo() -> SceneCompositor {
    let mut s = session();
    assert!(s.load_photo(photo_file(1000, 500)).unwrap());
    s
}

#[derive(Default)]
struct RecordingRasterizer {
    calls: Vec<(Vec<&'static str>, u32)>,
    fail: bool,
}

impl Rasterizer for RecordingRasterizer {
    fn rasterize(&mut self, scene: &SceneGraph, pixel_ratio: u32) -> FrameResult<FrameRGBA> {
        self.calls.push((scene.paint_order(), pixel_ratio));
        if self.fail {
            return Err(FrameError::validation("raster target lost"));
        }
        let edge = scene.pixel_size * pixel_ratio;
        Ok(FrameRGBA {
            width: edge,
            height: edge,
            data: vec![0; (edge * edge * 4) as usize],
            premultiplied: true,
        })
    }
}

struct FailingSink;

impl ExportSink for FailingSink {
    fn save(&mut self, _file_name: &str, _png: &[u8]) -> FrameResult<()> {
        Err(FrameError::validation("disk full"))
    }
}

fn assert_geometry(g: LayerGeometry, width: f64, height: f64, x: f64, y: f64) {
    assert!(approx_eq(g.width, width, 1e-9), "{g:?}");
    assert!(approx_eq(g.height, height, 1e-9), "{g:?}");
    assert!(approx_eq(g.x, x, 1e-9), "{g:?}");
    assert!(approx_eq(g.y, y, 1e-9), "{g:?}");
}

#[test]
fn mount_sizes_canvas_from_measurement() {
    let s = session();
    assert_eq!(s.viewport().pixel_size(), 512);
    assert!(!s.viewport().is_compact_device());

    let compact =
        SceneCompositor::new(EditorConfig::default(), ContainerMeasurement::full_width(375))
            .unwrap();
    assert_eq!(compact.viewport().pixel_size(), 343);
    assert!(compact.viewport().is_compact_device());
}

#[test]
fn unmeasured_container_mounts_at_fallback() {
    let s = SceneCompositor::new(
        EditorConfig::default(),
        ContainerMeasurement {
            viewport_width: 1200,
            container_width: None,
        },
    )
    .unwrap();
    assert_eq!(s.viewport().pixel_size(), 300);
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = EditorConfig {
        export_pixel_ratio: 0,
        ..EditorConfig::default()
    };
    let err = SceneCompositor::new(cfg, ContainerMeasurement::full_width(800))
        .err()
        .unwrap();
    assert!(matches!(err, FrameError::Validation(_)));
}

#[test]
fn empty_session_has_no_geometry_and_upload_controls() {
    let s = session();
    assert!(s.layer_geometry().is_empty());
    assert_eq!(s.photo_bound_box(), None);
    assert_eq!(s.handle_state(), HandleState::Detached);

    let c = s.controls();
    assert_eq!(c.upload_label, "Upload Image");
    assert!(c.slider.is_none());
    assert!(!c.export_visible);
}

#[test]
fn loaded_photo_is_centered_and_selected() {
    let s = session_with_photo();
    assert_geometry(s.layer_geometry(), 670.0, 335.0, -79.0, 88.5);
    assert_eq!(s.handle_state(), HandleState::Attached(LayerId(1)));

    let c = s.controls();
    assert_eq!(c.upload_label, "Change Image");
    let slider = c.slider.unwrap();
    assert_eq!((slider.min, slider.max, slider.step), (0.5, 2.0, 0.01));
    assert!(approx_eq(slider.value, 1.0, 1e-12));
    assert!(c.export_visible);
}

#[test]
fn user_scale_is_clamped_and_scales_geometry() {
    let mut s = session_with_photo();
    assert!(approx_eq(s.set_user_scale(3.0).unwrap().get(), 2.0, 1e-9));
    assert!(approx_eq(s.set_user_scale(0.1).unwrap().get(), 0.5, 1e-9));
    assert_geometry(s.layer_geometry(), 335.0, 167.5, 88.5, 172.25);

    assert!(matches!(
        s.set_user_scale(f64::NAN),
        Err(FrameError::Validation(_))
    ));
    assert!(approx_eq(s.user_scale().get(), 0.5, 1e-9));
}

#[test]
fn stale_completion_is_discarded() {
    let mut s = session();
    let first = s.begin_photo_load(Some(photo_file(400, 400))).unwrap();
    let second = s.begin_photo_load(Some(photo_file(300, 600))).unwrap();

    let second_done = second.run();
    let first_done = first.run();
    assert!(s.complete_photo_load(second_done).unwrap());
    assert!(!s.complete_photo_load(first_done).unwrap());

    let natural = s.photo_layer().unwrap().asset().natural_size();
    assert_eq!((natural.width, natural.height), (300, 600));
}

#[test]
fn failed_newer_load_discards_older_success() {
    let mut s = session();
    let older = s.begin_photo_load(Some(photo_file(400, 400))).unwrap();
    let newer = s
        .begin_photo_load(Some(SelectedFile::new(
            "broken.png",
            Some("image/png"),
            b"garbage".to_vec(),
        )))
        .unwrap();

    let (older_done, newer_done) = (older.run(), newer.run());
    assert!(matches!(
        s.complete_photo_load(newer_done),
        Err(FrameError::DecodeFailed(_))
    ));
    assert!(!s.complete_photo_load(older_done).unwrap());
    assert!(!s.has_photo());
    assert_eq!(s.handle_state(), HandleState::Detached);
}

#[test]
fn failed_decode_keeps_previous_photo() {
    let mut s = session_with_photo();
    let before = s.photo_bound_box();

    let broken = SelectedFile::new("broken.png", Some("image/png"), b"not a png".to_vec());
    let err = s.load_photo(broken).unwrap_err();
    assert!(matches!(err, FrameError::DecodeFailed(_)));

    assert_eq!(s.photo_bound_box(), before);
    assert_eq!(s.handle_state(), HandleState::Attached(LayerId(1)));
}

#[test]
fn non_image_selection_is_rejected_without_a_load() {
    let mut s = session();
    let text = SelectedFile::new("notes.txt", Some("text/plain"), b"hello".to_vec());
    assert!(matches!(
        s.begin_photo_load(Some(text)),
        Err(FrameError::InputRejected(_))
    ));
    assert!(matches!(
        s.begin_photo_load(None),
        Err(FrameError::InputRejected(_))
    ));
    assert!(!s.has_photo());
}

#[test]
fn replacing_photo_attaches_fresh_layer() {
    let mut s = session_with_photo();
    s.set_user_scale(1.5).unwrap();
    s.drag_photo(Vec2::new(20.0, 0.0)).unwrap();

    assert!(s.load_photo(photo_file(500, 500)).unwrap());
    assert_eq!(s.handle_state(), HandleState::Attached(LayerId(2)));
    assert!(approx_eq(s.user_scale().get(), 1.5, 1e-9));

    let g = s.layer_geometry();
    let b = s.photo_bound_box().unwrap();
    assert_eq!(b, BoundBox::from_geometry(g));
}

#[test]
fn resize_keeps_moved_photo_in_reference_position() {
    let mut s = session_with_photo();
    s.drag_photo(Vec2::new(10.0, 0.0)).unwrap();

    assert!(s.resize(ContainerMeasurement::full_width(375)));
    let vs = 343.0 / 512.0;
    let b = s.photo_bound_box().unwrap();
    assert!(approx_eq(b.x, -69.0 * vs, 1e-9), "{b:?}");
    assert!(approx_eq(b.y, 88.5 * vs, 1e-9), "{b:?}");
    assert!(approx_eq(b.width, 670.0 * vs, 1e-9), "{b:?}");
    assert!(approx_eq(s.handle().min_box_size(), 50.0 * vs, 1e-9));

    assert!(!s.resize(ContainerMeasurement {
        viewport_width: 375,
        container_width: None,
    }));
    assert_eq!(s.viewport().pixel_size(), 343);
}

#[test]
fn hit_test_resolves_photo_anchors_and_knob() {
    let mut s = session_with_photo();
    s.set_user_scale(0.5).unwrap();

    assert_eq!(s.hit_test(Point::new(256.0, 256.0)), Some(HitTarget::Photo));
    assert_eq!(s.hit_test(Point::new(2.0, 2.0)), None);
    assert_eq!(
        s.hit_test(Point::new(89.0, 173.0)),
        Some(HitTarget::Anchor(Anchor::TopLeft))
    );
    assert_eq!(
        s.hit_test(Point::new(423.0, 339.0)),
        Some(HitTarget::Anchor(Anchor::BottomRight))
    );
    assert_eq!(
        s.hit_test(Point::new(256.0, 123.0)),
        Some(HitTarget::RotateKnob)
    );
    // Edge midpoints are disabled.
    assert_eq!(
        s.hit_test(Point::new(256.0, 172.5)),
        Some(HitTarget::Photo)
    );
}

#[test]
fn hit_test_ignores_photo_outside_clip() {
    let s = session_with_photo();
    // Inside the photo box but outside the circle.
    assert_eq!(s.hit_test(Point::new(5.0, 100.0)), None);
}

#[test]
fn pointer_drag_moves_photo() {
    let mut s = session_with_photo();
    assert_eq!(
        s.pointer_down(Point::new(256.0, 256.0)),
        Some(HitTarget::Photo)
    );
    s.pointer_move(Point::new(266.0, 261.0)).unwrap();
    s.pointer_move(Point::new(270.0, 261.0)).unwrap();
    s.pointer_up();

    let b = s.photo_bound_box().unwrap();
    assert!(approx_eq(b.x, -65.0, 1e-9), "{b:?}");
    assert!(approx_eq(b.y, 93.5, 1e-9), "{b:?}");

    s.pointer_move(Point::new(400.0, 400.0)).unwrap();
    assert_eq!(s.photo_bound_box(), Some(b));
}

#[test]
fn pointer_resize_below_floor_is_rejected() {
    let mut s = session_with_photo();
    s.set_user_scale(0.5).unwrap();
    let before = s.photo_bound_box().unwrap();

    assert_eq!(
        s.pointer_down(Point::new(423.5, 339.75)),
        Some(HitTarget::Anchor(Anchor::BottomRight))
    );
    s.pointer_move(Point::new(90.0, 175.0)).unwrap();
    assert_eq!(s.photo_bound_box(), Some(before));

    s.pointer_move(Point::new(433.5, 344.75)).unwrap();
    s.pointer_up();
    let after = s.photo_bound_box().unwrap();
    assert!(after.width > before.width, "{after:?}");
    assert!(approx_eq(after.width / after.height, 2.0, 1e-9));
    assert!(approx_eq(after.x, before.x, 1e-9));
    assert!(approx_eq(after.y, before.y, 1e-9));
}

#[test]
fn pointer_rotate_follows_angle_about_center() {
    let mut s = session_with_photo();
    s.set_user_scale(0.5).unwrap();
    let center = s.photo_bound_box().unwrap().center();

    assert_eq!(
        s.pointer_down(Point::new(256.0, 122.25)),
        Some(HitTarget::RotateKnob)
    );
    s.pointer_move(Point::new(center.x + 100.0, center.y)).unwrap();
    s.pointer_up();

    let b = s.photo_bound_box().unwrap();
    assert!(approx_eq(b.rotation_deg, 90.0, 1e-9), "{b:?}");
    let c = b.center();
    assert!(approx_eq(c.x, center.x, 1e-9) && approx_eq(c.y, center.y, 1e-9));
}

#[test]
fn manipulation_requires_a_photo() {
    let mut s = session();
    assert!(matches!(
        s.drag_photo(Vec2::new(1.0, 1.0)),
        Err(FrameError::InputRejected(_))
    ));
    assert!(matches!(
        s.rotate_photo(10.0),
        Err(FrameError::InputRejected(_))
    ));
    assert_eq!(s.pointer_down(Point::new(256.0, 256.0)), None);
}

#[test]
fn scene_graph_orders_photo_handle_frame() {
    let mut s = session_with_photo();
    s.load_frame(&png_bytes(32, 32, [0, 0, 0, 0])).unwrap();
    let scene = s.scene_graph();
    assert_eq!(scene.paint_order(), vec!["photo", "handle", "frame"]);
    assert_eq!(scene.pixel_size, 512);
    assert_eq!(scene.clip.radius, 256.0);
}

#[test]
fn failed_frame_decode_keeps_previous_frame() {
    let mut s = session();
    s.load_frame(&png_bytes(32, 32, [0, 0, 0, 255])).unwrap();
    assert!(s.load_frame(b"garbage").is_err());
    assert!(s.scene_graph().frame.is_some_and(|f| f.generation == 1));
}

#[test]
fn export_hides_handle_and_restores_it() {
    let mut s = SceneCompositor::with_rasterizer(
        EditorConfig::default(),
        ContainerMeasurement::full_width(800),
        RecordingRasterizer::default(),
    )
    .unwrap();
    s.load_photo(photo_file(1000, 500)).unwrap();
    s.load_frame(&png_bytes(32, 32, [0, 0, 0, 0])).unwrap();
    let redraws = s.redraw_count();

    let mut sink = InMemorySink::new();
    let report = s.export(&mut sink).unwrap();

    assert_eq!(report.file_name, "framed-image.png");
    assert_eq!((report.width, report.height), (1024, 1024));
    assert_eq!(sink.exports().len(), 1);
    assert_eq!(sink.last().unwrap().0, "framed-image.png");
    assert_eq!(report.bytes, sink.last().unwrap().1.len());

    assert_eq!(
        s.rasterizer.calls,
        vec![(vec!["photo", "frame"], 2)]
    );
    assert_eq!(s.handle_state(), HandleState::Attached(LayerId(1)));
    assert_eq!(s.redraw_count(), redraws + 2);
}

#[test]
fn failed_capture_restores_handle() {
    let mut s = SceneCompositor::with_rasterizer(
        EditorConfig::default(),
        ContainerMeasurement::full_width(800),
        RecordingRasterizer {
            fail: true,
            ..RecordingRasterizer::default()
        },
    )
    .unwrap();
    s.load_photo(photo_file(1000, 500)).unwrap();

    let mut sink = InMemorySink::new();
    let err = s.export(&mut sink).unwrap_err();
    assert!(matches!(err, FrameError::ExportUnavailable(_)));
    assert!(sink.exports().is_empty());
    assert_eq!(s.handle_state(), HandleState::Attached(LayerId(1)));
}

#[test]
fn failed_sink_restores_handle() {
    let mut s = session_with_photo();
    let err = s.export(&mut FailingSink).unwrap_err();
    assert!(matches!(err, FrameError::ExportUnavailable(_)));
    assert_eq!(s.handle_state(), HandleState::Attached(LayerId(1)));
}

#[test]
fn remove_photo_returns_to_upload_state() {
    let mut s = session_with_photo();
    s.remove_photo();
    assert!(!s.has_photo());
    assert_eq!(s.handle_state(), HandleState::Detached);
    assert_eq!(s.controls().upload_label, "Upload Image");

    // Export still works on a frame-only scene.
    let mut sink = InMemorySink::new();
    s.export(&mut sink).unwrap();
    assert_eq!(s.handle_state(), HandleState::Detached);
}

#[test]
fn preview_renders_at_screen_size() {
    let mut s = session_with_photo();
    let frame = s.render_preview().unwrap();
    assert_eq!((frame.width, frame.height), (512, 512));
    assert!(frame.premultiplied);
}
