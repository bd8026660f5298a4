use super::*;

#[test]
fn clip_circle_is_inscribed_in_canvas() {
    let clip = ClipCircle::for_canvas(512);
    assert_eq!(clip.center, Point::new(256.0, 256.0));
    assert_eq!(clip.radius, 256.0);
    assert!(clip.contains(Point::new(256.0, 0.0)));
    assert!(clip.contains(Point::new(256.0, 256.0)));
    assert!(!clip.contains(Point::new(0.0, 0.0)));
    assert!(!clip.contains(Point::new(511.0, 511.0)));
}

#[test]
fn empty_scene_paints_nothing() {
    let scene = SceneGraph {
        pixel_size: 300,
        clip: ClipCircle::for_canvas(300),
        clipped: Vec::new(),
        frame: None,
    };
    assert!(scene.photo().is_none());
    assert!(scene.handle().is_none());
    assert!(scene.paint_order().is_empty());
}

#[test]
fn frame_always_paints_last() {
    let frame = FrameAsset::decode(
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"></svg>"#,
        64,
    )
    .unwrap();
    let scene = SceneGraph {
        pixel_size: 300,
        clip: ClipCircle::for_canvas(300),
        clipped: Vec::new(),
        frame: Some(FrameNode {
            generation: 1,
            asset: frame,
        }),
    };
    assert_eq!(scene.paint_order(), vec!["frame"]);
}
