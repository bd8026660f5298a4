use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn photo_reports_natural_size_and_aspect() {
    let photo = PhotoAsset::decode(&png_bytes(40, 20), 1024).unwrap();
    assert_eq!(photo.natural_size(), ImageSize::new(40, 20).unwrap());
    assert_eq!(photo.aspect_ratio(), 2.0);
    assert_eq!(photo.image().rgba8_premul.len(), 40 * 20 * 4);
}

#[test]
fn frame_accepts_bitmap_and_svg() {
    let bitmap = FrameAsset::decode(&png_bytes(8, 8), 1024).unwrap();
    assert!(!bitmap.is_vector());

    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><circle cx="5" cy="5" r="5" fill="#f00"/></svg>"##;
    let vector = FrameAsset::decode(svg, 1024).unwrap();
    assert!(vector.is_vector());
}

#[test]
fn non_square_bitmap_frame_is_accepted() {
    let frame = FrameAsset::decode(&png_bytes(8, 4), 1024).unwrap();
    let FrameSource::Bitmap(img) = frame.source() else {
        panic!("expected bitmap frame");
    };
    assert_eq!((img.width, img.height), (8, 4));
}
