use super::*;

fn tree(svg: &str) -> usvg::Tree {
    usvg::Tree::from_data(svg.as_bytes(), &usvg::Options::default()).unwrap()
}

#[test]
fn rasterizes_at_requested_size() {
    let t = tree(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><rect width="4" height="4" fill="#0000ff"/></svg>"##,
    );
    let px = rasterize_svg_to_premul_rgba8(&t, 16, 16).unwrap();
    assert_eq!(px.len(), 16 * 16 * 4);
    assert_eq!(&px[..4], &[0, 0, 255, 255]);
}

#[test]
fn rejects_zero_and_huge_sizes() {
    let t = tree(r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"></svg>"#);
    assert!(rasterize_svg_to_premul_rgba8(&t, 0, 4).is_err());
    assert!(rasterize_svg_to_premul_rgba8(&t, 20_000, 4).is_err());
}
