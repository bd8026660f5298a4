use super::*;

#[test]
fn over_opaque_src_replaces_dst() {
    assert_eq!(over([1, 2, 3, 255], [9, 8, 7, 255]), [9, 8, 7, 255]);
}

#[test]
fn over_transparent_src_keeps_dst() {
    assert_eq!(over([1, 2, 3, 255], [0, 0, 0, 0]), [1, 2, 3, 255]);
}

#[test]
fn over_half_alpha_blends() {
    let out = over([0, 0, 200, 255], [100, 0, 0, 128]);
    assert_eq!(out, [100, 0, 100, 255]);
}

#[test]
fn over_in_place_checks_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4]).is_err());
    over_in_place(&mut dst, &[10, 10, 10, 255, 0, 0, 0, 0]).unwrap();
    assert_eq!(dst, vec![10, 10, 10, 255, 0, 0, 0, 0]);
}

#[test]
fn mask_alpha_scales_all_channels() {
    let mut dst = vec![200u8, 100, 50, 255, 200, 100, 50, 255];
    let mask = vec![0u8, 0, 0, 0, 255, 255, 255, 128];
    mask_alpha_in_place(&mut dst, &mask).unwrap();
    assert_eq!(&dst[..4], &[0, 0, 0, 0]);
    assert_eq!(&dst[4..], &[100, 50, 25, 128]);
}
