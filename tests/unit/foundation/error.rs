use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FrameError::input_rejected("x")
            .to_string()
            .contains("input rejected:")
    );
    assert!(
        FrameError::decode_failed("x")
            .to_string()
            .contains("decode failed:")
    );
    assert!(
        FrameError::measurement_unavailable("x")
            .to_string()
            .contains("measurement unavailable:")
    );
    assert!(
        FrameError::export_unavailable("x")
            .to_string()
            .contains("export unavailable:")
    );
    assert!(
        FrameError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FrameError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
