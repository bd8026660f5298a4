use super::*;

#[test]
fn in_memory_sink_keeps_order() {
    let mut sink = InMemorySink::new();
    sink.save("a.png", &[1]).unwrap();
    sink.save("b.png", &[2]).unwrap();
    assert_eq!(sink.exports().len(), 2);
    assert_eq!(sink.last().unwrap().0, "b.png");
}

#[test]
fn directory_sink_writes_and_respects_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path().join("out"));
    sink.save("framed-image.png", b"png").unwrap();
    let path = sink.path_for("framed-image.png");
    assert_eq!(std::fs::read(&path).unwrap(), b"png");

    let mut strict = DirectorySink::new(dir.path().join("out")).no_overwrite();
    assert!(matches!(
        strict.save("framed-image.png", b"png2"),
        Err(FrameError::ExportUnavailable(_))
    ));
}

#[test]
fn directory_sink_rejects_nested_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path());
    assert!(sink.save("../escape.png", b"x").is_err());
    assert!(sink.save("a/b.png", b"x").is_err());
}
