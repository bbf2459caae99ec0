use super::*;

#[test]
fn line_accumulator_splits_on_newlines_and_calls_back() {
    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let seen_cb = seen.clone();
    let cb: LineCallback = std::sync::Arc::new(move |_src, line| seen_cb.lock().expect("lock").push(line.to_string()));
    let mut acc = LineAccumulator::new(LineSource::Stdout, Some(cb));
    acc.feed(b"hello\nworld");
    assert_eq!(seen.lock().expect("lock").as_slice(), &["hello".to_string()]);
    let result = acc.finish();
    assert_eq!(result, "hello\nworld");
}

#[test]
fn classify_connect_error_maps_kinds() {
    let refused = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
    assert!(matches!(classify_connect_error("h", refused), TransportError::ConnectFailed(_)));

    let not_found = std::io::Error::from(std::io::ErrorKind::NotFound);
    assert!(matches!(classify_connect_error("h", not_found), TransportError::UnknownHost(_)));

    let other = std::io::Error::other("boom");
    assert!(matches!(classify_connect_error("h", other), TransportError::Generic(_)));
}
