//! Unit tests for the worker line codec.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use wallpaper_host::worker::codec::{WorkerCodec, MAX_LINE_BYTES};

#[test]
fn single_line_is_decoded_without_newline() {
    let mut codec = WorkerCodec::new();
    let mut buf = BytesMut::from("HWND1234\n");

    let line = codec.decode(&mut buf).expect("decode must succeed");
    assert_eq!(line.as_deref(), Some("HWND1234"));
    assert!(buf.is_empty());
}

#[test]
fn carriage_return_is_stripped() {
    let mut codec = WorkerCodec::new();
    let mut buf = BytesMut::from("HWND42\r\nnext\r\n");

    assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("HWND42"));
    assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("next"));
    assert_eq!(codec.decode(&mut buf).unwrap(), None);
}

#[test]
fn partial_line_is_buffered_until_newline() {
    let mut codec = WorkerCodec::new();
    let mut buf = BytesMut::from("HWN");

    assert_eq!(codec.decode(&mut buf).unwrap(), None);
    buf.extend_from_slice(b"D99\n");
    assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("HWND99"));
}

#[test]
fn invalid_utf8_is_decoded_lossily() {
    let mut codec = WorkerCodec::new();
    let mut buf = BytesMut::from(&b"caf\xe9 ready\n"[..]);

    let line = codec.decode(&mut buf).unwrap().expect("line");
    assert!(line.starts_with("caf"));
    assert!(line.ends_with(" ready"));
}

#[test]
fn overlong_line_is_cut_at_limit() {
    let mut codec = WorkerCodec::new();
    let mut buf = BytesMut::from(vec![b'x'; MAX_LINE_BYTES + 10].as_slice());
    buf.extend_from_slice(b"\n");

    let first = codec.decode(&mut buf).unwrap().expect("first chunk");
    assert_eq!(first.len(), MAX_LINE_BYTES);
    let rest = codec.decode(&mut buf).unwrap().expect("remaining chunk");
    assert_eq!(rest.len(), 10);
}

#[test]
fn unterminated_tail_is_emitted_at_eof() {
    let mut codec = WorkerCodec::new();
    let mut buf = BytesMut::from("first\nlast words");

    assert_eq!(codec.decode_eof(&mut buf).unwrap().as_deref(), Some("first"));
    assert_eq!(codec.decode_eof(&mut buf).unwrap().as_deref(), Some("last words"));
    assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
}

#[test]
fn encoder_appends_newline() {
    let mut codec = WorkerCodec::new();
    let mut dst = BytesMut::new();

    codec.encode("lively:terminate".to_owned(), &mut dst).unwrap();
    assert_eq!(&dst[..], b"lively:terminate\n");
}
