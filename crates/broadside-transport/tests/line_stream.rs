//! Integration tests for line framing over in-memory duplex streams.

use broadside_transport::{split_lines, TextEncoding, TransportError};
use tokio::io::AsyncWriteExt;

#[tokio::test]
async fn test_send_and_receive_one_line() {
    let (near, far) = tokio::io::duplex(1024);
    let (_reader_a, mut writer_a) = split_lines(near, TextEncoding::Utf8, true);
    let (mut reader_b, _writer_b) = split_lines(far, TextEncoding::Utf8, true);

    writer_a.send_line("FIRE B7").await.unwrap();

    let line = reader_b.next_line().await.unwrap();
    assert_eq!(line.as_deref(), Some("FIRE B7"));
}

#[tokio::test]
async fn test_accepts_bare_lf_and_crlf() {
    let (mut near, far) = tokio::io::duplex(1024);
    let (mut reader, _writer) = split_lines(far, TextEncoding::Utf8, false);

    near.write_all(b"HELLO Alice\nQUIT\r\n").await.unwrap();

    assert_eq!(
        reader.next_line().await.unwrap().as_deref(),
        Some("HELLO Alice")
    );
    assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("QUIT"));
}

#[tokio::test]
async fn test_bom_is_stripped_from_first_line_only() {
    let (mut near, far) = tokio::io::duplex(1024);
    let (mut reader, _writer) = split_lines(far, TextEncoding::Utf8, true);

    near.write_all("\u{feff}HELLO Alice\n\u{feff}START\n".as_bytes())
        .await
        .unwrap();

    assert_eq!(
        reader.next_line().await.unwrap().as_deref(),
        Some("HELLO Alice")
    );
    // Second BOM is not at the start of the stream: passed through.
    assert_eq!(
        reader.next_line().await.unwrap().as_deref(),
        Some("\u{feff}START")
    );
}

#[tokio::test]
async fn test_bom_kept_when_detection_disabled() {
    let (mut near, far) = tokio::io::duplex(1024);
    let (mut reader, _writer) = split_lines(far, TextEncoding::Utf8, false);

    near.write_all("\u{feff}HELLO\n".as_bytes()).await.unwrap();

    assert_eq!(
        reader.next_line().await.unwrap().as_deref(),
        Some("\u{feff}HELLO")
    );
}

#[tokio::test]
async fn test_clean_eof_yields_none() {
    let (near, far) = tokio::io::duplex(1024);
    let (mut reader, _writer) = split_lines(far, TextEncoding::Utf8, true);

    drop(near);

    assert!(reader.next_line().await.unwrap().is_none());
}

#[tokio::test]
async fn test_ascii_mode_rejects_non_ascii_input() {
    let (mut near, far) = tokio::io::duplex(1024);
    let (mut reader, _writer) = split_lines(far, TextEncoding::Ascii, false);

    near.write_all("HELLO Ålice\n".as_bytes()).await.unwrap();

    assert!(matches!(
        reader.next_line().await,
        Err(TransportError::Encoding(_))
    ));
}

#[tokio::test]
async fn test_ascii_mode_refuses_to_send_non_ascii() {
    let (near, _far) = tokio::io::duplex(1024);
    let (_reader, mut writer) = split_lines(near, TextEncoding::Ascii, false);

    assert!(matches!(
        writer.send_line("HELLO Ålice").await,
        Err(TransportError::Encoding(_))
    ));
}

#[tokio::test]
async fn test_invalid_utf8_is_an_encoding_fault() {
    let (mut near, far) = tokio::io::duplex(1024);
    let (mut reader, _writer) = split_lines(far, TextEncoding::Utf8, false);

    near.write_all(&[0xff, 0xfe, b'\n']).await.unwrap();
    drop(near);

    assert!(matches!(
        reader.next_line().await,
        Err(TransportError::Encoding(_))
    ));
}

#[tokio::test]
async fn test_writer_shutdown_gives_peer_eof() {
    let (near, far) = tokio::io::duplex(1024);
    let (_reader_a, mut writer_a) = split_lines(near, TextEncoding::Utf8, true);
    let (mut reader_b, _writer_b) = split_lines(far, TextEncoding::Utf8, true);

    writer_a.send_line("QUIT").await.unwrap();
    writer_a.shutdown().await.unwrap();

    assert_eq!(reader_b.next_line().await.unwrap().as_deref(), Some("QUIT"));
    assert!(reader_b.next_line().await.unwrap().is_none());
}
