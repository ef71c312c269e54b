//! Test fixtures: EPUB, PDF and image payloads built in memory.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 1x1 transparent PNG.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// JPEG header bytes, enough for content sniffing.
pub const TINY_JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];

/// Minimal PDF document.
pub fn pdf_bytes() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\ntrailer << /Root 1 0 R >>\n%%EOF\n".to_vec()
}

/// EPUB 2 style book with an optional ISBN identifier and an optional
/// embedded PNG cover.
pub fn epub_bytes(isbn: Option<&str>, with_cover: bool) -> Vec<u8> {
    let identifier = isbn
        .map(|isbn| format!(r#"<dc:identifier opf:scheme="ISBN">{}</dc:identifier>"#, isbn))
        .unwrap_or_default();
    let (cover_meta, cover_item) = if with_cover {
        (
            r#"<meta name="cover" content="cover-image"/>"#,
            r#"<item id="cover-image" href="Images/cover.png" media-type="image/png"/>"#,
        )
    } else {
        ("", "")
    };

    let package = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:title>Fixture Book</dc:title>
    {}
    {}
  </metadata>
  <manifest>
    <item id="chapter-1" href="Text/chapter1.xhtml" media-type="application/xhtml+xml"/>
    {}
  </manifest>
  <spine><itemref idref="chapter-1"/></spine>
</package>"#,
        identifier, cover_meta, cover_item
    );

    let container = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

    let mut entries: Vec<(&str, Vec<u8>)> = vec![
        ("mimetype", b"application/epub+zip".to_vec()),
        ("META-INF/container.xml", container.as_bytes().to_vec()),
        ("OEBPS/content.opf", package.into_bytes()),
        (
            "OEBPS/Text/chapter1.xhtml",
            b"<html><body><p>Once upon a time.</p></body></html>".to_vec(),
        ),
    ];
    if with_cover {
        entries.push(("OEBPS/Images/cover.png", TINY_PNG.to_vec()));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        let options = if name == "mimetype" {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        } else {
            SimpleFileOptions::default()
        };
        zip.start_file(name, options).expect("Failed to start zip entry");
        zip.write_all(&bytes).expect("Failed to write zip entry");
    }
    zip.finish().expect("Failed to finish zip").into_inner()
}
