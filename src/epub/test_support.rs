//! In-memory EPUB fixtures for unit tests.

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

pub fn container_xml(package_path: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{}" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
        package_path
    )
    .into_bytes()
}

/// Package document with the given raw `<metadata>` and `<manifest>` bodies.
pub fn opf(metadata: &str, manifest: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:title>Fixture Book</dc:title>
    {}
  </metadata>
  <manifest>
    {}
  </manifest>
  <spine/>
</package>"#,
        metadata, manifest
    )
}

pub struct EpubBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl EpubBuilder {
    /// Archive holding only the `mimetype` entry.
    pub fn new() -> Self {
        Self {
            entries: vec![("mimetype".to_string(), b"application/epub+zip".to_vec())],
        }
    }

    /// Archive with a container pointing at `path` and the package document
    /// stored there.
    pub fn with_package(path: &str, package_xml: &str) -> Self {
        Self::new()
            .with_entry("META-INF/container.xml", container_xml(path))
            .with_entry(path, package_xml.as_bytes().to_vec())
    }

    pub fn with_entry(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.entries.push((name.to_string(), bytes));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in self.entries {
            let options = if name == "mimetype" {
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
            } else {
                SimpleFileOptions::default()
            };
            zip.start_file(name, options).unwrap();
            zip.write_all(&bytes).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}
