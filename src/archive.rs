use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::document::Document;
use crate::error::Result;

/// Name of the single entry of an XPlanArchiv.
pub const DOCUMENT_ENTRY: &str = "xplan.gml";

pub fn archive_path(output_dir: &Path, file_stem: &str) -> PathBuf {
    output_dir.join(format!("{file_stem}.zip"))
}

/// Writes `document` as the only entry of a new zip at `path`.
///
/// The document is serialized before the file is created, so a failing
/// serialization leaves nothing behind. An existing file is overwritten.
pub fn write_archive(path: &Path, document: &Document) -> Result<()> {
    let xml = document.to_xml()?;

    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(DOCUMENT_ENTRY, options)?;
    zip.write_all(xml.as_bytes())?;
    zip.finish()?;
    Ok(())
}

/// Reads the raw `xplan.gml` entry of an archive.
pub fn read_archive_entry(path: &Path) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;
    let mut entry = archive.by_name(DOCUMENT_ENTRY)?;
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

pub fn read_archive(path: &Path) -> Result<Document> {
    Document::parse_bytes(&read_archive_entry(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Element;
    use tempfile::TempDir;

    #[test]
    fn test_archive_holds_single_document_entry() {
        let dir = TempDir::new().unwrap();
        let path = archive_path(dir.path(), "Plan_1");
        assert!(path.ends_with("Plan_1.zip"));

        let document = Document::new(Element::new("root").with_child(Element::new("child").with_text("ä")));
        write_archive(&path, &document).unwrap();

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.by_index(0).unwrap().name(), DOCUMENT_ENTRY);

        let bytes = read_archive_entry(&path).unwrap();
        assert!(bytes.starts_with(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert_eq!(read_archive(&path).unwrap(), document);
    }

    #[test]
    fn test_existing_archive_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = archive_path(dir.path(), "Plan");
        write_archive(&path, &Document::new(Element::new("first"))).unwrap();
        write_archive(&path, &Document::new(Element::new("second"))).unwrap();
        assert_eq!(read_archive(&path).unwrap().root.name, "second");
    }

    #[test]
    fn test_missing_entry_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.zip");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("readme.txt", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"nothing here").unwrap();
        zip.finish().unwrap();

        assert!(read_archive_entry(&path).is_err());
    }
}
