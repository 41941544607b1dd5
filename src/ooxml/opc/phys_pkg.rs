//! Provides a general interface to a physical OPC package (ZIP file).
//!
//! Reading decompresses every member up front into an ordered list; the
//! decks this crate handles are small and every mutation rewrites the whole
//! archive anyway. Writing replays that list through a `ZipWriter` so member
//! order and per-member compression survive a load/save cycle.

use crate::ooxml::opc::error::{OpcError, Result};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// One file inside the archive.
#[derive(Debug, Clone)]
pub struct ZipMember {
    /// Member name, no leading slash (`ppt/slides/slide1.xml`)
    pub name: String,

    /// Decompressed content
    pub data: Vec<u8>,

    /// Compression used when the member was read
    pub compression: CompressionMethod,
}

/// Read every file member of a ZIP archive, in central-directory order.
pub fn read_members(data: &[u8]) -> Result<Vec<ZipMember>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
    let mut members = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let mut buf = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut buf)?;
        members.push(ZipMember {
            name: file.name().to_string(),
            data: buf,
            compression: file.compression(),
        });
    }

    Ok(members)
}

/// Open a package file from disk and read its members.
pub fn read_members_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ZipMember>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(OpcError::PackageNotFound(path.display().to_string()));
    }
    let data = std::fs::read(path)?;
    read_members(&data)
}

/// Physical package writer for creating OPC packages in memory.
pub struct PhysPkgWriter {
    archive: ZipWriter<Cursor<Vec<u8>>>,
}

impl PhysPkgWriter {
    /// Create a new package writer that writes to memory.
    pub fn new() -> Self {
        Self {
            archive: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Write a member. Stored members stay stored; everything else is
    /// deflated.
    pub fn write(&mut self, name: &str, blob: &[u8], compression: CompressionMethod) -> Result<()> {
        let method = match compression {
            CompressionMethod::Stored => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
        let options = SimpleFileOptions::default()
            .compression_method(method)
            .large_file(blob.len() >= u32::MAX as usize);
        self.archive.start_file(name, options)?;
        self.archive.write_all(blob)?;
        Ok(())
    }

    /// Finish writing and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        Ok(self.archive.finish()?.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}
