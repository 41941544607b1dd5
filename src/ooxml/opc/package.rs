//! Objects that implement reading and writing OPC packages.
//!
//! [`OpcPackage`] keeps every archive member as raw bytes, in archive order.
//! Higher layers parse the parts they care about, hand back new bytes through
//! [`OpcPackage::set_blob`], and everything they never touched is written back
//! exactly as it was read.

use crate::ooxml::opc::constants::{content_type as ct, relationship_type};
use crate::ooxml::opc::content_types::ContentTypes;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::{self, PhysPkgWriter, ZipMember};
use crate::ooxml::opc::rel::Relationships;
use std::collections::HashMap;
use std::path::Path;
use zip::CompressionMethod;

/// Main API class for working with OPC packages.
pub struct OpcPackage {
    /// Archive members in their original order
    members: Vec<ZipMember>,

    /// Membername to index into `members`
    index: HashMap<String, usize>,

    content_types: ContentTypes,

    /// Content types changed since load and must be re-serialized
    content_types_dirty: bool,
}

impl OpcPackage {
    /// Open an OPC package from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_members(phys_pkg::read_members_from_path(path)?)
    }

    /// Load an OPC package from archive bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_members(phys_pkg::read_members(data)?)
    }

    fn from_members(members: Vec<ZipMember>) -> Result<Self> {
        let index: HashMap<String, usize> = members
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();

        let types_name = &CONTENT_TYPES_URI[1..];
        let types_xml = index
            .get(types_name)
            .map(|&i| members[i].data.as_slice())
            .ok_or_else(|| OpcError::PartNotFound(CONTENT_TYPES_URI.to_string()))?;
        let content_types = ContentTypes::from_xml(types_xml)?;

        Ok(Self {
            members,
            index,
            content_types,
            content_types_dirty: false,
        })
    }

    /// Whether a part exists in the package.
    pub fn contains(&self, partname: &PackURI) -> bool {
        self.index.contains_key(partname.membername())
    }

    /// Raw bytes of a part.
    pub fn blob(&self, partname: &PackURI) -> Result<&[u8]> {
        self.index
            .get(partname.membername())
            .map(|&i| self.members[i].data.as_slice())
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Replace the bytes of an existing part.
    pub fn set_blob(&mut self, partname: &PackURI, blob: Vec<u8>) -> Result<()> {
        let i = *self
            .index
            .get(partname.membername())
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))?;
        self.members[i].data = blob;
        Ok(())
    }

    /// Add a new part at the end of the archive and declare its content type.
    pub fn add_part(&mut self, partname: &PackURI, content_type: &str, blob: Vec<u8>) -> Result<()> {
        if self.contains(partname) {
            return Err(OpcError::InvalidPackUri(format!(
                "Part already exists: {}",
                partname
            )));
        }
        self.push_member(partname, blob);
        if self.content_types.register(partname, content_type) {
            self.content_types_dirty = true;
        }
        Ok(())
    }

    fn push_member(&mut self, partname: &PackURI, blob: Vec<u8>) {
        let name = partname.membername().to_string();
        self.index.insert(name.clone(), self.members.len());
        self.members.push(ZipMember {
            name,
            data: blob,
            compression: CompressionMethod::Deflated,
        });
    }

    /// Content type of a part.
    pub fn content_type(&self, partname: &PackURI) -> Result<&str> {
        self.content_types.get(partname)
    }

    /// Relationships whose source is `source` (use [`PACKAGE_URI`] for the
    /// package itself). A part without a `.rels` item has none.
    pub fn rels_for(&self, source: &PackURI) -> Result<Relationships> {
        let rels_uri = source.rels_uri();
        let base_uri = source.base_uri().to_string();
        match self.index.get(rels_uri.membername()) {
            Some(&i) => Relationships::from_xml(base_uri, &self.members[i].data),
            None => Ok(Relationships::new(base_uri)),
        }
    }

    /// Write the relationships of `source`, creating the `.rels` item if
    /// needed.
    pub fn set_rels(&mut self, source: &PackURI, rels: &Relationships) -> Result<()> {
        let rels_uri = source.rels_uri();
        let xml = rels.to_xml().into_bytes();
        if self.contains(&rels_uri) {
            self.set_blob(&rels_uri, xml)
        } else {
            self.add_part(&rels_uri, ct::OPC_RELATIONSHIPS, xml)
        }
    }

    /// Partname of the main document (`/ppt/presentation.xml`).
    pub fn main_document_partname(&self) -> Result<PackURI> {
        let package = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        self.rels_for(&package)?
            .part_with_reltype(relationship_type::OFFICE_DOCUMENT)
    }

    /// Partnames of every member, in archive order.
    pub fn partnames(&self) -> impl Iterator<Item = PackURI> + '_ {
        self.members
            .iter()
            .map(|m| PackURI::from_membername(&m.name))
    }

    /// Serialize the package to archive bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = PhysPkgWriter::new();
        let types_name = &CONTENT_TYPES_URI[1..];
        let types_xml = self
            .content_types_dirty
            .then(|| self.content_types.to_xml().into_bytes());

        for member in &self.members {
            let data = match &types_xml {
                Some(xml) if member.name == types_name => xml.as_slice(),
                _ => member.data.as_slice(),
            };
            writer.write(&member.name, data, member.compression)?;
        }

        writer.finish()
    }
}
