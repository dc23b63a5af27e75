//! ZIP archive helpers for Office Open XML (.xlsx) and OpenDocument (.ods) packages.

use crate::error::SheetLoaderError;
use crate::helpers::xml::XmlReader;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::ZipArchive;

/// Signature of an OLE compound file, the container of encrypted OOXML packages.
const COMPOUND_FILE_SIGNATURE: u64 = 0xE11A_B1A1_E011_CFD0;

/// Package entry lookup on top of [`ZipArchive`].
pub(crate) trait ZipHelper<RS: Read + Seek> {
    /// Gets an entry by name (case-insensitive, path separator agnostic)
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, SheetLoaderError>;

    /// Creates an XML reader over an entry
    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, SheetLoaderError>;
}

impl<RS: Read + Seek> ZipHelper<RS> for ZipArchive<RS> {
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, SheetLoaderError> {
        let pattern = name.replace('\\', "/");
        let path = self
            .file_names()
            .find(|file_name| pattern.eq_ignore_ascii_case(&file_name.replace('\\', "/")))
            .map(|file_name| file_name.to_owned());
        match path.map(|file_name| self.by_name(&file_name)).transpose() {
            Ok(Some(file)) => Ok(Some(file)),
            Ok(None) | Err(ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error)?,
        }
    }

    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, SheetLoaderError> {
        let reader = self
            .file(name)?
            .map(|file| XmlReader::new(BufReader::new(file)));
        Ok(reader)
    }
}

/// Returns true when the stream starts with the OLE compound file signature.
/// The stream is rewound before returning.
pub(crate) fn is_compound_file<RS: Read + Seek>(reader: &mut RS) -> Result<bool, SheetLoaderError> {
    let mut header = [0u8; 8];
    let matched = match reader.read_exact(&mut header) {
        Ok(()) => u64::from_le_bytes(header) == COMPOUND_FILE_SIGNATURE,
        Err(error) if error.kind() == std::io::ErrorKind::UnexpectedEof => false,
        Err(error) => Err(error)?,
    };
    reader.seek(SeekFrom::Start(0))?;
    Ok(matched)
}
