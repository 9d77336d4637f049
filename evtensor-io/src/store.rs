//! Container file handling.

use hdf5::types::VarLenUnicode;
use hdf5::{File, Group};
use std::path::Path;
use std::str::FromStr;

use crate::{Error, Result};

const FORMAT_VERSION_ATTR: &str = "evtensor_format_version";
const FORMAT_VERSION: &str = "0.1";

/// An evtensor container file holding one group per tensor category.
pub struct TensorStore {
    file: File,
}

impl TensorStore {
    /// Creates a new container file, stamping the format version.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let version = VarLenUnicode::from_str(FORMAT_VERSION)
            .map_err(|e| Error::InvalidFormat(format!("invalid utf-8 attribute: {e}")))?;
        file.new_attr::<VarLenUnicode>()
            .create(FORMAT_VERSION_ATTR)?
            .write_scalar(&version)?;
        Ok(Self { file })
    }

    /// Opens an existing container read-only.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            file: File::open(path)?,
        })
    }

    /// Opens an existing container for continued appends.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened.
    pub fn open_rw<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            file: File::open_rw(path)?,
        })
    }

    /// Creates an empty category group, e.g. `"image"`.
    ///
    /// # Errors
    /// Returns an error if the group already exists or cannot be created.
    pub fn create_category(&self, name: &str) -> Result<Group> {
        Ok(self.file.create_group(name)?)
    }

    /// Opens an existing category group.
    ///
    /// # Errors
    /// Returns an error if the group does not exist.
    pub fn category(&self, name: &str) -> Result<Group> {
        Ok(self.file.group(name)?)
    }
}
