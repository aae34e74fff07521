//! Path-level API: the primary embedding surface.
//!
//! ```no_run
//! use imodkit::model_file;
//!
//! let model = model_file::open("cell.mod")?;
//! println!("{} objects", model.object_count());
//! model_file::save("cell_copy.mod", &model)?;
//! # Ok::<(), imodkit::ImodError>(())
//! ```
//!
//! Files are read into memory whole and decoded from the buffer; the file
//! handle is closed before decoding starts.

use log::debug;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::io_stream::{decode, ModelWriter};
use crate::model::Model;

pub fn open<P: AsRef<Path>>(path: P) -> Result<Model> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(decode(&bytes)?)
}

/// Encode `model` straight into `path`.  A failure part-way leaves a partial
/// file behind.
pub fn write<P: AsRef<Path>>(path: P, model: &Model) -> Result<u64> {
    let file = BufWriter::new(File::create(path.as_ref())?);
    let mut writer = ModelWriter::new(file);
    let written = writer.write_model(model)?;
    writer.into_inner().into_inner().map_err(|e| e.into_error())?.sync_all()?;
    Ok(written)
}

/// Encode `model` to a sibling temp file, then rename it over `path`.
/// On failure the previous contents of `path` are untouched.
pub fn save<P: AsRef<Path>>(path: P, model: &Model) -> Result<u64> {
    let path = path.as_ref();
    let tmp = temp_path(path);
    match write(&tmp, model) {
        Ok(written) => {
            fs::rename(&tmp, path)?;
            debug!("saved {written} bytes to {}", path.display());
            Ok(written)
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Decode several files.  Results are returned in input order; one bad file
/// does not affect the others.
///
/// With the `parallel` feature, files are decoded concurrently using Rayon.
pub fn open_many<P: AsRef<Path> + Sync>(paths: &[P]) -> Vec<Result<Model>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        paths.par_iter().map(open).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        paths.iter().map(open).collect()
    }
}
