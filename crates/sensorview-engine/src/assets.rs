//! Startup assets: shader sources loaded from disk.
//!
//! Shaders live in a `shaders/` directory next to the executable, one
//! vertex and one fragment file per modality:
//! `depth.vs.wgsl`, `depth.fs.wgsl`, `body.vs.wgsl`, `body.fs.wgsl`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::sensor::Modality;

/// Directory holding the running executable.
pub fn exe_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| Error::AssetNotFound(format!("cannot locate executable: {e}")))?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::AssetNotFound(format!("{} has no parent directory", exe.display())))
}

/// Default shader directory: `<exe dir>/shaders`.
pub fn default_shader_dir() -> Result<PathBuf> {
    Ok(exe_dir()?.join("shaders"))
}

/// Reads a UTF-8 asset. A missing, unreadable or empty file is `AssetNotFound`.
pub fn load_asset(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    let text = fs::read_to_string(&path)
        .map_err(|e| Error::AssetNotFound(format!("{}: {e}", path.display())))?;

    if text.trim().is_empty() {
        return Err(Error::AssetNotFound(format!("{} is empty", path.display())));
    }

    log::debug!("loaded {} ({} bytes)", path.display(), text.len());
    Ok(text)
}

/// WGSL source for one variant's vertex and fragment stages.
#[derive(Debug, Clone)]
pub struct ShaderSet {
    pub modality: Modality,
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSet {
    pub fn file_names(modality: Modality) -> (String, String) {
        (format!("{modality}.vs.wgsl"), format!("{modality}.fs.wgsl"))
    }

    pub fn load(dir: &Path, modality: Modality) -> Result<Self> {
        let (vs, fs) = Self::file_names(modality);
        Ok(Self {
            modality,
            vertex: load_asset(dir, &vs)?,
            fragment: load_asset(dir, &fs)?,
        })
    }
}
