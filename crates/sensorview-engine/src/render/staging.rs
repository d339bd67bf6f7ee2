//! CPU side of a dynamic 2D texture upload.
//!
//! A [`StagingTexture`] mirrors the GPU's pitched layout: rows are
//! `row_pitch` bytes apart, which may exceed the logical row width. Writers
//! get a write-only, discard-mode [`MappedRegion`] and must place each row at
//! `y * row_pitch`.

use crate::error::{Error, Result};
use crate::sensor::DepthGrid;

/// Rounds `row_bytes` up to the next multiple of `alignment`.
#[inline]
pub fn pitch_for(row_bytes: usize, alignment: usize) -> usize {
    debug_assert!(alignment > 0);
    row_bytes.div_ceil(alignment) * alignment
}

/// Pitched staging memory for one texture.
#[derive(Debug, Clone)]
pub struct StagingTexture {
    bytes: Vec<u8>,
    row_bytes: usize,
    row_pitch: usize,
    height: usize,
}

impl StagingTexture {
    pub fn new(row_bytes: usize, row_pitch: usize, height: usize) -> Self {
        assert!(row_pitch >= row_bytes, "row pitch smaller than row width");
        Self {
            bytes: vec![0; row_pitch * height],
            row_bytes,
            row_pitch,
            height,
        }
    }

    #[inline]
    pub fn row_pitch(&self) -> usize {
        self.row_pitch
    }

    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Opens a write-only mapping. Previous contents are undefined to the writer.
    pub fn map_write_discard(&mut self) -> MappedRegion<'_> {
        MappedRegion {
            data: &mut self.bytes,
            row_bytes: self.row_bytes,
            row_pitch: self.row_pitch,
            height: self.height,
        }
    }

    /// The whole pitched buffer, as handed to the GPU on unmap.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Logical bytes of row `y` (padding excluded).
    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.row_pitch;
        &self.bytes[start..start + self.row_bytes]
    }
}

/// Mutable view of pitched memory, valid until dropped.
pub struct MappedRegion<'a> {
    data: &'a mut [u8],
    row_bytes: usize,
    row_pitch: usize,
    height: usize,
}

impl MappedRegion<'_> {
    #[inline]
    pub fn row_pitch(&self) -> usize {
        self.row_pitch
    }

    /// Copies one full logical row to `y * row_pitch`.
    ///
    /// Returns the number of bytes written, always `row_bytes`.
    pub fn write_row(&mut self, y: usize, src: &[u8]) -> Result<usize> {
        if y >= self.height {
            return Err(Error::GpuCallFailed(format!(
                "row {y} outside mapped region of {} rows",
                self.height
            )));
        }
        if src.len() != self.row_bytes {
            return Err(Error::GpuCallFailed(format!(
                "row {y} is {} bytes, mapped rows are {}",
                src.len(),
                self.row_bytes
            )));
        }

        let start = y * self.row_pitch;
        self.data[start..start + self.row_bytes].copy_from_slice(src);
        Ok(self.row_bytes)
    }
}

/// Copies every row of `grid` into `region`, honoring the destination pitch.
///
/// Returns the bytes written per row.
pub fn write_depth_rows(grid: &DepthGrid<'_>, region: &mut MappedRegion<'_>) -> Result<usize> {
    if grid.height() != region.height || grid.row_bytes() != region.row_bytes {
        return Err(Error::GpuCallFailed(format!(
            "depth grid {}x{} does not match mapped texture ({} rows of {} bytes)",
            grid.width(),
            grid.height(),
            region.height,
            region.row_bytes
        )));
    }

    for y in 0..grid.height() {
        region.write_row(y, grid.row(y))?;
    }
    Ok(grid.row_bytes())
}
