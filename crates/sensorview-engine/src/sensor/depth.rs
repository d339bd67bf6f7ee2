/// Depth raster width for this device generation.
pub const DEPTH_WIDTH: usize = 512;

/// Depth raster height for this device generation.
pub const DEPTH_HEIGHT: usize = 424;

pub const DEPTH_BYTES_PER_SAMPLE: usize = std::mem::size_of::<u16>();

/// Borrowed view of one depth frame's samples.
///
/// Borrows from the acquired frame, so the grid cannot outlive the frame
/// handle it was decoded from. Samples are passed through as delivered:
/// `0` means "no return" and is not filtered.
#[derive(Debug, Copy, Clone)]
pub struct DepthGrid<'a> {
    samples: &'a [u16],
    width: usize,
    height: usize,
}

impl<'a> DepthGrid<'a> {
    /// Wraps a raster. Returns `None` if `samples.len() != width * height`.
    pub fn new(samples: &'a [u16], width: usize, height: usize) -> Option<Self> {
        (samples.len() == width * height).then_some(Self {
            samples,
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn samples(&self) -> &'a [u16] {
        self.samples
    }

    /// Bytes in one logical row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width * DEPTH_BYTES_PER_SAMPLE
    }

    /// Row `y` as raw bytes (native endianness).
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.width;
        bytemuck::cast_slice(&self.samples[start..start + self.width])
    }
}
