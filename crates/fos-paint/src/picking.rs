//! GPU Picking
//!
//! Pixel layout: the low 20 bits hold `render index + 1` (0 is the
//! background), the high 12 bits hold a 1-based virtual child index
//! (0 when the pixel belongs to the node itself).

use fos_scene::NodeId;

use crate::{PickingError, Result};

pub const NODE_INDEX_BITS: u32 = 20;
pub const VIRTUAL_CHILD_BITS: u32 = 32 - NODE_INDEX_BITS;

const NODE_MASK: u32 = (1 << NODE_INDEX_BITS) - 1;

/// Nodes a single frame can make pickable
pub const MAX_INDEXED_NODES: u32 = NODE_MASK;
pub const MAX_VIRTUAL_CHILD: u16 = (1 << VIRTUAL_CHILD_BITS) as u16 - 1;

/// Pack a render index and virtual child into a pixel value.
///
/// Returns `None` when either part does not fit.
pub fn encode_pick_id(index: u32, virtual_child: u16) -> Option<u32> {
    if index >= MAX_INDEXED_NODES || virtual_child > MAX_VIRTUAL_CHILD {
        return None;
    }
    Some(((virtual_child as u32) << NODE_INDEX_BITS) | (index + 1))
}

/// Unpack a pixel value; `None` for background
pub fn decode_pick_id(pixel: u32) -> Option<(u32, u16)> {
    let raw = pixel & NODE_MASK;
    if raw == 0 {
        return None;
    }
    Some((raw - 1, (pixel >> NODE_INDEX_BITS) as u16))
}

/// Picking image size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Render backend side of picking
pub trait PickingSource {
    /// Current size of the picking image
    fn extent(&self) -> Extent;

    /// Bumped every time the picking image is redrawn
    fn redraw_version(&self) -> u64;

    /// Copy the picking image, row-major, into `dst`
    fn copy_to_buffer(&mut self, dst: &mut [u32]) -> Result<()>;
}

/// Resolved pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub node: NodeId,
    pub index: u32,
    /// 1-based virtual child, 0 for the node itself
    pub virtual_child: u16,
}

/// CPU-side copy of the picking image
#[derive(Debug, Default)]
pub struct PickingBuffer {
    extent: Extent,
    pixels: Vec<u32>,
    staging: Vec<u32>,
    version: Option<u64>,
}

impl PickingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Redraw version of the current contents
    #[inline]
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    /// Backend recreated its picking image; resize and drop stale contents
    pub fn on_recreated(&mut self, extent: Extent) {
        tracing::debug!(width = extent.width, height = extent.height, "picking buffer resized");
        self.extent = extent;
        self.pixels.clear();
        self.pixels.resize(extent.pixel_count(), 0);
        self.staging.clear();
        self.version = None;
    }

    /// Copy the image from `source` if it was redrawn since the last copy.
    ///
    /// Returns whether a copy happened. On failure the previous contents
    /// stay in place and the next call retries.
    pub fn refresh<S: PickingSource + ?Sized>(&mut self, source: &mut S) -> Result<bool> {
        let extent = source.extent();
        if extent != self.extent {
            self.on_recreated(extent);
        }
        let version = source.redraw_version();
        if self.version == Some(version) {
            return Ok(false);
        }

        self.staging.clear();
        self.staging.resize(self.pixels.len(), 0);
        if let Err(err) = source.copy_to_buffer(&mut self.staging) {
            tracing::warn!(%err, version, "picking readback failed");
            return Err(err);
        }
        std::mem::swap(&mut self.pixels, &mut self.staging);
        self.version = Some(version);
        tracing::debug!(version, "picking buffer read back");
        Ok(true)
    }

    /// Raw pixel at screen position, `None` outside the image
    pub fn pixel(&self, x: f32, y: f32) -> Option<u32> {
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        let (px, py) = (x as u32, y as u32);
        if px >= self.extent.width || py >= self.extent.height {
            return None;
        }
        let offset = py as usize * self.extent.width as usize + px as usize;
        self.pixels.get(offset).copied()
    }

    /// Node under `(x, y)` in the frame whose render order is `nodes`
    pub fn hit_test(&self, x: f32, y: f32, nodes: &[NodeId]) -> Option<Hit> {
        let (index, virtual_child) = decode_pick_id(self.pixel(x, y)?)?;
        let node = *nodes.get(index as usize)?;
        Some(Hit {
            node,
            index,
            virtual_child,
        })
    }

    /// Overwrite the contents directly, bypassing a backend
    pub fn load(&mut self, extent: Extent, pixels: &[u32], version: u64) -> Result<()> {
        if pixels.len() != extent.pixel_count() {
            return Err(PickingError::SizeMismatch {
                expected: extent.pixel_count(),
                actual: pixels.len(),
            });
        }
        self.extent = extent;
        self.pixels.clear();
        self.pixels.extend_from_slice(pixels);
        self.version = Some(version);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_scene::SceneTree;

    struct Image {
        extent: Extent,
        pixels: Vec<u32>,
        version: u64,
        copies: usize,
        fail: bool,
    }

    impl PickingSource for Image {
        fn extent(&self) -> Extent {
            self.extent
        }

        fn redraw_version(&self) -> u64 {
            self.version
        }

        fn copy_to_buffer(&mut self, dst: &mut [u32]) -> Result<()> {
            if self.fail {
                return Err(PickingError::Readback("device lost".into()));
            }
            if dst.len() != self.pixels.len() {
                return Err(PickingError::SizeMismatch {
                    expected: dst.len(),
                    actual: self.pixels.len(),
                });
            }
            dst.copy_from_slice(&self.pixels);
            self.copies += 1;
            Ok(())
        }
    }

    fn image(width: u32, height: u32, fill: u32) -> Image {
        Image {
            extent: Extent::new(width, height),
            pixels: vec![fill; (width * height) as usize],
            version: 1,
            copies: 0,
            fail: false,
        }
    }

    #[test]
    fn test_encode_decode() {
        assert_eq!(decode_pick_id(0), None);
        assert_eq!(encode_pick_id(0, 0), Some(1));
        assert_eq!(decode_pick_id(encode_pick_id(41, 3).unwrap()), Some((41, 3)));
        assert_eq!(
            decode_pick_id(encode_pick_id(MAX_INDEXED_NODES - 1, MAX_VIRTUAL_CHILD).unwrap()),
            Some((MAX_INDEXED_NODES - 1, MAX_VIRTUAL_CHILD))
        );
        assert_eq!(encode_pick_id(MAX_INDEXED_NODES, 0), None);
        assert_eq!(encode_pick_id(0, MAX_VIRTUAL_CHILD + 1), None);
    }

    #[test]
    fn test_virtual_child_only_pixel_is_background() {
        // Sub-index bits without node bits carry no node
        assert_eq!(decode_pick_id(5 << NODE_INDEX_BITS), None);
    }

    #[test]
    fn test_refresh_copies_only_on_new_version() {
        let mut source = image(4, 4, 1);
        let mut buffer = PickingBuffer::new();

        assert_eq!(buffer.refresh(&mut source), Ok(true));
        assert_eq!(buffer.extent(), Extent::new(4, 4));
        assert_eq!(buffer.refresh(&mut source), Ok(false));
        assert_eq!(source.copies, 1);

        source.version = 2;
        assert_eq!(buffer.refresh(&mut source), Ok(true));
        assert_eq!(source.copies, 2);
    }

    #[test]
    fn test_failed_readback_keeps_previous_contents() {
        let mut source = image(2, 2, 1);
        let mut buffer = PickingBuffer::new();
        buffer.refresh(&mut source).unwrap();

        source.pixels = vec![2; 4];
        source.version = 2;
        source.fail = true;
        assert!(buffer.refresh(&mut source).is_err());
        assert_eq!(buffer.pixel(0.0, 0.0), Some(1));
        assert_eq!(buffer.version(), Some(1));

        source.fail = false;
        assert_eq!(buffer.refresh(&mut source), Ok(true));
        assert_eq!(buffer.pixel(0.0, 0.0), Some(2));
    }

    #[test]
    fn test_recreated_image_resizes() {
        let mut source = image(2, 2, 1);
        let mut buffer = PickingBuffer::new();
        buffer.refresh(&mut source).unwrap();

        source.extent = Extent::new(3, 1);
        source.pixels = vec![7; 3];
        // Same version, new size: contents must still be re-read
        assert_eq!(buffer.refresh(&mut source), Ok(true));
        assert_eq!(buffer.pixel(2.0, 0.0), Some(7));
        assert_eq!(buffer.pixel(0.0, 1.0), None);
    }

    #[test]
    fn test_hit_test_bounds() {
        let mut tree = SceneTree::new();
        let root = tree.create_root();
        let nodes = vec![root];
        let mut buffer = PickingBuffer::new();
        buffer
            .load(Extent::new(2, 1), &[0, encode_pick_id(0, 2).unwrap()], 1)
            .unwrap();

        assert_eq!(buffer.hit_test(0.5, 0.5, &nodes), None);
        assert_eq!(
            buffer.hit_test(1.5, 0.0, &nodes),
            Some(Hit {
                node: root,
                index: 0,
                virtual_child: 2
            })
        );
        assert_eq!(buffer.hit_test(2.0, 0.0, &nodes), None);
        assert_eq!(buffer.hit_test(-0.5, 0.0, &nodes), None);
        assert_eq!(buffer.hit_test(f32::NAN, 0.0, &nodes), None);
    }

    #[test]
    fn test_hit_test_index_out_of_range() {
        let mut tree = SceneTree::new();
        let root = tree.create_root();
        let mut buffer = PickingBuffer::new();
        buffer
            .load(Extent::new(1, 1), &[encode_pick_id(1, 0).unwrap()], 1)
            .unwrap();
        assert_eq!(buffer.hit_test(0.0, 0.0, &[root]), None);
    }

    #[test]
    fn test_load_rejects_wrong_size() {
        let mut buffer = PickingBuffer::new();
        assert_eq!(
            buffer.load(Extent::new(2, 2), &[0; 3], 1),
            Err(PickingError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        );
    }
}
