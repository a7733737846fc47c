//! Per-`(format, elementCount)` freelist of typed buffers, with a per-frame
//! in-use set reclaimed wholesale by [`BufferPool::release_all`].

use std::collections::HashMap;

use crate::field::format::{BufferFormat, BufferView};

/// Key identifying one freelist bucket.
type PoolKey = (BufferFormatKey, usize);

/// [`BufferFormat`] isn't `Eq`/`Hash` over floats (it has none), but we key
/// on it directly — it's a plain tag enum, so derive the key type locally to
/// keep `BufferFormat` focused on stride/parsing concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BufferFormatKey {
    F32,
    F64,
    I32,
    U32,
    U8,
    Vec2F32,
    Vec3F32,
    Vec4F32,
    QuatF32,
    Mat4F32,
    Rgba8,
}

impl From<BufferFormat> for BufferFormatKey {
    fn from(f: BufferFormat) -> Self {
        match f {
            BufferFormat::F32 => BufferFormatKey::F32,
            BufferFormat::F64 => BufferFormatKey::F64,
            BufferFormat::I32 => BufferFormatKey::I32,
            BufferFormat::U32 => BufferFormatKey::U32,
            BufferFormat::U8 => BufferFormatKey::U8,
            BufferFormat::Vec2F32 => BufferFormatKey::Vec2F32,
            BufferFormat::Vec3F32 => BufferFormatKey::Vec3F32,
            BufferFormat::Vec4F32 => BufferFormatKey::Vec4F32,
            BufferFormat::QuatF32 => BufferFormatKey::QuatF32,
            BufferFormat::Mat4F32 => BufferFormatKey::Mat4F32,
            BufferFormat::Rgba8 => BufferFormatKey::Rgba8,
        }
    }
}

/// Pool statistics, per `spec.md §4.2`'s `{pooled, inUse}` report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub pooled: usize,
    pub in_use: usize,
}

/// Freelist-backed buffer pool. `alloc` pops a reusable buffer of matching
/// `(format, elementCount)` or allocates fresh; buffers stay tracked as
/// in-use until [`BufferPool::release_all`].
#[derive(Debug, Default)]
pub struct BufferPool {
    free: HashMap<PoolKey, Vec<BufferView>>,
    in_use_count: usize,
}

impl BufferPool {
    /// An empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a buffer of `format` sized for `element_count` elements,
    /// reusing a freed buffer of the identical key if one exists.
    pub fn alloc(&mut self, format: BufferFormat, element_count: usize) -> BufferView {
        let key = (format.into(), element_count);
        self.in_use_count += 1;
        match self.free.get_mut(&key).and_then(Vec::pop) {
            Some(mut buf) => {
                zero_fill(&mut buf);
                buf
            }
            None => BufferView::zeroed(format, element_count),
        }
    }

    /// Return every in-use buffer to its freelist and clear the in-use set.
    /// Callers must not retain references past this call.
    pub fn release_all(&mut self, buffers: Vec<(BufferFormat, usize, BufferView)>) {
        for (format, element_count, buf) in buffers {
            let key = (format.into(), element_count);
            self.free.entry(key).or_default().push(buf);
        }
        self.in_use_count = 0;
    }

    /// Current pool statistics.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            pooled: self.free.values().map(Vec::len).sum(),
            in_use: self.in_use_count,
        }
    }
}

fn zero_fill(buf: &mut BufferView) {
    match buf {
        BufferView::F32(v) => v.iter_mut().for_each(|x| *x = 0.0),
        BufferView::F64(v) => v.iter_mut().for_each(|x| *x = 0.0),
        BufferView::I32(v) => v.iter_mut().for_each(|x| *x = 0),
        BufferView::U32(v) => v.iter_mut().for_each(|x| *x = 0),
        BufferView::U8(v) => v.iter_mut().for_each(|x| *x = 0),
    }
}
