//! Integration tests for the buffer pool against `spec.md §8`'s round-trip
//! property (law 9) and scenario S6.

use sigfield_core::field::{BufferFormat, BufferPool, PoolStats};

/// S6 / law 9: after `releaseAll`, a subsequent `alloc` of the identical
/// `(format, elementCount)` reuses a freed buffer rather than growing the
/// pool; a differently-shaped request still allocates fresh.
#[test]
fn scenario_s6_buffer_pool_round_trip() {
    let mut pool = BufferPool::new();

    let buf1 = pool.alloc(BufferFormat::F32, 100);
    assert_eq!(pool.stats(), PoolStats { pooled: 0, in_use: 1 });

    pool.release_all(vec![(BufferFormat::F32, 100, buf1)]);
    assert_eq!(pool.stats(), PoolStats { pooled: 1, in_use: 0 });

    let buf2 = pool.alloc(BufferFormat::F32, 100);
    assert_eq!(pool.stats(), PoolStats { pooled: 0, in_use: 1 }, "alloc must reuse the released buffer");
    assert_eq!(buf2.raw_len(), 100);

    let buf3 = pool.alloc(BufferFormat::F32, 200);
    assert_eq!(
        pool.stats(),
        PoolStats { pooled: 0, in_use: 2 },
        "a differently-shaped request must allocate fresh, not from the 100-element freelist"
    );
    assert_eq!(buf3.raw_len(), 200);
}

/// Different formats never share a freelist bucket, even at the same
/// element count.
#[test]
fn different_format_same_element_count_does_not_share_a_bucket() {
    let mut pool = BufferPool::new();

    let vec2_buf = pool.alloc(BufferFormat::Vec2F32, 50);
    pool.release_all(vec![(BufferFormat::Vec2F32, 50, vec2_buf)]);
    assert_eq!(pool.stats(), PoolStats { pooled: 1, in_use: 0 });

    let _scalar_buf = pool.alloc(BufferFormat::F32, 50);
    assert_eq!(
        pool.stats(),
        PoolStats { pooled: 1, in_use: 1 },
        "an f32 alloc must not consume a released vec2f32 buffer"
    );
}

/// Released buffers come back zero-filled, so reuse never leaks a previous
/// frame's data into a fresh allocation.
#[test]
fn reused_buffer_is_zero_filled() {
    let mut pool = BufferPool::new();

    let mut buf1 = pool.alloc(BufferFormat::F32, 4);
    if let Some(slice) = buf1.as_f32_mut() {
        slice.copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
    }
    pool.release_all(vec![(BufferFormat::F32, 4, buf1)]);

    let buf2 = pool.alloc(BufferFormat::F32, 4);
    assert_eq!(buf2.as_f32(), Some([0.0, 0.0, 0.0, 0.0].as_slice()));
}
