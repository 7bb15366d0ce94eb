//! Convenience functions to make working with the library easier.

use std::{sync::Arc, sync::RwLock};

use crate::{ReadBuffer, WriteBuffer};

/// Convenience function that creates a read buffer suitable for use with our
/// callback and promise-mode functions.
pub fn create_read_buffer(size: usize) -> ReadBuffer {
    Arc::new(RwLock::new(vec![0; size]))
}

/// Convenience function that wraps owned bytes as a write buffer.
pub fn create_write_buffer(data: Vec<u8>) -> WriteBuffer {
    Arc::new(data)
}

/// Copies the filled prefix of a read buffer out into an owned payload,
/// clamped to the buffer's capacity.
pub(crate) fn copy_filled_prefix(buffer: &ReadBuffer, count: usize) -> Vec<u8> {
    let mut guard = buffer.write().unwrap();
    let data = guard.as_mut();
    data[..count.min(data.len())].to_vec()
}
