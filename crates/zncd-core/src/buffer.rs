//! Growable byte accumulator for drained codec output

use bytes::{Bytes, BytesMut};

/// Append-only buffer that collects output across any number of drain passes.
#[derive(Debug, Default, Clone)]
pub struct ByteBuffer {
    inner: BytesMut,
}

impl ByteBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a drained increment.
    pub fn append(&mut self, data: &[u8]) {
        self.inner.extend_from_slice(data);
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if nothing is held.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Remove and return everything held so far, leaving the buffer empty.
    pub fn take(&mut self) -> Bytes {
        self.inner.split().freeze()
    }

    /// Hand the bytes over as an immutable, cheaply cloneable buffer.
    pub fn freeze(self) -> Bytes {
        self.inner.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_accumulates_in_order() {
        let mut buf = ByteBuffer::new();
        assert!(buf.is_empty());
        buf.append(b"abc");
        buf.append(b"");
        buf.append(b"def");
        assert_eq!(buf.len(), 6);
        assert_eq!(buf.freeze().as_ref(), b"abcdef");
    }

    #[test]
    fn test_take_drains_prefix() {
        let mut buf = ByteBuffer::new();
        buf.append(b"head");
        assert_eq!(buf.take().as_ref(), b"head");
        assert!(buf.is_empty());
        buf.append(b"tail");
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.freeze().as_ref(), b"tail");
    }
}
