//! Random access to the bytes of one line.

/// A view of a physical line, read by 1-based byte address.
///
/// Peeking never consumes: the same bytes can be read again by a later
/// state.
#[derive(Debug, Clone, Copy)]
pub struct LineCursor<'a> {
    r: &'a [u8],
}

impl<'a> LineCursor<'a> {
    /// Wrap a line, without its terminator.
    pub fn new(r: &'a [u8]) -> Self {
        Self { r }
    }

    /// Number of bytes present.
    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    /// Whether every byte up to and including an address is present.
    pub fn reaches(&self, address: u16) -> bool {
        self.r.len() >= address as usize
    }

    /// Copy `N` bytes starting at an address. Bytes beyond the end of the
    /// line read as blanks.
    pub fn peek<const N: usize>(&self, address: u16) -> [u8; N] {
        let mut buf = [b' '; N];

        let start = (address as usize).saturating_sub(1);
        if let Some(available) = self.r.get(start..) {
            let n = available.len().min(N);
            buf[..n].copy_from_slice(&available[..n]);
        }

        buf
    }

    /// The whole line.
    pub fn bytes(&self) -> &'a [u8] {
        self.r
    }
}
