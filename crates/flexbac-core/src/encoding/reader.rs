use crate::DecodeError;

/// Cursor that hands out borrowed slices of a received frame.
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    unread: &'a [u8],
    consumed: usize,
}

impl<'a> Reader<'a> {
    pub const fn new(buf: &'a [u8]) -> Self {
        Self {
            unread: buf,
            consumed: 0,
        }
    }

    /// Bytes consumed so far.
    pub const fn position(&self) -> usize {
        self.consumed
    }

    pub const fn remaining(&self) -> usize {
        self.unread.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.unread.is_empty()
    }

    pub const fn rest(&self) -> &'a [u8] {
        self.unread
    }

    pub fn peek_u8(&self) -> Result<u8, DecodeError> {
        self.unread.first().copied().ok_or(DecodeError::UnexpectedEof)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    pub fn read_exact(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.unread.len() {
            return Err(DecodeError::UnexpectedEof);
        }
        let (head, tail) = self.unread.split_at(len);
        self.unread = tail;
        self.consumed += len;
        Ok(head)
    }

    pub fn read_be_u16(&mut self) -> Result<u16, DecodeError> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_be_u32(&mut self) -> Result<u32, DecodeError> {
        self.read_array().map(u32::from_be_bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_exact(N)?);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::Reader;
    use crate::DecodeError;

    #[test]
    fn consumes_front_to_back() {
        let mut r = Reader::new(&[0x81, 0x0A, 0x00, 0x11, 0x01, 0x04]);
        assert_eq!(r.read_u8().unwrap(), 0x81);
        assert_eq!(r.read_u8().unwrap(), 0x0A);
        assert_eq!(r.read_be_u16().unwrap(), 17);
        assert_eq!(r.position(), 4);
        assert_eq!(r.rest(), &[0x01, 0x04]);
        assert_eq!(r.remaining(), 2);
    }

    #[test]
    fn short_read_leaves_cursor_untouched() {
        let mut r = Reader::new(&[0xAB]);
        assert_eq!(r.read_be_u32().unwrap_err(), DecodeError::UnexpectedEof);
        assert_eq!(r.peek_u8().unwrap(), 0xAB);
        assert_eq!(r.read_u8().unwrap(), 0xAB);
        assert!(r.is_empty());
        assert_eq!(r.read_u8().unwrap_err(), DecodeError::UnexpectedEof);
    }
}
