use crate::EncodeError;

/// Output buffer for one outgoing frame.
///
/// Frames built by this crate are bounded by the 1476-byte BACnet/IP APDU
/// limit, so the buffer simply grows instead of failing on a short slice.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_written(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_all(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    pub fn write_be_u16(&mut self, value: u16) {
        self.write_all(&value.to_be_bytes());
    }

    pub fn write_be_u32(&mut self, value: u32) {
        self.write_all(&value.to_be_bytes());
    }

    /// Overwrites two bytes at `offset` with `value`, big-endian.
    ///
    /// Used to back-patch length fields once the payload is known.
    pub fn patch_be_u16(&mut self, offset: usize, value: u16) -> Result<(), EncodeError> {
        let slot = self
            .buf
            .get_mut(offset..offset + 2)
            .ok_or(EncodeError::InvalidLength)?;
        slot.copy_from_slice(&value.to_be_bytes());
        Ok(())
    }
}
