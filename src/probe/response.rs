/// Writes little-endian reply data into a fixed buffer.
///
/// Data that does not fit is dropped, which truncates replies to the
/// length the host asked for.
pub struct ResponseWriter<'a> {
    /// Destination buffer.
    pub buf: &'a mut [u8],
    /// Number of bytes written.
    pub idx: usize,
}

impl<'a> ResponseWriter<'a> {
    /// Start writing at the beginning of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        ResponseWriter { buf, idx: 0 }
    }

    /// Append one byte.
    pub fn write_u8(&mut self, value: u8) {
        self.write_slice(&[value]);
    }

    /// Append a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) {
        self.write_slice(&value.to_le_bytes());
    }

    /// Append as much of `data` as fits.
    pub fn write_slice(&mut self, data: &[u8]) {
        let n = data.len().min(self.buf.len() - self.idx);
        self.buf[self.idx..self.idx + n].copy_from_slice(&data[..n]);
        self.idx += n;
    }

    /// The bytes written so far.
    pub fn written(self) -> &'a [u8] {
        let ResponseWriter { buf, idx } = self;
        let buf: &'a [u8] = buf;
        &buf[..idx]
    }
}
