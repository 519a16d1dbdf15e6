//! Bounds-checked field extraction for fixed-layout headers
//!
//! Decoding is permissive: a field whose bytes lie (even partly) past the
//! end of the buffer is not read and takes its default value instead. The
//! reader still advances by the field's width so later offsets stay fixed.

/// Sequential reader over a header at fixed offsets.
#[derive(Debug)]
pub(crate) struct FieldReader<'a> {
    data: &'a [u8],
    offset: usize,
    missing: usize,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            missing: 0,
        }
    }

    /// Reads `N` bytes, or returns `None` and counts the field as missing.
    pub(crate) fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let start = self.offset;
        self.offset += N;
        let field = self
            .data
            .get(start..self.offset)
            .and_then(|bytes| <[u8; N]>::try_from(bytes).ok());
        if field.is_none() {
            self.missing += 1;
        }
        field
    }

    /// Fixed-width byte array, zero-filled when unavailable
    pub(crate) fn bytes<const N: usize>(&mut self) -> [u8; N] {
        self.take::<N>().unwrap_or([0u8; N])
    }

    pub(crate) fn u8(&mut self) -> u8 {
        self.take::<1>().map_or(0, |[b]| b)
    }

    pub(crate) fn u16_be(&mut self) -> u16 {
        self.take::<2>().map_or(0, u16::from_be_bytes)
    }

    pub(crate) fn u32_be(&mut self) -> u32 {
        self.take::<4>().map_or(0, u32::from_be_bytes)
    }

    pub(crate) fn i32_be(&mut self) -> i32 {
        self.take::<4>().map_or(0, i32::from_be_bytes)
    }

    /// Number of fields that fell back to their default
    pub(crate) fn missing(&self) -> usize {
        self.missing
    }

    /// Everything after the fields read so far; empty if the header itself
    /// was truncated.
    pub(crate) fn rest(&self) -> Vec<u8> {
        self.data
            .get(self.offset..)
            .map(<[u8]>::to_vec)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_fields_in_order() {
        let data = [0x01, 0x02, 0x03, 0x00, 0x00, 0x00, 0x05, 0xAA];
        let mut reader = FieldReader::new(&data);

        assert_eq!(reader.u8(), 0x01);
        assert_eq!(reader.u16_be(), 0x0203);
        assert_eq!(reader.u32_be(), 5);
        assert_eq!(reader.missing(), 0);
        assert_eq!(reader.rest(), vec![0xAA]);
    }

    #[test]
    fn test_partial_field_defaults() {
        // Only one byte of the u16 is present
        let data = [0x7F, 0x12];
        let mut reader = FieldReader::new(&data);

        assert_eq!(reader.u8(), 0x7F);
        assert_eq!(reader.u16_be(), 0);
        assert_eq!(reader.i32_be(), 0);
        assert_eq!(reader.bytes::<3>(), [0, 0, 0]);
        assert_eq!(reader.missing(), 3);
        assert!(reader.rest().is_empty());
    }

    #[test]
    fn test_negative_i32() {
        let data = (-2i32).to_be_bytes();
        let mut reader = FieldReader::new(&data);
        assert_eq!(reader.i32_be(), -2);
    }

    #[test]
    fn test_empty_input() {
        let mut reader = FieldReader::new(&[]);
        assert_eq!(reader.u8(), 0);
        assert_eq!(reader.bytes::<6>(), [0u8; 6]);
        assert_eq!(reader.missing(), 2);
        assert!(reader.rest().is_empty());
    }
}
