//! Builds POD byte streams tag by tag.
//!
//! The writer performs no validation: blocks are opened with [`TagWriter::begin`] and closed
//! with [`TagWriter::end`] in whatever order the caller chooses, which makes it suitable for
//! producing malformed streams as well as valid ones.

use {
    super::reader::{
        FORMAT_VERSION,
        tag::{self, END_TAG_MASK},
    },
    byteorder::{ByteOrder, LittleEndian},
    log::trace,
};

#[derive(Debug, Default)]
pub struct TagWriter {
    buf: Vec<u8>,
}

impl TagWriter {
    /// Opens a block.
    pub fn begin(&mut self, identifier: u32) {
        self.write_header(identifier, 0);
    }

    /// Closes a block.
    pub fn end(&mut self, identifier: u32) {
        self.write_header(identifier | END_TAG_MASK, 0);
    }

    /// Returns the bytes written so far.
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Writes a tag whose payload is `data`, unchanged.
    pub fn write_bytes(&mut self, identifier: u32, data: &[u8]) {
        trace!("Writing tag {identifier} ({} bytes)", data.len());

        self.write_header(identifier, data.len() as _);
        self.buf.extend_from_slice(data);
    }

    pub fn write_f32s(&mut self, identifier: u32, vals: &[f32]) {
        let mut data = vec![0; vals.len() * 4];
        LittleEndian::write_f32_into(vals, &mut data);

        self.write_bytes(identifier, &data);
    }

    pub fn write_i32(&mut self, identifier: u32, val: i32) {
        self.write_u32(identifier, val as _);
    }

    /// Writes a string payload followed by a NUL terminator.
    pub fn write_str(&mut self, identifier: u32, val: &str) {
        let mut data = Vec::with_capacity(val.len() + 1);
        data.extend_from_slice(val.as_bytes());
        data.push(0);

        self.write_bytes(identifier, &data);
    }

    pub fn write_u32(&mut self, identifier: u32, val: u32) {
        self.write_u32s(identifier, &[val]);
    }

    pub fn write_u32s(&mut self, identifier: u32, vals: &[u32]) {
        let mut data = vec![0; vals.len() * 4];
        LittleEndian::write_u32_into(vals, &mut data);

        self.write_bytes(identifier, &data);
    }

    /// Writes the format version tag expected at the start of every file.
    pub fn write_version(&mut self) {
        self.write_bytes(tag::FORMAT_VERSION, FORMAT_VERSION);
    }

    fn write_header(&mut self, identifier: u32, data_length: u32) {
        let mut header = [0; 8];
        LittleEndian::write_u32(&mut header[0..4], identifier);
        LittleEndian::write_u32(&mut header[4..8], data_length);

        self.buf.extend_from_slice(&header);
    }
}
