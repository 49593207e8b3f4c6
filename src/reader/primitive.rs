//! Little-endian primitive decoding.
//!
//! Every multi-byte value in a POD file is little-endian regardless of the host which wrote it.
//! Values are always reconstructed from their bytes; raw vertex and index data is rewritten into
//! host byte order before it is stored.

use {
    crate::error::Error,
    byteorder::{ByteOrder, LittleEndian, ReadBytesExt},
    std::io::Read,
};

/// Reads exactly `len` bytes.
///
/// The buffer grows with the data actually read, so a corrupt length cannot force a large
/// allocation up front.
pub(crate) fn read_bytes(
    reader: &mut impl Read,
    len: usize,
    context: &'static str,
) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::with_capacity(len.min(64 * 1024));
    reader
        .take(len as u64)
        .read_to_end(&mut buf)
        .map_err(|err| Error::from_io(err, context))?;

    if buf.len() != len {
        return Err(Error::Truncated { context });
    }

    Ok(buf)
}

pub(crate) fn read_u32(reader: &mut impl Read, context: &'static str) -> Result<u32, Error> {
    reader
        .read_u32::<LittleEndian>()
        .map_err(|err| Error::from_io(err, context))
}

/// Decodes whole little-endian `u32` values; trailing bytes which do not form a value are
/// ignored.
pub(crate) fn decode_u32s(data: &[u8]) -> Vec<u32> {
    data.chunks_exact(4).map(LittleEndian::read_u32).collect()
}

pub(crate) fn decode_f32s(data: &[u8]) -> Vec<f32> {
    data.chunks_exact(4).map(LittleEndian::read_f32).collect()
}

/// Decodes a string which may be padded with trailing NUL bytes.
pub(crate) fn decode_string(data: &[u8]) -> String {
    let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());

    String::from_utf8_lossy(&data[..len]).into_owned()
}

/// Rewrites little-endian elements of `width` bytes into the byte order `B`, in place.
pub(crate) fn to_byte_order<B: ByteOrder>(
    data: &mut [u8],
    width: usize,
    context: &'static str,
    value: u32,
) -> Result<(), Error> {
    match width {
        1 => {}
        2 => {
            for element in data.chunks_exact_mut(2) {
                let val = LittleEndian::read_u16(element);
                B::write_u16(element, val);
            }
        }
        4 => {
            for element in data.chunks_exact_mut(4) {
                let val = LittleEndian::read_u32(element);
                B::write_u32(element, val);
            }
        }
        _ => return Err(Error::UnsupportedDataType { context, value }),
    }

    Ok(())
}
