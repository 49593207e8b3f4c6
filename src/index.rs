use serde::{Deserialize, Serialize};

/// The width of each value stored in a [`FaceData`] buffer.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum IndexType {
    #[default]
    U16,
    U32,
}

impl IndexType {
    /// Size of one index, in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// The index list of a mesh, kept at the width declared by the file.
///
/// Values are stored in host byte order.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct FaceData {
    #[serde(with = "serde_bytes")]
    buf: Vec<u8>,

    ty: IndexType,
}

impl FaceData {
    pub(crate) fn new(buf: Vec<u8>, ty: IndexType) -> Self {
        debug_assert_eq!(buf.len() % ty.size(), 0);

        Self { buf, ty }
    }

    /// Packs the given indices using the narrowest width which holds every value.
    pub fn from_indices(indices: &[u32]) -> Self {
        let max_vertex = indices.iter().copied().max().unwrap_or_default();

        if max_vertex <= u16::MAX as _ {
            let mut buf = Vec::with_capacity(indices.len() << 1);
            for &idx in indices {
                buf.extend_from_slice(&(idx as u16).to_ne_bytes());
            }

            Self {
                buf,
                ty: IndexType::U16,
            }
        } else {
            let mut buf = Vec::with_capacity(indices.len() << 2);
            for &idx in indices {
                buf.extend_from_slice(&idx.to_ne_bytes());
            }

            Self {
                buf,
                ty: IndexType::U32,
            }
        }
    }

    /// The raw index bytes.
    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    pub fn index(&self, idx: usize) -> u32 {
        match self.ty {
            IndexType::U16 => {
                let idx = idx << 1;
                u16::from_ne_bytes([self.buf[idx], self.buf[idx + 1]]) as _
            }
            IndexType::U32 => {
                let idx = idx << 2;
                let data = &self.buf[idx..idx + 4];
                u32::from_ne_bytes([data[0], data[1], data[2], data[3]])
            }
        }
    }

    pub fn index_count(&self) -> usize {
        match self.ty {
            IndexType::U16 => self.buf.len() >> 1,
            IndexType::U32 => self.buf.len() >> 2,
        }
    }

    pub fn index_type(&self) -> IndexType {
        self.ty
    }

    /// Returns every index widened to `u32`.
    pub fn indices(&self) -> Vec<u32> {
        (0..self.index_count()).map(|idx| self.index(idx)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.index_count() / 3
    }
}

#[cfg(test)]
mod tests {
    use crate::index::{FaceData, IndexType};

    #[test]
    fn face_data_u16() {
        let buf = FaceData::from_indices(&[0, 1, 42_000]);

        assert_eq!(buf.index_type(), IndexType::U16);
        assert_eq!(buf.triangle_count(), 1);
        assert_eq!(buf.index_count(), 3);
        assert_eq!(buf.data().len(), 6);

        let buf = buf.indices();

        assert_eq!(buf.len(), 3);
        assert_eq!(buf[0], 0);
        assert_eq!(buf[1], 1);
        assert_eq!(buf[2], 42_000);
    }

    #[test]
    fn face_data_u32() {
        let buf = FaceData::from_indices(&[0, 1, 100_000]);

        assert_eq!(buf.index_type(), IndexType::U32);
        assert_eq!(buf.triangle_count(), 1);
        assert_eq!(buf.index_count(), 3);
        assert_eq!(buf.data().len(), 12);

        let buf = buf.indices();

        assert_eq!(buf.len(), 3);
        assert_eq!(buf[0], 0);
        assert_eq!(buf[1], 1);
        assert_eq!(buf[2], 100_000);
    }

    #[test]
    fn face_data_keeps_declared_width() {
        // Small values declared as 32-bit must not be narrowed
        let mut raw = vec![];
        for idx in [0u32, 1, 1] {
            raw.extend_from_slice(&idx.to_ne_bytes());
        }

        let buf = FaceData::new(raw, IndexType::U32);

        assert_eq!(buf.index_type(), IndexType::U32);
        assert_eq!(buf.indices(), vec![0, 1, 1]);
    }

    #[test]
    fn face_data_empty() {
        let buf = FaceData::default();

        assert!(buf.is_empty());
        assert_eq!(buf.index_count(), 0);
        assert_eq!(buf.triangle_count(), 0);
    }
}
