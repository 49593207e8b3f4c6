//! A reader for the POD (`AB.POD.2.0`) binary scene format.
//!
//! A POD file is a flat stream of tag-length-value records which nest into blocks: a scene block
//! holds camera, light, texture, material, mesh and node blocks. Reading a file produces a
//! [`Model`] which owns every entity by value; all cross references (node to parent, mesh to
//! skeleton, animation channel to node) are typed indices into the model's arrays.
//!
//! ```no_run
//! use pod::Model;
//!
//! let model = Model::open("scene.pod").unwrap();
//!
//! for (idx, node) in model.nodes().iter().enumerate() {
//!     println!("{}: {:?}", node.name(), model.world_matrix(pod::NodeId(idx)));
//! }
//! ```

mod anim;
mod camera;
mod error;
mod index;
mod light;
mod material;
mod mesh;
mod model;
mod node;
mod reader;

#[cfg(feature = "batch")]
pub mod batch;

pub mod writer;

pub use self::{
    anim::{AnimationData, AnimationInstance, Interpolation, KeyFrameData, KeyframeChannel},
    camera::{Camera, CameraFov},
    error::Error,
    index::{FaceData, IndexType},
    light::{Light, LightType},
    material::{Material, MaterialValue},
    mesh::{DataType, Mesh, PrimitiveTopology, StridedBuffer, VertexAttribute},
    model::{Model, Skeleton},
    node::{Node, TransformFlags},
    reader::{FORMAT_VERSION, read_pod, read_pod_into, tag},
};

use {
    log::trace,
    paste::paste,
    serde::{Deserialize, Serialize},
    std::{
        fmt::Debug,
        fs::File,
        io::{BufReader, Cursor, Read, Seek, SeekFrom},
        path::{Path, PathBuf},
    },
};

macro_rules! id_struct {
    ($name: ident) => {
        paste! {
            #[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, PartialOrd,
                Ord, Serialize)]
            pub struct [<$name Id>](pub usize);

            impl [<$name Id>] {
                /// Converts an on-disk index, where any negative value means "none".
                pub(crate) fn from_raw(raw: i32) -> Option<Self> {
                    usize::try_from(raw).ok().map(Self)
                }
            }
        }
    };
}

id_struct!(Camera);
id_struct!(KeyFrame);
id_struct!(Light);
id_struct!(Material);
id_struct!(Mesh);
id_struct!(Node);
id_struct!(Skeleton);
id_struct!(Texture);

/// A texture referenced by materials. Only the file name is stored in a POD file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Texture {
    name: String,
}

impl Texture {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The texture file name as written by the exporter.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// Returns the file extensions this crate can read.
pub fn supported_file_extensions() -> &'static [&'static str] {
    &["pod"]
}

/// Returns `true` if the given stream begins with a POD format version tag matching
/// [`FORMAT_VERSION`].
///
/// The probe reads from a fresh handle obtained with [`Stream::open`], so the position of
/// `stream` is never changed. Any I/O failure, truncation or mismatch results in `false`.
pub fn is_pod(stream: &impl Stream) -> bool {
    match stream.open() {
        Ok(mut stream) => reader::probe(&mut stream),
        Err(err) => {
            trace!("Unable to open stream: {err}");

            false
        }
    }
}

impl Model {
    /// Opens the given path and reads a `Model`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let buf = BufReader::new(file);

        trace!("Reading {}", path.display());

        Self::from_stream(PodFile { buf, path })
    }

    /// Reads a `Model` from the current position of the given stream.
    pub fn from_stream(mut stream: impl Stream) -> Result<Self, Error> {
        read_pod(&mut stream)
    }
}

#[derive(Debug)]
struct PodFile {
    buf: BufReader<File>,
    path: PathBuf,
}

/// A readable and seekable source of POD data which can also open additional, independent
/// handles to the same data.
pub trait Stream: Debug + Read + Seek + Send {
    fn open(&self) -> Result<Box<dyn Stream>, std::io::Error>;
}

impl Stream for PodFile {
    fn open(&self) -> Result<Box<dyn Stream>, std::io::Error> {
        let file = File::open(&self.path)?;
        let buf = BufReader::new(file);

        Ok(Box::new(PodFile {
            buf,
            path: self.path.clone(),
        }))
    }
}

impl Read for PodFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.buf.read(buf)
    }
}

impl Seek for PodFile {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.buf.seek(pos)
    }
}

impl Stream for Cursor<&'static [u8]> {
    fn open(&self) -> Result<Box<dyn Stream>, std::io::Error> {
        Ok(Box::new(Cursor::new(*self.get_ref())))
    }
}

impl Stream for Cursor<Vec<u8>> {
    fn open(&self) -> Result<Box<dyn Stream>, std::io::Error> {
        Ok(Box::new(Cursor::new(self.get_ref().clone())))
    }
}
