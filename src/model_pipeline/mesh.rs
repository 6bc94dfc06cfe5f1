//! Mesh writing and loading module
//!
//! Serializes [`SurfaceMesh`] values to OBJ or binary STL and reads them back.

mod writer;
mod obj;
mod stl;
mod export;
pub mod types;

pub use writer::MeshWriter;
pub use obj::{ObjWriter, read_obj};
pub use stl::{StlWriter, read_stl};
pub use export::{FormatWriter, load_mesh, output_path_for, write_mesh_file};
pub use types::{MeshFormat, SurfaceMesh};
