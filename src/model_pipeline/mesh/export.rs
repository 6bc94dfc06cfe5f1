//! File-level export and import.
//!
//! Output files are written to a temporary sibling first and renamed into
//! place, so a failed conversion never leaves a truncated mesh behind.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::model_pipeline::common::error::{ConversionError, Result};
use crate::model_pipeline::mesh::obj::{ObjWriter, read_obj};
use crate::model_pipeline::mesh::stl::{StlWriter, read_stl};
use crate::model_pipeline::mesh::types::{MeshFormat, SurfaceMesh};
use crate::model_pipeline::mesh::writer::MeshWriter;

/// Writer selected at runtime from a [`MeshFormat`].
#[derive(Debug, Clone, Copy)]
pub struct FormatWriter(pub MeshFormat);

impl MeshWriter for FormatWriter {
    fn format(&self) -> MeshFormat {
        self.0
    }

    fn write_mesh(&self, mesh: &SurfaceMesh, output: &mut dyn Write) -> Result<()> {
        match self.0 {
            MeshFormat::Obj => ObjWriter.write_mesh(mesh, output),
            MeshFormat::Stl => StlWriter.write_mesh(mesh, output),
        }
    }
}

/// `base` with the format's extension appended (`out/model` → `out/model.obj`).
pub fn output_path_for(base: &Path, format: MeshFormat) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(format.extension());
    PathBuf::from(name)
}

/// Encodes `mesh` with `writer` and atomically moves the result to `path`.
pub fn write_mesh_file<W: MeshWriter + ?Sized>(
    writer: &W,
    mesh: &SurfaceMesh,
    path: &Path,
) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| export_error(path, e))?;
    debug!("Staging {} output in {}", writer.format(), temp.path().display());

    {
        let mut buffered = BufWriter::new(temp.as_file_mut());
        writer.write_mesh(mesh, &mut buffered)?;
        buffered.flush().map_err(|e| export_error(path, e))?;
    }

    temp.persist(path).map_err(|e| export_error(path, e.error))?;
    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Mesh written"
    );
    Ok(())
}

fn export_error(path: &Path, err: impl std::fmt::Display) -> ConversionError {
    ConversionError::ExportError(format!("{}: {}", path.display(), err))
}

/// Loads a mesh file, picking the reader from its extension.
pub fn load_mesh(path: &Path) -> Result<SurfaceMesh> {
    let format = MeshFormat::from_path(path)?;
    let file = File::open(path)
        .map_err(|e| ConversionError::MeshLoadError(format!("{}: {}", path.display(), e)))?;
    let mut reader = BufReader::new(file);

    let mesh = match format {
        MeshFormat::Obj => read_obj(reader)?,
        MeshFormat::Stl => read_stl(&mut reader)?,
    };
    debug!(
        "Loaded {}: {} vertices, {} faces",
        path.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok(mesh)
}
