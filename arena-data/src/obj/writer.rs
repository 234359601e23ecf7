//! OBJ writing functions

use crate::error::DataError;
use crate::types::ArenaMesh;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Check every face index before anything is written.
fn validate_indices(mesh: &ArenaMesh) -> Result<(), DataError> {
    for (face_index, face) in mesh.faces.iter().enumerate() {
        if let Some(&index) = face.vertices.iter().find(|&&i| i >= mesh.vertices.len()) {
            return Err(DataError::DanglingIndex {
                face: face_index,
                kind: "vertex",
                index,
                count: mesh.vertices.len(),
            });
        }
        if face.normal >= mesh.normals.len() {
            return Err(DataError::DanglingIndex {
                face: face_index,
                kind: "normal",
                index: face.normal,
                count: mesh.normals.len(),
            });
        }
    }
    Ok(())
}

/// Write `mesh` as Wavefront OBJ text.
///
/// Faces are written as `f v//vn ...` with 1-based indices; each face uses a
/// single normal for all of its corners.
pub fn write_obj<W: Write>(mesh: &ArenaMesh, writer: &mut W) -> Result<(), DataError> {
    validate_indices(mesh)?;

    writeln!(writer, "# arena-scan OBJ file")?;
    writeln!(
        writer,
        "# {} vertices, {} normals, {} faces",
        mesh.vertices.len(),
        mesh.normals.len(),
        mesh.faces.len()
    )?;
    writeln!(writer, "o {}", mesh.name)?;

    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for n in &mesh.normals {
        writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    for face in &mesh.faces {
        write!(writer, "f")?;
        for &vertex in &face.vertices {
            write!(writer, " {}//{}", vertex + 1, face.normal + 1)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write `mesh` to `path`.
///
/// The file is written next to its destination under a temporary name and
/// renamed into place once complete, so a failed write never leaves a
/// truncated mesh behind.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn save_obj(mesh: &ArenaMesh, path: impl AsRef<Path>) -> Result<(), DataError> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    debug!("Writing mesh to temporary file {}", temp.path().display());
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write_obj(mesh, &mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| DataError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    info!(
        "Wrote {} vertices and {} faces to {}",
        mesh.vertices.len(),
        mesh.faces.len(),
        path.display()
    );
    Ok(())
}
