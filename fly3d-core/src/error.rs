/// Error types for mesh loading and vertex buffer assembly
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the core library.
pub type Result<T> = std::result::Result<T, MeshError>;

/// Part of an OFF file a parse error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Counts,
    /// Vertex row, zero-based
    Vertex(usize),
    /// Face row, zero-based
    Face(usize),
    /// Tetrahedral cell row, zero-based
    Cell(usize),
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Header => write!(f, "header"),
            Section::Counts => write!(f, "counts line"),
            Section::Vertex(i) => write!(f, "vertex row {i}"),
            Section::Face(i) => write!(f, "face row {i}"),
            Section::Cell(i) => write!(f, "cell row {i}"),
        }
    }
}

/// Errors raised while parsing meshes or building vertex buffers.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Structural problem in the mesh file: bad header, bad counts, malformed or
    /// missing rows, out-of-range indices.
    #[error("invalid OFF {section}: {reason}")]
    Format { section: Section, reason: String },

    /// A face that is not a triangle, or a cell that is not a tetrahedron.
    #[error("unsupported topology in {section}: expected {expected} vertices, found {found}")]
    UnsupportedTopology {
        section: Section,
        expected: usize,
        found: usize,
    },

    /// An attribute array whose length disagrees with the buffer's vertex count.
    #[error("{attribute} attribute has {found} entries, buffer holds {expected} vertices")]
    ShapeMismatch {
        attribute: &'static str,
        expected: usize,
        found: usize,
    },

    /// A face refers to a vertex that does not exist.
    #[error("face {face} references vertex {index}, mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    /// A face index past the end of the face list.
    #[error("face {face} does not exist, mesh has {face_count} faces")]
    FaceOutOfRange { face: usize, face_count: usize },

    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MeshError {
    pub(crate) fn format(section: Section, reason: impl Into<String>) -> Self {
        MeshError::Format {
            section,
            reason: reason.into(),
        }
    }

    /// True for errors about the shape of the input file itself (including read
    /// failures), as opposed to topology the loader refuses to handle.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            MeshError::Format { .. } | MeshError::FileNotFound { .. } | MeshError::Io(_)
        )
    }

    /// The file section this error points at, if any.
    pub fn section(&self) -> Option<Section> {
        match self {
            MeshError::Format { section, .. } | MeshError::UnsupportedTopology { section, .. } => {
                Some(*section)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_section() {
        let err = MeshError::format(Section::Face(7), "expected 3 indices");
        assert_eq!(err.to_string(), "invalid OFF face row 7: expected 3 indices");
        assert_eq!(err.section(), Some(Section::Face(7)));
    }

    #[test]
    fn test_structural_classification() {
        let io = MeshError::Io(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"));
        assert!(io.is_structural());

        let topo = MeshError::UnsupportedTopology {
            section: Section::Face(0),
            expected: 3,
            found: 4,
        };
        assert!(!topo.is_structural());

        let shape = MeshError::ShapeMismatch {
            attribute: "normal",
            expected: 4,
            found: 3,
        };
        assert!(!shape.is_structural());
        assert_eq!(shape.section(), None);
    }
}
