//! Error types for generator operations.
//!
//! Two classes of hard failure exist: configuration errors (a required
//! object reference is missing) and precondition errors (not enough input
//! meshes, too few path waypoints). Both abort the operation before any
//! scene mutation. Degenerate geometry is never a hard failure — those
//! conditions are logged and handled with a documented fallback at the call
//! site.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generator operations.
pub type StairResult<T> = Result<T, StairError>;

/// Machine-readable error codes.
///
/// Codes follow the pattern `STAIR-XXXX` where:
/// - 1xxx = I/O errors
/// - 2xxx = configuration errors
/// - 3xxx = precondition errors
/// - 4xxx = data errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// STAIR-1001: Failed to read file
    IoRead = 1001,
    /// STAIR-1002: Failed to write file
    IoWrite = 1002,
    /// STAIR-1003: Failed to parse file format
    ParseError = 1003,
    /// STAIR-1004: Unsupported file format
    UnsupportedFormat = 1004,

    /// STAIR-2001: Required object reference is missing
    MissingReference = 2001,
    /// STAIR-2002: Object has no mesh attached
    MissingMesh = 2002,

    /// STAIR-3001: Not enough input meshes
    NotEnoughMeshes = 3001,
    /// STAIR-3002: No generated instances to update
    NoInstances = 3002,
    /// STAIR-3003: Path has too few waypoints
    InvalidPath = 3003,

    /// STAIR-4001: Mesh has no vertices or faces
    EmptyMesh = 4001,
    /// STAIR-4002: Face references invalid vertex index
    InvalidVertexIndex = 4002,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `STAIR-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IoRead => "STAIR-1001",
            ErrorCode::IoWrite => "STAIR-1002",
            ErrorCode::ParseError => "STAIR-1003",
            ErrorCode::UnsupportedFormat => "STAIR-1004",
            ErrorCode::MissingReference => "STAIR-2001",
            ErrorCode::MissingMesh => "STAIR-2002",
            ErrorCode::NotEnoughMeshes => "STAIR-3001",
            ErrorCode::NoInstances => "STAIR-3002",
            ErrorCode::InvalidPath => "STAIR-3003",
            ErrorCode::EmptyMesh => "STAIR-4001",
            ErrorCode::InvalidVertexIndex => "STAIR-4002",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur during generator operations.
#[derive(Debug, Error, Diagnostic)]
pub enum StairError {
    /// Error reading from a file.
    #[error("failed to read mesh from {path}")]
    #[diagnostic(
        code(stair::io::read),
        help("Check that the file exists and is readable")
    )]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write mesh to {path}")]
    #[diagnostic(
        code(stair::io::write),
        help("Check that the directory exists and is writable")
    )]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a mesh file.
    #[error("failed to parse mesh from {path}: {details}")]
    #[diagnostic(
        code(stair::io::parse),
        help("The file may be corrupted or use an unsupported OBJ variant")
    )]
    ParseError { path: PathBuf, details: String },

    /// Unsupported file format.
    #[error("unsupported mesh format: {extension:?}")]
    #[diagnostic(code(stair::io::format), help("Supported format: OBJ"))]
    UnsupportedFormat { extension: Option<String> },

    /// A required object reference is not assigned.
    #[error("required object is not assigned: {role}")]
    #[diagnostic(
        code(stair::config::missing_reference),
        help("Assign the {role} before running this operation")
    )]
    MissingReference { role: &'static str },

    /// An object that should carry a mesh has none.
    #[error("object {name:?} has no mesh")]
    #[diagnostic(
        code(stair::config::missing_mesh),
        help("Attach a mesh to the object or exclude it from the operation")
    )]
    MissingMesh { name: String },

    /// Fewer input meshes than the operation requires.
    #[error("{got} meshes provided, at least {needed} required")]
    #[diagnostic(
        code(stair::precondition::not_enough_meshes),
        help("Select more objects with meshes attached")
    )]
    NotEnoughMeshes { needed: usize, got: usize },

    /// No generated instances exist for an incremental update.
    #[error("no generated instances found")]
    #[diagnostic(
        code(stair::precondition::no_instances),
        help("Generate duplicates before applying placement updates")
    )]
    NoInstances,

    /// A deformation path has fewer than two waypoints.
    #[error("path has {waypoints} waypoints, at least 2 required")]
    #[diagnostic(
        code(stair::precondition::invalid_path),
        help("A deformation path needs at least two stair positions")
    )]
    InvalidPath { waypoints: usize },

    /// Empty mesh (no vertices or faces).
    #[error("mesh is empty: {details}")]
    #[diagnostic(
        code(stair::data::empty_mesh),
        help("The mesh must have at least one vertex and one face")
    )]
    EmptyMesh { details: String },

    /// Invalid vertex index in face data.
    #[error(
        "invalid vertex index: face {face_index} references vertex {vertex_index}, but mesh only has {vertex_count} vertices"
    )]
    #[diagnostic(
        code(stair::data::vertex_index),
        help("The mesh file is inconsistent; re-export it from the source tool")
    )]
    InvalidVertexIndex {
        face_index: usize,
        vertex_index: u32,
        vertex_count: usize,
    },
}

impl StairError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            StairError::IoRead { .. } => ErrorCode::IoRead,
            StairError::IoWrite { .. } => ErrorCode::IoWrite,
            StairError::ParseError { .. } => ErrorCode::ParseError,
            StairError::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            StairError::MissingReference { .. } => ErrorCode::MissingReference,
            StairError::MissingMesh { .. } => ErrorCode::MissingMesh,
            StairError::NotEnoughMeshes { .. } => ErrorCode::NotEnoughMeshes,
            StairError::NoInstances => ErrorCode::NoInstances,
            StairError::InvalidPath { .. } => ErrorCode::InvalidPath,
            StairError::EmptyMesh { .. } => ErrorCode::EmptyMesh,
            StairError::InvalidVertexIndex { .. } => ErrorCode::InvalidVertexIndex,
        }
    }

    // Constructor helpers for common error patterns

    /// Create an IoRead error.
    pub fn io_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StairError::IoRead {
            path: path.into(),
            source,
        }
    }

    /// Create an IoWrite error.
    pub fn io_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StairError::IoWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a ParseError.
    pub fn parse_error(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        StairError::ParseError {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create a MissingReference error.
    pub fn missing_reference(role: &'static str) -> Self {
        StairError::MissingReference { role }
    }

    /// Create a MissingMesh error.
    pub fn missing_mesh(name: impl Into<String>) -> Self {
        StairError::MissingMesh { name: name.into() }
    }

    /// Create a NotEnoughMeshes error.
    pub fn not_enough_meshes(needed: usize, got: usize) -> Self {
        StairError::NotEnoughMeshes { needed, got }
    }

    /// Create an InvalidPath error.
    pub fn invalid_path(waypoints: usize) -> Self {
        StairError::InvalidPath { waypoints }
    }

    /// Create an EmptyMesh error.
    pub fn empty_mesh(details: impl Into<String>) -> Self {
        StairError::EmptyMesh {
            details: details.into(),
        }
    }

    /// Create an InvalidVertexIndex error.
    pub fn invalid_vertex_index(face_index: usize, vertex_index: u32, vertex_count: usize) -> Self {
        StairError::InvalidVertexIndex {
            face_index,
            vertex_index,
            vertex_count,
        }
    }
}
