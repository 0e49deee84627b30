use std::fmt;

/// Errors raised while building maps, rays and cameras.
#[derive(Debug, Clone, PartialEq)]
pub enum RaycastError {
    /// The grid has no rows, or its rows have no cells.
    EmptyGrid,
    /// A row's length differs from the first row's.
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A layout character that is neither a wall nor open floor.
    UnknownTile { row: usize, col: usize, tile: char },
    /// Normalizing a zero-length (or non-finite) vector.
    DegenerateVector,
    InvalidFieldOfView(f64),
    InvalidNearDistance(f64),
    InvalidDrawDistance(f64),
}

impl fmt::Display for RaycastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaycastError::EmptyGrid => write!(f, "map grid is empty"),
            RaycastError::RaggedGrid {
                row,
                expected,
                found,
            } => write!(
                f,
                "map row {row} has {found} cells, expected {expected}"
            ),
            RaycastError::UnknownTile { row, col, tile } => {
                write!(f, "unknown map tile {tile:?} at row {row}, column {col}")
            }
            RaycastError::DegenerateVector => write!(f, "cannot normalize a zero-length vector"),
            RaycastError::InvalidFieldOfView(fov) => {
                write!(f, "field of view must be in (0, pi) radians, got {fov}")
            }
            RaycastError::InvalidNearDistance(d) => {
                write!(f, "near distance must be positive and finite, got {d}")
            }
            RaycastError::InvalidDrawDistance(d) => {
                write!(f, "draw distance must be positive and finite, got {d}")
            }
        }
    }
}

impl std::error::Error for RaycastError {}

pub type RaycastResult<T> = Result<T, RaycastError>;
