//! 几何校验错误

use crate::entity::EntityRef;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Cannot create {kind}: at least {required} distinct points are needed, got {found}")]
    TooFewPoints {
        kind: &'static str,
        required: usize,
        found: usize,
    },

    #[error("{field} must be a positive number, got {value}")]
    InvalidDimension { field: &'static str, value: f64 },

    #[error("Coordinate ({x}, {y}) is not a finite number")]
    NonFiniteCoordinate { x: f64, y: f64 },

    #[error("Entity not found: {0}")]
    NotFound(EntityRef),

    #[error("No boundary has been defined")]
    NoBoundary,

    #[error("Nothing is selected")]
    NothingSelected,

    #[error("Expected a selected {expected}, found a {found}")]
    WrongTarget {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Field '{field}' does not apply to a {kind}")]
    PatchNotApplicable {
        field: &'static str,
        kind: &'static str,
    },
}

pub type GeometryResult<T> = Result<T, GeometryError>;
