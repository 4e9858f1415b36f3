use thiserror::Error;

pub type IsoResult<T> = Result<T, IsoError>;

#[derive(Error, Debug)]
pub enum IsoError {
    #[error("Shape mismatch for {what}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        what: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
}
