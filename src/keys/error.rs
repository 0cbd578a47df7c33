use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UlidError {
    #[error("ULID must be 26 characters, got {0}")]
    InvalidLength(usize),

    #[error("Invalid character '{0}' in ULID")]
    InvalidChar(char),

    #[error("ULID value overflows 128 bits")]
    Overflow,
}
