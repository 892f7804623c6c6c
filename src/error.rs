use thiserror::Error;

/// Errors surfaced by the fallible entry points (`AlignedBlock`, `try_reserve`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("zero-sized allocation requested")]
  ZeroSize,

  #[error("invalid alignment {align}: must be a power of two >= {min}")]
  InvalidAlignment { align: usize, min: usize },

  #[error("failed to allocate {bytes} bytes aligned to {align}")]
  AllocationFailed { bytes: usize, align: usize },

  #[error("capacity overflow: {requested} elements requested")]
  CapacityOverflow { requested: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_messages() {
    assert_eq!(
      Error::InvalidAlignment { align: 3, min: 8 }.to_string(),
      "invalid alignment 3: must be a power of two >= 8"
    );
    assert_eq!(
      Error::CapacityOverflow { requested: 12 }.to_string(),
      "capacity overflow: 12 elements requested"
    );
  }
}
