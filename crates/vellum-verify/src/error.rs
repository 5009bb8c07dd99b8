use thiserror::Error;

use vellum_types::TypeError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("badge end marker at byte {0} has no matching begin marker")]
    UnmatchedEnd(usize),

    #[error("badge begin marker at byte {0} is never closed")]
    UnclosedBegin(usize),

    #[error("nested badge begin marker at byte {0}")]
    NestedBegin(usize),

    #[error("invalid digest prefix: {0}")]
    Prefix(#[from] TypeError),

    #[error("invalid document name: {0:?}")]
    InvalidName(String),
}

pub type VerifyResult<T> = Result<T, VerifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_errors_convert_and_clone() {
        let err = VerifyError::from(TypeError::PrefixLength {
            len: 3,
            min: 6,
            max: 64,
        });
        let copy = err.clone();
        assert_eq!(copy, err);
        assert!(copy.to_string().contains("outside 6..=64"));
    }
}
