//! Result type alias for Veil

use super::errors::VeilError;

/// Result type alias for Veil operations
///
/// # Examples
///
/// ```
/// use veil::domain::result::Result;
/// use veil::domain::errors::VeilError;
///
/// fn lookup(id: &str) -> Result<()> {
///     Err(VeilError::UnknownTechnique(id.to_string()))
/// }
///
/// assert!(lookup("scramble").is_err());
/// ```
pub type Result<T> = std::result::Result<T, VeilError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::VeilError;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(VeilError::Dataset("empty".to_string()));
        assert!(result.is_err());
    }
}
