//! Result type alias for the biobank client

use super::errors::BiobankError;

/// Result type alias for biobank operations
///
/// # Examples
///
/// ```
/// use biobank::domain::result::Result;
/// use biobank::domain::errors::BiobankError;
///
/// fn guarded() -> Result<()> {
///     Err(BiobankError::domain("already enabled"))
/// }
/// assert!(guarded().is_err());
/// ```
pub type Result<T> = std::result::Result<T, BiobankError>;
