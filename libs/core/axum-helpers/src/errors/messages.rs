//! Standard error messages shared by every service.

pub const INTERNAL_ERROR: &str = "An unexpected error occurred.";
pub const NOT_FOUND_RESOURCE: &str = "Requested resource was not found.";
pub const INVALID_ID: &str = "Id must be an integer";
