use crate::server::response::ApiError;

const MAX_DISPLAY_NAME_LEN: usize = 100;
const MAX_VARIABLE_NAME_LEN: usize = 64;

/// Project and table names are free text, but must be non-blank.
fn validate_display_name(name: &str, entity: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{entity} name cannot be empty")));
    }
    if name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "{entity} name cannot exceed {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(ApiError::bad_request(format!(
            "{entity} name cannot contain control characters"
        )));
    }
    Ok(())
}

pub fn validate_project_name(name: &str) -> Result<(), ApiError> {
    validate_display_name(name, "Project")
}

pub fn validate_table_name(name: &str) -> Result<(), ApiError> {
    validate_display_name(name, "Table")
}

/// Variable names appear in URL paths and device requests.
pub fn validate_variable_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::bad_request("Variable name cannot be empty"));
    }
    if name.len() > MAX_VARIABLE_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Variable name cannot exceed {MAX_VARIABLE_NAME_LEN} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(ApiError::bad_request(
            "Variable name can only contain alphanumeric characters, hyphens, underscores, and periods",
        ));
    }
    Ok(())
}
