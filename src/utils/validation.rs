use crate::utils::error::{EtlError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// File names are joined onto a base directory, so they must not climb out of it.
pub fn validate_file_name(field_name: &str, name: &str) -> Result<()> {
    validate_path(field_name, name)?;

    let escapes = std::path::Path::new(name)
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_)));
    if escapes {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "File name must be relative and must not contain '..'".to_string(),
        });
    }

    Ok(())
}

/// Rejects `${VAR}` placeholders left behind by an unset environment variable.
pub fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "References an environment variable that is not set".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("source.input_dir", "./static/data").is_ok());
        assert!(validate_path("source.input_dir", "").is_err());
        assert!(validate_path("source.input_dir", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("load.filename", "formatted_contributions.json").is_ok());
        assert!(validate_file_name("load.filename", "out/result.json").is_ok());
        assert!(validate_file_name("load.filename", "../escape.json").is_err());
        assert!(validate_file_name("load.filename", "/etc/passwd").is_err());
    }

    #[test]
    fn test_validate_resolved() {
        assert!(validate_resolved("source.input_dir", "/srv/fec").is_ok());
        assert!(validate_resolved("source.input_dir", "${CONTRIB_DATA_DIR}/fec").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("clustering.min_donors", 3, 1).is_ok());
        assert!(validate_positive_number("clustering.min_donors", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("clustering.window_days", 30, 0, 366).is_ok());
        assert!(validate_range("clustering.window_days", 400, 0, 366).is_err());
    }
}
