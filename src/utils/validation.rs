use crate::utils::error::{ReportError, Result};
use std::collections::HashMap;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ReportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ReportError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ReportError::InvalidConfigValueError {
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
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 儲存庫識別字必須是 `owner/name` 形式
pub fn validate_repository(field_name: &str, repository: &str) -> Result<()> {
    let parts: Vec<&str> = repository.split('/').collect();
    let well_formed = parts.len() == 2
        && parts.iter().all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        });

    if !well_formed {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: repository.to_string(),
            reason: "Repository must look like 'owner/name'".to_string(),
        });
    }
    Ok(())
}

/// 欄位位移不可重複，否則兩個語意欄位會讀到同一格
pub fn validate_distinct_offsets(field_name: &str, offsets: &[(&str, usize)]) -> Result<()> {
    let mut seen: HashMap<usize, &str> = HashMap::new();
    for (name, offset) in offsets {
        if let Some(previous) = seen.insert(*offset, name) {
            return Err(ReportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: offset.to_string(),
                reason: format!("Offset is used by both '{}' and '{}'", previous, name),
            });
        }
    }
    Ok(())
}

pub fn validate_file_name(field_name: &str, file_name: &str) -> Result<()> {
    validate_non_empty_string(field_name, file_name)?;

    if file_name.contains('/') || file_name.contains('\\') || file_name.contains('\0') {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file_name.to_string(),
            reason: "File name cannot contain path separators".to_string(),
        });
    }

    if file_name == "." || file_name == ".." {
        return Err(ReportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file_name.to_string(),
            reason: "File name cannot be a relative directory".to_string(),
        });
    }
    Ok(())
}
