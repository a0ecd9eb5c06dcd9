use crate::domain::model::ForecastSettings;
use crate::utils::error::{ForecastError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ForecastError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let extension = std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str());

    match extension {
        Some(ext) if allowed_extensions.contains(&ext) => Ok(()),
        Some(ext) => Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                ext,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ForecastError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ForecastError::InvalidConfigValueError {
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
        return Err(ForecastError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_year(field_name: &str, year: Option<i32>) -> Result<()> {
    match year {
        Some(year) => validate_range(field_name, year, 1, 9999),
        None => Ok(()),
    }
}

impl Validate for ForecastSettings {
    fn validate(&self) -> Result<()> {
        validate_positive_number("forecast.trend_horizon", self.trend_horizon, 1)?;
        validate_positive_number("forecast.ar_horizon", self.ar_horizon, 1)?;
        validate_positive_number("forecast.ar_order", self.ar_order, 1)?;
        validate_range("forecast.diff_order", self.diff_order, 1, 2)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.endpoint", "https://example.com/events").is_ok());
        assert!(validate_url("source.endpoint", "http://example.com").is_ok());
        assert!(validate_url("source.endpoint", "").is_err());
        assert!(validate_url("source.endpoint", "invalid-url").is_err());
        assert!(validate_url("source.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("source.path", "events.csv", &["csv"]).is_ok());
        assert!(validate_file_extension("source.path", "events.txt", &["csv"]).is_err());
        assert!(validate_file_extension("source.path", "events", &["csv"]).is_err());
    }

    #[test]
    fn test_validate_year() {
        assert!(validate_year("year", None).is_ok());
        assert!(validate_year("year", Some(2023)).is_ok());
        assert!(validate_year("year", Some(0)).is_err());
    }

    #[test]
    fn test_default_settings_are_valid() {
        assert!(ForecastSettings::default().validate().is_ok());

        let no_order = ForecastSettings {
            ar_order: 0,
            ..ForecastSettings::default()
        };
        assert!(no_order.validate().is_err());
    }
}
