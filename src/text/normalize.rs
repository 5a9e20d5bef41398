use std::fmt;

/// A single grid cell. CSV input always produces `Empty` or `Text`; derived
/// columns are written back as numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Integer(i64),
    Float(f64),
}

impl CellValue {
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Self::Empty
        } else {
            Self::Text(raw.to_string())
        }
    }

    /// Numeric reading of the cell; text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Empty => None,
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Text(value) => value.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
                    write!(f, "{value:.1}")
                } else {
                    write!(f, "{value}")
                }
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::from_raw(value)
    }
}

pub fn normalize_cell(value: Option<&CellValue>) -> String {
    match value {
        None => String::new(),
        Some(value) => value.to_string().trim().to_string(),
    }
}
