//! Validation datasets: analytical-reference tables with schema
//! `Frequency; method-name-1; method-name-2; ...`, semicolon-delimited,
//! dot decimal separator, tolerantly accepting comma decimals too.

use std::path::Path;

use crate::error::{IoError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationDataset {
    pub method_names: Vec<String>,
    pub frequencies_hz: Vec<f64>,
    /// `columns[j][i]` is method j's value at `frequencies_hz[i]`.
    pub columns: Vec<Vec<f64>>,
}

impl ValidationDataset {
    pub fn column(&self, method_name: &str) -> Option<&[f64]> {
        self.method_names
            .iter()
            .position(|n| n == method_name)
            .map(|idx| self.columns[idx].as_slice())
    }
}

fn parse_tolerant_f64(field: &str) -> Result<f64> {
    let normalized = field.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .map_err(|_| IoError::MalformedData(format!("could not parse numeric field `{field}`")))
}

pub fn load_path(path: impl AsRef<Path>) -> Result<ValidationDataset> {
    let text = std::fs::read_to_string(path)?;
    load_str(&text)
}

pub fn load_str(text: &str) -> Result<ValidationDataset> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| IoError::MalformedData("validation dataset is empty".to_string()))?;
    let mut header_fields = header.split(';').map(str::trim);
    let _frequency_label = header_fields
        .next()
        .ok_or_else(|| IoError::MalformedData("validation dataset header is empty".to_string()))?;
    let method_names: Vec<String> = header_fields.map(str::to_string).collect();
    if method_names.is_empty() {
        return Err(IoError::MalformedData(
            "validation dataset header names no methods".to_string(),
        ));
    }

    let mut frequencies_hz = Vec::new();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); method_names.len()];

    for line in lines {
        let mut fields = line.split(';');
        let freq_field = fields
            .next()
            .ok_or_else(|| IoError::MalformedData("row missing frequency field".to_string()))?;
        frequencies_hz.push(parse_tolerant_f64(freq_field)?);

        for (j, field) in fields.enumerate() {
            if j >= columns.len() {
                break;
            }
            columns[j].push(parse_tolerant_f64(field)?);
        }
    }

    for (j, col) in columns.iter().enumerate() {
        if col.len() != frequencies_hz.len() {
            return Err(IoError::MalformedData(format!(
                "method column {} has {} rows, expected {}",
                method_names[j],
                col.len(),
                frequencies_hz.len()
            )));
        }
    }

    Ok(ValidationDataset {
        method_names,
        frequencies_hz,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dot_decimal_rows() {
        let text = "Frequency; Thompson; Heckl\n100.0; 1.23e-8; 1.50e-8\n200.0; 2.34e-8; 2.60e-8\n";
        let ds = load_str(text).expect("dataset should parse");
        assert_eq!(ds.method_names, vec!["Thompson", "Heckl"]);
        assert_eq!(ds.frequencies_hz, vec![100.0, 200.0]);
        assert_eq!(ds.column("Thompson"), Some(&[1.23e-8, 2.34e-8][..]));
    }

    #[test]
    fn tolerates_comma_decimal_rows() {
        let text = "Frequency; Thompson\n100,0; 1,23e-8\n";
        let ds = load_str(text).expect("dataset should parse");
        assert_eq!(ds.frequencies_hz, vec![100.0]);
        assert_eq!(ds.column("Thompson"), Some(&[1.23e-8][..]));
    }

    #[test]
    fn rejects_malformed_numeric_field() {
        let text = "Frequency; Thompson\nnot-a-number; 1.0\n";
        assert!(load_str(text).is_err());
    }

    #[test]
    fn unknown_method_name_returns_none() {
        let text = "Frequency; Thompson\n100.0; 1.0\n";
        let ds = load_str(text).unwrap();
        assert_eq!(ds.column("Heckl"), None);
    }
}
