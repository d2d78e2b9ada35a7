//! Persisted results: the deflection series as a dense binary matrix, and
//! the per-run receptance/mobility table as CSV.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{IoError, Result};

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Writes a dense deflection matrix as a shape header (`rows`, `cols` as
/// little-endian u64) followed by the row-major float64 payload.
pub fn write_deflection_binary(path: impl AsRef<Path>, rows: usize, cols: usize, data: &[f64]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    if data.len() != rows * cols {
        return Err(IoError::MalformedData(format!(
            "expected {} values for a {}x{} matrix, got {}",
            rows * cols,
            rows,
            cols,
            data.len()
        )));
    }
    let mut file = fs::File::create(path)?;
    file.write_all(&(rows as u64).to_le_bytes())?;
    file.write_all(&(cols as u64).to_le_bytes())?;
    for &v in data {
        file.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

pub struct DeflectionMatrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
}

/// Reads back a deflection matrix written by [`write_deflection_binary`].
pub fn read_deflection_binary(path: impl AsRef<Path>) -> Result<DeflectionMatrix> {
    let mut file = fs::File::open(path)?;
    let mut header = [0u8; 16];
    file.read_exact(&mut header)?;
    let rows = u64::from_le_bytes(header[0..8].try_into().unwrap()) as usize;
    let cols = u64::from_le_bytes(header[8..16].try_into().unwrap()) as usize;

    let mut rest = Vec::new();
    file.read_to_end(&mut rest)?;
    if rest.len() != rows * cols * 8 {
        return Err(IoError::MalformedData(format!(
            "deflection file payload has {} bytes, expected {} for a {}x{} matrix",
            rest.len(),
            rows * cols * 8,
            rows,
            cols
        )));
    }
    let data = rest
        .chunks_exact(8)
        .map(|chunk| f64::from_le_bytes(chunk.try_into().unwrap()))
        .collect();
    Ok(DeflectionMatrix { rows, cols, data })
}

/// A single frequency-domain sample: frequency plus receptance/mobility
/// magnitudes at that frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseRow {
    pub frequency_hz: f64,
    pub receptance_magnitude: f64,
    pub mobility_magnitude: f64,
}

/// Writes a per-run receptance/mobility CSV with columns
/// `(frequency, receptance magnitude, mobility magnitude)`.
pub fn write_response_csv(path: impl AsRef<Path>, rows: &[ResponseRow]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_path(path)?;
    writer.write_record(["frequency", "receptance_magnitude", "mobility_magnitude"])?;
    for row in rows {
        writer.write_record([
            row.frequency_hz.to_string(),
            row.receptance_magnitude.to_string(),
            row.mobility_magnitude.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn deflection_matrix_round_trips() {
        let path = unique_temp_file("deflection", "bin");
        let data: Vec<f64> = (0..12).map(|i| i as f64 * 0.5).collect();
        write_deflection_binary(&path, 3, 4, &data).expect("should write");
        let back = read_deflection_binary(&path).expect("should read");
        assert_eq!(back.rows, 3);
        assert_eq!(back.cols, 4);
        assert_eq!(back.data, data);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn deflection_matrix_rejects_wrong_length() {
        let path = unique_temp_file("deflection_bad", "bin");
        let err = write_deflection_binary(&path, 3, 4, &[0.0; 5]).unwrap_err();
        assert!(matches!(err, IoError::MalformedData(_)));
    }

    #[test]
    fn response_csv_has_header_and_rows() {
        let path = unique_temp_file("response", "csv");
        let rows = vec![
            ResponseRow { frequency_hz: 100.0, receptance_magnitude: 1e-8, mobility_magnitude: 6e-6 },
            ResponseRow { frequency_hz: 200.0, receptance_magnitude: 2e-8, mobility_magnitude: 9e-6 },
        ];
        write_response_csv(&path, &rows).expect("should write");
        let text = std::fs::read_to_string(&path).expect("should read back");
        assert!(text.starts_with("frequency,receptance_magnitude,mobility_magnitude"));
        assert_eq!(text.lines().count(), 3);
        let _ = std::fs::remove_file(&path);
    }

    fn unique_temp_file(prefix: &str, ext: &str) -> std::path::PathBuf {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be valid")
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}_{pid}_{nanos}.{ext}"))
    }
}
