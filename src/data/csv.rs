//! CSV format dataset implementation
//!
//! Supports loading datasets from CSV files where:
//! - The last column is the label
//! - All other columns are features
//! - First row can be headers (automatically detected)

use crate::core::{Dataset, Result, SVMError, Sample};
use crate::vector::RealVector;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dataset implementation for CSV format files
#[derive(Debug, Clone)]
pub struct CSVDataset {
    samples: Vec<Sample>,
    dimensions: usize,
}

impl CSVDataset {
    /// Load a dataset from a CSV file
    ///
    /// The last column is assumed to be the label.
    /// Headers are automatically detected if present.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Load a dataset from a reader, detecting a header row
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, true)
    }

    /// Load a dataset from a reader with explicit header option
    pub fn from_reader_with_options<R: BufRead>(
        reader: R,
        auto_detect_header: bool,
    ) -> Result<Self> {
        let mut samples: Vec<Sample> = Vec::new();
        let mut dimensions = None;
        let mut first_row = true;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(SVMError::IoError)?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Only the first non-comment row may be a header
            if std::mem::take(&mut first_row) && auto_detect_header && Self::is_header_line(line)
            {
                continue;
            }

            let sample = Self::parse_data_line(line).map_err(|e| {
                SVMError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;

            let dim = sample.features.dim();
            match dimensions {
                None => dimensions = Some(dim),
                Some(expected) if expected != dim => {
                    return Err(SVMError::InvalidDataset(format!(
                        "Line {} has {} features, expected {}",
                        line_num + 1,
                        dim,
                        expected
                    )));
                }
                Some(_) => {}
            }
            samples.push(sample);
        }

        match dimensions {
            Some(dimensions) => Ok(CSVDataset {
                samples,
                dimensions,
            }),
            None => Err(SVMError::EmptyDataset),
        }
    }

    /// Check if a line appears to be a header
    fn is_header_line(line: &str) -> bool {
        let fields: Vec<&str> = line.split(',').collect();

        if fields.len() < 2 {
            return false;
        }

        // Most feature columns failing to parse as numbers means headers
        let non_numeric_count = fields
            .iter()
            .take(fields.len() - 1)
            .filter(|field| field.trim().parse::<f64>().is_err())
            .count();

        non_numeric_count > fields.len() / 2
    }

    /// Parse a CSV data line into a Sample
    fn parse_data_line(line: &str) -> Result<Sample> {
        let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();

        if fields.len() < 2 {
            return Err(SVMError::ParseError(format!(
                "Line has too few fields: {}",
                line
            )));
        }

        // Last field is the label
        let (label_str, feature_fields) = fields
            .split_last()
            .ok_or_else(|| SVMError::ParseError("Empty line".to_string()))?;
        let label = label_str
            .parse::<f64>()
            .map_err(|_| SVMError::ParseError(format!("Invalid label: {}", label_str)))?;
        let label = if label > 0.0 { 1 } else { -1 };

        let values = feature_fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                field.parse::<f64>().map_err(|_| {
                    SVMError::ParseError(format!(
                        "Invalid feature value at column {}: {}",
                        idx + 1,
                        field
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(Sample::new(RealVector::new(values), label))
    }
}

impl Dataset for CSVDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn get_sample(&self, i: usize) -> Sample {
        self.samples[i].clone()
    }

    fn get_labels(&self) -> Vec<i32> {
        self.samples.iter().map(|s| s.label).collect()
    }
}
