//! LibSVM format dataset implementation
//!
//! Supports loading datasets in the libsvm format:
//! label index:value index:value ...
//!
//! Example:
//! +1 1:0.5 3:1.2 7:0.8
//! -1 2:0.3 5:2.1
//!
//! Features are stored sparsely and expanded into dense [`RealVector`]s of
//! the dataset's dimension when samples are requested.

use crate::core::{Dataset, Result, SVMError, Sample};
use crate::vector::RealVector;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One parsed line: zero-based feature entries and the class label
type Row = (Vec<(usize, f64)>, i32);

/// Dataset implementation for LibSVM format files
#[derive(Debug, Clone)]
pub struct LibSVMDataset {
    rows: Vec<Row>,
    dimensions: usize,
}

impl LibSVMDataset {
    /// Load a dataset from a LibSVM format file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Load a dataset from a reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut rows = Vec::new();
        let mut dimensions = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(SVMError::IoError)?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (row, dim) = Self::parse_line(line).map_err(|e| {
                SVMError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;
            rows.push(row);
            dimensions = dimensions.max(dim);
        }

        if rows.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        Ok(LibSVMDataset { rows, dimensions })
    }

    /// Widen every sample to `dim` features
    ///
    /// Used to line a test file up with the dimension a model was trained
    /// on when its highest features happen to be zero everywhere.
    pub fn with_dim(mut self, dim: usize) -> Result<Self> {
        if dim < self.dimensions {
            return Err(SVMError::DimensionMismatch {
                expected: dim,
                actual: self.dimensions,
            });
        }
        self.dimensions = dim;
        Ok(self)
    }

    /// Parse a single line; returns the row and the dimension it needs
    fn parse_line(line: &str) -> Result<(Row, usize)> {
        let mut parts = line.split_whitespace();
        let label_str = parts
            .next()
            .ok_or_else(|| SVMError::ParseError("Empty line".to_string()))?;

        let label = label_str
            .parse::<f64>()
            .map_err(|_| SVMError::ParseError(format!("Invalid label: {}", label_str)))?;
        // Binary classification: positive labels are +1, everything else -1
        let label = if label > 0.0 { 1 } else { -1 };

        let mut entries = Vec::new();
        let mut dim = 0;
        for feature_str in parts {
            let (index, value) = feature_str.split_once(':').ok_or_else(|| {
                SVMError::ParseError(format!("Invalid feature format: {}", feature_str))
            })?;

            let index = index
                .parse::<usize>()
                .map_err(|_| SVMError::ParseError(format!("Invalid feature index: {}", index)))?;
            let value = value
                .parse::<f64>()
                .map_err(|_| SVMError::ParseError(format!("Invalid feature value: {}", value)))?;

            // libsvm uses 1-based indexing
            if index == 0 {
                return Err(SVMError::ParseError(
                    "Feature index must be positive: 0".to_string(),
                ));
            }

            entries.push((index - 1, value));
            dim = dim.max(index);
        }

        Ok(((entries, label), dim))
    }
}

impl Dataset for LibSVMDataset {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn dim(&self) -> usize {
        self.dimensions
    }

    fn get_sample(&self, i: usize) -> Sample {
        let (entries, label) = &self.rows[i];
        let mut values = vec![0.0; self.dimensions];
        for &(index, value) in entries {
            values[index] = value;
        }
        Sample::new(RealVector::new(values), *label)
    }

    fn get_labels(&self) -> Vec<i32> {
        self.rows.iter().map(|(_, label)| *label).collect()
    }
}
