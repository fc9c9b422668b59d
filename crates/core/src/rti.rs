//! `RiverTools` RTI header files
//!
//! An RTI file is a flat text document of `Key: Value` lines describing a
//! raster grid. Anything after a `;` is a comment; lines without a `:` are
//! ignored. The adapter needs the grid dimensions and the byte order of the
//! accompanying binary files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Header field holding the row count.
const ROWS_FIELD: &str = "Number of rows";
/// Header field holding the column count.
const COLUMNS_FIELD: &str = "Number of columns";
/// Header field holding the declared byte order.
const BYTE_ORDER_FIELD: &str = "Byte order";

/// Byte order of the binary grid files described by an RTI header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Big-endian, declared as `MSB`
    Msb,
    /// Little-endian, anything else
    Lsb,
}

impl ByteOrder {
    /// Map a declared byte-order string to an order.
    ///
    /// `"MSB"` means big-endian; any other declaration falls back to
    /// little-endian. The fallback is policy, not an error.
    #[must_use]
    pub fn from_declared(tag: &str) -> Self {
        if tag == "MSB" {
            ByteOrder::Msb
        } else {
            ByteOrder::Lsb
        }
    }

    /// Encode a cell value in this byte order.
    #[must_use]
    pub fn encode(self, value: f32) -> [u8; 4] {
        match self {
            ByteOrder::Msb => value.to_be_bytes(),
            ByteOrder::Lsb => value.to_le_bytes(),
        }
    }

    /// Decode a cell value from this byte order.
    #[must_use]
    pub fn decode(self, bytes: [u8; 4]) -> f32 {
        match self {
            ByteOrder::Msb => f32::from_be_bytes(bytes),
            ByteOrder::Lsb => f32::from_le_bytes(bytes),
        }
    }
}

/// Parsed RTI header: grid dimensions, byte order, and the remaining raw
/// fields for callers that need them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtiHeader {
    /// Number of grid rows
    pub rows: usize,
    /// Number of grid columns
    pub columns: usize,
    /// Byte order of the described binary files
    pub byte_order: ByteOrder,
    fields: BTreeMap<String, String>,
}

impl RtiHeader {
    /// Load and parse an RTI header file.
    ///
    /// Reads the file line by line, strips `;` comments, keeps only lines
    /// containing a `:` delimiter, and splits each on the first `:` into a
    /// trimmed key-value pair.
    ///
    /// # Errors
    /// `ParseError::Io` if the file cannot be read, `MalformedLine` for a
    /// kept line with an empty key, `MissingField`/`InvalidField` when the
    /// required dimension and byte-order fields are absent or malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut fields = BTreeMap::new();
        for (index, raw_line) in text.lines().enumerate() {
            let line = match raw_line.find(';') {
                Some(comment) => &raw_line[..comment],
                None => raw_line,
            };
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ParseError::MalformedLine {
                    path: path.to_path_buf(),
                    line: index + 1,
                });
            }
            fields.insert(key.to_string(), value.trim().to_string());
        }

        let rows = required_dimension(&fields, ROWS_FIELD, path)?;
        let columns = required_dimension(&fields, COLUMNS_FIELD, path)?;
        let byte_order = fields
            .get(BYTE_ORDER_FIELD)
            .map(|tag| ByteOrder::from_declared(tag.as_str()))
            .ok_or_else(|| ParseError::MissingField {
                path: path.to_path_buf(),
                field: BYTE_ORDER_FIELD,
            })?;

        Ok(Self {
            rows,
            columns,
            byte_order,
            fields,
        })
    }

    /// Raw value of any header field, required or not.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Number of cells in one grid described by this header.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows * self.columns
    }
}

fn required_dimension(
    fields: &BTreeMap<String, String>,
    field: &'static str,
    path: &Path,
) -> Result<usize, ParseError> {
    let value = fields.get(field).ok_or_else(|| ParseError::MissingField {
        path: path.to_path_buf(),
        field,
    })?;
    value.parse().map_err(|_| ParseError::InvalidField {
        path: path.to_path_buf(),
        field,
        value: value.clone(),
    })
}
