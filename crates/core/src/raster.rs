//! RTG and RTS binary grid encoding
//!
//! An RTG file is a raw row-major dump of a 2-D float32 grid; an RTS file is
//! the same for a time-indexed stack of grids, time-major. Cell byte order
//! follows the RTI header of the site.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::MaterializeError;
use crate::rti::ByteOrder;

/// Bytes per grid cell (float32).
const CELL_BYTES: usize = 4;

/// A 2-D grid of cell values in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    rows: usize,
    columns: usize,
    cells: Vec<f32>,
}

impl Raster {
    /// Create a grid uniformly filled with one value.
    #[must_use]
    pub fn uniform(rows: usize, columns: usize, value: f32) -> Self {
        Self {
            rows,
            columns,
            cells: vec![value; rows * columns],
        }
    }

    /// Create a grid from row-major cell values.
    ///
    /// # Panics
    /// Panics if the cell count does not match the dimensions.
    #[must_use]
    pub fn from_cells(rows: usize, columns: usize, cells: Vec<f32>) -> Self {
        assert_eq!(cells.len(), rows * columns, "cell count mismatch");
        Self {
            rows,
            columns,
            cells,
        }
    }

    /// Read a grid from a flat RTG file.
    ///
    /// # Errors
    /// `MaterializeError::Io` if the file cannot be read, `GridSizeMismatch`
    /// if its byte count disagrees with the dimensions.
    pub fn read_rtg(
        path: impl AsRef<Path>,
        rows: usize,
        columns: usize,
        byte_order: ByteOrder,
    ) -> Result<Self, MaterializeError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| MaterializeError::Io {
            action: "read",
            path: path.to_path_buf(),
            source,
        })?;

        let expected = rows * columns * CELL_BYTES;
        if bytes.len() != expected {
            return Err(MaterializeError::GridSizeMismatch {
                path: path.to_path_buf(),
                rows,
                columns,
                expected,
                found: bytes.len(),
            });
        }

        let cells = bytes
            .chunks_exact(CELL_BYTES)
            .map(|chunk| byte_order.decode([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Ok(Self {
            rows,
            columns,
            cells,
        })
    }

    /// Write the grid to an RTG file as a raw row-major dump.
    ///
    /// # Errors
    /// `MaterializeError::Io` if the file cannot be created or written.
    pub fn write_rtg(
        &self,
        path: impl AsRef<Path>,
        byte_order: ByteOrder,
    ) -> Result<(), MaterializeError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| MaterializeError::Io {
            action: "create",
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        write_cells(&mut writer, &self.cells, byte_order).map_err(|source| {
            MaterializeError::Io {
                action: "write",
                path: path.to_path_buf(),
                source,
            }
        })?;
        writer.flush().map_err(|source| MaterializeError::Io {
            action: "write",
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of grid rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of grid columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Row-major cell values.
    #[must_use]
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Cell value at a grid position.
    #[must_use]
    pub fn value_at(&self, row: usize, column: usize) -> f32 {
        self.cells[row * self.columns + column]
    }
}

/// Streaming writer for RTS grid-sequence files.
///
/// Frames are written time-major; every frame must hold `rows * columns`
/// cells.
#[derive(Debug)]
pub struct RtsWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    byte_order: ByteOrder,
    cells_per_frame: usize,
    frames_written: usize,
}

impl RtsWriter {
    /// Create the output file and a writer for it.
    ///
    /// # Errors
    /// `MaterializeError::Io` if the file cannot be created.
    pub fn create(
        path: impl Into<PathBuf>,
        rows: usize,
        columns: usize,
        byte_order: ByteOrder,
    ) -> Result<Self, MaterializeError> {
        let path = path.into();
        let file = File::create(&path).map_err(|source| MaterializeError::Io {
            action: "create",
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
            byte_order,
            cells_per_frame: rows * columns,
            frames_written: 0,
        })
    }

    /// Append one time step's grid.
    ///
    /// # Errors
    /// `MaterializeError::Io` on write failure.
    ///
    /// # Panics
    /// Panics if the frame's cell count does not match the writer's
    /// dimensions.
    pub fn write_frame(&mut self, cells: &[f32]) -> Result<(), MaterializeError> {
        assert_eq!(cells.len(), self.cells_per_frame, "frame size mismatch");
        write_cells(&mut self.writer, cells, self.byte_order).map_err(|source| {
            MaterializeError::Io {
                action: "write",
                path: self.path.clone(),
                source,
            }
        })?;
        self.frames_written += 1;
        Ok(())
    }

    /// Flush and close the file, returning the number of frames written.
    ///
    /// # Errors
    /// `MaterializeError::Io` on flush failure.
    pub fn finish(mut self) -> Result<usize, MaterializeError> {
        self.writer.flush().map_err(|source| MaterializeError::Io {
            action: "write",
            path: self.path.clone(),
            source,
        })?;
        Ok(self.frames_written)
    }
}

/// Read a 1-D time series from a whitespace-separated text file.
///
/// Lines may carry `#` comments; blank lines are skipped.
///
/// # Errors
/// `MaterializeError::Io` if the file cannot be read, `BadSeriesValue` for a
/// token that does not parse as a number.
pub fn read_time_series(path: impl AsRef<Path>) -> Result<Vec<f32>, MaterializeError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| MaterializeError::Io {
        action: "read",
        path: path.to_path_buf(),
        source,
    })?;

    let mut series = Vec::new();
    for raw_line in text.lines() {
        let line = match raw_line.find('#') {
            Some(comment) => &raw_line[..comment],
            None => raw_line,
        };
        for token in line.split_whitespace() {
            let value = token
                .parse()
                .map_err(|_| MaterializeError::BadSeriesValue {
                    path: path.to_path_buf(),
                    token: token.to_string(),
                })?;
            series.push(value);
        }
    }
    Ok(series)
}

fn write_cells<W: Write>(
    writer: &mut W,
    cells: &[f32],
    byte_order: ByteOrder,
) -> std::io::Result<()> {
    for &cell in cells {
        writer.write_all(&byte_order.encode(cell))?;
    }
    Ok(())
}
