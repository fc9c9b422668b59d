//! Materialization of scalar parameters into grid files
//!
//! `TopoFlow` components read some parameters from binary grid files rather
//! than from the configuration itself. The materializer expands a scalar (or
//! a small uploaded file) into the full RTG/RTS artifact and records the
//! produced file name back into the environment.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{InvalidParameterTypeError, MaterializeError};
use crate::parameters::{dtype_key, file_key, ptype_key, Dtype, Environment, Ptype};
use crate::raster::{read_time_series, Raster, RtsWriter};
use crate::rti::RtiHeader;

/// Environment key naming the site whose RTI header describes the grid.
const SITE_PREFIX: &str = "site_prefix";
/// Environment key naming the case used to prefix produced files.
const CASE_PREFIX: &str = "case_prefix";
/// Environment key holding the number of time steps in a sequence.
const N_STEPS: &str = "n_steps";

/// Expanded source for one grid-sequence output.
enum SequenceSource {
    /// One value for every cell and step
    Uniform(f32),
    /// One value per step, uniform across the grid
    Series(Vec<f32>),
    /// One grid repeated for every step
    Frame(Raster),
}

/// Writes `TopoFlow` grid artifacts for scalar-valued parameters.
///
/// File names from the environment are resolved against a base directory,
/// which defaults to the working directory.
#[derive(Debug, Clone, Default)]
pub struct GridMaterializer {
    base_dir: PathBuf,
}

impl GridMaterializer {
    /// Materializer resolving files against the working directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Materializer resolving files against `base_dir`.
    pub fn in_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Expand a scalar parameter into a single-grid RTG file.
    ///
    /// Reads grid dimensions and byte order from `<site_prefix>.rti`, fills
    /// a `rows x columns` grid with the parameter's value, and writes it to
    /// `<case_prefix>_<name>.rtg`. The returned environment holds the file
    /// name under `<name>` and `<name>_file`, with `<name>_ptype = "Grid"`
    /// and `<name>_dtype = "string"`.
    ///
    /// # Errors
    /// `MaterializeError::Header` on RTI problems, `MissingParameter`/
    /// `NotANumber` for a bad environment, `Io` on write failure.
    pub fn scalar_to_grid(
        &self,
        name: &str,
        mut env: Environment,
    ) -> Result<Environment, MaterializeError> {
        let header = self.load_header(&env)?;
        let value = env.require_f64(name)? as f32;
        let file_name = format!("{}_{name}.rtg", env.require_str(CASE_PREFIX)?);

        let raster = Raster::uniform(header.rows, header.columns, value);
        raster.write_rtg(self.resolve(&file_name), header.byte_order)?;
        info!(
            "wrote {file_name}: {}x{} grid filled with {value}",
            header.rows, header.columns
        );

        record_artifact(&mut env, name, &file_name, Ptype::Grid);
        Ok(env)
    }

    /// Expand a parameter into a grid-sequence RTS file.
    ///
    /// The parameter's current `<name>_ptype` selects the source:
    /// - `Scalar`: every cell of every step holds the scalar value;
    /// - `Time_Series`: step `i` is uniformly the `i`-th value of the text
    ///   series named by `<name>`;
    /// - `Grid`: the RTG grid named by `<name>` is repeated for every step.
    ///
    /// Any other tag fails with [`InvalidParameterTypeError`]. The stack is
    /// written to `<case_prefix>_<name>.rts` and the environment updated as
    /// for [`Self::scalar_to_grid`], with `<name>_ptype = "Grid_Sequence"`.
    ///
    /// # Errors
    /// `InvalidParameterType` for an unrecognized tag (including
    /// `Grid_Sequence` itself), `SeriesTooShort` when the series has fewer
    /// than `n_steps` values, plus the failure modes of
    /// [`Self::scalar_to_grid`].
    pub fn to_grid_sequence(
        &self,
        name: &str,
        mut env: Environment,
    ) -> Result<Environment, MaterializeError> {
        let header = self.load_header(&env)?;
        let n_steps = env.require_usize(N_STEPS)?;
        let ptype: Ptype = env.require_str(&ptype_key(name))?.parse()?;

        // Read all inputs before creating the output file so a bad source
        // never leaves a truncated artifact behind.
        let source = match ptype {
            Ptype::Scalar => SequenceSource::Uniform(env.require_f64(name)? as f32),
            Ptype::TimeSeries => {
                let path = self.resolve(env.require_str(name)?);
                let series = read_time_series(&path)?;
                if series.len() < n_steps {
                    return Err(MaterializeError::SeriesTooShort {
                        path,
                        needed: n_steps,
                        found: series.len(),
                    });
                }
                SequenceSource::Series(series)
            }
            Ptype::Grid => {
                let path = self.resolve(env.require_str(name)?);
                SequenceSource::Frame(Raster::read_rtg(
                    path,
                    header.rows,
                    header.columns,
                    header.byte_order,
                )?)
            }
            Ptype::GridSequence => {
                return Err(InvalidParameterTypeError(ptype.to_string()).into());
            }
        };

        let file_name = format!("{}_{name}.rts", env.require_str(CASE_PREFIX)?);
        let mut writer = RtsWriter::create(
            self.resolve(&file_name),
            header.rows,
            header.columns,
            header.byte_order,
        )?;
        match source {
            SequenceSource::Uniform(value) => {
                let frame = vec![value; header.cell_count()];
                for _ in 0..n_steps {
                    writer.write_frame(&frame)?;
                }
            }
            SequenceSource::Series(series) => {
                let mut frame = vec![0.0_f32; header.cell_count()];
                for &value in &series[..n_steps] {
                    frame.fill(value);
                    writer.write_frame(&frame)?;
                }
            }
            SequenceSource::Frame(raster) => {
                for _ in 0..n_steps {
                    writer.write_frame(raster.cells())?;
                }
            }
        }
        let frames = writer.finish()?;
        info!(
            "wrote {file_name}: {frames} steps of a {}x{} grid from {ptype} input",
            header.rows, header.columns
        );

        record_artifact(&mut env, name, &file_name, Ptype::GridSequence);
        Ok(env)
    }

    fn load_header(&self, env: &Environment) -> Result<RtiHeader, MaterializeError> {
        let site_prefix = env.require_str(SITE_PREFIX)?;
        let path = self.resolve(&format!("{site_prefix}.rti"));
        let header = RtiHeader::load(path)?;
        debug!(
            "loaded header for site '{site_prefix}': {}x{} cells, {:?} order",
            header.rows, header.columns, header.byte_order
        );
        Ok(header)
    }

    fn resolve(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }
}

/// Record a produced grid file back into the environment: the file name
/// under `<name>` and `<name>_file`, the new representation tag, and a
/// `string` dtype.
fn record_artifact(env: &mut Environment, name: &str, file_name: &str, ptype: Ptype) {
    env.insert(name, file_name);
    env.insert(file_key(name), file_name);
    env.insert(ptype_key(name), ptype.as_str());
    env.insert(dtype_key(name), Dtype::String.as_str());
}
