//! `TopoFlow` input adapter library
//!
//! Helpers used by a web-based modeling tool to adapt user-supplied
//! parameters into the input formats expected by `TopoFlow` hydrological
//! components:
//!
//! - normalize user-facing choice strings into `TopoFlow` tokens;
//! - infer whether a parameter value is typed as float or string;
//! - materialize scalar parameter values into `RiverTools` RTG (single grid)
//!   and RTS (grid sequence) binary files, reading grid dimensions and byte
//!   order from the site's RTI text header.
//!
//! Everything is synchronous and single-threaded; all failures propagate to
//! the caller.

// Choice-string normalization
pub mod choices;

// Error types
pub mod error;

// Grid/grid-sequence materialization
pub mod materializer;

// Parameter environment, ptype/dtype tags
pub mod parameters;

// RTG/RTS binary encoding
pub mod raster;

// RTI header files
pub mod rti;

// Re-export the adapter surface
pub use choices::{area_unit_symbol, choice_flag, lowercase_choice};
pub use error::{InvalidParameterTypeError, MaterializeError, ParseError};
pub use materializer::GridMaterializer;
pub use parameters::{assign_parameters, Assignment, Dtype, Environment, Ptype, Value};
pub use raster::{read_time_series, Raster, RtsWriter};
pub use rti::{ByteOrder, RtiHeader};
