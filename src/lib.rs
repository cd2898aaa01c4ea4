//! # sas-transport
//!
//! Pure Rust reader and writer for SAS Transport (XPORT) Version 5 files,
//! the interchange format the FDA mandates for clinical dataset
//! submissions.
//!
//! A transport file packages one dataset: a schema of named, typed
//! variables plus a stream of fixed-width observation rows. This crate
//! implements the binary codec end to end: the 80-byte record framing, the
//! fixed header grammar, the 140-byte NAMESTR variable descriptors, the
//! IBM System/360 hexadecimal floating-point encoding of numeric values,
//! the 28 SAS missing-value sentinels, and the end-of-file padding
//! heuristics that match the behavior of SAS itself.
//!
//! ## Reading a transport file
//!
//! ```no_run
//! use std::fs::File;
//! use sas_transport::LibraryDescription;
//!
//! let file = File::open("ae.xpt")?;
//! let mut importer = LibraryDescription::import_transport(file)?;
//!
//! println!("dataset: {}", importer.description().dataset.name);
//! while let Some(row) = importer.next_observation()? {
//!     println!("{row:?}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Writing a transport file
//!
//! ```no_run
//! use std::fs::File;
//! use sas_transport::{DatasetDescription, LibraryDescription, Value, Variable};
//!
//! let dataset = DatasetDescription::new(
//!     "VITALS",
//!     vec![
//!         Variable::character("USUBJID", 20).with_number(1),
//!         Variable::numeric("WEIGHT").with_number(2),
//!     ],
//! )
//! .with_label("Vital Signs");
//!
//! let library = LibraryDescription::new(dataset);
//! let mut exporter = library.export_transport(File::create("vs.xpt")?)?;
//! exporter.append_observation(&[Value::from("01-001"), Value::from(64.5)])?;
//! exporter.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Values
//!
//! Observation cells are [`Value`]s. Character variables carry ASCII
//! strings (missing is the empty string, padded with blanks on the wire).
//! Numeric variables accept finite numbers, any of the 28 [`MissingValue`]
//! sentinels, and chrono date, time, and datetime values, which are stored
//! as offsets from the SAS epoch, 1960-01-01.
//!
//! ## Strictness
//!
//! Validation defaults to [`StrictnessMode::FdaSubmission`]: ASCII-only
//! metadata, 8-character names, 40-character labels, character variables of
//! at most 200 bytes. [`StrictnessMode::Basic`] relaxes character lengths
//! to 32767 bytes and permits non-ASCII labels.
//!
//! Out of scope: the V8/V9 XPORT variant, CPORT (compressed) files, and
//! libraries with more than one dataset. These are detected and refused
//! with distinct errors.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]

mod dataset;
mod error;
mod export;
mod format;
mod header;
mod ibm;
mod import;
mod missing;
mod namestr;
mod record;
mod timestamp;
mod validate;
mod value;
mod variable;

pub use dataset::{DatasetDescription, LibraryDescription};
pub use error::{Error, Result, UnsupportedVariant};
pub use export::{ExportOptions, Exporter};
pub use format::{Format, Justification};
pub use import::{ImportOptions, Importer, Observation};
pub use missing::MissingValue;
pub use timestamp::{YearMapper, default_year_mapper};
pub use validate::{
    StrictnessMode, validate_dataset, validate_library, validate_variable,
};
pub use value::Value;
pub use variable::{Variable, VariableType};

/// Temporal conversion utilities.
///
/// These functions convert between chrono types and the numeric date,
/// time, and datetime values SAS stores as offsets from the 1960-01-01
/// epoch.
pub mod temporal {
    pub use crate::timestamp::{
        date_from_sas_days, datetime_from_sas_seconds, sas_days_since_1960,
        sas_seconds_since_1960, sas_seconds_since_midnight, time_from_sas_seconds,
    };
}
