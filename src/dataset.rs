//! Dataset and library descriptors.
//!
//! A transport file packages one library holding one member: a
//! [`DatasetDescription`] (schema plus provenance metadata) wrapped in a
//! [`LibraryDescription`] (library-level provenance). Both are immutable
//! value types: build them up front, then hand them to
//! [`LibraryDescription::export_transport`] or receive them from
//! [`LibraryDescription::import_transport`].

use std::io::{Read, Write};

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::export::{ExportOptions, Exporter};
use crate::import::{ImportOptions, Importer};
use crate::variable::Variable;

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Schema and provenance of a single dataset (member).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DatasetDescription {
    /// Dataset name, a SAS identifier of 1-8 ASCII characters.
    pub name: String,
    /// Dataset label, at most 40 ASCII characters.
    pub label: String,
    /// Dataset type, at most 8 ASCII characters. Usually blank.
    pub dataset_type: String,
    /// Operating system the dataset was created on, at most 8 characters.
    pub source_operating_system: String,
    /// SAS version the dataset was created with, at most 8 characters.
    pub source_sas_version: String,
    /// The ordered columns of the dataset.
    pub variables: Vec<Variable>,
    /// Creation timestamp, local time, second resolution on the wire.
    pub created: NaiveDateTime,
    /// Modification timestamp, local time, second resolution on the wire.
    pub modified: NaiveDateTime,
}

impl DatasetDescription {
    /// Creates a description with the given name and variables.
    ///
    /// Timestamps default to the current local time; metadata strings
    /// default to blank. Use the `with_` setters to override.
    #[must_use]
    pub fn new(name: impl Into<String>, variables: Vec<Variable>) -> Self {
        let now = local_now();
        Self {
            name: name.into(),
            label: String::new(),
            dataset_type: String::new(),
            source_operating_system: String::new(),
            source_sas_version: String::new(),
            variables,
            created: now,
            modified: now,
        }
    }

    /// Sets the dataset label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the dataset type.
    #[must_use]
    pub fn with_type(mut self, dataset_type: impl Into<String>) -> Self {
        self.dataset_type = dataset_type.into();
        self
    }

    /// Sets the source operating system.
    #[must_use]
    pub fn with_source_operating_system(mut self, os: impl Into<String>) -> Self {
        self.source_operating_system = os.into();
        self
    }

    /// Sets the source SAS version.
    #[must_use]
    pub fn with_source_sas_version(mut self, version: impl Into<String>) -> Self {
        self.source_sas_version = version.into();
        self
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub fn with_created(mut self, created: NaiveDateTime) -> Self {
        self.created = created;
        self
    }

    /// Sets the modification timestamp.
    #[must_use]
    pub fn with_modified(mut self, modified: NaiveDateTime) -> Self {
        self.modified = modified;
        self
    }

    /// Total byte length of one observation record.
    #[must_use]
    pub fn observation_length(&self) -> usize {
        self.variables.iter().map(|v| usize::from(v.length)).sum()
    }
}

/// Library-level wrapper around the single dataset of a transport file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LibraryDescription {
    /// The single member of the library.
    pub dataset: DatasetDescription,
    /// Operating system recorded in the library header.
    pub source_operating_system: String,
    /// SAS version recorded in the library header.
    pub source_sas_version: String,
    /// Library creation timestamp.
    pub created: NaiveDateTime,
    /// Library modification timestamp.
    pub modified: NaiveDateTime,
}

impl LibraryDescription {
    /// Wraps a dataset description, copying its provenance metadata to the
    /// library level. Use the `with_` setters to override.
    #[must_use]
    pub fn new(dataset: DatasetDescription) -> Self {
        Self {
            source_operating_system: dataset.source_operating_system.clone(),
            source_sas_version: dataset.source_sas_version.clone(),
            created: dataset.created,
            modified: dataset.modified,
            dataset,
        }
    }

    /// Sets the library-level source operating system.
    #[must_use]
    pub fn with_source_operating_system(mut self, os: impl Into<String>) -> Self {
        self.source_operating_system = os.into();
        self
    }

    /// Sets the library-level source SAS version.
    #[must_use]
    pub fn with_source_sas_version(mut self, version: impl Into<String>) -> Self {
        self.source_sas_version = version.into();
        self
    }

    /// Sets the library creation timestamp.
    #[must_use]
    pub fn with_created(mut self, created: NaiveDateTime) -> Self {
        self.created = created;
        self
    }

    /// Sets the library modification timestamp.
    #[must_use]
    pub fn with_modified(mut self, modified: NaiveDateTime) -> Self {
        self.modified = modified;
        self
    }

    /// Opens an exporter over `sink`, writing the header and NAMESTR blocks
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`](crate::Error::Argument) if this
    /// description fails strict validation, or the underlying I/O error if
    /// writing the header block fails.
    pub fn export_transport<W: Write>(&self, sink: W) -> Result<Exporter<W>> {
        Exporter::new(sink, self, ExportOptions::default())
    }

    /// Like [`export_transport`](Self::export_transport) with explicit
    /// options.
    ///
    /// # Errors
    ///
    /// See [`export_transport`](Self::export_transport).
    pub fn export_transport_with_options<W: Write>(
        &self,
        sink: W,
        options: ExportOptions,
    ) -> Result<Exporter<W>> {
        Exporter::new(sink, self, options)
    }

    /// Opens an importer over `source`, parsing the header and NAMESTR
    /// blocks immediately. Observations are decoded lazily.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`](crate::Error::Malformed) if the header
    /// grammar is violated, [`Error::Unsupported`](crate::Error::Unsupported)
    /// for V8 or CPORT streams, or the underlying I/O error.
    pub fn import_transport<R: Read>(source: R) -> Result<Importer<R>> {
        Importer::new(source, ImportOptions::default())
    }

    /// Like [`import_transport`](Self::import_transport) with explicit
    /// options (strictness mode and two-digit-year mapping).
    ///
    /// # Errors
    ///
    /// See [`import_transport`](Self::import_transport).
    pub fn import_transport_with_options<R: Read>(
        source: R,
        options: ImportOptions,
    ) -> Result<Importer<R>> {
        Importer::new(source, options)
    }
}
