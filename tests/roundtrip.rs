//! End-to-end roundtrip tests.
//!
//! Everything written under strict-mode invariants must read back
//! field-for-field, modulo the documented conversions: numeric values pass
//! through the 56-bit IBM mantissa, character values come back
//! space-padded to their declared length, and temporal values come back as
//! numeric SAS epoch offsets.

use std::io::Cursor;

use chrono::{NaiveDate, NaiveDateTime};

use sas_transport::temporal::{
    sas_days_since_1960, sas_seconds_since_1960, sas_seconds_since_midnight,
};
use sas_transport::{
    DatasetDescription, ExportOptions, Format, ImportOptions, Justification, LibraryDescription,
    MissingValue, StrictnessMode, Value, Variable,
};

fn created() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2015, 3, 14)
        .unwrap()
        .and_hms_opt(9, 26, 53)
        .unwrap()
}

fn modified() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2015, 12, 1)
        .unwrap()
        .and_hms_opt(18, 0, 1)
        .unwrap()
}

fn library(name: &str, variables: Vec<Variable>) -> LibraryDescription {
    let dataset = DatasetDescription::new(name, variables)
        .with_source_operating_system("Linux")
        .with_source_sas_version("9.4")
        .with_created(created())
        .with_modified(modified());
    LibraryDescription::new(dataset)
}

fn export_bytes(library: &LibraryDescription, rows: &[Vec<Value>]) -> Vec<u8> {
    let mut sink = Vec::new();
    let mut exporter = library.export_transport(&mut sink).unwrap();
    for row in rows {
        exporter.append_observation(row).unwrap();
    }
    exporter.close().unwrap();
    drop(exporter);
    sink
}

fn roundtrip(
    library: &LibraryDescription,
    rows: &[Vec<Value>],
) -> (LibraryDescription, Vec<Vec<Value>>) {
    let bytes = export_bytes(library, rows);
    let mut importer = LibraryDescription::import_transport(Cursor::new(bytes)).unwrap();
    let description = importer.description().clone();
    let mut out = Vec::new();
    while let Some(row) = importer.next_observation().unwrap() {
        out.push(row);
    }
    (description, out)
}

#[test]
fn description_roundtrips_field_for_field() {
    let dataset = DatasetDescription::new(
        "VITALS",
        vec![
            Variable::character("USUBJID", 20)
                .with_number(1)
                .with_label("Unique Subject Identifier"),
            Variable::numeric("WEIGHT")
                .with_number(2)
                .with_label("Weight (kg)")
                .with_output_format(Format::with_digits("BEST", 12, 1))
                .with_justification(Justification::Right)
                .with_input_format(Format::new("BEST", 12)),
            Variable::numeric("VISITDT")
                .with_number(3)
                .with_output_format(Format::new("DATE", 9)),
        ],
    )
    .with_label("Vital Signs")
    .with_type("DATA")
    .with_source_operating_system("z/OS")
    .with_source_sas_version("6.12")
    .with_created(created())
    .with_modified(modified());

    let library = LibraryDescription::new(dataset)
        .with_source_operating_system("Linux")
        .with_source_sas_version("9.4");

    let (imported, rows) = roundtrip(&library, &[]);
    assert_eq!(imported, library);
    assert!(rows.is_empty());
}

#[test]
fn smoke_dataset_roundtrip() {
    let lib = library(
        "SMOKE",
        vec![
            Variable::numeric("X").with_number(1),
            Variable::numeric("Y").with_number(2),
            Variable::character("NOTE", 10).with_number(3),
        ],
    );

    let rows = vec![
        vec![Value::from(15.2), Value::from(5.0), Value::from("first row")],
        vec![
            Value::from(0.0),
            Value::from(10000.0),
            Value::from("second row"),
        ],
        vec![
            Value::from(-400.0),
            Value::from(10000.0),
            Value::Missing(MissingValue::Standard),
        ],
        vec![
            Value::Missing(MissingValue::Special('B')),
            Value::from(10000.0),
            Value::from("final row"),
        ],
    ];

    let (_, imported) = roundtrip(&lib, &rows);
    assert_eq!(
        imported,
        vec![
            vec![
                Value::Number(15.2),
                Value::Number(5.0),
                Value::Character("first row ".into())
            ],
            vec![
                Value::Number(0.0),
                Value::Number(10000.0),
                Value::Character("second row".into())
            ],
            vec![
                Value::Number(-400.0),
                Value::Number(10000.0),
                Value::Character(" ".repeat(10))
            ],
            vec![
                Value::Missing(MissingValue::Special('B')),
                Value::Number(10000.0),
                Value::Character("final row ".into())
            ],
        ]
    );
}

#[test]
fn all_28_missing_values_roundtrip() {
    let lib = library("MISSING", vec![Variable::numeric("M")]);
    let rows: Vec<Vec<Value>> = MissingValue::all()
        .into_iter()
        .map(|code| vec![Value::Missing(code)])
        .collect();

    let (_, imported) = roundtrip(&lib, &rows);
    assert_eq!(imported.len(), 28);
    for (row, code) in imported.iter().zip(MissingValue::all()) {
        assert_eq!(row[0], Value::Missing(code));
    }
}

#[test]
fn numeric_boundaries_roundtrip() {
    let lib = library("BOUNDS", vec![Variable::numeric("N")]);
    let values = [
        (2.0f64).powi(-260),
        (2.0f64).powi(248),
        1.23e-78,
        1.23e74,
        -1.0,
        1.0,
    ];
    let rows: Vec<Vec<Value>> = values.iter().map(|&v| vec![Value::from(v)]).collect();

    let (_, imported) = roundtrip(&lib, &rows);
    for (row, &expected) in imported.iter().zip(&values) {
        assert_eq!(row[0], Value::Number(expected));
    }
}

#[test]
fn truncated_numeric_lengths_degrade_monotonically() {
    let variables: Vec<Variable> = (2..=8)
        .map(|len| Variable::numeric(format!("N{len}")).with_length(len))
        .collect();
    let lib = library("TRUNC", variables);

    let pi = std::f64::consts::PI;
    let ones: Vec<Value> = (2..=8).map(|_| Value::from(1.0)).collect();
    let pis: Vec<Value> = (2..=8).map(|_| Value::from(pi)).collect();

    let (_, imported) = roundtrip(&lib, &[ones, pis]);

    // 1.0 has a one-byte mantissa and survives every length.
    for value in &imported[0] {
        assert_eq!(*value, Value::Number(1.0));
    }

    // Pi is truncated toward zero; longer fields lose less.
    let mut previous_error = f64::INFINITY;
    for value in &imported[1] {
        let Value::Number(decoded) = value else {
            panic!("expected a number, got {value:?}");
        };
        let error = (pi - decoded).abs();
        assert!(error < 0.25);
        assert!(error <= previous_error);
        previous_error = error;
    }
    // The full 8-byte field holds the entire binary64 mantissa.
    assert_eq!(imported[1][6], Value::Number(pi));
}

#[test]
fn temporal_values_become_epoch_offsets() {
    let lib = library(
        "TEMPORAL",
        vec![
            Variable::numeric("D").with_number(1),
            Variable::numeric("T").with_number(2),
            Variable::numeric("DT").with_number(3),
        ],
    );

    let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let time = chrono::NaiveTime::from_hms_opt(14, 30, 45).unwrap();
    let datetime = date.and_hms_opt(14, 30, 45).unwrap();

    let rows = vec![vec![
        Value::from(date),
        Value::from(time),
        Value::from(datetime),
    ]];

    let (_, imported) = roundtrip(&lib, &rows);
    assert_eq!(
        imported[0],
        vec![
            Value::Number(sas_days_since_1960(date) as f64),
            Value::Number(sas_seconds_since_midnight(time) as f64),
            Value::Number(sas_seconds_since_1960(datetime) as f64),
        ]
    );
}

#[test]
fn basic_mode_allows_wide_character_variables() {
    let lib = library("WIDE", vec![Variable::character("TEXT", 300)]);

    // Strict mode refuses the description outright.
    assert!(lib.export_transport(Vec::new()).is_err());

    let mut sink = Vec::new();
    let options = ExportOptions {
        strictness: StrictnessMode::Basic,
    };
    let mut exporter = lib
        .export_transport_with_options(&mut sink, options)
        .unwrap();
    exporter.append_observation(&[Value::from("wide")]).unwrap();
    exporter.close().unwrap();
    drop(exporter);

    // Strict-mode import refuses it too; basic mode reads it back.
    assert!(LibraryDescription::import_transport(Cursor::new(sink.clone())).is_err());

    let options = ImportOptions {
        strictness: StrictnessMode::Basic,
        ..ImportOptions::default()
    };
    let mut importer =
        LibraryDescription::import_transport_with_options(Cursor::new(sink), options).unwrap();
    let row = importer.next_observation().unwrap().unwrap();
    let expected = format!("wide{}", " ".repeat(296));
    assert_eq!(row[0], Value::Character(expected));
}

#[test]
fn max_variables_description_roundtrip() {
    let variables: Vec<Variable> = (1..=9999)
        .map(|n| Variable::character(format!("V{n}"), 200).with_number(n as i16))
        .collect();
    let lib = library("MAXVARS", variables);

    let (imported, rows) = roundtrip(&lib, &[]);
    assert!(rows.is_empty());

    let dataset = &imported.dataset;
    assert_eq!(dataset.variables.len(), 9999);
    assert_eq!(dataset.variables[0].name, "V1");
    assert_eq!(dataset.variables[9998].name, "V9999");
    assert!(dataset.variables.iter().all(|v| v.length == 200));
}

#[test]
fn empty_and_blank_strings_are_the_character_missing_value() {
    let lib = library("BLANKS", vec![Variable::character("C", 5)]);
    let rows = vec![
        vec![Value::from("")],
        vec![Value::from("     ")],
        vec![Value::Missing(MissingValue::Standard)],
    ];

    let (_, imported) = roundtrip(&lib, &rows);
    for row in &imported {
        assert_eq!(row[0], Value::Character(" ".repeat(5)));
    }
}

#[test]
fn roundtrip_through_a_file_on_disk() {
    use std::fs::File;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vitals.xpt");

    let lib = library(
        "VITALS",
        vec![
            Variable::character("USUBJID", 12).with_number(1),
            Variable::numeric("WEIGHT").with_number(2),
        ],
    );

    let mut exporter = lib.export_transport(File::create(&path).unwrap()).unwrap();
    exporter
        .append_observation(&[Value::from("01-001"), Value::from(64.5)])
        .unwrap();
    exporter
        .append_observation(&[Value::from("01-002"), Value::Missing(MissingValue::Standard)])
        .unwrap();
    exporter.close().unwrap();
    drop(exporter);

    let mut importer = LibraryDescription::import_transport(File::open(&path).unwrap()).unwrap();
    assert_eq!(importer.description().dataset.name, "VITALS");
    assert_eq!(
        importer.next_observation().unwrap(),
        Some(vec![
            Value::Character("01-001      ".into()),
            Value::Number(64.5)
        ])
    );
    assert_eq!(
        importer.next_observation().unwrap(),
        Some(vec![
            Value::Character("01-002      ".into()),
            Value::Missing(MissingValue::Standard)
        ])
    );
    assert_eq!(importer.next_observation().unwrap(), None);
    importer.close();
}
