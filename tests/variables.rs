//! Variable and date/time variation roundtrips.
//!
//! Exercises the NAMESTR surface (formats, informats, justification,
//! labels, name and length boundaries, negative variable numbers) and the
//! three temporal value kinds across representative calendar points.

use std::io::Cursor;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use sas_transport::temporal::{
    date_from_sas_days, sas_days_since_1960, sas_seconds_since_1960, sas_seconds_since_midnight,
};
use sas_transport::{
    DatasetDescription, Format, Justification, LibraryDescription, Value, Variable,
};

fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 7, 9)
        .unwrap()
        .and_hms_opt(13, 37, 11)
        .unwrap()
}

fn library(variables: Vec<Variable>) -> LibraryDescription {
    let dataset = DatasetDescription::new("VARIED", variables)
        .with_source_operating_system("Linux")
        .with_source_sas_version("9.4")
        .with_created(timestamp())
        .with_modified(timestamp());
    LibraryDescription::new(dataset)
}

fn roundtrip(
    library: &LibraryDescription,
    rows: &[Vec<Value>],
) -> (LibraryDescription, Vec<Vec<Value>>) {
    let mut sink = Vec::new();
    let mut exporter = library.export_transport(&mut sink).unwrap();
    for row in rows {
        exporter.append_observation(row).unwrap();
    }
    exporter.close().unwrap();
    drop(exporter);

    let mut importer = LibraryDescription::import_transport(Cursor::new(sink)).unwrap();
    let description = importer.description().clone();
    let mut out = Vec::new();
    while let Some(row) = importer.next_observation().unwrap() {
        out.push(row);
    }
    (description, out)
}

#[test]
fn variable_variations_roundtrip() {
    let variables = vec![
        // Name at the 8-character boundary, label at the 40-character
        // boundary.
        Variable::character("ABCDEFGH", 1)
            .with_number(1)
            .with_label("B".repeat(40)),
        // Underscore-led name, right justification.
        Variable::numeric("_COUNT")
            .with_number(2)
            .with_justification(Justification::Right),
        // Full format and informat population.
        Variable::numeric("DOSE")
            .with_number(3)
            .with_label("Dose (mg)")
            .with_output_format(Format::with_digits("BEST", 12, 2))
            .with_input_format(Format::with_digits("BEST", 12, 2)),
        // Dollar format on a character variable.
        Variable::character("ARM", 16)
            .with_number(4)
            .with_output_format(Format::new("$CHAR", 16)),
        // Negative variable number passes through untouched.
        Variable::numeric("ODDNUM").with_number(-3),
        // Minimum and maximum strict lengths.
        Variable::numeric("NARROW").with_length(2).with_number(6),
        Variable::character("WIDE", 200).with_number(7),
    ];
    let lib = library(variables);

    let (imported, rows) = roundtrip(&lib, &[]);
    assert!(rows.is_empty());
    assert_eq!(imported, lib);

    let vars = &imported.dataset.variables;
    assert_eq!(vars[0].label.len(), 40);
    assert_eq!(vars[1].output_format_justification, Justification::Right);
    assert_eq!(vars[2].input_format, Format::with_digits("BEST", 12, 2));
    assert_eq!(vars[4].number, -3);
    assert_eq!(vars[5].length, 2);
    assert_eq!(vars[6].length, 200);
}

#[test]
fn datetime_variations_roundtrip() {
    let lib = library(vec![
        Variable::numeric("D").with_number(1),
        Variable::numeric("T").with_number(2),
        Variable::numeric("DT").with_number(3),
    ]);

    let cases = [
        // The SAS epoch itself.
        (
            NaiveDate::from_ymd_opt(1960, 1, 1).unwrap(),
            NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
        ),
        // Before the epoch: negative day and second offsets.
        (
            NaiveDate::from_ymd_opt(1959, 12, 31).unwrap(),
            NaiveTime::from_hms_opt(0, 0, 1).unwrap(),
        ),
        (
            NaiveDate::from_ymd_opt(1901, 2, 3).unwrap(),
            NaiveTime::from_hms_opt(6, 7, 8).unwrap(),
        ),
        // A leap day and the last second of a day.
        (
            NaiveDate::from_ymd_opt(2000, 2, 29).unwrap(),
            NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
        ),
        (
            NaiveDate::from_ymd_opt(2044, 11, 5).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        ),
    ];

    let rows: Vec<Vec<Value>> = cases
        .iter()
        .map(|&(date, time)| {
            vec![
                Value::from(date),
                Value::from(time),
                Value::from(NaiveDateTime::new(date, time)),
            ]
        })
        .collect();

    let (_, imported) = roundtrip(&lib, &rows);
    for (row, &(date, time)) in imported.iter().zip(&cases) {
        assert_eq!(
            row[0],
            Value::Number(sas_days_since_1960(date) as f64),
            "date {date}"
        );
        assert_eq!(
            row[1],
            Value::Number(sas_seconds_since_midnight(time) as f64),
            "time {time}"
        );
        assert_eq!(
            row[2],
            Value::Number(sas_seconds_since_1960(NaiveDateTime::new(date, time)) as f64),
            "datetime {date} {time}"
        );
        // The numeric day offset maps back to the calendar date.
        let Value::Number(days) = row[0] else {
            panic!("expected a number");
        };
        assert_eq!(date_from_sas_days(days as i64), Some(date));
    }
}

#[test]
fn many_rows_across_many_record_boundaries() {
    // A 28-byte row does not divide 80; rows continually straddle record
    // boundaries and the final row ends mid-record.
    let lib = library(vec![
        Variable::numeric("SEQ").with_number(1),
        Variable::character("TAG", 20).with_number(2),
    ]);

    let rows: Vec<Vec<Value>> = (0..250)
        .map(|i| vec![Value::from(f64::from(i)), Value::from(format!("tag-{i}"))])
        .collect();

    let (_, imported) = roundtrip(&lib, &rows);
    assert_eq!(imported.len(), 250);
    for (i, row) in imported.iter().enumerate() {
        assert_eq!(row[0], Value::Number(i as f64));
        let expected = format!("tag-{i}");
        let Value::Character(tag) = &row[1] else {
            panic!("expected a character value");
        };
        assert_eq!(tag.trim_end_matches(' '), expected);
        assert_eq!(tag.len(), 20);
    }
}
