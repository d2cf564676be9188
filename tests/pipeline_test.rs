//! End-to-end tests: docx files on disk through to CSV and JSON.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use autmine::export::{to_json, write_audit_csv, write_records_csv};
use autmine::model::fields;
use autmine::{
    CsvEncoding, CsvOptions, Error, ExtractOptions, FieldValue, JsonFormat, NoProgress, Pipeline,
    PipelineOptions,
};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn paragraph(text: &str) -> String {
    format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", text)
}

fn write_docx(path: &Path, header: &[&str], paragraphs: &[&str]) {
    let cells: String = header
        .iter()
        .map(|c| format!("<w:tc>{}</w:tc>", paragraph(c)))
        .collect();
    let body: String = paragraphs.iter().map(|p| paragraph(p)).collect();
    let xml = format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            r#"<w:body><w:tbl><w:tr>{}</w:tr></w:tbl>{}</w:body></w:document>"#
        ),
        cells, body
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    let bytes = writer.finish().unwrap().into_inner();
    fs::write(path, bytes).unwrap();
}

fn report_folder() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_docx(
        &dir.path().join("a.docx"),
        &["010190-1234", "04.01.12.10", "03-04-2010"],
        &[
            "Obduktion af en 54-årig mand.",
            "Indvendig undersøgelse",
            "Hjertet vejer 350 g.",
            "Dødsårsagen er drukning.",
        ],
    );
    write_docx(
        &dir.path().join("b.docx"),
        &["010190-1234", "04.01.12.10", "05-04-2010"],
        &[
            "Obduktion af en 54-årig mand.",
            "Indvendig undersøgelse",
            "Hjertet vejer 360 g.",
            "Dødsårsagen er drukning.",
        ],
    );
    write_docx(
        &dir.path().join("c.docx"),
        &["020280-5678", "OK 123/2011", "01-02-2011"],
        &[
            "Obduktion af en 30-årig kvinde.",
            "Der var begyndende forrådnelse.",
            "Dødsårsagen er akut hjertesvigt.",
        ],
    );
    dir
}

fn pipeline() -> Pipeline {
    Pipeline::new(ExtractOptions::default()).unwrap()
}

#[test]
fn test_folder_to_records() {
    let dir = report_folder();
    let batch = pipeline().run_folder(dir.path(), &NoProgress).unwrap();

    assert_eq!(batch.processed, 3);
    assert!(batch.skipped.is_empty());
    assert_eq!(batch.registry.columns()[0], fields::FILE_NAME);

    let kept: Vec<&str> = batch.records.iter().filter_map(|r| r.file_name()).collect();
    assert_eq!(kept, ["b.docx", "c.docx"]);
    assert_eq!(batch.audit.len(), 2);
    assert!(batch.audit[0].omitted);

    let b = &batch.records[0];
    assert_eq!(b.get("hjerte"), Some(&FieldValue::Int(360)));
    assert_eq!(b.get(fields::AUTOPSY_DATE).unwrap().render(), "05-04-2010");
    assert_eq!(b.get("drukning"), Some(&FieldValue::Flag(true)));

    let c = &batch.records[1];
    assert_eq!(c.get(fields::AUT_NUMBER).unwrap().render(), "JOK 123/2011");
    assert_eq!(c.get(fields::SEX).unwrap().render(), "K");
    assert_eq!(c.get("hjertesvigt"), Some(&FieldValue::Flag(true)));
    assert_eq!(c.get(fields::PUTREFACTION_LEVEL).unwrap().render(), "DISCREET");
}

#[test]
fn test_rerun_is_byte_identical() {
    let dir = report_folder();
    let export = |parallel: bool| {
        let batch = pipeline()
            .with_options(PipelineOptions::new().with_parallel(parallel))
            .run_folder(dir.path(), &NoProgress)
            .unwrap();
        let mut csv = Vec::new();
        write_records_csv(&batch.records, &batch.registry, &mut csv, &CsvOptions::default())
            .unwrap();
        csv
    };

    let first = export(true);
    assert_eq!(first, export(true));
    assert_eq!(first, export(false));
}

#[test]
fn test_csv_outputs() {
    let dir = report_folder();
    let batch = pipeline().run_folder(dir.path(), &NoProgress).unwrap();

    let mut utf16 = Vec::new();
    write_records_csv(&batch.records, &batch.registry, &mut utf16, &CsvOptions::default())
        .unwrap();
    assert_eq!(&utf16[..2], &[0xFF, 0xFE]);

    let mut utf8 = Vec::new();
    let options = CsvOptions::new().with_encoding(CsvEncoding::Utf8);
    write_records_csv(&batch.records, &batch.registry, &mut utf8, &options).unwrap();
    let text = String::from_utf8(utf8).unwrap();
    let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("\"File Name\",\"CPR Number\",\"aut_number\""));

    let mut audit = Vec::new();
    write_audit_csv(&batch.audit, &mut audit, &CsvOptions::audit()).unwrap();
    assert_eq!(
        String::from_utf8(audit).unwrap(),
        "File Name,CPR Number,aut_number,Omitted\r\n\
         a.docx,010190-1234,J04.01.12.10,Yes\r\n\
         b.docx,010190-1234,J04.01.12.10,No\r\n"
    );
}

#[test]
fn test_json_keeps_registry_order() {
    let dir = report_folder();
    let batch = pipeline().run_folder(dir.path(), &NoProgress).unwrap();
    let json = to_json(&batch.records, &batch.registry, JsonFormat::Compact).unwrap();

    let positions: Vec<usize> = batch
        .registry
        .columns()
        .iter()
        .map(|name| json.find(&format!("\"{}\":", name)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_broken_file_is_skipped() {
    let dir = report_folder();
    fs::write(dir.path().join("broken.docx"), b"PK\x03\x04 truncated").unwrap();

    let batch = pipeline().run_folder(dir.path(), &NoProgress).unwrap();
    assert_eq!(batch.processed, 3);
    assert_eq!(batch.skipped.len(), 1);
    assert!(batch.skipped[0].path.ends_with("broken.docx"));
}

#[test]
fn test_folder_without_documents() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("readme.md"), "x").unwrap();
    let err = pipeline().run_folder(dir.path(), &NoProgress).unwrap_err();
    assert!(matches!(err, Error::NoDocuments(_)));
}
