//! End-to-end transform pipeline: CSV in, site artifact out.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use eduscrape::emit::{ArtifactFormat, read_rows_from_path, transform_rows};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("eduscrape_it_{}", name))
}

#[test]
fn csv_to_js_array() {
    let input = temp_path("table.csv");
    let output = temp_path("programs.js");
    fs::write(
        &input,
        "program_name,url,budget_seats,education_level,institution_name,region\n\
         Физика,http://x.ru,15 мест,Высшее,Новосибирский государственный университет,Новосибирск\n\
         Сестринское дело,http://y.ru,Есть бюджетные места,СПО,Медицинский колледж,\n",
    )
    .unwrap();

    let rows = read_rows_from_path(&input).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
    let written = transform_rows(&rows, ArtifactFormat::Js, &output, date).unwrap();
    assert_eq!(written, Some(2));

    let js = fs::read_to_string(&output).unwrap();
    assert!(js.starts_with("// Сгенерировано автоматически 01.09.2024"));
    assert!(js.contains("\"title\":\"Физика\""));
    assert!(js.contains("\"places\":15"));
    assert!(js.contains("\"level\":\"VO\""));
    // Affirmative budget phrase maps to the sentinel seat count.
    assert!(js.contains("\"places\":1"));
    assert!(js.contains("\"level\":\"SPO\""));
    assert!(js.contains("\"level_readable\":\"Колледж\""));
    // Region left blank falls back to the country-level placeholder.
    assert!(js.contains("\"district\":\"Россия\""));

    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();
}

#[test]
fn rows_missing_required_fields_are_skipped() {
    let input = temp_path("partial.csv");
    let output = temp_path("partial.html");
    fs::write(
        &input,
        "program_name,url\n\
         Физика,http://x.ru\n\
         Без ссылки,\n\
         ,http://orphan.ru\n",
    )
    .unwrap();

    let rows = read_rows_from_path(&input).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
    let written = transform_rows(&rows, ArtifactFormat::Html, &output, date).unwrap();

    // Exactly the two incomplete rows are dropped, the run continues.
    assert_eq!(written, Some(1));
    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("Физика"));
    assert!(!html.contains("Без ссылки"));
    assert!(!html.contains("orphan"));

    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();
}

#[test]
fn empty_input_writes_no_artifact() {
    let input = temp_path("empty.csv");
    let output = temp_path("empty.js");
    fs::remove_file(&output).ok();
    fs::write(&input, "program_name,url\n,\n").unwrap();

    let rows = read_rows_from_path(&input).unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
    let written = transform_rows(&rows, ArtifactFormat::Js, &output, date).unwrap();

    assert_eq!(written, None);
    assert!(!output.exists());

    fs::remove_file(&input).ok();
}
