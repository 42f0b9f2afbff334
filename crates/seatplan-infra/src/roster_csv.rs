//! Roster loader for student CSV exports
//!
//! Accepts UTF-8 (with or without BOM) and falls back to Windows-1250, the
//! code page older Polish spreadsheet exports use. Both `,` and `;` separated
//! files are read.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1250;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use seatplan_domain::model::{GeoPoint, Student, WeekdayPickups};

use crate::text::{fold_accents, header_key};

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

/// Header names of the roster columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterColumns {
    pub id: String,
    pub name: String,
    pub address: String,
    pub monday: String,
    pub tuesday: String,
    pub wednesday: String,
    pub thursday: String,
    pub friday: String,
    /// Optional coordinate columns, used by the greedy assigner
    #[serde(default = "default_latitude")]
    pub latitude: String,
    #[serde(default = "default_longitude")]
    pub longitude: String,
}

fn default_latitude() -> String {
    "Lat".to_string()
}

fn default_longitude() -> String {
    "Lon".to_string()
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            id: "Nr".to_string(),
            name: "Uczeń".to_string(),
            address: "Adres".to_string(),
            monday: "Poniedziałek-odbiór".to_string(),
            tuesday: "Wtorek-odbiór".to_string(),
            wednesday: "Środa-odbiór".to_string(),
            thursday: "Czwartek-odbiór".to_string(),
            friday: "Piątek-odbiór".to_string(),
            latitude: default_latitude(),
            longitude: default_longitude(),
        }
    }
}

/// Loader settings
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub columns: RosterColumns,
    pub strip_accents: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            columns: RosterColumns::default(),
            strip_accents: true,
        }
    }
}

/// A problem with one file or one row that did not stop the load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub file: PathBuf,
    /// 1-based line number including the header; `None` for whole-file issues
    pub row: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.row {
            Some(row) => write!(f, "{} row {}: {}", self.file.display(), row, self.message),
            None => write!(f, "{}: {}", self.file.display(), self.message),
        }
    }
}

/// Combined roster of all files plus everything that was skipped
#[derive(Debug, Clone, Default)]
pub struct RosterLoad {
    pub students: Vec<Student>,
    pub issues: Vec<RowIssue>,
}

/// Column positions resolved from a header row
struct ColumnMap {
    id: usize,
    name: usize,
    address: usize,
    days: [usize; 5],
    coords: Option<(usize, usize)>,
}

/// Load every file in order; file `i` prefixes its ids with `i_`.
///
/// Files that cannot be read or lack a required column are reported and
/// skipped; the remaining files still load.
pub fn load_roster(paths: &[PathBuf], options: &LoadOptions) -> RosterLoad {
    let mut load = RosterLoad::default();

    for (file_index, path) in paths.iter().enumerate() {
        match load_roster_file(path, file_index, options) {
            Ok((students, issues)) => {
                tracing::info!(
                    file = %path.display(),
                    file_index,
                    students = students.len(),
                    skipped_rows = issues.len(),
                    "roster file loaded"
                );
                load.students.extend(students);
                load.issues.extend(issues);
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "roster file skipped");
                load.issues.push(RowIssue {
                    file: path.clone(),
                    row: None,
                    message: e.to_string(),
                });
            }
        }
    }

    load
}

/// Load a single roster file
pub fn load_roster_file(
    path: &Path,
    file_index: usize,
    options: &LoadOptions,
) -> Result<(Vec<Student>, Vec<RowIssue>), RosterError> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content = decode(bytes);
    parse_roster(&content, path, file_index, options)
}

fn decode(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            let (decoded, _, had_errors) = WINDOWS_1250.decode(e.as_bytes());
            if had_errors {
                tracing::warn!("some characters could not be decoded from Windows-1250");
            }
            decoded.into_owned()
        }
    };
    text.trim_start_matches('\u{feff}').to_string()
}

fn sniff_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");
    if first_line.matches(';').count() > first_line.matches(',').count() {
        b';'
    } else {
        b','
    }
}

/// Parse roster CSV text
pub fn parse_roster(
    content: &str,
    path: &Path,
    file_index: usize,
    options: &LoadOptions,
) -> Result<(Vec<Student>, Vec<RowIssue>), RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(sniff_delimiter(content))
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = resolve_columns(&headers, &options.columns)?;

    let mut students = Vec::new();
    let mut issues = Vec::new();
    // scoped id -> row it was first seen on
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (row_idx, result) in reader.records().enumerate() {
        let row_num = row_idx + 2; // header is row 1
        let issue = |message: String| RowIssue {
            file: path.to_path_buf(),
            row: Some(row_num),
            message,
        };

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                issues.push(issue(e.to_string()));
                continue;
            }
        };

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        match parse_record(&record, &columns, file_index, options) {
            Ok(student) => {
                if let Some(first_row) = seen.get(&student.id) {
                    let native = student
                        .id
                        .split_once('_')
                        .map_or(student.id.as_str(), |(_, native)| native);
                    issues.push(issue(format!(
                        "duplicate id '{}' (first seen on row {})",
                        native, first_row
                    )));
                    continue;
                }
                seen.insert(student.id.clone(), row_num);
                students.push(student);
            }
            Err(message) => issues.push(issue(message)),
        }
    }

    Ok((students, issues))
}

fn resolve_columns(headers: &csv::StringRecord, names: &RosterColumns) -> Result<ColumnMap, RosterError> {
    let keys: Vec<String> = headers.iter().map(header_key).collect();
    let find = |name: &str| keys.iter().position(|k| *k == header_key(name));
    let require = |name: &str| find(name).ok_or_else(|| RosterError::MissingColumn(name.to_string()));

    let coords = match (find(&names.latitude), find(&names.longitude)) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        _ => None,
    };

    Ok(ColumnMap {
        id: require(&names.id)?,
        name: require(&names.name)?,
        address: require(&names.address)?,
        days: [
            require(&names.monday)?,
            require(&names.tuesday)?,
            require(&names.wednesday)?,
            require(&names.thursday)?,
            require(&names.friday)?,
        ],
        coords,
    })
}

fn parse_record(
    record: &csv::StringRecord,
    columns: &ColumnMap,
    file_index: usize,
    options: &LoadOptions,
) -> Result<Student, String> {
    let text = |idx: usize| {
        let raw = record.get(idx).unwrap_or("");
        if options.strip_accents {
            fold_accents(raw)
        } else {
            raw.to_string()
        }
    };

    let native_id = normalize_id(record.get(columns.id).unwrap_or(""));
    if native_id.is_empty() {
        return Err(format!("empty '{}' value", options.columns.id));
    }
    let name = text(columns.name);
    if name.is_empty() {
        return Err(format!("empty '{}' value", options.columns.name));
    }

    let pickup = WeekdayPickups {
        monday: text(columns.days[0]),
        tuesday: text(columns.days[1]),
        wednesday: text(columns.days[2]),
        thursday: text(columns.days[3]),
        friday: text(columns.days[4]),
    };

    let mut student = Student::new(file_index, &native_id, &name, &text(columns.address)).with_pickup(pickup);

    if let Some((lat_idx, lon_idx)) = columns.coords {
        let lat = record.get(lat_idx).unwrap_or("");
        let lon = record.get(lon_idx).unwrap_or("");
        if !lat.is_empty() || !lon.is_empty() {
            student = student.with_location(parse_point(lat, lon)?);
        }
    }

    Ok(student)
}

/// Spreadsheet exports turn integer ids into "5.0"
fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_suffix(".0")
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(trimmed)
        .to_string()
}

fn parse_point(lat: &str, lon: &str) -> Result<GeoPoint, String> {
    let parse = |s: &str| s.trim().replace(',', ".").parse::<f64>();
    match (parse(lat), parse(lon)) {
        (Ok(lat), Ok(lon)) => {
            let point = GeoPoint::new(lat, lon);
            if point.is_valid() {
                Ok(point)
            } else {
                Err(format!("coordinates out of range: {}, {}", lat, lon))
            }
        }
        _ => Err(format!("invalid coordinates: '{}', '{}'", lat, lon)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const HEADER: &str = "Nr,Uczeń,Adres,Poniedziałek-odbiór,Wtorek-odbiór,Środa-odbiór,Czwartek-odbiór,Piątek-odbiór";

    fn parse(content: &str) -> (Vec<Student>, Vec<RowIssue>) {
        parse_roster(content, Path::new("roster.csv"), 0, &LoadOptions::default()).unwrap()
    }

    #[test]
    fn test_parse_roster_strips_accents() {
        let content = format!(
            "{}\n5,Zofia Wójcik,\"ul. Żółta 3, Łódź\",14:30,15:00,14:30,13:45,12:00\n",
            HEADER
        );
        let (students, issues) = parse(&content);
        assert!(issues.is_empty());
        assert_eq!(students.len(), 1);
        let s = &students[0];
        assert_eq!(s.id, "0_5");
        assert_eq!(s.name, "Zofia Wojcik");
        assert_eq!(s.address, "ul. Zolta 3, Lodz");
        assert_eq!(s.pickup.thursday, "13:45");
        assert!(s.location.is_none());
    }

    #[test]
    fn test_parse_roster_keeps_accents_when_disabled() {
        let content = format!("{}\n1,Zofia Wójcik,Łódź,,,,,\n", HEADER);
        let options = LoadOptions {
            strip_accents: false,
            ..Default::default()
        };
        let (students, _) = parse_roster(&content, Path::new("r.csv"), 0, &options).unwrap();
        assert_eq!(students[0].name, "Zofia Wójcik");
    }

    #[test]
    fn test_headers_are_trimmed_and_accent_insensitive() {
        let content = " Nr ; Uczen ;Adres;Poniedzialek-odbior;Wtorek-odbior;Sroda-odbior;Czwartek-odbior;Piatek-odbior\n\
                       7;Jan;Polna 1;1;2;3;4;5\n";
        let (students, issues) = parse(content);
        assert!(issues.is_empty(), "{:?}", issues);
        assert_eq!(students[0].id, "0_7");
        assert_eq!(students[0].pickup.friday, "5");
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let content = "Nr,Uczeń,Adres\n1,Jan,Polna 1\n";
        let err = parse_roster(content, Path::new("r.csv"), 0, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, RosterError::MissingColumn(ref c) if c == "Poniedziałek-odbiór"));
    }

    #[test]
    fn test_bad_rows_are_reported_not_fatal() {
        let content = format!(
            "{},Lat,Lon\n1,Jan,Polna 1,,,,,,50.06,19.94\n,NoId,Polna 2,,,,,,,\n3,,Polna 3,,,,,,,\n4,Ola,Polna 4,,,,,,abc,19.9\n5,Ewa,Polna 5,,,,,,,\n",
            HEADER
        );
        let (students, issues) = parse(&content);
        let ids: Vec<&str> = students.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["0_1", "0_5"]);
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].row, Some(3));
        assert_eq!(issues[2].row, Some(5));
        assert!(issues[2].message.contains("invalid coordinates"));
        let loc = students[0].location.unwrap();
        assert!((loc.lat - 50.06).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_ids_in_one_file_are_reported() {
        let content = format!(
            "{}\n5,Jan,Polna 1,,,,,\n5.0,Ola,Polna 2,,,,,\n6,Ewa,Polna 3,,,,,\n",
            HEADER
        );
        let (students, issues) = parse(&content);
        let names: Vec<&str> = students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Jan", "Ewa"]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row, Some(3));
        assert_eq!(issues[0].message, "duplicate id '5' (first seen on row 2)");
    }

    #[test]
    fn test_blank_rows_are_ignored() {
        let content = format!("{}\n1,Jan,Polna 1,,,,,\n,,,,,,,\n", HEADER);
        let (students, issues) = parse(&content);
        assert_eq!(students.len(), 1);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("5.0"), "5");
        assert_eq!(normalize_id(" 12 "), "12");
        assert_eq!(normalize_id("A.0"), "A.0");
        assert_eq!(normalize_id("7"), "7");
    }

    #[test]
    fn test_load_roster_prefixes_ids_per_file() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.csv");
        let second = dir.path().join("b.csv");
        std::fs::write(&first, format!("{}\n5,Jan,Polna 1,,,,,\n", HEADER)).unwrap();
        std::fs::write(&second, format!("{}\n5,Ola,Polna 2,,,,,\n", HEADER)).unwrap();

        let load = load_roster(&[first, second], &LoadOptions::default());
        let ids: Vec<&str> = load.students.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["0_5", "1_5"]);
        assert_eq!(load.students[1].source_index, 1);
        assert!(load.issues.is_empty());
    }

    #[test]
    fn test_load_roster_skips_bad_file_and_continues() {
        let dir = tempdir().unwrap();
        let broken = dir.path().join("broken.csv");
        let good = dir.path().join("good.csv");
        std::fs::write(&broken, "Nr,Name\n1,Jan\n").unwrap();
        std::fs::write(&good, format!("{}\n2,Ola,Polna 2,,,,,\n", HEADER)).unwrap();
        let missing = dir.path().join("missing.csv");

        let load = load_roster(&[broken.clone(), good, missing], &LoadOptions::default());
        assert_eq!(load.students.len(), 1);
        assert_eq!(load.students[0].id, "1_2");
        assert_eq!(load.issues.len(), 2);
        assert_eq!(load.issues[0].file, broken);
        assert_eq!(load.issues[0].row, None);
    }

    #[test]
    fn test_windows_1250_file_is_decoded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cp1250.csv");
        let text = format!("{}\n1,Łucja,Żurawia 1,,,,,\n", HEADER);
        let (bytes, _, _) = WINDOWS_1250.encode(&text);
        let mut file = File::create(&path).unwrap();
        file.write_all(&bytes).unwrap();

        let (students, issues) = load_roster_file(&path, 0, &LoadOptions::default()).unwrap();
        assert!(issues.is_empty());
        assert_eq!(students[0].name, "Lucja");
        assert_eq!(students[0].address, "Zurawia 1");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let content = format!("\u{feff}{}\n1,Jan,Polna 1,,,,,\n", HEADER);
        assert_eq!(decode(content.into_bytes()).chars().next(), Some('N'));
    }
}
