//! Patient and doctor tables.
//!
//! Both tables are read once at startup from CSV files and then shared
//! read-only for the lifetime of the process. The doctor table is also
//! pre-rendered as a markdown table, which is the form the report prompt
//! lists doctors in.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("{0} not found")]
    FileNotFound(String),

    #[error("Failed to read {table}: {source}")]
    Csv {
        table: &'static str,
        source: csv::Error,
    },

    #[error("{table} is missing a {column} column")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("Duplicate patient name '{0}'")]
    DuplicatePatient(String),

    #[error("{0} contains no rows")]
    Empty(&'static str),
}

/// One row of the patient table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(rename = "patient_name")]
    pub name: String,
    #[serde(default)]
    pub medical_history: String,
}

/// One row of the doctor table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Doctor {
    pub name: String,
    pub specialty: String,
}

/// Read-only patient and doctor data.
#[derive(Debug, Clone)]
pub struct Directory {
    patients: Vec<Patient>,
    doctors: Vec<Doctor>,
    doctor_table: String,
}

impl Directory {
    /// Load both tables from CSV files.
    pub fn load(patients_path: &Path, doctors_path: &Path) -> Result<Self, DirectoryError> {
        let patients = open(patients_path)?;
        let doctors = open(doctors_path)?;
        Self::from_readers(patients, doctors)
    }

    /// Build from any CSV sources (files, in-memory fixtures).
    pub fn from_readers<P: Read, D: Read>(patients: P, doctors: D) -> Result<Self, DirectoryError> {
        let patients = read_patients(patients)?;
        let (doctors, doctor_table) = read_doctors(doctors)?;

        tracing::info!(
            patients = patients.len(),
            doctors = doctors.len(),
            "Directory loaded"
        );

        Ok(Self {
            patients,
            doctors,
            doctor_table,
        })
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// The patient the form shows before anything is selected: the first row.
    pub fn default_patient(&self) -> Option<&Patient> {
        self.patients.first()
    }

    /// Look up a patient by exact name.
    pub fn patient(&self, name: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.name == name)
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    /// Every doctor column, rendered as a markdown table.
    pub fn doctors_markdown(&self) -> &str {
        &self.doctor_table
    }
}

fn open(path: &Path) -> Result<std::fs::File, DirectoryError> {
    std::fs::File::open(path).map_err(|_| DirectoryError::FileNotFound(path.display().to_string()))
}

fn read_patients<R: Read>(source: R) -> Result<Vec<Patient>, DirectoryError> {
    const TABLE: &str = "patient table";

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(source);
    let headers = reader
        .headers()
        .map_err(|source| DirectoryError::Csv { table: TABLE, source })?
        .clone();
    if !headers.iter().any(|h| h == "patient_name") {
        return Err(DirectoryError::MissingColumn {
            table: TABLE,
            column: "patient_name",
        });
    }

    let mut patients: Vec<Patient> = Vec::new();
    for row in reader.deserialize::<Patient>() {
        let patient = row.map_err(|source| DirectoryError::Csv { table: TABLE, source })?;
        if patients.iter().any(|p| p.name == patient.name) {
            return Err(DirectoryError::DuplicatePatient(patient.name));
        }
        patients.push(patient);
    }

    if patients.is_empty() {
        return Err(DirectoryError::Empty(TABLE));
    }
    Ok(patients)
}

fn read_doctors<R: Read>(source: R) -> Result<(Vec<Doctor>, String), DirectoryError> {
    const TABLE: &str = "doctor table";

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(source);
    let headers = reader
        .headers()
        .map_err(|source| DirectoryError::Csv { table: TABLE, source })?
        .clone();

    let name_col = find_column(&headers, &["name"]).ok_or(DirectoryError::MissingColumn {
        table: TABLE,
        column: "name",
    })?;
    let specialty_col = find_column(&headers, &["special", "department", "dept"]).ok_or(
        DirectoryError::MissingColumn {
            table: TABLE,
            column: "specialty",
        },
    )?;

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record.map_err(|source| DirectoryError::Csv { table: TABLE, source })?);
    }
    if rows.is_empty() {
        return Err(DirectoryError::Empty(TABLE));
    }

    let doctors = rows
        .iter()
        .map(|r| Doctor {
            name: r.get(name_col).unwrap_or_default().to_string(),
            specialty: r.get(specialty_col).unwrap_or_default().to_string(),
        })
        .collect();

    let header: Vec<&str> = headers.iter().collect();
    let body: Vec<Vec<&str>> = rows.iter().map(|r| r.iter().collect()).collect();
    Ok((doctors, markdown_table(&header, &body)))
}

/// Index of the first header containing any of `needles` (case-insensitive).
fn find_column(headers: &csv::StringRecord, needles: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.to_lowercase();
        needles.iter().any(|n| h.contains(n))
    })
}

/// Render a pipe table with left-aligned columns.
pub fn markdown_table(header: &[&str], rows: &[Vec<&str>]) -> String {
    let cols = header.len();
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().take(cols).enumerate() {
            widths[i] = widths[i].max(escape_cell(cell).chars().count());
        }
    }

    let line = |cells: Vec<String>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c:<width$}", width = widths[i]))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(header.iter().map(|h| escape_cell(h)).collect()));
    let separator: Vec<String> = widths.iter().map(|w| format!(":{}", "-".repeat(w + 1))).collect();
    out.push(format!("|{}|", separator.join("|")));
    for row in rows {
        out.push(line(
            (0..cols)
                .map(|i| escape_cell(row.get(i).copied().unwrap_or_default()))
                .collect(),
        ));
    }
    out.join("\n")
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const PATIENTS_CSV: &str = "\
patient_name,medical_history
Aisha Khan,\"Type 2 diabetes, controlled with metformin\"
Liam O'Connor,
Maria Rossi,History of migraines
";

    pub(crate) const DOCTORS_CSV: &str = "\
doctor_name,specialty
Dr. Kenji Tanaka,General Practitioner
Dr. Sofia Alvarez,Cardiology
Dr. Priya Nair,Neurology
";

    pub(crate) fn sample_directory() -> Directory {
        Directory::from_readers(PATIENTS_CSV.as_bytes(), DOCTORS_CSV.as_bytes()).unwrap()
    }

    #[test]
    fn loads_patients_in_file_order() {
        let dir = sample_directory();
        let names: Vec<&str> = dir.patients().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Aisha Khan", "Liam O'Connor", "Maria Rossi"]);
    }

    #[test]
    fn empty_history_is_allowed() {
        let dir = sample_directory();
        assert_eq!(dir.patient("Liam O'Connor").unwrap().medical_history, "");
    }

    #[test]
    fn lookup_is_exact() {
        let dir = sample_directory();
        assert!(dir.patient("Maria Rossi").is_some());
        assert!(dir.patient("maria rossi").is_none());
        assert!(dir.patient("Nobody").is_none());
    }

    #[test]
    fn default_patient_is_first_row() {
        let dir = sample_directory();
        assert_eq!(dir.default_patient().unwrap().name, "Aisha Khan");
    }

    #[test]
    fn doctor_columns_detected_by_header() {
        let dir = sample_directory();
        assert_eq!(dir.doctors().len(), 3);
        assert_eq!(dir.doctors()[1].name, "Dr. Sofia Alvarez");
        assert_eq!(dir.doctors()[1].specialty, "Cardiology");
    }

    #[test]
    fn department_header_accepted_as_specialty() {
        let doctors = "name,department,room\nDr. A,Emergency,12\n";
        let dir = Directory::from_readers(PATIENTS_CSV.as_bytes(), doctors.as_bytes()).unwrap();
        assert_eq!(dir.doctors()[0].specialty, "Emergency");
        assert!(dir.doctors_markdown().contains("room"));
    }

    #[test]
    fn doctor_markdown_lists_every_doctor() {
        let dir = sample_directory();
        let table = dir.doctors_markdown();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("| doctor_name"));
        assert!(lines[1].starts_with("|:-"));
        assert!(table.contains("| Dr. Kenji Tanaka "));
        assert!(table.contains("General Practitioner"));
    }

    #[test]
    fn markdown_cells_escape_pipes() {
        let table = markdown_table(&["a"], &[vec!["x|y"]]);
        assert!(table.contains("x\\|y"));
    }

    #[test]
    fn missing_patient_column_rejected() {
        let result = Directory::from_readers("name,history\nA,B\n".as_bytes(), DOCTORS_CSV.as_bytes());
        assert!(matches!(
            result,
            Err(DirectoryError::MissingColumn { column: "patient_name", .. })
        ));
    }

    #[test]
    fn missing_specialty_column_rejected() {
        let result = Directory::from_readers(PATIENTS_CSV.as_bytes(), "name,room\nA,1\n".as_bytes());
        assert!(matches!(
            result,
            Err(DirectoryError::MissingColumn { column: "specialty", .. })
        ));
    }

    #[test]
    fn duplicate_patient_rejected() {
        let patients = "patient_name,medical_history\nA,x\nA,y\n";
        let result = Directory::from_readers(patients.as_bytes(), DOCTORS_CSV.as_bytes());
        assert!(matches!(result, Err(DirectoryError::DuplicatePatient(name)) if name == "A"));
    }

    #[test]
    fn empty_doctor_table_rejected() {
        let result = Directory::from_readers(PATIENTS_CSV.as_bytes(), "name,specialty\n".as_bytes());
        assert!(matches!(result, Err(DirectoryError::Empty("doctor table"))));
    }

    #[test]
    fn missing_file_reported_by_path() {
        let tmp = tempfile::tempdir().unwrap();
        let result = Directory::load(&tmp.path().join("patients.csv"), &tmp.path().join("doctors.csv"));
        match result {
            Err(DirectoryError::FileNotFound(path)) => assert!(path.ends_with("patients.csv")),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn load_reads_files_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let patients = tmp.path().join("patients.csv");
        let doctors = tmp.path().join("doctors.csv");
        std::fs::write(&patients, PATIENTS_CSV).unwrap();
        std::fs::write(&doctors, DOCTORS_CSV).unwrap();

        let dir = Directory::load(&patients, &doctors).unwrap();
        assert_eq!(dir.patients().len(), 3);
    }
}
