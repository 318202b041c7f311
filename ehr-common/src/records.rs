//! Patient record operations on top of a [CellStoreClient].
//!
//! Every write goes through [flatten] and every read through [group] and
//! the [project] functions; this is the only place where the mapper meets
//! the store.
use std::collections::HashMap;

use serde_derive::Serialize;

use crate::db::client::{CellStoreClient, TableStatus};
use crate::db::row::Row;
use crate::db::RowKey;
use crate::errors::{EhrErrorKind, Result};
use crate::mapper::{
    flatten, group, group::filter_owned, project, GroupedCellSet, RowKeyStrategy, WriteContext,
};
use crate::models::{Fields, PatientRecord, PatientSummary};
use crate::sample::SamplePatient;
use crate::schema::{RecordKind, TABLES};

/// Outcome of creating one table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TableInitOutcome {
    Created { families: Vec<&'static str> },
    Exists { families: Vec<&'static str> },
    Error { error: String },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TableInit {
    pub table: &'static str,
    #[serde(flatten)]
    pub outcome: TableInitOutcome,
}

/// Outcome of loading one sample patient.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SampleLoadOutcome {
    Added,
    Error { error: String },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SampleLoad {
    pub patient_id: String,
    #[serde(flatten)]
    pub outcome: SampleLoadOutcome,
}

/// Reads and writes patient records.
#[derive(Clone)]
pub struct RecordService {
    store: Box<dyn CellStoreClient>,
    keys: RowKeyStrategy,
}

impl RecordService {
    pub fn new(store: Box<dyn CellStoreClient>, keys: RowKeyStrategy) -> Self {
        Self { store, keys }
    }

    /// Store (or overwrite) the demographics row of a patient.
    pub async fn add_patient(&self, patient_id: &str, demographics: &Fields) -> Result<()> {
        let record = flatten(
            RecordKind::Patient,
            demographics,
            patient_id,
            &WriteContext::now(self.keys),
        )?;
        debug!("👤 Writing patient {}", record);
        self.store
            .put_row(RecordKind::Patient.table(), &record.row_key, record.cells)
            .await?;
        info!("✅ Added patient: {}", patient_id);
        Ok(())
    }

    /// Summaries of every stored patient.
    pub async fn list_patients(&self) -> Result<Vec<PatientSummary>> {
        let rows = self.store.scan_table(RecordKind::Patient.table()).await?;
        Ok(rows
            .iter()
            .filter_map(|row| match row.row_key() {
                Ok(key) => Some(project::summary(&key, &group(&row.cells))),
                Err(e) => {
                    warn!("Skipping patient row with bad key {:?}: {}", row.key, e);
                    None
                }
            })
            .collect())
    }

    /// The complete record of one patient.
    ///
    /// The demographics row and the four sub-record tables are read
    /// concurrently. A failing sub-record read leaves that collection
    /// empty; a failing demographics read fails the call.
    pub async fn get_patient(&self, patient_id: &str) -> Result<PatientRecord> {
        debug!("🔍 Fetching complete record for patient: {}", patient_id);
        let (demographics, medical_history, prescriptions, lab_reports, visits) = futures::join!(
            self.store.get_row(RecordKind::Patient.table(), patient_id),
            self.owned(RecordKind::MedicalHistory, patient_id, project::condition),
            self.owned(RecordKind::Prescription, patient_id, project::prescription),
            self.owned(RecordKind::LabReport, patient_id, project::lab_report),
            self.owned(RecordKind::Visit, patient_id, project::visit),
        );
        let demographics = demographics?
            .map(|row| project::demographics(&group(&row.cells)))
            .unwrap_or_default();
        Ok(PatientRecord {
            patient_id: patient_id.to_owned(),
            demographics,
            medical_history,
            prescriptions,
            lab_reports,
            visits,
        })
    }

    /// Scan a sub-record table and project the rows owned by `owner`.
    async fn owned<T>(
        &self,
        kind: RecordKind,
        owner: &str,
        projection: fn(&GroupedCellSet) -> T,
    ) -> Vec<T> {
        match self.store.scan_table(kind.table()).await {
            Ok(rows) => filter_owned(&rows, kind.schema(), owner)
                .iter()
                .map(projection)
                .collect(),
            Err(e) => {
                warn!("Error fetching {} for {}: {}", kind, owner, e);
                vec![]
            }
        }
    }

    /// Append a sub-record for `owner`. Returns the generated row key.
    pub async fn add_sub_record(
        &self,
        kind: RecordKind,
        owner: &str,
        input: &Fields,
    ) -> Result<RowKey> {
        if !kind.schema().is_sub_record() {
            return Err(EhrErrorKind::GeneralError(format!("{kind} is not a sub-record")).into());
        }
        let record = flatten(kind, input, owner, &WriteContext::now(self.keys))?;
        debug!("📝 Writing {} {}", kind, record);
        self.store
            .put_row(kind.table(), &record.row_key, record.cells)
            .await?;
        Ok(record.row_key)
    }

    pub async fn add_condition(&self, owner: &str, input: &Fields) -> Result<RowKey> {
        self.add_sub_record(RecordKind::MedicalHistory, owner, input)
            .await
    }

    pub async fn add_prescription(&self, owner: &str, input: &Fields) -> Result<RowKey> {
        self.add_sub_record(RecordKind::Prescription, owner, input)
            .await
    }

    pub async fn add_lab_report(&self, owner: &str, input: &Fields) -> Result<RowKey> {
        self.add_sub_record(RecordKind::LabReport, owner, input).await
    }

    pub async fn add_visit(&self, owner: &str, input: &Fields) -> Result<RowKey> {
        self.add_sub_record(RecordKind::Visit, owner, input).await
    }

    /// Create every table. A failure is reported for that table only.
    pub async fn init_tables(&self) -> Vec<TableInit> {
        let mut results = Vec::with_capacity(TABLES.len());
        for table in TABLES {
            let families = table.families.to_vec();
            let outcome = match self.store.create_table(table).await {
                Ok(TableStatus::Created) => {
                    info!("✅ Created table: {}", table.name);
                    TableInitOutcome::Created { families }
                }
                Ok(TableStatus::Exists) => {
                    debug!("Table already exists: {}", table.name);
                    TableInitOutcome::Exists { families }
                }
                Err(e) => {
                    error!("❌ Failed to create table {}: {}", table.name, e);
                    TableInitOutcome::Error {
                        error: e.to_string(),
                    }
                }
            };
            results.push(TableInit {
                table: table.name,
                outcome,
            });
        }
        results
    }

    /// Write the built-in sample patients.
    pub async fn load_sample_data(&self, patients: &[SamplePatient]) -> Vec<SampleLoad> {
        let mut results = Vec::with_capacity(patients.len());
        for patient in patients {
            let outcome = match self
                .add_patient(&patient.patient_id, &patient.demographics)
                .await
            {
                Ok(()) => SampleLoadOutcome::Added,
                Err(e) => {
                    error!("❌ Failed to load patient {}: {}", patient.patient_id, e.message());
                    SampleLoadOutcome::Error { error: e.message() }
                }
            };
            results.push(SampleLoad {
                patient_id: patient.patient_id.clone(),
                outcome,
            });
        }
        results
    }

    /// Connectivity check against the store.
    pub async fn cluster_version(&self) -> Result<serde_json::Value> {
        Ok(self.store.cluster_version().await?)
    }

    /// Every stored patient with all sub-records, reading each table once.
    ///
    /// Sub-records whose owner has no demographics row are left out.
    pub async fn all_records(&self) -> Result<Vec<PatientRecord>> {
        let (patients, history, prescriptions, labs, visits) = futures::try_join!(
            self.store.scan_table(RecordKind::Patient.table()),
            self.store.scan_table(RecordKind::MedicalHistory.table()),
            self.store.scan_table(RecordKind::Prescription.table()),
            self.store.scan_table(RecordKind::LabReport.table()),
            self.store.scan_table(RecordKind::Visit.table()),
        )?;

        let mut history = by_owner(&history, RecordKind::MedicalHistory, project::condition);
        let mut prescriptions =
            by_owner(&prescriptions, RecordKind::Prescription, project::prescription);
        let mut labs = by_owner(&labs, RecordKind::LabReport, project::lab_report);
        let mut visits = by_owner(&visits, RecordKind::Visit, project::visit);

        Ok(patients
            .iter()
            .filter_map(|row| {
                let patient_id = row.row_key().ok()?;
                Some(PatientRecord {
                    demographics: project::demographics(&group(&row.cells)),
                    medical_history: history.remove(&patient_id).unwrap_or_default(),
                    prescriptions: prescriptions.remove(&patient_id).unwrap_or_default(),
                    lab_reports: labs.remove(&patient_id).unwrap_or_default(),
                    visits: visits.remove(&patient_id).unwrap_or_default(),
                    patient_id,
                })
            })
            .collect())
    }
}

/// Bucket the rows of a sub-record table by their owner cell.
fn by_owner<T>(
    rows: &[Row],
    kind: RecordKind,
    projection: fn(&GroupedCellSet) -> T,
) -> HashMap<String, Vec<T>> {
    let schema = kind.schema();
    let mut owned: HashMap<String, Vec<T>> = HashMap::new();
    for row in rows {
        let grouped = group(&row.cells);
        if let Some(owner) = grouped.owner(schema) {
            owned
                .entry(owner.to_owned())
                .or_default()
                .push(projection(&grouped));
        }
    }
    owned
}
