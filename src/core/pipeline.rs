use crate::core::evaluator::evaluate;
use crate::core::form::measurement_from_raw;
use crate::core::stats::body_mass_statistics;
use crate::core::targets::bmi_out_of_target;
use crate::domain::model::{
    format2, BatchResult, EvaluatedRecord, MeasurementRecord, MeasurementSource,
    PopulationRecord, Sex,
};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{RegistryError, Result};
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const CSV_FILENAME: &str = "measurements.csv";
pub const TSV_FILENAME: &str = "measurements.tsv";
pub const JSON_FILENAME: &str = "measurements.json";
pub const STATS_FILENAME: &str = "stats.json";
pub const ARCHIVE_FILENAME: &str = "bmi_output.zip";

const OUTPUT_HEADER: [&str; 7] = [
    "id",
    "weight",
    "heightFeet",
    "heightInches",
    "bmi",
    "weightreduction",
    "outOfTarget",
];

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    evaluated: usize,
    skipped: usize,
    records: &'a [EvaluatedRecord],
}

/// Evaluates every row of a measurement export and writes the results.
pub struct BatchPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> BatchPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let mut builder = Client::builder();
        if let Some(seconds) = config.request_timeout_seconds() {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        // builder 只在 TLS 後端初始化失敗時出錯，退回預設 client
        let client = builder.build().unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            Client::new()
        });

        Self {
            storage,
            config,
            client,
        }
    }

    async fn extract_csv(&self, path: &str) -> Result<Vec<MeasurementRecord>> {
        tracing::debug!("Reading measurements from: {}", path);
        let data = tokio::fs::read(path).await?;
        parse_measurement_csv(&data)
    }

    async fn extract_api(&self, endpoint: &str) -> Result<Vec<MeasurementRecord>> {
        tracing::debug!("Making API request to: {}", endpoint);
        let response = self.client.get(endpoint).send().await?;
        tracing::debug!("API response status: {}", response.status());

        let json_data: serde_json::Value = response.error_for_status()?.json().await?;
        records_from_json(json_data)
    }
}

/// Parses a measurement CSV with a header row. Unknown columns are ignored.
///
/// Rows are read leniently: short rows leave the missing columns empty, an
/// unreadable `classesAttended` is dropped, and rows without an `id` are
/// numbered by position. Whether a row can be evaluated is decided later in
/// `transform`.
pub fn parse_measurement_csv(data: &[u8]) -> Result<Vec<MeasurementRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);
    let id_col = position("id");
    let weight_col = position("weight");
    let feet_col = position("heightFeet");
    let inches_col = position("heightInches");
    let sex_col = position("sex");
    let classes_col = position("classesAttended");

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        if row.len() != headers.len() {
            tracing::debug!(
                "Row {} has {} of {} columns",
                index + 1,
                row.len(),
                headers.len()
            );
        }

        let id = column(&row, id_col);
        let sex = column(&row, sex_col);
        records.push(MeasurementRecord {
            id: if id.is_empty() {
                (index + 1).to_string()
            } else {
                id.to_string()
            },
            weight: column(&row, weight_col).to_string(),
            height_feet: column(&row, feet_col).to_string(),
            height_inches: column(&row, inches_col).to_string(),
            sex: (!sex.is_empty()).then(|| sex.to_string()),
            classes_attended: classes_attended(column(&row, classes_col)),
        });
    }
    Ok(records)
}

fn column(row: &csv::StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| row.get(i)).unwrap_or("")
}

// 上課次數讀不懂就當作沒填，不影響 BMI 評估
fn classes_attended(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

// JSON 數值與字串都接受，統一轉成字串交給表單解析
fn json_field(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Converts a JSON array of measurement objects. Rows without an `id` are
/// numbered by position.
pub fn records_from_json(json_data: serde_json::Value) -> Result<Vec<MeasurementRecord>> {
    let items = match json_data {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(RegistryError::ProcessingError {
                message: format!("expected a JSON array of measurements, got {}", other),
            })
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let serde_json::Value::Object(obj) = item else {
            tracing::warn!("Skipping non-object measurement at position {}", index);
            continue;
        };

        let id = json_field(obj.get("id"));
        records.push(MeasurementRecord {
            id: if id.is_empty() {
                (index + 1).to_string()
            } else {
                id
            },
            weight: json_field(obj.get("weight")),
            height_feet: json_field(obj.get("heightFeet")),
            height_inches: json_field(obj.get("heightInches")),
            sex: obj.get("sex").and_then(|v| v.as_str()).map(str::to_string),
            classes_attended: classes_attended(&json_field(obj.get("classesAttended"))),
        });
    }
    Ok(records)
}

fn output_rows(evaluated: &[EvaluatedRecord]) -> Vec<[String; 7]> {
    evaluated
        .iter()
        .map(|row| {
            let (bmi, goal) = match &row.evaluation {
                Some(e) => (e.bmi.to_string(), e.reduction_goal.to_string()),
                None => (String::new(), String::new()),
            };
            [
                row.record.id.clone(),
                row.record.weight.clone(),
                row.record.height_feet.clone(),
                row.record.height_inches.clone(),
                bmi,
                goal,
                row.bmi_out_of_target.to_string(),
            ]
        })
        .collect()
}

fn delimited(rows: &[[String; 7]], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(OUTPUT_HEADER)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| RegistryError::ProcessingError {
            message: format!("failed to flush output: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| RegistryError::ProcessingError {
        message: format!("output is not valid UTF-8: {}", e),
    })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BatchPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<MeasurementRecord>> {
        let mut records = match self.config.source() {
            MeasurementSource::Csv { path } => self.extract_csv(&path).await?,
            MeasurementSource::Api { endpoint } => self.extract_api(&endpoint).await?,
        };

        if let Some(max) = self.config.max_records() {
            if records.len() > max {
                tracing::info!("Limiting extraction to {} of {} records", max, records.len());
                records.truncate(max);
            }
        }

        Ok(records)
    }

    async fn transform(&self, data: Vec<MeasurementRecord>) -> Result<BatchResult> {
        let target = self.config.bmi_target();
        let mut evaluated = Vec::with_capacity(data.len());
        let mut population = Vec::new();
        let mut skipped = 0;

        for record in data {
            let input =
                measurement_from_raw(&record.weight, &record.height_feet, &record.height_inches);
            let evaluation = evaluate(&input);

            match (&evaluation, record.sex.as_deref().and_then(Sex::parse)) {
                (Some(e), Some(sex)) => population.push(PopulationRecord {
                    sex,
                    last_bmi: e.bmi.bmi,
                    classes_attended: record.classes_attended.unwrap_or(0),
                }),
                (None, _) => {
                    tracing::debug!("Row {} lacks weight or height, not evaluated", record.id);
                    skipped += 1;
                }
                _ => {}
            }

            evaluated.push(EvaluatedRecord {
                bmi_out_of_target: bmi_out_of_target(&target, evaluation.as_ref()),
                record,
                evaluation,
            });
        }

        let rows = output_rows(&evaluated);
        let csv_output = delimited(&rows, b',')?;
        let tsv_output = delimited(&rows, b'\t')?;
        let json_output = serde_json::to_string_pretty(&JsonReport {
            generated_at: Utc::now().to_rfc3339(),
            evaluated: evaluated.len() - skipped,
            skipped,
            records: &evaluated,
        })?;

        let stats = (!population.is_empty()).then(|| body_mass_statistics(&population));
        if let Some([male, female]) = &stats {
            tracing::info!(
                "Population BMI average - male: {}, female: {}",
                male.average.map(format2).unwrap_or_else(|| "-".to_string()),
                female.average.map(format2).unwrap_or_else(|| "-".to_string())
            );
        }

        Ok(BatchResult {
            evaluated,
            skipped,
            csv_output,
            tsv_output,
            json_output,
            stats,
        })
    }

    async fn load(&self, result: BatchResult) -> Result<String> {
        let mut files: Vec<(&str, Vec<u8>)> = Vec::new();
        for format in self.config.output_formats() {
            match format.as_str() {
                "csv" => files.push((CSV_FILENAME, result.csv_output.clone().into_bytes())),
                "tsv" => files.push((TSV_FILENAME, result.tsv_output.clone().into_bytes())),
                "json" => files.push((JSON_FILENAME, result.json_output.clone().into_bytes())),
                other => tracing::warn!("Ignoring unsupported output format: {}", other),
            }
        }
        if let Some(stats) = &result.stats {
            files.push((STATS_FILENAME, serde_json::to_vec_pretty(stats)?));
        }

        if self.config.compress() {
            tracing::debug!("Creating ZIP file with {} files", files.len());

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &files {
                    zip.start_file(*name, SimpleFileOptions::default())?;
                    zip.write_all(data)?;
                }
                zip.finish()?.into_inner()
            };

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(ARCHIVE_FILENAME, &zip_data).await?;
            return Ok(format!("{}/{}", self.config.output_path(), ARCHIVE_FILENAME));
        }

        for (name, data) in &files {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(name, data).await?;
        }
        Ok(self.config.output_path().to_string())
    }
}
