use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use itertools::Itertools;

use crate::assignment::ClusterAssignment;
use crate::dataset::{DataSet, SampleId};
use crate::error::{KMeansError, Result};

/// Layout of a delimited input file.
#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    /// First column holds the sample id
    pub has_ids: bool,
    /// First row holds the column names
    pub has_header: bool,
    /// Last column holds a class label rather than a feature
    pub has_labels: bool,
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_ids: true,
            has_header: true,
            has_labels: false,
            delimiter: b',',
        }
    }
}

pub fn load_csv<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<DataSet> {
    let file = File::open(path.as_ref())?;
    let dataset = read_csv(BufReader::new(file), options)?;
    log::info!(
        "Loaded data from {}: {} samples x {} features",
        path.as_ref().display(),
        dataset.num_samples(),
        dataset.num_features()
    );
    Ok(dataset)
}

pub fn read_csv<R: Read>(reader: R, options: &CsvOptions) -> Result<DataSet> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(options.delimiter)
        .trim(Trim::All)
        .from_reader(reader);

    let header = if options.has_header {
        Some(rdr.headers()?.clone())
    } else {
        None
    };

    let first = usize::from(options.has_ids);
    let mut ids = Vec::new();
    let mut labels = Vec::new();
    let mut rows = Vec::new();

    for record in rdr.records() {
        let record = record?;
        let end = feature_end(&record, options)?;

        if options.has_ids {
            ids.push(SampleId::Key(record[0].to_string()));
        }
        if options.has_labels {
            labels.push(record[end].to_string());
        }

        let row = (first..end)
            .map(|column| {
                let value = &record[column];
                value.parse::<f64>().map_err(|source| KMeansError::ParseFloat {
                    value: value.to_string(),
                    column,
                    source,
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(KMeansError::invalid("input contains no samples"));
    }

    let mut dataset = DataSet::from_rows(rows)?;
    if let Some(header) = header {
        let end = feature_end(&header, options)?;
        dataset = dataset.with_feature_names((first..end).map(|c| header[c].to_string()))?;
    }
    if options.has_ids {
        dataset = dataset.with_index(ids)?;
    }
    if options.has_labels {
        dataset = dataset.with_labels(labels)?;
    }
    Ok(dataset)
}

/// One past the last feature column, checking there is at least one feature.
fn feature_end(record: &StringRecord, options: &CsvOptions) -> Result<usize> {
    let first = usize::from(options.has_ids);
    let end = record.len().saturating_sub(usize::from(options.has_labels));
    if end <= first {
        return Err(KMeansError::invalid(format!(
            "row with {} columns leaves no feature columns",
            record.len()
        )));
    }
    Ok(end)
}

pub fn save_assignment<P: AsRef<Path>>(path: P, assignment: &ClusterAssignment) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    write_assignment(file, assignment)
}

pub fn write_assignment<W: Write>(writer: W, assignment: &ClusterAssignment) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(["sample", "cluster"])?;
    for (id, cluster) in assignment.iter() {
        wtr.write_record([id.to_string(), cluster.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// One-line summary of a dataset for log output.
pub fn describe(dataset: &DataSet) -> String {
    format!(
        "{} samples, features [{}]",
        dataset.num_samples(),
        dataset.feature_list().iter().join(", ")
    )
}
