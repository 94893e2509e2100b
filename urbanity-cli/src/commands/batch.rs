use anyhow::{Context, Result};
use csv::StringRecord;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use urbanity::{Coordinate, EvalResponse};

use super::build_client;

/// Value written to the `morphology` column when the upstream query fails.
const ERROR_MARKER: &str = "error";

pub async fn run(
    endpoint: &str,
    timeout: Option<u64>,
    input: PathBuf,
    output: Option<PathBuf>,
    lat_col: &str,
    lng_col: &str,
) -> Result<()> {
    let client = build_client(endpoint, timeout)?;
    let input_csv = read_input(&input, lat_col, lng_col)?;

    let pb = ProgressBar::new(input_csv.records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let output_path = output.unwrap_or_else(|| default_output_path(&input));
    let output_file = File::create(&output_path).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(output_file));

    let mut new_headers: Vec<&str> = input_csv.headers.iter().collect();
    new_headers.push("morphology");
    new_headers.push("name");
    writer.write_record(&new_headers)?;

    let mut failed = 0u64;
    for (row, record) in input_csv.records.iter().enumerate() {
        let coordinate = input_csv
            .coordinate(record)
            .with_context(|| format!("Invalid coordinate on data row {}", row + 1))?;

        let (morphology, name) = match client
            .query_urbanness(coordinate.lat, coordinate.lng)
            .await
        {
            Ok(result) => {
                let response = EvalResponse::from_result(coordinate, &result);
                (
                    response.morphology().to_string(),
                    response.name.unwrap_or_default(),
                )
            }
            Err(e) => {
                failed += 1;
                pb.println(format!("row {}: {}", row + 1, e));
                (ERROR_MARKER.to_string(), String::new())
            }
        };

        let mut new_record: Vec<&str> = record.iter().collect();
        new_record.push(&morphology);
        new_record.push(&name);
        writer.write_record(&new_record)?;

        pb.inc(1);
    }

    pb.finish_with_message("done");
    writer.flush()?;

    if failed > 0 {
        eprintln!("{} row(s) could not be classified", failed);
    }
    println!("Output written to: {}", output_path.display());
    Ok(())
}

/// Parsed input file with the coordinate column positions resolved.
struct InputCsv {
    headers: StringRecord,
    records: Vec<StringRecord>,
    lat_idx: usize,
    lng_idx: usize,
}

impl InputCsv {
    fn coordinate(&self, record: &StringRecord) -> Result<Coordinate> {
        let lat = record.get(self.lat_idx).context("Missing latitude")?;
        let lng = record.get(self.lng_idx).context("Missing longitude")?;
        Coordinate::parse(Some(lat), Some(lng))
            .with_context(|| format!("Not a number: lat={:?}, lng={:?}", lat, lng))
    }
}

fn read_input(input: &Path, lat_col: &str, lng_col: &str) -> Result<InputCsv> {
    let file = File::open(input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    let lat_idx = headers
        .iter()
        .position(|h| h == lat_col)
        .with_context(|| format!("Column '{}' not found in CSV", lat_col))?;
    let lng_idx = headers
        .iter()
        .position(|h| h == lng_col)
        .with_context(|| format!("Column '{}' not found in CSV", lng_col))?;

    let records = reader.records().collect::<Result<Vec<_>, _>>()?;

    Ok(InputCsv {
        headers,
        records,
        lat_idx,
        lng_idx,
    })
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_urbanity.csv", stem))
}
