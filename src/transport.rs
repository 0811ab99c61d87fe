use std::fs::File;
use std::io::Write;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use tracing::info;

use crate::config::ColumnMapping;
use crate::constants::transport::UTF8_BOM;
use crate::data::ReviewRecord;
use crate::errors::SamplerError;
use crate::types::ColumnName;

/// Read review records from a CSV file.
///
/// The header is matched against `columns` once up front; a missing mapped
/// column is a configuration error. Unmapped columns are carried through in
/// `extra` in header order. A UTF-8 BOM on the first header cell is ignored.
/// `row_id` is the zero-based data row index, the record's identity from here
/// on.
pub fn read_records(
    path: impl AsRef<Path>,
    columns: &ColumnMapping,
) -> Result<Vec<ReviewRecord>, SamplerError> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;

    let headers: Vec<ColumnName> = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches(UTF8_BOM).to_string())
        .collect();

    let primary_idx = column_index(&headers, &columns.primary, path)?;
    let secondary_idx = column_index(&headers, &columns.secondary, path)?;
    let rating_idx = column_index(&headers, &columns.rating, path)?;
    let text_idx = column_index(&headers, &columns.text, path)?;
    let mapped = [primary_idx, secondary_idx, rating_idx, text_idx];

    let mut records = Vec::new();
    for (row_id, row) in reader.records().enumerate() {
        let row = row?;
        let rating_raw = row.get(rating_idx).unwrap_or_default().trim();
        let rating: u8 = rating_raw
            .parse()
            .map_err(|_| SamplerError::InvalidRating {
                row: row_id,
                value: rating_raw.to_string(),
            })?;

        let mut extra: IndexMap<ColumnName, String> = IndexMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if mapped.contains(&idx) {
                continue;
            }
            extra.insert(header.clone(), row.get(idx).unwrap_or_default().to_string());
        }

        records.push(ReviewRecord {
            row_id,
            primary_category: row.get(primary_idx).unwrap_or_default().to_string(),
            secondary_category: row.get(secondary_idx).unwrap_or_default().to_string(),
            rating,
            text: row.get(text_idx).unwrap_or_default().to_string(),
            extra,
        });
    }

    info!(rows = records.len(), path = %path.display(), "records loaded");
    Ok(records)
}

/// Write records as BOM-prefixed UTF-8 CSV.
///
/// Mapped columns come first, then passthrough columns in first-seen order
/// across all records. Records missing a passthrough column emit an empty
/// cell.
pub fn write_records(
    path: impl AsRef<Path>,
    records: &[ReviewRecord],
    columns: &ColumnMapping,
) -> Result<(), SamplerError> {
    let path = path.as_ref();
    let mut extra_columns: IndexSet<ColumnName> = IndexSet::new();
    for record in records {
        for column in record.extra.keys() {
            extra_columns.insert(column.clone());
        }
    }

    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM.as_bytes())?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header: Vec<&str> = vec![
        columns.primary.as_str(),
        columns.secondary.as_str(),
        columns.rating.as_str(),
        columns.text.as_str(),
    ];
    header.extend(extra_columns.iter().map(String::as_str));
    writer.write_record(&header)?;

    for record in records {
        let rating = record.rating.to_string();
        let mut row: Vec<&str> = vec![
            record.primary_category.as_str(),
            record.secondary_category.as_str(),
            rating.as_str(),
            record.text.as_str(),
        ];
        for column in &extra_columns {
            row.push(record.extra.get(column).map(String::as_str).unwrap_or(""));
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;

    info!(rows = records.len(), path = %path.display(), "records written");
    Ok(())
}

fn column_index(
    headers: &[ColumnName],
    wanted: &str,
    path: &Path,
) -> Result<usize, SamplerError> {
    headers
        .iter()
        .position(|header| header == wanted)
        .ok_or_else(|| {
            SamplerError::Configuration(format!(
                "column '{wanted}' not found in {} (available: {})",
                path.display(),
                headers.join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn mapping() -> ColumnMapping {
        ColumnMapping::default()
    }

    #[test]
    fn reads_mapped_and_passthrough_columns() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("reviews.csv");
        fs::write(
            &path,
            "category_1,category_2,rating,text,product\nskincare,toner,5,촉촉해요,Toner A\nhair,shampoo,2,별로,Shampoo B\n",
        )
        .unwrap();

        let records = read_records(&path, &mapping()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row_id, 0);
        assert_eq!(records[0].primary_category, "skincare");
        assert_eq!(records[0].rating, 5);
        assert_eq!(records[0].extra["product"], "Toner A");
        assert_eq!(records[1].row_id, 1);
        assert_eq!(records[1].secondary_category, "shampoo");
    }

    #[test]
    fn bom_on_first_header_is_ignored() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bom.csv");
        fs::write(
            &path,
            "\u{feff}category_1,category_2,rating,text\na,b,3,괜찮아요\n",
        )
        .unwrap();
        let records = read_records(&path, &mapping()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].primary_category, "a");
    }

    #[test]
    fn missing_column_is_a_configuration_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bad.csv");
        fs::write(&path, "category_1,rating,text\na,3,ok\n").unwrap();
        let err = read_records(&path, &mapping()).unwrap_err();
        assert!(matches!(err, SamplerError::Configuration(_)));
    }

    #[test]
    fn unparseable_rating_is_an_invalid_rating_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("rating.csv");
        fs::write(
            &path,
            "category_1,category_2,rating,text\na,b,five,좋아요\n",
        )
        .unwrap();
        let err = read_records(&path, &mapping()).unwrap_err();
        assert!(matches!(err, SamplerError::InvalidRating { row: 0, .. }));
    }

    #[test]
    fn write_prefixes_bom_and_round_trips() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("out.csv");

        let mut extra = IndexMap::new();
        extra.insert("product".to_string(), "Toner A".to_string());
        let records = vec![ReviewRecord {
            row_id: 0,
            primary_category: "skincare".to_string(),
            secondary_category: "toner".to_string(),
            rating: 4,
            text: "순하고 좋아요".to_string(),
            extra,
        }];

        write_records(&path, &records, &mapping()).unwrap();

        let raw = fs::read(&path).unwrap();
        assert!(raw.starts_with(UTF8_BOM.as_bytes()));

        let reloaded = read_records(&path, &mapping()).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].text, "순하고 좋아요");
        assert_eq!(reloaded[0].extra["product"], "Toner A");
    }
}
