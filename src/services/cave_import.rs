//! CSV-to-record conversion for bulk cave imports.
//!
//! SENTINEL CONTRACT: any missing or unparseable column is filled with a
//! fixed placeholder - `-1` for numbers (`-1.0` for coordinates) and the
//! string `"-1"` for text - never with NULL/absence, and never as an error.
//! Downstream consumers rely on this marker to distinguish "imported but
//! unknown" from "not supplied"; note it conflates the marker with a
//! legitimate value for fields where -1 could occur naturally
//! (e.g. `numberOfPits`). Preserved deliberately for compatibility.

use csv::ReaderBuilder;
use std::collections::HashMap;

use crate::database::models::cave::Cave;

pub const TEXT_SENTINEL: &str = "-1";
pub const NUMBER_SENTINEL: i64 = -1;
pub const COORDINATE_SENTINEL: f64 = -1.0;

/// Converts CSV text (one row per cave) into cave records. Malformed rows
/// and cells coerce to sentinels; this function never fails.
///
/// Expected columns: `tcsnumber, name, latitude, longitude, length, depth,
/// pdep, ps, co_name, topo_name, topo_indi, elev, ownership, gear, ent_type,
/// field_indi, map_status, geology, geo_age, phys_prov, narr`.
pub fn csv_to_caves(csv_text: &str) -> Vec<Cave> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    let columns: HashMap<String, usize> = match reader.headers() {
        Ok(headers) => headers
            .iter()
            .enumerate()
            .map(|(index, name)| (name.trim().to_ascii_lowercase(), index))
            .collect(),
        Err(_) => return vec![],
    };

    let mut caves = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else {
            // unreadable row: nothing to coerce, nothing to import
            continue;
        };

        let text = |name: &str| cell(&record, &columns, name).unwrap_or(TEXT_SENTINEL).to_string();
        let number = |name: &str| {
            cell(&record, &columns, name)
                .and_then(|value| value.parse::<i64>().ok())
                .unwrap_or(NUMBER_SENTINEL)
        };
        let coordinate = |name: &str| {
            cell(&record, &columns, name)
                .and_then(|value| value.parse::<f64>().ok())
                .unwrap_or(COORDINATE_SENTINEL)
        };

        caves.push(Cave {
            id: text("tcsnumber"),
            name: text("name"),
            coordinates: vec![coordinate("longitude"), coordinate("latitude")],
            length: Some(number("length")),
            depth: Some(number("depth")),
            pit_depth: Some(number("pdep")),
            number_of_pits: Some(number("ps")),
            county_name: Some(text("co_name")),
            topo_name: Some(text("topo_name")),
            topo_indication: Some(text("topo_indi")),
            elevation: Some(number("elev")),
            ownership: Some(text("ownership")),
            required_gear: Some(text("gear")),
            entrance_type: Some(text("ent_type")),
            field_indication: Some(text("field_indi")),
            map_status: Some(text("map_status")),
            geology: Some(text("geology")),
            geology_age: Some(text("geo_age")),
            physiographic_province: Some(text("phys_prov")),
            narrative: Some(text("narr")),
            created_at: None,
            updated_at: None,
        });
    }

    caves
}

/// Non-empty trimmed cell value for a named column, if present in this row.
fn cell<'r>(
    record: &'r csv::StringRecord,
    columns: &HashMap<String, usize>,
    name: &str,
) -> Option<&'r str> {
    columns
        .get(name)
        .and_then(|&index| record.get(index))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "tcsnumber,name,latitude,longitude,length,depth,pdep,ps,co_name,topo_name,topo_indi,elev,ownership,gear,ent_type,field_indi,map_status,geology,geo_age,phys_prov,narr";

    #[test]
    fn complete_row_converts_all_fields() {
        let csv = format!(
            "{HEADER}\nTN42,Big Room Cave,35.1,-85.5,1200,90,40,2,Marion,Whitwell,quad,600,Private,rope,pit,sink,mapped,Limestone,Ordovician,Cumberland Plateau,Large walking passage"
        );
        let caves = csv_to_caves(&csv);
        assert_eq!(caves.len(), 1);
        let cave = &caves[0];
        assert_eq!(cave.id, "TN42");
        assert_eq!(cave.name, "Big Room Cave");
        assert_eq!(cave.coordinates, vec![-85.5, 35.1]);
        assert_eq!(cave.length, Some(1200));
        assert_eq!(cave.number_of_pits, Some(2));
        assert_eq!(cave.county_name.as_deref(), Some("Marion"));
        assert_eq!(cave.narrative.as_deref(), Some("Large walking passage"));
    }

    #[test]
    fn empty_length_column_becomes_number_sentinel() {
        let csv = format!("{HEADER}\nTN1,Test Cave,35.0,-85.0,,,,,,,,,,,,,,,,,");
        let caves = csv_to_caves(&csv);
        assert_eq!(caves[0].length, Some(NUMBER_SENTINEL));
        assert_eq!(caves[0].depth, Some(NUMBER_SENTINEL));
        assert_eq!(caves[0].county_name.as_deref(), Some(TEXT_SENTINEL));
    }

    #[test]
    fn unparseable_number_becomes_sentinel_not_error() {
        let csv = format!("{HEADER}\nTN2,Test,35.0,-85.0,not-a-number,,,,,,,,,,,,,,,,");
        let caves = csv_to_caves(&csv);
        assert_eq!(caves[0].length, Some(NUMBER_SENTINEL));
    }

    #[test]
    fn short_row_fills_missing_cells_with_sentinels() {
        let csv = format!("{HEADER}\nTN3,Short Row,35.0");
        let caves = csv_to_caves(&csv);
        assert_eq!(caves.len(), 1);
        let cave = &caves[0];
        assert_eq!(cave.id, "TN3");
        assert_eq!(cave.coordinates, vec![COORDINATE_SENTINEL, 35.0]);
        assert_eq!(cave.length, Some(NUMBER_SENTINEL));
        assert_eq!(cave.narrative.as_deref(), Some(TEXT_SENTINEL));
    }

    #[test]
    fn missing_id_column_becomes_text_sentinel() {
        let csv = "name,latitude,longitude\nNo Id Cave,35.0,-85.0";
        let caves = csv_to_caves(csv);
        assert_eq!(caves[0].id, TEXT_SENTINEL);
        assert_eq!(caves[0].name, "No Id Cave");
    }

    #[test]
    fn empty_input_converts_to_nothing() {
        assert!(csv_to_caves("").is_empty());
        assert!(csv_to_caves(HEADER).is_empty());
    }
}
