//! Persisted referee alias table
//!
//! Two columns per row, alias then canonical name, semicolon-delimited since
//! the names themselves may contain commas ("Wilkie, A"). First line is a
//! header. Read back by the season loader to translate raw referee fields.

use crate::resolve::CanonicalMap;
use crate::Result;
use std::path::Path;

const HEADER: [&str; 2] = ["Alias", "True Name"];

/// Write the full alias table, one row per raw name ever seen
pub fn write<P: AsRef<Path>>(path: P, mapping: &CanonicalMap) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path.as_ref())?;
    writer.write_record(HEADER)?;
    for (alias, canonical) in mapping {
        writer.write_record([alias.as_str(), canonical.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read an alias table written by [`write`]
pub fn read<P: AsRef<Path>>(path: P) -> Result<CanonicalMap> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_path(path.as_ref())?;

    let mut mapping = CanonicalMap::new();
    for record in reader.records() {
        let record = record?;
        if let (Some(alias), Some(canonical)) = (record.get(0), record.get(1)) {
            mapping.insert(alias.to_string(), canonical.to_string());
        }
    }
    Ok(mapping)
}
