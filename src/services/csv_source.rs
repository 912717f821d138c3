use csv::ReaderBuilder;

use crate::services::syntax;

/// Extract every syntactically valid address from CSV bytes, row by row and
/// then column by column. Cells are kept exactly as written; anything that
/// does not parse as an address (headers, names, blanks) is skipped.
pub fn parse_addresses(data: &[u8]) -> Result<Vec<String>, CsvSourceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut addresses = Vec::new();
    for record in reader.records() {
        let record = record?;
        addresses.extend(
            record
                .iter()
                .filter(|field| syntax::is_valid(field))
                .map(str::to_string),
        );
    }
    Ok(addresses)
}

#[derive(Debug, thiserror::Error)]
pub enum CsvSourceError {
    #[error("{0}")]
    Csv(#[from] csv::Error),
}
