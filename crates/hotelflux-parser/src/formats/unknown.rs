use crate::errors::ParserError;
use crate::fields::{parse_date, DateOrder};
use crate::filename::FileMetadata;
use crate::model::{NormalizedRecord, PmsType};
use crate::raw::RawTable;
use crate::registry::SourceFormat;

/// Fallback for exports no other format claims. Nothing is renamed; the first
/// column is read as a date on a best-effort basis and every cell is kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnknownFormat;

impl UnknownFormat {
    const NAME: &'static str = "UNKNOWN";
}

impl SourceFormat for UnknownFormat {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn claims(&self, _table: &RawTable) -> Result<(), ParserError> {
        Ok(())
    }

    fn normalize(
        &self,
        table: &RawTable,
        meta: &FileMetadata,
    ) -> Result<Vec<NormalizedRecord>, ParserError> {
        Ok(table
            .records()
            .map(|row| NormalizedRecord {
                hotel_id: meta.hotel_id.clone(),
                hotel_name: meta.hotel_name.clone(),
                date_extraction: meta.extraction_date,
                pms_type: PmsType::Unknown,
                date_parsed: row
                    .cell(0)
                    .and_then(|value| parse_date(value, DateOrder::MonthFirst)),
                passthrough: row.fields(),
                ..NormalizedRecord::default()
            })
            .collect())
    }
}
