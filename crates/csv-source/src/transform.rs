//! Rename/select mapping from source headers to the report node schema.

use crate::error::{SchemaMismatchError, SourceReadError};
use report_core::{ArrestReportNode, FieldValue, RawRecord, ReportField, FIELD_COUNT};
use tracing::debug;

/// Fixed 1:1 projection of source columns onto [`ReportField`]s.
///
/// The column positions are resolved once from the header, so mapping a row
/// is a straight move of values into the node.
#[derive(Debug, Clone)]
pub struct SchemaTransformer {
    positions: [usize; FIELD_COUNT],
}

impl SchemaTransformer {
    /// Resolve every field's source column by exact header match.
    ///
    /// Columns not used by the node schema are ignored.
    pub fn for_columns(columns: &[String]) -> Result<Self, SchemaMismatchError> {
        let mut positions = [0usize; FIELD_COUNT];
        let mut missing = Vec::new();

        for (slot, field) in positions.iter_mut().zip(ReportField::ALL) {
            match columns.iter().position(|c| c == field.source_column()) {
                Some(i) => *slot = i,
                None => missing.push(field.source_column().to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(SchemaMismatchError { missing });
        }

        debug!("Resolved source column positions: {:?}", positions);
        Ok(Self { positions })
    }

    /// Map one source row onto a report node.
    pub fn transform(&self, record: RawRecord) -> ArrestReportNode {
        let mut values = record.into_values();
        let fields: [FieldValue; FIELD_COUNT] = std::array::from_fn(|i| {
            values
                .get_mut(self.positions[i])
                .map(std::mem::take)
                .unwrap_or_default()
        });
        ArrestReportNode::from_values(fields)
    }

    /// Lazily map a stream of source rows, preserving order and count.
    pub fn transform_all<I>(
        self,
        records: I,
    ) -> impl Iterator<Item = Result<ArrestReportNode, SourceReadError>>
    where
        I: IntoIterator<Item = Result<RawRecord, SourceReadError>>,
    {
        records
            .into_iter()
            .map(move |record| record.map(|r| self.transform(r)))
    }
}
