//! Asynchronous CSV reader with batch interface
//!
//! Reads ledger records from any `futures` AsyncRead (a tokio file through
//! the tokio-util compat layer in production) in fixed-size batches.
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of LedgerRecords
//!                  ↓
//!           csv_format module
//!           (CsvRecord, convert_csv_record)
//! ```
//!
//! Rows that fail to parse or convert are logged and skipped; a batch only
//! holds valid records.

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{LedgerRecord, SettlementError};
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Batch reader over a ledger CSV stream
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: u64,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Wrap a stream; the first row must be the header
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 1,
        }
    }

    /// Read up to `batch_size` valid records
    ///
    /// Returns an empty batch once the stream is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<LedgerRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            let Some(row) = records.next().await else {
                break;
            };
            self.line_num += 1;

            let converted = row
                .map_err(|e| SettlementError::parse(e.to_string()))
                .and_then(convert_csv_record);
            match converted {
                Ok(record) => batch.push(record),
                Err(e) => warn!(error = %e.at_line(self.line_num), "skipping record"),
            }
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::io::Cursor;

    const HEADER: &str = "type,event,id,name,amount,tip,method,payer,participants,birthday,quantity,currency\n";

    #[tokio::test]
    async fn test_read_batch_splits_input() {
        let content = format!(
            "{}event,trip,,Trip,,,,,,,,COP\nparticipant,trip,ana,Ana\nparticipant,trip,ben,Ben\n",
            HEADER
        );
        let mut reader = AsyncReader::new(Cursor::new(content.into_bytes()));

        let first = reader.read_batch(2).await;
        assert_eq!(first.len(), 2);
        assert!(matches!(first[0], LedgerRecord::Event(_)));

        let second = reader.read_batch(2).await;
        assert_eq!(second.len(), 1);

        assert!(reader.read_batch(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_rows_are_skipped() {
        let content = format!(
            "{}refund,trip,x\ninvoice,trip,inv-1,Lunch,lots,,equal,ana,ana\nleave,trip,ana\n",
            HEADER
        );
        let mut reader = AsyncReader::new(Cursor::new(content.into_bytes()));

        let batch = reader.read_batch(10).await;
        assert_eq!(batch.len(), 1);
        assert!(matches!(batch[0], LedgerRecord::Leave { .. }));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let mut reader = AsyncReader::new(Cursor::new(HEADER.as_bytes().to_vec()));
        assert!(reader.read_batch(10).await.is_empty());
    }
}
