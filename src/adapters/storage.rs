use crate::domain::model::{RetryRecord, SourceRecord, ACCOUNT_ADDRESS_COLUMN, ERROR_REASON_COLUMN};
use crate::domain::ports::RetrySink;
use crate::utils::error::{BatchError, Result};
use csv::{ReaderBuilder, Trim, Writer};
use std::fs::File;
use std::io::{Read, Write};

/// Source CSV loaded into memory, header first.
#[derive(Debug, Clone)]
pub struct SourceFile {
    headers: Vec<String>,
    records: Vec<SourceRecord>,
}

impl SourceFile {
    pub fn open(path: &str) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, path)
    }

    pub fn from_reader<R: Read>(reader: R, origin: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::Headers)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let address_index = headers
            .iter()
            .position(|h| h == ACCOUNT_ADDRESS_COLUMN)
            .ok_or_else(|| BatchError::MissingColumn {
                path: origin.to_string(),
                column: ACCOUNT_ADDRESS_COLUMN.to_string(),
            })?;

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row?;
            let mut fields: Vec<String> = row.iter().map(str::to_string).collect();
            if fields.len() != headers.len() {
                tracing::warn!(
                    "{}: row {} has {} fields, expected {}",
                    origin,
                    index + 1,
                    fields.len(),
                    headers.len()
                );
                // Keep retry rows rectangular.
                fields.resize(headers.len(), String::new());
            }

            let account_address = fields
                .get(address_index)
                .map(|a| a.trim().to_string())
                .unwrap_or_default();
            records.push(SourceRecord {
                line: index + 1,
                account_address,
                fields,
            });
        }

        tracing::debug!("Read {} records from {}", records.len(), origin);
        Ok(Self { headers, records })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[SourceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Writes failed records with the source header plus `error_reason`,
/// flushing after every row.
pub struct RetryWriter<W: Write> {
    writer: Writer<W>,
    reason_index: usize,
}

impl RetryWriter<File> {
    pub fn create(path: &str, source_headers: &[String]) -> Result<Self> {
        let file = File::create(path)?;
        Self::from_writer(file, source_headers)
    }
}

impl<W: Write> RetryWriter<W> {
    pub fn from_writer(inner: W, source_headers: &[String]) -> Result<Self> {
        let mut headers = source_headers.to_vec();
        // A retry file fed back in already carries the column; reuse it.
        let reason_index = match headers.iter().position(|h| h == ERROR_REASON_COLUMN) {
            Some(index) => index,
            None => {
                headers.push(ERROR_REASON_COLUMN.to_string());
                headers.len() - 1
            }
        };

        let mut writer = Writer::from_writer(inner);
        writer.write_record(&headers)?;
        writer.flush()?;

        Ok(Self {
            writer,
            reason_index,
        })
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| {
            BatchError::IoError(std::io::Error::new(e.error().kind(), e.error().to_string()))
        })
    }
}

impl<W: Write> RetrySink for RetryWriter<W> {
    fn write(&mut self, record: &RetryRecord) -> Result<()> {
        let mut row = record.source.fields.clone();
        if row.len() <= self.reason_index {
            row.resize(self.reason_index + 1, String::new());
        }
        row[self.reason_index] = record.error_reason.clone();

        self.writer.write_record(&row)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const EXPORT: &str = "Account address,Show boosts,Notify on new posts,Languages\n\
        alice@example.social,true,false,\n\
        bob@infosec.exchange,false,false,en\n";

    fn retry(source: &SourceRecord, reason: &str) -> RetryRecord {
        RetryRecord {
            source: source.clone(),
            error_reason: reason.to_string(),
        }
    }

    #[test]
    fn test_reads_export_rows() {
        let source = SourceFile::from_reader(EXPORT.as_bytes(), "export.csv").unwrap();

        assert_eq!(source.headers().len(), 4);
        assert_eq!(source.len(), 2);
        let bob = &source.records()[1];
        assert_eq!(bob.line, 2);
        assert_eq!(bob.account_address, "bob@infosec.exchange");
        assert_eq!(bob.fields, vec!["bob@infosec.exchange", "false", "false", "en"]);
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let content = "Languages,Account address,Show boosts\n\
            en,alice@example.social,true\n\
            de\n\
            ,carol@hachyderm.io,false\n";
        let source = SourceFile::from_reader(content.as_bytes(), "ragged.csv").unwrap();

        assert_eq!(source.len(), 3);
        let short = &source.records()[1];
        assert_eq!(short.account_address, "");
        assert_eq!(short.fields, vec!["de", "", ""]);
        assert_eq!(source.records()[2].account_address, "carol@hachyderm.io");

        let mut writer = RetryWriter::from_writer(Vec::new(), source.headers()).unwrap();
        writer.write(&retry(short, "account not found")).unwrap();
        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "Languages,Account address,Show boosts,error_reason\nde,,,account not found\n"
        );
    }

    #[test]
    fn test_missing_address_column() {
        let err = SourceFile::from_reader("handle,notes\nalice,x\n".as_bytes(), "bad.csv")
            .unwrap_err();
        assert!(matches!(err, BatchError::MissingColumn { .. }));
    }

    #[test]
    fn test_retry_rows_append_reason_column() {
        let source = SourceFile::from_reader(EXPORT.as_bytes(), "export.csv").unwrap();
        let mut writer = RetryWriter::from_writer(Vec::new(), source.headers()).unwrap();
        writer
            .write(&retry(&source.records()[0], "account not found"))
            .unwrap();

        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "Account address,Show boosts,Notify on new posts,Languages,error_reason\n\
             alice@example.social,true,false,,account not found\n"
        );
    }

    #[test]
    fn test_retry_file_as_source_keeps_single_reason_column() {
        let previous = "Account address,Languages,error_reason\nalice@example.social,en,timeout\n";
        let source = SourceFile::from_reader(previous.as_bytes(), "retry.csv").unwrap();
        let mut writer = RetryWriter::from_writer(Vec::new(), source.headers()).unwrap();
        writer
            .write(&retry(&source.records()[0], "account not found"))
            .unwrap();

        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "Account address,Languages,error_reason\nalice@example.social,en,account not found\n"
        );
    }

    #[test]
    fn test_rows_are_on_disk_before_writer_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("retry.csv");
        let path = path.to_str().unwrap();

        let source = SourceFile::from_reader(EXPORT.as_bytes(), "export.csv").unwrap();
        let mut writer = RetryWriter::create(path, source.headers()).unwrap();
        writer.write(&retry(&source.records()[1], "timeout")).unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.ends_with("bob@infosec.exchange,false,false,en,timeout\n"));

        let reread = SourceFile::open(path).unwrap();
        assert_eq!(reread.len(), 1);
        assert_eq!(reread.records()[0].account_address, "bob@infosec.exchange");
    }
}
