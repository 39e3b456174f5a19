use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::error::LedgerError;
use super::family::classify;
use super::types::{FamilyTag, LedgerRow, UsageEvent, LEDGER_COLUMNS};

/// Append-only CSV log of synthesis events.
///
/// Every call opens, writes and closes the file, so separate invocations can
/// share one log. Each row goes out in a single append write; there is no
/// locking beyond what the OS gives for `O_APPEND`.
#[derive(Debug, Clone)]
pub struct UsageLedger {
    path: PathBuf,
}

impl UsageLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event, creating parent dirs and the header row as needed.
    pub fn append(&self, event: &UsageEvent) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        let needs_header = file.metadata().map_err(|e| self.io_error(e))?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(Vec::new());
        if needs_header {
            writer.write_record(LEDGER_COLUMNS)?;
        }
        writer.serialize(LedgerRow::from(event))?;
        let buf = writer
            .into_inner()
            .map_err(|e| self.io_error(e.into_error()))?;

        file.write_all(&buf).map_err(|e| self.io_error(e))?;

        tracing::debug!(
            path = %self.path.display(),
            chars = event.character_count,
            voice = %event.voice_identifier,
            "Appended usage row"
        );
        Ok(())
    }

    /// Read every row in append order. A missing log reads as empty.
    pub fn read_rows(&self) -> Result<Vec<LedgerRow>, LedgerError> {
        let mut rows = Vec::new();
        self.scan(|row| rows.push(row))?;
        Ok(rows)
    }

    /// Total characters recorded for `month_key` (`YYYY-MM`).
    pub fn sum_characters(&self, month_key: &str) -> Result<u64, LedgerError> {
        let mut total = 0u64;
        self.scan(|row| {
            if row.month == month_key {
                total += row.chars;
            }
        })?;
        Ok(total)
    }

    /// Characters recorded for `month_key`, grouped by voice family.
    pub fn sum_characters_by_family(
        &self,
        month_key: &str,
    ) -> Result<BTreeMap<FamilyTag, u64>, LedgerError> {
        let mut by_family: BTreeMap<FamilyTag, u64> = BTreeMap::new();
        self.scan(|row| {
            if row.month == month_key {
                *by_family.entry(classify(&row.voice)).or_insert(0) += row.chars;
            }
        })?;
        Ok(by_family)
    }

    /// Full linear scan. Any unparsable row aborts the whole scan.
    fn scan<F: FnMut(LedgerRow)>(&self, mut visit: F) -> Result<(), LedgerError> {
        if !self.path.exists() {
            return Ok(());
        }

        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

        let headers = reader.headers().map_err(malformed)?.clone();
        if headers.is_empty() {
            return Ok(());
        }
        if headers.iter().ne(LEDGER_COLUMNS.iter().copied()) {
            return Err(LedgerError::SchemaMismatch {
                found: headers.iter().collect::<Vec<_>>().join(","),
            });
        }

        for result in reader.deserialize::<LedgerRow>() {
            visit(result.map_err(malformed)?);
        }
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn malformed(err: csv::Error) -> LedgerError {
    LedgerError::MalformedRow {
        line: err.position().map(|p| p.line()),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn event(year: i32, month: u32, chars: u64, voice: &str) -> UsageEvent {
        UsageEvent {
            timestamp: Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0).unwrap(),
            character_count: chars,
            voice_identifier: voice.to_string(),
            language_code: "en-US".to_string(),
            audio_format: "mp3".to_string(),
            output_path: "/tmp/out/test.mp3".to_string(),
        }
    }

    #[test]
    fn test_append_creates_file_with_header() {
        let dir = TempDir::new().unwrap();
        let ledger = UsageLedger::new(dir.path().join("usage.csv"));
        ledger.append(&event(2025, 6, 42, "en-US-Neural2-D")).unwrap();

        let content = fs::read_to_string(ledger.path()).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("timestamp_utc,month,chars,voice,language,format,output_file")
        );
        assert!(lines.next().unwrap().contains(",2025-06,42,en-US-Neural2-D,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_header_written_once() {
        let dir = TempDir::new().unwrap();
        let ledger = UsageLedger::new(dir.path().join("usage.csv"));
        for i in 0..3 {
            ledger.append(&event(2025, 6, 10 + i, "v")).unwrap();
        }

        let content = fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(content.matches("timestamp_utc").count(), 1);
        assert_eq!(ledger.read_rows().unwrap().len(), 3);
    }

    #[test]
    fn test_append_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let ledger = UsageLedger::new(dir.path().join("sub").join("dir").join("usage.csv"));
        ledger.append(&event(2025, 6, 5, "v")).unwrap();
        assert!(ledger.path().exists());
    }

    #[test]
    fn test_missing_log_reads_as_zero() {
        let dir = TempDir::new().unwrap();
        let ledger = UsageLedger::new(dir.path().join("nope.csv"));
        assert_eq!(ledger.sum_characters("2025-06").unwrap(), 0);
        assert!(ledger.sum_characters_by_family("2025-06").unwrap().is_empty());
        assert!(ledger.read_rows().unwrap().is_empty());
    }

    #[test]
    fn test_sum_characters_filters_month() {
        let dir = TempDir::new().unwrap();
        let ledger = UsageLedger::new(dir.path().join("usage.csv"));
        ledger.append(&event(2025, 6, 10, "v")).unwrap();
        ledger.append(&event(2025, 6, 20, "v")).unwrap();
        ledger.append(&event(2025, 7, 100, "v")).unwrap();

        assert_eq!(ledger.sum_characters("2025-06").unwrap(), 30);
        assert_eq!(ledger.sum_characters("2025-07").unwrap(), 100);
        assert_eq!(ledger.sum_characters("2025-01").unwrap(), 0);
    }

    #[test]
    fn test_sum_by_family_groups() {
        let dir = TempDir::new().unwrap();
        let ledger = UsageLedger::new(dir.path().join("usage.csv"));
        for (voice, chars) in [
            ("en-US-Chirp3-HD-Fenrir", 100),
            ("en-US-Chirp3-HD-Achird", 200),
            ("en-US-Neural2-D", 50),
            ("en-US-Wavenet-D", 75),
        ] {
            ledger.append(&event(2025, 6, chars, voice)).unwrap();
        }
        ledger.append(&event(2025, 5, 999, "en-US-Wavenet-D")).unwrap();

        let by_family = ledger.sum_characters_by_family("2025-06").unwrap();
        assert_eq!(by_family[&FamilyTag::Chirp3Hd], 300);
        assert_eq!(by_family[&FamilyTag::Neural2], 50);
        assert_eq!(by_family[&FamilyTag::Wavenet], 75);
        assert_eq!(by_family.len(), 3);
    }

    #[test]
    fn test_fields_survive_quoting() {
        let dir = TempDir::new().unwrap();
        let ledger = UsageLedger::new(dir.path().join("usage.csv"));
        let mut tricky = event(2025, 6, 7, "custom,voice \"x\"");
        tricky.output_path = "/tmp/a, b/line\nbreak.mp3".to_string();
        ledger.append(&tricky).unwrap();
        ledger.append(&event(2025, 6, 8, "en-US-Standard-A")).unwrap();

        let rows = ledger.read_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], LedgerRow::from(&tricky));
        assert_eq!(rows[0].voice, "custom,voice \"x\"");
        assert_eq!(rows[0].output_file, "/tmp/a, b/line\nbreak.mp3");
        assert_eq!(rows[1].chars, 8);
    }

    #[test]
    fn test_malformed_chars_fails_whole_scan() {
        let dir = TempDir::new().unwrap();
        let ledger = UsageLedger::new(dir.path().join("usage.csv"));
        ledger.append(&event(2025, 6, 10, "v")).unwrap();

        let mut file = OpenOptions::new().append(true).open(ledger.path()).unwrap();
        file.write_all(b"2025-06-16T00:00:00+00:00,2025-06,lots,v,en-US,mp3,x.mp3\r\n")
            .unwrap();

        let err = ledger.sum_characters("2025-06").unwrap_err();
        assert!(matches!(err, LedgerError::MalformedRow { .. }));
    }

    #[test]
    fn test_wrong_header_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("usage.csv");
        fs::write(&path, "when,chars\n2025-06-01,10\n").unwrap();

        let err = UsageLedger::new(path).sum_characters("2025-06").unwrap_err();
        assert!(matches!(err, LedgerError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_reads_lf_terminated_logs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("usage.csv");
        fs::write(
            &path,
            "timestamp_utc,month,chars,voice,language,format,output_file\n\
             2025-06-15T12:00:00+00:00,2025-06,42,en-US-Neural2-D,en-US,mp3,/tmp/a.mp3\n",
        )
        .unwrap();

        assert_eq!(UsageLedger::new(path).sum_characters("2025-06").unwrap(), 42);
    }
}
