use crate::core::error::ParseError;
use crate::models::user::UserRecord;
use crate::policy::inactivity::extract_days;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

const ACCOUNT_ID_COLUMN: usize = 0;
const USERNAME_COLUMN: usize = 1;
const INACTIVITY_COLUMN: usize = 2;
const REQUIRED_COLUMNS: usize = 3;

/// One data row from the inactive users file
#[derive(Debug)]
pub struct ParsedRow {
    /// 1-based row number within the file, header included
    pub line: u64,
    pub record: Result<UserRecord, ParseError>,
}

/// Single pass, lazy reader over `account_id,username,inactivity` rows
///
/// Rows come back in file order. A malformed row yields an error for that
/// row only; iteration carries on with the next one.
pub struct CsvRows<R: Read> {
    records: StringRecordsIntoIter<R>,
    line: u64,
    skip_header: bool,
}

impl CsvRows<File> {
    pub fn from_path(path: &Path, has_header: bool) -> Result<Self, csv::Error> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file, has_header))
    }
}

impl<R: Read> CsvRows<R> {
    pub fn from_reader(reader: R, has_header: bool) -> Self {
        // Header handling is ours, the csv reader sees every row as data
        let records = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(false)
            .flexible(true)
            .from_reader(reader)
            .into_records();

        Self {
            records,
            line: 0,
            skip_header: has_header,
        }
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = ParsedRow;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.records.next()?;
            self.line += 1;

            if self.skip_header {
                self.skip_header = false;
                match &next {
                    Ok(header) => {
                        let columns: Vec<&str> = header.iter().collect();
                        info!(columns = %columns.join(", "), "Column names read from header row");
                    }
                    Err(e) => warn!(line = self.line, error = %e, "Unreadable header row skipped"),
                }
                continue;
            }

            let record = next
                .map_err(ParseError::from)
                .and_then(|row| parse_record(&row));

            return Some(ParsedRow {
                line: self.line,
                record,
            });
        }
    }
}

/// Turn one CSV record into a user record
pub fn parse_record(row: &StringRecord) -> Result<UserRecord, ParseError> {
    if row.len() < REQUIRED_COLUMNS {
        return Err(ParseError::MissingColumn {
            expected: REQUIRED_COLUMNS,
            found: row.len(),
        });
    }

    let account_id = &row[ACCOUNT_ID_COLUMN];
    let username = &row[USERNAME_COLUMN];
    if username.is_empty() {
        return Err(ParseError::EmptyUsername);
    }

    let inactivity_days = extract_days(&row[INACTIVITY_COLUMN])?;

    Ok(UserRecord::new(account_id, username, inactivity_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn rows(input: &str, has_header: bool) -> Vec<ParsedRow> {
        CsvRows::from_reader(input.as_bytes(), has_header).collect()
    }

    #[test]
    fn test_header_row_is_skipped() {
        let parsed = rows(
            "account_id,username,inactivity\nacct-1,alice,85 days\nacct-2,bob,95 days\n",
            true,
        );

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].line, 2);
        assert_eq!(parsed[0].record.as_ref().unwrap(), &UserRecord::new("acct-1", "alice", 85));
        assert_eq!(parsed[1].record.as_ref().unwrap(), &UserRecord::new("acct-2", "bob", 95));
    }

    #[test]
    fn test_unreadable_header_row_is_still_skipped() {
        let input: &[u8] = b"account_id,user\xffname,inactivity\nacct-1,alice,85 days\n";
        let parsed: Vec<ParsedRow> = CsvRows::from_reader(input, true).collect();

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].line, 2);
        assert_eq!(parsed[0].record.as_ref().unwrap(), &UserRecord::new("acct-1", "alice", 85));
    }

    #[test]
    fn test_no_header_reads_first_row() {
        let parsed = rows("acct-1,alice,85 days\n", false);

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].line, 1);
        assert!(parsed[0].record.is_ok());
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let parsed = rows("acct-1,zed,1\nacct-1,alice,2\nacct-2,zed,3\n", false);

        let names: Vec<&str> = parsed
            .iter()
            .map(|r| r.record.as_ref().unwrap().username.as_str())
            .collect();
        assert_eq!(names, vec!["zed", "alice", "zed"]);
    }

    #[test]
    fn test_short_row_is_row_error() {
        let parsed = rows("acct-1,alice\nacct-2,bob,95 days\n", false);

        assert_eq!(parsed.len(), 2);
        assert!(matches!(
            parsed[0].record,
            Err(ParseError::MissingColumn { expected: 3, found: 2 })
        ));
        assert!(parsed[1].record.is_ok());
    }

    #[test]
    fn test_inactivity_without_digits_is_row_error() {
        let parsed = rows("acct-1,alice,never\n", false);
        assert!(matches!(parsed[0].record, Err(ParseError::NoDigits(_))));
    }

    #[test]
    fn test_empty_username_is_row_error() {
        let parsed = rows("acct-1,,120 days\n", false);
        assert!(matches!(parsed[0].record, Err(ParseError::EmptyUsername)));
    }

    #[test]
    fn test_quoted_fields_and_extra_columns() {
        let parsed = rows("\"acct-1\",\"alice@example.com\",\"85 days\",extra\n", false);
        assert_eq!(
            parsed[0].record.as_ref().unwrap(),
            &UserRecord::new("acct-1", "alice@example.com", 85)
        );
    }

    #[test]
    fn test_header_only_file_is_empty() {
        assert!(rows("account_id,username,inactivity\n", true).is_empty());
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "account_id,username,inactivity").unwrap();
        writeln!(file, "acct-1,alice,85 days").unwrap();

        let parsed: Vec<ParsedRow> = CsvRows::from_path(file.path(), true).unwrap().collect();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_from_path_missing_file() {
        assert!(CsvRows::from_path(Path::new("/nonexistent/users.csv"), true).is_err());
    }
}
