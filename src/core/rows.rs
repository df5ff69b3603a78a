use crate::core::delimiter::{detect_delimiter, first_line, Delimiter};
use crate::core::header::normalize_headers;
use crate::domain::model::CanonicalRecord;
use crate::utils::error::{Result, TimetableError};
use csv::{ByteRecord, ReaderBuilder, Trim};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Split};

/// Forward-only iterator over the data rows of an upload.
///
/// Each item is one non-blank record mapped onto the normalized header. Rows
/// shorter than the header are padded with empty strings; surplus cells are
/// dropped. A record's index is its physical line number minus two, so blank
/// lines still count toward the row numbers shown to the uploader.
pub struct RowParser<R: Read> {
    headers: Vec<String>,
    lines: Split<BufReader<R>>,
    delimiter: Delimiter,
    line_no: usize,
}

/// Cells of one record plus the physical line it starts on (1-based).
struct RawRecord {
    line: usize,
    cells: Vec<String>,
}

impl<R: Read> RowParser<R> {
    /// Reads the header row from `reader` using `delimiter`.
    pub fn new(reader: R, delimiter: Delimiter) -> Result<Self> {
        let mut parser = Self {
            headers: Vec::new(),
            lines: BufReader::new(reader).split(b'\n'),
            delimiter,
            line_no: 0,
        };

        let header_row = match parser.next_non_blank() {
            Some(row) => row?,
            None => return Err(TimetableError::EmptyUpload),
        };
        parser.headers = normalize_headers(&header_row.cells);
        tracing::debug!("Normalized headers: {:?}", parser.headers);

        Ok(parser)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Joins physical lines until the quotes balance, so a quoted cell may
    /// span lines, then splits the joined text with the csv reader.
    fn read_record(&mut self) -> Option<Result<RawRecord>> {
        let mut buffer = Vec::new();
        let mut start = None;

        for line in self.lines.by_ref() {
            let mut line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            self.line_no += 1;
            start.get_or_insert(self.line_no);
            if !buffer.is_empty() {
                buffer.push(b'\n');
            }
            buffer.extend_from_slice(&line);

            if !quote_open(&buffer, self.delimiter.as_byte()) {
                break;
            }
        }

        let line = start?;
        Some(split_cells(&buffer, self.delimiter).map(|cells| RawRecord { line, cells }))
    }

    fn next_non_blank(&mut self) -> Option<Result<RawRecord>> {
        loop {
            match self.read_record()? {
                // 整列空白（空行或試算表匯出的 ",,,"）直接略過
                Ok(record) if record.cells.iter().all(|c| c.is_empty()) => continue,
                other => return Some(other),
            }
        }
    }

    fn to_canonical(&self, record: RawRecord) -> CanonicalRecord {
        let mut fields = HashMap::with_capacity(self.headers.len());
        for (position, header) in self.headers.iter().enumerate() {
            let value = record.cells.get(position).cloned().unwrap_or_default();
            fields.insert(header.clone(), value);
        }
        CanonicalRecord::new(record.line.saturating_sub(2), fields)
    }
}

impl<'a> RowParser<&'a [u8]> {
    /// Detects the delimiter from the first line, then parses the whole upload.
    pub fn from_bytes(content: &'a [u8]) -> Result<Self> {
        if content.iter().all(u8::is_ascii_whitespace) {
            return Err(TimetableError::EmptyUpload);
        }
        let delimiter = detect_delimiter(&first_line(content));
        tracing::debug!("Detected delimiter: {:?}", delimiter);
        Self::new(content, delimiter)
    }
}

impl<R: Read> Iterator for RowParser<R> {
    type Item = Result<CanonicalRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_non_blank()?.map(|record| self.to_canonical(record)))
    }
}

/// True when `text` ends inside a quoted cell. A quote only opens a cell at
/// the start of a field, as the csv reader treats any other quote literally.
fn quote_open(text: &[u8], delimiter: u8) -> bool {
    let mut in_quotes = false;
    let mut field_start = true;
    let mut just_closed = false;

    for &b in text {
        if in_quotes {
            if b == b'"' {
                in_quotes = false;
                just_closed = true;
            }
            continue;
        }
        // `""` 緊接在收尾引號後代表跳脫的引號
        if b == b'"' && (field_start || just_closed) {
            in_quotes = true;
        }
        just_closed = false;
        field_start = b == delimiter || b == b'\n';
    }

    in_quotes
}

fn split_cells(text: &[u8], delimiter: Delimiter) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text);

    let mut row = ByteRecord::new();
    if !reader.read_byte_record(&mut row)? {
        return Ok(Vec::new());
    }
    Ok(row
        .iter()
        .map(|cell| String::from_utf8_lossy(cell).trim().to_string())
        .collect())
}
