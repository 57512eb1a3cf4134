//! Collections of report tables and their text serialization.
//!
//! Files ending in `.gz` are read and written gzip compressed.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

use crate::consts::{FORMATS_HEADER, REPORT_HEADER, TABLE_HEADER};
use crate::errors::{CovStratError, Result};
use crate::table::{ColumnFormat, ReportTable};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    tables: Vec<ReportTable>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: ReportTable) {
        self.tables.push(table);
    }

    pub fn tables(&self) -> &[ReportTable] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&ReportTable> {
        self.tables.iter().find(|t| t.name() == name)
    }

    /// Removes and returns the named table.
    pub fn take_table(&mut self, name: &str) -> Result<ReportTable> {
        let position = self
            .tables
            .iter()
            .position(|t| t.name() == name)
            .ok_or_else(|| CovStratError::MissingTable(name.to_string()))?;
        Ok(self.tables.remove(position))
    }

    ///
    /// Write every table, rows sorted by their cells.
    ///
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "{}\ttables={}", REPORT_HEADER, self.tables.len())?;
        for table in &self.tables {
            writeln!(
                writer,
                "{}\t{}\t{}\tcolumns={}\trows={}",
                TABLE_HEADER,
                table.name(),
                table.description(),
                table.column_count(),
                table.row_count()
            )?;
            let formats: Vec<String> = table.columns().iter().map(|c| c.format.to_string()).collect();
            writeln!(writer, "{}\t{}", FORMATS_HEADER, formats.join("\t"))?;
            let names: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
            writeln!(writer, "{}", names.join("\t"))?;

            for row in table.sorted_row_order() {
                let cells: Vec<String> = table
                    .columns()
                    .iter()
                    .zip(table.row(row))
                    .map(|(column, cell)| column.format.format_cell(cell.as_ref()))
                    .collect();
                writeln!(writer, "{}", cells.join("\t"))?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines().enumerate().map(|(i, line)| (i + 1, line));

        let (line_num, header) = next_line(&mut lines, 0)?;
        let mut header_fields = header.split('\t');
        if header_fields.next() != Some(REPORT_HEADER) {
            return Err(malformed(line_num, "missing report header"));
        }
        let n_tables = parse_count(header_fields.next(), "tables", line_num)?;

        let mut report = Report::new();
        let mut last_line = line_num;
        for _ in 0..n_tables {
            let table = read_table(&mut lines, &mut last_line)?;
            report.add_table(table);
        }
        Ok(report)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;

        if is_gzipped(path) {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            self.write_to(&mut encoder)?;
            encoder.finish()?.flush()?;
        } else {
            let mut writer = BufWriter::new(file);
            self.write_to(&mut writer)?;
            writer.flush()?;
        }
        Ok(())
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reader: Box<dyn BufRead> = if is_gzipped(path) {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Report::read_from(reader)
    }
}

fn is_gzipped(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

fn malformed(line: usize, reason: &str) -> CovStratError {
    CovStratError::MalformedReport {
        line,
        reason: reason.to_string(),
    }
}

fn next_line<I>(lines: &mut I, previous: usize) -> Result<(usize, String)>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    match lines.next() {
        Some((line_num, line)) => Ok((line_num, line?)),
        None => Err(malformed(previous + 1, "unexpected end of report")),
    }
}

fn parse_count(field: Option<&str>, name: &str, line: usize) -> Result<usize> {
    field
        .and_then(|f| f.strip_prefix(name))
        .and_then(|f| f.strip_prefix('='))
        .and_then(|f| f.parse::<usize>().ok())
        .ok_or_else(|| malformed(line, &format!("expected {}=<n>", name)))
}

fn read_table<I>(lines: &mut I, last_line: &mut usize) -> Result<ReportTable>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    let (line_num, line) = next_line(lines, *last_line)?;
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 5 || fields[0] != TABLE_HEADER {
        return Err(malformed(line_num, "expected a table header"));
    }
    let n_columns = parse_count(Some(fields[3]), "columns", line_num)?;
    let n_rows = parse_count(Some(fields[4]), "rows", line_num)?;
    let mut table = ReportTable::new(fields[1], fields[2]);

    let (line_num, formats_line) = next_line(lines, line_num)?;
    let mut format_fields = formats_line.split('\t');
    if format_fields.next() != Some(FORMATS_HEADER) {
        return Err(malformed(line_num, "expected column formats"));
    }
    let formats = format_fields
        .filter(|f| !f.is_empty())
        .map(|f| f.parse::<ColumnFormat>())
        .collect::<Result<Vec<_>>>()?;

    let (line_num, names_line) = next_line(lines, line_num)?;
    let names: Vec<&str> = if n_columns == 0 {
        Vec::new()
    } else {
        names_line.split('\t').collect()
    };
    if formats.len() != n_columns || names.len() != n_columns {
        return Err(malformed(
            line_num,
            &format!(
                "table {} declares {} columns, found {} formats and {} names",
                table.name(),
                n_columns,
                formats.len(),
                names.len()
            ),
        ));
    }
    for (name, format) in names.iter().zip(&formats) {
        table.add_column(*name, *format);
    }

    let mut line_num = line_num;
    for _ in 0..n_rows {
        let (row_line, row_text) = next_line(lines, line_num)?;
        line_num = row_line;
        let cells: Vec<&str> = row_text.split('\t').collect();
        if cells.len() != n_columns {
            return Err(malformed(
                line_num,
                &format!("expected {} cells, found {}", n_columns, cells.len()),
            ));
        }
        let row = table.add_row();
        for (column, (cell, format)) in cells.iter().zip(&formats).enumerate() {
            let value = format
                .parse_cell(cell)
                .map_err(|reason| malformed(line_num, &reason))?;
            if let Some(value) = value {
                table.set(row, column, value);
            }
        }
    }

    // blank separator line, absent at end of file is tolerated
    if let Some((blank_line, text)) = lines.next() {
        line_num = blank_line;
        if !text?.is_empty() {
            return Err(malformed(line_num, "expected a blank line after table rows"));
        }
    }
    *last_line = line_num;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Cursor;

    use crate::key::Value;

    #[fixture]
    fn report() -> Report {
        let mut table = ReportTable::new("ReferenceCounts", "ReferenceCounts");
        table.add_column("gc_content", ColumnFormat::Float(Some(1)));
        table.add_column("read_group", ColumnFormat::Text);
        table.add_column("count", ColumnFormat::Integer);
        for (gc, rg, count) in [(42.0, "rg2", 10i64), (40.0, "rg1", 3)] {
            let row = table.add_row();
            table.set(row, 0, gc);
            table.set(row, 1, rg);
            table.set(row, 2, count);
        }
        let row = table.add_row();
        table.set(row, 0, Value::Disabled);
        table.set(row, 1, Value::Unknown);

        let mut empty = ReportTable::new("Empty", "no rows");
        empty.add_column("x", ColumnFormat::Integer);

        let mut report = Report::new();
        report.add_table(table);
        report.add_table(empty);
        report
    }

    fn sorted(table: &ReportTable) -> Vec<Vec<Option<Value>>> {
        table
            .sorted_row_order()
            .into_iter()
            .map(|r| table.row(r).to_vec())
            .collect()
    }

    #[rstest]
    fn test_round_trip_in_memory(report: Report) {
        let mut buffer: Vec<u8> = Vec::new();
        report.write_to(&mut buffer).unwrap();
        let parsed = Report::read_from(Cursor::new(buffer)).unwrap();

        assert_eq!(parsed.tables().len(), 2);
        for (original, parsed) in report.tables().iter().zip(parsed.tables()) {
            assert!(original.is_same_format(parsed));
            assert_eq!(sorted(original), sorted(parsed));
        }
    }

    #[rstest]
    fn test_rows_are_written_sorted(report: Report) {
        let mut buffer: Vec<u8> = Vec::new();
        report.write_to(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let rows: Vec<&str> = text.lines().skip(4).take(3).collect();
        assert_eq!(rows, vec!["disabled\tunknown\tnull", "40.0\trg1\t3", "42.0\trg2\t10"]);
    }

    #[rstest]
    #[case("report.txt")]
    #[case("report.txt.gz")]
    fn test_round_trip_file(report: Report, #[case] file_name: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(file_name);
        report.write(&path).unwrap();
        let parsed = Report::read(&path).unwrap();
        assert_eq!(
            sorted(parsed.table("ReferenceCounts").unwrap()),
            sorted(report.table("ReferenceCounts").unwrap())
        );
    }

    #[rstest]
    fn test_malformed_report() {
        let text = "#:covstrat.report.v1\ttables=1\n#:table\tT\tT\tcolumns=1\trows=1\n#:formats\t%d\nx\nnot-a-number\n";
        let result = Report::read_from(Cursor::new(text));
        assert!(matches!(
            result,
            Err(CovStratError::MalformedReport { line: 5, .. })
        ));
    }

    #[rstest]
    fn test_missing_table(report: Report) {
        let mut report = report;
        assert!(report.take_table("ReadCounts").is_err());
        assert!(report.take_table("Empty").is_ok());
        assert_eq!(report.tables().len(), 1);
    }
}
