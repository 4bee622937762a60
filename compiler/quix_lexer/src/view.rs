//! Source text queries for diagnostics.
//!
//! Both queries re-read the stream and put its position back, so they can
//! be issued between any two tokens.

use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

use quix_ir::{Location, SourceView};

use crate::Lexer;

fn trim_line_end(mut line: Vec<u8>) -> String {
    while matches!(line.last(), Some(b'\n' | b'\r')) {
        line.pop();
    }
    String::from_utf8_lossy(&line).into_owned()
}

impl<R: Read + Seek + Send> SourceView for Lexer<R> {
    fn filename(&self) -> &str {
        Lexer::filename(self)
    }

    fn line(&self, loc: Location) -> Option<u32> {
        self.locations().row(loc)
    }

    fn col(&self, loc: Location) -> Option<u32> {
        self.locations().col(loc)
    }

    fn snippet(&mut self, loc: Location) -> Option<(String, u32)> {
        let col = self.locations().col(loc)?;
        let offset = self.locations().offset(loc)?;
        // Columns count bytes, so the line starts `col - 1` bytes back.
        let line_start = offset.checked_sub(col - 1)?;
        let line = self.reread(|source, base| {
            source.seek(SeekFrom::Start(base + u64::from(line_start)))?;
            let mut line = Vec::new();
            BufReader::new(source).read_until(b'\n', &mut line)?;
            Ok(line)
        })?;
        Some((trim_line_end(line), col - 1))
    }

    fn rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, fill: char) -> Option<Vec<String>> {
        let width = x1.saturating_sub(x0) as usize;
        let lines = self.reread(|source, base| {
            source.seek(SeekFrom::Start(base))?;
            BufReader::new(source)
                .split(b'\n')
                .skip(y0 as usize)
                .take(y1.saturating_sub(y0) as usize)
                .collect::<Result<Vec<_>, _>>()
        })?;

        let mut rows: Vec<String> = lines
            .into_iter()
            .map(|line| {
                let mut row: String = trim_line_end(line)
                    .chars()
                    .skip(x0 as usize)
                    .take(width)
                    .collect();
                let short = width - row.chars().count();
                row.extend(std::iter::repeat(fill).take(short));
                row
            })
            .collect();
        rows.resize(y1.saturating_sub(y0) as usize, fill.to_string().repeat(width));
        Some(rows)
    }
}
