//! Read access to the source text behind a set of locations.
//!
//! Implemented by the lexer, which owns both the stream and the location
//! table. Diagnostics rendering is the main consumer.

use crate::Location;

pub trait SourceView {
    /// Name the source was opened under.
    fn filename(&self) -> &str;

    /// One-based row of `loc`, `None` when unknown.
    fn line(&self, loc: Location) -> Option<u32>;

    /// One-based column of `loc`, `None` when unknown.
    fn col(&self, loc: Location) -> Option<u32>;

    /// The full source line holding `loc` and the zero-based column of
    /// `loc` within it.
    fn snippet(&mut self, loc: Location) -> Option<(String, u32)>;

    /// Zero-based rows `y0..y1` clipped to columns `x0..x1`. Every returned
    /// row is exactly `x1 - x0` characters, padded with `fill`. `None` if
    /// the stream could not be re-read.
    fn rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, fill: char) -> Option<Vec<String>>;
}
