//! Element abundance files: user input parsing and backend serialization.
//!
//! Input files hold one `<symbol> <value>` pair per line; lines starting with
//! `#` are comments. The backend reads the same layout, but requires a leading
//! comment line and values in 8-digit scientific notation.

use crate::elements::ElementTable;
use crate::error::{ChemError, ChemResult};
use std::fmt::Write as _;
use std::path::Path;

/// First line of every serialized abundance file.
pub const ABUNDANCE_HEADER: &str = "# Need this in the beginning";

/// Parse `<symbol> <value>` lines. `origin` is only used for error messages.
pub fn parse_abundance_text(text: &str, origin: &Path) -> ChemResult<(Vec<String>, Vec<f64>)> {
    let mut elements = Vec::new();
    let mut abundances = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parse_err = |what: String| ChemError::Parse {
            path: origin.to_path_buf(),
            line: idx + 1,
            what,
        };

        let mut fields = line.split_whitespace();
        let (Some(symbol), Some(value), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(parse_err(format!(
                "expected '<symbol> <value>', got '{line}'"
            )));
        };

        let value: f64 = value
            .parse()
            .map_err(|e| parse_err(format!("invalid abundance '{value}': {e}")))?;

        elements.push(symbol.to_string());
        abundances.push(value);
    }

    Ok((elements, abundances))
}

/// Load a user abundance file into a canonically ordered table.
pub fn load_abundance_file(path: &Path) -> ChemResult<ElementTable> {
    if !path.exists() {
        return Err(ChemError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let text = std::fs::read_to_string(path)?;
    let (elements, abundances) = parse_abundance_text(&text, path)?;
    ElementTable::from_parallel(&elements, &abundances)
}

/// Render parallel element/abundance sequences in the backend's input format.
pub fn abundance_string<S: AsRef<str>>(elements: &[S], abundances: &[f64]) -> ChemResult<String> {
    if elements.len() != abundances.len() {
        return Err(ChemError::LengthMismatch {
            what: "elements and abundances",
            left: elements.len(),
            right: abundances.len(),
        });
    }

    let mut out = String::with_capacity(32 * (elements.len() + 1));
    out.push_str(ABUNDANCE_HEADER);
    out.push('\n');
    for (element, abundance) in elements.iter().zip(abundances) {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{} {}", element.as_ref(), format_scientific(*abundance));
    }
    Ok(out)
}

/// Serialize a whole table.
pub fn table_string(table: &ElementTable) -> String {
    let mut out = String::with_capacity(32 * (table.len() + 1));
    out.push_str(ABUNDANCE_HEADER);
    out.push('\n');
    for (element, abundance) in table.iter() {
        let _ = writeln!(out, "{element} {}", format_scientific(abundance));
    }
    out
}

/// `1.23456789e+01` style: 8 decimals, explicit exponent sign, at least two exponent digits.
pub fn format_scientific(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value}").to_lowercase();
    }

    let raw = format!("{value:.8e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => raw,
    }
}
