//! Parsers for external command output
//!
//! All ad-hoc string splitting lives here. Each parser takes the raw stdout
//! of one query and returns a structured value or a `ParseError`; callers
//! decide how to degrade.

use crate::domain::health::whole_percent;
use crate::domain::ParseError;
use std::collections::HashMap;

/// Disk size and free space in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskUsage {
    pub size_bytes: u64,
    pub free_bytes: u64,
}

impl DiskUsage {
    pub fn used_bytes(&self) -> u64 {
        self.size_bytes.saturating_sub(self.free_bytes)
    }

    pub fn used_pct(&self) -> u32 {
        whole_percent(self.used_bytes(), self.size_bytes)
    }
}

/// Shape of the platform disk report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskReportFormat {
    /// `Size FreeSpace` table: header, dashes, values (bytes)
    WindowsTable,
    /// `df -kP` report: header, one data row (1K blocks)
    PosixDf,
}

impl DiskReportFormat {
    pub fn parse(&self, output: &str) -> Result<DiskUsage, ParseError> {
        match self {
            DiskReportFormat::WindowsTable => parse_windows_disk_report(output),
            DiskReportFormat::PosixDf => parse_df_report(output),
        }
    }
}

fn non_empty_lines(output: &str) -> Vec<&str> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

fn parse_u64(field: &str) -> Result<u64, ParseError> {
    field
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidNumber(field.to_string()))
}

/// Parse the three-row Windows disk table
///
/// ```text
/// Size          FreeSpace
/// ----          ---------
/// 1021821579264 863185633280
/// ```
pub fn parse_windows_disk_report(output: &str) -> Result<DiskUsage, ParseError> {
    let lines = non_empty_lines(output);
    if lines.is_empty() {
        return Err(ParseError::Empty);
    }
    if lines.len() < 3 {
        return Err(ParseError::MissingRow {
            expected: 3,
            found: lines.len(),
        });
    }
    if !lines[0].contains("Size") {
        return Err(ParseError::UnexpectedHeader(lines[0].to_string()));
    }

    let fields: Vec<&str> = lines[2].split_whitespace().collect();
    if fields.len() < 2 {
        return Err(ParseError::MissingColumn {
            expected: 2,
            found: fields.len(),
        });
    }

    Ok(DiskUsage {
        size_bytes: parse_u64(fields[0])?,
        free_bytes: parse_u64(fields[1])?,
    })
}

/// Parse a POSIX `df -kP` report (second row: fs, blocks, used, available, ...)
pub fn parse_df_report(output: &str) -> Result<DiskUsage, ParseError> {
    let lines = non_empty_lines(output);
    if lines.is_empty() {
        return Err(ParseError::Empty);
    }
    if lines.len() < 2 {
        return Err(ParseError::MissingRow {
            expected: 2,
            found: lines.len(),
        });
    }

    let fields: Vec<&str> = lines[1].split_whitespace().collect();
    if fields.len() < 4 {
        return Err(ParseError::MissingColumn {
            expected: 4,
            found: fields.len(),
        });
    }

    let blocks = parse_u64(fields[1])?;
    let available = parse_u64(fields[3])?;

    Ok(DiskUsage {
        size_bytes: blocks.saturating_mul(1024),
        free_bytes: available.saturating_mul(1024),
    })
}

/// `key: value` report with every missing key reading as 0
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyValueReport {
    values: HashMap<String, u64>,
}

impl KeyValueReport {
    pub fn get(&self, key: &str) -> u64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse `key: value` lines (`/proc/meminfo`, PowerShell `Format-List`)
///
/// The value is the first whitespace token, so units like `kB` are dropped.
/// Lines without a colon or with a non-numeric value are skipped.
pub fn parse_key_value_lines(output: &str) -> KeyValueReport {
    let values = output
        .lines()
        .filter_map(|line| {
            let (key, rest) = line.split_once(':')?;
            let key = key.trim();
            let token = rest.split_whitespace().next()?;
            if key.is_empty() {
                return None;
            }
            let value = token
                .parse::<u64>()
                .ok()
                .or_else(|| token.parse::<f64>().ok().map(|v| v.max(0.0) as u64))?;
            Some((key.to_string(), value))
        })
        .collect();

    KeyValueReport { values }
}

/// Parse a single numeric reading (first non-empty line)
///
/// Accepts a decimal comma, as printed by localized PowerShell.
pub fn parse_numeric_output(output: &str) -> Result<f64, ParseError> {
    let line = non_empty_lines(output)
        .into_iter()
        .next()
        .ok_or(ParseError::Empty)?;

    line.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber(line.to_string()))
}
