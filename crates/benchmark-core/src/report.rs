//! Benchmark report assembly
//!
//! A [`Report`] is the measurement taken by one `stop()` call. It renders to
//! a fixed CRLF-separated text block, wrapped either in an HTML comment or a
//! `<pre id="bench">` element:
//!
//! ```text
//!
//!     <!-- ======== [ BENCHMARK DATA ] ========
//!     Elapsed Time: 12ms
//!     Elapsed Time: 0.012034 (micro)
//!     Memory Usage: 2.000Mb
//!      Peak Memory: 2.000Mb (or 2097152 bytes)
//!             Date: 2017-03-14 15:09:26
//!     ===================================== -->
//! ```

use crate::config::{DEFAULT_DATE_FORMAT, ReportFormats};
use crate::humanize::{readable_elapsed_time, readable_memory_size};
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::fmt::{self, Write};
use std::time::Duration;

/// Line separator used throughout the report
pub const CRLF: &str = "\r\n";

const HEADER: &str = " ======== [ BENCHMARK DATA ] ======== ";
const FOOTER: &str = "    ===================================== ";

/// How the report is wrapped for embedding in HTML output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Hidden inside `<!-- ... -->`
    #[default]
    Comment,
    /// Visible inside `<pre id="bench"> ... </pre>`
    Block,
}

impl From<bool> for DisplayMode {
    fn from(display: bool) -> Self {
        if display { DisplayMode::Block } else { DisplayMode::Comment }
    }
}

impl DisplayMode {
    pub fn is_block(self) -> bool {
        self == DisplayMode::Block
    }
}

/// One completed measurement
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Name of the registry instance that produced the report, if any
    pub name: Option<String>,
    #[serde(rename = "elapsed_seconds", serialize_with = "serialize_seconds")]
    pub elapsed: Duration,
    /// Process memory at stop time, in bytes
    pub memory_used: u64,
    /// Process peak memory at stop time, in bytes
    pub peak_memory: u64,
    pub date: NaiveDateTime,
    pub display: DisplayMode,
    #[serde(skip)]
    pub formats: ReportFormats,
}

/// Format `date` with a strftime layout, failing instead of panicking
///
/// Layouts that parse but need data a naive date lacks (`%z`, `%Z`) fail here.
pub fn try_format_date(date: &NaiveDateTime, layout: &str) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write!(out, "{}", date.format(layout))?;
    Ok(out)
}

fn serialize_seconds<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

impl Report {
    /// Elapsed time, humanized (`0ms`, `1.500s`)
    pub fn elapsed_time(&self) -> String {
        readable_elapsed_time(self.elapsed.as_secs_f64(), Some(&self.formats.time))
    }

    /// Elapsed time in seconds, unrounded
    pub fn elapsed_raw(&self) -> String {
        self.elapsed.as_secs_f64().to_string()
    }

    /// Memory used at stop time, humanized
    pub fn memory_usage(&self) -> String {
        readable_memory_size(self.memory_used, Some(&self.formats.memory))
    }

    /// Peak memory, humanized
    pub fn peak_memory_usage(&self) -> String {
        readable_memory_size(self.peak_memory, Some(&self.formats.peak))
    }

    /// Report date in the configured layout, or the default layout if it cannot be rendered
    pub fn date_string(&self) -> String {
        try_format_date(&self.date, &self.formats.date)
            .or_else(|_| try_format_date(&self.date, DEFAULT_DATE_FORMAT))
            .unwrap_or_default()
    }

    /// Render the full report text
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Structured JSON export of the measurement
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display {
            DisplayMode::Block => write!(f, "{CRLF}<pre id=\"bench\">{CRLF}")?,
            DisplayMode::Comment => write!(f, "{CRLF}    <!--")?,
        }
        write!(f, "{HEADER}{CRLF}")?;
        write!(f, "    Elapsed Time: {}{CRLF}", self.elapsed_time())?;
        write!(f, "    Elapsed Time: {} (micro){CRLF}", self.elapsed_raw())?;
        write!(f, "    Memory Usage: {}{CRLF}", self.memory_usage())?;
        write!(
            f,
            "     Peak Memory: {} (or {} bytes){CRLF}",
            self.peak_memory_usage(),
            self.peak_memory
        )?;
        write!(f, "            Date: {}{CRLF}", self.date_string())?;
        f.write_str(FOOTER)?;
        match self.display {
            DisplayMode::Block => write!(f, "{CRLF}</pre>"),
            DisplayMode::Comment => f.write_str("-->"),
        }
    }
}
