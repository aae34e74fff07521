//! Contour metrics from the external `imodinfo` tool.
//!
//! This module shells out to `imodinfo` and scrapes its text report.  It is a
//! consumer of model files on disk and has no dependency on the binary codec.
//!
//! # Ellipse report (`imodinfo -e -o <object> <file>`)
//!
//! ```text
//! <preamble lines, ignored>
//! <header line containing "semi-major">
//! <contour> <f> <f> <f> <semi-major> <semi-minor> <eccentricity> <angle> ...
//! ...
//! Mean ...
//! ```
//!
//! Contour numbers are 1-based and increasing.  The tool silently omits
//! contours it cannot fit; a jump in numbering, a `Mean` line before all
//! contours were listed, or the end of input leaves the missing rows filled
//! with NaN.  Rows beyond the expected count are ignored.
//!
//! # Verbose report (`imodinfo -v -o <object> <file>`)
//!
//! Each `CONTOUR` line opens a new row; the keyed lines that follow fill its
//! columns (see [`STATS_COLUMN_NAMES`]).  `Total volume inside mesh` and
//! `Total mesh surface area` lines give whole-object values in nm³ / nm²,
//! converted to µm³ / µm².

use log::debug;
use std::io;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

pub const IMODINFO: &str = "imodinfo";

pub const ELLIPSE_COLUMN_NAMES: [&str; 5] =
    ["semi_major", "semi_minor", "axis_ratio", "eccentricity", "long_angle"];

pub const STATS_COLUMN_NAMES: [&str; 13] = [
    "points",
    "closed_length",
    "open_length",
    "area",
    "centroid_x",
    "centroid_y",
    "centroid_z",
    "circularity",
    "orientation",
    "ellipse",
    "length",
    "width",
    "aspect_ratio",
];

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Failed to run {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("{program} failed ({status}): {stderr}")]
    ToolFailed { program: String, status: String, stderr: String },
    #[error("Line {line}: cannot read {field} from {text:?}")]
    Parse { line: usize, field: &'static str, text: String },
    #[error("Report lists contour {found} but the object has {expected}")]
    TooManyContours { expected: usize, found: usize },
}

/// Per-contour ellipse fit, one row per contour in contour order.
#[derive(Debug, Clone)]
pub struct EllipseTable {
    pub rows: Vec<[f64; 5]>,
}

impl EllipseTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a 1-based contour number.
    pub fn row(&self, contour: usize) -> Option<&[f64; 5]> {
        contour.checked_sub(1).and_then(|i| self.rows.get(i))
    }

    /// Whether the tool skipped this contour.
    pub fn is_missing(&self, contour: usize) -> bool {
        self.row(contour).map_or(true, |r| r.iter().all(|v| v.is_nan()))
    }
}

/// Per-contour statistics plus whole-object mesh totals.
#[derive(Debug, Clone)]
pub struct StatsReport {
    pub rows:         Vec<[f64; 13]>,
    /// µm³
    pub volume:       Option<f64>,
    /// µm²
    pub surface_area: Option<f64>,
}

// ── Running the tool ─────────────────────────────────────────────────────────

/// Ellipse metrics for every contour of the object at `object_index`
/// (0-based), which has `expected` contours.
pub fn fetch_contour_metrics(
    file:         &Path,
    object_index: usize,
    expected:     usize,
) -> Result<EllipseTable, MetricsError> {
    let text = run_imodinfo("-e", file, object_index)?;
    parse_ellipse_report(&text, expected)
}

/// Verbose per-contour statistics for the object at `object_index`.
pub fn fetch_contour_stats(
    file:         &Path,
    object_index: usize,
    expected:     usize,
) -> Result<StatsReport, MetricsError> {
    let text = run_imodinfo("-v", file, object_index)?;
    parse_verbose_report(&text, expected)
}

fn run_imodinfo(flag: &str, file: &Path, object_index: usize) -> Result<String, MetricsError> {
    let object = (object_index + 1).to_string();
    debug!("running {IMODINFO} {flag} -o {object} {}", file.display());
    let output = Command::new(IMODINFO)
        .arg(flag)
        .arg("-o")
        .arg(&object)
        .arg(file)
        .output()
        .map_err(|source| MetricsError::Spawn { program: IMODINFO.into(), source })?;
    if !output.status.success() {
        return Err(MetricsError::ToolFailed {
            program: IMODINFO.into(),
            status:  output.status.to_string(),
            stderr:  String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// ── Parsing ──────────────────────────────────────────────────────────────────

struct Fields<'a> {
    line:  usize,
    text:  &'a str,
    words: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn new(line: usize, text: &'a str) -> Self {
        Self { line, text, words: text.split_whitespace().collect() }
    }

    fn err(&self, field: &'static str) -> MetricsError {
        MetricsError::Parse { line: self.line, field, text: self.text.to_owned() }
    }

    fn word(&self, i: usize, field: &'static str) -> Result<&'a str, MetricsError> {
        self.words.get(i).copied().ok_or_else(|| self.err(field))
    }

    fn number(&self, i: usize, field: &'static str) -> Result<f64, MetricsError> {
        self.word(i, field)?
            .trim_matches(|c| c == '(' || c == ')' || c == ',')
            .parse()
            .map_err(|_| self.err(field))
    }
}

pub fn parse_ellipse_report(text: &str, expected: usize) -> Result<EllipseTable, MetricsError> {
    let mut rows: Vec<[f64; 5]> = Vec::with_capacity(expected);
    let mut in_data = false;

    for (i, line) in text.lines().enumerate() {
        if !in_data {
            in_data = line.contains("semi-major");
            continue;
        }
        if rows.len() >= expected {
            break;
        }
        let f = Fields::new(i + 1, line);
        let Some(&first) = f.words.first() else { continue };
        if first == "Mean" {
            break;
        }
        let contour: usize = first.parse().map_err(|_| f.err("contour number"))?;
        if contour <= rows.len() {
            return Err(f.err("contour number"));
        }
        while rows.len() + 1 < contour && rows.len() < expected {
            rows.push([f64::NAN; 5]);
        }
        if rows.len() < expected {
            let major = f.number(4, "semi-major axis")?;
            let minor = f.number(5, "semi-minor axis")?;
            rows.push([
                major,
                minor,
                major / minor,
                f.number(6, "eccentricity")?,
                f.number(7, "long angle")?,
            ]);
        }
    }

    rows.resize(expected, [f64::NAN; 5]);
    Ok(EllipseTable { rows })
}

pub fn parse_verbose_report(text: &str, expected: usize) -> Result<StatsReport, MetricsError> {
    let mut rows = vec![[f64::NAN; 13]; expected];
    let mut current: Option<usize> = None;
    let mut volume = None;
    let mut surface_area = None;

    for (i, line) in text.lines().enumerate() {
        let f = Fields::new(i + 1, line);

        if line.contains("Total volume inside mesh") {
            volume = Some(f.number(5, "mesh volume")? / 1000f64.powi(3));
            continue;
        }
        if line.contains("Total mesh surface area") {
            surface_area = Some(f.number(5, "mesh surface area")? / 1000f64.powi(2));
            continue;
        }
        if line.contains("CONTOUR") {
            let next = current.map_or(0, |c| c + 1);
            if next >= expected {
                return Err(MetricsError::TooManyContours { expected, found: next + 1 });
            }
            rows[next][0] = f.number(2, "point count")?;
            current = Some(next);
            continue;
        }
        // Keyed lines before the first CONTOUR belong to no row.
        let Some(c) = current else { continue };
        let row = &mut rows[c];
        if line.contains("Closed/Open length") {
            row[1] = f.number(3, "closed length")?;
            row[2] = f.number(5, "open length")?;
        } else if line.contains("Enclosed Area") {
            row[3] = f.number(3, "area")?;
        } else if line.contains("Center of Mass") {
            row[4] = f.number(4, "centroid x")?;
            row[5] = f.number(5, "centroid y")?;
            row[6] = f.number(6, "centroid z")?;
        } else if line.contains("Circle") {
            row[7] = f.number(2, "circularity")?;
        } else if line.contains("Orientation") {
            row[8] = f.number(2, "orientation")?;
        } else if line.contains("Ellipse") {
            row[9] = f.number(2, "ellipse")?;
        } else if line.contains("Length X Width") {
            row[10] = f.number(4, "length")?;
            row[11] = f.number(6, "width")?;
        } else if line.contains("Aspect Ratio") {
            row[12] = f.number(3, "aspect ratio")?;
        }
    }

    Ok(StatsReport { rows, volume, surface_area })
}
