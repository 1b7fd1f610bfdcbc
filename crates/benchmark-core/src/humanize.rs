//! Human readable rendering of byte sizes and elapsed durations
//!
//! Both humanizers scale a raw measurement, round it to three decimals and
//! render it through a small printf-style [`FormatPattern`] such as `%.3f%s`,
//! where the numeric directive receives the value and `%s` the unit.
//! Values that need no fractional part (plain bytes, milliseconds) have their
//! `%.Nf` directive downgraded to `%d` automatically.

use crate::error::{BenchmarkError, BenchmarkResult};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Size units, in order of increasing magnitude
pub const SIZE_UNITS: [&str; 5] = ["B", "Kb", "Mb", "Gb", "Tb"];

/// Divisor between consecutive size units
pub const SIZE_MODULUS: f64 = 1024.0;

/// Decimal places kept by both humanizers
pub const ROUND_PRECISION: i32 = 3;

/// Pattern used when the caller does not supply one
pub const DEFAULT_PATTERN: &str = "%.3f%s";

/// How the numeric directive of a pattern renders its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberSpec {
    /// `%d`: integer, fractional part truncated
    Integer,
    /// `%f`: six decimals, kept even where `%.Nf` is downgraded
    Float,
    /// `%.Nf`: fixed number of decimals
    Fixed(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Number(NumberSpec),
    Unit,
}

/// Parsed printf-style pattern with one numeric directive and an optional `%s`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPattern {
    source: String,
    segments: Vec<Segment>,
}

impl FormatPattern {
    /// Parse a pattern such as `%.3f%s`, `%d %s` or `took %.1f%s`
    pub fn parse(pattern: &str) -> BenchmarkResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut numbers = 0usize;
        let mut units = 0usize;
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }

            let directive = match chars.next() {
                Some('%') => {
                    literal.push('%');
                    continue;
                }
                Some('s') => {
                    units += 1;
                    Segment::Unit
                }
                Some('d') => {
                    numbers += 1;
                    Segment::Number(NumberSpec::Integer)
                }
                Some('f') => {
                    numbers += 1;
                    Segment::Number(NumberSpec::Float)
                }
                Some('.') => {
                    let mut digits = String::new();
                    while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                        digits.push(d);
                        chars.next();
                    }
                    if chars.next() != Some('f') {
                        return Err(BenchmarkError::invalid_format(
                            pattern,
                            "precision must be followed by 'f'",
                        ));
                    }
                    let places = digits.parse::<usize>().map_err(|_| {
                        BenchmarkError::invalid_format(pattern, "missing precision digits")
                    })?;
                    numbers += 1;
                    Segment::Number(NumberSpec::Fixed(places))
                }
                Some(other) => {
                    return Err(BenchmarkError::invalid_format(
                        pattern,
                        format!("unsupported directive '%{other}'"),
                    ));
                }
                None => {
                    return Err(BenchmarkError::invalid_format(pattern, "dangling '%'"));
                }
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(directive);
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        if numbers != 1 {
            return Err(BenchmarkError::invalid_format(
                pattern,
                format!("expected exactly one numeric directive, found {numbers}"),
            ));
        }
        if units > 1 {
            return Err(BenchmarkError::invalid_format(
                pattern,
                format!("expected at most one '%s', found {units}"),
            ));
        }

        Ok(Self { source: pattern.to_string(), segments })
    }

    /// The pattern text this was parsed from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The numeric directive of this pattern
    pub fn number_spec(&self) -> NumberSpec {
        self.segments
            .iter()
            .find_map(|segment| match segment {
                Segment::Number(spec) => Some(*spec),
                _ => None,
            })
            .unwrap_or(NumberSpec::Integer)
    }

    /// Copy of this pattern with any `%.Nf` directive replaced by `%d`
    ///
    /// A bare `%f` is left as is.
    pub fn integer(&self) -> Self {
        let segments: Vec<Segment> = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Number(NumberSpec::Fixed(_)) => Segment::Number(NumberSpec::Integer),
                other => other.clone(),
            })
            .collect();
        let source = segments_to_source(&segments);
        Self { source, segments }
    }

    /// Render `value` and `unit` through the pattern
    pub fn render(&self, value: f64, unit: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + 8);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Unit => out.push_str(unit),
                Segment::Number(NumberSpec::Integer) => {
                    out.push_str(&(value.trunc() as i64).to_string())
                }
                Segment::Number(NumberSpec::Float) => out.push_str(&render_fixed(value, 6)),
                Segment::Number(NumberSpec::Fixed(places)) => {
                    out.push_str(&render_fixed(value, *places))
                }
            }
        }
        out
    }
}

// Ties round away from zero, as printf does.
fn render_fixed(value: f64, places: usize) -> String {
    let rounded = if places <= 15 { round_to(value, places as i32) } else { value };
    format!("{rounded:.places$}")
}

fn segments_to_source(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(text) => text.replace('%', "%%"),
            Segment::Unit => "%s".to_string(),
            Segment::Number(NumberSpec::Integer) => "%d".to_string(),
            Segment::Number(NumberSpec::Float) => "%f".to_string(),
            Segment::Number(NumberSpec::Fixed(places)) => format!("%.{places}f"),
        })
        .collect()
}

impl Default for FormatPattern {
    fn default() -> Self {
        Self {
            source: DEFAULT_PATTERN.to_string(),
            segments: vec![Segment::Number(NumberSpec::Fixed(3)), Segment::Unit],
        }
    }
}

impl FromStr for FormatPattern {
    type Err = BenchmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FormatPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Render a byte count as `512B`, `1.500Kb`, `2.000Mb`, ...
///
/// The value is divided by 1024 while it is at least 1024, up to the `Tb`
/// unit. When no division happened the number is rendered as an integer.
pub fn readable_memory_size(bytes: u64, pattern: Option<&FormatPattern>) -> String {
    let default_pattern;
    let pattern = match pattern {
        Some(pattern) => pattern,
        None => {
            default_pattern = FormatPattern::default();
            &default_pattern
        }
    };

    let mut size = bytes as f64;
    let mut index = 0;
    while size >= SIZE_MODULUS && index < SIZE_UNITS.len() - 1 {
        size /= SIZE_MODULUS;
        index += 1;
    }

    let value = round_to(size, ROUND_PRECISION);
    if index == 0 {
        pattern.integer().render(value, SIZE_UNITS[index])
    } else {
        pattern.render(value, SIZE_UNITS[index])
    }
}

/// Render an elapsed time given in seconds as `1.234s` or `250ms`
pub fn readable_elapsed_time(seconds: f64, pattern: Option<&FormatPattern>) -> String {
    let default_pattern;
    let pattern = match pattern {
        Some(pattern) => pattern,
        None => {
            default_pattern = FormatPattern::default();
            &default_pattern
        }
    };

    if seconds >= 1.0 {
        pattern.render(round_to(seconds, ROUND_PRECISION), "s")
    } else {
        pattern.integer().render((seconds * 1000.0).round(), "ms")
    }
}

/// [`readable_elapsed_time`] for a [`Duration`] with the default pattern
pub fn readable_duration(elapsed: Duration) -> String {
    readable_elapsed_time(elapsed.as_secs_f64(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_pattern() {
        let pattern = FormatPattern::parse("%.3f%s").unwrap();
        assert_eq!(pattern, FormatPattern::default());
        assert_eq!(pattern.number_spec(), NumberSpec::Fixed(3));
    }

    #[test]
    fn test_parse_rejects_bad_patterns() {
        for bad in ["%s", "%d%d%s", "%.3f%s%s", "%x", "abc%", "%.3d", "%.f"] {
            let err = FormatPattern::parse(bad).unwrap_err();
            assert_eq!(err.code(), "bench-B202", "pattern {bad:?} should be rejected");
        }
    }

    #[test]
    fn test_integer_downgrade() {
        let pattern = FormatPattern::parse("~%.2f %s").unwrap();
        let integer = pattern.integer();
        assert_eq!(integer.as_str(), "~%d %s");
        assert_eq!(integer.render(42.0, "B"), "~42 B");
    }

    #[test]
    fn test_percent_literal() {
        let pattern = FormatPattern::parse("%d%% of %s").unwrap();
        assert_eq!(pattern.render(50.0, "budget"), "50% of budget");
        assert_eq!(pattern.integer().as_str(), "%d%% of %s");
    }

    #[test]
    fn test_plain_f_uses_six_decimals() {
        let pattern: FormatPattern = "%f%s".parse().unwrap();
        assert_eq!(pattern.render(1.5, "Kb"), "1.500000Kb");
        assert_eq!(pattern.number_spec(), NumberSpec::Float);
    }

    #[test]
    fn test_plain_f_is_not_downgraded() {
        let pattern: FormatPattern = "%f%s".parse().unwrap();
        assert_eq!(pattern.integer(), pattern);
        assert_eq!(readable_memory_size(512, Some(&pattern)), "512.000000B");
        assert_eq!(readable_elapsed_time(0.25, Some(&pattern)), "250.000000ms");
    }

    #[test]
    fn test_fixed_rounds_ties_away_from_zero() {
        let pattern = FormatPattern::parse("%.1f%s").unwrap();
        // 1280 bytes is exactly 1.25Kb
        assert_eq!(readable_memory_size(1280, Some(&pattern)), "1.3Kb");
        assert_eq!(pattern.render(2.25, "s"), "2.3s");
        assert_eq!(pattern.render(-0.25, "s"), "-0.3s");
    }

    #[test]
    fn test_memory_size_units() {
        assert_eq!(readable_memory_size(0, None), "0B");
        assert_eq!(readable_memory_size(512, None), "512B");
        assert_eq!(readable_memory_size(1023, None), "1023B");
        assert_eq!(readable_memory_size(1024, None), "1.000Kb");
        assert_eq!(readable_memory_size(1536, None), "1.500Kb");
        assert_eq!(readable_memory_size(2 * 1024 * 1024, None), "2.000Mb");
        assert_eq!(readable_memory_size(3 * 1024u64.pow(3), None), "3.000Gb");
        assert_eq!(readable_memory_size(1024u64.pow(4), None), "1.000Tb");
    }

    #[test]
    fn test_memory_size_caps_at_terabytes() {
        assert_eq!(readable_memory_size(2048 * 1024u64.pow(4), None), "2048.000Tb");
    }

    #[test]
    fn test_memory_size_rounds_to_three_decimals() {
        // 1234567 / 1024^2 = 1.17737...
        assert_eq!(readable_memory_size(1_234_567, None), "1.177Mb");
    }

    #[test]
    fn test_memory_size_custom_pattern() {
        let pattern = FormatPattern::parse("%.1f %s").unwrap();
        assert_eq!(readable_memory_size(1536, Some(&pattern)), "1.5 Kb");
        assert_eq!(readable_memory_size(100, Some(&pattern)), "100 B");
    }

    #[test]
    fn test_elapsed_time_branches() {
        assert_eq!(readable_elapsed_time(0.0, None), "0ms");
        assert_eq!(readable_elapsed_time(0.0004, None), "0ms");
        assert_eq!(readable_elapsed_time(0.0005, None), "1ms");
        assert_eq!(readable_elapsed_time(0.25, None), "250ms");
        assert_eq!(readable_elapsed_time(0.9994, None), "999ms");
        assert_eq!(readable_elapsed_time(1.0, None), "1.000s");
        assert_eq!(readable_elapsed_time(1.5, None), "1.500s");
        assert_eq!(readable_elapsed_time(12.34567, None), "12.346s");
    }

    #[test]
    fn test_elapsed_time_custom_pattern() {
        let pattern = FormatPattern::parse("%.1f %s").unwrap();
        assert_eq!(readable_elapsed_time(2.26, Some(&pattern)), "2.3 s");
        assert_eq!(readable_elapsed_time(0.1, Some(&pattern)), "100 ms");
    }

    #[test]
    fn test_readable_duration() {
        assert_eq!(readable_duration(Duration::from_millis(1500)), "1.500s");
        assert_eq!(readable_duration(Duration::from_millis(42)), "42ms");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.2346, 3), 1.235);
        assert_eq!(round_to(-1.5, 0), -2.0);
        assert_eq!(round_to(2.0, 3), 2.0);
    }
}
