use anyhow::{Context, Result};
use std::path::Path;

/// Parse floating point samples separated by newlines, commas or whitespace.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_f64_series(text: &str) -> Result<Vec<f64>> {
    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        for token in trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let val: f64 = token
                .parse()
                .with_context(|| format!("line {} is not f64: {}", idx + 1, token))?;
            out.push(val);
        }
    }
    if out.is_empty() {
        anyhow::bail!("no numeric samples found");
    }
    Ok(out)
}

/// Read a sample series from disk.
pub fn read_f64_series(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_f64_series(&text)
}

/// One sample per line, full precision.
pub fn format_f64_series(samples: &[f64]) -> String {
    let mut out = String::with_capacity(samples.len() * 20);
    for v in samples {
        out.push_str(&v.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn accepts_mixed_separators_and_comments() {
        let text = "# lead II\n0.1, 0.2\n\n0.3 0.4\t0.5\n-1e-3\n";
        let samples = parse_f64_series(text).expect("parse");
        assert_eq!(samples, vec![0.1, 0.2, 0.3, 0.4, 0.5, -0.001]);
    }

    #[test]
    fn reports_offending_line() {
        let err = parse_f64_series("1.0\n2.0\nabc\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 3"));
        assert!(parse_f64_series("# only a comment\n").is_err());
    }

    #[test]
    fn formatted_series_reads_back() {
        let samples = vec![0.25, -3.5, 1.0 / 3.0];
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(format_f64_series(&samples).as_bytes())
            .expect("write");
        assert_eq!(read_f64_series(file.path()).expect("read"), samples);
    }
}
