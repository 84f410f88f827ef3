use crate::signal::TimeSeries;
use anyhow::Result;
use std::path::Path;

/// Load the specified signal (lead) from a WFDB header/data pair in physical units.
pub fn load_wfdb_lead(header_path: &Path, lead: usize) -> Result<TimeSeries> {
    if !header_path.exists() {
        anyhow::bail!("WFDB header {} does not exist", header_path.display());
    }
    let (header, signals) = wfdb_rust::parse_wfdb(header_path);
    if lead >= signals.len() {
        anyhow::bail!(
            "WFDB record contains {} signals, but lead {} was requested",
            signals.len(),
            lead
        );
    }
    let spec = &header.signal_specs[lead];
    let gain = spec.adc_gain.unwrap_or(1.0) as f64;
    let baseline = spec.baseline.or(spec.adc_zero).unwrap_or(0) as f64;
    let fs = header
        .record
        .sampling_frequency
        .map(|f| f as f64)
        .unwrap_or(250.0);
    let data = adc_to_physical(signals[lead].iter().map(|&s| s as f64), gain, baseline);
    Ok(TimeSeries { fs, data })
}

/// Convert raw ADC units to physical units; a zero gain is treated as 1.
pub fn adc_to_physical(raw: impl IntoIterator<Item = f64>, gain: f64, baseline: f64) -> Vec<f64> {
    let gain = if gain == 0.0 { 1.0 } else { gain };
    raw.into_iter().map(|s| (s - baseline) / gain).collect()
}
