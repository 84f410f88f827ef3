//! Backend-agnostic figure descriptions of signals and beats.

use crate::signal::{BeatSet, PeakSet, TimeSeries};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub color: Color,
}

/// 0xRRGGBB
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const TRACE: Color = Color(0x1F77B4);
    pub const BEAT: Color = Color(0xB0B0B0);
    pub const AVERAGE: Color = Color(0xD62728);
    pub const PEAK: Color = Color(0xFF7F0E);

    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub color: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
    Markers(MarkerSeries),
}

impl Series {
    pub fn points(&self) -> &[[f64; 2]] {
        match self {
            Series::Line(line) => &line.points,
            Series::Markers(markers) => &markers.points,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis { label: None },
            y: Axis { label: None },
            series: Vec::new(),
        }
    }

    pub fn with_axes(mut self, x: &str, y: &str) -> Self {
        self.x.label = Some(x.into());
        self.y.label = Some(y.into());
        self
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }

    /// `(x_min, x_max, y_min, y_max)` over all finite points, or `None` when empty.
    /// Degenerate spans are widened so the ranges are never empty.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for p in self.series.iter().flat_map(|s| s.points()) {
            if !p[0].is_finite() || !p[1].is_finite() {
                continue;
            }
            bounds = Some(match bounds {
                None => (p[0], p[0], p[1], p[1]),
                Some((x0, x1, y0, y1)) => (x0.min(p[0]), x1.max(p[0]), y0.min(p[1]), y1.max(p[1])),
            });
        }
        bounds.map(|(x0, x1, y0, y1)| {
            let (x0, x1) = if x1 > x0 { (x0, x1) } else { (x0 - 0.5, x1 + 0.5) };
            let (y0, y1) = if y1 > y0 { (y0, y1) } else { (y0 - 0.5, y1 + 0.5) };
            (x0, x1, y0, y1)
        })
    }
}

pub fn decimate_points(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if points.len() <= max_points {
        return points.to_vec();
    }
    let bucket_size = points.len() as f64 / max_points as f64;
    let mut result = Vec::with_capacity(max_points);
    for i in 0..max_points {
        let start = (i as f64 * bucket_size).floor() as usize;
        if start >= points.len() {
            break;
        }
        result.push(points[start]);
    }
    result
}

/// Trace over time in seconds, with detected peaks marked when given.
pub fn figure_from_signal(
    title: &str,
    series: &TimeSeries,
    peaks: Option<&PeakSet>,
    max_points: usize,
) -> Figure {
    let dt = 1.0 / series.fs.max(1.0);
    let points: Vec<[f64; 2]> = series
        .data
        .iter()
        .enumerate()
        .map(|(i, value)| [i as f64 * dt, *value])
        .collect();
    let mut fig = Figure::new(Some(title.into())).with_axes("time (s)", "amplitude");
    fig.add_series(Series::Line(LineSeries {
        name: title.into(),
        points: decimate_points(&points, max_points),
        style: Style {
            width: 1.4,
            color: Color::TRACE,
        },
    }));
    if let Some(peaks) = peaks {
        let marks = peaks
            .indices
            .iter()
            .filter_map(|&i| series.data.get(i).map(|&v| [i as f64 * dt, v]))
            .collect();
        fig.add_series(Series::Markers(MarkerSeries {
            name: "R peaks".into(),
            points: marks,
            color: Color::PEAK,
        }));
    }
    fig
}

/// Every beat overlaid on a common time axis relative to its R peak, with the
/// average beat drawn last.
pub fn figure_from_beats(beats: &BeatSet, fs: f64) -> Figure {
    let dt = 1.0 / fs.max(1.0);
    let offset = (beats.window_len / 3) as f64 * dt;
    let to_points = |beat: &[f64]| -> Vec<[f64; 2]> {
        beat.iter()
            .enumerate()
            .map(|(i, v)| [i as f64 * dt - offset, *v])
            .collect()
    };

    let mut fig = Figure::new(Some(format!("{} beats", beats.len())))
        .with_axes("time from R (s)", "amplitude");
    for (peak, beat) in beats.peaks.iter().zip(beats.iter()) {
        fig.add_series(Series::Line(LineSeries {
            name: format!("beat@{}", peak),
            points: to_points(beat),
            style: Style {
                width: 1.0,
                color: Color::BEAT,
            },
        }));
    }
    if !beats.is_empty() {
        fig.add_series(Series::Line(LineSeries {
            name: "average".into(),
            points: to_points(&beats.average_beat()),
            style: Style {
                width: 2.5,
                color: Color::AVERAGE,
            },
        }));
    }
    fig
}
