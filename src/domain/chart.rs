// Chart domain models
use super::rate::{Observation, TimeSeriesPoint};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Line,
    Histogram,
}

impl ChartKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Line => "LINE GRAPH",
            ChartKind::Histogram => "HISTOGRAM",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Line {
        title: String,
        points: Vec<TimeSeriesPoint>,
    },
    Histogram {
        title: String,
        bins: Vec<HistogramBin>,
    },
}

impl ChartData {
    pub fn build(kind: ChartKind, values: &[Observation]) -> Self {
        match kind {
            ChartKind::Line => ChartData::Line {
                title: "Timeseries data - line graph".to_string(),
                points: values.iter().map(Observation::to_point).collect(),
            },
            ChartKind::Histogram => {
                let raw: Vec<f64> = values.iter().map(|o| o.value).collect();
                ChartData::Histogram {
                    title: "Histogram values".to_string(),
                    // One bin per observation
                    bins: histogram(&raw, raw.len()),
                }
            }
        }
    }
}

/// Equal-width histogram over `[min, max]`. The last bin is closed on the
/// right so the maximum is counted.
pub fn histogram(values: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bin_count == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bin_count {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for value in values {
        let idx = (((value - min) / width) as usize).min(bin_count - 1);
        bins[idx].count += 1;
    }

    bins
}
