//! Chart rendering for time-series replies.
//!
//! Renders book snapshot series into PNG bytes for Discord attachments.
//! The pipeline is: zero-filtering, date resolution (with a lossy fallback
//! that is flagged as degraded), span-based tick selection, then a plotters
//! bitmap draw. Empty input never fails; it yields a placeholder image.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use plotters::prelude::*;
use thiserror::Error;
use tracing::warn;

pub const CHART_WIDTH: u32 = 900;
pub const CHART_HEIGHT: u32 = 500;

/// Fraction of the primary axis maximum used as the secondary axis top on
/// dual-axis charts, so the two series stay visually separated.
/// Presentation knob, not a statistic.
pub const DEFAULT_SECONDARY_SCALE: f64 = 0.5;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("chart generation failed: {0}")]
    Render(String),

    #[error("failed to encode chart image: {0}")]
    Encode(#[from] image::ImageError),
}

fn draw_err<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Render(err.to_string())
}

/// A finished chart. `degraded` is set when the dates under the plot were
/// fabricated rather than taken from real samples.
pub struct Chart {
    pub png: Vec<u8>,
    pub degraded: bool,
}

/// One metric series as the backend hands it to us.
pub struct SeriesInput<'a> {
    pub labels: &'a [String],
    pub timestamps: Option<&'a [i64]>,
    pub values: &'a [f64],
}

/// Indices surviving the zero filter, judged on `values`:
/// everything before the first value > 0 is dropped, and after that first
/// nonzero point any later exact zero is dropped too (a zero sample means
/// "no data that day", not a true zero).
///
/// Applying this to already-filtered output keeps every index.
pub fn surviving_indices(values: &[f64]) -> Vec<usize> {
    let Some(first) = values.iter().position(|v| *v > 0.0) else {
        return Vec::new();
    };
    (first..values.len())
        .filter(|&i| i == first || values[i] != 0.0)
        .collect()
}

fn parse_label_date(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(label, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(label, "%d %b %Y"))
        .or_else(|_| NaiveDate::parse_from_str(label, "%b %d, %Y"))
        .ok()
}

/// Resolve real dates for `len` samples.
///
/// Prefers unix timestamps, then parseable textual labels. If neither works
/// the dates are fabricated as a sequential run ending today; that result
/// is lossy and is reported as degraded so callers can flag it instead of
/// presenting it as accurate.
pub fn resolve_dates(labels: &[String], timestamps: Option<&[i64]>, len: usize) -> (Vec<NaiveDate>, bool) {
    if let Some(ts) = timestamps {
        if ts.len() == len {
            let dates: Option<Vec<NaiveDate>> = ts
                .iter()
                .map(|t| DateTime::from_timestamp(*t, 0).map(|d| d.date_naive()))
                .collect();
            if let Some(dates) = dates {
                return (dates, false);
            }
        }
    }

    if labels.len() == len {
        let parsed: Option<Vec<NaiveDate>> = labels.iter().map(|l| parse_label_date(l)).collect();
        if let Some(dates) = parsed {
            return (dates, false);
        }
    }

    warn!("No usable dates for {} samples, fabricating a sequential run", len);
    let today = Utc::now().date_naive();
    let start = today - Duration::days(len.saturating_sub(1) as i64);
    let dates = (0..len)
        .map(|i| start + Duration::days(i as i64))
        .collect();
    (dates, true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickBucket {
    Daily,
    Weekly,
    Monthly,
}

/// Tick density by total span: coarser buckets for longer windows.
pub fn tick_bucket(span_days: i64) -> TickBucket {
    if span_days > 365 {
        TickBucket::Monthly
    } else if span_days > 60 {
        TickBucket::Weekly
    } else {
        TickBucket::Daily
    }
}

fn label_count(bucket: TickBucket, span_days: i64) -> usize {
    let n = match bucket {
        TickBucket::Monthly => span_days / 30,
        TickBucket::Weekly => span_days / 7,
        TickBucket::Daily => span_days,
    };
    n.clamp(2, 10) as usize
}

fn date_format(bucket: TickBucket) -> &'static str {
    match bucket {
        TickBucket::Monthly => "%b %Y",
        TickBucket::Weekly | TickBucket::Daily => "%b %d",
    }
}

/// Top of the secondary axis for dual-axis charts: a heuristic fraction of
/// the primary axis maximum, raised if that would clip the secondary data.
pub fn secondary_axis_max(primary_max: f64, secondary_data_max: f64, scale: f64) -> f64 {
    let heuristic = primary_max * scale;
    let floor = secondary_data_max * 1.05;
    let max = heuristic.max(floor);
    if max <= 0.0 {
        1.0
    } else {
        max
    }
}

fn axis_max(values: &[f64]) -> f64 {
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        1.0
    } else {
        max * 1.05
    }
}

fn date_range(dates: &[NaiveDate]) -> (NaiveDate, NaiveDate) {
    let min = *dates.iter().min().unwrap_or(&Utc::now().date_naive());
    let mut max = *dates.iter().max().unwrap_or(&min);
    if max <= min {
        // A single sample still needs a nonempty axis range.
        max = min + Duration::days(1);
    }
    (min, max)
}

fn encode_png(buf: &[u8]) -> Result<Vec<u8>, ChartError> {
    let img = image::RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, buf.to_vec())
        .ok_or_else(|| ChartError::Render("framebuffer size mismatch".to_string()))?;
    let mut png = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut png),
        image::ImageOutputFormat::Png,
    )?;
    Ok(png)
}

/// Placeholder image stating that there is no data to plot.
///
/// The text draw is best-effort: a blank panel is still a valid
/// placeholder if font loading fails, and this path must never error out.
pub fn placeholder() -> Result<Chart, ChartError> {
    let mut buf = vec![255u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut buf, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        let _ = root.fill(&WHITE);
        let _ = root.draw(&Text::new(
            "No data available for this period",
            (CHART_WIDTH as i32 / 2 - 150, CHART_HEIGHT as i32 / 2 - 12),
            ("sans-serif", 24).into_font().color(&full_palette::GREY_600),
        ));
        let _ = root.present();
    }
    Ok(Chart {
        png: encode_png(&buf)?,
        degraded: false,
    })
}

/// Render a single-metric line chart.
pub fn render_single(title: &str, y_label: &str, input: SeriesInput) -> Result<Chart, ChartError> {
    let keep = surviving_indices(input.values);
    if keep.is_empty() {
        return placeholder();
    }

    let (all_dates, degraded) = resolve_dates(input.labels, input.timestamps, input.values.len());
    let dates: Vec<NaiveDate> = keep.iter().map(|&i| all_dates[i]).collect();
    let values: Vec<f64> = keep.iter().map(|&i| input.values[i]).collect();

    let (min_date, max_date) = date_range(&dates);
    let span = (max_date - min_date).num_days();
    let bucket = tick_bucket(span);
    let y_max = axis_max(&values);

    let mut buf = vec![255u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut buf, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(12)
            .x_label_area_size(36)
            .y_label_area_size(60)
            .build_cartesian_2d(min_date..max_date, 0f64..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_labels(label_count(bucket, span))
            .x_label_formatter(&|d| d.format(date_format(bucket)).to_string())
            .y_desc(y_label)
            .light_line_style(WHITE.mix(0.3))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(
                dates.iter().copied().zip(values.iter().copied()),
                RGBColor(52, 152, 219).stroke_width(2),
            ))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    Ok(Chart {
        png: encode_png(&buf)?,
        degraded,
    })
}

/// Render a dual-axis line chart (primary metric left, secondary right).
///
/// The secondary axis is scaled by `secondary_scale`; see
/// [`DEFAULT_SECONDARY_SCALE`]. If the secondary series does not line up
/// with the primary one, this degrades to a single-metric chart.
pub fn render_dual(
    title: &str,
    y_label: &str,
    secondary_label: &str,
    input: SeriesInput,
    secondary: &[f64],
    secondary_scale: f64,
) -> Result<Chart, ChartError> {
    if secondary.len() != input.values.len() {
        warn!(
            "Secondary series length {} does not match primary {}, plotting single axis",
            secondary.len(),
            input.values.len()
        );
        return render_single(title, y_label, input);
    }

    let keep = surviving_indices(input.values);
    if keep.is_empty() {
        return placeholder();
    }

    let (all_dates, degraded) = resolve_dates(input.labels, input.timestamps, input.values.len());
    let dates: Vec<NaiveDate> = keep.iter().map(|&i| all_dates[i]).collect();
    let values: Vec<f64> = keep.iter().map(|&i| input.values[i]).collect();
    let secondary: Vec<f64> = keep.iter().map(|&i| secondary[i]).collect();

    let (min_date, max_date) = date_range(&dates);
    let span = (max_date - min_date).num_days();
    let bucket = tick_bucket(span);
    let y_max = axis_max(&values);
    let sec_max = secondary_axis_max(
        y_max,
        secondary.iter().cloned().fold(0.0_f64, f64::max),
        secondary_scale,
    );

    let primary_color = RGBColor(52, 152, 219);
    let secondary_color = RGBColor(231, 76, 60);

    let mut buf = vec![255u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut buf, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28))
            .margin(12)
            .x_label_area_size(36)
            .y_label_area_size(60)
            .right_y_label_area_size(60)
            .build_cartesian_2d(min_date..max_date, 0f64..y_max)
            .map_err(draw_err)?
            .set_secondary_coord(min_date..max_date, 0f64..sec_max);

        chart
            .configure_mesh()
            .x_labels(label_count(bucket, span))
            .x_label_formatter(&|d| d.format(date_format(bucket)).to_string())
            .y_desc(y_label)
            .light_line_style(WHITE.mix(0.3))
            .draw()
            .map_err(draw_err)?;

        chart
            .configure_secondary_axes()
            .y_desc(secondary_label)
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(
                dates.iter().copied().zip(values.iter().copied()),
                primary_color.stroke_width(2),
            ))
            .map_err(draw_err)?
            .label(y_label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], primary_color));

        chart
            .draw_secondary_series(LineSeries::new(
                dates.iter().copied().zip(secondary.iter().copied()),
                secondary_color.stroke_width(2),
            ))
            .map_err(draw_err)?
            .label(secondary_label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], secondary_color));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    Ok(Chart {
        png: encode_png(&buf)?,
        degraded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zero_trim() {
        let keep = surviving_indices(&[0.0, 0.0, 5.0, 6.0]);
        assert_eq!(keep, vec![2, 3]);
    }

    #[test]
    fn test_interior_zero_filter() {
        let keep = surviving_indices(&[0.0, 3.0, 0.0, 4.0, 0.0]);
        assert_eq!(keep, vec![1, 3]);
    }

    #[test]
    fn test_zero_filter_idempotent() {
        let values = [0.0, 0.0, 2.0, 0.0, 3.0, 4.0, 0.0];
        let keep = surviving_indices(&values);
        let filtered: Vec<f64> = keep.iter().map(|&i| values[i]).collect();

        let keep_again = surviving_indices(&filtered);
        assert_eq!(keep_again, (0..filtered.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_all_zero_survives_nothing() {
        assert!(surviving_indices(&[0.0, 0.0, 0.0]).is_empty());
        assert!(surviving_indices(&[]).is_empty());
    }

    #[test]
    fn test_resolve_dates_from_labels() {
        let labels = vec!["2026-08-01".to_string(), "2026-08-02".to_string()];
        let (dates, degraded) = resolve_dates(&labels, None, 2);
        assert!(!degraded);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
    }

    #[test]
    fn test_resolve_dates_prefers_timestamps() {
        let labels = vec!["garbage".to_string()];
        let (dates, degraded) = resolve_dates(&labels, Some(&[1_787_961_600]), 1);
        assert!(!degraded);
        assert_eq!(dates.len(), 1);
    }

    #[test]
    fn test_resolve_dates_fabricated_fallback_is_degraded() {
        let labels = vec!["day one".to_string(), "day two".to_string()];
        let (dates, degraded) = resolve_dates(&labels, None, 2);
        assert!(degraded);
        assert_eq!(dates.len(), 2);
        assert_eq!((dates[1] - dates[0]).num_days(), 1);
    }

    #[test]
    fn test_tick_bucket_thresholds() {
        assert_eq!(tick_bucket(30), TickBucket::Daily);
        assert_eq!(tick_bucket(60), TickBucket::Daily);
        assert_eq!(tick_bucket(61), TickBucket::Weekly);
        assert_eq!(tick_bucket(365), TickBucket::Weekly);
        assert_eq!(tick_bucket(366), TickBucket::Monthly);
    }

    #[test]
    fn test_secondary_axis_max_is_fraction_of_primary() {
        let max = secondary_axis_max(100.0, 10.0, DEFAULT_SECONDARY_SCALE);
        assert_eq!(max, 50.0);
    }

    #[test]
    fn test_secondary_axis_max_never_clips_data() {
        let max = secondary_axis_max(100.0, 80.0, DEFAULT_SECONDARY_SCALE);
        assert!(max >= 80.0);
        // Flat series still gets a nonempty axis
        assert!(secondary_axis_max(0.0, 0.0, DEFAULT_SECONDARY_SCALE) > 0.0);
    }

    #[test]
    fn test_empty_input_yields_placeholder() {
        let chart = render_single(
            "Test",
            "Followers",
            SeriesInput {
                labels: &[],
                timestamps: None,
                values: &[],
            },
        )
        .unwrap();
        assert!(!chart.png.is_empty());
        assert!(!chart.degraded);
    }

    #[test]
    fn test_all_zero_input_yields_placeholder() {
        let labels = vec!["2026-08-01".to_string(), "2026-08-02".to_string()];
        let chart = render_single(
            "Test",
            "Views",
            SeriesInput {
                labels: &labels,
                timestamps: None,
                values: &[0.0, 0.0],
            },
        )
        .unwrap();
        assert!(!chart.png.is_empty());
    }

    #[test]
    fn test_dual_with_mismatched_secondary_is_handled() {
        // Mismatched lengths must not panic; empty primary means placeholder.
        let chart = render_dual(
            "Test",
            "Views",
            "Chapters",
            SeriesInput {
                labels: &[],
                timestamps: None,
                values: &[],
            },
            &[1.0, 2.0],
            DEFAULT_SECONDARY_SCALE,
        )
        .unwrap();
        assert!(!chart.png.is_empty());
    }
}
