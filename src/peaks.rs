//! # Peak & Trough Detection
//!
//! Decides which temperature samples get a value label on the chart. Two kinds
//! of sample are flagged:
//!
//! - **Oscillation extrema**: the trend (sign of next − current) reverses at the
//!   sample and the value moved more than `threshold` since the last reversal.
//! - **Day extrema**: the lowest and highest sample of every local calendar day,
//!   flagged when the day closes regardless of the threshold.
//!
//! The scan is a single forward fold over the series. All state lives in a
//! `PeakScan` value that is moved through each step, so the function is pure
//! and reentrant.
//!
//! ## Day extrema tie-break
//! Within a day the min/max index moves only on a strict improvement, so the
//! first sample reaching an extreme value keeps it. A reversal sample whose value
//! equals the running extreme takes the index over, whether or not it passed
//! the threshold.
//!
//! No input is validated: NaN values or unordered timestamps give meaningless
//! flags but never panic.

use crate::{ExtremaFlags, Sample};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Threshold that flags every trend reversal.
pub const DEFAULT_THRESHOLD: f64 = 0.0;

/// Calendar day of a timestamp in the caller's local time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn of<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> Self {
        DayKey(timestamp.with_timezone(tz).date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Rising,
    Falling,
}

impl Direction {
    /// Direction from `current` towards `next`; `None` when flat.
    fn between(current: f64, next: f64) -> Option<Self> {
        if current > next {
            Some(Direction::Falling)
        } else if current < next {
            Some(Direction::Rising)
        } else {
            None
        }
    }
}

/// Running extremes of one local calendar day.
#[derive(Debug, Clone, Copy)]
struct DayWindow {
    key: DayKey,
    min: f64,
    min_index: usize,
    max: f64,
    max_index: usize,
}

impl DayWindow {
    fn open(key: DayKey, index: usize, value: f64) -> Self {
        DayWindow {
            key,
            min: value,
            min_index: index,
            max: value,
            max_index: index,
        }
    }

    fn observe(&mut self, index: usize, value: f64) {
        if value < self.min {
            self.min = value;
            self.min_index = index;
        }
        if value > self.max {
            self.max = value;
            self.max_index = index;
        }
    }
}

/// Scan state threaded through [`detect_peaks`].
#[derive(Debug)]
struct PeakScan {
    flags: ExtremaFlags,
    window: Option<DayWindow>,
    /// Value the next reversal magnitude is measured from.
    reference: Option<f64>,
    direction: Option<Direction>,
}

impl PeakScan {
    fn with_len(len: usize) -> Self {
        PeakScan {
            flags: vec![0; len],
            window: None,
            reference: None,
            direction: None,
        }
    }

    fn step(mut self, index: usize, value: f64, next: f64, key: DayKey, threshold: f64) -> Self {
        let same_day = self.window.as_ref().is_some_and(|w| w.key == key);
        if same_day {
            if let Some(window) = self.window.as_mut() {
                window.observe(index, value);
            }
        } else {
            self.flush_window();
            self.window = Some(DayWindow::open(key, index, value));
        }

        let Some(reference) = self.reference else {
            self.reference = Some(value);
            return self;
        };

        let local = Direction::between(value, next);
        match (self.direction, local) {
            (None, local) => {
                // Adopt the first non-flat direction
                if local.is_some() {
                    self.direction = local;
                }
            }
            (Some(running), Some(local)) if running != local => {
                if (reference - value).abs() > threshold {
                    self.flags[index] = 1;
                }
                if let Some(window) = self.window.as_mut() {
                    if value == window.max {
                        window.max_index = index;
                    }
                    if value == window.min {
                        window.min_index = index;
                    }
                }
                self.direction = None;
                self.reference = Some(value);
            }
            _ => {}
        }

        self
    }

    fn flush_window(&mut self) {
        if let Some(window) = self.window.take() {
            self.flags[window.min_index] = 1;
            self.flags[window.max_index] = 1;
        }
    }

    fn finish(mut self) -> ExtremaFlags {
        self.flush_window();
        self.flags
    }
}

/// Flag local and daily extrema of `series`.
///
/// Days are split by the calendar date of each timestamp in `tz`. The returned
/// flags are index-aligned with `series`.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use forecast_chart_lib::{peaks::detect_peaks, Sample};
///
/// let start = Utc.with_ymd_and_hms(2024, 6, 21, 6, 0, 0).unwrap();
/// let series: Vec<Sample> = [1.0, 2.0, 3.0, 4.0, 5.0]
///     .iter()
///     .enumerate()
///     .map(|(i, v)| Sample::new(start + Duration::hours(i as i64), *v))
///     .collect();
///
/// assert_eq!(detect_peaks(&series, 0.0, &Utc), vec![1, 0, 0, 0, 1]);
/// ```
pub fn detect_peaks<Tz: TimeZone>(series: &[Sample], threshold: f64, tz: &Tz) -> ExtremaFlags {
    series
        .iter()
        .enumerate()
        .fold(PeakScan::with_len(series.len()), |scan, (index, sample)| {
            // The last sample compares to itself and reads as flat
            let next = series.get(index + 1).map_or(sample.value, |s| s.value);
            let key = DayKey::of(&sample.timestamp, tz);
            scan.step(index, sample.value, next, key, threshold)
        })
        .finish()
}

/// [`detect_peaks`] with [`DEFAULT_THRESHOLD`].
pub fn detect_peaks_default<Tz: TimeZone>(series: &[Sample], tz: &Tz) -> ExtremaFlags {
    detect_peaks(series, DEFAULT_THRESHOLD, tz)
}
