//! # Performance Monitor
//!
//! Rolling FPS/frame-time/draw-call sampler feeding adaptive-quality
//! suggestions. Sampled once per animation tick; there are no dedicated
//! timer threads.

use std::collections::VecDeque;

use web_time::Instant;

use super::rendering::lighting::LightingQuality;
use super::settings::AntiAliasing;

/// Number of frame samples kept in the rolling window.
const WINDOW: usize = 120;
/// Number of recent samples consulted for spike detection.
const SPIKE_WINDOW: usize = 10;
/// A frame this many times slower than the recent average is a spike.
const SPIKE_FACTOR: f32 = 5.0;

/// FPS at or above which performance is excellent.
const GOOD_FPS: f32 = 50.0;
/// FPS at or above which performance is acceptable.
const AVERAGE_FPS: f32 = 30.0;
/// FPS at or above which performance is merely poor (below is critical).
const POOR_FPS: f32 = 15.0;

/// Coarse performance grades derived from the rolling FPS.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PerformanceGrade {
    /// At or above [`GOOD_FPS`].
    Excellent,
    /// At or above [`AVERAGE_FPS`].
    Good,
    /// At or above [`POOR_FPS`].
    Poor,
    /// Below [`POOR_FPS`].
    Critical,
}

/// Quality adjustments suggested for the current grade.
#[derive(Clone, Debug, PartialEq)]
pub struct QualitySuggestion {
    /// Suggested lighting quality.
    pub lighting_quality: LightingQuality,
    /// Suggested shadow toggle.
    pub shadows: bool,
    /// Suggested anti-aliasing mode.
    pub anti_aliasing: AntiAliasing,
}

/// A detected frame-time spike.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spike {
    /// The offending frame time in milliseconds.
    pub frame_time_ms: f32,
    /// The rolling average it exceeded.
    pub average_ms: f32,
}

/// The rolling sampler.
#[derive(Debug)]
pub struct PerformanceMonitor {
    frame_times: VecDeque<f32>,
    last_frame: Option<Instant>,
    draw_calls: u32,
    instances: usize,
}

impl PerformanceMonitor {
    /// Creates an empty monitor.
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(WINDOW),
            last_frame: None,
            draw_calls: 0,
            instances: 0,
        }
    }

    /// Records the start of a new frame, deriving the previous frame's
    /// duration.
    pub fn record_frame(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_frame {
            let ms = now.duration_since(last).as_secs_f32() * 1000.0;
            if self.frame_times.len() == WINDOW {
                self.frame_times.pop_front();
            }
            self.frame_times.push_back(ms);
        }
        self.last_frame = Some(now);
    }

    /// Updates the renderer-reported counters for the current frame.
    pub fn record_render(&mut self, draw_calls: u32, instances: usize) {
        self.draw_calls = draw_calls;
        self.instances = instances;
    }

    /// The rolling average frame time in milliseconds.
    pub fn frame_time_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }

    /// The rolling frames-per-second figure.
    pub fn fps(&self) -> f32 {
        let frame_time = self.frame_time_ms();
        if frame_time <= 0.0 {
            return 0.0;
        }
        1000.0 / frame_time
    }

    /// Draw calls issued by the most recent frame.
    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }

    /// Mesh instances retained by the most recent frame.
    pub fn instances(&self) -> usize {
        self.instances
    }

    /// Grades the rolling FPS against the fixed thresholds.
    pub fn grade(&self) -> PerformanceGrade {
        let fps = self.fps();
        if fps >= GOOD_FPS {
            PerformanceGrade::Excellent
        } else if fps >= AVERAGE_FPS {
            PerformanceGrade::Good
        } else if fps >= POOR_FPS {
            PerformanceGrade::Poor
        } else {
            PerformanceGrade::Critical
        }
    }

    /// Maps the current grade to suggested quality settings.
    pub fn suggest_settings(&self) -> QualitySuggestion {
        match self.grade() {
            PerformanceGrade::Poor | PerformanceGrade::Critical => QualitySuggestion {
                lighting_quality: LightingQuality::Low,
                shadows: false,
                anti_aliasing: AntiAliasing::None,
            },
            PerformanceGrade::Good => QualitySuggestion {
                lighting_quality: LightingQuality::Medium,
                shadows: true,
                anti_aliasing: AntiAliasing::Fxaa,
            },
            PerformanceGrade::Excellent => QualitySuggestion {
                lighting_quality: LightingQuality::High,
                shadows: true,
                anti_aliasing: AntiAliasing::Msaa,
            },
        }
    }

    /// Checks the most recent frame against the rolling average of the last
    /// few samples.
    ///
    /// # Returns
    /// The spike details if the frame exceeded [`SPIKE_FACTOR`] times the
    /// average, `None` otherwise.
    pub fn detect_spike(&self) -> Option<Spike> {
        if self.frame_times.len() < SPIKE_WINDOW {
            return None;
        }
        let current = *self.frame_times.back()?;
        let window = self
            .frame_times
            .iter()
            .rev()
            .skip(1)
            .take(SPIKE_WINDOW - 1);
        let average = window.clone().sum::<f32>() / (SPIKE_WINDOW - 1) as f32;
        if average > 0.0 && current > average * SPIKE_FACTOR {
            Some(Spike {
                frame_time_ms: current,
                average_ms: average,
            })
        } else {
            None
        }
    }

    /// Drops all samples, e.g. after a long pause that would skew the
    /// window.
    pub fn reset(&mut self) {
        self.frame_times.clear();
        self.last_frame = None;
        self.draw_calls = 0;
        self.instances = 0;
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor_with_times(times: &[f32]) -> PerformanceMonitor {
        let mut monitor = PerformanceMonitor::new();
        for &ms in times {
            monitor.frame_times.push_back(ms);
        }
        monitor
    }

    #[test]
    fn fps_derives_from_average_frame_time() {
        let monitor = monitor_with_times(&[20.0; 30]);
        assert!((monitor.fps() - 50.0).abs() < 1e-3);
        assert_eq!(monitor.grade(), PerformanceGrade::Excellent);
    }

    #[test]
    fn grades_follow_thresholds() {
        assert_eq!(
            monitor_with_times(&[25.0; 30]).grade(),
            PerformanceGrade::Good
        );
        assert_eq!(
            monitor_with_times(&[50.0; 30]).grade(),
            PerformanceGrade::Poor
        );
        assert_eq!(
            monitor_with_times(&[100.0; 30]).grade(),
            PerformanceGrade::Critical
        );
    }

    #[test]
    fn critical_grade_suggests_low_quality() {
        let suggestion = monitor_with_times(&[100.0; 30]).suggest_settings();
        assert_eq!(suggestion.lighting_quality, LightingQuality::Low);
        assert!(!suggestion.shadows);
        assert_eq!(suggestion.anti_aliasing, AntiAliasing::None);
    }

    #[test]
    fn spike_detection_flags_outliers_only() {
        let mut steady: Vec<f32> = vec![16.0; 12];
        assert!(monitor_with_times(&steady).detect_spike().is_none());

        steady.push(160.0);
        let spike = monitor_with_times(&steady).detect_spike().unwrap();
        assert!((spike.frame_time_ms - 160.0).abs() < 1e-3);
    }

    #[test]
    fn empty_monitor_reports_zero() {
        let monitor = PerformanceMonitor::new();
        assert_eq!(monitor.fps(), 0.0);
        assert!(monitor.detect_spike().is_none());
    }
}
