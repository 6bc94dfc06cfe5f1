use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::info;

/// Named steps of the two conversion pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ReadInput,
    Decode,
    Normalize,
    EstimateDepth,
    BuildVolume,
    ExtractSurface,
    ParsePrompt,
    GenerateShape,
    Export,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ReadInput => "read_input",
            Stage::Decode => "decode",
            Stage::Normalize => "normalize",
            Stage::EstimateDepth => "estimate_depth",
            Stage::BuildVolume => "build_volume",
            Stage::ExtractSurface => "extract_surface",
            Stage::ParsePrompt => "parse_prompt",
            Stage::GenerateShape => "generate_shape",
            Stage::Export => "export",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct StepTiming {
    pub stage: Stage,
    pub duration: Duration,
}

#[derive(Debug, Default, Clone)]
pub struct PipelineTimings {
    steps: Vec<StepTiming>,
    stage_map: HashMap<Stage, Duration>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, stage: Stage, duration: Duration) {
        self.steps.push(StepTiming { stage, duration });
        *self.stage_map.entry(stage).or_insert(Duration::ZERO) += duration;
    }

    /// Runs `f`, recording its wall time under `stage`.
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let timer = Timer::start(stage);
        let out = f();
        let (stage, duration) = timer.stop();
        self.add_step(stage, duration);
        out
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    pub fn get_step(&self, stage: Stage) -> Option<Duration> {
        self.stage_map.get(&stage).copied()
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    pub fn log_summary(&self) {
        let total = self.total_duration();
        for step in &self.steps {
            let percentage = if total.as_secs_f64() > 0.0 {
                (step.duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            } else {
                0.0
            };
            info!(
                stage = %step.stage,
                "{:>10.3}ms ({:>5.1}%)",
                step.duration.as_secs_f64() * 1000.0,
                percentage
            );
        }
        info!("total {:.3}ms", total.as_secs_f64() * 1000.0);
    }
}

pub struct Timer {
    start: Instant,
    stage: Stage,
}

impl Timer {
    pub fn start(stage: Stage) -> Self {
        Self {
            start: Instant::now(),
            stage,
        }
    }

    pub fn stop(self) -> (Stage, Duration) {
        (self.stage, self.start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_stage_accumulates() {
        let mut timings = PipelineTimings::new();
        timings.add_step(Stage::Normalize, Duration::from_millis(2));
        timings.add_step(Stage::EstimateDepth, Duration::from_millis(3));
        timings.add_step(Stage::Normalize, Duration::from_millis(5));

        assert_eq!(timings.steps().len(), 3);
        assert_eq!(timings.get_step(Stage::Normalize), Some(Duration::from_millis(7)));
        assert_eq!(timings.get_step(Stage::Export), None);
        assert_eq!(timings.total_duration(), Duration::from_millis(10));
    }

    #[test]
    fn test_time_returns_closure_value() {
        let mut timings = PipelineTimings::new();
        let value = timings.time(Stage::BuildVolume, || 42);
        assert_eq!(value, 42);
        assert!(timings.get_step(Stage::BuildVolume).is_some());
    }
}
