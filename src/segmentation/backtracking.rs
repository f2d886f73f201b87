use super::engine::SegmentationEngine;
use super::types::{
    BacktrackingAnalytics, SegmentationResult, StrategyAnalytics, ThresholdObjective,
    ThresholdStrategy, TrajectoryPoint,
};

pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
pub const INITIAL_THRESHOLD: u8 = 128;
pub const INITIAL_STEP: u8 = 64;

/// Whether the search should keep iterating after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Converged,
}

/// Mutable state of the hill-climb.
///
/// Each call to [`SearchState::step`] performs exactly one iteration, so a
/// single move can be tested without running the whole loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub current_threshold: u8,
    pub step: u8,
    pub best_threshold: u8,
    pub best_contrast: f64,
    pub trajectory: Vec<TrajectoryPoint>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            current_threshold: INITIAL_THRESHOLD,
            step: INITIAL_STEP,
            best_threshold: INITIAL_THRESHOLD,
            best_contrast: 0.0,
            trajectory: Vec::new(),
        }
    }
}

impl SearchState {
    /// Record the current threshold, then move up, move down, or halve the step.
    ///
    /// The higher candidate wins only if it beats both the current contrast
    /// and the lower candidate; the lower candidate only has to beat the
    /// current contrast. Returns `Converged` once the step has collapsed to 0,
    /// after recording that final point.
    pub fn step<O: ThresholdObjective + ?Sized>(&mut self, objective: &O) -> StepOutcome {
        let current = self.current_threshold;
        let contrast = objective.contrast(current);
        let metrics = objective.metrics(current);
        self.trajectory.push(TrajectoryPoint {
            threshold: current,
            contrast,
            metrics,
        });

        if contrast > self.best_contrast {
            self.best_contrast = contrast;
            self.best_threshold = current;
        }

        if self.step < 1 {
            return StepOutcome::Converged;
        }

        let higher = current.saturating_add(self.step);
        let lower = current.saturating_sub(self.step);
        let higher_contrast = objective.contrast(higher);
        let lower_contrast = objective.contrast(lower);

        if higher_contrast > contrast && higher_contrast > lower_contrast {
            tracing::debug!("t={} -> {} (up, step={})", current, higher, self.step);
            self.current_threshold = higher;
        } else if lower_contrast > contrast {
            tracing::debug!("t={} -> {} (down, step={})", current, lower, self.step);
            self.current_threshold = lower;
        } else {
            self.step /= 2;
            tracing::debug!("t={} stays, step halved to {}", current, self.step);
        }

        StepOutcome::Continue
    }

    pub fn into_analytics(self) -> BacktrackingAnalytics {
        BacktrackingAnalytics {
            trajectory: self.trajectory,
            best_threshold: self.best_threshold,
            best_contrast: self.best_contrast,
        }
    }
}

/// Greedy local search over thresholds with a shrinking step.
///
/// Starts at 128 with step 64. It can settle on a local maximum when the
/// contrast curve has several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacktrackingSearch {
    max_iterations: usize,
}

impl Default for BacktrackingSearch {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

impl BacktrackingSearch {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Run the search to convergence or until the iteration budget is spent.
    pub fn search<O: ThresholdObjective + ?Sized>(&self, objective: &O) -> BacktrackingAnalytics {
        let _span = tracing::debug_span!("backtracking_search").entered();

        let mut state = SearchState::default();
        for _ in 0..self.max_iterations {
            if state.step(objective) == StepOutcome::Converged {
                break;
            }
        }

        tracing::debug!(
            "backtracking finished after {} iterations: best t={} contrast={:.4}",
            state.trajectory.len(),
            state.best_threshold,
            state.best_contrast
        );

        state.into_analytics()
    }
}

impl ThresholdStrategy for BacktrackingSearch {
    fn name(&self) -> &'static str {
        "backtracking"
    }

    fn segment(&self, engine: &SegmentationEngine) -> SegmentationResult {
        let analytics = self.search(engine);
        let threshold = analytics.best_threshold;

        SegmentationResult {
            strategy: self.name(),
            binary: engine.raster().binarize(threshold),
            threshold,
            analytics: StrategyAnalytics::Backtracking(analytics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::region::RegionMetrics;

    /// Contrast given by a closure; metrics are irrelevant for search moves.
    struct Curve<F: Fn(u8) -> f64>(F);

    impl<F: Fn(u8) -> f64> ThresholdObjective for Curve<F> {
        fn contrast(&self, threshold: u8) -> f64 {
            (self.0)(threshold)
        }

        fn metrics(&self, _threshold: u8) -> RegionMetrics {
            RegionMetrics {
                foreground_ratio: 0.5,
                background_ratio: 0.5,
                foreground_homogeneity: 1.0,
                background_homogeneity: 1.0,
                edge_strength: 0.0,
            }
        }
    }

    fn peak_at(center: u8) -> Curve<impl Fn(u8) -> f64> {
        Curve(move |t: u8| 1000.0 - (t as f64 - center as f64).abs())
    }

    #[test]
    fn single_step_moves_up_toward_peak() {
        let mut state = SearchState::default();
        let outcome = state.step(&peak_at(200));
        assert_eq!(outcome, StepOutcome::Continue);
        assert_eq!(state.current_threshold, 192);
        assert_eq!(state.step, 64);
        assert_eq!(state.trajectory.len(), 1);
        assert_eq!(state.trajectory[0].threshold, 128);
    }

    #[test]
    fn single_step_moves_down_toward_peak() {
        let mut state = SearchState::default();
        state.step(&peak_at(30));
        assert_eq!(state.current_threshold, 64);
    }

    #[test]
    fn step_halves_when_no_neighbour_improves() {
        let mut state = SearchState::default();
        state.step(&peak_at(128));
        assert_eq!(state.current_threshold, 128);
        assert_eq!(state.step, 32);
    }

    #[test]
    fn tied_candidates_fall_through_to_lower() {
        // Symmetric around 128: both neighbours equal and better than current.
        let valley = Curve(|t: u8| (t as f64 - 128.0).abs());
        let mut state = SearchState::default();
        state.step(&valley);
        // Higher must beat lower strictly, so the tie falls through to lower.
        assert_eq!(state.current_threshold, 64);
    }

    #[test]
    fn candidates_clamp_to_range() {
        let mut state = SearchState {
            current_threshold: 250,
            step: 16,
            ..SearchState::default()
        };
        let rising = Curve(|t: u8| t as f64);
        state.step(&rising);
        assert_eq!(state.current_threshold, 255);

        let mut state = SearchState {
            current_threshold: 5,
            step: 16,
            ..SearchState::default()
        };
        let falling = Curve(|t: u8| 255.0 - t as f64);
        state.step(&falling);
        assert_eq!(state.current_threshold, 0);
    }

    #[test]
    fn converges_on_unimodal_curve() {
        let analytics = BacktrackingSearch::default().search(&peak_at(77));
        assert_eq!(analytics.best_threshold, 77);
        assert_eq!(analytics.final_threshold(), Some(77));
    }

    #[test]
    fn flat_curve_keeps_initial_best_and_stops_after_step_collapse() {
        let analytics = BacktrackingSearch::default().search(&Curve(|_: u8| 0.0));
        // Step 64 halves seven times to 0, then one more recorded iteration.
        assert_eq!(analytics.trajectory.len(), 8);
        assert!(analytics.thresholds().all(|t| t == INITIAL_THRESHOLD));
        assert_eq!(analytics.best_threshold, INITIAL_THRESHOLD);
        assert_eq!(analytics.best_contrast, 0.0);
    }

    #[test]
    fn iteration_budget_bounds_trajectory() {
        let analytics = BacktrackingSearch::new(3).search(&peak_at(10));
        assert_eq!(analytics.trajectory.len(), 3);

        let none = BacktrackingSearch::new(0).search(&peak_at(10));
        assert!(none.trajectory.is_empty());
        assert_eq!(none.final_threshold(), None);
        assert_eq!(none.best_threshold, INITIAL_THRESHOLD);
    }

    #[test]
    fn best_contrast_is_trajectory_maximum() {
        let bumpy = Curve(|t: u8| ((t as f64) / 9.0).sin() + (t as f64) / 300.0 + 2.0);
        let analytics = BacktrackingSearch::default().search(&bumpy);
        let max = analytics.contrasts().fold(f64::MIN, f64::max);
        assert_eq!(analytics.best_contrast, max);
        let first_max = analytics
            .trajectory
            .iter()
            .find(|p| p.contrast == max)
            .map(|p| p.threshold);
        assert_eq!(Some(analytics.best_threshold), first_max);
    }
}
