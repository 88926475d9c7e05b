//! Parameter sweep utilities for grid search over risk parameters.
//!
//! Each configuration runs as a fully independent simulation with isolated
//! state, so the grid parallelizes across runs with Rayon; a single run
//! never parallelizes internally.

use rayon::prelude::*;
use std::collections::HashMap;

use breaklab_core::Bar;

use crate::config::RunConfig;
use crate::runner::{run_single_backtest, BacktestResult, RunError};

/// Parameter grid specification over the breakout strategy's main knobs.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    pub lookbacks: Vec<usize>,
    pub atr_mult_stops: Vec<f64>,
    pub reward_to_risks: Vec<f64>,
}

impl ParamGrid {
    /// A small default grid around the reference parameters.
    pub fn breakout_default() -> Self {
        Self {
            lookbacks: vec![10, 20, 50],
            atr_mult_stops: vec![1.5, 2.0, 3.0],
            reward_to_risks: vec![1.5, 2.0, 3.0],
        }
    }

    /// Total number of configurations in this grid.
    pub fn size(&self) -> usize {
        self.lookbacks.len() * self.atr_mult_stops.len() * self.reward_to_risks.len()
    }

    /// All configurations in the grid, derived from a base config.
    pub fn generate_configs(&self, base: &RunConfig) -> Vec<RunConfig> {
        let mut configs = Vec::with_capacity(self.size());
        for &lookback in &self.lookbacks {
            for &atr_mult_stop in &self.atr_mult_stops {
                for &reward_to_risk in &self.reward_to_risks {
                    let mut config = base.clone();
                    config.risk.lookback = lookback;
                    config.risk.atr_mult_stop = atr_mult_stop;
                    config.risk.reward_to_risk = reward_to_risk;
                    configs.push(config);
                }
            }
        }
        configs
    }
}

/// Parameter sweep executor over one pre-materialized bar series.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    parallel: bool,
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl ParamSweep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every configuration in the grid against the same bars.
    pub fn sweep(
        &self,
        bars: &[Bar],
        grid: &ParamGrid,
        base: &RunConfig,
    ) -> Result<SweepResults, RunError> {
        let configs = grid.generate_configs(base);
        tracing::info!(
            configs = configs.len(),
            parallel = self.parallel,
            "starting parameter sweep"
        );

        let results: Vec<BacktestResult> = if self.parallel {
            configs
                .par_iter()
                .map(|config| run_single_backtest(config, bars))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            configs
                .iter()
                .map(|config| run_single_backtest(config, bars))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(SweepResults::new(results))
    }
}

/// Results from a parameter sweep, addressable by run id.
#[derive(Debug)]
pub struct SweepResults {
    results: Vec<BacktestResult>,
    by_run_id: HashMap<String, usize>,
}

impl SweepResults {
    fn new(results: Vec<BacktestResult>) -> Self {
        let by_run_id = results
            .iter()
            .enumerate()
            .map(|(i, r)| (r.run_id.clone(), i))
            .collect();
        Self { results, by_run_id }
    }

    pub fn all(&self) -> &[BacktestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, run_id: &str) -> Option<&BacktestResult> {
        self.by_run_id.get(run_id).map(|&i| &self.results[i])
    }

    /// Results sorted by net P&L, best first.
    pub fn sorted_by_net_pnl(&self) -> Vec<&BacktestResult> {
        let mut sorted: Vec<_> = self.results.iter().collect();
        sorted.sort_by(|a, b| {
            b.analytics
                .summary
                .net_pnl
                .partial_cmp(&a.analytics.summary.net_pnl)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }

    pub fn best(&self) -> Option<&BacktestResult> {
        self.sorted_by_net_pnl().into_iter().next()
    }
}
