use std::path::PathBuf;

use crate::{ config::Config, debugger, error::Result };

pub mod assigner;
pub mod expander;
pub mod output;
pub mod registry;
pub mod simulator;
pub mod strategy;

use simulator::{ AdmissionSimulator, RepetitionResult };

/// Every repetition of one configuration.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// ヘッダと設定ファイル名に使うID
    pub run_id: String,
    /// 出力ファイル名 (拡張子なし)
    pub file_base: String,
    pub loads: Vec<usize>,
    pub repetitions: Vec<RepetitionResult>,
    /// 書き込めなかった場合は None
    pub result_dir: Option<PathBuf>,
}

impl SimulationResult {
    /// Mean blocking probability per load level over all repetitions.
    pub fn mean_blocking(&self) -> Vec<(usize, Option<f64>)> {
        let rows: Vec<Vec<Option<f64>>> = self
            .repetitions
            .iter()
            .map(|r| r.blocking_probabilities().into_iter().map(Some).collect())
            .collect();
        let means = output::summarize(&rows, 0, 1);

        self.loads
            .iter()
            .zip(means)
            .map(|(&load, (_, mean))| (load, mean))
            .collect()
    }
}

/// Runs every repetition and appends one `.bp`/`.it` line per repetition.
///
/// Output errors are reported and the run goes on; the results are
/// returned either way. The config snapshot is named after `run_id`.
pub fn main(config: &Config, run_id: &str) -> Result<SimulationResult> {
    let mut simulator = AdmissionSimulator::new(config)?;
    let file_base = simulator.strategy().file_base(config.network.channels);

    let result_dir = match output::init_result_dir(config) {
        Ok(dir) => {
            if let Err(err) = output::save_config(config, &dir, run_id) {
                debugger::log_alert(&format!("failed to save config: {err}"));
            }
            Some(dir)
        }
        Err(err) => {
            debugger::log_alert(&format!("failed to create {}: {err}", config.simulation.result_dir));
            None
        }
    };

    let mut repetitions = Vec::with_capacity(config.simulation.repetitions);
    for index in 0..config.simulation.repetitions {
        let result = simulator.run_repetition(index)?;
        let blocking = result.blocking_probabilities();
        debugger::log_repetition(index, &blocking, result.elapsed);

        if let Some(dir) = &result_dir {
            if let Err(err) = output::append_bp(dir, &file_base, &blocking) {
                debugger::log_alert(&format!("failed to write {file_base}.bp: {err}"));
            }
            if let Err(err) = output::append_it(dir, &file_base, result.elapsed) {
                debugger::log_alert(&format!("failed to write {file_base}.it: {err}"));
            }
        }

        repetitions.push(result);
    }

    Ok(SimulationResult {
        run_id: run_id.to_string(),
        file_base,
        loads: config.loads(),
        repetitions,
        result_dir,
    })
}
