//! Grouping use case
//!
//! Picks the assigner for the configured strategy, runs it over the roster in
//! batches and wraps the renumbered groups in a plan.

use indicatif::{ProgressBar, ProgressStyle};

use seatplan_domain::model::{Fleet, Plan, Student};
use seatplan_domain::service::{run_batches, GreedyAssigner, ProgressCallback};
use seatplan_domain::GroupAssigner;
use seatplan_planner::LlmAssigner;
use seatplan_types::{ConfigError, Result, Strategy};

use crate::config::Config;

/// Options for one grouping run
#[derive(Debug, Clone)]
pub struct GroupingOptions {
    pub strategy: Strategy,
    pub batch_size: usize,
    /// Draw a progress bar on stderr for multi-batch runs
    pub show_progress: bool,
}

impl GroupingOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            strategy: config.strategy,
            batch_size: config.batch_size,
            show_progress: false,
        }
    }

    pub fn with_strategy(mut self, strategy: Option<Strategy>) -> Self {
        if let Some(strategy) = strategy {
            self.strategy = strategy;
        }
        self
    }

    pub fn with_batch_size(mut self, batch_size: Option<usize>) -> Self {
        if let Some(batch_size) = batch_size {
            self.batch_size = batch_size;
        }
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }
}

/// Assigner for a strategy. The llm strategy needs the API key up front.
pub fn build_assigner(config: &Config, strategy: Strategy) -> Result<Box<dyn GroupAssigner>> {
    match strategy {
        Strategy::Greedy => Ok(Box::new(GreedyAssigner::new())),
        Strategy::Llm => {
            let api_key = config.api_key()?;
            let backend = config.planner_config().http_backend(&api_key)?;
            Ok(Box::new(LlmAssigner::new(backend)))
        }
        Strategy::Manual => Err(ConfigError::Invalid(
            "the manual strategy has no automatic assigner; use `seatplan session`".to_string(),
        )
        .into()),
    }
}

fn progress_bar(total_batches: usize) -> Option<(ProgressBar, ProgressCallback)> {
    let pb = ProgressBar::new(total_batches as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] batch {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    let handle = pb.clone();
    let callback: ProgressCallback = Box::new(move |done, _total| handle.set_position(done as u64));
    Some((pb, callback))
}

/// Run `assigner` over the roster and build a plan
pub fn group_with(
    assigner: &dyn GroupAssigner,
    students: &[Student],
    fleet: &Fleet,
    options: &GroupingOptions,
) -> Result<Plan> {
    let total_batches = students.len().div_ceil(options.batch_size.max(1));
    let progress = if options.show_progress && total_batches > 1 {
        progress_bar(total_batches)
    } else {
        None
    };

    let (bar, callback) = match progress {
        Some((bar, callback)) => (Some(bar), Some(callback)),
        None => (None, None),
    };

    let result = run_batches(assigner, students, fleet, options.batch_size, callback);

    if let Some(bar) = bar {
        match &result {
            Ok(_) => bar.finish_with_message("done"),
            Err(_) => bar.abandon_with_message("failed"),
        }
    }

    let groups = result?;
    let plan = Plan::new(options.strategy, groups);
    tracing::info!(
        strategy = %options.strategy,
        groups = plan.non_empty_groups().count(),
        students = plan.student_count(),
        "grouping finished"
    );
    Ok(plan)
}

/// Group the roster with the strategy from `options`
pub fn group_students(
    students: &[Student],
    fleet: &Fleet,
    config: &Config,
    options: &GroupingOptions,
) -> Result<Plan> {
    let assigner = build_assigner(config, options.strategy)?;
    group_with(assigner.as_ref(), students, fleet, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatplan_domain::model::GeoPoint;
    use seatplan_types::Error;

    fn roster(n: usize) -> Vec<Student> {
        (0..n)
            .map(|i| {
                Student::new(0, &i.to_string(), &format!("S{}", i), "addr")
                    .with_location(GeoPoint::new(52.0 + i as f64 * 0.01, 21.0))
            })
            .collect()
    }

    #[test]
    fn test_greedy_run_numbers_groups_across_batches() {
        let options = GroupingOptions::from_config(&Config::default());
        let plan = group_students(&roster(60), &Fleet::standard(), &Config::default(), &options).unwrap();

        // 25 -> 19 + 6, 25 -> 19 + 6, 10 -> 10
        let sizes: Vec<usize> = plan.groups.iter().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![19, 6, 19, 6, 10]);
        let ids: Vec<u32> = plan.groups.iter().map(|g| g.group_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(plan.student_count(), 60);
        assert_eq!(plan.strategy, Strategy::Greedy);
    }

    #[test]
    fn test_options_override_config() {
        let options = GroupingOptions::from_config(&Config::default())
            .with_strategy(Some(Strategy::Llm))
            .with_batch_size(Some(10))
            .with_strategy(None);
        assert_eq!(options.strategy, Strategy::Llm);
        assert_eq!(options.batch_size, 10);
    }

    #[test]
    fn test_llm_strategy_requires_api_key() {
        let mut config = Config::default();
        config.api_key_env = "SEATPLAN_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        let err = build_assigner(&config, Strategy::Llm).err().unwrap();
        assert!(matches!(err, Error::Config(ConfigError::MissingApiKey(_))));
    }

    #[test]
    fn test_manual_strategy_has_no_assigner() {
        let err = build_assigner(&Config::default(), Strategy::Manual).err().unwrap();
        assert!(matches!(err, Error::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_roster_gives_empty_plan() {
        let options = GroupingOptions::from_config(&Config::default());
        let plan = group_students(&[], &Fleet::standard(), &Config::default(), &options).unwrap();
        assert!(plan.groups.is_empty());
    }
}
