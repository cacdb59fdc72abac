/*!
Summaries of autoplay runs.

[`AutoplayResults`] keeps the output of every run. Its [`Display`]
implementation renders one row per policy, averaged over that policy's runs,
in the selected [`Format`].
*/

use std::{fmt::Display, num::NonZeroUsize};

use crate::{resources::Amount, state::GameState};

/// Floating point precision of results data.
pub const FLOAT_PRECISION_DIGITS: usize = 2;

/// Output of a single autoplay run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub policy: String,
    pub seed: u64,
    pub cycles: usize,
    pub final_state: GameState,
    /// Policy actions which took effect.
    pub applied: usize,
    pub rejected: usize,
    pub ignored: usize,
    /// First cycle after which every tutorial step was complete.
    pub tutorial_finished_at: Option<u64>,
}

/// Averages over every run of one policy.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicySummary {
    pub policy: String,
    pub runs: usize,
    pub mean_tokens: Amount,
    pub mean_chain_length: f64,
    pub mean_nodes: f64,
    pub mean_applied: f64,
    pub mean_rejected: f64,
    /// Number of runs which finished the tutorial.
    pub finished: usize,
    /// Mean finishing cycle over the runs which finished.
    pub mean_finish_cycle: Option<f64>,
}

impl PolicySummary {
    fn from_runs(runs: &[RunOutput]) -> Self {
        let n = runs.len().max(1) as f64;
        let mean = |f: &dyn Fn(&RunOutput) -> f64| {
            runs.iter().map(f).sum::<f64>() / n
        };
        let finish_cycles: Vec<_> =
            runs.iter().filter_map(|r| r.tutorial_finished_at).collect();

        PolicySummary {
            policy: runs.first().map(|r| r.policy.clone()).unwrap_or_default(),
            runs: runs.len(),
            mean_tokens: mean(&|r| r.final_state.resources.tokens),
            mean_chain_length: mean(&|r| r.final_state.chain.len() as f64),
            mean_nodes: mean(&|r| r.final_state.nodes.len() as f64),
            mean_applied: mean(&|r| r.applied as f64),
            mean_rejected: mean(&|r| r.rejected as f64),
            finished: finish_cycles.len(),
            mean_finish_cycle: (!finish_cycles.is_empty()).then(|| {
                finish_cycles.iter().sum::<u64>() as f64
                    / finish_cycles.len() as f64
            }),
        }
    }
}

/// Describes the appearance of [`AutoplayResults`] as given by its
/// [`Display`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Comma-separated, without extra whitespace.
    Csv,
    /// Human-readable.
    #[default]
    PrettyPrint,
}

/// Every run of an [`AutoplayGroup`](super::AutoplayGroup).
#[derive(Debug, Clone)]
pub struct AutoplayResults {
    runs: Vec<RunOutput>,
    repeated: NonZeroUsize,
    format: Format,
}

impl AutoplayResults {
    const SEPARATOR_VERTICAL: char = '|';
    const SEPARATOR_HORIZONTAL: char = '-';
    const TITLES: [&'static str; 8] = [
        "Policy",
        "Runs",
        "Mean Tokens",
        "Mean Chain Length",
        "Mean Nodes",
        "Mean Applied",
        "Mean Rejected",
        "Tutorial Finished At",
    ];

    pub(crate) fn new(runs: Vec<RunOutput>, repeated: NonZeroUsize) -> Self {
        AutoplayResults {
            runs,
            repeated,
            format: Format::default(),
        }
    }

    /// Raw output of every run. Runs of the same policy are adjacent, in the
    /// order the policies were added.
    pub fn runs(&self) -> &[RunOutput] {
        &self.runs
    }

    pub fn into_runs(self) -> Vec<RunOutput> {
        self.runs
    }

    /// One summary per policy, in the order the policies were added.
    pub fn summaries(&self) -> Vec<PolicySummary> {
        self.runs
            .chunks(self.repeated.get())
            .map(PolicySummary::from_runs)
            .collect()
    }

    /// Specify the [`Format`] of the results table.
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;

        self
    }

    fn rows(&self) -> Vec<[String; 8]> {
        let float = |x: f64| format!("{:.1$}", x, FLOAT_PRECISION_DIGITS);

        self.summaries()
            .into_iter()
            .map(|s| {
                [
                    s.policy,
                    s.runs.to_string(),
                    float(s.mean_tokens),
                    float(s.mean_chain_length),
                    float(s.mean_nodes),
                    float(s.mean_applied),
                    float(s.mean_rejected),
                    s.mean_finish_cycle.map(float).unwrap_or_else(|| "-".into()),
                ]
            })
            .collect()
    }
}

impl Display for AutoplayResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows = self.rows();

        match self.format {
            Format::Csv => {
                write!(f, "{}", Self::TITLES.join(","))?;

                for row in rows.iter() {
                    writeln!(f)?;
                    write!(f, "{}", row.join(","))?;
                }
            }
            Format::PrettyPrint => {
                let mut text_widths = Self::TITLES.map(str::len);
                for row in rows.iter() {
                    for (i, val) in row.iter().enumerate() {
                        text_widths[i] = text_widths[i].max(val.len());
                    }
                }

                for (i, title) in Self::TITLES.iter().enumerate() {
                    write!(
                        f,
                        " {:1$} {2}",
                        title,
                        text_widths[i],
                        Self::SEPARATOR_VERTICAL
                    )?;
                }
                writeln!(f)?;

                let total_width: usize = text_widths.iter().map(|x| x + 3).sum();
                for _ in 0..total_width {
                    write!(f, "{}", Self::SEPARATOR_HORIZONTAL)?;
                }

                for row in rows.iter() {
                    writeln!(f)?;

                    for (i, val) in row.iter().enumerate() {
                        write!(
                            f,
                            " {:1$} {2}",
                            val,
                            text_widths[i],
                            Self::SEPARATOR_VERTICAL
                        )?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::{AutoplayResults, Format, RunOutput};
    use crate::{rules::Rules, state::GameState};

    fn run(policy: &str, tokens: f64, finished: Option<u64>) -> RunOutput {
        let mut final_state = GameState::genesis(&Rules::default(), Default::default());
        final_state.resources.tokens = tokens;

        RunOutput {
            policy: policy.into(),
            seed: 0,
            cycles: 10,
            final_state,
            applied: 4,
            rejected: 1,
            ignored: 0,
            tutorial_finished_at: finished,
        }
    }

    fn results() -> AutoplayResults {
        let runs = vec![
            run("Idle", 100.0, None),
            run("Idle", 200.0, None),
            run("Curriculum", 50.0, Some(6)),
            run("Curriculum", 70.0, None),
        ];

        AutoplayResults::new(runs, NonZeroUsize::new(2).unwrap())
    }

    #[test]
    fn summaries_group_by_policy() {
        let summaries = results().summaries();

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].policy, "Idle");
        assert_eq!(summaries[0].mean_tokens, 150.0);
        assert_eq!(summaries[0].mean_finish_cycle, None);
        assert_eq!(summaries[1].finished, 1);
        assert_eq!(summaries[1].mean_finish_cycle, Some(6.0));
    }

    #[test]
    fn csv_has_header_and_row_per_policy() {
        let table = results().format(Format::Csv).to_string();
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Policy,Runs,Mean Tokens"));
        assert_eq!(lines[1], "Idle,2,150.00,1.00,2.00,4.00,1.00,-");
        assert!(lines[2].ends_with(",6.00"));
    }

    #[test]
    fn pretty_print_aligns_columns() {
        let table = results().to_string();
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[0].len(), lines[2].len());
        assert_eq!(lines[2].len(), lines[3].len());
    }
}
