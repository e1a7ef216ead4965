use serde::{Deserialize, Serialize};

/// Which subset of the test tree a run should execute, and how.
///
/// This is a closed union: the dispatch in the supervisor and the launcher is
/// exhaustive, so an unrepresentable combination (e.g. a suite path together
/// with tag filters) cannot be smuggled in through a string-keyed map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunSpec {
    /// Run everything under the configured test root.
    AllTests,
    /// Filter by tags; either side may be absent.
    ByTag {
        include: Option<String>,
        exclude: Option<String>,
    },
    /// Run a single suite file, given relative to the test root.
    BySuite { suite: String },
    /// Run a single named test case anywhere under the test root.
    ByTestCase { name: String },
    /// Data-driven run: the dataset is turned into a variable file that the
    /// runner reads at startup.
    DataDriven { dataset: Dataset },
}

/// Tabular dataset backing a data-driven run.
///
/// Rows are expected to be rectangular relative to `headers`; shorter rows
/// are padded with empty values at the point of consumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Lifecycle state of the single execution job.
///
/// Transitions: `Idle -> Running -> {Success, Failed, Stopped}`. A terminal
/// state is only left by a newly accepted run, which resets straight back to
/// `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Idle,
    Running,
    Success,
    Failed,
    Stopped,
}

impl JobStatus {
    /// True for `Success`, `Failed` and `Stopped`.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed | JobStatus::Stopped)
    }
}
