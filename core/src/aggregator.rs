//! Result aggregation across search roots
//!
//! The aggregator keeps one slot per root for the current round and rebuilds
//! the display list from those slots after every accepted completion. Results
//! therefore appear in root order regardless of which invocation finishes
//! first, and a create marker disappears as soon as any real candidate lands.

use crate::candidate::{Candidate, CreateCandidate, FileCandidate, NoticeCandidate};
use crate::config::PickerConfig;
use crate::search::{Completion, InvocationOutcome, RoundId};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What a completed invocation contributes to the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contribution {
    Files(Vec<Candidate>),
    Notice(Candidate),
    /// Killed, matched nothing, or failed without a message
    Nothing,
}

#[derive(Debug, Clone)]
enum RootSlot {
    Pending,
    Done(Vec<Candidate>),
}

/// Accumulates the current round's results into one ordered list
#[derive(Debug)]
pub struct ResultAggregator {
    max_results_per_root: usize,
    no_match_exit_code: i32,
    round: RoundId,
    query: String,
    roots: Vec<PathBuf>,
    slots: Vec<RootSlot>,
    outstanding: usize,
}

impl ResultAggregator {
    pub fn new(config: &PickerConfig) -> Self {
        Self {
            max_results_per_root: config.max_results_per_root,
            no_match_exit_code: config.no_match_exit_code,
            round: RoundId::default(),
            query: String::new(),
            roots: Vec::new(),
            slots: Vec::new(),
            outstanding: 0,
        }
    }

    /// Start a new round for `query` over `roots` and return its id
    ///
    /// Any completion tagged with an earlier round is ignored from now on.
    pub fn begin_round(&mut self, query: &str, roots: &[PathBuf]) -> RoundId {
        if query.is_empty() {
            return self.clear();
        }

        self.round = self.round.next();
        self.query = query.to_string();
        self.roots = roots.to_vec();
        self.slots = vec![RootSlot::Pending; roots.len()];
        self.outstanding = roots.len();
        debug!(
            "{} started for {:?} over {} root(s)",
            self.round,
            query,
            roots.len()
        );
        self.round
    }

    /// Drop all results and invalidate the current round
    pub fn clear(&mut self) -> RoundId {
        self.round = self.round.next();
        self.query.clear();
        self.roots.clear();
        self.slots.clear();
        self.outstanding = 0;
        self.round
    }

    /// Fold one completion into the current round
    ///
    /// Returns `false` when the completion is stale (belongs to another
    /// round) or its root already reported.
    pub fn apply(&mut self, completion: Completion) -> bool {
        if completion.round != self.round {
            debug!(
                "Discarding completion from {} (current {})",
                completion.round, self.round
            );
            return false;
        }

        let index = completion.root_index;
        if !matches!(self.slots.get(index), Some(RootSlot::Pending)) {
            return false;
        }

        let candidates = match self.classify(&completion.root, completion.outcome) {
            Contribution::Files(files) => files,
            Contribution::Notice(notice) => vec![notice],
            Contribution::Nothing => Vec::new(),
        };
        debug!(
            "{} root {} contributed {} candidate(s)",
            self.round,
            completion.root.display(),
            candidates.len()
        );
        self.slots[index] = RootSlot::Done(candidates);
        self.outstanding = self.outstanding.saturating_sub(1);
        true
    }

    /// Decide what an invocation outcome adds for `root`
    pub fn classify(&self, root: &Path, outcome: InvocationOutcome) -> Contribution {
        match outcome {
            InvocationOutcome::Listed { stdout } => Contribution::Files(
                stdout
                    .lines()
                    .filter(|line| !line.is_empty())
                    .take(self.max_results_per_root)
                    .map(|relative| Candidate::File(FileCandidate::from_relative(root, relative)))
                    .collect(),
            ),
            InvocationOutcome::Killed => Contribution::Nothing,
            InvocationOutcome::Failed { status, .. } if status == Some(self.no_match_exit_code) => {
                Contribution::Nothing
            }
            InvocationOutcome::Failed { message, .. } if message.trim().is_empty() => {
                Contribution::Nothing
            }
            InvocationOutcome::Failed { message, .. } => {
                Contribution::Notice(Candidate::Notice(NoticeCandidate::new(root, message)))
            }
        }
    }

    /// The list to display right now
    ///
    /// While the round has produced no file or notice candidates, one create
    /// marker per root is offered instead, even if invocations are pending.
    pub fn candidates(&self) -> Vec<Candidate> {
        if self.query.is_empty() {
            return Vec::new();
        }

        let found: Vec<Candidate> = self
            .slots
            .iter()
            .filter_map(|slot| match slot {
                RootSlot::Done(candidates) => Some(candidates.iter().cloned()),
                RootSlot::Pending => None,
            })
            .flatten()
            .collect();

        if !found.is_empty() {
            return found;
        }

        self.roots
            .iter()
            .map(|root| Candidate::Create(CreateCandidate::for_query(root, &self.query)))
            .collect()
    }

    /// Whether any invocation of the current round is outstanding
    pub fn is_busy(&self) -> bool {
        self.outstanding > 0
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn current_round(&self) -> RoundId {
        self.round
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::InvocationId;

    fn roots(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    fn completion(
        round: RoundId,
        root_index: usize,
        root: &str,
        outcome: InvocationOutcome,
    ) -> Completion {
        Completion {
            round,
            invocation: InvocationId(root_index as u64),
            root_index,
            root: PathBuf::from(root),
            outcome,
        }
    }

    fn listed(stdout: &str) -> InvocationOutcome {
        InvocationOutcome::Listed {
            stdout: stdout.to_string(),
        }
    }

    fn labels(candidates: &[Candidate]) -> Vec<(String, String)> {
        candidates
            .iter()
            .map(|c| (c.label(), c.description()))
            .collect()
    }

    #[test]
    fn test_single_root_listing() {
        let mut aggregator = ResultAggregator::new(&PickerConfig::default());
        let round = aggregator.begin_round("abc", &roots(&["/ws"]));
        assert!(aggregator.is_busy());

        let outcome = listed("foo/abc1.txt\nbar/abc2.txt");
        assert!(aggregator.apply(completion(round, 0, "/ws", outcome)));
        assert!(!aggregator.is_busy());
        assert_eq!(
            labels(&aggregator.candidates()),
            vec![
                ("abc1.txt".to_string(), "foo".to_string()),
                ("abc2.txt".to_string(), "bar".to_string()),
            ]
        );
    }

    #[test]
    fn test_results_are_capped_per_root() {
        let mut aggregator = ResultAggregator::new(&PickerConfig::default());
        let round = aggregator.begin_round("f", &roots(&["/a", "/b"]));

        let many: String = (0..80).map(|i| format!("f{}.txt\n", i)).collect();
        aggregator.apply(completion(round, 0, "/a", listed(&many)));
        aggregator.apply(completion(round, 1, "/b", listed("f.md\n")));

        let candidates = aggregator.candidates();
        assert_eq!(candidates.len(), 51);
        assert_eq!(candidates[0].label(), "f0.txt");
        assert_eq!(candidates[49].label(), "f49.txt");
        assert_eq!(candidates[50].label(), "f.md");
    }

    #[test]
    fn test_no_match_status_contributes_nothing() {
        let mut aggregator = ResultAggregator::new(&PickerConfig::default());
        let round = aggregator.begin_round("x", &roots(&["/a", "/b"]));

        aggregator.apply(completion(
            round,
            0,
            "/a",
            InvocationOutcome::Failed {
                status: Some(1),
                message: "rg exited with exit status: 1".to_string(),
            },
        ));
        aggregator.apply(completion(round, 1, "/b", listed("x.go\n")));

        let candidates = aggregator.candidates();
        assert_eq!(candidates.len(), 1);
        match &candidates[0] {
            Candidate::File(file) => {
                assert_eq!(file.root, PathBuf::from("/b"));
                assert_eq!(file.path, PathBuf::from("/b/x.go"));
            }
            other => panic!("unexpected candidate {:?}", other),
        }
    }

    #[test]
    fn test_reportable_failure_becomes_notice() {
        let mut aggregator = ResultAggregator::new(&PickerConfig::default());
        let round = aggregator.begin_round("[", &roots(&["/a"]));

        aggregator.apply(completion(
            round,
            0,
            "/a",
            InvocationOutcome::Failed {
                status: Some(2),
                message: "rg: error parsing glob '*[*'".to_string(),
            },
        ));

        let candidates = aggregator.candidates();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].is_notice());
        assert_eq!(candidates[0].detail(), Some("/a".to_string()));
    }

    #[test]
    fn test_killed_and_silent_failures_are_ignored() {
        let aggregator = ResultAggregator::new(&PickerConfig::default());
        let root = Path::new("/a");
        assert_eq!(aggregator.classify(root, InvocationOutcome::Killed), Contribution::Nothing);
        assert_eq!(
            aggregator.classify(
                root,
                InvocationOutcome::Failed {
                    status: Some(2),
                    message: "  ".to_string(),
                }
            ),
            Contribution::Nothing
        );
    }

    #[test]
    fn test_create_markers_until_real_results_arrive() {
        let mut aggregator = ResultAggregator::new(&PickerConfig::default());
        let round = aggregator.begin_round("new", &roots(&["/a", "/b"]));

        // Offered before anything completes
        let before = aggregator.candidates();
        assert_eq!(before.len(), 2);
        assert!(before.iter().all(Candidate::is_create));

        aggregator.apply(completion(
            round,
            0,
            "/a",
            InvocationOutcome::Failed {
                status: Some(1),
                message: String::new(),
            },
        ));
        let still = aggregator.candidates();
        assert_eq!(
            still.iter().map(Candidate::detail).collect::<Vec<_>>(),
            vec![Some("/a/new".to_string()), Some("/b/new".to_string())]
        );

        // A slower root with a real match replaces the markers
        aggregator.apply(completion(round, 1, "/b", listed("docs/new.md\n")));
        let after = aggregator.candidates();
        assert_eq!(after.len(), 1);
        assert!(after[0].is_file());
    }

    #[test]
    fn test_root_order_is_kept_regardless_of_arrival() {
        let mut aggregator = ResultAggregator::new(&PickerConfig::default());
        let round = aggregator.begin_round("m", &roots(&["/a", "/b"]));

        aggregator.apply(completion(round, 1, "/b", listed("m2.rs\n")));
        aggregator.apply(completion(round, 0, "/a", listed("m1.rs\n")));

        let names: Vec<String> = aggregator.candidates().iter().map(Candidate::label).collect();
        assert_eq!(names, vec!["m1.rs", "m2.rs"]);
    }

    #[test]
    fn test_stale_and_duplicate_completions_are_rejected() {
        let mut aggregator = ResultAggregator::new(&PickerConfig::default());
        let old = aggregator.begin_round("a", &roots(&["/ws"]));
        let current = aggregator.begin_round("ab", &roots(&["/ws"]));
        assert_ne!(old, current);

        assert!(!aggregator.apply(completion(old, 0, "/ws", listed("a.txt\n"))));
        assert!(aggregator.is_busy());

        assert!(aggregator.apply(completion(current, 0, "/ws", listed("ab.txt\n"))));
        assert!(!aggregator.apply(completion(current, 0, "/ws", listed("other.txt\n"))));
        assert_eq!(aggregator.outstanding(), 0);

        let names: Vec<String> = aggregator.candidates().iter().map(Candidate::label).collect();
        assert_eq!(names, vec!["ab.txt"]);
    }

    #[test]
    fn test_empty_query_clears_without_round() {
        let mut aggregator = ResultAggregator::new(&PickerConfig::default());
        let round = aggregator.begin_round("a", &roots(&["/ws"]));
        let cleared = aggregator.begin_round("", &roots(&["/ws"]));

        assert_ne!(round, cleared);
        assert!(!aggregator.is_busy());
        assert!(aggregator.candidates().is_empty());
        assert!(!aggregator.apply(completion(round, 0, "/ws", listed("a.txt\n"))));
    }

    #[test]
    fn test_blank_lines_and_crlf_are_skipped() {
        let mut aggregator = ResultAggregator::new(&PickerConfig::default());
        let round = aggregator.begin_round("r", &roots(&["/ws"]));
        aggregator.apply(completion(round, 0, "/ws", listed("src/q.rs\r\n\r\nlib/r.rs\n")));

        let candidates = aggregator.candidates();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].label(), "q.rs");
        assert_eq!(candidates[0].description(), "src");
        assert_eq!(candidates[1].label(), "r.rs");
    }
}
