//! Aggregate counts for the results dashboard.

use crate::types::{Choice, FolderNames, PairEntry, TaskResults};

/// Which canonical folder was preferred overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    FolderA,
    FolderB,
    Even,
}

impl Verdict {
    /// Sentence naming the preferred folder.
    pub fn describe(self, folders: &FolderNames) -> String {
        match self {
            Verdict::FolderA => format!("{} preferred", folders.folder_a),
            Verdict::FolderB => format!("{} preferred", folders.folder_b),
            Verdict::Even => "No overall preference".to_owned(),
        }
    }
}

/// Win/tie counts over the evaluated pairs of one task.
///
/// Counts are by canonical folder, so presentation swaps do not affect them.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub evaluated: usize,
    pub a_wins: usize,
    pub b_wins: usize,
    pub ties: usize,
    /// Evaluations whose choice was not recognised.
    pub unrecognized: usize,
    pub a_percent: f64,
    pub b_percent: f64,
    pub tie_percent: f64,
    pub completion_rate: f64,
    pub verdict: Verdict,
}

impl Summary {
    pub fn from_results(results: &TaskResults) -> Self {
        Self::from_entries(&results.entries)
    }

    /// Summary over borrowed entries, for callers that hold them elsewhere.
    pub fn from_entries(entries: &[PairEntry]) -> Self {
        let (mut a_wins, mut b_wins, mut ties, mut unrecognized) = (0, 0, 0, 0);
        for evaluation in entries.iter().filter_map(|e| e.evaluation.as_ref()) {
            match evaluation.choice {
                Choice::A => a_wins += 1,
                Choice::B => b_wins += 1,
                Choice::Tie => ties += 1,
                Choice::Other(_) => unrecognized += 1,
            }
        }
        let evaluated = a_wins + b_wins + ties + unrecognized;
        let total = entries.len();

        let verdict = match a_wins.cmp(&b_wins) {
            std::cmp::Ordering::Greater => Verdict::FolderA,
            std::cmp::Ordering::Less => Verdict::FolderB,
            std::cmp::Ordering::Equal => Verdict::Even,
        };

        Self {
            total,
            evaluated,
            a_wins,
            b_wins,
            ties,
            unrecognized,
            a_percent: percent(a_wins, evaluated),
            b_percent: percent(b_wins, evaluated),
            tie_percent: percent(ties, evaluated),
            completion_rate: percent(evaluated, total),
            verdict,
        }
    }
}

/// `part / whole * 100` rounded to one decimal; zero when `whole` is zero.
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Evaluation, PairEntry, TaskHeader, VideoPair};

    fn results(choices: &[Option<Choice>]) -> TaskResults {
        let entries = choices
            .iter()
            .enumerate()
            .map(|(i, choice)| PairEntry {
                pair: VideoPair {
                    id: format!("p{i}"),
                    index_in_task: i,
                    video_a_path: "a.mp4".into(),
                    video_b_path: "b.mp4".into(),
                    video_a_name: "a.mp4".into(),
                    video_b_name: "b.mp4".into(),
                    left_folder: "Sharp".into(),
                    right_folder: "Soft".into(),
                    is_swapped: i % 2 == 1,
                },
                evaluation: choice.clone().map(|choice| Evaluation {
                    id: None,
                    choice,
                    chosen_folder: None,
                    timestamp: None,
                }),
            })
            .collect();
        TaskResults {
            header: TaskHeader {
                task_id: "t".into(),
                task_name: "T".into(),
                folders: FolderNames { folder_a: "Sharp".into(), folder_b: "Soft".into() },
                total_pairs: choices.len(),
                evaluated_pairs: 0,
                completion_rate: 0.0,
            },
            entries,
        }
    }

    #[test]
    fn counts_by_canonical_folder() {
        let summary = Summary::from_results(&results(&[
            Some(Choice::A),
            Some(Choice::A),
            Some(Choice::B),
            Some(Choice::Tie),
            None,
        ]));
        assert_eq!((summary.a_wins, summary.b_wins, summary.ties), (2, 1, 1));
        assert_eq!(summary.evaluated, 4);
        assert_eq!(summary.a_percent, 50.0);
        assert_eq!(summary.b_percent, 25.0);
        assert_eq!(summary.tie_percent, 25.0);
        assert_eq!(summary.completion_rate, 80.0);
        assert_eq!(summary.verdict, Verdict::FolderA);
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        let summary =
            Summary::from_results(&results(&[Some(Choice::A), Some(Choice::B), Some(Choice::Tie)]));
        assert_eq!(summary.a_percent, 33.3);
        assert_eq!(summary.verdict, Verdict::Even);
    }

    #[test]
    fn nothing_evaluated_is_all_zero() {
        let summary = Summary::from_results(&results(&[None, None]));
        assert_eq!(summary.evaluated, 0);
        assert_eq!(summary.a_percent, 0.0);
        assert_eq!(summary.completion_rate, 0.0);
        assert_eq!(summary.verdict, Verdict::Even);
    }

    #[test]
    fn borrowed_entries_give_same_summary() {
        let data = results(&[Some(Choice::B), Some(Choice::B), None]);
        let summary = Summary::from_entries(&data.entries);
        assert_eq!(summary, Summary::from_results(&data));
        assert_eq!(summary.verdict, Verdict::FolderB);
        assert_eq!(summary.completion_rate, 66.7);
    }

    #[test]
    fn verdict_names_folder() {
        let folders = FolderNames { folder_a: "Sharp".into(), folder_b: "Soft".into() };
        assert_eq!(Verdict::FolderB.describe(&folders), "Soft preferred");
    }
}
