use std::fmt;

/// One left/right comparison unit within a task.
///
/// `video_a_*` always refers to the canonical folder A video and `video_b_*` to
/// folder B. `left_folder` / `right_folder` name the folders as they were laid
/// out on screen, which differs from A/B order when `is_swapped` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoPair {
    pub id: String,
    pub index_in_task: usize,
    pub video_a_path: String,
    pub video_b_path: String,
    pub video_a_name: String,
    pub video_b_name: String,
    pub left_folder: String,
    pub right_folder: String,
    pub is_swapped: bool,
}

impl VideoPair {
    /// Relative media path of the video presented on `side`.
    pub fn path_on(&self, side: Side) -> &str {
        match (side, self.is_swapped) {
            (Side::Left, false) | (Side::Right, true) => &self.video_a_path,
            (Side::Right, false) | (Side::Left, true) => &self.video_b_path,
        }
    }

    /// Original filename of the video presented on `side`.
    pub fn name_on(&self, side: Side) -> &str {
        match (side, self.is_swapped) {
            (Side::Left, false) | (Side::Right, true) => &self.video_a_name,
            (Side::Right, false) | (Side::Left, true) => &self.video_b_name,
        }
    }

    /// Folder label shown above `side`.
    pub fn folder_on(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.left_folder,
            Side::Right => &self.right_folder,
        }
    }

    /// True when either media locator is blank; rendered as a "no media" state.
    pub fn is_missing_media(&self) -> bool {
        self.video_a_path.trim().is_empty() || self.video_b_path.trim().is_empty()
    }
}

/// Visual side of the comparison view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The opposite side.
    pub fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("Left"),
            Side::Right => f.write_str("Right"),
        }
    }
}

/// A recorded choice. Values the client does not recognise are kept verbatim
/// so they can be reported instead of rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    A,
    B,
    Tie,
    Other(String),
}

impl Choice {
    /// Parses the wire representation (`"A"`, `"B"`, `"tie"`).
    ///
    /// Letters are matched case-insensitively; anything else becomes `Other`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "A" | "a" => Choice::A,
            "B" | "b" => Choice::B,
            s if s.eq_ignore_ascii_case("tie") => Choice::Tie,
            _ => Choice::Other(raw.to_owned()),
        }
    }

    /// Wire representation sent to the evaluation endpoint.
    pub fn as_wire(&self) -> &str {
        match self {
            Choice::A => "A",
            Choice::B => "B",
            Choice::Tie => "tie",
            Choice::Other(raw) => raw,
        }
    }
}

/// Outcome of one user's review of a pair. At most one per pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub id: Option<String>,
    pub choice: Choice,
    /// Folder the server says was chosen; `None` for ties.
    pub chosen_folder: Option<String>,
    /// RFC 3339 text, normalised at the load boundary.
    pub timestamp: Option<String>,
}

/// A pair together with its evaluation, in task order.
#[derive(Debug, Clone, PartialEq)]
pub struct PairEntry {
    pub pair: VideoPair,
    pub evaluation: Option<Evaluation>,
}

/// Canonical display names of the two folders being compared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FolderNames {
    pub folder_a: String,
    pub folder_b: String,
}

/// Task-level fields of the detailed-results payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskHeader {
    pub task_id: String,
    pub task_name: String,
    pub folders: FolderNames,
    pub total_pairs: usize,
    pub evaluated_pairs: usize,
    /// Percentage as reported by the server.
    pub completion_rate: f64,
}

/// Validated payload of the detailed-results endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResults {
    pub header: TaskHeader,
    pub entries: Vec<PairEntry>,
}

/// Task record used by the blind-test flow. Pairs carry no evaluations.
#[derive(Debug, Clone, PartialEq)]
pub struct BlindTask {
    pub id: String,
    pub name: String,
    pub folders: FolderNames,
    pub is_blind: bool,
    pub pairs: Vec<VideoPair>,
}

impl BlindTask {
    /// Converts the task into review entries: A on the left, B on the right,
    /// nothing evaluated yet.
    pub fn into_results(self) -> TaskResults {
        let total = self.pairs.len();
        TaskResults {
            header: TaskHeader {
                task_id: self.id,
                task_name: self.name,
                folders: self.folders,
                total_pairs: total,
                evaluated_pairs: 0,
                completion_rate: 0.0,
            },
            entries: self
                .pairs
                .into_iter()
                .map(|pair| PairEntry { pair, evaluation: None })
                .collect(),
        }
    }
}
