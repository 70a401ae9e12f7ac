//! Maps a stored evaluation onto what the reviewer saw.
//!
//! Evaluations record the canonical letter (`A` = folder A's video). Blind
//! presentation may have put folder A on the right, so the letter alone says
//! nothing about which side was picked; `is_swapped` resolves it.

use tracing::warn;

use crate::types::{Choice, Evaluation, FolderNames, Side, VideoPair};

pub const NOT_EVALUATED_LABEL: &str = "Not evaluated.";
pub const TIE_LABEL: &str = "Tie / about the same";

/// Classification used for coloring the choice line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceCategory {
    Unevaluated,
    Tie,
    LeftChosen,
    RightChosen,
}

/// Label and category for the current pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceDisplay {
    pub label: String,
    pub category: ChoiceCategory,
}

/// Side on which the canonical `choice` was presented, `None` for tie or
/// unknown values.
pub fn chosen_side(pair: &VideoPair, choice: &Choice) -> Option<Side> {
    match (choice, pair.is_swapped) {
        (Choice::A, false) | (Choice::B, true) => Some(Side::Left),
        (Choice::A, true) | (Choice::B, false) => Some(Side::Right),
        (Choice::Tie, _) | (Choice::Other(_), _) => None,
    }
}

/// Folder name the choice corresponds to.
///
/// Prefers the label shown on the chosen side and falls back to the canonical
/// folder name when that label is blank.
pub fn chosen_folder(pair: &VideoPair, choice: &Choice, folders: &FolderNames) -> Option<String> {
    let side = chosen_side(pair, choice)?;
    let shown = pair.folder_on(side).trim();
    if !shown.is_empty() {
        return Some(shown.to_owned());
    }
    let canonical = match choice {
        Choice::A => &folders.folder_a,
        _ => &folders.folder_b,
    };
    Some(canonical.clone())
}

/// Category alone, without building a label. Never logs, so it is safe to
/// call for every pair on every frame.
pub fn category_of(pair: &VideoPair, evaluation: Option<&Evaluation>) -> ChoiceCategory {
    match evaluation.map(|e| &e.choice) {
        None | Some(Choice::Other(_)) => ChoiceCategory::Unevaluated,
        Some(Choice::Tie) => ChoiceCategory::Tie,
        Some(choice) => match chosen_side(pair, choice) {
            Some(Side::Left) => ChoiceCategory::LeftChosen,
            Some(Side::Right) => ChoiceCategory::RightChosen,
            None => ChoiceCategory::Unevaluated,
        },
    }
}

/// Resolves the display for `pair` given its (possibly absent) evaluation.
///
/// Total over its inputs: an unrecognised choice degrades to `Unevaluated`
/// with a label naming the raw value, and is logged.
pub fn resolve_display(
    pair: &VideoPair,
    evaluation: Option<&Evaluation>,
    folders: &FolderNames,
) -> ChoiceDisplay {
    let Some(evaluation) = evaluation else {
        return ChoiceDisplay {
            label: NOT_EVALUATED_LABEL.to_owned(),
            category: ChoiceCategory::Unevaluated,
        };
    };

    match &evaluation.choice {
        Choice::Tie => ChoiceDisplay {
            label: TIE_LABEL.to_owned(),
            category: ChoiceCategory::Tie,
        },
        Choice::Other(raw) => {
            warn!(pair_id = %pair.id, choice = %raw, "unexpected evaluation choice");
            ChoiceDisplay {
                label: format!("Unexpected choice: {raw}"),
                category: ChoiceCategory::Unevaluated,
            }
        }
        Choice::A | Choice::B => {
            let choice = &evaluation.choice;
            // chosen_side and chosen_folder are always Some for A and B.
            let side = chosen_side(pair, choice).unwrap_or(Side::Left);
            let folder = chosen_folder(pair, choice, folders).unwrap_or_default();
            ChoiceDisplay {
                label: format!("{side} ({folder})"),
                category: category_of(pair, Some(evaluation)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(swapped: bool) -> VideoPair {
        let (left, right) = if swapped { ("B-set", "A-set") } else { ("A-set", "B-set") };
        VideoPair {
            id: "p0".into(),
            index_in_task: 0,
            video_a_path: "a/clip.mp4".into(),
            video_b_path: "b/clip.mp4".into(),
            video_a_name: "clip.mp4".into(),
            video_b_name: "clip.mp4".into(),
            left_folder: left.into(),
            right_folder: right.into(),
            is_swapped: swapped,
        }
    }

    fn folders() -> FolderNames {
        FolderNames { folder_a: "A-set".into(), folder_b: "B-set".into() }
    }

    fn eval(choice: Choice) -> Evaluation {
        Evaluation { id: Some("e1".into()), choice, chosen_folder: None, timestamp: None }
    }

    #[test]
    fn full_mapping_table() {
        let cases = [
            (false, Some(Choice::A), ChoiceCategory::LeftChosen, "Left (A-set)"),
            (false, Some(Choice::B), ChoiceCategory::RightChosen, "Right (B-set)"),
            (false, Some(Choice::Tie), ChoiceCategory::Tie, TIE_LABEL),
            (false, None, ChoiceCategory::Unevaluated, NOT_EVALUATED_LABEL),
            (true, Some(Choice::A), ChoiceCategory::RightChosen, "Right (A-set)"),
            (true, Some(Choice::B), ChoiceCategory::LeftChosen, "Left (B-set)"),
            (true, Some(Choice::Tie), ChoiceCategory::Tie, TIE_LABEL),
            (true, None, ChoiceCategory::Unevaluated, NOT_EVALUATED_LABEL),
        ];
        for (swapped, choice, category, label) in cases {
            let p = pair(swapped);
            let e = choice.map(eval);
            let display = resolve_display(&p, e.as_ref(), &folders());
            assert_eq!(display.category, category, "swapped={swapped} choice={e:?}");
            assert_eq!(display.label, label, "swapped={swapped} choice={e:?}");
        }
    }

    #[test]
    fn unexpected_value_degrades_to_unevaluated() {
        let e = eval(Choice::Other("C".into()));
        let display = resolve_display(&pair(false), Some(&e), &folders());
        assert_eq!(display.category, ChoiceCategory::Unevaluated);
        assert_eq!(display.label, "Unexpected choice: C");
    }

    #[test]
    fn blank_side_label_falls_back_to_canonical_name() {
        let mut p = pair(true);
        p.right_folder = "  ".into();
        let display = resolve_display(&p, Some(&eval(Choice::A)), &folders());
        assert_eq!(display.label, "Right (A-set)");
        assert_eq!(chosen_folder(&p, &Choice::Tie, &folders()), None);
    }

    #[test]
    fn category_matches_resolved_display() {
        for swapped in [false, true] {
            for choice in [Choice::A, Choice::B, Choice::Tie, Choice::Other("?".into())] {
                let p = pair(swapped);
                let e = eval(choice);
                assert_eq!(
                    category_of(&p, Some(&e)),
                    resolve_display(&p, Some(&e), &folders()).category
                );
            }
        }
        assert_eq!(category_of(&pair(false), None), ChoiceCategory::Unevaluated);
    }

    #[test]
    fn resolving_twice_is_identical() {
        let p = pair(true);
        let e = eval(Choice::B);
        assert_eq!(
            resolve_display(&p, Some(&e), &folders()),
            resolve_display(&p, Some(&e), &folders())
        );
    }
}
