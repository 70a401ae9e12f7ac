//! End-to-end review of a three-pair task with recording players.
//!
//! Exercises: ReviewEngine::new, go_to, previous, next, attach_media,
//! time_update, autoplay, and the choice line shown for each pair.

use std::rc::Rc;
use std::cell::RefCell;

use abreview_core::choice::{ChoiceCategory, NOT_EVALUATED_LABEL, TIE_LABEL};
use abreview_core::engine::{MediaRequest, ReviewEngine};
use abreview_core::sync::{MediaElement, MediaError};
use abreview_core::types::{
    Choice, Evaluation, FolderNames, PairEntry, Side, TaskHeader, TaskResults, VideoPair,
};

#[derive(Debug, Default)]
struct Log {
    opened: usize,
    dropped: usize,
    plays: usize,
    seeks: Vec<(String, f64)>,
}

struct Player {
    url: String,
    time: f64,
    looping: bool,
    log: Rc<RefCell<Log>>,
}

impl Player {
    fn open(url: Option<&String>, time: f64, log: &Rc<RefCell<Log>>) -> Option<Self> {
        let url = url?.clone();
        log.borrow_mut().opened += 1;
        Some(Self { url, time, looping: false, log: Rc::clone(log) })
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.log.borrow_mut().dropped += 1;
    }
}

impl MediaElement for Player {
    fn current_time(&self) -> f64 {
        self.time
    }
    fn set_current_time(&mut self, secs: f64) {
        self.time = secs;
        self.log.borrow_mut().seeks.push((self.url.clone(), secs));
    }
    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }
    fn play(&mut self) -> Result<(), MediaError> {
        self.log.borrow_mut().plays += 1;
        Ok(())
    }
}

fn pair(i: usize, swapped: bool) -> VideoPair {
    let (left, right) = if swapped { ("Soft", "Sharp") } else { ("Sharp", "Soft") };
    VideoPair {
        id: format!("pair-{i}"),
        index_in_task: i,
        video_a_path: format!("task/sharp/clip{i}.mp4"),
        video_b_path: format!("task/soft/clip{i}.mp4"),
        video_a_name: format!("clip{i}.mp4"),
        video_b_name: format!("clip{i}.mp4"),
        left_folder: left.into(),
        right_folder: right.into(),
        is_swapped: swapped,
    }
}

fn evaluation(choice: Choice) -> Option<Evaluation> {
    Some(Evaluation { id: None, choice, chosen_folder: None, timestamp: None })
}

fn task() -> TaskResults {
    TaskResults {
        header: TaskHeader {
            task_id: "task".into(),
            task_name: "Sharpening study".into(),
            folders: FolderNames { folder_a: "Sharp".into(), folder_b: "Soft".into() },
            total_pairs: 3,
            evaluated_pairs: 2,
            completion_rate: 66.7,
        },
        entries: vec![
            PairEntry { pair: pair(0, false), evaluation: evaluation(Choice::A) },
            PairEntry { pair: pair(1, true), evaluation: evaluation(Choice::B) },
            PairEntry { pair: pair(2, false), evaluation: None },
        ],
    }
}

/// Opens both players for `request` with the right one lagging by a second.
fn open(engine: &mut ReviewEngine<Player>, request: &MediaRequest, log: &Rc<RefCell<Log>>) {
    let left = Player::open(request.left_url.as_ref(), 2.0, log);
    let right = Player::open(request.right_url.as_ref(), 1.0, log);
    assert!(engine.attach_media(request.generation, left, right));
    engine.autoplay(request.generation);
}

#[test]
fn stepping_through_pairs() {
    let log = Rc::new(RefCell::new(Log::default()));
    let (mut engine, request) = ReviewEngine::new(task(), "https://media.test");
    let first = request.unwrap();
    open(&mut engine, &first, &log);

    let display = engine.display().unwrap();
    assert_eq!(display.label, "Left (Sharp)");
    assert_eq!(display.category, ChoiceCategory::LeftChosen);
    assert_eq!(log.borrow().plays, 2);

    // Drift on the first pair is corrected toward the reporter.
    let correction = engine.time_update(Side::Left, first.generation).unwrap();
    assert_eq!(correction.target, Side::Right);
    assert_eq!(correction.to_secs, 2.0);

    // Jump to the unevaluated pair.
    let third = engine.go_to(2).unwrap();
    assert_eq!(engine.session().current_index(), 2);
    assert_eq!(log.borrow().dropped, 2);
    assert_eq!(engine.display().unwrap().label, NOT_EVALUATED_LABEL);
    assert_eq!(
        third.left_url.as_deref(),
        Some("https://media.test/uploads/task/sharp/clip2.mp4")
    );

    // A late event from pair 0 must not touch anything.
    assert!(engine.time_update(Side::Left, first.generation).is_none());
    open(&mut engine, &third, &log);

    // Back to the swapped pair: B was chosen and shown on the left.
    let second = engine.previous().unwrap();
    assert_eq!(engine.session().current_index(), 1);
    assert_eq!(log.borrow().dropped, 4);
    let display = engine.display().unwrap();
    assert_eq!(display.label, "Left (Soft)");
    assert_eq!(display.category, ChoiceCategory::LeftChosen);
    assert_eq!(
        second.left_url.as_deref(),
        Some("https://media.test/uploads/task/soft/clip1.mp4")
    );
    open(&mut engine, &second, &log);

    let third_again = engine.next().unwrap();
    assert_eq!(engine.session().current_index(), 2);
    assert_eq!(engine.display().unwrap().label, NOT_EVALUATED_LABEL);
    assert!(third_again.generation > second.generation);

    let log = log.borrow();
    assert_eq!(log.opened, 6);
    assert_eq!(log.dropped, 6);
    assert_eq!(log.plays, 6);
    assert_eq!(log.seeks.len(), 1);
}

#[test]
fn boundary_moves_have_no_side_effects() {
    let log = Rc::new(RefCell::new(Log::default()));
    let (mut engine, request) = ReviewEngine::new(task(), "https://media.test");
    open(&mut engine, &request.unwrap(), &log);

    assert!(engine.previous().is_none());
    assert!(engine.go_to(3).is_none());
    assert!(engine.go_to(0).is_none());

    assert_eq!(engine.session().current_index(), 0);
    assert_eq!(log.borrow().dropped, 0);
    assert!(engine.sync().is_attached());
}

#[test]
fn tie_is_distinct_from_unevaluated() {
    let mut data = task();
    data.entries[2].evaluation = evaluation(Choice::Tie);
    let (mut engine, _) = ReviewEngine::<Player>::new(data, "https://media.test");
    engine.go_to(2);
    let display = engine.display().unwrap();
    assert_eq!(display.label, TIE_LABEL);
    assert_eq!(display.category, ChoiceCategory::Tie);
}

#[test]
fn revisiting_a_tie_keeps_its_label() {
    let mut data = task();
    data.entries[1].evaluation = None;
    data.entries[2].evaluation = evaluation(Choice::Tie);
    let log = Rc::new(RefCell::new(Log::default()));
    let (mut engine, request) = ReviewEngine::new(data, "https://media.test");
    open(&mut engine, &request.unwrap(), &log);
    assert_eq!(engine.display().unwrap().label, "Left (Sharp)");

    let to_tie = engine.go_to(2).unwrap();
    assert_eq!(engine.display().unwrap().label, TIE_LABEL);
    assert_eq!(engine.display().unwrap().category, ChoiceCategory::Tie);
    open(&mut engine, &to_tie, &log);

    let back = engine.previous().unwrap();
    assert_eq!(engine.session().current_index(), 1);
    let display = engine.display().unwrap();
    assert_eq!(display.label, NOT_EVALUATED_LABEL);
    assert_eq!(display.category, ChoiceCategory::Unevaluated);
    open(&mut engine, &back, &log);

    engine.next().unwrap();
    assert_eq!(engine.session().current_index(), 2);
    assert_eq!(engine.display().unwrap().label, TIE_LABEL);
    assert_eq!(engine.display().unwrap().category, ChoiceCategory::Tie);
    assert_eq!(log.borrow().dropped, 6);
}
