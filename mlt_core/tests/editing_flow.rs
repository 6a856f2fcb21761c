use std::sync::Arc;

use mlt_core::{
    config::EditorConfig,
    engine::Engine,
    context::Context,
    engine::EngineFacade,
    key_event::{Action, InputEvent},
    model::CandidateEntry,
    processor::{ProcessStatus, Processor},
    session::{Session, TextField, persist},
    vocabulary::{Vocabulary, VocabularySlot},
    wrap::{EditKind, cursor_position},
};

struct Tags(Vec<CandidateEntry>);

impl Tags {
    fn sample() -> Self {
        Tags(vec![
            CandidateEntry::new("caterpillar", 9_000),
            CandidateEntry::new("cat_ears", 120_000).with_label("cat ears"),
            CandidateEntry::new("castle", 40),
            CandidateEntry::new("masterpiece", 2_000_000),
        ])
    }
}

impl Vocabulary for Tags {
    fn search(&self, prefix: &str, max_size: usize) -> Vec<CandidateEntry> {
        let mut hits: Vec<CandidateEntry> = self
            .0
            .iter()
            .filter(|e| e.display_term.starts_with(prefix))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        hits.truncate(max_size);
        hits
    }
}

fn narrow_config(width: usize) -> EditorConfig {
    EditorConfig {
        default_line_width: width,
        ..EditorConfig::default()
    }
}

#[test]
fn typing_a_prompt_keeps_buffers_consistent() {
    let mut field = String::new();
    let engine = Engine::with_config(Tags::sample(), narrow_config(10));
    let mut session = Session::open(engine, &field);
    let prompt = "masterpiece, best quality, 1girl, (long hair:1.2)";

    let mut last_row = 0;
    for ch in prompt.chars() {
        let (snapshot, actions) = session.handle(InputEvent::Char(ch));
        persist(&actions, &mut field);

        assert_eq!(snapshot.display.replace('\n', ""), snapshot.logical);
        assert!(snapshot.display.split('\n').all(|row| row.chars().count() <= 10));
        assert_eq!(snapshot.cursor, snapshot.display.chars().count());
        let (row, _) = cursor_position(&snapshot.display, snapshot.cursor);
        assert!(row >= last_row);
        last_row = row;
    }
    assert_eq!(field.read(), prompt);

    let stats = session.engine().wrap_engine().stats();
    assert!(stats.misses > 0);
    assert!(stats.entries <= EditorConfig::default().wrap_cache_capacity);
}

#[test]
fn accepting_across_a_full_row_lands_after_the_term() {
    let mut field = String::new();
    let engine = Engine::with_config(Tags::sample(), narrow_config(6));
    let mut session = Session::open(engine, &field);
    for ch in "a, cat".chars() {
        session.handle(InputEvent::Char(ch));
    }
    let snapshot = session.tick();
    assert_eq!(snapshot.word, "cat");
    let texts: Vec<&str> = snapshot.candidates.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["cat ears", "caterpillar"]);

    let (snapshot, actions) = session.handle(InputEvent::SelectNext);
    assert!(actions.is_empty());
    assert_eq!(snapshot.selection, 1);

    let (snapshot, actions) = session.handle(InputEvent::Accept);
    persist(&actions, &mut field);
    assert_eq!(field, "a, caterpillar");
    assert_eq!(snapshot.display, "a, cat\nerpill\nar");
    assert_eq!(snapshot.cursor, 16);
    assert!(snapshot.candidates.iter().all(|c| c.text != "cat ears"));
}

#[test]
fn selection_never_wraps_around() {
    let engine = Engine::new(Tags::sample());
    let mut session = Session::open(engine, &String::from("ca"));
    for _ in 0..5 {
        session.handle(InputEvent::SelectNext);
    }
    assert_eq!(session.tick().selection, 2);
    for _ in 0..5 {
        session.handle(InputEvent::SelectPrev);
    }
    assert_eq!(session.tick().selection, 0);
}

#[test]
fn late_vocabulary_is_picked_up_by_every_session() {
    let slot = VocabularySlot::new();
    let mut left = Session::open(Engine::new(slot.clone()), &String::from("mas"));
    let mut right = Session::open(Engine::new(slot.clone()), &String::from("cas"));

    assert!(left.tick().candidates.is_empty());
    assert!(right.tick().candidates.is_empty());

    slot.install(Arc::new(Tags::sample()));
    assert_eq!(left.tick().candidates[0].entry.display_term, "masterpiece");
    assert_eq!(right.tick().candidates[0].entry.display_term, "castle");

    left.handle(InputEvent::Accept);
    assert_eq!(left.logical_text(), "masterpiece");
    assert_eq!(right.logical_text(), "cas");

    slot.unload();
    assert!(right.tick().candidates.is_empty());
}

#[test]
fn resize_follows_popup_width() {
    let field = String::from("masterpiece, best quality");
    let mut session = Session::open(Engine::new(Tags::sample()), &field);
    session.set_origin(50.0, 20.0);
    let (snapshot, _) = session.handle(InputEvent::Resize {
        popup_width: 130.0,
        advance: 10.0,
        line_height: 20.0,
    });
    assert_eq!(snapshot.line_width, 10);
    assert_eq!(snapshot.display, "masterpiec\ne, best qu\nality");
    assert_eq!((snapshot.row, snapshot.column), (2, 5));
    assert_eq!((snapshot.anchor.x, snapshot.anchor.y), (100.0, 80.0));
}

/// Upper-cases the buffer on `Clear`; the default chain consumes `Clear` first.
struct Shout;

impl Processor for Shout {
    fn process(
        &mut self,
        engine: &dyn EngineFacade,
        context: &mut Context,
        input_event: &InputEvent,
    ) -> (ProcessStatus, Vec<Action>) {
        if *input_event != InputEvent::Clear {
            return (ProcessStatus::Continue, Vec::new());
        }
        let loud = context.logical().to_uppercase();
        let end = loud.chars().count();
        let actions = context.reflow(engine, &loud, end, EditKind::Delete);
        (ProcessStatus::Consume, actions)
    }
}

#[test]
fn appended_processors_only_see_unconsumed_events() {
    let mut field = String::from("abc");
    let mut session =
        Session::open(Engine::new(Tags::sample()), &field).with_processor(Box::new(Shout));
    let (_, actions) = session.handle(InputEvent::Clear);
    persist(&actions, &mut field);
    assert_eq!(field, "");
}

#[test]
fn full_buffer_keeps_typed_text_in_order() {
    let mut field = String::new();
    let config = EditorConfig {
        max_buffer_size: 5,
        ..EditorConfig::default()
    };
    let mut session = Session::open(Engine::with_config(Tags::sample(), config), &field);
    for ch in "abcdefg".chars() {
        let (_, actions) = session.handle(InputEvent::Char(ch));
        persist(&actions, &mut field);
    }
    assert_eq!(field, "abcde");
    assert_eq!(session.logical_text(), "abcde");
    assert_eq!(session.tick().cursor, 5);
}

#[test]
fn delete_at_row_end_reaches_the_next_row() {
    let mut field = String::from("abcdef");
    let engine = Engine::with_config(Tags::sample(), narrow_config(3));
    let mut session = Session::open(engine, &field);
    session.handle(InputEvent::Home);
    session.handle(InputEvent::Left);
    let (snapshot, actions) = session.handle(InputEvent::Delete);
    persist(&actions, &mut field);
    assert_eq!(field, "abcef");
    assert_eq!(snapshot.display, "abc\nef");
    assert_eq!(snapshot.cursor, 3);
}
