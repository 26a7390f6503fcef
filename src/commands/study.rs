use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tracing::warn;

use crate::cache::CacheStore;
use crate::card::{CardKind, Flashcard};
use crate::config::Config;
use crate::session::{CategoryFilter, Mode, RatingOutcome, Session};
use crate::srs::Quality;
use crate::stats::CardBucket;
use crate::tui::Theme;
use crate::utils::{abbreviate, pluralize};

use super::open_session;

const FLASH_SECS: f64 = 2.0;

pub struct StudyOptions {
    pub review: bool,
    pub category: Option<String>,
    pub shuffle: bool,
    pub offline: bool,
}

pub async fn run(config: &Config, source: String, options: StudyOptions) -> Result<()> {
    let (mut session, store) = open_session(config, &source, options.offline).await?;

    apply_options(&mut session, &options);

    let mut screen = StudyScreen::new(session, store, source);
    let result = start_study_session(&mut screen);
    screen.save();
    result
}

fn apply_options(session: &mut Session, options: &StudyOptions) {
    if let Some(category) = &options.category {
        if !session.categories().iter().any(|label| label == category) {
            warn!(category = %category, "category not in sheet; the deck will be empty");
        }
        session.filter_category(CategoryFilter::from_label(category));
    }
    if options.review {
        session.set_mode(Mode::Review);
    }
    if options.shuffle && !session.shuffle(&mut rand::rng()) && session.mode() == Mode::Review {
        warn!("--shuffle ignored: review keeps the due order");
    }
}

struct LastRating {
    quality: Quality,
    interval: u32,
    at: Instant,
}

impl LastRating {
    fn print(&self) -> String {
        format!(
            " {} (See again in {})",
            self.quality.label(),
            pluralize("day", self.interval as usize)
        )
    }
}

/// Options already tried on one quiz card.
#[derive(Debug, Default)]
struct QuizPicks {
    uid: String,
    eliminated: Vec<usize>,
    solved: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuizChoice {
    Correct,
    Wrong,
}

struct StudyScreen {
    session: Session,
    store: CacheStore,
    source: String,
    show_answer: bool,
    last_rating: Option<LastRating>,
    quiz: QuizPicks,
}

impl StudyScreen {
    fn new(session: Session, store: CacheStore, source: String) -> Self {
        Self {
            session,
            store,
            source,
            show_answer: false,
            last_rating: None,
            quiz: QuizPicks::default(),
        }
    }

    /// Picks on the card currently showing, if any were made.
    fn quiz_picks(&self) -> Option<&QuizPicks> {
        let card = self.session.current_card()?;
        (self.quiz.uid == card.uid).then_some(&self.quiz)
    }

    /// Maps a letter key to an option of the current quiz card while it can
    /// still be answered.
    fn option_for_key(&self, key: char) -> Option<usize> {
        let card = self.session.current_card()?;
        if card.kind != CardKind::Quiz || self.show_answer {
            return None;
        }
        if self.quiz_picks().is_some_and(|picks| picks.solved.is_some()) {
            return None;
        }
        let idx = option_index(key)?;
        (idx < card.options.len()).then_some(idx)
    }

    /// Checks option `idx` of the current quiz card against its answer. A
    /// correct pick reveals the answer; a wrong one is struck out.
    fn choose_option(&mut self, idx: usize) -> Option<QuizChoice> {
        let card = self.session.current_card()?;
        if card.kind != CardKind::Quiz || self.show_answer {
            return None;
        }
        let option = card.options.get(idx)?;
        let correct = option.trim() == card.answer.trim();
        let uid = card.uid.clone();

        if self.quiz.uid != uid {
            self.quiz = QuizPicks {
                uid,
                ..QuizPicks::default()
            };
        }
        if self.quiz.solved.is_some() || self.quiz.eliminated.contains(&idx) {
            return None;
        }

        if correct {
            self.quiz.solved = Some(idx);
            self.show_answer = true;
            Some(QuizChoice::Correct)
        } else {
            self.quiz.eliminated.push(idx);
            Some(QuizChoice::Wrong)
        }
    }

    fn navigate(&mut self, step: isize) {
        // a rejected move keeps the current face showing
        if self.session.change_question(step) {
            self.show_answer = false;
        }
    }

    fn toggle_mode(&mut self) {
        self.session.set_mode(self.session.mode().toggled());
        self.show_answer = false;
    }

    fn cycle_category(&mut self) {
        let next = next_category(self.session.categories(), self.session.filter());
        self.session.filter_category(next);
        self.show_answer = false;
    }

    fn shuffle(&mut self) {
        if self.session.shuffle(&mut rand::rng()) {
            self.show_answer = false;
        }
    }

    fn rate(&mut self, quality: Quality) -> Result<RatingOutcome> {
        let outcome = self.session.handle_srs_action(quality)?;
        self.last_rating = Some(LastRating {
            quality,
            interval: outcome.next.interval,
            at: Instant::now(),
        });
        self.show_answer = false;
        self.save();
        Ok(outcome)
    }

    fn can_rate(&self) -> bool {
        self.session.mode() == Mode::Review
            && self.show_answer
            && self.session.current_card().is_some()
    }

    fn save(&self) {
        if let Err(err) = self.store.save(&self.source, &self.session.snapshot()) {
            warn!(error = ?err, "failed to save progress");
        }
    }
}

fn start_study_session(screen: &mut StudyScreen) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to configure terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to start terminal")?;
    terminal.hide_cursor().context("failed to hide cursor")?;

    let loop_result = study_loop(&mut terminal, screen);

    teardown_terminal(&mut terminal)?;
    loop_result
}

fn study_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    screen: &mut StudyScreen,
) -> Result<()> {
    loop {
        terminal
            .draw(|frame| {
                let area = frame.area();
                frame.render_widget(Theme::backdrop(), area);
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(5), Constraint::Length(5)])
                    .split(area);

                let card_widget = Paragraph::new(body_text(screen))
                    .block(Theme::panel_with_line(header_line(screen)))
                    .wrap(Wrap { trim: false });
                frame.render_widget(card_widget, chunks[0]);

                let footer = Paragraph::new(instructions_text(screen))
                    .block(Theme::panel_with_line(Theme::section_header("Controls")));
                frame.render_widget(footer, chunks[1]);
            })
            .context("failed to render frame")?;

        if event::poll(Duration::from_millis(16))?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            if key.code == KeyCode::Esc
                || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
            {
                break Ok(());
            }

            match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    if screen.session.current_card().is_some() {
                        screen.show_answer = !screen.show_answer;
                    }
                }
                KeyCode::Char(key) if screen.option_for_key(key).is_some() => {
                    if let Some(idx) = screen.option_for_key(key) {
                        screen.choose_option(idx);
                    }
                }
                KeyCode::Right | KeyCode::Char('n') => screen.navigate(1),
                KeyCode::Left | KeyCode::Char('p') => screen.navigate(-1),
                KeyCode::Tab => screen.toggle_mode(),
                KeyCode::Char('c' | 'C') => screen.cycle_category(),
                KeyCode::Char('s' | 'S') => screen.shuffle(),
                KeyCode::Char(key) if screen.can_rate() => {
                    if let Some(quality) = quality_for_key(key) {
                        screen.rate(quality)?;
                    }
                }
                _ => {}
            }
        }
    }
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to restore terminal")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

fn option_index(key: char) -> Option<usize> {
    key.is_ascii_lowercase().then(|| (key as u8 - b'a') as usize)
}

fn option_key(idx: usize) -> char {
    (b'a' + (idx % 26) as u8) as char
}

fn quality_for_key(key: char) -> Option<Quality> {
    match key {
        '1' => Some(Quality::Fail),
        '2' => Some(Quality::Hard),
        '3' => Some(Quality::Good),
        '4' => Some(Quality::Easy),
        _ => None,
    }
}

/// The category after `current` in the list, wrapping back to the start.
fn next_category(categories: &[String], current: &CategoryFilter) -> CategoryFilter {
    let idx = categories
        .iter()
        .position(|label| label == current.label())
        .map(|idx| (idx + 1) % categories.len())
        .unwrap_or(0);
    categories
        .get(idx)
        .map(|label| CategoryFilter::from_label(label))
        .unwrap_or_default()
}

fn header_line(screen: &StudyScreen) -> Line<'static> {
    let status = screen.session.status();
    let stats = screen.session.dashboard_stats();

    let mut spans = vec![
        Theme::label_span(format!(" {} ", status.mode.label())),
        Theme::span(format!("Card {}/{}", status.position, status.total)),
        Theme::bullet(),
        Theme::span(status.category.clone()),
    ];
    if status.mode == Mode::Review {
        spans.push(Theme::bullet());
        spans.push(Theme::span(format!("{} left", status.remaining)));
    }
    spans.push(Theme::bullet());
    spans.extend(Theme::bucket_counts([
        (CardBucket::New, stats.new),
        (CardBucket::Due, stats.due),
        (CardBucket::Mastered, stats.mastered),
    ]));
    spans.push(Theme::bullet());
    spans.push(Span::styled(abbreviate(&screen.source, 32), Theme::muted()));
    Line::from(spans)
}

fn body_text(screen: &StudyScreen) -> Vec<Line<'static>> {
    match screen.session.current_card() {
        Some(card) => card_lines(card, screen.show_answer, screen.quiz_picks()),
        None => empty_text(&screen.session)
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect(),
    }
}

fn empty_text(session: &Session) -> String {
    let status = session.status();
    match status.mode {
        Mode::Review if status.complete => {
            "Session complete. Nothing else is due today.\n\nPress Tab to browse.".to_string()
        }
        Mode::Review => format!(
            "No new or due cards in {}.\n\nPress c for another category or Tab to browse.",
            status.category
        ),
        Mode::Browse if session.cards().is_empty() => "This sheet has no cards.".to_string(),
        Mode::Browse => format!("No cards in {}.", status.category),
    }
}

fn card_lines(card: &Flashcard, show_answer: bool, picks: Option<&QuizPicks>) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("Q:")];
    lines.extend(card.question.lines().map(|line| Line::from(line.to_string())));

    if card.kind == CardKind::Quiz {
        lines.push(Line::default());
        for (i, option) in card.options.iter().enumerate() {
            let text = format!("  {}. {}", option_key(i), option);
            let line = match picks {
                Some(picks) if picks.solved == Some(i) => {
                    Line::from(Span::styled(format!("{text}  ✓"), Theme::option_correct()))
                }
                Some(picks) if picks.eliminated.contains(&i) => {
                    Line::from(Span::styled(text, Theme::option_wrong()))
                }
                Some(picks) if picks.solved.is_some() => {
                    Line::from(Span::styled(text, Theme::muted()))
                }
                _ => Line::from(text),
            };
            lines.push(line);
        }
    }

    lines.push(Line::default());
    lines.push(Line::from("A:"));
    if show_answer {
        lines.extend(card.answer.lines().map(|line| Line::from(line.to_string())));
        if !card.note.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from("Note:"));
            lines.extend(card.note.lines().map(|line| Line::from(line.to_string())));
        }
    }
    lines
}

fn instructions_text(screen: &StudyScreen) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let exit = [
        Theme::key_chip("Esc"),
        Theme::span(" / "),
        Theme::key_chip("Ctrl+C"),
        Theme::span(" exit"),
    ];

    if screen.can_rate() {
        let mut line = Vec::new();
        for (i, quality) in Quality::ALL.into_iter().enumerate() {
            line.push(Theme::key_chip((i + 1).to_string()));
            line.push(Span::styled(format!(" {}", quality.label()), Theme::quality(quality)));
            line.push(Theme::bullet());
        }
        line.extend(exit);
        lines.push(Line::from(line));
    } else {
        let mut line = vec![
            Theme::key_chip("Space"),
            Theme::span(if screen.show_answer { " hide answer" } else { " show answer" }),
            Theme::bullet(),
            Theme::key_chip("←/→"),
            Theme::span(" move"),
            Theme::bullet(),
        ];
        if let Some(card) = screen.session.current_card()
            && card.kind == CardKind::Quiz
            && !screen.show_answer
            && !card.options.is_empty()
        {
            let last = option_key(card.options.len().min(26) - 1);
            line.push(Theme::key_chip(format!("a-{last}")));
            line.push(Theme::span(" choose"));
            line.push(Theme::bullet());
        }
        if screen.session.mode() == Mode::Browse {
            line.push(Theme::key_chip("S"));
            line.push(Theme::span(" shuffle"));
            line.push(Theme::bullet());
        }
        line.extend(exit);
        lines.push(Line::from(line));
    }

    let switch_to = screen.session.mode().toggled().label().to_lowercase();
    lines.push(Line::from(vec![
        Theme::key_chip("Tab"),
        Theme::span(format!(" {switch_to}")),
        Theme::bullet(),
        Theme::key_chip("C"),
        Theme::span(format!(" category ({})", screen.session.filter())),
    ]));

    if let Some(rating) = &screen.last_rating
        && rating.at.elapsed().as_secs_f64() < FLASH_SECS
    {
        lines.push(Line::from(vec![
            Theme::span("Last:"),
            Span::styled(rating.print(), Theme::quality(rating.quality)),
        ]));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ALL_CATEGORIES;

    fn card(uid: &str, category: &str) -> Flashcard {
        Flashcard::new(uid, category, format!("question {uid}"), format!("answer {uid}"))
    }

    fn screen(cards: Vec<Flashcard>) -> (tempfile::TempDir, StudyScreen) {
        let tmp = tempfile::tempdir().unwrap();
        let store = CacheStore::open(tmp.path()).unwrap();
        let session = Session::new(cards).unwrap();
        (tmp, StudyScreen::new(session, store, "deck.csv".into()))
    }

    fn flatten_line(line: &Line<'_>) -> String {
        line.spans
            .iter()
            .map(|span| span.content.to_string())
            .collect::<String>()
    }

    fn quiz(uid: &str) -> Flashcard {
        let mut quiz = Flashcard::new(uid, "A", "sky color?", "blue");
        quiz.kind = CardKind::Quiz;
        quiz.options = vec!["red".into(), " blue ".into(), "green".into()];
        quiz
    }

    fn flatten_text(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(flatten_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn answer_hidden_until_revealed() {
        let mut quiz = card("1", "A");
        quiz.kind = CardKind::Quiz;
        quiz.options = vec!["red".into(), "blue".into()];
        quiz.note = "primary colors".into();

        let hidden = flatten_text(&card_lines(&quiz, false, None));
        assert!(hidden.contains("a. red"));
        assert!(hidden.contains("b. blue"));
        assert!(!hidden.contains("answer 1"));
        assert!(!hidden.contains("primary colors"));

        let shown = flatten_text(&card_lines(&quiz, true, None));
        assert!(shown.contains("answer 1"));
        assert!(shown.contains("primary colors"));
    }

    #[test]
    fn correct_quiz_pick_reveals_answer() {
        let (_tmp, mut screen) = screen(vec![quiz("q1")]);
        assert_eq!(screen.option_for_key('b'), Some(1));
        assert_eq!(screen.option_for_key('d'), None);

        // " blue " matches "blue" once trimmed
        assert_eq!(screen.choose_option(1), Some(QuizChoice::Correct));
        assert!(screen.show_answer);
        assert_eq!(screen.option_for_key('a'), None);
        assert_eq!(screen.choose_option(0), None);

        let lines = body_text(&screen);
        let picked = lines.iter().find(|line| flatten_line(line).contains("b.  blue")).unwrap();
        assert_eq!(picked.spans[0].style, Theme::option_correct());
        assert!(flatten_text(&lines).contains("blue"));
    }

    #[test]
    fn wrong_quiz_pick_is_struck_and_can_retry() {
        let (_tmp, mut screen) = screen(vec![quiz("q1"), quiz("q2")]);
        assert_eq!(screen.choose_option(0), Some(QuizChoice::Wrong));
        assert!(!screen.show_answer);
        assert_eq!(screen.choose_option(0), None);

        let lines = body_text(&screen);
        let struck = lines.iter().find(|line| flatten_line(line).contains("a. red")).unwrap();
        assert_eq!(struck.spans[0].style, Theme::option_wrong());

        assert_eq!(screen.choose_option(2), Some(QuizChoice::Wrong));
        assert_eq!(screen.choose_option(1), Some(QuizChoice::Correct));
        assert!(screen.show_answer);

        // picks belong to the card they were made on
        screen.navigate(1);
        assert!(screen.quiz_picks().is_none());
        assert_eq!(screen.choose_option(0), Some(QuizChoice::Wrong));
    }

    #[test]
    fn letter_keys_fall_through_on_plain_cards() {
        let (_tmp, screen) = screen(vec![card("1", "A")]);
        assert_eq!(screen.option_for_key('a'), None);
        assert_eq!(screen.option_for_key('n'), None);
    }

    #[test]
    fn rejected_navigation_keeps_answer_showing() {
        let (_tmp, mut screen) = screen(vec![card("1", "A")]);
        screen.session.set_mode(Mode::Review);
        screen.show_answer = true;
        screen.navigate(1);
        assert!(screen.show_answer);
    }

    #[test]
    fn rating_requires_revealed_answer_in_review() {
        let (_tmp, mut screen) = screen(vec![card("1", "A"), card("2", "A")]);
        screen.show_answer = true;
        assert!(!screen.can_rate());

        screen.toggle_mode();
        assert!(!screen.can_rate());
        screen.show_answer = true;
        assert!(screen.can_rate());

        let outcome = screen.rate(Quality::Good).unwrap();
        assert_eq!(outcome.uid, "1");
        assert!(!screen.show_answer);
        assert_eq!(screen.session.status().position, 2);
        assert!(screen.store.load("deck.csv").unwrap().is_some());
    }

    fn options(review: bool, category: Option<&str>, shuffle: bool) -> StudyOptions {
        StudyOptions {
            review,
            category: category.map(str::to_string),
            shuffle,
            offline: false,
        }
    }

    #[test]
    fn startup_options_shape_the_session() {
        let (_tmp, mut screen) = screen(vec![card("1", "A"), card("2", "B")]);
        apply_options(&mut screen.session, &options(true, Some("B"), true));
        assert_eq!(screen.session.mode(), Mode::Review);
        assert_eq!(screen.session.filter(), &CategoryFilter::Only("B".into()));
        assert_eq!(screen.session.current_card().map(|c| c.uid.as_str()), Some("2"));
    }

    #[test]
    fn unknown_category_leaves_an_empty_deck() {
        let (_tmp, mut screen) = screen(vec![card("1", "A")]);
        apply_options(&mut screen.session, &options(false, Some("missing"), false));
        assert!(screen.session.current_card().is_none());
        assert!(empty_text(&screen.session).contains("missing"));
    }

    #[test]
    fn rating_keys_map_to_scale() {
        assert_eq!(quality_for_key('1'), Some(Quality::Fail));
        assert_eq!(quality_for_key('4'), Some(Quality::Easy));
        assert_eq!(quality_for_key('5'), None);
    }

    #[test]
    fn category_cycle_wraps_to_all() {
        let categories = vec![ALL_CATEGORIES.to_string(), "A".into(), "B".into()];
        assert_eq!(
            next_category(&categories, &CategoryFilter::All),
            CategoryFilter::Only("A".into())
        );
        assert_eq!(
            next_category(&categories, &CategoryFilter::Only("B".into())),
            CategoryFilter::All
        );
        assert_eq!(
            next_category(&categories, &CategoryFilter::Only("gone".into())),
            CategoryFilter::All
        );
    }

    #[test]
    fn instructions_offer_ratings_only_when_ratable() {
        let (_tmp, mut screen) = screen(vec![card("1", "A")]);
        let browse = flatten_line(&instructions_text(&screen)[0]);
        assert!(browse.contains("shuffle"));
        assert!(!browse.contains("Easy"));

        screen.toggle_mode();
        screen.show_answer = true;
        let review = flatten_line(&instructions_text(&screen)[0]);
        assert!(review.contains("Fail"));
        assert!(review.contains("Easy"));
    }

    #[test]
    fn completed_review_says_so() {
        let (_tmp, mut screen) = screen(vec![card("1", "A")]);
        screen.toggle_mode();
        screen.show_answer = true;
        screen.rate(Quality::Easy).unwrap();
        assert!(empty_text(&screen.session).starts_with("Session complete"));

        let last = flatten_line(instructions_text(&screen).last().unwrap());
        assert!(last.contains("Easy (See again in 1 day)"));
    }

    #[test]
    fn header_shows_position_and_counts() {
        let (_tmp, screen) = screen(vec![card("1", "A"), card("2", "B")]);
        let header = flatten_line(&header_line(&screen));
        assert!(header.contains("Card 1/2"));
        assert!(header.contains("New 2"));
        assert!(header.contains(ALL_CATEGORIES));
    }
}
