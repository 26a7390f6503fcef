use crate::palette::Palette;
use crate::srs::Quality;
use crate::stats::CardBucket;

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders},
};

/// Styles and span builders for the study screen.
pub struct Theme;

impl Theme {
    pub const KEY_FG: Color = Color::Rgb(255, 255, 255);

    pub fn label() -> Style {
        Style::default()
            .fg(Palette::ACCENT.tui())
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted() -> Style {
        Style::default().fg(Palette::BORDER.tui())
    }

    pub fn emphasis() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn quality(quality: Quality) -> Style {
        Style::default()
            .fg(Palette::quality(quality).tui())
            .add_modifier(Modifier::BOLD)
    }

    pub fn bucket(bucket: CardBucket) -> Style {
        Style::default().fg(Palette::bucket(bucket).tui())
    }

    pub fn option_correct() -> Style {
        Style::default()
            .fg(Palette::SUCCESS.tui())
            .add_modifier(Modifier::BOLD)
    }

    /// Wrong picks stay visible but read as disabled.
    pub fn option_wrong() -> Style {
        Style::default()
            .fg(Palette::DANGER.tui())
            .add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
    }

    pub fn backdrop<'a>() -> Block<'a> {
        Block::default()
    }

    pub fn panel_with_line<'a>(title: Line<'a>) -> Block<'a> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Palette::BORDER.tui()))
            .title(title)
            .title_alignment(Alignment::Left)
    }

    pub fn label_span(text: impl Into<String>) -> Span<'static> {
        Span::styled(text.into(), Self::label())
    }

    pub fn span(text: impl Into<String>) -> Span<'static> {
        Span::raw(text.into())
    }

    pub fn key_chip(text: impl Into<String>) -> Span<'static> {
        Span::styled(
            format!(" {} ", text.into()),
            Style::default()
                .fg(Self::KEY_FG)
                .bg(Palette::ACCENT.tui())
                .add_modifier(Modifier::BOLD),
        )
    }

    pub fn bullet() -> Span<'static> {
        Self::span(" • ")
    }

    pub fn section_header(text: impl Into<String>) -> Line<'static> {
        Line::from(vec![Span::styled(text.into(), Self::emphasis())])
    }

    /// "New 3 • Due 1 • Mastered 9" with each count in its bucket color.
    pub fn bucket_counts(counts: [(CardBucket, usize); 3]) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        for (i, (bucket, count)) in counts.into_iter().enumerate() {
            if i > 0 {
                spans.push(Self::bullet());
            }
            spans.push(Span::styled(
                format!("{} {}", bucket.label(), count),
                Self::bucket(bucket),
            ));
        }
        spans
    }
}
