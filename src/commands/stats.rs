use anyhow::Result;

use crate::config::Config;
use crate::palette::Palette;
use crate::session::Session;
use crate::stats::{CardBucket, DashboardStats, category_breakdown};
use crate::utils::pluralize;

use super::open_session;

pub async fn run(config: &Config, source: String, offline: bool) -> Result<()> {
    let (session, store) = open_session(config, &source, offline).await?;
    store.save(&source, &session.snapshot())?;

    let summary = render_plain_summary(&session);
    print!("{summary}");
    Ok(())
}

fn render_plain_summary(session: &Session) -> String {
    let stats = session.dashboard_stats();
    let today = session.today();
    let mut out = String::new();

    out.push_str(&format!(
        "{}\n",
        Palette::paint(Palette::ACCENT, "Collection Summary")
    ));
    out.push_str(&format!(
        "{} {}\n",
        Palette::dim("Cards loaded:"),
        Palette::paint(Palette::INFO, stats.total())
    ));
    out.push_str(&bucket_line(&stats));

    let due_color = if stats.reviewable() > 0 {
        Palette::WARNING
    } else {
        Palette::SUCCESS
    };
    out.push_str(&format!(
        "{} {}\n",
        Palette::dim("To review today:"),
        Palette::paint(due_color, pluralize("card", stats.reviewable()))
    ));

    out.push_str(&format!(
        "\n{}\n",
        Palette::paint(Palette::ACCENT, "By Category")
    ));
    let breakdown = category_breakdown(session.cards(), today);
    if breakdown.is_empty() {
        out.push_str(&format!("{}\n", Palette::dim("No categories found.")));
    }
    let width = breakdown
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);
    for (name, category_stats) in &breakdown {
        let padding = " ".repeat(width - name.chars().count());
        out.push_str(&format!(
            "{}{} {}",
            Palette::dim(format!("{name}:")),
            padding,
            bucket_line(category_stats)
        ));
    }

    out.push_str(&format!(
        "\n{} {}\n",
        Palette::dim("As of"),
        Palette::paint(Palette::INFO, today.format("%Y-%m-%d"))
    ));
    out
}

fn bucket_line(stats: &DashboardStats) -> String {
    let parts: Vec<String> = [CardBucket::New, CardBucket::Due, CardBucket::Mastered]
        .into_iter()
        .map(|bucket| {
            format!(
                "{} {}",
                Palette::dim(format!("{}:", bucket.label())),
                Palette::paint(Palette::bucket(bucket), stats.get(bucket))
            )
        })
        .collect();
    format!("{}\n", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Flashcard;

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for next in chars.by_ref() {
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn summary_lists_counts_and_categories() {
        let session = Session::new(vec![
            Flashcard::new("1", "Verbs", "to be", "ser"),
            Flashcard::new("2", "Nouns", "cat", "gato"),
            Flashcard::new("3", "Verbs", "to have", "tener"),
        ])
        .unwrap();

        let summary = strip_ansi(&render_plain_summary(&session));
        assert!(summary.contains("Cards loaded: 3"));
        assert!(summary.contains("New: 3 Due: 0 Mastered: 0"));
        assert!(summary.contains("To review today: 3 cards"));

        let verbs = summary.find("Verbs:").unwrap();
        let nouns = summary.find("Nouns:").unwrap();
        assert!(verbs < nouns);
        assert!(summary.contains("Verbs: New: 2"));
    }

    #[test]
    fn empty_sheet_still_renders() {
        let session = Session::new(vec![]).unwrap();
        let summary = strip_ansi(&render_plain_summary(&session));
        assert!(summary.contains("Cards loaded: 0"));
        assert!(summary.contains("No categories found."));
    }
}
