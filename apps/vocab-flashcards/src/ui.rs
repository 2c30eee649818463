//! UI rendering for vocab flashcards.

use crate::ads;
use crate::app::{App, DataStatus, View};
use crate::keys::SessionCommand;
use crate::markup::{self, Segment};
use crate::models::VocabItem;
use crate::session::ActiveGroup;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    draw_header(f, app, chunks[0]);

    match app.view() {
        View::Groups => {
            app.card_area = None;
            draw_groups(f, app, chunks[1]);
        }
        View::Study | View::WordList => draw_study(f, app, chunks[1]),
    }

    draw_footer(f, app, chunks[2]);

    if app.view() == View::WordList {
        draw_word_list(f, app);
    }

    if app.show_help {
        draw_help(f);
    }

    if app.editing {
        draw_input(f, app);
    }

    if let Some(msg) = &app.message {
        draw_message(f, msg);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "Vocab Flashcards",
        Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
    )];
    if app.data == DataStatus::Ready {
        spans.push(Span::styled(
            format!("   {} words • {} groups", app.word_count, app.group_ids().len()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_groups(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Groups ");

    match &app.data {
        DataStatus::Loading(source) => {
            let loading = app
                .pending_load
                .as_ref()
                .map_or(source.as_str(), |handle| handle.source());
            let msg = Paragraph::new(format!("Loading {}...", loading))
                .alignment(Alignment::Center)
                .block(block);
            f.render_widget(msg, area);
            return;
        }
        DataStatus::NoData(error) => {
            let msg = Paragraph::new(vec![
                Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))),
                Line::raw(""),
                Line::raw("Press 'o' to open a vocabulary file or 'r' to retry."),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
            f.render_widget(msg, area);
            return;
        }
        DataStatus::Ready => {}
    }

    if app.session.index().is_empty() {
        let msg = Paragraph::new("The dataset has no words. Press 'o' to open another file.")
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(msg, area);
        return;
    }

    let index = app.session.index();
    let items: Vec<ListItem> = app
        .group_ids()
        .iter()
        .enumerate()
        .map(|(i, &group)| {
            let shortcut = if i < 9 { format!("[{}] ", i + 1) } else { "    ".to_string() };
            let spans = vec![
                Span::styled(shortcut, Style::default().fg(Color::DarkGray)),
                Span::styled(format!("Group {}", group), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("  ({} words)", index.group_len(group)),
                    Style::default().fg(Color::Blue),
                ),
            ];
            ListItem::new(Line::from(spans)).style(if i == app.group_cursor {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            })
        })
        .collect();

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}

fn draw_study(f: &mut Frame, app: &mut App, area: Rect) {
    let Some(active) = app.session.state().active() else { return };
    let show_ad = app.config.display.show_ads && ads::should_show_ad(active.cursor());

    let mut constraints = vec![Constraint::Min(0)];
    if app.config.display.show_progress {
        constraints.insert(0, Constraint::Length(1));
    }
    if show_ad {
        constraints.push(Constraint::Length(3));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut next = 0;
    if app.config.display.show_progress {
        f.render_widget(progress_line(active), chunks[next]);
        next += 1;
    }

    let card_area = chunks[next];
    let card = card_paragraph(active, app.config.display.show_synonyms);
    f.render_widget(card, card_area);

    if show_ad {
        let slot = Paragraph::new(ads::slot_id(active.cursor()))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Sponsored "));
        f.render_widget(slot, chunks[next + 1]);
    }

    app.card_area = Some(card_area);
}

fn progress_line(active: &ActiveGroup) -> Paragraph<'static> {
    let mut text = if active.is_empty() {
        format!("Group {}", active.group())
    } else {
        format!("Group {} | Card {} of {}", active.group(), active.cursor() + 1, active.len())
    };
    if active.is_shuffled() {
        text.push_str(" | shuffled");
    }
    Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
}

fn card_paragraph(active: &ActiveGroup, show_synonyms: bool) -> Paragraph<'static> {
    let block = Block::default().borders(Borders::ALL).title(" Card ");
    let Some(item) = active.current() else {
        return Paragraph::new("No items in this group.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray))
            .block(block);
    };

    let hint = if active.revealed() { "Space to hide" } else { "Space to reveal" };
    let mut lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            item.word.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))).alignment(Alignment::Center),
        Line::raw(""),
    ];

    if active.revealed() {
        lines.extend(definition_lines(item, show_synonyms));
    }

    Paragraph::new(lines).wrap(Wrap { trim: false }).block(block)
}

fn definition_lines(item: &VocabItem, show_synonyms: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for def in &item.definitions {
        lines.push(Line::from(Span::styled(
            def.part_of_speech.to_uppercase(),
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(Span::styled(
            def.definition.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        if let Some(sentence) = &def.sentence {
            lines.extend(sentence_lines(&markup::parse_sentence(sentence)));
        }
        if show_synonyms && !def.synonyms.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Synonyms: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(def.synonyms.join(", "), Style::default().fg(Color::Gray)),
            ]));
        }
        lines.push(Line::raw(""));
    }
    lines
}

/// Turn sentence segments into lines, splitting on `<br>` newlines.
fn sentence_lines(segments: &[Segment]) -> Vec<Line<'static>> {
    let base = Style::default().fg(Color::Green);
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();

    for segment in segments {
        let mut style = base;
        if segment.emphasis.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if segment.emphasis.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if segment.emphasis.underline {
            style = style.add_modifier(Modifier::UNDERLINED);
        }

        let mut parts = segment.text.split('\n');
        if let Some(first) = parts.next() {
            if !first.is_empty() {
                current.push(Span::styled(first.to_string(), style));
            }
        }
        for part in parts {
            lines.push(Line::from(std::mem::take(&mut current)));
            if !part.is_empty() {
                current.push(Span::styled(part.to_string(), style));
            }
        }
    }
    lines.push(Line::from(current));
    lines
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.view() {
        View::Groups => "j/k:Navigate  Enter/1-9:Study  o:Open file  r:Reload  ?:Help  q:Quit".to_string(),
        View::Study => {
            let mut keys: Vec<String> = SessionCommand::ALL
                .iter()
                .map(|c| format!("{}:{}", c.key_label(), c.name()))
                .collect();
            keys.push("s:Shuffle  w:Words  ?:Help".to_string());
            keys.join("  ")
        }
        View::WordList => "j/k:Navigate  Enter:Jump  Esc:Back".to_string(),
    };

    let footer = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn draw_word_list(f: &mut Frame, app: &App) {
    let Some(active) = app.session.state().active() else { return };
    let area = centered_rect(50, 70, f.area());
    f.render_widget(Clear, area);

    let items: Vec<ListItem> = active
        .order()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let marker = if i == active.cursor() { "▶ " } else { "  " };
            ListItem::new(format!("{}{:>3}. {}", marker, i + 1, item.word))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(" Jump to word "));
    let mut state = ListState::default().with_selected(Some(app.word_cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(60, 80, f.area());
    f.render_widget(Clear, area);

    let help = r#"
Vocab Flashcards Keybindings

Groups:
  j/k, Up/Down    Navigate groups
  Enter           Study selected group
  1-9             Study the n-th group
  o               Open a vocabulary JSON file
  r               Reload the configured source
  q               Quit

Study:
  Right / Left    Next / previous card
  Space           Reveal or hide definitions
  Click card      Reveal or hide definitions
  s               Shuffle the group
  w               Jump to a word
  Home / End      First / last card
  Esc             Back to groups

General:
  ?               Show this help
  Ctrl-C          Quit

Press any key to close
"#;

    let popup = Paragraph::new(help)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: false });
    f.render_widget(popup, area);
}

fn draw_input(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 15, f.area());
    f.render_widget(Clear, area);

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(" Path to vocabulary JSON "));
    f.render_widget(input, area);

    let typed = app.input_buffer.chars().count().min(usize::from(area.width.saturating_sub(3))) as u16;
    f.set_cursor_position((area.x + 1 + typed, area.y + 1));
}

fn draw_message(f: &mut Frame, msg: &str) {
    let area = Rect::new(
        f.area().x + 2,
        f.area().height.saturating_sub(5),
        f.area().width.saturating_sub(4),
        3,
    )
    .intersection(f.area());
    if area.is_empty() {
        return;
    }
    f.render_widget(Clear, area);

    let message = Paragraph::new(msg)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{Dataset, Definition};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw_sized(app: &mut App, width: u16, height: u16) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn render(app: &mut App) -> String {
        screen(&draw_sized(app, 80, 30))
    }

    fn app_with(items: Vec<VocabItem>) -> App {
        let mut app = App::new(Config::default()).unwrap();
        app.replace_dataset(Dataset::new(items).unwrap());
        app
    }

    fn numbered(count: i64) -> Vec<VocabItem> {
        (0..count)
            .map(|k| VocabItem::new(k, 1, format!("word{k}"), Definition::new("noun", "meaning")))
            .collect()
    }

    #[test]
    fn test_loading_screen() {
        let mut app = App::new(Config::default()).unwrap();
        let screen = render(&mut app);
        assert!(screen.contains("Loading vocab-data.json..."));
    }

    #[test]
    fn test_group_list_and_status() {
        let mut app = app_with(vec![
            VocabItem::new(1, 1, "cat", Definition::new("noun", "a small feline")),
            VocabItem::new(2, 4, "dog", Definition::new("noun", "a loyal canine")),
        ]);
        let screen = render(&mut app);
        assert!(screen.contains("2 words • 2 groups"));
        assert!(screen.contains("Group 1"));
        assert!(screen.contains("Group 4"));
        assert!(app.card_area.is_none());
    }

    #[test]
    fn test_card_hidden_then_revealed() {
        let def = Definition::new("noun", "a small feline")
            .with_sentence("The <b>cat</b> slept.")
            .with_synonym("kitty");
        let mut app = app_with(vec![VocabItem::new(1, 1, "cat", def)]);
        app.session.select_group(Some(1)).unwrap();

        let hidden = render(&mut app);
        assert!(hidden.contains("cat"));
        assert!(hidden.contains("Card 1 of 1"));
        assert!(!hidden.contains("a small feline"));
        assert!(app.card_area.is_some());

        app.session.toggle_reveal();
        let shown = render(&mut app);
        assert!(shown.contains("NOUN"));
        assert!(shown.contains("a small feline"));
        assert!(shown.contains("The cat slept."));
        assert!(shown.contains("Synonyms: kitty"));
    }

    #[test]
    fn test_ad_slot_on_fifth_card() {
        let mut app = app_with(numbered(8));
        app.session.select_group(Some(1)).unwrap();
        assert!(!render(&mut app).contains("Sponsored"));

        app.session.jump_to(5).unwrap();
        let screen = render(&mut app);
        assert!(screen.contains("Sponsored"));
        assert!(screen.contains("ad-slot-5"));

        app.config.display.show_ads = false;
        assert!(!render(&mut app).contains("Sponsored"));
    }

    #[test]
    fn test_sentence_lines_split_on_breaks() {
        let lines = sentence_lines(&markup::parse_sentence("one<br>two <i>three</i>"));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].spans.len(), 2);
        assert!(lines[1].spans[1].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_message_on_tiny_terminal() {
        let mut app = App::new(Config::default()).unwrap();
        app.message = Some("No data loaded.".to_string());
        draw_sized(&mut app, 20, 2);
        draw_sized(&mut app, 4, 1);
        assert!(render(&mut app).contains("No data loaded."));
    }

    #[test]
    fn test_input_cursor_counts_chars() {
        let mut app = App::new(Config::default()).unwrap();
        app.editing = true;

        app.input_buffer = "hello".to_string();
        let ascii = draw_sized(&mut app, 80, 30).get_cursor_position().unwrap();
        app.input_buffer = "héllo".to_string();
        let accented = draw_sized(&mut app, 80, 30).get_cursor_position().unwrap();
        assert_eq!(ascii, accented);

        app.input_buffer = "x".repeat(200);
        let mut terminal = draw_sized(&mut app, 80, 30);
        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!(cursor.y, ascii.y);
        let buffer = terminal.backend().buffer();
        assert_eq!(buffer[(cursor.x + 1, cursor.y)].symbol(), "│");
    }
}
