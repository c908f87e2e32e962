// TUI module for rendering the terminal interface
pub mod colors;
pub mod input;
pub mod picture;

// Re-exports
pub use colors::*;
pub use input::{handle_key_event, handle_mouse_event, KeyAction, MouseAction};
pub use picture::PictureCache;

use crate::app::{App, NoticeKind, View};
use crate::domain::{Direction as Swipe, Item};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap,
    },
    Frame,
};
use std::time::Instant;

/// Renders one frame and returns where the top card was drawn, if any
pub fn render(
    frame: &mut Frame,
    app: &App,
    pictures: &mut PictureCache,
    now: Instant,
) -> Option<Rect> {
    let view = app.view(now);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Header with progress
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Notice
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app, view);
    let card_area = match view {
        View::Loading => {
            render_loading(frame, chunks[1], app);
            None
        }
        View::Swiping => render_card(frame, chunks[1], app, pictures, now),
        View::Collection => {
            render_collection(frame, chunks[1], app, pictures);
            None
        }
    };
    render_notice(frame, chunks[2], app);
    render_footer(frame, chunks[3], view, app.load_error().is_some());

    if app.show_help() {
        render_help_overlay(frame);
    }
    card_area
}

/// Renders the header with the remaining-cards gauge
fn render_header(frame: &mut Frame, area: Rect, app: &App, view: View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(2)])
        .split(area);

    let session = app.session();
    let total = session.items().len();
    let remaining = session.remaining();

    let mut info = match view {
        View::Loading => vec![Span::styled(
            format!("Fetching {} cats", app.config().batch_size),
            Style::default().fg(TEXT_SECONDARY),
        )],
        View::Swiping => vec![Span::styled(
            format!("{} to go", remaining),
            Style::default().fg(TEXT_SECONDARY),
        )],
        View::Collection => vec![Span::styled(
            format!("{} liked out of {}", session.liked().len(), total),
            Style::default().fg(TEXT_SECONDARY),
        )],
    };
    if view == View::Swiping {
        if let Some(direction) = session.last_direction() {
            info.push(Span::raw("  "));
            info.push(Span::styled("Last: ", Style::default().fg(TEXT_SECONDARY)));
            info.push(Span::styled(
                direction.feedback(),
                Style::default()
                    .fg(swipe_color(direction))
                    .add_modifier(Modifier::BOLD),
            ));
        }
    }

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            " Catswp ",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(info),
    ])
    .block(
        Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_COLOR)),
    )
    .alignment(Alignment::Left);
    frame.render_widget(header, chunks[0]);

    let progress = if view == View::Swiping && total > 0 {
        remaining as f64 / total as f64
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .gauge_style(Style::default().fg(ACCENT_SECONDARY).bg(BG_DARK))
        .ratio(progress.clamp(0.0, 1.0))
        .label(format!("{}/{} left", if view == View::Swiping { remaining } else { 0 }, total));
    frame.render_widget(gauge, chunks[1]);
}

fn render_loading(frame: &mut Frame, area: Rect, app: &App) {
    let loading_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, loading_area);

    let (title, border, lines) = match app.load_error() {
        Some(error) => (
            " No Cats ",
            ACCENT_PRIMARY,
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    "[!] Could not fetch any cats",
                    Style::default()
                        .fg(ACCENT_PRIMARY)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(error.to_string()),
                Line::from(""),
                Line::from(Span::styled(
                    "Press r to try again",
                    Style::default().fg(TEXT_SECONDARY),
                )),
            ],
        ),
        None => {
            // Spinner frame from wall-clock time
            let spinners = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
            let millis = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis();
            let spinner = spinners[(millis / 100) as usize % spinners.len()];
            (
                " Loading ",
                ACCENT_HIGHLIGHT,
                vec![
                    Line::from(""),
                    Line::from(vec![
                        Span::styled(
                            format!("{} ", spinner),
                            Style::default().fg(ACCENT_HIGHLIGHT),
                        ),
                        Span::styled(
                            "Summoning kittens...",
                            Style::default()
                                .fg(TEXT_PRIMARY)
                                .add_modifier(Modifier::BOLD),
                        ),
                    ]),
                ],
            )
        }
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(border))
                .style(Style::default().bg(BG_DARK)),
        )
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_PRIMARY))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, loading_area);
}

/// A rectangle in unclipped coordinates; cards slide past the screen edge while flying out
#[derive(Debug, Clone, Copy)]
struct VirtualRect {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl VirtualRect {
    /// Visible part inside `bounds`, plus how many columns were cut off on the left
    fn clip(self, bounds: Rect) -> Option<(Rect, u16)> {
        let left = self.x.max(bounds.x as i32);
        let right = (self.x + self.width).min(bounds.right() as i32);
        let top = self.y.max(bounds.y as i32);
        let bottom = (self.y + self.height).min(bounds.bottom() as i32);
        if right <= left || bottom <= top {
            return None;
        }
        let rect = Rect::new(
            left as u16,
            top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        );
        Some((rect, (left - self.x) as u16))
    }
}

/// Draws the top card, shifted by its drag or fly-out offset
fn render_card(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    pictures: &mut PictureCache,
    now: Instant,
) -> Option<Rect> {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let (card_bounds, hint_area) = (chunks[0], chunks[1]);

    render_swipe_hints(frame, hint_area);

    let item = app.session().current_item()?;
    let offset = app.card_offset(now);

    // Portrait cats: two pixels per row, roughly 4:5
    let card_width = card_bounds
        .width
        .saturating_sub(4)
        .min(card_bounds.height.saturating_mul(8) / 5 + 2);
    let card = VirtualRect {
        x: card_bounds.x as i32 + (card_bounds.width - card_width) as i32 / 2 + offset,
        y: card_bounds.y as i32,
        width: card_width as i32,
        height: card_bounds.height as i32,
    };
    let (drawn, _) = card.clip(card_bounds)?;

    let border = match offset.signum() {
        1 => ACCENT_SECONDARY,
        -1 => ACCENT_PRIMARY,
        _ => BORDER_COLOR,
    };
    frame.render_widget(Clear, drawn);
    frame.render_widget(
        Block::default()
            .title(format!(" Cat #{} ", item.id))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(BG_DARK)),
        drawn,
    );

    let inner_width = card.width - 2;
    // One row is kept free for the stamp
    let picture_rows = card.height - 3;
    if inner_width <= 0 || picture_rows <= 0 {
        return Some(drawn);
    }

    if offset != 0 {
        let direction = if offset > 0 { Swipe::Right } else { Swipe::Left };
        let stamp = VirtualRect {
            x: card.x + 1,
            y: card.y + 1,
            width: inner_width,
            height: 1,
        };
        if let Some((stamp_area, _)) = stamp.clip(card_bounds) {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    direction.feedback(),
                    Style::default()
                        .fg(swipe_color(direction))
                        .add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center),
                stamp_area,
            );
        }
    }

    if let Some(lines) =
        pictures.lines(app.cache(), item.display, inner_width as u16, picture_rows as u16)
    {
        let picture_width = lines.first().map(|line| line.spans.len()).unwrap_or(0) as i32;
        let picture = VirtualRect {
            x: card.x + 1 + (inner_width - picture_width) / 2,
            y: card.y + 2,
            width: picture_width,
            height: lines.len() as i32,
        };
        if let Some((picture_area, cut_left)) = picture.clip(card_bounds) {
            frame.render_widget(
                Paragraph::new(lines.to_vec()).scroll((0, cut_left)),
                picture_area,
            );
        }
    }

    Some(drawn)
}

fn render_swipe_hints(frame: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled(
            "← Nope",
            Style::default()
                .fg(ACCENT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("        "),
        Span::styled(
            "Like! →",
            Style::default()
                .fg(ACCENT_SECONDARY)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(hints).alignment(Alignment::Center), area);
}

/// Renders the liked collection with a preview of the selected cat
fn render_collection(frame: &mut Frame, area: Rect, app: &App, pictures: &mut PictureCache) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let liked = app.session().liked();
    let block = Block::default()
        .title(" Your Collection ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("You adopted {} cats today!", liked.len()),
            Style::default()
                .fg(ACCENT_SECONDARY)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        parts[0],
    );

    if liked.is_empty() {
        let lines = vec![
            Line::from(Span::styled(
                "Maybe next time?",
                Style::default()
                    .fg(TEXT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press r to play again",
                Style::default().fg(TEXT_SECONDARY),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), parts[1]);
        render_preview(frame, chunks[1], app, None, pictures);
        return;
    }

    let items: Vec<ListItem> = liked
        .iter()
        .map(|item| ListItem::new(format!("Cat #{}", item.id)))
        .collect();
    let list = List::new(items)
        .style(Style::default().fg(TEXT_PRIMARY))
        .highlight_style(
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");
    let mut state = ListState::default().with_selected(Some(app.selected()));
    frame.render_stateful_widget(list, parts[1], &mut state);

    render_preview(frame, chunks[1], app, app.selected_item(), pictures);
}

fn render_preview(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    item: Option<&Item>,
    pictures: &mut PictureCache,
) {
    let title = item
        .map(|item| format!(" Cat #{} ", item.id))
        .unwrap_or_else(|| " Preview ".to_string());
    let block = Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = item
        .and_then(|item| pictures.lines(app.cache(), item.display, inner.width, inner.height))
        .map(|lines| lines.to_vec())
        .unwrap_or_default();
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn render_notice(frame: &mut Frame, area: Rect, app: &App) {
    let Some(notice) = app.notice() else {
        return;
    };
    let color = match notice.kind {
        NoticeKind::Info => ACCENT_SECONDARY,
        NoticeKind::Error => ACCENT_PRIMARY,
    };
    frame.render_widget(
        Paragraph::new(Span::styled(notice.text.as_str(), Style::default().fg(color)))
            .alignment(Alignment::Center),
        area,
    );
}

/// Renders the footer with the controls for the current view
fn render_footer(frame: &mut Frame, area: Rect, view: View, load_failed: bool) {
    let keys: &[(&str, &str, Color)] = match view {
        View::Loading if load_failed => &[
            ("r ", "Retry", ACCENT_HIGHLIGHT),
            ("q ", "Quit", TEXT_SECONDARY),
        ],
        View::Loading => &[("q ", "Quit", TEXT_SECONDARY)],
        View::Swiping => &[
            ("← ", "Nope", ACCENT_PRIMARY),
            ("→ ", "Like", ACCENT_SECONDARY),
            ("? ", "Help", TEXT_SECONDARY),
            ("q ", "Quit", TEXT_SECONDARY),
        ],
        View::Collection => &[
            ("↑↓ ", "Select", TEXT_SECONDARY),
            ("d ", "Save", ACCENT_SECONDARY),
            ("s ", "Share", ACCENT_SECONDARY),
            ("r ", "Play again", ACCENT_HIGHLIGHT),
            ("q ", "Quit", TEXT_SECONDARY),
        ],
    };

    let mut spans = Vec::with_capacity(keys.len() * 3);
    for (i, (key, label, color)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  │  "));
        }
        spans.push(Span::styled(
            *key,
            Style::default().fg(*color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(*label, Style::default().fg(TEXT_SECONDARY)));
    }

    let footer = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

/// Renders the help overlay
pub fn render_help_overlay(frame: &mut Frame) {
    let help_area = centered_rect(50, 70, frame.area());
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let row = |key: &'static str, color: Color, text: &'static str| {
        Line::from(vec![
            Span::styled(key, Style::default().fg(color)),
            Span::raw(text),
        ])
    };
    let help_lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        row("→ or l  ", ACCENT_SECONDARY, "  Like"),
        row("← or h  ", ACCENT_PRIMARY, "  Nope"),
        row("drag    ", TEXT_SECONDARY, "  Swipe with the mouse"),
        Line::from(""),
        row("↑↓      ", TEXT_SECONDARY, "  Select a liked cat"),
        row("d       ", ACCENT_SECONDARY, "  Save to disk"),
        row("s       ", ACCENT_SECONDARY, "  Share link"),
        row("r       ", ACCENT_HIGHLIGHT, "  Play again"),
        Line::from(""),
        row("q or Esc", TEXT_SECONDARY, "  Quit"),
        row("?       ", TEXT_SECONDARY, "  Toggle help"),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];

    let paragraph = Paragraph::new(help_lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_PRIMARY));
    frame.render_widget(paragraph, inner);
}

fn swipe_color(direction: Swipe) -> Color {
    match direction {
        Swipe::Right => ACCENT_SECONDARY,
        Swipe::Left => ACCENT_PRIMARY,
    }
}

/// Helper to create a centered rect
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
