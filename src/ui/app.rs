use std::cmp::min;
use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use tracing::warn;

use crate::error::LibraryError;
use crate::models::Book;
use crate::query::stats;
use crate::store::Library;

use super::forms::{BookField, BookForm, ConfirmBookRemove, RemoveTarget};
use super::helpers::{book_card_lines, centered_rect, chart_rows, surface_error};
use super::screens::{step_selection, SearchBar, SearchScreen, View};

/// Height of the view tabs at the top of the screen.
const HEADER_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height allocation per book card: three lines plus borders.
const BOOK_CARD_HEIGHT: u16 = 5;
/// Rows moved by PageUp/PageDown.
const PAGE_STEP: isize = 5;

/// Fine-grained modes layered over the current view.
enum Mode {
    Normal,
    AddingBook(BookForm),
    ConfirmRemove(ConfirmBookRemove),
    Searching(SearchBar),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Warning => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state. Owns the library for the whole session.
pub struct App {
    library: Library,
    view: View,
    selected: usize,
    search: SearchScreen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(library: Library) -> Self {
        Self {
            library,
            view: View::Library,
            selected: 0,
            search: SearchScreen::default(),
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Tell the user the file could not be read and that the session is
    /// carrying on with whatever is in memory.
    pub fn report_load_failure(&mut self, err: &LibraryError) {
        self.set_status(
            format!(
                "Could not load library ({}). Starting with an empty library.",
                surface_error(err)
            ),
            StatusKind::Warning,
        );
    }

    /// Feed one key press through the active mode. Returns `true` when the
    /// user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingBook(form) => self.handle_add_book(code, form),
            Mode::ConfirmRemove(confirm) => self.handle_confirm_remove(code, confirm),
            Mode::Searching(bar) => self.handle_search_bar(code, bar),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Mode::Normal;
            }
            KeyCode::Tab => {
                self.switch_view(self.view.next());
                return Mode::Normal;
            }
            KeyCode::BackTab => {
                self.switch_view(self.view.previous());
                return Mode::Normal;
            }
            KeyCode::Char('1') => {
                self.switch_view(View::Library);
                return Mode::Normal;
            }
            KeyCode::Char('2') => {
                self.switch_view(View::Search);
                return Mode::Normal;
            }
            KeyCode::Char('3') => {
                self.switch_view(View::Stats);
                return Mode::Normal;
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Mode::AddingBook(BookForm::default());
            }
            _ => {}
        }

        match self.view {
            View::Library => match code {
                KeyCode::Esc => *exit = true,
                KeyCode::Up => self.move_selection(-1),
                KeyCode::Down => self.move_selection(1),
                KeyCode::PageUp => self.move_selection(-PAGE_STEP),
                KeyCode::PageDown => self.move_selection(PAGE_STEP),
                KeyCode::Home => self.selected = 0,
                KeyCode::End => self.selected = self.library.len().saturating_sub(1),
                KeyCode::Char('-') | KeyCode::Delete => {
                    if let Some(book) = self.library.get(self.selected).cloned() {
                        self.clear_status();
                        return Mode::ConfirmRemove(ConfirmBookRemove {
                            target: RemoveTarget::Position(self.selected),
                            book,
                        });
                    }
                    self.set_status("No book selected to remove.", StatusKind::Error);
                }
                _ => {}
            },
            View::Search => match code {
                KeyCode::Esc => self.switch_view(View::Library),
                KeyCode::Char('f') | KeyCode::Char('/') => {
                    self.clear_status();
                    return Mode::Searching(SearchBar {
                        query: self.search.term.clone().unwrap_or_default(),
                        field: self.search.field,
                    });
                }
                KeyCode::Up => self.search.move_selection(-1),
                KeyCode::Down => self.search.move_selection(1),
                KeyCode::PageUp => self.search.move_selection(-PAGE_STEP),
                KeyCode::PageDown => self.search.move_selection(PAGE_STEP),
                KeyCode::Home => self.search.select_first(),
                KeyCode::End => self.search.select_last(),
                KeyCode::Char('-') | KeyCode::Delete => {
                    if let Some(book) = self.search.current_book().cloned() {
                        self.clear_status();
                        return Mode::ConfirmRemove(ConfirmBookRemove {
                            target: RemoveTarget::Id(book.id),
                            book,
                        });
                    }
                    self.set_status("No search result selected to remove.", StatusKind::Error);
                }
                _ => {}
            },
            View::Stats => {
                if code == KeyCode::Esc {
                    self.switch_view(View::Library);
                }
            }
        }

        Mode::Normal
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(err.as_ref());
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::AddingBook(form)
        } else {
            Mode::Normal
        }
    }

    fn handle_confirm_remove(&mut self, code: KeyCode, confirm: ConfirmBookRemove) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Removal cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let removed = match confirm.target {
                    RemoveTarget::Position(index) => self.library.remove(index),
                    RemoveTarget::Id(id) => self.library.remove_by_id(id),
                };
                match removed {
                    Ok(book) => {
                        self.selected = min(self.selected, self.library.len().saturating_sub(1));
                        self.search.refresh(self.library.books());
                        self.set_status(
                            format!("Book '{}' removed successfully!", book.title),
                            StatusKind::Info,
                        );
                    }
                    Err(err) => {
                        warn!(error = %err, "remove failed");
                        self.set_status(surface_error(&err), StatusKind::Error);
                    }
                }
                Mode::Normal
            }
            _ => Mode::ConfirmRemove(confirm),
        }
    }

    fn handle_search_bar(&mut self, code: KeyCode, mut bar: SearchBar) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Search cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab => bar.field = bar.field.next(),
            KeyCode::Backspace => {
                bar.query.pop();
            }
            KeyCode::Enter => {
                if bar.query.is_empty() {
                    self.set_status("Please enter a search term.", StatusKind::Warning);
                    return Mode::Searching(bar);
                }
                self.search
                    .run(self.library.books(), bar.query, bar.field);
                let hits = self.search.results.len();
                if hits == 0 {
                    self.set_status("No matching books found.", StatusKind::Info);
                } else {
                    self.set_status(
                        format!("Found {hits} matching book{}.", if hits == 1 { "" } else { "s" }),
                        StatusKind::Info,
                    );
                }
                return Mode::Normal;
            }
            KeyCode::Char(ch) if !ch.is_control() => bar.query.push(ch),
            _ => {}
        }
        Mode::Searching(bar)
    }

    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let new_book = form.parse_inputs()?;
        let title = self.library.add(new_book)?.title.clone();
        self.selected = self.library.len().saturating_sub(1);
        self.search.refresh(self.library.books());
        self.set_status(
            format!("Book '{title}' added to your library!"),
            StatusKind::Info,
        );
        Ok(())
    }

    fn switch_view(&mut self, view: View) {
        if self.view != view {
            self.clear_status();
        }
        self.view = view;
    }

    fn move_selection(&mut self, offset: isize) {
        self.selected = step_selection(self.selected, self.library.len(), offset);
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match self.view {
            View::Library => self.draw_library(frame, chunks[1]),
            View::Search => self.draw_search(frame, chunks[1]),
            View::Stats => self.draw_stats(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::ConfirmRemove(confirm) => self.draw_confirm_remove(frame, area, confirm),
            Mode::Searching(bar) => self.draw_search_bar(frame, chunks[1], bar),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let selected = View::ALL
            .iter()
            .position(|view| *view == self.view)
            .unwrap_or(0);
        let titles: Vec<Line> = View::ALL
            .iter()
            .enumerate()
            .map(|(idx, view)| Line::from(format!("{} {}", idx + 1, view.title())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(selected)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Library Management System"),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect) {
        if self.library.is_empty() {
            let message = Paragraph::new("Your library is empty. Press '+' to add some books!")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Library"));
            frame.render_widget(message, area);
            return;
        }
        self.render_book_cards(frame, area, self.library.books(), self.selected);
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let summary = match &self.search.term {
            Some(term) => Line::from(vec![
                Span::raw(format!("{} contains ", self.search.field)),
                Span::styled(
                    format!("\"{term}\""),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" • {} result(s)", self.search.results.len())),
            ]),
            None => Line::from("Press [f] to search by title, author, or genre."),
        };
        let header = Paragraph::new(summary)
            .block(Block::default().borders(Borders::ALL).title("Search Library"));
        frame.render_widget(header, chunks[0]);

        if self.search.term.is_some() && self.search.results.is_empty() {
            let message = Paragraph::new("No matching books found.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }
        self.render_book_cards(frame, chunks[1], &self.search.results, self.search.selected);
    }

    fn draw_stats(&self, frame: &mut Frame, area: Rect) {
        let stats = stats(self.library.books());
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ])
            .split(area);

        let metrics = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(chunks[0]);
        let metric_values = [
            ("Total Books", stats.total.to_string()),
            ("Books Read", stats.read_count.to_string()),
            ("Percent Read", format!("{}%", stats.percent_read)),
        ];
        for ((label, value), cell) in metric_values.iter().zip(metrics.iter()) {
            let paragraph = Paragraph::new(Span::styled(
                value.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(*label));
            frame.render_widget(paragraph, *cell);
        }

        let decades = stats.by_decade.iter().map(|(decade, count)| (format!("{decade}s"), *count));
        draw_tally_chart(frame, chunks[1], "Books by Genre", &chart_rows(stats.by_genre));
        draw_tally_chart(frame, chunks[2], "Books by Author", &chart_rows(stats.by_author));
        draw_tally_chart(frame, chunks[3], "Books by Decade", &chart_rows(decades));
    }

    fn render_book_cards(&self, frame: &mut Frame, area: Rect, books: &[Book], selected: usize) {
        if books.is_empty() || area.height == 0 {
            return;
        }

        let card_height = BOOK_CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = books.len();
        let mut start = if selected >= capacity {
            selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        let end = min(start + capacity, len);

        let constraints: Vec<Constraint> = (start..end)
            .map(|_| Constraint::Length(BOOK_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (book_index, chunk) in (start..end).zip(rows.iter()) {
            if chunk.height == 0 {
                continue;
            }
            let is_selected = book_index == selected;
            let mut block = Block::default().borders(Borders::ALL);
            if is_selected {
                block = block.border_style(Style::default().fg(Color::Yellow));
            }
            let paragraph = Paragraph::new(book_card_lines(&books[book_index], is_selected))
                .block(block)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Left);
            frame.render_widget(paragraph, *chunk);
        }
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&'static str, &'static str)] = match (&self.mode, self.view) {
            (Mode::AddingBook(_), _) => &[
                ("[Tab/↑↓]", "Field"),
                ("[Space]", "Toggle Read"),
                ("[Enter]", "Save"),
                ("[Esc]", "Cancel"),
            ],
            (Mode::ConfirmRemove(_), _) => &[("[y]", "Remove"), ("[n/Esc]", "Keep")],
            (Mode::Searching(_), _) => &[
                ("[Tab]", "Search By"),
                ("[Enter]", "Search"),
                ("[Esc]", "Cancel"),
            ],
            (Mode::Normal, View::Library) => &[
                ("[↑↓]", "Select"),
                ("[+]", "Add"),
                ("[-]", "Remove"),
                ("[Tab]", "Next View"),
                ("[q]", "Quit"),
            ],
            (Mode::Normal, View::Search) => &[
                ("[f]", "Search"),
                ("[↑↓]", "Select"),
                ("[+]", "Add"),
                ("[-]", "Remove"),
                ("[Tab]", "Next View"),
                ("[Esc]", "Back"),
                ("[q]", "Quit"),
            ],
            (Mode::Normal, View::Stats) => &[
                ("[+]", "Add"),
                ("[Tab]", "Next View"),
                ("[Esc]", "Back"),
                ("[q]", "Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (idx, (key, action)) in hints.iter().enumerate() {
            spans.push(Span::styled(*key, key_style));
            let separator = if idx + 1 == hints.len() { "" } else { "   " };
            spans.push(Span::raw(format!(" {action}{separator}")));
        }
        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add a New Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = BookField::ORDER
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Space toggles Read • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if form.active != BookField::Read {
            let row = BookField::ORDER
                .iter()
                .position(|field| *field == form.active)
                .unwrap_or(0) as u16;
            let prefix = form.active.label().len() as u16 + 2;
            let cursor_x = inner.x + prefix + form.value_len(form.active) as u16;
            frame.set_cursor_position((cursor_x, inner.y + row));
        }
    }

    fn draw_confirm_remove(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookRemove) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Remove Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Remove '{}' from your library?",
                confirm.book.display_title()
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, bar: &SearchBar) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Search by {} (Tab to change)", bar.field));
        let prompt = "Search: ";
        let paragraph = Paragraph::new(Span::raw(format!("{prompt}{}", bar.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + prompt.len() as u16 + bar.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

/// Horizontal bar chart for one tally, or a placeholder when there is no data.
fn draw_tally_chart(frame: &mut Frame, area: Rect, title: &str, rows: &[(String, u64)]) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    if rows.is_empty() {
        let message = Paragraph::new("No books yet.")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(message, area);
        return;
    }

    let bars: Vec<Bar> = rows
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .label(Line::from(label.clone()))
                .value(*value)
        })
        .collect();
    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(Color::Blue))
        .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}
