//! Kanban board for one project.
//!
//! Four columns, one per stage. Cards move between neighbouring columns
//! through the task store, so a forward move into a document column is
//! recorded as a generation request exactly as it would be over HTTP.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::archive_store::ArchiveStore;
use crate::db::Workspace;
use crate::error::Result;
use crate::kanban::{self, KANBAN_COLUMNS};
use crate::project_store::ProjectStore;
use crate::task::Task;
use crate::task_store::TaskStore;
use crate::tui::colors::{stage_color, text_on};

const CARD_HEIGHT: usize = 5;

pub struct WorkflowApp {
    tasks: TaskStore,
    archives: ArchiveStore,
    project_id: String,
    project_name: String,
    board: Vec<Task>,
    /// Task ids per column, in board order.
    columns: [Vec<String>; 4],
    selected_column: usize,
    selected_card: usize,
    column_scroll_offsets: [usize; 4],
    status_message: String,
    show_task_detail: bool,
    filter_active: bool,
    filter_text: String,
}

impl WorkflowApp {
    pub fn new(workspace: &Workspace, project_id: &str) -> Result<Self> {
        let project = ProjectStore::new(workspace).require(project_id)?;
        let mut app = WorkflowApp {
            tasks: TaskStore::new(workspace),
            archives: ArchiveStore::new(workspace),
            project_id: project.id,
            project_name: project.name,
            board: Vec::new(),
            columns: Default::default(),
            selected_column: 0,
            selected_card: 0,
            column_scroll_offsets: [0; 4],
            status_message: String::new(),
            show_task_detail: false,
            filter_active: false,
            filter_text: String::new(),
        };
        app.reload()?;
        Ok(app)
    }

    fn reload(&mut self) -> Result<()> {
        self.board = self.tasks.list(&self.project_id)?;
        self.update_columns();
        Ok(())
    }

    fn update_columns(&mut self) {
        for (i, column) in self.columns.iter_mut().enumerate() {
            column.clear();
            self.column_scroll_offsets[i] = 0;
        }

        let filter = self.filter_text.to_lowercase();
        for task in &self.board {
            if !filter.is_empty()
                && !task.title.to_lowercase().contains(&filter)
                && !task.feature_list.to_lowercase().contains(&filter)
            {
                continue;
            }
            self.columns[kanban::column_index(task.status)].push(task.id.clone());
        }

        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if self.selected_column >= self.columns.len() {
            self.selected_column = 0;
        }
        let len = self.columns[self.selected_column].len();
        if len == 0 {
            self.selected_card = 0;
        } else if self.selected_card >= len {
            self.selected_card = len - 1;
        }
    }

    fn task(&self, id: &str) -> Option<&Task> {
        self.board.iter().find(|t| t.id == id)
    }

    fn selected_task_id(&self) -> Option<String> {
        self.columns[self.selected_column].get(self.selected_card).cloned()
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    /// Move the selected card one column left or right.
    fn move_card(&mut self, forward: bool) {
        let Some(task_id) = self.selected_task_id() else {
            return;
        };
        let from = KANBAN_COLUMNS[self.selected_column].status;
        let target = if forward { kanban::next_status(from) } else { kanban::previous_status(from) };
        let Some(to) = target else {
            return;
        };

        if let Err(e) = self.tasks.set_status(&task_id, to).and_then(|_| self.reload()) {
            self.set_status_message(format!("Error saving: {e}"));
            return;
        }

        let title = kanban::column(to).title;
        if kanban::triggers_generation(from, to) {
            self.set_status_message(format!("Moved task to {title}, generation requested"));
        } else {
            self.set_status_message(format!("Moved task to {title}"));
        }

        self.selected_column = kanban::column_index(to);
        match self.columns[self.selected_column].iter().position(|id| *id == task_id) {
            Some(pos) => self.selected_card = pos,
            None => self.clamp_selection(),
        }
    }

    fn archive_selected(&mut self) {
        let Some(task_id) = self.selected_task_id() else {
            return;
        };
        match self.archives.archive(&self.project_id, &task_id) {
            Ok(_) => {
                if let Err(e) = self.reload() {
                    self.set_status_message(format!("Error reloading: {e}"));
                } else {
                    self.set_status_message("Task archived");
                }
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    /// Returns true when the board should close.
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.filter_active {
            match code {
                KeyCode::Esc => {
                    self.filter_active = false;
                    self.filter_text.clear();
                    self.update_columns();
                    self.status_message.clear();
                }
                KeyCode::Enter => {
                    self.filter_active = false;
                    if self.filter_text.is_empty() {
                        self.set_status_message("Filter cleared");
                    } else {
                        let shown: usize = self.columns.iter().map(Vec::len).sum();
                        self.set_status_message(format!("Filter: '{}' ({shown} tasks shown)", self.filter_text));
                    }
                }
                KeyCode::Backspace => {
                    if self.filter_text.pop().is_some() {
                        self.update_columns();
                    }
                }
                KeyCode::Char(c) => {
                    self.filter_text.push(c);
                    self.update_columns();
                }
                _ => {}
            }
            return false;
        }

        self.status_message.clear();

        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Enter => self.show_task_detail = !self.show_task_detail,

            KeyCode::Left if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SHIFT) => {
                self.move_card(false)
            }
            KeyCode::Right if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SHIFT) => {
                self.move_card(true)
            }
            KeyCode::Char('<') => self.move_card(false),
            KeyCode::Char('>') => self.move_card(true),

            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right => {
                if self.selected_column < self.columns.len() - 1 {
                    self.selected_column += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up => {
                self.selected_card = self.selected_card.saturating_sub(1);
            }
            KeyCode::Down => {
                let len = self.columns[self.selected_column].len();
                if len > 0 && self.selected_card < len - 1 {
                    self.selected_card += 1;
                }
            }

            KeyCode::Char('a') => self.archive_selected(),
            KeyCode::Char('r') => match self.reload() {
                Ok(()) => self.set_status_message("Reloaded"),
                Err(e) => self.set_status_message(format!("Error reloading: {e}")),
            },
            KeyCode::Char('/') => {
                self.filter_active = true;
                self.set_status_message("Filter: type to search title/features, Enter to apply, Esc to cancel");
            }
            KeyCode::Char('h') => {
                self.set_status_message(
                    "Help: Enter: Details | Ctrl/Shift+Arrow or </>: Move card | a: Archive | /: Filter | r: Reload | q: Quit",
                );
            }
            _ => {}
        }
        false
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_board(f, chunks[1]);
        self.render_status_bar(f, chunks[2]);

        if self.show_task_detail {
            self.render_task_detail_popup(f);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let header = Line::from(vec![
            Span::styled("DESIGN WORKFLOW", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("Project: {}", self.project_name),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]);
        let block = Paragraph::new(header)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(block, area);
    }

    fn render_board(&mut self, f: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25); 4])
            .split(area);

        for (i, &column_area) in layout.iter().enumerate() {
            self.render_column(f, column_area, i);
        }
    }

    fn render_column(&mut self, f: &mut Frame, area: Rect, column_index: usize) {
        let column = &KANBAN_COLUMNS[column_index];
        let color = stage_color(column.status);
        let is_selected = column_index == self.selected_column;

        let border_style = if is_selected {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let title = format!("{} ({})", column.title, self.columns[column_index].len());
        let block = Block::default().borders(Borders::ALL).title(title).border_style(border_style);
        let inner = block.inner(area);
        f.render_widget(block, area);

        if self.columns[column_index].is_empty() {
            return;
        }

        let available_height = inner.height as usize;
        let visible_cards = available_height / CARD_HEIGHT;

        // Keep the selected card in view.
        let mut offset = self.column_scroll_offsets[column_index];
        if is_selected {
            if self.selected_card < offset {
                offset = self.selected_card;
            } else if visible_cards > 0 && self.selected_card >= offset + visible_cards {
                offset = self.selected_card + 1 - visible_cards;
            }
            self.column_scroll_offsets[column_index] = offset;
        }

        let mut y = 0;
        let mut rendered = 0;
        for (card_index, task_id) in self.columns[column_index].iter().enumerate().skip(offset) {
            if y + CARD_HEIGHT > available_height {
                break;
            }
            let Some(task) = self.task(task_id) else {
                continue;
            };
            let card_area = Rect {
                x: inner.x,
                y: inner.y + y as u16,
                width: inner.width,
                height: CARD_HEIGHT as u16,
            };
            render_card(f, card_area, task, is_selected && card_index == self.selected_card);
            y += CARD_HEIGHT;
            rendered += 1;
        }

        let indicator_style = Style::default().fg(Color::Cyan);
        if offset > 0 {
            let above = Paragraph::new(format!("▲ +{offset} above")).style(indicator_style);
            f.render_widget(above, Rect { height: 1, ..inner });
        }
        let remaining = self.columns[column_index].len().saturating_sub(offset + rendered);
        if remaining > 0 && inner.height > 0 {
            let below = Paragraph::new(format!("▼ +{remaining} below")).style(indicator_style);
            f.render_widget(below, Rect { y: inner.y + inner.height - 1, height: 1, ..inner });
        }
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if self.filter_active {
            format!("Filter: {} | Type to search, Enter to apply, Esc to cancel", self.filter_text)
        } else if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            let total: usize = self.columns.iter().map(Vec::len).sum();
            let filter = if self.filter_text.is_empty() {
                String::new()
            } else {
                format!(" [Filter: {}]", self.filter_text)
            };
            format!("Tasks: {total}{filter} | </>: Move | a: Archive | /: Filter | h: Help")
        };

        let color = stage_color(KANBAN_COLUMNS[self.selected_column].status);
        let status = Paragraph::new(text).style(Style::default().bg(color).fg(text_on(color)));
        f.render_widget(status, area);
    }

    fn render_task_detail_popup(&self, f: &mut Frame) {
        let Some(task) = self.selected_task_id().and_then(|id| self.task(&id)) else {
            return;
        };

        let area = f.area();
        let width = area.width * 80 / 100;
        let height = area.height * 80 / 100;
        let popup_area = Rect::new((area.width - width) / 2, (area.height - height) / 2, width, height);
        f.render_widget(Clear, popup_area);

        let doc = |d: &Option<String>| match d.as_deref() {
            Some(s) if !s.is_empty() => format!("{} chars", s.chars().count()),
            _ => "-".to_string(),
        };
        let references = if task.references.is_empty() { "-".to_string() } else { task.references.join(", ") };

        let lines = vec![
            Line::from(Span::styled(task.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(format!("Stage:        {}", kanban::column(task.status).title)),
            Line::from(format!("Design doc:   {}", doc(&task.design_document))),
            Line::from(format!("PRD:          {}", doc(&task.prd))),
            Line::from(format!("Prototype:    {}", doc(&task.prototype))),
            Line::from(format!("References:   {references}")),
            Line::from(format!("Q&A answers:  {}", task.qa_answers.len())),
            Line::from(format!("Revisions:    {}", task.revisions.len())),
            Line::from(format!("Created:      {}", task.created_at.format("%Y-%m-%d %H:%M"))),
            Line::from(format!("Updated:      {}", task.updated_at.format("%Y-%m-%d %H:%M"))),
            Line::from(""),
            Line::from("Feature list:"),
            Line::from(if task.feature_list.is_empty() { "-".to_string() } else { task.feature_list.clone() }),
        ];

        let color = stage_color(task.status);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Task Details (Press Enter to close)")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
        let popup = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(Color::Black));
        f.render_widget(popup, popup_area);
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key.code, key.modifiers) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn render_card(f: &mut Frame, area: Rect, task: &Task, is_selected: bool) {
    let color = stage_color(task.status);
    let style = if is_selected {
        Style::default().bg(color).fg(text_on(color)).add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(Color::DarkGray)
    };

    let docs = task.documents_generated();
    let lines = vec![
        Line::from(task.title.clone()),
        Line::from(format!("{docs}/3 docs | {} refs", task.references.len())),
    ];
    let card = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .style(style)
        .wrap(Wrap { trim: true });
    f.render_widget(card, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::TaskStatus;
    use crate::project::CreateProjectDto;
    use crate::task::CreateTaskDto;
    use ratatui::backend::TestBackend;

    fn board() -> (tempfile::TempDir, WorkflowApp) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        let project = ProjectStore::new(&ws)
            .create(CreateProjectDto { name: Some("Harbor".into()), ..Default::default() })
            .unwrap();
        let tasks = TaskStore::new(&ws);
        for title in ["Fishing", "Trading"] {
            tasks
                .create(&project.id, CreateTaskDto { title: title.into(), ..Default::default() })
                .unwrap();
        }
        let app = WorkflowApp::new(&ws, &project.id).unwrap();
        (dir, app)
    }

    #[test]
    fn tasks_start_in_first_column() {
        let (_dir, app) = board();
        assert_eq!(app.columns[0].len(), 2);
        assert!(app.columns[1..].iter().all(Vec::is_empty));
    }

    #[test]
    fn moving_a_card_persists_its_stage() {
        let (_dir, mut app) = board();
        let id = app.selected_task_id().unwrap();

        app.handle_key(KeyCode::Char('>'), KeyModifiers::NONE);
        assert_eq!(app.selected_column, 1);
        assert_eq!(app.tasks.require(&id).unwrap().status, TaskStatus::Design);
        assert!(app.status_message.contains("generation requested"));

        app.handle_key(KeyCode::Left, KeyModifiers::SHIFT);
        assert_eq!(app.selected_column, 0);
        assert_eq!(app.tasks.require(&id).unwrap().status, TaskStatus::Featurelist);
        assert_eq!(app.status_message, "Moved task to Feature List");
    }

    #[test]
    fn archive_requires_prototype() {
        let (_dir, mut app) = board();
        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(app.status_message, "Only prototype tasks can be archived");

        for _ in 0..3 {
            app.handle_key(KeyCode::Char('>'), KeyModifiers::NONE);
        }
        assert_eq!(app.selected_column, 3);
        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(app.status_message, "Task archived");
        assert_eq!(app.board.len(), 1);
    }

    #[test]
    fn filter_narrows_cards() {
        let (_dir, mut app) = board();
        app.handle_key(KeyCode::Char('/'), KeyModifiers::NONE);
        for c in "trad".chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.columns[0].len(), 1);
        assert_eq!(app.status_message, "Filter: 'trad' (1 tasks shown)");
    }

    #[test]
    fn renders_without_panicking() {
        let (_dir, mut app) = board();
        app.show_task_detail = true;
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let tiny = &mut Terminal::new(TestBackend::new(20, 6)).unwrap();
        tiny.draw(|f| app.render(f)).unwrap();
    }

    #[test]
    fn quit_keys() {
        let (_dir, mut app) = board();
        assert!(app.handle_key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.handle_key(KeyCode::Down, KeyModifiers::NONE));
    }
}
