use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;
use crate::catalog::{CatalogEntry, flat_sorted};
use crate::compare::{Comparison, MAX_COMPARED};
use crate::error_handling::Result;
use crate::output::render_comparison;
use crate::processor::{SoftwareGroup, group_entries, search};
use crate::quiz::{AnswerStore, QuizAction, QuizAnswers, QuizResult, QuizState, budget_label, reduce};
use crate::scorer::{ScoredEntry, ScoringWeights, group_scored, recommend};
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Browsing,
    Quiz,
    Results,
    Comparing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView {
    Flat,
    Grouped,
}

impl ListView {
    fn toggled(self) -> Self {
        match self {
            ListView::Flat => ListView::Grouped,
            ListView::Grouped => ListView::Flat,
        }
    }
}

/// One line of the left-hand list: a single entry or a whole family.
#[derive(Debug, Clone)]
pub struct ListRow {
    pub label: String,
    pub detail: String,
    /// The entry shown in the details pane (a family's main version).
    pub entry: CatalogEntry,
    pub versions: usize,
    pub score: Option<f64>,
}

impl ListRow {
    fn entry(entry: &CatalogEntry) -> Self {
        Self {
            label: entry.display_name(),
            detail: entry.price_display(),
            entry: entry.clone(),
            versions: 1,
            score: None,
        }
    }

    fn scored(scored: &ScoredEntry) -> Self {
        Self {
            score: Some(scored.score),
            ..Self::entry(&scored.entry)
        }
    }

    fn family(group: SoftwareGroup) -> Self {
        Self {
            label: format!("{} ({} versions)", group.name, group.version_count()),
            detail: group.price_range,
            versions: group.versions.len(),
            entry: group.main_version,
            score: None,
        }
    }
}

/// Transient message shown in the status bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

pub struct App {
    pub catalog: Vec<CatalogEntry>,
    pub weights: ScoringWeights,
    pub search_query: String,
    pub list_state: ListState,
    pub app_mode: AppMode,
    pub view: ListView,
    pub quiz: QuizState,
    /// Highlighted option within the current quiz question.
    pub quiz_cursor: usize,
    pub last_result: Option<QuizResult>,
    pub recommendations: Vec<ScoredEntry>,
    pub comparison: Comparison,
    pub answer_store: Option<AnswerStore>,
    pub status: Option<Status>,
    pub should_quit: bool,
    /// Opened on first copy and kept alive; on X11 and Wayland the copied
    /// text is only served while the handle exists.
    clipboard: Option<arboard::Clipboard>,
}

/// Rows for the browse view.
/// Defined outside impl App to allow disjoint borrowing of App fields.
///
/// Unfiltered, the flat view is sorted by name then version; a query ranks by match.
fn browse_rows(catalog: &[CatalogEntry], query: &str, view: ListView) -> Vec<ListRow> {
    match view {
        ListView::Flat if query.is_empty() => flat_sorted(catalog).into_iter().map(ListRow::entry).collect(),
        ListView::Flat => search(catalog, query).into_iter().map(ListRow::entry).collect(),
        ListView::Grouped => {
            let owned: Vec<CatalogEntry> = search(catalog, query).into_iter().cloned().collect();
            group_entries(&owned).into_iter().map(ListRow::family).collect()
        }
    }
}

fn result_rows(ranked: &[ScoredEntry], view: ListView) -> Vec<ListRow> {
    match view {
        ListView::Flat => ranked.iter().map(ListRow::scored).collect(),
        ListView::Grouped => group_scored(ranked).into_iter().map(ListRow::family).collect(),
    }
}

impl App {
    pub fn new(catalog: Vec<CatalogEntry>, weights: ScoringWeights, answer_store: Option<AnswerStore>) -> Self {
        let mut list_state = ListState::default();
        if !catalog.is_empty() {
            list_state.select(Some(0));
        }

        let last_result = answer_store.as_ref().and_then(|store| match store.load() {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!("Ignoring saved quiz answers: {:#}", e);
                None
            }
        });

        Self {
            catalog,
            weights,
            search_query: String::new(),
            list_state,
            app_mode: AppMode::Browsing,
            view: ListView::Flat,
            quiz: QuizState::default(),
            quiz_cursor: 0,
            last_result,
            recommendations: Vec::new(),
            comparison: Comparison::new(),
            answer_store,
            status: None,
            should_quit: false,
            clipboard: None,
        }
    }

    /// Rows currently shown in the list pane.
    pub fn rows(&self) -> Vec<ListRow> {
        match self.app_mode {
            AppMode::Results => result_rows(&self.recommendations, self.view),
            _ => browse_rows(&self.catalog, &self.search_query, self.view),
        }
    }

    pub fn selected_row(&self) -> Option<ListRow> {
        let index = self.list_state.selected()?;
        self.rows().into_iter().nth(index)
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| ui_render(f, self))?;

            if event::poll(Duration::from_millis(100))?
                && let Event::Key(key) = event::read()?
                    && key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.app_mode {
            AppMode::Browsing | AppMode::Results => self.handle_list_key(key, ctrl),
            AppMode::Quiz => self.handle_quiz_key(key),
            AppMode::Comparing => match key.code {
                KeyCode::Esc => self.app_mode = AppMode::Browsing,
                KeyCode::Char('x') if ctrl => {
                    self.comparison = Comparison::new();
                    self.app_mode = AppMode::Browsing;
                }
                _ => {}
            },
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent, ctrl: bool) {
        match key.code {
            KeyCode::Char('t') if ctrl => self.start_quiz(),
            KeyCode::Char('a') if ctrl => self.toggle_compare(),
            KeyCode::Char('o') if ctrl => {
                if self.comparison.is_empty() {
                    self.status = Some(Status::Info("Nothing to compare yet (Ctrl+a adds the selection)".to_string()));
                } else {
                    self.app_mode = AppMode::Comparing;
                }
            }
            KeyCode::Char('y') if ctrl => self.copy_selected(),
            KeyCode::Char(c) if !ctrl => {
                if self.app_mode == AppMode::Browsing {
                    self.search_query.push(c);
                    self.reset_selection();
                }
            }
            KeyCode::Backspace => {
                if self.app_mode == AppMode::Browsing {
                    let _ = self.search_query.pop();
                    self.reset_selection();
                }
            }
            KeyCode::Tab => {
                self.view = self.view.toggled();
                self.reset_selection();
            }
            KeyCode::Down => self.next(),
            KeyCode::Up => self.previous(),
            KeyCode::Esc => {
                if self.app_mode == AppMode::Results {
                    self.app_mode = AppMode::Browsing;
                    self.reset_selection();
                } else if !self.search_query.is_empty() {
                    self.search_query.clear();
                    self.reset_selection();
                }
            }
            _ => {}
        }
    }

    fn handle_quiz_key(&mut self, key: KeyEvent) {
        let option_count = self.quiz.question().options.len();
        match key.code {
            KeyCode::Down => self.quiz_cursor = (self.quiz_cursor + 1) % option_count,
            KeyCode::Up => self.quiz_cursor = (self.quiz_cursor + option_count - 1) % option_count,
            KeyCode::Char(' ') => self.choose_highlighted(),
            KeyCode::Enter => {
                // Enter on an unanswered single-select question picks the highlighted option
                if !self.quiz.question().multiple && !self.quiz.can_proceed() {
                    self.choose_highlighted();
                }
                self.quiz_action(QuizAction::Next);
            }
            KeyCode::Left | KeyCode::Backspace => self.quiz_action(QuizAction::Previous),
            KeyCode::Esc => {
                self.app_mode = AppMode::Browsing;
                self.reset_selection();
            }
            _ => {}
        }
    }

    fn choose_highlighted(&mut self) {
        if let Some(option) = self.quiz.question().options.get(self.quiz_cursor) {
            self.quiz_action(QuizAction::Choose(option.value.to_string()));
        }
    }

    pub fn start_quiz(&mut self) {
        let fresh = QuizState::default();
        self.quiz = match &self.last_result {
            Some(previous) => reduce(&fresh, QuizAction::Restore(QuizAnswers::from(previous))),
            None => fresh,
        };
        self.app_mode = AppMode::Quiz;
        self.sync_quiz_cursor();
    }

    fn quiz_action(&mut self, action: QuizAction) {
        let step_before = self.quiz.step;
        self.quiz = reduce(&self.quiz, action);

        if let Some(result) = self.quiz.result.clone() {
            self.finish_quiz(result);
        } else if self.quiz.step != step_before {
            self.sync_quiz_cursor();
        }
    }

    /// Points the cursor at the current answer, or the first option.
    fn sync_quiz_cursor(&mut self) {
        let question = self.quiz.question();
        self.quiz_cursor = question
            .options
            .iter()
            .position(|o| self.quiz.answers.is_selected(question.id, o.value))
            .unwrap_or(0);
    }

    fn finish_quiz(&mut self, result: QuizResult) {
        self.recommendations = recommend(&self.catalog, &result, &self.weights);
        self.status = Some(Status::Info(format!("Found {} matching options", self.recommendations.len())));
        if let Some(store) = &self.answer_store
            && let Err(e) = store.save(&result) {
                tracing::warn!("Could not save quiz answers: {:#}", e);
                self.status = Some(Status::Error(format!("Could not save answers: {}", e)));
            }
        self.last_result = Some(result);
        self.quiz = QuizState::default();
        self.app_mode = AppMode::Results;
        self.reset_selection();
    }

    fn toggle_compare(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        self.status = Some(match self.comparison.toggle(&row.entry) {
            Ok(()) if self.comparison.contains(&row.entry) => {
                Status::Info(format!("Added {} to comparison", row.entry.display_name()))
            }
            Ok(()) => Status::Info(format!("Removed {} from comparison", row.entry.display_name())),
            Err(e) => Status::Error(e.to_string()),
        });
    }

    fn copy_selected(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let summary = format!(
            "{} - {} - {} - rating {:.1}/5",
            row.entry.display_name(),
            row.entry.price_display(),
            row.entry.difficulty.label(),
            row.entry.rating
        );
        let clipboard = match self.clipboard.take() {
            Some(clipboard) => Ok(clipboard),
            None => arboard::Clipboard::new(),
        };
        let copied = clipboard.and_then(|mut clipboard| {
            let result = clipboard.set_text(summary);
            self.clipboard = Some(clipboard);
            result
        });
        self.status = Some(match copied {
            Ok(()) => Status::Info(format!("Copied {} to clipboard", row.entry.display_name())),
            Err(e) => Status::Error(format!("Clipboard unavailable: {}", e)),
        });
    }

    fn reset_selection(&mut self) {
        if self.rows().is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
    }

    fn next(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let new_idx = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(new_idx));
    }

    fn previous(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let new_idx = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(new_idx));
    }
}

fn ui_render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    f.render_widget(Block::default().style(theme::STYLE_BASE), f.area());

    match app.app_mode {
        AppMode::Quiz => render_quiz(f, app, chunks[0]),
        AppMode::Comparing => {
            let table = Paragraph::new(render_comparison(&app.comparison))
                .style(theme::STYLE_METADATA_TEXT)
                .block(Block::default().borders(Borders::ALL).border_style(theme::STYLE_BORDER).title("Compare"));
            f.render_widget(table, chunks[0]);
        }
        AppMode::Browsing | AppMode::Results => render_lists(f, app, chunks[0]),
    }

    let mode_str = match app.app_mode {
        AppMode::Browsing => "BROWSE",
        AppMode::Quiz => "QUIZ",
        AppMode::Results => "RESULTS",
        AppMode::Comparing => "COMPARE",
    };
    let hint = match app.app_mode {
        AppMode::Quiz => "<Up/Down>: Move | <Space>: Select | <Enter>: Next | <Left>: Back | <Esc>: Leave",
        AppMode::Comparing => "<Esc>: Back | <Ctrl+x>: Clear",
        _ => "<Tab>: Flat/Families | <Ctrl+t>: Quiz | <Ctrl+a>: Compare +/- | <Ctrl+o>: Compare | <Ctrl+y>: Copy | <Ctrl+c>: Quit",
    };
    let message = match &app.status {
        Some(Status::Info(msg)) => Span::raw(msg.clone()),
        Some(Status::Error(msg)) => Span::styled(msg.clone(), theme::STYLE_ERROR_TEXT),
        None => Span::raw(format!("Compare: {}/{}", app.comparison.selected().len(), MAX_COMPARED)),
    };
    let status_line = Line::from(vec![
        Span::raw(format!("{} | ", mode_str)),
        message,
        Span::raw(format!(" | {}", hint)),
    ]);
    f.render_widget(Paragraph::new(status_line).style(theme::STYLE_STATUS_BAR), chunks[1]);
}

fn render_lists(f: &mut Frame, app: &mut App, area: Rect) {
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let rows = app.rows();
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let mut spans = Vec::new();
            if let Some(score) = row.score {
                spans.push(Span::styled(format!("{:>5.1} ", score), theme::STYLE_SCORE));
            }
            let name_style = if row.versions > 1 { theme::STYLE_FAMILY_TITLE } else { theme::STYLE_ENTRY_NAME };
            spans.push(Span::styled(row.label.clone(), name_style));
            spans.push(Span::styled(format!("  {}", row.detail), theme::STYLE_PRICE));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list_title = match (app.app_mode, app.search_query.is_empty()) {
        (AppMode::Results, _) => match &app.last_result {
            Some(r) => format!(
                "Recommendations: {} | {} | {}",
                r.primary_use,
                r.experience.as_str(),
                budget_label(r.budget)
            ),
            None => "Recommendations".to_string(),
        },
        (_, true) => format!("Catalog ({}/{})", rows.len(), app.catalog.len()),
        (_, false) => format!("Catalog (Filter: '{}') {}/{}", app.search_query, rows.len(), app.catalog.len()),
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).border_style(theme::STYLE_BORDER).title(list_title))
        .highlight_style(theme::STYLE_LIST_HIGHLIGHT)
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, main_chunks[0], &mut app.list_state);

    let selected = app.list_state.selected().and_then(|i| rows.get(i));
    let details_text = match selected {
        Some(row) => detail_lines(row),
        None => vec![Line::from(Span::styled("No entry selected", theme::STYLE_HINT_TEXT))],
    };
    let details = Paragraph::new(details_text)
        .block(Block::default().borders(Borders::ALL).border_style(theme::STYLE_BORDER).title("Details"))
        .wrap(Wrap { trim: true });
    f.render_widget(details, main_chunks[1]);
}

fn detail_lines(row: &ListRow) -> Vec<Line<'static>> {
    let e = &row.entry;
    let label = |text: &str| Line::from(Span::styled(text.to_string(), theme::STYLE_METADATA_LABEL));
    let text = |text: String| Line::from(Span::styled(text, theme::STYLE_METADATA_TEXT));

    let mut lines = vec![
        label("Name:"),
        text(e.display_name()),
        Line::from(vec![
            Span::styled(e.price_display(), theme::STYLE_PRICE),
            Span::raw("  "),
            Span::styled(e.difficulty.label(), theme::difficulty_style(e.difficulty.level())),
            Span::raw(format!("  rating {:.1}/5", e.rating)),
        ]),
        Line::from(""),
        text(e.description.clone()),
        Line::from(""),
    ];
    if row.versions > 1 {
        lines.push(Line::from(Span::styled(
            format!("Cheapest of {} versions", row.versions),
            theme::STYLE_HINT_TEXT,
        )));
    }
    for (title, values) in [
        ("Categories:", &e.categories),
        ("Platforms:", &e.platforms),
        ("Features:", &e.features),
        ("Pros:", &e.pros),
        ("Cons:", &e.cons),
    ] {
        if !values.is_empty() {
            lines.push(label(title));
            lines.push(text(values.join(", ")));
        }
    }
    lines
}

fn render_quiz(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let question = app.quiz.question();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).border_style(theme::STYLE_BORDER).title(format!(
            "Question {} of {}",
            app.quiz.step + 1,
            crate::quiz::QUESTIONS.len()
        )))
        .gauge_style(theme::STYLE_PROGRESS)
        .percent(app.quiz.progress_percent());
    f.render_widget(gauge, chunks[0]);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(question.title, theme::STYLE_QUESTION)),
        Line::from(Span::styled(question.subtitle, theme::STYLE_HINT_TEXT)),
    ]);
    f.render_widget(header, chunks[1]);

    let items: Vec<ListItem> = question
        .options
        .iter()
        .map(|option| {
            let selected = app.quiz.answers.is_selected(question.id, option.value);
            let marker = match (question.multiple, selected) {
                (true, true) => "[x] ",
                (true, false) => "[ ] ",
                (false, true) => "(*) ",
                (false, false) => "( ) ",
            };
            let style = if selected { theme::STYLE_OPTION_SELECTED } else { theme::STYLE_ENTRY_NAME };
            ListItem::new(vec![
                Line::from(Span::styled(format!("{}{}", marker, option.label), style)),
                Line::from(Span::styled(format!("    {}", option.description), theme::STYLE_DIM)),
            ])
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.quiz_cursor));
    let title = if app.quiz.can_proceed() {
        "Options"
    } else {
        "Options (answer required)"
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).border_style(theme::STYLE_BORDER).title(title))
        .highlight_style(theme::STYLE_LIST_HIGHLIGHT);
    f.render_stateful_widget(list, chunks[2], &mut state);
}
