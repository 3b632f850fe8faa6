use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dayboard_core::{
    board::{resolve_band, RowBand},
    AppConfig, Board, BoardPhase, CardId, DayClient, DayRoster, DragSession, DropOutcome, Goal,
    GoalCatalog, LoadError, LoadOutcome,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

const TICK_RATE: Duration = Duration::from_millis(250);
/// Ticks a duplicate-drop pulse stays highlighted.
const PULSE_TICKS: u8 = 2;
const DATE_INPUT_LEN: usize = 10;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    accent_alt: Color,
    muted: Color,
    selection_bg: Color,
    selection_fg: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            accent_alt: Color::Blue,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            selection_fg: Color::White,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Filter,
}

/// Modal editor for the board date, `YYYY-MM-DD`.
#[derive(Debug, Clone)]
struct DatePrompt {
    buffer: String,
    cursor: usize,
}

impl DatePrompt {
    fn new(initial: NaiveDate) -> Self {
        let buffer = initial.format("%Y-%m-%d").to_string();
        let cursor = buffer.len();
        Self { buffer, cursor }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.buffer.len() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    fn insert(&mut self, ch: char) {
        if self.buffer.len() >= DATE_INPUT_LEN {
            return;
        }
        if ch.is_ascii_digit() || ch == '-' {
            self.buffer.insert(self.cursor, ch);
            self.cursor += 1;
        }
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.buffer.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    fn value(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.buffer.trim(), "%Y-%m-%d").ok()
    }
}

/// Interactive regions recorded while drawing; later entries sit on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    GoalRow(i64),
    FreeRow(i64),
    DutyDrop,
    DutyRow(i64),
    CardDrop(CardId),
    ChipRemove(CardId, i64),
    CardClose(CardId),
}

#[derive(Debug, Default)]
struct HitMap {
    zones: Vec<(Zone, Rect)>,
    cards_area: Option<Rect>,
}

impl HitMap {
    fn clear(&mut self) {
        self.zones.clear();
        self.cards_area = None;
    }

    fn push(&mut self, zone: Zone, rect: Rect) {
        self.zones.push((zone, rect));
    }

    fn set_cards_area(&mut self, area: Rect) {
        self.cards_area = Some(area);
    }

    /// Topmost zone under the pointer.
    fn at(&self, x: u16, y: u16) -> Option<Zone> {
        self.zones
            .iter()
            .rev()
            .find(|(_, rect)| rect_contains(*rect, x, y))
            .map(|(zone, _)| *zone)
    }

    /// Whether `x` falls inside the destination-card column.
    fn in_cards_column(&self, x: u16) -> bool {
        self.cards_area
            .map(|area| x >= area.x && x < area.x.saturating_add(area.width))
            .unwrap_or(false)
    }

    /// Vertical bands of every card drop zone, for the distance fallback.
    fn card_bands(&self) -> (Vec<CardId>, Vec<RowBand>) {
        let mut ids = Vec::new();
        let mut bands = Vec::new();
        for (zone, rect) in &self.zones {
            if let Zone::CardDrop(card) = zone {
                ids.push(*card);
                bands.push(RowBand {
                    top: rect.y,
                    height: rect.height,
                });
            }
        }
        (ids, bands)
    }
}

fn rect_contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}

/// Where a finished drag landed.
enum DropTarget {
    Card(CardId),
    Duty,
}

/// Transient highlight on an existing chip after a duplicate drop.
#[derive(Debug, Clone, Copy)]
struct Pulse {
    card: CardId,
    resource: i64,
    remaining: u8,
}

/// Snapshot of one destination card taken for rendering.
struct CardView {
    id: CardId,
    title: String,
    ordinal: usize,
    count: usize,
    members: Vec<(i64, String)>,
}

/// Goal list cursor/scroll state over the filtered catalog view.
#[derive(Debug, Default)]
struct GoalList {
    goals: Vec<Goal>,
    cursor: usize,
    offset: usize,
    list_height: usize,
    filter: String,
}

impl GoalList {
    fn set_goals(&mut self, goals: Vec<Goal>) {
        self.goals = goals;
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    fn len(&self) -> usize {
        self.goals.len()
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.goals.is_empty() {
            return;
        }
        let len = self.goals.len() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len - 1) as usize;
        self.ensure_cursor_visible();
    }

    fn page(&mut self, direction: isize) {
        if self.goals.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.goals.len()) as isize;
        self.move_cursor(delta * direction);
    }

    fn move_to_start(&mut self) {
        self.cursor = 0;
        self.ensure_cursor_visible();
    }

    fn move_to_end(&mut self) {
        if !self.goals.is_empty() {
            self.cursor = self.goals.len() - 1;
        }
        self.ensure_cursor_visible();
    }

    fn select_id(&mut self, goal_id: i64) -> bool {
        if let Some(pos) = self.goals.iter().position(|goal| goal.id == goal_id) {
            self.cursor = pos;
            self.ensure_cursor_visible();
            return true;
        }
        false
    }

    fn visible(&self, height: usize) -> &[Goal] {
        if self.goals.is_empty() {
            return &[];
        }
        let end = (self.offset + height).min(self.goals.len());
        &self.goals[self.offset..end]
    }

    fn current(&self) -> Option<&Goal> {
        self.goals.get(self.cursor)
    }

    fn clamp_cursor(&mut self) {
        if self.goals.is_empty() {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= self.goals.len() {
            self.cursor = self.goals.len() - 1;
        }
    }

    fn ensure_cursor_visible(&mut self) {
        if self.goals.is_empty() || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        let height = self.list_height;
        let max_offset = self.goals.len().saturating_sub(height);

        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }

        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
    RosterLoaded {
        date: NaiveDate,
        result: Result<DayRoster, LoadError>,
    },
    GoalsLoaded {
        date: NaiveDate,
        result: Result<usize, LoadError>,
    },
}

/// High-level application state for the board TUI.
pub struct DayboardApp {
    client: DayClient,
    catalog: GoalCatalog,
    board: Board,
    selected_date: NaiveDate,
    goals: GoalList,
    mode: Mode,
    date_prompt: Option<DatePrompt>,
    drag: DragSession,
    drag_pos: Option<(u16, u16)>,
    pulse: Option<Pulse>,
    hits: HitMap,
    status: String,
    should_quit: bool,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    theme: Theme,
}

impl DayboardApp {
    pub fn new(config: &AppConfig, client: DayClient, catalog: GoalCatalog) -> Self {
        let selected_date = config
            .start_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
            .unwrap_or_else(|| Local::now().date_naive());

        Self {
            client,
            catalog,
            board: Board::new(),
            selected_date,
            goals: GoalList::default(),
            mode: Mode::Normal,
            date_prompt: None,
            drag: DragSession::default(),
            drag_pos: None,
            pulse: None,
            hits: HitMap::default(),
            status: "Ready".to_string(),
            should_quit: false,
            event_tx: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        self.start_load(self.selected_date);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }
            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }
            if self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    /// Tear down the board and issue date-keyed fetches for `date`.
    fn start_load(&mut self, date: NaiveDate) {
        self.selected_date = date;
        self.board.begin_load(date);
        self.catalog.clear();
        self.goals.set_goals(Vec::new());
        self.drag.finish();
        self.drag_pos = None;
        self.pulse = None;
        self.status = format!("Loading {date}…");

        let Some(tx) = self.event_tx.clone() else {
            return;
        };

        let roster_client = self.client.clone();
        let roster_tx = tx.clone();
        tokio::spawn(async move {
            let result = roster_client.roster(date).await;
            let _ = roster_tx.send(AppEvent::RosterLoaded { date, result }).await;
        });

        let goals_client = self.client.clone();
        let goals_catalog = self.catalog.clone();
        tokio::spawn(async move {
            let result = goals_client.goals(date).await.map(|goals| {
                let total = goals.len();
                goals_catalog.replace(date, goals);
                total
            });
            let _ = tx.send(AppEvent::GoalsLoaded { date, result }).await;
        });
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    self.status = format!("Error: {err}");
                }
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            Some(AppEvent::RosterLoaded { date, result }) => {
                self.handle_roster_loaded(date, result);
                true
            }
            Some(AppEvent::GoalsLoaded { date, result }) => {
                self.handle_goals_loaded(date, result);
                true
            }
            None => false,
        }
    }

    fn handle_tick(&mut self) {
        if let Some(pulse) = self.pulse.as_mut() {
            pulse.remaining = pulse.remaining.saturating_sub(1);
            if pulse.remaining == 0 {
                self.pulse = None;
            }
        }
    }

    fn handle_roster_loaded(&mut self, date: NaiveDate, result: Result<DayRoster, LoadError>) {
        match self.board.apply_roster(date, result) {
            LoadOutcome::Stale => debug!(%date, "dropped roster response for a superseded date"),
            LoadOutcome::Applied => match self.board.phase() {
                BoardPhase::Ready(_) => {
                    let badges = self.board.badges();
                    self.status = format!(
                        "Loaded {} resources for {date} ({} blocked)",
                        badges.free, badges.blocked
                    );
                }
                BoardPhase::Failed { message, .. } => {
                    self.status = format!("Failed to load {date}: {message}");
                }
                _ => {}
            },
        }
    }

    fn handle_goals_loaded(&mut self, date: NaiveDate, result: Result<usize, LoadError>) {
        if date != self.selected_date {
            debug!(%date, "dropped goal response for a superseded date");
            return;
        }
        match result {
            Ok(total) => {
                info!(total, %date, "goals loaded");
                self.refresh_goals();
            }
            Err(err) => {
                error!(?err, "goal feed failed");
                self.status = format!("Failed to load goals: {err}");
            }
        }
    }

    fn refresh_goals(&mut self) {
        let query = self.goals.filter.clone();
        self.goals.set_goals(self.catalog.matching(&query));
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        if self.date_prompt.is_some() {
            if let Event::Key(key) = event {
                self.handle_date_prompt_key(key);
            }
            return Ok(());
        }
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }
        match self.mode {
            Mode::Filter => self.handle_filter_key(key),
            Mode::Normal => self.handle_normal_key(key),
        }
        Ok(())
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.start_load(self.selected_date),
            KeyCode::Char('d') => self.date_prompt = Some(DatePrompt::new(self.selected_date)),
            KeyCode::Char('/') => self.mode = Mode::Filter,
            KeyCode::Char('n') => self.open_card(true),
            KeyCode::Enter => self.open_card(false),
            KeyCode::Up => self.goals.move_cursor(-1),
            KeyCode::Down => self.goals.move_cursor(1),
            KeyCode::PageUp => self.goals.page(-1),
            KeyCode::PageDown => self.goals.page(1),
            KeyCode::Home => self.goals.move_to_start(),
            KeyCode::End => self.goals.move_to_end(),
            KeyCode::Esc => {
                if !self.goals.filter.is_empty() {
                    self.goals.filter.clear();
                    self.refresh_goals();
                }
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.goals.filter.clear();
                self.refresh_goals();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Backspace => {
                self.goals.filter.pop();
                self.refresh_goals();
            }
            KeyCode::Char(ch) => {
                self.goals.filter.push(ch);
                self.refresh_goals();
            }
            _ => {}
        }
    }

    fn handle_date_prompt_key(&mut self, key: KeyEvent) {
        let Some(prompt) = self.date_prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.date_prompt = None,
            KeyCode::Enter => match prompt.value() {
                Some(date) => {
                    self.date_prompt = None;
                    self.start_load(date);
                }
                None => self.status = "Invalid date, expected YYYY-MM-DD".to_string(),
            },
            KeyCode::Left => prompt.move_cursor(-1),
            KeyCode::Right => prompt.move_cursor(1),
            KeyCode::Home => prompt.move_home(),
            KeyCode::End => prompt.move_end(),
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Delete => prompt.delete(),
            KeyCode::Char(ch) => prompt.insert(ch),
            _ => {}
        }
    }

    /// Focus (or with `force_new`, duplicate) the card for the selected goal.
    fn open_card(&mut self, force_new: bool) {
        let Some(goal_id) = self.goals.current().map(|goal| goal.id) else {
            self.status = "No goal selected".to_string();
            return;
        };
        let title = self.catalog.title_of(goal_id);
        match self.board.ensure_destination(goal_id, &title, force_new) {
            Some(_) if force_new => self.status = format!("Opened a new card for {title}"),
            Some(_) => self.status = format!("Focused the card for {title}"),
            None => self.status = "Load a roster before opening cards".to_string(),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.handle_mouse_down(mouse.column, mouse.row);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if self.drag.is_dragging() {
                    self.drag_pos = Some((mouse.column, mouse.row));
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.handle_mouse_up(mouse.column, mouse.row);
            }
            MouseEventKind::ScrollUp => self.goals.move_cursor(-1),
            MouseEventKind::ScrollDown => self.goals.move_cursor(1),
            _ => {}
        }
    }

    fn handle_mouse_down(&mut self, x: u16, y: u16) {
        match self.hits.at(x, y) {
            Some(Zone::GoalRow(goal_id)) => {
                self.goals.select_id(goal_id);
                self.open_card(false);
            }
            Some(Zone::FreeRow(id)) | Some(Zone::DutyRow(id)) => {
                if self.board.can_drag(id) {
                    self.drag.begin(id);
                    self.drag_pos = Some((x, y));
                }
            }
            Some(Zone::ChipRemove(card, id)) => {
                if self.board.remove_member(card, id) {
                    self.status = format!("Removed {}", self.resource_name(id));
                }
            }
            Some(Zone::CardClose(card)) => {
                if self.board.close_destination(card) {
                    self.status = "Card closed, members released".to_string();
                }
            }
            _ => {}
        }
    }

    fn handle_mouse_up(&mut self, x: u16, y: u16) {
        if !self.drag.is_dragging() {
            return;
        }
        // Recover the id the way a drop handler would: payload encodings
        // first, session record as the last resort.
        let recovered = self
            .drag
            .payload()
            .cloned()
            .and_then(|payload| self.drag.resolve(&payload));
        if let Some(id) = recovered {
            self.complete_drop(id, x, y);
        }
        // Idle again no matter where the release landed.
        self.drag.finish();
        self.drag_pos = None;
    }

    fn complete_drop(&mut self, id: i64, x: u16, y: u16) {
        match self.resolve_drop_target(x, y) {
            Some(DropTarget::Card(card)) => match self.board.add_member(card, id) {
                DropOutcome::Added => {
                    self.status = format!("Assigned {}", self.resource_name(id));
                }
                DropOutcome::Duplicate => {
                    self.pulse = Some(Pulse {
                        card,
                        resource: id,
                        remaining: PULSE_TICKS,
                    });
                    self.status = format!("{} is already on that card", self.resource_name(id));
                }
                DropOutcome::Ignored => {}
            },
            Some(DropTarget::Duty) => {
                if self.board.drop_to_duty(id) {
                    self.status = format!("{} stays on administrative duty", self.resource_name(id));
                }
            }
            None => debug!(id, "drop at ({x},{y}) landed outside every target"),
        }
    }

    fn resolve_drop_target(&self, x: u16, y: u16) -> Option<DropTarget> {
        match self.hits.at(x, y) {
            Some(Zone::CardDrop(card) | Zone::ChipRemove(card, _) | Zone::CardClose(card)) => {
                return Some(DropTarget::Card(card));
            }
            Some(Zone::DutyDrop | Zone::DutyRow(_)) => return Some(DropTarget::Duty),
            _ => {}
        }
        // The release may land a cell off a card border; fall back to the
        // nearest card band by vertical distance, inside the card column.
        if self.hits.in_cards_column(x) {
            let (ids, bands) = self.hits.card_bands();
            if let Some(idx) = resolve_band(&bands, y) {
                return Some(DropTarget::Card(ids[idx]));
            }
        }
        None
    }

    fn resource_name(&self, id: i64) -> String {
        self.board
            .registry()
            .get(id)
            .map(|resource| resource.name.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }

    // ---- rendering ----

    fn draw(&mut self, frame: &mut Frame) {
        self.hits.clear();

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(1)])
            .split(frame.size());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(26),
                Constraint::Percentage(34),
                Constraint::Percentage(40),
            ])
            .split(outer[0]);

        self.render_goals(frame, columns[0]);
        self.render_pools(frame, columns[1]);
        self.render_cards(frame, columns[2]);
        self.render_status(frame, outer[1]);

        if let Some(prompt) = self.date_prompt.clone() {
            self.render_date_prompt(frame, &prompt);
        }
    }

    fn render_goals(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.goals.filter.is_empty() {
            format!("Goals ({})", self.goals.len())
        } else {
            format!("Goals ({}) /{}", self.goals.len(), self.goals.filter)
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.goals.list_height = inner.height as usize;
        self.goals.clamp_cursor();
        self.goals.ensure_cursor_visible();

        if self.goals.goals.is_empty() {
            let hint = if self.mode == Mode::Filter {
                "No goal matches the filter."
            } else if self.catalog.loaded_for().is_some() {
                "No goals available."
            } else {
                "Waiting for the goal feed…"
            };
            let paragraph = Paragraph::new(hint)
                .style(Style::default().fg(self.theme.muted))
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, inner);
            return;
        }

        let offset = self.goals.offset;
        let cursor = self.goals.cursor;
        let visible: Vec<Goal> = self.goals.visible(inner.height as usize).to_vec();
        let mut lines = Vec::with_capacity(visible.len());
        for (idx, goal) in visible.iter().enumerate() {
            let row = Rect {
                x: inner.x,
                y: inner.y + idx as u16,
                width: inner.width,
                height: 1,
            };
            self.hits.push(Zone::GoalRow(goal.id), row);

            let selected = offset + idx == cursor;
            let base = if selected {
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.selection_fg)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };
            let marker = if selected { "▶ " } else { "  " };
            let mut spans = vec![
                Span::styled(
                    marker,
                    base.fg(self.theme.accent).add_modifier(Modifier::BOLD),
                ),
                Span::styled(goal.name.clone(), base),
            ];
            if goal.allocated > 0 {
                spans.push(Span::styled(
                    format!(" {}/{}", goal.executed, goal.allocated),
                    base.fg(self.theme.accent_alt),
                ));
            }
            if let Some(deadline) = goal.deadline {
                spans.push(Span::styled(
                    format!(" ⏱{}", deadline.format("%d/%m")),
                    base.fg(self.theme.muted),
                ));
            }
            lines.push(Line::from(spans));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_pools(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(35),
                Constraint::Percentage(25),
            ])
            .split(area);

        self.render_free_pool(frame, rows[0]);
        self.render_duty_pool(frame, rows[1]);
        self.render_blocked(frame, rows[2]);
    }

    fn render_free_pool(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Available ({})", self.board.badges().free));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match self.board.phase() {
            BoardPhase::Empty => {
                self.render_hint(frame, inner, "Press d to pick a date.");
            }
            BoardPhase::Loading(date) => {
                let text = format!("Loading {date}…");
                self.render_hint(frame, inner, &text);
            }
            BoardPhase::Failed { message, .. } => {
                let text = format!("Load failed: {message}\nPress r to retry.");
                let paragraph = Paragraph::new(text)
                    .style(Style::default().fg(self.theme.danger))
                    .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, inner);
            }
            BoardPhase::Ready(_) => {
                let resources: Vec<(i64, String, u32)> = self
                    .board
                    .registry()
                    .resources()
                    .iter()
                    .map(|resource| {
                        (
                            resource.id,
                            resource.name.clone(),
                            self.board.registry().count_of(resource.id),
                        )
                    })
                    .collect();

                let mut lines = Vec::new();
                for (idx, (id, name, count)) in resources.into_iter().enumerate() {
                    if idx as u16 >= inner.height {
                        break;
                    }
                    let row = Rect {
                        x: inner.x,
                        y: inner.y + idx as u16,
                        width: inner.width,
                        height: 1,
                    };
                    self.hits.push(Zone::FreeRow(id), row);

                    let dragging = self.drag.dragged() == Some(id);
                    let name_style = if dragging {
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(self.theme.primary_fg)
                    };
                    let mut spans = vec![Span::styled(format!("• {name}"), name_style)];
                    if count > 0 {
                        spans.push(Span::styled(
                            format!(" ×{count}"),
                            Style::default()
                                .fg(self.theme.accent)
                                .add_modifier(Modifier::BOLD),
                        ));
                    }
                    lines.push(Line::from(spans));
                }
                frame.render_widget(Paragraph::new(lines), inner);
            }
        }
    }

    fn render_duty_pool(&mut self, frame: &mut Frame, area: Rect) {
        let hovered = self.drag.is_dragging()
            && self
                .drag_pos
                .map(|(x, y)| rect_contains(area, x, y))
                .unwrap_or(false);
        let border_style = if hovered {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!("Administrative duty ({})", self.board.badges().duty));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if !self.board.is_ready() {
            return;
        }

        self.hits.push(Zone::DutyDrop, inner);

        let names: Vec<(i64, String)> = self
            .board
            .duty()
            .ids()
            .iter()
            .map(|&id| (id, self.resource_name(id)))
            .collect();

        if names.is_empty() {
            self.render_hint(frame, inner, "Everyone is allocated.");
            return;
        }

        let mut lines = Vec::new();
        for (idx, (id, name)) in names.into_iter().enumerate() {
            if idx as u16 >= inner.height {
                break;
            }
            let row = Rect {
                x: inner.x,
                y: inner.y + idx as u16,
                width: inner.width,
                height: 1,
            };
            self.hits.push(Zone::DutyRow(id), row);

            let dragging = self.drag.dragged() == Some(id);
            let style = if dragging {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };
            lines.push(Line::from(Span::styled(format!("• {name}"), style)));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_blocked(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Blocked ({})", self.board.badges().blocked));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let blocked = self.board.registry().blocked();
        if blocked.is_empty() {
            self.render_hint(frame, inner, "No blocked resources.");
            return;
        }

        let lines: Vec<Line> = blocked
            .iter()
            .take(inner.height as usize)
            .map(|entry| {
                Line::from(vec![
                    Span::styled(
                        entry.name.clone(),
                        Style::default().fg(self.theme.primary_fg),
                    ),
                    Span::styled(
                        format!("  {}", entry.reason_label()),
                        Style::default().fg(self.theme.muted),
                    ),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_cards(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title(format!(
            "Activity cards ({})",
            self.board.destinations().len()
        ));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.hits.set_cards_area(inner);

        if self.board.destinations().is_empty() {
            if self.board.is_ready() {
                self.render_hint(
                    frame,
                    inner,
                    "Click a goal to open a card, then drag resources onto it.",
                );
            }
            return;
        }

        let views: Vec<CardView> = self
            .board
            .destinations()
            .cards()
            .iter()
            .map(|card| CardView {
                id: card.id(),
                title: card.title().to_string(),
                ordinal: card.ordinal(),
                count: card.member_count(),
                members: card
                    .members()
                    .iter()
                    .map(|&id| (id, self.resource_name(id)))
                    .collect(),
            })
            .collect();

        let bottom = inner.y.saturating_add(inner.height);
        let mut y = inner.y;
        for view in views {
            if y.saturating_add(3) > bottom {
                break;
            }
            let wanted = view.members.len().max(1) as u16 + 2;
            let height = wanted.min(bottom - y);
            let card_area = Rect {
                x: inner.x,
                y,
                width: inner.width,
                height,
            };
            y = y.saturating_add(height);

            self.hits.push(Zone::CardDrop(view.id), card_area);
            self.render_card(frame, card_area, &view);
        }
    }

    fn render_card(&mut self, frame: &mut Frame, area: Rect, view: &CardView) {
        let hovered = self.drag.is_dragging()
            && self
                .drag_pos
                .map(|(x, y)| rect_contains(area, x, y))
                .unwrap_or(false);
        let border_style = if hovered {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default()
        };

        let header = Line::from(vec![
            Span::styled(
                view.title.clone(),
                Style::default()
                    .fg(self.theme.primary_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" ·{}", view.ordinal),
                Style::default().fg(self.theme.muted),
            ),
        ]);
        let corner = Line::from(vec![
            Span::styled(
                format!(" {} ", view.count),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("[x]", Style::default().fg(self.theme.danger)),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Title::from(header))
            .title(Title::from(corner).alignment(Alignment::Right));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        // The [x] sits at the top-right corner of the border row.
        if area.width > 5 {
            let close = Rect {
                x: area.x + area.width - 5,
                y: area.y,
                width: 4,
                height: 1,
            };
            self.hits.push(Zone::CardClose(view.id), close);
        }

        if view.members.is_empty() {
            self.render_hint(frame, inner, "Drop resources here.");
            return;
        }

        let pulse = self.pulse;
        let mut lines = Vec::new();
        for (idx, (id, name)) in view.members.iter().enumerate() {
            if idx as u16 >= inner.height {
                break;
            }
            let row = Rect {
                x: inner.x,
                y: inner.y + idx as u16,
                width: inner.width,
                height: 1,
            };
            if row.width > 2 {
                let remove = Rect {
                    x: row.x + row.width - 2,
                    y: row.y,
                    width: 2,
                    height: 1,
                };
                self.hits.push(Zone::ChipRemove(view.id, *id), remove);
            }

            let pulsing = pulse
                .map(|p| p.card == view.id && p.resource == *id)
                .unwrap_or(false);
            let name_style = if pulsing {
                Style::default()
                    .fg(self.theme.warning)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.primary_fg)
            };

            let pad = (inner.width as usize).saturating_sub(2);
            let mut label = format!("• {name}");
            if label.chars().count() > pad {
                label = label.chars().take(pad.saturating_sub(1)).collect();
                label.push('…');
            }
            lines.push(Line::from(vec![
                Span::styled(format!("{label:<pad$}"), name_style),
                Span::styled("✕", Style::default().fg(self.theme.danger)),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let hints = "q quit · d date · r reload · / filter · ↵ open card · n new card";
        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", self.selected_date),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(self.status.clone()),
            Span::styled(
                format!("  {hints}"),
                Style::default().fg(self.theme.muted),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_hint(&self, frame: &mut Frame, area: Rect, text: &str) {
        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(self.theme.muted))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_date_prompt(&self, frame: &mut Frame, prompt: &DatePrompt) {
        let frame_area = frame.size();
        let width = 30.min(frame_area.width);
        let height = 3.min(frame_area.height);
        let popup = Rect {
            x: frame_area.width.saturating_sub(width) / 2,
            y: frame_area.height.saturating_sub(height) / 2,
            width,
            height,
        };
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .title("Open date (YYYY-MM-DD)");
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let (before, after) = prompt.buffer.split_at(prompt.cursor.min(prompt.buffer.len()));
        let mut spans = vec![Span::raw(before.to_string())];
        let mut rest = after.chars();
        match rest.next() {
            Some(ch) => {
                spans.push(Span::styled(
                    ch.to_string(),
                    Style::default().add_modifier(Modifier::REVERSED),
                ));
                spans.push(Span::raw(rest.collect::<String>()));
            }
            None => {
                spans.push(Span::styled(
                    " ",
                    Style::default().add_modifier(Modifier::REVERSED),
                ));
            }
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), inner);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}
