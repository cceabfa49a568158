// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use fleet_app::{
    FleetBackend, FleetCommand, FleetEvent, FleetState, SessionState, SortDirection, SortKey,
    SortSpec, Vehicle, VehicleField, VehicleId, equipment_summary,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const SORT_MARK_ASC: &str = "▲";
const SORT_MARK_DESC: &str = "▼";

pub enum InternalEvent {
    ClearStatus { token: u64 },
}

/// Where keystrokes land while the drawer is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DrawerFocus {
    #[default]
    Brand,
    ModelName,
    Vin,
    LicensePlate,
    TagInput,
    Tags,
}

impl DrawerFocus {
    const ORDER: [Self; 6] = [
        Self::Brand,
        Self::ModelName,
        Self::Vin,
        Self::LicensePlate,
        Self::TagInput,
        Self::Tags,
    ];

    fn field(self) -> Option<VehicleField> {
        match self {
            Self::Brand => Some(VehicleField::Brand),
            Self::ModelName => Some(VehicleField::ModelName),
            Self::Vin => Some(VehicleField::Vin),
            Self::LicensePlate => Some(VehicleField::LicensePlateNumber),
            Self::TagInput | Self::Tags => None,
        }
    }

    fn step(self, delta: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let index = Self::ORDER
            .iter()
            .position(|focus| *focus == self)
            .unwrap_or(0) as isize;
        Self::ORDER[(index + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct DrawerUiState {
    focus: DrawerFocus,
    tag_input: String,
    tag_cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    cursor: usize,
    search_editing: bool,
    drawer: DrawerUiState,
    status_token: u64,
}

pub fn run_app<B: FleetBackend>(state: &mut FleetState, backend: &mut B) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    dispatch(state, backend, &mut view_data, &internal_tx, FleetCommand::Reload);

    let mut result = Ok(());
    loop {
        process_internal_events(state, backend, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event
            && let Event::Key(key) = event::read().context("read event")?
            && handle_key_event(state, backend, &mut view_data, &internal_tx, key)
        {
            break;
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<B: FleetBackend>(
    state: &mut FleetState,
    backend: &mut B,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(backend, FleetCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

/// Runs one command and syncs the view to whatever changed. Failure
/// messages stay on the status line until the next status replaces them.
fn dispatch<B: FleetBackend>(
    state: &mut FleetState,
    backend: &mut B,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: FleetCommand,
) -> Vec<FleetEvent> {
    let events = state.dispatch(backend, command);

    let mut status_changed = false;
    let mut failed = false;
    for event in &events {
        match event {
            FleetEvent::VehicleCreated(id) => move_cursor_to(state, view_data, *id),
            FleetEvent::SessionChanged(SessionState::Closed) => {
                view_data.drawer = DrawerUiState::default();
            }
            FleetEvent::StatusUpdated(_) => status_changed = true,
            FleetEvent::OperationFailed(_) => failed = true,
            _ => {}
        }
    }
    if status_changed {
        view_data.status_token = view_data.status_token.saturating_add(1);
        if !failed {
            schedule_status_clear(internal_tx, view_data.status_token);
        }
    }

    clamp_cursor(state, view_data);
    events
}

fn handle_key_event<B: FleetBackend>(
    state: &mut FleetState,
    backend: &mut B,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match state.session.state() {
        SessionState::ConfirmingDiscard => {
            handle_discard_dialog_key(state, backend, view_data, internal_tx, key);
            return false;
        }
        SessionState::OpenClean | SessionState::OpenDirty => {
            handle_drawer_key(state, backend, view_data, internal_tx, key);
            return false;
        }
        SessionState::Closed => {}
    }

    if view_data.search_editing {
        handle_search_key(state, backend, view_data, internal_tx, key);
        return false;
    }

    handle_table_key(state, backend, view_data, internal_tx, key);
    false
}

fn handle_table_key<B: FleetBackend>(
    state: &mut FleetState,
    backend: &mut B,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let current = cursor_vehicle_id(state, view_data);
    let command = match (key.code, key.modifiers) {
        (KeyCode::Char('j') | KeyCode::Down, _) => {
            move_cursor(state, view_data, 1);
            None
        }
        (KeyCode::Char('k') | KeyCode::Up, _) => {
            move_cursor(state, view_data, -1);
            None
        }
        (KeyCode::Char('g') | KeyCode::Home, _) => {
            view_data.cursor = 0;
            None
        }
        (KeyCode::Char('G') | KeyCode::End, _) => {
            view_data.cursor = state.visible().len().saturating_sub(1);
            None
        }
        (KeyCode::Char('/'), _) => {
            view_data.search_editing = true;
            None
        }
        (KeyCode::Char(' '), _) => current.map(FleetCommand::ToggleRow),
        (KeyCode::Char('a'), KeyModifiers::NONE) => Some(FleetCommand::ToggleAllVisible),
        (KeyCode::Enter | KeyCode::Char('e'), _) => current.map(FleetCommand::OpenEditor),
        (KeyCode::Char('x'), KeyModifiers::NONE) => current.map(FleetCommand::DeleteVehicle),
        (KeyCode::Char('D'), _) => Some(FleetCommand::DeleteSelection),
        (KeyCode::Char('n'), KeyModifiers::NONE) => Some(FleetCommand::CreateVehicle),
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            Some(FleetCommand::SetSort(SortSpec::cycle(state.sort)))
        }
        (KeyCode::Char('S'), _) => Some(FleetCommand::SetSort(None)),
        (KeyCode::Char('r'), KeyModifiers::NONE) => Some(FleetCommand::Reload),
        (KeyCode::Char('R'), _) => current.map(FleetCommand::RefreshVehicle),
        _ => None,
    };

    if let Some(command) = command {
        dispatch(state, backend, view_data, internal_tx, command);
    }
}

fn handle_search_key<B: FleetBackend>(
    state: &mut FleetState,
    backend: &mut B,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let mut search = state.search.clone();
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            view_data.search_editing = false;
            return;
        }
        KeyCode::Backspace => {
            search.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => search.clear(),
        KeyCode::Char(ch) => search.push(ch),
        _ => return,
    }
    dispatch(
        state,
        backend,
        view_data,
        internal_tx,
        FleetCommand::SetSearch(search),
    );
    view_data.cursor = 0;
}

fn handle_drawer_key<B: FleetBackend>(
    state: &mut FleetState,
    backend: &mut B,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    let focus = view_data.drawer.focus;

    match key.code {
        KeyCode::Esc => {
            dispatch(state, backend, view_data, internal_tx, FleetCommand::RequestClose);
        }
        KeyCode::Char('s') if control => {
            dispatch(state, backend, view_data, internal_tx, FleetCommand::Update);
        }
        KeyCode::Tab => view_data.drawer.focus = focus.step(1),
        KeyCode::BackTab => view_data.drawer.focus = focus.step(-1),
        KeyCode::Down if focus == DrawerFocus::Tags => {
            let count = working_tags(state).len();
            if view_data.drawer.tag_cursor + 1 < count {
                view_data.drawer.tag_cursor += 1;
            }
        }
        KeyCode::Up if focus == DrawerFocus::Tags => {
            view_data.drawer.tag_cursor = view_data.drawer.tag_cursor.saturating_sub(1);
        }
        KeyCode::Down => view_data.drawer.focus = focus.step(1),
        KeyCode::Up => view_data.drawer.focus = focus.step(-1),
        KeyCode::Char('d') if control => {
            if focus == DrawerFocus::Tags
                && let Some(tag) = working_tags(state).get(view_data.drawer.tag_cursor).cloned()
            {
                dispatch(state, backend, view_data, internal_tx, FleetCommand::RemoveTag(tag));
                let count = working_tags(state).len();
                view_data.drawer.tag_cursor = view_data.drawer.tag_cursor.min(count.saturating_sub(1));
            }
        }
        KeyCode::Enter if focus == DrawerFocus::TagInput => {
            let tag = std::mem::take(&mut view_data.drawer.tag_input);
            dispatch(state, backend, view_data, internal_tx, FleetCommand::AddTag(tag));
        }
        KeyCode::Backspace => edit_focused_text(state, backend, view_data, internal_tx, None),
        KeyCode::Char(ch) if !control => {
            edit_focused_text(state, backend, view_data, internal_tx, Some(ch));
        }
        _ => {}
    }
}

/// Appends `ch` to the focused text, or drops the last character.
fn edit_focused_text<B: FleetBackend>(
    state: &mut FleetState,
    backend: &mut B,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    ch: Option<char>,
) {
    let focus = view_data.drawer.focus;
    if focus == DrawerFocus::TagInput {
        match ch {
            Some(ch) => view_data.drawer.tag_input.push(ch),
            None => {
                view_data.drawer.tag_input.pop();
            }
        }
        return;
    }

    let Some(field) = focus.field() else {
        return;
    };
    let Some(mut value) = state
        .session
        .working()
        .map(|vehicle| vehicle.field(field).to_owned())
    else {
        return;
    };
    match ch {
        Some(ch) => value.push(ch),
        None => {
            value.pop();
        }
    }
    dispatch(
        state,
        backend,
        view_data,
        internal_tx,
        FleetCommand::EditField(field, value),
    );
}

fn handle_discard_dialog_key<B: FleetBackend>(
    state: &mut FleetState,
    backend: &mut B,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let command = match key.code {
        KeyCode::Char('i') => FleetCommand::DiscardChanges,
        KeyCode::Char('k') | KeyCode::Esc => FleetCommand::KeepEditing,
        KeyCode::Char('s') => FleetCommand::SaveAndClose,
        _ => return,
    };
    dispatch(state, backend, view_data, internal_tx, command);
}

fn working_tags(state: &FleetState) -> Vec<String> {
    state
        .session
        .working()
        .map(|vehicle| vehicle.equipment.clone())
        .unwrap_or_default()
}

fn cursor_vehicle_id(state: &FleetState, view_data: &ViewData) -> Option<VehicleId> {
    state
        .visible()
        .get(view_data.cursor)
        .map(|vehicle| vehicle.id)
}

fn move_cursor(state: &FleetState, view_data: &mut ViewData, delta: isize) {
    let len = state.visible().len();
    if len == 0 {
        view_data.cursor = 0;
        return;
    }
    let next = view_data.cursor.saturating_add_signed(delta);
    view_data.cursor = next.min(len - 1);
}

fn move_cursor_to(state: &FleetState, view_data: &mut ViewData, id: VehicleId) {
    if let Some(index) = state.visible_ids().iter().position(|visible| *visible == id) {
        view_data.cursor = index;
    }
}

fn clamp_cursor(state: &FleetState, view_data: &mut ViewData) {
    let len = state.visible().len();
    view_data.cursor = view_data.cursor.min(len.saturating_sub(1));
}

fn render(frame: &mut ratatui::Frame<'_>, state: &FleetState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_search(frame, layout[0], state, view_data);

    if state.session.state().is_open() {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(layout[1]);
        render_table(frame, body[0], state, view_data);
        render_drawer(frame, body[1], state, view_data);
    } else {
        render_table(frame, layout[1], state, view_data);
    }

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if state.session.state() == SessionState::ConfirmingDiscard {
        let area = centered_rect(50, 30, frame.area());
        frame.render_widget(Clear, area);
        let dialog = Paragraph::new(
            "You have unsaved changes.\n\n[i] ignore changes  [k] keep editing  [s] save and close",
        )
        .block(
            Block::default()
                .title("discard changes?")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Red)),
        );
        frame.render_widget(dialog, area);
    }
}

fn render_search(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &FleetState,
    view_data: &ViewData,
) {
    let mut text = state.search.clone();
    let mut style = Style::default();
    if view_data.search_editing {
        text.push('_');
        style = style.fg(Color::Cyan);
    } else if text.is_empty() {
        text = "press / to search".to_owned();
        style = style.fg(Color::DarkGray);
    }
    let search = Paragraph::new(text)
        .style(style)
        .block(Block::default().title("search").borders(Borders::ALL));
    frame.render_widget(search, area);
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &FleetState,
    view_data: &ViewData,
) {
    let header_cells = std::iter::once(Cell::from(""))
        .chain(SortKey::ALL.iter().map(|key| {
            Cell::from(header_label(*key, state.sort)).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        }))
        .chain(std::iter::once(
            Cell::from("equipment").style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ));
    let header = Row::new(header_cells);

    let editing = state.session.vehicle_id();
    let rows = state.visible().into_iter().enumerate().map(|(index, vehicle)| {
        let mut style = Style::default();
        if Some(vehicle.id) == editing {
            style = style.fg(Color::Cyan);
        }
        if index == view_data.cursor {
            style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        }
        Row::new(row_cells(vehicle, state.selection.contains(vehicle.id))).style(style)
    });

    let widths = [
        Constraint::Length(3),
        Constraint::Length(19),
        Constraint::Min(8),
        Constraint::Min(8),
        Constraint::Min(8),
        Constraint::Length(12),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(state))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn row_cells(vehicle: &Vehicle, selected: bool) -> Vec<String> {
    let mut cells = Vec::with_capacity(SortKey::ALL.len() + 2);
    cells.push(if selected { "[x]" } else { "[ ]" }.to_owned());
    cells.extend(SortKey::ALL.iter().map(|key| key.value(vehicle).to_owned()));
    cells.push(equipment_summary(&vehicle.equipment));
    cells
}

fn header_label(key: SortKey, sort: Option<SortSpec>) -> String {
    match sort {
        Some(spec) if spec.key == key => {
            let mark = match spec.direction {
                SortDirection::Asc => SORT_MARK_ASC,
                SortDirection::Desc => SORT_MARK_DESC,
            };
            format!("{} {mark}", key.label())
        }
        _ => key.label().to_owned(),
    }
}

fn table_title(state: &FleetState) -> String {
    let visible = state.visible().len();
    let total = state.store.len();
    let mut title = if visible == total {
        format!("vehicles ({total})")
    } else {
        format!("vehicles ({visible}/{total})")
    };
    if !state.selection.is_empty() {
        title.push_str(&format!(" | {} selected", state.selection.len()));
    }
    title
}

fn render_drawer(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &FleetState,
    view_data: &ViewData,
) {
    let Some(vehicle) = state.session.working() else {
        return;
    };
    let title = match state.session.state() {
        SessionState::OpenDirty | SessionState::ConfirmingDiscard => {
            format!("vehicle {} *", vehicle.id)
        }
        _ => format!("vehicle {}", vehicle.id),
    };
    let drawer = Paragraph::new(drawer_text(vehicle, &view_data.drawer))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(drawer, area);
}

fn drawer_text(vehicle: &Vehicle, drawer: &DrawerUiState) -> String {
    let marker = |focus: DrawerFocus| if drawer.focus == focus { ">" } else { " " };
    let mut lines = Vec::new();
    for focus in DrawerFocus::ORDER {
        if let Some(field) = focus.field() {
            lines.push(format!(
                "{} {:<14}{}",
                marker(focus),
                field.label(),
                vehicle.field(field)
            ));
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "{} {:<14}{}",
        marker(DrawerFocus::TagInput),
        "add equipment",
        drawer.tag_input
    ));
    lines.push(format!("{} equipment", marker(DrawerFocus::Tags)));
    if vehicle.equipment.is_empty() {
        lines.push("    (none)".to_owned());
    }
    for (index, tag) in vehicle.equipment.iter().enumerate() {
        let pointer = if drawer.focus == DrawerFocus::Tags && index == drawer.tag_cursor {
            "*"
        } else {
            "-"
        };
        lines.push(format!("    {pointer} {tag}"));
    }
    lines.push(String::new());
    lines.push("tab next | enter add tag | ctrl+d remove tag | ctrl+s update | esc close".to_owned());
    lines.join("\n")
}

fn status_text(state: &FleetState, view_data: &ViewData) -> String {
    let (mode, hints) = match state.session.state() {
        SessionState::ConfirmingDiscard => ("CONFIRM", "i ignore | k keep editing | s save and close"),
        SessionState::OpenClean | SessionState::OpenDirty => {
            ("EDIT", "tab | enter tag | ctrl+d | ctrl+s | esc")
        }
        SessionState::Closed if view_data.search_editing => ("SEARCH", "type to filter | enter/esc done"),
        SessionState::Closed => (
            "NAV",
            "j/k | space a | / | enter | n x D | s/S | r R | ctrl+q",
        ),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
