// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod clipboard;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use permia_app::{
    AppCommand, AppMode, AppState, BroadcastField, BroadcastForm, BroadcastReceipt, CellInput,
    CellRenderer, CellView, ColumnSpec, DashboardCounts, Dataset, EditorKind, EntityKind,
    FILTER_ALL, FilterKind, FilterSpec, RowId, TableCommand, TableEvent, TableSet, TableSnapshot,
    cycle_choice, format_number, is_inactive, toggle_state,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];
const MASK: &str = "••••••••";
const CURSOR: &str = "▏";

/// Side effects the table screens need from the host.
pub trait AppRuntime {
    /// Re-reads the backing data source for a resync.
    fn load_dataset(&mut self) -> Result<Dataset>;
    fn copy_to_clipboard(&mut self, text: &str) -> Result<()>;
    /// Handles an "add record" action. Returns the status line to show.
    fn request_add(&mut self, kind: EntityKind, action: &'static str) -> Result<String>;
    fn deliver_broadcast(&mut self, receipt: &BroadcastReceipt) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EditTarget {
    row_id: RowId,
    field: &'static str,
}

#[derive(Debug, Default)]
struct ViewData {
    help_visible: bool,
    status_token: u64,
    selected_row: usize,
    selected_col: usize,
    /// Text being typed in search, filter or cell-edit mode.
    input: String,
    filter_key: Option<&'static str>,
    edit_target: Option<EditTarget>,
    broadcast: BroadcastForm,
    broadcast_field: BroadcastField,
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    tables: &mut TableSet,
    runtime: &mut R,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);
        clamp_table_cursor(state, tables, &mut view_data);

        if let Err(error) = terminal.draw(|frame| render(frame, state, tables, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        match drain_input(state, tables, runtime, &mut view_data, &internal_tx) {
            Ok(true) => break,
            Ok(false) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }

        // Input is drained; let deferred searches catch up.
        let changed = tables.tick();
        if changed.contains(&state.active_tab) {
            view_data.selected_row = 0;
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// Handles every key already queued so a burst of typing costs one
/// refilter. Returns true when the user asked to quit.
fn drain_input<R: AppRuntime>(
    state: &mut AppState,
    tables: &mut TableSet,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) -> Result<bool> {
    let mut timeout = POLL_INTERVAL;
    while event::poll(timeout).context("poll event")? {
        if let Event::Key(key) = event::read().context("read event")?
            && handle_key_event(state, tables, runtime, view_data, internal_tx, key)
        {
            return Ok(true);
        }
        timeout = Duration::ZERO;
    }
    Ok(false)
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
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

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    tables: &mut TableSet,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    match state.mode {
        AppMode::Nav => return handle_nav_key(state, tables, runtime, view_data, internal_tx, key),
        AppMode::Search => handle_search_key(state, tables, view_data, key),
        AppMode::FilterInput => handle_filter_input_key(state, tables, view_data, key),
        AppMode::CellEdit => {
            handle_cell_edit_key(state, tables, runtime, view_data, internal_tx, key);
        }
        AppMode::Broadcast => {
            handle_broadcast_key(state, tables, runtime, view_data, internal_tx, key);
        }
    }
    false
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    tables: &mut TableSet,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Tab => switch_tab(state, view_data, AppCommand::NextTab),
        KeyCode::BackTab => switch_tab(state, view_data, AppCommand::PrevTab),
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.selected_row = view_data.selected_row.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            view_data.selected_col = view_data.selected_col.saturating_add(1);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            view_data.selected_col = view_data.selected_col.saturating_sub(1);
        }
        KeyCode::Char('/') => {
            view_data.input = tables
                .get(state.active_tab)
                .snapshot()
                .search_input;
            state.dispatch(AppCommand::EnterSearch);
        }
        KeyCode::Char(digit @ '1'..='9') => {
            let index = digit as usize - '1' as usize;
            handle_filter_key(state, tables, view_data, internal_tx, index);
        }
        KeyCode::Char('F') => {
            apply_table_command(
                state,
                tables,
                runtime,
                view_data,
                internal_tx,
                TableCommand::ClearFilters,
            );
        }
        KeyCode::Char(']') | KeyCode::PageDown => {
            apply_table_command(state, tables, runtime, view_data, internal_tx, TableCommand::NextPage);
        }
        KeyCode::Char('[') | KeyCode::PageUp => {
            apply_table_command(
                state,
                tables,
                runtime,
                view_data,
                internal_tx,
                TableCommand::PreviousPage,
            );
        }
        KeyCode::Char('g') | KeyCode::Home => {
            apply_table_command(state, tables, runtime, view_data, internal_tx, TableCommand::FirstPage);
        }
        KeyCode::Char('G') | KeyCode::End => {
            apply_table_command(state, tables, runtime, view_data, internal_tx, TableCommand::LastPage);
        }
        KeyCode::Char('p') => {
            let current = tables.get(state.active_tab).snapshot().page_size;
            let next = next_page_size(current);
            apply_table_command(
                state,
                tables,
                runtime,
                view_data,
                internal_tx,
                TableCommand::SetPageSize(next),
            );
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            begin_cell_edit(state, tables, runtime, view_data, internal_tx);
        }
        KeyCode::Char('y') => copy_selected(state, tables, runtime, view_data, internal_tx),
        KeyCode::Char('a') => request_add(state, tables, runtime, view_data, internal_tx, 0),
        KeyCode::Char('A') => request_add(state, tables, runtime, view_data, internal_tx, 1),
        KeyCode::Char('b') => {
            view_data.broadcast_field = BroadcastField::Title;
            state.dispatch(AppCommand::OpenBroadcast);
        }
        KeyCode::Char('r') => reload_active_table(state, tables, runtime, view_data, internal_tx),
        _ => {}
    }
    false
}

fn switch_tab(state: &mut AppState, view_data: &mut ViewData, command: AppCommand) {
    state.dispatch(command);
    view_data.selected_row = 0;
    view_data.selected_col = 0;
}

fn handle_search_key(
    state: &mut AppState,
    tables: &mut TableSet,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToNav);
            return;
        }
        KeyCode::Backspace => {
            view_data.input.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.input.push(ch);
        }
        _ => return,
    }
    // Only the immediate value moves here; the idle tick refilters.
    tables
        .get_mut(state.active_tab)
        .dispatch(TableCommand::SetSearch(view_data.input.clone()));
}

fn handle_filter_key(
    state: &mut AppState,
    tables: &mut TableSet,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    index: usize,
) {
    let table = tables.get_mut(state.active_tab);
    let Some(spec) = table.schema().filters.get(index) else {
        let message = format!("no filter {} on {}", index + 1, state.active_tab.label());
        emit_status(state, view_data, internal_tx, message);
        return;
    };

    let current = table.filter_value(spec.key).unwrap_or(FILTER_ALL).to_owned();
    if let FilterKind::MinThreshold { .. } = spec.kind {
        view_data.input = if is_inactive(&current) {
            String::new()
        } else {
            current
        };
        view_data.filter_key = Some(spec.key);
        state.dispatch(AppCommand::EnterFilterInput);
        return;
    }

    let next = next_filter_value(spec, &current);
    table.dispatch(TableCommand::SetFilter {
        key: spec.key,
        value: next.to_owned(),
    });
    let message = format!("{}: {}", spec.label, filter_option_label(spec, next));
    emit_status(state, view_data, internal_tx, message);
}

/// The option after `current` in the cycle all → options → all.
fn next_filter_value(spec: &FilterSpec, current: &str) -> &'static str {
    let options = spec.kind.options();
    if is_inactive(current) {
        return options.first().map_or(FILTER_ALL, |option| option.value);
    }
    options
        .iter()
        .position(|option| option.value == current)
        .and_then(|position| options.get(position + 1))
        .map_or(FILTER_ALL, |option| option.value)
}

fn filter_option_label(spec: &FilterSpec, value: &str) -> String {
    if is_inactive(value) {
        return FILTER_ALL.to_owned();
    }
    spec.kind
        .options()
        .iter()
        .find(|option| option.value == value)
        .map_or_else(|| value.to_owned(), |option| option.label.to_owned())
}

fn handle_filter_input_key(
    state: &mut AppState,
    tables: &mut TableSet,
    view_data: &mut ViewData,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            view_data.filter_key = None;
            state.dispatch(AppCommand::ExitToNav);
            return;
        }
        KeyCode::Backspace => {
            view_data.input.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.input.push(ch);
        }
        _ => return,
    }
    let Some(filter_key) = view_data.filter_key else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };
    tables
        .get_mut(state.active_tab)
        .dispatch(TableCommand::SetFilter {
            key: filter_key,
            value: view_data.input.clone(),
        });
}

fn begin_cell_edit<R: AppRuntime>(
    state: &mut AppState,
    tables: &mut TableSet,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let snapshot = tables.get(state.active_tab).snapshot();
    let Some(row) = snapshot.rows.get(view_data.selected_row) else {
        emit_status(state, view_data, internal_tx, "no row selected");
        return;
    };
    let Some(column) = snapshot.schema.columns.get(view_data.selected_col) else {
        return;
    };
    let Some(editor) = column.editor else {
        let message = format!("{} is read-only", column.header.to_lowercase());
        emit_status(state, view_data, internal_tx, message);
        return;
    };
    let current = &row.cells[view_data.selected_col].value;

    let input = match editor {
        EditorKind::Choice(options) => {
            let Some(next) = cycle_choice(options, &current.display()) else {
                return;
            };
            CellInput::Choice(next.to_owned())
        }
        EditorKind::Toggle(mapping) => CellInput::Toggle(!toggle_state(mapping, current)),
        EditorKind::Text | EditorKind::Number => {
            view_data.input = current.display();
            view_data.edit_target = Some(EditTarget {
                row_id: row.id.clone(),
                field: column.key,
            });
            state.dispatch(AppCommand::EnterCellEdit);
            return;
        }
    };
    apply_table_command(
        state,
        tables,
        runtime,
        view_data,
        internal_tx,
        TableCommand::CommitCell {
            row_id: row.id.clone(),
            field: column.key,
            input,
        },
    );
}

fn handle_cell_edit_key<R: AppRuntime>(
    state: &mut AppState,
    tables: &mut TableSet,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.edit_target = None;
            state.dispatch(AppCommand::ExitToNav);
            emit_status(state, view_data, internal_tx, "edit canceled");
        }
        KeyCode::Enter => {
            state.dispatch(AppCommand::ExitToNav);
            let Some(target) = view_data.edit_target.take() else {
                return;
            };
            let input = CellInput::Text(std::mem::take(&mut view_data.input));
            let changed = apply_table_command(
                state,
                tables,
                runtime,
                view_data,
                internal_tx,
                TableCommand::CommitCell {
                    row_id: target.row_id,
                    field: target.field,
                    input,
                },
            );
            if !changed {
                emit_status(state, view_data, internal_tx, "no change");
            }
        }
        KeyCode::Backspace => {
            view_data.input.pop();
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.input.push(ch);
        }
        _ => {}
    }
}

fn copy_selected<R: AppRuntime>(
    state: &mut AppState,
    tables: &TableSet,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let table = tables.get(state.active_tab);
    let snapshot = table.snapshot();
    let Some(row) = snapshot.rows.get(view_data.selected_row) else {
        emit_status(state, view_data, internal_tx, "no row selected");
        return;
    };
    let Some(column) = copy_column(snapshot.schema.columns, view_data.selected_col) else {
        emit_status(state, view_data, internal_tx, "nothing to copy on this tab");
        return;
    };
    let Some(value) = table.sensitive_value(&row.id, column.key) else {
        return;
    };

    let message = match runtime.copy_to_clipboard(&value) {
        Ok(()) => format!("copied {}", column.header.to_lowercase()),
        Err(error) => format!("copy failed: {error:#}"),
    };
    emit_status(state, view_data, internal_tx, message);
}

/// The selected column when it is copyable, otherwise the first copyable
/// column of the row.
fn copy_column(columns: &'static [ColumnSpec], selected: usize) -> Option<&'static ColumnSpec> {
    columns
        .get(selected)
        .filter(|column| column.copyable)
        .or_else(|| columns.iter().find(|column| column.copyable))
}

fn request_add<R: AppRuntime>(
    state: &mut AppState,
    tables: &mut TableSet,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    index: usize,
) {
    let Some(action) = tables.get(state.active_tab).schema().add_actions.get(index) else {
        let message = format!("nothing to add on {}", state.active_tab.label());
        emit_status(state, view_data, internal_tx, message);
        return;
    };
    apply_table_command(
        state,
        tables,
        runtime,
        view_data,
        internal_tx,
        TableCommand::RequestAdd(action.key),
    );
}

fn reload_active_table<R: AppRuntime>(
    state: &mut AppState,
    tables: &mut TableSet,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match runtime.load_dataset() {
        Ok(dataset) => {
            let events = tables.resync(state.active_tab, dataset);
            report_table_events(state, runtime, view_data, internal_tx, events);
        }
        Err(error) => {
            emit_status(state, view_data, internal_tx, format!("reload failed: {error:#}"));
        }
    }
}

/// Dispatches to the active table and reports what happened. Returns false
/// when the command changed nothing.
fn apply_table_command<R: AppRuntime>(
    state: &mut AppState,
    tables: &mut TableSet,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: TableCommand,
) -> bool {
    let events = tables.get_mut(state.active_tab).dispatch(command);
    let changed = !events.is_empty();
    report_table_events(state, runtime, view_data, internal_tx, events);
    changed
}

fn report_table_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: Vec<TableEvent>,
) {
    let kind = state.active_tab;
    for event in events {
        debug!(kind = kind.as_str(), ?event, "table event");
        match event {
            TableEvent::PageChanged(_) => view_data.selected_row = 0,
            TableEvent::RowPatched {
                row_id,
                field,
                value,
            } => {
                let message = format!("{} #{row_id}: {field} = {value}", kind.as_str());
                emit_status(state, view_data, internal_tx, message);
            }
            TableEvent::FiltersCleared => {
                emit_status(state, view_data, internal_tx, "filters cleared");
            }
            TableEvent::PageSizeChanged(size) => {
                emit_status(state, view_data, internal_tx, format!("{size} rows per page"));
            }
            TableEvent::AddRequested { kind, action } => {
                let message = match runtime.request_add(kind, action) {
                    Ok(message) => message,
                    Err(error) => format!("add failed: {error:#}"),
                };
                emit_status(state, view_data, internal_tx, message);
            }
            TableEvent::Resynced { rows } => {
                let message = format!("reloaded {rows} {}", kind.label());
                emit_status(state, view_data, internal_tx, message);
            }
            TableEvent::SearchApplied(_) | TableEvent::FilterChanged { .. } => {}
        }
    }
}

fn handle_broadcast_key<R: AppRuntime>(
    state: &mut AppState,
    tables: &TableSet,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let field = view_data.broadcast_field;
    match key.code {
        KeyCode::Esc => {
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Tab => view_data.broadcast_field = field.next(),
        KeyCode::Enter => submit_broadcast(state, tables, runtime, view_data, internal_tx),
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            submit_broadcast(state, tables, runtime, view_data, internal_tx);
        }
        KeyCode::Backspace if field.is_text() => {
            broadcast_text_mut(&mut view_data.broadcast, field).pop();
        }
        KeyCode::Char(ch) if field.is_text() && !key.modifiers.contains(KeyModifiers::CONTROL) => {
            broadcast_text_mut(&mut view_data.broadcast, field).push(ch);
        }
        KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => match field {
            BroadcastField::Audience => view_data.broadcast.cycle_audience(),
            BroadcastField::SendEmail => {
                view_data.broadcast.send_email = !view_data.broadcast.send_email;
            }
            BroadcastField::SendSms => {
                view_data.broadcast.send_sms = !view_data.broadcast.send_sms;
            }
            BroadcastField::Title | BroadcastField::Message => {}
        },
        _ => {}
    }
}

fn broadcast_text_mut(form: &mut BroadcastForm, field: BroadcastField) -> &mut String {
    match field {
        BroadcastField::Message => &mut form.message,
        _ => &mut form.title,
    }
}

fn submit_broadcast<R: AppRuntime>(
    state: &mut AppState,
    tables: &TableSet,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let receipt = match view_data.broadcast.submit(tables.users.store().rows()) {
        Ok(receipt) => receipt,
        Err(error) => {
            emit_status(state, view_data, internal_tx, format!("{error:#}"));
            return;
        }
    };
    let message = match runtime.deliver_broadcast(&receipt) {
        Ok(()) => receipt.summary(),
        Err(error) => format!("broadcast failed: {error:#}"),
    };
    view_data.broadcast_field = BroadcastField::Title;
    state.dispatch(AppCommand::ExitToNav);
    emit_status(state, view_data, internal_tx, message);
}

fn next_page_size(current: usize) -> usize {
    PAGE_SIZES
        .iter()
        .copied()
        .find(|size| *size > current)
        .unwrap_or(PAGE_SIZES[0])
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, tables: &TableSet, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = EntityKind::ALL
        .iter()
        .position(|kind| *kind == state.active_tab)
        .unwrap_or(0);
    let tab_titles = EntityKind::ALL
        .iter()
        .map(|kind| kind.label())
        .collect::<Vec<&str>>();
    let tabs = Tabs::new(tab_titles)
        .block(
            Block::default()
                .title(dashboard_title(&tables.dashboard_counts()))
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let snapshot = tables.get(state.active_tab).snapshot();

    let toolbar = Paragraph::new(toolbar_line(state, &snapshot, view_data))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(toolbar, layout[1]);

    render_table(frame, layout[2], state, &snapshot, view_data);

    let footer = Paragraph::new(footer_text(&snapshot)).style(Style::default().fg(Color::Gray));
    frame.render_widget(footer, layout[3]);

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[4]);

    if state.mode == AppMode::Broadcast {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let broadcast = Paragraph::new(render_broadcast_text(view_data)).block(
            Block::default()
                .title("broadcast")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(broadcast, area);
    }

    if view_data.help_visible {
        let area = centered_rect(80, 72, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn toolbar_line(state: &AppState, snapshot: &TableSnapshot, view_data: &ViewData) -> Line<'static> {
    let search = if state.mode == AppMode::Search {
        format!("/{}{CURSOR}", view_data.input)
    } else if snapshot.search_input.is_empty() {
        "/ search".to_owned()
    } else {
        format!("/{}", snapshot.search_input)
    };
    let search_style = if snapshot.search_pending {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![Span::styled(search, search_style)];
    for (index, filter) in snapshot.filters.iter().enumerate() {
        let value = if state.mode == AppMode::FilterInput
            && view_data.filter_key == Some(filter.spec.key)
        {
            format!("{}{CURSOR}", view_data.input)
        } else {
            filter_option_label(filter.spec, &filter.value)
        };
        let style = if filter.is_active() {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} {}: {value}", index + 1, filter.spec.label),
            style,
        ));
    }
    Line::from(spans)
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    snapshot: &TableSnapshot,
    view_data: &ViewData,
) {
    let title = format!(
        "{} · {} of {}",
        snapshot.schema.title, snapshot.filtered_count, snapshot.total_count
    );
    if snapshot.rows.is_empty() {
        let hint = if snapshot.total_count == 0 {
            "no rows".to_owned()
        } else {
            "no matching rows -- press F to clear search and filters".to_owned()
        };
        let empty = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, area);
        return;
    }

    let columns = snapshot.schema.columns;
    let widths = vec![Constraint::Min(8); columns.len().max(1)];
    let header = Row::new(columns.iter().map(|column| {
        Cell::from(column.header).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let editing = state.mode == AppMode::CellEdit;
    let rows = snapshot.rows.iter().enumerate().map(|(row_index, row)| {
        let selected_row = row_index == view_data.selected_row;
        let cells = columns
            .iter()
            .zip(&row.cells)
            .enumerate()
            .map(|(column_index, (column, cell))| {
                let selected_cell = selected_row && column_index == view_data.selected_col;
                let text = if selected_cell && editing {
                    format!("{}{CURSOR}", view_data.input)
                } else {
                    render_cell(column, cell)
                };
                let mut style = Style::default();
                if column.renderer == CellRenderer::Badge {
                    style = style.fg(badge_color(&cell.value.display()));
                }
                if selected_row {
                    style = style.bg(Color::DarkGray);
                }
                if selected_cell {
                    style = Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD);
                }
                Cell::from(text).style(style)
            })
            .collect::<Vec<_>>();
        Row::new(cells)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_cell(column: &ColumnSpec, cell: &CellView) -> String {
    match column.renderer {
        CellRenderer::Masked => MASK.to_owned(),
        CellRenderer::Money => cell
            .value
            .as_number()
            .map_or_else(|| cell.value.display(), format_money),
        CellRenderer::Ratio { .. } => match cell.total {
            Some(total) => format!("{} / {}", cell.value, format_number(total)),
            None => cell.value.display(),
        },
        CellRenderer::Plain | CellRenderer::Mono | CellRenderer::Badge => cell.value.display(),
    }
}

fn badge_color(value: &str) -> Color {
    match value {
        "Active" | "Available" | "Completed" | "Paid" | "true" => Color::Green,
        "Pending" | "Limited" | "Suspended" | "Used" => Color::Yellow,
        _ => Color::Red,
    }
}

fn format_money(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let absolute = cents.unsigned_abs();
    let dollars = absolute / 100;
    let cents_component = absolute % 100;
    format!("{sign}${dollars}.{cents_component:02}")
}

fn dashboard_title(counts: &DashboardCounts) -> String {
    format!(
        "permia · sales {} · {} active users · {} open orders",
        format_money(counts.total_sales),
        counts.active_users,
        counts.open_orders
    )
}

fn footer_text(snapshot: &TableSnapshot) -> String {
    format!(
        " page {} of {} · {} per page",
        snapshot.page_index + 1,
        snapshot.page_count,
        snapshot.page_size
    )
}

fn render_broadcast_text(view_data: &ViewData) -> String {
    let form = &view_data.broadcast;
    let check = |on: bool| if on { "[x]" } else { "[ ]" };
    BroadcastField::ALL
        .iter()
        .map(|field| {
            let marker = if *field == view_data.broadcast_field {
                ">"
            } else {
                " "
            };
            let value = match field {
                BroadcastField::Title => form.title.clone(),
                BroadcastField::Message => form.message.clone(),
                BroadcastField::Audience => form.audience.label().to_owned(),
                BroadcastField::SendEmail => check(form.send_email).to_owned(),
                BroadcastField::SendSms => check(form.send_sms).to_owned(),
            };
            format!("{marker} {:<9} {value}", field.label())
        })
        .chain(std::iter::once(
            "\ntab next field | space toggle | enter send | esc close".to_owned(),
        ))
        .collect::<Vec<_>>()
        .join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q/ctrl+c quit | ? help\n\
nav: tab/shift+tab tabs | j/k rows | h/l columns | q quit\n\
filter: / search | 1-9 cycle filter or type threshold | F clear search and filters\n\
page: ]/[ or pgdn/pgup next/prev | g/G first/last | p page size\n\
edit: e/enter edit cell (choices cycle, toggles flip) | y copy secret | r reload tab\n\
add: a add | A bulk add | b broadcast\n\
input: type to edit | backspace delete | enter apply | esc back\n\
broadcast: tab next field | space toggle/cycle | enter or ctrl+s send | esc close"
}

fn status_text(state: &AppState, _view_data: &ViewData) -> String {
    let hints = match state.mode {
        AppMode::Nav => "tab j/k/h/l | / 1-9 F | [ ] g/G p | e y a r b | ? q",
        AppMode::Search => "type to search | enter/esc done",
        AppMode::FilterInput => "type a minimum | enter/esc done",
        AppMode::CellEdit => "enter save | esc cancel",
        AppMode::Broadcast => "tab field | enter send | esc close",
    };
    let mode = state.mode.label();
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn clamp_table_cursor(state: &AppState, tables: &TableSet, view_data: &mut ViewData) {
    let table = tables.get(state.active_tab);
    let rows = table.snapshot().rows.len();
    let columns = table.schema().columns.len();
    view_data.selected_row = view_data.selected_row.min(rows.saturating_sub(1));
    view_data.selected_col = view_data.selected_col.min(columns.saturating_sub(1));
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
