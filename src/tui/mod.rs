//! Headless terminal UI (TUI) wizard.
//!
//! - Centered "setup window" frame titled "Stream Viewer Setup"
//! - Left banner panel with ASCII logo
//! - Main content panel with classic wizard pages (no stepper)
//! - Bottom button row: [ Back ] [ Next ] [ Cancel ]
//! - Modal confirmations and error dialogs
//!
//! Note: Logging is file-only in TUI mode (stdout logging is disabled) to
//! avoid corrupting the terminal UI.

use crate::catalog::{CatalogClient, HttpCatalogClient};
use crate::wizard::endpoint::{endpoint_display, EndpointProbe, HttpEndpointProbe};
use crate::wizard::{
    AdvanceToken, Stage, StageInput, StagePatch, StreamSelection, WizardController, WizardError,
    WizardState,
};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::info;
use ratatui::backend::{CrosstermBackend, TestBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use url::Url;

const ASCII_LOGO: &str = r#"
 ____  _
/ ___|| |_ _ __ ___  __ _ _ __ ___
\___ \| __| '__/ _ \/ _` | '_ ` _ \
 ___) | |_| | |  __/ (_| | | | | | |
|____/ \__|_|  \___|\__,_|_| |_| |_|
        V I E W E R   S E T U P
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Welcome,
    Servers,
    Applications,
    Versions,
    Profiles,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonFocus {
    Back,
    Next,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Modal {
    ConfirmCancel,
    Message { title: String, body: String },
}

/// Presentation preference for the downstream viewer: the built-in viewer
/// UI, or a bare stream surface for arbitrary applications. Not a wizard
/// stage; it rides along with the final handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Viewer,
    Plain,
}

impl UiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UiMode::Viewer => "viewer",
            UiMode::Plain => "plain",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            UiMode::Viewer => "Built-in viewer UI (recommended)",
            UiMode::Plain => "Bare stream surface (any application)",
        }
    }

    fn toggle(&self) -> Self {
        match self {
            UiMode::Viewer => UiMode::Plain,
            UiMode::Plain => UiMode::Viewer,
        }
    }
}

#[derive(Debug, Clone)]
struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    fn new(value: impl Into<String>) -> Self {
        let v = value.into();
        Self {
            cursor: v.len(),
            value: v,
        }
    }

    fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) => {
                self.value.insert(self.cursor, c);
                self.cursor = (self.cursor + 1).min(self.value.len());
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 && !self.value.is_empty() {
                    let idx = self.cursor - 1;
                    self.value.remove(idx);
                    self.cursor = idx;
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.value.len() && !self.value.is_empty() {
                    self.value.remove(self.cursor);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.value.len());
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.value.len();
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusTarget {
    Field(usize),
    Button(ButtonFocus),
}

#[derive(Debug)]
enum UiMsg {
    AdvanceComplete {
        token: AdvanceToken,
        outcome: Result<StagePatch, WizardError>,
    },
}

/// Seed values for the wizard's editable fields.
#[derive(Debug, Clone, Default)]
pub struct UiDefaults {
    pub app_server: String,
    pub stream_server: String,
    pub plain_ui: bool,
}

struct UiState {
    controller: WizardController,
    page: Page,
    ui_mode: UiMode,
    app_server: TextInput,
    stream_server: TextInput,
    list_index: usize,
    focus: FocusTarget,
    modal: Option<Modal>,
    status: String,
    quit: bool,
    selection: Option<StreamSelection>,
}

impl UiState {
    fn new(controller: WizardController, defaults: UiDefaults) -> Self {
        Self {
            controller,
            page: Page::Welcome,
            ui_mode: if defaults.plain_ui {
                UiMode::Plain
            } else {
                UiMode::Viewer
            },
            app_server: TextInput::new(defaults.app_server),
            stream_server: TextInput::new(defaults.stream_server),
            list_index: 0,
            focus: FocusTarget::Button(ButtonFocus::Next),
            modal: None,
            status: String::new(),
            quit: false,
            selection: None,
        }
    }

    fn advancing(&self) -> bool {
        self.controller.is_pending()
    }

    /// Options listed by the current page, rendered as label rows.
    fn list_labels(&self) -> Vec<String> {
        let state = self.controller.state();
        match self.page {
            Page::Applications => state
                .applications
                .iter()
                .map(|a| format!("{} ({})", a.name, a.id))
                .collect(),
            Page::Versions => state.available_versions.clone(),
            Page::Profiles => state.available_profiles.clone(),
            _ => Vec::new(),
        }
    }

    /// Identifier of the highlighted list entry, if the page has a list.
    fn list_choice(&self) -> Option<String> {
        let state = self.controller.state();
        match self.page {
            Page::Applications => state
                .applications
                .get(self.list_index)
                .map(|a| a.id.clone()),
            Page::Versions => state.available_versions.get(self.list_index).cloned(),
            Page::Profiles => state.available_profiles.get(self.list_index).cloned(),
            _ => None,
        }
    }
}

fn page_for(stage: Stage) -> Page {
    match stage {
        Stage::ServerEndpoints => Page::Servers,
        Stage::ApplicationSelect => Page::Applications,
        Stage::VersionSelect => Page::Versions,
        Stage::ProfileSelect => Page::Profiles,
        Stage::Done => Page::Complete,
    }
}

fn page_title(page: Page) -> &'static str {
    match page {
        Page::Welcome => "Welcome to Stream Viewer Setup",
        Page::Servers => "Server Information",
        Page::Applications => "Select Application",
        Page::Versions => "Select Version",
        Page::Profiles => "Select Profile",
        Page::Complete => "Ready to Stream",
    }
}

fn next_label(page: Page) -> &'static str {
    match page {
        Page::Profiles => "Start",
        Page::Complete => "Finish",
        _ => "Next",
    }
}

fn can_go_back(page: Page) -> bool {
    !matches!(page, Page::Welcome | Page::Complete)
}

fn can_go_next(state: &UiState) -> bool {
    if state.advancing() {
        return false;
    }
    match state.page {
        Page::Welcome | Page::Complete => true,
        Page::Servers => {
            !state.app_server.value.trim().is_empty()
                && !state.stream_server.value.trim().is_empty()
        }
        Page::Applications | Page::Versions | Page::Profiles => !state.list_labels().is_empty(),
    }
}

fn page_field_count(page: Page) -> usize {
    match page {
        Page::Servers => 2,
        _ => 0,
    }
}

fn focused_text_input_mut(state: &mut UiState) -> Option<&mut TextInput> {
    let FocusTarget::Field(idx) = state.focus else {
        return None;
    };
    match (state.page, idx) {
        (Page::Servers, 0) => Some(&mut state.app_server),
        (Page::Servers, 1) => Some(&mut state.stream_server),
        _ => None,
    }
}

fn cycle_focus(state: &mut UiState, backwards: bool) {
    let fields = page_field_count(state.page);
    // Order: fields, Next, Back (when available), Cancel.
    let mut order: Vec<FocusTarget> = (0..fields).map(FocusTarget::Field).collect();
    order.push(FocusTarget::Button(ButtonFocus::Next));
    if can_go_back(state.page) {
        order.push(FocusTarget::Button(ButtonFocus::Back));
    }
    order.push(FocusTarget::Button(ButtonFocus::Cancel));

    let current = order
        .iter()
        .position(|t| *t == state.focus)
        .unwrap_or(order.len() - 1);
    let next = if backwards {
        (current + order.len() - 1) % order.len()
    } else {
        (current + 1) % order.len()
    };
    state.focus = order[next];
}

/// Sync editable drafts when a stage is (re)entered. Committed values
/// pre-fill the form; uncommitted edits from a previous visit are gone.
fn enter_page(state: &mut UiState, page: Page) {
    state.page = page;
    state.list_index = 0;
    state.focus = FocusTarget::Button(ButtonFocus::Next);
    state.status.clear();

    let committed = state.controller.state();
    match page {
        Page::Servers => {
            if let Some(url) = &committed.server_endpoint {
                state.app_server.set(endpoint_display(url));
            }
            if let Some(url) = &committed.stream_endpoint {
                state.stream_server.set(endpoint_display(url));
            }
            state.focus = FocusTarget::Field(0);
        }
        Page::Applications => {
            if let Some(id) = &committed.selected_application_id {
                if let Some(pos) = committed.applications.iter().position(|a| &a.id == id) {
                    state.list_index = pos;
                }
            }
        }
        Page::Versions => {
            if let Some(v) = &committed.selected_version {
                if let Some(pos) = committed.available_versions.iter().position(|x| x == v) {
                    state.list_index = pos;
                }
            }
        }
        Page::Profiles => {
            if let Some(p) = &committed.selected_profile {
                if let Some(pos) = committed.available_profiles.iter().position(|x| x == p) {
                    state.list_index = pos;
                }
            }
        }
        Page::Welcome | Page::Complete => {}
    }
}

fn start_advance(state: &mut UiState, tx: &mpsc::Sender<UiMsg>) {
    let input = match state.page {
        Page::Servers => StageInput::ServerEndpoints {
            app_server: state.app_server.value.clone(),
            stream_server: state.stream_server.value.clone(),
        },
        Page::Applications => StageInput::ApplicationSelect {
            application_id: state.list_choice(),
        },
        Page::Versions => StageInput::VersionSelect {
            version: state.list_choice(),
        },
        Page::Profiles => StageInput::ProfileSelect {
            profile: state.list_choice(),
        },
        Page::Welcome | Page::Complete => return,
    };

    match state.controller.begin_advance(input) {
        Ok((token, work)) => {
            state.status = "Contacting server...".to_string();
            let tx = tx.clone();
            thread::spawn(move || {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build();
                let outcome = match rt {
                    Ok(rt) => rt.block_on(work.run()),
                    Err(e) => Err(WizardError::Internal(format!(
                        "failed to start worker runtime: {}",
                        e
                    ))),
                };
                let _ = tx.send(UiMsg::AdvanceComplete { token, outcome });
            });
        }
        Err(e) => {
            state.modal = Some(Modal::Message {
                title: "Cannot continue".to_string(),
                body: e.to_string(),
            });
        }
    }
}

fn go_next(state: &mut UiState, tx: &mpsc::Sender<UiMsg>) {
    if !can_go_next(state) {
        return;
    }
    match state.page {
        Page::Welcome => enter_page(state, Page::Servers),
        Page::Complete => state.quit = true,
        _ => start_advance(state, tx),
    }
}

fn go_back(state: &mut UiState) {
    if state.advancing() || !can_go_back(state.page) {
        return;
    }
    match state.page {
        Page::Servers => enter_page(state, Page::Welcome),
        Page::Applications | Page::Versions | Page::Profiles => {
            // Back never refetches; the options for the previous stage are
            // still committed.
            if let Ok(stage) = state.controller.retreat() {
                enter_page(state, page_for(stage));
            }
        }
        Page::Welcome | Page::Complete => {}
    }
}

fn drain_messages(state: &mut UiState, rx: &mpsc::Receiver<UiMsg>) {
    while let Ok(msg) = rx.try_recv() {
        match msg {
            UiMsg::AdvanceComplete { token, outcome } => {
                // Stale completions (cancelled or superseded) are discarded
                // by the controller; nothing to render for them.
                let Some(result) = state.controller.complete_advance(token, outcome) else {
                    continue;
                };
                state.status.clear();
                match result {
                    Ok(Stage::Done) => {
                        state.selection = state.controller.selection();
                        if let Some(selection) = &state.selection {
                            info!(
                                "[PHASE: tui] [STEP: handoff] Resolved stream selection: app={} version={} profile={} ui_mode={}",
                                selection.application_id,
                                selection.version,
                                selection.profile,
                                state.ui_mode.as_str()
                            );
                        }
                        enter_page(state, Page::Complete);
                    }
                    Ok(stage) => enter_page(state, page_for(stage)),
                    Err(e) => {
                        state.modal = Some(Modal::Message {
                            title: "Unable to continue".to_string(),
                            body: e.to_string(),
                        });
                    }
                }
            }
        }
    }
}

fn handle_key(state: &mut UiState, code: KeyCode, tx: &mpsc::Sender<UiMsg>) {
    // Modal handling
    if let Some(modal) = state.modal.clone() {
        match modal {
            Modal::ConfirmCancel => match code {
                KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                    let next = match state.focus {
                        FocusTarget::Button(ButtonFocus::Cancel) => {
                            FocusTarget::Button(ButtonFocus::Next)
                        }
                        _ => FocusTarget::Button(ButtonFocus::Cancel),
                    };
                    state.focus = next;
                }
                KeyCode::Enter => {
                    let confirm = state.focus == FocusTarget::Button(ButtonFocus::Cancel);
                    state.modal = None;
                    if confirm {
                        // Discard any in-flight fetch; it must not commit
                        // after we are gone.
                        state.controller.cancel_pending();
                        state.quit = true;
                    }
                }
                KeyCode::Esc => {
                    state.modal = None;
                }
                _ => {}
            },
            Modal::Message { .. } => match code {
                KeyCode::Enter | KeyCode::Esc => {
                    state.modal = None;
                }
                _ => {}
            },
        }
        return;
    }

    // Global cancel
    if matches!(code, KeyCode::Esc) && state.page != Page::Complete {
        state.modal = Some(Modal::ConfirmCancel);
        state.focus = FocusTarget::Button(ButtonFocus::Next); // "No"
        return;
    }

    // While a fetch is pending, navigation stays locked (Esc above is the
    // only way out).
    if state.advancing() {
        return;
    }

    // Text input handling (when a field is focused)
    if focused_text_input_mut(state).is_some() {
        match code {
            KeyCode::Enter => {
                go_next(state, tx);
                return;
            }
            KeyCode::Tab | KeyCode::Down => {
                cycle_focus(state, false);
                return;
            }
            KeyCode::BackTab | KeyCode::Up => {
                cycle_focus(state, true);
                return;
            }
            _ => {
                if let Some(input) = focused_text_input_mut(state) {
                    if input.handle_key(code) {
                        return;
                    }
                }
            }
        }
    }

    match code {
        KeyCode::Tab => cycle_focus(state, false),
        KeyCode::BackTab => cycle_focus(state, true),
        KeyCode::Up | KeyCode::Down if state.page == Page::Welcome => {
            state.ui_mode = state.ui_mode.toggle();
        }
        KeyCode::Up => {
            state.list_index = state.list_index.saturating_sub(1);
        }
        KeyCode::Down => {
            let len = state.list_labels().len();
            if len > 0 {
                state.list_index = (state.list_index + 1).min(len - 1);
            }
        }
        KeyCode::Left | KeyCode::Right if matches!(state.focus, FocusTarget::Button(_)) => {
            cycle_focus(state, matches!(code, KeyCode::Left));
        }
        KeyCode::Enter => match state.focus {
            FocusTarget::Button(ButtonFocus::Back) => go_back(state),
            FocusTarget::Button(ButtonFocus::Cancel) => {
                state.modal = Some(Modal::ConfirmCancel);
                state.focus = FocusTarget::Button(ButtonFocus::Next);
            }
            _ => go_next(state, tx),
        },
        _ => {}
    }
}

// =============================================================================
// Rendering
// =============================================================================

fn centered_window(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame<'_>, state: &UiState) {
    let window_area = centered_window(area, 94, 28);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Stream Viewer Setup");
    f.render_widget(outer_block, window_area);

    let inner = window_area.inner(&ratatui::layout::Margin {
        vertical: 1,
        horizontal: 1,
    });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(inner);

    let body = rows[0];
    let buttons = rows[1];

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(0)].as_ref())
        .split(body);

    // Left banner
    let banner_block = Block::default().borders(Borders::ALL);
    let logo = Paragraph::new(ASCII_LOGO)
        .block(banner_block)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });
    f.render_widget(logo, cols[0]);

    // Right content
    let content_text = page_content(state);
    let content_block = Block::default()
        .borders(Borders::ALL)
        .title(page_title(state.page));
    let content = Paragraph::new(content_text)
        .block(content_block)
        .wrap(Wrap { trim: false });
    f.render_widget(content, cols[1]);

    draw_buttons(f, buttons, state);

    match &state.modal {
        Some(Modal::ConfirmCancel) => draw_cancel_modal(f, window_area, state),
        Some(Modal::Message { title, body }) => draw_message_modal(f, window_area, title, body),
        None => {}
    }
}

fn field_line(label: &str, input: &TextInput, focused: bool) -> Line<'static> {
    let prefix = if focused { ">" } else { " " };
    let style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(Span::styled(
        format!("{} {:<14} {}", prefix, label, input.value),
        style,
    ))
}

fn radio_line(label: &str, selected: bool, highlighted: bool) -> Line<'static> {
    let mark = if selected { "(x)" } else { "( )" };
    let style = if highlighted {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    Line::from(Span::styled(format!("{} {}", mark, label), style))
}

fn page_content(state: &UiState) -> Text<'static> {
    let mut lines: Vec<Line> = Vec::new();

    match state.page {
        Page::Welcome => {
            lines.push(Line::from(
                "This wizard configures the streaming viewer: server endpoints,",
            ));
            lines.push(Line::from(
                "application, version, and profile are resolved step by step.",
            ));
            lines.push(Line::from(""));
            lines.push(Line::from("Viewer interface:"));
            for mode in [UiMode::Viewer, UiMode::Plain] {
                lines.push(radio_line(mode.label(), state.ui_mode == mode, false));
            }
            lines.push(Line::from(""));
            lines.push(Line::from("Up/Down changes the selection, Enter continues."));
        }
        Page::Servers => {
            lines.push(Line::from(
                "Enter the configuration (app) server and the streaming server.",
            ));
            lines.push(Line::from(
                "Both are checked for reachability before continuing.",
            ));
            lines.push(Line::from(""));
            lines.push(field_line(
                "App Server",
                &state.app_server,
                state.focus == FocusTarget::Field(0),
            ));
            lines.push(field_line(
                "Stream Server",
                &state.stream_server,
                state.focus == FocusTarget::Field(1),
            ));
            lines.push(Line::from(""));
            lines.push(Line::from("Tab moves between fields and buttons."));
        }
        Page::Applications | Page::Versions | Page::Profiles => {
            let intro = match state.page {
                Page::Applications => "Select the application to stream:",
                Page::Versions => "Select the application version:",
                _ => "Select the streaming profile:",
            };
            lines.push(Line::from(intro));
            lines.push(Line::from(""));
            for (i, label) in state.list_labels().into_iter().enumerate() {
                lines.push(radio_line(&label, i == state.list_index, i == state.list_index));
            }
            lines.push(Line::from(""));
            lines.push(Line::from("Up/Down changes the selection."));
        }
        Page::Complete => {
            lines.push(Line::from("Setup is complete. Resolved selection:"));
            lines.push(Line::from(""));
            if let Some(s) = &state.selection {
                lines.push(Line::from(format!("  App Server:    {}", s.server_endpoint)));
                lines.push(Line::from(format!("  Stream Server: {}", s.stream_endpoint)));
                lines.push(Line::from(format!("  Application:   {}", s.application_id)));
                lines.push(Line::from(format!("  Version:       {}", s.version)));
                lines.push(Line::from(format!("  Profile:       {}", s.profile)));
                lines.push(Line::from(format!(
                    "  Interface:     {}",
                    state.ui_mode.as_str()
                )));
            }
            lines.push(Line::from(""));
            lines.push(Line::from("Finish hands the selection to the viewer."));
        }
    }

    if state.advancing() || !state.status.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            if state.status.is_empty() {
                "Working...".to_string()
            } else {
                state.status.clone()
            },
            Style::default().fg(Color::Yellow),
        )));
    }

    Text::from(lines)
}

fn button_text(label: &str, focused: bool, enabled: bool) -> Span<'static> {
    let mut style = Style::default();
    if !enabled {
        style = style.fg(Color::DarkGray);
    }
    if focused {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!("[ {} ]", label), style)
}

fn draw_buttons(f: &mut ratatui::Frame<'_>, area: Rect, state: &UiState) {
    let back_enabled = can_go_back(state.page) && !state.advancing();
    let next_enabled = can_go_next(state);

    let spans = vec![
        button_text(
            "Back",
            state.focus == FocusTarget::Button(ButtonFocus::Back),
            back_enabled,
        ),
        Span::raw("  "),
        button_text(
            next_label(state.page),
            state.focus == FocusTarget::Button(ButtonFocus::Next),
            next_enabled,
        ),
        Span::raw("  "),
        button_text(
            "Cancel",
            state.focus == FocusTarget::Button(ButtonFocus::Cancel),
            true,
        ),
    ];

    let row = Paragraph::new(Line::from(spans)).alignment(Alignment::Right);
    f.render_widget(row, area);
}

fn modal_area(window_area: Rect, width: u16, height: u16) -> Rect {
    centered_window(window_area, width, height)
}

fn draw_cancel_modal(f: &mut ratatui::Frame<'_>, window_area: Rect, state: &UiState) {
    let area = modal_area(window_area, 50, 7);
    f.render_widget(Clear, area);

    let yes_focused = state.focus == FocusTarget::Button(ButtonFocus::Cancel);
    let lines = vec![
        Line::from("Exit setup? The current selection is discarded."),
        Line::from(""),
        Line::from(vec![
            button_text("Yes, exit", yes_focused, true),
            Span::raw("  "),
            button_text("No", !yes_focused, true),
        ]),
    ];

    let block = Block::default().borders(Borders::ALL).title("Cancel Setup");
    let body = Paragraph::new(Text::from(lines))
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(body, area);
}

fn draw_message_modal(f: &mut ratatui::Frame<'_>, window_area: Rect, title: &str, body: &str) {
    let area = modal_area(window_area, 60, 8);
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(body.to_string()),
        Line::from(""),
        Line::from(button_text("OK", true, true)),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string());
    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

// =============================================================================
// Entry points
// =============================================================================

pub fn run(defaults: UiDefaults) -> Result<Option<(StreamSelection, UiMode)>> {
    info!("[PHASE: tui] [STEP: start] Starting setup wizard TUI");

    let catalog: Arc<dyn CatalogClient> = Arc::new(HttpCatalogClient::new());
    let probe: Arc<dyn EndpointProbe> = Arc::new(HttpEndpointProbe::new());
    let controller = WizardController::new(catalog, probe);

    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, controller, defaults);
    restore_terminal(&mut terminal)?;

    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    controller: WizardController,
    defaults: UiDefaults,
) -> Result<Option<(StreamSelection, UiMode)>> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut state = UiState::new(controller, defaults);
    let (tx, rx) = mpsc::channel::<UiMsg>();

    while !state.quit {
        drain_messages(&mut state, &rx);
        terminal.draw(|f| draw(f.size(), f, &state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => handle_key(&mut state, key.code, &tx),
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    Ok(state.selection.map(|s| (s, state.ui_mode)))
}

// =============================================================================
// Smoke mode — single-frame rendering for CI/tooling
// =============================================================================

fn sample_state() -> WizardState {
    WizardState {
        server_endpoint: Url::parse("http://gdn.example.com").ok(),
        stream_endpoint: Url::parse("http://stream.example.com").ok(),
        applications: vec![
            crate::catalog::Application {
                id: "usd-viewer".to_string(),
                name: "USD Viewer".to_string(),
                version: None,
                profile: None,
            },
            crate::catalog::Application {
                id: "usd-explorer".to_string(),
                name: "USD Explorer".to_string(),
                version: None,
                profile: None,
            },
        ],
        selected_application_id: Some("usd-viewer".to_string()),
        available_versions: vec!["106.1".to_string(), "105.0".to_string()],
        selected_version: Some("106.1".to_string()),
        available_profiles: vec!["default".to_string(), "tuned".to_string()],
        selected_profile: Some("default".to_string()),
    }
}

fn new_smoke_state(target: &str) -> UiState {
    let catalog: Arc<dyn CatalogClient> = Arc::new(HttpCatalogClient::new());
    let probe: Arc<dyn EndpointProbe> = Arc::new(HttpEndpointProbe::new());

    // Smoke-only: seeded state for deterministic page rendering in CI.
    let (stage, page) = match target {
        "servers" => (Stage::ServerEndpoints, Page::Servers),
        "apps" => (Stage::ApplicationSelect, Page::Applications),
        "versions" => (Stage::VersionSelect, Page::Versions),
        "profiles" => (Stage::ProfileSelect, Page::Profiles),
        "complete" => (Stage::Done, Page::Complete),
        _ => (Stage::ServerEndpoints, Page::Welcome),
    };

    let controller = WizardController::restore(catalog, probe, sample_state(), stage);
    let mut state = UiState::new(
        controller,
        UiDefaults {
            app_server: "gdn.example.com".to_string(),
            stream_server: "stream.example.com".to_string(),
            plain_ui: false,
        },
    );
    if page == Page::Complete {
        state.selection = state.controller.selection();
    }
    state.page = page;
    state
}

pub fn smoke(target: &str) -> Result<()> {
    info!(
        "[PHASE: tui] [STEP: smoke] Rendering single-frame TUI smoke target={}",
        target
    );

    let t = target.trim().to_ascii_lowercase();
    let state = new_smoke_state(t.as_str());

    // In-memory backend so this can run in CI/tooling without touching the
    // real terminal (no raw mode / alternate screen).
    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|f| draw(f.size(), f, &state))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProfileEntry;
    use crate::wizard::testing::{app, StubCatalog, StubProbe};

    fn test_state() -> UiState {
        let catalog: Arc<dyn CatalogClient> = Arc::new(StubCatalog::new(
            vec![app("a1", "App One"), app("a2", "App Two")],
            vec!["106.1".to_string()],
            vec![ProfileEntry {
                id: "default".to_string(),
            }],
        ));
        let probe: Arc<dyn EndpointProbe> = Arc::new(StubProbe::reachable());
        UiState::new(
            WizardController::new(catalog, probe),
            UiDefaults::default(),
        )
    }

    #[test]
    fn welcome_toggles_ui_mode_with_arrow_keys() {
        let (tx, _rx) = mpsc::channel();
        let mut state = test_state();
        assert_eq!(state.ui_mode, UiMode::Viewer);
        handle_key(&mut state, KeyCode::Down, &tx);
        assert_eq!(state.ui_mode, UiMode::Plain);
        handle_key(&mut state, KeyCode::Up, &tx);
        assert_eq!(state.ui_mode, UiMode::Viewer);
    }

    #[test]
    fn welcome_enter_moves_to_servers_without_touching_the_wizard() {
        let (tx, _rx) = mpsc::channel();
        let mut state = test_state();
        handle_key(&mut state, KeyCode::Enter, &tx);
        assert_eq!(state.page, Page::Servers);
        assert_eq!(state.controller.stage(), Stage::ServerEndpoints);
        assert_eq!(state.focus, FocusTarget::Field(0));
    }

    #[test]
    fn next_is_disabled_while_a_server_field_is_empty() {
        let mut state = test_state();
        enter_page(&mut state, Page::Servers);
        state.app_server.set("gdn.example.com");
        state.stream_server.set("");
        assert!(!can_go_next(&state));
        state.stream_server.set("stream.example.com");
        assert!(can_go_next(&state));
    }

    #[test]
    fn escape_opens_the_cancel_confirmation() {
        let (tx, _rx) = mpsc::channel();
        let mut state = test_state();
        handle_key(&mut state, KeyCode::Esc, &tx);
        assert_eq!(state.modal, Some(Modal::ConfirmCancel));
        // "No" keeps the wizard running.
        handle_key(&mut state, KeyCode::Enter, &tx);
        assert!(state.modal.is_none());
        assert!(!state.quit);
    }

    #[test]
    fn advance_completion_moves_to_the_applications_page() {
        let (tx, rx) = mpsc::channel();
        let mut state = test_state();
        enter_page(&mut state, Page::Servers);
        state.app_server.set("gdn.example.com");
        state.stream_server.set("stream.example.com");

        go_next(&mut state, &tx);
        assert!(state.advancing(), "worker claimed the pending slot");

        // Wait for the worker thread's completion message.
        let msg = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("completion message");
        let UiMsg::AdvanceComplete { token, outcome } = msg;
        let result = state
            .controller
            .complete_advance(token, outcome)
            .expect("token current");
        let stage = result.expect("advance succeeds");
        enter_page(&mut state, page_for(stage));

        assert_eq!(state.page, Page::Applications);
        assert_eq!(state.list_labels().len(), 2);
    }

    #[test]
    fn keys_are_ignored_while_an_advance_is_pending() {
        let (tx, _rx) = mpsc::channel();
        let mut state = test_state();
        enter_page(&mut state, Page::Servers);
        state.app_server.set("gdn.example.com");
        state.stream_server.set("stream.example.com");
        go_next(&mut state, &tx);
        assert!(state.advancing());

        let focus_before = state.focus;
        handle_key(&mut state, KeyCode::Tab, &tx);
        assert_eq!(state.focus, focus_before, "navigation locked while pending");
    }

    #[test]
    fn smoke_targets_render_a_frame() {
        for target in ["welcome", "servers", "apps", "versions", "profiles", "complete"] {
            let state = new_smoke_state(target);
            let backend = TestBackend::new(100, 30);
            let mut terminal = Terminal::new(backend).expect("terminal");
            terminal
                .draw(|f| draw(f.size(), f, &state))
                .unwrap_or_else(|e| panic!("draw {} failed: {}", target, e));
        }
    }

    #[test]
    fn page_titles_and_labels_follow_the_stage() {
        assert_eq!(page_for(Stage::ServerEndpoints), Page::Servers);
        assert_eq!(page_for(Stage::Done), Page::Complete);
        assert_eq!(next_label(Page::Profiles), "Start");
        assert_eq!(next_label(Page::Complete), "Finish");
        assert!(!can_go_back(Page::Welcome));
        assert!(can_go_back(Page::Applications));
    }
}
