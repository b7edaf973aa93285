use crate::client::AppSnapshot;
use color_eyre::eyre::{
    Result,
    eyre,
};
use crossterm::{
    event::{
        self,
        Event,
        KeyCode,
        KeyEvent,
        KeyEventKind,
        KeyModifiers,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use ratatui::{
    prelude::*,
    widgets::*,
};
use spin_wheel::render::{
    ConfettiWidget,
    WheelWidget,
};
use std::{
    io::stdout,
    thread,
};
use tokio::sync::mpsc;

pub type InputEventReceiver = mpsc::UnboundedReceiver<std::io::Result<Event>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserEvent {
    Quit,
    Spin,
    ToggleRemoveWinner,
    ResetWheel,
    ClearOptions,
    SampleOptions,
    OpenEditor,
    OptionsEdited(String),
    Redraw,
}

#[derive(Debug, Default)]
pub struct UiState {
    mode: Mode,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    EditModal(EditState),
    QuitModal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct EditState {
    text: String,
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit(state: &mut UiState) -> Result<()> {
    if let Some(mut terminal) = state.terminal.take() {
        terminal.show_cursor()?;
    }
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

/// Terminal height in rows, used to size the confetti viewport.
pub fn viewport_rows(state: &UiState) -> Option<u16> {
    state
        .terminal
        .as_ref()
        .and_then(|t| t.size().ok())
        .map(|size| size.height)
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    if let Some(mut term) = state.terminal.take() {
        let res = term.draw(|f| ui(f, state, snap)).map(|_| ());
        state.terminal = Some(term);
        res?;
    }
    Ok(())
}

/// Reads terminal input on a dedicated thread; crossterm's `read` blocks.
pub fn input_event_stream() -> InputEventReceiver {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        loop {
            let ev = event::read();
            let failed = ev.is_err();
            if tx.send(ev).is_err() || failed {
                break;
            }
        }
    });
    rx
}

pub async fn next_raw_event(input_events: &mut InputEventReceiver) -> Result<Event> {
    match input_events.recv().await {
        Some(ev) => Ok(ev?),
        None => Err(eyre!("input reader stopped")),
    }
}

pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    match event {
        Event::Resize(_, _) => Some(UserEvent::Redraw),
        Event::Key(k) if k.kind == KeyEventKind::Press => interpret_key(state, k),
        _ => None,
    }
}

/// Opens the option editor seeded with the current input text.
pub fn open_editor(state: &mut UiState, text: &str) {
    state.mode = Mode::EditModal(EditState {
        text: text.to_string(),
    });
}

pub fn is_editing(state: &UiState) -> bool {
    matches!(state.mode, Mode::EditModal(_))
}

fn interpret_key(state: &mut UiState, k: KeyEvent) -> Option<UserEvent> {
    if k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c') {
        return Some(UserEvent::Quit);
    }
    match &mut state.mode {
        Mode::EditModal(es) => {
            match k.code {
                KeyCode::Esc => {
                    state.mode = Mode::Normal;
                    return Some(UserEvent::Redraw);
                }
                KeyCode::Enter => es.text.push('\n'),
                KeyCode::Backspace => {
                    es.text.pop();
                }
                KeyCode::Char('u') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                    es.text.clear();
                }
                KeyCode::Char(c) => es.text.push(c),
                _ => return None,
            }
            return Some(UserEvent::OptionsEdited(es.text.clone()));
        }
        Mode::QuitModal => {
            return match k.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                _ => None,
            };
        }
        Mode::Normal => {}
    }
    match k.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.mode = Mode::QuitModal;
            Some(UserEvent::Redraw)
        }
        KeyCode::Char(' ') | KeyCode::Enter => Some(UserEvent::Spin),
        KeyCode::Char('r') => Some(UserEvent::ToggleRemoveWinner),
        KeyCode::Char('x') => Some(UserEvent::ResetWheel),
        KeyCode::Char('c') => Some(UserEvent::ClearOptions),
        KeyCode::Char('s') => Some(UserEvent::SampleOptions),
        KeyCode::Char('e') => Some(UserEvent::OpenEditor),
        _ => None,
    }
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // title + status
            Constraint::Min(12),   // wheel + side panels
            Constraint::Length(3), // help
        ])
        .split(f.area());

    draw_top(f, chunks[0], snap);
    draw_middle(f, chunks[1], snap);
    draw_bottom(f, chunks[2], state);
    draw_modals(f, state);

    if snap.confetti.is_running() {
        f.render_widget(
            ConfettiWidget {
                particles: snap.confetti.particles(),
                viewport_height: snap.confetti.viewport_height(),
            },
            f.area(),
        );
    }
}

fn draw_top(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let title = Line::from(vec![
        Span::styled(
            "Spin The Wheel",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {} options", snap.options.len())),
    ]);
    let status_style = match (snap.winner, snap.is_spinning) {
        (_, true) => Style::default().fg(Color::Yellow),
        (Some(_), false) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        _ => Style::default(),
    };
    let status = if snap.status.trim().is_empty() {
        Line::from("Ready")
    } else {
        Line::styled(snap.status.to_string(), status_style)
    };
    let p = Paragraph::new(vec![title, status])
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(p, area);
}

fn draw_middle(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    let block = Block::default().borders(Borders::ALL).title("Wheel");
    let inner = block.inner(cols[0]);
    f.render_widget(block, cols[0]);
    f.render_widget(
        WheelWidget {
            options: snap.options,
            rotation: snap.rotation,
            winner_index: snap.winner_index,
            highlight_winner: snap.winner.is_some() && !snap.is_spinning,
            removal: snap.removal,
        },
        inner,
    );

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(cols[1]);
    draw_options_panel(f, side[0], snap);
    draw_recent_panel(f, side[1], snap);
    draw_settings_panel(f, side[2], snap);
}

fn draw_options_panel(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let mut lines = Vec::new();
    if snap.options.is_empty() {
        lines.push(Line::styled("None", Style::default().fg(Color::DarkGray)));
    }
    for (idx, option) in snap.options.iter().enumerate() {
        let text = format!("{:>2}. {}", idx + 1, option);
        let removing = snap.removal.is_some_and(|(r, _, _)| r == idx);
        let style = if removing {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT)
        } else if snap.winner_index == Some(idx) && !snap.is_spinning {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::styled(text, style));
    }
    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Options"));
    f.render_widget(p, area);
}

fn draw_recent_panel(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let mut lines = Vec::new();
    if snap.recent_winners.is_empty() {
        lines.push(Line::styled("None", Style::default().fg(Color::DarkGray)));
    }
    for record in snap.recent_winners.iter() {
        lines.push(Line::from(format!(
            "{} {}",
            record.at.format("%H:%M:%S"),
            record.name
        )));
    }
    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Recent Winners"));
    f.render_widget(p, area);
}

fn draw_settings_panel(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let mark = if snap.remove_winner { "[x]" } else { "[ ]" };
    let p = Paragraph::new(format!("{mark} Remove winner after spin"))
        .block(Block::default().borders(Borders::ALL).title("Settings"));
    f.render_widget(p, area);
}

fn draw_bottom(f: &mut Frame, area: Rect, state: &UiState) {
    let text = if is_editing(state) {
        "type to edit | Enter new line | Backspace delete | Ctrl+U clear | Esc done"
    } else {
        "space spin | e edit | s sample | c clear | r remove winner | x reset | q/Esc quit"
    };
    let help = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState) {
    match &state.mode {
        Mode::EditModal(es) => {
            let area = centered_rect(60, 50, f.area());
            let block = Block::default()
                .borders(Borders::ALL)
                .title("Edit Options (Enter=new line, Esc=done, Ctrl+U=clear)");
            let mut text = es.text.clone();
            text.push('▏');
            let p = Paragraph::new(text).wrap(Wrap { trim: false });
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::QuitModal => {
            let area = centered_rect(40, 20, f.area());
            let block = Block::default().borders(Borders::ALL).title("Confirm Quit");
            let p = Paragraph::new("Quit? (Y/N)");
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::Normal => {}
    }
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1]);

    horizontal[1]
}
