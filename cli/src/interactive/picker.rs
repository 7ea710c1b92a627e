//! Terminal picker widget
//!
//! Full-screen list on the alternate screen of stderr, so stdout stays free
//! for the chosen path. Keys are read on a background task and turned into
//! [`WidgetEvent`]s; the controller drives items and the busy marker.

use super::text_utils::{tail_to_width, text_width, truncate_to_width};
use colored::Colorize;
use crossterm::cursor::{MoveTo, Show};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use futures::StreamExt;
use quickopen_core::{Candidate, PickerWidget, WidgetEvent, WidgetEvents};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const PROMPT: &str = "> ";
const BUSY_MARKER: &str = " searching…";
/// Rows above the list: prompt and item count
const HEADER_ROWS: u16 = 2;

/// What a key press did to the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Ignored,
    Redraw,
    Emit(WidgetEvent),
}

/// Everything drawn on screen
#[derive(Debug, Default)]
pub struct PickerView {
    placeholder: String,
    query: String,
    items: Vec<Candidate>,
    selected: usize,
    busy: bool,
}

impl PickerView {
    #[cfg(test)]
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> Option<&Candidate> {
        self.items.get(self.selected)
    }

    fn set_items(&mut self, items: Vec<Candidate>) {
        self.items = items;
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    /// Apply one key press
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Esc => KeyAction::Emit(WidgetEvent::Hidden),
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => KeyAction::Emit(WidgetEvent::Hidden),
            KeyCode::Char('p') if ctrl => self.move_up(),
            KeyCode::Char('n') if ctrl => self.move_down(),
            KeyCode::Char('u') if ctrl => {
                if self.query.is_empty() {
                    KeyAction::Ignored
                } else {
                    self.query.clear();
                    self.query_changed()
                }
            }
            KeyCode::Char(_) if ctrl || alt => KeyAction::Ignored,
            KeyCode::Char(c) => {
                self.query.push(c);
                self.query_changed()
            }
            KeyCode::Backspace => match self.query.pop() {
                Some(_) => self.query_changed(),
                None => KeyAction::Ignored,
            },
            KeyCode::Up | KeyCode::BackTab => self.move_up(),
            KeyCode::Down | KeyCode::Tab => self.move_down(),
            KeyCode::Enter => match self.selected() {
                Some(item) => KeyAction::Emit(WidgetEvent::SelectionChanged(vec![item.clone()])),
                None => KeyAction::Ignored,
            },
            _ => KeyAction::Ignored,
        }
    }

    fn query_changed(&mut self) -> KeyAction {
        self.selected = 0;
        KeyAction::Emit(WidgetEvent::ValueChanged(self.query.clone()))
    }

    fn move_up(&mut self) -> KeyAction {
        if self.selected == 0 {
            return KeyAction::Ignored;
        }
        self.selected -= 1;
        KeyAction::Redraw
    }

    fn move_down(&mut self) -> KeyAction {
        if self.selected + 1 >= self.items.len() {
            return KeyAction::Ignored;
        }
        self.selected += 1;
        KeyAction::Redraw
    }

    /// Draw the whole view into `out`
    pub fn render(&self, out: &mut impl Write, cols: u16, rows: u16) -> io::Result<()> {
        let width = cols as usize;
        queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;

        // Prompt line
        let status = if self.busy { BUSY_MARKER } else { "" };
        let room = width.saturating_sub(text_width(PROMPT) + text_width(status));
        let shown_query = tail_to_width(&self.query, room);
        queue!(out, Print(PROMPT))?;
        if self.query.is_empty() {
            let placeholder = truncate_to_width(&self.placeholder, room);
            queue!(out, Print(placeholder.dimmed()))?;
        } else {
            queue!(out, Print(shown_query))?;
        }
        queue!(out, Print(status.yellow()))?;

        // Count line
        let count = match self.items.len() {
            1 => "1 item".to_string(),
            n => format!("{} items", n),
        };
        queue!(out, MoveTo(0, 1), Print(truncate_to_width(&count, width).dimmed()))?;

        // List, scrolled so the selection stays visible
        let visible = rows.saturating_sub(HEADER_ROWS) as usize;
        let start = (self.selected + 1).saturating_sub(visible);
        for (row, (index, item)) in self.items.iter().enumerate().skip(start).take(visible).enumerate() {
            queue!(out, MoveTo(0, HEADER_ROWS + row as u16))?;
            self.render_item(out, item, index == self.selected, width)?;
        }

        let cursor = text_width(PROMPT) + text_width(shown_query);
        queue!(out, MoveTo(cursor.min(width) as u16, 0), Show)?;
        Ok(())
    }

    fn render_item(
        &self,
        out: &mut impl Write,
        item: &Candidate,
        selected: bool,
        width: usize,
    ) -> io::Result<()> {
        let label = truncate_to_width(&item.label(), width);
        let secondary = match item.description() {
            d if !d.is_empty() => d,
            _ => item.detail().unwrap_or_default(),
        };
        let room = width.saturating_sub(text_width(&label) + 2);
        let secondary = truncate_to_width(&secondary, room);

        if selected {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        let label = match item {
            Candidate::File(_) => label.bold(),
            Candidate::Notice(_) => label.red(),
            Candidate::Create(_) => label.green(),
        };
        queue!(out, Print(label))?;
        if !secondary.is_empty() {
            queue!(out, Print("  "), Print(secondary.dimmed()))?;
        }
        if selected {
            queue!(out, SetAttribute(Attribute::Reset))?;
        }
        Ok(())
    }
}

fn lock(view: &Mutex<PickerView>) -> MutexGuard<'_, PickerView> {
    view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn draw(view: &PickerView) -> io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut stderr = io::stderr().lock();
    view.render(&mut stderr, cols, rows)?;
    stderr.flush()
}

fn redraw(view: &PickerView) {
    if let Err(e) = draw(view) {
        warn!("Failed to draw picker: {}", e);
    }
}

fn enter_terminal() -> io::Result<()> {
    terminal::enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen)
}

fn leave_terminal() -> io::Result<()> {
    execute!(io::stderr(), Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()
}

/// Picker widget drawn with crossterm
pub struct TerminalPicker {
    view: Arc<Mutex<PickerView>>,
    events: mpsc::UnboundedSender<WidgetEvent>,
    input_task: Option<JoinHandle<()>>,
    active: bool,
}

impl TerminalPicker {
    pub fn new() -> (Self, WidgetEvents) {
        let (events, receiver) = mpsc::unbounded_channel();
        let picker = Self {
            view: Arc::new(Mutex::new(PickerView::default())),
            events,
            input_task: None,
            active: false,
        };
        (picker, receiver)
    }

    fn update<R>(&self, f: impl FnOnce(&mut PickerView) -> R) -> R {
        let mut view = lock(&self.view);
        let result = f(&mut view);
        if self.active {
            redraw(&view);
        }
        result
    }

    fn spawn_input(&self) -> JoinHandle<()> {
        let view = self.view.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let mut stream = EventStream::new();
            while let Some(event) = stream.next().await {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("Terminal input failed: {}", e);
                        break;
                    }
                };

                let action = match event {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        let mut view = lock(&view);
                        let action = view.handle_key(key);
                        if action != KeyAction::Ignored {
                            redraw(&view);
                        }
                        action
                    }
                    Event::Resize(..) => {
                        redraw(&lock(&view));
                        KeyAction::Ignored
                    }
                    _ => KeyAction::Ignored,
                };

                if let KeyAction::Emit(event) = action {
                    if events.send(event).is_err() {
                        return;
                    }
                }
            }

            // Input is gone; nobody can pick anything anymore
            let _ = events.send(WidgetEvent::Hidden);
        })
    }
}

impl PickerWidget for TerminalPicker {
    fn set_placeholder(&mut self, text: &str) {
        self.update(|view| view.placeholder = text.to_string());
    }

    fn items(&self) -> Vec<Candidate> {
        lock(&self.view).items.clone()
    }

    fn set_items(&mut self, items: Vec<Candidate>) {
        self.update(|view| view.set_items(items));
    }

    fn is_busy(&self) -> bool {
        lock(&self.view).busy
    }

    fn set_busy(&mut self, busy: bool) {
        self.update(|view| view.busy = busy);
    }

    fn show(&mut self) {
        if self.active {
            return;
        }
        if let Err(e) = enter_terminal() {
            warn!("Cannot take over the terminal: {}", e);
            let _ = terminal::disable_raw_mode();
            let _ = self.events.send(WidgetEvent::Hidden);
            return;
        }

        debug!("picker shown");
        self.active = true;
        redraw(&lock(&self.view));
        self.input_task = Some(self.spawn_input());
    }

    fn hide(&mut self) {
        if let Some(task) = self.input_task.take() {
            task.abort();
        }
        if !self.active {
            return;
        }

        self.active = false;
        if let Err(e) = leave_terminal() {
            warn!("Failed to restore the terminal: {}", e);
        }
        debug!("picker hidden");
    }

    fn dispose(&mut self) {
        self.hide();
        lock(&self.view).items.clear();
    }
}

impl Drop for TerminalPicker {
    fn drop(&mut self) {
        self.hide();
    }
}
