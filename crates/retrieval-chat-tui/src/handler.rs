use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use retrieval_chat_core::{HitTarget, PointerEvent};
use crate::app::{point_in_rect, App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => app.scroll_to_bottom(),
        AppEvent::Tick => app.tick_animation(),
        AppEvent::QueryFinished { id, result } => app.on_query_finished(id, result),
        AppEvent::HistoryLoaded(result) => app.on_history_loaded(result),
    }
    app.follow_transcript();
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // History popup swallows keys until dismissed
    if app.history_popup.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            app.history_popup = None;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('i') | KeyCode::Enter | KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
        }

        // Window chrome
        KeyCode::Char('z') => app.window.toggle_zoom(),

        // Session actions
        KeyCode::Char('c') => {
            app.clear_chat();
        }
        KeyCode::Char('h') => app.request_history(),
        KeyCode::Char('t') => app.cycle_search_type(),

        // Transcript scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(app.chat_height / 2);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(app.chat_height / 2);
        }
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),
        KeyCode::Char('g') | KeyCode::Home => app.chat_scroll = 0,

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_input();
        }
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let target = app.hit_target(x, y);
            if target == HitTarget::TitleControl {
                press_title_control(app, x, y);
            }
            app.window.handle(PointerEvent::Down {
                x: x as i32,
                y: y as i32,
                target,
            });
        }
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
            app.window.handle(PointerEvent::Move {
                x: x as i32,
                y: y as i32,
            });
            if let Some(desktop) = app.desktop_area {
                app.keep_window_on_screen(desktop);
            }
        }
        MouseEventKind::Up(_) => {
            app.window.handle(PointerEvent::Up);
        }
        MouseEventKind::ScrollDown => {
            if app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false) {
                app.scroll_down(3);
            }
        }
        MouseEventKind::ScrollUp => {
            if app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false) {
                app.scroll_up(3);
            }
        }
        _ => {}
    }
}

fn press_title_control(app: &mut App, x: u16, y: u16) {
    let on = |area: Option<ratatui::layout::Rect>| area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    if on(app.zoom_button_area) {
        app.window.toggle_zoom();
    } else if on(app.clear_button_area) {
        app.clear_chat();
    }
}
