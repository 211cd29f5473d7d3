// Keyboard event handling
//
// This module contains the keyboard event handler that processes
// user input and updates the application state accordingly.

use super::AppState;
use crossterm::event::KeyCode;

/// Handle keyboard events and update application state
///
/// Returns `true` if the application should continue running,
/// `false` if it should exit.
///
/// # Arguments
/// * `app` - Mutable reference to the application state
/// * `key` - The key code that was pressed
///
/// # Key Bindings
/// - `q`, `Q`, `Esc` - Quit the application
/// - `Tab` - Switch focus between red and blue team
/// - `Up` / `Down` - Move the cursor within the focused team
/// - `Space` - Toggle source (red) or choose target (blue)
/// - `Enter` - Launch the attack
/// - `s`, `S` - Stop the running attack
/// - `y`, `Y` - Cycle attack type
/// - `v`, `V` - Switch between 2D and isometric layout
/// - `+`, `=` - More packets per second
/// - `-`, `_` - Fewer packets per second
/// - `]` - Faster frames (shorter interval)
/// - `[` - Slower frames (longer interval)
/// - `l`, `L` - Toggle node labels
/// - `i`, `I` - Toggle IP spoofing
/// - `r`, `R` - Reset packet counters
pub fn handle_key_event(app: &mut AppState, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
            app.running = false;
            false
        }
        KeyCode::Tab => {
            app.toggle_focus();
            true
        }
        KeyCode::Up => {
            app.cursor_up();
            true
        }
        KeyCode::Down => {
            app.cursor_down();
            true
        }
        KeyCode::Char(' ') => {
            app.toggle_cursor_node();
            true
        }
        KeyCode::Enter => {
            app.launch();
            true
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            app.stop();
            true
        }
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.cycle_attack_type();
            true
        }
        KeyCode::Char('v') | KeyCode::Char('V') => {
            app.toggle_renderer();
            true
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.render.faster();
            true
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            app.render.slower();
            true
        }
        KeyCode::Char(']') => {
            app.refresh_config.speed_up();
            true
        }
        KeyCode::Char('[') => {
            app.refresh_config.slow_down();
            true
        }
        KeyCode::Char('l') | KeyCode::Char('L') => {
            app.render.labels_enabled = !app.render.labels_enabled;
            true
        }
        KeyCode::Char('i') | KeyCode::Char('I') => {
            app.toggle_spoofing();
            true
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            app.reset_counters();
            true
        }
        _ => true,
    }
}
