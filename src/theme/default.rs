// Default theme functions
//
// Status text and colors for attacks, log lines and the frame interval
// indicator.

use ratatui::style::Color;

use super::{ASH_GRAY, BLOOD_RED, BONE_WHITE, NEON_PURPLE, PUMPKIN_ORANGE, SIGNAL_RED, TOXIC_GREEN};
use crate::model::{AttackStatus, LogLevel};

/// Get the status indicator text for an attack status
///
/// # Arguments
/// * `status` - Attack status, None when nothing was launched yet
///
/// # Returns
/// A static string for the banner and stats panel
pub fn get_attack_status_text(status: Option<AttackStatus>) -> &'static str {
    match status {
        None => "Standby",
        Some(AttackStatus::Queued) => "Queued",
        Some(AttackStatus::Running) => "Attacking",
        Some(AttackStatus::Completed) => "Completed",
        Some(AttackStatus::Failed) => "Failed",
        Some(AttackStatus::Stopped) => "Stopped",
    }
}

/// Get the indicator color for an attack status
pub fn get_attack_status_color(status: Option<AttackStatus>) -> Color {
    match status {
        None => ASH_GRAY,
        Some(AttackStatus::Queued) => NEON_PURPLE,
        Some(AttackStatus::Running) => SIGNAL_RED,
        Some(AttackStatus::Completed) => TOXIC_GREEN,
        Some(AttackStatus::Failed) => BLOOD_RED,
        Some(AttackStatus::Stopped) => PUMPKIN_ORANGE,
    }
}

/// Get the color of a log line by severity
pub fn get_log_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Info => BONE_WHITE,
        LogLevel::Success => TOXIC_GREEN,
        LogLevel::Warning => PUMPKIN_ORANGE,
        LogLevel::Error => BLOOD_RED,
    }
}

/// Interpolate between two RGB colors based on a ratio (0.0 ~ 1.0)
///
/// # Arguments
/// * `color1` - Starting color as (r, g, b) tuple
/// * `color2` - Ending color as (r, g, b) tuple
/// * `ratio` - Interpolation ratio (0.0 = color1, 1.0 = color2)
///
/// # Returns
/// Interpolated Color::Rgb value
pub fn interpolate_color(color1: (u8, u8, u8), color2: (u8, u8, u8), ratio: f32) -> Color {
    let ratio = ratio.clamp(0.0, 1.0);
    let r = (color1.0 as f32 + (color2.0 as f32 - color1.0 as f32) * ratio) as u8;
    let g = (color1.1 as f32 + (color2.1 as f32 - color1.1 as f32) * ratio) as u8;
    let b = (color1.2 as f32 + (color2.2 as f32 - color1.2 as f32) * ratio) as u8;
    Color::Rgb(r, g, b)
}

/// Get color for the frame interval based on its value relative to default
///
/// Color coding:
/// - Green (TOXIC_GREEN): default or slower
/// - Orange (PUMPKIN_ORANGE): faster than default
/// - Red (BLOOD_RED): more than twice as fast as default
///
/// If recently_changed is true, returns a brighter version of the color
///
/// # Arguments
/// * `interval_ms` - Current frame interval in milliseconds
/// * `default_ms` - Default frame interval in milliseconds
/// * `recently_changed` - Whether the value was recently changed (triggers highlight)
pub fn get_refresh_color(interval_ms: u64, default_ms: u64, recently_changed: bool) -> Color {
    let base_color = if interval_ms >= default_ms {
        TOXIC_GREEN
    } else {
        let ratio = (default_ms - interval_ms) as f32 / default_ms as f32;
        if ratio > 0.5 {
            BLOOD_RED
        } else {
            PUMPKIN_ORANGE
        }
    };

    if !recently_changed {
        return base_color;
    }

    match base_color {
        Color::Rgb(r, g, b) => {
            // Increase brightness by 20%
            let r = ((r as f32 * 1.2).min(255.0)) as u8;
            let g = ((g as f32 * 1.2).min(255.0)) as u8;
            let b = ((b as f32 * 1.2).min(255.0)) as u8;
            Color::Rgb(r, g, b)
        }
        _ => base_color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_attack_status_text() {
        assert_eq!(get_attack_status_text(None), "Standby");
        assert_eq!(get_attack_status_text(Some(AttackStatus::Running)), "Attacking");
        assert_eq!(get_attack_status_color(Some(AttackStatus::Running)), SIGNAL_RED);
    }

    #[test]
    fn test_log_colors() {
        assert_eq!(get_log_color(LogLevel::Error), BLOOD_RED);
        assert_eq!(get_log_color(LogLevel::Success), TOXIC_GREEN);
    }

    #[test]
    fn test_refresh_color_thresholds() {
        assert_eq!(get_refresh_color(33, 33, false), TOXIC_GREEN);
        assert_eq!(get_refresh_color(100, 33, false), TOXIC_GREEN);
        assert_eq!(get_refresh_color(25, 33, false), PUMPKIN_ORANGE);
        assert_eq!(get_refresh_color(10, 33, false), BLOOD_RED);
        assert_ne!(get_refresh_color(33, 33, true), TOXIC_GREEN);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Interpolated channels stay between the two endpoints
        #[test]
        fn prop_interpolate_color_within_bounds(
            a in any::<(u8, u8, u8)>(),
            b in any::<(u8, u8, u8)>(),
            ratio in -1.0f32..2.0,
        ) {
            let Color::Rgb(r, g, bl) = interpolate_color(a, b, ratio) else {
                return Err(TestCaseError::fail("expected an RGB color"));
            };
            prop_assert!(r >= a.0.min(b.0) && r <= a.0.max(b.0));
            prop_assert!(g >= a.1.min(b.1) && g <= a.1.max(b.1));
            prop_assert!(bl >= a.2.min(b.2) && bl <= a.2.max(b.2));
        }
    }
}
