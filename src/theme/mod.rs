// Theme module - Color constants and theme re-exports
//
// This module provides the color palette and helper functions for the
// strikemap UI: a dark range-console look with red team and blue team
// accents and one color per packet protocol.

pub mod default;

use ratatui::style::Color;

// Core palette

/// Primary accent color - used for borders, titles, attack paths
/// RGB: (187, 154, 247)
pub const NEON_PURPLE: Color = Color::Rgb(187, 154, 247);

/// Warning indicator - used for warning log lines, degraded states
/// RGB: (255, 158, 100)
pub const PUMPKIN_ORANGE: Color = Color::Rgb(255, 158, 100);

/// Danger indicator - used for error log lines, offline API badge
/// RGB: (247, 118, 142)
pub const BLOOD_RED: Color = Color::Rgb(247, 118, 142);

/// Active/healthy indicator - used for online states, ICMP packets
/// RGB: (158, 206, 106)
pub const TOXIC_GREEN: Color = Color::Rgb(158, 206, 106);

/// Neutral text - used for general text, idle target nodes
/// RGB: (169, 177, 214)
pub const BONE_WHITE: Color = Color::Rgb(169, 177, 214);

/// Dimmed text - used for offline nodes, addresses, timestamps
/// RGB: (86, 95, 137)
pub const ASH_GRAY: Color = Color::Rgb(86, 95, 137);

/// Blue team accent - used for the selected target
/// RGB: (96, 165, 250)
pub const ICE_BLUE: Color = Color::Rgb(96, 165, 250);

// Packet protocol colors

/// TCP SYN packets, also the selected source highlight
/// RGB: (239, 68, 68)
pub const SIGNAL_RED: Color = Color::Rgb(239, 68, 68);

/// UDP packets
/// RGB: (249, 115, 22)
pub const FLARE_ORANGE: Color = Color::Rgb(249, 115, 22);

/// HTTP packets
/// RGB: (234, 179, 8)
pub const AMBER_YELLOW: Color = Color::Rgb(234, 179, 8);

// Re-export theme functions for convenient access
pub use default::*;
