use ratatui::style::Color;

/// Nope, errors
pub const ACCENT_PRIMARY: Color = Color::Rgb(239, 83, 80);
/// Like, success
pub const ACCENT_SECONDARY: Color = Color::Rgb(102, 187, 106);
/// Titles and focus
pub const ACCENT_HIGHLIGHT: Color = Color::Rgb(255, 167, 38);

pub const TEXT_PRIMARY: Color = Color::Rgb(236, 239, 241);
pub const TEXT_SECONDARY: Color = Color::Rgb(144, 164, 174);
pub const BORDER_COLOR: Color = Color::Rgb(84, 110, 122);
pub const BG_DARK: Color = Color::Rgb(30, 34, 40);
