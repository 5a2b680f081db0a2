use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 0, g: 200, b: 120 };
pub const ACCENT: Color = Color::TrueColor { r: 255, g: 200, b: 0 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const OPEN: Color = Color::Green;
pub const CLOSED: Color = Color::Red;
pub const FILTERED: Color = Color::Yellow;
pub const DROPPED: Color = Color::BrightBlack;
pub const UNKNOWN: Color = Color::Magenta;
