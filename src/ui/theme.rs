use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub warning: Color,   // Yellow
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,
    pub reserved: Color, // OS prefix in the memory map
    pub free: Color,
    pub process_palette: [Color; 6], // Cycled by process id
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),
    secondary: Color::Rgb(250, 179, 135),
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    warning: Color::Rgb(249, 226, 175),
    border_focused: Color::Rgb(249, 226, 175), // Yellow border for focus
    border_normal: Color::Rgb(108, 112, 134),
    current_line_bg: Color::Rgb(50, 50, 70),
    reserved: Color::Rgb(88, 91, 112),
    free: Color::Rgb(69, 71, 90),
    process_palette: [
        Color::Rgb(137, 180, 250),
        Color::Rgb(166, 227, 161),
        Color::Rgb(250, 179, 135),
        Color::Rgb(245, 194, 231),
        Color::Rgb(148, 226, 213),
        Color::Rgb(203, 166, 247),
    ],
};

/// Color used for a process, stable across redraws
pub fn process_color(id: u32) -> Color {
    let palette = &DEFAULT_THEME.process_palette;
    palette[id as usize % palette.len()]
}
