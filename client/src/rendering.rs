use crate::game::{ClientGameState, ConnectionStatus};
use macroquad::prelude::*;
use shared::{Coord, Rgb, Snek};

/// Height reserved above the board for the status line.
pub const HUD_HEIGHT: f32 = 28.0;
const MESSAGE_FONT_SIZE: f32 = 16.0;
const LEADERBOARD_ROWS: usize = 5;

/// Maps grid cells onto screen pixels, keeping cells square
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub cell: f32,
    pub origin_x: f32,
    pub origin_y: f32,
}

impl BoardLayout {
    /// Largest square cell that fits the board below the HUD, centered horizontally.
    pub fn fit(screen_w: f32, screen_h: f32, grid_w: i32, grid_h: i32) -> Self {
        let grid_w = grid_w.max(1) as f32;
        let grid_h = grid_h.max(1) as f32;
        let available_h = (screen_h - HUD_HEIGHT).max(0.0);
        let cell = (screen_w / grid_w).min(available_h / grid_h).max(1.0);

        Self {
            cell,
            origin_x: ((screen_w - cell * grid_w) / 2.0).max(0.0),
            origin_y: HUD_HEIGHT,
        }
    }

    /// Top-left corner of a cell in screen space.
    pub fn cell_origin(&self, coord: Coord) -> (f32, f32) {
        (
            self.origin_x + coord.x as f32 * self.cell,
            self.origin_y + coord.y as f32 * self.cell,
        )
    }
}

pub fn to_color(rgb: Rgb) -> Color {
    Color::from_rgba(rgb.r, rgb.g, rgb.b, 255)
}

#[derive(Default)]
pub struct Renderer {
    frames: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn render(&mut self, state: &ClientGameState) {
        self.frames += 1;
        clear_background(Color::from_rgba(26, 26, 26, 255));

        if let Some(snapshot) = &state.snapshot {
            let layout =
                BoardLayout::fit(screen_width(), screen_height(), snapshot.width, snapshot.height);

            self.draw_board(&layout, snapshot.width, snapshot.height);
            for food in &snapshot.foods {
                self.draw_food(&layout, *food);
            }
            for snek in snapshot.sneks.values() {
                self.draw_snek(&layout, snek);
            }
            for snek in snapshot.sneks.values() {
                self.draw_message(&layout, snek);
            }
        }

        self.draw_hud(state);
        self.draw_leaderboard(state);
        self.draw_notice(&state.status);
    }

    fn draw_board(&mut self, layout: &BoardLayout, width: i32, height: i32) {
        draw_rectangle_lines(
            layout.origin_x,
            layout.origin_y,
            layout.cell * width as f32,
            layout.cell * height as f32,
            2.0,
            Color::from_rgba(68, 68, 68, 255),
        );
    }

    fn draw_food(&mut self, layout: &BoardLayout, food: Coord) {
        let (x, y) = layout.cell_origin(food);
        let radius = layout.cell / 2.0;
        draw_circle(x + radius, y + radius, radius * 0.8, GREEN);
    }

    fn draw_snek(&mut self, layout: &BoardLayout, snek: &Snek) {
        let body_color = to_color(snek.color.body);
        for segment in snek.body.iter().skip(1) {
            let (x, y) = layout.cell_origin(*segment);
            draw_rectangle(x, y, layout.cell, layout.cell, body_color);
        }

        if let Some(head) = snek.head() {
            let (x, y) = layout.cell_origin(head);
            draw_rectangle(x, y, layout.cell, layout.cell, to_color(snek.color.head));
            draw_rectangle_lines(x, y, layout.cell, layout.cell, 1.0, WHITE);
        }
    }

    fn draw_message(&mut self, layout: &BoardLayout, snek: &Snek) {
        let Some(head) = snek.head() else {
            return;
        };
        if snek.message.is_empty() {
            return;
        }

        let (x, y) = layout.cell_origin(head);
        let size = measure_text(&snek.message, None, MESSAGE_FONT_SIZE as u16, 1.0);
        let text_x = x + layout.cell / 2.0 - size.width / 2.0;
        let text_y = y - 4.0;

        draw_rectangle(
            text_x - 3.0,
            text_y - size.height - 2.0,
            size.width + 6.0,
            size.height + 6.0,
            Color::from_rgba(0, 0, 0, 180),
        );
        draw_text(&snek.message, text_x, text_y, MESSAGE_FONT_SIZE, WHITE);
    }

    fn draw_hud(&mut self, state: &ClientGameState) {
        let (label, color) = match &state.status {
            ConnectionStatus::Connecting => ("CONNECTING", YELLOW),
            ConnectionStatus::Playing => ("PLAYING", GREEN),
            ConnectionStatus::Dead(_) => ("DEAD", RED),
            ConnectionStatus::Disconnected(_) => ("OFFLINE", RED),
        };

        draw_rectangle(10.0, 10.0, 8.0, 8.0, color);
        draw_text(label, 24.0, 18.0, 16.0, WHITE);

        let counts = format!(
            "{} sneks  {} food",
            state.player_count(),
            state.food_count()
        );
        draw_text(&counts, 140.0, 18.0, 16.0, WHITE);
    }

    fn draw_leaderboard(&mut self, state: &ClientGameState) {
        let x = screen_width() - 150.0;
        for (row, snek) in state
            .leaderboard()
            .into_iter()
            .take(LEADERBOARD_ROWS)
            .enumerate()
        {
            let y = 18.0 + row as f32 * 14.0;
            draw_rectangle(x, y - 8.0, 8.0, 8.0, to_color(snek.color.head));
            draw_text(&snek.len().to_string(), x + 14.0, y, 14.0, WHITE);
        }
    }

    fn draw_notice(&mut self, status: &ConnectionStatus) {
        let notice = match status {
            ConnectionStatus::Dead(notice) | ConnectionStatus::Disconnected(notice) => notice,
            _ => return,
        };

        let size = measure_text(notice, None, 28, 1.0);
        let x = screen_width() / 2.0 - size.width / 2.0;
        let y = screen_height() / 2.0;
        draw_rectangle(
            x - 12.0,
            y - size.height - 12.0,
            size.width + 24.0,
            size.height + 24.0,
            Color::from_rgba(0, 0, 0, 200),
        );
        draw_text(notice, x, y, 28.0, RED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_layout_limited_by_width() {
        let layout = BoardLayout::fit(800.0, 600.0 + HUD_HEIGHT, 80, 40);
        assert_approx_eq!(layout.cell, 10.0);
        assert_approx_eq!(layout.origin_x, 0.0);
        assert_approx_eq!(layout.origin_y, HUD_HEIGHT);
    }

    #[test]
    fn test_layout_limited_by_height_is_centered() {
        let layout = BoardLayout::fit(1000.0, 400.0 + HUD_HEIGHT, 80, 40);
        assert_approx_eq!(layout.cell, 10.0);
        assert_approx_eq!(layout.origin_x, 100.0);
    }

    #[test]
    fn test_cell_origin() {
        let layout = BoardLayout::fit(800.0, 400.0 + HUD_HEIGHT, 80, 40);
        let (x, y) = layout.cell_origin(Coord::new(3, 2));
        assert_approx_eq!(x, 30.0);
        assert_approx_eq!(y, HUD_HEIGHT + 20.0);
    }

    #[test]
    fn test_layout_never_collapses() {
        let layout = BoardLayout::fit(10.0, 10.0, 80, 40);
        assert_approx_eq!(layout.cell, 1.0);

        let empty = BoardLayout::fit(800.0, 600.0, 0, 0);
        assert!(empty.cell >= 1.0);
    }

    #[test]
    fn test_to_color() {
        let color = to_color(Rgb { r: 255, g: 0, b: 51 });
        assert_approx_eq!(color.r, 1.0);
        assert_approx_eq!(color.g, 0.0);
        assert_approx_eq!(color.b, 0.2);
        assert_approx_eq!(color.a, 1.0);
    }
}
