use ratatui::prelude::*;

use crate::game::Geometry;

use super::stage::Stage;

const OBSTACLE: (char, Color) = ('▓', Color::Rgb(150, 95, 40));
const OBSTACLE_FROZEN: (char, Color) = ('▒', Color::Rgb(110, 80, 55));
const PLAYER: (char, Color) = ('█', Color::Rgb(80, 200, 255));

/// World-to-cell mapping for a playfield of `width` x `height` cells.
struct Scale {
    sx: f64,
    sy: f64,
}

impl Scale {
    fn new(geometry: &Geometry, width: usize, height: usize) -> Self {
        Self {
            sx: width as f64 / geometry.screen_width,
            sy: height as f64 / geometry.screen_height,
        }
    }

    /// Cell span covered by `[start, start + len)` along one axis, at least one cell.
    fn span(start: f64, len: f64, scale: f64) -> (i64, i64) {
        let a = (start * scale).floor() as i64;
        let b = ((start + len) * scale).ceil() as i64;
        (a, b.max(a + 1))
    }
}

fn paint(grid: &mut [Vec<(char, Style)>], xs: (i64, i64), ys: (i64, i64), cell: (char, Style)) {
    for y in ys.0..ys.1 {
        let Some(row) = usize::try_from(y).ok().and_then(|y| grid.get_mut(y)) else {
            continue;
        };
        for x in xs.0..xs.1 {
            if let Some(slot) = usize::try_from(x).ok().and_then(|x| row.get_mut(x)) {
                *slot = cell;
            }
        }
    }
}

/// Rasterize the stage at time `now` into styled lines.
pub fn render_field(
    stage: &Stage,
    geometry: &Geometry,
    now: u64,
    width: usize,
    height: usize,
) -> Vec<Line<'static>> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let mut grid: Vec<Vec<(char, Style)>> = vec![vec![(' ', Style::default()); width]; height];
    let scale = Scale::new(geometry, width, height);

    // Faint floor texture so the field reads as a space.
    for (y, row) in grid.iter_mut().enumerate() {
        let shade = 14 + (y * 30 / height.max(1)) as u8;
        for (x, slot) in row.iter_mut().enumerate() {
            let ch = if (x + y) % 9 == 0 { '·' } else { ' ' };
            *slot = (ch, Style::default().fg(Color::Rgb(shade + 20, shade + 20, shade + 30)));
        }
    }

    for sprite in stage.sprites.values() {
        let (ch, color) = if sprite.frozen_at.is_some() { OBSTACLE_FROZEN } else { OBSTACLE };
        let xs = Scale::span(sprite.x, geometry.obstacle_width, scale.sx);
        let ys = Scale::span(sprite.top(now, geometry), geometry.obstacle_height, scale.sy);
        paint(&mut grid, xs, ys, (ch, Style::default().fg(color)));
    }

    let xs = Scale::span(stage.player_x, geometry.player_width, scale.sx);
    let ys = Scale::span(
        geometry.screen_height - geometry.player_height,
        geometry.player_height,
        scale.sy,
    );
    let (ch, color) = PLAYER;
    paint(
        &mut grid,
        xs,
        ys,
        (ch, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    );

    grid.into_iter()
        .map(|row| {
            let spans: Vec<Span<'static>> = row
                .into_iter()
                .map(|(ch, style)| Span::styled(String::from(ch), style))
                .collect();
            Line::from(spans)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::game::spawner::ObstacleId;
    use crate::game::Intent;

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn player_is_drawn_on_the_bottom_rows() {
        let geometry = Config::default().geometry();
        let mut stage = Stage::new();
        stage.apply(Intent::PlayerMoved(0.0));
        let rows = text(&render_field(&stage, &geometry, 0, 20, 12));
        assert_eq!(rows.len(), 12);
        assert!(rows[11].starts_with("██"));
        assert!(rows[10].starts_with("██"));
        assert!(!rows[9].contains('█'));
        assert!(!rows[0].contains('█'));
    }

    #[test]
    fn offscreen_obstacles_are_clipped() {
        let geometry = Config::default().geometry();
        let mut stage = Stage::new();
        stage.apply(Intent::ObstacleSpawned {
            id: ObstacleId::new_for_test(0),
            x: 975.0,
            spawned_at: 0,
            fall_ms: 3000,
        });
        // Just spawned: entirely above the field, nothing drawn.
        let rows = text(&render_field(&stage, &geometry, 0, 20, 12));
        assert!(rows.iter().all(|r| !r.contains('▓')));
        // Halfway down it is visible in the last column.
        let rows = text(&render_field(&stage, &geometry, 1500, 20, 12));
        assert!(rows.iter().any(|r| r.ends_with('▓')));
    }

    #[test]
    fn empty_area_renders_nothing() {
        let geometry = Config::default().geometry();
        assert!(render_field(&Stage::new(), &geometry, 0, 0, 10).is_empty());
    }
}
