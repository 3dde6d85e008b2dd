use ratatui::prelude::*;
use ratatui::widgets::*;

use super::stage::Stage;

fn centered(area: Rect, w: u16, h: u16) -> Rect {
    let w = w.min(area.width.saturating_sub(4));
    let h = h.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    Rect::new(x, y, w, h)
}

fn key_hint(key: &'static str, action: &'static str) -> Vec<Span<'static>> {
    vec![
        Span::styled(key, Style::default().fg(Color::Rgb(80, 200, 255)).add_modifier(Modifier::BOLD)),
        Span::styled(action, Style::default().fg(Color::Rgb(100, 100, 130))),
    ]
}

pub fn render_start(frame: &mut Frame, area: Rect) {
    let overlay = centered(area, 40, 9);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(255, 220, 80)))
        .title(" 💩 Dung Dodge ")
        .title_style(Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Dodge the falling dung!", Style::default().fg(Color::Rgb(180, 180, 200)))),
        Line::from(""),
        Line::from(key_hint("← →", " move")),
        Line::from(""),
        Line::from(key_hint("Enter", " start")),
    ];
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    frame.render_widget(p, inner);
}

pub fn render_game_over(frame: &mut Frame, area: Rect, stage: &Stage) {
    let overlay = centered(area, 36, 9);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(220, 60, 60)))
        .style(Style::default().bg(Color::Rgb(25, 10, 10)));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "GAME OVER",
            Style::default().fg(Color::Rgb(255, 80, 80)).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Score: {}", stage.score_text),
            Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if stage.show_restart {
        let mut hint = key_hint("Enter", " restart  ");
        hint.extend(key_hint("q", " quit"));
        lines.push(Line::from(hint));
    }
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Rgb(25, 10, 10)));
    frame.render_widget(p, inner);
}
