pub mod field;
pub mod overlay;
pub mod stage;

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::game::session::GameState;

pub fn render(frame: &mut Frame, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(150, 95, 40)))
        .title(" 💩 Dung Dodge ")
        .title_style(
            Style::default()
                .fg(Color::Rgb(200, 140, 60))
                .add_modifier(Modifier::BOLD),
        );
    let inner = block.inner(frame.area());
    frame.render_widget(block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status bar
            Constraint::Min(4),    // Playfield
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let (state_label, state_color) = match app.session.state() {
        GameState::Idle => ("READY", Color::Rgb(120, 120, 140)),
        GameState::Running => ("RUNNING", Color::Green),
        GameState::GameOver => ("GAME OVER", Color::Red),
    };
    let status = Line::from(vec![
        Span::styled(
            format!(" Score: {} ", app.stage.score_text),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
        Span::styled(state_label, Style::default().fg(state_color)),
        Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("Obstacles: {}", app.stage.sprites.len()),
            Style::default().fg(Color::Cyan),
        ),
    ]);
    frame.render_widget(Paragraph::new(status), chunks[0]);

    let field_area = chunks[1];
    let lines = field::render_field(
        &app.stage,
        app.session.geometry(),
        app.session.now(),
        field_area.width as usize,
        field_area.height as usize,
    );
    frame.render_widget(Paragraph::new(lines), field_area);

    let help = Paragraph::new(Line::from(vec![
        Span::styled(" ←/→ Move ", Style::default().fg(Color::DarkGray)),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled("Enter Start ", Style::default().fg(Color::DarkGray)),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled("R Restart ", Style::default().fg(Color::DarkGray)),
        Span::styled("│ ", Style::default().fg(Color::Rgb(60, 60, 60))),
        Span::styled("Q Quit", Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(help, chunks[2]);

    if app.stage.show_start {
        overlay::render_start(frame, field_area);
    } else if app.stage.show_game_over {
        overlay::render_game_over(frame, field_area, &app.stage);
    }
}
