//! Full-screen terminal display of the chart

use std::io;
use std::panic;
use std::sync::Once;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use super::{BarChartModel, RateBarChart};
use crate::error::{CurrencyError, Result};

static PANIC_HOOK: Once = Once::new();

/// Installs, once per process, a panic hook that restores the terminal
/// before printing the panic message.
fn setup_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));
    });
}

/// Draws one frame and returns how far the bars can scroll
fn draw(frame: &mut Frame, model: &BarChartModel, offset: usize) -> usize {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let block = Block::default().borders(Borders::ALL).title(model.x_label.as_str());
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);

    let mut max_offset = 0;
    if model.is_empty() {
        let empty = Paragraph::new("No rates to display")
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
    } else {
        let chart = RateBarChart::new(&model.bars)
            .title(&model.title)
            .y_label(&model.y_label)
            .offset(offset);
        max_offset = chart.max_offset(inner);
        frame.render_widget(chart, inner);
    }

    let hint = if max_offset > 0 {
        "←/→ scroll, any other key to close"
    } else {
        "Press any key to close"
    };
    let hint = Paragraph::new(hint)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, chunks[1]);

    max_offset
}

/// Shows the chart full-screen until a key is pressed
///
/// Left/Right (and Home/End) scroll through bars that do not fit the screen.
pub fn show(model: &BarChartModel) -> Result<()> {
    setup_panic_hook();

    enable_raw_mode().map_err(CurrencyError::Terminal)?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(CurrencyError::Terminal(e));
    }
    let backend = CrosstermBackend::new(stdout);

    let result = Terminal::new(backend).and_then(|mut terminal| {
        let outcome = event_loop(&mut terminal, model);
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        outcome
    });

    disable_raw_mode().map_err(CurrencyError::Terminal)?;
    result.map_err(CurrencyError::Terminal)
}

/// New scroll offset after `key`, or `None` when the key closes the chart
fn scroll(key: KeyCode, offset: usize, max_offset: usize) -> Option<usize> {
    if max_offset == 0 {
        return None;
    }
    match key {
        KeyCode::Left => Some(offset.saturating_sub(1)),
        KeyCode::Right => Some((offset + 1).min(max_offset)),
        KeyCode::Home => Some(0),
        KeyCode::End => Some(max_offset),
        _ => None,
    }
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, model: &BarChartModel) -> io::Result<()> {
    let mut offset = 0;
    loop {
        let mut max_offset = 0;
        terminal.draw(|f| max_offset = draw(f, model, offset))?;
        offset = offset.min(max_offset);

        // Redraw on resize, close on the first key that does not scroll
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match scroll(key.code, offset, max_offset) {
                    Some(next) => offset = next,
                    None => return Ok(()),
                }
            }
        }
    }
}
