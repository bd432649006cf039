use ratatui::{
    buffer::Buffer,
    layout::{ Alignment, Constraint, Direction, Layout, Rect },
    style::{ palette::tailwind, Color, Style },
    symbols,
    text::{ Span, Text },
    widgets::{
        block::Title,
        Axis,
        Block,
        Borders,
        Cell,
        Chart,
        Dataset,
        GraphType,
        Padding,
        Paragraph,
        Row,
        Table,
        Widget,
    },
    DefaultTerminal,
};
use crossterm::event::{ self, Event, KeyCode, KeyEventKind };
use std::time::Duration;
use color_eyre::Result;
use ratatui::prelude::Stylize;

use crate::state::StateNN;

const CUSTOM_LABEL_COLOR: Color = tailwind::SLATE.c200;

#[derive(Debug)]
pub struct App {
    pub state: AppState,
    pub state_nn: StateNN,
    pub plot: Plot,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    #[default]
    Running,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plot {
    /// Predicted against actual fatigue life, with the y = x diagonal.
    Parity,
    /// Training and validation loss per epoch.
    Loss,
}

impl Plot {
    pub fn title(self) -> &'static str {
        match self {
            Plot::Parity => "Actual vs Predicted Fatigue Life",
            Plot::Loss => "Training and Validation Loss",
        }
    }
}

impl App {
    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while self.state != AppState::Quitting {
            terminal.draw(|frame| frame.render_widget(&self, frame.area()))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn handle_events(&mut self) -> Result<()> {
        let timeout = Duration::from_secs_f32(1.0 / 20.0);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key.code);
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => self.quit(),
            _ => {}
        }
    }

    fn quit(&mut self) {
        self.state = AppState::Quitting;
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let body = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Max(1), Constraint::Fill(2), Constraint::Max(1)].as_ref())
            .split(area);

        let container = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(32)].as_ref())
            .split(body[1]);

        render_header(self.plot.title(), body[0], buf);
        render_footer(body[2], buf);

        match self.plot {
            Plot::Parity => self.render_parity(container[0], buf),
            Plot::Loss => self.render_loss(container[0], buf),
        }
        self.render_table_history(container[1], buf);
    }
}

fn render_header(title: &str, area: Rect, buf: &mut Buffer) {
    Paragraph::new(title.to_string())
        .bold()
        .alignment(Alignment::Left)
        .fg(CUSTOM_LABEL_COLOR)
        .render(area, buf);
}

fn render_footer(area: Rect, buf: &mut Buffer) {
    Paragraph::new("Press q, ESC or ENTER to close")
        .alignment(Alignment::Center)
        .fg(CUSTOM_LABEL_COLOR)
        .bold()
        .render(area, buf);
}

/// Smallest and largest value, padded by 5% so points don't sit on the frame.
pub fn axis_bounds(values: impl IntoIterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return [0.0, 1.0];
    }
    if lo == hi {
        return [lo - 1.0, hi + 1.0];
    }
    let pad = (hi - lo) * 0.05;
    [lo - pad, hi + pad]
}

fn axis_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|v| Span::raw(format_value(*v)))
        .collect()
}

fn format_value(v: f64) -> String {
    if v.abs() >= 1e4 { format!("{v:.2e}") } else { format!("{v:.2}") }
}

impl App {
    fn render_parity(&self, area: Rect, buf: &mut Buffer) {
        let points = &self.state_nn.parity;
        let bounds = axis_bounds(points.iter().flat_map(|&(a, p)| [a, p]));
        let diagonal = [
            (bounds[0], bounds[0]),
            (bounds[1], bounds[1]),
        ];

        let scatter_dataset = Dataset::default()
            .name("Predictions")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(Color::Cyan))
            .graph_type(GraphType::Scatter)
            .data(points);

        let diagonal_dataset = Dataset::default()
            .name("y = x")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(Color::Red))
            .graph_type(GraphType::Line)
            .data(&diagonal);

        Chart::new(vec![diagonal_dataset, scatter_dataset])
            .block(Block::default().borders(Borders::ALL).title("Parity"))
            .x_axis(
                Axis::default()
                    .title("Actual Fatigue Life")
                    .bounds(bounds)
                    .labels(axis_labels(bounds))
                    .style(Style::default().fg(Color::Gray))
            )
            .y_axis(
                Axis::default()
                    .title("Predicted Fatigue Life")
                    .bounds(bounds)
                    .labels(axis_labels(bounds))
                    .style(Style::default().fg(Color::Gray))
            )
            .render(area, buf);
    }

    fn render_loss(&self, area: Rect, buf: &mut Buffer) {
        let train = &self.state_nn.train_progress.loss;
        let val = &self.state_nn.val_progress.loss;

        let x_bounds = axis_bounds(train.iter().chain(val.iter()).map(|&(e, _)| e));
        let y_bounds = axis_bounds(
            train
                .iter()
                .chain(val.iter())
                .map(|&(_, l)| l)
                .chain(std::iter::once(0.0))
        );

        let train_dataset = Dataset::default()
            .name("Train Loss")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(Color::Green))
            .graph_type(GraphType::Line)
            .data(train);

        let val_dataset = Dataset::default()
            .name("Validation Loss")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(Color::Yellow))
            .graph_type(GraphType::Line)
            .data(val);

        Chart::new(vec![train_dataset, val_dataset])
            .block(Block::default().borders(Borders::ALL).title("Loss"))
            .x_axis(
                Axis::default()
                    .title("Epochs")
                    .bounds(x_bounds)
                    .labels(axis_labels(x_bounds))
                    .style(Style::default().fg(Color::Gray))
            )
            .y_axis(
                Axis::default()
                    .title("Loss (scaled)")
                    .bounds(y_bounds)
                    .labels(axis_labels(y_bounds))
                    .style(Style::default().fg(Color::Gray))
            )
            .render(area, buf);
    }

    fn render_table_history(&self, area: Rect, buf: &mut Buffer) {
        let header_style = Style::default();
        let title = title_block("Metrics");

        let rows = self.state_nn.history.iter().map(|(name, value)| {
            Row::new(vec![Cell::from(name.clone()), Cell::from(value.clone())]).height(1)
        });

        let header = Row::new(vec![Cell::from(Text::raw("Metric")), Cell::from(Text::raw("Value"))])
            .style(header_style)
            .height(1);

        Table::new(rows, [Constraint::Percentage(40), Constraint::Percentage(60)])
            .header(header)
            .block(title)
            .render(area, buf);
    }
}

fn title_block(title: &str) -> Block<'_> {
    let title = Title::from(title).alignment(Alignment::Center);
    Block::new()
        .padding(Padding::vertical(1))
        .title(title)
        .borders(Borders::ALL)
        .fg(CUSTOM_LABEL_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> StateNN {
        let mut state = StateNN::default()
            .with_parity(&[1e5, 2e5, 3e5], &[1.1e5, 1.9e5, 3.2e5])
            .with_losses(vec![(1.0, 0.9), (2.0, 0.5)], vec![(1.0, 1.0), (2.0, 0.6)]);
        state.push_metric("R2", "0.9500");
        state
    }

    fn render(plot: Plot) -> String {
        let app = App { state: AppState::default(), state_nn: state(), plot };
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);
        buf.content()
            .chunks(area.width as usize)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn parity_plot_shows_title_and_metrics() {
        let screen = render(Plot::Parity);
        assert!(screen.contains("Actual vs Predicted Fatigue Life"));
        assert!(screen.contains("Parity"));
        assert!(screen.contains("R2"));
        assert!(screen.contains("0.9500"));
    }

    #[test]
    fn loss_plot_shows_title() {
        let screen = render(Plot::Loss);
        assert!(screen.contains("Training and Validation Loss"));
        assert!(screen.contains("Epochs"));
        assert!(screen.contains("Loss (scaled)"));
    }

    fn assert_close(actual: [f64; 2], expected: [f64; 2]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn bounds_are_padded() {
        assert_close(axis_bounds([0.0, 10.0]), [-0.5, 10.5]);
        assert_close(axis_bounds([f64::NAN, 1.0, 2.0]), [0.95, 2.05]);
        assert_eq!(axis_bounds([3.0, 3.0]), [2.0, 4.0]);
        assert_eq!(axis_bounds(Vec::<f64>::new()), [0.0, 1.0]);
    }

    #[test]
    fn close_keys_quit() {
        for code in [KeyCode::Char('q'), KeyCode::Esc, KeyCode::Enter] {
            let mut app = App { state: AppState::default(), state_nn: state(), plot: Plot::Loss };
            app.handle_key(code);
            assert_eq!(app.state, AppState::Quitting);
        }
        let mut app = App { state: AppState::default(), state_nn: state(), plot: Plot::Loss };
        app.handle_key(KeyCode::Char('x'));
        assert_eq!(app.state, AppState::Running);
    }
}
