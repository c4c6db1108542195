use std::sync::mpsc::{channel, Receiver};
use std::thread;
use std::time::Duration;

use color_eyre::Result;
use ratatui::{
    crossterm::event::{self, Event, KeyCode},
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph},
    DefaultTerminal, Frame,
};

use log::warn;
use rf_spectrum_wallpaper::{
    render::{render_text, DisplayMode, RenderConfig, Trace},
    run_sweep,
    sweep::Sweep,
    Params,
};

// Event type for our application
enum AppEvent {
    Key(KeyCode),
    NewSweep(Sweep),
    Quit,
}

// Visualization mode
enum VisualizationMode {
    Spectrum,
    Characters,
}

fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let params = Params::parse_checked();

    // Initialize the terminal
    let terminal = ratatui::init();

    // Create channel for events
    let (event_tx, event_rx) = channel();

    // Start the sweep thread
    let sweep_thread = {
        let sweep_tx = event_tx.clone();
        let mut source = params.sweep.source();
        let interval = params.wallpaper.interval();
        thread::spawn(move || loop {
            match run_sweep(source.as_mut()) {
                Ok(sw) => {
                    if sweep_tx.send(AppEvent::NewSweep(sw)).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("sweep failed: {}", e),
            }
            thread::sleep(interval);
        })
    };

    // Start the event handling thread
    let event_thread = {
        let event_tx = event_tx.clone();
        thread::spawn(move || loop {
            if let Ok(true) = event::poll(Duration::from_millis(100)) {
                if let Ok(Event::Key(key)) = event::read() {
                    if key.code == KeyCode::Char('q') {
                        let _ = event_tx.send(AppEvent::Quit);
                        break;
                    } else if event_tx.send(AppEvent::Key(key.code)).is_err() {
                        break;
                    }
                }
            }
        })
    };
    drop(event_tx);

    let app_result = App::new(event_rx, params.render.config()).run(terminal);

    ratatui::restore();

    // the sweep thread notices the closed channel after its next sweep
    let _ = event_thread.join();
    drop(sweep_thread);

    app_result
}

struct App {
    event_receiver: Receiver<AppEvent>,
    current_sweep: Option<Sweep>,
    config: RenderConfig,
    visualization_mode: VisualizationMode,
}

impl App {
    fn new(event_receiver: Receiver<AppEvent>, config: RenderConfig) -> Self {
        Self {
            event_receiver,
            current_sweep: None,
            config,
            visualization_mode: VisualizationMode::Spectrum,
        }
    }

    fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        terminal.draw(|frame| self.draw(frame))?;

        loop {
            match self.event_receiver.recv() {
                Ok(AppEvent::Key(key)) => match key {
                    KeyCode::Char('r') => {
                        self.current_sweep = None;
                    }
                    KeyCode::Char('m') => {
                        self.visualization_mode = match self.visualization_mode {
                            VisualizationMode::Spectrum => VisualizationMode::Characters,
                            VisualizationMode::Characters => VisualizationMode::Spectrum,
                        };
                    }
                    KeyCode::Char('g') => {
                        self.config.mode = match self.config.mode {
                            DisplayMode::Bars => DisplayMode::Glyphs,
                            DisplayMode::Glyphs => DisplayMode::Bars,
                        };
                    }
                    _ => continue,
                },
                Ok(AppEvent::NewSweep(sweep)) => {
                    self.current_sweep = Some(sweep);
                }
                Ok(AppEvent::Quit) | Err(_) => return Ok(()),
            }
            terminal.draw(|frame| self.draw(frame))?;
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::vertical([
            Constraint::Length(4), // Title and info
            Constraint::Fill(1),   // Plot
        ])
        .split(frame.area());

        frame.render_widget(
            Block::bordered().title(
                Line::from("RF Spectrum Wallpaper")
                    .blue()
                    .bold()
                    .centered(),
            ),
            chunks[0],
        );

        let info_text = match &self.current_sweep {
            Some(sweep) => format!(
                "{:.1} - {:.1} MHz, {} points, min: {:.1} dB, max: {:.1} dB",
                sweep.hz_low as f64 / 1e6,
                sweep.hz_high as f64 / 1e6,
                sweep.samples.len(),
                sweep.min_db(),
                sweep.max_db(),
            ),
            None => "Waiting for spectrum data...".to_string(),
        };
        let mode_text = match (&self.visualization_mode, self.config.mode) {
            (VisualizationMode::Spectrum, _) => "Mode: Spectrum",
            (VisualizationMode::Characters, DisplayMode::Bars) => "Mode: Characters (bars)",
            (VisualizationMode::Characters, DisplayMode::Glyphs) => "Mode: Characters (glyphs)",
        };

        let inner = |line: u16| {
            Rect::new(
                chunks[0].x + 2,
                chunks[0].y + line,
                chunks[0].width.saturating_sub(4),
                1,
            )
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(
                    info_text,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" [q] Quit", Style::default().fg(Color::Gray)),
                Span::styled(" [r] Reset", Style::default().fg(Color::Gray)),
                Span::styled(" [m] Mode", Style::default().fg(Color::Gray)),
                Span::styled(" [g] Glyphs", Style::default().fg(Color::Gray)),
            ])),
            inner(1),
        );
        frame.render_widget(
            Paragraph::new(Span::styled(mode_text, Style::default().fg(Color::Green))),
            inner(2),
        );

        let Some(sweep) = &self.current_sweep else {
            return;
        };
        match self.visualization_mode {
            VisualizationMode::Spectrum => self.render_spectrum_chart(frame, chunks[1], sweep),
            VisualizationMode::Characters => self.render_characters(frame, chunks[1], sweep),
        }
    }

    fn render_spectrum_chart(&self, frame: &mut Frame, area: Rect, sweep: &Sweep) {
        // braille packs two dots per cell horizontally
        let columns = (area.width.saturating_sub(2) as u32 * 2).max(1);
        let Ok(trace) = Trace::compute(&sweep.samples, columns, &self.config) else {
            return;
        };

        let freq_at = |x: usize| {
            let t = if columns > 1 {
                x as f64 / (columns - 1) as f64
            } else {
                0.5
            };
            (trace.freq_low + (trace.freq_high - trace.freq_low) * t) / 1e6
        };
        let points: Vec<(f64, f64)> = trace
            .power
            .iter()
            .enumerate()
            .map(|(x, db)| (freq_at(x), *db as f64))
            .collect();
        let peaks: Vec<(f64, f64)> = trace.peaks.iter().map(|&x| points[x]).collect();

        let min_freq = trace.freq_low / 1e6;
        let max_freq = trace.freq_high / 1e6;
        let mid_freq = (min_freq + max_freq) / 2.0;
        let min_db = trace.range.min as f64;
        let max_db = trace.range.max as f64;
        let mid_db = (min_db + max_db) / 2.0;

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let x_labels = vec![
            Span::styled(format!("{:.1}", min_freq), bold),
            Span::raw(format!("{:.1}", mid_freq)),
            Span::styled(format!("{:.1}", max_freq), bold),
        ];
        let y_labels = vec![
            Span::styled(format!("{:.1}", min_db), bold),
            Span::raw(format!("{:.1}", mid_db)),
            Span::styled(format!("{:.1}", max_db), bold),
        ];

        let datasets = vec![
            Dataset::default()
                .name("Spectrum")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Green))
                .data(&points),
            Dataset::default()
                .name("Peaks")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Red))
                .data(&peaks),
        ];

        let chart = Chart::new(datasets)
            .block(Block::bordered())
            .x_axis(
                Axis::default()
                    .title("Frequency (MHz)")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([min_freq, max_freq])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title("Power (dB)")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([min_db, max_db])
                    .labels(y_labels),
            );

        frame.render_widget(chart, area);
    }

    fn render_characters(&self, frame: &mut Frame, area: Rect, sweep: &Sweep) {
        let block = Block::bordered()
            .title("Characters")
            .title_alignment(ratatui::layout::Alignment::Center);
        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let text = match render_text(
            &sweep.samples,
            inner_area.width as u32,
            inner_area.height as u32,
            &self.config,
        ) {
            Ok(text) => text,
            Err(e) => e.to_string(),
        };
        frame.render_widget(
            Paragraph::new(text).style(Style::default().fg(Color::Green)),
            inner_area,
        );
    }
}
