mod charts;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use healthcare_eda::{
    report::{DASHBOARD_TITLE, OVERVIEW_TOPICS, PROJECT_OVERVIEW},
    EdaCharts, Page, Report,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};
use std::io;

pub struct App {
    pub report: Report,
    pub current_page: Page,
    pub chart_index: usize,
    pub preview_state: TableState,
    pub should_quit: bool,
}

impl App {
    pub fn new(report: Report) -> Self {
        let mut preview_state = TableState::default();
        if !report.overview.preview.rows.is_empty() {
            preview_state.select(Some(0));
        }

        Self {
            report,
            current_page: Page::Overview,
            chart_index: 0,
            preview_state,
            should_quit: false,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn select_page(&mut self, page: Page) {
        if page != self.current_page {
            tracing::debug!("Switching to page {}", page.label());
        }
        self.current_page = page;
    }

    pub fn next_chart(&mut self) {
        self.chart_index = (self.chart_index + 1) % EdaCharts::TITLES.len();
    }

    pub fn previous_chart(&mut self) {
        let len = EdaCharts::TITLES.len();
        self.chart_index = (self.chart_index + len - 1) % len;
    }

    pub fn next_row(&mut self) {
        let len = self.report.overview.preview.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.preview_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.preview_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.report.overview.preview.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.preview_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.preview_state.select(Some(i));
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.previous_page();
                } else {
                    self.next_page();
                }
            }
            KeyCode::Char('1') => self.select_page(Page::Overview),
            KeyCode::Char('2') => self.select_page(Page::Eda),
            KeyCode::Char('3') => self.select_page(Page::Insights),
            // The sidebar is a radio list: moving the cursor changes the page
            KeyCode::Up | KeyCode::Char('k') => self.previous_page(),
            KeyCode::Down | KeyCode::Char('j') => self.next_page(),
            KeyCode::Right | KeyCode::Char('l') if self.current_page == Page::Eda => self.next_chart(),
            KeyCode::Left | KeyCode::Char('h') if self.current_page == Page::Eda => {
                self.previous_chart()
            }
            KeyCode::PageDown if self.current_page == Page::Overview => self.next_row(),
            KeyCode::PageUp if self.current_page == Page::Overview => self.previous_row(),
            _ => {}
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("UI loop failed: {:?}", err);
        return Err(err.into());
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.handle_key(key);
            if app.should_quit {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Sidebar + content
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)])
        .split(chunks[1]);

    render_sidebar(f, body[0], app);

    match app.current_page {
        Page::Overview => render_overview(f, body[1], app),
        Page::Eda => render_eda(f, body[1], app),
        Page::Insights => render_insights(f, body[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        format!(" {} ", DASHBOARD_TITLE),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw(" │ "));

    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.label(), style));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Records: {}", app.report.overview.total_records),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Navigation",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (i, page) in Page::ALL.iter().enumerate() {
        let selected = *page == app.current_page;
        let marker = if selected { "(•)" } else { "( )" };
        let style = if selected {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", i + 1), Style::default().fg(Color::Yellow)),
            Span::styled(format!("{} {}", marker, page.label()), style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  {}", app.report.source),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let sidebar = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", DASHBOARD_TITLE)),
        );

    f.render_widget(sidebar, area);
}

fn render_overview(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Project overview
            Constraint::Length(5),  // Metric tiles
            Constraint::Min(0),     // Preview table
        ])
        .split(area);

    let mut intro = vec![
        Line::from(Span::styled(
            Page::Overview.title(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(PROJECT_OVERVIEW),
    ];
    for topic in OVERVIEW_TOPICS {
        intro.push(Line::from(vec![
            Span::styled("  • ", Style::default().fg(Color::Yellow)),
            Span::raw(topic),
        ]));
    }

    let intro = Paragraph::new(intro).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Project Overview "),
    );
    f.render_widget(intro, chunks[0]);

    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[1]);

    for (tile, tile_area) in app.report.overview.metrics.iter().zip(tiles.iter()) {
        let content = vec![
            Line::from(Span::styled(tile.label.as_str(), Style::default().fg(Color::DarkGray))),
            Line::from(Span::styled(
                tile.value.as_str(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
        ];
        let widget = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        f.render_widget(widget, *tile_area);
    }

    render_preview(f, chunks[2], app);
}

fn render_preview(f: &mut Frame, area: Rect, app: &mut App) {
    let preview = &app.report.overview.preview;

    let header_cells = preview.headers.iter().map(|h| {
        Cell::from(truncate(h, 16)).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = preview.rows.iter().map(|row| {
        let cells = row.iter().map(|cell| Cell::from(truncate(cell, 16)));
        Row::new(cells).height(1)
    });

    let widths: Vec<Constraint> = preview
        .headers
        .iter()
        .map(|h| Constraint::Length(h.chars().count().clamp(6, 16) as u16))
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Preview of Dataset "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.preview_state);
}

fn render_eda(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let titles: Vec<String> = EdaCharts::TITLES
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {}", i + 1, short_title(t)))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.chart_index)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", Page::Eda.title())),
        )
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    let eda = &app.report.charts;
    match app.chart_index {
        0 => charts::render_histogram(f, chunks[1], &eda.age),
        1 => charts::render_pie(f, chunks[1], &eda.gender),
        2 => charts::render_bars(f, chunks[1], &eda.conditions),
        3 => charts::render_bars(f, chunks[1], &eda.admission_types),
        _ => charts::render_bars(f, chunks[1], &eda.billing_by_provider),
    }
}

fn render_insights(f: &mut Frame, area: Rect, app: &App) {
    let insights = &app.report.insights;

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Key Insights",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for finding in &insights.findings {
        content.push(Line::from(vec![
            Span::styled("  • ", Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{}: ", finding.heading),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(finding.detail.as_str()),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from("  ─────────────────────────────────────"));
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Conclusion",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    )));
    content.push(Line::from(""));
    content.push(Line::from(format!("  {}", insights.conclusion)));

    let paragraph = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" {} ", Page::Insights.title())),
    );

    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        format!(" {} ", app.current_page.label()),
        Style::default().fg(Color::Cyan),
    )];

    spans.push(Span::raw(" | "));
    spans.push(Span::styled("Tab/↑↓", Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(" Page | "));
    spans.push(Span::styled("1-3", Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(" Jump | "));
    match app.current_page {
        Page::Eda => {
            spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" Chart | "));
        }
        Page::Overview => {
            spans.push(Span::styled("PgUp/PgDn", Style::default().fg(Color::Yellow)));
            spans.push(Span::raw(" Row | "));
        }
        Page::Insights => {}
    }
    spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

/// Chart title without the "Distribution" suffix, for the tab strip
fn short_title(title: &str) -> &str {
    title
        .strip_suffix(" Distribution of Patients")
        .or_else(|| title.strip_suffix(" Distribution"))
        .unwrap_or(title)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthcare_eda::{Dataset, ReportOptions};
    use std::path::Path;

    const CSV: &str = "\
Name,Age,Gender,Medical Condition,Admission Type,Insurance Provider,Billing Amount
Ann Lee,34,Female,Asthma,Urgent,Cigna,1200.50
Bo Park,61,Male,Diabetes,Emergency,Aetna,3400.00
Cy Diaz,47,Male,Asthma,Elective,Cigna,800.25
";

    fn app() -> App {
        let dataset = Dataset::from_reader(CSV.as_bytes(), Path::new("test.csv")).unwrap();
        let report = Report::build(&dataset, &ReportOptions::default()).unwrap();
        App::new(report)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_starts_on_overview() {
        let app = app();
        assert_eq!(app.current_page, Page::Overview);
        assert_eq!(app.preview_state.selected(), Some(0));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_tab_cycles_pages() {
        let mut app = app();

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_page, Page::Eda);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_page, Page::Insights);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_page, Page::Overview);

        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.current_page, Page::Insights);

        app.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT));
        assert_eq!(app.current_page, Page::Eda);
    }

    #[test]
    fn test_number_keys_select_page() {
        let mut app = app();

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.current_page, Page::Insights);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.current_page, Page::Eda);
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.current_page, Page::Overview);
    }

    #[test]
    fn test_chart_keys_only_on_eda() {
        let mut app = app();

        press(&mut app, KeyCode::Right);
        assert_eq!(app.chart_index, 0);

        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Left);
        assert_eq!(app.chart_index, 4);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.chart_index, 1);
    }

    #[test]
    fn test_preview_rows_wrap() {
        let mut app = app();

        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.preview_state.selected(), Some(2));
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.preview_state.selected(), Some(0));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app2 = self::app();
        press(&mut app2, KeyCode::Esc);
        assert!(app2.should_quit);
    }

    #[test]
    fn test_short_title_and_truncate() {
        assert_eq!(short_title("Age Distribution of Patients"), "Age");
        assert_eq!(short_title("Gender Distribution"), "Gender");
        assert_eq!(
            short_title("Average Billing Amount by Insurance Provider"),
            "Average Billing Amount by Insurance Provider"
        );

        assert_eq!(truncate("Medical Condition", 10), "Medical...");
        assert_eq!(truncate("Age", 10), "Age");
    }
}
