use std::io;
use std::panic;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{BarChart, Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap};

use crate::core::{Criticality, Finding, Status, Zone};
use crate::store::Store;
use crate::view::DashboardFilter;

pub fn run(store: Store, color: bool) -> Result<()> {
    enable_raw_mode().context("no se pudo activar el modo raw")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("no se pudo abrir la pantalla alternativa")?;

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))
        .context("no se pudo inicializar la terminal")?;
    terminal.clear().ok();

    let res = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        run_app(&mut terminal, App::new(store.findings().to_vec(), color))
    }));

    let _ = terminal.show_cursor();
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);

    match res {
        Ok(res) => res,
        Err(_) => Err(anyhow::anyhow!(
            "error interno en la interfaz (la terminal fue restaurada)"
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Records,
    Stats,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Lda,
    Fc,
}

struct App {
    color: bool,
    findings: Vec<Finding>,

    screen: Screen,
    help_return_to: Screen,

    zone: Zone,
    pane: Pane,
    lda_state: ListState,
    fc_state: ListState,

    search: String,
    search_mode: bool,

    filter: DashboardFilter,
}

impl App {
    fn new(findings: Vec<Finding>, color: bool) -> Self {
        let mut app = Self {
            color,
            findings,
            screen: Screen::Records,
            help_return_to: Screen::Records,
            zone: Zone::Pope,
            pane: Pane::Lda,
            lda_state: ListState::default(),
            fc_state: ListState::default(),
            search: String::new(),
            search_mode: false,
            filter: DashboardFilter::default(),
        };
        app.reset_selection();
        app
    }

    fn reset_selection(&mut self) {
        let listing = crate::view::search(&self.findings, self.zone, &self.search);
        let (lda, fc) = (listing.lda.len(), listing.fc.len());
        self.lda_state.select((lda > 0).then_some(0));
        self.fc_state.select((fc > 0).then_some(0));
        if lda == 0 && fc > 0 {
            self.pane = Pane::Fc;
        } else if fc == 0 {
            self.pane = Pane::Lda;
        }
    }

    fn move_selection(&mut self, delta: i32) {
        let listing = crate::view::search(&self.findings, self.zone, &self.search);
        let (state, len) = match self.pane {
            Pane::Lda => (&mut self.lda_state, listing.lda.len()),
            Pane::Fc => (&mut self.fc_state, listing.fc.len()),
        };
        move_list_selection(state, len, delta);
    }

    fn selected(&self) -> Option<&Finding> {
        let listing = crate::view::search(&self.findings, self.zone, &self.search);
        match self.pane {
            Pane::Lda => self.lda_state.selected().and_then(|i| listing.lda.get(i).copied()),
            Pane::Fc => self.fc_state.selected().and_then(|i| listing.fc.get(i).copied()),
        }
    }
}

fn move_list_selection(state: &mut ListState, len: usize, delta: i32) {
    if len == 0 {
        state.select(None);
        return;
    }
    let selected = state.selected().unwrap_or(0) as i32;
    let next = (selected + delta).clamp(0, (len as i32).saturating_sub(1));
    state.select(Some(next as usize));
}

fn cycle<T: Copy + PartialEq>(current: Option<T>, all: &[T]) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(v) => {
            let idx = all.iter().position(|x| *x == v)?;
            all.get(idx + 1).copied()
        }
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    loop {
        terminal
            .draw(|f| draw(f, &mut app))
            .context("no se pudo dibujar la pantalla")?;

        if event::poll(tick_rate).context("error esperando eventos")? {
            match event::read().context("error leyendo eventos")? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press && handle_key(&mut app, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }
    Ok(())
}

fn open_help(app: &mut App) {
    app.help_return_to = app.screen;
    app.screen = Screen::Help;
}

fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.search_mode {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                app.search_mode = false;
                app.search = app.search.trim().to_string();
            }
            KeyCode::Backspace => {
                app.search.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.search.clear();
            }
            KeyCode::Char(c) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    app.search.push(c);
                }
            }
            _ => return false,
        }
        app.reset_selection();
        return false;
    }

    match app.screen {
        Screen::Help => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                app.screen = app.help_return_to;
            }
        }
        Screen::Records => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => open_help(app),
            KeyCode::Char('/') => app.search_mode = true,
            KeyCode::Esc => {
                if !app.search.is_empty() {
                    app.search.clear();
                    app.reset_selection();
                }
            }
            KeyCode::Char('s') => app.screen = Screen::Stats,
            KeyCode::Right | KeyCode::Char('l') => {
                app.zone = app.zone.next();
                app.reset_selection();
            }
            KeyCode::Left | KeyCode::Char('h') => {
                app.zone = app.zone.prev();
                app.reset_selection();
            }
            KeyCode::Char(c @ '1'..='4') => {
                let idx = (c as usize) - ('1' as usize);
                app.zone = Zone::ALL[idx];
                app.reset_selection();
            }
            KeyCode::Tab | KeyCode::BackTab => {
                app.pane = match app.pane {
                    Pane::Lda => Pane::Fc,
                    Pane::Fc => Pane::Lda,
                };
            }
            KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
            KeyCode::PageDown => app.move_selection(10),
            KeyCode::PageUp => app.move_selection(-10),
            _ => {}
        },
        Screen::Stats => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => open_help(app),
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('s') => {
                app.screen = Screen::Records;
            }
            KeyCode::Char('z') => app.filter.zone = cycle(app.filter.zone, &Zone::ALL),
            KeyCode::Char('e') => app.filter.status = cycle(app.filter.status, &Status::ALL),
            KeyCode::Char('c') => {
                app.filter.criticality = cycle(app.filter.criticality, &Criticality::ALL)
            }
            KeyCode::Char('x') => app.filter = DashboardFilter::default(),
            _ => {}
        },
    }
    false
}

fn draw(f: &mut ratatui::Frame, app: &mut App) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(size);

    draw_header(f, chunks[0], app);
    draw_footer(f, chunks[2], app);

    match app.screen {
        Screen::Records => draw_records(f, chunks[1], app),
        Screen::Stats => draw_stats(f, chunks[1], app),
        Screen::Help => {
            match app.help_return_to {
                Screen::Stats => draw_stats(f, chunks[1], app),
                _ => draw_records(f, chunks[1], app),
            }
            draw_help(f, chunks[1]);
        }
    }
}

fn draw_header(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let counts = crate::view::zone_counts(&app.findings);
    let titles: Vec<Line> = counts
        .iter()
        .map(|(z, n)| Line::from(format!("{z} ({n})")))
        .collect();

    let searching = !app.search.trim().is_empty();
    let selected = Zone::ALL.iter().position(|z| *z == app.zone).unwrap_or(0);
    let on_stats = app.screen == Screen::Stats
        || (app.screen == Screen::Help && app.help_return_to == Screen::Stats);
    let title = if on_stats {
        "hallazgos · estadísticas".to_string()
    } else if searching {
        "hallazgos · búsqueda en todas las zonas".to_string()
    } else {
        format!("hallazgos · v{}", env!("CARGO_PKG_VERSION"))
    };

    let highlight = if searching {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    };
    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(highlight);
    f.render_widget(tabs, area);
}

fn draw_footer(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let line1 = if app.search_mode {
        Line::from(vec![
            Span::styled("Buscar: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                app.search.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
        ])
    } else {
        let hint = match app.screen {
            Screen::Records => "←→/1-4: zona  Tab: LDA/FC  j/k: mover  /: buscar  s: estadísticas  ?: ayuda  q: salir",
            Screen::Stats => "z: zona  e: estado  c: criticidad  x: limpiar filtros  b: volver  q: salir",
            Screen::Help => "b/Esc: cerrar ayuda",
        };
        Line::from(hint)
    };
    let line2 = Line::from(format!("{} registros · solo lectura", app.findings.len()));

    let w = Paragraph::new(Text::from(vec![line1, line2]))
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    f.render_widget(w, area);
}

fn draw_records(f: &mut ratatui::Frame, area: Rect, app: &mut App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);
    let lists = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[0]);

    let color = app.color;
    let active = app.pane;
    let listing = crate::view::search(&app.findings, app.zone, &app.search);
    let focus = Style::default().fg(Color::Cyan);

    for (pane, rows, state, rect) in [
        (Pane::Lda, &listing.lda, &mut app.lda_state, lists[0]),
        (Pane::Fc, &listing.fc, &mut app.fc_state, lists[1]),
    ] {
        let label = match pane {
            Pane::Lda => "LDA",
            Pane::Fc => "FC",
        };
        let items: Vec<ListItem> = if rows.is_empty() {
            vec![ListItem::new(Line::from(Span::styled(
                "Sin registros.",
                Style::default().fg(Color::DarkGray),
            )))]
        } else {
            rows.iter()
                .map(|r| ListItem::new(record_line(r, color)))
                .collect()
        };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{label} ({})", rows.len()));
        if pane == active {
            block = block.border_style(focus);
        }
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(list, rect, state);
    }

    let detail = app
        .selected()
        .map(|r| finding_detail(r, color))
        .unwrap_or_else(|| Text::from("Ningún registro seleccionado."));

    let w = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title("Detalle"))
        .wrap(Wrap { trim: false });
    f.render_widget(w, columns[1]);
}

fn record_line(r: &Finding, color: bool) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:<7}", r.code()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{} ", r.criticality), criticality_style(r.criticality, color)),
        Span::styled(format!("{:<10} ", r.status.as_str()), status_style(r.status, color)),
        Span::raw(truncate_chars(&r.description, 48)),
    ])
}

fn finding_detail(r: &Finding, color: bool) -> Text<'static> {
    let label = |s: &'static str| Span::styled(s, Style::default().fg(Color::DarkGray));
    let dash = |s: &str| {
        if s.trim().is_empty() {
            "-".to_string()
        } else {
            s.to_string()
        }
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(r.code(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(r.zone.to_string(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(""),
        Line::from(r.description.clone()),
        Line::from(""),
        Line::from(vec![
            label("Criticidad: "),
            Span::styled(r.criticality.to_string(), criticality_style(r.criticality, color)),
        ]),
        Line::from(vec![
            label("Estado:     "),
            Span::styled(r.status.to_string(), status_style(r.status, color)),
        ]),
        Line::from(vec![
            label("F. Cierre:  "),
            Span::raw(dash(&crate::dates::format_display(&r.closing_date))),
        ]),
    ];
    let doc = if r.document.is_none() {
        r.document.to_string()
    } else {
        format!("{} {}", r.document, dash(&r.document_code))
    };
    lines.push(Line::from(vec![label("Documento:  "), Span::raw(doc)]));
    if !r.remarks.trim().is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(label("Observaciones:")));
        lines.push(Line::from(r.remarks.clone()));
    }
    Text::from(lines)
}

fn draw_stats(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let visible = app.filter.apply(&app.findings);
    let summary = crate::stats::summarize(&visible);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(6),
        ])
        .split(area);

    let all = |v: Option<String>| v.unwrap_or_else(|| "TODAS".to_string());
    let filters = Line::from(vec![
        Span::styled("Zona: ", Style::default().fg(Color::DarkGray)),
        Span::raw(all(app.filter.zone.map(|z| z.to_string()))),
        Span::styled("   Estado: ", Style::default().fg(Color::DarkGray)),
        Span::raw(all(app.filter.status.map(|s| s.to_string()))),
        Span::styled("   Criticidad: ", Style::default().fg(Color::DarkGray)),
        Span::raw(all(app.filter.criticality.map(|c| c.to_string()))),
    ]);
    f.render_widget(
        Paragraph::new(filters).block(Block::default().borders(Borders::ALL).title("Filtros")),
        rows[0],
    );

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    let t = &summary.totals;
    let totals = Text::from(vec![
        Line::from(format!("Total:       {}", t.total)),
        Line::from(format!("LDA / FC:    {} / {}", t.lda, t.fc)),
        Line::from(format!("Ejecutados:  {} ({}%)", t.executed, t.executed_pct)),
        Line::from(crate::ui::bar(t.executed_pct, 20)),
    ]);
    f.render_widget(
        Paragraph::new(totals).block(Block::default().borders(Borders::ALL).title("Avance")),
        top[0],
    );

    let by_crit: Vec<Line> = summary
        .by_criticality
        .iter()
        .map(|c| {
            Line::from(vec![
                Span::styled(format!("{}  ", c.criticality), criticality_style(c.criticality, app.color)),
                Span::raw(crate::ui::bar(c.pct, 20)),
                Span::raw(format!("  {:>3}%  ({}/{})", c.pct, c.executed, c.total)),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(Text::from(by_crit)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Ejecución por criticidad"),
        ),
        top[1],
    );

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28),
            Constraint::Percentage(36),
            Constraint::Percentage(36),
        ])
        .split(rows[2]);

    let mut zone_lines = vec![Line::from(Span::styled(
        format!("{:<14}{:>5}{:>5}", "Zona", "LDA", "FC"),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    zone_lines.extend(
        summary
            .zone_types
            .iter()
            .map(|z| Line::from(format!("{:<14}{:>5}{:>5}", z.zone.as_str(), z.lda, z.fc))),
    );
    f.render_widget(
        Paragraph::new(Text::from(zone_lines))
            .block(Block::default().borders(Borders::ALL).title("Zona / tipo")),
        bottom[0],
    );

    let mut matrix = vec![Line::from(Span::styled(
        format!("{:<4}{:>6}{:>6}{:>6}{:>6}", "", "EJEC", "PROC", "PEND", "ATRA"),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    matrix.extend(summary.criticality_status.iter().map(|c| {
        Line::from(format!(
            "{:<4}{:>6}{:>6}{:>6}{:>6}",
            c.criticality.as_str(),
            c.executed,
            c.in_progress,
            c.pending,
            c.overdue
        ))
    }));
    f.render_widget(
        Paragraph::new(Text::from(matrix)).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Criticidad / estado"),
        ),
        bottom[1],
    );

    let labels: Vec<String> = summary
        .pareto
        .iter()
        .map(|p| format!("{} {}%", truncate_chars(p.zone.as_str(), 4), p.cumulative_pct))
        .collect();
    let data: Vec<(&str, u64)> = summary
        .pareto
        .iter()
        .zip(labels.iter())
        .map(|(p, l)| (l.as_str(), p.count as u64))
        .collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Pareto por zona"))
        .data(data.as_slice())
        .bar_width(9)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    f.render_widget(chart, bottom[2]);
}

fn draw_help(f: &mut ratatui::Frame, area: Rect) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            "hallazgos: tablero de solo lectura",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Registros:"),
        Line::from("  ←→ / h l / 1-4 : cambiar de zona"),
        Line::from("  Tab             : alternar lista LDA / FC"),
        Line::from("  ↑↓ / j k        : mover selección"),
        Line::from("  /               : buscar en todas las zonas (descripción, código, cód. doc)"),
        Line::from("  Esc             : limpiar búsqueda"),
        Line::from("  s               : estadísticas"),
        Line::from(""),
        Line::from("Estadísticas:"),
        Line::from("  z / e / c : recorrer filtro de zona / estado / criticidad"),
        Line::from("  x         : quitar filtros"),
        Line::from("  b / Esc   : volver"),
        Line::from(""),
        Line::from("Búsqueda:"),
        Line::from("  Enter/Esc: terminar  Backspace: borrar  Ctrl-U: limpiar"),
        Line::from(""),
        Line::from(Span::styled(
            "Los cambios se hacen con los comandos add/edit/delete/bulk (modo administrador).",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from("q: salir   Ctrl-C: salir desde cualquier pantalla"),
    ]);

    let popup = centered_rect(70, 75, area);
    f.render_widget(ratatui::widgets::Clear, popup);
    let w = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Ayuda"))
        .wrap(Wrap { trim: false });
    f.render_widget(w, popup);
}

fn truncate_chars(input: &str, max_chars: usize) -> String {
    let mut s = String::new();
    for (i, ch) in input.chars().enumerate() {
        if i >= max_chars {
            s.push('…');
            break;
        }
        s.push(ch);
    }
    s
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn status_style(status: Status, enabled: bool) -> Style {
    if !enabled {
        return Style::default();
    }
    match status {
        Status::Executed => Style::default().fg(Color::Green),
        Status::InProgress => Style::default().fg(Color::Blue),
        Status::Pending => Style::default().fg(Color::Yellow),
        Status::Overdue => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

fn criticality_style(c: Criticality, enabled: bool) -> Style {
    if !enabled {
        return Style::default();
    }
    match c {
        Criticality::A => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Criticality::B => Style::default().fg(Color::Yellow),
        Criticality::C => Style::default().fg(Color::Green),
    }
}
