use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use registration_form::{
    render, ControlView, FieldKind, FieldName, FormError, RegistrationForm, RenderedView,
    SubmitOutcome,
};
use std::io;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(50);

/// Focus targets: every field in page order, then the submit button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(FieldName),
    Submit,
}

pub struct App {
    pub form: RegistrationForm,
    pub focus_index: usize,
    pub status: Option<String>,
}

impl App {
    pub fn new(form: RegistrationForm) -> Self {
        let mut app = Self {
            form,
            focus_index: 0,
            status: None,
        };
        app.enter_focus();
        app
    }

    fn targets() -> Vec<Focus> {
        FieldName::ALL
            .into_iter()
            .map(Focus::Field)
            .chain(std::iter::once(Focus::Submit))
            .collect()
    }

    pub fn focus(&self) -> Focus {
        Self::targets()[self.focus_index]
    }

    fn enter_focus(&mut self) {
        if let Focus::Field(name) = self.focus() {
            let result = self.form.on_focus(name);
            self.report(result);
        }
    }

    fn leave_focus(&mut self) {
        if let Focus::Field(name) = self.focus() {
            let result = self.form.on_blur(name).map(|_| ());
            self.report(result);
        }
    }

    /// Skip disabled selectors, like a browser's tab order
    fn is_focusable(&self, target: Focus) -> bool {
        match target {
            Focus::Field(name) => self.form.cascade().is_enabled(name),
            Focus::Submit => true,
        }
    }

    pub fn next(&mut self) {
        self.move_focus(1);
    }

    pub fn previous(&mut self) {
        self.move_focus(Self::targets().len() - 1);
    }

    fn move_focus(&mut self, step: usize) {
        let targets = Self::targets();
        self.leave_focus();
        let mut i = self.focus_index;
        loop {
            i = (i + step) % targets.len();
            if self.is_focusable(targets[i]) || i == self.focus_index {
                break;
            }
        }
        self.focus_index = i;
        self.enter_focus();
    }

    pub fn type_char(&mut self, c: char) {
        let Focus::Field(name) = self.focus() else {
            return;
        };
        match self.kind_of(name) {
            Some(kind) if kind.is_typed() => {
                let mut value = self.form.values().text(name).to_string();
                value.push(c);
                let result = self.form.on_input(name, value).map(|_| ());
                self.report(result);
            }
            Some(FieldKind::Checkbox) if c == ' ' => self.toggle(),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        let Focus::Field(name) = self.focus() else {
            return;
        };
        if self.kind_of(name).is_some_and(|kind| kind.is_typed()) {
            let mut value = self.form.values().text(name).to_string();
            value.pop();
            let result = self.form.on_input(name, value).map(|_| ());
            self.report(result);
        }
    }

    pub fn toggle(&mut self) {
        if let Focus::Field(name) = self.focus() {
            let checked = !self.form.values().is_checked(name);
            let result = self.form.on_check(name, checked).map(|_| ());
            self.report(result);
        }
    }

    /// Step through the options of a selector or radio group
    pub fn cycle_option(&mut self, forward: bool) {
        let Focus::Field(name) = self.focus() else {
            return;
        };
        let choices: Vec<String> = match self.kind_of(name) {
            Some(FieldKind::Select) => std::iter::once(String::new())
                .chain(self.form.cascade().options(name).iter().cloned())
                .collect(),
            Some(FieldKind::Radio) => self
                .form
                .definition(name)
                .map(|def| def.options.clone())
                .unwrap_or_default(),
            _ => return,
        };
        if choices.is_empty() {
            return;
        }

        let current = self.form.values().text(name);
        let position = choices.iter().position(|c| c == current);
        let next = match (position, forward) {
            (Some(i), true) => (i + 1) % choices.len(),
            (Some(i), false) => (i + choices.len() - 1) % choices.len(),
            (None, _) => 0,
        };

        let choice = choices[next].clone();
        let result = match self.kind_of(name) {
            Some(FieldKind::Radio) => self.form.on_choose(name, &choice).map(|_| ()),
            _ => self.form.on_select(name, &choice).map(|_| ()),
        };
        self.report(result);
    }

    /// A disabled submit button ignores the press, like the page's button
    pub fn submit(&mut self) {
        if !self.form.is_submit_enabled() {
            let pending = self.form.snapshot().invalid_fields().len();
            self.status = Some(format!("Submit disabled: {} field(s) need attention", pending));
            return;
        }

        match self.form.on_submit() {
            SubmitOutcome::Accepted { .. } => {
                self.status = None;
                self.focus_index = 0;
            }
            SubmitOutcome::Blocked { invalid } => {
                self.status = Some(format!("{} field(s) need attention", invalid.len()));
            }
        }
    }

    pub fn dismiss(&mut self) {
        let result = self.form.dismiss_confirmation();
        self.report(result);
    }

    fn kind_of(&self, name: FieldName) -> Option<FieldKind> {
        self.form.definition(name).ok().map(|def| def.kind)
    }

    fn report(&mut self, result: std::result::Result<(), FormError>) {
        self.status = result.err().map(|err| err.to_string());
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        let view = render(&app.form);
        terminal.draw(|f| ui(f, app, &view))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !handle_key(app, key) {
                    return Ok(());
                }
            }
        }

        // drives the dismissal delay
        let now = Instant::now();
        app.form.advance(now - last_tick);
        last_tick = now;
    }
}

/// Returns false when the user asked to quit
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
    {
        return false;
    }

    if app.form.dialog().is_visible() {
        if key.code == KeyCode::Enter {
            app.dismiss();
        }
        return true;
    }

    match key.code {
        KeyCode::Tab | KeyCode::Down => app.next(),
        KeyCode::BackTab | KeyCode::Up => app.previous(),
        KeyCode::Left => app.cycle_option(false),
        KeyCode::Right => app.cycle_option(true),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter => match app.focus() {
            Focus::Submit => app.submit(),
            Focus::Field(_) => app.next(),
        },
        KeyCode::Char(c) => app.type_char(c),
        _ => {}
    }
    true
}

fn ui(f: &mut Frame, app: &App, view: &RenderedView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Fields
            Constraint::Length(3), // Password strength
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], view);
    render_fields(f, chunks[1], app, view);
    render_strength(f, chunks[2], view);
    render_status_bar(f, chunks[3], app);

    if view.dialog.visible {
        render_dialog(f, view);
    }
}

fn render_header(f: &mut Frame, area: Rect, view: &RenderedView) {
    let errors = view.errors.values().filter(|e| e.visible).count();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "Create Account",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        if view.submit.disabled {
            Span::styled("Incomplete", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled("Ready to submit", Style::default().fg(Color::Green))
        },
        Span::raw("  |  "),
        Span::styled(
            format!("Errors: {}", errors),
            Style::default().fg(if errors > 0 { Color::Red } else { Color::White }),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_fields(f: &mut Frame, area: Rect, app: &App, view: &RenderedView) {
    let focus = app.focus();
    let mut lines = Vec::new();

    for name in FieldName::ALL {
        let Some(control) = view.control(name) else {
            continue;
        };
        let focused = focus == Focus::Field(name);

        let marker = if focused {
            Span::styled("→ ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        } else {
            Span::raw("  ")
        };
        let label_style = if control.disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        };
        let required = if control.required { "*" } else { " " };

        lines.push(Line::from(vec![
            marker,
            Span::styled(format!("{:<18}{} ", control.label, required), label_style),
            display_value(control),
            status_mark(control),
        ]));

        if let Some(error) = view.error(name).filter(|e| e.visible) {
            lines.push(Line::from(Span::styled(
                format!("{:22}{}", "", error.text),
                Style::default().fg(Color::Red).add_modifier(Modifier::ITALIC),
            )));
        }
    }

    lines.push(Line::from(""));
    let submit_style = match (focus == Focus::Submit, view.submit.disabled) {
        (_, true) => Style::default().fg(Color::DarkGray),
        (true, false) => Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD),
        (false, false) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    };
    lines.push(Line::from(vec![
        Span::raw(if focus == Focus::Submit { "→ " } else { "  " }),
        Span::styled("[ Register ]", submit_style),
    ]));

    let fields = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Registration "),
    );

    f.render_widget(fields, area);
}

fn display_value(control: &ControlView) -> Span<'static> {
    let placeholder_style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
    match control.kind {
        FieldKind::Checkbox => Span::raw(if control.checked { "[x]" } else { "[ ]" }),
        FieldKind::Radio => {
            let choices: Vec<String> = control
                .options
                .iter()
                .map(|o| {
                    let mark = if o.value == control.value { "(•)" } else { "( )" };
                    format!("{} {}", mark, o.label)
                })
                .collect();
            Span::raw(choices.join("  "))
        }
        FieldKind::Select if control.value.is_empty() => Span::styled(
            format!("◂ {} ▸", control.options.first().map(|o| o.label.as_str()).unwrap_or("")),
            placeholder_style,
        ),
        FieldKind::Select => Span::raw(format!("◂ {} ▸", control.value)),
        _ if control.value.is_empty() => Span::styled(
            control.placeholder.clone().unwrap_or_default(),
            placeholder_style,
        ),
        FieldKind::Password => Span::raw("•".repeat(control.value.chars().count())),
        _ => Span::raw(control.value.clone()),
    }
}

fn status_mark(control: &ControlView) -> Span<'static> {
    if control.classes.iter().any(|c| c == "error")
        || control.group_classes.iter().any(|c| c == "has-error")
    {
        Span::styled("  ✗", Style::default().fg(Color::Red))
    } else if control.classes.iter().any(|c| c == "valid") {
        Span::styled("  ✓", Style::default().fg(Color::Green))
    } else {
        Span::raw("")
    }
}

fn render_strength(f: &mut Frame, area: Rect, view: &RenderedView) {
    let color = match view.strength.label.as_str() {
        "Weak" => Color::Red,
        "Medium" => Color::Yellow,
        "Strong" => Color::Green,
        _ => Color::DarkGray,
    };
    let percent = view
        .strength
        .width
        .trim_end_matches('%')
        .parse::<u16>()
        .unwrap_or(0);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Password Strength "))
        .gauge_style(Style::default().fg(color))
        .percent(percent)
        .label(view.strength.label.clone());

    f.render_widget(gauge, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = Vec::new();

    if let Some(status) = &app.status {
        status_spans.push(Span::styled(format!(" {} ", status), Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" | "));
    }

    status_spans.push(Span::styled("Tab/↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Move | "));
    status_spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Choose | "));
    status_spans.push(Span::styled("Space", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Toggle | "));
    status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Submit | "));
    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_dialog(f: &mut Frame, view: &RenderedView) {
    let area = centered_rect(50, 30, f.size());
    let border = if view.dialog.classes.iter().any(|c| c == "show") {
        Color::Green
    } else {
        Color::DarkGray
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", view.dialog.title),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("  {}", view.dialog.message)),
        Line::from(""),
        Line::from(Span::styled(
            "  Press Enter to close",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    let dialog = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
