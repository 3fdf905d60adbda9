#![allow(clippy::too_many_lines)]

#[path = "tui_helpers.rs"]
mod helpers;

use self::helpers::{
    action_hint_spans, button_block, color_accent, color_muted, color_text, edit_text_field,
    grid_cells, install_theme, notice_style, panel_block, remote_key_for, tone_color,
};
use crate::cli::TuiArgs;
use crate::config::{self, ConfigStore, ServerConfig};
use crate::destination::{Destination, resolve_address};
use crate::launcher::{
    EXIT_CONFIRM_MESSAGE, EXIT_CONFIRM_WINDOW, HomeButton, HomeInput, KeyOutcome, Launcher,
    Navigation,
};
use crate::logging;
use crate::probe::{self, ProbeMode, ProbeOutcome, ProbeReport, StatusBoard};
use crate::theme::{self, ThemePalette};
use crate::viewer::{SystemViewer, Viewer};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const UI_IDLE_SLEEP: Duration = Duration::from_millis(16);
const NOTICE_TTL: Duration = Duration::from_secs(4);

const GLYPH_ACTIVE: &str = "▸";
const GLYPH_BULLET: &str = "•";

pub async fn run_tui(store: ConfigStore, args: &TuiArgs) -> Result<()> {
    match logging::init_tui() {
        Ok(path) => log::info!("logging to {}", path.display()),
        Err(err) => eprintln!("Warning: file logging unavailable ({err:#})."),
    }

    let palette = match theme::load_or_create_theme() {
        Ok(palette) => palette,
        Err(err) => {
            log::warn!("failed to load theme config ({err:#}); using defaults");
            ThemePalette::default()
        }
    };
    install_theme(palette);

    let config = match store.load() {
        Ok(config) => config,
        Err(err) => {
            log::warn!("failed to load config ({err:#}); using defaults");
            ServerConfig::default()
        }
    };
    let viewer = SystemViewer::new(config.viewer_command.clone());
    let mut app = App::new(store, config, viewer, args.simulate_probe);

    let mut terminal = init_terminal()?;
    let run_result = run_loop(&mut terminal, &mut app).await;
    let restore_result = restore_terminal(&mut terminal);

    run_result?;
    restore_result?;
    Ok(())
}

async fn run_loop<V: Viewer>(terminal: &mut AppTerminal, app: &mut App<V>) -> Result<()> {
    let mut running = true;
    let mut last_ui_signature = None;

    app.enter_home();

    while running {
        app.poll_probe_results();

        let current_ui_signature = app.ui_state_signature(Instant::now());
        if last_ui_signature.is_none_or(|prev| prev != current_ui_signature) {
            terminal
                .draw(|frame| app.draw(frame))
                .context("failed drawing TUI frame")?;
            last_ui_signature = Some(current_ui_signature);
        }

        while event::poll(Duration::ZERO).context("failed to poll input")? {
            match event::read().context("failed reading input")? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match app.handle_key(key)? {
                        AppCommand::None => {}
                        AppCommand::Quit => {
                            running = false;
                            break;
                        }
                    }
                }
                Event::Resize(_, _) => {
                    last_ui_signature = None;
                }
                _ => {}
            }
        }

        if !running {
            break;
        }
        tokio::time::sleep(UI_IDLE_SLEEP).await;
    }

    log::info!("home screen closed");
    Ok(())
}

type AppTerminal = Terminal<CrosstermBackend<io::Stdout>>;

fn init_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("failed creating terminal")
}

fn restore_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("failed disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed leaving alternate screen")?;
    terminal.show_cursor().context("failed showing cursor")?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Screen {
    Home,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SettingsField {
    ServerUrl,
    ProbeTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SettingsForm {
    focus: SettingsField,
    server_url: String,
    probe_timeout_ms: String,
}

impl SettingsForm {
    fn from_config(config: &ServerConfig) -> Self {
        Self {
            focus: SettingsField::ServerUrl,
            server_url: config.server_url.clone(),
            probe_timeout_ms: config.probe_timeout_ms.to_string(),
        }
    }

    fn to_config(&self, base: &ServerConfig) -> Result<ServerConfig> {
        let server_url = config::validate_server_url(&self.server_url)?;
        let probe_timeout_ms = self
            .probe_timeout_ms
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .with_context(|| {
                format!(
                    "invalid probe timeout '{}', expected milliseconds",
                    self.probe_timeout_ms
                )
            })?;

        Ok(ServerConfig {
            server_url,
            probe_timeout_ms,
            viewer_command: base.viewer_command.clone(),
        })
    }
}

#[derive(Debug)]
enum AppCommand {
    None,
    Quit,
}

#[derive(Debug, Clone)]
struct Notice {
    text: String,
    expires_at: Instant,
}

struct App<V> {
    screen: Screen,
    store: ConfigStore,
    config: ServerConfig,
    launcher: Launcher<V>,
    input: HomeInput,
    board: StatusBoard,
    simulate_probe: bool,
    probe_tx: mpsc::UnboundedSender<(u64, ProbeReport)>,
    probe_rx: mpsc::UnboundedReceiver<(u64, ProbeReport)>,
    notice: Option<Notice>,
    settings: SettingsForm,
}

impl<V: Viewer> App<V> {
    fn new(store: ConfigStore, config: ServerConfig, viewer: V, simulate_probe: bool) -> Self {
        let (probe_tx, probe_rx) = mpsc::unbounded_channel();
        Self {
            screen: Screen::Home,
            store,
            launcher: Launcher::new(config.server_url.clone(), viewer),
            settings: SettingsForm::from_config(&config),
            config,
            input: HomeInput::default(),
            board: StatusBoard::default(),
            simulate_probe,
            probe_tx,
            probe_rx,
            notice: None,
        }
    }

    fn probe_mode(&self) -> ProbeMode {
        let window = Duration::from_millis(self.config.probe_timeout_ms.max(1));
        if self.simulate_probe {
            ProbeMode::Simulated {
                delay: window,
                outcome: ProbeOutcome::Reachable,
            }
        } else {
            ProbeMode::Network { timeout: window }
        }
    }

    /// Runs whenever the home screen becomes active.
    fn enter_home(&mut self) {
        self.screen = Screen::Home;
        match self.store.load() {
            Ok(config) => self.config = config,
            Err(err) => log::warn!("failed to reload config ({err:#}); keeping current settings"),
        }
        self.launcher.set_server_url(self.config.server_url.clone());
        self.start_probe();
    }

    fn start_probe(&mut self) {
        let generation = self.board.begin();
        log::info!(
            "probe #{generation} started for {}",
            self.config.server_url
        );
        probe::spawn_probe(
            self.probe_mode(),
            self.config.server_url.clone(),
            generation,
            self.probe_tx.clone(),
        );
    }

    fn poll_probe_results(&mut self) {
        while let Ok((generation, report)) = self.probe_rx.try_recv() {
            if self.board.apply(generation, &report) {
                log::info!(
                    "probe #{generation}: {} ({}) after {:?}",
                    report.outcome,
                    report.detail,
                    report.elapsed
                );
            }
        }
    }

    fn open_settings(&mut self) {
        self.settings = SettingsForm::from_config(&self.config);
        self.screen = Screen::Settings;
    }

    fn show_notice(&mut self, text: impl Into<String>, ttl: Duration) {
        self.notice = Some(Notice {
            text: text.into(),
            expires_at: Instant::now() + ttl,
        });
    }

    fn visible_notice(&self, now: Instant) -> Option<&str> {
        self.notice
            .as_ref()
            .filter(|notice| now < notice.expires_at)
            .map(|notice| notice.text.as_str())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<AppCommand> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('q')) {
            return Ok(AppCommand::Quit);
        }

        match self.screen {
            Screen::Home => Ok(self.handle_home_key(key)),
            Screen::Settings => self.handle_settings_key(key),
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) -> AppCommand {
        if key.modifiers.is_empty() && matches!(key.code, KeyCode::Char('r' | 'R')) {
            self.start_probe();
            return AppCommand::None;
        }

        let Some(remote_key) = remote_key_for(key) else {
            return AppCommand::None;
        };
        match self.input.on_remote_key(remote_key, Instant::now()) {
            KeyOutcome::Activate(button) => self.activate(button),
            KeyOutcome::OpenSettings => {
                self.open_settings();
                AppCommand::None
            }
            KeyOutcome::ConfirmExit => {
                self.show_notice(EXIT_CONFIRM_MESSAGE, EXIT_CONFIRM_WINDOW);
                AppCommand::None
            }
            KeyOutcome::Exit => AppCommand::Quit,
            KeyOutcome::FocusMoved(_) | KeyOutcome::Ignored => AppCommand::None,
        }
    }

    fn activate(&mut self, button: HomeButton) -> AppCommand {
        match self.launcher.activate(button) {
            Ok(Navigation::Opened(request)) => {
                let name = request.title.as_deref().unwrap_or(button.label());
                self.show_notice(format!("Opened {name} at {}", request.address), NOTICE_TTL);
                AppCommand::None
            }
            Ok(Navigation::Settings) => {
                self.open_settings();
                AppCommand::None
            }
            Err(err) => {
                log::error!("failed opening {}: {err:#}", button.label());
                let message = std::error::Error::source(&err)
                    .map_or_else(|| err.to_string(), |source| format!("{err}: {source}"));
                self.show_notice(format!("Error: {message}"), NOTICE_TTL);
                AppCommand::None
            }
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> Result<AppCommand> {
        match key.code {
            KeyCode::Esc => {
                self.notice = None;
                self.enter_home();
                return Ok(AppCommand::None);
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.settings.focus = match self.settings.focus {
                    SettingsField::ServerUrl => SettingsField::ProbeTimeout,
                    SettingsField::ProbeTimeout => SettingsField::ServerUrl,
                };
                return Ok(AppCommand::None);
            }
            KeyCode::Enter => {
                self.save_settings();
                return Ok(AppCommand::None);
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let focus = self.settings.focus;
                self.settings = SettingsForm::from_config(&ServerConfig::default());
                self.settings.focus = focus;
                self.show_notice("Defaults restored; press Enter to save.", NOTICE_TTL);
                return Ok(AppCommand::None);
            }
            _ => {}
        }

        match self.settings.focus {
            SettingsField::ServerUrl => {
                edit_text_field(&mut self.settings.server_url, key, |c| !c.is_whitespace())
            }
            SettingsField::ProbeTimeout => {
                edit_text_field(&mut self.settings.probe_timeout_ms, key, |c| {
                    c.is_ascii_digit()
                })
            }
        }
    }

    fn save_settings(&mut self) {
        let updated = match self.settings.to_config(&self.config) {
            Ok(updated) => updated,
            Err(err) => {
                self.show_notice(format!("Invalid: {err:#}"), NOTICE_TTL);
                return;
            }
        };

        match self.store.save(&updated) {
            Ok(()) => {
                self.settings = SettingsForm {
                    focus: self.settings.focus,
                    ..SettingsForm::from_config(&updated)
                };
                self.config = updated;
                self.show_notice("Saved.", NOTICE_TTL);
            }
            Err(err) => {
                log::error!("failed saving settings: {err:#}");
                self.show_notice(format!("Save failed: {err:#}"), NOTICE_TTL);
            }
        }
    }

    fn ui_state_signature(&self, now: Instant) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.screen.hash(&mut hasher);
        self.input.focused().hash(&mut hasher);
        self.board.text().hash(&mut hasher);
        self.board.in_flight().hash(&mut hasher);
        self.visible_notice(now).hash(&mut hasher);
        if self.screen == Screen::Settings {
            self.settings.hash(&mut hasher);
        }
        hasher.finish()
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        match self.screen {
            Screen::Home => self.draw_home(frame),
            Screen::Settings => self.draw_settings(frame),
        }
    }

    fn draw_home(&self, frame: &mut ratatui::Frame<'_>) {
        let now = Instant::now();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let banner = Paragraph::new(Line::from(vec![
            Span::styled(
                "Media Center",
                Style::default()
                    .fg(color_accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {GLYPH_BULLET}  {}", self.launcher.server_url()),
                Style::default().fg(color_muted()),
            ),
        ]))
        .alignment(Alignment::Center)
        .block(panel_block("◈", "Home", false));
        frame.render_widget(banner, layout[0]);

        let status_line = match self.visible_notice(now) {
            Some(notice) => Line::from(vec![
                Span::styled(
                    self.board.text(),
                    Style::default()
                        .fg(tone_color(self.board.tone()))
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {GLYPH_BULLET}  "), Style::default().fg(color_muted())),
                Span::styled(notice, notice_style(notice)),
            ]),
            None => Line::from(Span::styled(
                self.board.text(),
                Style::default()
                    .fg(tone_color(self.board.tone()))
                    .add_modifier(Modifier::BOLD),
            )),
        };
        let status = Paragraph::new(status_line)
            .alignment(Alignment::Center)
            .block(panel_block(
                "◉",
                if self.board.in_flight() {
                    "Status (checking)"
                } else {
                    "Status"
                },
                false,
            ));
        frame.render_widget(status, layout[1]);

        let cells = grid_cells(layout[2], 2, 2);
        for (button, cell) in HomeButton::ALL.iter().zip(cells) {
            let focused = *button == self.input.focused();
            let subtitle = match button.destination() {
                Some(destination) => resolve_address(&self.config.server_url, destination),
                None => "Server address & probe".to_owned(),
            };

            let mut lines = Vec::new();
            let padding = cell.height.saturating_sub(4) / 2;
            for _ in 0..padding {
                lines.push(Line::default());
            }
            let marker = if focused { GLYPH_ACTIVE } else { " " };
            lines.push(Line::from(Span::styled(
                format!("{marker} {} ", button.label()),
                Style::default()
                    .fg(color_text())
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                subtitle,
                Style::default().fg(color_muted()),
            )));

            let widget = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(button_block(focused));
            frame.render_widget(widget, cell);
        }

        let footer_spans = action_hint_spans(&[
            ("Arrows", "Move"),
            ("Enter", "Open"),
            ("M", "Settings"),
            ("R", "Recheck"),
            ("Esc", "Back"),
            ("Ctrl+Q", "Quit"),
        ]);
        let footer = Paragraph::new(Line::from(footer_spans))
            .style(Style::default().fg(color_text()))
            .block(panel_block("⌘", "Actions", false));
        frame.render_widget(footer, layout[3]);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>) {
        let now = Instant::now();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Min(7),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let field_line = |label: &'static str, value: &str, field: SettingsField| {
            let focused = self.settings.focus == field;
            let marker = if focused { GLYPH_ACTIVE } else { " " };
            let cursor = if focused { "_" } else { "" };
            Line::from(vec![
                Span::styled(
                    format!("{marker} "),
                    Style::default()
                        .fg(color_accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(label, Style::default().fg(color_muted())),
                Span::styled(format!("{value}{cursor}"), Style::default().fg(color_text())),
            ])
        };

        let form_lines = vec![
            field_line("Server URL: ", &self.settings.server_url, SettingsField::ServerUrl),
            field_line(
                "Probe timeout (ms): ",
                &self.settings.probe_timeout_ms,
                SettingsField::ProbeTimeout,
            ),
            Line::default(),
            Line::from(Span::styled(
                format!("Saved at {}", self.store.path().display()),
                Style::default().fg(color_muted()),
            )),
        ];
        let form = Paragraph::new(form_lines)
            .wrap(Wrap { trim: false })
            .block(panel_block("◌", "Server", true));
        frame.render_widget(form, layout[0]);

        let mut preview_lines = Vec::new();
        for destination in Destination::ALL {
            preview_lines.push(Line::from(vec![
                Span::styled(
                    format!("{GLYPH_BULLET} {:<14}", destination.label()),
                    Style::default().fg(color_muted()),
                ),
                Span::styled(
                    resolve_address(self.settings.server_url.trim(), destination),
                    Style::default().fg(color_text()),
                ),
            ]));
        }
        if let Some(notice) = self.visible_notice(now) {
            preview_lines.push(Line::default());
            preview_lines.push(Line::from(Span::styled(
                notice,
                notice_style(notice).add_modifier(Modifier::BOLD),
            )));
        }
        let preview = Paragraph::new(preview_lines)
            .wrap(Wrap { trim: false })
            .block(panel_block("◉", "Destinations", false));
        frame.render_widget(preview, layout[1]);

        let footer_spans = action_hint_spans(&[
            ("Tab", "Switch Field"),
            ("Enter", "Save"),
            ("Ctrl+R", "Defaults"),
            ("Esc", "Back to Home"),
        ]);
        let footer = Paragraph::new(Line::from(footer_spans))
            .style(Style::default().fg(color_text()))
            .block(panel_block("⌘", "Actions", false));
        frame.render_widget(footer, layout[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::{App, AppCommand, Screen};
    use crate::config::{ConfigStore, ServerConfig};
    use crate::launcher::HomeButton;
    use crate::probe::{STATUS_CONNECTING, STATUS_READY};
    use crate::viewer::{ViewRequest, Viewer, ViewerError};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    #[derive(Clone, Default)]
    struct SharedViewer(Arc<Mutex<Vec<ViewRequest>>>);

    impl Viewer for SharedViewer {
        fn open(&self, request: &ViewRequest) -> Result<(), ViewerError> {
            if let Ok(mut opened) = self.0.lock() {
                opened.push(request.clone());
            }
            Ok(())
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app(dir: &tempfile::TempDir) -> (App<SharedViewer>, SharedViewer) {
        let viewer = SharedViewer::default();
        let config = ServerConfig {
            server_url: "http://h:8600".to_owned(),
            probe_timeout_ms: 10,
            viewer_command: None,
        };
        let store = ConfigStore::at(dir.path().join("config.json"));
        store.save(&config).expect("seed config");
        (App::new(store, config, viewer.clone(), true), viewer)
    }

    fn opened(viewer: &SharedViewer) -> Vec<ViewRequest> {
        viewer.0.lock().map(|v| v.clone()).unwrap_or_default()
    }

    #[tokio::test]
    async fn entering_home_probes_and_reports_ready() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _viewer) = test_app(&dir);

        app.enter_home();
        assert_eq!(app.board.text(), STATUS_CONNECTING);

        tokio::time::sleep(Duration::from_millis(100)).await;
        app.poll_probe_results();
        assert_eq!(app.board.text(), STATUS_READY);
    }

    #[tokio::test]
    async fn enter_opens_the_focused_destination() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, viewer) = test_app(&dir);
        app.enter_home();

        app.handle_key(key(KeyCode::Right)).expect("key");
        app.handle_key(key(KeyCode::Enter)).expect("key");

        assert_eq!(
            opened(&viewer),
            vec![ViewRequest {
                address: "http://h:8200".to_owned(),
                title: Some("Media Library".to_owned()),
            }]
        );
        assert!(
            app.visible_notice(Instant::now())
                .is_some_and(|notice| notice.starts_with("Opened Media Library"))
        );
    }

    #[tokio::test]
    async fn menu_and_settings_button_open_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, viewer) = test_app(&dir);
        app.enter_home();

        app.handle_key(key(KeyCode::Char('m'))).expect("key");
        assert_eq!(app.screen, Screen::Settings);

        app.handle_key(key(KeyCode::Esc)).expect("key");
        assert_eq!(app.screen, Screen::Home);

        app.input.focus(HomeButton::Settings);
        app.handle_key(key(KeyCode::Char(' '))).expect("key");
        assert_eq!(app.screen, Screen::Settings);
        assert!(opened(&viewer).is_empty());
    }

    #[tokio::test]
    async fn double_back_quits_from_home() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _viewer) = test_app(&dir);
        app.enter_home();

        assert!(matches!(
            app.handle_key(key(KeyCode::Esc)).expect("key"),
            AppCommand::None
        ));
        assert_eq!(
            app.visible_notice(Instant::now()),
            Some(super::EXIT_CONFIRM_MESSAGE)
        );
        assert!(matches!(
            app.handle_key(key(KeyCode::Esc)).expect("key"),
            AppCommand::Quit
        ));
    }

    #[tokio::test]
    async fn saving_settings_persists_and_reprobes_on_return() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, viewer) = test_app(&dir);
        app.enter_home();
        app.handle_key(key(KeyCode::Char('m'))).expect("key");

        app.settings.server_url.clear();
        for c in "http://new:8600".chars() {
            app.handle_key(key(KeyCode::Char(c))).expect("key");
        }
        app.handle_key(key(KeyCode::Enter)).expect("key");
        assert_eq!(app.config.server_url, "http://new:8600");
        assert_eq!(
            app.store.load().expect("load").server_url,
            "http://new:8600"
        );

        app.handle_key(key(KeyCode::Esc)).expect("key");
        assert_eq!(app.screen, Screen::Home);
        assert_eq!(app.board.text(), STATUS_CONNECTING);

        app.input.focus(HomeButton::LiveTv);
        app.handle_key(key(KeyCode::Enter)).expect("key");
        assert_eq!(opened(&viewer)[0].address, "http://new:8320");
    }

    #[tokio::test]
    async fn invalid_settings_are_not_saved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _viewer) = test_app(&dir);
        app.open_settings();

        app.settings.server_url = "ftp://h:8600".to_owned();
        app.handle_key(key(KeyCode::Enter)).expect("key");

        assert_eq!(app.config.server_url, "http://h:8600");
        assert_eq!(app.store.load().expect("load").server_url, "http://h:8600");
        assert!(
            app.visible_notice(Instant::now())
                .is_some_and(|notice| notice.starts_with("Invalid"))
        );
    }

    #[tokio::test]
    async fn returning_home_picks_up_config_saved_elsewhere() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, viewer) = test_app(&dir);
        app.enter_home();
        app.handle_key(key(KeyCode::Char('m'))).expect("key");

        let outside = ConfigStore::at(app.store.path().to_path_buf());
        outside
            .save(&ServerConfig {
                server_url: "http://changed:8600".to_owned(),
                ..ServerConfig::default()
            })
            .expect("save");

        app.handle_key(key(KeyCode::Esc)).expect("key");
        assert_eq!(app.launcher.server_url(), "http://changed:8600");
        assert_eq!(app.config.server_url, "http://changed:8600");

        app.input.focus(HomeButton::MediaLibrary);
        app.handle_key(key(KeyCode::Enter)).expect("key");
        assert_eq!(opened(&viewer)[0].address, "http://changed:8200");
    }

    #[tokio::test]
    async fn unreadable_config_keeps_current_settings_on_return() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _viewer) = test_app(&dir);
        app.open_settings();

        std::fs::write(app.store.path(), b"{ not json").expect("corrupt");
        app.handle_key(key(KeyCode::Esc)).expect("key");

        assert_eq!(app.screen, Screen::Home);
        assert_eq!(app.launcher.server_url(), "http://h:8600");
        assert_eq!(app.board.text(), STATUS_CONNECTING);
    }

    #[tokio::test]
    async fn ctrl_q_quits_from_any_screen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (mut app, _viewer) = test_app(&dir);
        app.open_settings();
        let quit = app
            .handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL))
            .expect("key");
        assert!(matches!(quit, AppCommand::Quit));
    }
}
