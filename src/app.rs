use crate::backend::VolumeBackend;
use crate::config::Config;
use crate::input::{handle_key, Action};
use crate::models::format::DriveFormat;
use crate::models::volume::VolumeId;
use crate::multitool::{ItemId, ListEntry, Multitool};
use crate::navigable::Navigable;
use crate::ui::dashboard;
use crate::ui::size_picker::SizePicker;
use crate::ui::theme::{Theme, ThemeVariant};
use crate::util::human::fmt_bytes;
use crate::util::user_state::UserState;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};

// ── Tick intervals ────────────────────────────────────────────────────

const POLL_TIMEOUT: Duration = Duration::from_millis(250);
const RESCAN_TICK:  Duration = Duration::from_secs(5);

pub type PoolTool = Multitool<Box<dyn VolumeBackend>>;

// ── Modal state ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browse,
    PickingSize(SizePicker),
    PickingFormat { picker: SizePicker, format: DriveFormat },
    ConfirmRemove { id: VolumeId, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text:     String,
    pub is_error: bool,
}

// ── App ───────────────────────────────────────────────────────────────

pub struct App {
    pub multitool: PoolTool,
    pub config:    Config,

    pub theme:         Theme,
    pub theme_variant: ThemeVariant,

    pub mode:       Mode,
    pub show_help:  bool,
    pub status:     Option<StatusLine>,
    pub list_state: ListState,

    new_drive_item: ItemId,
    last_rescan:    Instant,
    pub should_quit: bool,
}

impl App {
    pub fn new(mut multitool: PoolTool, config: Config, theme_variant: ThemeVariant) -> Self {
        let new_drive_item = multitool.register_item("New Drive");
        Self {
            multitool,
            config,
            theme: Theme::for_variant(theme_variant),
            theme_variant,
            mode: Mode::Browse,
            show_help: false,
            status: None,
            list_state: ListState::default(),
            new_drive_item,
            last_rescan: Instant::now(),
            should_quit: false,
        }
    }

    // ── Main event loop ───────────────────────────────────────────────

    pub fn run<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut ratatui::Terminal<B>,
    ) -> Result<()> {
        loop {
            terminal.draw(|f| dashboard::render(f, self))?;

            if event::poll(POLL_TIMEOUT)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_action(handle_key(key));
                    }
                }
            }

            if self.last_rescan.elapsed() >= RESCAN_TICK {
                self.refresh();
                self.last_rescan = Instant::now();
            }

            if self.should_quit { break; }
        }
        Ok(())
    }

    /// Pick up volumes created or removed outside this process.
    pub fn refresh(&mut self) {
        if let Err(e) = self.multitool.rescan_drives() {
            tracing::debug!(error = %e, "periodic rescan failed");
        }
    }

    // ── Input dispatch ────────────────────────────────────────────────

    pub fn handle_action(&mut self, action: Action) {
        if action == Action::Quit {
            self.should_quit = true;
            return;
        }
        if self.show_help {
            if matches!(action, Action::ShowHelp | Action::Back) {
                self.show_help = false;
            }
            return;
        }

        match std::mem::replace(&mut self.mode, Mode::Browse) {
            Mode::Browse => self.handle_browse(action),
            Mode::PickingSize(picker) => self.handle_picker(picker, action),
            Mode::PickingFormat { picker, format } => self.handle_format(picker, format, action),
            Mode::ConfirmRemove { id, name } => self.handle_confirm(id, name, action),
        }
    }

    fn handle_browse(&mut self, action: Action) {
        match action {
            Action::Next => { self.multitool.on_next(); }
            Action::Prev => { self.multitool.on_prev(); }

            Action::Select => {
                if !self.multitool.on_select() { return; }
                match self.multitool.selected_entry() {
                    Some(ListEntry::Item(id)) if id == self.new_drive_item => self.open_size_picker(),
                    Some(ListEntry::Drive(id)) => {
                        if let Some(d) = self.multitool.drive(&id) {
                            let text = format!("{}  {}  {}", d.name(), d.path(), fmt_bytes(d.size_bytes()));
                            self.info(text);
                        }
                    }
                    _ => {}
                }
            }

            Action::NewDrive => self.open_size_picker(),

            Action::RemoveDrive => match self.multitool.selected_drive() {
                Some(d) => {
                    self.mode = Mode::ConfirmRemove { id: d.id().clone(), name: d.name().to_string() };
                }
                None => self.error("select a drive to remove".into()),
            },

            Action::Rescan => match self.multitool.rescan_drives() {
                Ok(())  => self.info(format!("{} drive(s) in pool", self.multitool.drives().len())),
                Err(e) => self.error(e.to_string()),
            },

            Action::CycleTheme => {
                self.theme_variant = self.theme_variant.next();
                self.theme = Theme::for_variant(self.theme_variant);
                UserState { theme_name: self.theme_variant.name().to_string() }.save();
            }

            Action::ShowHelp => self.show_help = true,
            Action::Back     => self.status = None,

            Action::Confirm | Action::Quit | Action::None => {}
        }
    }

    fn handle_picker(&mut self, mut picker: SizePicker, action: Action) {
        match action {
            Action::Prev => picker.increase(),
            Action::Next => picker.decrease(),
            Action::Select | Action::Confirm => {
                self.mode = Mode::PickingFormat { picker, format: DriveFormat::Windows };
                return;
            }
            Action::Back => return,
            _ => {}
        }
        self.mode = Mode::PickingSize(picker);
    }

    fn handle_format(&mut self, picker: SizePicker, mut format: DriveFormat, action: Action) {
        match action {
            Action::Prev => format = format.prev(),
            Action::Next => format = format.next(),
            Action::Select | Action::Confirm => {
                self.create_drive(picker.size_bytes(), format);
                return;
            }
            Action::Back => {
                self.mode = Mode::PickingSize(picker);
                return;
            }
            _ => {}
        }
        self.mode = Mode::PickingFormat { picker, format };
    }

    fn create_drive(&mut self, size_bytes: u64, format: DriveFormat) {
        let (id, name, size) = match self.multitool.add_drive(size_bytes) {
            Ok(d) => (d.id().clone(), d.name().to_string(), d.size_bytes()),
            Err(e) => return self.error(e.to_string()),
        };
        match self.multitool.format_drive(&id, format) {
            Ok(()) => self.info(format!("created {name} ({}, {})", fmt_bytes(size), format.label())),
            Err(e) => self.error(format!("created {name} but {e}")),
        }
    }

    fn handle_confirm(&mut self, id: VolumeId, name: String, action: Action) {
        match action {
            Action::Confirm | Action::Select => match self.multitool.remove_drive(&id) {
                Ok(())  => self.info(format!("removed {name}")),
                Err(e) => self.error(e.to_string()),
            },
            Action::Back => {}
            _ => self.mode = Mode::ConfirmRemove { id, name },
        }
    }

    fn open_size_picker(&mut self) {
        match self.multitool.pool_usage() {
            Ok(usage) => {
                let drives = &self.config.drives;
                self.mode = Mode::PickingSize(SizePicker::new(usage.total, drives.initial_pct(), drives.step()));
            }
            Err(e) => self.error(format!("cannot size a new drive: {e}")),
        }
    }

    fn info(&mut self, text: String) {
        tracing::info!("{text}");
        self.status = Some(StatusLine { text, is_error: false });
    }

    fn error(&mut self, text: String) {
        tracing::warn!("{text}");
        self.status = Some(StatusLine { text, is_error: true });
    }
}
