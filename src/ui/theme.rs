use ratatui::style::{Color, Modifier, Style};

// ── Helper: build an Rgb Color from a hex literal ──────────────────────

const fn rgb(hex: u32) -> Color {
    Color::Rgb(
        ((hex >> 16) & 0xFF) as u8,
        ((hex >>  8) & 0xFF) as u8,
        ( hex        & 0xFF) as u8,
    )
}

// ── Theme variant selector ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeVariant {
    Default,
    Nord,
    Mono,
}

impl ThemeVariant {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Nord    => "Nord",
            Self::Mono    => "Mono",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Default => Self::Nord,
            Self::Nord    => Self::Mono,
            Self::Mono    => Self::Default,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "nord" => Self::Nord,
            "mono" => Self::Mono,
            _      => Self::Default,
        }
    }
}

// ── Theme struct ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Theme {
    pub border:         Style,
    pub border_focused: Style,
    pub title:          Style,
    pub text:           Style,
    pub text_dim:       Style,
    pub item:           Style,   // non-drive list entries ("New Drive")
    pub selected:       Style,
    pub header:         Style,
    pub ok:             Style,
    pub crit:           Style,
    pub pool_low:       Style,
    pub pool_mid:       Style,
    pub pool_high:      Style,
    pub pool_full:      Style,
    pub footer_bg:      Style,
    pub footer_key:     Style,
    pub footer_text:    Style,
}

impl Theme {
    pub fn for_variant(v: ThemeVariant) -> Self {
        match v {
            ThemeVariant::Default => Self::default(),
            ThemeVariant::Nord    => Self::nord(),
            ThemeVariant::Mono    => Self::mono(),
        }
    }

    pub fn default() -> Self {
        Self {
            border:         Style::default().fg(Color::DarkGray),
            border_focused: Style::default().fg(Color::Cyan),
            title:          Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            text:           Style::default().fg(Color::White),
            text_dim:       Style::default().fg(Color::DarkGray),
            item:           Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            selected:       Style::default().fg(Color::Black).bg(Color::Cyan),
            header:         Style::default().fg(Color::Black).bg(Color::Blue).add_modifier(Modifier::BOLD),
            ok:             Style::default().fg(Color::Green),
            crit:           Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            pool_low:       Style::default().fg(Color::Green),
            pool_mid:       Style::default().fg(Color::Yellow),
            pool_high:      Style::default().fg(Color::LightRed),
            pool_full:      Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            footer_bg:      Style::default().bg(Color::DarkGray).fg(Color::White),
            footer_key:     Style::default().bg(Color::DarkGray).fg(Color::Cyan).add_modifier(Modifier::BOLD),
            footer_text:    Style::default().bg(Color::DarkGray).fg(Color::Gray),
        }
    }

    fn nord() -> Self {
        // https://www.nordtheme.com/
        // Polar Night: #2e3440 #3b4252 #4c566a  Snow Storm: #d8dee9 #e5e9f0 #eceff4
        // Frost: #88c0d0  Aurora: #bf616a #d08770 #ebcb8b #a3be8c
        Self {
            border:         Style::default().fg(rgb(0x4c566a)),
            border_focused: Style::default().fg(rgb(0x88c0d0)),
            title:          Style::default().fg(rgb(0xeceff4)).add_modifier(Modifier::BOLD),
            text:           Style::default().fg(rgb(0xe5e9f0)),
            text_dim:       Style::default().fg(rgb(0x4c566a)),
            item:           Style::default().fg(rgb(0x88c0d0)).add_modifier(Modifier::ITALIC),
            selected:       Style::default().fg(rgb(0x2e3440)).bg(rgb(0x88c0d0)),
            header:         Style::default().fg(rgb(0xeceff4)).bg(rgb(0x3b4252)).add_modifier(Modifier::BOLD),
            ok:             Style::default().fg(rgb(0xa3be8c)),
            crit:           Style::default().fg(rgb(0xbf616a)).add_modifier(Modifier::BOLD),
            pool_low:       Style::default().fg(rgb(0xa3be8c)),
            pool_mid:       Style::default().fg(rgb(0xebcb8b)),
            pool_high:      Style::default().fg(rgb(0xd08770)),
            pool_full:      Style::default().fg(rgb(0xbf616a)).add_modifier(Modifier::BOLD),
            footer_bg:      Style::default().bg(rgb(0x3b4252)).fg(rgb(0xd8dee9)),
            footer_key:     Style::default().bg(rgb(0x3b4252)).fg(rgb(0x88c0d0)).add_modifier(Modifier::BOLD),
            footer_text:    Style::default().bg(rgb(0x3b4252)).fg(rgb(0x4c566a)),
        }
    }

    fn mono() -> Self {
        // For the 1-bit OLED look: no colour, emphasis only.
        let plain = Style::default();
        let bold  = plain.add_modifier(Modifier::BOLD);
        Self {
            border:         plain,
            border_focused: bold,
            title:          bold,
            text:           plain,
            text_dim:       plain.add_modifier(Modifier::DIM),
            item:           plain.add_modifier(Modifier::ITALIC),
            selected:       plain.add_modifier(Modifier::REVERSED),
            header:         plain.add_modifier(Modifier::REVERSED | Modifier::BOLD),
            ok:             plain,
            crit:           bold,
            pool_low:       plain,
            pool_mid:       plain,
            pool_high:      bold,
            pool_full:      bold.add_modifier(Modifier::REVERSED),
            footer_bg:      plain.add_modifier(Modifier::REVERSED),
            footer_key:     bold.add_modifier(Modifier::REVERSED),
            footer_text:    plain.add_modifier(Modifier::REVERSED),
        }
    }

    /// Gradient style for a `[0, 1]` pool fill fraction.
    pub fn pool_style(&self, fraction: f64) -> Style {
        if      fraction >= 0.95 { self.pool_full }
        else if fraction >= 0.75 { self.pool_high }
        else if fraction >= 0.50 { self.pool_mid  }
        else                      { self.pool_low  }
    }
}
