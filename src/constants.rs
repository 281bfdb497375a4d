use ratatui::style::Color;

/// Session slots per CSV row (`day1` .. `day6`).
pub const SLOT_COUNT: usize = 6;

pub const PROGRAM_LAYOUT: ProgramLayoutSettings = ProgramLayoutSettings {
    default_columns: 12,
    header_columns: 2,
    columns_per_session: 2,
};

pub const PROGRAM_SOURCE: ProgramSourceSettings = ProgramSourceSettings {
    path: "data/program1.csv",
    delimiter: ';',
    unavailable_message: "Programma non disponibile.",
};

pub const SCROLL_SPY: ScrollSpySettings = ScrollSpySettings {
    threshold_steps: 10,
    excluded_ids: &["home"],
};

pub const TIME_SETTINGS: TimeSettings = TimeSettings {
    frame_ms: 16,
    poll_ms: 8,
};

pub const THEME: Theme = Theme {
    accent: Color::Rgb(0, 153, 255),
    active_bg: Color::Rgb(255, 204, 0),
    focus_bg: Color::Rgb(40, 44, 52),
    muted: Color::Gray,
    year: Color::Rgb(0, 176, 80),
    mode: Color::Rgb(153, 0, 255),
};

pub struct ProgramLayoutSettings {
    pub default_columns: i64,
    pub header_columns: i64,
    pub columns_per_session: i64,
}

pub struct ProgramSourceSettings {
    pub path: &'static str,
    pub delimiter: char,
    pub unavailable_message: &'static str,
}

pub struct ScrollSpySettings {
    pub threshold_steps: usize,
    pub excluded_ids: &'static [&'static str],
}

pub struct TimeSettings {
    pub frame_ms: u64,
    pub poll_ms: u64,
}

pub struct Theme {
    pub accent: Color,
    pub active_bg: Color,
    pub focus_bg: Color,
    pub muted: Color,
    pub year: Color,
    pub mode: Color,
}
