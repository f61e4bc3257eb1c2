use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: [Theme; 4] = [
  Theme {
    name: "Chapel",
    bg: Color::Rgb(250, 247, 240),
    fg: Color::Rgb(60, 52, 45),
    accent: Color::Rgb(142, 84, 58),
    muted: Color::Rgb(150, 140, 128),
    border: Color::Rgb(214, 202, 186),
    highlight_fg: Color::Rgb(250, 247, 240),
    highlight_bg: Color::Rgb(142, 84, 58),
    stripe_bg: Color::Rgb(243, 238, 228),
    status: Color::Rgb(92, 128, 96),
    error: Color::Rgb(178, 58, 52),
    key_fg: Color::Rgb(250, 247, 240),
    key_bg: Color::Rgb(120, 108, 96),
  },
  Theme {
    name: "Vespers",
    bg: Color::Rgb(28, 30, 38),
    fg: Color::Rgb(216, 218, 228),
    accent: Color::Rgb(198, 160, 246),
    muted: Color::Rgb(118, 122, 142),
    border: Color::Rgb(62, 66, 84),
    highlight_fg: Color::Rgb(28, 30, 38),
    highlight_bg: Color::Rgb(198, 160, 246),
    stripe_bg: Color::Rgb(34, 36, 46),
    status: Color::Rgb(148, 214, 170),
    error: Color::Rgb(240, 128, 128),
    key_fg: Color::Rgb(28, 30, 38),
    key_bg: Color::Rgb(138, 142, 168),
  },
  Theme {
    name: "Olive Grove",
    bg: Color::Rgb(242, 244, 234),
    fg: Color::Rgb(48, 56, 40),
    accent: Color::Rgb(96, 122, 58),
    muted: Color::Rgb(134, 142, 118),
    border: Color::Rgb(198, 206, 180),
    highlight_fg: Color::Rgb(242, 244, 234),
    highlight_bg: Color::Rgb(96, 122, 58),
    stripe_bg: Color::Rgb(234, 238, 222),
    status: Color::Rgb(70, 110, 140),
    error: Color::Rgb(170, 62, 50),
    key_fg: Color::Rgb(242, 244, 234),
    key_bg: Color::Rgb(112, 122, 96),
  },
  Theme {
    name: "Midnight Watch",
    bg: Color::Rgb(14, 20, 32),
    fg: Color::Rgb(200, 212, 230),
    accent: Color::Rgb(242, 196, 108),
    muted: Color::Rgb(104, 118, 140),
    border: Color::Rgb(44, 56, 78),
    highlight_fg: Color::Rgb(14, 20, 32),
    highlight_bg: Color::Rgb(242, 196, 108),
    stripe_bg: Color::Rgb(20, 27, 42),
    status: Color::Rgb(126, 200, 220),
    error: Color::Rgb(236, 112, 100),
    key_fg: Color::Rgb(14, 20, 32),
    key_bg: Color::Rgb(124, 138, 162),
  },
];
