use owo_colors::OwoColorize;

use crate::types::Tone;

/// Line-oriented user-facing output.
pub trait Console {
    fn line(&mut self, tone: Tone, text: &str);
}

/// Stdout, colored when enabled.
#[derive(Debug, Clone, Copy)]
pub struct Terminal {
    color: bool,
}

impl Terminal {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl Console for Terminal {
    fn line(&mut self, tone: Tone, text: &str) {
        if !self.color {
            println!("{text}");
            return;
        }
        match tone {
            Tone::Neutral => println!("{text}"),
            Tone::Positive => println!("{}", text.bright_green()),
            Tone::Warning => println!("{}", text.yellow()),
            Tone::Negative => println!("{}", text.bright_red()),
        }
    }
}
