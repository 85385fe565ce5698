//! Welcome banner: "SUPPLIERS" in figlet's standard font, shaded left to right
//! from ledger blue to paid green.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rgb(u8, u8, u8);

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb {
            r: c.0,
            g: c.1,
            b: c.2,
        }
    }
}

const LEDGER_BLUE: Rgb = Rgb(0x1f, 0x4e, 0x9d);
const PAID_GREEN: Rgb = Rgb(0x2e, 0xa0, 0x5a);
const MUTED: Rgb = Rgb(0x8a, 0x8f, 0x98);

/// Colour at column `col` of a banner `width` columns wide.
fn shade(col: usize, width: usize) -> Rgb {
    if width <= 1 {
        return PAID_GREEN;
    }
    let t = col as f64 / (width - 1) as f64;
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    Rgb(
        mix(LEDGER_BLUE.0, PAID_GREEN.0),
        mix(LEDGER_BLUE.1, PAID_GREEN.1),
        mix(LEDGER_BLUE.2, PAID_GREEN.2),
    )
}

fn banner_art() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert("SUPPLIERS").map(|figure| figure.to_string()))
        .unwrap_or_else(|| "SUPPLIERS".to_string())
}

pub fn print_welcome() {
    let mut out = stdout();
    let art = banner_art();
    let width = art.lines().map(|l| l.chars().count()).max().unwrap_or(0);

    for line in art.lines() {
        for (col, ch) in line.chars().enumerate() {
            let _ = out.execute(SetForegroundColor(shade(col, width).into()));
            let _ = out.execute(Print(ch));
        }
        let _ = out.execute(Print("\r\n"));
    }

    let _ = out.execute(SetForegroundColor(MUTED.into()));
    let _ = out.execute(Print(format!(
        "invoice workspace setup & payment confirmations  v{}\r\n",
        env!("CARGO_PKG_VERSION")
    )));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shade_runs_blue_to_green() {
        assert_eq!(shade(0, 40), LEDGER_BLUE);
        assert_eq!(shade(39, 40), PAID_GREEN);
        assert_eq!(shade(0, 1), PAID_GREEN);
    }

    #[test]
    fn test_banner_art_is_multiline() {
        assert!(banner_art().lines().count() > 1);
    }
}
