//! Line-based command interface (USB serial).
//!
//! ```text
//! rgb <r> <g> <b>            r, g, b in 0..=255
//! hsv <h> <s> <v>            h in 0..=360, s, v in 0..=100
//! add_current_color <name>   save the current colour under <name>
//! apply_color <name>         switch to a saved colour
//! list_colors                show saved colours
//! help                       this text
//! ```
//!
//! Arguments are validated here; the mode controller only ever sees legal
//! values. Every line produces exactly one reply or one error.

use core::fmt::{self, Write};
use core::num::IntErrorKind;
use core::str::SplitAsciiWhitespace;

use crate::color::{rgb_to_hsv, Color, Hsv, Rgb};
use crate::error::{Error, ValidationError};
use crate::mode::ModeController;
use crate::persistence::{validate_name, ColorName, PersistenceGateway, SavedColor, SavedColorList};
use heapless::{String, Vec};

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

pub const HELP: &str = "\
Commands:\r
  rgb <r> <g> <b>           set color, each 0-255\r
  hsv <h> <s> <v>           set color, h 0-360, s/v 0-100\r
  add_current_color <name>  save current color (max 31 chars)\r
  apply_color <name>        switch to a saved color\r
  list_colors               list saved colors\r
  help                      show this text\r
";

/// Accumulates serial bytes into command lines.
pub struct LineBuffer<const N: usize> {
    line: String<N>,
    overflowed: bool,
}

impl<const N: usize> LineBuffer<N> {
    pub const fn new() -> Self {
        Self {
            line: String::new(),
            overflowed: false,
        }
    }

    /// Feed one byte. Returns a finished line on CR or LF.
    ///
    /// Blank lines are swallowed; a line that outgrew the buffer is reported
    /// as `LineTooLong` once its terminator arrives.
    pub fn push(&mut self, byte: u8) -> Option<Result<String<N>, ValidationError>> {
        match byte {
            b'\r' | b'\n' => {
                let overflowed = core::mem::replace(&mut self.overflowed, false);
                let line = core::mem::take(&mut self.line);
                if overflowed {
                    Some(Err(ValidationError::LineTooLong))
                } else if line.trim().is_empty() {
                    None
                } else {
                    Some(Ok(line))
                }
            }
            BACKSPACE | DELETE => {
                self.line.pop();
                None
            }
            b' '..=b'~' => {
                if self.line.push(byte as char).is_err() {
                    self.overflowed = true;
                }
                None
            }
            // Other control and non-ASCII bytes are ignored.
            _ => None,
        }
    }

    /// Bytes collected for the line in progress.
    pub fn pending(&self) -> &str {
        &self.line
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// A validated command.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Rgb(Rgb),
    Hsv(Hsv),
    AddCurrentColor(ColorName),
    ApplyColor(ColorName),
    ListColors,
    Help,
}

/// Parse one command line.
pub fn parse_command(line: &str) -> Result<Command, Error> {
    let mut words = line.split_ascii_whitespace();
    let keyword = words.next().ok_or(Error::UnknownCommand)?;

    match keyword {
        "rgb" => {
            let [r, g, b] = numbers::<3>(words)?;
            Ok(Command::Rgb(Rgb::try_from_parts(r, g, b)?))
        }
        "hsv" => {
            let [h, s, v] = numbers::<3>(words)?;
            Ok(Command::Hsv(Hsv::try_from_parts(h, s, v)?))
        }
        "add_current_color" => {
            let [name] = arguments::<1>(words)?;
            Ok(Command::AddCurrentColor(validate_name(name)?))
        }
        "apply_color" => {
            let [name] = arguments::<1>(words)?;
            Ok(Command::ApplyColor(validate_name(name)?))
        }
        "list_colors" => {
            let [] = arguments::<0>(words)?;
            Ok(Command::ListColors)
        }
        "help" => {
            let [] = arguments::<0>(words)?;
            Ok(Command::Help)
        }
        _ => Err(Error::UnknownCommand),
    }
}

/// Exactly `K` arguments, or `ArgCount`.
fn arguments<'a, const K: usize>(
    words: SplitAsciiWhitespace<'a>,
) -> Result<[&'a str; K], ValidationError> {
    let arg_count = ValidationError::ArgCount { expected: K as u8 };
    // One spare slot to notice extra arguments.
    let mut collected: Vec<&str, 4> = Vec::new();
    for word in words {
        collected.push(word).map_err(|_| arg_count)?;
    }
    if collected.len() != K {
        return Err(arg_count);
    }
    let mut out = [""; K];
    out.copy_from_slice(&collected);
    Ok(out)
}

fn numbers<const K: usize>(words: SplitAsciiWhitespace<'_>) -> Result<[u32; K], ValidationError> {
    let args = arguments::<K>(words)?;
    let mut out = [0u32; K];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = match arg.parse::<u32>() {
            Ok(n) => n,
            // Still a number: let the range check report it.
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => u32::MAX,
            Err(_) => return Err(ValidationError::NotANumber),
        };
    }
    Ok(out)
}

/// Successful outcome of a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    ColorSet(Color),
    ColorSaved(SavedColor),
    ColorApplied(SavedColor),
    Colors(SavedColorList),
    Help,
}

/// Run a parsed command against the controller and storage.
pub fn execute(
    command: Command,
    ctrl: &mut ModeController,
    gateway: &mut impl PersistenceGateway,
) -> Result<Reply, Error> {
    match command {
        Command::Rgb(rgb) => {
            ctrl.set_rgb(rgb);
            Ok(Reply::ColorSet(*ctrl.color()))
        }
        Command::Hsv(hsv) => {
            ctrl.set_hsv(hsv);
            Ok(Reply::ColorSet(*ctrl.color()))
        }
        Command::AddCurrentColor(name) => {
            let rgb = ctrl.color().rgb();
            gateway.save_named_color(&name, rgb)?;
            log_info!("Saved color '{}'", name.as_str());
            Ok(Reply::ColorSaved(SavedColor { name, rgb }))
        }
        Command::ApplyColor(name) => {
            let colors = gateway.list_saved_colors();
            let saved = colors.find(&name).ok_or(Error::NotFound)?;
            ctrl.set_rgb(saved.rgb);
            Ok(Reply::ColorApplied(saved.clone()))
        }
        Command::ListColors => Ok(Reply::Colors(gateway.list_saved_colors())),
        Command::Help => Ok(Reply::Help),
    }
}

/// Parse, execute and format one line in a single step.
pub fn handle_line(
    line: &str,
    ctrl: &mut ModeController,
    gateway: &mut impl PersistenceGateway,
    out: &mut impl Write,
) -> fmt::Result {
    match parse_command(line).and_then(|cmd| execute(cmd, ctrl, gateway)) {
        Ok(reply) => write_reply(&reply, out),
        Err(e) => {
            log_warn!("Command failed: {}", e);
            write_error(&e, out)
        }
    }
}

pub fn write_reply(reply: &Reply, out: &mut impl Write) -> fmt::Result {
    match reply {
        Reply::ColorSet(color) => {
            let (rgb, hsv) = (color.rgb(), color.hsv());
            write!(
                out,
                "OK rgb {} {} {} hsv {} {} {}\r\n",
                rgb.red, rgb.green, rgb.blue, hsv.hue, hsv.saturation, hsv.value
            )
        }
        Reply::ColorSaved(saved) => write_saved(out, "OK saved", saved),
        Reply::ColorApplied(saved) => write_saved(out, "OK applied", saved),
        Reply::Colors(colors) if colors.is_empty() => out.write_str("no saved colors\r\n"),
        Reply::Colors(colors) => {
            for saved in colors.iter() {
                let hsv = rgb_to_hsv(saved.rgb);
                write!(
                    out,
                    "{}: rgb {} {} {} hsv {} {} {}\r\n",
                    saved.name, saved.rgb.red, saved.rgb.green, saved.rgb.blue,
                    hsv.hue, hsv.saturation, hsv.value
                )?;
            }
            Ok(())
        }
        Reply::Help => out.write_str(HELP),
    }
}

fn write_saved(out: &mut impl Write, verb: &str, saved: &SavedColor) -> fmt::Result {
    let rgb = saved.rgb;
    write!(
        out,
        "{} '{}' rgb {} {} {}\r\n",
        verb, saved.name, rgb.red, rgb.green, rgb.blue
    )
}

pub fn write_error(error: &Error, out: &mut impl Write) -> fmt::Result {
    write!(out, "ERROR: {}\r\n", error)
}
