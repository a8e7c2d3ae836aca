// src/control/commands.rs

use std::str::FromStr;

use crate::entry::Rgba;
use crate::error::PatternError;

/// One parsed line of the control stream.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Start,
    Stop,
    Push(f64),
    Name(String),
    Freq(i64),
    Color(Rgba),
    Avg(i64),
    Fill(bool),
    Rev(bool),
}

impl Command {
    /// Protocol verb, uppercase.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "START",
            Command::Stop => "STOP",
            Command::Push(_) => "PUSH",
            Command::Name(_) => "NAME",
            Command::Freq(_) => "FREQ",
            Command::Color(_) => "COLOR",
            Command::Avg(_) => "AVG",
            Command::Fill(_) => "FILL",
            Command::Rev(_) => "REV",
        }
    }
}

fn required<'a>(command: &'static str, arg: Option<&'a str>) -> Result<&'a str, PatternError> {
    arg.ok_or(PatternError::MissingArgument(command))
}

fn number<T: FromStr>(command: &'static str, arg: Option<&str>) -> Result<T, PatternError> {
    let value = required(command, arg)?;
    value.trim().parse().map_err(|_| PatternError::InvalidArgument {
        command,
        value: value.to_string(),
    })
}

/// Integer flag: any non-zero value switches on.
fn flag(command: &'static str, arg: Option<&str>) -> Result<bool, PatternError> {
    number::<i64>(command, arg).map(|v| v != 0)
}

impl FromStr for Command {
    type Err = PatternError;

    /// `VERB[ ARG]`, verb case-insensitive, trailing whitespace ignored.
    /// Everything after the first space is the argument.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end();
        let (verb, arg) = match line.split_once(' ') {
            Some((verb, arg)) => (verb, Some(arg)),
            None => (line, None),
        };

        let command = match verb.to_ascii_uppercase().as_str() {
            "START" => Command::Start,
            "STOP" => Command::Stop,
            "PUSH" => Command::Push(number("PUSH", arg)?),
            "NAME" => Command::Name(arg.unwrap_or_default().to_string()),
            "FREQ" => Command::Freq(number("FREQ", arg)?),
            "COLOR" => {
                let value = required("COLOR", arg)?;
                let color = value.parse().map_err(|_| PatternError::InvalidArgument {
                    command: "COLOR",
                    value: value.to_string(),
                })?;
                Command::Color(color)
            }
            "AVG" => Command::Avg(number("AVG", arg)?),
            "FILL" => Command::Fill(flag("FILL", arg)?),
            "REV" => Command::Rev(flag("REV", arg)?),
            _ => return Err(PatternError::UnknownCommand(verb.to_string())),
        };
        Ok(command)
    }
}
