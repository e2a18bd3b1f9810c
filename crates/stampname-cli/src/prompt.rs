use std::io::{self, BufRead, Write};

use stampname_core::description::Description;
use stampname_core::{ConflictChooser, Error, NameStyle, TimestampToken};

/// Read one line from stdin; `None` on end of input.
fn read_line(question: &str) -> io::Result<Option<String>> {
    eprint!("{}", question);
    io::stderr().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
}

/// Ask for the description until it is acceptable. End of input means none.
pub fn ask_description(strict: bool) -> anyhow::Result<String> {
    let style = if strict {
        NameStyle::Strict
    } else {
        NameStyle::Standard
    };

    loop {
        let Some(answer) =
            read_line("Enter a description of the files (may be blank), then press Return: ")?
        else {
            return Ok(String::new());
        };
        match Description::parse(&answer, style) {
            Ok(_) => return Ok(answer),
            Err(err) => eprintln!("{}", err),
        }
    }
}

/// Both candidates in the shape they would take in the new file name.
fn conflict_message(file: &str, name: &TimestampToken, metadata: &TimestampToken) -> String {
    format!(
        "{}: timestamps disagree\n  1) metadata: {}\n  2) name:     {}",
        file,
        metadata.render(NameStyle::Standard),
        name.render(NameStyle::Standard)
    )
}

/// Conflict chooser backed by the terminal.
#[derive(Debug, Default)]
pub struct StdinChooser;

impl ConflictChooser for StdinChooser {
    fn ask(
        &mut self,
        file: &str,
        name: &TimestampToken,
        metadata: &TimestampToken,
    ) -> Result<String, Error> {
        eprintln!("{}", conflict_message(file, name, metadata));
        read_line("select the metadata timestamp with 1, the name timestamp with 2: ")?
            .ok_or(Error::PromptClosed)
    }
}
