// src/gcode.rs - local syntax check for the line-oriented G-code dialect
//
// Validation happens before a command ever reaches the wire; nothing here
// generates or interprets G-code.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GcodeError {
    #[error("invalid G-code at line {line}: {reason}")]
    Invalid { line: usize, reason: String },
}

/// Check a whole command sequence. The first offending command fails with
/// its 1-based position.
pub fn check_program<'a, I>(commands: I) -> Result<(), GcodeError>
where
    I: IntoIterator<Item = &'a str>,
{
    for (index, command) in commands.into_iter().enumerate() {
        check_at(command, index + 1)?;
    }
    Ok(())
}

/// Check a single command line.
pub fn check_line(command: &str) -> Result<(), GcodeError> {
    check_at(command, 1)
}

fn check_at(command: &str, line: usize) -> Result<(), GcodeError> {
    let invalid = |reason: String| GcodeError::Invalid { line, reason };

    // Comments run from the first ';' to end of line.
    let code = match command.find(';') {
        Some(at) => &command[..at],
        None => command,
    };
    let code = code.trim();
    if code.is_empty() {
        // Blank lines and pure comments are legal filler.
        return Ok(());
    }

    let mut words = code.split_ascii_whitespace();
    let head = words.next().unwrap_or_default();
    let (letter, number) = split_word(head)
        .ok_or_else(|| invalid(format!("malformed command word '{head}'")))?;
    if !matches!(letter, 'G' | 'M' | 'T' | 'N') {
        return Err(invalid(format!("unknown command letter '{letter}'")));
    }
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Err(invalid(format!("command word '{head}' needs a numeric code")));
    }

    // M117 (display message) takes free text, everything else takes
    // letter-plus-value parameter words.
    if letter == 'M' && number == "117" {
        return Ok(());
    }

    for word in words {
        let (_, value) = split_word(word)
            .ok_or_else(|| invalid(format!("malformed parameter '{word}'")))?;
        if !value.is_empty() && !is_number(value) {
            return Err(invalid(format!("parameter '{word}' has a non-numeric value")));
        }
    }
    Ok(())
}

fn split_word(word: &str) -> Option<(char, &str)> {
    let mut chars = word.chars();
    let letter = chars.next()?;
    if !letter.is_ascii_alphabetic() {
        return None;
    }
    Some((letter.to_ascii_uppercase(), chars.as_str()))
}

fn is_number(value: &str) -> bool {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && digits.bytes().filter(|b| *b == b'.').count() <= 1
}
