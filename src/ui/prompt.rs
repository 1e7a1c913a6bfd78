//! Interactive console input.

use std::{
    io::{self, BufRead, Write},
    num::NonZeroU32,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error("input closed before {0} was entered")]
    Closed(&'static str),
    #[error("invalid {label}: '{input}' is not a whole number{hint}")]
    Invalid {
        label: &'static str,
        input: String,
        hint: &'static str,
    },
}

/// Asks for a non-negative whole number. Empty input falls back to `default` when set.
pub fn prompt_number<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &'static str,
    question: &str,
    default: Option<u32>,
) -> Result<u32, PromptError> {
    match default {
        Some(value) => writeln!(output, "{question} [{value}]: ")?,
        None => writeln!(output, "{question}: ")?,
    }
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return default.ok_or(PromptError::Closed(label));
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        if let Some(value) = default {
            return Ok(value);
        }
    }

    trimmed.parse::<u32>().map_err(|_| PromptError::Invalid {
        label,
        input: trimmed.to_string(),
        hint: "",
    })
}

pub fn prompt_hotm_level<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    default: Option<u32>,
) -> Result<u32, PromptError> {
    prompt_number(input, output, "HOTM level", "Enter your HOTM Level", default)
}

pub fn prompt_forge_slots<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    default: Option<u32>,
) -> Result<NonZeroU32, PromptError> {
    let default = default.filter(|slots| *slots > 0);
    let slots = prompt_number(
        input,
        output,
        "forge slot count",
        "Enter how many forge slots you have",
        default,
    )?;
    NonZeroU32::new(slots).ok_or_else(|| PromptError::Invalid {
        label: "forge slot count",
        input: slots.to_string(),
        hint: " of at least 1",
    })
}

/// Blocks until the user presses ENTER (or input closes).
pub fn wait_for_enter<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<()> {
    writeln!(output, "Press ENTER to end program")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reads_trimmed_number() {
        let mut input = Cursor::new("  7 \n");
        let mut output = Vec::new();

        let level = prompt_hotm_level(&mut input, &mut output, None).unwrap();

        assert_eq!(level, 7);
        assert_eq!(String::from_utf8(output).unwrap(), "Enter your HOTM Level: \n");
    }

    #[test]
    fn empty_line_uses_remembered_value() {
        let mut input = Cursor::new("\n");
        let mut output = Vec::new();

        let level = prompt_hotm_level(&mut input, &mut output, Some(5)).unwrap();

        assert_eq!(level, 5);
        assert!(String::from_utf8(output).unwrap().contains("[5]"));
    }

    #[test]
    fn rejects_text_and_negative_numbers() {
        for raw in ["seven\n", "-1\n", "\n"] {
            let mut input = Cursor::new(raw);
            let result = prompt_hotm_level(&mut input, &mut io::sink(), None);
            assert!(matches!(result, Err(PromptError::Invalid { .. })), "{raw:?}");
        }
    }

    #[test]
    fn zero_slots_are_rejected() {
        let mut input = Cursor::new("0\n");
        let result = prompt_forge_slots(&mut input, &mut io::sink(), None);
        assert!(matches!(result, Err(PromptError::Invalid { .. })));

        let mut input = Cursor::new("3\n");
        let slots = prompt_forge_slots(&mut input, &mut io::sink(), Some(0)).unwrap();
        assert_eq!(slots.get(), 3);
    }

    #[test]
    fn closed_input_without_default_is_an_error() {
        let mut input = Cursor::new("");
        let result = prompt_forge_slots(&mut input, &mut io::sink(), None);
        assert!(matches!(result, Err(PromptError::Closed(_))));
    }
}
