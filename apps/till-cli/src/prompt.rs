//! Terminal yes/no confirmation.

use std::io::{self, BufRead, Write};
use till_core::Prompt;
use tracing::warn;

/// Confirmer reading the answer from stdin. With `assume_yes` every prompt is
/// accepted without reading.
pub fn terminal_confirm(assume_yes: bool) -> impl FnMut(&Prompt) -> bool {
    move |prompt: &Prompt| {
        if assume_yes {
            println!("{prompt} s (--yes)");
            return true;
        }

        let stdin = io::stdin();
        let stdout = io::stdout();
        match ask(prompt, &mut stdin.lock(), &mut stdout.lock()) {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, prompt = prompt.key(), "Could not read confirmation, treating as no");
                false
            }
        }
    }
}

/// Writes the prompt and reads one line. Only an explicit yes confirms;
/// end of input counts as no.
pub fn ask<R: BufRead, W: Write>(prompt: &Prompt, input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "{prompt} [s/N] ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }

    Ok(matches!(
        line.trim().to_lowercase().as_str(),
        "s" | "sim" | "y" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn answer(text: &str) -> bool {
        let mut output = Vec::new();
        ask(&Prompt::Close, &mut Cursor::new(text), &mut output).unwrap()
    }

    #[test]
    fn test_only_explicit_yes_confirms() {
        assert!(answer("s\n"));
        assert!(answer("SIM\n"));
        assert!(answer(" y \n"));
        assert!(!answer("n\n"));
        assert!(!answer("\n"));
        assert!(!answer(""));
    }

    #[test]
    fn test_prompt_is_written() {
        let mut output = Vec::new();
        ask(&Prompt::Close, &mut Cursor::new("n\n"), &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Fechar caixa e gerar relatório? [s/N] "
        );
    }
}
