//! Line-oriented console input.
//!
//! Every interactive program reads through a [`Prompter`], which re-asks on
//! invalid input and reports end of input as [`PromptError::Eof`] so menus
//! can exit cleanly.

use std::{
    fmt::Display,
    io::{self, BufRead, StdinLock, Stdout, Write},
};

use crate::cli::terminal::Colorize;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("end of input")]
    Eof,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Parses a decimal number, accepting `,` as the decimal separator.
pub fn parse_decimal(input: &str) -> Result<f64, String> {
    let value: f64 = input
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("'{}' is not a number", input.trim()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("'{}' is not a finite number", input.trim()))
    }
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Writes one line of output.
    pub fn say(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }

    pub fn success(&mut self, text: &str) -> io::Result<()> {
        self.say(format!("✅ {text}").success())
    }

    pub fn failure(&mut self, text: &str) -> io::Result<()> {
        self.say(format!("❌ {text}").warning())
    }

    pub fn warn(&mut self, text: &str) -> io::Result<()> {
        self.say(format!("⚠️  {text}").warning())
    }

    /// Shows `prompt` and reads one trimmed line.
    pub fn line(&mut self, prompt: &str) -> Result<String, PromptError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut buffer = String::new();
        if self.input.read_line(&mut buffer)? == 0 {
            writeln!(self.output)?;
            return Err(PromptError::Eof);
        }
        Ok(buffer.trim().to_string())
    }

    /// Waits for Enter.
    pub fn pause(&mut self, prompt: &str) -> Result<(), PromptError> {
        self.line(prompt).map(drop)
    }

    /// Reads a non-empty line.
    pub fn text(&mut self, prompt: &str) -> Result<String, PromptError> {
        loop {
            let answer = self.line(prompt)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            self.warn("This field is required.")?;
        }
    }

    /// Reads a line, returning `None` if it is blank.
    pub fn optional_text(&mut self, prompt: &str) -> Result<Option<String>, PromptError> {
        let answer = self.line(prompt)?;
        Ok((!answer.is_empty()).then_some(answer))
    }

    /// Reads a value, re-asking until `parse` accepts it.
    ///
    /// A blank answer is returned as `None` when `optional` is set.
    fn parsed<T>(
        &mut self,
        prompt: &str,
        optional: bool,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<Option<T>, PromptError> {
        loop {
            let answer = self.line(prompt)?;
            if answer.is_empty() && optional {
                return Ok(None);
            }
            match parse(&answer) {
                Ok(value) => return Ok(Some(value)),
                Err(reason) => self.warn(&format!("Invalid input: {reason}."))?,
            }
        }
    }

    /// Reads a whole number no smaller than `min`.
    pub fn integer(&mut self, prompt: &str, min: Option<i64>) -> Result<i64, PromptError> {
        self.parsed(prompt, false, |s| parse_integer(s, min))
            .map(|value| value.unwrap_or_default())
    }

    /// Like [`Self::integer`], but blank means "no value".
    pub fn optional_integer(
        &mut self,
        prompt: &str,
        min: Option<i64>,
    ) -> Result<Option<i64>, PromptError> {
        self.parsed(prompt, true, |s| parse_integer(s, min))
    }

    /// Reads a decimal number no smaller than `min`.
    pub fn decimal(&mut self, prompt: &str, min: Option<f64>) -> Result<f64, PromptError> {
        self.parsed(prompt, false, |s| parse_bounded_decimal(s, min))
            .map(|value| value.unwrap_or_default())
    }

    /// Like [`Self::decimal`], but blank means "no value".
    pub fn optional_decimal(
        &mut self,
        prompt: &str,
        min: Option<f64>,
    ) -> Result<Option<f64>, PromptError> {
        self.parsed(prompt, true, |s| parse_bounded_decimal(s, min))
    }

    /// Reads a menu choice between `1` and `count`, or `0`.
    pub fn choice(&mut self, prompt: &str, count: usize) -> Result<usize, PromptError> {
        self.parsed(prompt, false, |s| {
            let value: usize = s
                .parse()
                .map_err(|_| "enter the number of an option".to_string())?;
            if value <= count {
                Ok(value)
            } else {
                Err(format!("choose between 0 and {count}"))
            }
        })
        .map(|value| value.unwrap_or_default())
    }

    /// Asks a yes/no question. Only `y` or `yes` count as yes.
    pub fn confirm(&mut self, prompt: &str) -> Result<bool, PromptError> {
        let answer = self.line(&format!("{prompt} (y/N) "))?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }
}

fn parse_integer(input: &str, min: Option<i64>) -> Result<i64, String> {
    let value: i64 = input
        .parse()
        .map_err(|_| format!("'{input}' is not a whole number"))?;
    match min {
        Some(min) if value < min => Err(format!("must be at least {min}")),
        _ => Ok(value),
    }
}

fn parse_bounded_decimal(input: &str, min: Option<f64>) -> Result<f64, String> {
    let value = parse_decimal(input)?;
    match min {
        Some(min) if value < min => Err(format!("must be at least {min}")),
        _ => Ok(value),
    }
}

#[cfg(test)]
pub mod tests {
    use std::io::Cursor;

    use test_case::test_case;

    use super::*;

    pub type Scripted = Prompter<Cursor<Vec<u8>>, Vec<u8>>;

    /// A prompter fed with `input`; its output is kept for inspection.
    pub fn scripted(input: &str) -> Scripted {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    pub fn output(prompter: &Scripted) -> String {
        String::from_utf8_lossy(&prompter.output).into_owned()
    }

    #[test_case("2.5", 2.5; "dot")]
    #[test_case("2,5", 2.5; "comma")]
    #[test_case(" 10 ", 10.0; "padded integer")]
    fn decimals_accept_either_separator(input: &str, expected: f64) {
        assert!((parse_decimal(input).unwrap() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn non_finite_decimals_are_rejected() {
        assert!(parse_decimal("inf").is_err());
        assert!(parse_decimal("NaN").is_err());
    }

    #[test]
    fn integer_reasks_until_valid() {
        let mut prompter = scripted("abc\n-3\n7\n");

        assert_eq!(prompter.integer("Quantity: ", Some(0)).unwrap(), 7);
        assert_eq!(output(&prompter).matches("Invalid input").count(), 2);
    }

    #[test]
    fn optional_decimal_treats_blank_as_none() {
        let mut prompter = scripted("\n");
        assert_eq!(prompter.optional_decimal("Price: ", Some(0.0)).unwrap(), None);
    }

    #[test]
    fn end_of_input_is_reported() {
        let mut prompter = scripted("");
        assert!(matches!(prompter.text("Name: "), Err(PromptError::Eof)));
    }

    #[test]
    fn text_requires_a_value() {
        let mut prompter = scripted("\n  \nAna\n");
        assert_eq!(prompter.text("Name: ").unwrap(), "Ana");
    }

    #[test]
    fn choice_is_bounded() {
        let mut prompter = scripted("7\nx\n3\n");
        assert_eq!(prompter.choice("> ", 4).unwrap(), 3);
    }
}
