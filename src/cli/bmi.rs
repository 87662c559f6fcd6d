use std::io::{BufRead, Write};

use clap::Parser;
use deskwork::domain::bmi::{BmiError, BmiReport};
use tracing::instrument;

use crate::cli::prompt::{parse_decimal, PromptError, Prompter};

/// Command arguments for `desk bmi`.
///
/// Values not given on the command line are asked for.
#[derive(Debug, Parser, Default)]
pub struct Bmi {
    /// Name of the person
    #[arg(long)]
    name: Option<String>,

    /// Age in years
    #[arg(long)]
    age: Option<u32>,

    /// Weight in kilograms
    #[arg(long, value_parser = parse_decimal)]
    weight: Option<f64>,

    /// Height in metres
    #[arg(long, value_parser = parse_decimal)]
    height: Option<f64>,
}

impl Bmi {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        match self.interact(&mut Prompter::stdio()) {
            Ok(()) | Err(PromptError::Eof) => Ok(()),
            Err(PromptError::Io(e)) => Err(e.into()),
        }
    }

    fn interact<R: BufRead, W: Write>(self, p: &mut Prompter<R, W>) -> Result<(), PromptError> {
        p.say("=== BMI calculator ===")?;
        let name = match self.name {
            Some(name) => name,
            None => p.text("Name: ")?,
        };
        let age = match self.age {
            Some(age) => age,
            None => u32::try_from(p.integer("Age (years): ", Some(0))?).unwrap_or(u32::MAX),
        };
        let mut weight = self.weight;
        let mut height = self.height;

        loop {
            let w = match weight {
                Some(w) => w,
                None => p.decimal("Weight (kg): ", Some(0.0))?,
            };
            let h = match height {
                Some(h) => h,
                None => p.decimal("Height (m): ", Some(0.0))?,
            };
            match BmiReport::new(name.clone(), age, w, h) {
                Ok(report) => {
                    p.say("")?;
                    p.say(report)?;
                    return Ok(());
                }
                Err(e) => {
                    p.warn(&e.to_string())?;
                    match e {
                        BmiError::Height(_) => height = None,
                        BmiError::Weight(_) => weight = None,
                    }
                }
            }
        }
    }
}
