use std::io::{BufRead, Write};

use clap::Parser;
use deskwork::domain::weather::{AveragePolicy, Temperature, Week, DAYS};
use tracing::instrument;

use crate::cli::prompt::{PromptError, Prompter};

/// Command arguments for `desk weather`.
#[derive(Debug, Parser, Default)]
pub struct Weather {
    /// Allow days without a reading and average the rest
    #[arg(long)]
    lenient: bool,
}

impl Weather {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        match self.interact(&mut Prompter::stdio()) {
            Ok(()) | Err(PromptError::Eof) => Ok(()),
            Err(PromptError::Io(e)) => Err(e.into()),
        }
    }

    const fn policy(&self) -> AveragePolicy {
        if self.lenient {
            AveragePolicy::Lenient
        } else {
            AveragePolicy::Strict
        }
    }

    fn interact<R: BufRead, W: Write>(self, p: &mut Prompter<R, W>) -> Result<(), PromptError> {
        p.say("=== Weekly temperatures ===")?;
        if self.lenient {
            p.say("Leave a day blank to skip it.")?;
        }

        let mut week = Week::new();
        for (index, day) in DAYS.iter().enumerate() {
            let prompt = format!("Temperature (°C) for {day}: ");
            loop {
                let reading = if self.lenient {
                    p.optional_decimal(&prompt, None)?
                } else {
                    Some(p.decimal(&prompt, None)?)
                };
                let Some(celsius) = reading else { break };
                match Temperature::new(celsius) {
                    Ok(temperature) => {
                        if let Err(e) = week.set(index, temperature) {
                            tracing::warn!("{e}");
                        }
                        break;
                    }
                    Err(e) => p.warn(&e.to_string())?,
                }
            }
        }

        p.say("")?;
        p.say("=== Summary ===")?;
        p.say(week.summary(self.policy()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::prompt::tests::{output, scripted};

    #[test]
    fn strict_run_averages_full_week() {
        let mut prompter = scripted("20\n21\n22\n23,5\n24\n25\n26\n");

        Weather::default().interact(&mut prompter).unwrap();

        assert!(output(&prompter).contains("Weekly average: 23.07 °C"));
    }

    #[test]
    fn lenient_run_skips_blank_days() {
        let mut prompter = scripted("22\n\n\n\n\n\n24,5\n");

        Weather { lenient: true }.interact(&mut prompter).unwrap();

        let text = output(&prompter);
        assert!(text.contains("Tuesday: no reading"));
        assert!(text.contains("Weekly average: 23.25 °C"));
    }

    #[test]
    fn out_of_range_reading_is_asked_again() {
        let mut prompter = scripted("99\n20\n20\n20\n20\n20\n20\n20\n");

        Weather::default().interact(&mut prompter).unwrap();

        let text = output(&prompter);
        assert!(text.contains("temperature out of range"));
        assert!(text.contains("Weekly average: 20.00 °C"));
    }
}
