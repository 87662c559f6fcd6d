use std::{
    collections::BTreeMap,
    io::{BufRead, Write},
};

use clap::Parser;
use deskwork::domain::{
    bank::{Account, AccountKind, Bank as BankModel, BankError, Client},
    BankSettings,
};
use tracing::instrument;

use crate::cli::prompt::{PromptError, Prompter};

/// Command arguments for `desk bank`.
#[derive(Debug, Parser, Default)]
pub struct Bank {
    /// Open the interactive menu instead of the scripted walkthrough
    #[arg(long, short)]
    interactive: bool,
}

impl Bank {
    #[instrument(skip(settings))]
    pub fn run(self, settings: &BankSettings) -> anyhow::Result<()> {
        let result = if self.interactive {
            menu(settings, &mut Prompter::stdio())
        } else {
            Ok(walkthrough(&mut std::io::stdout())?)
        };
        match result {
            Ok(()) | Err(PromptError::Eof) => Ok(()),
            Err(PromptError::Io(e)) => Err(e.into()),
        }
    }
}

fn walkthrough(out: &mut impl Write) -> std::io::Result<()> {
    let step = || -> Result<Vec<String>, BankError> {
        let mut log = Vec::new();
        let mut bank = BankModel::new();
        bank.register(Account::open(
            "SAV-001",
            Client::new("Adriel Sánchez", "1234567890"),
            500.0,
            AccountKind::Savings { annual_rate: 0.06 },
        )?)?;
        bank.register(Account::open(
            "CHK-001",
            Client::new("Ana Pérez", "0987654321"),
            100.0,
            AccountKind::Checking {
                overdraft_limit: 150.0,
                overdraft_fee: 1.0,
            },
        )?)?;

        log.push("-- Opening balances --".to_string());
        log.extend(bank.summaries());

        log.push(String::new());
        log.push("-- Deposit and withdrawal --".to_string());
        bank.account_mut("SAV-001")?.deposit(250.0)?;
        log.push("Deposited $250.00 into SAV-001.".to_string());
        bank.account_mut("CHK-001")?.withdraw(220.0)?;
        log.push("Withdrew $220.00 from CHK-001 (overdraft fee applies).".to_string());

        log.push(String::new());
        log.push("-- Transfer of $100.00 from SAV-001 to CHK-001 --".to_string());
        bank.transfer("SAV-001", "CHK-001", 100.0)?;

        log.push(String::new());
        log.push("-- Monthly interest --".to_string());
        for (number, interest) in bank.apply_interest_all() {
            log.push(format!("Interest credited to {number}: ${interest:.2}"));
        }

        log.push(String::new());
        log.push("-- Closing balances --".to_string());
        log.extend(bank.summaries());
        Ok(log)
    };

    writeln!(out, "=== Mini bank ===")?;
    match step() {
        Ok(lines) => {
            for line in lines {
                writeln!(out, "{line}")?;
            }
        }
        Err(e) => writeln!(out, "Walkthrough failed: {e}")?,
    }
    Ok(())
}

/// Runs the interactive banking menu until the user exits or input ends.
fn menu<R: BufRead, W: Write>(
    settings: &BankSettings,
    p: &mut Prompter<R, W>,
) -> Result<(), PromptError> {
    let mut bank = BankModel::new();
    let mut clients: BTreeMap<String, Client> = BTreeMap::new();

    loop {
        p.say("")?;
        p.say("1) New client  2) New account  3) Deposit  4) Withdraw")?;
        p.say("5) Transfer  6) Apply interest  7) List accounts  0) Exit")?;
        let outcome = match p.line("Option: ")?.as_str() {
            "1" => {
                let name = p.text("Client name: ")?;
                let national_id = p.text("National id: ")?;
                if clients.contains_key(&national_id) {
                    Err("a client with that id already exists".to_string())
                } else {
                    clients.insert(national_id.clone(), Client::new(name, national_id));
                    Ok("Client created.".to_string())
                }
            }
            "2" => {
                let national_id = p.text("Holder's national id: ")?;
                match clients.get(&national_id).cloned() {
                    None => Err("no client with that id".to_string()),
                    Some(holder) => {
                        let number = p.text("Account number: ")?;
                        let kind = loop {
                            let answer = p.line("Type, (s)avings or (c)hecking: ")?;
                            match answer.to_lowercase().as_str() {
                                "s" | "savings" => {
                                    break AccountKind::Savings {
                                        annual_rate: settings.annual_rate,
                                    };
                                }
                                "c" | "checking" => {
                                    break AccountKind::Checking {
                                        overdraft_limit: settings.overdraft_limit,
                                        overdraft_fee: settings.overdraft_fee,
                                    };
                                }
                                _ => p.warn("Answer s or c.")?,
                            }
                        };
                        let opening = p.decimal("Opening balance: ", Some(0.0))?;
                        Account::open(number, holder, opening, kind)
                            .and_then(|account| bank.register(account))
                            .map(|()| "Account opened.".to_string())
                            .map_err(|e| e.to_string())
                    }
                }
            }
            "3" => {
                let number = p.text("Account number: ")?;
                let amount = p.decimal("Amount: ", None)?;
                bank.account_mut(&number)
                    .and_then(|account| account.deposit(amount))
                    .map(|()| "Deposit done.".to_string())
                    .map_err(|e| e.to_string())
            }
            "4" => {
                let number = p.text("Account number: ")?;
                let amount = p.decimal("Amount: ", None)?;
                bank.account_mut(&number)
                    .and_then(|account| account.withdraw(amount))
                    .map(|()| "Withdrawal done.".to_string())
                    .map_err(|e| e.to_string())
            }
            "5" => {
                let from = p.text("From account: ")?;
                let to = p.text("To account: ")?;
                let amount = p.decimal("Amount: ", None)?;
                bank.transfer(&from, &to, amount)
                    .map(|()| "Transfer done.".to_string())
                    .map_err(|e| e.to_string())
            }
            "6" => {
                for (number, interest) in bank.apply_interest_all() {
                    p.say(format!("Interest credited to {number}: ${interest:.2}"))?;
                }
                Ok("Interest applied.".to_string())
            }
            "7" => {
                if bank.is_empty() {
                    p.say("No accounts yet.")?;
                }
                for summary in bank.summaries() {
                    p.say(summary)?;
                }
                continue;
            }
            "0" => {
                p.say("Goodbye!")?;
                return Ok(());
            }
            _ => Err("invalid option".to_string()),
        };

        match outcome {
            Ok(message) => p.success(&message)?,
            Err(message) => p.failure(&message)?,
        }
    }
}
