//! A miniature bank: clients, two kinds of account and transfers between
//! them.
//!
//! Account behaviour differs only in how withdrawals and interest work, so
//! the kind is a tagged variant on a single [`Account`] type and the rules
//! branch on it.

use std::{collections::BTreeMap, fmt};

use crate::domain::item::round_cents;

/// Default annual rate for new savings accounts.
pub const DEFAULT_ANNUAL_RATE: f64 = 0.05;
/// Default overdraft limit for new checking accounts.
pub const DEFAULT_OVERDRAFT_LIMIT: f64 = 200.0;
/// Default fee charged when a checking account goes negative.
pub const DEFAULT_OVERDRAFT_FEE: f64 = 1.0;

/// Errors raised by account and bank operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BankError {
    /// Deposits, withdrawals and transfers must move a positive amount.
    #[error("the amount must be greater than zero (got {0:.2})")]
    InvalidAmount(f64),

    /// Opening balances, rates, limits and fees cannot be negative.
    #[error("{field} cannot be negative (got {value:.2})")]
    NegativeSetting {
        /// Which setting was rejected.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A savings account cannot go below zero.
    #[error("insufficient funds in savings account {0}")]
    InsufficientFunds(String),

    /// A checking account cannot go below its overdraft limit.
    #[error("overdraft limit exceeded on checking account {0}")]
    OverdraftExceeded(String),

    /// The account number is taken.
    #[error("account {0} already exists")]
    DuplicateAccount(String),

    /// No account has this number.
    #[error("no account with number {0}")]
    UnknownAccount(String),

    /// Source and destination of a transfer are the same account.
    #[error("cannot transfer from account {0} to itself")]
    SameAccount(String),
}

/// An account holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    /// Full name.
    pub name: String,
    /// National identity number.
    pub national_id: String,
}

impl Client {
    /// Creates a client.
    #[must_use]
    pub fn new(name: impl Into<String>, national_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            national_id: national_id.into(),
        }
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID: {})", self.name, self.national_id)
    }
}

/// The rules an account follows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AccountKind {
    /// No overdraft; earns simple monthly interest.
    Savings {
        /// Yearly interest rate, e.g. `0.05` for 5 %.
        annual_rate: f64,
    },
    /// May go negative down to `-overdraft_limit`; earns no interest.
    Checking {
        /// How far below zero the balance may go.
        overdraft_limit: f64,
        /// Charged after any withdrawal that leaves the balance negative.
        overdraft_fee: f64,
    },
}

impl AccountKind {
    /// A savings account with the default rate.
    #[must_use]
    pub const fn savings() -> Self {
        Self::Savings {
            annual_rate: DEFAULT_ANNUAL_RATE,
        }
    }

    /// A checking account with the default limit and fee.
    #[must_use]
    pub const fn checking() -> Self {
        Self::Checking {
            overdraft_limit: DEFAULT_OVERDRAFT_LIMIT,
            overdraft_fee: DEFAULT_OVERDRAFT_FEE,
        }
    }

    fn validate(self) -> Result<Self, BankError> {
        match self {
            Self::Savings { annual_rate } => {
                non_negative("annual rate", annual_rate)?;
            }
            Self::Checking {
                overdraft_limit,
                overdraft_fee,
            } => {
                non_negative("overdraft limit", overdraft_limit)?;
                non_negative("overdraft fee", overdraft_fee)?;
            }
        }
        Ok(self)
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Savings { .. } => "Savings",
            Self::Checking { .. } => "Checking",
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, BankError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(BankError::NegativeSetting { field, value })
    }
}

fn positive(amount: f64) -> Result<f64, BankError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(BankError::InvalidAmount(amount))
    }
}

/// A bank account. The balance only changes through the methods below.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    number: String,
    holder: Client,
    balance: f64,
    kind: AccountKind,
}

impl Account {
    /// Opens an account.
    ///
    /// # Errors
    ///
    /// Returns [`BankError::NegativeSetting`] if the opening balance or any
    /// kind setting is negative.
    pub fn open(
        number: impl Into<String>,
        holder: Client,
        opening_balance: f64,
        kind: AccountKind,
    ) -> Result<Self, BankError> {
        Ok(Self {
            number: number.into(),
            holder,
            balance: non_negative("opening balance", opening_balance)?,
            kind: kind.validate()?,
        })
    }

    /// The account number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// The account holder.
    #[must_use]
    pub const fn holder(&self) -> &Client {
        &self.holder
    }

    /// The current balance.
    #[must_use]
    pub const fn balance(&self) -> f64 {
        self.balance
    }

    /// The account's rules.
    #[must_use]
    pub const fn kind(&self) -> AccountKind {
        self.kind
    }

    /// Credits a positive amount.
    ///
    /// # Errors
    ///
    /// Returns [`BankError::InvalidAmount`] for zero or negative amounts.
    pub fn deposit(&mut self, amount: f64) -> Result<(), BankError> {
        self.balance += positive(amount)?;
        Ok(())
    }

    /// Checks a withdrawal against the account rules without applying it.
    ///
    /// Returns the balance the account would have afterwards, fees included.
    fn balance_after_withdrawal(&self, amount: f64) -> Result<f64, BankError> {
        let amount = positive(amount)?;
        let after = self.balance - amount;
        match self.kind {
            AccountKind::Savings { .. } => {
                if after < 0.0 {
                    return Err(BankError::InsufficientFunds(self.number.clone()));
                }
                Ok(after)
            }
            AccountKind::Checking {
                overdraft_limit,
                overdraft_fee,
            } => {
                if after < -overdraft_limit {
                    return Err(BankError::OverdraftExceeded(self.number.clone()));
                }
                Ok(if after < 0.0 { after - overdraft_fee } else { after })
            }
        }
    }

    /// Debits an amount according to the account kind.
    ///
    /// A checking account that ends up negative is also charged its
    /// overdraft fee.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive or the account rules
    /// forbid the withdrawal. The balance is unchanged on error.
    pub fn withdraw(&mut self, amount: f64) -> Result<(), BankError> {
        self.balance = self.balance_after_withdrawal(amount)?;
        Ok(())
    }

    /// The interest one month would earn, rounded to cents.
    #[must_use]
    pub fn monthly_interest(&self) -> f64 {
        match self.kind {
            AccountKind::Savings { annual_rate } => round_cents(self.balance * annual_rate / 12.0),
            AccountKind::Checking { .. } => 0.0,
        }
    }

    /// Credits one month of interest, returning the amount credited.
    pub fn apply_interest(&mut self) -> f64 {
        let interest = self.monthly_interest();
        if interest > 0.0 {
            self.balance += interest;
        }
        interest
    }

    /// A one-line description of the account.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} {} | Holder: {} | Balance: ${:.2}",
            self.kind.label(),
            self.number,
            self.holder.name,
            self.balance
        )
    }
}

/// The set of accounts, keyed by account number.
#[derive(Debug, Clone, Default)]
pub struct Bank {
    accounts: BTreeMap<String, Account>,
}

impl Bank {
    /// An empty bank.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account.
    ///
    /// # Errors
    ///
    /// Returns [`BankError::DuplicateAccount`] if the number is taken.
    pub fn register(&mut self, account: Account) -> Result<(), BankError> {
        if self.accounts.contains_key(account.number()) {
            return Err(BankError::DuplicateAccount(account.number.clone()));
        }
        tracing::debug!("registered account {}", account.number());
        self.accounts.insert(account.number.clone(), account);
        Ok(())
    }

    /// Looks up an account.
    ///
    /// # Errors
    ///
    /// Returns [`BankError::UnknownAccount`] if there is no such account.
    pub fn account(&self, number: &str) -> Result<&Account, BankError> {
        self.accounts
            .get(number)
            .ok_or_else(|| BankError::UnknownAccount(number.to_string()))
    }

    /// Looks up an account for modification.
    ///
    /// # Errors
    ///
    /// Returns [`BankError::UnknownAccount`] if there is no such account.
    pub fn account_mut(&mut self, number: &str) -> Result<&mut Account, BankError> {
        self.accounts
            .get_mut(number)
            .ok_or_else(|| BankError::UnknownAccount(number.to_string()))
    }

    /// Moves money between two accounts.
    ///
    /// Both accounts and the withdrawal are checked before either balance
    /// changes, so a failed transfer moves nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if either account is unknown, they are the same
    /// account, the amount is not positive, or the source account's rules
    /// forbid the withdrawal.
    pub fn transfer(&mut self, from: &str, to: &str, amount: f64) -> Result<(), BankError> {
        positive(amount)?;
        if from == to {
            return Err(BankError::SameAccount(from.to_string()));
        }
        self.account(to)?;
        let new_source_balance = self.account(from)?.balance_after_withdrawal(amount)?;

        self.account_mut(from)?.balance = new_source_balance;
        self.account_mut(to)?.balance += amount;
        tracing::info!("transferred {amount:.2} from {from} to {to}");
        Ok(())
    }

    /// Credits a month of interest on every account.
    ///
    /// Returns the interest credited, keyed by account number.
    pub fn apply_interest_all(&mut self) -> BTreeMap<String, f64> {
        self.accounts
            .iter_mut()
            .map(|(number, account)| (number.clone(), account.apply_interest()))
            .collect()
    }

    /// One summary line per account, ordered by account number.
    #[must_use]
    pub fn summaries(&self) -> Vec<String> {
        self.accounts.values().map(Account::summary).collect()
    }

    /// Returns `true` if no account is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
