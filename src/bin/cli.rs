use bankledger::{Account, Amount, Ledger, LedgerError,
    account::{format_amount, parse_amount},
    backend::StoreFormat};

use std::path::PathBuf;
use std::process::ExitCode;
use colored::Colorize;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(version, about, propagate_version = true)]
struct Cli {
   /// Path to ledger file to operate on
   #[clap(value_parser)]
    path: PathBuf,

   /// Layout of the ledger file
   #[clap(long, value_enum, default_value_t = StoreFormat::Csv)]
   format: StoreFormat,

   /// Action to perform
   #[clap(subcommand)]
   action: Subcommands,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Open a new account
    Create(Create),
    /// Deposit money into an account
    Deposit(Movement),
    /// Withdraw money from an account
    Withdraw(Movement),
    /// Change the holder name of an account
    Rename {
        /// Account number, e.g. ACC1001
        #[clap(value_parser)]
        account: String,

        /// New name of the account holder
        #[clap(value_parser)]
        name: String
    },
    /// Show the balance of one account
    Balance {
        /// Account number, e.g. ACC1001
        #[clap(value_parser)]
        account: String
    },
    /// List all accounts
    List,
    /// Apply interest to every account
    Interest {
        /// Interest rate in percent
        #[clap(value_parser = parse_amount_arg, allow_hyphen_values = true)]
        rate: Amount
    },
    /// Count accounts
    Count
}

impl Subcommands {
    fn is_mutation(&self) -> bool {
        matches!(self, Self::Create(_) | Self::Deposit(_) | Self::Withdraw(_)
            | Self::Rename { .. } | Self::Interest { .. })
    }
}

fn parse_amount_arg(arg: &str) -> Result<Amount, String> {
    parse_amount(arg).ok_or_else(|| format!("not a decimal number: {}", arg))
}

#[derive(Args, Debug)]
struct Create {
    /// Name of the account holder
    #[clap(value_parser)]
    name: String,

    #[clap(value_parser = parse_amount_arg, allow_hyphen_values = true)]
    initial_balance: Amount
}

#[derive(Args, Debug)]
struct Movement {
    /// Account number, e.g. ACC1001
    #[clap(value_parser)]
    account: String,

    #[clap(value_parser = parse_amount_arg, allow_hyphen_values = true)]
    amount: Amount
}

fn colored_balance(balance: Amount) -> colored::ColoredString {
    let text = format_amount(balance);
    if balance.is_zero() {
        text.normal()
    } else {
        text.green()
    }
}

fn print_accounts(accounts: &[Account]) {
    if accounts.is_empty() {
        println!("No accounts found!");
        return;
    }
    for account in accounts {
        println!("{:<10} {:<20} {}", account.id(), account.holder_name(), colored_balance(account.balance()));
    }
    println!("Total accounts: {}", accounts.len());
}

fn run(ledger: &mut Ledger, action: &Subcommands) -> Result<(), LedgerError> {
    match action {
        Subcommands::Create(create) => {
            let account = ledger.create_account(&create.name, create.initial_balance)?;
            println!("Account number: {}", account.id().to_string().bold());
        },
        Subcommands::Deposit(movement) => {
            let balance = ledger.deposit(&movement.account, movement.amount)?;
            println!("New balance: {}", colored_balance(balance));
        },
        Subcommands::Withdraw(movement) => {
            let balance = ledger.withdraw(&movement.account, movement.amount)?;
            println!("New balance: {}", colored_balance(balance));
        },
        Subcommands::Rename { account, name } => {
            let account = ledger.rename_account(account, name)?;
            println!("{}", account);
        },
        Subcommands::Balance { account } => {
            println!("{}", colored_balance(ledger.check_balance(account)?));
        },
        Subcommands::List => {
            print_accounts(&ledger.list_accounts());
        },
        Subcommands::Interest { rate } => {
            for applied in ledger.apply_interest_to_all(*rate)? {
                println!("{}: interest earned {}, new balance {}",
                    applied.id, format_amount(applied.interest), colored_balance(applied.balance));
            }
        },
        Subcommands::Count => {
            println!("{}", ledger.account_count());
        }
    }

    if action.is_mutation() {
        ledger.save_to_file()?;
    }
    return Ok(());
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Cli::parse();

    let name = args.path.to_string_lossy();
    let mut ledger = Ledger::with_store(&name, args.format.open(&args.path));

    match run(&mut ledger, &args.action) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "Error:".bright_red(), err);
            ExitCode::FAILURE
        }
    }
}


#[cfg(test)]
mod tests {
    use super::{run, Cli, Subcommands};
    use bankledger::{Ledger, LedgerError};

    use clap::Parser;
    use rust_decimal::dec;

    #[test]
    fn negative_amounts_reach_the_ledger() {
        let cli = Cli::try_parse_from(["bankledger-cli", "bank.csv", "deposit", "ACC1001", "-5"]).unwrap();
        match cli.action {
            Subcommands::Deposit(movement) => assert_eq!(movement.amount, dec!(-5)),
            other => panic!("parsed as {:?}", other)
        }
    }

    #[test]
    fn bad_amount_is_a_usage_error() {
        assert!(Cli::try_parse_from(["bankledger-cli", "bank.csv", "create", "Bilbo", "lots"]).is_err());
    }

    #[test]
    fn mutations_are_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.csv");
        let path_str = path.to_str().unwrap();

        let cli = Cli::try_parse_from(["bankledger-cli", path_str, "count"]).unwrap();
        run(&mut Ledger::new(path_str), &cli.action).unwrap();
        assert!(!path.exists());

        let cli = Cli::try_parse_from(["bankledger-cli", path_str, "create", "Bilbo", "32"]).unwrap();
        run(&mut Ledger::new(path_str), &cli.action).unwrap();

        let cli = Cli::try_parse_from(["bankledger-cli", path_str, "withdraw", "ACC1001", "40"]).unwrap();
        let res = run(&mut Ledger::new(path_str), &cli.action);
        assert!(matches!(res, Err(LedgerError::InsufficientBalance { .. })));

        assert_eq!(Ledger::new(path_str).check_balance("ACC1001").unwrap(), dec!(32));

        let cli = Cli::try_parse_from(["bankledger-cli", path_str, "rename", "ACC1001", "Bilbo Baggins"]).unwrap();
        run(&mut Ledger::new(path_str), &cli.action).unwrap();
        assert_eq!(Ledger::new(path_str).find_account("ACC1001").unwrap().holder_name(), "Bilbo Baggins");
    }
}
