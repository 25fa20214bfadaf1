use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

/// Which family of address to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKindArg {
    Factoid,
    EntryCredit,
}

impl FromStr for AddressKindArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fct" | "factoid" => Ok(AddressKindArg::Factoid),
            "ec" | "entry-credit" => Ok(AddressKindArg::EntryCredit),
            _ => Err(format!("Invalid address kind: {s}. Valid options: fct, ec")),
        }
    }
}

impl std::fmt::Display for AddressKindArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressKindArg::Factoid => write!(f, "fct"),
            AddressKindArg::EntryCredit => write!(f, "ec"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "factom-cli")]
pub struct Opt {
    #[arg(long = "config", global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "chainid", about = "Derive a chain ID from external IDs")]
    ChainId {
        #[arg(required = true, help = "External IDs of the first entry")]
        ext_ids: Vec<String>,
    },
    #[command(name = "newaddress", about = "Generate and store a new address")]
    NewAddress {
        #[arg(help = "Address kind (fct, ec)")]
        kind: AddressKindArg,
    },
    #[command(name = "importaddress", about = "Import Fs or Es secret addresses")]
    ImportAddress {
        #[arg(required = true, help = "Secret addresses")]
        secrets: Vec<String>,
    },
    #[command(name = "listaddresses", about = "Print wallet addresses")]
    ListAddresses,
    #[command(
        name = "composechain",
        about = "Build the commit and reveal requests for a new chain"
    )]
    ComposeChain {
        #[arg(long = "ec", help = "Entry credit address paying for the chain")]
        ec_address: String,
        #[arg(short = 'e', long = "extid", required = true, help = "External ID")]
        ext_ids: Vec<String>,
        #[arg(short = 'c', long = "content", default_value = "", help = "Entry content")]
        content: String,
        #[arg(long = "submit", help = "Send both requests to factomd")]
        submit: bool,
    },
    #[command(
        name = "composeentry",
        about = "Build the commit and reveal requests for an entry"
    )]
    ComposeEntry {
        #[arg(long = "chain", help = "Chain ID the entry goes to")]
        chain_id: String,
        #[arg(long = "ec", help = "Entry credit address paying for the entry")]
        ec_address: String,
        #[arg(short = 'e', long = "extid", help = "External ID")]
        ext_ids: Vec<String>,
        #[arg(short = 'c', long = "content", default_value = "", help = "Entry content")]
        content: String,
        #[arg(long = "submit", help = "Send both requests to factomd")]
        submit: bool,
    },
    #[command(name = "chainhead", about = "Show the head of a chain")]
    ChainHead {
        #[arg(help = "Chain ID")]
        chain_id: String,
    },
    #[command(name = "get", about = "Fetch an entry by hash")]
    GetEntry {
        #[arg(help = "Entry hash")]
        hash: String,
    },
    #[command(name = "heights", about = "Show current ledger heights")]
    Heights,
    #[command(name = "ecrate", about = "Factoshis per entry credit")]
    EcRate,
    #[command(
        name = "sendfct",
        about = "Pay FCT from a wallet address, the sender covering the fee"
    )]
    SendFct {
        #[arg(help = "Paying FA address held by the wallet")]
        from: String,
        #[arg(help = "Receiving FA address")]
        to: String,
        #[arg(help = "Amount in FCT, up to 8 decimals")]
        amount: String,
        #[arg(long = "submit", help = "Send the transaction to factomd")]
        submit: bool,
    },
    #[command(name = "balance", about = "Balance of an FA or EC address")]
    Balance {
        #[arg(help = "Public address")]
        address: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_kind_arg() {
        assert_eq!("FCT".parse::<AddressKindArg>(), Ok(AddressKindArg::Factoid));
        assert_eq!("ec".parse::<AddressKindArg>(), Ok(AddressKindArg::EntryCredit));
        assert!("btc".parse::<AddressKindArg>().is_err());
    }

    #[test]
    fn test_parse_compose_chain() {
        let opt = Opt::try_parse_from([
            "factom-cli",
            "composechain",
            "--ec",
            "EC2DKSYyRcNWf7RS963VFYgMExoHRYLHVeCfQ9PGPmNzwrcmgm2r",
            "-e",
            "test",
            "-c",
            "test!",
        ])
        .unwrap();
        match opt.command {
            Command::ComposeChain {
                ext_ids,
                content,
                submit,
                ..
            } => {
                assert_eq!(ext_ids, vec!["test"]);
                assert_eq!(content, "test!");
                assert!(!submit);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_sendfct() {
        let opt = Opt::try_parse_from([
            "factom-cli",
            "sendfct",
            "FA3T1gTkuKGG2MWpAkskSoTnfjxZDKVaAYwziNTC1pAYH5B9A1rh",
            "FA3oaS2D2GkrZJuWuiDohnLruxV3AWbrM3PmG3HSSE7DHzPWio36",
            "1.5",
            "--submit",
        ])
        .unwrap();
        match opt.command {
            Command::SendFct { amount, submit, .. } => {
                assert_eq!(amount, "1.5");
                assert!(submit);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Opt::try_parse_from(["factom-cli", "sendfct", "FA1"]).is_err());
    }
}
