// Entry point for the factom-cli binary
use clap::Parser;
use factom_client::address::AddressKind;
use factom_client::cli::AddressKindArg;
use factom_client::core::monetary::conversions::{
    factoshis_to_fct, fct_to_factoshis, format_factoshis,
};
use factom_client::network::{Json2Request, Ledger};
use factom_client::{
    compose_chain_commit, compose_chain_reveal, compose_entry_commit, compose_entry_reveal,
    derive_chain_id, Address, Chain, ChainId, Command, Commit, Config, Entry, FactomdClient, Opt,
    Reveal, Wallet,
};
use log::{error, LevelFilter};
use std::process;

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::resolve(opt.config.as_deref())?;

    match opt.command {
        Command::ChainId { ext_ids } => {
            println!("{}", derive_chain_id(ext_ids.as_slice()));
        }
        Command::NewAddress { kind } => {
            let wallet = Wallet::open(&config)?;
            let pair = match kind {
                AddressKindArg::Factoid => wallet.generate_factoid_address()?,
                AddressKindArg::EntryCredit => wallet.generate_ec_address()?,
            };
            println!("{}", pair.public);
        }
        Command::ImportAddress { secrets } => {
            let wallet = Wallet::open(&config)?;
            for secret in secrets {
                println!("{}", wallet.import_secret(&secret)?.public);
            }
        }
        Command::ListAddresses => {
            let wallet = Wallet::open(&config)?;
            for pair in wallet.all_addresses()? {
                println!("{}", pair.public);
            }
        }
        Command::ComposeChain {
            ec_address,
            ext_ids,
            content,
            submit,
        } => {
            let ec = Wallet::open(&config)?.ec_key(&ec_address.parse()?)?;
            let ext_ids: Vec<&str> = ext_ids.iter().map(String::as_str).collect();
            let chain = Chain::from_strings(&content, &ext_ids);
            let commit = compose_chain_commit(&chain, &ec)?;
            let reveal = compose_chain_reveal(&chain)?;
            publish(&config, &commit, &reveal, submit)?;
            println!("ChainID: {}", chain.chain_id);
        }
        Command::ComposeEntry {
            chain_id,
            ec_address,
            ext_ids,
            content,
            submit,
        } => {
            let ec = Wallet::open(&config)?.ec_key(&ec_address.parse()?)?;
            let ext_ids: Vec<&str> = ext_ids.iter().map(String::as_str).collect();
            let entry = Entry::from_strings(&chain_id, &content, &ext_ids)?;
            let commit = compose_entry_commit(&entry, &ec)?;
            let reveal = compose_entry_reveal(&entry)?;
            publish(&config, &commit, &reveal, submit)?;
            println!("Entryhash: {}", hex::encode(entry.hash()?));
        }
        Command::ChainHead { chain_id } => {
            let client = FactomdClient::from_config(&config)?;
            let head = client.chain_head(&chain_id.parse::<ChainId>()?)?;
            if head.is_pending() {
                println!("Chain not yet included in a directory block");
            } else {
                println!("{}", head.chain_head);
            }
        }
        Command::GetEntry { hash } => {
            let client = FactomdClient::from_config(&config)?;
            print!("{}", client.entry(&hash)?);
        }
        Command::Heights => {
            let heights = FactomdClient::from_config(&config)?.heights()?;
            println!("DirectoryBlockHeight: {}", heights.directory_block_height);
            println!("LeaderHeight: {}", heights.leader_height);
            println!("EntryBlockHeight: {}", heights.entry_block_height);
            println!("EntryHeight: {}", heights.entry_height);
        }
        Command::EcRate => {
            let rate = FactomdClient::from_config(&config)?.entry_credit_rate()?;
            println!("{rate}");
        }
        Command::SendFct {
            from,
            to,
            amount,
            submit,
        } => {
            let wallet = Wallet::open(&config)?;
            let client = FactomdClient::from_config(&config)?;
            let from: Address = from.parse()?;
            let to: Address = to.parse()?;
            let amount = fct_to_factoshis(&amount)?;

            let name = "sendfct";
            wallet.new_transaction(name)?;
            wallet.add_input(name, &from, amount)?;
            wallet.add_output(name, &to, amount)?;
            let (fee, _) = wallet.add_fee(name, &from, client.entry_credit_rate()?)?;
            wallet.sign_transaction(name)?;
            let transaction = wallet.compose_transaction(name)?;
            println!("Fee: {}", format_factoshis(fee));

            if submit {
                let submitted = client.factoid_submit(&transaction)?;
                println!("{} {}", submitted.message, submitted.txid);
            } else {
                let request = Json2Request::new(
                    0,
                    "factoid-submit",
                    serde_json::json!({ "transaction": hex::encode(&transaction) }),
                )?;
                println!("{}", serde_json::to_string(&request)?);
            }
        }
        Command::Balance { address } => {
            let client = FactomdClient::from_config(&config)?;
            let address: Address = address.parse()?;
            match address.kind() {
                AddressKind::FactoidPublic => {
                    let balance = client.factoid_balance(&address)?;
                    let sign = if balance < 0 { "-" } else { "" };
                    println!("{sign}{}", factoshis_to_fct(balance.unsigned_abs()));
                }
                _ => println!("{}", client.entry_credit_balance(&address)?),
            }
        }
    }
    Ok(())
}

/// Print the two requests, or send them to factomd commit first
fn publish(
    config: &Config,
    commit: &Commit,
    reveal: &Reveal,
    submit: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if submit {
        let client = FactomdClient::from_config(config)?;
        let committed = client.submit_commit(commit)?;
        println!("Commit: {} {}", committed.message, committed.txid);
        let revealed = client.submit_reveal(reveal)?;
        println!("Reveal: {} {}", revealed.message, revealed.entry_hash);
    } else {
        let commit_request = Json2Request::new(0, commit.method(), commit.params())?;
        let reveal_request = Json2Request::new(0, reveal.method(), reveal.params())?;
        println!("{}", serde_json::to_string(&commit_request)?);
        println!("{}", serde_json::to_string(&reveal_request)?);
    }
    Ok(())
}
