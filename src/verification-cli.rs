//! A small CLI tool for checking that a vote is recorded on a BlockVote ledger.
//! It asks the server for the vote by transaction hash and, given the nonce
//! from the voter's receipt, recomputes the hash locally.

use clap::{Arg, ArgAction, ArgMatches, Command};

use blockvote_backend::model::vote::{Nonce, TransactionHash, VerifiedVote};

const PROGRAM_NAME: &str = "verify-vote";

const ABOUT_TEXT: &str = "Check that a vote is recorded on a BlockVote ledger.

EXIT CODES:
     0: Verification succeeded.
   255: Ran successfully, but verification failed.
 Other: Error.";

const TX_HASH: &str = "TX_HASH";
const SERVER: &str = "server";
const NONCE: &str = "nonce";

const DEFAULT_SERVER: &str = "http://127.0.0.1:8000";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .arg(
            Arg::new(TX_HASH)
                .help("The transaction hash from the vote receipt (0x + 64 hex digits)")
                .action(ArgAction::Set)
                .required(true),
        )
        .arg(
            Arg::new(SERVER)
                .long(SERVER)
                .help("Base URL of the BlockVote server")
                .action(ArgAction::Set)
                .default_value(DEFAULT_SERVER),
        )
        .arg(
            Arg::new(NONCE)
                .long(NONCE)
                .help("The nonce from the vote receipt; recomputes the hash locally")
                .action(ArgAction::Set),
        )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// The arguments could not be parsed.
    Usage(String),
    /// The server could not be reached or answered with garbage.
    Network(String),
    /// No vote with this hash is on the ledger.
    NotFound,
    /// The vote does not hash to its transaction hash with the given nonce.
    Mismatch,
}

/// Ask the server for the vote with the given hash.
fn fetch(server: &str, hash: &TransactionHash) -> Result<VerifiedVote, Error> {
    let url = format!("{}/votes/{hash}", server.trim_end_matches('/'));
    let response = reqwest::blocking::get(url).map_err(|e| Error::Network(e.to_string()))?;
    match response.status() {
        reqwest::StatusCode::NOT_FOUND => Err(Error::NotFound),
        status if status.is_success() => response
            .json()
            .map_err(|e| Error::Network(format!("Invalid response: {e}"))),
        status => Err(Error::Network(format!("Server returned {status}"))),
    }
}

/// Check a fetched vote against the hash that was asked for and, optionally, the nonce.
fn check(
    vote: &VerifiedVote,
    hash: &TransactionHash,
    nonce: Option<&Nonce>,
) -> Result<(), Error> {
    if vote.vote.transaction_hash != *hash {
        return Err(Error::Mismatch);
    }
    match nonce {
        Some(nonce) if !vote.vote.verify_nonce(nonce) => Err(Error::Mismatch),
        _ => Ok(()),
    }
}

/// Parse the arguments that carry values.
fn parse(args: &ArgMatches) -> Result<(String, TransactionHash, Option<Nonce>), Error> {
    let hash: &String = args.get_one(TX_HASH).unwrap(); // Required argument is guaranteed to be present.
    let server: &String = args.get_one(SERVER).unwrap(); // Has a default.
    let hash = hash
        .parse::<TransactionHash>()
        .map_err(|e| Error::Usage(format!("{e}")))?;
    let nonce = args
        .get_one::<String>(NONCE)
        .map(|n| n.parse::<Nonce>())
        .transpose()
        .map_err(|e| Error::Usage(format!("{e}")))?;
    Ok((server.clone(), hash, nonce))
}

/// Run verification, report the result, and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    let outcome = parse(args).and_then(|(server, hash, nonce)| {
        let vote = fetch(&server, &hash)?;
        check(&vote, &hash, nonce.as_ref())?;
        Ok((vote, nonce.is_some()))
    });
    match outcome {
        Ok((vote, checked_nonce)) => {
            println!("Verification succeeded.");
            println!(
                "{}: {} in '{}', block {}, recorded {}",
                vote.vote.transaction_hash,
                vote.candidate_name,
                vote.election_title,
                vote.vote.block_number,
                vote.vote.timestamp
            );
            if !checked_nonce {
                println!("No nonce given, so the hash was not recomputed.");
            }
            0
        }
        Err(Error::Usage(msg)) => {
            println!("Invalid argument: {msg}");
            1
        }
        Err(Error::Network(msg)) => {
            println!("Could not query the server: {msg}");
            1
        }
        Err(Error::NotFound) => {
            println!("Verification failed: no vote with this hash is on the ledger.");
            255
        }
        Err(Error::Mismatch) => {
            println!("Verification failed: the vote does not match its transaction hash.");
            255
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use blockvote_backend::model::vote::Vote;

    use super::*;

    fn recorded(nonce: &Nonce) -> VerifiedVote {
        let timestamp = Utc::now();
        VerifiedVote {
            vote: Vote {
                id: "v7".to_string(),
                election_id: "e1".to_string(),
                candidate_id: "c2".to_string(),
                transaction_hash: TransactionHash::compute("e1", "c2", timestamp, 18_250_000, nonce),
                timestamp,
                block_number: 18_250_000,
            },
            election_title: "2024 CEO Election".to_string(),
            candidate_name: "Michael Roberts".to_string(),
        }
    }

    #[test]
    fn verification() {
        log4rs_test_utils::test_logging::init_logging_once_for(["blockvote_backend"], None, None);

        let nonce = Nonce::random(&mut rand::thread_rng());
        let vote = recorded(&nonce);
        let hash = vote.vote.transaction_hash;

        assert_eq!(check(&vote, &hash, Some(&nonce)), Ok(()));
        assert_eq!(check(&vote, &hash, None), Ok(()));

        let other = Nonce::random(&mut rand::thread_rng());
        assert_eq!(check(&vote, &hash, Some(&other)), Err(Error::Mismatch));

        let mut tampered = vote.clone();
        tampered.vote.candidate_id = "c1".to_string();
        assert_eq!(check(&tampered, &hash, Some(&nonce)), Err(Error::Mismatch));

        let unrelated = recorded(&other).vote.transaction_hash;
        assert_eq!(check(&vote, &unrelated, None), Err(Error::Mismatch));
    }

    #[test]
    fn correct_cli_usage() {
        let hash = format!("0x{}", "ab".repeat(32));
        let nonce = "cd".repeat(32);
        let command_line = [PROGRAM_NAME, &hash, "--nonce", &nonce, "--server", "http://localhost:9"];
        let args = cli().try_get_matches_from(command_line).unwrap();
        let (server, parsed, parsed_nonce) = parse(&args).unwrap();
        assert_eq!(server, "http://localhost:9");
        assert_eq!(parsed.to_string(), hash);
        assert_eq!(parsed_nonce.unwrap().to_string(), nonce);

        let args = cli().try_get_matches_from([PROGRAM_NAME, &hash]).unwrap();
        let (server, _, parsed_nonce) = parse(&args).unwrap();
        assert_eq!(server, DEFAULT_SERVER);
        assert!(parsed_nonce.is_none());

        // Bad values are errors, not verification failures.
        let args = cli().try_get_matches_from([PROGRAM_NAME, "0x1234"]).unwrap();
        assert_eq!(run(&args), 1);
        let args = cli()
            .try_get_matches_from([PROGRAM_NAME, &hash, "--nonce", "zz"])
            .unwrap();
        assert_eq!(run(&args), 1);
    }

    #[test]
    fn bad_cli_usage() {
        // Something very wrong.
        let command_line = [PROGRAM_NAME, "this", "invocation", "is", "incorrect"];
        cli().try_get_matches_from(command_line).unwrap_err();

        // No hash at all.
        let command_line = [PROGRAM_NAME];
        cli().try_get_matches_from(command_line).unwrap_err();
    }
}
