//! offer-crossing CLI
//!
//! Play crossing scenarios from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Cross a scenario file
//! offer-crossing run --input scenario.json
//!
//! # Output as JSON
//! offer-crossing run --input scenario.json --format json
//!
//! # Generate a random book and a scenario that sweeps it
//! offer-crossing generate --offers 20 --seed 7
//! ```

use offer_crossing::book::basic_taker::TakerFlags;
use offer_crossing::core::amount::Amount;
use offer_crossing::scenario::{
    AmountInput, BalanceInput, LedgerInput, OfferInput, Scenario, StepInput, TakerInput,
};
use offer_crossing::simulation::book_generator::{generate_book, BookConfig};
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"offer-crossing — deterministic offer crossing for a ledger-embedded exchange

USAGE:
    offer-crossing <COMMAND> [OPTIONS]

COMMANDS:
    run         Cross a taker against the offers of a scenario file
    generate    Generate a random scenario (for testing)
    help        Show this message

OPTIONS (run):
    --input <FILE>      Path to JSON scenario file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --offers <N>        Number of offers in the book (default: 20)
    --owners <N>        Number of offer owners (default: 5)
    --seed <N>          Random seed (default: 0)
    --output <FILE>     Write to file instead of stdout

Set RUST_LOG=debug to trace each crossing.

EXAMPLES:
    offer-crossing run --input scenario.json
    offer-crossing run --input scenario.json --format json
    offer-crossing generate --offers 50 --seed 42 --output book.json"#
    );
}

fn load_scenario(path: &str) -> Scenario {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    Scenario::from_json(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing scenario: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "ledger": {{ "balances": [{{ "account": "alice", "currency": "SWT", "value": "500" }}] }},
  "taker": {{ "account": "alice",
             "input": {{ "currency": "SWT", "value": "100" }},
             "output": {{ "currency": "USD", "issuer": "gateway", "value": "200" }} }},
  "steps": [{{ "direct": {{ "owner": "bob", "input": {{ ... }}, "output": {{ ... }} }} }}]
}}"#
        );
        process::exit(1);
    })
}

fn cmd_run(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let scenario = load_scenario(&path);
    let report = scenario.run().unwrap_or_else(|e| {
        eprintln!("Error setting up crossing: {}", e);
        process::exit(1);
    });

    if format == "json" {
        let json = serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
            eprintln!("Error serializing report: {}", e);
            process::exit(1);
        });
        println!("{}", json);
    } else {
        println!("{}", report);
    }

    if report.code().is_fatal() {
        process::exit(2);
    }
}

fn amount_input(amount: &Amount) -> AmountInput {
    let issue = amount.issue();
    AmountInput {
        currency: issue.currency.to_string(),
        issuer: (!issue.is_native()).then(|| issue.issuer.to_string()),
        value: amount.value().to_string(),
    }
}

fn cmd_generate(args: &[String]) {
    let mut offers = 20usize;
    let mut owners = 5usize;
    let mut seed = 0u64;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--offers" => {
                i += 1;
                offers = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--offers requires a number");
                        process::exit(1);
                    });
            }
            "--owners" => {
                i += 1;
                owners = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--owners requires a number");
                        process::exit(1);
                    });
            }
            "--seed" => {
                i += 1;
                seed = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--seed requires a number");
                        process::exit(1);
                    });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = BookConfig {
        offers,
        owners,
        ..Default::default()
    };
    let book = generate_book(&config, seed);

    // The taker sells enough to sweep the whole book at its worst quality.
    let total_in: Decimal = book.iter().map(|o| o.amounts().input.value()).sum();
    let mut balances = vec![BalanceInput {
        account: "TAKER".to_string(),
        amount: AmountInput {
            currency: config.taker_pays.currency.to_string(),
            issuer: None,
            value: total_in.to_string(),
        },
    }];
    for offer in &book {
        balances.push(BalanceInput {
            account: offer.owner().to_string(),
            amount: amount_input(&offer.amounts().output),
        });
    }

    let scenario = Scenario {
        ledger: LedgerInput {
            balances,
            ..Default::default()
        },
        taker: TakerInput {
            account: "TAKER".to_string(),
            input: AmountInput {
                currency: config.taker_pays.currency.to_string(),
                issuer: None,
                value: total_in.to_string(),
            },
            output: AmountInput {
                currency: config.taker_gets.currency.to_string(),
                issuer: Some(config.taker_gets.issuer.to_string()),
                value: "1".to_string(),
            },
            flags: TakerFlags::sell(),
        },
        steps: book
            .iter()
            .map(|offer| {
                StepInput::Direct(OfferInput {
                    owner: offer.owner().to_string(),
                    sequence: offer.sequence(),
                    input: amount_input(&offer.amounts().input),
                    output: amount_input(&offer.amounts().output),
                })
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&scenario).unwrap_or_else(|e| {
        eprintln!("Error serializing scenario: {}", e);
        process::exit(1);
    });

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} offers across {} owners → {}",
            book.len(),
            owners,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "run" => cmd_run(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
