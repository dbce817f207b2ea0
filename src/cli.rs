//! Command-line driver for the evaluation protocol.

use std::error::Error;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::corpus::{Corpus, DatasetKind};
use crate::eval::{evaluate_ir, mean, std_dev, IR_FRACTIONS};
use crate::model::{build_model, ModelFamily, TopicModel};
use crate::report;

pub fn print_usage() {
    println!("Usage:");
    println!("  docbench [--config FILE] COMMAND [ARGS]\n");
    println!("Commands:");
    println!("  train              Train the configured model and write its checkpoint");
    println!("  perplexity         Restore the checkpoint and report test-set perplexity");
    println!("  ir                 Restore, run retrieval queries, report precision at the");
    println!("                     configured cutoff fractions");
    println!("  similarity         Restore and report nearest-neighbor relevance over the");
    println!("                     test set");
    println!("  closest TERM       Restore and list the terms closest to TERM");
    println!("  help               Show this help\n");
    println!("Configuration is read from config.toml (or --config FILE); defaults are");
    println!("used when the file is absent.");
}

/// Entry point for the binary. `args` includes the program name.
pub fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let mut config_path = "config.toml".to_string();
    let mut rest: Vec<String> = Vec::new();
    let mut it = args.into_iter().skip(1);
    while let Some(arg) = it.next() {
        if arg == "--config" {
            match it.next() {
                Some(path) => config_path = path,
                None => {
                    println!("Error: --config requires a path\n");
                    print_usage();
                    return Ok(());
                }
            }
        } else {
            rest.push(arg);
        }
    }

    let command = rest.first().map(String::as_str).unwrap_or("help");
    match command {
        "train" => cmd_train(&load_config(&config_path)),
        "perplexity" => cmd_perplexity(&load_config(&config_path)),
        "ir" => cmd_ir(&load_config(&config_path)),
        "similarity" => cmd_similarity(&load_config(&config_path)),
        "closest" => {
            if rest.len() < 2 {
                println!("Error: TERM argument required\n");
                print_usage();
                return Ok(());
            }
            cmd_closest(&load_config(&config_path), &rest[1])
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => {
            println!("Unknown command: {}\n", command);
            print_usage();
            Ok(())
        }
    }
}

fn load_config(path: &str) -> Config {
    match Config::load(Path::new(path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: could not load {}: {}", path, e);
            eprintln!("Using default configuration\n");
            Config::default()
        }
    }
}

fn load_corpus(config: &Config) -> Result<Corpus, Box<dyn Error>> {
    let kind: DatasetKind = config.data.dataset.parse()?;
    println!(
        "loading dataset '{}' from {}...",
        kind.as_str(),
        config.data.root.display()
    );
    let corpus = kind.load(&config.data.root)?;
    println!(
        "  train: {} | test: {} | vocabulary: {}",
        corpus.train.num_docs(),
        corpus.test.num_docs(),
        corpus.vocab_size()
    );
    Ok(corpus)
}

fn build_configured_model(
    config: &Config,
    corpus: &Corpus,
) -> Result<Box<dyn TopicModel>, Box<dyn Error>> {
    let family: ModelFamily = config.model.family.parse()?;
    Ok(build_model(family, corpus.vocab.clone())?)
}

fn restored_model(
    config: &Config,
    corpus: &Corpus,
) -> Result<Box<dyn TopicModel>, Box<dyn Error>> {
    let mut model = build_configured_model(config, corpus)?;
    model.restore(&config.model.checkpoint)?;
    println!(
        "restored {} from {}",
        model.name(),
        config.model.checkpoint.display()
    );
    Ok(model)
}

fn cmd_train(config: &Config) -> Result<(), Box<dyn Error>> {
    let corpus = load_corpus(config)?;
    let mut model = build_configured_model(config, &corpus)?;
    println!("training {}...", model.name());
    model.train(
        &corpus.train,
        corpus.validation.as_ref(),
        &config.train_options(),
    )?;
    Ok(())
}

fn cmd_perplexity(config: &Config) -> Result<(), Box<dyn Error>> {
    let mut corpus = load_corpus(config)?;
    let model = restored_model(config, &corpus)?;
    // Sequence-consuming evaluation; expands from counts when the dataset
    // shipped no sequence file.
    corpus.test.sequences_or_expand();
    let ppl = model.perplexity(&corpus.test)?;
    println!("test perplexity: {:.2}", ppl);
    Ok(())
}

fn cmd_ir(config: &Config) -> Result<(), Box<dyn Error>> {
    let corpus = load_corpus(config)?;
    let model = restored_model(config, &corpus)?;
    let multi_label = corpus.train.labels.is_multi_label();

    println!("running retrieval queries...");
    let queries = model.ir(&corpus.train, &corpus.test, multi_label)?;
    let precision = evaluate_ir(&queries, corpus.train.num_docs());

    fs::create_dir_all(&config.output.dir)?;
    report::dump(&queries, &config.output.dir.join(&config.output.queries_file))?;
    report::dump(
        &precision,
        &config.output.dir.join(&config.output.precision_file),
    )?;

    println!("precision at cutoff fractions:");
    for (f, p) in IR_FRACTIONS.iter().zip(&precision) {
        println!("  {:>8.5}: {:.4}", f, p);
    }
    Ok(())
}

fn cmd_similarity(config: &Config) -> Result<(), Box<dyn Error>> {
    let corpus = load_corpus(config)?;
    let model = restored_model(config, &corpus)?;
    let multi_label = corpus.train.labels.is_multi_label();

    let sim = model.similarity(&corpus.train, &corpus.test, multi_label)?;
    fs::create_dir_all(&config.output.dir)?;
    report::dump(&sim, &config.output.dir.join(&config.output.similarity_file))?;
    println!(
        "nearest-neighbor relevance: mean {:.4}, std {:.4}",
        mean(&sim),
        std_dev(&sim)
    );
    Ok(())
}

fn cmd_closest(config: &Config, term: &str) -> Result<(), Box<dyn Error>> {
    let corpus = load_corpus(config)?;
    let model = restored_model(config, &corpus)?;
    for (word, score) in model.closest_words(term, 10)? {
        println!("  {:<20} {:.4}", word, score);
    }
    Ok(())
}
