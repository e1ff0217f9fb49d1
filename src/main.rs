use clap::Parser;
use env_logger::Env;
use maria::cli;
use maria::commands;
use maria::commands::clean::CleanArgs;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = match cli::Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(e) => {
            print!("{}", e);
            std::process::exit(0);
        }
    };

    let result = match args.command {
        cli::Commands::Clean {
            input,
            output,
            plugins,
            threads,
            disk,
            chunk,
            preworker,
            details,
            adapters,
            thresholds,
            plugin_dir,
            temp_dir,
        } => commands::clean::run(CleanArgs {
            input,
            output,
            plugins,
            threads,
            disk,
            chunk,
            preworker,
            details,
            adapters,
            thresholds,
            plugin_dir,
            temp_dir,
        }),
        cli::Commands::Detect { input, sample } => commands::detect::run(input, sample),
        cli::Commands::Estimate { input } => commands::estimate::run(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
