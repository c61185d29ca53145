use clap::{Parser, Subcommand};
use consult_core::{
    config::kasp_string_from_env_value, parse_draft_document, ConsultationValidator, FormField,
    ValidatorConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "consult")]
#[command(about = "Consultation form validator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a draft document (JSON with `draft` and `plan`)
    Validate {
        /// Path to the draft document
        file: PathBuf,
        /// Require the insurance-scheme field
        #[arg(long)]
        kasp: bool,
        /// Display label of the insurance scheme (optional)
        #[arg(long)]
        kasp_string: Option<String>,
    },
    /// List form fields in evaluation order
    Fields,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate {
            file,
            kasp,
            kasp_string,
        }) => {
            let text = std::fs::read_to_string(&file)?;
            let document = parse_draft_document(&text)?;
            let config = ValidatorConfig::new(kasp, kasp_string_from_env_value(kasp_string))?;
            let result = ConsultationValidator::new(config).validate(&document.draft, &document.plan);

            if result.is_valid() {
                println!("{}: valid", file.display());
                return Ok(ExitCode::SUCCESS);
            }

            for (field, message) in result.errors() {
                println!("{field}: {message}");
            }
            if let Some(field) = result.first_error_field() {
                eprintln!("First error at: {field}");
            }
            Ok(ExitCode::FAILURE)
        }
        Some(Commands::Fields) => {
            for field in FormField::ALL {
                println!("{field}");
            }
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("Use 'consult --help' for commands");
            Ok(ExitCode::SUCCESS)
        }
    }
}
