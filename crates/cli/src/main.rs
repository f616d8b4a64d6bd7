use casenote_core::constants::DEFAULT_RECORD_DATA_DIR;
use casenote_core::sections::STROKE_CASE_FIELD;
use casenote_core::{
    visible_sections, CoreConfig, FieldValue, PatientDescriptor, RecordStore, SectionRegistry,
    WizardController,
};
use casenote_ids::RecordId;
use casenote_store::{FileRecordStore, InvestigationKind, InvestigationsService};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "casenote")]
#[command(about = "Clinical documentation drafts CLI")]
struct Cli {
    /// Draft storage directory (defaults to $RECORD_DATA_DIR, then "record_data")
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Patient details that decide which sections apply.
#[derive(Args)]
struct PatientArgs {
    /// First name
    #[arg(long, default_value = "")]
    first_name: String,
    /// Last name
    #[arg(long, default_value = "")]
    last_name: String,
    /// Recorded gender (e.g. Female, M)
    #[arg(long)]
    gender: Option<String>,
    /// Age in whole years
    #[arg(long)]
    age: Option<u32>,
}

impl PatientArgs {
    fn descriptor(self) -> PatientDescriptor {
        PatientDescriptor::new(self.first_name, self.last_name, self.gender, self.age)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered section in presentation order
    Sections,
    /// Show which sections apply to a patient
    Visible {
        #[command(flatten)]
        patient: PatientArgs,
        /// Treat the encounter as a stroke presentation
        #[arg(long)]
        stroke: bool,
    },
    /// Create a blank draft and print its record id
    New {
        #[command(flatten)]
        patient: PatientArgs,
    },
    /// Print a draft's wizard state as JSON
    Show {
        /// Record id
        record_id: String,
        #[command(flatten)]
        patient: PatientArgs,
    },
    /// Delete a draft and its investigations
    Delete {
        /// Record id
        record_id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Manage a record's investigations
    #[command(subcommand)]
    Investigation(InvestigationCommands),
}

#[derive(Subcommand)]
enum InvestigationCommands {
    /// Add a lab or imaging investigation
    Add {
        /// Record id
        record_id: String,
        /// lab or imaging
        kind: String,
        /// Investigation name
        name: String,
        /// Result, if already available
        #[arg(long)]
        result: Option<String>,
    },
    /// List a record's investigations
    List {
        /// Record id
        record_id: String,
    },
}

fn data_dir(cli_value: Option<PathBuf>) -> PathBuf {
    cli_value
        .or_else(|| std::env::var("RECORD_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RECORD_DATA_DIR))
}

fn controller(store: Arc<dyn RecordStore>) -> WizardController {
    WizardController::new(
        Arc::new(CoreConfig::default()),
        SectionRegistry::standard(),
        store,
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let data_dir = data_dir(cli.data_dir);

    match cli.command {
        Some(Commands::Sections) => {
            for section in SectionRegistry::standard().iter() {
                let fields: Vec<&str> = section.fields.iter().map(|f| f.name).collect();
                println!(
                    "{:<22} {:<32} {}",
                    section.id.as_str(),
                    section.title,
                    fields.join(", ")
                );
            }
        }
        Some(Commands::Visible { patient, stroke }) => {
            let registry = SectionRegistry::standard();
            let patient = patient.descriptor();
            let mut record = registry.blank_record();
            record.set(STROKE_CASE_FIELD, FieldValue::Flag(stroke));

            let visible = visible_sections(&registry, &patient, &record);
            println!(
                "{} of {} sections apply:",
                visible.len(),
                registry.len()
            );
            for (index, section) in visible.iter().enumerate() {
                println!("{:>2}. {}", index + 1, section.title);
            }
        }
        Some(Commands::New { patient }) => {
            let store = Arc::new(FileRecordStore::new(&data_dir)?);
            let mut wizard = controller(store);
            let id = RecordId::new();
            match wizard.begin_new(id, patient.descriptor()).await {
                Ok(()) => match wizard.save().await {
                    Ok(()) => println!("Created draft with record id: {}", id),
                    Err(e) => eprintln!("Error saving draft: {}", e),
                },
                Err(e) => eprintln!("Error creating draft: {}", e),
            }
        }
        Some(Commands::Show { record_id, patient }) => {
            let id = RecordId::parse(&record_id)?;
            let store = Arc::new(FileRecordStore::new(&data_dir)?);
            let mut wizard = controller(store);
            match wizard.open(id, patient.descriptor()).await {
                Ok(()) => println!("{}", serde_json::to_string_pretty(&wizard.view())?),
                Err(e) => eprintln!("Error opening draft {}: {}", id, e),
            }
        }
        Some(Commands::Delete { record_id, yes }) => {
            let id = RecordId::parse(&record_id)?;
            let store = Arc::new(FileRecordStore::new(&data_dir)?);
            let mut wizard = controller(store);
            if let Err(e) = wizard.open(id, PatientDescriptor::default()).await {
                eprintln!("Error opening draft {}: {}", id, e);
                return Ok(());
            }
            wizard.request_delete()?;
            if !yes {
                println!("Re-run with --yes to delete draft {} and its investigations", id);
                return Ok(());
            }
            match wizard.confirm_delete().await {
                Ok(()) => println!("Deleted draft {}", id),
                Err(e) => eprintln!("Error deleting draft {}: {}", id, e),
            }
        }
        Some(Commands::Investigation(InvestigationCommands::Add {
            record_id,
            kind,
            name,
            result,
        })) => {
            let id = RecordId::parse(&record_id)?;
            let kind: InvestigationKind = kind.parse()?;
            let service = InvestigationsService::new(&data_dir);
            match service.add(id, kind, &name, result).await {
                Ok(entry) => println!("Added investigation {}", entry.id),
                Err(e) => eprintln!("Error adding investigation: {}", e),
            }
        }
        Some(Commands::Investigation(InvestigationCommands::List { record_id })) => {
            let id = RecordId::parse(&record_id)?;
            let service = InvestigationsService::new(&data_dir);
            let entries = service.list(id).await?;
            if entries.is_empty() {
                println!("No investigations found.");
            } else {
                for entry in entries {
                    println!(
                        "{} [{:?}] {} - {} ({})",
                        entry.requested_at.format("%Y-%m-%d %H:%M"),
                        entry.kind,
                        entry.name,
                        entry.result.as_deref().unwrap_or("pending"),
                        entry.id
                    );
                }
            }
        }
        None => {
            println!("Use 'casenote --help' for commands");
        }
    }

    Ok(())
}
