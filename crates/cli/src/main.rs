use clap::{Parser, Subcommand};
use medbot_core::{
    constants::GREETING, resolve_clinical_tables, seed_reference_data, seed_symptom_references,
    ChatService, CoreConfig, DatabaseLocation, NewCondition, NewRemedy, SeverityLevel,
    TriageStore,
};
use medbot_types::{MessageText, UserId};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "medbot")]
#[command(about = "MedBot symptom triage assistant CLI")]
struct Cli {
    /// SQLite database file, or `:memory:`
    #[arg(long, env = "MEDBOT_DATABASE")]
    database: Option<String>,
    /// YAML file replacing the built-in clinical tables
    #[arg(long, env = "MEDBOT_TABLES_FILE")]
    tables: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively; an empty line or `quit` ends the session
    Chat {
        #[arg(long, default_value = UserId::ANONYMOUS)]
        user_id: String,
    },
    /// Show symptoms, intent and candidate conditions for a message
    Analyze { text: String },
    /// List all conditions
    Conditions,
    /// List remedies for a condition
    Remedies { condition_id: i64 },
    /// List the symptom reference table
    Symptoms,
    /// Insert the reference conditions if the table is empty, plus missing symptom references
    Seed,
    /// Add a condition, or update it if the name exists
    AddCondition {
        name: String,
        description: String,
        #[arg(long, default_value = "mild")]
        severity: SeverityLevel,
        /// Home remedy to attach (optional)
        #[arg(long)]
        remedy: Option<String>,
        /// Safety notes for the remedy (optional)
        #[arg(long, requires = "remedy")]
        safety_notes: Option<String>,
    },
    /// Print the conversation log of a user
    History { user_id: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'medbot --help' for commands");
        return Ok(());
    };

    let cfg = CoreConfig::new(
        DatabaseLocation::from_env_value(cli.database),
        resolve_clinical_tables(cli.tables)?,
    );
    let store = Arc::new(cfg.open_store()?);
    let service = ChatService::new(store.clone(), cfg.tables());

    match command {
        Commands::Chat { user_id } => {
            seed_reference_data(store.as_ref())?;
            seed_symptom_references(store.as_ref())?;
            let user_id = UserId::or_default(Some(&user_id), UserId::ANONYMOUS);
            run_chat(&service, &user_id)?;
        }
        Commands::Analyze { text } => {
            let analysis = service.analyze(&text)?;
            let symptoms: Vec<&str> = analysis.symptoms.iter().map(|s| s.as_str()).collect();
            println!("Symptoms: {}", symptoms.join(", "));
            println!("Intent: {}", analysis.intent.as_str());
            println!("Emergency: {}", analysis.emergency);
            for scored in analysis.conditions {
                println!("  {} ({:.2})", scored.condition, scored.confidence);
            }
        }
        Commands::Conditions => {
            let conditions = service.list_conditions()?;
            if conditions.is_empty() {
                println!("No conditions found. Run 'medbot seed' first.");
            }
            for c in conditions {
                println!(
                    "ID: {}, Name: {}, Severity: {}, Description: {}",
                    c.id,
                    c.name,
                    c.severity_level,
                    c.description.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::Remedies { condition_id } => {
            let remedies = service.remedies_for(condition_id)?;
            if remedies.is_empty() {
                println!("No remedies for condition {condition_id}.");
            }
            for r in remedies {
                match r.safety_notes {
                    Some(notes) => println!("- {} (Safety: {})", r.remedy_text, notes),
                    None => println!("- {}", r.remedy_text),
                }
            }
        }
        Commands::Symptoms => {
            let symptoms = store.symptom_references()?;
            if symptoms.is_empty() {
                println!("No symptom references found. Run 'medbot seed' first.");
            }
            for s in symptoms {
                println!(
                    "{} [{}] {}",
                    s.name,
                    s.body_part.as_deref().unwrap_or("-"),
                    s.severity_indicators.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::Seed => {
            match seed_reference_data(store.as_ref())? {
                0 => println!("Reference data already present in {}", cfg.database()),
                n => println!("Seeded {n} conditions into {}", cfg.database()),
            }
            let added = seed_symptom_references(store.as_ref())?;
            println!("Added {added} symptom references");
        }
        Commands::AddCondition {
            name,
            description,
            severity,
            remedy,
            safety_notes,
        } => {
            let id = store.upsert_condition(&NewCondition {
                name: name.clone(),
                description,
                severity_level: severity,
            })?;
            println!("Saved condition '{name}' with ID: {id}");
            if let Some(remedy_text) = remedy {
                let remedy_id = store.add_remedy(
                    id,
                    &NewRemedy {
                        remedy_text,
                        safety_notes,
                    },
                )?;
                println!("Added remedy with ID: {remedy_id}");
            }
        }
        Commands::History { user_id } => {
            let user_id = UserId::new(&user_id)?;
            let entries = service.conversations(&user_id)?;
            if entries.is_empty() {
                println!("No conversations for {user_id}.");
            }
            for entry in entries {
                println!("[{}] {}", entry.created_at.to_rfc3339(), entry.id);
                println!("{}\n", entry.messages);
            }
        }
    }

    Ok(())
}

fn run_chat(service: &ChatService, user_id: &UserId) -> Result<(), Box<dyn std::error::Error>> {
    println!("{GREETING}");
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = service.chat(user_id, &MessageText::new(line)?)?;
        println!("{}\n", reply.response);
    }
    Ok(())
}
