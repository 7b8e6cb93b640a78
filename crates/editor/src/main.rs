use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use editor::{
    EditSession, EditorOptions, Field, FilePicker, ImageOutcome, LoadOutcome, ScreenParams,
    Services, SubmitOutcome, config::Config,
};
use storage::repository::pokemon::PokemonRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pokedit")]
#[command(about = "Edit Pokémon records stored in Firestore", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a stored record as JSON
    Show { id: String },
    /// Load a record, apply the given changes and save it
    Edit {
        id: String,

        #[command(flatten)]
        changes: Changes,

        /// Upload this file as the new image
        #[arg(long, conflicts_with = "clear_image")]
        image: Option<PathBuf>,

        /// Store the record without an image
        #[arg(long)]
        clear_image: bool,

        /// Lock the image for this session; image changes are then rejected
        #[arg(long)]
        no_image_edit: bool,
    },
}

#[derive(clap::Args)]
struct Changes {
    #[arg(long)]
    name: Option<String>,

    #[arg(long = "type")]
    category: Option<String>,

    #[arg(long)]
    height: Option<String>,

    #[arg(long)]
    weight: Option<String>,

    #[arg(long)]
    number: Option<String>,
}

impl Changes {
    fn into_fields(self) -> Vec<(Field, String)> {
        [
            (Field::Name, self.name),
            (Field::Category, self.category),
            (Field::Height, self.height),
            (Field::Weight, self.weight),
            (Field::Number, self.number),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "pokedit={},editor={},storage={}",
                    log_level, log_level, log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!("Configuration loaded for project {}", config.firestore_project_id);

    let services = Services::new(
        Arc::new(config.firestore()?),
        Arc::new(config.object_storage()?),
    );

    match cli.command {
        Commands::Show { id } => handle_show(&services, &id).await,
        Commands::Edit {
            id,
            changes,
            image,
            clear_image,
            no_image_edit,
        } => {
            let options = EditorOptions {
                allow_image_edit: config.allow_image_edit && !no_image_edit,
            };
            handle_edit(services, options, id, changes, image, clear_image).await
        }
    }
}

async fn handle_show(services: &Services, id: &str) -> anyhow::Result<()> {
    let repo = PokemonRepository::new(services.documents.as_ref());
    let pokemon = repo
        .find_by_id(id)
        .await
        .with_context(|| format!("Failed to fetch Pokémon '{}'", id))?;

    println!("{}", serde_json::to_string_pretty(&pokemon)?);
    Ok(())
}

async fn handle_edit(
    services: Services,
    options: EditorOptions,
    id: String,
    changes: Changes,
    image: Option<PathBuf>,
    clear_image: bool,
) -> anyhow::Result<()> {
    let mut session = EditSession::new(services, ScreenParams::new(id), options);

    match session.load().await? {
        LoadOutcome::Loaded(pokemon) => tracing::info!("Editing {} (#{})", pokemon.name, pokemon.number),
        LoadOutcome::NotFound | LoadOutcome::Failed => {
            tracing::warn!("Editing {} without stored values", session.id())
        }
    }

    for (field, value) in changes.into_fields() {
        session.edit(field, value)?;
    }

    if clear_image {
        if let Err(e) = session.clear_image() {
            bail!("{} ({})", e.user_alert(), e);
        }
    }

    if image.is_some() {
        let picker = FilePicker::new(image);
        match session.pick_image(&picker).await {
            Ok(ImageOutcome::Updated { url }) => println!("Image uploaded: {}", url),
            Ok(ImageOutcome::PermissionDenied(alert)) => bail!("{}", alert),
            Ok(ImageOutcome::Cancelled) => println!("No image selected"),
            Err(e) => bail!("{} ({})", e.user_alert(), e),
        }
    }

    match session.submit().await? {
        SubmitOutcome::Saved { alert, .. } => {
            println!("{}", alert);
            Ok(())
        }
        SubmitOutcome::Invalid { alert, errors } => {
            for error in &errors {
                eprintln!("  {}", error);
            }
            bail!("{}", alert)
        }
        SubmitOutcome::Failed { alert } => bail!("{}", alert),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("pokedit").chain(args.iter().copied()))
    }

    #[test]
    fn test_edit_collects_changes() {
        let cli = parse(&["edit", "P001", "--name", "Raichu", "--type", "Electric"]).unwrap();
        let Commands::Edit { id, changes, .. } = cli.command else {
            panic!("expected edit");
        };

        assert_eq!(id, "P001");
        assert_eq!(
            changes.into_fields(),
            vec![
                (Field::Name, "Raichu".to_string()),
                (Field::Category, "Electric".to_string()),
            ]
        );
    }

    #[test]
    fn test_image_and_clear_image_conflict() {
        assert!(parse(&["edit", "P001", "--image", "a.png", "--clear-image"]).is_err());
    }

    #[test]
    fn test_no_image_edit_combines_with_image_flags() {
        let cli = parse(&["edit", "P001", "--no-image-edit", "--image", "a.png"]).unwrap();
        let Commands::Edit {
            image,
            no_image_edit,
            ..
        } = cli.command
        else {
            panic!("expected edit");
        };

        assert!(no_image_edit);
        assert_eq!(image, Some(PathBuf::from("a.png")));
        assert!(parse(&["edit", "P001", "--no-image-edit", "--clear-image"]).is_ok());
    }
}
