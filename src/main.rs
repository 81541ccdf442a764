use anyhow::{bail, Context};
use clap::Parser;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use school_directory::api::{Backend, SchoolApi};
use school_directory::app::Directory;
use school_directory::cli::{Cli, Commands, FilterArgs};
use school_directory::config::Config;
use school_directory::error::DirectoryError;
use school_directory::scanner;
use school_directory::validate::Field;
use school_directory::view::ListingView;
use school_directory_common::ImageReference;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn label(field: Field) -> &'static str {
    match field {
        Field::Name => "School name",
        Field::Address => "Address",
        Field::City => "City",
        Field::State => "State",
        Field::Contact => "Contact",
        Field::EmailId => "Email",
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Add {
            name,
            address,
            city,
            state,
            contact,
            email,
            images,
            image_dir,
        } => {
            println!("🏫 school-directory - add school\n");
            let values = [
                (Field::Name, name),
                (Field::Address, address),
                (Field::City, city),
                (Field::State, state),
                (Field::Contact, contact),
                (Field::EmailId, email),
            ];
            add_school(&config, values, images, image_dir).await?;
        }

        Commands::List { filter } => {
            let mut directory = open_directory(&config)?;
            mount(&mut directory).await?;
            directory.listing_mut().set_criteria(filter.criteria());
            print_listing(directory.listing(), &filter);
        }

        Commands::Browse { filter, seconds } => {
            let mut directory = open_directory(&config)?;
            mount(&mut directory).await?;
            let listing = directory.listing_mut();
            listing.set_criteria(filter.criteria());
            print_listing(listing, &filter);
            browse(listing, Duration::from_secs(seconds)).await;
        }

        Commands::DeleteImages { images } => {
            let references: Vec<ImageReference> =
                images.into_iter().map(ImageReference::new).collect();
            match config.backend()? {
                Backend::Local(api) => {
                    let body = api.service().delete_images(&references)?;
                    println!("✔ {}", body.message);
                }
                Backend::Http(_) => bail!("delete-images needs the in-process backend"),
            }
        }

        Commands::Config { set_api_url, show } => {
            let mut config = config;

            if let Some(url) = set_api_url {
                config.set_api_base_url(url)?;
                println!("✔ API URL saved");
            }

            if show {
                println!("Settings:");
                println!(
                    "  API: {}",
                    config.api_base_url().unwrap_or_else(|| "(in-process)".into())
                );
                println!("  Database: {}", config.database_path()?.display());
                println!("  Upload dir: {}", config.upload_dir()?.display());
                println!("  Carousel interval: {}ms", config.carousel_interval_ms);
                println!("  Refresh delay: {}ms", config.refresh_delay_ms);
            }
        }
    }

    Ok(())
}

fn open_directory(config: &Config) -> anyhow::Result<Directory<Backend>> {
    let backend = config.backend()?;
    Ok(Directory::new(
        backend,
        config.carousel_interval(),
        config.refresh_delay(),
    ))
}

async fn mount<A: SchoolApi>(directory: &mut Directory<A>) -> anyhow::Result<()> {
    if let Err(e) = directory.mount().await {
        bail!("❌ Could not load schools: {}", e);
    }
    Ok(())
}

async fn add_school(
    config: &Config,
    values: [(Field, Option<String>); 6],
    images: Vec<PathBuf>,
    image_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut directory = open_directory(config)?;

    for (field, value) in values {
        let value = match value {
            Some(v) => v,
            None => Input::<String>::new()
                .with_prompt(label(field))
                .allow_empty(true)
                .interact_text()?,
        };
        let form = directory.form_mut();
        form.input(field, value);
        form.blur(field);
        if let Some(message) = form.field_error(field) {
            println!("  ⚠ {}: {}", label(field), message);
        }
    }

    let files = scanner::collect_images(&images, image_dir.as_deref())
        .context("reading image files")?;
    println!("[1/3] {} image(s) selected", files.len());
    let outcome = directory.form_mut().add_images(files)?;
    if outcome.duplicates_ignored > 0 {
        println!("  ⚠ {} duplicate image(s) ignored", outcome.duplicates_ignored);
    }

    println!("[2/3] Submitting...");
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message("uploading images");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = directory.submit().await;
    spinner.finish_and_clear();

    let refresh = match result {
        Ok(refresh) => refresh,
        Err(e) => {
            if let DirectoryError::Validation(errors) = &e {
                for (field, message) in errors.iter() {
                    println!("  ❌ {}: {}", label(field), message);
                }
            }
            bail!("❌ {}", e);
        }
    };

    if let Some(message) = directory.form().success_message() {
        println!("✔ {}", message);
    }

    println!("[3/3] Refreshing listing...");
    refresh.wait().await;
    directory.settle().await?;
    println!(
        "\n✅ Done ({} schools listed)",
        directory.listing().store().records().len()
    );
    Ok(())
}

fn print_listing(listing: &ListingView, filter: &FilterArgs) {
    let counts = listing.option_counts();
    let cities: Vec<String> = counts
        .cities
        .iter()
        .map(|o| format!("{} ({})", o.value, o.count))
        .collect();
    let states: Vec<String> = counts
        .states
        .iter()
        .map(|o| format!("{} ({})", o.value, o.count))
        .collect();
    println!("Cities: {}", cities.join(", "));
    println!("States: {}", states.join(", "));

    let badges = listing.badges();
    if let (Some(city), Some(count)) = (&filter.city, badges.city) {
        println!("  [{}] {}", city, count);
    }
    if let (Some(state), Some(count)) = (&filter.state, badges.state) {
        println!("  [{}] {}", state, count);
    }
    println!("---");

    let visible = listing.visible();
    if visible.is_empty() {
        println!("No schools found.");
        return;
    }
    for record in visible {
        let image = listing
            .current_image(record)
            .map(|r| r.to_string())
            .unwrap_or_else(|| "No Image".into());
        println!(
            "#{} {} - {}, {}, {} [{} image(s), showing {}]",
            record.id,
            record.name,
            record.address,
            record.city,
            record.state,
            record.images.len(),
            image
        );
    }
}

async fn browse(listing: &mut ListingView, duration: Duration) {
    if listing.carousel().active_timers() == 0 {
        println!("No multi-image schools to rotate.");
        return;
    }

    let deadline = tokio::time::Instant::now() + duration;
    loop {
        let tick = tokio::time::timeout_at(deadline, listing.carousel_mut().tick()).await;
        let Ok(Some(id)) = tick else {
            break;
        };
        if let Some(record) = listing.visible().into_iter().find(|r| r.id == id) {
            let index = listing.carousel().index(id);
            println!(
                "{}: image {}/{} ({})",
                record.name,
                index + 1,
                record.images.len(),
                record.images[index]
            );
        }
    }
}
