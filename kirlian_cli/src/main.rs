use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::DynamicImage;
use kirlian_core::diagnostics::map_with_trace;
use kirlian_core::diagnostics::organs::all_statuses;
use kirlian_core::grv::all_slots;
use kirlian_core::{
    export_jpeg, export_png, organ_report, overlay_aura, render_figure, render_organ_detail,
    render_organ_map, render_scene_png, AppConfig, AuraCompositor, ChakraEnergyProfile,
    ChakraScene, DiagnosticReport, GrvSession, Language, Organ, OperationLog,
};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "kirlian", version, about = "Chakra, aura and GRV-gram toolkit")]
struct Cli {
    /// Configuration file; defaults are used when it is missing.
    #[arg(long, global = true, default_value = "config/kirlian.toml")]
    config: PathBuf,

    /// Interface language for labels (ru or en); overrides the config.
    #[arg(long, global = true)]
    lang: Option<Language>,

    #[command(subcommand)]
    cmd: Commands,
}

/// Where the chakra energies come from.
#[derive(Args)]
struct EnergySource {
    /// Comma separated assignments, e.g. "Root=80,Heart=65".
    #[arg(long, conflicts_with_all = ["profile_file", "pdf"])]
    energy: Option<String>,

    /// JSON object mapping chakra names to energies.
    #[arg(long, conflicts_with = "pdf")]
    profile_file: Option<PathBuf>,

    /// Diagnostic report to derive the energies from.
    #[arg(long)]
    pdf: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Png,
    Jpeg,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the 2D chakra figure.
    Figure {
        #[command(flatten)]
        source: EnergySource,
        #[arg(short, long, default_value = "figure.png")]
        output: PathBuf,
    },
    /// Build the 3D chakra scene and render a projected view.
    Scene {
        #[command(flatten)]
        source: EnergySource,
        #[arg(short, long, default_value = "scene.png")]
        output: PathBuf,
        /// Also write the scene description as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Render the transparent aura layer.
    Aura {
        #[command(flatten)]
        source: EnergySource,
        #[arg(short, long, default_value = "aura.png")]
        output: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
    },
    /// Composite the aura over a photo.
    Overlay {
        #[command(flatten)]
        source: EnergySource,
        #[arg(long)]
        photo: PathBuf,
        #[arg(short, long, default_value = "aura_photo.png")]
        output: PathBuf,
        #[arg(long, value_enum, default_value = "png")]
        format: ExportFormat,
    },
    /// Parse a diagnostic report and print the derived data as JSON.
    AnalyzePdf {
        pdf: PathBuf,
        /// Include the per-parameter chakra contributions.
        #[arg(long)]
        trace: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render the organ map for a report and list organ statuses.
    Organs {
        pdf: PathBuf,
        #[arg(short, long, default_value = "organs.png")]
        output: PathBuf,
    },
    /// Render the detail view of one organ.
    OrganDetail {
        pdf: PathBuf,
        /// Organ name in Russian or English.
        #[arg(long)]
        organ: Organ,
        /// Optional organ picture drawn over the glow.
        #[arg(long)]
        picture: Option<PathBuf>,
        #[arg(long, default_value_t = 400)]
        size: u32,
        #[arg(short, long, default_value = "organ.png")]
        output: PathBuf,
    },
    /// Simulate a full ten-finger GRV scan.
    GrvSimulate {
        #[arg(long, default_value = "grv")]
        out_dir: PathBuf,
        /// Override the session seed from the config.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Analyze GRV-grams named `<hand>_<finger>.png` or a saved session.
    GrvAnalyze {
        /// Directory with one image per finger.
        #[arg(long, conflicts_with = "session")]
        dir: Option<PathBuf>,
        /// Session file written by an earlier run.
        #[arg(long)]
        session: Option<PathBuf>,
        /// Save the processed session to this file.
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli.config);
    let lang = cli.lang.unwrap_or(config.render.language);
    let log = OperationLog::from_config(&config.logging);

    match cli.cmd {
        Commands::Figure { source, output } => {
            let profile = resolve_profile(&source, &log)?;
            let image = render_figure(
                &profile,
                config.render.figure_width,
                config.render.figure_height,
            )?;
            save_image(image.into(), &output)?;
        }
        Commands::Scene {
            source,
            output,
            json,
        } => {
            let profile = resolve_profile(&source, &log)?;
            let scene = ChakraScene::from_profile(&profile);
            if let Some(path) = json {
                fs::write(&path, scene.to_json()?)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            let image =
                render_scene_png(&scene, config.render.scene_width, config.render.scene_height)?;
            save_image(image.into(), &output)?;
        }
        Commands::Aura {
            source,
            output,
            width,
            height,
        } => {
            let profile = resolve_profile(&source, &log)?;
            let aura = AuraCompositor::from(&config.aura).render(
                &profile,
                width.unwrap_or(config.aura.width),
                height.unwrap_or(config.aura.height),
            );
            log.log_operation("aura", &aura.statistics())?;
            save_image(aura.to_image().into(), &output)?;
        }
        Commands::Overlay {
            source,
            photo,
            output,
            format,
        } => {
            let profile = resolve_profile(&source, &log)?;
            let photo = image::open(&photo)
                .with_context(|| format!("opening photo {}", photo.display()))?
                .to_rgba8();
            let aura = AuraCompositor::from(&config.aura).render(
                &profile,
                config.aura.width,
                config.aura.height,
            );
            let composed = overlay_aura(&photo, &aura);
            log.log_operation("overlay", &aura.statistics())?;
            let bytes = match format {
                ExportFormat::Png => export_png(&composed)?,
                ExportFormat::Jpeg => export_jpeg(&composed, &config.export)?,
            };
            fs::write(&output, bytes).with_context(|| format!("writing {}", output.display()))?;
            tracing::info!(path = %output.display(), "saved composited photo");
        }
        Commands::AnalyzePdf { pdf, trace, output } => {
            let report = load_report(&pdf)?;
            log.log_profile("pdf", &report.chakra_energy)?;
            let mut value = serde_json::to_value(&report)?;
            if trace {
                value["mapping"] = serde_json::to_value(map_with_trace(&report.diagnostic_data))?;
            }
            value["chakra_details"] = serde_json::to_value(report.chakra_energy.details(lang))?;
            let json = serde_json::to_string_pretty(&value)?;
            match output {
                Some(path) => {
                    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?
                }
                None => println!("{json}"),
            }
        }
        Commands::Organs { pdf, output } => {
            let report = load_report(&pdf)?;
            for (organ, status) in all_statuses(&report.diagnostic_data) {
                println!("{:<24} {}", organ.name(lang), status.label(lang));
            }
            let image = render_organ_map(
                &report.diagnostic_data,
                config.render.organ_map_width,
                config.render.organ_map_height,
            )?;
            save_image(image.into(), &output)?;
        }
        Commands::OrganDetail {
            pdf,
            organ,
            picture,
            size,
            output,
        } => {
            let report = load_report(&pdf)?;
            let details = organ_report(organ, &report.diagnostic_data, lang);
            println!("{}", serde_json::to_string_pretty(&details)?);
            let picture = picture
                .map(|path| {
                    image::open(&path)
                        .map(|img| img.to_rgba8())
                        .with_context(|| format!("opening organ picture {}", path.display()))
                })
                .transpose()?;
            let image = render_organ_detail(details.status, picture.as_ref(), size)?;
            save_image(image.into(), &output)?;
        }
        Commands::GrvSimulate { out_dir, seed } => {
            let mut grv = config.grv.clone();
            if let Some(seed) = seed {
                grv.session_seed = seed;
            }
            let mut session = GrvSession::new(&grv);
            session.capture_all();
            fs::create_dir_all(&out_dir)?;
            for (hand, finger) in all_slots() {
                if let Some(image) = session.image(hand, finger) {
                    let path = out_dir.join(format!("{hand}_{finger}.png"));
                    save_image(image.clone().into(), &path)?;
                }
            }
            let model = session.process_all(lang)?;
            log.log_profile("grv", &model.chakra_values)?;
            session.save(out_dir.join("session.json"), lang)?;
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
        Commands::GrvAnalyze { dir, session, save } => {
            let mut grv = GrvSession::new(&config.grv);
            let model = match (dir, session) {
                (Some(dir), _) => {
                    for (hand, finger) in all_slots() {
                        let path = dir.join(format!("{hand}_{finger}.png"));
                        if path.exists() {
                            grv.load_image_file(hand, finger, &path)?;
                        }
                    }
                    grv.process_all(lang)?
                }
                (None, Some(path)) => {
                    grv.load(&path)?;
                    grv.energy_model(lang)?
                }
                (None, None) => bail!("pass --dir or --session"),
            };
            log.log_profile("grv", &model.chakra_values)?;
            if let Some(path) = save {
                grv.save(path, lang)?;
            }
            println!("{}", serde_json::to_string_pretty(&model)?);
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn load_config(path: &Path) -> AppConfig {
    AppConfig::load_from_file(path).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), error = %err, "falling back to default config");
        AppConfig::default()
    })
}

fn load_report(path: &Path) -> Result<DiagnosticReport> {
    DiagnosticReport::from_pdf_file(path)
        .with_context(|| format!("analyzing report {}", path.display()))
}

fn resolve_profile(source: &EnergySource, log: &OperationLog) -> Result<ChakraEnergyProfile> {
    let (origin, profile) = if let Some(assignments) = &source.energy {
        ("manual", ChakraEnergyProfile::parse_assignments(assignments)?)
    } else if let Some(path) = &source.profile_file {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading profile {}", path.display()))?;
        ("file", serde_json::from_str(&json)?)
    } else if let Some(path) = &source.pdf {
        ("pdf", load_report(path)?.chakra_energy)
    } else {
        bail!("provide chakra energies with --energy, --profile-file or --pdf");
    };
    tracing::info!(source = origin, energies = %profile, "resolved chakra profile");
    log.log_profile(origin, &profile)?;
    Ok(profile)
}

fn save_image(image: DynamicImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    image
        .save(path)
        .with_context(|| format!("saving {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved image");
    Ok(())
}
