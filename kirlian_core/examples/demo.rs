use std::fs;
use std::path::PathBuf;

use kirlian_core::config::ConfigError;
use kirlian_core::{
    render_aura, render_figure, AppConfig, ChakraEnergyProfile, ChakraScene, GrvSession,
    OperationLog,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let log = OperationLog::from_config(&config.logging);
    let out = PathBuf::from("out");
    fs::create_dir_all(&out)?;

    let profile = ChakraEnergyProfile::parse_assignments(
        "Root=85, Sacral=60, Solar Plexus=45, Heart=90, Throat=70, Third Eye=30, Crown=55",
    )?;
    log.log_profile("demo", &profile)?;
    println!("Profile: {profile}");

    let figure = render_figure(
        &profile,
        config.render.figure_width,
        config.render.figure_height,
    )?;
    figure.save(out.join("figure.png"))?;

    let aura = render_aura(&profile, config.aura.width, config.aura.height);
    log.log_operation("aura", &aura.statistics())?;
    aura.to_image().save(out.join("aura.png"))?;

    let scene = ChakraScene::from_profile(&profile);
    fs::write(out.join("scene.json"), scene.to_json()?)?;

    let mut session = GrvSession::new(&config.grv);
    session.capture_all();
    let model = session.process_all(config.render.language)?;
    println!(
        "GRV energy model: overall {:.1}, balance {:.1}",
        model.overall_energy, model.balance_index
    );

    println!("Demo complete. Outputs in {}", out.display());
    Ok(())
}

fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::load_from_file("config/kirlian.toml").or_else(|err| {
        eprintln!("Falling back to default config: {err}");
        Ok(AppConfig::default())
    })
}
