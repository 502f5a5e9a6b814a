use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use dotenvy::dotenv;
use tracing::{error, info};

mod config;
mod db;
mod headshot;
mod ledger;
mod llm;
mod utils;

use config::CONFIG;
use db::database::Database;
use db::models::GenerationInsert;
use headshot::options::parse_brand_color;
use headshot::{GenerationConfig, HeadshotStyle, OutfitType};
use ledger::{find_plan, CreditLedger, SqliteCreditStore, PLANS};
use llm::gemini::select_model;
use llm::{generate_headshot, SourceImage};
use utils::logging::init_logging;
use utils::timing::OperationTimer;

#[derive(Debug)]
struct GenerateArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    config: GenerationConfig,
}

fn usage() -> &'static str {
    "Usage:\n  \
     headshot-studio generate --input <path> [--output <path>]\n      \
     [--style corporate|startup|creative|outdoor|bw]\n      \
     [--outfit suit|tuxedo|business-casual|casual|medical-coat]\n      \
     [--high-quality] [--brand-color #rrggbb]\n      \
     [--smooth-skin|--no-smooth-skin] [--whiten-teeth|--no-whiten-teeth]\n      \
     [--brighten-eyes|--no-brighten-eyes]\n  \
     headshot-studio credits\n  \
     headshot-studio topup --plan <starter|pro|business>\n  \
     headshot-studio history [--limit <n>]"
}

fn parse_generate_args(args: &[String]) -> Result<GenerateArgs> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut config = GenerationConfig::default();

    let mut index = 2;
    while index < args.len() {
        match args[index].as_str() {
            "--input" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --input"))?;
                input = Some(PathBuf::from(value));
            }
            "--output" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --output"))?;
                output = Some(PathBuf::from(value));
            }
            "--style" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --style"))?;
                config.style = HeadshotStyle::parse(value)
                    .ok_or_else(|| anyhow!("Unknown style: {value}"))?;
            }
            "--outfit" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --outfit"))?;
                config.outfit = OutfitType::parse(value)
                    .ok_or_else(|| anyhow!("Unknown outfit: {value}"))?;
            }
            "--high-quality" => {
                config.high_quality = true;
            }
            "--brand-color" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --brand-color"))?;
                config.brand_color = Some(
                    parse_brand_color(value)
                        .ok_or_else(|| anyhow!("Invalid brand color (expected #rrggbb): {value}"))?,
                );
            }
            "--smooth-skin" => config.retouching.smooth_skin = true,
            "--no-smooth-skin" => config.retouching.smooth_skin = false,
            "--whiten-teeth" => config.retouching.whiten_teeth = true,
            "--no-whiten-teeth" => config.retouching.whiten_teeth = false,
            "--brighten-eyes" => config.retouching.brighten_eyes = true,
            "--no-brighten-eyes" => config.retouching.brighten_eyes = false,
            "--help" | "-h" => {
                return Err(anyhow!(usage()));
            }
            other => {
                return Err(anyhow!("Unknown generate argument: {other}\n{}", usage()));
            }
        }
        index += 1;
    }

    let input = input.ok_or_else(|| anyhow!("--input is required\n{}", usage()))?;
    Ok(GenerateArgs {
        input,
        output,
        config,
    })
}

fn parse_topup_args(args: &[String]) -> Result<&'static ledger::Plan> {
    let mut plan_id: Option<String> = None;

    let mut index = 2;
    while index < args.len() {
        match args[index].as_str() {
            "--plan" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --plan"))?;
                plan_id = Some(value.clone());
            }
            other => {
                return Err(anyhow!("Unknown topup argument: {other}\n{}", usage()));
            }
        }
        index += 1;
    }

    let plan_id = plan_id.ok_or_else(|| anyhow!("--plan is required\n{}", usage()))?;
    find_plan(&plan_id).ok_or_else(|| {
        let known: Vec<&str> = PLANS.iter().map(|plan| plan.id).collect();
        anyhow!("Unknown plan: {plan_id} (available: {})", known.join(", "))
    })
}

fn parse_history_args(args: &[String]) -> Result<i64> {
    let mut limit = 10i64;

    let mut index = 2;
    while index < args.len() {
        match args[index].as_str() {
            "--limit" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --limit"))?;
                limit = value
                    .parse::<i64>()
                    .map_err(|_| anyhow!("Invalid --limit value: {value}"))?
                    .max(1);
            }
            other => {
                return Err(anyhow!("Unknown history argument: {other}\n{}", usage()));
            }
        }
        index += 1;
    }

    Ok(limit)
}

fn default_output_path(input: &Path, mime_type: &str) -> PathBuf {
    let extension = match mime_type {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    };
    let stem = input
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("headshot");
    input.with_file_name(format!("{stem}_headshot.{extension}"))
}

async fn open_ledger(db: &Database) -> Result<CreditLedger<SqliteCreditStore>> {
    CreditLedger::open(SqliteCreditStore::new(db.clone()), CONFIG.starting_credits).await
}

async fn run_generate(args: GenerateArgs) -> Result<()> {
    let db = Database::init(&CONFIG.database_url).await?;
    let mut ledger = open_ledger(&db).await?;

    if ledger.current() == 0 {
        bail!(
            "Out of credits. Top up with: headshot-studio topup --plan <starter|pro|business>"
        );
    }

    let raw = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("Failed to read input image {}", args.input.display()))?;
    let source = SourceImage::from_input(&raw)?;

    let model = select_model(args.config.high_quality);
    let mut timer = OperationTimer::start(
        "generate",
        Some(format!(
            "style={} outfit={} model={model}",
            args.config.style.label(),
            args.config.outfit.label()
        )),
    );

    let generated = match generate_headshot(&source, &args.config).await {
        Ok(generated) => generated,
        Err(err) => {
            timer.mark_status("error", Some(err.to_string()));
            error!("Headshot generation failed: {err}");
            return Err(err.into());
        }
    };

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input, &generated.mime_type));
    tokio::fs::write(&output, &generated.bytes)
        .await
        .with_context(|| format!("Failed to write output image {}", output.display()))?;

    // Deduct only once the result is safely on disk.
    let remaining = ledger.spend().await?;

    db.insert_generation(&GenerationInsert {
        input_path: args.input.display().to_string(),
        output_path: output.display().to_string(),
        style: args.config.style.label().to_string(),
        outfit: args.config.outfit.label().to_string(),
        model: model.to_string(),
        created_at: Utc::now(),
    })
    .await?;

    timer.log_completed();
    info!(
        "Generated {} ({} bytes, model {model})",
        output.display(),
        generated.bytes.len()
    );
    println!("Saved headshot to {}", output.display());
    println!("Credits remaining: {remaining}");
    if remaining < 3 {
        println!("Running low on credits? Top up with: headshot-studio topup --plan pro");
    }
    Ok(())
}

async fn run_credits() -> Result<()> {
    let db = Database::init(&CONFIG.database_url).await?;
    let ledger = open_ledger(&db).await?;
    println!("Credits: {}", ledger.current());
    Ok(())
}

async fn run_topup(plan: &ledger::Plan) -> Result<()> {
    let db = Database::init(&CONFIG.database_url).await?;
    let mut ledger = open_ledger(&db).await?;
    let balance = ledger.grant(plan.credits).await?;
    info!(
        "Simulated purchase of the {} plan: +{} credits (${})",
        plan.name, plan.credits, plan.price_usd
    );
    println!(
        "Purchased the {} plan (simulated, ${}): +{} credits. Balance: {balance}",
        plan.name, plan.price_usd, plan.credits
    );
    Ok(())
}

async fn run_history(limit: i64) -> Result<()> {
    let db = Database::init(&CONFIG.database_url).await?;
    let rows = db.recent_generations(limit).await?;
    if rows.is_empty() {
        println!("No generations recorded yet.");
        return Ok(());
    }
    for row in rows {
        println!(
            "{}  {} / {}  [{}]  {}",
            row.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            row.style,
            row.outfit,
            row.model,
            row.output_path
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let _guards = init_logging();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("generate") => {
            let parsed = parse_generate_args(&args)?;
            run_generate(parsed).await
        }
        Some("credits") => run_credits().await,
        Some("topup") => {
            let plan = parse_topup_args(&args)?;
            run_topup(plan).await
        }
        Some("history") => {
            let limit = parse_history_args(&args)?;
            run_history(limit).await
        }
        Some("--help") | Some("-h") | None => {
            println!("{}", usage());
            Ok(())
        }
        Some(other) => Err(anyhow!("Unknown command: {other}\n{}", usage())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headshot::Retouching;

    fn to_args(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|part| part.to_string()).collect()
    }

    #[test]
    fn generate_defaults_match_the_studio_defaults() {
        let args = to_args(&["headshot-studio", "generate", "--input", "selfie.jpg"]);
        let parsed = parse_generate_args(&args).unwrap();
        assert_eq!(parsed.input, PathBuf::from("selfie.jpg"));
        assert!(parsed.output.is_none());
        assert_eq!(parsed.config, GenerationConfig::default());
    }

    #[test]
    fn generate_flags_are_parsed() {
        let args = to_args(&[
            "headshot-studio",
            "generate",
            "--input",
            "me.png",
            "--output",
            "out.png",
            "--style",
            "outdoor",
            "--outfit",
            "medical-coat",
            "--high-quality",
            "--brand-color",
            "#336699",
            "--no-smooth-skin",
            "--whiten-teeth",
        ]);
        let parsed = parse_generate_args(&args).unwrap();
        assert_eq!(parsed.output, Some(PathBuf::from("out.png")));
        assert_eq!(parsed.config.style, HeadshotStyle::Outdoor);
        assert_eq!(parsed.config.outfit, OutfitType::MedicalCoat);
        assert!(parsed.config.high_quality);
        assert_eq!(parsed.config.brand_color.as_deref(), Some("#336699"));
        assert_eq!(
            parsed.config.retouching,
            Retouching {
                smooth_skin: false,
                whiten_teeth: true,
                brighten_eyes: true,
            }
        );
    }

    #[test]
    fn generate_rejects_missing_input_and_bad_values() {
        let args = to_args(&["headshot-studio", "generate"]);
        assert!(parse_generate_args(&args).is_err());

        let args = to_args(&[
            "headshot-studio",
            "generate",
            "--input",
            "a.jpg",
            "--style",
            "vaporwave",
        ]);
        assert!(parse_generate_args(&args).is_err());

        let args = to_args(&[
            "headshot-studio",
            "generate",
            "--input",
            "a.jpg",
            "--brand-color",
            "blue",
        ]);
        assert!(parse_generate_args(&args).is_err());

        let args = to_args(&["headshot-studio", "generate", "--input", "a.jpg", "--wat"]);
        assert!(parse_generate_args(&args).is_err());
    }

    #[test]
    fn topup_requires_a_known_plan() {
        let args = to_args(&["headshot-studio", "topup", "--plan", "pro"]);
        assert_eq!(parse_topup_args(&args).unwrap().credits, 50);

        let args = to_args(&["headshot-studio", "topup", "--plan", "enterprise"]);
        assert!(parse_topup_args(&args).is_err());

        let args = to_args(&["headshot-studio", "topup"]);
        assert!(parse_topup_args(&args).is_err());
    }

    #[test]
    fn history_limit_is_parsed_and_floored() {
        let args = to_args(&["headshot-studio", "history"]);
        assert_eq!(parse_history_args(&args).unwrap(), 10);

        let args = to_args(&["headshot-studio", "history", "--limit", "3"]);
        assert_eq!(parse_history_args(&args).unwrap(), 3);

        let args = to_args(&["headshot-studio", "history", "--limit", "0"]);
        assert_eq!(parse_history_args(&args).unwrap(), 1);

        let args = to_args(&["headshot-studio", "history", "--limit", "many"]);
        assert!(parse_history_args(&args).is_err());
    }

    #[test]
    fn output_path_follows_the_generated_mime_type() {
        let input = Path::new("shots/selfie.jpg");
        assert_eq!(
            default_output_path(input, "image/png"),
            PathBuf::from("shots/selfie_headshot.png")
        );
        assert_eq!(
            default_output_path(input, "image/jpeg"),
            PathBuf::from("shots/selfie_headshot.jpg")
        );
        assert_eq!(
            default_output_path(input, "application/octet-stream"),
            PathBuf::from("shots/selfie_headshot.png")
        );
    }
}
