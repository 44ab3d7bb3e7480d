//! One-off migration binary: legacy document-store export → relational schema.
//!
//! Reads a directory of JSON exports (`games.json`, `users.json`,
//! `results.json`, `otp_tokens.json`) and upserts them. Individual bad
//! records are logged and skipped; only configuration problems abort the run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use backend::domain::game::GameUpsertItem;
use backend::domain::user::{EmailAddress, NewUser, Role};
use backend::domain::result::DateStamp;
use backend::outbound::persistence::{
    DbPool, DieselLegacyImporter, LegacyOtpToken, LegacyResult, PoolConfig,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportedGame {
    name: Option<String>,
    code: Option<String>,
    default_time: Option<String>,
    order_index: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportedUser {
    name: Option<String>,
    email: Option<String>,
    role: Option<String>,
    #[serde(alias = "password_hash")]
    password_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportedResult {
    #[serde(alias = "game_code")]
    game_code: Option<String>,
    #[serde(alias = "date_str")]
    date_str: Option<String>,
    #[serde(alias = "slot_min")]
    slot_min: Option<i32>,
    value: Option<String>,
    source: Option<String>,
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportedOtp {
    email: Option<String>,
    #[serde(alias = "otp_hash")]
    otp_hash: Option<String>,
    #[serde(alias = "expires_at")]
    expires_at: Option<DateTime<Utc>>,
    attempts: Option<i32>,
}

/// Load one collection file, tolerating its absence.
fn load_collection<T: serde::de::DeserializeOwned>(
    dir: &Path,
    file: &str,
) -> Result<Vec<T>, String> {
    let path = dir.join(file);
    if !path.exists() {
        warn!(file, "export file missing, skipping collection");
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(&path)
        .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
    serde_json::from_str(&raw).map_err(|err| format!("cannot parse {}: {err}", path.display()))
}

async fn import_games(
    importer: &DieselLegacyImporter,
    games: Vec<ExportedGame>,
) -> HashMap<String, i32> {
    let mut code_to_id = HashMap::new();
    for (index, game) in games.into_iter().enumerate() {
        let Some(item) = GameUpsertItem::from_loose(
            game.name.as_deref().unwrap_or_default(),
            game.code.as_deref().unwrap_or_default(),
            game.default_time.as_deref(),
            game.order_index,
        ) else {
            warn!(index, "skipping game without name or code");
            continue;
        };
        match importer.upsert_game(&item).await {
            Ok(id) => {
                code_to_id.insert(item.code.as_str().to_owned(), id);
            }
            Err(err) => warn!(index, code = item.code.as_str(), error = %err, "game upsert failed"),
        }
    }
    code_to_id
}

async fn import_users(importer: &DieselLegacyImporter, users: Vec<ExportedUser>) -> u64 {
    let mut imported = 0;
    for (index, user) in users.into_iter().enumerate() {
        let name = user.name.unwrap_or_default();
        let Ok(email) = EmailAddress::new(user.email.as_deref().unwrap_or_default()) else {
            warn!(index, "skipping user without email");
            continue;
        };
        if name.trim().is_empty() {
            warn!(index, email = email.as_str(), "skipping user without name");
            continue;
        }
        let role = user
            .role
            .as_deref()
            .and_then(|raw| Role::parse(raw).ok())
            .unwrap_or_default();
        let record = NewUser {
            name,
            email,
            role,
            password_hash: user.password_hash.unwrap_or_default(),
        };
        match importer.upsert_user(&record).await {
            Ok(()) => imported += 1,
            Err(err) => {
                warn!(index, email = record.email.as_str(), error = %err, "user upsert failed");
            }
        }
    }
    imported
}

async fn import_results(
    importer: &DieselLegacyImporter,
    results: Vec<ExportedResult>,
    code_to_id: &HashMap<String, i32>,
) -> u64 {
    let mut imported = 0;
    for (index, result) in results.into_iter().enumerate() {
        let code = result
            .game_code
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_uppercase();
        let Some(game_id) = code_to_id.get(&code).copied() else {
            warn!(index, code = %code, "skipping result without resolvable game");
            continue;
        };
        let Ok(date) = DateStamp::new(result.date_str.as_deref().unwrap_or_default()) else {
            warn!(index, code = %code, "skipping result with malformed date");
            continue;
        };
        let slot_min = result.slot_min.unwrap_or(-1);
        if !(0..=1439).contains(&slot_min) {
            warn!(index, code = %code, slot_min, "skipping result with out-of-range slot");
            continue;
        }
        let record = LegacyResult {
            game_id,
            date_str: date.as_str().to_owned(),
            slot_min,
            value: result.value.unwrap_or_else(|| "XX".to_owned()),
            source: result.source.unwrap_or_else(|| "manual".to_owned()),
            note: result.note.unwrap_or_default(),
        };
        match importer.upsert_result(&record).await {
            Ok(()) => imported += 1,
            Err(err) => warn!(index, code = %code, error = %err, "result upsert failed"),
        }
    }
    imported
}

async fn import_otps(importer: &DieselLegacyImporter, otps: Vec<ExportedOtp>) -> u64 {
    let mut imported = 0;
    for (index, otp) in otps.into_iter().enumerate() {
        let email = otp.email.unwrap_or_default().trim().to_lowercase();
        if email.is_empty() {
            warn!(index, "skipping OTP token without email");
            continue;
        }
        let record = LegacyOtpToken {
            email,
            otp_hash: otp.otp_hash.unwrap_or_default(),
            expires_at: otp.expires_at.unwrap_or_else(Utc::now),
            attempts: otp.attempts.unwrap_or(0),
        };
        match importer.insert_otp(&record).await {
            Ok(()) => imported += 1,
            Err(err) => warn!(index, error = %err, "OTP insert failed"),
        }
    }
    imported
}

async fn run() -> Result<(), String> {
    let export_dir: PathBuf = std::env::var("LEGACY_EXPORT_DIR")
        .ok()
        .or_else(|| std::env::args().nth(1))
        .ok_or_else(|| "pass the export directory as LEGACY_EXPORT_DIR or argv[1]".to_owned())?
        .into();
    if !export_dir.is_dir() {
        return Err(format!("{} is not a directory", export_dir.display()));
    }
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL is not set".to_owned())?;

    let games: Vec<ExportedGame> = load_collection(&export_dir, "games.json")?;
    let users: Vec<ExportedUser> = load_collection(&export_dir, "users.json")?;
    let results: Vec<ExportedResult> = load_collection(&export_dir, "results.json")?;
    let otps: Vec<ExportedOtp> = load_collection(&export_dir, "otp_tokens.json")?;
    info!(
        games = games.len(),
        users = users.len(),
        results = results.len(),
        otps = otps.len(),
        "loaded legacy export"
    );

    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|err| err.to_string())?;
    let importer = DieselLegacyImporter::new(pool);

    let code_to_id = import_games(&importer, games).await;
    let users_imported = import_users(&importer, users).await;
    let results_imported = import_results(&importer, results, &code_to_id).await;
    let otps_imported = import_otps(&importer, otps).await;

    info!(
        games = code_to_id.len(),
        users = users_imported,
        results = results_imported,
        otps = otps_imported,
        "migration complete"
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = fmt().with_env_filter(EnvFilter::from_default_env()).try_init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(%message, "legacy import failed");
            ExitCode::FAILURE
        }
    }
}
