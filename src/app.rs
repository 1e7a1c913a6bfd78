use std::{
    io::{self, BufRead, Write},
    path::Path,
    time::SystemTime,
};

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    domain::{evaluate_recipes, rank_recipes, EngineError},
    infra::{
        bazaar::{BazaarClient, SnapshotError, SnapshotSource},
        cache::{ensure_fresh_snapshot, SnapshotOrigin},
        recipes::{load_recipes, CatalogError},
    },
    ui::{
        prompt::{prompt_forge_slots, prompt_hotm_level, wait_for_enter, PromptError},
        table::render_table,
    },
    util::{
        config::{AppConfig, ConfigError},
        persistence::{load_persisted_inputs, save_persisted_inputs, state_file, PersistedInputs},
        version::{version_label, APP_NAME},
    },
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("price data unavailable: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("recipe catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error("console error: {0}")]
    Io(#[from] io::Error),
}

/// What a single run produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub origin: SnapshotOrigin,
    pub evaluated: usize,
    pub skipped: usize,
    pub diagnostics: usize,
    pub shown: usize,
}

pub async fn run() -> Result<RunReport, AppError> {
    info!("{} {}", APP_NAME, version_label());
    let config = AppConfig::load()?;
    let client = BazaarClient::with_url(&config.bazaar_url, config.request_timeout())?;
    let state_path = state_file();

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    run_with(
        &config,
        &client,
        state_path.as_deref(),
        &mut input,
        &mut output,
    )
    .await
}

/// One full pass: refresh prices, join recipes, ask for the user's limits, print the table.
pub async fn run_with<S, R, W>(
    config: &AppConfig,
    source: &S,
    state_path: Option<&Path>,
    input: &mut R,
    output: &mut W,
) -> Result<RunReport, AppError>
where
    S: SnapshotSource,
    R: BufRead,
    W: Write,
{
    let (snapshot, origin) = ensure_fresh_snapshot(
        source,
        &config.snapshot_path,
        config.max_snapshot_age(),
        SystemTime::now(),
    )
    .await?;
    let recipes = load_recipes(&config.recipes_path)?;

    let evaluation = evaluate_recipes(&snapshot, &recipes, config.on_missing_ingredient)?;
    let skipped = recipes.len() - evaluation.recipes.len();
    if skipped > 0 {
        info!(
            "{} of {} recipes could not be priced",
            skipped,
            recipes.len()
        );
    }

    let remembered = state_path
        .and_then(load_persisted_inputs)
        .unwrap_or_default();
    let hotm_level = prompt_hotm_level(input, output, remembered.hotm_level)?;
    let slots = prompt_forge_slots(input, output, remembered.forge_slots)?;

    if let Some(path) = state_path {
        let inputs = PersistedInputs {
            hotm_level: Some(hotm_level),
            forge_slots: Some(slots.get()),
        };
        if let Err(err) = save_persisted_inputs(path, &inputs) {
            warn!("Failed to remember inputs: {err}");
        }
    }

    let ranked = rank_recipes(&evaluation.recipes, hotm_level, slots);
    writeln!(output, "{}", render_table(&ranked, slots))?;
    wait_for_enter(input, output)?;

    Ok(RunReport {
        origin,
        evaluated: evaluation.recipes.len(),
        skipped,
        diagnostics: evaluation.diagnostics.len(),
        shown: ranked.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::{fs, io::Cursor};

    use super::*;
    use crate::{domain::MissingIngredientPolicy, infra::cache::write_snapshot_bytes};

    struct StaticBazaar(String);

    impl SnapshotSource for StaticBazaar {
        async fn download(&self, path: &Path) -> Result<(), SnapshotError> {
            write_snapshot_bytes(path, self.0.as_bytes())
        }
    }

    fn now_millis() -> u128 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_millis()
    }

    fn bazaar_document() -> String {
        format!(
            r#"{{"success": true, "lastUpdated": {}, "products": {{
                "A": {{"product_id": "A", "quick_status": {{"buyPrice": 10.0, "sellPrice": 20.0}}}},
                "B": {{"product_id": "B", "quick_status": {{"buyPrice": 5.0, "sellPrice": 8.0}}}},
                "C": {{"product_id": "C", "quick_status": {{"buyPrice": 1.0, "sellPrice": 500.0}}}}
            }}}}"#,
            now_millis()
        )
    }

    const RECIPES: &str = r#"[
        {"itemId": "A", "timeHours": 2, "hotmRequirement": 0, "items": {"B": 1}},
        {"itemId": "NOT_ON_BAZAAR", "timeHours": 1, "hotmRequirement": 0, "items": {"B": 1}},
        {"itemId": "C", "timeHours": 1, "hotmRequirement": 5, "items": {"B": 2}}
    ]"#;

    fn config_in(dir: &Path) -> AppConfig {
        let recipes_path = dir.join("forge_recipes.json");
        fs::write(&recipes_path, RECIPES).unwrap();
        AppConfig {
            snapshot_path: dir.join("products.json"),
            recipes_path,
            on_missing_ingredient: MissingIngredientPolicy::Zero,
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn full_run_filters_by_skill_and_remembers_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let state_path = dir.path().join("state.json");
        let source = StaticBazaar(bazaar_document());
        let mut input = Cursor::new("3\n2\n\n");
        let mut output = Vec::new();

        let report = run_with(&config, &source, Some(&state_path), &mut input, &mut output)
            .await
            .unwrap();

        assert_eq!(
            report,
            RunReport {
                origin: SnapshotOrigin::Downloaded,
                evaluated: 2,
                skipped: 1,
                diagnostics: 1,
                shown: 1,
            }
        );
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("| A "));
        assert!(!printed.contains("| C "));
        assert!(printed.contains("Press ENTER to end program"));

        let remembered = load_persisted_inputs(&state_path).unwrap();
        assert_eq!(remembered.hotm_level, Some(3));
        assert_eq!(remembered.forge_slots, Some(2));
    }

    #[tokio::test]
    async fn higher_skill_unlocks_gated_recipe_first() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let source = StaticBazaar(bazaar_document());
        let mut input = Cursor::new("5\n1\n\n");
        let mut output = Vec::new();

        let report = run_with(&config, &source, None, &mut input, &mut output)
            .await
            .unwrap();

        assert_eq!(report.shown, 2);
        let printed = String::from_utf8(output).unwrap();
        let c = printed.find("| C ").unwrap();
        let a = printed.find("| A ").unwrap();
        assert!(c < a, "C earns 490/h and must rank above A");
    }

    #[tokio::test]
    async fn invalid_catalog_aborts_before_prompting() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::write(
            &config.recipes_path,
            r#"[{"itemId": "A", "timeHours": 0, "hotmRequirement": 0, "items": {}}]"#,
        )
        .unwrap();
        let source = StaticBazaar(bazaar_document());
        let mut output = Vec::new();

        let err = run_with(&config, &source, None, &mut Cursor::new(""), &mut output)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Catalog(CatalogError::InvalidRecipe { .. })
        ));
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn rejected_download_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let source = StaticBazaar(r#"{"success": false, "lastUpdated": 0}"#.to_string());

        let err = run_with(&config, &source, None, &mut Cursor::new(""), &mut io::sink())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Snapshot(SnapshotError::Rejected)));
    }
}
