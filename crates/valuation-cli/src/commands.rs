use std::path::{Path, PathBuf};
use std::sync::Arc;

use analysis_store::{DisclaimerGate, DisclaimerStatus, SavedAnalyses};
use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use valuation_core::{AnalysisResult, KeyValueStore, ValuationInputs};
use valuation_orchestrator::ValuationOrchestrator;
use valuation_report::{format_date, ValuationReport, DISCLAIMER};

/// Where `analyze` reads its snapshot from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    Sample,
    File(PathBuf),
}

/// Where an exported report goes. `Default` picks a name from the company and year.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportTarget {
    Default,
    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Analyze {
        input: InputSource,
        save: Option<String>,
        export: Option<ExportTarget>,
        json: bool,
    },
    List,
    Show { id: String },
    Delete { id: String },
    Clear,
    AcceptDisclaimer,
    RevokeDisclaimer,
    Help,
}

impl Command {
    /// Parse arguments, excluding the program name.
    pub fn parse(args: &[String]) -> anyhow::Result<Self> {
        let Some(name) = args.first() else {
            return Ok(Command::Help);
        };
        let rest = &args[1..];

        match name.as_str() {
            "analyze" => {
                let input = if rest.iter().any(|a| a == "--sample") {
                    InputSource::Sample
                } else {
                    let path = positional_args(rest)
                        .next()
                        .ok_or_else(|| anyhow!("analyze needs an input file or --sample"))?;
                    InputSource::File(PathBuf::from(path))
                };

                let save = match rest.iter().position(|a| a == "--save") {
                    Some(i) => Some(
                        flag_value(rest, i)
                            .ok_or_else(|| anyhow!("--save needs a name"))?
                            .to_string(),
                    ),
                    None => None,
                };

                let export = rest.iter().position(|a| a == "--export").map(|i| {
                    match flag_value(rest, i) {
                        Some(path) => ExportTarget::Path(PathBuf::from(path)),
                        None => ExportTarget::Default,
                    }
                });

                Ok(Command::Analyze {
                    input,
                    save,
                    export,
                    json: rest.iter().any(|a| a == "--json"),
                })
            }
            "list" => Ok(Command::List),
            "show" => Ok(Command::Show { id: required_id(rest, "show")? }),
            "delete" => Ok(Command::Delete { id: required_id(rest, "delete")? }),
            "clear" => Ok(Command::Clear),
            "accept-disclaimer" => Ok(Command::AcceptDisclaimer),
            "revoke-disclaimer" => Ok(Command::RevokeDisclaimer),
            "help" | "--help" | "-h" => Ok(Command::Help),
            other => bail!("Unknown command '{}'", other),
        }
    }
}

/// Flags that consume the following argument as their value.
const VALUE_FLAGS: &[&str] = &["--save", "--export"];

/// Arguments that are neither flags nor a flag's value.
fn positional_args(args: &[String]) -> impl Iterator<Item = &str> {
    args.iter().enumerate().filter_map(move |(i, arg)| {
        let is_flag_value = i > 0
            && VALUE_FLAGS.contains(&args[i - 1].as_str())
            && flag_value(args, i - 1).is_some();
        (!arg.starts_with("--") && !is_flag_value).then_some(arg.as_str())
    })
}

fn flag_value(args: &[String], flag_index: usize) -> Option<&str> {
    args.get(flag_index + 1)
        .map(|s| s.as_str())
        .filter(|s| !s.starts_with("--"))
}

fn required_id(args: &[String], command: &str) -> anyhow::Result<String> {
    args.first()
        .cloned()
        .ok_or_else(|| anyhow!("{} needs an analysis id", command))
}

pub fn usage() -> String {
    [
        "Usage:",
        "  valuation-cli analyze FILE.json            Value the company described in FILE",
        "  valuation-cli analyze --sample             Value the bundled NCBA FY2024 sample",
        "  valuation-cli list                         List saved analyses, newest first",
        "  valuation-cli show ID                      Print a saved analysis",
        "  valuation-cli delete ID                    Delete a saved analysis",
        "  valuation-cli clear                        Delete all saved analyses",
        "  valuation-cli accept-disclaimer            Acknowledge the risk disclosure",
        "  valuation-cli revoke-disclaimer            Withdraw the acknowledgement",
        "",
        "Analyze options:",
        "  --save NAME        Keep the result under NAME",
        "  --export [PATH]    Write the report (.json for JSON, anything else for text)",
        "  --json             Print the full analysis record as JSON",
    ]
    .join("\n")
}

/// One CLI session. The disclaimer status is read once when the shell opens
/// and only changes through the accept/revoke commands.
pub struct Shell {
    orchestrator: ValuationOrchestrator,
    gate: DisclaimerGate,
    disclaimer: DisclaimerStatus,
}

impl Shell {
    pub async fn open(store: Arc<dyn KeyValueStore>, max_saved: usize) -> Self {
        let saved = SavedAnalyses::with_capacity(store.clone(), max_saved);
        let gate = DisclaimerGate::new(store);
        let disclaimer = gate.status().await;
        tracing::debug!("Disclaimer status: {:?}", disclaimer);

        Self {
            orchestrator: ValuationOrchestrator::new().with_saved_analyses(saved),
            gate,
            disclaimer,
        }
    }

    pub fn disclaimer(&self) -> DisclaimerStatus {
        self.disclaimer
    }

    /// Run one command and return what should be printed.
    pub async fn run(&mut self, command: Command) -> anyhow::Result<String> {
        match command {
            Command::Help => Ok(usage()),
            Command::AcceptDisclaimer => {
                self.gate.set_accepted(true).await?;
                self.disclaimer = DisclaimerStatus::Accepted;
                Ok(format!("{}\n\nDisclaimer accepted.", DISCLAIMER))
            }
            Command::RevokeDisclaimer => {
                self.gate.set_accepted(false).await?;
                self.disclaimer = DisclaimerStatus::Pending;
                Ok("Disclaimer acknowledgement withdrawn.".to_string())
            }
            Command::Analyze {
                input,
                save,
                export,
                json,
            } => {
                self.require_disclaimer()?;
                self.analyze(input, save, export, json).await
            }
            Command::List => {
                self.require_disclaimer()?;
                self.list().await
            }
            Command::Show { id } => {
                self.require_disclaimer()?;
                self.show(&id).await
            }
            Command::Delete { id } => {
                self.require_disclaimer()?;
                if self.orchestrator.delete_saved(&id).await? {
                    Ok(format!("Deleted {}", id))
                } else {
                    bail!("No saved analysis with id {}", id)
                }
            }
            Command::Clear => {
                self.require_disclaimer()?;
                self.orchestrator.clear_saved().await?;
                Ok("Cleared all saved analyses.".to_string())
            }
        }
    }

    fn require_disclaimer(&self) -> anyhow::Result<()> {
        if self.disclaimer.is_accepted() {
            return Ok(());
        }
        bail!(
            "{}\n\nRun `valuation-cli accept-disclaimer` to acknowledge this before continuing.",
            DISCLAIMER
        )
    }

    async fn analyze(
        &self,
        input: InputSource,
        save: Option<String>,
        export: Option<ExportTarget>,
        json: bool,
    ) -> anyhow::Result<String> {
        let inputs = load_inputs(&input).await?;
        let analysis = self.orchestrator.analyze(inputs)?;
        let report = ValuationReport::from_analysis(&analysis, analysis.timestamp);

        let mut output = if json {
            serde_json::to_string_pretty(&analysis)?
        } else {
            report.render_text()
        };

        if let Some(name) = save {
            match self.orchestrator.save(&name, &analysis).await {
                Some(entry) => output.push_str(&format!("\n\nSaved '{}' as {}", entry.name, entry.id)),
                None => output.push_str("\n\nCould not save the analysis; see the log for details."),
            }
        }

        if let Some(target) = export {
            let path = export_path(&report, target);
            export_report(&report, &path).await?;
            output.push_str(&format!("\n\nReport written to {}", path.display()));
        }

        Ok(output)
    }

    async fn show(&self, id: &str) -> anyhow::Result<String> {
        let saved = self.orchestrator.load_saved(id).await?;
        let report = ValuationReport::from_analysis(&saved.analysis, Utc::now());
        Ok(format!(
            "{} (saved {})\n\n{}",
            saved.name,
            format_date(&saved.created_at),
            report.render_text()
        ))
    }

    async fn list(&self) -> anyhow::Result<String> {
        let saved = self.orchestrator.list_saved().await?;
        if saved.is_empty() {
            return Ok("No saved analyses.".to_string());
        }

        let lines: Vec<String> = saved
            .iter()
            .map(|entry| describe(entry.id.as_str(), entry.name.as_str(), &entry.analysis, &entry.created_at))
            .collect();
        Ok(lines.join("\n"))
    }
}

fn describe(id: &str, name: &str, analysis: &AnalysisResult, created_at: &chrono::DateTime<Utc>) -> String {
    format!(
        "{}  {}  {} FY{}  {} ({:.2})  {}",
        id,
        name,
        analysis.inputs.company.name,
        analysis.inputs.company.financial_year,
        analysis.scoring.verdict.to_label(),
        analysis.scoring.total_weighted_score,
        format_date(created_at)
    )
}

async fn load_inputs(input: &InputSource) -> anyhow::Result<ValuationInputs> {
    match input {
        InputSource::Sample => Ok(ValuationInputs::sample()),
        InputSource::File(path) => {
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&data).with_context(|| format!("Invalid inputs in {}", path.display()))
        }
    }
}

fn export_path(report: &ValuationReport, target: ExportTarget) -> PathBuf {
    match target {
        ExportTarget::Path(path) => path,
        ExportTarget::Default => PathBuf::from(format!("{}.txt", report.file_stem)),
    }
}

async fn export_report(report: &ValuationReport, path: &Path) -> anyhow::Result<()> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let body = if is_json {
        report.to_json()?
    } else {
        report.render_text()
    };

    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Exported report to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_store::MemoryStore;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    async fn accepted_shell() -> Shell {
        let mut shell = Shell::open(Arc::new(MemoryStore::new()), 20).await;
        shell.run(Command::AcceptDisclaimer).await.unwrap();
        shell
    }

    fn sample_analyze(save: Option<&str>) -> Command {
        Command::Analyze {
            input: InputSource::Sample,
            save: save.map(|s| s.to_string()),
            export: None,
            json: false,
        }
    }

    #[test]
    fn test_parse_analyze() {
        let cmd = Command::parse(&args(&["analyze", "ncba.json", "--save", "NCBA", "--export", "--json"])).unwrap();
        assert_eq!(
            cmd,
            Command::Analyze {
                input: InputSource::File(PathBuf::from("ncba.json")),
                save: Some("NCBA".to_string()),
                export: Some(ExportTarget::Default),
                json: true,
            }
        );

        let cmd = Command::parse(&args(&["analyze", "--sample", "--export", "out.json"])).unwrap();
        assert_eq!(
            cmd,
            Command::Analyze {
                input: InputSource::Sample,
                save: None,
                export: Some(ExportTarget::Path(PathBuf::from("out.json"))),
                json: false,
            }
        );
    }

    #[test]
    fn test_parse_input_file_after_flags() {
        let expected = InputSource::File(PathBuf::from("ncba.json"));
        for argv in [
            vec!["analyze", "--json", "ncba.json"],
            vec!["analyze", "--save", "NCBA", "ncba.json"],
            vec!["analyze", "--export", "out.txt", "--json", "ncba.json"],
            vec!["analyze", "--export", "--json", "ncba.json"],
        ] {
            match Command::parse(&args(&argv)).unwrap() {
                Command::Analyze { input, .. } => assert_eq!(input, expected, "{:?}", argv),
                other => panic!("unexpected {:?}", other),
            }
        }

        // a flag value is never taken as the input file
        assert!(Command::parse(&args(&["analyze", "--save", "NCBA"])).is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse(&args(&["analyze"])).is_err());
        assert!(Command::parse(&args(&["analyze", "--sample", "--save"])).is_err());
        assert!(Command::parse(&args(&["show"])).is_err());
        assert!(Command::parse(&args(&["frobnicate"])).is_err());
        assert_eq!(Command::parse(&[]).unwrap(), Command::Help);
        assert_eq!(
            Command::parse(&args(&["delete", "abc"])).unwrap(),
            Command::Delete { id: "abc".to_string() }
        );
    }

    #[tokio::test]
    async fn test_analysis_requires_disclaimer() {
        let store = Arc::new(MemoryStore::new());
        let mut shell = Shell::open(store.clone(), 20).await;
        assert_eq!(shell.disclaimer(), DisclaimerStatus::Pending);

        let err = shell.run(sample_analyze(None)).await.unwrap_err();
        assert!(err.to_string().contains("accept-disclaimer"));
        assert!(shell.run(Command::List).await.is_err());

        shell.run(Command::AcceptDisclaimer).await.unwrap();
        assert!(shell.run(sample_analyze(None)).await.is_ok());

        // Persisted for the next session
        let next = Shell::open(store, 20).await;
        assert!(next.disclaimer().is_accepted());
    }

    #[tokio::test]
    async fn test_every_stored_data_command_is_gated() {
        let mut shell = Shell::open(Arc::new(MemoryStore::new()), 20).await;
        for command in [
            sample_analyze(None),
            Command::List,
            Command::Show { id: "x".to_string() },
            Command::Delete { id: "x".to_string() },
            Command::Clear,
        ] {
            let err = shell.run(command.clone()).await.unwrap_err();
            assert!(err.to_string().contains("accept-disclaimer"), "{:?}", command);
        }
        assert!(shell.run(Command::Help).await.unwrap().starts_with("Usage:"));
    }

    #[tokio::test]
    async fn test_revoke_closes_gate() {
        let mut shell = accepted_shell().await;
        shell.run(Command::RevokeDisclaimer).await.unwrap();
        assert!(shell.run(Command::List).await.is_err());
        assert!(shell.run(Command::Help).await.is_ok());
    }

    #[tokio::test]
    async fn test_analyze_sample_prints_report() {
        let mut shell = accepted_shell().await;
        let out = shell.run(sample_analyze(None)).await.unwrap();
        assert!(out.contains("NCBA Group PLC"));
        assert!(out.contains("BUY"));

        let out = shell
            .run(Command::Analyze {
                input: InputSource::Sample,
                save: None,
                export: None,
                json: true,
            })
            .await
            .unwrap();
        let parsed: AnalysisResult = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.inputs, ValuationInputs::sample());
    }

    #[tokio::test]
    async fn test_save_list_show_delete() {
        let mut shell = accepted_shell().await;
        let out = shell.run(sample_analyze(Some("NCBA FY2024"))).await.unwrap();
        assert!(out.contains("Saved 'NCBA FY2024'"));

        let listing = shell.run(Command::List).await.unwrap();
        assert!(listing.contains("NCBA FY2024"));
        let id = listing.split_whitespace().next().unwrap().to_string();

        let shown = shell.run(Command::Show { id: id.clone() }).await.unwrap();
        assert!(shown.starts_with("NCBA FY2024 (saved "));

        shell.run(Command::Delete { id: id.clone() }).await.unwrap();
        assert!(shell.run(Command::Delete { id }).await.is_err());
        assert_eq!(shell.run(Command::List).await.unwrap(), "No saved analyses.");
    }

    #[tokio::test]
    async fn test_analyze_file_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("ncba.json");
        std::fs::write(&input_path, serde_json::to_string(&ValuationInputs::sample()).unwrap()).unwrap();
        let export_path = dir.path().join("report.json");

        let mut shell = accepted_shell().await;
        let out = shell
            .run(Command::Analyze {
                input: InputSource::File(input_path),
                save: None,
                export: Some(ExportTarget::Path(export_path.clone())),
                json: false,
            })
            .await
            .unwrap();
        assert!(out.contains("Report written to"));

        let exported: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&export_path).unwrap()).unwrap();
        assert_eq!(exported["companyName"], "NCBA Group PLC");
    }

    #[tokio::test]
    async fn test_invalid_file_inputs_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let mut inputs = ValuationInputs::sample();
        inputs.market.current_stock_price = 0.0;
        std::fs::write(&path, serde_json::to_string(&inputs).unwrap()).unwrap();

        let mut shell = accepted_shell().await;
        let err = shell
            .run(Command::Analyze {
                input: InputSource::File(path),
                save: None,
                export: None,
                json: false,
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("current_stock_price"));
    }
}
