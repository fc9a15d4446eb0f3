use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ndarray::ArrayD;
use net_config::{NetParameter, NetState, Phase};

type Net = NetParameter<ArrayD<f32>>;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PhaseArg {
    Train,
    Test,
}

impl From<PhaseArg> for Phase {
    fn from(value: PhaseArg) -> Self {
        match value {
            PhaseArg::Train => Phase::Train,
            PhaseArg::Test => Phase::Test,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "net_config")]
#[command(about = "Lists the layers of a network active under a given state")]
struct Cli {
    /// JSON description of the network
    net: PathBuf,

    /// Phase of the run, the state of the file is used when omitted
    #[arg(long, value_enum)]
    phase: Option<PhaseArg>,

    /// Level of the run
    #[arg(long)]
    level: Option<i32>,

    /// Active stage, may be repeated; replaces the stages of the file when given
    #[arg(long = "stage")]
    stages: Vec<String>,
}

impl Cli {
    fn state(&self, base: &NetState) -> NetState {
        let mut state = base.clone();
        if let Some(phase) = self.phase {
            state.phase = phase.into();
        }
        if let Some(level) = self.level {
            state.level = level;
        }
        if !self.stages.is_empty() {
            state.stage = self.stages.iter().cloned().collect();
        }
        state
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let content = fs::read_to_string(&cli.net)
        .with_context(|| format!("cannot read '{}'", cli.net.display()))?;
    let net: Net = serde_json::from_str(&content)
        .with_context(|| format!("invalid network description '{}'", cli.net.display()))?;
    net.validate()?;

    let state = cli.state(&net.state);
    log::info!(
        "net '{}': {} layer(s), phase {}, level {}, stages {:?}",
        net.name,
        net.layer_size(),
        state.phase,
        state.level,
        state.stage
    );

    let filtered = net.filter(&state);
    for layer in filtered.layers() {
        println!("{} ({})", layer.name(), layer.layer_type());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_state() -> NetState {
        NetState::new(Phase::Test).with_level(2).with_stage("deploy")
    }

    #[test]
    fn state_defaults_to_the_file() {
        let cli = Cli::parse_from(["net_config", "net.json"]);
        assert_eq!(cli.state(&file_state()), file_state());
    }

    #[test]
    fn flags_replace_the_file_state() {
        let cli = Cli::parse_from([
            "net_config",
            "net.json",
            "--phase",
            "train",
            "--level",
            "5",
            "--stage",
            "a",
            "--stage",
            "b",
        ]);
        let state = cli.state(&file_state());

        assert_eq!(state.phase, Phase::Train);
        assert_eq!(state.level, 5);
        assert!(state.has_stage("a"));
        assert!(state.has_stage("b"));
        assert!(!state.has_stage("deploy"));
    }
}
