use bevy::prelude::Resource;
use clap::Parser;
use std::path::PathBuf;

/// Waymark: AR walking navigation, simulated.
///
/// Runs one navigation session against simulated location, compass, plane
/// detection and routing services, with a scripted observer walking the route.
#[derive(Parser, Debug, Resource, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/00_city_walk.toml")]
    pub scenario: PathBuf,

    /// Run the simulation in headless mode (without a graphical window).
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Skip plane detection, heading alignment and waiting at the start.
    #[arg(long, default_value_t = false)]
    pub offline: bool,

    /// Print the resolved scenario as TOML once it is loaded.
    #[arg(long, default_value_t = false)]
    pub dump_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse() {
        let cli = Cli::parse_from(["waymark_sim", "--headless", "--offline", "-s", "walk.toml"]);
        assert!(cli.headless);
        assert!(cli.offline);
        assert!(!cli.dump_config);
        assert_eq!(cli.scenario, PathBuf::from("walk.toml"));
    }

    #[test]
    fn defaults_point_at_the_bundled_scenario() {
        let cli = Cli::parse_from(["waymark_sim"]);
        assert!(!cli.headless);
        assert_eq!(cli.scenario, PathBuf::from("assets/scenarios/00_city_walk.toml"));
    }
}
