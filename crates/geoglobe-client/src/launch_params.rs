//! Launch parameter parsing for the globe.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use bevy::prelude::*;
use geoglobe::{ControllerConfig, SourceConfig};

/// Launch parameters for the globe.
#[derive(Resource, Debug, Clone, Default)]
pub struct LaunchParams {
    pub source: SourceConfig,
    pub controller: ControllerConfig,
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;
    use geoglobe::markers::COUNTRY_POPULATION_THRESHOLD;
    use geoglobe::viewport::CITY_ZOOM_THRESHOLD;
    use geoglobe::{DEFAULT_BASE_URL, DEFAULT_BOUNDARIES_PATH};

    use super::*;

    #[derive(Parser)]
    #[command(about = "Interactive country and population globe")]
    struct CliArgs {
        /// Server the boundary file and city API are fetched from.
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        server: String,

        /// Server path of the country boundary collection.
        #[arg(long, default_value = DEFAULT_BOUNDARIES_PATH)]
        boundaries: String,

        /// Read country boundaries from a local GeoJSON file instead.
        #[arg(long)]
        boundaries_file: Option<PathBuf>,

        /// Minimum population for a country marker.
        #[arg(long, default_value_t = COUNTRY_POPULATION_THRESHOLD)]
        population_threshold: u64,

        /// Camera altitude (globe radii) below which cities are loaded.
        #[arg(long, default_value_t = CITY_ZOOM_THRESHOLD)]
        zoom_threshold: f64,

        /// Skip the city load at startup.
        #[arg(long)]
        no_startup_cities: bool,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        LaunchParams {
            source: SourceConfig {
                base_url: args.server,
                boundaries_path: args.boundaries,
                boundaries_file: args.boundaries_file,
                ..SourceConfig::default()
            },
            controller: ControllerConfig {
                population_threshold: args.population_threshold,
                zoom_threshold: args.zoom_threshold,
                load_cities_on_startup: !args.no_startup_cities,
                ..ControllerConfig::default()
            },
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}
