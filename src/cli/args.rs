//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

/// Offload camera media from mounted DCIM volumes
#[derive(Parser, Debug)]
#[command(
    name = "dcim-offload",
    version,
    about = "Offload camera media from mounted DCIM volumes",
    long_about = "Scans mounted volumes for DCIM trees, catalogs every media file, \
                  and copies anything not already present into a dated directory \
                  inside each destination. Re-running after an interruption finishes \
                  only what is missing."
)]
pub struct Args {
    /// Destination directories; each receives a full copy
    #[arg(required_unless_present = "init_config", value_name = "DEST")]
    pub destinations: Vec<PathBuf>,

    /// Tag appended to the dated destination directory name
    #[arg(short, long, default_value = "Downloaded Images")]
    pub tag: String,

    /// Description embedded in each image's XMP sidecar
    #[arg(short, long)]
    pub description: Option<String>,

    /// Only offload files the camera marked write-protected
    #[arg(short = 'L', long)]
    pub locked_only: bool,

    /// Eject source volumes after a clean run
    #[arg(short, long)]
    pub eject: bool,

    /// Open the photo editor on the new directory when done
    #[arg(short, long)]
    pub automate: bool,

    /// Run the configured media-pool importer on the new directory when done
    #[arg(short, long)]
    pub resolve: bool,

    /// Use a specific config file instead of the standard location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write a default config file to the standard location and exit
    #[arg(long)]
    pub init_config: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destinations_and_defaults() {
        let args = Args::parse_from(["dcim-offload", "/backup", "/archive"]);
        assert_eq!(args.destinations.len(), 2);
        assert_eq!(args.tag, "Downloaded Images");
        assert!(!args.locked_only);
        assert!(!args.eject);
    }

    #[test]
    fn test_flags_parse() {
        let args = Args::parse_from([
            "dcim-offload",
            "-L",
            "--eject",
            "--tag",
            "Alaska",
            "--description",
            "Day 3",
            "/backup",
        ]);
        assert!(args.locked_only);
        assert!(args.eject);
        assert_eq!(args.tag, "Alaska");
        assert_eq!(args.description.as_deref(), Some("Day 3"));
    }

    #[test]
    fn test_init_config_needs_no_destination() {
        let args = Args::parse_from(["dcim-offload", "--init-config"]);
        assert!(args.init_config);
        assert!(args.destinations.is_empty());
    }

    #[test]
    fn test_destination_is_required_otherwise() {
        assert!(Args::try_parse_from(["dcim-offload"]).is_err());
    }
}
