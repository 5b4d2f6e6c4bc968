//! Command-line arguments
//!
//! Flags sit on top of the layered configuration: defaults, then the TOML
//! file, then `BUDDY_*` environment variables, then these flags.

use std::path::PathBuf;

use clap::Parser;

use presenter_core::ConfigOverrides;

/// buddy - a chat companion that talks while it types
#[derive(Parser, Debug)]
#[command(name = "buddy-tui")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Chat relay base URL
    #[arg(short = 'u', long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Delay between revealed characters
    #[arg(long, value_name = "MS")]
    pub typewriter_delay_ms: Option<u64>,

    /// Mouth swap interval while talking
    #[arg(long, value_name = "MS")]
    pub mouth_interval_ms: Option<u64>,

    /// Time the avatar keeps talking after the text runs out
    #[arg(long, value_name = "MS")]
    pub grace_period_ms: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "BUDDY_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Ring the terminal bell as characters are typed
    #[arg(long)]
    pub sound: bool,

    /// Write logs to this file (the terminal is taken by the UI)
    #[arg(long, env = "BUDDY_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Flags that override configuration values
    pub fn to_overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ref url) = self.base_url {
            overrides = overrides.with_base_url(url);
        }
        if let Some(ms) = self.typewriter_delay_ms {
            overrides = overrides.with_typewriter_delay_ms(ms);
        }
        if let Some(ms) = self.mouth_interval_ms {
            overrides = overrides.with_mouth_interval_ms(ms);
        }
        if let Some(ms) = self.grace_period_ms {
            overrides = overrides.with_grace_period_ms(ms);
        }
        if self.sound {
            overrides = overrides.with_sound(true);
        }
        overrides
    }
}
