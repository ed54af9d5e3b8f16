use crate::config::toml_config::DispatchConfig;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "sos-dispatch")]
#[command(about = "Emergency SMS and call dispatcher")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "sos-dispatch.toml")]
    pub config: String,

    /// Host method to invoke (sendMessage, sendBulkMessage, makeCall, checkPermissions, requestPermissions)
    #[arg(short, long)]
    pub method: String,

    /// Method arguments as JSON; read from stdin when omitted
    #[arg(short, long)]
    pub args: Option<String>,

    /// Log instead of contacting the gateways
    #[arg(long)]
    pub dry_run: bool,

    /// Grant both capabilities regardless of the configured grants
    #[arg(long)]
    pub grant_all: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn apply_overrides(&self, config: &mut DispatchConfig) {
        if self.dry_run {
            config.dry_run = true;
            tracing::info!("🔧 Dry run enabled from command line");
        }
        if self.grant_all {
            config.grant_all();
            tracing::info!("🔧 All capabilities granted from command line");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Capability;

    #[test]
    fn test_parse_args_and_apply_overrides() {
        let cli = CliConfig::parse_from([
            "sos-dispatch",
            "--method",
            "makeCall",
            "--args",
            r#"{"number":"112"}"#,
            "--dry-run",
            "--grant-all",
        ]);
        assert_eq!(cli.method, "makeCall");
        assert_eq!(cli.config, "sos-dispatch.toml");

        let mut config = DispatchConfig::default();
        cli.apply_overrides(&mut config);
        assert!(config.dry_run);
        assert_eq!(config.permissions.granted, Capability::ALL.to_vec());
    }
}
