use clap::Parser;
use sos_dispatch::app::channel::HostMethod;
use sos_dispatch::app::serve_call;
use sos_dispatch::utils::{logger, validation::Validate};
use sos_dispatch::{CliConfig, DispatchConfig, MethodCall, MethodResult};
use std::io::Read;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let mut config = match DispatchConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting sos-dispatch");
    cli.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    // 只有發送類方法需要參數，未提供時從 stdin 讀取
    let takes_arguments = matches!(
        HostMethod::parse(&cli.method),
        Some(HostMethod::SendMessage | HostMethod::SendBulkMessage | HostMethod::MakeCall)
    );
    let raw_args = match &cli.args {
        Some(args) => args.clone(),
        None if !takes_arguments => String::new(),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let arguments = if raw_args.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(&raw_args)?
    };

    let reply = serve_call(&config, &MethodCall::new(cli.method.clone(), arguments)).await;
    println!("{}", serde_json::to_string_pretty(&reply)?);

    // 根據結果類型決定退出碼
    match reply.result {
        MethodResult::Success { .. } => Ok(()),
        MethodResult::Error { .. } => std::process::exit(2),
        MethodResult::NotImplemented => std::process::exit(3),
    }
}
