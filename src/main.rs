use anyhow::Result;
use clap::Parser;
use odap_clean::{logger, App, Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令
    let cli = Cli::parse();

    // 加载配置
    let config = match std::env::var("ODAP_CONFIG") {
        Ok(path) => Config::load(path)?,
        Err(_) => Config::load("config.toml")?,
    };

    // 初始化日志
    logger::init_with(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).await?.run(cli.command).await?;

    Ok(())
}
