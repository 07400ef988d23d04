use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use events::ControlEvent;
use services::{
    color_resolver::resolve_color,
    config_watcher::send_reloaded,
    create_focus_watcher,
    create_layout_probe,
    detect_layout,
    ConfigWatcher,
    Controller,
    JsonFileStore,
    MemoryStore,
    Platform,
    Reconciler,
    SettingsStore,
    StatusIndicator,
};

#[derive(Parser, Debug)]
#[command(name = "layout-cursor")]
#[command(about = "Окрашивает курсор редактора в цвет активной раскладки клавиатуры")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Режим сухого запуска (эмуляция раскладки, настройки только в памяти)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает logging.level)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Запустить демон (по умолчанию).
    /// SIGUSR1 - переключить, SIGUSR2 - вернуть исходный цвет, SIGHUP - перечитать конфигурацию
    Run,
    /// Один раз определить раскладку и вывести её цвет
    Detect,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Загрузка конфигурации
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config = Config::load(&config_path)?;

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск layout-cursor v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {:?}", config_path);

    if args.dry_run {
        warn!("Режим сухого запуска - раскладка эмулируется, settings.json не изменяется");
    }

    let platform = Platform::current();
    info!("Платформа: {}", platform);

    match args.command.unwrap_or(Command::Run) {
        Command::Detect => detect_once(&config, platform, args.dry_run).await,
        Command::Run => run_daemon(config, config_path, platform, args.dry_run).await,
    }
}

async fn detect_once(config: &Config, platform: Platform, dry_run: bool) -> Result<()> {
    let probe = create_layout_probe(platform, dry_run);
    let layout = detect_layout(probe.as_ref(), config.cursor.probe_timeout()).await;
    let color = resolve_color(&layout, &config.cursor.layouts);

    println!("layout: {}", layout);
    println!("color: {}", color);
    Ok(())
}

async fn run_daemon(config: Config, config_path: PathBuf, platform: Platform, dry_run: bool) -> Result<()> {
    // Инициализация компонентов
    let indicator = Arc::new(StatusIndicator::new(config.status.resolve_path()));

    let store: Arc<dyn SettingsStore> = if dry_run {
        Arc::new(MemoryStore::new())
    } else {
        match config.settings.resolve_path() {
            Some(path) => {
                info!("Настройки редактора: {:?}", path);
                Arc::new(JsonFileStore::new(path))
            }
            None => anyhow::bail!("Не удалось определить путь к settings.json, укажите settings.path"),
        }
    };

    let probe = create_layout_probe(platform, dry_run);
    let reconciler = Reconciler::new(probe, store, Arc::clone(&indicator));
    let mut controller = Controller::new(&config.cursor, reconciler, indicator);
    let events_tx = controller.sender();

    info!("Все компоненты инициализированы");

    // Источники событий работают параллельно и пишут в канал контроллера
    let mut handles = Vec::new();

    if let Some(watcher) = create_focus_watcher(&config.focus, platform, events_tx.clone()) {
        handles.push(tokio::spawn(watcher.run()));
    }

    if config.watch.config_poll_interval_ms > 0 {
        let watcher = ConfigWatcher::new(
            config_path.clone(),
            Duration::from_millis(config.watch.config_poll_interval_ms),
            events_tx.clone(),
        );
        handles.push(tokio::spawn(watcher.run()));
    }

    handles.push(tokio::spawn(forward_signals(config_path, events_tx)));

    info!("Все сервисы запущены");

    // Контроллер работает до Shutdown и сам возвращает исходный цвет
    if let Err(e) = controller.run().await {
        error!("Ошибка в Controller: {}", e);
    }

    for handle in handles {
        handle.abort();
    }

    info!("layout-cursor завершил работу");
    Ok(())
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("layout-cursor").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("layout-cursor.toml"))
}

/// Переводит сигналы процесса в команды контроллера
#[cfg(unix)]
async fn forward_signals(config_path: PathBuf, events_tx: mpsc::Sender<ControlEvent>) {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut usr1, mut usr2, mut hup, mut term) = match (
        signal(SignalKind::user_defined1()),
        signal(SignalKind::user_defined2()),
        signal(SignalKind::hangup()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(usr1), Ok(usr2), Ok(hup), Ok(term)) => (usr1, usr2, hup, term),
        _ => {
            error!("Не удалось подписаться на сигналы, доступно только завершение по Ctrl+C");
            forward_ctrl_c(events_tx).await;
            return;
        }
    };

    loop {
        let event = tokio::select! {
            _ = usr1.recv() => ControlEvent::Toggle,
            _ = usr2.recv() => ControlEvent::Reset,
            _ = hup.recv() => {
                info!("Получен SIGHUP, перечитываем конфигурацию");
                if !send_reloaded(&config_path, &events_tx).await {
                    return;
                }
                continue;
            }
            _ = term.recv() => ControlEvent::Shutdown,
            result = tokio::signal::ctrl_c() => {
                if let Err(err) = result {
                    error!("Ошибка при ожидании сигнала завершения: {}", err);
                }
                ControlEvent::Shutdown
            }
        };

        info!("Получен сигнал: {}", event);
        let shutdown = event == ControlEvent::Shutdown;
        if events_tx.send(event).await.is_err() || shutdown {
            return;
        }
    }
}

#[cfg(not(unix))]
async fn forward_signals(_config_path: PathBuf, events_tx: mpsc::Sender<ControlEvent>) {
    forward_ctrl_c(events_tx).await;
}

async fn forward_ctrl_c(events_tx: mpsc::Sender<ControlEvent>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
        Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
    }
    let _ = events_tx.send(ControlEvent::Shutdown).await;
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }

    Ok(())
}
