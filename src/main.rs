use clap::Parser;
use std::collections::HashMap;
use timetable_admin::core::engine::ImportEngine;
use timetable_admin::core::pipeline::ImportPipeline;
use timetable_admin::domain::model::{LeaveUpdate, PushNotification};
use timetable_admin::domain::ports::Storage;
use timetable_admin::utils::error::{ErrorSeverity, TimetableError};
use timetable_admin::utils::keys::{firebase_email_from_key, firebase_key_from_email};
use timetable_admin::utils::logger::{self, LogFormat};
use timetable_admin::utils::validation::Validate;
use timetable_admin::{AppConfig, Backend, CliConfig, Command, LocalStorage};

fn exit_code(e: &TimetableError) -> i32 {
    // 根據錯誤嚴重程度決定退出碼
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: &TimetableError, production: bool) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.public_message(production));
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(exit_code(e));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(cli.verbose, format);

    // 金鑰轉換不需要設定檔
    match &cli.command {
        Command::EmailKey { email } => {
            println!("{}", firebase_key_from_email(email));
            return Ok(());
        }
        Command::KeyEmail { key } => {
            match firebase_email_from_key(key) {
                Some(email) => println!("{}", email),
                None => {
                    eprintln!("❌ '{}' is not a valid email key", key);
                    std::process::exit(1);
                }
            }
            return Ok(());
        }
        _ => {}
    }

    tracing::info!("📁 Loading configuration from: {}", cli.config);
    let config = match AppConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let production = config.is_production();
    let backend = Backend::from_config(&config).unwrap_or_else(|e| fail(&e, production));

    match cli.command {
        Command::Import {
            record_type,
            file,
            dry_run,
            report,
        } => {
            let storage = LocalStorage::new(".");
            let balance_sync = config
                .sync_leave_balances()
                .then(|| backend.directory.clone());
            let pipeline =
                ImportPipeline::new(storage.clone(), file, record_type, backend.store.clone())
                    .with_balance_sync(balance_sync);
            let engine = ImportEngine::new(pipeline).with_dry_run(dry_run);

            let outcome = engine.run().await.unwrap_or_else(|e| fail(&e, production));

            if let Some(path) = report {
                let json = serde_json::to_vec_pretty(&outcome.report)?;
                if let Err(e) = storage.write_file(&path, &json).await {
                    fail(&e, production);
                }
                println!("📝 Report written to {}", path);
            }

            if !outcome.is_success() {
                for message in outcome.report.error_messages() {
                    eprintln!("{}", message);
                }
                eprintln!(
                    "❌ {} errors, nothing imported",
                    outcome.report.errors.len()
                );
                std::process::exit(2);
            }

            match outcome.load {
                Some(summary) => {
                    println!("✅ Imported {} {} records", summary.inserted, record_type);
                    if summary.balances_published + summary.balances_failed > 0 {
                        println!(
                            "📤 Leave balances published: {}, failed: {}",
                            summary.balances_published, summary.balances_failed
                        );
                    }
                }
                None => println!(
                    "🔍 Dry run: {} {} records are valid",
                    outcome.report.records.len(),
                    record_type
                ),
            }
        }
        Command::NotifyLeave {
            email,
            leave_type,
            from,
            to,
            status,
            remarks,
        } => {
            let update = LeaveUpdate {
                faculty_email: email,
                leave_type,
                from,
                to,
                status,
                remarks,
            };
            let delivered = backend.notifier().notify_leave(&update).await;
            report_delivery(delivered);
        }
        Command::Push {
            email,
            title,
            body,
            data,
        } => {
            let notification = PushNotification {
                title,
                body,
                data: data.into_iter().collect::<HashMap<_, _>>(),
            };
            let delivered = backend.notifier().notify(&email, &notification).await;
            report_delivery(delivered);
        }
        Command::EmailKey { .. } | Command::KeyEmail { .. } => {}
    }

    Ok(())
}

fn report_delivery(delivered: bool) {
    if delivered {
        println!("✅ Notification delivered");
    } else {
        eprintln!("⚠️ Notification was not delivered to any device");
        std::process::exit(2);
    }
}
