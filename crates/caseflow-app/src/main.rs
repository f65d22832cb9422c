//! # caseflow-app
//!
//! caseflow CLI 바이너리 진입점.
//! 설정 로드, 어댑터 생성(DI), 워크플로우 명령 실행.

mod commands;
mod console;
mod offline;

use anyhow::{Context, Result};
use caseflow_core::config::AppConfig;
use caseflow_core::config_manager::{ConfigManager, CONFIG_FILE_NAME};
use caseflow_core::models::case::CaseDraft;
use caseflow_network::http_client::HttpApiClient;
use caseflow_workflow::controller::{WorkflowController, WorkflowSettings};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::IcmChoice;
use crate::offline::{MemoryCaseStore, OfflineSimilarity};

/// caseflow — 케이스 작성 중 유사 ICM을 찾아 에스컬레이션 여부를 결정
#[derive(Parser, Debug)]
#[command(name = "caseflow")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 백엔드 URL 지정 (기본: 설정 파일의 server.base_url)
    #[arg(long, short = 's', global = true)]
    server: Option<String>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "warn", global = true)]
    log_level: String,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 요청할 유사 케이스 수 (1 ~ 20)
    #[arg(long, global = true)]
    top_k: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 유사 케이스 검색
    Recommend {
        #[command(flatten)]
        draft: DraftArgs,
        /// 결과를 JSON으로 출력
        #[arg(long)]
        json: bool,
    },
    /// 유사 케이스 검색 후 케이스 제출
    Submit {
        #[command(flatten)]
        draft: DraftArgs,
        /// ICM 권고 시 선택
        #[arg(long, value_enum, default_value = "cancel")]
        on_icm: IcmChoice,
    },
    /// 백엔드 없이 "DB timeout" 시나리오 실행
    Demo {
        #[arg(long, value_enum, default_value = "duplicate")]
        on_icm: IcmChoice,
    },
    /// 저장된 케이스 조회
    Cases {
        #[command(subcommand)]
        action: CasesCommand,
    },
    /// 백엔드 상태 확인
    Health,
}

#[derive(Subcommand, Debug)]
enum CasesCommand {
    /// 최근 케이스 목록
    List {
        #[arg(long, default_value = "20")]
        limit: u32,
        #[arg(long, default_value = "0")]
        offset: u32,
    },
    /// 케이스 상세
    Get {
        /// 케이스 ID
        id: String,
    },
}

/// 케이스 폼 입력
#[derive(clap::Args, Debug)]
struct DraftArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    #[arg(long, default_value = "")]
    product: String,
    #[arg(long, default_value = "3")]
    severity: String,
    #[arg(long, default_value = "Medium")]
    priority: String,
    #[arg(long)]
    component: Option<String>,
    #[arg(long)]
    error_message: Option<String>,
    #[arg(long)]
    stack_trace: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    tenant: Option<String>,
    /// 쉼표 구분 태그
    #[arg(long)]
    tags: Option<String>,
}

impl DraftArgs {
    fn into_draft(self) -> CaseDraft {
        let mut draft = CaseDraft::new(
            &self.title,
            &self.description,
            &self.product,
            &self.severity,
            &self.priority,
        );
        draft.component = self.component;
        draft.error_message = self.error_message;
        draft.stack_trace = self.stack_trace;
        draft.region = self.region;
        draft.tenant = self.tenant;
        draft.tags = self.tags;
        draft
    }
}

/// 설정 파일 경로 결정 (CLI 인자 또는 플랫폼별 기본 경로)
///
/// # 플랫폼별 기본 경로:
/// - macOS: `~/Library/Application Support/com.caseflow.caseflow/config.json`
/// - Windows: `%APPDATA%\caseflow\caseflow\config\config.json`
/// - Linux: `~/.config/caseflow/config.json`
fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| {
            ProjectDirs::from("com", "caseflow", "caseflow")
                .map(|p| p.config_dir().join(CONFIG_FILE_NAME))
        })
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// 설정 로드 후 CLI 인자로 덮어쓰기
fn load_config(args: &Args) -> Result<AppConfig> {
    let path = resolve_config_path(args.config.clone());
    let mut config = match ConfigManager::with_path(path) {
        Ok(manager) => {
            debug!("설정 파일: {}", manager.config_path().display());
            manager.get()
        }
        Err(e) => {
            warn!("설정 로드 실패, 기본 설정 사용: {e}");
            AppConfig::default_config()
        }
    };

    if let Some(server) = &args.server {
        config.server.base_url = server.clone();
    }
    if let Some(top_k) = args.top_k {
        config.recommendation.top_k = top_k;
    }
    config.validate().context("설정 검증 실패")?;
    Ok(config)
}

/// 워크플로우용 클라이언트 (재시도 없음)
fn workflow_client(config: &AppConfig) -> Result<Arc<HttpApiClient>> {
    let client = HttpApiClient::new(&config.server.base_url, config.server.request_timeout())?;
    info!("백엔드: {}", config.server.base_url);
    Ok(Arc::new(client))
}

/// 조회 전용 클라이언트 (`server.max_retries` 적용)
fn query_client(config: &AppConfig) -> Result<Arc<HttpApiClient>> {
    let client = HttpApiClient::new(&config.server.base_url, config.server.request_timeout())?
        .with_max_retries(config.server.max_retries);
    info!("백엔드: {}", config.server.base_url);
    Ok(Arc::new(client))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "caseflow={},caseflow_app={},caseflow_core={},caseflow_network={},caseflow_workflow={}",
        args.log_level, args.log_level, args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    let settings = WorkflowSettings::from_config(&config);

    match args.command {
        Command::Recommend { draft, json } => {
            let client = workflow_client(&config)?;
            let controller = WorkflowController::new(client.clone(), client, settings);
            commands::recommend(&controller, &draft.into_draft(), json).await
        }
        Command::Submit { draft, on_icm } => {
            let client = workflow_client(&config)?;
            let controller = WorkflowController::new(client.clone(), client, settings);
            commands::submit(&controller, draft.into_draft(), on_icm).await
        }
        Command::Demo { on_icm } => {
            let controller = WorkflowController::new(
                Arc::new(OfflineSimilarity::new()),
                Arc::new(MemoryCaseStore::new()),
                settings,
            );
            commands::demo(&controller, on_icm).await
        }
        Command::Cases { action } => {
            let client = query_client(&config)?;
            match action {
                CasesCommand::List { limit, offset } => {
                    commands::list_cases(client.as_ref(), limit, offset).await
                }
                CasesCommand::Get { id } => commands::get_case(client.as_ref(), &id).await,
            }
        }
        Command::Health => {
            let client = query_client(&config)?;
            commands::health(&client).await
        }
    }
}
