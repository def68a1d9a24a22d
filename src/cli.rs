//! # 터미널 인터페이스
//!
//! 명령줄 인자, 편집자 결정 프롬프트, 메인 메뉴를 담당합니다.
//!
//! 메인 메뉴 명령:
//! - `spin`: 초안 → 리뷰 → 결정 사이클 한 번
//! - `search`: 승인본(`final`) 또는 의미 검색(`semantic`)
//! - `inspect`: 저장된 모든 버전을 표로 출력
//! - `exit`: 종료
//!
//! 입력은 `AsyncBufRead`이면 무엇이든 받을 수 있어서, 테스트에서는 바이트 슬라이스를 씁니다.

use async_trait::async_trait;
use clap::Parser;
use comfy_table::{presets, Cell, ContentArrangement, Table};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::config::Config;
use crate::models::{ChapterVersion, Decision, SearchHit};
use crate::services::text;
use crate::workflow::{Candidate, ChapterSession, CycleOutcome, Decider, RevisionWorkflow};

/// 표와 검색 결과에서 보여줄 미리보기 길이 (문자 수)
const SNIPPET_CHARS: usize = 100;

/// 명령줄 인자. 지정한 값은 환경변수 설정보다 우선합니다.
#[derive(Debug, Parser)]
#[command(name = "bookflow")]
#[command(about = "Human-in-the-loop chapter revision workflow", long_about = None)]
#[command(version)]
pub struct Args {
    /// 버전 원장에서 챕터를 구분하는 식별자
    #[arg(short, long)]
    pub chapter_id: Option<String>,

    /// 원문 챕터 URL
    #[arg(short, long)]
    pub url: Option<String>,

    /// 본문 컨테이너 CSS 선택자
    #[arg(short, long)]
    pub selector: Option<String>,

    /// 의미 검색 결과 개수
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,
}

impl Args {
    pub fn apply(self, config: &mut Config) {
        if let Some(chapter_id) = self.chapter_id {
            config.chapter_id = chapter_id;
        }
        if let Some(url) = self.url {
            config.url = url;
        }
        if let Some(selector) = self.selector {
            config.content_selector = selector;
        }
        if let Some(top_k) = self.top_k.filter(|k| *k > 0) {
            config.search_top_k = top_k;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Spin,
    Search,
    Inspect,
    Exit,
}

impl MenuCommand {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "spin" => Some(MenuCommand::Spin),
            "search" => Some(MenuCommand::Search),
            "inspect" => Some(MenuCommand::Inspect),
            "exit" | "quit" => Some(MenuCommand::Exit),
            _ => None,
        }
    }
}

/// 줄 단위 입력을 읽는 콘솔. 메뉴와 결정 프롬프트가 같은 입력을 공유합니다.
pub struct Console<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> Console<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// 질문을 출력하고 한 줄을 읽습니다. 입력이 끝나면(EOF) `None`.
    pub async fn ask(&mut self, question: &str) -> Option<String> {
        println!("{question}");
        match self.lines.next_line().await {
            Ok(Some(line)) => Some(line.trim().to_string()),
            Ok(None) => None,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read input");
                None
            }
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Decider for Console<R> {
    async fn decide(&mut self, candidate: &Candidate<'_>) -> Decision {
        println!("{}", render_candidate(candidate));

        let Some(concern) = self
            .ask("Any concern about the AI review itself? (press Enter to skip)")
            .await
        else {
            return Decision::Defer;
        };
        let concern = (!concern.is_empty()).then_some(concern);

        loop {
            let Some(command) = self
                .ask("Type 'approve', 'retry' to discard, 'defer', or give feedback for a rewrite:")
                .await
            else {
                // 입력이 끊기면 초안을 승인하지 않고 남겨둡니다.
                return Decision::Defer;
            };
            match Decision::from_command(&command, concern.as_deref()) {
                Some(decision) => return decision,
                None => println!("Feedback cannot be empty."),
            }
        }
    }
}

/// 메인 메뉴 루프. `exit`이나 입력 종료 시 돌아옵니다.
pub async fn run_menu<R: AsyncBufRead + Unpin + Send>(
    workflow: &RevisionWorkflow,
    session: &mut ChapterSession,
    console: &mut Console<R>,
    top_k: usize,
) {
    loop {
        let Some(input) = console
            .ask("\nChoose an action: spin / search / inspect / exit")
            .await
        else {
            return;
        };

        match MenuCommand::parse(&input) {
            Some(MenuCommand::Spin) => {
                let outcome = workflow.spin(session, console).await;
                println!("{}", render_outcome(&outcome));
            }
            Some(MenuCommand::Search) => search(workflow, session, console, top_k).await,
            Some(MenuCommand::Inspect) => match workflow.store().get_all(&session.chapter_id).await {
                Ok(versions) => println!("{}", render_versions(&versions)),
                Err(e) => println!("Could not load versions: {e}"),
            },
            Some(MenuCommand::Exit) => return,
            None => println!("Unknown command: {input}"),
        }
    }
}

async fn search<R: AsyncBufRead + Unpin + Send>(
    workflow: &RevisionWorkflow,
    session: &ChapterSession,
    console: &mut Console<R>,
    top_k: usize,
) {
    let Some(mode) = console.ask("Search 'final' or 'semantic'?").await else {
        return;
    };

    match mode.to_ascii_lowercase().as_str() {
        "final" => match workflow.store().get_approved(&session.chapter_id).await {
            Ok(Some(approved)) => println!("\n--- APPROVED VERSION ---\n{approved}"),
            Ok(None) => println!("No approved version found."),
            Err(e) => println!("Could not load the approved version: {e}"),
        },
        "semantic" => {
            let Some(query) = console.ask("Enter your search query:").await else {
                return;
            };
            if query.is_empty() {
                println!("Query cannot be empty.");
                return;
            }
            let hits = workflow
                .store()
                .semantic_search(&session.chapter_id, &query, top_k)
                .await;
            println!("{}", render_hits(&hits));
        }
        other => println!("Unknown search mode: {other}"),
    }
}

pub fn render_candidate(candidate: &Candidate<'_>) -> String {
    format!(
        "\n--- DRAFT v{} ({}) ---\n{}\n\n--- AI REVIEW ---\n{}\n",
        candidate.version_number, candidate.chapter_id, candidate.text, candidate.review
    )
}

pub fn render_outcome(outcome: &CycleOutcome) -> String {
    match outcome {
        CycleOutcome::Approved { version_number, .. } => {
            format!("Version {version_number} approved.")
        }
        CycleOutcome::Deferred { version_number, .. } => {
            format!("Version {version_number} saved as a draft for later.")
        }
        CycleOutcome::Discarded { version_number, .. } => {
            format!("Draft discarded. Continuing from version {version_number}.")
        }
        CycleOutcome::Failed {
            marker,
            reason,
            version_number,
            ..
        } => format!("{marker}\n{reason}\nStill at version {version_number}."),
        CycleOutcome::AlreadyApproved { version_number, .. } => {
            format!("Chapter already approved (version {version_number}). Nothing to do.")
        }
    }
}

/// inspect 명령의 버전 표: 번호, 상태, 단어 수, 미리보기
pub fn render_versions(versions: &[ChapterVersion]) -> String {
    if versions.is_empty() {
        return "No versions found.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Version", "Status", "Words", "Snippet"]);

    for version in versions {
        table.add_row(vec![
            Cell::new(version.version_number),
            Cell::new(version.status),
            Cell::new(version.word_count),
            Cell::new(text::snippet(&version.text, SNIPPET_CHARS)),
        ]);
    }
    table.to_string()
}

pub fn render_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No matching versions found.".to_string();
    }

    hits.iter()
        .enumerate()
        .map(|(rank, hit)| {
            format!(
                "{}. v{} [{}] similarity {:.3}\n   {}",
                rank + 1,
                hit.version_number,
                hit.status,
                hit.similarity,
                text::snippet(&hit.text, SNIPPET_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
