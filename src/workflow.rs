//! # 수정 워크플로 (Revision Workflow)
//!
//! 챕터 하나를 초안 → 리뷰 → 사람의 결정 → (승인 | 다시 쓰기 | 폐기 | 보류)로
//! 이끄는 상태 기계입니다.
//!
//! ```text
//!            ┌──────────── refine(feedback) ────────────┐
//!            ▼                                          │
//! DRAFTING ──▶ REVIEWING ──▶ AWAITING_DECISION ──────────┤
//!                                   │ approve  → APPROVED  (승인본 저장)
//!                                   │ discard  → DISCARDED (사이클 이전 상태로)
//!                                   │ defer    → DEFERRED  (초안 유지, 승인 안 함)
//! ```
//!
//! - 외부 호출(생성, 저장, 사람 입력)은 모두 순서대로 await합니다. 병렬 호출은 없습니다.
//! - 생성 실패는 재시도하지 않고 `CycleOutcome::Failed`로 사람에게 돌려줍니다.
//! - 저장 실패는 로그만 남기고 메모리 상태로 계속 진행합니다.
//! - 버전 번호 할당(최신 조회 후 +1)은 챕터당 작성자가 하나라고 가정합니다.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Decision, Generation, VersionStatus};
use crate::services::agents::Reviser;
use crate::services::source::TextSource;
use crate::store::VersionStore;

/// 사람에게 보여줄 초안 한 건
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub chapter_id: &'a str,
    pub version_number: i64,
    pub text: &'a str,
    pub review: &'a str,
}

/// 사람 결정 경계. 초안과 리뷰를 보여주고 결정이 나올 때까지 기다립니다.
#[async_trait]
pub trait Decider: Send {
    async fn decide(&mut self, candidate: &Candidate<'_>) -> Decision;
}

/// 한 챕터의 실행 중 상태
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterSession {
    pub chapter_id: String,
    /// 비평의 기준이 되는 원문 (변하지 않음)
    pub original_text: String,
    /// 다음 사이클에서 다시 쓸 텍스트
    pub current_text: String,
    pub current_version: i64,
    /// 이번 실행에서 이미 승인했는지
    pub approved: bool,
}

/// 한 사이클의 종료 상태
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Approved { text: String, version_number: i64 },
    Deferred { text: String, version_number: i64 },
    /// 사이클 이전의 텍스트와 번호로 되돌아감
    Discarded { text: String, version_number: i64 },
    /// 작가가 실패함. `text`/`version_number`는 실패 직전까지 유효했던 상태
    Failed {
        marker: &'static str,
        reason: String,
        text: String,
        version_number: i64,
    },
    /// 이번 실행에서 이미 승인된 챕터: 아무 것도 하지 않음
    AlreadyApproved { text: String, version_number: i64 },
}

impl CycleOutcome {
    /// 호출한 쪽이 이어갈 `(current_text, current_version)`
    pub fn state(&self) -> (&str, i64) {
        match self {
            CycleOutcome::Approved { text, version_number }
            | CycleOutcome::Deferred { text, version_number }
            | CycleOutcome::Discarded { text, version_number }
            | CycleOutcome::Failed { text, version_number, .. }
            | CycleOutcome::AlreadyApproved { text, version_number } => (text, *version_number),
        }
    }
}

pub struct RevisionWorkflow {
    store: VersionStore,
    reviser: Arc<dyn Reviser>,
}

impl RevisionWorkflow {
    pub fn new(store: VersionStore, reviser: Arc<dyn Reviser>) -> Self {
        Self { store, reviser }
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    /// 원문을 가져와 version 0으로 저장하고, 저장소의 최신 버전에서 세션을 시작합니다.
    ///
    /// 원문을 가져오지 못하면 `FetchFailure`로 시작하지 않습니다.
    /// 저장소에 접근할 수 없으면 원문(version 0)에서 메모리로만 시작합니다.
    pub async fn initialize(
        &self,
        chapter_id: &str,
        source: &dyn TextSource,
    ) -> Result<ChapterSession, AppError> {
        tracing::info!(chapter_id, source = source.identifier(), "Initializing chapter");
        let original_text = source.fetch_original().await?;
        if original_text.trim().is_empty() {
            return Err(AppError::FetchFailure(format!(
                "{} produced no text",
                source.identifier()
            )));
        }

        self.persist(chapter_id, 0, VersionStatus::Original, &original_text)
            .await;

        let (current_text, current_version) = match self.store.get_latest(chapter_id).await {
            Ok(Some(latest)) => (latest.text, latest.version_number),
            Ok(None) => (original_text.clone(), 0),
            Err(e) => {
                tracing::warn!(chapter_id, error = %e, "Could not load latest version; starting from the original");
                (original_text.clone(), 0)
            }
        };

        tracing::info!(chapter_id, current_version, "Chapter ready");
        Ok(ChapterSession {
            chapter_id: chapter_id.to_string(),
            original_text,
            current_text,
            current_version,
            approved: false,
        })
    }

    /// 세션에서 한 사이클을 돌리고 결과를 세션에 반영합니다.
    pub async fn spin(
        &self,
        session: &mut ChapterSession,
        decider: &mut dyn Decider,
    ) -> CycleOutcome {
        if session.approved {
            tracing::info!(chapter_id = %session.chapter_id, "Chapter already approved in this run");
            return CycleOutcome::AlreadyApproved {
                text: session.current_text.clone(),
                version_number: session.current_version,
            };
        }

        let outcome = self
            .run_cycle(
                &session.chapter_id,
                &session.original_text,
                &session.current_text,
                session.current_version,
                decider,
            )
            .await;

        let (text, version_number) = outcome.state();
        session.current_text = text.to_string();
        session.current_version = version_number;
        if matches!(outcome, CycleOutcome::Approved { .. }) {
            session.approved = true;
        }
        outcome
    }

    /// 초안 → 리뷰 → 결정 사이클 하나.
    ///
    /// `refine` 결정은 호출자에게 돌아가지 않고 다시 리뷰 단계로 이어집니다.
    pub async fn run_cycle(
        &self,
        chapter_id: &str,
        original_text: &str,
        current_text: &str,
        current_version: i64,
        decider: &mut dyn Decider,
    ) -> CycleOutcome {
        // ── DRAFTING ──
        let mut spun_text = match self.reviser.rewrite(current_text).await {
            Generation::Generated(text) => text,
            Generation::Failed { marker, reason } => {
                tracing::warn!(chapter_id, %reason, "Draft generation failed; cycle abandoned");
                return CycleOutcome::Failed {
                    marker,
                    reason,
                    text: current_text.to_string(),
                    version_number: current_version,
                };
            }
        };
        let mut version_number = self.next_version(chapter_id, current_version).await;
        self.persist(chapter_id, version_number, VersionStatus::AiDraft, &spun_text)
            .await;

        loop {
            // ── REVIEWING ──
            let review = self.reviser.critique(original_text, &spun_text).await;
            if let Generation::Failed { reason, .. } = &review {
                tracing::warn!(chapter_id, version_number, %reason, "Review unavailable");
            }

            // ── AWAITING_DECISION ──
            let candidate = Candidate {
                chapter_id,
                version_number,
                text: &spun_text,
                review: review.display_text(),
            };
            let decision = Self::await_decision(decider, &candidate).await;

            match decision {
                Decision::Approve => {
                    self.persist(chapter_id, version_number, VersionStatus::Approved, &spun_text)
                        .await;
                    tracing::info!(chapter_id, version_number, "Chapter approved");
                    return CycleOutcome::Approved {
                        text: spun_text,
                        version_number,
                    };
                }
                Decision::Discard => {
                    tracing::info!(chapter_id, discarded = version_number, "Draft discarded");
                    return CycleOutcome::Discarded {
                        text: current_text.to_string(),
                        version_number: current_version,
                    };
                }
                Decision::Defer => {
                    tracing::info!(chapter_id, version_number, "Draft deferred");
                    return CycleOutcome::Deferred {
                        text: spun_text,
                        version_number,
                    };
                }
                Decision::Refine(feedback) => {
                    let refined = self
                        .reviser
                        .refine(&spun_text, &feedback.combined())
                        .await;
                    match refined {
                        Generation::Generated(text) => {
                            spun_text = text;
                            version_number = self.next_version(chapter_id, version_number).await;
                            self.persist(
                                chapter_id,
                                version_number,
                                VersionStatus::HumanEditedDraft,
                                &spun_text,
                            )
                            .await;
                        }
                        Generation::Failed { marker, reason } => {
                            tracing::warn!(chapter_id, version_number, %reason, "Refinement failed");
                            return CycleOutcome::Failed {
                                marker,
                                reason,
                                text: spun_text,
                                version_number,
                            };
                        }
                    }
                }
            }
        }
    }

    /// 빈 피드백은 결정으로 인정하지 않고 다시 묻습니다.
    async fn await_decision(decider: &mut dyn Decider, candidate: &Candidate<'_>) -> Decision {
        loop {
            match decider.decide(candidate).await {
                Decision::Refine(feedback) if feedback.direction.trim().is_empty() => {
                    tracing::warn!("Empty feedback rejected; asking again");
                }
                decision => return decision,
            }
        }
    }

    /// 다음 초안 번호.
    ///
    /// 폐기된 초안의 번호는 다시 쓰지 않도록 저장소의 최댓값도 함께 봅니다.
    /// 저장소를 읽을 수 없으면 현재 번호 + 1입니다.
    async fn next_version(&self, chapter_id: &str, current_version: i64) -> i64 {
        let stored_max = match self.store.get_latest(chapter_id).await {
            Ok(latest) => latest.map_or(current_version, |v| v.version_number),
            Err(e) => {
                tracing::warn!(chapter_id, error = %e, "Could not read latest version number");
                current_version
            }
        };
        stored_max.max(current_version) + 1
    }

    /// 저장 실패는 워크플로를 멈추지 않습니다.
    async fn persist(&self, chapter_id: &str, version_number: i64, status: VersionStatus, text: &str) {
        if let Err(e) = self.store.put(chapter_id, version_number, status, text).await {
            tracing::error!(
                chapter_id,
                version_number,
                status = %status,
                code = e.code(),
                error = %e,
                "Failed to save version; continuing in memory"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{
        Feedback, REFINEMENT_FAILED_MARKER, REVIEWER_FAILED_MARKER, WRITER_FAILED_MARKER,
    };
    use crate::services::embedding::LexicalEmbedder;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// 미리 정해둔 결과를 순서대로 돌려주는 작가/리뷰어
    #[derive(Default)]
    struct ScriptedReviser {
        rewrites: Mutex<VecDeque<Generation>>,
        refinements: Mutex<VecDeque<Generation>>,
        reviews: Mutex<VecDeque<Generation>>,
        refine_requests: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedReviser {
        fn with_rewrites(rewrites: Vec<Generation>) -> Self {
            Self {
                rewrites: Mutex::new(rewrites.into()),
                ..Default::default()
            }
        }

        fn refinements(self, refinements: Vec<Generation>) -> Self {
            *self.refinements.lock().unwrap() = refinements.into();
            self
        }

        fn reviews(self, reviews: Vec<Generation>) -> Self {
            *self.reviews.lock().unwrap() = reviews.into();
            self
        }
    }

    #[async_trait]
    impl Reviser for ScriptedReviser {
        async fn rewrite(&self, _text: &str) -> Generation {
            self.rewrites
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected rewrite call")
        }

        async fn critique(&self, _original: &str, candidate: &str) -> Generation {
            self.reviews
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Generation::Generated(format!("review of {candidate}")))
        }

        async fn refine(&self, draft: &str, feedback: &str) -> Generation {
            self.refine_requests
                .lock()
                .unwrap()
                .push((draft.to_string(), feedback.to_string()));
            self.refinements
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected refine call")
        }
    }

    /// 미리 정해둔 결정을 순서대로 내리고, 본 초안을 기록하는 결정자
    struct ScriptedDecider {
        decisions: VecDeque<Decision>,
        seen: Vec<(i64, String, String)>,
    }

    impl ScriptedDecider {
        fn new(decisions: Vec<Decision>) -> Self {
            Self {
                decisions: decisions.into(),
                seen: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl Decider for ScriptedDecider {
        async fn decide(&mut self, candidate: &Candidate<'_>) -> Decision {
            self.seen.push((
                candidate.version_number,
                candidate.text.to_string(),
                candidate.review.to_string(),
            ));
            self.decisions.pop_front().expect("unexpected decision request")
        }
    }

    struct StaticSource(Result<String, String>);

    #[async_trait]
    impl TextSource for StaticSource {
        async fn fetch_original(&self) -> Result<String, AppError> {
            self.0.clone().map_err(AppError::FetchFailure)
        }

        fn identifier(&self) -> &str {
            "static"
        }
    }

    fn generated(text: &str) -> Generation {
        Generation::Generated(text.to_string())
    }

    fn refine(direction: &str) -> Decision {
        Decision::Refine(Feedback::new(direction, None).unwrap())
    }

    async fn workflow(reviser: ScriptedReviser) -> (RevisionWorkflow, Arc<ScriptedReviser>) {
        let pool = db::connect_in_memory().await.unwrap();
        let store = VersionStore::from_pool(pool, Arc::new(LexicalEmbedder::default()));
        let reviser = Arc::new(reviser);
        (RevisionWorkflow::new(store, reviser.clone()), reviser)
    }

    async fn history(workflow: &RevisionWorkflow, chapter_id: &str) -> Vec<(i64, VersionStatus, String)> {
        workflow
            .store()
            .get_all(chapter_id)
            .await
            .unwrap()
            .into_iter()
            .map(|v| (v.version_number, v.status, v.text))
            .collect()
    }

    #[tokio::test]
    async fn initialize_stores_exactly_one_original() {
        let (workflow, _) = workflow(ScriptedReviser::default()).await;
        let source = StaticSource(Ok("Alpha".into()));

        let session = workflow.initialize("ch1", &source).await.unwrap();
        workflow.initialize("ch1", &source).await.unwrap();

        assert_eq!(session.current_version, 0);
        assert_eq!(session.current_text, "Alpha");
        let originals: Vec<_> = history(&workflow, "ch1")
            .await
            .into_iter()
            .filter(|(n, s, _)| *n == 0 && *s == VersionStatus::Original)
            .collect();
        assert_eq!(originals.len(), 1);
    }

    #[tokio::test]
    async fn initialize_resumes_from_latest_version() {
        let (workflow, _) = workflow(ScriptedReviser::default()).await;
        workflow
            .store()
            .put("ch1", 3, VersionStatus::HumanEditedDraft, "Delta")
            .await
            .unwrap();

        let session = workflow
            .initialize("ch1", &StaticSource(Ok("Alpha".into())))
            .await
            .unwrap();
        assert_eq!(session.original_text, "Alpha");
        assert_eq!((session.current_text.as_str(), session.current_version), ("Delta", 3));
    }

    #[tokio::test]
    async fn fetch_failure_prevents_start() {
        let (workflow, _) = workflow(ScriptedReviser::default()).await;
        let err = workflow
            .initialize("ch1", &StaticSource(Err("offline".into())))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(history(&workflow, "ch1").await.is_empty());
    }

    #[tokio::test]
    async fn refine_then_approve_records_full_history() {
        let reviser = ScriptedReviser::with_rewrites(vec![generated("Beta")])
            .refinements(vec![generated("Gamma")]);
        let (workflow, reviser) = workflow(reviser).await;
        let mut session = workflow
            .initialize("ch1", &StaticSource(Ok("Alpha".into())))
            .await
            .unwrap();
        let mut decider = ScriptedDecider::new(vec![refine("make it shorter"), Decision::Approve]);

        let outcome = workflow.spin(&mut session, &mut decider).await;

        assert_eq!(
            outcome,
            CycleOutcome::Approved {
                text: "Gamma".into(),
                version_number: 2
            }
        );
        assert_eq!(
            workflow.store().get_approved("ch1").await.unwrap().as_deref(),
            Some("Gamma")
        );
        assert_eq!(
            history(&workflow, "ch1").await,
            vec![
                (0, VersionStatus::Original, "Alpha".to_string()),
                (1, VersionStatus::AiDraft, "Beta".to_string()),
                (2, VersionStatus::Approved, "Gamma".to_string()),
            ]
        );
        assert_eq!(
            reviser.refine_requests.lock().unwrap().as_slice(),
            &[(
                "Beta".to_string(),
                "Editor's creative direction: 'make it shorter'.".to_string()
            )]
        );
        // 다시 쓴 초안도 리뷰를 거친 뒤 결정을 받습니다.
        let versions_seen: Vec<i64> = decider.seen.iter().map(|(v, _, _)| *v).collect();
        assert_eq!(versions_seen, vec![1, 2]);
        assert!(session.approved);
    }

    #[tokio::test]
    async fn discard_rolls_back_without_writing_and_never_reuses_number() {
        let reviser =
            ScriptedReviser::with_rewrites(vec![generated("Beta"), generated("Beta two")]);
        let (workflow, _) = workflow(reviser).await;
        let mut session = workflow
            .initialize("ch1", &StaticSource(Ok("Alpha".into())))
            .await
            .unwrap();

        let mut decider = ScriptedDecider::new(vec![Decision::Discard]);
        let outcome = workflow.spin(&mut session, &mut decider).await;

        assert_eq!(
            outcome,
            CycleOutcome::Discarded {
                text: "Alpha".into(),
                version_number: 0
            }
        );
        assert_eq!((session.current_text.as_str(), session.current_version), ("Alpha", 0));
        assert_eq!(
            history(&workflow, "ch1").await,
            vec![
                (0, VersionStatus::Original, "Alpha".to_string()),
                (1, VersionStatus::AiDraft, "Beta".to_string()),
            ]
        );

        // 다음 초안은 폐기된 v1을 덮어쓰지 않고 v2가 됩니다.
        let mut decider = ScriptedDecider::new(vec![Decision::Defer]);
        let outcome = workflow.spin(&mut session, &mut decider).await;
        assert_eq!(outcome.state(), ("Beta two", 2));
        assert_eq!(history(&workflow, "ch1").await.len(), 3);
    }

    #[tokio::test]
    async fn defer_keeps_draft_unapproved() {
        let reviser = ScriptedReviser::with_rewrites(vec![generated("Beta")]);
        let (workflow, _) = workflow(reviser).await;
        let mut session = workflow
            .initialize("ch1", &StaticSource(Ok("Alpha".into())))
            .await
            .unwrap();

        let mut decider = ScriptedDecider::new(vec![Decision::Defer]);
        let outcome = workflow.spin(&mut session, &mut decider).await;

        assert_eq!(
            outcome,
            CycleOutcome::Deferred {
                text: "Beta".into(),
                version_number: 1
            }
        );
        assert!(!session.approved);
        assert_eq!(workflow.store().get_approved("ch1").await.unwrap(), None);
        let latest = workflow.store().get_latest("ch1").await.unwrap().unwrap();
        assert_eq!(latest.status, VersionStatus::AiDraft);
    }

    #[tokio::test]
    async fn writer_failure_is_surfaced_and_nothing_is_saved() {
        let reviser = ScriptedReviser::with_rewrites(vec![Generation::failed(
            WRITER_FAILED_MARKER,
            "quota exceeded",
        )]);
        let (workflow, _) = workflow(reviser).await;
        let mut session = workflow
            .initialize("ch1", &StaticSource(Ok("Alpha".into())))
            .await
            .unwrap();
        let mut decider = ScriptedDecider::new(vec![]);

        let outcome = workflow.spin(&mut session, &mut decider).await;

        match &outcome {
            CycleOutcome::Failed { marker, reason, .. } => {
                assert_eq!(*marker, WRITER_FAILED_MARKER);
                assert_eq!(reason, "quota exceeded");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(outcome.state(), ("Alpha", 0));
        assert!(decider.seen.is_empty());
        assert_eq!(history(&workflow, "ch1").await.len(), 1);
    }

    #[tokio::test]
    async fn refinement_failure_keeps_last_good_draft() {
        let reviser = ScriptedReviser::with_rewrites(vec![generated("Beta")]).refinements(vec![
            Generation::failed(REFINEMENT_FAILED_MARKER, "timeout"),
        ]);
        let (workflow, _) = workflow(reviser).await;
        let mut session = workflow
            .initialize("ch1", &StaticSource(Ok("Alpha".into())))
            .await
            .unwrap();
        let mut decider = ScriptedDecider::new(vec![refine("more dialogue")]);

        let outcome = workflow.spin(&mut session, &mut decider).await;

        assert!(matches!(outcome, CycleOutcome::Failed { marker, .. } if marker == REFINEMENT_FAILED_MARKER));
        assert_eq!(outcome.state(), ("Beta", 1));
        assert_eq!(history(&workflow, "ch1").await.len(), 2);
    }

    #[tokio::test]
    async fn reviewer_failure_still_reaches_the_human() {
        let reviser = ScriptedReviser::with_rewrites(vec![generated("Beta")]).reviews(vec![
            Generation::failed(REVIEWER_FAILED_MARKER, "503"),
        ]);
        let (workflow, _) = workflow(reviser).await;
        let mut session = workflow
            .initialize("ch1", &StaticSource(Ok("Alpha".into())))
            .await
            .unwrap();
        let mut decider = ScriptedDecider::new(vec![Decision::Approve]);

        let outcome = workflow.spin(&mut session, &mut decider).await;

        assert_eq!(decider.seen[0].2, REVIEWER_FAILED_MARKER);
        assert_eq!(outcome.state(), ("Beta", 1));
        assert_eq!(
            workflow.store().get_approved("ch1").await.unwrap().as_deref(),
            Some("Beta")
        );
    }

    #[tokio::test]
    async fn empty_feedback_is_asked_again_without_transition() {
        let reviser = ScriptedReviser::with_rewrites(vec![generated("Beta")]);
        let (workflow, reviser) = workflow(reviser).await;
        let mut session = workflow
            .initialize("ch1", &StaticSource(Ok("Alpha".into())))
            .await
            .unwrap();
        let blank = Decision::Refine(Feedback {
            direction: "   ".into(),
            review_concern: None,
        });
        let mut decider = ScriptedDecider::new(vec![blank, Decision::Approve]);

        let outcome = workflow.spin(&mut session, &mut decider).await;

        assert_eq!(outcome.state(), ("Beta", 1));
        assert_eq!(decider.seen.len(), 2);
        assert!(reviser.refine_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn approved_chapter_is_not_spun_again() {
        let reviser = ScriptedReviser::with_rewrites(vec![generated("Beta")]);
        let (workflow, _) = workflow(reviser).await;
        let mut session = workflow
            .initialize("ch1", &StaticSource(Ok("Alpha".into())))
            .await
            .unwrap();

        let mut decider = ScriptedDecider::new(vec![Decision::Approve]);
        workflow.spin(&mut session, &mut decider).await;
        let again = workflow.spin(&mut session, &mut decider).await;

        assert_eq!(
            again,
            CycleOutcome::AlreadyApproved {
                text: "Beta".into(),
                version_number: 1
            }
        );
    }

    #[tokio::test]
    async fn storage_outage_does_not_interrupt_the_cycle() {
        let reviser = ScriptedReviser::with_rewrites(vec![generated("Beta")])
            .refinements(vec![generated("Gamma")]);
        let (workflow, _) = workflow(reviser).await;
        let mut session = workflow
            .initialize("ch1", &StaticSource(Ok("Alpha".into())))
            .await
            .unwrap();
        workflow.store().close().await;

        let mut decider = ScriptedDecider::new(vec![refine("shorter"), Decision::Approve]);
        let outcome = workflow.spin(&mut session, &mut decider).await;

        assert_eq!(
            outcome,
            CycleOutcome::Approved {
                text: "Gamma".into(),
                version_number: 2
            }
        );
    }

    #[tokio::test]
    async fn discarded_draft_stays_latest_and_restart_resumes_from_it() {
        let reviser = ScriptedReviser::with_rewrites(vec![generated("Beta")]);
        let (workflow, _) = workflow(reviser).await;
        let source = StaticSource(Ok("Alpha".into()));
        let mut session = workflow.initialize("ch1", &source).await.unwrap();

        let mut decider = ScriptedDecider::new(vec![Decision::Discard]);
        let outcome = workflow.spin(&mut session, &mut decider).await;
        assert_eq!(outcome.state(), ("Alpha", 0));

        // 폐기는 세션만 되돌립니다. 원장에는 v1이 ai_draft로 남아 최신 버전이 됩니다.
        let latest = workflow.store().get_latest("ch1").await.unwrap().unwrap();
        assert_eq!((latest.text.as_str(), latest.version_number), ("Beta", 1));
        assert_eq!(latest.status, VersionStatus::AiDraft);

        let resumed = workflow.initialize("ch1", &source).await.unwrap();
        assert_eq!((resumed.current_text.as_str(), resumed.current_version), ("Beta", 1));
        assert_eq!(resumed.original_text, "Alpha");
    }

    #[tokio::test]
    async fn discard_after_refine_returns_pre_cycle_state() {
        let reviser = ScriptedReviser::with_rewrites(vec![generated("Beta")])
            .refinements(vec![generated("Gamma")]);
        let (workflow, _) = workflow(reviser).await;
        let mut session = workflow
            .initialize("ch1", &StaticSource(Ok("Alpha".into())))
            .await
            .unwrap();
        let mut decider = ScriptedDecider::new(vec![refine("darker tone"), Decision::Discard]);

        let outcome = workflow.spin(&mut session, &mut decider).await;

        assert_eq!(
            outcome,
            CycleOutcome::Discarded {
                text: "Alpha".into(),
                version_number: 0
            }
        );
        assert_eq!(
            history(&workflow, "ch1").await,
            vec![
                (0, VersionStatus::Original, "Alpha".to_string()),
                (1, VersionStatus::AiDraft, "Beta".to_string()),
                (2, VersionStatus::HumanEditedDraft, "Gamma".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn unreachable_store_starts_from_original_in_memory() {
        let (workflow, _) = workflow(ScriptedReviser::default()).await;
        workflow.store().close().await;

        let session = workflow
            .initialize("ch1", &StaticSource(Ok("Alpha".into())))
            .await
            .unwrap();

        assert_eq!((session.current_text.as_str(), session.current_version), ("Alpha", 0));
        assert!(!session.approved);
    }

    #[tokio::test]
    async fn review_concern_is_sent_to_the_writer_with_the_direction() {
        let reviser = ScriptedReviser::with_rewrites(vec![generated("Beta")])
            .refinements(vec![generated("Gamma")]);
        let (workflow, reviser) = workflow(reviser).await;
        let mut session = workflow
            .initialize("ch1", &StaticSource(Ok("Alpha".into())))
            .await
            .unwrap();
        let feedback = Feedback::new("more dialogue", Some("the review ignores pacing")).unwrap();
        let mut decider =
            ScriptedDecider::new(vec![Decision::Refine(feedback), Decision::Approve]);

        workflow.spin(&mut session, &mut decider).await;

        let requests = reviser.refine_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "Beta");
        assert_eq!(
            requests[0].1,
            "Editor's creative direction: 'more dialogue'. Also, please address this \
             meta-concern about the review: 'the review ignores pacing'."
        );
    }
}
