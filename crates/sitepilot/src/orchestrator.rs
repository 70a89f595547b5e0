use std::sync::{Mutex, MutexGuard, PoisonError};

use sitepilot_core::narration::Narration;
use sitepilot_core::preview::preview_url;
use sitepilot_core::site::{ChangeRequest, ChangeSet, RevisionLedger, SiteFile, WriteKind};
use sitepilot_core::state::{Rejection, WorkState};

use crate::error::Error;
use crate::github::Repository;
use crate::model::ModelClient;
use crate::narrator::Narrator;

/// How a submission ended
#[derive(Debug)]
pub enum Outcome {
    /// Empty instruction, or another request was in flight. Nothing happened.
    Ignored(Rejection),
    /// The model proposed no files.
    NoChanges,
    /// Writes were attempted. Individual writes may still have failed.
    Applied(ApplyReport),
    /// Configuration, fetch or model failure. Nothing was written.
    Failed(Error),
}

impl Outcome {
    /// True when the request ran and every write it attempted went through.
    pub fn is_success(&self) -> bool {
        match self {
            Outcome::NoChanges => true,
            Outcome::Applied(report) => report.failed.is_empty(),
            Outcome::Ignored(_) | Outcome::Failed(_) => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct ApplyReport {
    pub written: Vec<(String, WriteKind)>,
    pub failed: Vec<(String, Error)>,
}

impl ApplyReport {
    pub fn total(&self) -> usize {
        self.written.len() + self.failed.len()
    }
}

/// Sequences fetch, model request and write-back for one instruction at a time
pub struct ChangeOrchestrator<R, M, N> {
    repository: R,
    model: M,
    narrator: N,
    preview_url: Option<String>,
    state: Mutex<WorkState>,
}

/// Returns the state to Idle on every exit path of `submit`.
struct WorkGuard<'a> {
    state: &'a Mutex<WorkState>,
}

impl WorkGuard<'_> {
    fn start_applying(&self) {
        lock(self.state).start_applying();
    }
}

impl Drop for WorkGuard<'_> {
    fn drop(&mut self) {
        lock(self.state).finish();
    }
}

fn lock(state: &Mutex<WorkState>) -> MutexGuard<'_, WorkState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R, M, N> ChangeOrchestrator<R, M, N>
where
    R: Repository,
    M: ModelClient,
    N: Narrator,
{
    pub fn new(repository: R, model: M, narrator: N) -> Self {
        Self {
            repository,
            model,
            narrator,
            preview_url: None,
            state: Mutex::new(WorkState::Idle),
        }
    }

    pub fn with_preview_url(mut self, url: Option<String>) -> Self {
        self.preview_url = url;
        self
    }

    pub fn state(&self) -> WorkState {
        *lock(&self.state)
    }

    /// Run one change request to completion.
    ///
    /// Submissions that are empty after trimming, or that arrive while a
    /// request is in flight, are ignored without any message or remote call.
    pub async fn submit(&self, instruction: &str) -> Outcome {
        let instruction = match lock(&self.state).begin(instruction) {
            Ok(instruction) => instruction,
            Err(rejection) => {
                log::debug!("Ignoring submission: {}", rejection);
                return Outcome::Ignored(rejection);
            }
        };
        let guard = WorkGuard { state: &self.state };

        self.narrator.narrate(Narration::Instruction {
            text: instruction.clone(),
        });

        if let Err(err) = self
            .repository
            .ensure_configured()
            .and_then(|_| self.model.ensure_configured())
        {
            return self.fail(err);
        }

        self.narrator.narrate(Narration::FetchingFiles);
        let files = match self.repository.list_text_files().await {
            Ok(files) => files,
            Err(err) => return self.fail(err),
        };
        log::info!("Fetched {} file(s)", files.len());

        self.narrator.narrate(Narration::Thinking);
        let request = ChangeRequest { instruction, files };
        let changes = match self.model.propose_changes(&request).await {
            Ok(changes) => changes,
            Err(err) => return self.fail(err),
        };

        if changes.is_empty() {
            self.narrator.narrate(Narration::NoChanges);
            return Outcome::NoChanges;
        }

        self.narrator.narrate(Narration::Pushing {
            count: changes.len(),
        });
        guard.start_applying();

        let report = self.apply(&changes, &request.files).await;

        if report.failed.is_empty() {
            self.narrator.narrate(Narration::PushComplete);
        } else {
            self.narrator.narrate(Narration::PartialPush {
                failed: report.failed.len(),
                total: report.total(),
            });
        }

        if !report.written.is_empty() {
            if let Some(base) = &self.preview_url {
                let url = preview_url(base, chrono::Utc::now().timestamp_millis());
                self.narrator.narrate(Narration::Preview { url });
            }
        }

        Outcome::Applied(report)
    }

    /// Write every proposed file in order. A failed write does not stop the
    /// ones after it and nothing already written is undone.
    async fn apply(&self, changes: &ChangeSet, current: &[SiteFile]) -> ApplyReport {
        let mut ledger = RevisionLedger::from_files(current);
        let mut report = ApplyReport::default();

        for file in &changes.files {
            let write = ledger.plan(file);
            let kind = write.kind();
            log::info!("{} {}", kind.as_str(), write.name);

            match self.repository.write_file(&write).await {
                Ok(revision) => {
                    ledger.record(&write.name, revision);
                    self.narrator.narrate(match kind {
                        WriteKind::Update => Narration::Updated {
                            name: write.name.clone(),
                        },
                        WriteKind::Create => Narration::Created {
                            name: write.name.clone(),
                        },
                    });
                    report.written.push((write.name, kind));
                }
                Err(err) => {
                    if err.is_conflict() {
                        log::warn!("{} changed on GitHub after it was fetched", write.name);
                    }
                    log::error!("Failed to write {}: {}", write.name, err);
                    self.narrator.narrate(Narration::WriteFailed {
                        name: write.name.clone(),
                        reason: err.to_string(),
                    });
                    report.failed.push((write.name, err));
                }
            }
        }

        report
    }

    fn fail(&self, err: Error) -> Outcome {
        log::error!("Request failed: {}", err);
        self.narrator.narrate(Narration::Error {
            reason: err.to_string(),
        });
        Outcome::Failed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::narrator::RecordingNarrator;
    use sitepilot_core::site::{PlannedWrite, ProposedFile};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeRepository {
        files: Vec<SiteFile>,
        unconfigured: bool,
        fail_listing: bool,
        fail_writes: HashSet<String>,
        listings: AtomicUsize,
        writes: Mutex<Vec<PlannedWrite>>,
    }

    impl FakeRepository {
        fn with_files(files: Vec<SiteFile>) -> Self {
            Self {
                files,
                ..Default::default()
            }
        }

        fn writes(&self) -> Vec<PlannedWrite> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl Repository for FakeRepository {
        fn ensure_configured(&self) -> Result<()> {
            if self.unconfigured {
                return Err(Error::Configuration(
                    "Please provide both GitHub Token and Gemini API Key".to_string(),
                ));
            }
            Ok(())
        }

        async fn list_text_files(&self) -> Result<Vec<SiteFile>> {
            self.listings.fetch_add(1, Ordering::SeqCst);
            if self.fail_listing {
                return Err(Error::Remote {
                    status: 404,
                    message: "Not Found".to_string(),
                });
            }
            Ok(self.files.clone())
        }

        async fn write_file(&self, write: &PlannedWrite) -> Result<Option<String>> {
            let mut writes = self.writes.lock().unwrap();
            writes.push(write.clone());
            if self.fail_writes.contains(&write.name) {
                return Err(Error::Remote {
                    status: 409,
                    message: format!("{} does not match", write.name),
                });
            }
            Ok(Some(format!("rev-{}", writes.len())))
        }
    }

    enum Reply {
        Files(Vec<(&'static str, &'static str)>),
        Fail(&'static str),
    }

    struct FakeModel {
        reply: Reply,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
        requests: Mutex<Vec<ChangeRequest>>,
    }

    impl FakeModel {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                gate: None,
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl ModelClient for FakeModel {
        fn ensure_configured(&self) -> Result<()> {
            Ok(())
        }

        async fn propose_changes(&self, request: &ChangeRequest) -> Result<ChangeSet> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.reply {
                Reply::Files(files) => Ok(ChangeSet {
                    files: files
                        .iter()
                        .map(|(name, content)| ProposedFile {
                            name: name.to_string(),
                            content: content.to_string(),
                        })
                        .collect(),
                }),
                Reply::Fail(reason) => Err(Error::Model(format!("Gemini API Error (500): {reason}"))),
            }
        }
    }

    type TestOrchestrator = ChangeOrchestrator<FakeRepository, FakeModel, RecordingNarrator>;

    fn index() -> SiteFile {
        SiteFile {
            name: "index.html".to_string(),
            content: "<h1>Hi</h1>".to_string(),
            revision: Some("abc".to_string()),
        }
    }

    fn orchestrator(repository: FakeRepository, model: FakeModel) -> TestOrchestrator {
        ChangeOrchestrator::new(repository, model, RecordingNarrator::default())
    }

    #[tokio::test]
    async fn test_updates_existing_file_with_its_revision() {
        let orch = orchestrator(
            FakeRepository::with_files(vec![index()]),
            FakeModel::new(Reply::Files(vec![(
                "index.html",
                "<h1 style=\"color:blue\">Hi</h1>",
            )])),
        );

        let outcome = orch.submit("make the heading blue").await;

        assert!(outcome.is_success());
        let writes = orch.repository.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].name, "index.html");
        assert_eq!(writes[0].content, "<h1 style=\"color:blue\">Hi</h1>");
        assert_eq!(writes[0].revision.as_deref(), Some("abc"));
        assert_eq!(orch.state(), WorkState::Idle);

        let texts = orch.narrator.texts();
        assert_eq!(
            texts.iter().filter(|t| t.as_str() == "Updated index.html").count(),
            1
        );
        assert_eq!(
            texts,
            vec![
                "make the heading blue",
                "Fetching current website files from GitHub...",
                "Thinking... this may take a moment.",
                "AI generated updates for 1 file(s). Pushing to GitHub...",
                "Updated index.html",
                "Updates pushed successfully! Refreshing preview...",
            ]
        );
    }

    #[tokio::test]
    async fn test_prompt_carries_instruction_and_files() {
        let orch = orchestrator(
            FakeRepository::with_files(vec![index()]),
            FakeModel::new(Reply::Files(vec![])),
        );

        orch.submit("  make the heading blue \n").await;

        let requests = orch.model.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].instruction, "make the heading blue");
        assert_eq!(requests[0].files, vec![index()]);
    }

    #[tokio::test]
    async fn test_new_file_is_created_without_revision() {
        let orch = orchestrator(
            FakeRepository::with_files(vec![index()]),
            FakeModel::new(Reply::Files(vec![
                ("about.html", "<h1>About</h1>"),
                ("index.html", "<a href=\"about.html\">About</a>"),
            ])),
        );

        let outcome = orch.submit("add an about page").await;

        let Outcome::Applied(report) = outcome else {
            panic!("expected writes");
        };
        assert_eq!(
            report.written,
            vec![
                ("about.html".to_string(), WriteKind::Create),
                ("index.html".to_string(), WriteKind::Update),
            ]
        );
        let writes = orch.repository.writes();
        assert_eq!(writes[0].revision, None);
        assert_eq!(writes[1].revision.as_deref(), Some("abc"));
        assert!(orch
            .narrator
            .texts()
            .contains(&"Created new file: about.html".to_string()));
    }

    #[tokio::test]
    async fn test_no_changes() {
        let orch = orchestrator(
            FakeRepository::with_files(vec![index()]),
            FakeModel::new(Reply::Files(vec![])),
        );

        let outcome = orch.submit("do nothing").await;

        assert!(matches!(outcome, Outcome::NoChanges));
        assert!(orch.repository.writes().is_empty());
        assert_eq!(orch.state(), WorkState::Idle);
        assert_eq!(
            orch.narrator.texts().last().map(String::as_str),
            Some("AI did not suggest any changes.")
        );
    }

    #[tokio::test]
    async fn test_model_failure_writes_nothing() {
        let orch = orchestrator(
            FakeRepository::with_files(vec![index()]),
            FakeModel::new(Reply::Fail("backend unavailable")),
        );

        let outcome = orch.submit("make the heading blue").await;

        assert!(matches!(outcome, Outcome::Failed(Error::Model(_))));
        assert!(orch.repository.writes().is_empty());
        assert_eq!(orch.state(), WorkState::Idle);
        let last = orch.narrator.lines().pop().unwrap();
        assert!(last.is_failure());
        assert!(last.to_string().contains("backend unavailable"));
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_the_model() {
        let repository = FakeRepository {
            fail_listing: true,
            ..Default::default()
        };
        let orch = orchestrator(repository, FakeModel::new(Reply::Files(vec![])));

        let outcome = orch.submit("make the heading blue").await;

        assert!(matches!(outcome, Outcome::Failed(Error::Remote { status: 404, .. })));
        assert_eq!(orch.model.calls.load(Ordering::SeqCst), 0);
        assert_eq!(orch.state(), WorkState::Idle);
        assert_eq!(
            orch.narrator.texts().last().map(String::as_str),
            Some("Error: GitHub API Error (404): Not Found")
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_dispatch_nothing() {
        let repository = FakeRepository {
            unconfigured: true,
            ..Default::default()
        };
        let orch = orchestrator(repository, FakeModel::new(Reply::Files(vec![])));

        let outcome = orch.submit("make the heading blue").await;

        assert!(matches!(outcome, Outcome::Failed(Error::Configuration(_))));
        assert_eq!(orch.repository.listings.load(Ordering::SeqCst), 0);
        assert_eq!(orch.model.calls.load(Ordering::SeqCst), 0);
        assert_eq!(orch.state(), WorkState::Idle);
        assert!(orch.narrator.lines().last().unwrap().is_failure());
    }

    #[tokio::test]
    async fn test_empty_instruction_is_ignored() {
        let orch = orchestrator(
            FakeRepository::with_files(vec![index()]),
            FakeModel::new(Reply::Files(vec![("index.html", "x")])),
        );

        for instruction in ["", "   ", "\n\t"] {
            let outcome = orch.submit(instruction).await;
            assert!(matches!(
                outcome,
                Outcome::Ignored(Rejection::EmptyInstruction)
            ));
        }

        assert_eq!(orch.repository.listings.load(Ordering::SeqCst), 0);
        assert!(orch.narrator.lines().is_empty());
        assert_eq!(orch.state(), WorkState::Idle);
    }

    #[tokio::test]
    async fn test_submission_while_working_is_ignored() {
        let gate = Arc::new(Notify::new());
        let mut model = FakeModel::new(Reply::Files(vec![("index.html", "<h1>Hello</h1>")]));
        model.gate = Some(gate.clone());
        let orch = orchestrator(FakeRepository::with_files(vec![index()]), model);

        let first = orch.submit("make the heading blue");
        let second = async {
            while !orch.state().is_working() {
                tokio::task::yield_now().await;
            }
            assert_eq!(orch.state(), WorkState::Fetching);
            let outcome = orch.submit("make it red instead").await;
            gate.notify_one();
            outcome
        };

        let (first, second) = tokio::join!(first, second);

        assert!(first.is_success());
        assert!(matches!(
            second,
            Outcome::Ignored(Rejection::Busy(WorkState::Fetching))
        ));
        assert_eq!(orch.repository.listings.load(Ordering::SeqCst), 1);
        assert_eq!(orch.model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(orch.repository.writes().len(), 1);
        assert!(!orch
            .narrator
            .texts()
            .contains(&"make it red instead".to_string()));
        assert_eq!(orch.state(), WorkState::Idle);
    }

    #[tokio::test]
    async fn test_failed_write_does_not_stop_the_rest() {
        let repository = FakeRepository {
            files: vec![index()],
            fail_writes: HashSet::from(["style.css".to_string()]),
            ..Default::default()
        };
        let orch = orchestrator(
            repository,
            FakeModel::new(Reply::Files(vec![
                ("index.html", "<h1>Hello</h1>"),
                ("style.css", "h1 { color: blue; }"),
                ("app.js", "console.log('hi');"),
            ])),
        );

        let outcome = orch.submit("restyle everything").await;

        assert!(!outcome.is_success());
        let Outcome::Applied(report) = outcome else {
            panic!("expected writes");
        };
        assert_eq!(report.written.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "style.css");
        assert!(report.failed[0].1.is_conflict());

        let names: Vec<_> = orch
            .repository
            .writes()
            .into_iter()
            .map(|w| w.name)
            .collect();
        assert_eq!(names, vec!["index.html", "style.css", "app.js"]);

        let lines = orch.narrator.lines();
        assert!(lines.contains(&Narration::WriteFailed {
            name: "style.css".to_string(),
            reason: "GitHub API Error (409): style.css does not match".to_string(),
        }));
        assert!(lines.contains(&Narration::Created {
            name: "app.js".to_string()
        }));
        assert_eq!(
            lines.last(),
            Some(&Narration::PartialPush {
                failed: 1,
                total: 3
            })
        );
        assert_eq!(orch.state(), WorkState::Idle);
    }

    #[tokio::test]
    async fn test_repeated_name_uses_fresh_revision() {
        let orch = orchestrator(
            FakeRepository::with_files(vec![index()]),
            FakeModel::new(Reply::Files(vec![
                ("index.html", "<h1>One</h1>"),
                ("index.html", "<h1>Two</h1>"),
            ])),
        );

        orch.submit("edit twice").await;

        let writes = orch.repository.writes();
        assert_eq!(writes[0].revision.as_deref(), Some("abc"));
        assert_eq!(writes[1].revision.as_deref(), Some("rev-1"));
    }

    #[tokio::test]
    async fn test_preview_link_after_push() {
        let orch = orchestrator(
            FakeRepository::with_files(vec![index()]),
            FakeModel::new(Reply::Files(vec![("index.html", "<h1>Hello</h1>")])),
        )
        .with_preview_url(Some("https://octo.github.io/site/".to_string()));

        orch.submit("say hello").await;

        let Some(Narration::Preview { url }) = orch.narrator.lines().pop() else {
            panic!("expected a preview link");
        };
        assert!(url.starts_with("https://octo.github.io/site/index.html?t="));
    }

    #[tokio::test]
    async fn test_accepts_new_request_after_failure() {
        let orch = orchestrator(
            FakeRepository::with_files(vec![index()]),
            FakeModel::new(Reply::Fail("overloaded")),
        );

        orch.submit("first").await;
        orch.submit("second").await;

        assert_eq!(orch.model.calls.load(Ordering::SeqCst), 2);
        assert_eq!(orch.state(), WorkState::Idle);
    }
}
