//! Creation of branches from records.
//!
//! A [BranchCreator] drives one creation attempt per record through
//! `Resolving -> CheckingCollision -> {AlreadyExists | LocatingSource} -> Creating ->
//! Linking -> UpdatingState -> Done`. Critical steps abort the attempt with an error;
//! linking and state updates are [best_effort] and never do.

use crate::{
    constants::{ARTIFACT_LINK_REL, BRANCH_LINK_NAME, STATE_FIELD, ZERO_OID},
    errors::{EbcError, EbcResult},
    notify::{Notification, Notifier},
    records::{FieldValue, Record, RecordStore, Relation},
    refs::{branch_ref_name, RefStore, RefUpdate, RefUpdateStatus, RepositoryInfo},
    settings::{SettingsDocument, SettingsStore},
    template::resolve_branch_name,
};
use futures::future::join_all;
use std::{collections::BTreeMap, fmt, sync::Arc};
use tracing::{debug, info, warn};
use url::{form_urlencoded, Url};

mod steps;
pub(crate) use steps::{best_effort, PostStep, StepOutcome};

/// Inputs of a single creation attempt. Consumed once, never persisted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct BranchCreationRequest {
    pub(crate) record_id: u64,
    pub(crate) repository_id: String,
    pub(crate) source_branch_name: String,
    pub(crate) project: String,
    /// Base URL that repository names are appended to when building branch URLs.
    pub(crate) base_url: Url,
}

/// The successful result of a creation attempt.
#[derive(Debug)]
pub(crate) enum CreationOutcome {
    /// The branch was created.
    Created {
        branch_name: String,
        url: Url,
        link: StepOutcome,
        state: StepOutcome,
    },
    /// A branch with the resolved name already existed. Nothing was created.
    AlreadyExists { branch_name: String, url: Url },
}

impl CreationOutcome {
    pub(crate) fn branch_name(&self) -> &str {
        match self {
            Self::Created { branch_name, .. } | Self::AlreadyExists { branch_name, .. } => {
                branch_name
            }
        }
    }
}

/// States of a creation attempt.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum CreationState {
    Resolving,
    CheckingCollision,
    AlreadyExists,
    LocatingSource,
    Creating,
    Linking,
    UpdatingState,
    Done,
    Failed,
}

impl fmt::Display for CreationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Tracks the state of one attempt for logging.
struct Attempt {
    record_id: u64,
    state: CreationState,
}

impl Attempt {
    fn new(record_id: u64) -> Self {
        debug!(record_id, state = %CreationState::Resolving, "Starting branch creation");
        Self {
            record_id,
            state: CreationState::Resolving,
        }
    }

    fn advance(&mut self, next: CreationState) {
        debug!(record_id = self.record_id, from = %self.state, to = %next, "Branch creation state");
        self.state = next;
    }

    fn fail(&mut self, error: &EbcError) {
        warn!(record_id = self.record_id, state = %self.state, %error, "Branch creation failed");
        self.state = CreationState::Failed;
    }
}

/// Creates branches for records, given its ref, record and settings stores.
pub(crate) struct BranchCreator {
    refs: Arc<dyn RefStore>,
    records: Arc<dyn RecordStore>,
    settings: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
}

impl BranchCreator {
    pub(crate) fn new(
        refs: Arc<dyn RefStore>,
        records: Arc<dyn RecordStore>,
        settings: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            refs,
            records,
            settings,
            notifier,
        }
    }

    /// Resolves the branch name a record would get, without side effects.
    pub(crate) async fn branch_name(
        &self,
        record_id: u64,
        project: &str,
        source_branch_name: &str,
    ) -> EbcResult<String> {
        let settings = self.settings.get_settings(project).await?;
        let record = self.records.get_record(record_id, project).await?;
        Ok(resolve_for_record(&settings, &record, source_branch_name))
    }

    /// Runs every request concurrently. Each request succeeds or fails on its own.
    pub(crate) async fn create_branches(
        &self,
        requests: &[BranchCreationRequest],
    ) -> Vec<(u64, EbcResult<CreationOutcome>)> {
        join_all(requests.iter().map(|request| async move {
            (request.record_id, self.create_branch(request).await)
        }))
        .await
    }

    /// Creates the branch for `request.record_id`, unless one with the resolved name
    /// already exists.
    pub(crate) async fn create_branch(
        &self,
        request: &BranchCreationRequest,
    ) -> EbcResult<CreationOutcome> {
        let mut attempt = Attempt::new(request.record_id);
        let result = self.run(&mut attempt, request).await;
        if let Err(e) = &result {
            attempt.fail(e);
        }
        result
    }

    async fn run(
        &self,
        attempt: &mut Attempt,
        request: &BranchCreationRequest,
    ) -> EbcResult<CreationOutcome> {
        let BranchCreationRequest {
            record_id,
            repository_id,
            source_branch_name,
            project,
            base_url,
        } = request;

        let repository = self.refs.repository(repository_id, project).await?;
        let settings = self.settings.get_settings(project).await?;
        let record = self.records.get_record(*record_id, project).await?;
        let branch_name = resolve_for_record(&settings, &record, source_branch_name);
        let ref_name = branch_ref_name(&branch_name);
        let url = branch_url(base_url, &repository.name, &branch_name)?;

        attempt.advance(CreationState::CheckingCollision);
        let existing = self
            .refs
            .list_refs(&repository.id, project, &ref_name)
            .await?;
        if existing.iter().any(|r| r.name == ref_name) {
            return Ok(self.already_exists(attempt, &repository, branch_name, url));
        }

        attempt.advance(CreationState::LocatingSource);
        let source = self
            .refs
            .list_branches(&repository.id, project)
            .await?
            .into_iter()
            .find(|b| &b.name == source_branch_name)
            .ok_or_else(|| EbcError::SourceBranchNotFound(source_branch_name.clone()))?;

        attempt.advance(CreationState::Creating);
        let update = RefUpdate {
            name: ref_name,
            new_object_id: source.commit_id,
            old_object_id: ZERO_OID.to_string(),
        };
        if self.refs.update_ref(&repository.id, &update).await? == RefUpdateStatus::Conflict {
            // Lost a race against another creator after the collision check.
            return Ok(self.already_exists(attempt, &repository, branch_name, url));
        }
        info!(
            record_id,
            branch = %branch_name,
            repository = %repository.name,
            "Branch created"
        );

        attempt.advance(CreationState::Linking);
        let link = best_effort(
            PostStep::Link,
            self.link(*record_id, project, &repository, &branch_name),
        )
        .await;

        attempt.advance(CreationState::UpdatingState);
        let state = match settings.target_state_for(&record.record_type) {
            Some(state) => {
                best_effort(PostStep::UpdateState, self.update_state(*record_id, state)).await
            }
            None => StepOutcome::Skipped,
        };

        attempt.advance(CreationState::Done);
        self.notifier
            .notify(Notification::success(format!("Branch {} created", branch_name)));
        self.notifier.open_url(&url);

        Ok(CreationOutcome::Created {
            branch_name,
            url,
            link,
            state,
        })
    }

    fn already_exists(
        &self,
        attempt: &mut Attempt,
        repository: &RepositoryInfo,
        branch_name: String,
        url: Url,
    ) -> CreationOutcome {
        attempt.advance(CreationState::AlreadyExists);
        info!(
            branch = %branch_name,
            repository = %repository.name,
            "Branch already exists"
        );
        self.notifier.notify(
            Notification::info(format!("Branch {} already exists", branch_name))
                .with_action("Open branch", url.clone()),
        );
        CreationOutcome::AlreadyExists { branch_name, url }
    }

    async fn link(
        &self,
        record_id: u64,
        project: &str,
        repository: &RepositoryInfo,
        branch_name: &str,
    ) -> EbcResult<()> {
        let relation = artifact_link(project, &repository.id, branch_name);
        self.records
            .add_relation(record_id, relation)
            .await
            .map_err(|e| EbcError::LinkFailed {
                record_id,
                branch: branch_name.to_string(),
                source: Box::new(e),
            })
    }

    async fn update_state(&self, record_id: u64, state: &str) -> EbcResult<()> {
        self.records
            .set_field(record_id, STATE_FIELD, FieldValue::Text(state.to_string()))
            .await
            .map_err(|e| EbcError::StateUpdateFailed {
                record_id,
                state: state.to_string(),
                source: Box::new(e),
            })
    }
}

/// Resolves the branch name of `record` with the template its type selects.
pub(crate) fn resolve_for_record(
    settings: &SettingsDocument,
    record: &Record,
    source_branch_name: &str,
) -> String {
    resolve_branch_name(
        settings.template_for(&record.record_type),
        &record.fields,
        source_branch_name,
        &settings.sanitization(),
    )
}

/// Parses a repository host base URL, rejecting URLs that cannot carry a path.
pub(crate) fn parse_base_url(s: &str) -> EbcResult<Url> {
    let url = Url::parse(s).map_err(|_| EbcError::InvalidBaseUrl(s.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(EbcError::InvalidBaseUrl(s.to_string()));
    }
    Ok(url)
}

/// `<base>/<repository name>?version=GB<branch name>`
pub(crate) fn branch_url(base: &Url, repository_name: &str, branch_name: &str) -> EbcResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| EbcError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .push(repository_name);
    url.query_pairs_mut()
        .clear()
        .append_pair("version", &format!("GB{}", branch_name));
    Ok(url)
}

/// The artifact link relation pointing at branch `branch_name`.
pub(crate) fn artifact_link(project: &str, repository_id: &str, branch_name: &str) -> Relation {
    let encode = |s: &str| form_urlencoded::byte_serialize(s.as_bytes()).collect::<String>();
    Relation {
        rel: ARTIFACT_LINK_REL.to_string(),
        url: format!(
            "vstfs:///Git/Ref/{}%2F{}%2FGB{}",
            encode(project),
            encode(repository_id),
            encode(branch_name)
        ),
        attributes: BTreeMap::from([("name".to_string(), BRANCH_LINK_NAME.to_string())]),
    }
}

#[cfg(test)]
mod test {
    use super::{
        artifact_link, branch_url, parse_base_url, BranchCreationRequest, BranchCreator,
        CreationOutcome,
    };
    use crate::{
        errors::{EbcError, EbcResult},
        notify::{Notification, NotificationKind, Notifier},
        records::{FieldValue, Record, RecordStore, Relation},
        refs::{BranchEntry, RefEntry, RefStore, RefUpdate, RefUpdateStatus, RepositoryInfo},
        settings::{SettingsDocument, SettingsStore, Toggle},
    };
    use async_trait::async_trait;
    use std::{
        collections::BTreeMap,
        io,
        sync::{Arc, Mutex, MutexGuard},
    };
    use tracing::subscriber::DefaultGuard;
    use tracing_subscriber::fmt::MakeWriter;
    use url::Url;

    const REPO: &str = "web";
    const PROJECT: &str = "proj";
    const COMMIT: &str = "1111111111111111111111111111111111111111";

    #[derive(Default)]
    struct FakeRefs {
        refs: Mutex<Vec<RefEntry>>,
        branches: Vec<BranchEntry>,
        updates: Mutex<Vec<RefUpdate>>,
        conflict_on_update: bool,
    }

    #[async_trait]
    impl RefStore for FakeRefs {
        async fn repository(&self, repository_id: &str, _: &str) -> EbcResult<RepositoryInfo> {
            if repository_id != REPO {
                return Err(EbcError::RepositoryNotFound(repository_id.to_string()));
            }
            Ok(RepositoryInfo {
                id: REPO.to_string(),
                name: REPO.to_string(),
            })
        }

        async fn list_refs(&self, _: &str, _: &str, prefix: &str) -> EbcResult<Vec<RefEntry>> {
            let refs = self.refs.lock().unwrap();
            Ok(refs.iter().filter(|r| r.name.starts_with(prefix)).cloned().collect())
        }

        async fn list_branches(&self, _: &str, _: &str) -> EbcResult<Vec<BranchEntry>> {
            Ok(self.branches.clone())
        }

        async fn update_ref(&self, _: &str, update: &RefUpdate) -> EbcResult<RefUpdateStatus> {
            self.updates.lock().unwrap().push(update.clone());
            if self.conflict_on_update {
                return Ok(RefUpdateStatus::Conflict);
            }
            self.refs.lock().unwrap().push(RefEntry {
                name: update.name.clone(),
                object_id: update.new_object_id.clone(),
            });
            Ok(RefUpdateStatus::Succeeded)
        }
    }

    #[derive(Default)]
    struct FakeRecords {
        records: BTreeMap<u64, Record>,
        relations: Mutex<Vec<(u64, Relation)>>,
        fields: Mutex<Vec<(u64, String, FieldValue)>>,
        fail_writes: bool,
    }

    #[async_trait]
    impl RecordStore for FakeRecords {
        async fn get_record(&self, id: u64, _: &str) -> EbcResult<Record> {
            self.records
                .get(&id)
                .cloned()
                .ok_or(EbcError::RecordNotFound(id))
        }

        async fn add_relation(&self, id: u64, relation: Relation) -> EbcResult<()> {
            if self.fail_writes {
                return Err(EbcError::Store("relations unavailable".into()));
            }
            self.relations.lock().unwrap().push((id, relation));
            Ok(())
        }

        async fn set_field(&self, id: u64, name: &str, value: FieldValue) -> EbcResult<()> {
            if self.fail_writes {
                return Err(EbcError::Store("fields unavailable".into()));
            }
            self.fields.lock().unwrap().push((id, name.to_string(), value));
            Ok(())
        }

        async fn field_names(&self, _: &str) -> EbcResult<Vec<String>> {
            Ok(Vec::new())
        }

        async fn record_types(&self, _: &str) -> EbcResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    struct FakeSettings(SettingsDocument);

    #[async_trait]
    impl SettingsStore for FakeSettings {
        async fn get_settings(&self, _: &str) -> EbcResult<SettingsDocument> {
            Ok(self.0.clone())
        }

        async fn set_settings(&self, document: SettingsDocument) -> EbcResult<SettingsDocument> {
            Ok(document)
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notifications: Mutex<Vec<Notification>>,
        opened: Mutex<Vec<Url>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.notifications.lock().unwrap().push(notification);
        }

        fn open_url(&self, url: &Url) {
            self.opened.lock().unwrap().push(url.clone());
        }
    }

    /// Collects formatted log lines in memory.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    struct LogBufferGuard<'a>(MutexGuard<'a, Vec<u8>>);

    impl io::Write for LogBufferGuard<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBufferGuard<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LogBufferGuard(self.0.lock().unwrap())
        }
    }

    impl LogBuffer {
        /// Routes warnings and above on the current thread into the buffer.
        fn capture(&self) -> DefaultGuard {
            let subscriber = tracing_subscriber::fmt()
                .with_writer(self.clone())
                .with_ansi(false)
                .with_max_level(tracing::Level::WARN)
                .finish();
            tracing::subscriber::set_default(subscriber)
        }

        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    struct Harness {
        refs: Arc<FakeRefs>,
        records: Arc<FakeRecords>,
        notifier: Arc<RecordingNotifier>,
        creator: BranchCreator,
    }

    fn record(id: u64, record_type: &str, title: &str) -> Record {
        Record {
            id,
            record_type: record_type.to_string(),
            fields: BTreeMap::from([
                ("System.Id".to_string(), FieldValue::Integer(id as i64)),
                ("System.Title".to_string(), FieldValue::Text(title.to_string())),
            ]),
            relations: Vec::new(),
        }
    }

    fn main_branch() -> BranchEntry {
        BranchEntry {
            name: "main".to_string(),
            commit_id: COMMIT.to_string(),
            is_default: true,
        }
    }

    fn harness(refs: FakeRefs, records: FakeRecords, settings: SettingsDocument) -> Harness {
        let refs = Arc::new(refs);
        let records = Arc::new(records);
        let notifier = Arc::new(RecordingNotifier::default());
        let creator = BranchCreator::new(
            refs.clone(),
            records.clone(),
            Arc::new(FakeSettings(settings)),
            notifier.clone(),
        );
        Harness {
            refs,
            records,
            notifier,
            creator,
        }
    }

    fn default_harness() -> Harness {
        harness(
            FakeRefs {
                branches: vec![main_branch()],
                ..Default::default()
            },
            FakeRecords {
                records: BTreeMap::from([(42, record(42, "Bug", "Fix bug #1"))]),
                ..Default::default()
            },
            SettingsDocument::for_project(PROJECT),
        )
    }

    fn request(record_id: u64, source: &str) -> BranchCreationRequest {
        BranchCreationRequest {
            record_id,
            repository_id: REPO.to_string(),
            source_branch_name: source.to_string(),
            project: PROJECT.to_string(),
            base_url: Url::parse("https://dev.azure.com/org/proj/_git").unwrap(),
        }
    }

    #[tokio::test]
    async fn creates_branch_from_source_commit() {
        let h = default_harness();
        let outcome = h.creator.create_branch(&request(42, "main")).await.unwrap();

        let CreationOutcome::Created { branch_name, url, link, state } = outcome else {
            panic!("expected a created branch");
        };
        assert_eq!(branch_name, "feature/42-Fix_bug__1");
        assert!(matches!(link, super::StepOutcome::Completed));
        assert!(matches!(state, super::StepOutcome::Skipped));

        let updates = h.refs.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].name, "refs/heads/feature/42-Fix_bug__1");
        assert_eq!(updates[0].new_object_id, COMMIT);
        assert_eq!(updates[0].old_object_id, "0".repeat(40));

        let relations = h.records.relations.lock().unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].1, artifact_link(PROJECT, REPO, "feature/42-Fix_bug__1"));

        let notifications = h.notifier.notifications.lock().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Success);
        assert_eq!(*h.notifier.opened.lock().unwrap(), vec![url]);
    }

    #[tokio::test]
    async fn existing_branch_is_not_recreated() {
        let h = default_harness();
        h.refs.refs.lock().unwrap().push(RefEntry {
            name: "refs/heads/feature/42-Fix_bug__1".to_string(),
            object_id: COMMIT.to_string(),
        });

        let outcome = h.creator.create_branch(&request(42, "main")).await.unwrap();
        assert!(matches!(outcome, CreationOutcome::AlreadyExists { .. }));
        assert!(h.refs.updates.lock().unwrap().is_empty());
        assert!(h.records.relations.lock().unwrap().is_empty());

        let notifications = h.notifier.notifications.lock().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].message, "Branch feature/42-Fix_bug__1 already exists");
        assert_eq!(
            notifications[0].action.as_ref().map(|a| a.label.as_str()),
            Some("Open branch")
        );
    }

    #[tokio::test]
    async fn longer_names_sharing_the_prefix_do_not_collide() {
        let h = default_harness();
        h.refs.refs.lock().unwrap().push(RefEntry {
            name: "refs/heads/feature/42-Fix_bug__1-followup".to_string(),
            object_id: COMMIT.to_string(),
        });

        let outcome = h.creator.create_branch(&request(42, "main")).await.unwrap();
        assert!(matches!(outcome, CreationOutcome::Created { .. }));
    }

    #[tokio::test]
    async fn missing_source_branch_creates_nothing() {
        let h = default_harness();
        let logs = LogBuffer::default();
        let _guard = logs.capture();

        let err = h.creator.create_branch(&request(42, "develop")).await.unwrap_err();

        assert!(matches!(err, EbcError::SourceBranchNotFound(name) if name == "develop"));
        assert!(h.refs.updates.lock().unwrap().is_empty());
        assert!(h.notifier.notifications.lock().unwrap().is_empty());

        let logs = logs.contents();
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("Branch creation failed"), "{logs}");
        assert!(logs.contains("record_id=42"), "{logs}");
        assert!(logs.contains("state=LocatingSource"), "{logs}");
    }

    #[tokio::test]
    async fn successful_creation_logs_no_warning() {
        let h = default_harness();
        let logs = LogBuffer::default();
        let _guard = logs.capture();

        h.creator.create_branch(&request(42, "main")).await.unwrap();
        assert!(!logs.contents().contains("WARN"));
    }

    #[tokio::test]
    async fn unknown_repository_aborts() {
        let h = default_harness();
        let mut request = request(42, "main");
        request.repository_id = "api".to_string();

        let err = h.creator.create_branch(&request).await.unwrap_err();
        assert!(matches!(err, EbcError::RepositoryNotFound(_)));
    }

    #[tokio::test]
    async fn lost_create_race_reports_existing_branch() {
        let h = harness(
            FakeRefs {
                branches: vec![main_branch()],
                conflict_on_update: true,
                ..Default::default()
            },
            FakeRecords {
                records: BTreeMap::from([(42, record(42, "Bug", "Fix bug #1"))]),
                ..Default::default()
            },
            SettingsDocument::for_project(PROJECT),
        );

        let outcome = h.creator.create_branch(&request(42, "main")).await.unwrap();
        assert!(matches!(outcome, CreationOutcome::AlreadyExists { .. }));
        assert!(h.records.relations.lock().unwrap().is_empty());
        assert_eq!(h.notifier.notifications.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn post_step_failures_do_not_fail_creation() {
        let mut settings = SettingsDocument::for_project(PROJECT);
        settings.update_record_state = true;
        settings
            .record_states
            .insert("Bug".into(), Toggle::new(true, "Active".into()));
        let h = harness(
            FakeRefs {
                branches: vec![main_branch()],
                ..Default::default()
            },
            FakeRecords {
                records: BTreeMap::from([(42, record(42, "Bug", "Fix bug #1"))]),
                fail_writes: true,
                ..Default::default()
            },
            settings,
        );

        let outcome = h.creator.create_branch(&request(42, "main")).await.unwrap();
        let CreationOutcome::Created { link, state, .. } = outcome else {
            panic!("expected a created branch");
        };
        assert!(matches!(link, super::StepOutcome::Failed(EbcError::LinkFailed { .. })));
        assert!(matches!(
            state,
            super::StepOutcome::Failed(EbcError::StateUpdateFailed { .. })
        ));

        let notifications = h.notifier.notifications.lock().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].message, "Branch feature/42-Fix_bug__1 created");
    }

    #[tokio::test]
    async fn applies_type_override_and_target_state() {
        let mut settings = SettingsDocument::for_project(PROJECT);
        settings.lowercase_branch_name = true;
        settings.update_record_state = true;
        settings.branch_name_templates.insert(
            "Bug".into(),
            Toggle::new(true, "bugfix/${System.Id}-${SourceBranchNameTail}".into()),
        );
        settings
            .record_states
            .insert("Bug".into(), Toggle::new(true, "Active".into()));
        let h = harness(
            FakeRefs {
                branches: vec![BranchEntry {
                    name: "release/V2".to_string(),
                    commit_id: COMMIT.to_string(),
                    is_default: false,
                }],
                ..Default::default()
            },
            FakeRecords {
                records: BTreeMap::from([(42, record(42, "Bug", "Fix bug #1"))]),
                ..Default::default()
            },
            settings,
        );

        let outcome = h.creator.create_branch(&request(42, "release/V2")).await.unwrap();
        assert_eq!(outcome.branch_name(), "bugfix/42-v2");
        assert_eq!(
            *h.records.fields.lock().unwrap(),
            vec![(42, "System.State".to_string(), FieldValue::Text("Active".into()))]
        );
    }

    #[tokio::test]
    async fn records_are_processed_independently() {
        let h = default_harness();
        let results = h
            .creator
            .create_branches(&[request(7, "main"), request(42, "main")])
            .await;

        assert_eq!(results.len(), 2);
        let failed = results.iter().find(|(id, _)| *id == 7).unwrap();
        assert!(matches!(failed.1, Err(EbcError::RecordNotFound(7))));
        let created = results.iter().find(|(id, _)| *id == 42).unwrap();
        assert!(matches!(created.1, Ok(CreationOutcome::Created { .. })));
    }

    #[tokio::test]
    async fn preview_has_no_side_effects() {
        let h = default_harness();
        let name = h.creator.branch_name(42, PROJECT, "main").await.unwrap();

        assert_eq!(name, "feature/42-Fix_bug__1");
        assert!(h.refs.updates.lock().unwrap().is_empty());
        assert!(h.notifier.notifications.lock().unwrap().is_empty());
    }

    #[test]
    fn builds_branch_urls() {
        let base = Url::parse("https://dev.azure.com/org/proj/_git/").unwrap();
        let url = branch_url(&base, "web", "feature/42-fix").unwrap();
        assert_eq!(
            url.as_str(),
            "https://dev.azure.com/org/proj/_git/web?version=GBfeature%2F42-fix"
        );
    }

    #[test]
    fn base_url_must_carry_a_path() {
        let url = parse_base_url("https://dev.azure.com/org/proj/_git").unwrap();
        assert_eq!(url.path(), "/org/proj/_git");
        assert!(branch_url(&url, "web", "main").is_ok());

        assert!(matches!(
            parse_base_url("mailto:dev@example.com"),
            Err(EbcError::InvalidBaseUrl(_))
        ));
        assert!(matches!(parse_base_url("not a url"), Err(EbcError::InvalidBaseUrl(_))));
    }

    #[test]
    fn artifact_link_points_at_ref() {
        let link = artifact_link("proj", "web", "feature/42-fix");
        assert_eq!(link.rel, "ArtifactLink");
        assert_eq!(link.url, "vstfs:///Git/Ref/proj%2Fweb%2FGBfeature%2F42-fix");
        assert_eq!(link.attributes["name"], "Branch");
    }
}
