use tracing::{debug, info, warn};

use crate::{
    agent::{
        agent_model::*,
        error::PageError,
    },
    anchor::{anchor_model::STABLE_ID_ATTR, locator::find_by_stable_id},
    dom::{Dom, NodeId},
    edit::{
        applicator::{ApplyReport, apply_edits},
        edit_id::EditIdGenerator,
        session::{EditSession, EditState, Key, SessionEnd},
    },
    popup::control::clear_page_edits,
    store::{KvStore, StoreError, load_edits},
    trace::logger::TraceLogger,
    watch::{
        scheduler::TaskHandle,
        watcher::{MutationRecord, MutationWatcher, PassTrigger},
    },
};

/// Everything the extension keeps for one open page: the tree, the store,
/// the mutation watcher, the current edit session and highlight.
///
/// The host drives it with events and the current time; it never blocks.
pub struct PageAgent<D: Dom, S: KvStore> {
    dom: D,
    store: S,
    url: String,
    settings: AgentSettings,
    watcher: MutationWatcher,
    session: Option<EditSession>,
    last_session_end: Option<SessionEnd>,
    ids: EditIdGenerator,
    highlight: Option<Highlight>,
    tracer: TraceLogger,
    passes: u64,
}

impl<D: Dom, S: KvStore> PageAgent<D, S> {
    pub fn new(dom: D, url: &str, store: S, settings: AgentSettings, now_ms: u64) -> Self {
        Self {
            dom,
            store,
            url: url.to_string(),
            settings,
            watcher: MutationWatcher::new(settings.debounce_ms, settings.interval_ms, now_ms),
            session: None,
            last_session_end: None,
            ids: EditIdGenerator::new(url),
            highlight: None,
            tracer: TraceLogger::disabled(),
            passes: 0,
        }
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_parts(self) -> (D, S) {
        (self.dom, self.store)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// How the most recent edit-mode session ended.
    pub fn last_session_end(&self) -> Option<&SessionEnd> {
        self.last_session_end.as_ref()
    }

    pub fn highlight(&self) -> Option<Highlight> {
        self.highlight
    }

    pub fn passes_run(&self) -> u64 {
        self.passes
    }

    // ------------------------------------------------------------------
    // Locate-and-apply passes
    // ------------------------------------------------------------------

    /// Initial pass once the page has loaded.
    pub fn on_load(&mut self) -> Result<ApplyReport, PageError> {
        self.run_pass(PassTrigger::Load)
    }

    pub fn on_mutations(&mut self, now_ms: u64, records: &[MutationRecord]) -> Option<TaskHandle> {
        self.watcher.observe(now_ms, records)
    }

    /// Advances timers: expires the highlight, then runs a due pass.
    pub fn tick(&mut self, now_ms: u64, visible: bool) -> Result<Option<ApplyReport>, PageError> {
        if self.highlight.is_some_and(|h| now_ms >= h.expires_at_ms) {
            self.clear_highlight();
        }

        match self.watcher.due(now_ms, visible) {
            Some(trigger) => self.run_pass(trigger).map(Some),
            None => Ok(None),
        }
    }

    pub fn run_pass(&mut self, trigger: PassTrigger) -> Result<ApplyReport, PageError> {
        if !self.watcher.begin_pass() {
            debug!(%trigger, "pass already running; skipping");
            return Ok(ApplyReport::default());
        }
        let result = self.apply_stored_edits(trigger);
        self.watcher.end_pass();

        result.map_err(|e| {
            warn!(%trigger, error = %e, "could not read stored edits");
            PageError::from(e)
        })
    }

    fn apply_stored_edits(&mut self, trigger: PassTrigger) -> Result<ApplyReport, StoreError> {
        let edits = load_edits(&self.store)?;
        let report = apply_edits(&mut self.dom, &edits);

        self.passes += 1;
        self.tracer.log_pass(self.passes, trigger, &report);
        info!(
            %trigger,
            applied = report.applied(),
            unchanged = report.unchanged(),
            unresolved = report.unresolved(),
            "edits pass complete"
        );
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Control-surface messages
    // ------------------------------------------------------------------

    pub fn handle_message(&mut self, message: &Message, now_ms: u64) -> Result<Vec<Effect>, PageError> {
        debug!(?message, "message received");
        match message {
            Message::EnableEdit => {
                self.enable_edit();
                Ok(Vec::new())
            }
            Message::ClearEdits => self.clear_edits(),
            Message::HighlightEdit { edit_id } => Ok(self.highlight_edit(edit_id, now_ms)),
            Message::RefreshPage => Ok(vec![Effect::Reload]),
        }
    }

    pub fn enable_edit(&mut self) {
        if let Some(mut previous) = self.session.take() {
            previous.abort(&mut self.dom);
            self.last_session_end = Some(SessionEnd::Aborted);
        }
        self.session = Some(EditSession::start(&mut self.dom, &self.url));
    }

    fn clear_edits(&mut self) -> Result<Vec<Effect>, PageError> {
        let removed = clear_page_edits(&mut self.store, &self.url).map_err(|e| {
            warn!(url = %self.url, error = %e, "could not clear page edits");
            e
        })?;

        for node in self.dom.elements_with_attribute(STABLE_ID_ATTR, None) {
            self.dom.remove_attribute(node, STABLE_ID_ATTR);
        }
        info!(url = %self.url, removed, "page edits cleared");
        Ok(vec![Effect::Reload])
    }

    /// Flashes the element carrying `edit_id`. Looks up the stable id only;
    /// no fuzzy matching.
    pub fn highlight_edit(&mut self, edit_id: &str, now_ms: u64) -> Vec<Effect> {
        for node in self.dom.elements() {
            if self.dom.has_class(node, HIGHLIGHT_CLASS) {
                unmark(&mut self.dom, node);
            }
        }
        self.highlight = None;

        let Some(node) = find_by_stable_id(&self.dom, edit_id) else {
            debug!(edit_id, "no element carries this edit id");
            return Vec::new();
        };

        self.dom.add_class(node, HIGHLIGHT_CLASS);
        self.dom.set_style(node, "outline", HIGHLIGHT_OUTLINE);
        self.dom.set_style(node, "background-color", HIGHLIGHT_BACKGROUND);
        self.highlight = Some(Highlight {
            node,
            expires_at_ms: now_ms.saturating_add(self.settings.highlight_ms),
        });
        vec![Effect::ScrollIntoView(node)]
    }

    fn clear_highlight(&mut self) {
        if let Some(h) = self.highlight.take() {
            unmark(&mut self.dom, h.node);
        }
    }

    // ------------------------------------------------------------------
    // Edit-mode events
    // ------------------------------------------------------------------

    pub fn pointer_over(&mut self, node: NodeId) {
        if let Some(session) = self.session.as_mut() {
            session.pointer_over(&mut self.dom, node);
        }
    }

    pub fn pointer_leave(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.pointer_leave(&mut self.dom);
        }
    }

    pub fn click(&mut self, node: NodeId, now_ms: u64) {
        if let Some(session) = self.session.as_mut() {
            session.click(&mut self.dom, node, &mut self.ids, now_ms);
        }
        self.reap_session();
    }

    pub fn key(&mut self, key: Key, now_ms: u64) -> Result<(), PageError> {
        let result = match self.session.as_mut() {
            Some(session) => session.key(&mut self.dom, &mut self.store, key, now_ms),
            None => Ok(()),
        };
        self.finish_event(result)
    }

    pub fn blur(&mut self, now_ms: u64) -> Result<(), PageError> {
        let result = match self.session.as_mut() {
            Some(session) => session.blur(&mut self.dom, &mut self.store, now_ms),
            None => Ok(()),
        };
        self.finish_event(result)
    }

    fn finish_event(&mut self, result: Result<(), StoreError>) -> Result<(), PageError> {
        if let Err(e) = &result {
            warn!(error = %e, "could not save edit");
        }
        self.reap_session();
        result.map_err(PageError::from)
    }

    /// Drops a finished session, returning the agent to idle.
    fn reap_session(&mut self) {
        let finished = match self.session.as_ref().map(EditSession::state) {
            Some(EditState::Finished(end)) => end.clone(),
            _ => return,
        };
        debug!(?finished, "edit mode ended");
        self.session = None;
        self.last_session_end = Some(finished);
    }
}

fn unmark<D: Dom + ?Sized>(dom: &mut D, node: NodeId) {
    dom.remove_class(node, HIGHLIGHT_CLASS);
    dom.set_style(node, "outline", "");
    dom.set_style(node, "background-color", "");
}
