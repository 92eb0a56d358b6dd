use tracing::{debug, info};

use crate::{
    anchor::{
        anchor_model::{Fingerprint, STABLE_ID_ATTR},
        fingerprint::build_fingerprint,
        selector::build_selector,
    },
    dom::{Dom, NodeId},
    edit::{edit_id::EditIdGenerator, edit_model::EditRecord},
    store::{KvStore, StoreError, upsert_edit},
};

/// Tags that are never made editable. Clicking one ends edit-mode.
pub const DISALLOWED_TAGS: [&str; 7] = ["input", "textarea", "img", "svg", "button", "video", "audio"];

pub const HOVER_OUTLINE: &str = "2px dashed #2196F3";
pub const EDITING_OUTLINE: &str = "2px dashed orange";
pub const ORIGINAL_OUTLINE_ATTR: &str = "data-original-outline";
pub const EDIT_CURSOR: &str = "crosshair";

pub const PLACEHOLDER_TEXT: &str = "[Editable]";
pub const PLACEHOLDER_BACKGROUND: &str = "#fffa";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Other,
}

/// How an edit-mode session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Saved { edit_id: String },
    /// Focus left without a text change.
    Unchanged,
    /// Escape restored the original text.
    Cancelled,
    /// A disallowed element was clicked.
    Aborted,
    /// The record could not be persisted.
    SaveFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditState {
    /// Edit-mode armed, nothing under the pointer.
    Idle,
    Hovering {
        target: NodeId,
    },
    Editing {
        target: NodeId,
        edit_id: String,
        original_text: String,
        fingerprint: Fingerprint,
        selector: String,
    },
    Finished(SessionEnd),
}

/// One run of edit-mode on a page: hover preview, selection, inline
/// editing, then save or cancel.
///
/// The host feeds DOM events in; the session mutates the tree and writes
/// through to the store.
#[derive(Debug)]
pub struct EditSession {
    state: EditState,
    url: String,
}

impl EditSession {
    /// Arms edit-mode: crosshair cursor, waiting for a pointer.
    pub fn start<D: Dom + ?Sized>(dom: &mut D, url: &str) -> Self {
        set_body_cursor(dom, EDIT_CURSOR);
        info!(url, "edit mode enabled");
        Self {
            state: EditState::Idle,
            url: url.to_string(),
        }
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, EditState::Finished(_))
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    pub fn pointer_over<D: Dom + ?Sized>(&mut self, dom: &mut D, node: NodeId) {
        let hovered = match self.state {
            EditState::Idle => None,
            EditState::Hovering { target } => Some(target),
            _ => return,
        };
        if hovered == Some(node) {
            return;
        }
        if let Some(previous) = hovered {
            restore_outline(dom, previous);
        }

        if is_disallowed(dom, node) {
            self.state = EditState::Idle;
            return;
        }

        let outline = dom.style(node, "outline").unwrap_or_default();
        dom.set_attribute(node, ORIGINAL_OUTLINE_ATTR, &outline);
        dom.set_style(node, "outline", HOVER_OUTLINE);
        self.state = EditState::Hovering { target: node };
    }

    pub fn pointer_leave<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        if let EditState::Hovering { target } = self.state {
            restore_outline(dom, target);
            self.state = EditState::Idle;
        }
    }

    /// Selects the clicked element and makes it editable.
    ///
    /// An element without text gets a placeholder span appended, and the
    /// span becomes the target. The element keeps any edit id it already
    /// carries.
    pub fn click<D: Dom + ?Sized>(&mut self, dom: &mut D, node: NodeId, ids: &mut EditIdGenerator, now_ms: u64) {
        match self.state {
            EditState::Idle => {}
            EditState::Hovering { target } => restore_outline(dom, target),
            _ => return,
        }
        set_body_cursor(dom, "");

        if !dom.is_element(node) || is_disallowed(dom, node) {
            debug!(tag = ?dom.tag_name(node), "click on non-editable element; leaving edit mode");
            self.state = EditState::Finished(SessionEnd::Aborted);
            return;
        }

        let target = if dom.text_content(node).trim().is_empty() {
            let span = dom.create_element("span");
            dom.set_text_content(span, PLACEHOLDER_TEXT);
            dom.set_style(span, "background", PLACEHOLDER_BACKGROUND);
            dom.set_attribute(span, STABLE_ID_ATTR, &ids.next_id(now_ms));
            dom.append_child(node, span);
            span
        } else {
            node
        };

        let edit_id = match dom.attribute(target, STABLE_ID_ATTR) {
            Some(id) if !id.is_empty() => id,
            _ => {
                let id = ids.next_id(now_ms);
                dom.set_attribute(target, STABLE_ID_ATTR, &id);
                id
            }
        };

        let fingerprint = build_fingerprint(dom, target);
        let selector = build_selector(dom, target);
        let original_text = dom.text_content(target);

        dom.set_attribute(target, "contenteditable", "true");
        dom.set_style(target, "outline", EDITING_OUTLINE);

        debug!(edit_id = %edit_id, selector = %selector, "element selected for editing");
        self.state = EditState::Editing {
            target,
            edit_id,
            original_text,
            fingerprint,
            selector,
        };
    }

    /// Enter commits; Escape restores the original text, then commits.
    pub fn key<D, S>(&mut self, dom: &mut D, store: &mut S, key: Key, now_ms: u64) -> Result<(), StoreError>
    where
        D: Dom + ?Sized,
        S: KvStore + ?Sized,
    {
        let EditState::Editing {
            target,
            original_text,
            ..
        } = &self.state
        else {
            return Ok(());
        };

        match key {
            Key::Enter => self.blur(dom, store, now_ms),
            Key::Escape => {
                dom.set_text_content(*target, original_text);
                self.blur(dom, store, now_ms)?;
                if self.state == EditState::Finished(SessionEnd::Unchanged) {
                    self.state = EditState::Finished(SessionEnd::Cancelled);
                }
                Ok(())
            }
            Key::Other => Ok(()),
        }
    }

    /// Focus left the edited element: persist if the text changed.
    pub fn blur<D, S>(&mut self, dom: &mut D, store: &mut S, now_ms: u64) -> Result<(), StoreError>
    where
        D: Dom + ?Sized,
        S: KvStore + ?Sized,
    {
        if !self.is_editing() {
            return Ok(());
        }
        let EditState::Editing {
            target,
            edit_id,
            original_text,
            fingerprint,
            selector,
        } = std::mem::replace(&mut self.state, EditState::Idle)
        else {
            return Ok(());
        };

        let new_text = dom.text_content(target);
        dom.remove_attribute(target, "contenteditable");
        dom.set_style(target, "outline", "");

        if new_text == original_text {
            self.state = EditState::Finished(SessionEnd::Unchanged);
            return Ok(());
        }

        let record = EditRecord::new(edit_id.clone(), new_text)
            .with_selector(selector)
            .with_fingerprint(fingerprint)
            .with_timestamp(now_ms)
            .with_url(self.url.clone());

        match upsert_edit(store, record) {
            Ok(()) => {
                info!(edit_id = %edit_id, "edit saved");
                self.state = EditState::Finished(SessionEnd::Saved { edit_id });
                Ok(())
            }
            Err(e) => {
                self.state = EditState::Finished(SessionEnd::SaveFailed);
                Err(e)
            }
        }
    }

    /// Leaves edit-mode without saving, undoing any preview styling.
    pub fn abort<D: Dom + ?Sized>(&mut self, dom: &mut D) {
        match &self.state {
            EditState::Hovering { target } => restore_outline(dom, *target),
            EditState::Editing { target, .. } => {
                dom.remove_attribute(*target, "contenteditable");
                dom.set_style(*target, "outline", "");
            }
            _ => {}
        }
        set_body_cursor(dom, "");
        if !self.is_finished() {
            self.state = EditState::Finished(SessionEnd::Aborted);
        }
    }
}

pub fn is_disallowed<D: Dom + ?Sized>(dom: &D, node: NodeId) -> bool {
    dom.tag_name(node)
        .is_some_and(|tag| DISALLOWED_TAGS.contains(&tag.as_str()))
}

fn restore_outline<D: Dom + ?Sized>(dom: &mut D, node: NodeId) {
    let original = dom.attribute(node, ORIGINAL_OUTLINE_ATTR).unwrap_or_default();
    dom.set_style(node, "outline", &original);
    dom.remove_attribute(node, ORIGINAL_OUTLINE_ATTR);
}

fn set_body_cursor<D: Dom + ?Sized>(dom: &mut D, cursor: &str) {
    if let Some(body) = dom.body() {
        dom.set_style(body, "cursor", cursor);
    }
}
