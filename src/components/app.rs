use chrono::{DateTime, Utc};
use yew::prelude::*;

use super::item_modal::{ItemModal, ModalRequest};
use super::layer_legend::LayerLegend;
use super::timeline_view::TimelineView;
use crate::config::{EngineConfig, Layer};
use crate::model::{Journal, JournalAction, TimelineItem, from_ms};
use crate::state::ViewSnapshot;
use crate::util;

pub const JOURNAL_KEY: &str = "lw_journal";
pub const VIEW_KEY: &str = "lw_view";

fn now() -> DateTime<Utc> {
    from_ms(util::now_ms())
}

/// Host page: owns the journal, persists it, and answers the engine's requests.
#[function_component(App)]
pub fn app() -> Html {
    let journal = use_reducer(|| util::load_json::<Journal>(JOURNAL_KEY).unwrap_or_else(|| Journal::sample(now())));
    let config = use_state(EngineConfig::load);
    let story_focus = use_state(|| None::<String>);
    let modal = use_state(|| None::<ModalRequest>);
    let initial_view = use_memo((), |_| util::load_json::<ViewSnapshot>(VIEW_KEY));

    // Persist journal changes
    {
        let journal = journal.clone();
        use_effect_with(journal.version, move |_| {
            util::save_json(JOURNAL_KEY, &*journal);
            || ()
        });
    }

    let on_reschedule = {
        let journal = journal.clone();
        Callback::from(move |(id, at): (String, DateTime<Utc>)| {
            journal.dispatch(JournalAction::Reschedule { id, at });
        })
    };
    let on_create_annotation = {
        let journal = journal.clone();
        Callback::from(move |at: DateTime<Utc>| {
            let question = format!("Note for {}", at.format("%b %d, %Y"));
            let text = web_sys::window()
                .and_then(|win| win.prompt_with_message(&question).ok().flatten())
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
            if let Some(text) = text {
                journal.dispatch(JournalAction::AddAnnotation { at, text });
            }
        })
    };
    let on_open_editor = {
        let modal = modal.clone();
        Callback::from(move |item: TimelineItem| modal.set(Some(ModalRequest::Editor(item))))
    };
    let on_open_goal_action = {
        let modal = modal.clone();
        Callback::from(move |item: TimelineItem| modal.set(Some(ModalRequest::GoalAction(item))))
    };
    let on_clear_story_focus = {
        let story_focus = story_focus.clone();
        Callback::from(move |()| story_focus.set(None))
    };
    let on_set_story_focus = {
        let story_focus = story_focus.clone();
        Callback::from(move |id: String| story_focus.set(Some(id)))
    };
    let on_view_change = Callback::from(|view: ViewSnapshot| util::save_json(VIEW_KEY, &view));
    let on_toggle_layer = {
        let config = config.clone();
        Callback::from(move |layer: Layer| {
            let mut next = (*config).clone();
            next.layers.toggle(layer);
            next.save();
            config.set(next);
        })
    };
    let close_modal = {
        let modal = modal.clone();
        Callback::from(move |()| modal.set(None))
    };
    let reset_journal = {
        let journal = journal.clone();
        let story_focus = story_focus.clone();
        Callback::from(move |_| {
            let confirmed = web_sys::window()
                .and_then(|win| win.confirm_with_message("Replace the journal with the sample data?").ok())
                .unwrap_or(false);
            if confirmed {
                story_focus.set(None);
                journal.dispatch(JournalAction::Replace(Journal::sample(now())));
            }
        })
    };

    html! {<div style="display:flex; flex-direction:column; width:100vw; height:100vh; background:#0e1116; color:#c9d1d9; font-family:sans-serif;">
        <div id="top-bar" style="display:flex; align-items:center; gap:12px; padding:8px 12px; border-bottom:1px solid #30363d;">
            <strong>{"Life Wave"}</strong>
            <span style="font-size:12px; opacity:0.7;">{ format!("{} moments, {} notes", journal.items.len(), journal.annotations.len()) }</span>
            <span style="flex:1;"></span>
            <button onclick={reset_journal}>{"Load sample"}</button>
        </div>
        <div style="position:relative; flex:1; min-height:0;">
            <TimelineView
                journal={journal.clone()}
                config={(*config).clone()}
                story_focus={(*story_focus).clone()}
                initial_view={*initial_view}
                on_reschedule={on_reschedule.clone()}
                {on_create_annotation}
                {on_open_editor}
                {on_open_goal_action}
                {on_clear_story_focus}
                on_set_story_focus={on_set_story_focus.clone()}
                {on_view_change}
            />
            <LayerLegend config={(*config).clone()} on_toggle={on_toggle_layer} />
            <ItemModal
                request={(*modal).clone()}
                now={now()}
                on_close={close_modal}
                {on_reschedule}
                on_focus_story={on_set_story_focus}
            />
        </div>
    </div>}
}
